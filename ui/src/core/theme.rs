//! Host-supplied styling, passed explicitly into layout and sizing.

use serde::{Deserialize, Serialize};

/// Symbolic weight; the theme maps it to a numeric CSS weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Light,
    Normal,
    Bold,
}

impl std::fmt::Display for FontWeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FontWeight::Light => "Light",
            FontWeight::Normal => "Normal",
            FontWeight::Bold => "Bold",
        })
    }
}

/// Concrete font used for measurement and rendering.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    /// Numeric CSS weight (100..=900).
    pub weight: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub font_family: String,
    pub weight_light: u16,
    pub weight_normal: u16,
    pub weight_bold: u16,
    /// Base spacing unit in px; padding and radius are multiples of it.
    pub grid_unit: f64,
    /// Line box height as a multiple of the font size.
    pub line_height: f64,
    pub text_color: String,
    pub background: String,
    pub error_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            font_family: "Inter, Helvetica, Arial, sans-serif".to_string(),
            weight_light: 200,
            weight_normal: 400,
            weight_bold: 600,
            grid_unit: 4.0,
            line_height: 1.25,
            text_color: "#484848".to_string(),
            background: "transparent".to_string(),
            error_color: "#e04355".to_string(),
        }
    }
}

impl Theme {
    pub fn weight(&self, weight: FontWeight) -> u16 {
        match weight {
            FontWeight::Light => self.weight_light,
            FontWeight::Normal => self.weight_normal,
            FontWeight::Bold => self.weight_bold,
        }
    }

    pub fn font(&self, weight: FontWeight) -> FontSpec {
        FontSpec {
            family: self.font_family.clone(),
            weight: self.weight(weight),
        }
    }

    pub fn padding(&self) -> f64 {
        self.grid_unit * 4.0
    }

    pub fn border_radius(&self) -> f64 {
        self.grid_unit * 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacing_follows_grid_unit() {
        let theme = Theme {
            grid_unit: 5.0,
            ..Theme::default()
        };
        assert_eq!(theme.padding(), 20.0);
        assert_eq!(theme.border_radius(), 10.0);
    }

    #[test]
    fn partial_theme_json_fills_defaults() {
        let theme: Theme = serde_json::from_str(r#"{ "font_family": "Roboto" }"#).unwrap();
        assert_eq!(theme.font(FontWeight::Bold).family, "Roboto");
        assert_eq!(theme.weight(FontWeight::Light), 200);
    }
}
