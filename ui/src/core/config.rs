//! Chart configuration as persisted by the host (form data).
//!
//! Keys mirror the host's snake_case form-data names so a saved chart can be
//! deserialized directly. Everything is optional on the wire and falls back
//! to the defaults below; the control panel's font-size defaults are the same
//! fractional budgets, so an empty form and a fresh manifest render alike.
//! No validation of user choices happens here; the control panel owns that.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::error::Result;
use super::format::{CurrencyFormat, NumberFormat};
use super::window::{self, ComparisonMode, TimeRange};

/// Default big-number budget: 40 % of the padded height.
pub const DEFAULT_HEADER_BUDGET: f64 = 0.4;
/// Default comparison-row budget: 15 % of the padded height.
pub const DEFAULT_SUBHEADER_BUDGET: f64 = 0.15;

/// Share of the container given to a text element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FontSizeBudget {
    /// Fraction of the padded container height (defaults 0.4 / 0.15).
    Fraction(f64),
    /// Fixed pixel cap picked from the control's size choices.
    Pixels(u32),
}

impl FontSizeBudget {
    /// Interpret a raw control value: `<= 1` is a fraction, anything above is px.
    pub fn from_control_value(value: f64) -> Self {
        if value.is_finite() && value > 1.0 {
            FontSizeBudget::Pixels(value.round() as u32)
        } else if value.is_finite() && value > 0.0 {
            FontSizeBudget::Fraction(value)
        } else {
            FontSizeBudget::Fraction(0.0)
        }
    }

    pub fn control_value(&self) -> f64 {
        match *self {
            FontSizeBudget::Fraction(fraction) => fraction,
            FontSizeBudget::Pixels(px) => f64::from(px),
        }
    }

    /// Height available to the element inside a container of `height` px.
    pub fn region_height(&self, height: f64, line_height: f64) -> f64 {
        match *self {
            FontSizeBudget::Fraction(fraction) => height * fraction,
            FontSizeBudget::Pixels(px) => (f64::from(px) * line_height).min(height),
        }
    }

    /// Upper bound for the fitted size given the configured maximum.
    pub fn size_cap(&self, max_font_size: u32) -> u32 {
        match *self {
            FontSizeBudget::Fraction(_) => max_font_size,
            FontSizeBudget::Pixels(px) => px.min(max_font_size),
        }
    }
}

impl Serialize for FontSizeBudget {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.control_value())
    }
}

impl<'de> Deserialize<'de> for FontSizeBudget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        f64::deserialize(deserializer).map(FontSizeBudget::from_control_value)
    }
}

/// One adhoc filter as stored by the host's filter control.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdhocFilter {
    pub expression_type: Option<String>,
    pub subject: Option<String>,
    pub operator: Option<String>,
    pub comparator: Option<Value>,
    pub clause: Option<String>,
}

impl AdhocFilter {
    pub const TEMPORAL_RANGE: &'static str = "TEMPORAL_RANGE";

    /// A `start : end` window carried by a temporal-range filter.
    pub fn temporal_range(&self) -> Option<&str> {
        if self.operator.as_deref() != Some(Self::TEMPORAL_RANGE) {
            return None;
        }
        self.comparator.as_ref().and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiConfig {
    /// Selected metrics: saved-metric names or adhoc metric objects.
    pub metrics: Vec<Value>,
    /// Which selected metric is displayed; the rest are ignored.
    pub metric_index: usize,
    pub header_font_size: FontSizeBudget,
    pub subheader_font_size: FontSizeBudget,
    pub bold_text: bool,
    pub y_axis_format: NumberFormat,
    pub percent_format: NumberFormat,
    #[serde(deserialize_with = "currency_or_none")]
    pub currency_format: Option<CurrencyFormat>,
    pub time_comparison: ComparisonMode,
    pub time_range: Option<String>,
    pub adhoc_custom: Vec<AdhocFilter>,
    pub row_limit: Option<u32>,
    /// Let comparison cells clip instead of shrinking to their column.
    pub clip_comparison_overflow: bool,
    pub min_font_size: u32,
    pub max_font_size: u32,
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self {
            metrics: Vec::new(),
            metric_index: 0,
            header_font_size: FontSizeBudget::Fraction(DEFAULT_HEADER_BUDGET),
            subheader_font_size: FontSizeBudget::Fraction(DEFAULT_SUBHEADER_BUDGET),
            bold_text: false,
            y_axis_format: NumberFormat::Smart,
            percent_format: NumberFormat::percent(),
            currency_format: None,
            time_comparison: ComparisonMode::Year,
            time_range: None,
            adhoc_custom: Vec::new(),
            row_limit: None,
            clip_comparison_overflow: true,
            min_font_size: 8,
            max_font_size: 256,
        }
    }
}

impl KpiConfig {
    pub fn from_form_data(form_data: &Value) -> Result<Self> {
        Ok(serde_json::from_value(form_data.clone())?)
    }

    /// Labels of the selected metrics in selection order.
    pub fn metric_labels(&self) -> Vec<String> {
        self.metrics
            .iter()
            .filter_map(|metric| match metric {
                Value::String(name) => Some(name.clone()),
                Value::Object(obj) => obj.get("label").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .collect()
    }

    /// `(min, max)` with `min <= max` guaranteed.
    pub fn font_bounds(&self) -> (u32, u32) {
        let min = self.min_font_size.max(1);
        (min, self.max_font_size.max(min))
    }
}

/// The host stores an unset currency as `{}` or `{"symbol": null}`.
fn currency_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<CurrencyFormat>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    match raw {
        Some(Value::Object(obj))
            if obj
                .get("symbol")
                .and_then(Value::as_str)
                .is_some_and(|s| !s.trim().is_empty()) =>
        {
            serde_json::from_value(Value::Object(obj))
                .map(Some)
                .map_err(serde::de::Error::custom)
        }
        _ => Ok(None),
    }
}

/// Everything the query pipeline needs to fetch the previous series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonRequest {
    pub mode: ComparisonMode,
    pub primary: TimeRange,
    pub custom: Option<TimeRange>,
}

impl ComparisonRequest {
    /// Build from form data: `time_range` is the primary window; in custom mode
    /// the first temporal-range filter of `adhoc_custom` supplies the previous one.
    pub fn from_config(config: &KpiConfig) -> Result<Self> {
        let primary = TimeRange::parse(config.time_range.as_deref().unwrap_or_default())?;
        let custom = match config.time_comparison {
            ComparisonMode::Custom => config
                .adhoc_custom
                .iter()
                .find_map(AdhocFilter::temporal_range)
                .map(TimeRange::parse)
                .transpose()?,
            _ => None,
        };

        Ok(Self {
            mode: config.time_comparison,
            primary,
            custom,
        })
    }

    pub fn previous_window(&self) -> Result<TimeRange> {
        window::resolve(self.mode, self.primary, self.custom)
    }
}
