//! Text measurement backends for the sizing engine.
//!
//! Measuring rendered text is the host's business; the sizing engine only
//! needs width/height for a string at a candidate size. Backends:
//!
//! 1. [`HeuristicMeasure`] (always available): per-glyph advance ratios tuned
//!    for Inter-like sans faces. Deterministic and dependency free, so it is
//!    the default for native builds and for tests.
//! 2. [`FontdueMeasure`] behind the `font_metrics` feature: real advances
//!    from a TTF/OTF loaded with `fontdue`.
//! 3. [`CanvasMeasure`] on wasm32: the browser's `measureText`, i.e. the same
//!    metrics the DOM will use when the tree is painted.
//!
//! NOTE on vertical metrics
//! ------------------------
//! All backends report height as `size * line_height` rather than the ink
//! box of the specific string. That keeps a row of mixed strings on one
//! baseline rhythm and makes height independent of the glyphs involved.
//!
//! Backends must be monotonic in size (bigger size, never smaller extent);
//! the binary search in `fit` relies on it.

use std::cell::RefCell;
use std::collections::HashMap;

#[cfg(feature = "font_metrics")]
use crate::core::error::{KpiError, Result};
use crate::core::theme::FontSpec;

/// Line box height as a multiple of the font size when none is configured.
pub const DEFAULT_LINE_HEIGHT: f64 = 1.25;

/// Rendered footprint of a string.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextExtent {
    pub width: f64,
    pub height: f64,
}

/// Host text-measurement capability.
pub trait TextMeasure {
    fn measure(&self, text: &str, font: &FontSpec, size_px: u32) -> TextExtent;
}

impl<M: TextMeasure + ?Sized> TextMeasure for &M {
    fn measure(&self, text: &str, font: &FontSpec, size_px: u32) -> TextExtent {
        (**self).measure(text, font, size_px)
    }
}

/// Glyph-class advance approximation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeuristicMeasure {
    pub line_height: f64,
}

impl Default for HeuristicMeasure {
    fn default() -> Self {
        Self {
            line_height: DEFAULT_LINE_HEIGHT,
        }
    }
}

impl HeuristicMeasure {
    /// Advance width of `ch` in ems for a regular weight.
    fn advance_em(ch: char) -> f64 {
        match ch {
            ' ' => 0.28,
            '.' | ',' | ':' | ';' | '\'' | '|' | '!' | 'i' | 'j' | 'l' | 'I' => 0.28,
            'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' => 0.36,
            '0'..='9' => 0.62,
            '%' => 0.86,
            '#' | '$' | '€' | '£' | '¥' | '+' | '=' | '<' | '>' => 0.64,
            'm' | 'w' | 'M' | 'W' | '—' => 0.92,
            'A'..='Z' | 'Δ' => 0.70,
            c if c.is_ascii_lowercase() => 0.56,
            c if c.is_whitespace() => 0.28,
            // CJK and other wide scripts.
            c if (c as u32) >= 0x2E80 => 1.0,
            _ => 0.62,
        }
    }

    /// Bolder faces run wider; 400 is the baseline.
    fn weight_factor(weight: u16) -> f64 {
        1.0 + (f64::from(weight.clamp(100, 900)) - 400.0) / 500.0 * 0.08
    }
}

impl TextMeasure for HeuristicMeasure {
    fn measure(&self, text: &str, font: &FontSpec, size_px: u32) -> TextExtent {
        let size = f64::from(size_px);
        let ems: f64 = text.chars().map(Self::advance_em).sum();
        TextExtent {
            width: ems * size * Self::weight_factor(font.weight),
            height: if text.is_empty() {
                0.0
            } else {
                size * self.line_height
            },
        }
    }
}

/// Measurements backed by a parsed font file.
#[cfg(feature = "font_metrics")]
pub struct FontdueMeasure {
    font: fontdue::Font,
    line_height: f64,
}

#[cfg(feature = "font_metrics")]
impl FontdueMeasure {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|err| KpiError::FontLoad(err.to_string()))?;
        Ok(Self {
            font,
            line_height: DEFAULT_LINE_HEIGHT,
        })
    }

    pub fn with_line_height(mut self, line_height: f64) -> Self {
        self.line_height = line_height;
        self
    }
}

#[cfg(feature = "font_metrics")]
impl TextMeasure for FontdueMeasure {
    fn measure(&self, text: &str, font: &FontSpec, size_px: u32) -> TextExtent {
        let size = size_px as f32;
        let advance: f32 = text
            .chars()
            .map(|ch| self.font.metrics(ch, size).advance_width)
            .sum();
        // A single variable face covers every weight; widen synthetically.
        let factor = HeuristicMeasure::weight_factor(font.weight);
        TextExtent {
            width: f64::from(advance) * factor,
            height: if text.is_empty() {
                0.0
            } else {
                f64::from(size_px) * self.line_height
            },
        }
    }
}

/// Browser canvas `measureText`.
#[cfg(target_arch = "wasm32")]
pub struct CanvasMeasure {
    context: web_sys::CanvasRenderingContext2d,
    line_height: f64,
}

#[cfg(target_arch = "wasm32")]
impl CanvasMeasure {
    /// Create an off-screen canvas; `None` outside a document.
    pub fn new() -> Option<Self> {
        use wasm_bindgen::JsCast;

        let document = web_sys::window()?.document()?;
        let canvas: web_sys::HtmlCanvasElement =
            document.create_element("canvas").ok()?.dyn_into().ok()?;
        let context = canvas
            .get_context("2d")
            .ok()??
            .dyn_into::<web_sys::CanvasRenderingContext2d>()
            .ok()?;
        Some(Self {
            context,
            line_height: DEFAULT_LINE_HEIGHT,
        })
    }
}

#[cfg(target_arch = "wasm32")]
impl TextMeasure for CanvasMeasure {
    fn measure(&self, text: &str, font: &FontSpec, size_px: u32) -> TextExtent {
        self.context
            .set_font(&format!("{} {}px {}", font.weight, size_px, font.family));
        let width = self
            .context
            .measure_text(text)
            .map(|metrics| metrics.width())
            .unwrap_or_else(|_| HeuristicMeasure::default().measure(text, font, size_px).width);
        TextExtent {
            width,
            height: if text.is_empty() {
                0.0
            } else {
                f64::from(size_px) * self.line_height
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct MeasureKey {
    family: String,
    weight: u16,
    size_px: u32,
    text: String,
}

/// Memoizing wrapper. Keys include family, weight, size and text so a cached
/// extent is never reused for a different font or string.
///
/// Scope one instance to a render pass; it is not `Sync`.
pub struct CachedMeasure<M> {
    inner: M,
    cache: RefCell<HashMap<MeasureKey, TextExtent>>,
}

impl<M: TextMeasure> CachedMeasure<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl<M: TextMeasure> TextMeasure for CachedMeasure<M> {
    fn measure(&self, text: &str, font: &FontSpec, size_px: u32) -> TextExtent {
        let key = MeasureKey {
            family: font.family.clone(),
            weight: font.weight,
            size_px,
            text: text.to_string(),
        };
        if let Some(extent) = self.cache.borrow().get(&key) {
            return *extent;
        }
        let extent = self.inner.measure(text, font, size_px);
        self.cache.borrow_mut().insert(key, extent);
        extent
    }
}

/// The measurement backend for the current platform.
pub fn platform_measure() -> Box<dyn TextMeasure> {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(canvas) = CanvasMeasure::new() {
            // The search re-measures the same strings at neighbouring sizes.
            return Box::new(CachedMeasure::new(canvas));
        }
    }
    Box::new(HeuristicMeasure::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn font(weight: u16) -> FontSpec {
        FontSpec {
            family: "Inter".into(),
            weight,
        }
    }

    #[test]
    fn extent_grows_with_size() {
        let m = HeuristicMeasure::default();
        let small = m.measure("12,345", &font(400), 12);
        let large = m.measure("12,345", &font(400), 48);
        assert!(large.width > small.width);
        assert!(large.height > small.height);
    }

    #[test]
    fn bold_runs_wider_than_light() {
        let m = HeuristicMeasure::default();
        let light = m.measure("1.2k", &font(200), 40);
        let bold = m.measure("1.2k", &font(600), 40);
        assert!(bold.width > light.width);
        assert_eq!(bold.height, light.height);
    }

    #[test]
    fn empty_text_has_no_extent() {
        let extent = HeuristicMeasure::default().measure("", &font(400), 30);
        assert_eq!(extent, TextExtent { width: 0.0, height: 0.0 });
    }

    struct Counting {
        calls: Cell<usize>,
    }

    impl TextMeasure for Counting {
        fn measure(&self, text: &str, font: &FontSpec, size_px: u32) -> TextExtent {
            self.calls.set(self.calls.get() + 1);
            HeuristicMeasure::default().measure(text, font, size_px)
        }
    }

    #[test]
    fn cache_keys_include_font_and_size() {
        let cached = CachedMeasure::new(Counting { calls: Cell::new(0) });
        let a = cached.measure("120", &font(400), 20);
        let b = cached.measure("120", &font(400), 20);
        assert_eq!(a, b);
        assert_eq!(cached.inner.calls.get(), 1);

        cached.measure("120", &font(600), 20);
        cached.measure("120", &font(400), 21);
        cached.measure("121", &font(400), 20);
        cached.measure(
            "120",
            &FontSpec {
                family: "Roboto".into(),
                weight: 400,
            },
            20,
        );
        assert_eq!(cached.inner.calls.get(), 5);
        assert_eq!(cached.cached_entries(), 5);
    }
}
