//! Largest-font-that-fits search.
//!
//! Binary search over integer pixel sizes in `[min, max]`. A size is feasible
//! when the measured text fits the box on both axes. Feasibility is monotone
//! in size for every backend in [`fonts`](super::fonts), so the search finds
//! the largest feasible size in `O(log(max - min))` measurements. When nothing
//! fits the result is `min`: a tile always renders something.

use serde::{Deserialize, Serialize};

use super::fonts::TextMeasure;
use crate::core::theme::FontSpec;

/// Box the text has to fit in, in px.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitBox {
    pub max_width: f64,
    pub max_height: f64,
}

impl FitBox {
    pub fn new(max_width: f64, max_height: f64) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    fn is_degenerate(&self) -> bool {
        // NaN never compares > 0, so it is caught here too.
        !(self.max_width > 0.0 && self.max_height > 0.0)
    }
}

/// Inclusive pixel-size bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBounds {
    pub min: u32,
    pub max: u32,
}

impl SizeBounds {
    /// Bounds with `min <= max` (an inverted pair collapses onto `min`).
    pub fn new(min: u32, max: u32) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }
}

pub fn fit_font_size(
    text: &str,
    fit: FitBox,
    font: &FontSpec,
    bounds: SizeBounds,
    measure: &dyn TextMeasure,
) -> u32 {
    let SizeBounds { min, max } = SizeBounds::new(bounds.min, bounds.max);

    if text.is_empty() {
        return max;
    }
    if fit.is_degenerate() {
        return min;
    }

    let fits = |size: u32| {
        let extent = measure.measure(text, font, size);
        extent.width <= fit.max_width && extent.height <= fit.max_height
    };

    let mut best = None;
    let (mut lo, mut hi) = (min, max);
    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        if fits(mid) {
            best = Some(mid);
            lo = mid + 1;
        } else if mid == 0 {
            break;
        } else {
            hi = mid - 1;
        }
    }

    match best {
        Some(size) => {
            tracing::trace!(text, size, max_width = fit.max_width, max_height = fit.max_height, "fitted text");
            size
        }
        None => {
            tracing::debug!(text, min, "text does not fit at minimum size; clipping");
            min
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::fonts::{HeuristicMeasure, TextExtent};

    /// Each glyph is exactly `size` wide and one `size` tall.
    struct Square;

    impl TextMeasure for Square {
        fn measure(&self, text: &str, _font: &FontSpec, size_px: u32) -> TextExtent {
            TextExtent {
                width: text.chars().count() as f64 * f64::from(size_px),
                height: f64::from(size_px),
            }
        }
    }

    fn font() -> FontSpec {
        FontSpec {
            family: "Inter".into(),
            weight: 400,
        }
    }

    #[test]
    fn picks_largest_size_that_fits_width() {
        // 4 glyphs in 100px -> 25px.
        let size = fit_font_size("1234", FitBox::new(100.0, 1000.0), &font(), SizeBounds::new(1, 200), &Square);
        assert_eq!(size, 25);
    }

    #[test]
    fn height_can_be_the_binding_axis() {
        let size = fit_font_size("12", FitBox::new(1000.0, 33.5), &font(), SizeBounds::new(1, 200), &Square);
        assert_eq!(size, 33);
    }

    #[test]
    fn clamps_to_max() {
        let size = fit_font_size("1", FitBox::new(1e6, 1e6), &font(), SizeBounds::new(8, 60), &Square);
        assert_eq!(size, 60);
    }

    #[test]
    fn infeasible_returns_min() {
        let size = fit_font_size("123456789", FitBox::new(10.0, 10.0), &font(), SizeBounds::new(8, 60), &Square);
        assert_eq!(size, 8);
    }

    #[test]
    fn empty_text_returns_max_without_measuring() {
        struct Panics;
        impl TextMeasure for Panics {
            fn measure(&self, _: &str, _: &FontSpec, _: u32) -> TextExtent {
                panic!("should not measure");
            }
        }
        assert_eq!(fit_font_size("", FitBox::new(10.0, 10.0), &font(), SizeBounds::new(8, 60), &Panics), 60);
    }

    #[test]
    fn degenerate_boxes_return_min() {
        for fit in [
            FitBox::new(0.0, 100.0),
            FitBox::new(-5.0, 100.0),
            FitBox::new(100.0, 0.0),
            FitBox::new(f64::NAN, 100.0),
        ] {
            assert_eq!(fit_font_size("42", fit, &font(), SizeBounds::new(8, 60), &Square), 8);
        }
    }

    #[test]
    fn zero_minimum_does_not_underflow() {
        let size = fit_font_size("1234", FitBox::new(0.5, 0.5), &font(), SizeBounds::new(0, 10), &Square);
        assert_eq!(size, 0);
    }

    #[test]
    fn inverted_bounds_collapse_to_min() {
        let size = fit_font_size("1", FitBox::new(1e6, 1e6), &font(), SizeBounds::new(30, 10), &Square);
        assert_eq!(size, 30);
    }

    #[test]
    fn repeated_calls_agree() {
        let measure = HeuristicMeasure::default();
        let run = || {
            fit_font_size("$1,234.56", FitBox::new(240.0, 90.0), &font(), SizeBounds::new(8, 256), &measure)
        };
        let first = run();
        for _ in 0..10 {
            assert_eq!(run(), first);
        }
    }
}
