//! Sizing, layout and rendering of the KPI tile.

pub mod fit;
pub mod fonts;
pub mod layout;
pub mod tree;

mod view;
pub use view::PopKpi;

pub use fit::{fit_font_size, FitBox, SizeBounds};
pub use fonts::{CachedMeasure, HeuristicMeasure, TextExtent, TextMeasure};
pub use layout::{compose, compose_error, render_kpi, BoxDimensions};
pub use tree::{NodeRole, RenderNode, RenderTree};
