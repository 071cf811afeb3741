//! Shared UI crate for the period-over-period KPI chart. Core logic, layout
//! and the Dioxus views live here; the `web` and `desktop` crates only host them.

pub mod chart;
pub mod core;
pub mod i18n;
pub mod views;

pub use chart::{render_kpi, BoxDimensions, PopKpi, RenderTree};
pub use core::comparison::{extract, ComparisonFigures};
pub use core::config::KpiConfig;
pub use core::window::{resolve, ComparisonMode, TimeRange};
