//! Platform-agnostic KPI logic: data model, comparison maths, windows,
//! formatting and configuration.

pub mod comparison;
pub mod config;
pub mod error;
pub mod format;
pub mod rows;
pub mod schema;
pub mod theme;
pub mod window;

pub use error::{KpiError, Result};
