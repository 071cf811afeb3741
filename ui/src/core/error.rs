//! Error kinds surfaced by the KPI core.

use thiserror::Error;

/// Which side of the comparison a result set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Current,
    Previous,
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Period::Current => "current",
            Period::Previous => "previous",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum KpiError {
    /// Selected metric index does not resolve to a column in a result set.
    #[error("metric #{index} not found in {period} result set ({available} metric column(s))")]
    MetricNotFound {
        index: usize,
        period: Period,
        available: usize,
    },

    /// A result set returned no rows where one aggregate row is expected.
    #[error("{0} result set is empty")]
    EmptyResultSet(Period),

    /// Custom comparison mode was chosen without an explicit window.
    #[error("custom comparison selected but no comparison window was supplied")]
    UnresolvedCustomWindow,

    #[error("invalid time range: {0}")]
    InvalidTimeRange(String),

    #[error("invalid number format `{0}`")]
    InvalidFormat(String),

    #[error("invalid chart configuration: {0}")]
    Config(String),

    #[error("control panel manifest is inconsistent: {0}")]
    Schema(String),

    #[error("unable to load font: {0}")]
    FontLoad(String),
}

pub type Result<T> = std::result::Result<T, KpiError>;

impl From<serde_json::Error> for KpiError {
    fn from(err: serde_json::Error) -> Self {
        KpiError::Config(err.to_string())
    }
}
