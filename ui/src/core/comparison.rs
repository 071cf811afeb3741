//! Reduction of the current/previous result sets to the four comparison figures.
//!
//! Only the first row of each set is read: the query pipeline is expected to
//! return a single aggregate row per window, and no cross-row aggregation
//! happens here. Likewise only one metric is shown; the caller picks it by
//! index and every other selected metric is ignored.

use serde::{Deserialize, Serialize};

use super::error::{KpiError, Period, Result};
use super::rows::{QueryData, ResultSet};

/// Current value, previous value and the two deltas between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonFigures {
    pub current: Option<f64>,
    pub previous: Option<f64>,
    pub absolute_delta: Option<f64>,
    /// Fraction, e.g. `0.15` for +15 %.
    pub percent_delta: Option<f64>,
}

impl ComparisonFigures {
    /// All figures missing; rendered as placeholders.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_values(current: Option<f64>, previous: Option<f64>) -> Self {
        let current = current.filter(|v| v.is_finite());
        let previous = previous.filter(|v| v.is_finite());

        let absolute_delta = match (current, previous) {
            (Some(c), Some(p)) => finite(c - p),
            _ => None,
        };

        let percent_delta = match (current, previous) {
            (Some(c), Some(p)) if p != 0.0 => finite((c - p) / p),
            _ => None,
        };

        Self {
            current,
            previous,
            absolute_delta,
            percent_delta,
        }
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Derive the comparison figures for the metric at `metric_index`.
///
/// Fails with [`KpiError::MetricNotFound`] when the index does not resolve in
/// either set, and with [`KpiError::EmptyResultSet`] when either set has no rows.
pub fn extract(
    current: &ResultSet,
    previous: &ResultSet,
    metric_index: usize,
) -> Result<ComparisonFigures> {
    let current_label = resolve_label(current, metric_index, Period::Current)?;
    let previous_label = resolve_label(previous, metric_index, Period::Previous)?;

    let current_value = first_value(current, current_label, metric_index, Period::Current)?;
    let previous_value = first_value(previous, previous_label, metric_index, Period::Previous)?;

    Ok(ComparisonFigures::from_values(current_value, previous_value))
}

/// Convenience over [`extract`] for a bundled query payload.
pub fn extract_query(data: &QueryData, metric_index: usize) -> Result<ComparisonFigures> {
    extract(&data.current, &data.previous, metric_index)
}

fn resolve_label(set: &ResultSet, index: usize, period: Period) -> Result<&str> {
    set.metric_label(index).ok_or(KpiError::MetricNotFound {
        index,
        period,
        available: set.metrics.len(),
    })
}

fn first_value(set: &ResultSet, label: &str, index: usize, period: Period) -> Result<Option<f64>> {
    let row = set.rows.first().ok_or(KpiError::EmptyResultSet(period))?;
    match row.get(label) {
        Some(cell) => Ok(cell.as_f64()),
        // The column list names it but the row schema doesn't carry it.
        None => Err(KpiError::MetricNotFound {
            index,
            period,
            available: set.metrics.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rows::Cell;

    fn single(label: &str, value: impl Into<Cell>) -> ResultSet {
        let cell: Cell = value.into();
        ResultSet::new([label]).with_row([(label, cell)])
    }

    #[test]
    fn figures_for_simple_growth() {
        let figures = extract(&single("metricA", 120.0), &single("metricA", 100.0), 0).unwrap();
        assert_eq!(
            figures,
            ComparisonFigures {
                current: Some(120.0),
                previous: Some(100.0),
                absolute_delta: Some(20.0),
                percent_delta: Some(0.2),
            }
        );
    }

    #[test]
    fn zero_previous_has_no_percent() {
        let figures = extract(&single("metricA", 37.5), &single("metricA", 0.0), 0).unwrap();
        assert_eq!(figures.absolute_delta, Some(37.5 - 0.0));
        assert_eq!(figures.percent_delta, None);
    }

    #[test]
    fn null_previous_has_no_deltas() {
        let figures = extract(&single("m", 5.0), &single("m", Cell::Null), 0).unwrap();
        assert_eq!(figures.current, Some(5.0));
        assert_eq!(figures.previous, None);
        assert_eq!(figures.absolute_delta, None);
        assert_eq!(figures.percent_delta, None);
    }

    #[test]
    fn null_current_keeps_previous() {
        let figures = extract(&single("m", Cell::Null), &single("m", 8.0), 0).unwrap();
        assert_eq!(figures.previous, Some(8.0));
        assert_eq!(figures.absolute_delta, None);
        assert_eq!(figures.percent_delta, None);
    }

    #[test]
    fn only_first_row_and_indexed_metric_are_used() {
        let current = ResultSet::new(["a", "b"])
            .with_row([("a", 1.0), ("b", 10.0)])
            .with_row([("a", 999.0), ("b", 999.0)]);
        let previous = ResultSet::new(["a", "b"]).with_row([("a", 2.0), ("b", 5.0)]);

        let figures = extract(&current, &previous, 1).unwrap();
        assert_eq!(figures.current, Some(10.0));
        assert_eq!(figures.previous, Some(5.0));
        assert_eq!(figures.percent_delta, Some(1.0));
    }

    #[test]
    fn index_out_of_range_in_previous_is_reported() {
        let current = ResultSet::new(["a", "b"]).with_row([("a", 1.0), ("b", 2.0)]);
        let previous = single("a", 1.0);
        let err = extract(&current, &previous, 1).unwrap_err();
        assert_eq!(
            err,
            KpiError::MetricNotFound {
                index: 1,
                period: Period::Previous,
                available: 1,
            }
        );
    }

    #[test]
    fn empty_sets_are_reported() {
        let empty = ResultSet::new(["a"]);
        let err = extract(&single("a", 1.0), &empty, 0).unwrap_err();
        assert_eq!(err, KpiError::EmptyResultSet(Period::Previous));

        let err = extract(&empty, &single("a", 1.0), 0).unwrap_err();
        assert_eq!(err, KpiError::EmptyResultSet(Period::Current));
    }

    #[test]
    fn column_missing_from_row_is_not_found() {
        let current = ResultSet::new(["a"]).with_row([("other", 1.0)]);
        let err = extract(&current, &single("a", 1.0), 0).unwrap_err();
        assert!(matches!(err, KpiError::MetricNotFound { period: Period::Current, .. }));
    }

    #[test]
    fn negative_change_is_negative_fraction() {
        let figures = ComparisonFigures::from_values(Some(75.0), Some(100.0));
        assert_eq!(figures.absolute_delta, Some(-25.0));
        assert_eq!(figures.percent_delta, Some(-0.25));
    }
}
