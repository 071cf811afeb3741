//! Tabular query results as handed over by the host query pipeline.
//!
//! A result set carries its metric columns in query order (the order the
//! metrics were selected in) plus the rows themselves. Rows are keyed by
//! metric label; every row of a set shares the same key set.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single cell: either a finite number or nothing.
///
/// Anything that is not a finite number on the wire (`null`, booleans,
/// non-numeric strings, `NaN`/`Infinity`) collapses to `Null` instead of
/// failing the whole payload.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Cell {
    Number(f64),
    #[default]
    Null,
}

impl Cell {
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() {
            Cell::Number(value)
        } else {
            Cell::Null
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Cell::Number(value) if value.is_finite() => Some(value),
            _ => None,
        }
    }

    fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map(Cell::from_f64).unwrap_or(Cell::Null),
            // Decimal columns are frequently serialized as strings by SQL drivers.
            serde_json::Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Cell::from_f64)
                .unwrap_or(Cell::Null),
            _ => Cell::Null,
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::from_f64(value)
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map(Cell::from_f64).unwrap_or(Cell::Null)
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_f64() {
            Some(value) => serializer.serialize_f64(value),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(Cell::from_json(&raw))
    }
}

pub type Row = BTreeMap<String, Cell>;

/// Rows for one time window plus the ordered metric columns they carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn new<I, S>(metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            metrics: metrics.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row given as `(label, value)` pairs.
    pub fn with_row<I, S, C>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = (S, C)>,
        S: Into<String>,
        C: Into<Cell>,
    {
        self.rows
            .push(cells.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Label of the metric at `index`, when the column exists.
    pub fn metric_label(&self, index: usize) -> Option<&str> {
        self.metrics.get(index).map(String::as_str)
    }
}

/// Both windows of a period-over-period query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryData {
    pub current: ResultSet,
    pub previous: ResultSet,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_numeric_cells_collapse_to_null() {
        let set: ResultSet = serde_json::from_value(json!({
            "metrics": ["a", "b", "c", "d"],
            "rows": [{ "a": 1.5, "b": null, "c": "n/a", "d": true }]
        }))
        .unwrap();
        let row = &set.rows[0];
        assert_eq!(row["a"], Cell::Number(1.5));
        assert_eq!(row["b"], Cell::Null);
        assert_eq!(row["c"], Cell::Null);
        assert_eq!(row["d"], Cell::Null);
    }

    #[test]
    fn decimal_strings_are_numeric() {
        let cell: Cell = serde_json::from_value(json!(" 42.25 ")).unwrap();
        assert_eq!(cell.as_f64(), Some(42.25));
    }

    #[test]
    fn non_finite_values_are_null() {
        assert_eq!(Cell::from(f64::NAN), Cell::Null);
        assert_eq!(Cell::from(f64::INFINITY).as_f64(), None);
    }

    #[test]
    fn builder_keeps_metric_order() {
        let set = ResultSet::new(["sum__sales", "count"]).with_row([("sum__sales", 3.0)]);
        assert_eq!(set.metric_label(0), Some("sum__sales"));
        assert_eq!(set.metric_label(1), Some("count"));
        assert_eq!(set.metric_label(2), None);
        assert!(!set.is_empty());
    }
}
