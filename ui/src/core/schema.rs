//! Control-panel manifest for the KPI chart.
//!
//! A static description of the fields the host configuration UI renders and
//! persists. It is plain data: the core never reads it at render time. The
//! only contract is that the form data it produces deserializes into
//! [`KpiConfig`](super::config::KpiConfig).
//!
//! The manifest is checked once when loaded (`ControlPanel::load`) so a
//! broken default or duplicated field name fails loudly instead of producing
//! form data the chart can't read.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::config::{DEFAULT_HEADER_BUDGET, DEFAULT_SUBHEADER_BUDGET};
use super::error::{KpiError, Result};
use super::window::ComparisonMode;
use crate::t;

/// Pixel caps offered for the big number and the comparison row. Each select
/// also offers a "fit to box" choice carrying the fractional budget, which is
/// the default so a fresh chart matches `KpiConfig::default()`.
pub const FONT_SIZE_CHOICES: [u32; 5] = [16, 20, 26, 32, 40];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub value: Value,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Validator {
    NonEmpty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlKind {
    TimeRange,
    Groupby,
    Metrics,
    AdhocFilters,
    Select { choices: Vec<Choice> },
    RowLimit,
    NumberFormat,
    CurrencyFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlField {
    pub name: &'static str,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub kind: ControlKind,
    pub default: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
    /// Re-render without re-querying when the value changes.
    pub render_trigger: bool,
    pub clearable: bool,
}

impl ControlField {
    fn new(name: &'static str, label: String, kind: ControlKind) -> Self {
        Self {
            name,
            label,
            description: None,
            kind,
            default: Value::Null,
            validators: Vec::new(),
            render_trigger: false,
            clearable: true,
        }
    }

    fn describe(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    fn default_value(mut self, default: Value) -> Self {
        self.default = default;
        self
    }

    fn required(mut self) -> Self {
        self.validators.push(Validator::NonEmpty);
        self
    }

    fn render_only(mut self) -> Self {
        self.render_trigger = true;
        self.clearable = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlSection {
    pub label: String,
    pub expanded: bool,
    pub rows: Vec<Vec<ControlField>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlPanel {
    pub sections: Vec<ControlSection>,
}

impl ControlPanel {
    /// Build the localized manifest and check it.
    pub fn load() -> Result<Self> {
        crate::i18n::init();
        let panel = Self::build();
        panel.validate()?;
        Ok(panel)
    }

    fn build() -> Self {
        let comparison_choices = ComparisonMode::ALL
            .into_iter()
            .map(|mode| Choice {
                value: json!(mode.code()),
                label: comparison_label(mode),
            })
            .collect();

        let time = ControlSection {
            label: t!("section-time"),
            expanded: true,
            rows: vec![vec![ControlField::new(
                "time_range",
                t!("control-time-range"),
                ControlKind::TimeRange,
            )
            .describe(t!("control-time-range-description"))]],
        };

        let query = ControlSection {
            label: t!("section-query"),
            expanded: true,
            rows: vec![
                vec![ControlField::new("cols", t!("control-columns"), ControlKind::Groupby)
                    .describe(t!("control-columns-description"))
                    .default_value(json!([]))],
                vec![
                    ControlField::new("metrics", t!("control-metrics"), ControlKind::Metrics)
                        .describe(t!("control-metrics-description"))
                        .default_value(json!([]))
                        .required(),
                ],
                vec![ControlField::new(
                    "adhoc_filters",
                    t!("control-filters"),
                    ControlKind::AdhocFilters,
                )
                .default_value(json!([]))],
                vec![ControlField::new(
                    "time_comparison",
                    t!("control-time-comparison"),
                    ControlKind::Select {
                        choices: comparison_choices,
                    },
                )
                .default_value(json!(ComparisonMode::default().code()))],
                vec![
                    ControlField::new("row_limit", t!("control-row-limit"), ControlKind::RowLimit)
                        .default_value(json!(10_000)),
                ],
            ],
        };

        let custom = ControlSection {
            label: t!("section-custom-time-range"),
            expanded: true,
            rows: vec![vec![ControlField::new(
                "adhoc_custom",
                t!("control-adhoc-custom"),
                ControlKind::AdhocFilters,
            )
            .describe(t!("control-adhoc-custom-description"))
            .default_value(json!([]))]],
        };

        let options = ControlSection {
            label: t!("section-chart-options"),
            expanded: true,
            rows: vec![
                vec![ControlField::new(
                    "y_axis_format",
                    t!("control-number-format"),
                    ControlKind::NumberFormat,
                )
                .default_value(json!("SMART_NUMBER"))],
                vec![ControlField::new(
                    "currency_format",
                    t!("control-currency-format"),
                    ControlKind::CurrencyFormat,
                )],
                vec![ControlField::new(
                    "header_font_size",
                    t!("control-header-font-size"),
                    ControlKind::Select {
                        choices: font_size_choices(DEFAULT_HEADER_BUDGET),
                    },
                )
                .describe(t!("control-header-font-size-description"))
                .default_value(json!(DEFAULT_HEADER_BUDGET))
                .render_only()],
                vec![ControlField::new(
                    "subheader_font_size",
                    t!("control-subheader-font-size"),
                    ControlKind::Select {
                        choices: font_size_choices(DEFAULT_SUBHEADER_BUDGET),
                    },
                )
                .describe(t!("control-subheader-font-size-description"))
                .default_value(json!(DEFAULT_SUBHEADER_BUDGET))
                .render_only()],
            ],
        };

        Self {
            sections: vec![time, query, custom, options],
        }
    }

    /// Reject manifests whose field names collide, whose select defaults are
    /// not among their choices, or whose labels are blank.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for field in self.fields() {
            if !seen.insert(field.name) {
                return Err(KpiError::Schema(format!("duplicate field `{}`", field.name)));
            }
            if field.label.trim().is_empty() {
                return Err(KpiError::Schema(format!("field `{}` has no label", field.name)));
            }
            if let ControlKind::Select { choices } = &field.kind {
                if choices.is_empty() {
                    return Err(KpiError::Schema(format!("select `{}` has no choices", field.name)));
                }
                let mut values = HashSet::new();
                for choice in choices {
                    if !values.insert(choice.value.to_string()) {
                        return Err(KpiError::Schema(format!(
                            "select `{}` repeats choice {}",
                            field.name, choice.value
                        )));
                    }
                }
                let default_ok = (field.clearable && field.default.is_null())
                    || choices.iter().any(|c| c.value == field.default);
                if !default_ok {
                    return Err(KpiError::Schema(format!(
                        "select `{}` default {} is not one of its choices",
                        field.name, field.default
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn fields(&self) -> impl Iterator<Item = &ControlField> {
        self.sections
            .iter()
            .flat_map(|section| section.rows.iter().flatten())
    }

    pub fn field(&self, name: &str) -> Option<&ControlField> {
        self.fields().find(|field| field.name == name)
    }

    /// Initial form data for a freshly created chart.
    pub fn defaults(&self) -> Value {
        let map: Map<String, Value> = self
            .fields()
            .filter(|field| !field.default.is_null())
            .map(|field| (field.name.to_string(), field.default.clone()))
            .collect();
        Value::Object(map)
    }
}

fn comparison_label(mode: ComparisonMode) -> String {
    match mode {
        ComparisonMode::Year => t!("comparison-year"),
        ComparisonMode::Week => t!("comparison-week"),
        ComparisonMode::Month => t!("comparison-month"),
        ComparisonMode::Range => t!("comparison-range"),
        ComparisonMode::Custom => t!("comparison-custom"),
    }
}

fn font_size_choices(fit_fraction: f64) -> Vec<Choice> {
    let fit = Choice {
        value: json!(fit_fraction),
        label: t!("font-size-fit"),
    };
    let labels = [
        t!("font-size-tiny"),
        t!("font-size-small"),
        t!("font-size-normal"),
        t!("font-size-large"),
        t!("font-size-huge"),
    ];
    std::iter::once(fit)
        .chain(FONT_SIZE_CHOICES.into_iter().zip(labels).map(|(px, label)| Choice {
            value: json!(px),
            label,
        }))
        .collect()
}
