use dioxus::prelude::*;
use serde_json::json;

use crate::chart::PopKpi;
use crate::core::config::{ComparisonRequest, KpiConfig};
use crate::core::rows::{QueryData, ResultSet};
use crate::core::schema::{ControlKind, ControlPanel};
use crate::i18n;

const SAMPLE_METRIC: &str = "SUM(revenue)";

fn sample_data() -> QueryData {
    QueryData {
        current: ResultSet::new([SAMPLE_METRIC]).with_row([(SAMPLE_METRIC, 1_284_500.0)]),
        previous: ResultSet::new([SAMPLE_METRIC]).with_row([(SAMPLE_METRIC, 1_092_300.0)]),
    }
}

/// Playground page: one KPI tile with live size and option controls.
#[component]
pub fn Dashboard() -> Element {
    i18n::init();

    let mut width = use_signal(|| 480.0_f64);
    let mut height = use_signal(|| 280.0_f64);
    let mut bold = use_signal(|| false);
    let mut clip = use_signal(|| true);
    let mut mode = use_signal(|| "y".to_string());

    let panel = use_memo(ControlPanel::load);
    let panel_error = panel().err().map(|err| err.to_string());

    let mode_choices = panel()
        .ok()
        .and_then(|p| match p.field("time_comparison").map(|f| f.kind.clone()) {
            Some(ControlKind::Select { choices }) => Some(choices),
            _ => None,
        })
        .unwrap_or_default();

    let config_result = KpiConfig::from_form_data(&json!({
        "metrics": [SAMPLE_METRIC],
        "bold_text": bold(),
        "clip_comparison_overflow": clip(),
        "time_comparison": mode(),
        "time_range": "2024-03-10 : 2024-03-20",
        "adhoc_custom": [{
            "expressionType": "SIMPLE",
            "subject": "order_date",
            "operator": "TEMPORAL_RANGE",
            "comparator": "2023-12-01 : 2023-12-11"
        }]
    }));

    let (config, window_line) = match config_result {
        Ok(config) => {
            let line = ComparisonRequest::from_config(&config)
                .and_then(|request| request.previous_window())
                .map(|window| window.to_string())
                .unwrap_or_else(|err| err.to_string());
            (config, line)
        }
        Err(err) => (KpiConfig::default(), err.to_string()),
    };

    let data = sample_data();

    rsx! {
        section { class: "page page-dashboard",
            h1 { {crate::t!("dashboard-title")} }
            p { {crate::t!("dashboard-intro")} }

            if let Some(err) = panel_error {
                p { class: "dashboard__error", "{err}" }
            }

            div { class: "dashboard__controls",
                label {
                    {crate::t!("dashboard-width")}
                    input {
                        r#type: "range",
                        min: "60",
                        max: "1200",
                        value: "{width}",
                        oninput: move |evt| {
                            if let Ok(v) = evt.value().parse::<f64>() {
                                width.set(v);
                            }
                        },
                    }
                }
                label {
                    {crate::t!("dashboard-height")}
                    input {
                        r#type: "range",
                        min: "40",
                        max: "800",
                        value: "{height}",
                        oninput: move |evt| {
                            if let Ok(v) = evt.value().parse::<f64>() {
                                height.set(v);
                            }
                        },
                    }
                }
                label {
                    input {
                        r#type: "checkbox",
                        checked: bold(),
                        onchange: move |evt| bold.set(evt.checked()),
                    }
                    {crate::t!("dashboard-bold")}
                }
                label {
                    input {
                        r#type: "checkbox",
                        checked: clip(),
                        onchange: move |evt| clip.set(evt.checked()),
                    }
                    {crate::t!("dashboard-clip")}
                }
                label {
                    {crate::t!("control-time-comparison")}
                    select {
                        onchange: move |evt| mode.set(evt.value()),
                        for choice in mode_choices {
                            option {
                                value: "{choice.value.as_str().unwrap_or_default()}",
                                selected: choice.value.as_str() == Some(mode().as_str()),
                                "{choice.label}"
                            }
                        }
                    }
                }
            }

            p { class: "dashboard__window",
                {crate::t!("dashboard-previous-window")}
                " {window_line}"
            }

            div { class: "dashboard__tile",
                PopKpi {
                    data,
                    config,
                    width: width(),
                    height: height(),
                    on_mount: move |_| tracing::debug!("kpi tile mounted"),
                }
            }
        }
    }
}
