use dioxus::prelude::*;

use super::fonts;
use super::layout::{render_kpi, BoxDimensions};
use super::tree::{NodeContent, RenderNode};
use crate::core::config::KpiConfig;
use crate::core::rows::QueryData;
use crate::core::theme::Theme;

/// Period-over-period KPI tile.
///
/// Re-renders from scratch whenever the host passes new data, config or
/// size; no layout state is kept between renders. Hosts that need the DOM
/// node (e.g. to observe resizes) pass `on_mount`, which is invoked once the
/// root element is attached.
#[component]
pub fn PopKpi(
    data: QueryData,
    config: KpiConfig,
    width: f64,
    height: f64,
    #[props(default)] theme: Theme,
    on_mount: Option<EventHandler<MountedEvent>>,
) -> Element {
    let measure = fonts::platform_measure();
    let tree = render_kpi(
        &data,
        BoxDimensions::new(width, height),
        &config,
        &theme,
        measure.as_ref(),
    );
    let root_style = tree.root_css();
    let children = tree.root.children().to_vec();

    rsx! {
        div {
            class: "popkpi",
            style: "{root_style}",
            onmounted: move |evt| {
                if let Some(handler) = on_mount {
                    handler.call(evt);
                }
            },
            for (idx, child) in children.into_iter().enumerate() {
                KpiNode { key: "{idx}", node: child }
            }
        }
    }
}

#[component]
fn KpiNode(node: RenderNode) -> Element {
    let class = node.role.css_class();
    let style = node.css();

    match node.content {
        NodeContent::Text { text, .. } => rsx! {
            div { class: "{class}", style: "{style}", "{text}" }
        },
        NodeContent::Children(children) => rsx! {
            div { class: "{class}", style: "{style}",
                for (idx, child) in children.into_iter().enumerate() {
                    KpiNode { key: "{idx}", node: child }
                }
            }
        },
    }
}
