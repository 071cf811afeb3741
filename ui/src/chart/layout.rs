//! Layout composer: comparison figures + container size -> render tree.
//!
//! ```text
//! +-------------------------------------------+
//! |                 padding                   |
//! |   +-----------------------------------+   |
//! |   |            1.2M  (big value)      |   |  header budget
//! |   +-----------+-----------+-----------+   |
//! |   |  #: 1M    |  Δ: 200k  |  %: 20%   |   |  subheader budget
//! |   +-----------+-----------+-----------+   |
//! +-------------------------------------------+
//! ```
//!
//! Padding comes off first: header and subheader budgets are shares of the
//! padded height, not of the raw box. The block is centred vertically inside
//! the padded box. The comparison row is always split into equal thirds and
//! every cell is fitted against its own column. Only when a cell does not fit
//! even at the minimum size does `clip_comparison_overflow` matter: it clips
//! the cell at its column edge (the default) or lets it spill over. Every
//! call is independent: nothing is remembered between renders.

use serde::{Deserialize, Serialize};

use super::fit::{fit_font_size, FitBox, SizeBounds};
use super::fonts::TextMeasure;
use super::tree::{NodeRole, Rect, RenderNode, RenderTree, TextStyle};
use crate::core::comparison::{extract_query, ComparisonFigures};
use crate::core::config::KpiConfig;
use crate::core::error::KpiError;
use crate::core::format::format_figure;
use crate::core::rows::QueryData;
use crate::core::theme::{FontSpec, FontWeight, Theme};

pub const PREVIOUS_LABEL: &str = "#:";
pub const DELTA_LABEL: &str = "Δ:";
pub const PERCENT_LABEL: &str = "%:";

/// Share of the padded height the error message may use.
const ERROR_HEIGHT_SHARE: f64 = 0.25;

/// Container size supplied by the host on every layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoxDimensions {
    pub width: f64,
    pub height: f64,
}

impl BoxDimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn sanitized(self) -> Self {
        let clean = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            width: clean(self.width),
            height: clean(self.height),
        }
    }
}

/// Formatted strings for the four figures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedFigures {
    pub big_value: String,
    pub previous: String,
    pub absolute_delta: String,
    pub percent_delta: String,
}

impl FormattedFigures {
    pub fn new(figures: &ComparisonFigures, config: &KpiConfig) -> Self {
        let currency = config.currency_format.as_ref();
        let number = &config.y_axis_format;
        Self {
            big_value: format_figure(figures.current, number, currency),
            previous: format!("{PREVIOUS_LABEL} {}", format_figure(figures.previous, number, currency)),
            absolute_delta: format!(
                "{DELTA_LABEL} {}",
                format_figure(figures.absolute_delta, number, currency)
            ),
            percent_delta: format!(
                "{PERCENT_LABEL} {}",
                config.percent_format.format_opt(figures.percent_delta)
            ),
        }
    }
}

/// Padded content box and the two vertical regions inside it. Budgets apply
/// to the height left after padding.
struct Frame {
    padding: f64,
    inner_width: f64,
    header_height: f64,
    subheader_height: f64,
    top: f64,
}

impl Frame {
    fn new(dims: BoxDimensions, config: &KpiConfig, theme: &Theme) -> Self {
        let padding = theme.padding().min(dims.width / 2.0).min(dims.height / 2.0).max(0.0);
        let inner_width = (dims.width - 2.0 * padding).max(0.0);
        let inner_height = (dims.height - 2.0 * padding).max(0.0);

        let mut header_height = config
            .header_font_size
            .region_height(inner_height, theme.line_height)
            .max(0.0);
        let mut subheader_height = config
            .subheader_font_size
            .region_height(inner_height, theme.line_height)
            .max(0.0);

        // Budgets summing past the box shrink proportionally.
        let total = header_height + subheader_height;
        if total > inner_height && total > 0.0 {
            let scale = inner_height / total;
            header_height *= scale;
            subheader_height *= scale;
        }

        let top = padding + (inner_height - header_height - subheader_height).max(0.0) / 2.0;
        Self {
            padding,
            inner_width,
            header_height,
            subheader_height,
            top,
        }
    }
}

/// Lay out the figures inside `dims`.
pub fn compose(
    figures: &ComparisonFigures,
    dims: BoxDimensions,
    config: &KpiConfig,
    theme: &Theme,
    measure: &dyn TextMeasure,
) -> RenderTree {
    let dims = dims.sanitized();
    let frame = Frame::new(dims, config, theme);
    let text = FormattedFigures::new(figures, config);
    let (min, max) = config.font_bounds();

    let header_font = theme.font(if config.bold_text {
        FontWeight::Bold
    } else {
        FontWeight::Normal
    });
    let header_size = fit_font_size(
        &text.big_value,
        FitBox::new(frame.inner_width, frame.header_height),
        &header_font,
        SizeBounds::new(min, config.header_font_size.size_cap(max)),
        measure,
    );

    let cells = [
        (NodeRole::PreviousValue, text.previous),
        (NodeRole::AbsoluteDelta, text.absolute_delta),
        (NodeRole::PercentDelta, text.percent_delta),
    ];
    let column_width = frame.inner_width / cells.len() as f64;
    let subheader_font = theme.font(FontWeight::Light);
    let clip = config.clip_comparison_overflow;
    let cell_fit = FitBox::new(column_width, frame.subheader_height);
    let subheader_bounds = SizeBounds::new(min, config.subheader_font_size.size_cap(max));
    // One size for the whole row so the three cells share a baseline.
    let subheader_size = cells
        .iter()
        .map(|(_, content)| fit_font_size(content, cell_fit, &subheader_font, subheader_bounds, measure))
        .min()
        .unwrap_or(subheader_bounds.min);

    let big_value = RenderNode::text(
        NodeRole::BigValue,
        Rect::new(frame.padding, frame.top, frame.inner_width, frame.header_height),
        text.big_value,
        text_style(&header_font, header_size, &theme.text_color),
    );

    let row_cells = cells
        .into_iter()
        .enumerate()
        .map(|(idx, (role, content))| {
            RenderNode::text(
                role,
                Rect::new(idx as f64 * column_width, 0.0, column_width, frame.subheader_height),
                content,
                text_style(&subheader_font, subheader_size, &theme.text_color),
            )
            .clipped(clip)
        })
        .collect();

    let row = RenderNode::container(
        NodeRole::ComparisonRow,
        Rect::new(
            frame.padding,
            frame.top + frame.header_height,
            frame.inner_width,
            frame.subheader_height,
        ),
        row_cells,
    );

    RenderTree {
        root: RenderNode::container(
            NodeRole::Root,
            Rect::new(0.0, 0.0, dims.width, dims.height),
            vec![big_value, row],
        ),
        padding: frame.padding,
        border_radius: theme.border_radius(),
        background: theme.background.clone(),
    }
}

/// Visible error placeholder in place of the figures.
pub fn compose_error(
    message: &str,
    dims: BoxDimensions,
    config: &KpiConfig,
    theme: &Theme,
    measure: &dyn TextMeasure,
) -> RenderTree {
    let dims = dims.sanitized();
    let padding = theme.padding().min(dims.width / 2.0).min(dims.height / 2.0).max(0.0);
    let inner_width = (dims.width - 2.0 * padding).max(0.0);
    let inner_height = (dims.height - 2.0 * padding).max(0.0);
    let height = inner_height * ERROR_HEIGHT_SHARE;

    let font = theme.font(FontWeight::Normal);
    let (min, max) = config.font_bounds();
    let size = fit_font_size(message, FitBox::new(inner_width, height), &font, SizeBounds::new(min, max), measure);

    let error = RenderNode::text(
        NodeRole::Error,
        Rect::new(padding, padding + (inner_height - height) / 2.0, inner_width, height),
        message.to_string(),
        text_style(&font, size, &theme.error_color),
    )
    .clipped(true);

    RenderTree {
        root: RenderNode::container(
            NodeRole::Root,
            Rect::new(0.0, 0.0, dims.width, dims.height),
            vec![error],
        ),
        padding,
        border_radius: theme.border_radius(),
        background: theme.background.clone(),
    }
}

/// Full render path: extract the figures, then compose.
///
/// An empty result set renders placeholders for every figure; a metric that
/// can't be resolved renders the error placeholder.
pub fn render_kpi(
    data: &QueryData,
    dims: BoxDimensions,
    config: &KpiConfig,
    theme: &Theme,
    measure: &dyn TextMeasure,
) -> RenderTree {
    match extract_query(data, config.metric_index) {
        Ok(figures) => compose(&figures, dims, config, theme, measure),
        Err(err @ KpiError::EmptyResultSet(_)) => {
            tracing::warn!(%err, "rendering placeholders");
            compose(&ComparisonFigures::empty(), dims, config, theme, measure)
        }
        Err(err) => {
            tracing::warn!(%err, "rendering error placeholder");
            compose_error(&error_message(&err), dims, config, theme, measure)
        }
    }
}

/// Localized text for a render-time error.
pub fn error_message(err: &KpiError) -> String {
    match err {
        KpiError::MetricNotFound { index, .. } => {
            crate::i18n::init();
            crate::t!("error-metric-not-found", position = (index + 1).to_string())
        }
        other => other.to_string(),
    }
}

fn text_style(font: &FontSpec, size: u32, color: &str) -> TextStyle {
    TextStyle {
        font_family: font.family.clone(),
        font_size: size,
        font_weight: font.weight,
        color: color.to_string(),
    }
}
