//! Render tree emitted by the layout composer.
//!
//! Nested boxes with absolute pixel geometry relative to their parent plus
//! the text and font each leaf shows. Hosts paint it however they like; the
//! Dioxus view in this crate maps every node onto an absolutely positioned
//! `div`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }
}

/// What a node stands for, so hosts can style or test by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Root,
    BigValue,
    ComparisonRow,
    PreviousValue,
    AbsoluteDelta,
    PercentDelta,
    Error,
}

impl NodeRole {
    pub fn css_class(self) -> &'static str {
        match self {
            NodeRole::Root => "popkpi",
            NodeRole::BigValue => "popkpi__big-value",
            NodeRole::ComparisonRow => "popkpi__comparison",
            NodeRole::PreviousValue => "popkpi__cell popkpi__cell--previous",
            NodeRole::AbsoluteDelta => "popkpi__cell popkpi__cell--delta",
            NodeRole::PercentDelta => "popkpi__cell popkpi__cell--percent",
            NodeRole::Error => "popkpi__error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    #[default]
    Visible,
    Clip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: u32,
    pub font_weight: u16,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeContent {
    Children(Vec<RenderNode>),
    Text { text: String, style: TextStyle },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderNode {
    pub role: NodeRole,
    pub rect: Rect,
    pub overflow: Overflow,
    pub content: NodeContent,
}

impl RenderNode {
    pub fn container(role: NodeRole, rect: Rect, children: Vec<RenderNode>) -> Self {
        Self {
            role,
            rect,
            overflow: Overflow::Visible,
            content: NodeContent::Children(children),
        }
    }

    pub fn text(role: NodeRole, rect: Rect, text: String, style: TextStyle) -> Self {
        Self {
            role,
            rect,
            overflow: Overflow::Visible,
            content: NodeContent::Text { text, style },
        }
    }

    pub fn clipped(mut self, clip: bool) -> Self {
        self.overflow = if clip { Overflow::Clip } else { Overflow::Visible };
        self
    }

    pub fn children(&self) -> &[RenderNode] {
        match &self.content {
            NodeContent::Children(children) => children,
            NodeContent::Text { .. } => &[],
        }
    }

    pub fn text_content(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Text { text, .. } => Some(text),
            NodeContent::Children(_) => None,
        }
    }

    pub fn text_style(&self) -> Option<&TextStyle> {
        match &self.content {
            NodeContent::Text { style, .. } => Some(style),
            NodeContent::Children(_) => None,
        }
    }

    /// Depth-first search for the first node with `role`.
    pub fn find(&self, role: NodeRole) -> Option<&RenderNode> {
        if self.role == role {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(role))
    }

    /// Inline CSS for an absolutely positioned box.
    pub fn css(&self) -> String {
        let mut css = format!(
            "position:absolute;left:{}px;top:{}px;width:{}px;height:{}px;",
            round2(self.rect.x),
            round2(self.rect.y),
            round2(self.rect.width),
            round2(self.rect.height)
        );
        if self.overflow == Overflow::Clip {
            css.push_str("overflow:hidden;white-space:nowrap;");
        }
        if let Some(style) = self.text_style() {
            css.push_str(&format!(
                "font-family:{};font-size:{}px;font-weight:{};color:{};line-height:{}px;text-align:center;",
                style.font_family,
                style.font_size,
                style.font_weight,
                style.color,
                round2(self.rect.height)
            ));
        }
        css
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whole chart: root box plus container chrome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderTree {
    pub root: RenderNode,
    pub padding: f64,
    pub border_radius: f64,
    pub background: String,
}

impl RenderTree {
    pub fn find(&self, role: NodeRole) -> Option<&RenderNode> {
        self.root.find(role)
    }

    pub fn text_of(&self, role: NodeRole) -> Option<&str> {
        self.find(role).and_then(RenderNode::text_content)
    }

    pub fn font_size_of(&self, role: NodeRole) -> Option<u32> {
        self.find(role)
            .and_then(RenderNode::text_style)
            .map(|style| style.font_size)
    }

    pub fn is_error(&self) -> bool {
        self.find(NodeRole::Error).is_some()
    }

    pub fn root_css(&self) -> String {
        format!(
            "position:relative;width:{}px;height:{}px;border-radius:{}px;background:{};box-sizing:border-box;",
            round2(self.root.rect.width),
            round2(self.root.rect.height),
            round2(self.border_radius),
            self.background
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(size: u32) -> TextStyle {
        TextStyle {
            font_family: "Inter".into(),
            font_size: size,
            font_weight: 400,
            color: "#000".into(),
        }
    }

    #[test]
    fn find_walks_depth_first() {
        let tree = RenderNode::container(
            NodeRole::Root,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            vec![RenderNode::container(
                NodeRole::ComparisonRow,
                Rect::new(0.0, 50.0, 100.0, 20.0),
                vec![RenderNode::text(
                    NodeRole::PercentDelta,
                    Rect::new(66.0, 0.0, 33.0, 20.0),
                    "%: 20%".into(),
                    style(14),
                )],
            )],
        );
        assert_eq!(
            tree.find(NodeRole::PercentDelta).and_then(RenderNode::text_content),
            Some("%: 20%")
        );
        assert!(tree.find(NodeRole::BigValue).is_none());
    }

    #[test]
    fn clipped_nodes_hide_overflow() {
        let node = RenderNode::text(NodeRole::AbsoluteDelta, Rect::new(0.0, 0.0, 10.0, 10.0), "x".into(), style(9))
            .clipped(true);
        let css = node.css();
        assert!(css.contains("overflow:hidden"));
        assert!(css.contains("font-size:9px"));
    }

    #[test]
    fn negative_rects_are_clamped() {
        let rect = Rect::new(1.0, 2.0, -3.0, -4.0);
        assert_eq!(rect.width, 0.0);
        assert_eq!(rect.height, 0.0);
    }
}
