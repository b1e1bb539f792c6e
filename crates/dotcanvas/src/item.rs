//! Shared pieces of node and edge items.

use crate::font::FontMetrics;
use crate::style::Color;
use dotlayout::{EdgeId, Graph, NodeId};
use serde::{Deserialize, Serialize};

/// Identity of a scene item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemId {
    Node(NodeId),
    Edge(EdgeId),
}

/// Tint applied to selected items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorizeEffect {
    pub color: Color,
    /// Blend factor in `[0, 1]`.
    pub strength: f64,
}

impl Default for ColorizeEffect {
    fn default() -> Self {
        Self {
            color: Color::rgb(0, 0, 192),
            strength: 1.0,
        }
    }
}

/// Inputs every item reads while rebuilding its geometry after a layout pass.
pub struct RefreshContext<'a> {
    pub graph: &'a Graph,
    /// Height of the graph bounding box, read once per pass.
    pub height: f64,
    pub dpi: f64,
    pub metrics: &'a dyn FontMetrics,
}

/// Items sit above the background grid.
pub const ITEM_Z_VALUE: f64 = 1.0;

/// Selection state shared by node and edge items.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Selection {
    selected: bool,
    effect: Option<ColorizeEffect>,
}

impl Selection {
    pub(crate) fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn effect(&self) -> Option<&ColorizeEffect> {
        self.effect.as_ref()
    }

    /// Returns whether the state changed.
    pub(crate) fn set(&mut self, selected: bool) -> bool {
        if self.selected == selected {
            return false;
        }
        self.selected = selected;
        self.effect = selected.then(ColorizeEffect::default);
        true
    }
}
