//! Core layout trait for class positioning
//!
//! A layout algorithm is a pure function from a snapshot of classes to a
//! position for every class. It never fails and never mutates its input;
//! the caller decides whether and when to write the positions back.

use std::collections::HashMap;

use super::{ClassId, Position};
use crate::model::ClassEntity;

/// Positions computed by a layout pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    /// Top-left position for every input class
    pub positions: HashMap<ClassId, Position>,
    /// Right edge of the rightmost box
    pub width: f64,
    /// Bottom edge of the lowest box
    pub height: f64,
}

impl LayoutResult {
    /// Build a result and compute its extents from fixed box dimensions
    pub fn from_positions(
        positions: HashMap<ClassId, Position>,
        node_width: f64,
        node_height: f64,
    ) -> Self {
        let width = positions
            .values()
            .map(|p| p.x + node_width)
            .fold(0.0_f64, f64::max);
        let height = positions
            .values()
            .map(|p| p.y + node_height)
            .fold(0.0_f64, f64::max);
        Self {
            positions,
            width,
            height,
        }
    }

    pub fn position(&self, id: &str) -> Option<Position> {
        self.positions.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Core trait for layout algorithms
///
/// # Example
/// ```
/// use umlgraph::core::LayoutAlgorithm;
/// use umlgraph::layout::HierarchicalLayout;
/// use umlgraph::model::Diagram;
///
/// let mut diagram = Diagram::new("Shapes");
/// diagram.create_class("Shape", None);
/// let result = HierarchicalLayout::new().layout(diagram.classes());
/// assert_eq!(result.len(), 1);
/// ```
pub trait LayoutAlgorithm: Send + Sync {
    /// Compute a position for every class in `classes`
    fn layout(&self, classes: &[ClassEntity]) -> LayoutResult;

    /// Get the name of this layout algorithm
    fn name(&self) -> &'static str;
}
