//! Level-based layout
//!
//! Level `n` of the hierarchy becomes row `n`. Inside a row classes are
//! packed left to right in discovery order; no attempt is made to center a
//! child under its parent.

use std::collections::HashMap;

use tracing::{debug, span, Level};

use super::LayoutConfig;
use crate::core::{LayoutAlgorithm, LayoutResult, Position};
use crate::hierarchy::Hierarchy;
use crate::model::ClassEntity;

/// Places classes on the rows given by the hierarchy analyzer
#[derive(Debug, Clone, Default)]
pub struct HierarchicalLayout {
    config: LayoutConfig,
}

impl HierarchicalLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Position of the `index`-th class on `level`
    fn slot(&self, level: usize, index: usize) -> Position {
        let c = &self.config;
        Position::new(
            c.hierarchical_margin + index as f64 * (c.node_width + c.level_gap_x),
            c.hierarchical_margin + level as f64 * (c.node_height + c.level_gap_y),
        )
    }
}

impl LayoutAlgorithm for HierarchicalLayout {
    fn layout(&self, classes: &[ClassEntity]) -> LayoutResult {
        let layout_span = span!(
            Level::INFO,
            "layout_hierarchical",
            class_count = classes.len()
        );
        let _enter = layout_span.enter();

        let hierarchy = Hierarchy::analyze(classes);
        let mut positions = HashMap::with_capacity(classes.len());
        for (level, ids) in hierarchy.levels().iter().enumerate() {
            for (index, id) in ids.iter().enumerate() {
                positions.insert(id.clone(), self.slot(level, index));
            }
        }

        let widest = hierarchy.levels().iter().map(Vec::len).max().unwrap_or(0);
        debug!(
            levels = hierarchy.level_count(),
            widest_level = widest,
            "Placed classes by level"
        );

        LayoutResult::from_positions(positions, self.config.node_width, self.config.node_height)
    }

    fn name(&self) -> &'static str {
        "hierarchical"
    }
}
