//! Layout engine
//!
//! Two interchangeable strategies compute top-left positions for every class:
//!
//! - [`HierarchicalLayout`] places classes on the levels found by
//!   [`Hierarchy::analyze`](crate::hierarchy::Hierarchy::analyze), left to
//!   right within a level and top to bottom across levels.
//! - [`GeneralLayout`] layers the whole relation graph, with hierarchy edges
//!   weighing more than associations, aggregations and compositions.
//!
//! Both are pure functions of their input and never fail.

use std::fmt;
use std::str::FromStr;

use crate::core::LayoutAlgorithm;

mod general;
mod hierarchical;
mod layered;
pub mod ordering;

pub use general::GeneralLayout;
pub use hierarchical::HierarchicalLayout;
pub use layered::{LayeredGraph, WeightedEdge};

/// Layout configuration shared by both strategies
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Width of every class box
    pub node_width: f64,
    /// Height of every class box
    pub node_height: f64,
    /// General layout: horizontal gap between boxes of one rank
    pub node_sep: f64,
    /// General layout: vertical gap between ranks
    pub rank_sep: f64,
    /// General layout: distance from the origin to the leftmost and topmost box
    pub margin: f64,
    /// Hierarchical layout: horizontal gap between boxes of one level
    pub level_gap_x: f64,
    /// Hierarchical layout: vertical gap between levels
    pub level_gap_y: f64,
    /// Hierarchical layout: left and top margin
    pub hierarchical_margin: f64,
    /// Weight of parent to child edges
    pub hierarchy_weight: f64,
    /// Weight of association, aggregation and composition edges
    pub association_weight: f64,
    /// Barycenter sweeps when ordering ranks
    pub ordering_sweeps: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 220.0,
            node_height: 200.0,
            node_sep: 60.0,
            rank_sep: 180.0,
            margin: 100.0,
            level_gap_x: 80.0,
            level_gap_y: 120.0,
            hierarchical_margin: 100.0,
            hierarchy_weight: 10.0,
            association_weight: 1.0,
            ordering_sweeps: 8,
        }
    }
}

impl LayoutConfig {
    pub fn with_node_size(mut self, width: f64, height: f64) -> Self {
        self.node_width = width;
        self.node_height = height;
        self
    }

    pub fn with_spacing(mut self, node_sep: f64, rank_sep: f64) -> Self {
        self.node_sep = node_sep;
        self.rank_sep = rank_sep;
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_level_gaps(mut self, horizontal: f64, vertical: f64) -> Self {
        self.level_gap_x = horizontal;
        self.level_gap_y = vertical;
        self
    }

    pub fn with_hierarchical_margin(mut self, margin: f64) -> Self {
        self.hierarchical_margin = margin;
        self
    }

    pub fn with_edge_weights(mut self, hierarchy: f64, association: f64) -> Self {
        self.hierarchy_weight = hierarchy;
        self.association_weight = association;
        self
    }

    pub fn with_ordering_sweeps(mut self, sweeps: usize) -> Self {
        self.ordering_sweeps = sweeps;
        self
    }
}

/// Layout strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutKind {
    /// Level-based placement driven by the hierarchy analyzer
    #[default]
    Hierarchical,
    /// Weighted layered layout of the full relation graph
    General,
}

impl LayoutKind {
    /// Build the algorithm for this strategy
    pub fn algorithm(self, config: LayoutConfig) -> Box<dyn LayoutAlgorithm> {
        match self {
            LayoutKind::Hierarchical => Box::new(HierarchicalLayout::with_config(config)),
            LayoutKind::General => Box::new(GeneralLayout::with_config(config)),
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["hierarchical", "general"]
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutKind::Hierarchical => write!(f, "hierarchical"),
            LayoutKind::General => write!(f, "general"),
        }
    }
}

impl FromStr for LayoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hierarchical" | "custom" => Ok(LayoutKind::Hierarchical),
            "general" | "dagre" => Ok(LayoutKind::General),
            _ => Err(format!("Unknown layout strategy: {}", s)),
        }
    }
}
