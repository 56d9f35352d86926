//! Weighted layered layout over every relation kind
//!
//! Builds a directed graph where hierarchy relations point parent to child
//! and association-like relations point source to target, then runs a
//! Sugiyama-style pipeline: cycle breaking, longest-path ranking, weighted
//! barycenter ordering and a weighted-median style coordinate pass. Heavier
//! edges win every tie, which keeps parents above their children even when
//! associations point the other way.

use std::collections::HashMap;

use tracing::{debug, info, span, trace, Level};

use super::ordering::order_layers_barycenter;
use super::{LayeredGraph, LayoutConfig, WeightedEdge};
use crate::core::{LayoutAlgorithm, LayoutResult, Position, RelationKind};
use crate::model::ClassEntity;

/// Alternating passes of the horizontal coordinate refinement
const COORDINATE_PASSES: usize = 4;

/// Layered layout of the full relation graph
#[derive(Debug, Clone, Default)]
pub struct GeneralLayout {
    config: LayoutConfig,
}

impl GeneralLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Weighted edges between class indices
    ///
    /// Relations to unknown classes, self-relations and NONE relations add
    /// nothing.
    fn collect_edges(&self, classes: &[ClassEntity]) -> Vec<WeightedEdge> {
        let index: HashMap<&str, usize> = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id().as_str(), i))
            .collect();

        let mut edges = Vec::new();
        for (source, class) in classes.iter().enumerate() {
            for relation in &class.relations {
                let Some(&target) = index.get(relation.target_class_id.as_str()) else {
                    trace!(
                        source = %class.id(),
                        target = %relation.target_class_id,
                        "Skipping relation to unknown class"
                    );
                    continue;
                };
                if target == source {
                    continue;
                }
                match relation.kind {
                    RelationKind::Inheritance | RelationKind::Implementation => edges.push(
                        WeightedEdge::new(target, source, self.config.hierarchy_weight),
                    ),
                    RelationKind::Association
                    | RelationKind::Aggregation
                    | RelationKind::Composition => edges.push(WeightedEdge::new(
                        source,
                        target,
                        self.config.association_weight,
                    )),
                    RelationKind::None => {}
                }
            }
        }
        edges
    }

    fn node_width(&self, graph: &LayeredGraph, node: usize) -> f64 {
        if graph.is_dummy(node) {
            0.0
        } else {
            self.config.node_width
        }
    }

    /// Minimum distance between the centers of two neighbors in a rank
    fn separation(&self, graph: &LayeredGraph, left: usize, right: usize) -> f64 {
        (self.node_width(graph, left) + self.node_width(graph, right)) / 2.0 + self.config.node_sep
    }

    /// Horizontal center of every node, real and dummy
    fn assign_x(&self, graph: &LayeredGraph, layers: &[Vec<usize>]) -> Vec<f64> {
        let mut x = vec![0.0; graph.node_count()];
        for layer in layers {
            let mut cursor = 0.0;
            for (i, &node) in layer.iter().enumerate() {
                if i > 0 {
                    cursor += self.separation(graph, layer[i - 1], node);
                }
                x[node] = cursor;
            }
        }

        for pass in 0..COORDINATE_PASSES {
            let downward = pass % 2 == 0;
            let layer_indices: Vec<usize> = if downward {
                (1..layers.len()).collect()
            } else {
                (0..layers.len().saturating_sub(1)).rev().collect()
            };

            for layer_idx in layer_indices {
                let layer = &layers[layer_idx];
                let desired: Vec<f64> = layer
                    .iter()
                    .map(|&node| {
                        let neighbors = if downward {
                            graph.predecessors(node)
                        } else {
                            graph.successors(node)
                        };
                        weighted_mean(neighbors, &x).unwrap_or(x[node])
                    })
                    .collect();
                self.place_layer(graph, layer, &desired, &mut x);
            }
        }
        x
    }

    /// Move a layer as close to `desired` as separation allows
    ///
    /// Packs left to right, then shifts the whole layer so the mean
    /// displacement from `desired` is zero.
    fn place_layer(&self, graph: &LayeredGraph, layer: &[usize], desired: &[f64], x: &mut [f64]) {
        if layer.is_empty() {
            return;
        }
        let mut placed = Vec::with_capacity(layer.len());
        for (i, &node) in layer.iter().enumerate() {
            let mut pos = desired[i];
            if i > 0 {
                let min = placed[i - 1] + self.separation(graph, layer[i - 1], node);
                pos = pos.max(min);
            }
            placed.push(pos);
        }
        let shift = desired
            .iter()
            .zip(&placed)
            .map(|(d, p)| d - p)
            .sum::<f64>()
            / layer.len() as f64;
        for (&node, pos) in layer.iter().zip(placed) {
            x[node] = pos + shift;
        }
    }
}

fn weighted_mean(neighbors: &[(usize, f64)], x: &[f64]) -> Option<f64> {
    let (sum, total) = neighbors
        .iter()
        .fold((0.0, 0.0), |(s, t), &(n, w)| (s + x[n] * w, t + w));
    if total > 0.0 {
        Some(sum / total)
    } else {
        None
    }
}

impl LayoutAlgorithm for GeneralLayout {
    fn layout(&self, classes: &[ClassEntity]) -> LayoutResult {
        let layout_span = span!(Level::INFO, "layout_general", class_count = classes.len());
        let _enter = layout_span.enter();

        if classes.is_empty() {
            debug!("No classes, returning empty layout");
            return LayoutResult::default();
        }

        let edges = self.collect_edges(classes);
        let graph = LayeredGraph::build(classes.len(), &edges);
        let mut layers = graph.layers();
        debug!(
            edge_count = edges.len(),
            rank_count = layers.len(),
            dummy_count = graph.node_count() - graph.real_count(),
            "Ranked relation graph"
        );

        let crossings = order_layers_barycenter(&graph, &mut layers, self.config.ordering_sweeps);
        debug!(weighted_crossings = crossings, "Ordered ranks");

        let centers_x = self.assign_x(&graph, &layers);

        let c = &self.config;
        let half_w = c.node_width / 2.0;
        let half_h = c.node_height / 2.0;
        let leftmost = (0..classes.len())
            .map(|i| centers_x[i] - half_w)
            .fold(f64::INFINITY, f64::min);
        let offset = c.margin - leftmost;

        let mut positions = HashMap::with_capacity(classes.len());
        for (i, class) in classes.iter().enumerate() {
            let center = Position::new(
                centers_x[i] + offset,
                c.margin + graph.rank(i) as f64 * (c.node_height + c.rank_sep) + half_h,
            );
            positions.insert(
                class.id().clone(),
                Position::new(center.x - half_w, center.y - half_h),
            );
        }

        let result = LayoutResult::from_positions(positions, c.node_width, c.node_height);
        info!(
            width = result.width,
            height = result.height,
            "General layout completed"
        );
        result
    }

    fn name(&self) -> &'static str {
        "general"
    }
}
