//! Barycenter ordering for edge crossing minimization
//!
//! Orders the nodes inside each rank of a [`LayeredGraph`] so that heavy
//! edges cross as little as possible. Barycenters and crossing counts are
//! weighted: a crossing between two hierarchy edges costs far more than one
//! between two associations.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::LayeredGraph;

/// Weighted edge crossings between all adjacent layers.
///
/// Edges (a1→b1) and (a2→b2) between layer L and L+1 cross when a1 is left
/// of a2 while b1 is right of b2, or vice versa. Each crossing costs the
/// product of the two edge weights.
pub fn cross_count(layers: &[Vec<usize>], graph: &LayeredGraph) -> f64 {
    layers
        .windows(2)
        .map(|pair| two_layer_cross_count(&pair[0], &pair[1], graph))
        .sum()
}

/// Index of every node within its layer
fn positions(layer: &[usize]) -> HashMap<usize, usize> {
    layer.iter().enumerate().map(|(i, &n)| (n, i)).collect()
}

fn two_layer_cross_count(north: &[usize], south: &[usize], graph: &LayeredGraph) -> f64 {
    let south_pos = positions(south);

    // Sorted by north position, so a crossing is a later edge landing further left
    let edges: Vec<(usize, usize, f64)> = north
        .iter()
        .enumerate()
        .flat_map(|(np, &n)| graph.successors(n).iter().map(move |&(succ, w)| (np, succ, w)))
        .filter_map(|(np, succ, w)| south_pos.get(&succ).map(|&sp| (np, sp, w)))
        .collect();

    let mut crossings = 0.0;
    for (i, &(n1, s1, w1)) in edges.iter().enumerate() {
        for &(n2, s2, w2) in &edges[i + 1..] {
            if n2 > n1 && s2 < s1 {
                crossings += w1 * w2;
            }
        }
    }
    crossings
}

/// Direction for barycenter calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepDirection {
    /// Look at predecessors (nodes in the previous layer)
    Downward,
    /// Look at successors (nodes in the next layer)
    Upward,
}

/// Weighted mean position of each node's neighbors in the reference layer.
///
/// Returns None for nodes with no neighbor there.
pub fn compute_barycenters(
    layer: &[usize],
    ref_layer: &[usize],
    graph: &LayeredGraph,
    direction: SweepDirection,
) -> Vec<Option<f64>> {
    let ref_pos = positions(ref_layer);

    layer
        .iter()
        .map(|&node| {
            let neighbors = match direction {
                SweepDirection::Downward => graph.predecessors(node),
                SweepDirection::Upward => graph.successors(node),
            };

            let (sum, total_weight) = neighbors
                .iter()
                .filter_map(|&(n, w)| ref_pos.get(&n).map(|&p| (p as f64 * w, w)))
                .fold((0.0, 0.0), |(s, tw), (pw, w)| (s + pw, tw + w));

            if total_weight > 0.0 {
                Some(sum / total_weight)
            } else {
                None
            }
        })
        .collect()
}

/// Order nodes in a layer by their barycenter values.
///
/// Ties keep their current relative order. Nodes without a barycenter go
/// after the others, in their current relative order.
pub fn order_layer_by_barycenter(layer: &mut Vec<usize>, barycenters: &[Option<f64>]) {
    let mut keyed: Vec<(Option<f64>, usize)> = layer
        .iter()
        .enumerate()
        .map(|(i, &node)| (barycenters.get(i).copied().flatten(), node))
        .collect();

    // Stable sort keeps the current order among ties and among unplaced nodes
    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    *layer = keyed.into_iter().map(|(_, node)| node).collect();
}

/// Reorder one layer against its already placed neighbor layer
fn reorder(layers: &mut [Vec<usize>], target: usize, reference: usize, graph: &LayeredGraph) {
    let direction = if reference < target {
        SweepDirection::Downward
    } else {
        SweepDirection::Upward
    };
    let barycenters = compute_barycenters(&layers[target], &layers[reference], graph, direction);
    order_layer_by_barycenter(&mut layers[target], &barycenters);
}

/// Apply barycenter ordering to minimize weighted edge crossings.
///
/// Even sweeps walk downward from the second layer, odd sweeps walk upward
/// from the second to last. The best ordering seen wins and its weighted
/// crossing count is returned.
pub fn order_layers_barycenter(
    graph: &LayeredGraph,
    layers: &mut Vec<Vec<usize>>,
    sweeps: usize,
) -> f64 {
    let depth = layers.len();
    if depth < 2 {
        return 0.0;
    }

    let mut best = (cross_count(layers, graph), layers.clone());

    for sweep in 0..sweeps {
        if best.0 == 0.0 {
            break;
        }
        if sweep % 2 == 0 {
            for target in 1..depth {
                reorder(layers, target, target - 1, graph);
            }
        } else {
            for target in (0..depth - 1).rev() {
                reorder(layers, target, target + 1, graph);
            }
        }

        let crossings = cross_count(layers, graph);
        if crossings < best.0 {
            best = (crossings, layers.clone());
        }
    }

    let (crossings, ordering) = best;
    *layers = ordering;
    crossings
}
