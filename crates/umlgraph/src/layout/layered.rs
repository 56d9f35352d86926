//! Weighted layered graph
//!
//! Turns an arbitrary weighted digraph into a proper layered graph: cycles are
//! broken by reversing light edges, nodes are ranked by longest path, and
//! edges spanning more than one rank are split with dummy nodes so every edge
//! joins adjacent ranks.

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};

/// A directed edge between node indices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedEdge {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
}

impl WeightedEdge {
    pub fn new(from: usize, to: usize, weight: f64) -> Self {
        Self { from, to, weight }
    }
}

/// A graph whose edges all join adjacent ranks
///
/// Indices below `real_count` are input nodes, the rest are dummies.
#[derive(Debug, Clone, Default)]
pub struct LayeredGraph {
    real_count: usize,
    succ: Vec<Vec<(usize, f64)>>,
    pred: Vec<Vec<(usize, f64)>>,
    rank: Vec<usize>,
}

impl LayeredGraph {
    /// An edgeless graph with every node on rank 0
    pub fn new(real_count: usize) -> Self {
        Self {
            real_count,
            succ: vec![Vec::new(); real_count],
            pred: vec![Vec::new(); real_count],
            rank: vec![0; real_count],
        }
    }

    /// Layer `edges` over `real_count` nodes
    ///
    /// Self-loops and indices outside `0..real_count` are dropped.
    pub fn build(real_count: usize, edges: &[WeightedEdge]) -> Self {
        let edges: Vec<WeightedEdge> = edges
            .iter()
            .filter(|e| e.from != e.to && e.from < real_count && e.to < real_count)
            .copied()
            .collect();
        let acyclic = break_cycles(real_count, &edges);
        let mut graph = Self::new(real_count);
        graph.rank = longest_path_ranks(real_count, &acyclic);

        for edge in acyclic {
            let from_rank = graph.rank[edge.from];
            let span = graph.rank[edge.to] - from_rank;
            let mut prev = edge.from;
            for step in 1..span {
                let dummy = graph.push_dummy(from_rank + step);
                graph.link(prev, dummy, edge.weight);
                prev = dummy;
            }
            graph.link(prev, edge.to, edge.weight);
        }
        graph
    }

    fn push_dummy(&mut self, rank: usize) -> usize {
        self.succ.push(Vec::new());
        self.pred.push(Vec::new());
        self.rank.push(rank);
        self.rank.len() - 1
    }

    /// Add an edge, summing weights with an existing edge between the same nodes
    pub fn link(&mut self, from: usize, to: usize, weight: f64) {
        if let Some(entry) = self.succ[from].iter_mut().find(|(n, _)| *n == to) {
            entry.1 += weight;
            if let Some(back) = self.pred[to].iter_mut().find(|(n, _)| *n == from) {
                back.1 += weight;
            }
            return;
        }
        self.succ[from].push((to, weight));
        self.pred[to].push((from, weight));
    }

    pub fn node_count(&self) -> usize {
        self.rank.len()
    }

    pub fn real_count(&self) -> usize {
        self.real_count
    }

    pub fn is_dummy(&self, node: usize) -> bool {
        node >= self.real_count
    }

    pub fn rank(&self, node: usize) -> usize {
        self.rank[node]
    }

    pub fn successors(&self, node: usize) -> &[(usize, f64)] {
        &self.succ[node]
    }

    pub fn predecessors(&self, node: usize) -> &[(usize, f64)] {
        &self.pred[node]
    }

    /// Nodes grouped by rank, in index order
    pub fn layers(&self) -> Vec<Vec<usize>> {
        let depth = self.rank.iter().max().map_or(0, |&r| r + 1);
        let mut layers = vec![Vec::new(); depth];
        for (node, &rank) in self.rank.iter().enumerate() {
            layers[rank].push(node);
        }
        layers
    }
}

/// Make the graph acyclic
///
/// Edges are inserted heaviest first (ties in input order); an edge that
/// would close a cycle is inserted reversed. Parallel edges are merged by
/// summing their weights.
pub fn break_cycles(node_count: usize, edges: &[WeightedEdge]) -> Vec<WeightedEdge> {
    let mut order: Vec<usize> = (0..edges.len()).collect();
    order.sort_by(|&a, &b| {
        edges[b]
            .weight
            .partial_cmp(&edges[a].weight)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.cmp(&b))
    });

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut accepted: Vec<WeightedEdge> = Vec::new();
    let mut slot: HashMap<(usize, usize), usize> = HashMap::new();

    for i in order {
        let edge = edges[i];
        if edge.from == edge.to {
            continue;
        }
        let (from, to) = if reaches(&adjacency, edge.to, edge.from) {
            (edge.to, edge.from)
        } else {
            (edge.from, edge.to)
        };
        match slot.get(&(from, to)) {
            Some(&k) => accepted[k].weight += edge.weight,
            None => {
                slot.insert((from, to), accepted.len());
                accepted.push(WeightedEdge::new(from, to, edge.weight));
                adjacency[from].push(to);
            }
        }
    }
    accepted
}

fn reaches(adjacency: &[Vec<usize>], start: usize, goal: usize) -> bool {
    let mut seen = vec![false; adjacency.len()];
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        if node == goal {
            return true;
        }
        if std::mem::replace(&mut seen[node], true) {
            continue;
        }
        stack.extend(adjacency[node].iter().copied());
    }
    false
}

/// Rank each node one below its deepest predecessor; sources get rank 0
///
/// `edges` must be acyclic.
pub fn longest_path_ranks(node_count: usize, edges: &[WeightedEdge]) -> Vec<usize> {
    let mut indegree = vec![0usize; node_count];
    let mut succ: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for edge in edges {
        indegree[edge.to] += 1;
        succ[edge.from].push(edge.to);
    }

    let mut rank = vec![0usize; node_count];
    let mut queue: VecDeque<usize> = (0..node_count).filter(|&n| indegree[n] == 0).collect();
    while let Some(node) = queue.pop_front() {
        for &next in &succ[node] {
            rank[next] = rank[next].max(rank[node] + 1);
            indegree[next] -= 1;
            if indegree[next] == 0 {
                queue.push_back(next);
            }
        }
    }
    rank
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_ranks() {
        let edges = vec![WeightedEdge::new(0, 1, 1.0), WeightedEdge::new(1, 2, 1.0)];
        assert_eq!(longest_path_ranks(3, &edges), vec![0, 1, 2]);
    }

    #[test]
    fn test_longest_path_wins() {
        // 0 -> 1 -> 2 and 0 -> 2
        let edges = vec![
            WeightedEdge::new(0, 1, 1.0),
            WeightedEdge::new(1, 2, 1.0),
            WeightedEdge::new(0, 2, 1.0),
        ];
        assert_eq!(longest_path_ranks(3, &edges), vec![0, 1, 2]);
    }

    #[test]
    fn test_break_cycle_keeps_heavy_edge() {
        // Light 0 -> 1 and heavy 1 -> 0: the light edge is reversed and merged
        let edges = vec![WeightedEdge::new(0, 1, 1.0), WeightedEdge::new(1, 0, 10.0)];
        let acyclic = break_cycles(2, &edges);
        assert_eq!(acyclic, vec![WeightedEdge::new(1, 0, 11.0)]);
    }

    #[test]
    fn test_break_three_cycle() {
        let edges = vec![
            WeightedEdge::new(0, 1, 1.0),
            WeightedEdge::new(1, 2, 1.0),
            WeightedEdge::new(2, 0, 1.0),
        ];
        let acyclic = break_cycles(3, &edges);
        assert_eq!(acyclic.len(), 3);
        let ranks = longest_path_ranks(3, &acyclic);
        for edge in &acyclic {
            assert!(ranks[edge.to] > ranks[edge.from]);
        }
    }

    #[test]
    fn test_long_edges_get_dummies() {
        // 0 -> 1 -> 2 and 0 -> 2 spans two ranks
        let edges = vec![
            WeightedEdge::new(0, 1, 1.0),
            WeightedEdge::new(1, 2, 1.0),
            WeightedEdge::new(0, 2, 1.0),
        ];
        let graph = LayeredGraph::build(3, &edges);
        assert_eq!(graph.node_count(), 4);
        assert!(graph.is_dummy(3));
        assert_eq!(graph.rank(3), 1);
        for node in 0..graph.node_count() {
            for &(next, _) in graph.successors(node) {
                assert_eq!(graph.rank(next), graph.rank(node) + 1);
            }
        }
        assert_eq!(graph.layers(), vec![vec![0], vec![1, 3], vec![2]]);
    }

    #[test]
    fn test_self_loops_dropped() {
        let graph = LayeredGraph::build(2, &[WeightedEdge::new(1, 1, 5.0)]);
        assert_eq!(graph.node_count(), 2);
        assert!(graph.successors(1).is_empty());
        assert_eq!(graph.layers(), vec![vec![0, 1]]);
    }

    #[test]
    fn test_link_merges_parallel_edges() {
        let mut graph = LayeredGraph::new(2);
        graph.link(0, 1, 1.0);
        graph.link(0, 1, 2.0);
        assert_eq!(graph.successors(0).to_vec(), vec![(1usize, 3.0)]);
        assert_eq!(graph.predecessors(1).to_vec(), vec![(0usize, 3.0)]);
    }

    #[test]
    fn test_empty_graph() {
        let graph = LayeredGraph::build(0, &[]);
        assert_eq!(graph.node_count(), 0);
        assert!(graph.layers().is_empty());
    }
}
