// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Remove-one / greedy-refill local search over packings.
//!
//! The neighborhood of a packing is every set reachable by dropping one
//! member (the dropped node is barred from coming straight back) and then
//! greedily re-adding compatible nodes, heaviest first. A pure extension
//! attempt runs before the drops, so non-maximal inputs improve without
//! giving anything up. Moves are first-improvement; rounds repeat until a
//! full neighborhood scan finds nothing better or the round cap is hit.
//!
//! The procedure is deliberately cache-free: 2-packing conflicts are
//! decided from the 1-hop adjacency alone (an edge or a shared neighbor),
//! so it accepts any graph the engine accepts, with or without the
//! materialized 2-hop neighborhoods.

use gasp_engine::improver::{ImproverError, PackingImprover};
use gasp_graph::graph::Graph;
use gasp_graph::index::NodeId;
use gasp_graph::solution::{is_independent_set, is_two_packing, total_weight, PackingKind};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// First-improvement remove-one/refill search.
///
/// Deterministic for a fixed seed: the seed drives only the order in which
/// members are tried for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapImprover {
    max_rounds: usize,
    seed: u64,
}

impl SwapImprover {
    /// Creates the improver with 16 rounds and seed 0.
    pub fn new() -> Self {
        Self {
            max_rounds: 16,
            seed: 0,
        }
    }

    /// Caps the number of improvement rounds. Zero rounds reduce the
    /// improver to input validation.
    pub fn max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Seeds the removal-order shuffle.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for SwapImprover {
    fn default() -> Self {
        Self::new()
    }
}

impl PackingImprover for SwapImprover {
    fn name(&self) -> &str {
        "swap-refill"
    }

    fn improve(
        &self,
        graph: &Graph,
        packing: &[NodeId],
        kind: PackingKind,
    ) -> Result<Option<Vec<NodeId>>, ImproverError> {
        let feasible = match kind {
            PackingKind::MaxWeightIndependentSet => is_independent_set(graph, packing),
            PackingKind::TwoPacking => is_two_packing(graph, packing),
        };
        if !feasible {
            return Err(ImproverError::InfeasibleInput(kind));
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut current = packing.to_vec();
        current.sort_unstable();
        let mut current_value = packing_value(graph, &current, kind);
        let mut improved = false;

        'rounds: for _ in 0..self.max_rounds {
            let extended = refill(graph, kind, &current, None);
            if packing_value(graph, &extended, kind) > current_value {
                current_value = packing_value(graph, &extended, kind);
                current = extended;
                improved = true;
                continue 'rounds;
            }

            let mut removal_order: Vec<usize> = (0..current.len()).collect();
            removal_order.shuffle(&mut rng);
            for &skip in &removal_order {
                let dropped = current[skip];
                let keep: Vec<NodeId> = current
                    .iter()
                    .copied()
                    .filter(|&member| member != dropped)
                    .collect();
                let candidate = refill(graph, kind, &keep, Some(dropped));
                let value = packing_value(graph, &candidate, kind);
                if value > current_value {
                    current = candidate;
                    current_value = value;
                    improved = true;
                    continue 'rounds;
                }
            }
            break;
        }

        Ok(improved.then_some(current))
    }
}

/// Objective of a packing: total weight for independent sets, cardinality
/// for 2-packings.
fn packing_value(graph: &Graph, nodes: &[NodeId], kind: PackingKind) -> f64 {
    match kind {
        PackingKind::MaxWeightIndependentSet => total_weight(graph, nodes),
        PackingKind::TwoPacking => nodes.len() as f64,
    }
}

/// Greedily extends `keep` with compatible nodes, heaviest first (ties by
/// id). `banned` is excluded outright.
fn refill(graph: &Graph, kind: PackingKind, keep: &[NodeId], banned: Option<NodeId>) -> Vec<NodeId> {
    let mut result = keep.to_vec();
    let mut free: Vec<NodeId> = (0..graph.num_nodes())
        .map(NodeId::new)
        .filter(|&v| {
            Some(v) != banned
                && !result.contains(&v)
                && result.iter().all(|&m| !conflicts(graph, kind, v, m))
        })
        .collect();
    free.sort_by(|&a, &b| {
        graph
            .node_weight(b)
            .total_cmp(&graph.node_weight(a))
            .then(a.cmp(&b))
    });
    for v in free {
        if result.iter().all(|&m| !conflicts(graph, kind, v, m)) {
            result.push(v);
        }
    }
    result.sort_unstable();
    result
}

fn conflicts(graph: &Graph, kind: PackingKind, a: NodeId, b: NodeId) -> bool {
    match kind {
        PackingKind::MaxWeightIndependentSet => adjacent(graph, a, b),
        PackingKind::TwoPacking => adjacent(graph, a, b) || shares_neighbor(graph, a, b),
    }
}

fn adjacent(graph: &Graph, a: NodeId, b: NodeId) -> bool {
    graph.neighbors(a).binary_search(&b).is_ok()
}

/// Whether some node is adjacent to both `a` and `b`. The neighbor lists
/// are sorted, so a two-pointer sweep suffices.
fn shares_neighbor(graph: &Graph, a: NodeId, b: NodeId) -> bool {
    let mut left = graph.neighbors(a).iter().peekable();
    let mut right = graph.neighbors(b).iter().peekable();
    while let (Some(&&x), Some(&&y)) = (left.peek(), right.peek()) {
        match x.cmp(&y) {
            std::cmp::Ordering::Less => {
                left.next();
            }
            std::cmp::Ordering::Greater => {
                right.next();
            }
            std::cmp::Ordering::Equal => return true,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(i: usize) -> NodeId {
        NodeId::new(i)
    }

    fn path(weights: &[f64]) -> Graph {
        let mut g = Graph::new(weights.len());
        for i in 0..weights.len().saturating_sub(1) {
            g.add_edge(n(i), n(i + 1)).unwrap();
        }
        for (i, &w) in weights.iter().enumerate() {
            g.set_node_weight(n(i), w).unwrap();
        }
        g
    }

    fn star(center_weight: f64, leaf_weights: &[f64]) -> Graph {
        let mut g = Graph::new(leaf_weights.len() + 1);
        g.set_node_weight(n(0), center_weight).unwrap();
        for (i, &w) in leaf_weights.iter().enumerate() {
            g.add_edge(n(0), n(i + 1)).unwrap();
            g.set_node_weight(n(i + 1), w).unwrap();
        }
        g
    }

    #[test]
    fn test_rejects_infeasible_independent_set() {
        let g = path(&[1.0, 1.0, 1.0]);
        let improver = SwapImprover::new();
        let result = improver.improve(
            &g,
            &[n(0), n(1)],
            PackingKind::MaxWeightIndependentSet,
        );
        assert!(matches!(
            result,
            Err(ImproverError::InfeasibleInput(
                PackingKind::MaxWeightIndependentSet
            ))
        ));
    }

    #[test]
    fn test_rejects_infeasible_two_packing() {
        let g = path(&[1.0; 5]);
        let improver = SwapImprover::new();
        let result = improver.improve(&g, &[n(0), n(2)], PackingKind::TwoPacking);
        assert!(matches!(
            result,
            Err(ImproverError::InfeasibleInput(PackingKind::TwoPacking))
        ));
    }

    #[test]
    fn test_dropping_heavy_center_admits_leaves() {
        let g = star(5.0, &[3.0, 3.0, 3.0]);
        let improver = SwapImprover::new();
        let better = improver
            .improve(&g, &[n(0)], PackingKind::MaxWeightIndependentSet)
            .unwrap()
            .unwrap();
        assert_eq!(better, vec![n(1), n(2), n(3)]);
        assert!(is_independent_set(&g, &better));
    }

    #[test]
    fn test_extends_non_maximal_input() {
        let g = path(&[1.0; 5]);
        let improver = SwapImprover::new();
        let better = improver
            .improve(&g, &[n(0), n(2)], PackingKind::MaxWeightIndependentSet)
            .unwrap()
            .unwrap();
        assert_eq!(better, vec![n(0), n(2), n(4)]);
    }

    #[test]
    fn test_maximal_optimum_returns_none() {
        let g = path(&[1.0, 1.0, 1.0]);
        let improver = SwapImprover::new();
        let result = improver
            .improve(&g, &[n(0), n(2)], PackingKind::MaxWeightIndependentSet)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_two_packing_without_materialized_cache() {
        let g = path(&[1.0; 5]);
        assert!(!g.has_two_hop_cache());
        let improver = SwapImprover::new();
        let better = improver
            .improve(&g, &[n(2)], PackingKind::TwoPacking)
            .unwrap()
            .unwrap();
        assert_eq!(better, vec![n(0), n(3)]);
        assert!(is_two_packing(&g, &better));
    }

    #[test]
    fn test_zero_rounds_only_validates() {
        let g = path(&[1.0; 5]);
        let improver = SwapImprover::new().max_rounds(0);
        let result = improver
            .improve(&g, &[n(0), n(2)], PackingKind::MaxWeightIndependentSet)
            .unwrap();
        assert!(result.is_none());
        assert!(matches!(
            improver.improve(&g, &[n(0), n(1)], PackingKind::MaxWeightIndependentSet),
            Err(ImproverError::InfeasibleInput(_))
        ));
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let g = star(5.0, &[3.0, 2.0, 3.0]);
        let a = SwapImprover::new().seed(7);
        let b = SwapImprover::new().seed(7);
        assert_eq!(
            a.improve(&g, &[n(0)], PackingKind::MaxWeightIndependentSet)
                .unwrap(),
            b.improve(&g, &[n(0)], PackingKind::MaxWeightIndependentSet)
                .unwrap()
        );
    }
}
