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

//! Rules for the maximum-cardinality 2-packing problem.
//!
//! Members must be pairwise more than two hops apart, so the conflict
//! relation is the materialized distance-≤2 neighborhood and every node
//! contributes 1 to the objective. Candidate singletons are the free nodes
//! whose open 2-hop neighborhood is smallest; they block the fewest other
//! choices.
//!
//! All queries go through [`Graph::two_hop_neighbors`], so the cache must
//! be materialized before a run starts; `SearchParams::validate` enforces
//! that.

use crate::node::rules::PackingRules;
use crate::params::SearchParams;
use fixedbitset::FixedBitSet;
use gasp_graph::{graph::Graph, index::NodeId, solution::PackingKind};
use rand::rngs::SmallRng;
use rand::Rng;

/// 2-packing rules: the distance-≤2 reach is the conflict relation, the
/// cardinality is the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TwoPackingRules;

impl PackingRules for TwoPackingRules {
    const KIND: PackingKind = PackingKind::TwoPacking;

    #[inline]
    fn node_value(_graph: &Graph, _node: NodeId) -> f64 {
        1.0
    }

    fn forbid(graph: &Graph, node: NodeId, forbidden: &mut FixedBitSet) {
        forbidden.insert(node.get());
        for &u in graph.two_hop_neighbors(node) {
            forbidden.insert(u.get());
        }
    }

    #[inline]
    fn conflicts(graph: &Graph, a: NodeId, b: NodeId) -> bool {
        graph.two_hop_neighbors(a).binary_search(&b).is_ok()
    }

    fn completion_estimate(
        graph: &Graph,
        forbidden: &FixedBitSet,
        tight: bool,
        _max_graph_weight: f64,
    ) -> f64 {
        if !tight {
            return (graph.num_nodes() - forbidden.count_ones(..)) as f64;
        }
        // Tight form: bucket the open nodes by their residual open 2-hop
        // degree. Nodes with one open 2-hop neighbor pairwise exclude each
        // other, so two of them count as one, and so on; sparse buckets
        // past degree 2 are discounted by the smallest such degree seen.
        let mut discounted = vec![0u32; graph.max_two_hop_degree() + 1];
        for v in 0..graph.num_nodes() {
            if forbidden.contains(v) {
                continue;
            }
            let open_degree = graph
                .two_hop_neighbors(NodeId::new(v))
                .iter()
                .filter(|u| !forbidden.contains(u.get()))
                .count();
            discounted[open_degree] += 1;
        }
        let mut estimate = 0.0;
        let mut min_large: Option<f64> = None;
        for (d, &count) in discounted.iter().enumerate() {
            if d <= 2 {
                estimate += count as f64 / (d + 1) as f64;
            } else if count > 0 {
                estimate += count as f64 / *min_large.get_or_insert(d as f64);
            }
        }
        estimate
    }

    fn best_singles(
        graph: &Graph,
        forbidden: &FixedBitSet,
        params: &SearchParams,
        depth: usize,
        rng: &mut SmallRng,
    ) -> Vec<NodeId> {
        let n = graph.num_nodes();
        let mut best: Vec<NodeId> = Vec::new();
        let mut best_cost = f64::MAX;

        for i in 0..n {
            if forbidden.contains(i) {
                continue;
            }
            let ni = NodeId::new(i);
            let ni_open = open_two_hop_degree(graph, forbidden, ni);
            if ni_open < best_cost {
                best.clear();
                best.push(ni);
                best_cost = ni_open;
            } else if ni_open == best_cost {
                push_unique(&mut best, ni);
            }
        }

        if params.extra_candidates_rate > 0.0 && depth > 0 {
            let expected = best.len() as f64 * params.extra_candidates_rate;
            for i in 0..n {
                if forbidden.contains(i) {
                    continue;
                }
                let ni = NodeId::new(i);
                let ni_open = open_two_hop_degree(graph, forbidden, ni);
                let fitness = if ni_open > 0.0 { best_cost / ni_open } else { 1.0 };
                let prob = expected * fitness / (n as f64 * (depth as f64).sqrt());
                if rng.random::<f64>() < prob {
                    push_unique(&mut best, ni);
                }
            }
        }

        best
    }

    /// Cardinality is integral: fractional headroom below the next integer
    /// cannot hold another node.
    #[inline]
    fn sharpen(bound: f64) -> f64 {
        bound.floor()
    }
}

/// Number of non-forbidden nodes within two hops of `node`.
fn open_two_hop_degree(graph: &Graph, forbidden: &FixedBitSet, node: NodeId) -> f64 {
    graph
        .two_hop_neighbors(node)
        .iter()
        .filter(|u| !forbidden.contains(u.get()))
        .count() as f64
}

fn push_unique(best: &mut Vec<NodeId>, node: NodeId) {
    if !best.contains(&node) {
        best.push(node);
    }
}
