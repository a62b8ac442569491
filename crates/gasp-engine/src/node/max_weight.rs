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

//! Rules for the maximum-weight independent set problem (1-packing).
//!
//! Members must be pairwise non-adjacent; the objective is the total node
//! weight. Candidate singletons are scored greedily by weight (or by the
//! GWMIN2 ratio of weight to open closed-neighborhood weight), with the
//! fudge factor keeping near-best nodes alive alongside the best one.

use crate::node::rules::PackingRules;
use crate::params::SearchParams;
use fixedbitset::FixedBitSet;
use gasp_graph::{graph::Graph, index::NodeId, solution::PackingKind};
use rand::rngs::SmallRng;
use rand::Rng;

/// Maximum-weight independent set rules: adjacency is the conflict
/// relation, weight is the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaxWeightRules;

impl PackingRules for MaxWeightRules {
    const KIND: PackingKind = PackingKind::MaxWeightIndependentSet;

    #[inline]
    fn node_value(graph: &Graph, node: NodeId) -> f64 {
        graph.node_weight(node)
    }

    fn forbid(graph: &Graph, node: NodeId, forbidden: &mut FixedBitSet) {
        forbidden.insert(node.get());
        for &u in graph.neighbors(node) {
            forbidden.insert(u.get());
        }
    }

    #[inline]
    fn conflicts(graph: &Graph, a: NodeId, b: NodeId) -> bool {
        graph.neighbors(a).binary_search(&b).is_ok()
    }

    fn completion_estimate(
        graph: &Graph,
        forbidden: &FixedBitSet,
        tight: bool,
        max_graph_weight: f64,
    ) -> f64 {
        let open_count = (graph.num_nodes() - forbidden.count_ones(..)) as f64;
        if !tight {
            return open_count * max_graph_weight;
        }
        // Tight form: the heaviest open weight over half the open count.
        // The maximum is taken over open nodes only; with none open the
        // product is zero regardless of the fallback.
        let mut max_open: Option<f64> = None;
        for v in 0..graph.num_nodes() {
            if !forbidden.contains(v) {
                let w = graph.node_weight(NodeId::new(v));
                max_open = Some(max_open.map_or(w, |m| m.max(w)));
            }
        }
        open_count * max_open.unwrap_or(1.0) / 2.0
    }

    fn best_singles(
        graph: &Graph,
        forbidden: &FixedBitSet,
        params: &SearchParams,
        depth: usize,
        rng: &mut SmallRng,
    ) -> Vec<NodeId> {
        let n = graph.num_nodes();
        let ff = params.fitness_factor;
        let use_gwmin2 = params.use_gwmin2;
        let mut best: Vec<NodeId> = Vec::new();
        // Two trackers: the largest score seen and the smallest open
        // neighbor weight among near-best nodes.
        let mut best_node_cost = f64::NEG_INFINITY;
        let mut best_cost = f64::MAX;

        for i in 0..n {
            if forbidden.contains(i) {
                continue;
            }
            let ni = NodeId::new(i);
            let ni_score = score(graph, forbidden, ni, use_gwmin2);

            if ni_score > best_node_cost {
                if ff >= 1.0 {
                    best.clear();
                } else {
                    // Drop members that are now too light compared to the
                    // new best.
                    best.retain(|&m| score(graph, forbidden, m, use_gwmin2) >= ni_score * ff);
                }
                push_unique(&mut best, ni);
                best_node_cost = ni_score;
            }

            // Tie-break near-best nodes by how little open neighbor weight
            // they block. The GWMIN2 score already accounts for the
            // neighborhood, so the second criterion is skipped there.
            if ni_score >= ff * best_node_cost && !use_gwmin2 {
                let ni_open = open_neighbor_weight(graph, forbidden, ni);
                if ni_open < best_cost {
                    if ff >= 1.0 {
                        best.clear();
                    } else {
                        best.retain(|&m| {
                            open_neighbor_weight(graph, forbidden, m) <= ni_open * (2.0 - ff)
                        });
                    }
                    push_unique(&mut best, ni);
                    best_cost = ni_open;
                } else if ni_open <= best_cost * (2.0 - ff) {
                    push_unique(&mut best, ni);
                }
            }
        }

        if params.extra_candidates_rate > 0.0 && depth > 0 {
            let expected = best_cost * params.extra_candidates_rate;
            for i in 0..n {
                if forbidden.contains(i) {
                    continue;
                }
                let ni = NodeId::new(i);
                let ni_open = open_neighbor_weight(graph, forbidden, ni);
                let fitness = if ni_open > 0.0 { best_cost / ni_open } else { 1.0 };
                let prob = expected * fitness / (n as f64 * (depth as f64).sqrt());
                if rng.random::<f64>() < prob {
                    push_unique(&mut best, ni);
                }
            }
        }

        best
    }
}

/// Candidate score: plain weight, or the GWMIN2 ratio of the weight to the
/// total open weight of the closed neighborhood.
fn score(graph: &Graph, forbidden: &FixedBitSet, node: NodeId, use_gwmin2: bool) -> f64 {
    let w = graph.node_weight(node);
    if !use_gwmin2 {
        return w;
    }
    let mut denom = w;
    for &u in graph.neighbors(node) {
        if !forbidden.contains(u.get()) {
            denom += graph.node_weight(u);
        }
    }
    w / denom
}

/// Total weight of the non-forbidden 1-hop neighbors of `node`.
fn open_neighbor_weight(graph: &Graph, forbidden: &FixedBitSet, node: NodeId) -> f64 {
    graph
        .neighbors(node)
        .iter()
        .filter(|u| !forbidden.contains(u.get()))
        .map(|&u| graph.node_weight(u))
        .sum()
}

fn push_unique(best: &mut Vec<NodeId>, node: NodeId) {
    if !best.contains(&node) {
        best.push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn n(i: usize) -> NodeId {
        NodeId::new(i)
    }

    fn weighted_path(weights: &[f64]) -> Graph {
        let mut g = Graph::new(weights.len());
        for i in 0..weights.len().saturating_sub(1) {
            g.add_edge(n(i), n(i + 1)).unwrap();
        }
        for (i, &w) in weights.iter().enumerate() {
            g.set_node_weight(n(i), w).unwrap();
        }
        g
    }

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn test_forbid_closes_neighborhood() {
        let g = weighted_path(&[1.0, 1.0, 1.0]);
        let mut forbidden = FixedBitSet::with_capacity(3);
        MaxWeightRules::forbid(&g, n(1), &mut forbidden);
        assert!(forbidden.contains(0));
        assert!(forbidden.contains(1));
        assert!(forbidden.contains(2));
    }

    #[test]
    fn test_conflicts_is_adjacency() {
        let g = weighted_path(&[1.0, 1.0, 1.0]);
        assert!(MaxWeightRules::conflicts(&g, n(0), n(1)));
        assert!(!MaxWeightRules::conflicts(&g, n(0), n(2)));
    }

    #[test]
    fn test_completion_estimates() {
        let g = weighted_path(&[5.0, 1.0, 1.0]);
        let mut forbidden = FixedBitSet::with_capacity(3);
        let max_w = g.max_node_weight();
        assert_eq!(
            MaxWeightRules::completion_estimate(&g, &forbidden, false, max_w),
            15.0
        );
        assert_eq!(
            MaxWeightRules::completion_estimate(&g, &forbidden, true, max_w),
            7.5
        );
        // With the heavy node gone the tight estimate drops far below the
        // loose one.
        forbidden.insert(0);
        assert_eq!(
            MaxWeightRules::completion_estimate(&g, &forbidden, false, max_w),
            10.0
        );
        assert_eq!(
            MaxWeightRules::completion_estimate(&g, &forbidden, true, max_w),
            1.0
        );
        forbidden.insert(1);
        forbidden.insert(2);
        assert_eq!(
            MaxWeightRules::completion_estimate(&g, &forbidden, true, max_w),
            0.0
        );
    }

    #[test]
    fn test_best_singles_prefers_heavy_node() {
        let g = weighted_path(&[5.0, 1.0, 1.0]);
        let forbidden = FixedBitSet::with_capacity(3);
        let params = SearchParams::new(PackingKind::MaxWeightIndependentSet);
        let best = MaxWeightRules::best_singles(&g, &forbidden, &params, 1, &mut rng());
        assert_eq!(best, vec![n(0)]);
    }

    #[test]
    fn test_best_singles_new_heavy_node_expels_light_ones() {
        let g = weighted_path(&[1.0, 1.0, 5.0]);
        let forbidden = FixedBitSet::with_capacity(3);
        let params = SearchParams::new(PackingKind::MaxWeightIndependentSet);
        let best = MaxWeightRules::best_singles(&g, &forbidden, &params, 1, &mut rng());
        assert_eq!(best, vec![n(2)]);
    }

    #[test]
    fn test_best_singles_unit_path_keeps_both_endpoints() {
        // Equal weights: the endpoints block only one open neighbor each
        // while the middle blocks two, so both endpoints survive.
        let g = weighted_path(&[1.0, 1.0, 1.0]);
        let forbidden = FixedBitSet::with_capacity(3);
        let params = SearchParams::new(PackingKind::MaxWeightIndependentSet);
        let best = MaxWeightRules::best_singles(&g, &forbidden, &params, 1, &mut rng());
        assert_eq!(best, vec![n(0), n(2)]);
    }

    #[test]
    fn test_gwmin2_scores_weight_over_open_neighborhood() {
        let g = weighted_path(&[1.0, 1.0, 1.0]);
        let forbidden = FixedBitSet::with_capacity(3);
        assert_eq!(score(&g, &forbidden, n(0), true), 0.5);
        assert!((score(&g, &forbidden, n(1), true) - 1.0 / 3.0).abs() < 1e-12);
        let params =
            SearchParams::new(PackingKind::MaxWeightIndependentSet).use_gwmin2(true);
        let best = MaxWeightRules::best_singles(&g, &forbidden, &params, 1, &mut rng());
        // Strict improvement only: the equal-scored far endpoint is not
        // admitted.
        assert_eq!(best, vec![n(0)]);
    }

    #[test]
    fn test_extras_admit_everything_at_saturated_rate() {
        let g = weighted_path(&[1.0, 1.0, 1.0]);
        let forbidden = FixedBitSet::with_capacity(3);
        let params = SearchParams::new(PackingKind::MaxWeightIndependentSet)
            .extra_candidates_rate(100.0);
        let best = MaxWeightRules::best_singles(&g, &forbidden, &params, 1, &mut rng());
        // The admission probability exceeds 1 for every node at this rate.
        assert_eq!(best, vec![n(0), n(2), n(1)]);
    }

    #[test]
    fn test_extras_skipped_at_root_depth() {
        let g = weighted_path(&[1.0, 1.0, 1.0]);
        let forbidden = FixedBitSet::with_capacity(3);
        let params = SearchParams::new(PackingKind::MaxWeightIndependentSet)
            .extra_candidates_rate(100.0);
        let best = MaxWeightRules::best_singles(&g, &forbidden, &params, 0, &mut rng());
        assert_eq!(best, vec![n(0), n(2)]);
    }
}
