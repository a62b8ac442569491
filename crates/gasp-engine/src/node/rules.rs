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

//! The seam between the generic search machinery and the two packing
//! constraints.
//!
//! Everything constraint specific lives behind this trait: the objective a
//! node contributes, which nodes it forbids, when two candidates clash,
//! the admissible completion estimate, and the greedy scoring of candidate
//! singletons. Implementations are zero-sized; the engine is monomorphized
//! over them and pays no dispatch cost on the hot path.

use crate::params::SearchParams;
use fixedbitset::FixedBitSet;
use gasp_graph::{graph::Graph, index::NodeId, solution::PackingKind};
use rand::rngs::SmallRng;

/// Constraint-specific behavior of a `SearchNode`.
pub trait PackingRules: Send + Sync + 'static {
    /// The packing constraint these rules implement.
    const KIND: PackingKind;

    /// Objective contribution of a single node.
    fn node_value(graph: &Graph, node: NodeId) -> f64;

    /// Marks `node` and every node in conflict with it in `forbidden`.
    fn forbid(graph: &Graph, node: NodeId, forbidden: &mut FixedBitSet);

    /// Whether `a` and `b` cannot both be members of one packing.
    fn conflicts(graph: &Graph, a: NodeId, b: NodeId) -> bool;

    /// Upper estimate of the objective value still obtainable from nodes
    /// outside `forbidden`. The loose form must stay cheap and never
    /// understate the true completion; the tight form may scan
    /// neighborhoods and prunes harder at the price of that guarantee.
    fn completion_estimate(
        graph: &Graph,
        forbidden: &FixedBitSet,
        tight: bool,
        max_graph_weight: f64,
    ) -> f64;

    /// The locally best non-forbidden singletons, within the configured
    /// fudge factor, plus any randomly admitted extras.
    fn best_singles(
        graph: &Graph,
        forbidden: &FixedBitSet,
        params: &SearchParams,
        depth: usize,
        rng: &mut SmallRng,
    ) -> Vec<NodeId>;

    /// Sharpening applied to a child's bound before the incumbent screen.
    /// Integral objectives round down; fractional headroom below the next
    /// integer cannot hold another node.
    #[inline]
    fn sharpen(bound: f64) -> f64 {
        bound
    }
}
