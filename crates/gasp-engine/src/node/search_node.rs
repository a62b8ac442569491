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

//! One node of the branch-and-bound tree and its execution protocol.
//!
//! ## Motivation
//!
//! A `SearchNode` is a partial packing under construction: the sorted
//! member set, its cost, the bound computed once at construction, and the
//! depth. `execute` runs the whole per-node protocol on the calling worker
//! thread: budget and prune checks, the greedy augmentation loop that
//! absorbs forced extensions, incumbent bookkeeping, duplicate
//! suppression, and finally either branching into children or closing the
//! node as a leaf with an optional local-search pass.
//!
//! ## Lifecycle
//!
//! Every node must end in exactly one call to [`SearchNode::finish`] (or
//! its quiet variant). The only path that defers this is a successful
//! publication of children to the queue: completion of the node is then
//! owed to the last finishing child, which walks the parent chain through
//! the node's [`NodeShell`]. The shell outlives the node object for
//! exactly this purpose.

use crate::ctx::SearchCtx;
use crate::improver::PackingImprover;
use crate::node::candidates::{
    grow_max_subsets, singleton_family, sort_heaviest_first, CandidateSet,
};
use crate::node::rules::PackingRules;
use crate::node::shell::NodeShell;
use crate::queue::BatchOutcome;
use fixedbitset::FixedBitSet;
use gasp_graph::{graph::Graph, index::NodeId};
use rand::rngs::SmallRng;
use std::marker::PhantomData;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

/// A partial packing in the branch-and-bound tree.
///
/// The member set is sorted and duplicate free at all times. `cost` is the
/// members' total objective value; `bound` is computed exactly once, at
/// construction, and deliberately not refreshed afterwards.
#[derive(Debug)]
pub struct SearchNode<R: PackingRules> {
    shell: Arc<NodeShell>,
    active: Vec<NodeId>,
    cost: f64,
    bound: f64,
    depth: usize,
    _rules: PhantomData<R>,
}

impl<R: PackingRules> SearchNode<R> {
    /// Creates the root node: empty member set, depth 0.
    pub(crate) fn root(ctx: &SearchCtx<'_, R>) -> Self {
        let id = ctx.next_node_id();
        let bound = Self::evaluate_bound(ctx, &[], 0.0, 0);
        Self {
            shell: NodeShell::root(id),
            active: Vec::new(),
            cost: 0.0,
            bound,
            depth: 0,
            _rules: PhantomData,
        }
    }

    /// Creates the child reached by adding `additions` to this node's
    /// member set. The child's bound is evaluated here, eagerly.
    fn child(&self, ctx: &SearchCtx<'_, R>, additions: &[NodeId]) -> Self {
        let id = ctx.next_node_id();
        let mut active = self.active.clone();
        let mut cost = self.cost;
        for &v in additions {
            if let Err(pos) = active.binary_search(&v) {
                active.insert(pos, v);
                cost += R::node_value(ctx.graph, v);
            }
        }
        let depth = self.depth + 1;
        let bound = Self::evaluate_bound(ctx, &active, cost, depth);
        Self {
            shell: NodeShell::child(&self.shell, id),
            active,
            cost,
            bound,
            depth,
            _rules: PhantomData,
        }
    }

    /// Test constructor bypassing the context bookkeeping.
    #[cfg(test)]
    pub(crate) fn for_tests(mut active: Vec<NodeId>, cost: f64, bound: f64, depth: usize) -> Self {
        active.sort_unstable();
        Self {
            shell: NodeShell::root(0),
            active,
            cost,
            bound,
            depth,
            _rules: PhantomData,
        }
    }

    /// Returns the sorted member ids.
    #[inline]
    pub fn active(&self) -> &[NodeId] {
        &self.active
    }

    /// Returns the members' total objective value.
    #[inline]
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Returns the bound computed at construction.
    #[inline]
    pub fn bound(&self) -> f64 {
        self.bound
    }

    /// Returns the tree depth; the root is at 0.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns a fresh shared fingerprint of the member set.
    pub(crate) fn fingerprint(&self) -> Arc<[NodeId]> {
        Arc::from(self.active.as_slice())
    }

    /// Bound of a node with the given members: cost plus the completion
    /// estimate over the still-open nodes. Depths at or past the current
    /// tighten level pay for the tight estimate.
    fn evaluate_bound(ctx: &SearchCtx<'_, R>, active: &[NodeId], cost: f64, depth: usize) -> f64 {
        let mut forbidden = FixedBitSet::with_capacity(ctx.graph.num_nodes());
        for &v in active {
            R::forbid(ctx.graph, v, &mut forbidden);
        }
        let tight = depth >= ctx.tighten_level.load(Ordering::Relaxed);
        cost + R::completion_estimate(ctx.graph, &forbidden, tight, ctx.max_graph_weight)
    }

    /// Adds `additions` to the member set in place. The bound keeps its
    /// construction-time value.
    fn absorb(&mut self, graph: &Graph, additions: &[NodeId]) {
        for &v in additions {
            if let Err(pos) = self.active.binary_search(&v) {
                self.active.insert(pos, v);
                self.cost += R::node_value(graph, v);
            }
        }
    }

    /// The family of candidate extension sets for the current member set.
    ///
    /// At the root every free node is its own singleton, so the queue is
    /// seeded as wide as possible. Deeper nodes score candidates first and
    /// optionally grow them into maximal combinations.
    fn candidate_family(&self, ctx: &SearchCtx<'_, R>, rng: &mut SmallRng) -> Vec<CandidateSet> {
        let graph = ctx.graph;
        let mut forbidden = FixedBitSet::with_capacity(graph.num_nodes());
        for &v in &self.active {
            R::forbid(graph, v, &mut forbidden);
        }
        if self.depth == 0 {
            let singles: Vec<NodeId> = (0..graph.num_nodes())
                .filter(|&v| !forbidden.contains(v))
                .map(NodeId::new)
                .collect();
            return singleton_family(&singles);
        }
        let singles = R::best_singles(graph, &forbidden, ctx.params, self.depth, rng);
        if !ctx.params.use_max_subsets {
            return singleton_family(&singles);
        }
        grow_max_subsets::<R>(graph, &singles, ctx.params.max_combination_iters)
    }

    /// Runs the full per-node protocol. Consumes the node; its shell lives
    /// on in any published children.
    pub(crate) fn execute(mut self, ctx: &SearchCtx<'_, R>, rng: &mut SmallRng) {
        // Cooperative budget: nodes popped after the limit finish
        // immediately so the termination walk still completes.
        if ctx.created.load(Ordering::Relaxed) > ctx.params.max_nodes {
            ctx.budget_hit.store(true, Ordering::Relaxed);
            self.finish(ctx);
            return;
        }
        if self.bound <= ctx.incumbent.weight() || self.bound < ctx.params.min_known_bound {
            self.finish(ctx);
            return;
        }

        // Greedy augmentation: exactly one extension set means there is no
        // branching decision to make yet. The bound keeps its
        // construction-time value through these absorptions.
        let mut family = self.candidate_family(ctx, rng);
        while family.len() == 1 {
            if let Some(additions) = family.pop() {
                self.absorb(ctx.graph, &additions);
            }
            family = self.candidate_family(ctx, rng);
        }

        if family.is_empty() {
            ctx.leaves.fetch_add(1, Ordering::Relaxed);
        }

        // Near-best admission: the flag trips at expand_factor times the
        // incumbent, the incumbent itself moves only on strict improvement.
        let mut found_incumbent =
            self.cost * ctx.params.expand_factor >= ctx.incumbent.weight();
        if found_incumbent {
            ctx.install(&self.active, self.cost);
        }

        if let Some(dedup) = &ctx.dedup {
            if !dedup.insert(&self.fingerprint()) {
                self.finish_quiet(ctx);
                return;
            }
        }

        if family.is_empty() {
            if found_incumbent {
                ctx.reduce_tighten_level();
                if let Some(improver) = ctx.improver {
                    self.run_local_search(ctx, improver);
                }
            }
            self.finish(ctx);
            return;
        }

        if ctx.params.sort_candidate_sets {
            sort_heaviest_first::<R>(ctx.graph, &mut family);
        }

        let mut children = Vec::with_capacity(family.len());
        for additions in &family {
            // The root is exempt from the cap: cutting there would discard
            // whole subtrees no other branch revisits.
            if self.depth > 0 && children.len() >= ctx.params.max_children {
                break;
            }
            let child = self.child(ctx, additions);
            let incumbent = ctx.incumbent.weight();
            if R::sharpen(child.bound) <= incumbent || child.bound < ctx.params.min_known_bound {
                continue;
            }
            if child.cost > incumbent {
                ctx.install(&child.active, child.cost);
                found_incumbent = true;
            }
            children.push(child);
        }

        if children.is_empty() {
            if found_incumbent {
                ctx.reduce_tighten_level();
            }
            self.finish(ctx);
            return;
        }

        // Publication order: pending must cover the children before any of
        // them can finish on another thread.
        self.shell.set_pending(children.len());
        match ctx.queue.insert_batch(children) {
            BatchOutcome::Accepted { duplicates } => {
                for duplicate in duplicates {
                    duplicate.finish_quiet(ctx);
                }
            }
            BatchOutcome::Rejected(children) => {
                if ctx.params.cut_on_overflow {
                    self.shell.set_pending(0);
                    self.finish(ctx);
                } else {
                    for child in children {
                        child.execute(ctx, rng);
                    }
                }
            }
        }
    }

    /// Marks this node done: records its fingerprint as recently seen,
    /// then notifies the parent chain.
    pub(crate) fn finish(&self, ctx: &SearchCtx<'_, R>) {
        if let Some(dedup) = &ctx.dedup {
            dedup.insert(&self.fingerprint());
        }
        self.finish_quiet(ctx);
    }

    /// Notifies the parent chain without touching the dedup cache. Used
    /// for duplicate hand-backs, where recording the fingerprint would
    /// fathom the still-queued twin.
    pub(crate) fn finish_quiet(&self, ctx: &SearchCtx<'_, R>) {
        let mut current = &self.shell;
        loop {
            match current.parent() {
                None => {
                    ctx.queue.mark_all_done();
                    return;
                }
                Some(parent) => {
                    if parent.complete_child() {
                        current = parent;
                    } else {
                        return;
                    }
                }
            }
        }
    }

    /// One local-search attempt on the current member set. A strictly
    /// better feasible result is adopted and installed; failures are
    /// reported to the monitor and otherwise ignored.
    fn run_local_search(&mut self, ctx: &SearchCtx<'_, R>, improver: &dyn PackingImprover) {
        ctx.local_search_calls.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();
        match improver.improve(ctx.graph, &self.active, R::KIND) {
            Ok(Some(better)) => {
                let cost: f64 = better.iter().map(|&v| R::node_value(ctx.graph, v)).sum();
                if cost > self.cost {
                    self.active = better;
                    self.active.sort_unstable();
                    self.cost = cost;
                    ctx.install(&self.active, cost);
                }
            }
            Ok(None) => {}
            Err(error) => ctx.monitor.on_local_search_failed(&error),
        }
        ctx.local_search_nanos
            .fetch_add(start.elapsed().as_nanos() as u64, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::BestFirstComparator;
    use crate::improver::ImproverError;
    use crate::monitor::NoOpMonitor;
    use crate::node::max_weight::MaxWeightRules;
    use crate::node::two_packing::TwoPackingRules;
    use crate::params::SearchParams;
    use crate::queue::InsertOutcome;
    use gasp_graph::solution::{
        is_independent_set, is_two_packing, total_weight, PackingKind,
    };
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

    fn cycle(len: usize) -> Graph {
        let mut g = Graph::new(len);
        for i in 0..len {
            g.add_edge(n(i), n((i + 1) % len)).unwrap();
        }
        g
    }

    fn star(leaves: usize) -> Graph {
        let mut g = Graph::new(leaves + 1);
        for i in 1..=leaves {
            g.add_edge(n(0), n(i)).unwrap();
        }
        g
    }

    /// Single-threaded stand-in for the dispatcher/worker pair.
    fn drive<R: PackingRules>(ctx: &SearchCtx<'_, R>, rng: &mut SmallRng) {
        let root = SearchNode::<R>::root(ctx);
        assert!(matches!(ctx.queue.insert(root), InsertOutcome::Inserted));
        while let Some(node) = ctx.queue.pop_blocking() {
            if let Some(dedup) = &ctx.dedup {
                if dedup.contains(node.active()) {
                    node.finish(ctx);
                    continue;
                }
            }
            node.execute(ctx, rng);
        }
        assert!(ctx.queue.is_all_done());
    }

    fn solve<R: PackingRules>(graph: &Graph, params: &SearchParams) -> f64 {
        let comparator = BestFirstComparator::new();
        let monitor = NoOpMonitor::new();
        let ctx = SearchCtx::<R>::new(graph, params, &comparator, &monitor, None);
        let mut rng = SmallRng::seed_from_u64(params.seed);
        drive(&ctx, &mut rng);
        if let Some(best) = ctx.incumbent.snapshot() {
            assert!(best.is_feasible(graph));
            assert_eq!(best.weight(), ctx.incumbent.weight());
        }
        ctx.incumbent.weight()
    }

    fn brute_force_best(graph: &Graph, kind: PackingKind) -> f64 {
        let count = graph.num_nodes();
        let mut best = 0.0f64;
        for mask in 0u32..1 << count {
            let nodes: Vec<NodeId> = (0..count)
                .filter(|&i| mask & (1 << i) != 0)
                .map(NodeId::new)
                .collect();
            let (feasible, weight) = match kind {
                PackingKind::MaxWeightIndependentSet => {
                    (is_independent_set(graph, &nodes), total_weight(graph, &nodes))
                }
                PackingKind::TwoPacking => (is_two_packing(graph, &nodes), nodes.len() as f64),
            };
            if feasible && weight > best {
                best = weight;
            }
        }
        best
    }

    struct FixedImprover(Vec<NodeId>);

    impl PackingImprover for FixedImprover {
        fn name(&self) -> &str {
            "fixed"
        }

        fn improve(
            &self,
            _graph: &Graph,
            _packing: &[NodeId],
            _kind: PackingKind,
        ) -> Result<Option<Vec<NodeId>>, ImproverError> {
            Ok(Some(self.0.clone()))
        }
    }

    struct FailingImprover;

    impl PackingImprover for FailingImprover {
        fn name(&self) -> &str {
            "failing"
        }

        fn improve(
            &self,
            _graph: &Graph,
            _packing: &[NodeId],
            _kind: PackingKind,
        ) -> Result<Option<Vec<NodeId>>, ImproverError> {
            Err(ImproverError::Failed(String::from("no moves generated")))
        }
    }

    struct IdleImprover;

    impl PackingImprover for IdleImprover {
        fn name(&self) -> &str {
            "idle"
        }

        fn improve(
            &self,
            _graph: &Graph,
            _packing: &[NodeId],
            _kind: PackingKind,
        ) -> Result<Option<Vec<NodeId>>, ImproverError> {
            Ok(None)
        }
    }

    #[test]
    fn test_mwis_unit_path() {
        let g = weighted_path(&[1.0, 1.0, 1.0]);
        let params = SearchParams::new(PackingKind::MaxWeightIndependentSet);
        assert_eq!(solve::<MaxWeightRules>(&g, &params), 2.0);
    }

    #[test]
    fn test_mwis_weighted_path() {
        let g = weighted_path(&[5.0, 1.0, 1.0]);
        let params = SearchParams::new(PackingKind::MaxWeightIndependentSet);
        assert_eq!(solve::<MaxWeightRules>(&g, &params), 6.0);
    }

    #[test]
    fn test_mwis_four_cycle() {
        let g = cycle(4);
        let params = SearchParams::new(PackingKind::MaxWeightIndependentSet);
        assert_eq!(solve::<MaxWeightRules>(&g, &params), 2.0);
    }

    #[test]
    fn test_two_packing_path_five() {
        let mut g = weighted_path(&[1.0; 5]);
        g.materialize_two_hop();
        let params = SearchParams::new(PackingKind::TwoPacking);
        assert_eq!(solve::<TwoPackingRules>(&g, &params), 2.0);
    }

    #[test]
    fn test_two_packing_star() {
        let mut g = star(3);
        g.materialize_two_hop();
        let params = SearchParams::new(PackingKind::TwoPacking);
        assert_eq!(solve::<TwoPackingRules>(&g, &params), 1.0);
    }

    #[test]
    fn test_two_packing_cycles() {
        let mut four = cycle(4);
        four.materialize_two_hop();
        let params = SearchParams::new(PackingKind::TwoPacking);
        assert_eq!(solve::<TwoPackingRules>(&four, &params), 1.0);
        let mut six = cycle(6);
        six.materialize_two_hop();
        assert_eq!(solve::<TwoPackingRules>(&six, &params), 2.0);
    }

    #[test]
    fn test_mwis_matches_brute_force() {
        let graphs = [
            weighted_path(&[1.0, 1.0, 1.0, 1.0]),
            weighted_path(&[5.0, 1.0, 1.0]),
            cycle(4),
            {
                let mut g = cycle(5);
                for (i, w) in [2.0, 1.0, 3.0, 1.0, 1.0].into_iter().enumerate() {
                    g.set_node_weight(n(i), w).unwrap();
                }
                g
            },
        ];
        for g in &graphs {
            let expected = brute_force_best(g, PackingKind::MaxWeightIndependentSet);
            let defaults = SearchParams::new(PackingKind::MaxWeightIndependentSet);
            assert_eq!(solve::<MaxWeightRules>(g, &defaults), expected);
            let singletons = SearchParams::new(PackingKind::MaxWeightIndependentSet)
                .use_max_subsets(false);
            assert_eq!(solve::<MaxWeightRules>(g, &singletons), expected);
        }
    }

    #[test]
    fn test_two_packing_matches_brute_force() {
        let mut graphs = [weighted_path(&[1.0; 5]), cycle(6), star(4)];
        for g in &mut graphs {
            g.materialize_two_hop();
            let expected = brute_force_best(g, PackingKind::TwoPacking);
            let params = SearchParams::new(PackingKind::TwoPacking);
            assert_eq!(solve::<TwoPackingRules>(g, &params), expected);
        }
    }

    #[test]
    fn test_root_bound_admissible_with_loose_estimates() {
        let g = weighted_path(&[2.0, 3.0, 1.0, 4.0]);
        let params = SearchParams::new(PackingKind::MaxWeightIndependentSet);
        let comparator = BestFirstComparator::new();
        let monitor = NoOpMonitor::new();
        let ctx = SearchCtx::<MaxWeightRules>::new(&g, &params, &comparator, &monitor, None);
        let root = SearchNode::<MaxWeightRules>::root(&ctx);
        assert!(root.bound() >= brute_force_best(&g, PackingKind::MaxWeightIndependentSet));
    }

    #[test]
    fn test_saturated_node_has_empty_family_twice() {
        // An expansion that came back empty stays empty: nothing in the
        // node changes after it is a leaf.
        let g = weighted_path(&[1.0, 1.0, 1.0]);
        let params = SearchParams::new(PackingKind::MaxWeightIndependentSet);
        let comparator = BestFirstComparator::new();
        let monitor = NoOpMonitor::new();
        let ctx = SearchCtx::<MaxWeightRules>::new(&g, &params, &comparator, &monitor, None);
        let node = SearchNode::<MaxWeightRules>::for_tests(vec![n(0), n(2)], 2.0, 3.0, 1);
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(node.candidate_family(&ctx, &mut rng).is_empty());
        assert!(node.candidate_family(&ctx, &mut rng).is_empty());
    }

    #[test]
    fn test_node_budget_sets_flag_and_terminates() {
        let g = weighted_path(&[1.0, 1.0, 1.0]);
        let params = SearchParams::new(PackingKind::MaxWeightIndependentSet).max_nodes(1);
        let comparator = BestFirstComparator::new();
        let monitor = NoOpMonitor::new();
        let ctx = SearchCtx::<MaxWeightRules>::new(&g, &params, &comparator, &monitor, None);
        let mut rng = SmallRng::seed_from_u64(0);
        drive(&ctx, &mut rng);
        assert!(ctx.budget_hit.load(Ordering::Relaxed));
    }

    #[test]
    fn test_dedup_run_reaches_same_optimum() {
        let mut g = cycle(5);
        for (i, w) in [2.0, 1.0, 3.0, 1.0, 1.0].into_iter().enumerate() {
            g.set_node_weight(n(i), w).unwrap();
        }
        let params = SearchParams::new(PackingKind::MaxWeightIndependentSet)
            .recent_cache_capacity(16);
        assert_eq!(solve::<MaxWeightRules>(&g, &params), 5.0);
    }

    #[test]
    fn test_queue_overflow_keeps_result_exact_when_running_inline() {
        // Triangle {1,2,3} with a tail at 0 forces a branch below the
        // root, so a capacity-1 queue rejects a batch at least once.
        let mut g = Graph::new(4);
        for (a, b) in [(0, 1), (1, 2), (1, 3), (2, 3)] {
            g.add_edge(n(a), n(b)).unwrap();
        }
        let inline = SearchParams::new(PackingKind::MaxWeightIndependentSet).max_queue_size(1);
        assert_eq!(solve::<MaxWeightRules>(&g, &inline), 2.0);
        let cut = SearchParams::new(PackingKind::MaxWeightIndependentSet)
            .max_queue_size(1)
            .cut_on_overflow(true);
        assert_eq!(solve::<MaxWeightRules>(&g, &cut), 2.0);
    }

    #[test]
    fn test_tighten_level_decays_once_per_improving_leaf() {
        let g = weighted_path(&[1.0, 1.0, 1.0]);
        let params =
            SearchParams::new(PackingKind::MaxWeightIndependentSet).tighten_level(5);
        let comparator = BestFirstComparator::new();
        let monitor = NoOpMonitor::new();
        let ctx = SearchCtx::<MaxWeightRules>::new(&g, &params, &comparator, &monitor, None);
        let mut rng = SmallRng::seed_from_u64(0);
        drive(&ctx, &mut rng);
        assert_eq!(ctx.tighten_level.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn test_local_search_adopts_strict_improvement() {
        let g = weighted_path(&[1.0, 5.0, 1.0]);
        let params = SearchParams::new(PackingKind::MaxWeightIndependentSet);
        let comparator = BestFirstComparator::new();
        let monitor = NoOpMonitor::new();
        let improver = FixedImprover(vec![n(1)]);
        let ctx = SearchCtx::<MaxWeightRules>::new(&g, &params, &comparator, &monitor, None);
        let mut node = SearchNode::<MaxWeightRules>::for_tests(vec![n(0), n(2)], 2.0, 2.0, 2);
        node.run_local_search(&ctx, &improver);
        assert_eq!(node.active(), &[n(1)]);
        assert_eq!(node.cost(), 5.0);
        assert_eq!(ctx.incumbent.weight(), 5.0);
        assert_eq!(ctx.local_search_calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_local_search_ignores_non_improving_result() {
        let g = weighted_path(&[1.0, 1.0, 1.0]);
        let params = SearchParams::new(PackingKind::MaxWeightIndependentSet);
        let comparator = BestFirstComparator::new();
        let monitor = NoOpMonitor::new();
        let improver = FixedImprover(vec![n(1)]);
        let ctx = SearchCtx::<MaxWeightRules>::new(&g, &params, &comparator, &monitor, None);
        let mut node = SearchNode::<MaxWeightRules>::for_tests(vec![n(0), n(2)], 2.0, 2.0, 2);
        node.run_local_search(&ctx, &improver);
        assert_eq!(node.active(), &[n(0), n(2)]);
        assert_eq!(node.cost(), 2.0);
    }

    #[test]
    fn test_local_search_failure_is_benign() {
        let g = weighted_path(&[1.0, 1.0, 1.0]);
        let params = SearchParams::new(PackingKind::MaxWeightIndependentSet);
        let comparator = BestFirstComparator::new();
        let monitor = NoOpMonitor::new();
        let improver = FailingImprover;
        let ctx = SearchCtx::<MaxWeightRules>::new(&g, &params, &comparator, &monitor, None);
        let mut node = SearchNode::<MaxWeightRules>::for_tests(vec![n(0), n(2)], 2.0, 2.0, 2);
        node.run_local_search(&ctx, &improver);
        assert_eq!(node.active(), &[n(0), n(2)]);
        assert_eq!(ctx.local_search_calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_expand_factor_widens_local_search_admission() {
        let g = weighted_path(&[1.0, 5.0, 1.0]);
        let comparator = BestFirstComparator::new();
        let monitor = NoOpMonitor::new();
        let improver = IdleImprover;
        let params = SearchParams::new(PackingKind::MaxWeightIndependentSet)
            .expand_factor(2.5);
        let ctx = SearchCtx::<MaxWeightRules>::new(
            &g,
            &params,
            &comparator,
            &monitor,
            Some(&improver),
        );
        let mut rng = SmallRng::seed_from_u64(0);
        drive(&ctx, &mut rng);
        // The weight-2 leaf reaches local search only through the
        // near-best admission window.
        assert!(ctx.local_search_calls.load(Ordering::Relaxed) >= 2);
        assert_eq!(ctx.incumbent.weight(), 5.0);
    }
}
