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

//! # Search Tree (Engine Entry Point)
//!
//! `SearchTree` owns the configuration of a search and runs it to
//! completion: parameters, node-ordering strategy, optional local-search
//! collaborator, and progress monitor. One call to [`SearchTree::run`]
//! solves one graph; the tree itself is reusable across runs.
//!
//! ## Motivation
//!
//! - One generic engine, two problems: the tree is generic over
//!   [`PackingRules`], so maximum-weight independent sets and 2-packings
//!   share every line of search machinery.
//! - Scoped threading: the dispatcher and workers are spawned inside
//!   `std::thread::scope`, borrow the run context directly, and are all
//!   joined before `run` returns. No detached threads, no `Arc` webs.
//! - Failures are values: invalid configurations and worker panics come
//!   back as [`SearchError`], never as a crash of the calling thread.
//!
//! ## Usage
//!
//! ```rust
//! use gasp_engine::params::SearchParams;
//! use gasp_engine::tree::MaxWeightSearchTree;
//! use gasp_graph::graph::Graph;
//! use gasp_graph::index::NodeId;
//! use gasp_graph::solution::PackingKind;
//!
//! let mut graph = Graph::new(3);
//! graph.add_edge(NodeId::new(0), NodeId::new(1)).unwrap();
//! graph.add_edge(NodeId::new(1), NodeId::new(2)).unwrap();
//!
//! let tree = MaxWeightSearchTree::new(
//!     SearchParams::new(PackingKind::MaxWeightIndependentSet),
//! );
//! let outcome = tree.run(&graph).unwrap();
//! assert_eq!(outcome.best().unwrap().weight(), 2.0);
//! assert!(outcome.is_exhausted());
//! ```

use crate::comparator::{BestFirstComparator, NodeComparator};
use crate::ctx::SearchCtx;
use crate::improver::PackingImprover;
use crate::monitor::{NoOpMonitor, SearchMonitor};
use crate::node::max_weight::MaxWeightRules;
use crate::node::rules::PackingRules;
use crate::node::search_node::SearchNode;
use crate::node::two_packing::TwoPackingRules;
use crate::params::{ParamsError, SearchParams};
use crate::pool::{dispatcher_loop, worker_loop};
use crate::queue::InsertOutcome;
use crate::result::SearchOutcome;
use crate::stats::SearchStatisticsBuilder;
use gasp_graph::graph::Graph;
use std::marker::PhantomData;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

/// Searches for maximum-weight independent sets.
pub type MaxWeightSearchTree = SearchTree<MaxWeightRules>;

/// Searches for maximum-cardinality 2-packings.
pub type TwoPackingSearchTree = SearchTree<TwoPackingRules>;

/// Failures of [`SearchTree::run`].
#[derive(Debug)]
pub enum SearchError {
    /// The configuration was rejected before any thread started.
    InvalidParams(ParamsError),
    /// A worker thread panicked; the run was aborted and the partial
    /// result discarded.
    WorkerPanicked(String),
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::InvalidParams(error) => {
                write!(f, "invalid search parameters: {}", error)
            }
            SearchError::WorkerPanicked(message) => write!(f, "search aborted: {}", message),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SearchError::InvalidParams(error) => Some(error),
            SearchError::WorkerPanicked(_) => None,
        }
    }
}

impl From<ParamsError> for SearchError {
    fn from(error: ParamsError) -> Self {
        SearchError::InvalidParams(error)
    }
}

/// A configured branch-and-bound search, generic over the packing rules.
#[derive(Debug)]
pub struct SearchTree<R: PackingRules> {
    params: SearchParams,
    comparator: Box<dyn NodeComparator>,
    improver: Option<Box<dyn PackingImprover>>,
    monitor: Box<dyn SearchMonitor>,
    _rules: PhantomData<R>,
}

impl<R: PackingRules> SearchTree<R> {
    /// Creates a tree with the default best-first ordering, no local
    /// search, and a silent monitor.
    pub fn new(params: SearchParams) -> Self {
        Self {
            params,
            comparator: Box::new(BestFirstComparator::new()),
            improver: None,
            monitor: Box::new(NoOpMonitor::new()),
            _rules: PhantomData,
        }
    }

    /// Replaces the node-ordering strategy.
    pub fn comparator(mut self, comparator: impl NodeComparator + 'static) -> Self {
        self.comparator = Box::new(comparator);
        self
    }

    /// Attaches a local-search collaborator, invoked on leaves that reach
    /// the near-best admission window.
    pub fn improver(mut self, improver: impl PackingImprover + 'static) -> Self {
        self.improver = Some(Box::new(improver));
        self
    }

    /// Replaces the progress monitor.
    pub fn monitor(mut self, monitor: impl SearchMonitor + 'static) -> Self {
        self.monitor = Box::new(monitor);
        self
    }

    /// Runs the search to completion on `graph`.
    ///
    /// Blocks until the tree is exhausted, the node budget is hit, or a
    /// worker fails. All spawned threads are joined before this returns.
    pub fn run(&self, graph: &Graph) -> Result<SearchOutcome, SearchError> {
        if self.params.kind() != R::KIND {
            return Err(SearchError::InvalidParams(ParamsError::KindMismatch {
                configured: self.params.kind(),
                rules: R::KIND,
            }));
        }
        self.params.validate(graph)?;

        let start = Instant::now();
        let ctx = SearchCtx::<R>::new(
            graph,
            &self.params,
            self.comparator.as_ref(),
            self.monitor.as_ref(),
            self.improver.as_deref(),
        );
        self.monitor
            .on_search_started(R::KIND, graph.num_nodes(), self.params.num_threads);

        let root = SearchNode::root(&ctx);
        let inserted = ctx.queue.insert(root);
        debug_assert!(matches!(inserted, InsertOutcome::Inserted));

        let (tx, rx) = crossbeam_channel::unbounded();
        let ctx_ref = &ctx;
        std::thread::scope(|scope| {
            scope.spawn(move || dispatcher_loop(ctx_ref, tx));
            for worker_id in 0..self.params.num_threads {
                let rx = rx.clone();
                scope.spawn(move || worker_loop(ctx_ref, rx, worker_id));
            }
        });

        if let Some(message) = ctx.queue.failure() {
            return Err(SearchError::WorkerPanicked(message));
        }

        let statistics = SearchStatisticsBuilder::new()
            .nodes_created(ctx.created.load(Ordering::Relaxed))
            .leaf_nodes(ctx.leaves.load(Ordering::Relaxed))
            .incumbent_updates(ctx.incumbent_updates.load(Ordering::Relaxed))
            .local_search_calls(ctx.local_search_calls.load(Ordering::Relaxed))
            .local_search_time(Duration::from_nanos(
                ctx.local_search_nanos.load(Ordering::Relaxed),
            ))
            .used_threads(self.params.num_threads)
            .solve_duration(start.elapsed())
            .build();
        self.monitor.on_search_finished(&statistics);

        let best = ctx.incumbent.snapshot();
        if ctx.budget_hit.load(Ordering::Relaxed) {
            Ok(SearchOutcome::budget_reached(best, statistics))
        } else {
            Ok(SearchOutcome::exhausted(best, statistics))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::improver::ImproverError;
    use crate::result::TerminationReason;
    use gasp_graph::index::NodeId;
    use gasp_graph::solution::PackingKind;
    use std::sync::{Arc, Mutex};

    fn n(i: usize) -> NodeId {
        NodeId::new(i)
    }

    fn weighted_cycle5() -> Graph {
        let mut g = Graph::new(5);
        for i in 0..5 {
            g.add_edge(n(i), n((i + 1) % 5)).unwrap();
        }
        for (i, w) in [2.0, 1.0, 3.0, 1.0, 1.0].into_iter().enumerate() {
            g.set_node_weight(n(i), w).unwrap();
        }
        g
    }

    struct RecordingMonitor {
        weights: Arc<Mutex<Vec<f64>>>,
        lifecycle: Arc<Mutex<Vec<&'static str>>>,
    }

    impl SearchMonitor for RecordingMonitor {
        fn name(&self) -> &str {
            "RecordingMonitor"
        }

        fn on_search_started(&self, _kind: PackingKind, _num_nodes: usize, _num_threads: usize) {
            self.lifecycle.lock().unwrap().push("started");
        }

        fn on_incumbent_installed(&self, weight: f64, _size: usize) {
            self.weights.lock().unwrap().push(weight);
        }

        fn on_search_finished(&self, _statistics: &crate::stats::SearchStatistics) {
            self.lifecycle.lock().unwrap().push("finished");
        }
    }

    struct PanickingImprover;

    impl PackingImprover for PanickingImprover {
        fn name(&self) -> &str {
            "panicking"
        }

        fn improve(
            &self,
            _graph: &Graph,
            _packing: &[NodeId],
            _kind: PackingKind,
        ) -> Result<Option<Vec<NodeId>>, ImproverError> {
            panic!("improver blew up");
        }
    }

    #[test]
    fn test_multithreaded_run_matches_single_threaded() {
        let g = weighted_cycle5();
        for threads in [1, 4] {
            let tree = MaxWeightSearchTree::new(
                SearchParams::new(PackingKind::MaxWeightIndependentSet).num_threads(threads),
            );
            let outcome = tree.run(&g).unwrap();
            assert!(outcome.is_exhausted());
            let best = outcome.best().unwrap();
            assert_eq!(best.weight(), 5.0);
            assert!(best.is_feasible(&g));
            assert_eq!(outcome.statistics().used_threads(), threads);
        }
    }

    #[test]
    fn test_two_packing_end_to_end() {
        let mut g = Graph::new(5);
        for i in 0..4 {
            g.add_edge(n(i), n(i + 1)).unwrap();
        }
        g.materialize_two_hop();
        let tree = TwoPackingSearchTree::new(
            SearchParams::new(PackingKind::TwoPacking).num_threads(2),
        );
        let outcome = tree.run(&g).unwrap();
        assert!(outcome.is_exhausted());
        let best = outcome.best().unwrap();
        assert_eq!(best.weight(), 2.0);
        assert!(best.is_feasible(&g));
    }

    #[test]
    fn test_node_budget_reported() {
        let mut g = Graph::new(3);
        g.add_edge(n(0), n(1)).unwrap();
        g.add_edge(n(1), n(2)).unwrap();
        let tree = MaxWeightSearchTree::new(
            SearchParams::new(PackingKind::MaxWeightIndependentSet).max_nodes(1),
        );
        let outcome = tree.run(&g).unwrap();
        assert_eq!(
            outcome.termination_reason(),
            TerminationReason::NodeBudgetReached
        );
        assert!(!outcome.is_exhausted());
    }

    #[test]
    fn test_kind_mismatch_rejected_before_start() {
        let g = weighted_cycle5();
        let tree =
            TwoPackingSearchTree::new(SearchParams::new(PackingKind::MaxWeightIndependentSet));
        match tree.run(&g) {
            Err(SearchError::InvalidParams(ParamsError::KindMismatch { configured, rules })) => {
                assert_eq!(configured, PackingKind::MaxWeightIndependentSet);
                assert_eq!(rules, PackingKind::TwoPacking);
            }
            other => panic!("expected kind mismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_invalid_params_rejected() {
        let g = weighted_cycle5();
        let tree = MaxWeightSearchTree::new(
            SearchParams::new(PackingKind::MaxWeightIndependentSet).num_threads(0),
        );
        assert!(matches!(
            tree.run(&g),
            Err(SearchError::InvalidParams(ParamsError::ZeroThreads))
        ));
    }

    #[test]
    fn test_single_threaded_incumbents_are_strictly_increasing() {
        let g = weighted_cycle5();
        let weights = Arc::new(Mutex::new(Vec::new()));
        let lifecycle = Arc::new(Mutex::new(Vec::new()));
        let monitor = RecordingMonitor {
            weights: Arc::clone(&weights),
            lifecycle: Arc::clone(&lifecycle),
        };
        let tree = MaxWeightSearchTree::new(SearchParams::new(
            PackingKind::MaxWeightIndependentSet,
        ))
        .monitor(monitor);
        let outcome = tree.run(&g).unwrap();
        assert_eq!(outcome.best().unwrap().weight(), 5.0);

        let recorded = weights.lock().unwrap().clone();
        assert!(!recorded.is_empty());
        assert!(recorded.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(recorded.last().copied(), Some(5.0));
        assert_eq!(*lifecycle.lock().unwrap(), vec!["started", "finished"]);
    }

    #[test]
    fn test_worker_panic_surfaces_as_error() {
        let mut g = Graph::new(3);
        g.add_edge(n(0), n(1)).unwrap();
        g.add_edge(n(1), n(2)).unwrap();
        let tree = MaxWeightSearchTree::new(SearchParams::new(
            PackingKind::MaxWeightIndependentSet,
        ))
        .improver(PanickingImprover);
        match tree.run(&g) {
            Err(SearchError::WorkerPanicked(message)) => {
                assert!(message.contains("panicked"));
            }
            other => panic!("expected worker panic, got {:?}", other.map(|_| ())),
        }
    }
}
