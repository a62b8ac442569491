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

//! Shared state of one search run.
//!
//! A `SearchCtx` is created once per [`SearchTree::run`](crate::tree::SearchTree::run)
//! and borrowed by the dispatcher and every worker for the run's whole
//! lifetime. It bundles the read-only inputs (graph, parameters) with the
//! concurrent collaborators (queue, incumbent, dedup cache, monitor,
//! improver) and the atomic counters the final statistics are built from.

use crate::comparator::NodeComparator;
use crate::dedup::BoundedDedupCache;
use crate::improver::PackingImprover;
use crate::incumbent::SharedIncumbent;
use crate::monitor::SearchMonitor;
use crate::node::rules::PackingRules;
use crate::params::SearchParams;
use crate::queue::WorkQueue;
use gasp_graph::graph::Graph;
use gasp_graph::index::NodeId;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// Everything a worker needs to expand nodes, shared by reference across
/// all threads of one run.
#[derive(Debug)]
pub(crate) struct SearchCtx<'a, R: PackingRules> {
    pub(crate) graph: &'a Graph,
    pub(crate) params: &'a SearchParams,
    pub(crate) queue: WorkQueue<'a, R>,
    pub(crate) incumbent: SharedIncumbent,
    /// Present only when duplicate suppression is configured.
    pub(crate) dedup: Option<BoundedDedupCache>,
    pub(crate) monitor: &'a dyn SearchMonitor,
    pub(crate) improver: Option<&'a dyn PackingImprover>,
    /// Cached `graph.max_node_weight()`, read on every bound evaluation.
    pub(crate) max_graph_weight: f64,
    /// Depth at which bound evaluation switches to the tight estimate.
    /// Decays multiplicatively as incumbents are found.
    pub(crate) tighten_level: AtomicUsize,
    pub(crate) created: AtomicU64,
    pub(crate) leaves: AtomicU64,
    pub(crate) incumbent_updates: AtomicU64,
    pub(crate) local_search_calls: AtomicU64,
    pub(crate) local_search_nanos: AtomicU64,
    pub(crate) budget_hit: AtomicBool,
}

impl<'a, R: PackingRules> SearchCtx<'a, R> {
    pub(crate) fn new(
        graph: &'a Graph,
        params: &'a SearchParams,
        comparator: &'a dyn NodeComparator,
        monitor: &'a dyn SearchMonitor,
        improver: Option<&'a dyn PackingImprover>,
    ) -> Self {
        let dedup = if params.recent_cache_capacity > 0 {
            Some(BoundedDedupCache::new(params.recent_cache_capacity))
        } else {
            None
        };
        Self {
            graph,
            params,
            queue: WorkQueue::new(params.max_queue_size, comparator),
            incumbent: SharedIncumbent::new(params.initial_incumbent_weight),
            dedup,
            monitor,
            improver,
            max_graph_weight: graph.max_node_weight(),
            tighten_level: AtomicUsize::new(params.tighten_level),
            created: AtomicU64::new(0),
            leaves: AtomicU64::new(0),
            incumbent_updates: AtomicU64::new(0),
            local_search_calls: AtomicU64::new(0),
            local_search_nanos: AtomicU64::new(0),
            budget_hit: AtomicBool::new(false),
        }
    }

    /// Hands out the next node identifier and counts the creation.
    #[inline]
    pub(crate) fn next_node_id(&self) -> u64 {
        self.created.fetch_add(1, Ordering::Relaxed)
    }

    /// Offers `nodes` as a new incumbent. Counts and reports on success.
    pub(crate) fn install(&self, nodes: &[NodeId], weight: f64) -> bool {
        if self.incumbent.try_install(nodes, weight, R::KIND) {
            self.incumbent_updates.fetch_add(1, Ordering::Relaxed);
            self.monitor.on_incumbent_installed(weight, nodes.len());
            true
        } else {
            false
        }
    }

    /// Multiplies the tighten level by 0.8, saturating at 2. A level of
    /// `usize::MAX` means tightening is off and stays off.
    pub(crate) fn reduce_tighten_level(&self) {
        let _ = self
            .tighten_level
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |level| {
                (level > 2 && level != usize::MAX).then(|| (level as f64 * 0.8) as usize)
            });
    }
}
