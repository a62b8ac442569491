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

//! # Work Queue (Prioritized Frontier)
//!
//! The shared frontier of the search: an ordered map from `(priority,
//! fingerprint)` keys to pending nodes, with a condition variable for the
//! blocking consumer. The configured [`NodeComparator`](crate::comparator::NodeComparator)
//! computes the priority once at insertion; ties are broken by a
//! lexicographic comparison of the member sets so the pop order is total
//! and deterministic for a given insertion set.
//!
//! ## Motivation
//!
//! - Bounded frontier: a capacity cap turns runaway breadth into an
//!   explicit signal (`Full`/`Rejected`) the producer decides how to
//!   handle, instead of unbounded memory growth.
//! - Rejected work is handed back, never dropped silently: every node
//!   still owes its completion bookkeeping to the termination protocol.
//! - Shutdown is part of the queue: `mark_all_done` lets the consumer
//!   drain and stop, `mark_failed` aborts, discarding pending work.
//!
//! ## Capacity
//!
//! Single inserts respect the cap exactly. Batch inserts are all-or-
//! nothing: a batch arriving while the queue is below the cap is accepted
//! wholesale even if that overshoots; a batch arriving at or above the cap
//! is rejected wholesale. Siblings therefore stay together, which keeps
//! the inline-execution fallback depth-first instead of interleaved.

use crate::comparator::NodeComparator;
use crate::node::rules::PackingRules;
use crate::node::search_node::SearchNode;
use gasp_graph::index::NodeId;
use ordered_float::OrderedFloat;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

/// Result of a single insertion.
#[derive(Debug)]
pub(crate) enum InsertOutcome<R: PackingRules> {
    /// The node was enqueued.
    Inserted,
    /// A node with the same priority and member set is already queued; the
    /// rejected node is handed back.
    Duplicate(SearchNode<R>),
    /// The queue is at capacity; the node is handed back.
    Full(SearchNode<R>),
}

/// Result of a batch insertion.
#[derive(Debug)]
pub(crate) enum BatchOutcome<R: PackingRules> {
    /// The whole batch was enqueued, minus any key collisions, which are
    /// handed back.
    Accepted { duplicates: Vec<SearchNode<R>> },
    /// The queue was already at capacity; the whole batch is handed back.
    Rejected(Vec<SearchNode<R>>),
}

/// Total order over queued nodes: priority first, then the member set
/// lexicographically. Two nodes collide only when both match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct QueueKey {
    priority: OrderedFloat<f64>,
    fingerprint: Arc<[NodeId]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum QueueState {
    Running,
    Done,
    Failed(String),
}

#[derive(Debug)]
struct QueueInner<R: PackingRules> {
    nodes: BTreeMap<QueueKey, SearchNode<R>>,
    state: QueueState,
}

/// The shared, capacity-limited frontier of one search run.
#[derive(Debug)]
pub(crate) struct WorkQueue<'a, R: PackingRules> {
    inner: Mutex<QueueInner<R>>,
    available: Condvar,
    capacity: usize,
    comparator: &'a dyn NodeComparator,
}

impl<'a, R: PackingRules> WorkQueue<'a, R> {
    pub(crate) fn new(capacity: usize, comparator: &'a dyn NodeComparator) -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                nodes: BTreeMap::new(),
                state: QueueState::Running,
            }),
            available: Condvar::new(),
            capacity,
            comparator,
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, QueueInner<R>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn key_for(&self, node: &SearchNode<R>) -> QueueKey {
        QueueKey {
            priority: OrderedFloat(
                self.comparator
                    .priority(node.cost(), node.bound(), node.depth()),
            ),
            fingerprint: node.fingerprint(),
        }
    }

    /// Inserts one node, respecting the capacity exactly.
    pub(crate) fn insert(&self, node: SearchNode<R>) -> InsertOutcome<R> {
        let key = self.key_for(&node);
        let mut inner = self.lock_inner();
        let len = inner.nodes.len();
        match inner.nodes.entry(key) {
            Entry::Occupied(_) => InsertOutcome::Duplicate(node),
            Entry::Vacant(slot) => {
                if len >= self.capacity {
                    return InsertOutcome::Full(node);
                }
                slot.insert(node);
                self.available.notify_one();
                InsertOutcome::Inserted
            }
        }
    }

    /// Inserts a sibling batch all-or-nothing; see the module docs for the
    /// overshoot rule.
    pub(crate) fn insert_batch(&self, batch: Vec<SearchNode<R>>) -> BatchOutcome<R> {
        let mut inner = self.lock_inner();
        if inner.nodes.len() >= self.capacity {
            return BatchOutcome::Rejected(batch);
        }
        let mut duplicates = Vec::new();
        for node in batch {
            let key = self.key_for(&node);
            match inner.nodes.entry(key) {
                Entry::Occupied(_) => duplicates.push(node),
                Entry::Vacant(slot) => {
                    slot.insert(node);
                }
            }
        }
        self.available.notify_all();
        BatchOutcome::Accepted { duplicates }
    }

    /// Pops the smallest-priority node, blocking while the queue is empty
    /// but still running. Returns `None` once the queue is drained and
    /// done, or immediately after a failure.
    pub(crate) fn pop_blocking(&self) -> Option<SearchNode<R>> {
        let mut inner = self.lock_inner();
        loop {
            if let QueueState::Failed(_) = inner.state {
                return None;
            }
            if let Some((_, node)) = inner.nodes.pop_first() {
                return Some(node);
            }
            if inner.state == QueueState::Done {
                return None;
            }
            inner = match self.available.wait(inner) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }

    /// Signals that no further work will arrive. Already-queued nodes are
    /// still drained.
    pub(crate) fn mark_all_done(&self) {
        let mut inner = self.lock_inner();
        if inner.state == QueueState::Running {
            inner.state = QueueState::Done;
        }
        self.available.notify_all();
    }

    /// Aborts the run: pending nodes are discarded and the consumer is
    /// released. The first failure message wins.
    pub(crate) fn mark_failed(&self, message: &str) {
        let mut inner = self.lock_inner();
        if !matches!(inner.state, QueueState::Failed(_)) {
            inner.state = QueueState::Failed(message.to_string());
            inner.nodes.clear();
        }
        self.available.notify_all();
    }

    pub(crate) fn is_all_done(&self) -> bool {
        self.lock_inner().state == QueueState::Done
    }

    /// Returns the failure message, if the queue was marked failed.
    pub(crate) fn failure(&self) -> Option<String> {
        match &self.lock_inner().state {
            QueueState::Failed(message) => Some(message.clone()),
            _ => None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lock_inner().nodes.len()
    }
}
