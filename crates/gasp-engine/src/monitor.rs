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

//! Search progress observation.
//!
//! Monitors receive events from all worker threads concurrently, so every
//! callback takes `&self` and implementations carry their own interior
//! mutability where they need state. All callbacks default to no-ops;
//! implementors override only the events they care about.

use crate::{improver::ImproverError, stats::SearchStatistics};
use gasp_graph::solution::PackingKind;
use std::{
    sync::{Mutex, MutexGuard},
    time::Instant,
};

/// Observer for the events of a running search.
pub trait SearchMonitor: Send + Sync {
    /// Returns the name of the monitor.
    fn name(&self) -> &str;

    /// Called once before the root node is enqueued.
    fn on_search_started(&self, _kind: PackingKind, _num_nodes: usize, _num_threads: usize) {}

    /// Called each time a strictly better incumbent is installed.
    fn on_incumbent_installed(&self, _weight: f64, _size: usize) {}

    /// Called when a local-search invocation fails. The failure is benign;
    /// the search continues with the unimproved packing.
    fn on_local_search_failed(&self, _error: &ImproverError) {}

    /// Called once after all workers have stopped.
    fn on_search_finished(&self, _statistics: &SearchStatistics) {}
}

impl std::fmt::Debug for dyn SearchMonitor + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SearchMonitor({})", self.name())
    }
}

impl std::fmt::Display for dyn SearchMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SearchMonitor({})", self.name())
    }
}

/// A monitor that ignores every event.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct NoOpMonitor;

impl NoOpMonitor {
    /// Creates a new `NoOpMonitor`.
    #[inline(always)]
    pub fn new() -> Self {
        Self
    }
}

impl SearchMonitor for NoOpMonitor {
    #[inline(always)]
    fn name(&self) -> &str {
        "NoOpMonitor"
    }
}

/// A monitor that writes timestamped progress lines to standard error.
#[derive(Debug)]
pub struct LogMonitor {
    start_time: Mutex<Instant>,
}

impl LogMonitor {
    /// Creates a new `LogMonitor`. The clock starts at construction and is
    /// reset when the search starts.
    pub fn new() -> Self {
        Self {
            start_time: Mutex::new(Instant::now()),
        }
    }

    fn lock_start(&self) -> MutexGuard<'_, Instant> {
        match self.start_time.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn elapsed(&self) -> f64 {
        self.lock_start().elapsed().as_secs_f64()
    }
}

impl Default for LogMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchMonitor for LogMonitor {
    fn name(&self) -> &str {
        "LogMonitor"
    }

    fn on_search_started(&self, kind: PackingKind, num_nodes: usize, num_threads: usize) {
        *self.lock_start() = Instant::now();
        eprintln!(
            "[gasp] {:>9.3}s  search started: {}, {} nodes, {} workers",
            0.0, kind, num_nodes, num_threads
        );
    }

    fn on_incumbent_installed(&self, weight: f64, size: usize) {
        eprintln!(
            "[gasp] {:>9.3}s  incumbent: weight={} size={}",
            self.elapsed(),
            weight,
            size
        );
    }

    fn on_local_search_failed(&self, error: &ImproverError) {
        eprintln!("[gasp] {:>9.3}s  {}", self.elapsed(), error);
    }

    fn on_search_finished(&self, statistics: &SearchStatistics) {
        eprintln!(
            "[gasp] {:>9.3}s  finished: {} nodes, {} leaves, {} incumbent updates",
            self.elapsed(),
            statistics.nodes_created(),
            statistics.leaf_nodes(),
            statistics.incumbent_updates()
        );
    }
}
