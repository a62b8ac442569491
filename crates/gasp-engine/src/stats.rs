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

//! Aggregated counters describing a finished search.

use std::time::Duration;

/// Counters collected over one [`SearchTree::run`](crate::tree::SearchTree::run).
///
/// All node counts refer to node *creations*; nodes screened out before
/// ever reaching the queue still count against `nodes_created`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchStatistics {
    nodes_created: u64,
    leaf_nodes: u64,
    incumbent_updates: u64,
    local_search_calls: u64,
    local_search_time: Duration,
    used_threads: usize,
    solve_duration: Duration,
}

impl SearchStatistics {
    /// Number of search nodes constructed, including screened-out children.
    pub fn nodes_created(&self) -> u64 {
        self.nodes_created
    }

    /// Number of nodes whose candidate family was empty.
    pub fn leaf_nodes(&self) -> u64 {
        self.leaf_nodes
    }

    /// Number of times the incumbent was replaced by a strictly better
    /// packing.
    pub fn incumbent_updates(&self) -> u64 {
        self.incumbent_updates
    }

    /// Number of local-search invocations.
    pub fn local_search_calls(&self) -> u64 {
        self.local_search_calls
    }

    /// Wall-clock time spent inside local search, summed over all workers.
    pub fn local_search_time(&self) -> Duration {
        self.local_search_time
    }

    /// Number of worker threads the search ran with.
    pub fn used_threads(&self) -> usize {
        self.used_threads
    }

    /// Wall-clock duration of the whole search.
    pub fn solve_duration(&self) -> Duration {
        self.solve_duration
    }
}

impl std::fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "search statistics:")?;
        writeln!(f, "  nodes created:      {}", self.nodes_created)?;
        writeln!(f, "  leaf nodes:         {}", self.leaf_nodes)?;
        writeln!(f, "  incumbent updates:  {}", self.incumbent_updates)?;
        writeln!(f, "  local search calls: {}", self.local_search_calls)?;
        writeln!(
            f,
            "  local search time:  {:.3}s",
            self.local_search_time.as_secs_f64()
        )?;
        writeln!(f, "  worker threads:     {}", self.used_threads)?;
        write!(
            f,
            "  solve time:         {:.3}s",
            self.solve_duration.as_secs_f64()
        )
    }
}

/// Builder for [`SearchStatistics`].
#[derive(Debug, Clone, Default)]
pub struct SearchStatisticsBuilder {
    nodes_created: u64,
    leaf_nodes: u64,
    incumbent_updates: u64,
    local_search_calls: u64,
    local_search_time: Duration,
    used_threads: usize,
    solve_duration: Duration,
}

impl SearchStatisticsBuilder {
    /// Creates a builder with every counter zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of created nodes.
    pub fn nodes_created(mut self, value: u64) -> Self {
        self.nodes_created = value;
        self
    }

    /// Sets the number of leaf nodes.
    pub fn leaf_nodes(mut self, value: u64) -> Self {
        self.leaf_nodes = value;
        self
    }

    /// Sets the number of incumbent updates.
    pub fn incumbent_updates(mut self, value: u64) -> Self {
        self.incumbent_updates = value;
        self
    }

    /// Sets the number of local-search invocations.
    pub fn local_search_calls(mut self, value: u64) -> Self {
        self.local_search_calls = value;
        self
    }

    /// Sets the accumulated local-search time.
    pub fn local_search_time(mut self, value: Duration) -> Self {
        self.local_search_time = value;
        self
    }

    /// Sets the number of worker threads.
    pub fn used_threads(mut self, value: usize) -> Self {
        self.used_threads = value;
        self
    }

    /// Sets the wall-clock solve duration.
    pub fn solve_duration(mut self, value: Duration) -> Self {
        self.solve_duration = value;
        self
    }

    /// Finalizes the statistics.
    pub fn build(self) -> SearchStatistics {
        SearchStatistics {
            nodes_created: self.nodes_created,
            leaf_nodes: self.leaf_nodes,
            incumbent_updates: self.incumbent_updates,
            local_search_calls: self.local_search_calls,
            local_search_time: self.local_search_time,
            used_threads: self.used_threads,
            solve_duration: self.solve_duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_round_trip() {
        let stats = SearchStatisticsBuilder::new()
            .nodes_created(10)
            .leaf_nodes(4)
            .incumbent_updates(2)
            .local_search_calls(3)
            .local_search_time(Duration::from_millis(250))
            .used_threads(8)
            .solve_duration(Duration::from_secs(1))
            .build();

        assert_eq!(stats.nodes_created(), 10);
        assert_eq!(stats.leaf_nodes(), 4);
        assert_eq!(stats.incumbent_updates(), 2);
        assert_eq!(stats.local_search_calls(), 3);
        assert_eq!(stats.local_search_time(), Duration::from_millis(250));
        assert_eq!(stats.used_threads(), 8);
        assert_eq!(stats.solve_duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_display_contains_counters() {
        let stats = SearchStatisticsBuilder::new()
            .nodes_created(42)
            .used_threads(2)
            .build();
        let text = stats.to_string();
        assert!(text.contains("nodes created:      42"));
        assert!(text.contains("worker threads:     2"));
    }
}
