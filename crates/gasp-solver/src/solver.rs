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

//! # Component-Splitting Packing Solver
//!
//! A front-end over the search engine that solves one packing instance as a
//! sequence of independent sub-searches, one per connected component.
//!
//! ## Motivation
//!
//! Packings never cross component boundaries, so a graph with many
//! components decomposes into many small searches whose results simply
//! concatenate. Tiny components do not even need a search: their optima
//! have closed forms.
//!
//! ## Highlights
//!
//! - Component runs:
//!   - Each component is solved on its induced subgraph and mapped back to
//!     the original node ids through the component's back-map.
//!   - 2-packing subgraphs get their 2-hop cache materialized right before
//!     the run; the input graph is never mutated.
//! - Closed-form shortcuts:
//!   - 2-packing on at most 3 nodes takes the max-weight node.
//!   - Independent sets on at most 2 nodes take the max-weight node; a
//!     3-node path takes the heavier of {endpoints} and {middle}.
//!   - A shortcut counts as one created node and one leaf.
//! - Aggregation:
//!   - Per-component reports (members, objective, statistics, termination)
//!     plus a combined [`Packing`] and summed statistics.
//!   - The run counts as exhausted only when every component search was.
//!
//! ## Usage
//!
//! ```rust
//! use gasp_graph::graph::Graph;
//! use gasp_graph::index::NodeId;
//! use gasp_graph::solution::PackingKind;
//! use gasp_solver::props::SolverConfig;
//! use gasp_solver::solver::PackingSolver;
//!
//! let mut g = Graph::new(5);
//! g.add_edge(NodeId::new(0), NodeId::new(1)).unwrap();
//! g.add_edge(NodeId::new(1), NodeId::new(2)).unwrap();
//! g.add_edge(NodeId::new(3), NodeId::new(4)).unwrap();
//!
//! let config = SolverConfig::new(PackingKind::MaxWeightIndependentSet);
//! let outcome = PackingSolver::new(config).solve(&g).unwrap();
//! assert_eq!(outcome.packing().weight(), 3.0);
//! ```

use crate::props::{ComparatorChoice, SolverConfig};
use gasp_engine::comparator::{BestFirstComparator, DepthFirstComparator, LevelHybridComparator};
use gasp_engine::node::{MaxWeightRules, PackingRules, TwoPackingRules};
use gasp_engine::result::{SearchOutcome, TerminationReason};
use gasp_engine::stats::{SearchStatistics, SearchStatisticsBuilder};
use gasp_engine::tree::{SearchError, SearchTree};
use gasp_graph::graph::Graph;
use gasp_graph::index::NodeId;
use gasp_graph::solution::{Packing, PackingKind};
use gasp_ls::SwapImprover;
use std::time::Instant;

/// Failures of a whole-instance solve.
#[derive(Debug)]
pub enum SolveError {
    /// A per-component search failed.
    Search(SearchError),
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveError::Search(e) => write!(f, "component search failed: {}", e),
        }
    }
}

impl std::error::Error for SolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolveError::Search(e) => Some(e),
        }
    }
}

impl From<SearchError> for SolveError {
    fn from(e: SearchError) -> Self {
        SolveError::Search(e)
    }
}

/// Result of one component, in original node ids.
#[derive(Debug, Clone)]
pub struct ComponentReport {
    component_size: usize,
    nodes: Vec<NodeId>,
    weight: f64,
    statistics: SearchStatistics,
    termination_reason: TerminationReason,
    shortcut: bool,
}

impl ComponentReport {
    /// Number of nodes in the component (not in its solution).
    #[inline]
    pub fn component_size(&self) -> usize {
        self.component_size
    }

    /// Solution members, sorted original ids.
    #[inline]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Objective of the component solution.
    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Statistics of the component search (synthetic for shortcuts).
    #[inline]
    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// How the component search ended.
    #[inline]
    pub fn termination_reason(&self) -> TerminationReason {
        self.termination_reason
    }

    /// Whether the component was solved by a closed-form shortcut.
    #[inline]
    pub fn is_shortcut(&self) -> bool {
        self.shortcut
    }
}

/// Aggregated result of a [`PackingSolver::solve`] call.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    packing: Packing,
    components: Vec<ComponentReport>,
    statistics: SearchStatistics,
    termination_reason: TerminationReason,
}

impl SolveOutcome {
    /// The combined packing over the whole graph.
    #[inline]
    pub fn packing(&self) -> &Packing {
        &self.packing
    }

    /// Per-component reports, in component order.
    #[inline]
    pub fn components(&self) -> &[ComponentReport] {
        &self.components
    }

    /// Statistics summed over all component searches.
    #[inline]
    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// `TreeExhausted` only if every component search was exhausted.
    #[inline]
    pub fn termination_reason(&self) -> TerminationReason {
        self.termination_reason
    }

    /// Whether every component proved its solution optimal.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.termination_reason == TerminationReason::TreeExhausted
    }
}

/// Component-splitting front-end over [`SearchTree`].
#[derive(Debug, Clone)]
pub struct PackingSolver {
    config: SolverConfig,
}

impl PackingSolver {
    /// Creates a solver from a configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// The configuration this solver runs with.
    #[inline]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solves the instance component by component.
    pub fn solve(&self, graph: &Graph) -> Result<SolveOutcome, SolveError> {
        let start = Instant::now();
        let kind = self.config.kind();

        let mut components = Vec::new();
        for component in graph.components() {
            let (sub, back_map) = graph.induced_subgraph(&component);
            let report = match shortcut_members(&sub, kind) {
                Some(members) => shortcut_report(&sub, kind, members, &back_map),
                None => self.run_component(sub, &back_map)?,
            };
            components.push(report);
        }

        let mut all_nodes = Vec::new();
        let mut total_weight = 0.0;
        let mut nodes_created = 0;
        let mut leaf_nodes = 0;
        let mut incumbent_updates = 0;
        let mut local_search_calls = 0;
        let mut local_search_time = std::time::Duration::ZERO;
        let mut used_threads = 0;
        let mut exhausted = true;
        for report in &components {
            all_nodes.extend_from_slice(report.nodes());
            total_weight += report.weight();
            nodes_created += report.statistics().nodes_created();
            leaf_nodes += report.statistics().leaf_nodes();
            incumbent_updates += report.statistics().incumbent_updates();
            local_search_calls += report.statistics().local_search_calls();
            local_search_time += report.statistics().local_search_time();
            used_threads = used_threads.max(report.statistics().used_threads());
            exhausted &= report.termination_reason() == TerminationReason::TreeExhausted;
        }
        let statistics = SearchStatisticsBuilder::new()
            .nodes_created(nodes_created)
            .leaf_nodes(leaf_nodes)
            .incumbent_updates(incumbent_updates)
            .local_search_calls(local_search_calls)
            .local_search_time(local_search_time)
            .used_threads(used_threads)
            .solve_duration(start.elapsed())
            .build();
        let termination_reason = if exhausted {
            TerminationReason::TreeExhausted
        } else {
            TerminationReason::NodeBudgetReached
        };

        Ok(SolveOutcome {
            packing: Packing::new(kind, all_nodes, total_weight),
            components,
            statistics,
            termination_reason,
        })
    }

    fn run_component(
        &self,
        mut sub: Graph,
        back_map: &[NodeId],
    ) -> Result<ComponentReport, SolveError> {
        let kind = self.config.kind();
        if kind == PackingKind::TwoPacking {
            sub.materialize_two_hop();
        }
        let outcome = match kind {
            PackingKind::MaxWeightIndependentSet => self.run_tree::<MaxWeightRules>(&sub)?,
            PackingKind::TwoPacking => self.run_tree::<TwoPackingRules>(&sub)?,
        };

        let (nodes, weight) = match outcome.best() {
            Some(packing) => {
                let mut mapped: Vec<NodeId> =
                    packing.nodes().iter().map(|&v| back_map[v.get()]).collect();
                mapped.sort_unstable();
                (mapped, packing.weight())
            }
            None => (Vec::new(), 0.0),
        };

        Ok(ComponentReport {
            component_size: sub.num_nodes(),
            nodes,
            weight,
            statistics: outcome.statistics().clone(),
            termination_reason: outcome.termination_reason(),
            shortcut: false,
        })
    }

    fn run_tree<R: PackingRules>(&self, sub: &Graph) -> Result<SearchOutcome, SearchError> {
        let tree = SearchTree::<R>::new(self.config.params().clone());
        let tree = match self.config.comparator() {
            ComparatorChoice::BestFirst => tree.comparator(BestFirstComparator::new()),
            ComparatorChoice::DepthFirst => tree.comparator(DepthFirstComparator::new()),
            ComparatorChoice::LevelHybrid(threshold) => {
                tree.comparator(LevelHybridComparator::new(threshold))
            }
        };
        let tree = if self.config.local_search() {
            tree.improver(SwapImprover::new().seed(self.config.seed()))
        } else {
            tree
        };
        tree.run(sub)
    }
}

/// Closed-form solution members (subgraph ids) for tiny components, or
/// `None` when the component needs a real search.
fn shortcut_members(sub: &Graph, kind: PackingKind) -> Option<Vec<NodeId>> {
    match kind {
        PackingKind::TwoPacking if sub.num_nodes() <= 3 => {
            max_weight_node(sub).map(|v| vec![v])
        }
        PackingKind::MaxWeightIndependentSet
            if sub.num_nodes() == 3 && sub.num_edges() == 2 =>
        {
            let middle = (0..3).map(NodeId::new).find(|&v| sub.degree(v) == 2)?;
            let endpoints: Vec<NodeId> =
                (0..3).map(NodeId::new).filter(|&v| v != middle).collect();
            let endpoint_weight: f64 = endpoints.iter().map(|&v| sub.node_weight(v)).sum();
            if sub.node_weight(middle) > endpoint_weight {
                Some(vec![middle])
            } else {
                Some(endpoints)
            }
        }
        PackingKind::MaxWeightIndependentSet if sub.num_nodes() <= 2 => {
            max_weight_node(sub).map(|v| vec![v])
        }
        _ => None,
    }
}

/// The first node of maximum weight, `None` on an empty graph.
fn max_weight_node(sub: &Graph) -> Option<NodeId> {
    (0..sub.num_nodes()).map(NodeId::new).max_by(|&a, &b| {
        sub.node_weight(a)
            .total_cmp(&sub.node_weight(b))
            .then_with(|| b.cmp(&a))
    })
}

fn shortcut_report(
    sub: &Graph,
    kind: PackingKind,
    members: Vec<NodeId>,
    back_map: &[NodeId],
) -> ComponentReport {
    let weight = match kind {
        PackingKind::MaxWeightIndependentSet => {
            members.iter().map(|&v| sub.node_weight(v)).sum()
        }
        PackingKind::TwoPacking => members.len() as f64,
    };
    let mut nodes: Vec<NodeId> = members.iter().map(|&v| back_map[v.get()]).collect();
    nodes.sort_unstable();
    ComponentReport {
        component_size: sub.num_nodes(),
        nodes,
        weight,
        statistics: SearchStatisticsBuilder::new().nodes_created(1).leaf_nodes(1).build(),
        termination_reason: TerminationReason::TreeExhausted,
        shortcut: true,
    }
}
