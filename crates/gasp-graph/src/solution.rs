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

//! Packing problems and their solutions.
//!
//! A k-packing is a set of nodes that are pairwise more than k edges apart.
//! Two kinds are supported: 1-packings (independent sets, maximized by
//! weight) and 2-packings (pairwise distance > 2, maximized by cardinality).
//! [`Packing`] is the owned result type handed back by the solver, and the
//! free validators in this module are what the test suites use to check
//! feasibility from first principles.

use crate::graph::Graph;
use crate::index::NodeId;

/// The two supported packing problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackingKind {
    /// 1-packing: no two chosen nodes are adjacent; maximize total weight.
    MaxWeightIndependentSet,
    /// 2-packing: chosen nodes are pairwise more than two hops apart;
    /// maximize cardinality.
    TwoPacking,
}

impl PackingKind {
    /// Maps the conventional `k` parameter (1 or 2) to a kind.
    pub fn from_k(k: usize) -> Option<Self> {
        match k {
            1 => Some(PackingKind::MaxWeightIndependentSet),
            2 => Some(PackingKind::TwoPacking),
            _ => None,
        }
    }

    /// Returns the conventional `k` parameter of this kind.
    pub fn k(self) -> usize {
        match self {
            PackingKind::MaxWeightIndependentSet => 1,
            PackingKind::TwoPacking => 2,
        }
    }
}

impl std::fmt::Display for PackingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackingKind::MaxWeightIndependentSet => write!(f, "1-packing (MWIS)"),
            PackingKind::TwoPacking => write!(f, "2-packing"),
        }
    }
}

/// A feasible packing together with its objective value.
#[derive(Debug, Clone, PartialEq)]
pub struct Packing {
    kind: PackingKind,
    /// Sorted, duplicate-free member ids.
    nodes: Vec<NodeId>,
    weight: f64,
}

impl Packing {
    /// Constructs a packing from its members and objective value.
    ///
    /// The member list is sorted; feasibility is the caller's concern and can
    /// be checked with [`Packing::is_feasible`].
    pub fn new(kind: PackingKind, mut nodes: Vec<NodeId>, weight: f64) -> Self {
        nodes.sort_unstable();
        debug_assert!(nodes.windows(2).all(|w| w[0] < w[1]));
        Self { kind, nodes, weight }
    }

    /// Constructs an empty packing of the given kind.
    pub fn empty(kind: PackingKind) -> Self {
        Self {
            kind,
            nodes: Vec::new(),
            weight: 0.0,
        }
    }

    /// Returns the packing kind.
    #[inline]
    pub fn kind(&self) -> PackingKind {
        self.kind
    }

    /// Returns the sorted member ids.
    #[inline]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Returns the objective value (total weight, or cardinality for
    /// 2-packings).
    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Returns the number of members.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the packing has no members.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Checks the packing's distance constraint against `graph`.
    pub fn is_feasible(&self, graph: &Graph) -> bool {
        match self.kind {
            PackingKind::MaxWeightIndependentSet => is_independent_set(graph, &self.nodes),
            PackingKind::TwoPacking => is_two_packing(graph, &self.nodes),
        }
    }
}

impl std::fmt::Display for Packing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of weight {} with {} nodes", self.kind, self.weight, self.len())
    }
}

/// Returns the total weight of `nodes` in `graph`.
pub fn total_weight(graph: &Graph, nodes: &[NodeId]) -> f64 {
    nodes.iter().map(|&v| graph.node_weight(v)).sum()
}

/// Returns `true` if no two members of `nodes` are adjacent in `graph`.
pub fn is_independent_set(graph: &Graph, nodes: &[NodeId]) -> bool {
    let members = membership(graph, nodes);
    nodes.iter().all(|&v| {
        graph
            .neighbors(v)
            .iter()
            .all(|&u| !members.contains(u.get()))
    })
}

/// Returns `true` if all members of `nodes` are pairwise more than two hops
/// apart in `graph`.
///
/// Works directly off the 1-hop adjacency, so it does not require the 2-hop
/// cache.
pub fn is_two_packing(graph: &Graph, nodes: &[NodeId]) -> bool {
    let members = membership(graph, nodes);
    for &v in nodes {
        for &u in graph.neighbors(v) {
            if members.contains(u.get()) {
                return false;
            }
            for &w in graph.neighbors(u) {
                if w != v && members.contains(w.get()) {
                    return false;
                }
            }
        }
    }
    true
}

fn membership(graph: &Graph, nodes: &[NodeId]) -> fixedbitset::FixedBitSet {
    let mut members = fixedbitset::FixedBitSet::with_capacity(graph.num_nodes());
    for &v in nodes {
        members.insert(v.get());
    }
    members
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(i: usize) -> NodeId {
        NodeId::new(i)
    }

    fn cycle(len: usize) -> Graph {
        let mut g = Graph::new(len);
        for i in 0..len {
            g.add_edge(n(i), n((i + 1) % len)).unwrap();
        }
        g
    }

    #[test]
    fn test_kind_k_roundtrip() {
        assert_eq!(PackingKind::from_k(1), Some(PackingKind::MaxWeightIndependentSet));
        assert_eq!(PackingKind::from_k(2), Some(PackingKind::TwoPacking));
        assert_eq!(PackingKind::from_k(3), None);
        assert_eq!(PackingKind::TwoPacking.k(), 2);
    }

    #[test]
    fn test_independent_set_on_cycle() {
        let g = cycle(4);
        assert!(is_independent_set(&g, &[n(0), n(2)]));
        assert!(is_independent_set(&g, &[n(1), n(3)]));
        assert!(!is_independent_set(&g, &[n(0), n(1)]));
        assert!(is_independent_set(&g, &[]));
    }

    #[test]
    fn test_two_packing_on_path() {
        let mut g = Graph::new(5);
        for i in 0..4 {
            g.add_edge(n(i), n(i + 1)).unwrap();
        }
        assert!(is_two_packing(&g, &[n(0), n(3)]));
        assert!(is_two_packing(&g, &[n(0), n(4)]));
        assert!(!is_two_packing(&g, &[n(0), n(2)]));
        assert!(!is_two_packing(&g, &[n(0), n(1)]));
    }

    #[test]
    fn test_two_packing_on_cycle_is_singleton() {
        let g = cycle(4);
        for i in 0..4 {
            assert!(is_two_packing(&g, &[n(i)]));
        }
        assert!(!is_two_packing(&g, &[n(0), n(2)]));
        assert!(!is_two_packing(&g, &[n(1), n(3)]));
    }

    #[test]
    fn test_packing_accessors() {
        let g = cycle(4);
        let p = Packing::new(PackingKind::MaxWeightIndependentSet, vec![n(2), n(0)], 2.0);
        assert_eq!(p.nodes(), &[n(0), n(2)]);
        assert_eq!(p.weight(), 2.0);
        assert_eq!(p.len(), 2);
        assert!(p.is_feasible(&g));
        assert!(Packing::empty(PackingKind::TwoPacking).is_empty());
    }
}
