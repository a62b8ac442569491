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

//! Undirected node-weighted graph used by the packing solver.
//!
//! ## Motivation
//!
//! The search engine hammers a small set of queries in its innermost loops:
//! per-node weight, the 1-hop neighbor set, and (for 2-packing problems) the
//! 2-hop neighbor set. This module keeps those queries allocation-free and
//! cache-friendly: neighbors are stored as sorted slices, weights as a flat
//! vector, and the 2-hop neighborhoods as a one-shot materialized cache.
//!
//! ## Highlights
//!
//! - Sorted, duplicate-free adjacency; `neighbors` returns a borrowed slice.
//! - `materialize_two_hop` builds the distance-≤2 neighborhoods once,
//!   single-threaded, before a run; lookups afterwards are plain slice
//!   accesses with no interior mutability and no locking.
//! - Connected-component extraction and induced subgraphs with a back-map,
//!   so disconnected instances can be solved piecewise.
//!
//! ## Usage
//!
//! ```rust
//! use gasp_graph::graph::Graph;
//! use gasp_graph::index::NodeId;
//!
//! let mut g = Graph::new(3);
//! g.add_edge(NodeId::new(0), NodeId::new(1)).unwrap();
//! g.add_edge(NodeId::new(1), NodeId::new(2)).unwrap();
//! g.materialize_two_hop();
//!
//! assert_eq!(g.neighbors(NodeId::new(1)), &[NodeId::new(0), NodeId::new(2)]);
//! assert_eq!(
//!     g.two_hop_neighbors(NodeId::new(0)),
//!     &[NodeId::new(1), NodeId::new(2)]
//! );
//! ```

use crate::index::NodeId;
use fixedbitset::FixedBitSet;
use std::collections::VecDeque;

/// Errors reported while building a [`Graph`].
#[derive(Debug)]
pub enum GraphError {
    /// A node identifier was outside `0..num_nodes`.
    NodeOutOfBounds { node: usize, num_nodes: usize },
    /// An edge connected a node to itself.
    SelfLoop { node: usize },
    /// A node weight was NaN or infinite.
    NonFiniteWeight { node: usize, weight: f64 },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::NodeOutOfBounds { node, num_nodes } => {
                write!(
                    f,
                    "node index {} out of bounds for graph with {} nodes",
                    node, num_nodes
                )
            }
            GraphError::SelfLoop { node } => {
                write!(f, "self-loop on node {} is not allowed", node)
            }
            GraphError::NonFiniteWeight { node, weight } => {
                write!(f, "non-finite weight {} for node {}", weight, node)
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// An undirected graph with `f64` node weights.
///
/// Node identifiers are dense indices `0..num_nodes` wrapped in [`NodeId`].
/// The graph is mutable only during setup; the engine treats it as
/// read-only for the whole duration of a run.
#[derive(Debug, Clone)]
pub struct Graph {
    /// `weights[v]` is the weight of node `v`. Defaults to 1.0.
    weights: Vec<f64>,

    /// `neighbors[v]` is the sorted, duplicate-free 1-hop neighborhood of `v`.
    neighbors: Vec<Vec<NodeId>>,

    /// Distance-≤2 neighborhoods (excluding the node itself), present only
    /// after [`Graph::materialize_two_hop`] ran. Adding edges clears it.
    two_hop: Option<Vec<Vec<NodeId>>>,

    /// Largest `|two_hop[v]|`; 0 while the cache is absent.
    max_two_hop_degree: usize,

    num_edges: usize,
}

impl Graph {
    /// Creates a graph with `num_nodes` isolated nodes, all of weight 1.0.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            weights: vec![1.0; num_nodes],
            neighbors: vec![Vec::new(); num_nodes],
            two_hop: None,
            max_two_hop_degree: 0,
            num_edges: 0,
        }
    }

    /// Returns the number of nodes.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.weights.len()
    }

    /// Returns the number of distinct undirected edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    fn check_node(&self, id: NodeId) -> Result<(), GraphError> {
        if id.get() >= self.num_nodes() {
            return Err(GraphError::NodeOutOfBounds {
                node: id.get(),
                num_nodes: self.num_nodes(),
            });
        }
        Ok(())
    }

    /// Adds the undirected edge `{a, b}`.
    ///
    /// Re-adding an existing edge is a no-op. Adding any edge invalidates a
    /// previously materialized 2-hop cache.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> Result<(), GraphError> {
        self.check_node(a)?;
        self.check_node(b)?;
        if a == b {
            return Err(GraphError::SelfLoop { node: a.get() });
        }
        match self.neighbors[a.get()].binary_search(&b) {
            Ok(_) => return Ok(()),
            Err(pos) => self.neighbors[a.get()].insert(pos, b),
        }
        // First insertion succeeded, so `a` cannot be present here yet.
        let pos = self.neighbors[b.get()]
            .binary_search(&a)
            .unwrap_or_else(|p| p);
        self.neighbors[b.get()].insert(pos, a);
        self.num_edges += 1;
        self.two_hop = None;
        self.max_two_hop_degree = 0;
        Ok(())
    }

    /// Sets the weight of node `id`.
    pub fn set_node_weight(&mut self, id: NodeId, weight: f64) -> Result<(), GraphError> {
        self.check_node(id)?;
        if !weight.is_finite() {
            return Err(GraphError::NonFiniteWeight {
                node: id.get(),
                weight,
            });
        }
        self.weights[id.get()] = weight;
        Ok(())
    }

    /// Returns the weight of node `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of bounds.
    #[inline]
    pub fn node_weight(&self, id: NodeId) -> f64 {
        self.weights[id.get()]
    }

    /// Returns the sorted 1-hop neighborhood of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of bounds.
    #[inline]
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        &self.neighbors[id.get()]
    }

    /// Returns the degree of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of bounds.
    #[inline]
    pub fn degree(&self, id: NodeId) -> usize {
        self.neighbors[id.get()].len()
    }

    /// Returns the largest node weight, or 0.0 for an empty graph.
    pub fn max_node_weight(&self) -> f64 {
        self.weights.iter().copied().fold(f64::NEG_INFINITY, f64::max).max(0.0)
    }

    /// Returns the total weight of all nodes.
    pub fn total_node_weight(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Builds the distance-≤2 neighborhood cache.
    ///
    /// Must be called before a 2-packing run starts and must not race with
    /// readers; the engine validates the cache's presence up front and never
    /// triggers materialization itself.
    pub fn materialize_two_hop(&mut self) {
        let n = self.num_nodes();
        let mut seen = FixedBitSet::with_capacity(n);
        let mut cache = Vec::with_capacity(n);
        let mut max_degree = 0;
        for v in 0..n {
            seen.clear();
            seen.insert(v);
            let mut reach = Vec::with_capacity(self.neighbors[v].len());
            for &u in &self.neighbors[v] {
                if !seen.put(u.get()) {
                    reach.push(u);
                }
                for &w in &self.neighbors[u.get()] {
                    if !seen.put(w.get()) {
                        reach.push(w);
                    }
                }
            }
            reach.sort_unstable();
            max_degree = max_degree.max(reach.len());
            cache.push(reach);
        }
        self.two_hop = Some(cache);
        self.max_two_hop_degree = max_degree;
    }

    /// Returns `true` if [`Graph::materialize_two_hop`] has run since the
    /// last mutation.
    #[inline]
    pub fn has_two_hop_cache(&self) -> bool {
        self.two_hop.is_some()
    }

    /// Returns the sorted distance-≤2 neighborhood of `id` (excluding `id`).
    ///
    /// # Panics
    ///
    /// Panics if the 2-hop cache has not been materialized or `id` is out of
    /// bounds.
    #[inline]
    pub fn two_hop_neighbors(&self, id: NodeId) -> &[NodeId] {
        let cache = self
            .two_hop
            .as_ref()
            .expect("two-hop neighborhood cache not materialized; call materialize_two_hop first");
        &cache[id.get()]
    }

    /// Returns the largest 2-hop degree; 0 while the cache is absent.
    #[inline]
    pub fn max_two_hop_degree(&self) -> usize {
        self.max_two_hop_degree
    }

    /// Returns the connected components, each as a sorted list of node ids.
    pub fn components(&self) -> Vec<Vec<NodeId>> {
        let n = self.num_nodes();
        let mut visited = FixedBitSet::with_capacity(n);
        let mut components = Vec::new();
        let mut frontier = VecDeque::new();
        for start in 0..n {
            if visited.contains(start) {
                continue;
            }
            let mut component = Vec::new();
            visited.insert(start);
            frontier.push_back(NodeId::new(start));
            while let Some(v) = frontier.pop_front() {
                component.push(v);
                for &u in &self.neighbors[v.get()] {
                    if !visited.put(u.get()) {
                        frontier.push_back(u);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }

    /// Builds the subgraph induced by `nodes` (sorted, duplicate-free).
    ///
    /// Returns the subgraph together with a back-map: entry `i` of the map is
    /// the original id of subgraph node `i`. The subgraph carries the
    /// original weights; its 2-hop cache starts out absent.
    ///
    /// # Panics
    ///
    /// Panics if `nodes` contains an out-of-bounds id.
    pub fn induced_subgraph(&self, nodes: &[NodeId]) -> (Graph, Vec<NodeId>) {
        debug_assert!(nodes.windows(2).all(|w| w[0] < w[1]));
        let mut to_sub = vec![usize::MAX; self.num_nodes()];
        for (sub, &orig) in nodes.iter().enumerate() {
            to_sub[orig.get()] = sub;
        }
        let mut sub = Graph::new(nodes.len());
        let mut num_edges = 0;
        for (a_sub, &a) in nodes.iter().enumerate() {
            sub.weights[a_sub] = self.weights[a.get()];
            let mut adj = Vec::new();
            for &b in &self.neighbors[a.get()] {
                let b_sub = to_sub[b.get()];
                if b_sub != usize::MAX {
                    adj.push(NodeId::new(b_sub));
                    if a < b {
                        num_edges += 1;
                    }
                }
            }
            // Source neighbors are sorted and the id mapping is monotone.
            sub.neighbors[a_sub] = adj;
        }
        sub.num_edges = num_edges;
        (sub, nodes.to_vec())
    }
}
