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

//! Node-ordering strategies for the work queue.
//!
//! A comparator maps a node's `(cost, bound, depth)` triple to a single
//! `f64` priority; the queue pops the smallest priority first. Strategies:
//!
//! - [`BestFirstComparator`]: normalized figure of merit blending bound
//!   tightness and depth; the default.
//! - [`DepthFirstComparator`]: heaviest partial solutions first, driving
//!   the search down before out.
//! - [`LevelHybridComparator`]: cost-ordered below a depth threshold,
//!   bound-ordered at and above it.
//!
//! Exact priority ties are broken by the queue itself with a lexicographic
//! comparison of the nodes' member sets, so a strategy only has to express
//! its preference, not a strict total order.

pub mod best_first;
pub mod depth_first;
pub mod level_hybrid;

pub use best_first::BestFirstComparator;
pub use depth_first::DepthFirstComparator;
pub use level_hybrid::LevelHybridComparator;

/// Ordering strategy over search nodes.
///
/// Priorities are computed once, at insertion time, from values that are
/// immutable for the node's queued lifetime.
pub trait NodeComparator: Send + Sync {
    /// Returns the queue priority; smaller values pop first.
    fn priority(&self, cost: f64, bound: f64, depth: usize) -> f64;

    /// Human-readable strategy name for logs.
    fn name(&self) -> &'static str;
}

impl std::fmt::Debug for dyn NodeComparator + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeComparator({})", self.name())
    }
}

impl std::fmt::Display for dyn NodeComparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeComparator({})", self.name())
    }
}
