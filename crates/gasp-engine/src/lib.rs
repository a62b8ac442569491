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

//! Gasp-Engine: parallel branch-and-bound for node packings
//!
//! The search core of the gasp solver: a branch-and-bound tree over
//! partial packings whose branching step is a greedy adaptive candidate
//! selection, run by a dispatcher/worker thread pool over a prioritized,
//! capacity-limited frontier.
//!
//! Core flow
//! - Build a `gasp_graph::Graph` (2-packings additionally need the 2-hop
//!   cache materialized).
//! - Configure a `params::SearchParams` for the packing kind.
//! - Optionally pick a `comparator::NodeComparator`, attach an
//!   `improver::PackingImprover`, and a `monitor::SearchMonitor`.
//! - Run `tree::SearchTree` (or the `MaxWeightSearchTree` /
//!   `TwoPackingSearchTree` aliases) and inspect the `result::SearchOutcome`.
//!
//! Design highlights
//! - One engine, two problems: every kind-specific rule lives behind
//!   `node::PackingRules`; the tree, queue, and pool are shared verbatim.
//! - Deterministic for a fixed seed and thread count: the frontier's pop
//!   order is total, and per-worker randomness is seeded per worker id.
//! - Completion is tracked per node through parent links, so the run
//!   terminates exactly when the root's last descendant finishes, with no
//!   global generation counting.
//!
//! Module map
//! - `tree`: the engine entry point.
//! - `params`: run configuration and validation.
//! - `node`: search nodes, packing rules, candidate growth.
//! - `comparator`: frontier ordering strategies.
//! - `queue`, `pool`: the frontier and the thread loops driving it.
//! - `incumbent`: the shared best-packing holder.
//! - `dedup`: bounded recently-seen member-set cache.
//! - `improver`: local-search collaborator interface.
//! - `monitor`: progress observation.
//! - `result`, `stats`: outcomes and counters.

pub mod comparator;
mod ctx;
pub mod dedup;
pub mod improver;
pub mod incumbent;
pub mod monitor;
pub mod node;
pub mod params;
mod pool;
mod queue;
pub mod result;
pub mod stats;
pub mod tree;
