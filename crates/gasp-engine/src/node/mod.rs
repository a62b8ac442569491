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

//! Search nodes and the packing rules they are generic over.
//!
//! The engine searches both supported packing kinds with the same node
//! type: [`SearchNode`] is generic over a [`PackingRules`] implementation
//! that supplies the kind-specific pieces (conflict tests, neighborhood
//! closure, bound estimates, candidate scoring). [`MaxWeightRules`] covers
//! maximum-weight independent sets, [`TwoPackingRules`] covers maximum
//! 2-packings. The remaining submodules carry the shared machinery: the
//! candidate-combination growth in [`candidates`] and the parent-chain
//! completion bookkeeping in [`shell`].

pub mod candidates;
pub mod max_weight;
pub mod rules;
pub mod search_node;
pub mod shell;
pub mod two_packing;

pub use candidates::CandidateSet;
pub use max_weight::MaxWeightRules;
pub use rules::PackingRules;
pub use search_node::SearchNode;
pub use two_packing::TwoPackingRules;
