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

//! Depth-first node ordering.

use crate::comparator::NodeComparator;

/// Orders nodes by current cost, heaviest first.
///
/// Since cost grows strictly along every root-to-leaf path, popping the
/// heaviest node drives the search depth-first, producing complete
/// solutions (and with them useful incumbents for pruning) as early as
/// possible at the price of weaker global guidance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DepthFirstComparator;

impl DepthFirstComparator {
    /// Creates the comparator.
    pub fn new() -> Self {
        Self
    }
}

impl NodeComparator for DepthFirstComparator {
    #[inline]
    fn priority(&self, cost: f64, bound: f64, depth: usize) -> f64 {
        let _ = (bound, depth);
        -cost
    }

    fn name(&self) -> &'static str {
        "depth-first"
    }
}
