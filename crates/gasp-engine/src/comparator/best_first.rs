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

//! Best-first node ordering (the default).

use crate::comparator::NodeComparator;

/// Orders nodes by the figure of merit `bound/cost + cost − 1`, largest
/// first.
///
/// The quotient prefers nodes whose bound leaves the most room above what
/// they already collected; the additive cost term keeps already-deep nodes
/// competitive so the search does not stall near the root. A node with zero
/// cost (the root before any GASP absorption) always comes first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BestFirstComparator;

impl BestFirstComparator {
    /// Creates the comparator.
    pub fn new() -> Self {
        Self
    }
}

impl NodeComparator for BestFirstComparator {
    #[inline]
    fn priority(&self, cost: f64, bound: f64, depth: usize) -> f64 {
        let _ = depth;
        let merit = if cost > 0.0 {
            bound / cost + cost - 1.0
        } else {
            f64::INFINITY
        };
        -merit
    }

    fn name(&self) -> &'static str {
        "best-first"
    }
}
