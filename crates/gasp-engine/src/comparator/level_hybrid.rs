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

//! Depth-dependent hybrid node ordering.

use crate::comparator::NodeComparator;

/// Cost-ordered below a depth threshold, bound-ordered at and above it,
/// larger first in both regimes.
///
/// Shallow in the tree this behaves like [`DepthFirstComparator`](
/// crate::comparator::DepthFirstComparator), racing to a first incumbent;
/// once a branch passes the threshold the most promising bounds take over,
/// spending the remaining effort where the payoff can still be large.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelHybridComparator {
    threshold: usize,
}

impl LevelHybridComparator {
    /// Creates the comparator with the given switch-over depth.
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    /// Returns the switch-over depth.
    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

impl NodeComparator for LevelHybridComparator {
    #[inline]
    fn priority(&self, cost: f64, bound: f64, depth: usize) -> f64 {
        if depth < self.threshold {
            -cost
        } else {
            -bound
        }
    }

    fn name(&self) -> &'static str {
        "level-hybrid"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_rules_below_threshold() {
        let cmp = LevelHybridComparator::new(3);
        assert!(cmp.priority(5.0, 6.0, 2) < cmp.priority(4.0, 50.0, 2));
    }

    #[test]
    fn test_bound_rules_at_threshold() {
        let cmp = LevelHybridComparator::new(3);
        assert!(cmp.priority(4.0, 50.0, 3) < cmp.priority(5.0, 6.0, 3));
        assert!(cmp.priority(1.0, 9.0, 8) < cmp.priority(9.0, 8.0, 8));
    }
}
