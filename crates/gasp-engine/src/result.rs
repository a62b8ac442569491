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

//! Result of a finished search.

use crate::stats::SearchStatistics;
use gasp_graph::solution::Packing;

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// Every node was either expanded or fathomed. The returned packing is
    /// optimal for the searched instance.
    TreeExhausted,
    /// The node budget was hit before the tree was exhausted. The returned
    /// packing is the best one found so far, without an optimality claim.
    NodeBudgetReached,
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::TreeExhausted => write!(f, "TreeExhausted"),
            TerminationReason::NodeBudgetReached => write!(f, "NodeBudgetReached"),
        }
    }
}

/// Result of the search after termination.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    best: Option<Packing>,
    termination_reason: TerminationReason,
    statistics: SearchStatistics,
}

impl SearchOutcome {
    /// Creates an outcome for an exhausted tree.
    #[inline]
    pub fn exhausted(best: Option<Packing>, statistics: SearchStatistics) -> Self {
        Self {
            best,
            termination_reason: TerminationReason::TreeExhausted,
            statistics,
        }
    }

    /// Creates an outcome for a search stopped by its node budget.
    #[inline]
    pub fn budget_reached(best: Option<Packing>, statistics: SearchStatistics) -> Self {
        Self {
            best,
            termination_reason: TerminationReason::NodeBudgetReached,
            statistics,
        }
    }

    /// Returns the best packing found, if any improved on the initial
    /// incumbent weight.
    #[inline]
    pub fn best(&self) -> Option<&Packing> {
        self.best.as_ref()
    }

    /// Returns the termination reason.
    #[inline]
    pub fn termination_reason(&self) -> TerminationReason {
        self.termination_reason
    }

    /// Returns the search statistics.
    #[inline]
    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Whether the search proved optimality.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.termination_reason == TerminationReason::TreeExhausted
    }

    /// Consumes the outcome and returns the best packing.
    #[inline]
    pub fn into_best(self) -> Option<Packing> {
        self.best
    }
}
