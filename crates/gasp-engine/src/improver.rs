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

//! Local-search collaborator interface.
//!
//! The engine invokes an improver only on true leaves that reached (or came
//! near) the incumbent, handing it the leaf's member set. The improver is an
//! opaque, potentially expensive black box: it is never retried, its errors
//! are reported to the monitor and treated as "no improvement," and a
//! returned set is adopted only when its objective strictly beats the
//! leaf's.

use gasp_graph::graph::Graph;
use gasp_graph::index::NodeId;
use gasp_graph::solution::PackingKind;

/// Failures of a local-search collaborator. Never fatal to the search.
#[derive(Debug)]
pub enum ImproverError {
    /// The set handed in did not satisfy the packing constraint the
    /// improver was asked to preserve.
    InfeasibleInput(PackingKind),
    /// Any other collaborator-internal failure.
    Failed(String),
}

impl std::fmt::Display for ImproverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImproverError::InfeasibleInput(kind) => {
                write!(f, "local search received an infeasible {} as input", kind)
            }
            ImproverError::Failed(msg) => write!(f, "local search failed: {}", msg),
        }
    }
}

impl std::error::Error for ImproverError {}

/// An improvement procedure over feasible packings.
///
/// Implementations must return a set that satisfies the same packing
/// constraint as the input; `Ok(None)` means no improvement was found.
pub trait PackingImprover: Send + Sync {
    /// Human-readable procedure name for logs.
    fn name(&self) -> &str;

    /// Attempts to improve `packing` (sorted member ids, feasible for
    /// `kind`).
    fn improve(
        &self,
        graph: &Graph,
        packing: &[NodeId],
        kind: PackingKind,
    ) -> Result<Option<Vec<NodeId>>, ImproverError>;
}

impl std::fmt::Debug for dyn PackingImprover + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PackingImprover({})", self.name())
    }
}

impl std::fmt::Display for dyn PackingImprover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PackingImprover({})", self.name())
    }
}
