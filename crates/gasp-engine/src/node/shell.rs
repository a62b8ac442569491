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

//! Tree bookkeeping shared between a search node and its children.
//!
//! A `NodeShell` is the part of a search node that outlives its execution:
//! the node id, the link to the parent shell, and the count of direct
//! children that have not reported completion yet. Parent links own the
//! chain upward only, so dropping a subtree never leaks and never cycles.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Identity and completion state of one search-tree node.
#[derive(Debug)]
pub struct NodeShell {
    id: u64,
    parent: Option<Arc<NodeShell>>,
    /// Direct children spawned but not yet finished. Written once before
    /// the children are published, decremented as they complete.
    pending: AtomicUsize,
}

impl NodeShell {
    /// Creates the shell of a root node.
    pub(crate) fn root(id: u64) -> Arc<Self> {
        Arc::new(Self {
            id,
            parent: None,
            pending: AtomicUsize::new(0),
        })
    }

    /// Creates the shell of a child of `parent`.
    pub(crate) fn child(parent: &Arc<NodeShell>, id: u64) -> Arc<Self> {
        Arc::new(Self {
            id,
            parent: Some(Arc::clone(parent)),
            pending: AtomicUsize::new(0),
        })
    }

    /// Returns the node id.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the parent shell, or `None` for the root.
    #[inline]
    pub(crate) fn parent(&self) -> Option<&Arc<NodeShell>> {
        self.parent.as_ref()
    }

    /// Records how many children will report completion. Must happen
    /// before any of those children is published to another thread.
    #[inline]
    pub(crate) fn set_pending(&self, count: usize) {
        self.pending.store(count, Ordering::Release);
    }

    /// Reports one finished child. Returns `true` if that was the last
    /// outstanding child, completing this node as well.
    #[inline]
    pub(crate) fn complete_child(&self) -> bool {
        self.pending.fetch_sub(1, Ordering::AcqRel) == 1
    }
}
