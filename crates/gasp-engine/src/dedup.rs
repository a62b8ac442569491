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

//! Bounded cache of recently processed partial solutions.
//!
//! ## Motivation
//!
//! Different branches of the search tree regularly reconverge on the same
//! partial solution. Re-expanding such a node is pure waste, but remembering
//! every processed fingerprint forever would grow without bound on large
//! instances. The compromise: one fixed-length circular buffer per
//! solution-size bucket, evicting the oldest fingerprint of that size when
//! the bucket is full, plus one global membership set for O(1) lookups.
//!
//! The cache is advisory. A fingerprint that was evicted and comes back
//! merely costs a redundant expansion; it never affects correctness, which
//! is what allows the memory bound to be hard.
//!
//! Fingerprints are `Arc<[NodeId]>` holding the sorted member ids, shared
//! with the work queue's ordering keys, so equality here is exactly
//! comparator-key equality.

use gasp_graph::index::NodeId;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// A fixed-length circular buffer of fingerprints of one solution size.
#[derive(Debug)]
struct Ring {
    slots: Vec<Option<Arc<[NodeId]>>>,
    next: usize,
}

impl Ring {
    fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            next: 0,
        }
    }

    /// Stores `fingerprint`, returning the evicted occupant of the slot.
    fn push(&mut self, fingerprint: Arc<[NodeId]>) -> Option<Arc<[NodeId]>> {
        let evicted = self.slots[self.next].replace(fingerprint);
        self.next = (self.next + 1) % self.slots.len();
        evicted
    }
}

#[derive(Debug)]
struct Inner {
    per_size_capacity: usize,
    rings: FxHashMap<usize, Ring>,
    members: FxHashSet<Arc<[NodeId]>>,
}

/// Thread-safe bounded memory of recently seen partial-solution
/// fingerprints.
///
/// Memory use is bounded by `per_size_capacity` entries per distinct
/// solution size ever observed.
#[derive(Debug)]
pub struct BoundedDedupCache {
    inner: Mutex<Inner>,
}

impl BoundedDedupCache {
    /// Creates a cache holding up to `per_size_capacity` fingerprints per
    /// solution size.
    ///
    /// # Panics
    ///
    /// Panics if `per_size_capacity` is 0; callers disable duplicate
    /// suppression by not constructing a cache at all.
    pub fn new(per_size_capacity: usize) -> Self {
        assert!(
            per_size_capacity > 0,
            "called BoundedDedupCache::new with a zero capacity"
        );
        Self {
            inner: Mutex::new(Inner {
                per_size_capacity,
                rings: FxHashMap::default(),
                members: FxHashSet::default(),
            }),
        }
    }

    /// Records `fingerprint` as recently seen.
    ///
    /// Returns `false` if it was already present (the caller's node is a
    /// duplicate), `true` if it was newly inserted, evicting the oldest
    /// fingerprint of the same size when that bucket is full.
    pub fn insert(&self, fingerprint: &Arc<[NodeId]>) -> bool {
        let mut inner = self.lock();
        if inner.members.contains(fingerprint.as_ref()) {
            return false;
        }
        let capacity = inner.per_size_capacity;
        let evicted = inner
            .rings
            .entry(fingerprint.len())
            .or_insert_with(|| Ring::new(capacity))
            .push(Arc::clone(fingerprint));
        if let Some(old) = evicted {
            inner.members.remove(old.as_ref());
        }
        inner.members.insert(Arc::clone(fingerprint));
        true
    }

    /// Returns whether `fingerprint` is currently remembered.
    pub fn contains(&self, fingerprint: &[NodeId]) -> bool {
        self.lock().members.contains(fingerprint)
    }

    /// Returns the number of remembered fingerprints across all sizes.
    pub fn len(&self) -> usize {
        self.lock().members.len()
    }

    /// Returns `true` if nothing is remembered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(raw: &[usize]) -> Arc<[NodeId]> {
        raw.iter().copied().map(NodeId::new).collect()
    }

    #[test]
    fn test_insert_then_contains() {
        let cache = BoundedDedupCache::new(4);
        let a = fp(&[0, 2, 5]);
        assert!(!cache.contains(&a));
        assert!(cache.insert(&a));
        assert!(cache.contains(&a));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_reinsert_reports_duplicate() {
        let cache = BoundedDedupCache::new(4);
        let a = fp(&[1, 3]);
        assert!(cache.insert(&a));
        assert!(!cache.insert(&a));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_eviction_keeps_bucket_bounded() {
        let cache = BoundedDedupCache::new(2);
        let a = fp(&[0]);
        let b = fp(&[1]);
        let c = fp(&[2]);
        assert!(cache.insert(&a));
        assert!(cache.insert(&b));
        assert!(cache.insert(&c));
        // Oldest same-size entry fell out; the bucket never exceeds 2.
        assert!(!cache.contains(&a));
        assert!(cache.contains(&b));
        assert!(cache.contains(&c));
        assert_eq!(cache.len(), 2);
        // The evicted fingerprint may be inserted afresh.
        assert!(cache.insert(&a));
        assert!(cache.contains(&a));
    }

    #[test]
    fn test_size_buckets_are_independent() {
        let cache = BoundedDedupCache::new(1);
        let short = fp(&[0]);
        let long = fp(&[0, 1]);
        assert!(cache.insert(&short));
        assert!(cache.insert(&long));
        assert!(cache.contains(&short));
        assert!(cache.contains(&long));
        assert_eq!(cache.len(), 2);
        // A second size-1 fingerprint evicts only within its own bucket.
        assert!(cache.insert(&fp(&[9])));
        assert!(!cache.contains(&short));
        assert!(cache.contains(&long));
    }

    #[test]
    #[should_panic(expected = "zero capacity")]
    fn test_zero_capacity_panics() {
        let _ = BoundedDedupCache::new(0);
    }
}
