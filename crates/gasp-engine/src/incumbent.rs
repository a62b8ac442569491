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

//! # Shared Incumbent (Best Packing Holder)
//!
//! A concurrent container for the best packing discovered so far during a
//! run. It exposes a fast, lock-free weight via an atomic and stores the
//! actual [`Packing`] behind a `Mutex` as the source of truth. Designed for
//! exact search pipelines where many worker threads propose improvements.
//!
//! ## Motivation
//!
//! - Fast heuristic checks: a cheap atomic weight read short-circuits
//!   pruning comparisons and obviously-worse install attempts without
//!   locking.
//! - Correctness by locking: the authoritative packing is protected by a
//!   `Mutex`, ensuring consistent updates under contention.
//! - Explicit floor: the weight starts at the configured initial incumbent
//!   weight, so only solutions strictly above it are ever recorded.
//!
//! ## Highlights
//!
//! - `try_install` accepts strictly better candidates only, updating both
//!   the snapshot and the atomic weight; the reported weight is therefore
//!   monotonically non-decreasing over the whole run.
//! - `weight()` is a relaxed atomic read; the mutex alone carries the
//!   correctness-sensitive state.
//! - The atomic stores order-preserving `f64` bits, so a plain integer
//!   compare-free load/store is enough for a monotone float maximum.
//!
//! ## Usage
//!
//! ```rust
//! use gasp_engine::incumbent::SharedIncumbent;
//! use gasp_graph::index::NodeId;
//! use gasp_graph::solution::PackingKind;
//!
//! let inc = SharedIncumbent::new(0.0);
//! let installed = inc.try_install(
//!     &[NodeId::new(0), NodeId::new(2)],
//!     2.0,
//!     PackingKind::MaxWeightIndependentSet,
//! );
//! assert!(installed);
//! assert_eq!(inc.weight(), 2.0);
//! assert!(!inc.try_install(&[NodeId::new(1)], 1.0, PackingKind::MaxWeightIndependentSet));
//! ```

use gasp_graph::index::NodeId;
use gasp_graph::solution::{Packing, PackingKind};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex, MutexGuard,
};

/// Maps an `f64` to bits whose unsigned order matches the float order.
///
/// Standard sign-flip trick: non-negative floats get the sign bit set,
/// negative floats are inverted wholesale. Total and order-preserving for
/// every non-NaN value.
#[inline]
fn order_preserving_bits(value: f64) -> u64 {
    let bits = value.to_bits();
    if bits >> 63 == 1 {
        !bits
    } else {
        bits | (1 << 63)
    }
}

#[inline]
fn float_from_ordered_bits(bits: u64) -> f64 {
    if bits >> 63 == 1 {
        f64::from_bits(bits & !(1 << 63))
    } else {
        f64::from_bits(!bits)
    }
}

/// A concurrent holder for the best (incumbent) packing found during a run.
///
/// Maintains an `AtomicU64` mirror of the incumbent weight for fast,
/// lock-free reads and a `Mutex<Option<Packing>>` as the source of truth.
///
/// Concurrency and memory ordering: the weight mirror is loaded and stored
/// with `Ordering::Relaxed`. This is sufficient because it only serves to
/// short-circuit work; every correctness-sensitive decision re-checks under
/// the mutex, and the mirror is only ever written while the mutex is held.
#[derive(Debug)]
pub struct SharedIncumbent {
    /// Order-preserving bits of the best weight seen so far.
    weight_bits: AtomicU64,
    /// The authoritative best packing; `None` until the first install.
    best: Mutex<Option<Packing>>,
    /// Weight floor below which nothing is ever installed.
    floor: f64,
}

impl SharedIncumbent {
    /// Creates an incumbent holder with the given starting weight floor.
    pub fn new(initial_weight: f64) -> Self {
        Self {
            weight_bits: AtomicU64::new(order_preserving_bits(initial_weight)),
            best: Mutex::new(None),
            floor: initial_weight,
        }
    }

    /// Returns the current incumbent weight (or the initial floor before the
    /// first install). Lock-free.
    #[inline]
    pub fn weight(&self) -> f64 {
        float_from_ordered_bits(self.weight_bits.load(Ordering::Relaxed))
    }

    /// Installs `nodes` as the new incumbent iff `weight` strictly exceeds
    /// the current incumbent weight. Returns whether the install happened.
    pub fn try_install(&self, nodes: &[NodeId], weight: f64, kind: PackingKind) -> bool {
        if weight <= self.weight() {
            return false;
        }
        let mut guard = self.lock_best();
        let current = guard.as_ref().map(Packing::weight).unwrap_or(self.floor);
        if weight <= current {
            return false;
        }
        *guard = Some(Packing::new(kind, nodes.to_vec(), weight));
        self.weight_bits
            .store(order_preserving_bits(weight), Ordering::Relaxed);
        true
    }

    /// Returns a cloned snapshot of the current incumbent, if any.
    pub fn snapshot(&self) -> Option<Packing> {
        self.lock_best().clone()
    }

    /// A poisoned lock means some worker already brought the run down; the
    /// stored snapshot is still coherent because both fields are written
    /// under the same critical section.
    fn lock_best(&self) -> MutexGuard<'_, Option<Packing>> {
        match self.best.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[usize]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId::new).collect()
    }

    #[test]
    fn test_bit_mapping_preserves_order() {
        let values = [-5.5, -1.0, -0.0, 0.0, 0.25, 1.0, 7.5, 1e100];
        for pair in values.windows(2) {
            assert!(
                order_preserving_bits(pair[0]) <= order_preserving_bits(pair[1]),
                "order broken between {} and {}",
                pair[0],
                pair[1]
            );
        }
        for v in values {
            assert_eq!(float_from_ordered_bits(order_preserving_bits(v)), v);
        }
    }

    #[test]
    fn test_install_requires_strict_improvement() {
        let inc = SharedIncumbent::new(0.0);
        let kind = PackingKind::MaxWeightIndependentSet;
        assert!(!inc.try_install(&ids(&[0]), 0.0, kind));
        assert!(inc.try_install(&ids(&[0]), 1.0, kind));
        assert!(!inc.try_install(&ids(&[1]), 1.0, kind));
        assert!(inc.try_install(&ids(&[1, 2]), 2.0, kind));
        assert_eq!(inc.weight(), 2.0);
        let snap = inc.snapshot().unwrap();
        assert_eq!(snap.nodes(), &ids(&[1, 2])[..]);
    }

    #[test]
    fn test_initial_floor_rejects_below() {
        let inc = SharedIncumbent::new(5.0);
        let kind = PackingKind::MaxWeightIndependentSet;
        assert!(!inc.try_install(&ids(&[0]), 4.0, kind));
        assert!(inc.snapshot().is_none());
        assert_eq!(inc.weight(), 5.0);
        assert!(inc.try_install(&ids(&[0]), 6.0, kind));
        assert_eq!(inc.weight(), 6.0);
    }

    #[test]
    fn test_concurrent_installs_keep_maximum() {
        use std::sync::Arc;
        use std::thread;

        let inc = Arc::new(SharedIncumbent::new(0.0));
        let mut handles = Vec::new();
        for t in 0..8u64 {
            let inc = Arc::clone(&inc);
            handles.push(thread::spawn(move || {
                for i in 0..100u64 {
                    let weight = (t * 100 + i) as f64 / 100.0;
                    inc.try_install(&ids(&[t as usize]), weight, PackingKind::TwoPacking);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        let expected = (7 * 100 + 99) as f64 / 100.0;
        assert_eq!(inc.weight(), expected);
        assert_eq!(inc.snapshot().unwrap().weight(), expected);
    }
}
