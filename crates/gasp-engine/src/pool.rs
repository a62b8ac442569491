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

//! Dispatcher and worker loops of the thread pool.
//!
//! One dispatcher thread is the queue's sole consumer: it pops nodes in
//! priority order, retires recently-seen member sets against the dedup
//! cache, and forwards the rest over a channel that fans out to the
//! workers. Workers expand nodes until the channel closes; the dispatcher
//! closes it by dropping the sender once the queue reports done or failed.
//!
//! A panicking expansion marks the whole queue failed instead of taking
//! the process down: the dispatcher then stops forwarding, the remaining
//! workers drain the channel, and `SearchTree::run` surfaces the failure
//! as an error.

use crate::ctx::SearchCtx;
use crate::node::rules::PackingRules;
use crate::node::search_node::SearchNode;
use crossbeam_channel::{Receiver, Sender};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// SplitMix64 step, used to spread nearby seeds into unrelated worker
/// streams.
#[inline]
pub(crate) fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Feeds queued nodes to the workers until the queue is drained or failed.
///
/// Dropping `tx` on return is the workers' shutdown signal.
pub(crate) fn dispatcher_loop<R: PackingRules>(ctx: &SearchCtx<'_, R>, tx: Sender<SearchNode<R>>) {
    while let Some(node) = ctx.queue.pop_blocking() {
        if let Some(dedup) = &ctx.dedup {
            if dedup.contains(node.active()) {
                node.finish(ctx);
                continue;
            }
        }
        if tx.send(node).is_err() {
            break;
        }
    }
}

/// Expands forwarded nodes until the channel closes.
pub(crate) fn worker_loop<R: PackingRules>(
    ctx: &SearchCtx<'_, R>,
    rx: Receiver<SearchNode<R>>,
    worker_id: usize,
) {
    let mut rng = SmallRng::seed_from_u64(splitmix64(ctx.params.seed ^ worker_id as u64));
    for node in rx.iter() {
        let outcome = catch_unwind(AssertUnwindSafe(|| node.execute(ctx, &mut rng)));
        if outcome.is_err() {
            ctx.queue
                .mark_failed("worker thread panicked while expanding a node");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::DepthFirstComparator;
    use crate::monitor::NoOpMonitor;
    use crate::node::max_weight::MaxWeightRules;
    use crate::params::SearchParams;
    use crate::queue::InsertOutcome;
    use gasp_graph::graph::Graph;
    use gasp_graph::index::NodeId;
    use gasp_graph::solution::PackingKind;
    use std::sync::Arc;

    fn n(i: usize) -> NodeId {
        NodeId::new(i)
    }

    fn path3() -> Graph {
        let mut g = Graph::new(3);
        g.add_edge(n(0), n(1)).unwrap();
        g.add_edge(n(1), n(2)).unwrap();
        g
    }

    #[test]
    fn test_splitmix64_spreads_consecutive_seeds() {
        let streams: Vec<u64> = (0..8).map(splitmix64).collect();
        for (i, &a) in streams.iter().enumerate() {
            assert_eq!(a, splitmix64(i as u64));
            for &b in &streams[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_dispatcher_forwards_in_priority_order_then_closes() {
        let g = path3();
        let params = SearchParams::new(PackingKind::MaxWeightIndependentSet);
        let comparator = DepthFirstComparator::new();
        let monitor = NoOpMonitor::new();
        let ctx = SearchCtx::<MaxWeightRules>::new(&g, &params, &comparator, &monitor, None);
        let light = SearchNode::for_tests(vec![n(2)], 1.0, 2.0, 1);
        let heavy = SearchNode::for_tests(vec![n(0), n(2)], 2.0, 2.0, 2);
        assert!(matches!(ctx.queue.insert(light), InsertOutcome::Inserted));
        assert!(matches!(ctx.queue.insert(heavy), InsertOutcome::Inserted));
        ctx.queue.mark_all_done();

        let (tx, rx) = crossbeam_channel::unbounded();
        dispatcher_loop(&ctx, tx);
        let forwarded: Vec<_> = rx.iter().collect();
        assert_eq!(forwarded.len(), 2);
        assert_eq!(forwarded[0].active(), &[n(0), n(2)]);
        assert_eq!(forwarded[1].active(), &[n(2)]);
    }

    #[test]
    fn test_dispatcher_retires_recently_seen_sets() {
        let g = path3();
        let params =
            SearchParams::new(PackingKind::MaxWeightIndependentSet).recent_cache_capacity(4);
        let comparator = DepthFirstComparator::new();
        let monitor = NoOpMonitor::new();
        let ctx = SearchCtx::<MaxWeightRules>::new(&g, &params, &comparator, &monitor, None);
        let fingerprint: Arc<[NodeId]> = Arc::from(vec![n(0), n(2)].as_slice());
        assert!(ctx.dedup.as_ref().unwrap().insert(&fingerprint));
        let twin = SearchNode::for_tests(vec![n(0), n(2)], 2.0, 2.0, 2);
        ctx.queue.insert(twin);
        ctx.queue.mark_all_done();

        let (tx, rx) = crossbeam_channel::unbounded();
        dispatcher_loop(&ctx, tx);
        assert_eq!(rx.iter().count(), 0);
    }

    #[test]
    fn test_worker_panic_marks_queue_failed() {
        let g = path3();
        let params = SearchParams::new(PackingKind::MaxWeightIndependentSet);
        let comparator = DepthFirstComparator::new();
        let monitor = NoOpMonitor::new();
        let ctx = SearchCtx::<MaxWeightRules>::new(&g, &params, &comparator, &monitor, None);
        // A member id outside the graph makes the expansion panic.
        let poisoned = SearchNode::<MaxWeightRules>::for_tests(vec![n(99)], 1.0, 100.0, 1);
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(poisoned).unwrap();
        drop(tx);
        worker_loop(&ctx, rx, 0);
        assert!(ctx.queue.failure().is_some());
    }
}
