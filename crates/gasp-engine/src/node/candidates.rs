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

//! Growth of candidate singletons into maximal extension sets.
//!
//! From the best singletons, the grower enumerates all maximal
//! conflict-free combinations by iterative extension. The total number of
//! iterations is capped; growing the combinations is not guaranteed to
//! stay greedy-optimal once several nodes are added at once, and without
//! the cap the enumeration can go wild on dense candidate sets. When the
//! cap is hit, the still-unexpanded sets are greedily merged pairwise so
//! the caller still receives maximal additions.

use crate::node::rules::PackingRules;
use gasp_graph::{graph::Graph, index::NodeId};
use smallvec::SmallVec;

/// One simultaneous addition to a partial solution. Typically one to four
/// nodes.
pub type CandidateSet = SmallVec<[NodeId; 4]>;

/// Wraps each singleton in its own extension set.
pub(crate) fn singleton_family(singles: &[NodeId]) -> Vec<CandidateSet> {
    singles
        .iter()
        .map(|&node| CandidateSet::from_slice(&[node]))
        .collect()
}

/// Grows `singles` into all maximal conflict-free extension sets, spending
/// at most `max_iters` growth iterations.
pub(crate) fn grow_max_subsets<R: PackingRules>(
    graph: &Graph,
    singles: &[NodeId],
    max_iters: usize,
) -> Vec<CandidateSet> {
    let mut result: Vec<CandidateSet> = Vec::new();
    let mut store: Vec<CandidateSet> = Vec::new();
    let mut work: Vec<CandidateSet> = singleton_family(singles);

    let mut iterations = 0usize;
    loop {
        iterations += 1;
        if iterations >= max_iters {
            break;
        }
        let Some(current) = work.pop() else { break };
        let mut expanded = false;
        for &candidate in singles {
            if is_free_to_cover::<R>(graph, candidate, &current) {
                let mut grown = current.clone();
                insert_sorted(&mut grown, candidate);
                work.push(grown);
                expanded = true;
            }
        }
        if !expanded && !is_covered(&store, &current) {
            store.push(current);
        }
    }

    // Iteration cap hit with sets still unexpanded: merge the leftovers
    // pairwise wherever their union stays conflict free, then keep every
    // survivor that no stored maximal set covers.
    while let Some(current) = work.pop() {
        let mut merged = false;
        for i in 0..result.len() {
            if unions_without_conflict::<R>(graph, &current, &result[i]) {
                let other = result.swap_remove(i);
                let mut union = current.clone();
                for &node in &other {
                    insert_sorted(&mut union, node);
                }
                work.push(union);
                merged = true;
                break;
            }
        }
        if !merged && !is_covered(&store, &current) && !result.contains(&current) {
            result.push(current);
        }
    }

    result.extend(store);
    result
}

/// Orders the family by total objective value, heaviest set first.
pub(crate) fn sort_heaviest_first<R: PackingRules>(graph: &Graph, family: &mut [CandidateSet]) {
    family.sort_by(|a, b| set_value::<R>(graph, b).total_cmp(&set_value::<R>(graph, a)));
}

pub(crate) fn set_value<R: PackingRules>(graph: &Graph, set: &[NodeId]) -> f64 {
    set.iter().map(|&node| R::node_value(graph, node)).sum()
}

/// Whether `candidate` can join `set` without conflicting with any member.
fn is_free_to_cover<R: PackingRules>(graph: &Graph, candidate: NodeId, set: &[NodeId]) -> bool {
    if set.binary_search(&candidate).is_ok() {
        return false;
    }
    set.iter()
        .all(|&member| !R::conflicts(graph, candidate, member))
}

/// Whether `a` and `b` can be added together: no conflict across the two
/// sets. Within each set the members are already mutually compatible.
fn unions_without_conflict<R: PackingRules>(graph: &Graph, a: &[NodeId], b: &[NodeId]) -> bool {
    a.iter().all(|&x| {
        b.iter()
            .all(|&y| x == y || !R::conflicts(graph, x, y))
    })
}

fn insert_sorted(set: &mut CandidateSet, node: NodeId) {
    if let Err(position) = set.binary_search(&node) {
        set.insert(position, node);
    }
}

fn is_covered(store: &[CandidateSet], set: &CandidateSet) -> bool {
    store.iter().any(|candidate| is_subset(set, candidate))
}

/// Subset test over two sorted sets.
fn is_subset(inner: &[NodeId], outer: &[NodeId]) -> bool {
    let mut outer_iter = outer.iter();
    'members: for member in inner {
        for candidate in outer_iter.by_ref() {
            match candidate.cmp(member) {
                std::cmp::Ordering::Less => continue,
                std::cmp::Ordering::Equal => continue 'members,
                std::cmp::Ordering::Greater => return false,
            }
        }
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::max_weight::MaxWeightRules;
    use gasp_graph::graph::Graph;

    fn node_ids(ids: &[usize]) -> CandidateSet {
        ids.iter().map(|&i| NodeId::new(i)).collect()
    }

    fn path(n: usize) -> Graph {
        let mut g = Graph::new(n);
        for i in 0..n.saturating_sub(1) {
            g.add_edge(NodeId::new(i), NodeId::new(i + 1)).unwrap();
        }
        g
    }

    #[test]
    fn test_compatible_singles_grow_into_one_set() {
        // 0-1-2: the endpoints do not conflict, so {0, 2} is the single
        // maximal combination.
        let g = path(3);
        let singles = [NodeId::new(0), NodeId::new(2)];
        let family = grow_max_subsets::<MaxWeightRules>(&g, &singles, 100_000);
        assert_eq!(family, vec![node_ids(&[0, 2])]);
    }

    #[test]
    fn test_conflicting_singles_stay_singletons() {
        let mut g = Graph::new(3);
        for (a, b) in [(0, 1), (1, 2), (0, 2)] {
            g.add_edge(NodeId::new(a), NodeId::new(b)).unwrap();
        }
        let singles = [NodeId::new(0), NodeId::new(1), NodeId::new(2)];
        let mut family = grow_max_subsets::<MaxWeightRules>(&g, &singles, 100_000);
        family.sort();
        assert_eq!(
            family,
            vec![node_ids(&[0]), node_ids(&[1]), node_ids(&[2])]
        );
    }

    #[test]
    fn test_no_covered_duplicates() {
        // 0-1-2-3-4: maximal combinations over all five candidates must
        // not contain subsets of each other.
        let g = path(5);
        let singles: Vec<NodeId> = (0..5).map(NodeId::new).collect();
        let family = grow_max_subsets::<MaxWeightRules>(&g, &singles, 100_000);
        for (i, a) in family.iter().enumerate() {
            for (j, b) in family.iter().enumerate() {
                if i != j {
                    assert!(!is_subset(a, b), "{:?} covered by {:?}", a, b);
                }
            }
        }
        assert!(family.contains(&node_ids(&[0, 2, 4])));
    }

    #[test]
    fn test_iteration_cap_still_yields_maximal_sets() {
        let g = path(5);
        let singles: Vec<NodeId> = (0..5).map(NodeId::new).collect();
        let family = grow_max_subsets::<MaxWeightRules>(&g, &singles, 4);
        assert!(!family.is_empty());
        // Merged leftovers must still be conflict free.
        for set in &family {
            for (i, &a) in set.iter().enumerate() {
                for &b in &set[i + 1..] {
                    assert!(!MaxWeightRules::conflicts(&g, a, b));
                }
            }
        }
    }

    #[test]
    fn test_sort_heaviest_first() {
        let mut g = path(3);
        g.set_node_weight(NodeId::new(0), 1.0).unwrap();
        g.set_node_weight(NodeId::new(1), 5.0).unwrap();
        g.set_node_weight(NodeId::new(2), 2.0).unwrap();
        let mut family = vec![node_ids(&[0, 2]), node_ids(&[1])];
        sort_heaviest_first::<MaxWeightRules>(&g, &mut family);
        assert_eq!(family[0], node_ids(&[1]));
    }
}
