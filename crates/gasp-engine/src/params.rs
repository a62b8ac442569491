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

//! Run configuration for the search engine.
//!
//! `SearchParams` collects every tunable of a single search run behind
//! consuming builder methods, with defaults that reproduce the plain
//! exhaustive search: no node budget, no queue cap, no duplicate
//! suppression, no bound tightening, no local search. Validation is
//! fail-fast: `SearchTree::run` rejects an invalid configuration before any
//! thread starts.

use gasp_graph::graph::Graph;
use gasp_graph::solution::PackingKind;

/// Configuration errors detected before a run starts.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamsError {
    /// The worker pool must have at least one thread.
    ZeroThreads,
    /// The work queue must admit at least one node.
    ZeroQueueCapacity,
    /// The candidate-combination iteration cap must be positive.
    ZeroCombinationIters,
    /// The fudge factor must lie in `[0, 1]`.
    FudgeFactorOutOfRange(f64),
    /// The local-search expansion factor must be finite and ≥ 1.
    ExpandFactorOutOfRange(f64),
    /// The extra-candidate rate must be finite and ≥ 0.
    ExtraCandidatesRateOutOfRange(f64),
    /// The minimum known bound must not be NaN.
    MinKnownBoundIsNan,
    /// The initial incumbent weight must be finite.
    InitialIncumbentNotFinite(f64),
    /// 2-packing runs require the graph's 2-hop cache to be materialized
    /// before the run starts.
    MissingTwoHopCache,
    /// The configured packing kind does not match the rules the tree was
    /// instantiated with.
    KindMismatch {
        configured: PackingKind,
        rules: PackingKind,
    },
}

impl std::fmt::Display for ParamsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamsError::ZeroThreads => write!(f, "number of worker threads must be at least 1"),
            ParamsError::ZeroQueueCapacity => write!(f, "work queue capacity must be at least 1"),
            ParamsError::ZeroCombinationIters => {
                write!(f, "candidate combination iteration cap must be at least 1")
            }
            ParamsError::FudgeFactorOutOfRange(v) => {
                write!(f, "fudge factor {} outside the valid range [0, 1]", v)
            }
            ParamsError::ExpandFactorOutOfRange(v) => {
                write!(f, "local-search expansion factor {} must be finite and >= 1", v)
            }
            ParamsError::ExtraCandidatesRateOutOfRange(v) => {
                write!(f, "extra-candidate rate {} must be finite and >= 0", v)
            }
            ParamsError::MinKnownBoundIsNan => write!(f, "minimum known bound must not be NaN"),
            ParamsError::InitialIncumbentNotFinite(v) => {
                write!(f, "initial incumbent weight {} must be finite", v)
            }
            ParamsError::MissingTwoHopCache => {
                write!(
                    f,
                    "2-packing requires Graph::materialize_two_hop to run before the search"
                )
            }
            ParamsError::KindMismatch { configured, rules } => {
                write!(
                    f,
                    "configuration is for {} but the tree searches {}",
                    configured, rules
                )
            }
        }
    }
}

impl std::error::Error for ParamsError {}

/// Tunables of one search run.
///
/// Construct with [`SearchParams::new`], adjust with the consuming builder
/// methods, hand to `SearchTree`. See each method for the default it
/// overrides.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub(crate) kind: PackingKind,
    pub(crate) num_threads: usize,
    pub(crate) max_nodes: u64,
    pub(crate) max_queue_size: usize,
    pub(crate) cut_on_overflow: bool,
    pub(crate) use_max_subsets: bool,
    pub(crate) recent_cache_capacity: usize,
    pub(crate) tighten_level: usize,
    pub(crate) max_children: usize,
    pub(crate) max_combination_iters: usize,
    pub(crate) fitness_factor: f64,
    pub(crate) use_gwmin2: bool,
    pub(crate) sort_candidate_sets: bool,
    pub(crate) expand_factor: f64,
    pub(crate) min_known_bound: f64,
    pub(crate) extra_candidates_rate: f64,
    pub(crate) initial_incumbent_weight: f64,
    pub(crate) seed: u64,
}

impl SearchParams {
    /// Creates the default configuration for `kind`.
    pub fn new(kind: PackingKind) -> Self {
        Self {
            kind,
            num_threads: 1,
            max_nodes: u64::MAX,
            max_queue_size: usize::MAX,
            cut_on_overflow: false,
            use_max_subsets: true,
            recent_cache_capacity: 0,
            tighten_level: usize::MAX,
            max_children: usize::MAX,
            max_combination_iters: 100_000,
            fitness_factor: 0.85,
            use_gwmin2: false,
            sort_candidate_sets: false,
            expand_factor: 1.0,
            min_known_bound: f64::NEG_INFINITY,
            extra_candidates_rate: 0.0,
            initial_incumbent_weight: 0.0,
            seed: 0,
        }
    }

    /// Returns the packing kind this configuration solves.
    #[inline]
    pub fn kind(&self) -> PackingKind {
        self.kind
    }

    /// Number of worker threads (default 1). The dispatcher thread is extra.
    pub fn num_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Global budget on created search nodes (default unlimited). Acts as a
    /// cooperative cancellation signal: nodes popped after the budget is hit
    /// finish immediately.
    pub fn max_nodes(mut self, max_nodes: u64) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Capacity of the work queue (default unlimited). Insertions above the
    /// cap are rejected as a signal; see [`SearchParams::cut_on_overflow`].
    pub fn max_queue_size(mut self, capacity: usize) -> Self {
        self.max_queue_size = capacity;
        self
    }

    /// Policy for children rejected by a full queue: `true` drops them
    /// (bounded memory, sacrifices completeness), `false` runs them inline
    /// on the producing worker (default).
    pub fn cut_on_overflow(mut self, cut: bool) -> Self {
        self.cut_on_overflow = cut;
        self
    }

    /// Whether GASP grows maximal candidate combinations (default) or
    /// branches on singleton extensions only.
    pub fn use_max_subsets(mut self, use_max_subsets: bool) -> Self {
        self.use_max_subsets = use_max_subsets;
        self
    }

    /// Per-solution-size capacity of the recently-seen cache; 0 (default)
    /// disables duplicate suppression.
    pub fn recent_cache_capacity(mut self, capacity: usize) -> Self {
        self.recent_cache_capacity = capacity;
        self
    }

    /// Tree depth at which bound computation switches from the cheap loose
    /// estimate to the expensive tight one (default: never). The level
    /// decays multiplicatively as incumbents are found.
    pub fn tighten_level(mut self, level: usize) -> Self {
        self.tighten_level = level;
        self
    }

    /// Cap on the children spawned by one node (default unlimited). The
    /// root is never capped.
    pub fn max_children(mut self, max_children: usize) -> Self {
        self.max_children = max_children;
        self
    }

    /// Iteration cap of the candidate-combination growth (default 100 000).
    pub fn max_combination_iters(mut self, iters: usize) -> Self {
        self.max_combination_iters = iters;
        self
    }

    /// GASP fudge factor `ff` in `[0, 1]` (default 0.85): how close to the
    /// locally best score a node must come to stay a candidate. 1 keeps only
    /// the best, 0 keeps every free node.
    pub fn fitness_factor(mut self, ff: f64) -> Self {
        self.fitness_factor = ff;
        self
    }

    /// Scores MWIS candidates by `w / (w + open neighbor weight)` instead of
    /// raw weight (default off).
    pub fn use_gwmin2(mut self, use_gwmin2: bool) -> Self {
        self.use_gwmin2 = use_gwmin2;
        self
    }

    /// Orders extension sets heaviest-first before branching (default off).
    pub fn sort_candidate_sets(mut self, sort: bool) -> Self {
        self.sort_candidate_sets = sort;
        self
    }

    /// Near-best admission factor ≥ 1 (default 1): a leaf with
    /// `cost * factor >= incumbent` still triggers local search and bound
    /// tightening even when it does not improve the incumbent.
    pub fn expand_factor(mut self, factor: f64) -> Self {
        self.expand_factor = factor;
        self
    }

    /// Known lower bound on the optimum (default −∞): nodes whose upper
    /// bound falls below it are fathomed outright.
    pub fn min_known_bound(mut self, bound: f64) -> Self {
        self.min_known_bound = bound;
        self
    }

    /// Expected number of random extra candidates admitted per expansion,
    /// as a rate ≥ 0 (default 0: deterministic candidate selection).
    pub fn extra_candidates_rate(mut self, rate: f64) -> Self {
        self.extra_candidates_rate = rate;
        self
    }

    /// Starting incumbent weight (default 0): only solutions strictly above
    /// it are ever recorded.
    pub fn initial_incumbent_weight(mut self, weight: f64) -> Self {
        self.initial_incumbent_weight = weight;
        self
    }

    /// Seed for the per-worker random generators (default 0). Runs are
    /// reproducible for a fixed seed and thread count.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fail-fast validation against the graph the run will use.
    pub fn validate(&self, graph: &Graph) -> Result<(), ParamsError> {
        if self.num_threads == 0 {
            return Err(ParamsError::ZeroThreads);
        }
        if self.max_queue_size == 0 {
            return Err(ParamsError::ZeroQueueCapacity);
        }
        if self.max_combination_iters == 0 {
            return Err(ParamsError::ZeroCombinationIters);
        }
        if !(0.0..=1.0).contains(&self.fitness_factor) {
            return Err(ParamsError::FudgeFactorOutOfRange(self.fitness_factor));
        }
        if !self.expand_factor.is_finite() || self.expand_factor < 1.0 {
            return Err(ParamsError::ExpandFactorOutOfRange(self.expand_factor));
        }
        if !self.extra_candidates_rate.is_finite() || self.extra_candidates_rate < 0.0 {
            return Err(ParamsError::ExtraCandidatesRateOutOfRange(
                self.extra_candidates_rate,
            ));
        }
        if self.min_known_bound.is_nan() {
            return Err(ParamsError::MinKnownBoundIsNan);
        }
        if !self.initial_incumbent_weight.is_finite() {
            return Err(ParamsError::InitialIncumbentNotFinite(
                self.initial_incumbent_weight,
            ));
        }
        if self.kind == PackingKind::TwoPacking && !graph.has_two_hop_cache() {
            return Err(ParamsError::MissingTwoHopCache);
        }
        Ok(())
    }
}
