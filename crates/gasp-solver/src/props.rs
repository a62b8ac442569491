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

//! Run-properties files and the solver configuration derived from them.
//!
//! ## Motivation
//!
//! Packing runs are configured through small `key = value` files whose key
//! names have been stable for years across instance collections. The
//! [`Properties`] type parses that format; [`SolverConfig::from_props`]
//! turns it into a validated-later [`SearchParams`] plus the front-end
//! knobs the engine itself does not know about (comparator choice, local
//! search on/off).
//!
//! ## Format
//!
//! ```text
//! # 2-packing, four workers
//! k = 2
//! numthreads = 4
//! maxnodesallowed = 100000
//! ```
//!
//! Blank lines are skipped and everything from `#` to the end of a line is
//! a comment. Keys are case-sensitive.
//!
//! ## Keys
//!
//! `k`, `numthreads`, `maxqsize`, `cutnodes`, `localsearch`,
//! `usemaxsubsets`, `maxitersinGBNS2A`, `recentqueuesize`,
//! `maxnodechildren`, `tightenboundlevel`, `bbnodecomparator`, `ff`,
//! `useGWMIN2criterion`, `sortmaxsubsets`, `expandlocalsearchfactor`,
//! `minknownbound`, `maxnodesallowed`, `avgpercextranodes2add`, `seed`.
//!
//! Some keys are gated the way the historical reader gated them:
//! `recentqueuesize` applies only when positive and `usemaxsubsets` is
//! off; `tightenboundlevel` only when at least 1; `maxqsize`,
//! `maxnodechildren` and `maxnodesallowed` only when positive.

use gasp_engine::params::SearchParams;
use gasp_graph::solution::PackingKind;
use rustc_hash::FxHashMap;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

/// Errors reading a properties file or deriving a configuration from it.
#[derive(Debug)]
pub enum PropsError {
    /// Underlying I/O failure.
    Io(std::io::Error),
    /// A non-comment line without a `=` separator or with an empty key.
    MalformedLine { line: usize },
    /// A value failed to parse as the type its key requires.
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
    /// The `bbnodecomparator` value named no known strategy.
    UnknownComparator(String),
    /// `k` was neither 1 nor 2.
    UnsupportedK(usize),
}

impl std::fmt::Display for PropsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropsError::Io(e) => write!(f, "i/o error while reading properties: {}", e),
            PropsError::MalformedLine { line } => {
                write!(f, "malformed properties line {}: expected `key = value`", line)
            }
            PropsError::InvalidValue { key, value, expected } => {
                write!(f, "property `{}`: `{}` is not a valid {}", key, value, expected)
            }
            PropsError::UnknownComparator(name) => {
                write!(
                    f,
                    "unknown comparator `{}`: expected `bestfirst`, `depthfirst` or `levelhybrid,<depth>`",
                    name
                )
            }
            PropsError::UnsupportedK(k) => {
                write!(f, "unsupported packing parameter k={}: only 1 and 2 are solvable", k)
            }
        }
    }
}

impl std::error::Error for PropsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PropsError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PropsError {
    fn from(e: std::io::Error) -> Self {
        PropsError::Io(e)
    }
}

/// A parsed `key = value` properties file.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    entries: FxHashMap<String, String>,
}

impl Properties {
    /// Reads properties from a file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PropsError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Reads properties from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PropsError> {
        Self::parse(BufReader::new(reader))
    }

    fn parse<R: BufRead>(reader: R) -> Result<Self, PropsError> {
        let mut entries = FxHashMap::default();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let data = match line.split_once('#') {
                Some((before, _)) => before,
                None => line.as_str(),
            };
            let data = data.trim();
            if data.is_empty() {
                continue;
            }
            let (key, value) = data
                .split_once('=')
                .ok_or(PropsError::MalformedLine { line: index + 1 })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(PropsError::MalformedLine { line: index + 1 });
            }
            entries.insert(key.to_string(), value.trim().to_string());
        }
        Ok(Self { entries })
    }

    /// Returns the raw value of `key`, if present.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of parsed entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the file held no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `key` parsed as `usize`.
    pub fn get_usize(&self, key: &str) -> Result<Option<usize>, PropsError> {
        self.get_parsed(key, "non-negative integer")
    }

    /// Returns `key` parsed as `u64`.
    pub fn get_u64(&self, key: &str) -> Result<Option<u64>, PropsError> {
        self.get_parsed(key, "non-negative integer")
    }

    /// Returns `key` parsed as `f64`.
    pub fn get_f64(&self, key: &str) -> Result<Option<f64>, PropsError> {
        self.get_parsed(key, "number")
    }

    /// Returns `key` parsed as `true`/`false` (case-insensitive).
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, PropsError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(PropsError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    expected: "boolean (`true` or `false`)",
                }),
            },
        }
    }

    fn get_parsed<T: std::str::FromStr>(
        &self,
        key: &str,
        expected: &'static str,
    ) -> Result<Option<T>, PropsError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value.parse().map(Some).map_err(|_| PropsError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
                expected,
            }),
        }
    }
}

impl FromStr for Properties {
    type Err = PropsError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text.as_bytes())
    }
}

/// Node-ordering strategy named by the `bbnodecomparator` key.
///
/// The level-hybrid strategy carries its switch-over depth after a comma,
/// mirroring the constructor-argument syntax of the historical reader:
/// `levelhybrid,5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparatorChoice {
    BestFirst,
    DepthFirst,
    LevelHybrid(usize),
}

impl ComparatorChoice {
    fn parse(text: &str) -> Result<Self, PropsError> {
        let unknown = || PropsError::UnknownComparator(text.to_string());
        match text.trim() {
            "bestfirst" => Ok(ComparatorChoice::BestFirst),
            "depthfirst" => Ok(ComparatorChoice::DepthFirst),
            other => match other.split_once(',') {
                Some((name, depth)) if name.trim() == "levelhybrid" => depth
                    .trim()
                    .parse()
                    .map(ComparatorChoice::LevelHybrid)
                    .map_err(|_| unknown()),
                _ => Err(unknown()),
            },
        }
    }
}

/// Everything a [`PackingSolver`](crate::solver::PackingSolver) run needs:
/// the engine parameters plus the front-end knobs layered on top.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    params: SearchParams,
    comparator: ComparatorChoice,
    local_search: bool,
    seed: u64,
}

impl SolverConfig {
    /// Creates the default configuration for `kind`: engine defaults,
    /// best-first ordering, no local search.
    pub fn new(kind: PackingKind) -> Self {
        Self {
            params: SearchParams::new(kind),
            comparator: ComparatorChoice::BestFirst,
            local_search: false,
            seed: 0,
        }
    }

    /// Derives a configuration from parsed properties.
    ///
    /// Missing keys keep their defaults (`k` defaults to 2). Range errors
    /// in the resulting parameters surface later, from
    /// `SearchParams::validate`, when the solver starts a tree.
    pub fn from_props(props: &Properties) -> Result<Self, PropsError> {
        let k = props.get_usize("k")?.unwrap_or(2);
        let kind = PackingKind::from_k(k).ok_or(PropsError::UnsupportedK(k))?;
        let mut params = SearchParams::new(kind);

        if let Some(v) = props.get_usize("numthreads")? {
            params = params.num_threads(v);
        }
        if let Some(v) = props.get_usize("maxqsize")? {
            if v > 0 {
                params = params.max_queue_size(v);
            }
        }
        if let Some(v) = props.get_bool("cutnodes")? {
            params = params.cut_on_overflow(v);
        }
        let local_search = props.get_bool("localsearch")?.unwrap_or(false);
        let use_max_subsets = props.get_bool("usemaxsubsets")?.unwrap_or(true);
        params = params.use_max_subsets(use_max_subsets);
        if let Some(v) = props.get_usize("maxitersinGBNS2A")? {
            if v > 0 {
                params = params.max_combination_iters(v);
            }
        }
        if let Some(v) = props.get_usize("recentqueuesize")? {
            if v > 0 && !use_max_subsets {
                params = params.recent_cache_capacity(v);
            }
        }
        if let Some(v) = props.get_usize("maxnodechildren")? {
            if v > 0 {
                params = params.max_children(v);
            }
        }
        if let Some(v) = props.get_usize("tightenboundlevel")? {
            if v >= 1 {
                params = params.tighten_level(v);
            }
        }
        if let Some(v) = props.get_f64("ff")? {
            params = params.fitness_factor(v);
        }
        if let Some(v) = props.get_bool("useGWMIN2criterion")? {
            params = params.use_gwmin2(v);
        }
        if let Some(v) = props.get_bool("sortmaxsubsets")? {
            params = params.sort_candidate_sets(v);
        }
        if let Some(v) = props.get_f64("expandlocalsearchfactor")? {
            params = params.expand_factor(v);
        }
        if let Some(v) = props.get_f64("minknownbound")? {
            params = params.min_known_bound(v);
        }
        if let Some(v) = props.get_u64("maxnodesallowed")? {
            if v > 0 {
                params = params.max_nodes(v);
            }
        }
        if let Some(v) = props.get_f64("avgpercextranodes2add")? {
            params = params.extra_candidates_rate(v);
        }
        let seed = props.get_u64("seed")?.unwrap_or(0);
        params = params.seed(seed);

        let comparator = match props.get("bbnodecomparator") {
            Some(text) => ComparatorChoice::parse(text)?,
            None => ComparatorChoice::BestFirst,
        };

        Ok(Self {
            params,
            comparator,
            local_search,
            seed,
        })
    }

    /// Packing kind this configuration solves.
    #[inline]
    pub fn kind(&self) -> PackingKind {
        self.params.kind()
    }

    /// Engine parameters handed to every per-component tree.
    #[inline]
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Configured node-ordering strategy.
    #[inline]
    pub fn comparator(&self) -> ComparatorChoice {
        self.comparator
    }

    /// Whether leaves trigger the bundled local search.
    #[inline]
    pub fn local_search(&self) -> bool {
        self.local_search
    }

    /// Seed shared by the engine workers and the local search.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Overrides the per-tree node budget.
    pub fn with_max_nodes(mut self, max_nodes: u64) -> Self {
        self.params = self.params.max_nodes(max_nodes);
        self
    }

    /// Overrides the worker thread count.
    pub fn with_num_threads(mut self, threads: usize) -> Self {
        self.params = self.params.num_threads(threads);
        self
    }

    /// Replaces the node-ordering strategy.
    pub fn with_comparator(mut self, comparator: ComparatorChoice) -> Self {
        self.comparator = comparator;
        self
    }

    /// Switches the bundled local search on or off.
    pub fn with_local_search(mut self, local_search: bool) -> Self {
        self.local_search = local_search;
        self
    }

    /// Replaces the seed for both the engine workers and the local search.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.params = self.params.seed(seed);
        self.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_entries_comments_and_blanks() {
        let text = "\
# run configuration
k = 1

numthreads = 4   # workers
ff=0.9
";
        let props: Properties = text.parse().unwrap();
        assert_eq!(props.len(), 3);
        assert_eq!(props.get("k"), Some("1"));
        assert_eq!(props.get("numthreads"), Some("4"));
        assert_eq!(props.get("ff"), Some("0.9"));
        assert_eq!(props.get("missing"), None);
    }

    #[test]
    fn test_line_without_separator_is_malformed() {
        let err = "numthreads 4".parse::<Properties>().unwrap_err();
        assert!(matches!(err, PropsError::MalformedLine { line: 1 }));
    }

    #[test]
    fn test_typed_getters_report_key_and_value() {
        let props: Properties = "a = 12\nb = x".parse().unwrap();
        assert_eq!(props.get_usize("a").unwrap(), Some(12));
        assert_eq!(props.get_usize("absent").unwrap(), None);
        match props.get_f64("b") {
            Err(PropsError::InvalidValue { key, value, .. }) => {
                assert_eq!(key, "b");
                assert_eq!(value, "x");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_bool_getter_is_case_insensitive() {
        let props: Properties = "on = TRUE\noff = false\nbad = yes".parse().unwrap();
        assert_eq!(props.get_bool("on").unwrap(), Some(true));
        assert_eq!(props.get_bool("off").unwrap(), Some(false));
        assert!(props.get_bool("bad").is_err());
    }

    #[test]
    fn test_comparator_names() {
        let cases = [
            ("bbnodecomparator = bestfirst", ComparatorChoice::BestFirst),
            ("bbnodecomparator = depthfirst", ComparatorChoice::DepthFirst),
            ("bbnodecomparator = levelhybrid,4", ComparatorChoice::LevelHybrid(4)),
        ];
        for (text, expected) in cases {
            let props: Properties = text.parse().unwrap();
            let config = SolverConfig::from_props(&props).unwrap();
            assert_eq!(config.comparator(), expected);
        }

        let props: Properties = "bbnodecomparator = random".parse().unwrap();
        assert!(matches!(
            SolverConfig::from_props(&props),
            Err(PropsError::UnknownComparator(_))
        ));
    }

    #[test]
    fn test_defaults_without_keys() {
        let props = Properties::default();
        let config = SolverConfig::from_props(&props).unwrap();
        assert_eq!(config.kind(), PackingKind::TwoPacking);
        assert_eq!(config.comparator(), ComparatorChoice::BestFirst);
        assert!(!config.local_search());
        assert_eq!(config.seed(), 0);
    }

    #[test]
    fn test_unsupported_k_is_rejected() {
        let props: Properties = "k = 3".parse().unwrap();
        assert!(matches!(
            SolverConfig::from_props(&props),
            Err(PropsError::UnsupportedK(3))
        ));
    }

    #[test]
    fn test_gated_keys_ignore_disabled_values() {
        let text = "\
k = 1
maxqsize = 0
tightenboundlevel = 0
recentqueuesize = 64
maxnodechildren = 0
";
        let props: Properties = text.parse().unwrap();
        let config = SolverConfig::from_props(&props).unwrap();
        let rendered = format!("{:?}", config.params());
        let max = usize::MAX.to_string();
        assert!(rendered.contains(&format!("max_queue_size: {}", max)));
        assert!(rendered.contains(&format!("tighten_level: {}", max)));
        assert!(rendered.contains(&format!("max_children: {}", max)));
        // recentqueuesize only counts when usemaxsubsets is off.
        assert!(rendered.contains("recent_cache_capacity: 0"));
    }

    #[test]
    fn test_recent_queue_applies_when_singleton_branching() {
        let text = "\
k = 1
usemaxsubsets = false
recentqueuesize = 64
";
        let props: Properties = text.parse().unwrap();
        let config = SolverConfig::from_props(&props).unwrap();
        let rendered = format!("{:?}", config.params());
        assert!(rendered.contains("use_max_subsets: false"));
        assert!(rendered.contains("recent_cache_capacity: 64"));
    }

    #[test]
    fn test_full_key_set_round_trip() {
        let text = "\
k = 1
numthreads = 3
maxqsize = 128
cutnodes = true
localsearch = true
usemaxsubsets = true
maxitersinGBNS2A = 5000
maxnodechildren = 8
tightenboundlevel = 6
bbnodecomparator = depthfirst
ff = 0.5
useGWMIN2criterion = true
sortmaxsubsets = true
expandlocalsearchfactor = 1.5
minknownbound = 3.5
maxnodesallowed = 777
avgpercextranodes2add = 0.25
seed = 99
";
        let props: Properties = text.parse().unwrap();
        let config = SolverConfig::from_props(&props).unwrap();
        assert_eq!(config.kind(), PackingKind::MaxWeightIndependentSet);
        assert!(config.local_search());
        assert_eq!(config.comparator(), ComparatorChoice::DepthFirst);
        assert_eq!(config.seed(), 99);
        let rendered = format!("{:?}", config.params());
        for expected in [
            "num_threads: 3",
            "max_queue_size: 128",
            "cut_on_overflow: true",
            "max_combination_iters: 5000",
            "max_children: 8",
            "tighten_level: 6",
            "fitness_factor: 0.5",
            "use_gwmin2: true",
            "sort_candidate_sets: true",
            "expand_factor: 1.5",
            "min_known_bound: 3.5",
            "max_nodes: 777",
            "extra_candidates_rate: 0.25",
            "seed: 99",
        ] {
            assert!(rendered.contains(expected), "missing `{}` in {}", expected, rendered);
        }
    }

    #[test]
    fn test_overrides_replace_parsed_values() {
        let props: Properties = "k = 1\nnumthreads = 2\nmaxnodesallowed = 10".parse().unwrap();
        let config = SolverConfig::from_props(&props)
            .unwrap()
            .with_num_threads(8)
            .with_max_nodes(1234);
        let rendered = format!("{:?}", config.params());
        assert!(rendered.contains("num_threads: 8"));
        assert!(rendered.contains("max_nodes: 1234"));
    }
}
