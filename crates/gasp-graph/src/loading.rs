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

//! Plain-text graph instance loader.
//!
//! ## Motivation
//!
//! Packing instances circulate as simple whitespace-separated text files.
//! The format understood here:
//!
//! ```text
//! <num_edges> <num_nodes>
//! <from> <to> [ignored_edge_weight]     (num_edges lines, 1-based endpoints)
//! <node_weight>                          (optional, one line per node in order)
//! ```
//!
//! Blank lines are skipped and everything from `#` to the end of a line is
//! treated as a comment. Nodes without an explicit weight line keep the
//! loader's default weight (1.0 unless overridden).
//!
//! ## Usage
//!
//! ```rust
//! use gasp_graph::loading::GraphLoader;
//!
//! let text = "\
//! ## tiny path
//! 2 3
//! 1 2
//! 2 3
//! 5.0
//! 1.0
//! 1.0
//! ";
//! let g = GraphLoader::new().from_str(text).unwrap();
//! assert_eq!(g.num_nodes(), 3);
//! assert_eq!(g.num_edges(), 2);
//! ```

use crate::graph::{Graph, GraphError};
use crate::index::NodeId;
use std::io::{BufRead, BufReader, Read};
use std::num::{ParseFloatError, ParseIntError};
use std::path::Path;

/// A token that failed to parse as the expected numeric type.
#[derive(Debug)]
pub enum ParseTokenError {
    /// Expected an integer.
    Int { token: String, source: ParseIntError },
    /// Expected a floating point number.
    Float {
        token: String,
        source: ParseFloatError,
    },
}

impl std::fmt::Display for ParseTokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseTokenError::Int { token, .. } => {
                write!(f, "invalid integer token `{}`", token)
            }
            ParseTokenError::Float { token, .. } => {
                write!(f, "invalid floating point token `{}`", token)
            }
        }
    }
}

impl std::error::Error for ParseTokenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseTokenError::Int { source, .. } => Some(source),
            ParseTokenError::Float { source, .. } => Some(source),
        }
    }
}

/// Errors reported while loading a graph instance.
#[derive(Debug)]
pub enum LoadError {
    /// Underlying I/O failure.
    Io(std::io::Error),
    /// The input ended before the declared data was complete.
    UnexpectedEof,
    /// A line had a different number of tokens than its section allows.
    MalformedLine { line: usize, expected: &'static str },
    /// A numeric token failed to parse.
    Parse(ParseTokenError),
    /// An edge endpoint was outside `1..=num_nodes`.
    InvalidEndpoint { value: usize, num_nodes: usize },
    /// More node-weight lines than nodes.
    TooManyNodeWeights { num_nodes: usize },
    /// The parsed data violated a graph invariant (e.g. a self-loop).
    Graph(GraphError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "i/o error while loading graph: {}", e),
            LoadError::UnexpectedEof => write!(f, "unexpected end of input"),
            LoadError::MalformedLine { line, expected } => {
                write!(f, "malformed line {}: expected {}", line, expected)
            }
            LoadError::Parse(e) => write!(f, "{}", e),
            LoadError::InvalidEndpoint { value, num_nodes } => {
                write!(
                    f,
                    "edge endpoint {} outside the valid range 1..={}",
                    value, num_nodes
                )
            }
            LoadError::TooManyNodeWeights { num_nodes } => {
                write!(f, "more node-weight lines than the {} declared nodes", num_nodes)
            }
            LoadError::Graph(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::Parse(e) => Some(e),
            LoadError::Graph(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<ParseTokenError> for LoadError {
    fn from(e: ParseTokenError) -> Self {
        LoadError::Parse(e)
    }
}

impl From<GraphError> for LoadError {
    fn from(e: GraphError) -> Self {
        LoadError::Graph(e)
    }
}

fn parse_usize(token: &str) -> Result<usize, ParseTokenError> {
    token.parse().map_err(|source| ParseTokenError::Int {
        token: token.to_string(),
        source,
    })
}

fn parse_f64(token: &str) -> Result<f64, ParseTokenError> {
    token.parse().map_err(|source| ParseTokenError::Float {
        token: token.to_string(),
        source,
    })
}

/// Loader for the plain-text instance format.
#[derive(Debug, Clone)]
pub struct GraphLoader {
    default_node_weight: f64,
}

impl Default for GraphLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphLoader {
    /// Creates a loader with the default node weight of 1.0.
    pub fn new() -> Self {
        Self {
            default_node_weight: 1.0,
        }
    }

    /// Sets the weight assigned to nodes without an explicit weight line.
    pub fn default_node_weight(mut self, weight: f64) -> Self {
        self.default_node_weight = weight;
        self
    }

    /// Loads a graph from a file.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Graph, LoadError> {
        let file = std::fs::File::open(path)?;
        self.from_reader(file)
    }

    /// Loads a graph from any reader.
    pub fn from_reader<R: Read>(&self, reader: R) -> Result<Graph, LoadError> {
        self.parse(BufReader::new(reader))
    }

    /// Loads a graph from an in-memory string.
    pub fn from_str(&self, text: &str) -> Result<Graph, LoadError> {
        self.parse(text.as_bytes())
    }

    fn parse<R: BufRead>(&self, reader: R) -> Result<Graph, LoadError> {
        let mut lines = DataLines::new(reader);

        let (line_no, header) = lines.next_data_line()?.ok_or(LoadError::UnexpectedEof)?;
        let mut header_tokens = header.split_whitespace();
        let (edges, nodes) = match (header_tokens.next(), header_tokens.next()) {
            (Some(edges), Some(nodes)) => (edges, nodes),
            _ => {
                return Err(LoadError::MalformedLine {
                    line: line_no,
                    expected: "`<num_edges> <num_nodes>`",
                })
            }
        };
        let num_edges = parse_usize(edges)?;
        let num_nodes = parse_usize(nodes)?;
        let mut graph = Graph::new(num_nodes);
        if self.default_node_weight != 1.0 {
            for v in 0..num_nodes {
                graph.set_node_weight(NodeId::new(v), self.default_node_weight)?;
            }
        }
        self.parse_body(&mut lines, graph, num_edges)
    }

    fn parse_body<R: BufRead>(
        &self,
        lines: &mut DataLines<R>,
        mut graph: Graph,
        num_edges: usize,
    ) -> Result<Graph, LoadError> {
        let num_nodes = graph.num_nodes();
        for _ in 0..num_edges {
            let (line_no, line) = lines.next_data_line()?.ok_or(LoadError::UnexpectedEof)?;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != 2 && tokens.len() != 3 {
                return Err(LoadError::MalformedLine {
                    line: line_no,
                    expected: "`<from> <to> [edge_weight]`",
                });
            }
            let from = parse_usize(tokens[0])?;
            let to = parse_usize(tokens[1])?;
            // A third token is a legacy edge weight; packing ignores it but
            // the file format allows it.
            if let Some(extra) = tokens.get(2) {
                parse_f64(extra)?;
            }
            for endpoint in [from, to] {
                if endpoint == 0 || endpoint > num_nodes {
                    return Err(LoadError::InvalidEndpoint {
                        value: endpoint,
                        num_nodes,
                    });
                }
            }
            graph.add_edge(NodeId::new(from - 1), NodeId::new(to - 1))?;
        }

        // Whatever follows the edge section is one weight per node, in order.
        let mut node = 0usize;
        while let Some((line_no, line)) = lines.next_data_line()? {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != 1 {
                return Err(LoadError::MalformedLine {
                    line: line_no,
                    expected: "a single node weight",
                });
            }
            if node >= num_nodes {
                return Err(LoadError::TooManyNodeWeights { num_nodes });
            }
            graph.set_node_weight(NodeId::new(node), parse_f64(tokens[0])?)?;
            node += 1;
        }
        Ok(graph)
    }
}

/// Line reader that strips `#` comments and skips blank lines.
struct DataLines<R> {
    reader: R,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> DataLines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }

    fn next_data_line(&mut self) -> Result<Option<(usize, String)>, LoadError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let data = match self.buf.split_once('#') {
                Some((before, _)) => before,
                None => self.buf.as_str(),
            };
            let data = data.trim();
            if !data.is_empty() {
                return Ok(Some((self.line_no, data.to_string())));
            }
        }
    }
}
