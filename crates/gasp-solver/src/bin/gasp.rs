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

//! The `gasp` command line.
//!
//! ```text
//! gasp <graph-file> <props-file> [max-nodes] [threads]
//! ```
//!
//! The optional third argument overrides the properties' node budget (when
//! positive), the fourth overrides the thread count. Solutions and the
//! final summary go to stdout, progress and per-tree totals to stderr, in
//! the layout long-time users of the instance collections expect.

use gasp_graph::loading::GraphLoader;
use gasp_solver::props::{Properties, SolverConfig};
use gasp_solver::solver::PackingSolver;
use std::time::Instant;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: gasp <graph-file> <props-file> [max-nodes] [threads]");
        std::process::exit(1);
    }
    if let Err(err) = run(&args) {
        eprintln!("gasp: {}", err);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();

    let graph = GraphLoader::new().from_path(&args[1])?;
    eprintln!("Graph total nodes' weight={}", graph.total_node_weight());

    let props = Properties::from_path(&args[2])?;
    let mut config = SolverConfig::from_props(&props)?;
    if let Some(raw) = args.get(3) {
        let max_nodes: u64 = raw.parse()?;
        if max_nodes > 0 {
            config = config.with_max_nodes(max_nodes);
        }
    }
    if let Some(raw) = args.get(4) {
        config = config.with_num_threads(raw.parse()?);
    }
    eprintln!("Solving a {}-packing problem.", config.kind().k());

    let outcome = PackingSolver::new(config).solve(&graph)?;

    let num_components = outcome.components().len();
    let mut active_nodes = 0usize;
    let mut active_weight = 0.0;
    let mut leaf_nodes = 0u64;
    for (index, report) in outcome.components().iter().enumerate() {
        eprintln!(
            "Solving for subgraph {} w/ sz={} (/{})",
            index + 1,
            report.component_size(),
            num_components
        );
        for &node in report.nodes() {
            print!("{} ", node.get() + 1);
        }
        println!();
        active_nodes += report.nodes().len();
        active_weight += report.weight();
        leaf_nodes += report.statistics().leaf_nodes();
        if !report.is_shortcut() {
            eprintln!("Total BB-nodes={}", report.statistics().nodes_created());
            eprintln!("Total leaf BB-nodes={}", report.statistics().leaf_nodes());
            eprintln!(
                "Total active nodes so far: {} active node weights={} total overall trees leaf BB nodes={}",
                active_nodes, active_weight, leaf_nodes
            );
        }
    }

    println!("Best Soln = {}", outcome.packing().weight());
    println!();
    println!("Wall-clock Time (msecs): {}", start.elapsed().as_millis());
    println!("Done.");
    Ok(())
}
