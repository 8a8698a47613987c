use anyhow::{Context, Result, bail};
use clap::Subcommand;
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use wfserial::v1::{Engine, Graph, GraphDraft, Storage};

use crate::to_json;

#[derive(Subcommand, Debug)]
pub enum GraphOp {
    /// List stored graphs; the active one is marked with `*`
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a graph as JSON
    Show {
        /// Graph id
        id: String,
    },
    /// Import a graph from a JSON file (use - for stdin)
    Import {
        /// Input file
        file: PathBuf,
    },
    /// Export a graph as JSON
    Export {
        /// Graph id
        id: String,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Make a graph the active one and restart its run
    Select {
        /// Graph id
        id: String,
    },
    /// Delete a graph
    Delete {
        /// Graph id
        id: String,
    },
}

pub fn run<S: Storage>(engine: &mut Engine<S>, op: GraphOp, pretty: bool) -> Result<()> {
    match op {
        GraphOp::List { json } => run_list(engine, json, pretty),
        GraphOp::Show { id } => {
            let graph = find_graph(engine, &id)?;
            println!("{}", to_json(graph, pretty)?);
            Ok(())
        }
        GraphOp::Import { file } => {
            let content = read_input(&file)?;
            let id = import_graph(engine, &content)?;
            println!("{id}");
            Ok(())
        }
        GraphOp::Export { id, output } => {
            let json = to_json(find_graph(engine, &id)?, pretty)?;
            if let Some(out) = output {
                std::fs::write(&out, &json)
                    .with_context(|| format!("failed to write to {}", out.display()))?;
            } else {
                println!("{json}");
            }
            Ok(())
        }
        GraphOp::Select { id } => {
            if !engine.select_graph(&id) {
                bail!("no graph with id {id:?}");
            }
            eprintln!("Selected {id}");
            Ok(())
        }
        GraphOp::Delete { id } => {
            if !engine.delete_graph(&id) {
                bail!("no graph with id {id:?}");
            }
            eprintln!("Deleted {id}");
            Ok(())
        }
    }
}

fn read_input(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))
    }
}

fn find_graph<'a, S: Storage>(engine: &'a Engine<S>, id: &str) -> Result<&'a Graph> {
    engine
        .graph(id)
        .with_context(|| format!("no graph with id {id:?}"))
}

/// Validate a graph document and store it. A graph whose id is already
/// stored replaces that graph; otherwise it is added. Returns the stored id.
fn import_graph<S: Storage>(engine: &mut Engine<S>, content: &str) -> Result<String> {
    let parsed: Graph = serde_json::from_str(content).context("failed to parse graph")?;

    let mut draft = GraphDraft::from_graph(&parsed);
    for node in parsed.nodes.values() {
        draft.upsert_node(node.clone());
    }
    let graph = draft.build().context("invalid graph")?;
    let id = graph.id.clone();

    if engine.graph(&id).is_some() {
        engine.update_graph(graph);
    } else {
        engine.add_graph(graph);
    }
    Ok(id)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphSummary<'a> {
    id: &'a str,
    name: &'a str,
    nodes: usize,
    active: bool,
}

fn summarize<S: Storage>(engine: &Engine<S>) -> Vec<GraphSummary<'_>> {
    let active = engine.active_graph().map(|g| g.id.as_str());
    engine
        .list_graphs()
        .iter()
        .map(|g| GraphSummary {
            id: &g.id,
            name: &g.name,
            nodes: g.nodes.len(),
            active: active == Some(g.id.as_str()),
        })
        .collect()
}

fn run_list<S: Storage>(engine: &Engine<S>, json: bool, pretty: bool) -> Result<()> {
    let summaries = summarize(engine);
    if json {
        println!("{}", to_json(&summaries, pretty)?);
    } else if summaries.is_empty() {
        println!("No graphs. Try `wf demo` or `wf graph import <file>`.");
    } else {
        for s in &summaries {
            let marker = if s.active { "*" } else { " " };
            println!("{} {} | {} | {} nodes", marker, s.id, s.name, s.nodes);
        }
    }
    Ok(())
}
