mod cmd_demo;
mod cmd_graph;
mod cmd_history;
mod cmd_play;
mod cmd_render;
mod cmd_status;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use wfserial::v1::{Engine, EngineConfig};
use wfserial_fs::{FileStorage, PathResolver};

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "WF_LOG";

type WfEngine = Engine<FileStorage>;

#[derive(Parser, Debug)]
#[command(name = "wf")]
#[command(about = "Build, play, and inspect yes/no decision graphs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Data file to use instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    data: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage stored graphs
    Graph {
        #[command(subcommand)]
        op: cmd_graph::GraphOp,
    },
    /// Add the built-in weather sample graph
    Demo,
    /// Play the active graph
    Play {
        /// Scripted answers instead of prompting, e.g. "y,n,y"
        #[arg(long, value_delimiter = ',')]
        answers: Option<Vec<String>>,
    },
    /// Show the active graph and the question a run resumes at
    ///
    /// Unfinished answers are not stored, so every `wf` invocation restores
    /// the active graph at its start node.
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect or prune completed runs
    History {
        #[command(subcommand)]
        op: cmd_history::HistoryOp,
    },
    /// Render graphs to other formats
    Render {
        #[command(subcommand)]
        format: cmd_render::RenderFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut engine = open_engine(cli.data.as_deref())?;

    match cli.command {
        Commands::Graph { op } => cmd_graph::run(&mut engine, op, cli.pretty),
        Commands::Demo => cmd_demo::run(&mut engine),
        Commands::Play { answers } => cmd_play::run(&mut engine, answers),
        Commands::Status { json } => cmd_status::run(&engine, json, cli.pretty),
        Commands::History { op } => cmd_history::run(&mut engine, op, cli.pretty),
        Commands::Render { format } => cmd_render::run(&engine, format),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_engine(data: Option<&Path>) -> Result<WfEngine> {
    let mut resolver = PathResolver::new();
    if let Some(path) = data {
        resolver = resolver.with_data_file(path);
    }
    let storage = FileStorage::from_resolver(&resolver).context(
        "could not determine where to keep the data file; pass --data or set WFSERIAL_HOME",
    )?;
    tracing::debug!(path = %storage.path().display(), "opening data file");
    Ok(Engine::open(storage, EngineConfig::default()))
}

/// Serialize `value` the way every command prints JSON.
pub fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("failed to serialize output")
}
