use anyhow::{Result, bail};
use clap::Subcommand;
use wfserial::v1::{Engine, HistoryEntry, Storage};

use crate::to_json;

#[derive(Subcommand, Debug)]
pub enum HistoryOp {
    /// List completed runs, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete one run by its position in `wf history list`
    Delete {
        /// Zero-based index, newest first
        index: usize,
    },
    /// Delete every recorded run
    Clear,
}

pub fn run<S: Storage>(engine: &mut Engine<S>, op: HistoryOp, pretty: bool) -> Result<()> {
    match op {
        HistoryOp::List { json } => {
            if json {
                println!("{}", to_json(&engine.history(), pretty)?);
            } else if engine.history().is_empty() {
                println!("No completed runs.");
            } else {
                for (i, entry) in engine.history().iter().enumerate() {
                    println!("{}", format_entry(i, entry));
                }
            }
            Ok(())
        }
        HistoryOp::Delete { index } => {
            let Some(removed) = engine.delete_history_at(index) else {
                bail!(
                    "no history entry at index {index} ({} recorded)",
                    engine.history().len()
                );
            };
            eprintln!("Deleted {} => {}", removed.graph_name, removed.result);
            Ok(())
        }
        HistoryOp::Clear => {
            let count = engine.history().len();
            engine.clear_all_history();
            eprintln!("Cleared {count} entries");
            Ok(())
        }
    }
}

fn format_entry(index: usize, entry: &HistoryEntry) -> String {
    let when = entry
        .completed_at()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "?".to_string());
    let path = if entry.path.is_empty() {
        "(no questions)".to_string()
    } else {
        entry.path.join(" > ")
    };
    format!(
        "[{index}] {when} | {} | {path} => {}",
        entry.graph_name, entry.result
    )
}
