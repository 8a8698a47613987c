use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;
use wfserial::v1::{Engine, Storage};
use wfserial_dot::RenderOptions;

#[derive(Subcommand, Debug)]
pub enum RenderFormat {
    /// Render a graph as Graphviz DOT
    Dot {
        /// Graph id (defaults to the active graph)
        id: Option<String>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Node ids to highlight as a walk, e.g. "1,2,5"
        #[arg(long, value_delimiter = ',')]
        highlight: Vec<String>,

        /// Pin nodes to their editor coordinates (render with `neato -n`)
        #[arg(long)]
        layout: bool,

        /// Omit node ids from labels
        #[arg(long)]
        hide_ids: bool,

        /// Omit the legend
        #[arg(long)]
        no_legend: bool,
    },
}

pub fn run<S: Storage>(engine: &Engine<S>, format: RenderFormat) -> Result<()> {
    match format {
        RenderFormat::Dot {
            id,
            output,
            highlight,
            layout,
            hide_ids,
            no_legend,
        } => {
            let options = RenderOptions {
                show_ids: !hide_ids,
                use_layout: layout,
                highlight_path: highlight,
                show_legend: !no_legend,
            };
            let dot = render_dot(engine, id.as_deref(), options)?;
            if let Some(out) = output {
                std::fs::write(&out, &dot)
                    .with_context(|| format!("failed to write to {}", out.display()))?;
            } else {
                print!("{dot}");
            }
            Ok(())
        }
    }
}

/// Render the chosen graph, or the active one. Without an explicit highlight,
/// the active run's current node is marked.
fn render_dot<S: Storage>(
    engine: &Engine<S>,
    id: Option<&str>,
    mut options: RenderOptions,
) -> Result<String> {
    let graph = match id {
        Some(id) => engine
            .graph(id)
            .with_context(|| format!("no graph with id {id:?}"))?,
        None => engine
            .active_graph()
            .context("no active graph; pass a graph id")?,
    };

    let is_active = engine.active_graph().map(|g| g.id.as_str()) == Some(graph.id.as_str());
    if options.highlight_path.is_empty()
        && is_active
        && let Some(node) = engine.current_traversal_state().current_node()
    {
        options.highlight_path.push(node.id.clone());
    }

    Ok(wfserial_dot::render(graph, &options))
}
