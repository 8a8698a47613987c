//! Generate Graphviz DOT visualizations from WFSerial decision graphs.
//!
//! Renders a [`Graph`] as a DOT digraph. Questions become rounded boxes,
//! conclusions become ellipses, "yes" edges are green and "no" edges red.
//! Edges that are absent or point at a missing node are drawn dashed into a
//! shared "undefined" placeholder, which is where traversal would end.
//!
//! # Example
//!
//! ```
//! use wfserial::v1::{Graph, Node};
//! use wfserial_dot::{render, RenderOptions};
//!
//! let graph = Graph::new("test", "Weather", "1")
//!     .with_node(Node::question("1", "rain?", Some("2"), Some("3")))
//!     .with_node(Node::conclusion("2", "", "take an umbrella"));
//!
//! let dot = render(&graph, &RenderOptions::default());
//! assert!(dot.contains("digraph wfserial"));
//! assert!(dot.contains("__undefined__"));
//! ```
//!
//! Pipe the output through Graphviz to produce images:
//!
//! ```bash
//! wf render dot | dot -Tpng -o graph.png
//! ```

use wfserial::v1::{Graph, Node};

const UNDEFINED_NODE: &str = "__undefined__";
const START_NODE: &str = "__start__";

const QUESTION_COLOR: &str = "#cce5ff";
const CONCLUSION_COLOR: &str = "#d4edda";
const UNDEFINED_COLOR: &str = "#ffcccc";
const YES_COLOR: &str = "#2e7d32";
const NO_COLOR: &str = "#c62828";

/// Options controlling what information is rendered in the DOT output.
pub struct RenderOptions {
    /// Include each node's id under its text.
    pub show_ids: bool,
    /// Pin nodes to their editor coordinates (`pos="x,y!"`, for `neato -n`).
    pub use_layout: bool,
    /// Node ids of a walk through the graph. Its nodes and the edges between
    /// consecutive ids are drawn heavier; the last id is the active node.
    pub highlight_path: Vec<String>,
    /// Render the legend cluster.
    pub show_legend: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_ids: true,
            use_layout: false,
            highlight_path: Vec::new(),
            show_legend: true,
        }
    }
}

/// Render a [`Graph`] as a DOT digraph.
pub fn render(graph: &Graph, options: &RenderOptions) -> String {
    let mut dot = String::new();
    dot.push_str("digraph wfserial {\n");
    dot.push_str("  rankdir=TB;\n");
    dot.push_str("  node [shape=box, style=rounded, fontname=\"Helvetica\"];\n");
    dot.push_str("  edge [fontname=\"Helvetica\", fontsize=10];\n\n");

    if !graph.name.is_empty() {
        dot.push_str("  labelloc=\"t\";\n");
        dot.push_str(&format!("  label=\"{}\";\n", escape_dot(&graph.name)));
        dot.push_str("  fontsize=16;\n");
        dot.push_str("  fontname=\"Helvetica-Bold\";\n\n");
    }

    // Entry arrow into the start node
    if graph.start_node().is_some() {
        dot.push_str(&format!(
            "  \"{}\" [shape=point, width=0.15];\n",
            START_NODE
        ));
    }

    for node in graph.nodes.values() {
        dot.push_str(&format_node(graph, node, options));
    }

    let dangling = has_dangling_edges(graph);
    if dangling {
        dot.push_str(&format!(
            "  \"{}\" [label=\"undefined\", shape=octagon, style=\"filled,dashed\", fillcolor=\"{}\"];\n",
            UNDEFINED_NODE, UNDEFINED_COLOR
        ));
    }

    dot.push('\n');

    if graph.start_node().is_some() {
        dot.push_str(&format!(
            "  \"{}\" -> \"{}\";\n",
            START_NODE,
            escape_dot(&graph.start_node_id)
        ));
    }

    for node in graph.nodes.values().filter(|n| !n.is_conclusion) {
        for (is_yes, label, color) in [(true, "yes", YES_COLOR), (false, "no", NO_COLOR)] {
            match node.edge(is_yes).filter(|id| graph.node(id).is_some()) {
                Some(target) => {
                    let weight = if on_highlight_path(&options.highlight_path, &node.id, target) {
                        ", penwidth=2.5"
                    } else {
                        ""
                    };
                    dot.push_str(&format!(
                        "  \"{}\" -> \"{}\" [label=\"{}\", color=\"{}\", fontcolor=\"{}\"{}];\n",
                        escape_dot(&node.id),
                        escape_dot(target),
                        label,
                        color,
                        color,
                        weight
                    ))
                }
                None => dot.push_str(&format!(
                    "  \"{}\" -> \"{}\" [label=\"{}\", color=\"{}\", fontcolor=\"{}\", style=dashed];\n",
                    escape_dot(&node.id),
                    UNDEFINED_NODE,
                    label,
                    color,
                    color
                )),
            }
        }
    }

    if options.show_legend {
        dot.push_str("\n  // Legend\n");
        dot.push_str("  subgraph cluster_legend {\n");
        dot.push_str("    label=\"Legend\";\n");
        dot.push_str("    fontname=\"Helvetica-Bold\";\n");
        dot.push_str("    style=filled;\n");
        dot.push_str("    fillcolor=\"#f8f8f8\";\n");
        dot.push_str("    node [style=\"rounded,filled\", width=0.9, fontsize=10];\n");
        dot.push_str(&format!(
            "    leg_question [label=\"question\", shape=box, fillcolor=\"{}\"];\n",
            QUESTION_COLOR
        ));
        dot.push_str(&format!(
            "    leg_conclusion [label=\"conclusion\", shape=ellipse, style=filled, fillcolor=\"{}\"];\n",
            CONCLUSION_COLOR
        ));
        if dangling {
            dot.push_str(&format!(
                "    leg_undefined [label=\"undefined\", shape=octagon, style=\"filled,dashed\", fillcolor=\"{}\"];\n",
                UNDEFINED_COLOR
            ));
        }
        dot.push_str("  }\n");
    }

    dot.push_str("}\n");
    dot
}

fn format_node(graph: &Graph, node: &Node, options: &RenderOptions) -> String {
    let label = format_node_label_html(node, options);
    let is_start = node.id == graph.start_node_id;
    let is_active = options.highlight_path.last() == Some(&node.id);
    let is_visited = options.highlight_path.contains(&node.id);

    let (shape, mut style, fillcolor) = if node.is_conclusion {
        ("ellipse", "filled".to_string(), CONCLUSION_COLOR)
    } else {
        ("box", "rounded,filled".to_string(), QUESTION_COLOR)
    };
    let mut penwidth = "1";
    if is_active {
        style.push_str(",bold");
        penwidth = "3";
    } else if is_start || is_visited {
        style.push_str(",bold");
        penwidth = "2";
    }

    let mut attrs = format!(
        "label={}, shape={}, fillcolor=\"{}\", style=\"{}\", penwidth={}",
        label, shape, fillcolor, style, penwidth
    );
    if options.use_layout {
        // Graphviz's y axis points up, the editor's points down.
        attrs.push_str(&format!(
            ", pos=\"{},{}!\"",
            node.visual_x, -node.visual_y
        ));
    }

    format!("  \"{}\" [{}];\n", escape_dot(&node.id), attrs)
}

fn format_node_label_html(node: &Node, options: &RenderOptions) -> String {
    let mut rows = Vec::new();

    if node.is_conclusion {
        let result = node.result.as_deref().unwrap_or("");
        rows.push(format!("<b>{}</b>", escape_html(&truncate(result, 40))));
        if !node.description.is_empty() {
            rows.push(format!(
                "<font point-size=\"9\">{}</font>",
                escape_html(&truncate(&node.description, 40))
            ));
        }
    } else {
        rows.push(format!("<b>{}</b>", escape_html(&truncate(&node.description, 40))));
    }

    if options.show_ids {
        rows.push(format!(
            "<font point-size=\"8\" color=\"#666666\">#{}</font>",
            escape_html(&node.id)
        ));
    }

    format!("<{}>", rows.join("<br/>"))
}

fn on_highlight_path(path: &[String], from: &str, to: &str) -> bool {
    path.windows(2).any(|w| w[0] == from && w[1] == to)
}

fn has_dangling_edges(graph: &Graph) -> bool {
    graph
        .nodes
        .values()
        .filter(|n| !n.is_conclusion)
        .any(|n| {
            [true, false]
                .into_iter()
                .any(|is_yes| n.edge(is_yes).and_then(|id| graph.node(id)).is_none())
        })
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}

/// Escape a string for use inside a DOT quoted identifier or label.
pub fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Escape a string for use inside a DOT HTML-like label.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather() -> Graph {
        Graph::new("test", "Weather", "1")
            .with_node(
                Node::question("1", "rain?", Some("2"), Some("3")).with_position(100.0, 20.0),
            )
            .with_node(Node::question("2", "umbrella?", Some("4"), Some("5")))
            .with_node(Node::conclusion("4", "You can go out.", "go out with umbrella"))
            .with_node(Node::conclusion("5", "Stay home.", "stay inside"))
    }

    #[test]
    fn test_escape_dot_quotes() {
        assert_eq!(escape_dot(r#"say "hi""#), r#"say \"hi\""#);
    }

    #[test]
    fn test_escape_dot_backslash() {
        assert_eq!(escape_dot(r"a\b"), r"a\\b");
    }

    #[test]
    fn test_escape_dot_newline() {
        assert_eq!(escape_dot("a\nb"), "a\\nb");
    }

    #[test]
    fn test_escape_html_combined() {
        assert_eq!(
            escape_html(r#"<a href="x">&</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 4), "abcd...");
        assert_eq!(truncate("下雨了吗今天", 2), "下雨...");
    }

    #[test]
    fn test_render_basic() {
        let dot = render(&weather(), &RenderOptions::default());
        assert!(dot.starts_with("digraph wfserial {"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("label=\"Weather\""));
        assert!(dot.contains("\"__start__\" -> \"1\""));
        assert!(dot.contains("\"1\" -> \"2\" [label=\"yes\""));
        assert!(dot.contains("\"2\" -> \"5\" [label=\"no\""));
        assert!(dot.contains("go out with umbrella"));
    }

    #[test]
    fn test_render_conclusions_are_ellipses() {
        let dot = render(&weather(), &RenderOptions::default());
        let line = dot.lines().find(|l| l.trim_start().starts_with("\"4\" [")).unwrap();
        assert!(line.contains("shape=ellipse"));
    }

    #[test]
    fn test_render_dangling_edge_goes_to_undefined() {
        let dot = render(&weather(), &RenderOptions::default());
        // "1" says no -> "3", which does not exist.
        assert!(dot.contains("\"1\" -> \"__undefined__\" [label=\"no\""));
        assert!(dot.contains("leg_undefined"));
    }

    #[test]
    fn test_render_without_dangling_edges() {
        let graph = Graph::new("g", "Complete", "1")
            .with_node(Node::question("1", "q", Some("2"), Some("2")))
            .with_node(Node::conclusion("2", "", "done"));
        let dot = render(&graph, &RenderOptions::default());
        assert!(!dot.contains("__undefined__"));
    }

    #[test]
    fn test_render_unresolved_start_has_no_entry() {
        let graph = Graph::new("g", "Broken", "missing").with_node(Node::conclusion("1", "", "r"));
        let dot = render(&graph, &RenderOptions::default());
        assert!(!dot.contains("__start__"));
    }

    #[test]
    fn test_render_highlight_path() {
        let options = RenderOptions {
            highlight_path: vec!["1".into(), "2".into()],
            ..Default::default()
        };
        let dot = render(&weather(), &options);
        let active = dot.lines().find(|l| l.trim_start().starts_with("\"2\" [")).unwrap();
        assert!(active.contains("penwidth=3"));
        let edge = dot.lines().find(|l| l.contains("\"1\" -> \"2\"")).unwrap();
        assert!(edge.contains("penwidth=2.5"));
        let other = dot.lines().find(|l| l.contains("\"2\" -> \"4\"")).unwrap();
        assert!(!other.contains("penwidth"));
    }

    #[test]
    fn test_on_highlight_path() {
        let path = vec!["1".to_string(), "2".to_string(), "5".to_string()];
        assert!(on_highlight_path(&path, "2", "5"));
        assert!(!on_highlight_path(&path, "5", "2"));
        assert!(!on_highlight_path(&[], "1", "2"));
    }

    #[test]
    fn test_render_layout_positions() {
        let options = RenderOptions {
            use_layout: true,
            ..Default::default()
        };
        let dot = render(&weather(), &options);
        assert!(dot.contains("pos=\"100,-20!\""));
    }

    #[test]
    fn test_render_hides_ids_and_legend() {
        let options = RenderOptions {
            show_ids: false,
            show_legend: false,
            ..Default::default()
        };
        let dot = render(&weather(), &options);
        assert!(!dot.contains("#666666"));
        assert!(!dot.contains("cluster_legend"));
    }

    #[test]
    fn test_render_escapes_text() {
        let graph = Graph::new("g", "Say \"hi\"", "1")
            .with_node(Node::question("1", "a < b & c?", None, None));
        let dot = render(&graph, &RenderOptions::default());
        assert!(dot.contains("label=\"Say \\\"hi\\\"\""));
        assert!(dot.contains("a &lt; b &amp; c?"));
    }
}
