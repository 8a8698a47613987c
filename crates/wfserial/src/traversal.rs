use crate::types::{Graph, Node};

/// Text recorded when traversal ends without a real conclusion.
///
/// These are presentation strings, so embedders translate them rather than
/// the engine hard-coding any language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinels {
    /// Used when an edge is absent or names a node the graph does not have.
    pub undefined_conclusion: String,
    /// Used when a conclusion node is reached but carries no result text.
    pub unknown_conclusion: String,
}

impl Default for Sentinels {
    fn default() -> Self {
        Self {
            undefined_conclusion: "undefined conclusion".to_string(),
            unknown_conclusion: "unknown conclusion".to_string(),
        }
    }
}

/// What the presentation layer should show.
#[derive(Debug, Clone, PartialEq)]
pub enum Position {
    /// No active graph, or its start node does not resolve.
    Empty,
    /// Waiting for a yes/no answer to this node.
    ShowingNode(Node),
    /// Traversal finished with this result text.
    ShowingConclusion(String),
}

/// Coarse traversal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Empty,
    InProgress,
    Terminal,
}

impl Position {
    pub fn status(&self) -> Status {
        match self {
            Position::Empty => Status::Empty,
            Position::ShowingNode(_) => Status::InProgress,
            Position::ShowingConclusion(_) => Status::Terminal,
        }
    }

    pub fn current_node(&self) -> Option<&Node> {
        match self {
            Position::ShowingNode(node) => Some(node),
            _ => None,
        }
    }

    pub fn conclusion(&self) -> Option<&str> {
        match self {
            Position::ShowingConclusion(result) => Some(result),
            _ => None,
        }
    }
}

/// Outcome of a single [`Traversal::choose`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Nothing happened: already terminal, or no current node.
    Ignored,
    /// Moved to another question node.
    Advanced,
    /// Reached a terminal state with this result. `dangling` is set when the
    /// followed edge did not resolve to a node.
    Concluded { result: String, dangling: bool },
}

/// Walks one graph from its start node to a conclusion.
///
/// The current node is a copy taken when it was reached, while the next node
/// is always looked up in the graph passed to [`Traversal::choose`]. Callers
/// that swap the graph mid-run without calling [`Traversal::reset`] keep
/// answering the copied node's edges against the new node set.
#[derive(Debug, Clone, PartialEq)]
pub struct Traversal {
    position: Position,
    path: Vec<String>,
}

impl Default for Traversal {
    fn default() -> Self {
        Self::new()
    }
}

impl Traversal {
    /// An empty traversal with no graph.
    pub fn new() -> Self {
        Self {
            position: Position::Empty,
            path: Vec::new(),
        }
    }

    /// Start over from `graph`'s start node.
    pub fn reset(&mut self, graph: &Graph) {
        self.position = match graph.start_node() {
            Some(node) => Position::ShowingNode(node.clone()),
            None => Position::Empty,
        };
        self.path.clear();
    }

    /// Drop all state, as when no graph is active.
    pub fn clear(&mut self) {
        self.position = Position::Empty;
        self.path.clear();
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn status(&self) -> Status {
        self.position.status()
    }

    /// Descriptions of the nodes answered so far, in order.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn current_node(&self) -> Option<&Node> {
        self.position.current_node()
    }

    pub fn conclusion(&self) -> Option<&str> {
        self.position.conclusion()
    }

    /// Answer the current node and move along the matching edge of `graph`.
    pub fn choose(&mut self, graph: &Graph, is_yes: bool, sentinels: &Sentinels) -> Transition {
        let Position::ShowingNode(node) = &self.position else {
            return Transition::Ignored;
        };
        self.path.push(node.description.clone());

        let next = node.edge(is_yes).and_then(|id| graph.node(id));
        match next {
            Some(next) if next.is_conclusion => {
                let result = match next.result.as_deref() {
                    Some(text) if !text.is_empty() => text.to_string(),
                    _ => sentinels.unknown_conclusion.clone(),
                };
                self.position = Position::ShowingConclusion(result.clone());
                Transition::Concluded {
                    result,
                    dangling: false,
                }
            }
            Some(next) => {
                self.position = Position::ShowingNode(next.clone());
                Transition::Advanced
            }
            None => {
                let result = sentinels.undefined_conclusion.clone();
                self.position = Position::ShowingConclusion(result.clone());
                Transition::Concluded {
                    result,
                    dangling: true,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather() -> Graph {
        Graph::new("test", "Weather", "1")
            .with_node(Node::question("1", "rain?", Some("2"), Some("3")))
            .with_node(Node::question("2", "umbrella?", Some("4"), Some("5")))
            .with_node(Node::question("3", "go play?", Some("6"), Some("7")))
            .with_node(Node::conclusion("4", "You can go out.", "go out with umbrella"))
            .with_node(Node::conclusion("5", "Stay home.", "stay inside"))
            .with_node(Node::conclusion("6", "Off you go!", "enjoy the trip"))
            .with_node(Node::conclusion("7", "Take a nap.", "rest at home"))
    }

    fn started(graph: &Graph) -> Traversal {
        let mut t = Traversal::new();
        t.reset(graph);
        t
    }

    #[test]
    fn test_new_is_empty() {
        let t = Traversal::new();
        assert_eq!(t.status(), Status::Empty);
        assert!(t.current_node().is_none());
        assert!(t.conclusion().is_none());
        assert!(t.path().is_empty());
    }

    #[test]
    fn test_reset_lands_on_start_node() {
        let t = started(&weather());
        assert_eq!(t.status(), Status::InProgress);
        assert_eq!(t.current_node().unwrap().id, "1");
    }

    #[test]
    fn test_reset_with_unresolved_start_is_empty() {
        let graph =
            Graph::new("g", "Broken", "nope").with_node(Node::question("1", "q", None, None));
        let t = started(&graph);
        assert_eq!(*t.position(), Position::Empty);
    }

    #[test]
    fn test_choose_on_empty_is_ignored() {
        let mut t = Traversal::new();
        assert_eq!(t.choose(&weather(), true, &Sentinels::default()), Transition::Ignored);
        assert!(t.path().is_empty());
    }

    #[test]
    fn test_umbrella_scenario() {
        let graph = weather();
        let sentinels = Sentinels::default();
        let mut t = started(&graph);

        assert_eq!(t.choose(&graph, true, &sentinels), Transition::Advanced);
        assert_eq!(t.current_node().unwrap().id, "2");
        assert_eq!(t.path(), ["rain?"]);

        let transition = t.choose(&graph, true, &sentinels);
        assert_eq!(
            transition,
            Transition::Concluded {
                result: "go out with umbrella".into(),
                dangling: false
            }
        );
        assert_eq!(t.status(), Status::Terminal);
        assert!(t.current_node().is_none());
        assert_eq!(t.conclusion(), Some("go out with umbrella"));
        assert_eq!(t.path(), ["rain?", "umbrella?"]);
    }

    #[test]
    fn test_terminal_state_is_sticky() {
        let graph = weather();
        let sentinels = Sentinels::default();
        let mut t = started(&graph);
        t.choose(&graph, false, &sentinels);
        t.choose(&graph, false, &sentinels);
        let done = t.clone();

        for answer in [true, false, true, true] {
            assert_eq!(t.choose(&graph, answer, &sentinels), Transition::Ignored);
        }
        assert_eq!(t, done);
        assert_eq!(t.conclusion(), Some("rest at home"));
    }

    #[test]
    fn test_path_has_one_entry_per_answer() {
        let mut graph = Graph::new("chain", "Chain", "q0");
        for i in 0..5 {
            let next = format!("q{}", i + 1);
            graph = graph.with_node(Node::question(
                format!("q{i}"),
                format!("step {i}"),
                Some(&next),
                None,
            ));
        }
        graph = graph.with_node(Node::conclusion("q5", "end", "done"));

        let sentinels = Sentinels::default();
        let mut t = started(&graph);
        for _ in 0..4 {
            assert_eq!(t.choose(&graph, true, &sentinels), Transition::Advanced);
        }
        assert!(matches!(t.choose(&graph, true, &sentinels), Transition::Concluded { .. }));

        let expected: Vec<String> = (0..5).map(|i| format!("step {i}")).collect();
        assert_eq!(t.path(), expected.as_slice());
    }

    #[test]
    fn test_dangling_edge_to_missing_node() {
        let graph =
            Graph::new("g", "G", "1").with_node(Node::question("1", "q", Some("404"), None));
        let sentinels = Sentinels::default();
        let mut t = started(&graph);

        let transition = t.choose(&graph, true, &sentinels);
        assert_eq!(
            transition,
            Transition::Concluded {
                result: "undefined conclusion".into(),
                dangling: true
            }
        );
        assert_eq!(t.conclusion(), Some("undefined conclusion"));
        assert_eq!(t.path(), ["q"]);
    }

    #[test]
    fn test_absent_edge_is_dangling() {
        let graph = Graph::new("g", "G", "1").with_node(Node::question("1", "q", Some("1"), None));
        let mut t = started(&graph);
        let transition = t.choose(&graph, false, &Sentinels::default());
        assert!(matches!(transition, Transition::Concluded { dangling: true, .. }));
    }

    #[test]
    fn test_conclusion_without_result_uses_unknown_sentinel() {
        let mut empty_result = Node::conclusion("2", "end", "");
        empty_result.result = None;
        let graph = Graph::new("g", "G", "1")
            .with_node(Node::question("1", "q", Some("2"), Some("3")))
            .with_node(empty_result)
            .with_node(Node::conclusion("3", "end", ""));

        let sentinels = Sentinels::default();
        let mut t = started(&graph);
        t.choose(&graph, true, &sentinels);
        assert_eq!(t.conclusion(), Some("unknown conclusion"));

        t.reset(&graph);
        t.choose(&graph, false, &sentinels);
        assert_eq!(t.conclusion(), Some("unknown conclusion"));
    }

    #[test]
    fn test_custom_sentinels() {
        let graph = Graph::new("g", "G", "1").with_node(Node::question("1", "q", None, None));
        let sentinels = Sentinels {
            undefined_conclusion: "未定义结论".into(),
            unknown_conclusion: "未知结论".into(),
        };
        let mut t = started(&graph);
        t.choose(&graph, true, &sentinels);
        assert_eq!(t.conclusion(), Some("未定义结论"));
    }

    #[test]
    fn test_self_loop_keeps_growing_path() {
        let graph =
            Graph::new("g", "Loop", "1").with_node(Node::question("1", "again?", Some("1"), None));
        let sentinels = Sentinels::default();
        let mut t = started(&graph);
        t.choose(&graph, true, &sentinels);
        t.choose(&graph, true, &sentinels);
        assert_eq!(t.path(), ["again?", "again?"]);
        assert_eq!(t.status(), Status::InProgress);
    }

    #[test]
    fn test_reset_after_terminal_starts_over() {
        let graph = weather();
        let sentinels = Sentinels::default();
        let mut t = started(&graph);
        t.choose(&graph, true, &sentinels);
        t.choose(&graph, false, &sentinels);
        assert_eq!(t.status(), Status::Terminal);

        t.reset(&graph);
        assert_eq!(t.current_node().unwrap().id, "1");
        assert!(t.path().is_empty());
        assert!(t.conclusion().is_none());
    }

    #[test]
    fn test_stale_node_resolves_against_new_graph() {
        let graph = weather();
        let sentinels = Sentinels::default();
        let mut t = started(&graph);

        // Same ids, but "2" is now a conclusion.
        let edited = weather().with_node(Node::conclusion("2", "done", "edited"));
        t.choose(&edited, true, &sentinels);
        assert_eq!(t.conclusion(), Some("edited"));
    }

    #[test]
    fn test_clear() {
        let mut t = started(&weather());
        t.clear();
        assert_eq!(t.status(), Status::Empty);
    }
}
