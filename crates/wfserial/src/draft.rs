use crate::types::{Graph, Node};
use std::collections::BTreeMap;

/// Why a draft could not be turned into a [`Graph`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("graph name is empty")]
    EmptyName,

    #[error("graph has no nodes")]
    NoNodes,
}

/// An editable node set for building or changing a graph.
///
/// Nodes are only ever replaced whole, mirroring how the engine replaces
/// whole graphs. [`GraphDraft::build`] is the validation boundary: the engine
/// itself accepts any graph it is given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphDraft {
    id: Option<String>,
    pub name: String,
    /// Blank means "use the lowest node id".
    pub start_node_id: String,
    custom_shader: Option<String>,
    nodes: BTreeMap<String, Node>,
}

impl GraphDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Start editing an existing graph. The built graph keeps its id unless
    /// that id is blank.
    pub fn from_graph(graph: &Graph) -> Self {
        Self {
            id: non_blank(Some(graph.id.clone())),
            name: graph.name.clone(),
            start_node_id: graph.start_node_id.clone(),
            custom_shader: graph.custom_shader.clone(),
            nodes: graph.nodes.clone(),
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Smallest positive integer id not already taken.
    pub fn next_node_id(&self) -> String {
        (1..)
            .map(|n: u64| n.to_string())
            .find(|id| !self.nodes.contains_key(id))
            .unwrap_or_default()
    }

    /// Insert or replace a node.
    ///
    /// Conclusions lose their edges, questions lose their result, and blank
    /// edge ids are dropped.
    pub fn upsert_node(&mut self, mut node: Node) {
        if node.is_conclusion {
            node.yes_node_id = None;
            node.no_node_id = None;
        } else {
            node.result = None;
            node.yes_node_id = non_blank(node.yes_node_id);
            node.no_node_id = non_blank(node.no_node_id);
        }
        self.nodes.insert(node.id.clone(), node);
    }

    /// Remove a node. Edges pointing at it are left dangling.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        self.nodes.remove(id)
    }

    /// Move a node on the editor canvas. Returns `false` for unknown ids.
    pub fn move_node(&mut self, id: &str, x: f64, y: f64) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        let moved = node.clone().with_position(x, y);
        self.nodes.insert(id.to_string(), moved);
        true
    }

    /// Validate and produce a graph.
    pub fn build(&self) -> Result<Graph, DraftError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DraftError::EmptyName);
        }
        let Some(first) = self.nodes.keys().next() else {
            return Err(DraftError::NoNodes);
        };
        let start_node_id = if self.start_node_id.trim().is_empty() {
            first.clone()
        } else {
            self.start_node_id.trim().to_string()
        };

        Ok(Graph {
            id: self.id.clone().unwrap_or_else(Graph::generate_id),
            name: name.to_string(),
            nodes: self.nodes.clone(),
            start_node_id,
            custom_shader: self.custom_shader.clone(),
        })
    }
}

fn non_blank(id: Option<String>) -> Option<String> {
    id.filter(|s| !s.trim().is_empty())
}
