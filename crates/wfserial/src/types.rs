use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Snapshot
// ============================================================================

/// The complete persisted state of an installation.
///
/// Every mutating engine operation rewrites the whole snapshot; there is no
/// incremental diffing. Unknown keys are ignored on read and missing keys fall
/// back to their defaults, so older and newer documents both load.
///
/// # JSON shape
///
/// ```json
/// {
///   "graphs": [ { "id": "1706522400000", "name": "Weather", "nodes": { … }, "startNodeId": "1", "customShader": null } ],
///   "history": [ { "graphId": "1706522400000", "graphName": "Weather", "path": ["rain?"], "result": "stay inside", "timestamp": 1706522460000 } ],
///   "activeGraphId": "1706522400000"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSnapshot {
    /// Insertion order is display order.
    #[serde(default)]
    pub graphs: Vec<Graph>,
    /// Newest first.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub active_graph_id: Option<String>,
}

// ============================================================================
// Graph
// ============================================================================

/// A named decision tree (or DAG) with one designated start node.
///
/// A graph owns its nodes exclusively. `start_node_id` should name a key of
/// `nodes`; when it does not, the graph is unplayable and traversal reports an
/// empty position instead of failing.
///
/// # JSON shape
///
/// ```json
/// {
///   "id": "1706522400000",
///   "name": "Weather",
///   "nodes": {
///     "1": { "id": "1", "description": "rain?", "yesNodeId": "2", "noNodeId": "3", … }
///   },
///   "startNodeId": "1",
///   "customShader": null
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub nodes: BTreeMap<String, Node>,
    pub start_node_id: String,
    /// Opaque decorative payload carried for the presentation layer.
    #[serde(default)]
    pub custom_shader: Option<String>,
}

// ============================================================================
// Node
// ============================================================================

/// A vertex of a decision graph: either a yes/no question or a conclusion.
///
/// Edges are plain node ids. An edge that is absent, or that names an id the
/// owning graph does not contain, is *dangling*; traversal treats following it
/// as reaching an undefined conclusion.
///
/// # JSON shape
///
/// ```json
/// {
///   "id": "2",
///   "description": "umbrella?",
///   "yesNodeId": "4",
///   "noNodeId": "5",
///   "isConclusion": false,
///   "result": null,
///   "visualX": 50.0,
///   "visualY": 120.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub yes_node_id: Option<String>,
    #[serde(default)]
    pub no_node_id: Option<String>,
    #[serde(default)]
    pub is_conclusion: bool,
    /// Only meaningful when `is_conclusion` is set.
    #[serde(default)]
    pub result: Option<String>,
    /// Editor layout only; never consulted by traversal.
    #[serde(default, deserialize_with = "coordinate")]
    pub visual_x: f64,
    #[serde(default, deserialize_with = "coordinate")]
    pub visual_y: f64,
}

/// serde_json writes non-finite floats as `null`; read those back as 0.
fn coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// History
// ============================================================================

/// A record of one completed traversal.
///
/// `graph_id` and `graph_name` are copied at completion time, so an entry
/// outlives renames and deletion of the graph it came from. `path` holds the
/// descriptions of the question nodes answered, in order; the conclusion node
/// itself is not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub graph_id: String,
    pub graph_name: String,
    #[serde(default)]
    pub path: Vec<String>,
    pub result: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

// ============================================================================
// Convenience methods
// ============================================================================

impl AppSnapshot {
    /// Parse a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Look up a graph by id
    pub fn graph(&self, id: &str) -> Option<&Graph> {
        self.graphs.iter().find(|g| g.id == id)
    }
}

impl Graph {
    /// Create an empty graph. Add nodes with [`Graph::with_node`].
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start_node_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nodes: BTreeMap::new(),
            start_node_id: start_node_id.into(),
            custom_shader: None,
        }
    }

    /// Time-based graph id: the current time in epoch milliseconds.
    pub fn generate_id() -> String {
        Utc::now().timestamp_millis().to_string()
    }

    /// Insert a node, replacing any node with the same id
    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.insert(node.id.clone(), node);
        self
    }

    /// Set the decorative shader payload
    pub fn with_custom_shader(mut self, shader: impl Into<String>) -> Self {
        self.custom_shader = Some(shader.into());
        self
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// The node traversal begins at, if `start_node_id` resolves.
    pub fn start_node(&self) -> Option<&Node> {
        self.node(&self.start_node_id)
    }
}

impl Node {
    /// A question node with optional yes/no edges.
    pub fn question(
        id: impl Into<String>,
        description: impl Into<String>,
        yes: Option<&str>,
        no: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            yes_node_id: yes.map(str::to_string),
            no_node_id: no.map(str::to_string),
            is_conclusion: false,
            result: None,
            visual_x: 0.0,
            visual_y: 0.0,
        }
    }

    /// A conclusion node carrying `result`.
    pub fn conclusion(
        id: impl Into<String>,
        description: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            yes_node_id: None,
            no_node_id: None,
            is_conclusion: true,
            result: Some(result.into()),
            visual_x: 0.0,
            visual_y: 0.0,
        }
    }

    /// Set the editor layout position
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.visual_x = x;
        self.visual_y = y;
        self
    }

    /// The edge followed for the given answer.
    pub fn edge(&self, is_yes: bool) -> Option<&str> {
        if is_yes {
            self.yes_node_id.as_deref()
        } else {
            self.no_node_id.as_deref()
        }
    }
}

impl HistoryEntry {
    /// Completion time as a UTC datetime. `None` if the stored timestamp is
    /// out of range.
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}
