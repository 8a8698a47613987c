use crate::codec;
use crate::storage::Storage;
use crate::traversal::{Position, Sentinels, Status, Transition, Traversal};
use crate::types::{AppSnapshot, Graph, HistoryEntry};
use chrono::Utc;
use tracing::{debug, warn};

/// Tunables for an [`Engine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub sentinels: Sentinels,
    /// Restart traversal when the active graph is replaced by
    /// [`Engine::update_graph`]. When off, an in-progress run keeps its
    /// current node and resolves later answers against the new node set.
    pub reset_on_active_update: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sentinels: Sentinels::default(),
            reset_on_active_update: true,
        }
    }
}

/// The decision graph engine: graph repository, history log, and the
/// traversal of the active graph, persisted through a [`Storage`].
///
/// Every operation that changes graphs, history, or the active graph writes
/// the full snapshot before returning. Write failures are logged and
/// swallowed, so callers never see them; the in-memory state stays
/// authoritative and the next mutation tries again.
///
/// # Example
///
/// ```
/// use wfserial::v1::*;
///
/// let storage = MemoryStorage::new();
/// let mut engine = Engine::open(storage.clone(), EngineConfig::default());
///
/// let graph = Graph::new("test", "Weather", "1")
///     .with_node(Node::question("1", "rain?", Some("2"), Some("3")))
///     .with_node(Node::conclusion("2", "", "take an umbrella"));
/// engine.add_graph(graph);
///
/// engine.choose(true);
/// assert_eq!(engine.current_traversal_state().conclusion(), Some("take an umbrella"));
/// assert_eq!(engine.history()[0].path, vec!["rain?".to_string()]);
///
/// // A fresh engine over the same storage sees the same history.
/// let reopened = Engine::open(storage, EngineConfig::default());
/// assert_eq!(reopened.history().len(), 1);
/// ```
#[derive(Debug)]
pub struct Engine<S: Storage> {
    storage: S,
    config: EngineConfig,
    graphs: Vec<Graph>,
    active_id: Option<String>,
    history: Vec<HistoryEntry>,
    traversal: Traversal,
}

impl<S: Storage> Engine<S> {
    /// Load the stored snapshot and restore the active graph.
    ///
    /// Unreadable storage and undecodable documents both start the engine
    /// empty.
    pub fn open(storage: S, config: EngineConfig) -> Self {
        let document = match storage.load() {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "failed to load snapshot, starting empty");
                None
            }
        };
        let snapshot = codec::decode_or_default(document.as_deref());
        Self::from_snapshot(storage, config, snapshot)
    }

    /// Build an engine from an already decoded snapshot. Nothing is written.
    pub fn from_snapshot(storage: S, config: EngineConfig, snapshot: AppSnapshot) -> Self {
        let AppSnapshot {
            graphs,
            history,
            active_graph_id,
        } = snapshot;

        let active_id = active_graph_id.filter(|id| {
            let found = graphs.iter().any(|g| &g.id == id);
            if !found {
                debug!(graph_id = %id, "stored active graph no longer exists");
            }
            found
        });

        let mut engine = Self {
            storage,
            config,
            graphs,
            active_id,
            history,
            traversal: Traversal::new(),
        };
        engine.reset();
        debug!(
            graphs = engine.graphs.len(),
            history = engine.history.len(),
            active = ?engine.active_id,
            "engine hydrated"
        );
        engine
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// All graphs in display order.
    pub fn list_graphs(&self) -> &[Graph] {
        &self.graphs
    }

    pub fn graph(&self, id: &str) -> Option<&Graph> {
        self.graphs.iter().find(|g| g.id == id)
    }

    pub fn active_graph(&self) -> Option<&Graph> {
        self.active_id.as_deref().and_then(|id| self.graph(id))
    }

    pub fn current_traversal_state(&self) -> &Position {
        self.traversal.position()
    }

    pub fn status(&self) -> Status {
        self.traversal.status()
    }

    /// Descriptions answered so far in the current run.
    pub fn path(&self) -> &[String] {
        self.traversal.path()
    }

    /// Completed runs, newest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// The state exactly as it would be persisted.
    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            graphs: self.graphs.clone(),
            history: self.history.clone(),
            active_graph_id: self.active_id.clone(),
        }
    }

    // ── Traversal ────────────────────────────────────────────────────

    /// Restart the active graph from its start node.
    pub fn reset(&mut self) {
        let active = self
            .active_id
            .as_deref()
            .and_then(|id| self.graphs.iter().find(|g| g.id == id));
        match active {
            Some(graph) => self.traversal.reset(graph),
            None => self.traversal.clear(),
        }
    }

    /// Answer the current question.
    ///
    /// Reaching a terminal state records a history entry and persists.
    pub fn choose(&mut self, is_yes: bool) -> Transition {
        let Some(graph) = self
            .active_id
            .as_deref()
            .and_then(|id| self.graphs.iter().find(|g| g.id == id))
        else {
            return Transition::Ignored;
        };

        let transition = self.traversal.choose(graph, is_yes, &self.config.sentinels);
        let entry = match &transition {
            Transition::Concluded { result, dangling } => {
                debug!(graph_id = %graph.id, %result, dangling, "traversal concluded");
                Some(HistoryEntry {
                    graph_id: graph.id.clone(),
                    graph_name: graph.name.clone(),
                    path: self.traversal.path().to_vec(),
                    result: result.clone(),
                    timestamp: Utc::now().timestamp_millis(),
                })
            }
            Transition::Advanced | Transition::Ignored => None,
        };

        if let Some(entry) = entry {
            self.append_history(entry);
        }
        transition
    }

    // ── Graph repository ─────────────────────────────────────────────

    /// Append a graph. The first graph added while none is active becomes
    /// active.
    pub fn add_graph(&mut self, graph: Graph) {
        debug!(graph_id = %graph.id, name = %graph.name, "adding graph");
        let activate = self.active_id.is_none();
        let id = graph.id.clone();
        self.graphs.push(graph);
        if activate {
            self.active_id = Some(id);
            self.reset();
        }
        self.persist();
    }

    /// Replace the graph with the same id, keeping its position in the list.
    /// Returns `false` if no graph has that id.
    pub fn update_graph(&mut self, graph: Graph) -> bool {
        let Some(slot) = self.graphs.iter_mut().find(|g| g.id == graph.id) else {
            debug!(graph_id = %graph.id, "update ignored, no such graph");
            return false;
        };
        *slot = graph;

        let is_active = self.active_id.as_deref() == Some(slot.id.as_str());
        if is_active && self.config.reset_on_active_update {
            self.reset();
        }
        self.persist();
        true
    }

    /// Remove a graph. Deleting the active graph leaves nothing active.
    pub fn delete_graph(&mut self, id: &str) -> bool {
        let Some(index) = self.graphs.iter().position(|g| g.id == id) else {
            return false;
        };
        self.graphs.remove(index);
        if self.active_id.as_deref() == Some(id) {
            self.active_id = None;
            self.traversal.clear();
        }
        self.persist();
        true
    }

    /// Make a graph active and start it from the beginning.
    pub fn select_graph(&mut self, id: &str) -> bool {
        if self.graph(id).is_none() {
            debug!(graph_id = %id, "select ignored, no such graph");
            return false;
        }
        self.active_id = Some(id.to_string());
        self.reset();
        self.persist();
        true
    }

    // ── History log ──────────────────────────────────────────────────

    /// Remove one entry equal to `entry`. Returns `false` if none matched.
    pub fn delete_history_entry(&mut self, entry: &HistoryEntry) -> bool {
        let Some(index) = self.history.iter().position(|e| e == entry) else {
            return false;
        };
        self.history.remove(index);
        self.persist();
        true
    }

    /// Remove the entry at `index` (0 is the newest).
    pub fn delete_history_at(&mut self, index: usize) -> Option<HistoryEntry> {
        if index >= self.history.len() {
            return None;
        }
        let removed = self.history.remove(index);
        self.persist();
        Some(removed)
    }

    pub fn clear_all_history(&mut self) {
        self.history.clear();
        self.persist();
    }

    fn append_history(&mut self, entry: HistoryEntry) {
        self.history.insert(0, entry);
        self.persist();
    }

    // ── Persistence ──────────────────────────────────────────────────

    fn persist(&self) {
        let document = match codec::encode(&self.snapshot()) {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "failed to encode snapshot");
                return;
            }
        };
        match self.storage.save(&document) {
            Ok(()) => debug!(bytes = document.len(), "snapshot saved"),
            Err(e) => warn!(error = %e, "failed to save snapshot"),
        }
    }
}
