#![doc = include_str!("../README.md")]

mod codec;
mod draft;
mod engine;
mod error;
mod storage;
mod traversal;
mod types;

pub mod v1 {
    //! Versioned public API for WFSerial graphs, traversal, and persistence.
    //!
    //! Everything you need is re-exported from this module. Types are organized
    //! into four groups:
    //!
    //! # Model
    //!
    //! The values that are built, played, and persisted:
    //!
    //! - [`Graph`] - a named decision graph with a start node
    //! - [`Node`] - a yes/no question or a conclusion
    //! - [`HistoryEntry`] - one completed run
    //! - [`AppSnapshot`] - everything that is persisted
    //!
    //! # Traversal
    //!
    //! - [`Traversal`] - walks one graph answer by answer
    //! - [`Position`] - what to show: a node, a conclusion, or nothing
    //! - [`Status`], [`Transition`] - coarse state and per-answer outcome
    //! - [`Sentinels`] - text used when a run ends without a real conclusion
    //!
    //! # Engine and storage
    //!
    //! - [`Engine`] - graph repository, history log, and active traversal
    //! - [`EngineConfig`] - engine tunables
    //! - [`Storage`] - the document store the engine writes through
    //! - [`MemoryStorage`] - in-memory [`Storage`]
    //! - [`StoreError`], [`Result`] - storage errors
    //!
    //! # Editing
    //!
    //! - [`GraphDraft`] - editable node arena that validates into a [`Graph`]
    //! - [`DraftError`] - why a draft was rejected
    //!
    //! # Example: play a graph to its conclusion
    //!
    //! ```
    //! use wfserial::v1::*;
    //!
    //! let graph = Graph::new("test", "Weather", "1")
    //!     .with_node(Node::question("1", "rain?", Some("2"), Some("3")))
    //!     .with_node(Node::question("2", "umbrella?", Some("4"), Some("5")))
    //!     .with_node(Node::conclusion("4", "You can go out.", "go out with umbrella"))
    //!     .with_node(Node::conclusion("5", "Stay home.", "stay inside"));
    //!
    //! let mut traversal = Traversal::new();
    //! traversal.reset(&graph);
    //! traversal.choose(&graph, true, &Sentinels::default());
    //! traversal.choose(&graph, true, &Sentinels::default());
    //!
    //! assert_eq!(traversal.conclusion(), Some("go out with umbrella"));
    //! assert_eq!(traversal.path(), ["rain?", "umbrella?"]);
    //! ```

    /// Conversion between [`AppSnapshot`] and the persisted JSON document.
    ///
    /// # Example: tolerate unknown keys and missing documents
    ///
    /// ```
    /// use wfserial::v1::codec;
    ///
    /// let snap = codec::decode(r#"{"graphs": [], "history": [], "activeGraphId": null, "theme": "dark"}"#).unwrap();
    /// assert!(snap.graphs.is_empty());
    ///
    /// let fresh = codec::decode_or_default(None);
    /// assert!(fresh.active_graph_id.is_none());
    /// ```
    pub mod codec {
        pub use crate::codec::{decode, decode_or_default, encode};
    }
    pub use crate::draft::{DraftError, GraphDraft};
    pub use crate::engine::{Engine, EngineConfig};
    pub use crate::error::{Result, StoreError};
    pub use crate::storage::{MemoryStorage, Storage};
    pub use crate::traversal::{Position, Sentinels, Status, Transition, Traversal};
    pub use crate::types::{AppSnapshot, Graph, HistoryEntry, Node};
}
