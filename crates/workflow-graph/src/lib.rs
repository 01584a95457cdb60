//! Workflow Graph - editable workflow model for the automation builder
//!
//! This crate holds everything the editor needs to reason about a workflow
//! without touching the network:
//!
//! - `NodeCatalog`: the palette of (service, task, kind) bindings
//! - `GraphStore`: the mutable graph for one editing session, enforcing the
//!   listener/action edge rules and producing shared snapshots
//! - `transform`: the pure mapping between `WorkflowGraph` and the backend's
//!   save payload / load response
//! - `EditHistory`: compressed canvas checkpoints for undo/redo
//!
//! # Example
//!
//! ```
//! use workflow_graph::{GraphStore, NodeCatalog, Position, transform};
//!
//! let catalog = NodeCatalog::builtin();
//! let mut store = GraphStore::new();
//!
//! let trigger = catalog.find("gmail", "get-email").unwrap();
//! let reply = catalog.find("gmail", "send-email").unwrap();
//! let a = store.add_node(trigger, Position::new(0.0, 0.0));
//! let b = store.add_node(reply, Position::new(200.0, 0.0));
//! store.connect(&a, &b).unwrap();
//!
//! let payload = transform::to_save_payload(&store.snapshot(), "Auto reply").unwrap();
//! assert_eq!(payload.nodes.len(), 2);
//! assert_eq!(payload.edges.len(), 1);
//! ```

pub mod catalog;
pub mod dto;
pub mod error;
pub mod history;
pub mod store;
pub mod transform;
pub mod types;
pub mod validation;

// Re-export key types
pub use catalog::{NodeCatalog, NodeCatalogEntry};
pub use dto::{
    EdgeRecord, LoadResponse, NodeRecord, SaveEdge, SaveNode, SavePayload, SaveResponse,
    SaveWorkflow, WorkflowSummary,
};
pub use error::{GraphError, Result};
pub use history::{EditHistory, EditKind};
pub use store::{GraphPolicy, GraphStore};
pub use types::{
    CredentialId, EdgeId, GraphEdge, GraphNode, NodeConfig, NodeId, NodeKind, Position,
    WorkflowGraph, WorkflowId,
};
