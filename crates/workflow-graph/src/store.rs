//! Graph state store for one editing session
//!
//! `GraphStore` owns the `WorkflowGraph` being edited. Every mutation goes
//! through it so the edge rules are always enforced, and every successful
//! canvas mutation is recorded in the edit history. Renaming and recording
//! the backend id are metadata changes and are not undoable.
//!
//! Snapshots are shared copy-on-write: `snapshot()` hands out an
//! `Arc<WorkflowGraph>` that later mutations never change.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::NodeCatalogEntry;
use crate::error::{GraphError, Result};
use crate::history::{Canvas, EditHistory, EditKind, DEFAULT_HISTORY_DEPTH};
use crate::types::{
    CredentialId, EdgeId, GraphEdge, GraphNode, NodeConfig, NodeId, Position, WorkflowGraph,
    WorkflowId,
};
use crate::validation;

/// Which optional edge shapes the store accepts
///
/// The backend validates neither parallel edges nor cycles, so both are
/// allowed unless configured otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphPolicy {
    /// Allow more than one edge between the same ordered pair of nodes
    pub allow_parallel_edges: bool,
    /// Allow edges that close a cycle
    pub allow_cycles: bool,
}

impl Default for GraphPolicy {
    fn default() -> Self {
        Self {
            allow_parallel_edges: true,
            allow_cycles: true,
        }
    }
}

/// Mutable graph state with undo/redo
pub struct GraphStore {
    graph: Arc<WorkflowGraph>,
    policy: GraphPolicy,
    history: EditHistory,
}

impl GraphStore {
    /// Create a store holding an empty, unnamed graph
    pub fn new() -> Self {
        Self::with_options(GraphPolicy::default(), DEFAULT_HISTORY_DEPTH)
    }

    /// Create a store with an edge policy and history depth
    pub fn with_options(policy: GraphPolicy, history_depth: usize) -> Self {
        let mut store = Self {
            graph: Arc::new(WorkflowGraph::default()),
            policy,
            history: EditHistory::new(history_depth),
        };
        store.reset_history();
        store
    }

    /// Replace the whole graph, e.g. with one decoded from the backend
    ///
    /// Resets the edit history so undo cannot go back past the load.
    pub fn load(&mut self, graph: WorkflowGraph) {
        log::debug!(
            "Loading graph '{}' ({} nodes, {} edges)",
            graph.name,
            graph.nodes.len(),
            graph.edges.len()
        );
        self.graph = Arc::new(graph);
        self.reset_history();
    }

    /// Read-only snapshot of the current graph
    pub fn snapshot(&self) -> Arc<WorkflowGraph> {
        Arc::clone(&self.graph)
    }

    /// Borrow the current graph
    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    pub fn policy(&self) -> &GraphPolicy {
        &self.policy
    }

    /// Change the edge policy; existing edges are kept
    pub fn set_policy(&mut self, policy: GraphPolicy) {
        self.policy = policy;
    }

    /// Add a node for a catalog entry with an empty config
    ///
    /// Non-finite coordinates are placed at 0.
    pub fn add_node(&mut self, entry: &NodeCatalogEntry, position: Position) -> NodeId {
        let display_id = self.fresh_id(|graph, id| graph.find_node(id).is_some());
        let node = GraphNode {
            display_id: display_id.clone(),
            persisted_id: None,
            position: position.finite(),
            service_name: entry.service_name.clone(),
            task_name: entry.task_name.clone(),
            kind: entry.kind,
            config: NodeConfig::new(),
            credential_id: None,
        };

        Arc::make_mut(&mut self.graph).nodes.push(node);
        self.record(EditKind::AddNode);
        log::debug!(
            "Added {} node '{}' ({}/{})",
            entry.kind,
            display_id,
            entry.service_name,
            entry.task_name
        );
        display_id
    }

    /// Move a node on the canvas; non-finite coordinates become 0
    pub fn move_node(&mut self, id: &str, position: Position) -> Result<()> {
        let position = position.finite();
        self.update_node(id, EditKind::MoveNode, |node| node.position = position)
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, id: &str) -> Result<()> {
        self.ensure_node(id)?;

        let graph = Arc::make_mut(&mut self.graph);
        graph.nodes.retain(|n| n.display_id != id);
        let before = graph.edges.len();
        graph.edges.retain(|e| e.from != id && e.to != id);
        let cascaded = before - graph.edges.len();

        self.record(EditKind::RemoveNode);
        log::debug!("Removed node '{}' and {} attached edge(s)", id, cascaded);
        Ok(())
    }

    /// Connect two nodes, returning the new edge's display id
    pub fn connect(&mut self, from: &str, to: &str) -> Result<EdgeId> {
        if let Err(err) = validation::validate_connection(&self.graph, from, to, &self.policy) {
            log::warn!("Rejected edge '{}' -> '{}': {}", from, to, err);
            return Err(err);
        }

        let display_id = self.fresh_id(|graph, id| graph.find_edge(id).is_some());
        Arc::make_mut(&mut self.graph).edges.push(GraphEdge {
            display_id: display_id.clone(),
            persisted_id: None,
            from: from.to_string(),
            to: to.to_string(),
        });

        self.record(EditKind::Connect);
        log::debug!("Connected '{}' -> '{}' as '{}'", from, to, display_id);
        Ok(display_id)
    }

    /// Remove an edge
    pub fn disconnect(&mut self, edge_id: &str) -> Result<()> {
        if self.graph.find_edge(edge_id).is_none() {
            return Err(GraphError::NotFound(edge_id.to_string()));
        }

        Arc::make_mut(&mut self.graph)
            .edges
            .retain(|e| e.display_id != edge_id);
        self.record(EditKind::Disconnect);
        log::debug!("Disconnected edge '{}'", edge_id);
        Ok(())
    }

    /// Replace a node's task configuration
    pub fn set_config(&mut self, id: &str, config: NodeConfig) -> Result<()> {
        self.update_node(id, EditKind::SetConfig, |node| node.config = config)
    }

    /// Attach or detach a connected account
    pub fn set_credential(&mut self, id: &str, credential_id: Option<CredentialId>) -> Result<()> {
        self.update_node(id, EditKind::SetCredential, |node| node.credential_id = credential_id)
    }

    /// Rename the workflow
    ///
    /// Not an edit: undo and redo keep the current name.
    pub fn rename(&mut self, name: impl Into<String>) {
        Arc::make_mut(&mut self.graph).name = name.into();
    }

    /// Record the backend id assigned on save
    ///
    /// Not an edit: it is kept across undo and redo.
    pub fn set_persisted_id(&mut self, id: WorkflowId) {
        Arc::make_mut(&mut self.graph).persisted_id = Some(id);
    }

    /// Step back to the previous state; returns false if there is none
    pub fn undo(&mut self) -> Result<bool> {
        let Some(canvas) = self.history.undo()? else {
            return Ok(false);
        };
        self.restore(canvas);
        Ok(true)
    }

    /// Step forward to the next state; returns false if there is none
    pub fn redo(&mut self) -> Result<bool> {
        let Some(canvas) = self.history.redo()? else {
            return Ok(false);
        };
        self.restore(canvas);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Edit the next undo would revert
    pub fn undo_kind(&self) -> Option<EditKind> {
        self.history.undo_kind()
    }

    /// Edit the next redo would reapply
    pub fn redo_kind(&self) -> Option<EditKind> {
        self.history.redo_kind()
    }

    /// Node display ids ordered so that every edge points forward
    pub fn execution_order(&self) -> Result<Vec<NodeId>> {
        validation::execution_order(&self.graph)
    }

    fn restore(&mut self, canvas: Canvas) {
        let graph = Arc::make_mut(&mut self.graph);
        graph.nodes = canvas.nodes;
        graph.edges = canvas.edges;
    }

    fn ensure_node(&self, id: &str) -> Result<()> {
        match self.graph.find_node(id) {
            Some(_) => Ok(()),
            None => Err(GraphError::NotFound(id.to_string())),
        }
    }

    fn update_node(&mut self, id: &str, kind: EditKind, apply: impl FnOnce(&mut GraphNode)) -> Result<()> {
        self.ensure_node(id)?;
        if let Some(node) = Arc::make_mut(&mut self.graph).find_node_mut(id) {
            apply(node);
        }
        self.record(kind);
        Ok(())
    }

    fn fresh_id(&self, taken: impl Fn(&WorkflowGraph, &str) -> bool) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if !taken(&self.graph, &id) {
                return id;
            }
        }
    }

    fn record(&mut self, kind: EditKind) {
        if let Err(e) = self.history.record(kind, &self.graph.nodes, &self.graph.edges) {
            log::warn!("Failed to record {} in edit history: {}", kind, e);
        }
    }

    fn reset_history(&mut self) {
        if let Err(e) = self.history.reset(&self.graph.nodes, &self.graph.edges) {
            log::warn!("Failed to reset edit history: {}", e);
        }
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}
