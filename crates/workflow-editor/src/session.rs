//! Editor session controller
//!
//! One `EditorSession` drives one canvas: it loads the workflow through the
//! gateway, hands the `GraphStore` out for edits, and runs the save flow.
//!
//! ```text
//! Idle ──open(None)──────────────────────────▶ Ready
//! Idle ──open(Some)──▶ Loading ──ok──────────▶ Ready
//!                              └─error───────▶ Failed
//! Ready ──begin_save──▶ Saving ──finish_save─▶ Ready
//! ```
//!
//! A failed load is terminal. A failed save returns to `Ready` with the
//! graph exactly as it was.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use workflow_gateway::{Credential, SharedGateway};
use workflow_graph::{transform, GraphStore, SavePayload, SaveResponse, WorkflowGraph, WorkflowId};

use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::events::{EditorEvent, EventSink, NullEventSink};

/// Lifecycle state of an editor session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Loading,
    Ready,
    Saving,
    /// Loading failed; carries the error shown to the user
    Failed(String),
}

impl SessionState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Whether the store may be edited
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Ready | Self::Saving)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Loading => f.write_str("loading"),
            Self::Ready => f.write_str("ready"),
            Self::Saving => f.write_str("saving"),
            Self::Failed(_) => f.write_str("failed"),
        }
    }
}

/// Controller for one editing session
pub struct EditorSession {
    gateway: SharedGateway,
    credential: Credential,
    store: GraphStore,
    state: SessionState,
    events: Arc<dyn EventSink>,
    /// Name sent with the in-flight save
    pending_name: Option<String>,
}

impl EditorSession {
    /// Create an idle session; call [`EditorSession::open`] next
    pub fn new(gateway: SharedGateway, credential: Credential, config: &EditorConfig) -> Self {
        Self {
            gateway,
            credential,
            store: GraphStore::with_options(config.graph, config.history_depth),
            state: SessionState::Idle,
            events: Arc::new(NullEventSink),
            pending_name: None,
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Read-only snapshot of the graph being edited
    pub fn snapshot(&self) -> Arc<WorkflowGraph> {
        self.store.snapshot()
    }

    /// Backend id of the workflow, once it has been loaded or saved
    pub fn persisted_id(&self) -> Option<WorkflowId> {
        self.store.graph().persisted_id
    }

    /// Start editing a new workflow, or load an existing one
    ///
    /// On a load failure the session moves to `Failed` and the error is
    /// returned; there is no retry.
    pub async fn open(&mut self, workflow_id: Option<WorkflowId>) -> Result<()> {
        if self.state != SessionState::Idle {
            return Err(self.invalid_state("open"));
        }

        let Some(id) = workflow_id else {
            log::info!("Starting new workflow");
            self.set_state(SessionState::Ready);
            return Ok(());
        };

        self.set_state(SessionState::Loading);
        log::info!("Loading workflow {}", id);

        let decoded = match self.gateway.load_workflow(&self.credential, id).await {
            Ok(response) => transform::from_load_response(&response).map_err(EditorError::from),
            Err(e) => Err(EditorError::from(e)),
        };

        match decoded {
            Ok(graph) => {
                let (node_count, edge_count) = (graph.nodes.len(), graph.edges.len());
                self.store.load(graph);
                log::info!(
                    "Loaded workflow {} ({} nodes, {} edges)",
                    id,
                    node_count,
                    edge_count
                );
                self.emit(EditorEvent::WorkflowLoaded {
                    workflow_id: id,
                    node_count,
                    edge_count,
                });
                self.set_state(SessionState::Ready);
                Ok(())
            }
            Err(e) => {
                log::warn!("Failed to load workflow {}: {}", id, e);
                self.set_state(SessionState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Apply a mutation to the graph store
    ///
    /// ```ignore
    /// let id = session.edit(|store| Ok(store.add_node(entry, Position::new(0.0, 0.0))))?;
    /// session.edit(|store| store.connect(&trigger, &id))?;
    /// ```
    pub fn edit<T, F>(&mut self, mutation: F) -> Result<T>
    where
        F: FnOnce(&mut GraphStore) -> workflow_graph::Result<T>,
    {
        if !self.state.is_editable() {
            return Err(self.invalid_state("edit"));
        }

        let value = mutation(&mut self.store)?;
        let graph = self.store.graph();
        self.emit(EditorEvent::GraphChanged {
            node_count: graph.nodes.len(),
            edge_count: graph.edges.len(),
        });
        Ok(value)
    }

    /// Validate the graph and enter `Saving`
    ///
    /// Returns `Ok(None)` if a save is already in flight. Validation errors
    /// leave the session `Ready` and never reach the backend. On success the
    /// returned payload must be sent and its result passed to
    /// [`EditorSession::finish_save`].
    pub fn begin_save(&mut self, workflow_name: &str) -> Result<Option<SavePayload>> {
        match self.state {
            SessionState::Ready => {}
            SessionState::Saving => {
                log::debug!("Save already in progress, ignoring request");
                return Ok(None);
            }
            _ => return Err(self.invalid_state("save")),
        }

        let name = workflow_name.trim();
        if let Err(e) = check_savable(name, self.store.graph()) {
            log::warn!("Save rejected: {}", e);
            self.emit(EditorEvent::ValidationFailed {
                message: e.to_string(),
            });
            return Err(e);
        }

        let payload = transform::to_save_payload(self.store.graph(), name)?;
        self.pending_name = Some(name.to_string());
        self.set_state(SessionState::Saving);
        Ok(Some(payload))
    }

    /// Complete a save started by [`EditorSession::begin_save`]
    ///
    /// On success the persisted id is recorded on the graph so later saves
    /// update the same workflow. On failure the graph is left untouched and
    /// the backend's error is returned as is.
    pub fn finish_save(&mut self, result: workflow_gateway::Result<SaveResponse>) -> Result<WorkflowId> {
        if self.state != SessionState::Saving {
            return Err(self.invalid_state("finish save"));
        }
        let name = self.pending_name.take();
        self.set_state(SessionState::Ready);

        match result {
            Ok(response) => {
                let id = response.workflow_id;
                self.store.set_persisted_id(id);
                if let Some(name) = name {
                    self.store.rename(name);
                }
                log::info!("Saved workflow {}", id);
                self.emit(EditorEvent::WorkflowSaved { workflow_id: id });
                Ok(id)
            }
            Err(e) => {
                log::warn!("Failed to save workflow: {}", e);
                self.emit(EditorEvent::SaveFailed {
                    message: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// Validate, send and record a save in one step
    ///
    /// Returns `Ok(None)` when a save was already in flight.
    pub async fn save(&mut self, workflow_name: &str) -> Result<Option<WorkflowId>> {
        let Some(payload) = self.begin_save(workflow_name)? else {
            return Ok(None);
        };
        let result = self.gateway.save_workflow(&self.credential, &payload).await;
        self.finish_save(result).map(Some)
    }

    /// Enable or disable the saved workflow
    pub async fn set_active(&self, active: bool) -> Result<()> {
        let id = self.persisted_id().ok_or(EditorError::NotPersisted)?;
        self.gateway.set_active(&self.credential, id, active).await?;
        log::info!("Workflow {} active={}", id, active);
        self.emit(EditorEvent::ActivationChanged {
            workflow_id: id,
            active,
        });
        Ok(())
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state == state {
            return;
        }
        log::debug!("Session state {} -> {}", self.state, state);
        self.state = state.clone();
        self.emit(EditorEvent::StateChanged { state });
    }

    fn emit(&self, event: EditorEvent) {
        if let Err(e) = self.events.send(event) {
            log::warn!("Dropped editor event: {}", e);
        }
    }

    fn invalid_state(&self, operation: &'static str) -> EditorError {
        EditorError::InvalidState {
            operation,
            state: self.state.clone(),
        }
    }
}

/// Checks run before a save is sent
fn check_savable(name: &str, graph: &WorkflowGraph) -> Result<()> {
    if name.is_empty() {
        return Err(EditorError::validation("Workflow name is required"));
    }
    if graph.nodes.is_empty() {
        return Err(EditorError::validation("Workflow must have at least one node"));
    }
    Ok(())
}
