//! In-memory gateway
//!
//! Behaves like the REST backend closely enough for offline use and tests:
//! it assigns workflow ids, generates persisted node/edge ids, echoes display
//! ids back and keeps the `active` flag across updates.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use workflow_graph::{
    EdgeRecord, LoadResponse, NodeRecord, SavePayload, SaveResponse, WorkflowId, WorkflowSummary,
};

use crate::credential::Credential;
use crate::error::{GatewayError, Result};
use crate::gateway::WorkflowGateway;

/// Number of calls received per operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub load: usize,
    pub save: usize,
    pub set_active: usize,
    pub list: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.load + self.save + self.set_active + self.list
    }
}

#[derive(Debug, Default)]
struct State {
    workflows: BTreeMap<WorkflowId, LoadResponse>,
    next_id: WorkflowId,
    calls: CallCounts,
    /// Message for the next call to fail with
    pending_failure: Option<String>,
}

/// Gateway holding workflows in process memory
#[derive(Debug)]
pub struct MemoryGateway {
    state: Mutex<State>,
    /// Token every call must present, if set
    required_token: Option<String>,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1,
                ..State::default()
            }),
            required_token: None,
        }
    }

    /// Reject calls whose credential does not carry `token`
    pub fn with_required_token(mut self, token: impl Into<String>) -> Self {
        self.required_token = Some(token.into());
        self
    }

    /// Store a workflow as if the backend already had it
    pub fn seed(&self, workflow: LoadResponse) {
        let mut state = self.state.lock();
        let id = workflow.workflow.id;
        if id >= state.next_id {
            state.next_id = id + 1;
        }
        state.workflows.insert(id, workflow);
    }

    /// Stored copy of a workflow
    pub fn get(&self, id: WorkflowId) -> Option<LoadResponse> {
        self.state.lock().workflows.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn calls(&self) -> CallCounts {
        self.state.lock().calls
    }

    /// Make the next call fail with a 500 carrying `message`
    pub fn fail_next(&self, message: impl Into<String>) {
        self.state.lock().pending_failure = Some(message.into());
    }

    fn authorize(&self, credential: &Credential) -> Result<()> {
        match &self.required_token {
            Some(token) if token != credential.token() => {
                Err(GatewayError::backend(401, "Unauthorized"))
            }
            _ => Ok(()),
        }
    }

    fn take_failure(state: &mut State) -> Result<()> {
        match state.pending_failure.take() {
            Some(message) => Err(GatewayError::backend(500, message)),
            None => Ok(()),
        }
    }
}

fn check_payload(payload: &SavePayload) -> Result<()> {
    if payload.workflow.name.trim().is_empty() {
        return Err(GatewayError::backend(400, "Workflow name is required"));
    }
    if payload.nodes.is_empty() {
        return Err(GatewayError::backend(400, "Workflow must have at least one node"));
    }
    Ok(())
}

/// Keep the id the client sent, or mint one for a new record
fn record_id(existing: Option<&str>) -> String {
    existing
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

#[async_trait]
impl WorkflowGateway for MemoryGateway {
    async fn load_workflow(&self, credential: &Credential, id: WorkflowId) -> Result<LoadResponse> {
        let mut state = self.state.lock();
        state.calls.load += 1;
        self.authorize(credential)?;
        Self::take_failure(&mut state)?;

        state.workflows.get(&id).cloned().ok_or(GatewayError::NotFound(id))
    }

    async fn save_workflow(&self, credential: &Credential, payload: &SavePayload) -> Result<SaveResponse> {
        let mut state = self.state.lock();
        state.calls.save += 1;
        self.authorize(credential)?;
        Self::take_failure(&mut state)?;
        check_payload(payload)?;

        let now = Utc::now();
        let header = match payload.workflow.persisted_id {
            Some(id) => {
                let existing = state
                    .workflows
                    .get(&id)
                    .ok_or(GatewayError::NotFound(id))?;
                WorkflowSummary {
                    name: payload.workflow.name.clone(),
                    updated_at: now,
                    ..existing.workflow.clone()
                }
            }
            None => {
                let id = state.next_id;
                state.next_id += 1;
                WorkflowSummary {
                    id,
                    name: payload.workflow.name.clone(),
                    active: false,
                    created_at: now,
                    updated_at: now,
                    user_id: None,
                }
            }
        };
        let id = header.id;

        let nodes = payload
            .nodes
            .iter()
            .map(|node| NodeRecord {
                persisted_id: record_id(node.persisted_id.as_deref()),
                display_id: node.display_id.clone(),
                service_name: node.service_name.clone(),
                task_name: node.task_name.clone(),
                kind: node.kind,
                position_text: node.position.clone(),
                config_text: node.config.clone(),
                credential_id: node.credential_id,
                workflow_id: Some(id),
            })
            .collect();
        let edges = payload
            .edges
            .iter()
            .map(|edge| EdgeRecord {
                persisted_id: record_id(edge.persisted_id.as_deref()),
                display_id: edge.display_id.clone(),
                from_display_id: edge.from.clone(),
                to_display_id: edge.to.clone(),
                workflow_id: Some(id),
            })
            .collect();

        log::debug!(
            "Stored workflow {} '{}' ({} nodes)",
            id,
            header.name,
            payload.nodes.len()
        );
        state.workflows.insert(
            id,
            LoadResponse {
                workflow: header,
                nodes,
                edges,
            },
        );

        Ok(SaveResponse { workflow_id: id })
    }

    async fn set_active(&self, credential: &Credential, id: WorkflowId, active: bool) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.set_active += 1;
        self.authorize(credential)?;
        Self::take_failure(&mut state)?;

        let stored = state
            .workflows
            .get_mut(&id)
            .ok_or(GatewayError::NotFound(id))?;
        if stored.workflow.active != active {
            stored.workflow.active = active;
            stored.workflow.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn list_workflows(&self, credential: &Credential) -> Result<Vec<WorkflowSummary>> {
        let mut state = self.state.lock();
        state.calls.list += 1;
        self.authorize(credential)?;
        Self::take_failure(&mut state)?;

        Ok(state
            .workflows
            .values()
            .map(|stored| stored.workflow.clone())
            .collect())
    }
}
