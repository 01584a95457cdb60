//! Wire types exchanged with the workflow backend
//!
//! The save payload uses the camelCase names the backend's create endpoint
//! binds to, while the load response and workflow listing use the backend's
//! snake_case JSON. Position and config travel as JSON text because the
//! backend stores them in opaque text columns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{CredentialId, NodeKind, WorkflowId};

/// Document sent to create or update a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePayload {
    pub workflow: SaveWorkflow,
    pub nodes: Vec<SaveNode>,
    pub edges: Vec<SaveEdge>,
}

impl SavePayload {
    /// Whether the backend will treat this payload as an update
    pub fn is_update(&self) -> bool {
        self.workflow.persisted_id.is_some()
    }
}

/// Workflow header of a save payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveWorkflow {
    /// Present when updating an existing workflow
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub persisted_id: Option<WorkflowId>,
    pub name: String,
}

/// One node of a save payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveNode {
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub persisted_id: Option<String>,
    pub display_id: String,
    pub service_name: String,
    pub task_name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Compact JSON `{"x":..,"y":..}`
    pub position: String,
    /// Compact JSON object
    pub config: String,
    #[serde(rename = "credential_id", default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<CredentialId>,
}

/// One edge of a save payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEdge {
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub persisted_id: Option<String>,
    pub display_id: String,
    /// Source node display id
    pub from: String,
    /// Target node display id
    pub to: String,
}

/// Backend answer to a save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    #[serde(rename = "workflowId")]
    pub workflow_id: WorkflowId,
}

/// Persisted workflow header, as listed on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub id: WorkflowId,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

/// Document returned when fetching a workflow for editing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadResponse {
    pub workflow: WorkflowSummary,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub nodes: Vec<NodeRecord>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub edges: Vec<EdgeRecord>,
}

/// Persisted node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(rename = "id")]
    pub persisted_id: String,
    pub display_id: String,
    pub service_name: String,
    pub task_name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(rename = "position")]
    pub position_text: String,
    #[serde(rename = "config")]
    pub config_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<CredentialId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<WorkflowId>,
}

/// Persisted edge, endpoints given as node display ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    #[serde(rename = "id")]
    pub persisted_id: String,
    pub display_id: String,
    #[serde(rename = "node_from")]
    pub from_display_id: String,
    #[serde(rename = "node_to")]
    pub to_display_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<WorkflowId>,
}

/// The backend encodes empty collections as `null`
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
