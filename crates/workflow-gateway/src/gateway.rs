//! The persistence gateway contract

use std::sync::Arc;

use async_trait::async_trait;
use workflow_graph::{LoadResponse, SavePayload, SaveResponse, WorkflowId, WorkflowSummary};

use crate::credential::Credential;
use crate::error::Result;

/// Backend operations the editor depends on
///
/// Implementations must echo node and edge display ids back unchanged, so a
/// saved graph reloads with the same ids the canvas used.
#[async_trait]
pub trait WorkflowGateway: Send + Sync {
    /// Fetch a persisted workflow for editing
    async fn load_workflow(&self, credential: &Credential, id: WorkflowId) -> Result<LoadResponse>;

    /// Create a workflow, or update it when the payload carries an id
    async fn save_workflow(&self, credential: &Credential, payload: &SavePayload) -> Result<SaveResponse>;

    /// Enable or disable scheduling of a persisted workflow
    async fn set_active(&self, credential: &Credential, id: WorkflowId, active: bool) -> Result<()>;

    /// List the caller's workflows
    async fn list_workflows(&self, credential: &Credential) -> Result<Vec<WorkflowSummary>>;
}

/// Gateway shared between sessions
pub type SharedGateway = Arc<dyn WorkflowGateway>;
