//! Workflow list operations outside an editing session

use workflow_gateway::{Credential, SharedGateway};
use workflow_graph::{WorkflowId, WorkflowSummary};

use crate::config::EditorConfig;
use crate::error::Result;
use crate::session::EditorSession;

/// The user's workflow list, backed by the gateway
pub struct Dashboard {
    gateway: SharedGateway,
    credential: Credential,
}

impl Dashboard {
    pub fn new(gateway: SharedGateway, credential: Credential) -> Self {
        Self {
            gateway,
            credential,
        }
    }

    pub async fn list_workflows(&self) -> Result<Vec<WorkflowSummary>> {
        let workflows = self.gateway.list_workflows(&self.credential).await?;
        log::debug!("Listed {} workflows", workflows.len());
        Ok(workflows)
    }

    /// Set a workflow's active flag; repeating the same value is harmless
    pub async fn set_active(&self, id: WorkflowId, active: bool) -> Result<()> {
        self.gateway.set_active(&self.credential, id, active).await?;
        log::info!("Workflow {} active={}", id, active);
        Ok(())
    }

    /// Idle session for a workflow, sharing this dashboard's gateway and credential
    pub fn session(&self, config: &EditorConfig) -> EditorSession {
        EditorSession::new(self.gateway.clone(), self.credential.clone(), config)
    }
}
