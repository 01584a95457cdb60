//! REST implementation of the gateway
//!
//! Routes, relative to the configured base URL:
//!
//! | Operation      | Request                          |
//! |----------------|----------------------------------|
//! | load           | `GET /workflows/{id}`            |
//! | save           | `POST /workflows`                |
//! | set active     | `PATCH /workflows/{id}/activate` |
//! | list           | `GET /workflows`                 |
//!
//! Failed requests carry `{"error": "..."}`; that message is passed through.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use workflow_graph::{LoadResponse, SavePayload, SaveResponse, WorkflowId, WorkflowSummary};

use crate::config::GatewayConfig;
use crate::credential::Credential;
use crate::error::{GatewayError, Result};
use crate::gateway::WorkflowGateway;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct ActivatePayload {
    active: bool,
}

/// Gateway speaking the backend's REST API
pub struct HttpGateway {
    /// HTTP client for API requests
    http_client: reqwest::Client,
    /// Base URL without trailing slash
    base_url: String,
}

impl HttpGateway {
    /// Create a gateway from connection settings
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(GatewayError::Config("base URL is empty".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send a request and decode a JSON body
    async fn send_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }

    /// Send a request, mapping non-success statuses to `GatewayError::Backend`
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await.map_err(|e| {
            log::warn!("Workflow backend unreachable: {}", e);
            GatewayError::Http(e)
        })?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = backend_message(status, &body);
        log::warn!("Workflow backend returned {}: {}", status, message);
        Err(GatewayError::backend(status.as_u16(), message))
    }
}

/// Pick the user-facing message out of an error response
fn backend_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status.to_string()
}

#[async_trait]
impl WorkflowGateway for HttpGateway {
    async fn load_workflow(&self, credential: &Credential, id: WorkflowId) -> Result<LoadResponse> {
        log::debug!("GET workflow {}", id);
        let request = self
            .http_client
            .get(self.url(&format!("workflows/{}", id)))
            .bearer_auth(credential.token());
        self.send_json(request).await
    }

    async fn save_workflow(&self, credential: &Credential, payload: &SavePayload) -> Result<SaveResponse> {
        log::debug!(
            "POST workflow '{}' ({} nodes, {} edges, update: {})",
            payload.workflow.name,
            payload.nodes.len(),
            payload.edges.len(),
            payload.is_update()
        );
        let request = self
            .http_client
            .post(self.url("workflows"))
            .bearer_auth(credential.token())
            .json(payload);
        self.send_json(request).await
    }

    async fn set_active(&self, credential: &Credential, id: WorkflowId, active: bool) -> Result<()> {
        log::debug!("PATCH workflow {} active={}", id, active);
        let request = self
            .http_client
            .patch(self.url(&format!("workflows/{}/activate", id)))
            .bearer_auth(credential.token())
            .json(&ActivatePayload { active });
        self.send(request).await?;
        Ok(())
    }

    async fn list_workflows(&self, credential: &Credential) -> Result<Vec<WorkflowSummary>> {
        log::debug!("GET workflows");
        let request = self
            .http_client
            .get(self.url("workflows"))
            .bearer_auth(credential.token());
        let workflows: Option<Vec<WorkflowSummary>> = self.send_json(request).await?;
        Ok(workflows.unwrap_or_default())
    }
}
