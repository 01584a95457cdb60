//! Error types for gateway operations

use workflow_graph::WorkflowId;

/// Result type alias using GatewayError
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Transport and backend failures
///
/// `Backend` displays the backend's message verbatim so it can be shown to
/// the user as is.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Workflow {0} not found")]
    NotFound(WorkflowId),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// HTTP status reported by the backend, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
