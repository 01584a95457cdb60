//! Error types for editor sessions

use thiserror::Error;
use workflow_gateway::GatewayError;
use workflow_graph::GraphError;

use crate::session::SessionState;

/// Result type alias using EditorError
pub type Result<T> = std::result::Result<T, EditorError>;

#[derive(Debug, Error)]
pub enum EditorError {
    /// Local checks rejected a save; the backend was not contacted
    #[error("{0}")]
    Validation(String),

    /// Graph mutation or decoding failed
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The backend call failed; the message is the backend's
    #[error(transparent)]
    Transport(#[from] GatewayError),

    /// The operation needs a workflow the backend already knows
    #[error("Workflow has not been saved yet")]
    NotPersisted,

    /// The operation is not allowed in the session's current state
    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

impl EditorError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the graph reported malformed backend data
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Graph(GraphError::MalformedPayload(_)))
    }
}
