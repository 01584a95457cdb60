//! Error types for the workflow graph model

use thiserror::Error;

use crate::types::NodeKind;

/// Result type alias using GraphError
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised by graph mutations, validation and DTO decoding
#[derive(Debug, Error)]
pub enum GraphError {
    /// An operation referenced a node or edge id absent from the graph
    #[error("Not found: {0}")]
    NotFound(String),

    /// An edge endpoint does not exist in the graph
    #[error("Invalid edge endpoint: {0}")]
    InvalidEndpoint(String),

    /// An edge would connect a node to itself
    #[error("Node '{0}' cannot be connected to itself")]
    SelfLoop(String),

    /// An edge would leave an action or enter a listener
    #[error("Cannot connect {from_kind} '{from}' to {to_kind} '{to}'")]
    KindViolation {
        from: String,
        from_kind: NodeKind,
        to: String,
        to_kind: NodeKind,
    },

    /// Parallel edges are disabled and the pair is already connected
    #[error("Nodes '{from}' and '{to}' are already connected")]
    DuplicateEdge { from: String, to: String },

    /// Cycles are disabled and the edge would close one
    #[error("Connecting '{from}' to '{to}' would create a cycle")]
    CycleRejected { from: String, to: String },

    /// The graph contains a cycle, so it has no execution order
    #[error("Cycle detected in graph")]
    CycleDetected,

    /// A load response could not be decoded into a graph
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Compression error
    #[error("Compression error: {0}")]
    Compression(String),
}

impl GraphError {
    /// Create a malformed payload error with a message
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedPayload(msg.into())
    }

    /// Whether this error came from an edge construction rule
    pub fn is_edge_rule(&self) -> bool {
        matches!(
            self,
            Self::InvalidEndpoint(_)
                | Self::SelfLoop(_)
                | Self::KindViolation { .. }
                | Self::DuplicateEdge { .. }
                | Self::CycleRejected { .. }
        )
    }
}
