//! Events reported by editor sessions
//!
//! The UI turns these into toasts, spinners and navigation. Sending is
//! best-effort: a sink error is logged and the session carries on.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use workflow_graph::WorkflowId;

use crate::session::SessionState;

/// Receiver of editor events
///
/// Implemented by whatever transport the embedding application uses.
pub trait EventSink: Send + Sync {
    fn send(&self, event: EditorEvent) -> Result<(), EventError>;
}

/// Error when sending events fails
#[derive(Debug, Clone, thiserror::Error)]
#[error("Event error: {message}")]
pub struct EventError {
    pub message: String,
}

impl EventError {
    pub fn channel_closed() -> Self {
        Self {
            message: "Channel closed".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorEvent {
    /// The session moved to a new state
    StateChanged { state: SessionState },

    /// A persisted workflow was decoded into the store
    #[serde(rename_all = "camelCase")]
    WorkflowLoaded {
        workflow_id: WorkflowId,
        node_count: usize,
        edge_count: usize,
    },

    /// A store mutation succeeded
    #[serde(rename_all = "camelCase")]
    GraphChanged { node_count: usize, edge_count: usize },

    #[serde(rename_all = "camelCase")]
    WorkflowSaved { workflow_id: WorkflowId },

    /// The backend rejected a save; `message` is shown as is
    SaveFailed { message: String },

    /// Local checks rejected a save
    ValidationFailed { message: String },

    #[serde(rename_all = "camelCase")]
    ActivationChanged { workflow_id: WorkflowId, active: bool },
}

/// Sink that discards all events
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: EditorEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// Sink collecting events in memory, for tests and replay
#[derive(Default)]
pub struct VecEventSink {
    events: Mutex<Vec<EditorEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EditorEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: EditorEvent) -> Result<(), EventError> {
        self.events.lock().push(event);
        Ok(())
    }
}

/// Sink forwarding events into a tokio channel
pub struct ChannelEventSink {
    sender: tokio::sync::mpsc::UnboundedSender<EditorEvent>,
}

impl ChannelEventSink {
    pub fn new(sender: tokio::sync::mpsc::UnboundedSender<EditorEvent>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelEventSink {
    fn send(&self, event: EditorEvent) -> Result<(), EventError> {
        self.sender
            .send(event)
            .map_err(|_| EventError::channel_closed())
    }
}
