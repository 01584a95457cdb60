//! Workflow Editor - session controller for the workflow builder
//!
//! Ties the graph model to the persistence gateway:
//!
//! - `EditorSession`: load, edit and save one workflow
//!   (`Idle → Loading → Ready → Saving → Ready`, or `Failed` on load errors)
//! - `Dashboard`: list workflows and toggle their active flag
//! - `EditorConfig`: backend and canvas settings stored as `config.json`
//! - `EventSink`: where session events go

pub mod config;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod session;

pub use config::{ConfigError, EditorConfig};
pub use dashboard::Dashboard;
pub use error::{EditorError, Result};
pub use events::{ChannelEventSink, EditorEvent, EventError, EventSink, NullEventSink, VecEventSink};
pub use session::{EditorSession, SessionState};

pub use workflow_gateway::{Credential, SharedGateway};
