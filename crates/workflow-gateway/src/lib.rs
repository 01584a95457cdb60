//! Workflow Gateway - persistence boundary of the workflow editor
//!
//! The editor talks to the backend only through the `WorkflowGateway` trait.
//! Two implementations are provided:
//!
//! - `HttpGateway`: the REST API, via reqwest
//! - `MemoryGateway`: an in-process backend that assigns ids and echoes
//!   display ids back, for tests and offline editing
//!
//! Every call takes the caller's `Credential` explicitly; nothing is read
//! from ambient state.

pub mod config;
pub mod credential;
pub mod error;
pub mod gateway;
pub mod http;
pub mod memory;

pub use config::GatewayConfig;
pub use credential::Credential;
pub use error::{GatewayError, Result};
pub use gateway::{SharedGateway, WorkflowGateway};
pub use http::HttpGateway;
pub use memory::{CallCounts, MemoryGateway};
