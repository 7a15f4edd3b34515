//! REST API Layer
//!
//! HTTP surface of the agent: task creation, task inspection, aggregate
//! status and an unauthenticated health probe.

pub mod auth;
pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use handler::AppState;
pub use server::{router, ApiServer, HttpServerConfig, ServerHandle};
