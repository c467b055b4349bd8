//! Typed HTTP client for the remote campaign agent service.

pub mod client;
pub mod error;

pub use client::{AgentClient, Operation};
pub use error::AgentError;
