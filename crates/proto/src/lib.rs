//! Shared protocol types for tools, the dispatcher, and the CLI.
//!
//! This crate defines serializable tool descriptors, call/response
//! structures, and strongly-typed error enums shared across the workspace.

pub mod error;
pub mod session;
pub mod tool;

/// Re-export of all protocol error types.
pub use error::*;
/// Re-export of session identity.
pub use session::SessionId;
/// Re-export of tool descriptor, call, and response types.
pub use tool::{
    Capability, PageSnapshot, ToolCall, ToolResponse, ToolSchema, ToolType, ValidationIssue,
};
