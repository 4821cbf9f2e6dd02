//! Tool registry and per-session dispatcher.

pub mod dispatcher;
pub mod tool_registry;

/// Session dispatcher and its options.
pub use dispatcher::{DispatchOptions, ToolDispatcher, action_timeout};
/// Runtime tool registry.
pub use tool_registry::{ExposureFilter, ToolRegistry};
