use thiserror::Error;

use crate::tool::ValidationIssue;

/// Top-level error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading/validation error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Tool registration/execution error.
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field has an invalid value and reason.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Filesystem read error.
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    Toml(String),
}

/// Tool registration and execution errors
#[derive(Debug, Error)]
pub enum ToolError {
    /// Requested tool is unknown (or not exposed in the current mode).
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Caller input failed the tool's input schema.
    #[error("Invalid arguments for {tool}: {}", render_issues(.issues))]
    Validation {
        tool: String,
        issues: Vec<ValidationIssue>,
    },

    /// No tab is attached to the browser context.
    #[error("No open tab. Navigate to a URL to create one")]
    NoActiveTab,

    /// Two tools were registered under the same name.
    #[error("Duplicate tool name: {0}")]
    DuplicateName(String),

    /// A tool's input schema could not be generated or compiled.
    #[error("Invalid input schema for {tool}: {reason}")]
    InvalidSchema { tool: String, reason: String },

    /// Browser driver operation failed.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// Action exceeded allowed execution time; completion state is unknown.
    #[error("Timeout after {0}ms")]
    Timeout(u64),
}

impl ToolError {
    /// Builds a validation error carrying a single issue.
    pub fn validation(
        tool: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Validation {
            tool: tool.into(),
            issues: vec![ValidationIssue::new(path, message)],
        }
    }

    /// Returns `true` when the caller may retry after fixing input or session state.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::NoActiveTab | Self::Timeout(_)
        )
    }
}

fn render_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
