use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ConfigError;

/// Mutation classification of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolType {
    /// Observes or moves the viewport without changing page data.
    ReadOnly,
    /// May mutate page or application state.
    Destructive,
}

impl ToolType {
    /// Returns `true` for tools safe to expose in read-only mode.
    pub fn is_read_only(self) -> bool {
        matches!(self, Self::ReadOnly)
    }
}

/// Capability group a tool belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Page interaction: navigation, input, scrolling.
    Core,
    /// Tab management.
    Tabs,
    /// Coordinate-based (screenshot driven) interaction.
    Vision,
    /// PDF export.
    Pdf,
}

impl Capability {
    /// Returns the canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Tabs => "tabs",
            Self::Vision => "vision",
            Self::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Capability {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "core" => Ok(Self::Core),
            "tabs" => Ok(Self::Tabs),
            "vision" => Ok(Self::Vision),
            "pdf" => Ok(Self::Pdf),
            other => Err(ConfigError::InvalidValue {
                field: "capabilities".to_string(),
                reason: format!("unknown capability '{other}'"),
            }),
        }
    }
}

/// Declarative description of a tool, as exposed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSchema {
    /// Stable identifier used for dispatch.
    pub name: String,
    /// Display title.
    pub title: String,
    /// Human-readable description for tool selection.
    pub description: String,
    /// JSON schema accepted by the tool.
    pub input_schema: serde_json::Value,
    /// Mutation classification.
    #[serde(rename = "type")]
    pub tool_type: ToolType,
}

/// A single tool invocation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call id.
    #[serde(default = "new_call_id")]
    pub id: String,
    /// Tool name to dispatch.
    pub tool: String,
    /// Raw, unvalidated parameters.
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
}

fn new_call_id() -> String {
    Uuid::new_v4().to_string()
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl ToolCall {
    /// Creates a tool call with a fresh id.
    pub fn new(tool: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            id: new_call_id(),
            tool: tool.into(),
            params,
        }
    }
}

/// One violated input constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// JSON pointer into the input; empty for the whole object.
    pub path: String,
    /// Human-readable message.
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Observable page state captured after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Current page URL.
    pub url: String,
    /// Document title, if any.
    pub title: Option<String>,
}

/// Outcome of one dispatched tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    /// Tool that handled the call.
    pub tool_name: String,
    /// Pseudo-script lines describing the action.
    pub code: Vec<String>,
    /// Whether the action ran (false for dry runs and action-less tools).
    pub executed: bool,
    /// Page state re-captured after the action, when the tool asked for it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PageSnapshot>,
}
