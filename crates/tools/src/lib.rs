//! Tool trait, execution contract, and built-in browser tools.
//!
//! A tool validates untyped input against its schema, describes the action
//! as pseudo-script lines, and hands back a deferred action plus hints for
//! the dispatcher (re-snapshot, wait for network).

pub mod browser;
pub mod context;
pub mod interaction;
pub mod navigation;
pub mod result;
pub mod schema;
pub mod scroll;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use browser::{BrowserOptions, ChromiumBrowser, ChromiumPage};
pub use context::{Context, Page, Tab};
pub use interaction::{ClickTool, TypeTool};
pub use navigation::NavigateTool;
pub use result::{ToolAction, ToolResult};
pub use schema::{InputSchema, ToolParams};
pub use scroll::ScrollTool;

use std::sync::Arc;

use async_trait::async_trait;
use proto::{Capability, ToolError, ToolSchema, ToolType};

/// Trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync + 'static {
    /// Typed parameters produced by validating raw input.
    type Params: ToolParams;

    /// Unique tool name used for dispatch.
    fn name(&self) -> &str;
    /// Display title.
    fn title(&self) -> &str;
    /// Human-readable description for tool selection.
    fn description(&self) -> &str;
    /// Mutation classification.
    fn tool_type(&self) -> ToolType;
    /// Capability group used to filter the exposed tool set.
    fn capability(&self) -> Capability;

    /// Builds the result for validated params.
    ///
    /// Must not cause side effects; those belong in the returned action.
    async fn handle(
        &self,
        context: &dyn Context,
        params: Self::Params,
    ) -> Result<ToolResult, ToolError>;
}

#[async_trait]
trait ErasedTool: Send + Sync {
    async fn call(
        &self,
        context: &dyn Context,
        raw: &serde_json::Value,
    ) -> Result<ToolResult, ToolError>;
}

struct BoundTool<T: Tool> {
    tool: T,
    input: InputSchema<T::Params>,
}

#[async_trait]
impl<T: Tool> ErasedTool for BoundTool<T> {
    async fn call(
        &self,
        context: &dyn Context,
        raw: &serde_json::Value,
    ) -> Result<ToolResult, ToolError> {
        let params = self.input.validate(raw)?;
        self.tool.handle(context, params).await
    }
}

/// Registry entry: a tool's schema paired with its type-erased handler.
#[derive(Clone)]
pub struct ToolDefinition {
    capability: Capability,
    schema: Arc<ToolSchema>,
    tool: Arc<dyn ErasedTool>,
}

impl ToolDefinition {
    /// Compiles the tool's input schema and wraps it for dispatch.
    pub fn new<T: Tool>(tool: T) -> Result<Self, ToolError> {
        let input = InputSchema::<T::Params>::new(tool.name())?;
        let schema = ToolSchema {
            name: tool.name().to_string(),
            title: tool.title().to_string(),
            description: tool.description().to_string(),
            input_schema: input.json().clone(),
            tool_type: tool.tool_type(),
        };
        Ok(Self {
            capability: tool.capability(),
            schema: Arc::new(schema),
            tool: Arc::new(BoundTool { tool, input }),
        })
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    /// Validates raw input, then runs the tool's `handle`.
    pub async fn call(
        &self,
        context: &dyn Context,
        raw: &serde_json::Value,
    ) -> Result<ToolResult, ToolError> {
        self.tool.call(context, raw).await
    }
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.schema.name)
            .field("capability", &self.capability)
            .field("type", &self.schema.tool_type)
            .finish()
    }
}

/// Every built-in tool, grouped by capability module in registration order.
pub fn builtin_tools() -> Result<Vec<ToolDefinition>, ToolError> {
    let mut definitions = navigation::tools()?;
    definitions.extend(interaction::tools()?);
    definitions.extend(scroll::tools()?);
    Ok(definitions)
}

/// Renders a string as a JavaScript literal for pseudo-script lines.
pub(crate) fn js_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}
