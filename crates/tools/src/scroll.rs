//! Page scrolling.

use async_trait::async_trait;
use proto::{Capability, ToolError, ToolType, ValidationIssue};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::{Context, Tool, ToolAction, ToolDefinition, ToolParams, ToolResult};

/// Tool that scrolls the current page with the mouse wheel.
pub struct ScrollTool;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScrollParams {
    /// Horizontal scroll amount
    #[serde(default)]
    pub delta_x: Option<f64>,
    /// Vertical scroll amount
    #[serde(default)]
    pub delta_y: Option<f64>,
}

impl ToolParams for ScrollParams {
    fn refine(&self) -> Vec<ValidationIssue> {
        if self.delta_x.is_none() && self.delta_y.is_none() {
            return vec![ValidationIssue::new(
                "",
                "Either deltaX or deltaY must be specified",
            )];
        }

        [("/deltaX", self.delta_x), ("/deltaY", self.delta_y)]
            .into_iter()
            .filter(|(_, delta)| delta.is_some_and(|d| !d.is_finite()))
            .map(|(path, _)| ValidationIssue::new(path, "must be a finite number"))
            .collect()
    }
}

impl ScrollTool {
    /// Creates a scroll tool.
    pub fn new() -> Self {
        Self
    }
}

impl Default for ScrollTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ScrollTool {
    type Params = ScrollParams;

    fn name(&self) -> &str {
        "browser_scroll"
    }

    fn title(&self) -> &str {
        "Scroll page"
    }

    fn description(&self) -> &str {
        "Scroll the page by the specified amounts"
    }

    fn tool_type(&self) -> ToolType {
        ToolType::ReadOnly
    }

    fn capability(&self) -> Capability {
        Capability::Core
    }

    async fn handle(
        &self,
        context: &dyn Context,
        params: ScrollParams,
    ) -> Result<ToolResult, ToolError> {
        let tab = context.current_tab_or_die()?;
        let x = params.delta_x.unwrap_or(0.0);
        let y = params.delta_y.unwrap_or(0.0);

        let code = vec![
            format!("// Scroll the page by ({x}, {y})"),
            format!("await page.mouse.wheel({x}, {y});"),
        ];

        let page = tab.page().clone();
        let action = ToolAction::new(move || async move { page.mouse_wheel(x, y).await });

        // Scrolling changes neither the accessible content nor network state.
        Ok(ToolResult {
            code,
            action: Some(action),
            capture_snapshot: false,
            wait_for_network: false,
        })
    }
}

/// Scroll tools in registration order.
pub fn tools() -> Result<Vec<ToolDefinition>, ToolError> {
    Ok(vec![ToolDefinition::new(ScrollTool::new())?])
}
