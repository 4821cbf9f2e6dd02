//! Element interaction: clicking and typing.

use async_trait::async_trait;
use proto::{Capability, ToolError, ToolType, ValidationIssue};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::{Context, Tool, ToolAction, ToolDefinition, ToolParams, ToolResult, js_string};

/// Tool that clicks an element on the current page.
pub struct ClickTool;
/// Tool that types text into an element on the current page.
pub struct TypeTool;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ClickParams {
    /// CSS selector for the element to click
    pub selector: String,
}

impl ToolParams for ClickParams {
    fn refine(&self) -> Vec<ValidationIssue> {
        check_selector(&self.selector)
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TypeParams {
    /// CSS selector for the input element
    pub selector: String,
    /// Text to type into the target element
    pub text: String,
    /// Press Enter after typing (default: false)
    #[serde(default)]
    pub submit: Option<bool>,
}

impl ToolParams for TypeParams {
    fn refine(&self) -> Vec<ValidationIssue> {
        check_selector(&self.selector)
    }
}

fn check_selector(selector: &str) -> Vec<ValidationIssue> {
    if selector.trim().is_empty() {
        vec![ValidationIssue::new("/selector", "selector must not be empty")]
    } else {
        Vec::new()
    }
}

impl ClickTool {
    /// Creates a click tool.
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClickTool {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTool {
    /// Creates a typing tool.
    pub fn new() -> Self {
        Self
    }
}

impl Default for TypeTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ClickTool {
    type Params = ClickParams;

    fn name(&self) -> &str {
        "browser_click"
    }

    fn title(&self) -> &str {
        "Click"
    }

    fn description(&self) -> &str {
        "Click an element on the current page"
    }

    fn tool_type(&self) -> ToolType {
        ToolType::Destructive
    }

    fn capability(&self) -> Capability {
        Capability::Core
    }

    async fn handle(
        &self,
        context: &dyn Context,
        params: ClickParams,
    ) -> Result<ToolResult, ToolError> {
        let tab = context.current_tab_or_die()?;
        let selector = params.selector;

        let code = vec![
            format!("// Click {}", js_string(&selector)),
            format!("await page.click({});", js_string(&selector)),
        ];

        let page = tab.page().clone();
        let action = ToolAction::new(move || async move { page.click(&selector).await });

        Ok(ToolResult {
            code,
            action: Some(action),
            capture_snapshot: true,
            wait_for_network: true,
        })
    }
}

#[async_trait]
impl Tool for TypeTool {
    type Params = TypeParams;

    fn name(&self) -> &str {
        "browser_type"
    }

    fn title(&self) -> &str {
        "Type text"
    }

    fn description(&self) -> &str {
        "Type text into an element on the current page"
    }

    fn tool_type(&self) -> ToolType {
        ToolType::Destructive
    }

    fn capability(&self) -> Capability {
        Capability::Core
    }

    async fn handle(
        &self,
        context: &dyn Context,
        params: TypeParams,
    ) -> Result<ToolResult, ToolError> {
        let tab = context.current_tab_or_die()?;
        let submit = params.submit.unwrap_or(false);
        let TypeParams { selector, text, .. } = params;

        let mut code = vec![
            format!("// Fill {} into {}", js_string(&text), js_string(&selector)),
            format!(
                "await page.fill({}, {});",
                js_string(&selector),
                js_string(&text)
            ),
        ];
        if submit {
            code.push("// Submit text".to_string());
            code.push(format!(
                "await page.press({}, \"Enter\");",
                js_string(&selector)
            ));
        }

        let page = tab.page().clone();
        let action = ToolAction::new(move || async move {
            page.fill(&selector, &text).await?;
            if submit {
                page.press(&selector, "Enter").await?;
            }
            Ok(())
        });

        Ok(ToolResult {
            code,
            action: Some(action),
            capture_snapshot: true,
            wait_for_network: true,
        })
    }
}

/// Interaction tools in registration order.
pub fn tools() -> Result<Vec<ToolDefinition>, ToolError> {
    Ok(vec![
        ToolDefinition::new(ClickTool::new())?,
        ToolDefinition::new(TypeTool::new())?,
    ])
}
