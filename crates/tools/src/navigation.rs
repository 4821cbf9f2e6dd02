//! URL navigation.

use async_trait::async_trait;
use proto::{Capability, ToolError, ToolType, ValidationIssue};
use reqwest::Url;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::{Context, Tool, ToolAction, ToolDefinition, ToolParams, ToolResult, js_string};

/// Tool that navigates the current tab to a URL.
pub struct NavigateTool;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NavigateParams {
    /// The URL to navigate to
    pub url: String,
}

impl ToolParams for NavigateParams {
    fn refine(&self) -> Vec<ValidationIssue> {
        match Url::parse(&self.url) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => Vec::new(),
            Ok(_) => vec![ValidationIssue::new(
                "/url",
                "Only http/https URLs are supported",
            )],
            Err(e) => vec![ValidationIssue::new("/url", format!("Invalid URL: {e}"))],
        }
    }
}

impl NavigateTool {
    /// Creates a navigation tool.
    pub fn new() -> Self {
        Self
    }
}

impl Default for NavigateTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for NavigateTool {
    type Params = NavigateParams;

    fn name(&self) -> &str {
        "browser_navigate"
    }

    fn title(&self) -> &str {
        "Navigate to a URL"
    }

    fn description(&self) -> &str {
        "Navigate the current tab to a URL"
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
        params: NavigateParams,
    ) -> Result<ToolResult, ToolError> {
        let tab = context.current_tab_or_die()?;
        let url = params.url;

        let code = vec![
            format!("// Navigate to {}", js_string(&url)),
            format!("await page.goto({});", js_string(&url)),
        ];

        let page = tab.page().clone();
        let action = ToolAction::new(move || async move { page.goto(&url).await });

        // goto already waits for the load event.
        Ok(ToolResult {
            code,
            action: Some(action),
            capture_snapshot: true,
            wait_for_network: false,
        })
    }
}

/// Navigation tools in registration order.
pub fn tools() -> Result<Vec<ToolDefinition>, ToolError> {
    Ok(vec![ToolDefinition::new(NavigateTool::new())?])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{PageCall, RecordingPage, StaticContext};

    fn definition() -> ToolDefinition {
        ToolDefinition::new(NavigateTool::new()).expect("navigate definition")
    }

    #[test]
    fn navigate_tool_metadata_is_stable() {
        let definition = definition();
        assert_eq!(definition.name(), "browser_navigate");
        let schema = definition.schema();
        assert_eq!(schema.tool_type, ToolType::Destructive);
        assert_eq!(schema.input_schema["type"], "object");
        assert_eq!(schema.input_schema["required"][0], "url");
    }

    #[tokio::test]
    async fn navigate_rejects_non_http_url() {
        let context = StaticContext::with_page(Arc::new(RecordingPage::new()));
        let err = definition()
            .call(&context, &serde_json::json!({"url": "file:///etc/passwd"}))
            .await
            .expect_err("file url rejected");
        assert!(err.to_string().contains("Only http/https URLs"));
    }

    #[tokio::test]
    async fn navigate_rejects_invalid_url() {
        let context = StaticContext::with_page(Arc::new(RecordingPage::new()));
        let err = definition()
            .call(&context, &serde_json::json!({"url": "not a url"}))
            .await
            .expect_err("invalid url rejected");
        assert!(err.to_string().contains("/url: Invalid URL"));
    }

    #[tokio::test]
    async fn navigate_code_stays_one_line_per_entry() {
        let context = StaticContext::with_page(Arc::new(RecordingPage::new()));
        let params = NavigateParams {
            url: "https://example.com/\nawait page.close();".to_string(),
        };

        let result = NavigateTool::new()
            .handle(&context, params)
            .await
            .expect("handle builds code");
        assert_eq!(result.code.len(), 2);
        assert!(result.code.iter().all(|line| !line.contains('\n')));
    }

    #[tokio::test]
    async fn navigate_describes_and_defers_goto() {
        let page = Arc::new(RecordingPage::new());
        let context = StaticContext::with_page(page.clone());

        let result = definition()
            .call(&context, &serde_json::json!({"url": "https://example.com/"}))
            .await
            .expect("valid navigation");
        assert_eq!(
            result.code,
            vec![
                "// Navigate to \"https://example.com/\"".to_string(),
                "await page.goto(\"https://example.com/\");".to_string(),
            ]
        );
        assert!(result.capture_snapshot);
        assert!(!result.wait_for_network);
        assert!(page.calls().is_empty());

        result.action.expect("goto action").run().await.expect("goto runs");
        assert_eq!(
            page.calls(),
            vec![PageCall::Goto("https://example.com/".to_string())]
        );
    }
}
