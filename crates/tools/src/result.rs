//! Result descriptor returned by a tool's `handle`.

use std::future::Future;

use futures_util::future::BoxFuture;
use proto::ToolError;

type ActionFn = Box<dyn FnOnce() -> BoxFuture<'static, Result<(), ToolError>> + Send>;

/// Deferred side effect of a tool. Consumed when run, so it runs at most once.
pub struct ToolAction(ActionFn);

impl ToolAction {
    pub fn new<F, Fut>(action: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), ToolError>> + Send + 'static,
    {
        Self(Box::new(move || Box::pin(action())))
    }

    /// Performs the side effect.
    pub async fn run(self) -> Result<(), ToolError> {
        (self.0)().await
    }
}

impl std::fmt::Debug for ToolAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ToolAction(..)")
    }
}

/// What a tool hands back to the dispatcher.
#[derive(Debug)]
pub struct ToolResult {
    /// Pseudo-script lines for audit/replay. Never executed.
    pub code: Vec<String>,
    /// Side effect to run; `None` when the tool's effect already happened.
    pub action: Option<ToolAction>,
    /// Re-capture page state after the action.
    pub capture_snapshot: bool,
    /// Let in-flight network requests settle after the action.
    pub wait_for_network: bool,
}

impl ToolResult {
    /// Result with no action and no follow-up work.
    pub fn advisory(code: Vec<String>) -> Self {
        Self {
            code,
            action: None,
            capture_snapshot: false,
            wait_for_network: false,
        }
    }
}
