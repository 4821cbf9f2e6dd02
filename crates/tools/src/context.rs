//! Browser context seams consumed by tools.
//!
//! Tools never own tab lifecycle: they ask the context for the current tab
//! and drive its page.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use proto::{PageSnapshot, ToolError};

/// Driver operations available on a live page.
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigates to `url` and waits for the load event.
    async fn goto(&self, url: &str) -> Result<(), ToolError>;
    /// Clicks the first element matching `selector`.
    async fn click(&self, selector: &str) -> Result<(), ToolError>;
    /// Replaces the value of the element matching `selector` with `text`.
    async fn fill(&self, selector: &str, text: &str) -> Result<(), ToolError>;
    /// Presses `key` while the element matching `selector` is focused.
    async fn press(&self, selector: &str, key: &str) -> Result<(), ToolError>;
    /// Dispatches a mouse wheel event at the current pointer position.
    async fn mouse_wheel(&self, delta_x: f64, delta_y: f64) -> Result<(), ToolError>;
    /// Captures observable page state.
    async fn snapshot(&self) -> Result<PageSnapshot, ToolError>;
    /// Waits up to `timeout` for in-flight network activity to settle.
    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<(), ToolError>;
}

/// Handle to an attached browser tab.
#[derive(Clone)]
pub struct Tab {
    page: Arc<dyn Page>,
}

impl Tab {
    pub fn new(page: Arc<dyn Page>) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Arc<dyn Page> {
        &self.page
    }
}

impl std::fmt::Debug for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Tab(..)")
    }
}

/// Session-level browser state a tool runs against.
pub trait Context: Send + Sync {
    /// Returns the focused tab, or `ToolError::NoActiveTab` when none is attached.
    fn current_tab_or_die(&self) -> Result<Tab, ToolError>;
}
