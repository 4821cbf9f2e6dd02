//! In-memory browser backend for tests.
//!
//! `RecordingPage` records every driver call instead of touching a browser;
//! `StaticContext` hands out a tab that can be attached or detached.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use proto::{PageSnapshot, ToolError};

use crate::{Context, Page, Tab};

/// A driver call observed by `RecordingPage`.
#[derive(Debug, Clone, PartialEq)]
pub enum PageCall {
    Goto(String),
    Click(String),
    Fill { selector: String, text: String },
    Press { selector: String, key: String },
    MouseWheel { delta_x: f64, delta_y: f64 },
    Snapshot,
    WaitForNetworkIdle(Duration),
}

/// Page double that records calls.
pub struct RecordingPage {
    calls: Mutex<Vec<PageCall>>,
    url: Mutex<String>,
    action_delay: Mutex<Option<Duration>>,
    failure: Mutex<Option<String>>,
}

impl RecordingPage {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            url: Mutex::new("about:blank".to_string()),
            action_delay: Mutex::new(None),
            failure: Mutex::new(None),
        }
    }

    /// Recorded calls, oldest first.
    pub fn calls(&self) -> Vec<PageCall> {
        self.calls.lock().clone()
    }

    /// Makes every input action sleep for `delay` after recording it.
    pub fn set_action_delay(&self, delay: Duration) {
        *self.action_delay.lock() = Some(delay);
    }

    /// Makes every input action fail with `message` after recording it.
    pub fn fail_actions(&self, message: impl Into<String>) {
        *self.failure.lock() = Some(message.into());
    }

    async fn record_action(&self, call: PageCall) -> Result<(), ToolError> {
        self.calls.lock().push(call);
        let delay = *self.action_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.failure.lock().clone() {
            Some(message) => Err(ToolError::ExecutionFailed(message)),
            None => Ok(()),
        }
    }
}

impl Default for RecordingPage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Page for RecordingPage {
    async fn goto(&self, url: &str) -> Result<(), ToolError> {
        self.record_action(PageCall::Goto(url.to_string())).await?;
        *self.url.lock() = url.to_string();
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), ToolError> {
        self.record_action(PageCall::Click(selector.to_string()))
            .await
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<(), ToolError> {
        self.record_action(PageCall::Fill {
            selector: selector.to_string(),
            text: text.to_string(),
        })
        .await
    }

    async fn press(&self, selector: &str, key: &str) -> Result<(), ToolError> {
        self.record_action(PageCall::Press {
            selector: selector.to_string(),
            key: key.to_string(),
        })
        .await
    }

    async fn mouse_wheel(&self, delta_x: f64, delta_y: f64) -> Result<(), ToolError> {
        self.record_action(PageCall::MouseWheel { delta_x, delta_y })
            .await
    }

    async fn snapshot(&self) -> Result<PageSnapshot, ToolError> {
        self.calls.lock().push(PageCall::Snapshot);
        Ok(PageSnapshot {
            url: self.url.lock().clone(),
            title: Some("Recorded page".to_string()),
        })
    }

    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<(), ToolError> {
        self.calls.lock().push(PageCall::WaitForNetworkIdle(timeout));
        Ok(())
    }
}

/// Context with an optional attached tab.
pub struct StaticContext {
    tab: RwLock<Option<Tab>>,
}

impl StaticContext {
    /// Context with `page` attached as the current tab.
    pub fn with_page(page: Arc<dyn Page>) -> Self {
        Self {
            tab: RwLock::new(Some(Tab::new(page))),
        }
    }

    /// Context with no tab attached.
    pub fn detached() -> Self {
        Self {
            tab: RwLock::new(None),
        }
    }

    pub fn attach(&self, page: Arc<dyn Page>) {
        *self.tab.write() = Some(Tab::new(page));
    }

    pub fn detach(&self) {
        *self.tab.write() = None;
    }
}

impl Context for StaticContext {
    fn current_tab_or_die(&self) -> Result<Tab, ToolError> {
        self.tab.read().clone().ok_or(ToolError::NoActiveTab)
    }
}
