//! Chromium (CDP) backend for the browser context.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType,
};
use chromiumoxide::handler::viewport::Viewport;
use futures_util::StreamExt;
use parking_lot::{Mutex, RwLock};
use proto::{PageSnapshot, ToolError};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::{Context, Page, Tab};

const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;
const DEFAULT_VIEWPORT_HEIGHT: u32 = 720;

/// Browser launch options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserOptions {
    /// Run without a visible window.
    pub headless: bool,
    /// Explicit Chrome/Chromium executable; autodetected when `None`.
    pub executable: Option<PathBuf>,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl BrowserOptions {
    fn config(&self) -> Result<BrowserConfig, ToolError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .viewport(Viewport {
                width: self.viewport_width,
                height: self.viewport_height,
                device_scale_factor: Some(1.0),
                emulating_mobile: false,
                is_landscape: true,
                has_touch: false,
            });
        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        builder
            .build()
            .map_err(|e| ToolError::ExecutionFailed(format!("Failed to build browser config: {e}")))
    }
}

/// A launched browser plus the tab tools currently drive.
pub struct ChromiumBrowser {
    browser: tokio::sync::Mutex<Browser>,
    handler_task: JoinHandle<()>,
    current: RwLock<Option<Tab>>,
}

impl ChromiumBrowser {
    /// Launches a browser. No tab is attached until `open_tab`.
    pub async fn launch(options: &BrowserOptions) -> Result<Self, ToolError> {
        let config = options.config()?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("Failed to launch browser: {e}")))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("CDP handler error: {e}");
                }
            }
        });

        info!(headless = options.headless, "Browser launched");
        Ok(Self {
            browser: tokio::sync::Mutex::new(browser),
            handler_task,
            current: RwLock::new(None),
        })
    }

    /// Opens a new page at `url` and makes it the current tab.
    pub async fn open_tab(&self, url: &str) -> Result<Tab, ToolError> {
        let page = self
            .browser
            .lock()
            .await
            .new_page(url)
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("Failed to create page: {e}")))?;

        let tab = Tab::new(Arc::new(ChromiumPage::new(page)));
        *self.current.write() = Some(tab.clone());
        info!(url, "Tab attached");
        Ok(tab)
    }

    /// Closes the browser process.
    pub async fn close(&self) -> Result<(), ToolError> {
        self.current.write().take();
        self.browser
            .lock()
            .await
            .close()
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("Failed to close browser: {e}")))?;
        debug!("Browser closed");
        Ok(())
    }
}

impl Context for ChromiumBrowser {
    fn current_tab_or_die(&self) -> Result<Tab, ToolError> {
        self.current.read().clone().ok_or(ToolError::NoActiveTab)
    }
}

impl Drop for ChromiumBrowser {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

/// `Page` implementation over a chromiumoxide page.
pub struct ChromiumPage {
    page: chromiumoxide::Page,
    pointer: Mutex<(f64, f64)>,
}

impl ChromiumPage {
    pub fn new(page: chromiumoxide::Page) -> Self {
        Self {
            page,
            pointer: Mutex::new((0.0, 0.0)),
        }
    }
}

#[async_trait]
impl Page for ChromiumPage {
    async fn goto(&self, url: &str) -> Result<(), ToolError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("Navigation failed: {e}")))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), ToolError> {
        let element = self.page.find_element(selector).await.map_err(|e| {
            ToolError::ExecutionFailed(format!("Failed to find element '{selector}': {e}"))
        })?;

        let point = element.clickable_point().await.map_err(|e| {
            ToolError::ExecutionFailed(format!("Element '{selector}' is not clickable: {e}"))
        })?;

        element.click().await.map_err(|e| {
            ToolError::ExecutionFailed(format!("Failed to click element '{selector}': {e}"))
        })?;

        *self.pointer.lock() = (point.x, point.y);
        Ok(())
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<(), ToolError> {
        let element = self.page.find_element(selector).await.map_err(|e| {
            ToolError::ExecutionFailed(format!("Failed to find element '{selector}': {e}"))
        })?;

        element
            .call_js_fn("function() { this.focus(); this.value = ''; }", false)
            .await
            .map_err(|e| {
                ToolError::ExecutionFailed(format!("Failed to clear element '{selector}': {e}"))
            })?;

        element.type_str(text).await.map_err(|e| {
            ToolError::ExecutionFailed(format!("Failed to type into element '{selector}': {e}"))
        })?;
        Ok(())
    }

    async fn press(&self, selector: &str, key: &str) -> Result<(), ToolError> {
        let element = self.page.find_element(selector).await.map_err(|e| {
            ToolError::ExecutionFailed(format!("Failed to find element '{selector}': {e}"))
        })?;

        element.press_key(key).await.map_err(|e| {
            ToolError::ExecutionFailed(format!("Failed to press {key} on '{selector}': {e}"))
        })?;
        Ok(())
    }

    async fn mouse_wheel(&self, delta_x: f64, delta_y: f64) -> Result<(), ToolError> {
        let (x, y) = *self.pointer.lock();
        let params = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MouseWheel)
            .x(x)
            .y(y)
            .delta_x(delta_x)
            .delta_y(delta_y)
            .build()
            .map_err(|e| ToolError::ExecutionFailed(format!("Invalid wheel event: {e}")))?;

        self.page
            .execute(params)
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("Mouse wheel failed: {e}")))?;
        Ok(())
    }

    async fn snapshot(&self) -> Result<PageSnapshot, ToolError> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("Failed to read page URL: {e}")))?
            .unwrap_or_default();

        let title = self
            .page
            .get_title()
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("Failed to read page title: {e}")))?;

        Ok(PageSnapshot { url, title })
    }

    async fn wait_for_network_idle(&self, settle: Duration) -> Result<(), ToolError> {
        match timeout(settle, self.page.wait_for_navigation()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(ToolError::ExecutionFailed(format!(
                "Navigation wait failed: {e}"
            ))),
            Err(_) => {
                warn!(settle_ms = settle.as_millis() as u64, "Network did not settle in time");
                Ok(())
            }
        }
    }
}
