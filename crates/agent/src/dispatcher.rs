//! Per-session tool dispatch and post-execution orchestration.
//!
//! One dispatcher serves one session. Calls are serialized so two actions
//! never interleave on the same tab; separate sessions run independently and
//! share only the immutable registry.

use std::sync::Arc;
use std::time::Duration;

use proto::{SessionId, ToolError, ToolResponse};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tools::{Context, ToolResult};
use tracing::{debug, warn};

use crate::tool_registry::{ExposureFilter, ToolRegistry};

const DEFAULT_ACTION_TIMEOUT_SECS: u64 = 15;
const MAX_ACTION_TIMEOUT_SECS: u64 = 60;
const DEFAULT_NETWORK_SETTLE_SECS: u64 = 5;

/// Clamps a configured action timeout into the supported range.
pub fn action_timeout(timeout_secs: Option<u64>) -> Duration {
    Duration::from_secs(
        timeout_secs
            .unwrap_or(DEFAULT_ACTION_TIMEOUT_SECS)
            .clamp(1, MAX_ACTION_TIMEOUT_SECS),
    )
}

/// Dispatch behavior for one session.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Tools offered to the caller.
    pub exposure: ExposureFilter,
    /// Build and report results without running actions.
    pub dry_run: bool,
    /// Upper bound on a single action.
    pub action_timeout: Duration,
    /// Upper bound on the post-action network settle wait.
    pub network_settle_timeout: Duration,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            exposure: ExposureFilter::all(),
            dry_run: false,
            action_timeout: action_timeout(None),
            network_settle_timeout: Duration::from_secs(DEFAULT_NETWORK_SETTLE_SECS),
        }
    }
}

/// Runs tool calls for a single session, one at a time.
pub struct ToolDispatcher {
    session_id: SessionId,
    registry: Arc<ToolRegistry>,
    context: Arc<dyn Context>,
    options: DispatchOptions,
    in_flight: Mutex<()>,
}

impl ToolDispatcher {
    pub fn new(
        session_id: SessionId,
        registry: Arc<ToolRegistry>,
        context: Arc<dyn Context>,
        options: DispatchOptions,
    ) -> Self {
        Self {
            session_id,
            registry,
            context,
            options,
            in_flight: Mutex::new(()),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Validates, handles, and executes one tool call.
    ///
    /// A `Timeout` means the side effect may or may not have been applied.
    pub async fn dispatch(
        &self,
        name: &str,
        raw_params: &serde_json::Value,
    ) -> Result<ToolResponse, ToolError> {
        let _turn = self.in_flight.lock().await;

        let definition = self.registry.lookup(name)?;
        if !self.options.exposure.allows(definition) {
            return Err(ToolError::NotFound(name.to_string()));
        }

        debug!(session = %self.session_id, tool = name, "Dispatching tool call");
        let ToolResult {
            code,
            action,
            capture_snapshot,
            wait_for_network,
        } = definition.call(self.context.as_ref(), raw_params).await?;

        for line in &code {
            debug!(session = %self.session_id, tool = name, "{line}");
        }

        let mut response = ToolResponse {
            tool_name: name.to_string(),
            code,
            executed: false,
            snapshot: None,
        };

        if self.options.dry_run {
            debug!(session = %self.session_id, tool = name, "Dry run, action skipped");
            return Ok(response);
        }

        if let Some(action) = action {
            match timeout(self.options.action_timeout, action.run()).await {
                Ok(result) => result?,
                Err(_) => {
                    warn!(
                        session = %self.session_id,
                        tool = name,
                        "Action timed out; completion state unknown"
                    );
                    return Err(ToolError::Timeout(
                        self.options.action_timeout.as_millis() as u64,
                    ));
                }
            }
            response.executed = true;
        }

        if wait_for_network || capture_snapshot {
            let tab = self.context.current_tab_or_die()?;
            if wait_for_network {
                tab.page()
                    .wait_for_network_idle(self.options.network_settle_timeout)
                    .await?;
            }
            if capture_snapshot {
                response.snapshot = Some(tab.page().snapshot().await?);
            }
        }

        Ok(response)
    }
}
