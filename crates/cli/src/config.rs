use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use agent::{DispatchOptions, ExposureFilter, action_timeout};
use proto::{Capability, ConfigError};
use serde::{Deserialize, Serialize};
use tools::BrowserOptions;
use tracing::debug;

const DEFAULT_NETWORK_SETTLE_SECS: u64 = 5;

/// Top-level CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Browser launch configuration.
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Tool exposure and dispatch configuration.
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Browser launch config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrowserConfig {
    /// Run Chromium without a window.
    #[serde(default = "default_true")]
    pub headless: bool,
    /// Chrome/Chromium executable; autodetected when unset.
    #[serde(default)]
    pub executable: Option<PathBuf>,
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

impl BrowserConfig {
    pub fn options(&self) -> BrowserOptions {
        BrowserOptions {
            headless: self.headless,
            executable: self.executable.clone(),
            viewport_width: self.viewport_width,
            viewport_height: self.viewport_height,
        }
    }
}

/// Tool exposure and dispatch config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolsConfig {
    /// Capability groups to expose; every group when unset.
    #[serde(default)]
    pub capabilities: Option<Vec<Capability>>,
    /// Only expose read-only tools.
    #[serde(default)]
    pub read_only: bool,
    /// Report actions without running them.
    #[serde(default)]
    pub dry_run: bool,
    /// Action timeout in seconds (clamped to 1..=60).
    #[serde(default)]
    pub action_timeout_secs: Option<u64>,
    /// Post-action network settle timeout in seconds.
    #[serde(default = "default_network_settle_secs")]
    pub network_settle_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            capabilities: None,
            read_only: false,
            dry_run: false,
            action_timeout_secs: None,
            network_settle_timeout_secs: default_network_settle_secs(),
        }
    }
}

impl ToolsConfig {
    pub fn exposure(&self) -> ExposureFilter {
        ExposureFilter {
            capabilities: self
                .capabilities
                .as_ref()
                .map(|list| list.iter().copied().collect::<HashSet<_>>()),
            read_only: self.read_only,
        }
    }

    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            exposure: self.exposure(),
            dry_run: self.dry_run,
            action_timeout: action_timeout(self.action_timeout_secs),
            network_settle_timeout: Duration::from_secs(self.network_settle_timeout_secs),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_viewport_height() -> u32 {
    720
}

fn default_network_settle_secs() -> u64 {
    DEFAULT_NETWORK_SETTLE_SECS
}

fn parse_bool(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

fn parse_capabilities(value: &str) -> Result<Vec<Capability>, ConfigError> {
    value
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse)
        .collect()
}

impl Config {
    /// Loads configuration from explicit path, fallback locations, and env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path.map(|p| p.to_path_buf()).or_else(|| {
            // Look in current dir, then home dir
            let cwd = std::env::current_dir().ok()?.join("config.toml");
            if cwd.exists() {
                return Some(cwd);
            }
            let home = std::env::var("HOME").ok()?;
            let home_config = PathBuf::from(home).join(".pagepilot").join("config.toml");
            if home_config.exists() {
                return Some(home_config);
            }
            None
        });
        debug!(path = ?config_path, "Config file resolved");

        let mut config = if let Some(path) = config_path {
            let content = std::fs::read_to_string(&path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(|e| ConfigError::Toml(e.to_string()))?
        } else {
            Config::default()
        };

        config.apply_env()?;

        debug!(
            headless = config.browser.headless,
            capabilities = ?config.tools.capabilities,
            read_only = config.tools.read_only,
            dry_run = config.tools.dry_run,
            "Config loaded"
        );
        Ok(config)
    }

    /// Environment variable overrides (highest priority).
    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = std::env::var("PAGEPILOT_HEADLESS") {
            self.browser.headless = parse_bool("PAGEPILOT_HEADLESS", &value)?;
        }
        if let Ok(path) = std::env::var("PAGEPILOT_CHROME")
            && !path.trim().is_empty()
        {
            self.browser.executable = Some(PathBuf::from(path));
        }
        if let Ok(value) = std::env::var("PAGEPILOT_CAPABILITIES") {
            self.tools.capabilities = Some(parse_capabilities(&value)?);
        }
        if let Ok(value) = std::env::var("PAGEPILOT_READ_ONLY") {
            self.tools.read_only = parse_bool("PAGEPILOT_READ_ONLY", &value)?;
        }
        if let Ok(value) = std::env::var("PAGEPILOT_DRY_RUN") {
            self.tools.dry_run = parse_bool("PAGEPILOT_DRY_RUN", &value)?;
        }
        Ok(())
    }
}
