//! CLI entrypoint and subcommand orchestration.

mod config;
#[cfg(test)]
mod test_support;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use agent::{ToolDispatcher, ToolRegistry};
use clap::{Parser, Subcommand};
use config::Config;
use proto::{SessionId, ToolCall, ToolError};
use tools::ChromiumBrowser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEBUG_LOG_FILTER: &str = "debug,hyper_util=info,rustls=info,reqwest=info,tungstenite=info";

/// Top-level command-line arguments for the pagepilot application.
#[derive(Parser, Debug)]
#[command(name = "pagepilot")]
#[command(about = "Browser automation tool dispatcher", version = "0.1.0")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable debug logging to ~/.pagepilot/logs
    #[arg(long, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Print the exposed tool schemas as JSON
    Tools,
    /// Run a JSON-lines script of tool calls against a browser tab
    Run {
        /// Script file, or `-` for stdin
        script: PathBuf,

        /// URL to open before the first call
        #[arg(long)]
        url: Option<String>,

        /// Report actions without running them
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
}

impl Commands {
    fn label(&self) -> &'static str {
        match self {
            Commands::Tools => "tools",
            Commands::Run { .. } => "run",
        }
    }
}

/// Counts from one script run.
#[derive(Debug, Default, PartialEq, Eq)]
struct ScriptSummary {
    succeeded: usize,
    failed: usize,
}

#[tokio::main]
/// Program entrypoint.
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // WorkerGuard must outlive main() so buffered file writes are flushed on exit.
    let _file_guard = init_tracing(&cli.log_level, cli.debug);

    if cli.debug {
        info!(command = cli.command.label(), "pagepilot started");
    }

    let (config, registry) = prepare(cli.config.as_deref())?;

    match cli.command {
        Commands::Tools => {
            let schemas = registry.definitions(&config.tools.exposure());
            println!("{}", serde_json::to_string_pretty(&schemas)?);
            Ok(())
        }
        Commands::Run {
            script,
            url,
            dry_run,
        } => cmd_run(config, registry, &script, url.as_deref(), dry_run).await,
    }
}

/// Installs the console subscriber, plus a daily debug log when `debug` is set.
fn init_tracing(
    log_level: &str,
    debug: bool,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // Logs go to stderr so stdout carries only JSON output.
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    if !debug {
        tracing_subscriber::registry().with(console).init();
        return None;
    }

    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let log_dir = PathBuf::from(home).join(".pagepilot").join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let appender = tracing_appender::rolling::daily(&log_dir, "debug.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new(DEBUG_LOG_FILTER));
    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .init();
    Some(guard)
}

/// Loads configuration and registers the built-in tools.
fn prepare(config_path: Option<&Path>) -> proto::Result<(Config, ToolRegistry)> {
    let config = Config::load(config_path)?;
    let registry = build_registry()?;
    Ok((config, registry))
}

/// Registers every built-in tool.
fn build_registry() -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(tools::builtin_tools()?)?;
    debug!(tools = registry.len(), "Tool registry ready");
    Ok(registry)
}

async fn cmd_run(
    mut config: Config,
    registry: ToolRegistry,
    script: &Path,
    url: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    if dry_run {
        config.tools.dry_run = true;
    }
    let script = read_script(script)?;

    let browser = Arc::new(ChromiumBrowser::launch(&config.browser.options()).await?);
    browser.open_tab(url.unwrap_or("about:blank")).await?;

    let dispatcher = ToolDispatcher::new(
        SessionId::new(),
        Arc::new(registry),
        browser.clone(),
        config.tools.dispatch_options(),
    );
    info!(
        session = %dispatcher.session_id(),
        dry_run = config.tools.dry_run,
        "Running script"
    );

    let mut stdout = std::io::stdout().lock();
    let summary = run_script(&dispatcher, &script, &mut stdout).await;

    if let Err(e) = browser.close().await {
        warn!("Failed to close browser: {e}");
    }

    let summary = summary?;
    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Script finished"
    );
    if summary.failed > 0 {
        anyhow::bail!(
            "{} of {} tool calls failed",
            summary.failed,
            summary.succeeded + summary.failed
        );
    }
    Ok(())
}

fn read_script(path: &Path) -> anyhow::Result<String> {
    let mut script = String::new();
    if path == Path::new("-") {
        std::io::stdin().read_to_string(&mut script)?;
    } else {
        script = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read script {}: {e}", path.display()))?;
    }
    Ok(script)
}

/// Dispatches each non-empty line of `script` in order, writing one JSON
/// object per call to `out`. A failed call does not stop the run.
async fn run_script(
    dispatcher: &ToolDispatcher,
    script: &str,
    out: &mut impl Write,
) -> anyhow::Result<ScriptSummary> {
    let mut summary = ScriptSummary::default();

    for (index, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let line_no = index + 1;

        let call: ToolCall = match serde_json::from_str(line) {
            Ok(call) => call,
            Err(e) => {
                error!(line = line_no, "Malformed tool call: {e}");
                let record = serde_json::json!({
                    "line": line_no,
                    "error": format!("malformed tool call: {e}"),
                });
                writeln!(out, "{record}")?;
                summary.failed += 1;
                continue;
            }
        };

        let record = match dispatcher.dispatch(&call.tool, &call.params).await {
            Ok(response) => {
                summary.succeeded += 1;
                serde_json::json!({
                    "line": line_no,
                    "id": call.id,
                    "response": response,
                })
            }
            Err(e) => {
                error!(line = line_no, tool = %call.tool, "Tool call failed: {e}");
                summary.failed += 1;
                let mut record = serde_json::json!({
                    "line": line_no,
                    "id": call.id,
                    "tool": call.tool,
                    "error": e.to_string(),
                    "recoverable": e.is_recoverable(),
                });
                if let ToolError::Validation { issues, .. } = &e {
                    record["issues"] = serde_json::to_value(issues)?;
                }
                record
            }
        };
        writeln!(out, "{record}")?;
    }

    Ok(summary)
}
