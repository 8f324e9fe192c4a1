//! Fabric MCP Server Entry Point
//!
//! Initializes logging, loads configuration, assembles the merged server and
//! runs it on the configured transport until shutdown.

use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use fabric_mcp_server::core::config::LoggingConfig;
use fabric_mcp_server::core::{Config, McpServer, TransportService};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging first, so configuration warnings are not dropped
    init_logging(&LoggingConfig::from_env().level);

    let config = Config::from_env();

    info!(
        "Starting {} v{} ({} mode)",
        config.server.name, config.server.version, config.environment
    );
    info!("Transport: {}", config.transport.description());

    let transport = TransportService::new(config.transport.clone());

    // Registration completes before the transport accepts anything
    let server = McpServer::build(config)?;

    transport.run(server.clone()).await?;

    server.on_shutdown();

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Logs go to stderr so the STDIO transport keeps stdout for protocol frames.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" | "critical" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
