//! OneBot Gateway
//!
//! A small HTTP service whose diagnostic output is unified into one logging
//! pipeline.
//!
//! # Architecture Overview
//!
//! ```text
//!   tracing macros ──▶ SinkLayer ────────┐
//!   log macros ──────▶ InterceptAdapter ─┼──▶ Logger ──▶ SinkRegistry ──┬──▶ console
//!   captured stdout ─▶ StreamCapture ────┘                             ├──▶ log file
//!                                                                      └──▶ debug file (debug mode)
//! ```

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use onebot_gateway::capture_println;
use onebot_gateway::config::load_config;
use onebot_gateway::http::HttpServer;
use onebot_gateway::lifecycle::shutdown::trigger_on_ctrl_c;
use onebot_gateway::lifecycle::startup::{splash, version};
use onebot_gateway::lifecycle::Shutdown;
use onebot_gateway::logging::Bootstrap;

#[derive(Parser)]
#[command(name = "onebot-gateway")]
#[command(about = "OneBot gateway HTTP service", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "OBGW_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    splash(&mut io::stdout().lock(), &version())?;

    let config = load_config(cli.config.as_deref())?;

    let logging = Bootstrap::new(&config.logging).run()?;
    logging.install_tracing_subscriber()?;
    let stdout = logging.capture();

    tracing::info!(
        bind_address = %config.listener.bind_address,
        level = %config.logging.level,
        debug_mode = config.logging.debug_mode,
        capture_stdout = config.logging.capture_stdout,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    capture_println!(stdout, " * Running on http://{}", listener.local_addr()?);

    let shutdown = Arc::new(Shutdown::new());
    let signal = Arc::clone(&shutdown);
    tokio::spawn(async move { trigger_on_ctrl_c(&signal).await });

    let server = HttpServer::new();
    let result = server.run(listener, shutdown.wait()).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "HTTP server failed");
    }

    tracing::info!("Shutdown complete");
    logging.teardown();
    Ok(result?)
}
