//! halux daemon
//!
//! Exposes the states and scripts of this host to Home Assistant over MQTT

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use halux_core::Bridge;
use halux_exec::LocalExecutor;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod mqtt;

use config::Config;

const EVENT_BUFFER: usize = 256;

/// Home Assistant bridge for host states and scripts
#[derive(Parser, Debug)]
#[command(name = "halux", version, about)]
struct Args {
    /// Configuration file (.toml, .yml or .yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level, overridden by RUST_LOG
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    let (path, config) = Config::locate(args.config.as_deref())?;

    let level = args.log_level.as_deref().unwrap_or(&config.log.level);
    init_tracing(level, args.log_json)?;

    info!(config = %path.display(), "configuration loaded");
    let registry = config.registry()?;

    let states: Vec<&str> = registry.state_names().collect();
    let scripts: Vec<&str> = registry.script_names().collect();
    info!(states = ?states, scripts = ?scripts, "registry loaded");

    if args.check {
        info!("configuration is valid");
        return Ok(());
    }

    let (transport, eventloop) = mqtt::connect(&config.mqtt);
    let transport = Arc::new(transport);
    let bridge = Bridge::new(
        &registry,
        config.topics(),
        transport.clone(),
        Arc::new(LocalExecutor::new()),
    );

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let result = tokio::select! {
        result = mqtt::pump(eventloop, tx) => result,
        result = bridge.run(rx) => result.map_err(eyre::Report::from),
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, shutting down");
            Ok(())
        }
    };

    bridge.shutdown().await;
    transport.disconnect().await;

    result
}

fn init_tracing(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    Ok(())
}
