//! icmpmonitor binary entry point.
//!
//! Monitors hosts via ICMP echo and runs operator-supplied commands
//! when a host's reachability changes. Core functionality lives in the
//! `monitor` library crate.

mod config;

use clap::Parser;
use config::Config;
use monitor::registry::HostRegistry;
use monitor::{Monitor, MonitorOptions, ShellRunner};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Monitor hosts via ICMP echo and run commands on state transitions
#[derive(Parser, Debug)]
#[command(name = "icmpmonitor", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short = 'f', long, default_value = "icmpmonitor.yaml")]
    config: PathBuf,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Repeat the down command on every tick while a host stays down
    #[arg(short, long)]
    repeat: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;

    let default_level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_deref().unwrap_or("info")
    };
    match config.logging.format.as_deref() {
        Some("json") => common::logging::init_json(default_level),
        _ => common::logging::init(default_level),
    }

    info!(config = %cli.config.display(), "icmpmonitor starting");

    let registry = HostRegistry::init(&config.hosts).await?;
    let options = MonitorOptions {
        repeat_down_command: cli.repeat,
    };
    let monitor = Monitor::new(registry, Arc::new(ShellRunner), options);

    // In-flight probes and timers are simply abandoned on shutdown;
    // there is no state to drain.
    tokio::select! {
        _ = monitor.run() => {}
        _ = shutdown_signal() => {
            info!("shutdown signal received, exiting");
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received Ctrl+C signal");
        }
        _ = terminate => {
            info!("received terminate signal");
        }
    }
}
