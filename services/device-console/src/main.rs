//! Device Console CLI
//!
//! Command-line entry point for the IoT device monitoring dashboard.

use std::path::PathBuf;

use clap::Parser;
use device_console::{load_config, Config, ConsoleBuilder};
use tracing::Level;

#[derive(Parser)]
#[command(name = "device-console")]
#[command(about = "IoT device monitoring dashboard with simulated telemetry")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dashboard port (overrides config file)
    #[arg(long)]
    dashboard_port: Option<u16>,

    /// Seed for the synthetic data source (overrides config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, dashboard_port={:?}, seed={:?}, log_level={:?}",
        args.config,
        args.dashboard_port,
        args.seed,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(dashboard_port) = args.dashboard_port {
        config.dashboard.port = dashboard_port;
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
    }

    tracing::info!("Starting device console");
    tracing::debug!(
        "Devices: {}, telemetry every {}s, self-test every {}s",
        config.devices.len(),
        config.simulation.telemetry_interval_seconds,
        config.simulation.self_test_interval_seconds
    );

    ConsoleBuilder::new(config).build().await?.start().await?;

    Ok(())
}
