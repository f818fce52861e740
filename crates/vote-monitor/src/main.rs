//! Redundant Sensor Vote Monitor - Main Entry Point
//!
//! Usage: `vote-monitor [settings.toml]`

use std::path::PathBuf;

use tracing::{info, warn};
use vote_monitor::{init_logging, shutdown_on, Monitor, OutputFormat, Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = Settings::load(path.as_deref())?;
    init_logging(&settings.log_level, settings.log_format)?;

    info!("=== Vote Monitor v{} ===", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &path {
        info!("Settings loaded from {}", path.display());
    }

    let mut monitor = Monitor::new(&settings)?;
    let output = settings.output;

    let ran = monitor
        .run(
            settings.tick_budget(),
            settings.tick_interval(),
            shutdown_on(tokio::signal::ctrl_c()),
            |record| match output {
                OutputFormat::Log => record.log(),
                OutputFormat::Json => match record.to_json_line() {
                    Ok(line) => println!("{}", line),
                    Err(e) => warn!("Dropping tick {}: {}", record.tick, e),
                },
            },
        )
        .await;

    match monitor.trusted_ratio() {
        Some(ratio) => info!(
            "Ran {} ticks, quorum trusted on {:.0}% of the last {}",
            ran,
            ratio * 100.0,
            monitor.history().len()
        ),
        None => info!("Ran {} ticks", ran),
    }

    Ok(())
}
