//! Redundant Sensor Vote Monitor
//!
//! Drives a simulated sensor group on a fixed period and feeds every tick to
//! both voters, keeping a bounded history of the results.

mod error;
mod history;
mod logging;
mod monitor;
mod settings;
mod status;

pub use error::MonitorError;
pub use history::History;
pub use logging::init_logging;
pub use monitor::{shutdown_on, Monitor, TickRecord};
pub use settings::{LogFormat, OutputFormat, QuorumFallback, Settings};
pub use status::status_line;
