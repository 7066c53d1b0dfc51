//! Process-wide `tracing` subscriber for the binary.
//!
//! Logs go to stderr so stdout stays reserved for reports and plots.

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::error::AppError;

/// Install the global subscriber: INFO by default, DEBUG with `--verbose`.
pub fn init(verbose: bool) -> Result<(), AppError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::new(2, format!("Failed to install log subscriber: {e}")))
}

fn level(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::INFO }
}
