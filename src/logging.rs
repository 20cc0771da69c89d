//! Logging setup.
//!
//! Diagnostics go to stderr through `tracing`, so stdout stays reserved for
//! command output. The filter is read from `ROSTER_LOG` (same syntax as
//! `RUST_LOG`); without it the level is `warn`, or `debug` with `-v`.

use crate::{Error, Result};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "ROSTER_LOG";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Build the filter from `ROSTER_LOG`, falling back to the verbosity default.
pub fn build_env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "roster=debug" } else { "warn" })
    })
}

/// Install the global subscriber.
pub fn init_logging(format: LogFormat, verbose: bool) -> Result<()> {
    let base_subscriber = Registry::default().with(build_env_filter(verbose));

    let result = match format {
        LogFormat::Json => base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => base_subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| Error::Other(format!("Failed to initialize logging: {}", e)))
}
