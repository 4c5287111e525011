//! Tracing subscriber setup for binaries and tests embedding the crate

use anyhow::anyhow;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install a global `fmt` subscriber filtered by `level`.
///
/// `level` is an `EnvFilter` directive such as `info` or
/// `lineage_graph=debug,warn`. Fails if a global subscriber is already set.
pub fn init_logging(level: &str) -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_new(level).map_err(|e| anyhow!("Invalid log level: {e}"))?)
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|_| anyhow!("Logging already initialized"))
}

/// [`init_logging`] with the `[logging]` section of the configuration
pub fn init_from_config(config: &LoggingConfig) -> anyhow::Result<()> {
    init_logging(&config.level)
}
