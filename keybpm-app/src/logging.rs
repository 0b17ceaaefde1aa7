//! Logging setup
//!
//! Logs go to stderr alongside the JSON diagnostics, so they are off unless
//! `RUST_LOG` asks for them.

use std::panic;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
pub fn init() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))
}

/// Route panic messages to tracing instead of raw stderr
///
/// The run boundary reports the panic as a JSON error record.
pub fn install_panic_hook() {
    panic::set_hook(Box::new(|info| {
        tracing::error!(%info, "panic during analysis");
    }));
}
