//! Structured logging setup.

use crate::config::TrackerConfig;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global `tracing` subscriber described by `config`.
///
/// `RUST_LOG`, when set, takes precedence over the configured filter.
/// Returns `false` when a global subscriber was already installed, which
/// makes repeated calls (for example from several tests) harmless.
#[must_use]
pub fn init_tracing(config: &TrackerConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));
    let builder = fmt().with_env_filter(filter).with_target(false);

    let installed = if config.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.is_ok()
}
