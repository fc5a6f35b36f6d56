//! Tracing subscriber setup
//!
//! The library only emits `tracing` events; embedders (or tests) install a
//! subscriber once with [`init`].

use crate::config::TreeConfig;
use tracing_subscriber::EnvFilter;

/// Install a formatted subscriber.
///
/// `RUST_LOG` wins over `TreeConfig::log_filter`. Returns `false` when a
/// global subscriber was already installed.
pub fn init(config: &TreeConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
