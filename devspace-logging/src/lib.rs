//! Tracing subscriber setup for the orchestration crates.
//!
//! Configuration comes from environment variables so that embedding services
//! control verbosity without a config file:
//!
//! - `LOG_LEVEL`: default directive when `RUST_LOG` is unset (default: `info`)
//! - `LOG_FORMAT`: `human` (default) or `json`

use std::env;

use tracing_subscriber::{prelude::*, registry, EnvFilter};

/// Initializes the global tracing subscriber based on environment variables.
///
/// Safe to call once per process; later calls are ignored (the global default
/// can only be set once).
pub fn init_subscriber() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "human".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let subscriber = registry().with(env_filter);
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    let result = if log_format == "json" {
        subscriber.with(fmt_layer.json()).try_init()
    } else {
        subscriber.with(fmt_layer.pretty()).try_init()
    };

    // A subscriber installed by the embedding process wins.
    let _ = result;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_does_not_panic() {
        init_subscriber();
        init_subscriber();
    }
}
