//! Logging setup
//!
//! The library only emits `tracing` events; binaries and tests call one of
//! the initializers here to install a subscriber. `RUST_LOG` takes
//! precedence over the supplied default filter.
//!
//! ```no_run
//! postkit_infra::observability::init_tracing("postkit=info");
//! ```

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Default filter used when neither `RUST_LOG` nor a caller filter is set
pub const DEFAULT_FILTER: &str = "info";

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a human-readable subscriber
///
/// Returns `false` when a global subscriber was already installed, so
/// repeated calls are harmless.
pub fn init_tracing(default_filter: &str) -> bool {
    Registry::default()
        .with(env_filter(default_filter))
        .with(fmt::layer().with_target(true))
        .try_init()
        .is_ok()
}

/// Install a JSON subscriber with span context on every line
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_json_tracing(default_filter: &str) -> bool {
    Registry::default()
        .with(env_filter(default_filter))
        .with(fmt::layer().json().with_current_span(true).with_span_list(false))
        .try_init()
        .is_ok()
}
