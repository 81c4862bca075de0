//! # Tracing setup
//!
//! The manager logs through `tracing`: `debug` for register / unregister /
//! preload hits, `info` for sweep and clear counts, `error` for failed
//! loads. Sweeps and clears run inside `resources.dispose_unused` and
//! `resources.clear` spans.
//!
//! Enable the `profiling` feature to get a ready-made subscriber:
//!
//! ```toml
//! [dependencies]
//! ar_resources = { version = "0.1", features = ["profiling"] }
//! ```
//!
//! ```ignore
//! ar_resources::profiling::init_tracing();
//! ```
//!
//! Use `RUST_LOG=ar_resources=debug` to see per-entry events.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "ar_resources=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a human-readable global subscriber.
///
/// Returns false if a global subscriber was already set.
pub fn init_tracing() -> bool {
    let subscriber = Registry::default().with(env_filter()).with(fmt::layer());
    tracing::subscriber::set_global_default(subscriber).is_ok()
}

/// Install a JSON-lines global subscriber, for log shipping.
pub fn init_json_tracing() -> bool {
    let subscriber = Registry::default()
        .with(env_filter())
        .with(fmt::layer().json());
    tracing::subscriber::set_global_default(subscriber).is_ok()
}
