//! Structured logging.
//!
//! `RUST_LOG` wins over the configured level so a single run can be made
//! noisier without touching the config file.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
pub fn init(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(log_level));

    // A subscriber may already be installed (tests, embedding applications).
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

fn default_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(format!("context_dispatch={log_level},tower_http={log_level}"))
        .unwrap_or_else(|_| "context_dispatch=debug,tower_http=debug".into())
}
