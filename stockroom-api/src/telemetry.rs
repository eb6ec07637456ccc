//! Tracing initialization.
//!
//! Structured logging via `tracing-subscriber`, filtered by `RUST_LOG`
//! with an info-level default. Set `STOCKROOM_LOG_JSON=true` for
//! newline-delimited JSON output (log collectors); the default is the
//! human-readable fmt layer.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// Idempotent enough for tests: a second call fails quietly instead of
/// panicking.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockroom_api=debug"));

    let json = std::env::var("STOCKROOM_LOG_JSON")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false);

    let builder = fmt().with_env_filter(filter).with_target(true);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("tracing subscriber already initialized: {e}");
    }
}
