//! Console logging through the tracing ecosystem.
//!
//! The library only emits `tracing` events; installing a subscriber is up to
//! the application. [`init_tracing`] installs a console subscriber whose
//! filter comes from `QUARRY_LOG`, then `RUST_LOG`, defaulting to `info`.
//!
//! ```bash
//! # Show every executed pipeline and write passthrough
//! export QUARRY_LOG=quarry=debug,quarry_memory=debug
//! ```

use std::io::IsTerminal;
use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Environment variable read first for the log filter.
pub const LOG_ENV: &str = "QUARRY_LOG";

/// Filter used when no environment variable is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Installs the console subscriber.
///
/// Safe to call more than once; only the first call has an effect, and an
/// already installed global subscriber is left in place.
pub fn init_tracing() {
    TRACING_INITIALIZED.get_or_init(|| {
        let log_level = get_log_level(|name| std::env::var(name).ok());

        // ANSI colors only on a terminal
        let use_ansi = IsTerminal::is_terminal(&std::io::stderr());

        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_ansi(use_ansi)
            .with_filter(EnvFilter::new(&log_level));

        let subscriber = tracing_subscriber::registry().with(console_layer);

        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - keeping it");
        } else {
            tracing::debug!(filter = %log_level, ansi_colors = use_ansi, "Console logging initialized");
        }
    });
}

/// Resolves the log filter from `QUARRY_LOG`, then `RUST_LOG`.
fn get_log_level<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(LOG_ENV)
        .or_else(|| lookup("RUST_LOG"))
        .map(|level| level.to_lowercase())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}
