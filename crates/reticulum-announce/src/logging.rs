//! Tracing subscriber configuration for announce ingestion.
//!
//! Log levels follow these conventions:
//! - WARN: collaborator panics, failed outer notifications
//! - INFO: handler registration
//! - DEBUG: each queued announce
//! - TRACE: capability extraction outcomes

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSection;

/// `RUST_LOG` if set, otherwise `level`.
fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the tracing subscriber at `info`.
///
/// Log level can be controlled via the `RUST_LOG` environment variable.
pub fn init() {
    init_with_level("info");
}

/// Initialize the tracing subscriber at the given default level.
pub fn init_with_level(level: &str) {
    tracing_subscriber::fmt().with_env_filter(filter(level)).init();
}

/// Initialize the tracing subscriber with JSON output.
pub fn init_json(level: &str) {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter(level))
        .init();
}

/// Initialize from the `[logging]` config section.
pub fn init_from_config(section: &LoggingSection) {
    if section.json {
        init_json(&section.level);
    } else {
        init_with_level(&section.level);
    }
}

/// Initialize the tracing subscriber for tests.
///
/// Uses `try_init` to avoid panicking if called multiple times.
pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter("debug"))
        .with_test_writer()
        .try_init();
}
