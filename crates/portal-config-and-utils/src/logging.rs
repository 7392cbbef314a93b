//! Logging initialization for portal binaries.
//!
//! Thin wrapper over the observability crate so every binary logs to the
//! same JSONL stream with the same service naming.

use crate::Paths;
use observability::LogConfig;

/// Initialize logging for a portal binary.
///
/// * `service_name` - included in every log line (e.g. "cli")
/// * `level` - default filter; `RUST_LOG` overrides it
/// * `also_stderr` - mirror log lines to stderr
pub fn init_logging(service_name: &str, level: &str, also_stderr: bool) {
    let log_path = Paths::new().ok().map(|paths| paths.log_file());

    observability::init_with_config(LogConfig {
        service_name: service_name.into(),
        default_level: level.into(),
        log_path,
        also_stderr,
    });
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
