//! # Observability
//!
//! Centralized logging layer for the mentor portal workspace.
//!
//! Binaries call [`init_with_config`] once at startup and use the standard
//! `tracing` macros everywhere else. Library crates never install a
//! subscriber of their own.
//!
//! Every process appends structured JSONL to one central file
//! (`~/.mentor-portal/logs/portal.jsonl` by default), so
//! `tail -f ~/.mentor-portal/logs/portal.jsonl | jq` follows all of them.
//! Field values that look like credentials are redacted before they are
//! written.
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init_with_config(observability::LogConfig {
//!         service_name: "cli".into(),
//!         default_level: "debug".into(),
//!         also_stderr: true,
//!         ..Default::default()
//!     });
//!     tracing::info!("ready");
//! }
//! ```

mod file;
mod json_layer;
mod redact;

use std::path::PathBuf;

pub use json_layer::PortalLogLine;
pub use redact::{is_sensitive_key, scrub, scrub_message, REDACTED};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service (e.g., "cli").
    /// Included in every log line for filtering.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// Optional custom log file path.
    /// Defaults to `~/.mentor-portal/logs/portal.jsonl`.
    pub log_path: Option<PathBuf>,

    /// Also emit logs to stderr for immediate feedback.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Initialize the observability layer with default settings.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Initialize the observability layer with custom configuration.
///
/// Falls back to a compact stderr subscriber when the central log file
/// cannot be opened, so a read-only home directory never stops a binary
/// from starting.
pub fn init_with_config(config: LogConfig) {
    if let Err(e) = file::init_file_subscriber(&config) {
        use tracing_subscriber::util::SubscriberInitExt;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.default_level)),
            )
            .with_target(true)
            .compact()
            .with_writer(std::io::stderr)
            .finish()
            .try_init();
        tracing::warn!(error = %e, "central log file unavailable, logging to stderr");
    }
}

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export Level for advanced filtering.
pub use tracing::Level;
