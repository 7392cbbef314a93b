//! Central log file subscriber.
//!
//! Writes structured JSONL logs to a single file that can be tailed by
//! external tools. Multi-process safe via append-only semantics.

use crate::json_layer::JsonLayer;
use crate::LogConfig;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Central log file location: `~/.mentor-portal/logs/portal.jsonl`.
fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join(".mentor-portal")
            .join("logs")
            .join("portal.jsonl")
    })
}

/// File writer that appends to the central log file.
/// Flushes per write so concurrent processes see whole lines.
#[derive(Clone)]
pub struct CentralLogWriter {
    inner: Arc<Mutex<BufWriter<File>>>,
}

impl CentralLogWriter {
    pub fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            inner: Arc::new(Mutex::new(BufWriter::with_capacity(8192, file))),
        })
    }
}

impl io::Write for CentralLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.inner.lock();
        let result = guard.write(buf);
        guard.flush()?;
        result
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

/// MakeWriter implementation for tracing-subscriber
#[derive(Clone)]
pub struct WriterFactory {
    writer: CentralLogWriter,
}

impl<'a> MakeWriter<'a> for WriterFactory {
    type Writer = CentralLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer.clone()
    }
}

/// Install the JSONL file subscriber (plus optional stderr layer).
pub fn init_file_subscriber(config: &LogConfig) -> io::Result<()> {
    let log_path = match config.log_path.clone().or_else(default_log_path) {
        Some(path) => path,
        None => {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "could not determine home directory for log file",
            ))
        }
    };

    let writer = CentralLogWriter::new(&log_path)?;
    let json_layer = JsonLayer::new(config.service_name.clone(), WriterFactory { writer });

    let stderr_layer = if config.also_stderr {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .compact()
                .with_writer(io::stderr)
                .with_ansi(true),
        )
    } else {
        None
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    tracing_subscriber::registry()
        .with(json_layer.with_filter(env_filter))
        .with(stderr_layer.map(|l| {
            l.with_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(&config.default_level)),
            )
        }))
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e.to_string()))?;

    tracing::debug!(log_path = %log_path.display(), "observability initialized");
    Ok(())
}
