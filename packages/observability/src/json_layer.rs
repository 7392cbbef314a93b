//! JSONL layer for the portal log file.
//!
//! Each event becomes one line of
//! `{timestamp, level, service, pid, target, message, fields}`.
//! Field values pass through [`redact::scrub`] as they are recorded, so a
//! credential never exists in the line being built.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::io::Write;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::redact;

/// One line of the portal log.
#[derive(Debug, Serialize)]
pub struct PortalLogLine<'a> {
    pub timestamp: String,
    pub level: &'static str,
    pub service: &'a str,
    pub pid: u32,
    pub target: &'a str,
    pub message: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
}

/// Collects the message and scrubbed fields of one event.
#[derive(Default)]
struct ScrubbingVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl ScrubbingVisitor {
    fn put(&mut self, field: &Field, value: Value) {
        match (field.name(), value) {
            ("message", Value::String(text)) => self.message = Some(redact::scrub_message(&text)),
            (name, value) => {
                self.fields
                    .insert(name.to_string(), redact::scrub(name, value));
            }
        }
    }
}

impl Visit for ScrubbingVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, Value::String(format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Value::String(value.to_string()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        let value = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string()));
        self.put(field, value);
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.put(field, Value::String(value.to_string()));
    }
}

/// Writes scrubbed portal log lines to `make_writer`.
pub struct JsonLayer<W> {
    service_name: String,
    pid: u32,
    make_writer: W,
}

impl<W> JsonLayer<W> {
    pub fn new(service_name: String, make_writer: W) -> Self {
        Self {
            service_name,
            pid: std::process::id(),
            make_writer,
        }
    }

    fn line<'a>(&'a self, event: &'a Event<'_>) -> PortalLogLine<'a> {
        let mut visitor = ScrubbingVisitor::default();
        event.record(&mut visitor);
        let metadata = event.metadata();

        PortalLogLine {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            level: metadata.level().as_str(),
            service: &self.service_name,
            pid: self.pid,
            target: metadata.target(),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
        }
    }
}

impl<S, W> Layer<S> for JsonLayer<W>
where
    S: Subscriber,
    W: for<'writer> MakeWriter<'writer> + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if let Ok(json) = serde_json::to_string(&self.line(event)) {
            let mut writer = self.make_writer.make_writer();
            let _ = writeln!(writer, "{}", json);
        }
    }
}
