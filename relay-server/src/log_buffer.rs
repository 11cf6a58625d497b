use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::Subscriber;
use tracing_subscriber::Layer;

pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// A structured log entry as served by `/logs`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub fields: HashMap<String, JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_name: Option<String>,
}

/// Newest entry at the front
pub type LogBuffer = Arc<RwLock<VecDeque<LogEntry>>>;

pub fn create_log_buffer(capacity: usize) -> LogBuffer {
    Arc::new(RwLock::new(VecDeque::with_capacity(capacity)))
}

/// Tracing layer that mirrors events into a bounded in-memory buffer
pub struct LogBufferLayer {
    buffer: LogBuffer,
    capacity: usize,
}

impl LogBufferLayer {
    pub fn new(buffer: LogBuffer, capacity: usize) -> Self {
        Self { buffer, capacity }
    }
}

impl<S> Layer<S> for LogBufferLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        if self.capacity == 0 {
            return;
        }

        let metadata = event.metadata();

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let entry = LogEntry {
            timestamp: Utc::now(),
            level: metadata.level().to_string(),
            message: visitor.message,
            target: Some(metadata.target().to_string()),
            module_path: metadata.module_path().map(str::to_string),
            file: metadata.file().map(str::to_string),
            line: metadata.line(),
            fields: visitor.fields,
            span_name: ctx.event_span(event).map(|span| span.name().to_string()),
        };

        // Dropped when contended; the event still reaches the other layers
        if let Ok(mut buffer) = self.buffer.try_write() {
            buffer.push_front(entry);
            buffer.truncate(self.capacity);
        }
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: HashMap<String, JsonValue>,
}

fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Best-effort typing of a `Debug`-formatted field value
fn debug_to_json(value: String) -> JsonValue {
    if let Ok(num) = value.parse::<i64>() {
        return JsonValue::Number(num.into());
    }
    if let Some(num) = value.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
        return JsonValue::Number(num);
    }
    match value.as_str() {
        "true" => JsonValue::Bool(true),
        "false" => JsonValue::Bool(false),
        other => JsonValue::String(strip_quotes(other).to_string()),
    }
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let formatted = format!("{:?}", value);

        if field.name() == "message" {
            self.message = strip_quotes(&formatted).to_string();
        } else {
            self.fields
                .insert(field.name().to_string(), debug_to_json(formatted));
        }
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), JsonValue::Number(value.into()));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), JsonValue::Number(value.into()));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        if let Some(num) = serde_json::Number::from_f64(value) {
            self.fields
                .insert(field.name().to_string(), JsonValue::Number(num));
        }
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), JsonValue::Bool(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.insert(
                field.name().to_string(),
                JsonValue::String(value.to_string()),
            );
        }
    }
}
