//! Span exporter that appends finished spans to a local file.
//!
//! Each finished span becomes one JSON object on its own line:
//!
//! ```json
//! {"service":"country-explorer","traceId":"…","spanId":"…","parentSpanId":"…",
//!  "name":"fetch_by_name","start":"2024-05-01T10:00:00.000Z","durationMs":182.4,
//!  "attributes":{"name":"United"},"events":[],"status":"unset"}
//! ```
//!
//! Lines are independent, so the file can be tailed or grepped without a
//! collector.

use super::file_writer::RotatingFileWriter;
use chrono::{DateTime, SecondsFormat, Utc};
use futures_util::future::{self, BoxFuture, FutureExt};
use opentelemetry::trace::{SpanId, Status, TraceError};
use opentelemetry::{KeyValue, Value};
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::path::PathBuf;
use std::time::SystemTime;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpanRecord<'a> {
    service: &'a str,
    trace_id: String,
    span_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_span_id: Option<String>,
    name: &'a str,
    start: String,
    duration_ms: f64,
    attributes: Map<String, JsonValue>,
    events: Vec<EventRecord<'a>>,
    status: String,
}

#[derive(Debug, Serialize)]
struct EventRecord<'a> {
    name: &'a str,
    time: String,
    attributes: Map<String, JsonValue>,
}

impl<'a> SpanRecord<'a> {
    fn new(service: &'a str, span: &'a SpanData) -> Self {
        let duration_ms = span
            .end_time
            .duration_since(span.start_time)
            .map_or(0.0, |elapsed| elapsed.as_secs_f64() * 1000.0);

        Self {
            service,
            trace_id: format!("{:032x}", span.span_context.trace_id()),
            span_id: format!("{:016x}", span.span_context.span_id()),
            parent_span_id: (span.parent_span_id != SpanId::INVALID)
                .then(|| format!("{:016x}", span.parent_span_id)),
            name: &span.name,
            start: timestamp(span.start_time),
            duration_ms,
            attributes: attribute_map(&span.attributes),
            events: span
                .events
                .iter()
                .map(|event| EventRecord {
                    name: &event.name,
                    time: timestamp(event.timestamp),
                    attributes: attribute_map(&event.attributes),
                })
                .collect(),
            status: match &span.status {
                Status::Unset => "unset".to_string(),
                Status::Ok => "ok".to_string(),
                Status::Error { description } => format!("error: {description}"),
            },
        }
    }
}

fn timestamp(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn attribute_map(attributes: &[KeyValue]) -> Map<String, JsonValue> {
    attributes
        .iter()
        .map(|kv| (kv.key.to_string(), json_value(&kv.value)))
        .collect()
}

fn json_value(value: &Value) -> JsonValue {
    match value {
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::I64(i) => JsonValue::from(*i),
        Value::F64(f) => serde_json::Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        Value::String(s) => JsonValue::String(s.as_str().to_owned()),
        Value::Array(_) => JsonValue::String(value.as_str().into_owned()),
    }
}

/// Writes each exported span as a JSON line.
struct JsonLinesExporter {
    writer: RotatingFileWriter,
    service: String,
    is_shutdown: bool,
}

impl JsonLinesExporter {
    fn service_name(resource: &Resource) -> String {
        resource
            .get(opentelemetry::Key::from_static_str("service.name"))
            .map_or_else(|| env!("CARGO_PKG_NAME").to_string(), |v| v.as_str().into_owned())
    }

    fn write_batch(&self, batch: &[SpanData]) -> ExportResult {
        for span in batch {
            let line = serde_json::to_string(&SpanRecord::new(&self.service, span))
                .map_err(|e| TraceError::from(e.to_string()))?;
            self.writer
                .write_line(&line)
                .map_err(|e| TraceError::from(e.to_string()))?;
        }
        Ok(())
    }
}

impl SpanExporter for JsonLinesExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        let result = if self.is_shutdown {
            Err(TraceError::from("exporter is shut down"))
        } else {
            self.write_batch(&batch)
        };
        future::ready(result).boxed()
    }

    fn shutdown(&mut self) {
        self.is_shutdown = true;
    }

    fn set_resource(&mut self, resource: &Resource) {
        self.service = Self::service_name(resource);
    }
}

impl std::fmt::Debug for JsonLinesExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesExporter")
            .field("writer", &self.writer)
            .field("service", &self.service)
            .field("is_shutdown", &self.is_shutdown)
            .finish()
    }
}

/// Builds a provider that exports every finished span synchronously to
/// `file_path`.
pub fn create_tracer_provider(file_path: PathBuf, resource: Resource) -> TracerProvider {
    let exporter = JsonLinesExporter {
        writer: RotatingFileWriter::new(file_path),
        service: JsonLinesExporter::service_name(&resource),
        is_shutdown: false,
    };

    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}
