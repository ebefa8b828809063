//! Span recording as an explicit capability.
//!
//! Each pipeline stage receives a `&dyn StageSpan` next to its inputs and
//! records attributes and status through it. Recording is best effort: an
//! attribute the underlying span does not know about is dropped silently and
//! never surfaces as an error.

use parking_lot::Mutex;
use tracing::Span;

pub trait StageSpan: Send + Sync {
    fn set_str(&self, key: &'static str, value: &str);
    fn set_i64(&self, key: &'static str, value: i64);
    fn set_f64(&self, key: &'static str, value: f64);
    fn set_bool(&self, key: &'static str, value: bool);

    /// Mark the stage failed and record the cause once
    fn fail(&self, error: &dyn std::error::Error, status_message: &str);

    /// Mark failed without recording a cause, for spans enclosing the stage
    /// that already recorded it
    fn mark_failed(&self, status_message: &str);

    /// Mark the stage successful
    fn succeed(&self, status_message: &str);
}

/// Records into a `tracing` span.
///
/// Attribute keys must be declared as fields when the span is created.
/// Status goes to the `otel.status_code` / `otel.status_message` fields, which
/// `tracing-opentelemetry` maps onto the exported span status.
#[derive(Debug, Clone)]
pub struct TracedSpan(Span);

impl TracedSpan {
    pub fn new(span: Span) -> Self {
        Self(span)
    }

    pub fn span(&self) -> &Span {
        &self.0
    }
}

impl StageSpan for TracedSpan {
    fn set_str(&self, key: &'static str, value: &str) {
        self.0.record(key, value);
    }

    fn set_i64(&self, key: &'static str, value: i64) {
        self.0.record(key, value);
    }

    fn set_f64(&self, key: &'static str, value: f64) {
        self.0.record(key, value);
    }

    fn set_bool(&self, key: &'static str, value: bool) {
        self.0.record(key, value);
    }

    fn fail(&self, error: &dyn std::error::Error, status_message: &str) {
        self.0.record("otel.status_code", "ERROR");
        self.0.record("otel.status_message", status_message);
        tracing::warn!(parent: &self.0, error = %error, "{}", status_message);
    }

    fn mark_failed(&self, status_message: &str) {
        self.0.record("otel.status_code", "ERROR");
        self.0.record("otel.status_message", status_message);
    }

    fn succeed(&self, status_message: &str) {
        self.0.record("otel.status_code", "OK");
        self.0.record("otel.status_message", status_message);
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpan;

impl StageSpan for NoopSpan {
    fn set_str(&self, _key: &'static str, _value: &str) {}
    fn set_i64(&self, _key: &'static str, _value: i64) {}
    fn set_f64(&self, _key: &'static str, _value: f64) {}
    fn set_bool(&self, _key: &'static str, _value: bool) {}
    fn fail(&self, _error: &dyn std::error::Error, _status_message: &str) {}
    fn mark_failed(&self, _status_message: &str) {}
    fn succeed(&self, _status_message: &str) {}
}

/// Attribute value captured by [`RecordingSpan`]
#[derive(Debug, Clone, PartialEq)]
pub enum SpanValue {
    Str(String),
    I64(i64),
    F64(f64),
    Bool(bool),
}

/// Final status captured by [`RecordingSpan`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanStatus {
    Ok(String),
    Error(String),
}

/// Keeps everything in memory so tests can assert on it
#[derive(Debug, Default)]
pub struct RecordingSpan {
    attributes: Mutex<Vec<(&'static str, SpanValue)>>,
    status: Mutex<Option<SpanStatus>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingSpan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value recorded for `key`
    pub fn attribute(&self, key: &str) -> Option<SpanValue> {
        self.attributes
            .lock()
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
    }

    pub fn status(&self) -> Option<SpanStatus> {
        self.status.lock().clone()
    }

    /// Causes recorded through `fail`, in order
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    fn push(&self, key: &'static str, value: SpanValue) {
        self.attributes.lock().push((key, value));
    }
}

impl StageSpan for RecordingSpan {
    fn set_str(&self, key: &'static str, value: &str) {
        self.push(key, SpanValue::Str(value.to_string()));
    }

    fn set_i64(&self, key: &'static str, value: i64) {
        self.push(key, SpanValue::I64(value));
    }

    fn set_f64(&self, key: &'static str, value: f64) {
        self.push(key, SpanValue::F64(value));
    }

    fn set_bool(&self, key: &'static str, value: bool) {
        self.push(key, SpanValue::Bool(value));
    }

    fn fail(&self, error: &dyn std::error::Error, status_message: &str) {
        self.errors.lock().push(error.to_string());
        *self.status.lock() = Some(SpanStatus::Error(status_message.to_string()));
    }

    fn mark_failed(&self, status_message: &str) {
        *self.status.lock() = Some(SpanStatus::Error(status_message.to_string()));
    }

    fn succeed(&self, status_message: &str) {
        *self.status.lock() = Some(SpanStatus::Ok(status_message.to_string()));
    }
}
