//! W3C Trace Context propagation over HTTP headers.
//!
//! The gateway injects the context of its current span into the request it
//! forwards; the orchestrator extracts it and parents its request span on it.

use http::{HeaderMap, HeaderName, HeaderValue, Request};
use opentelemetry::global;
use opentelemetry::propagation::{Extractor, Injector};
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// W3C Trace Context header name
pub const TRACEPARENT: &str = "traceparent";

struct HeadersExtractor<'a>(&'a HeaderMap);

impl Extractor for HeadersExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

struct HeadersInjector<'a>(&'a mut HeaderMap);

impl Injector for HeadersInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        if let Ok(name) = HeaderName::from_bytes(key.as_bytes()) {
            if let Ok(val) = HeaderValue::from_str(&value) {
                self.0.insert(name, val);
            }
        }
    }
}

/// Extract the traceparent header value
pub fn get_traceparent(headers: &HeaderMap) -> Option<&str> {
    headers.get(TRACEPARENT)?.to_str().ok()
}

/// Parse the trace ID out of a traceparent value (`00-{trace_id}-{span_id}-{flags}`)
pub fn parse_trace_id(traceparent: &str) -> Option<&str> {
    let mut parts = traceparent.split('-');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("00"), Some(trace_id), Some(_), Some(_)) if trace_id.len() == 32 => Some(trace_id),
        _ => None,
    }
}

/// Inject the context of `span` into outgoing headers.
///
/// Writes nothing when no OpenTelemetry layer is installed.
pub fn inject_span(span: &Span, headers: &mut HeaderMap) {
    let cx = span.context();
    global::get_text_map_propagator(|propagator| {
        propagator.inject_context(&cx, &mut HeadersInjector(headers));
    });
}

/// Inject the context of the current span into outgoing headers.
pub fn inject_current_span(headers: &mut HeaderMap) {
    inject_span(&Span::current(), headers);
}

/// Parent `span` on the trace context carried by incoming headers.
///
/// Also records the remote trace ID into a `trace_id` field when the span
/// declares one, for log correlation without an exporter.
pub fn set_parent_from_headers(span: &Span, headers: &HeaderMap) {
    let parent_cx =
        global::get_text_map_propagator(|propagator| propagator.extract(&HeadersExtractor(headers)));

    // Tracing failures never affect request handling
    let _ = span.set_parent(parent_cx);

    if let Some(trace_id) = get_traceparent(headers).and_then(parse_trace_id) {
        span.record("trace_id", trace_id);
    }
}

/// Server span for an inbound request, parented on its trace context.
///
/// Meant for `TraceLayer::make_span_with` so the whole request, handler spans
/// included, joins the caller's trace.
pub fn server_span<B>(request: &Request<B>) -> Span {
    let span = tracing::info_span!(
        "http-request",
        otel.kind = "server",
        http.method = %request.method(),
        http.target = %request.uri(),
        trace_id = tracing::field::Empty,
    );
    set_parent_from_headers(&span, request.headers());
    span
}
