//! Prometheus metrics collection for polyglot-relay.
//!
//! Exposed on `/metrics` when `server.metrics` is enabled. All recording
//! helpers are no-ops until [`init`] has run, so library users and tests
//! never need to set anything up.
//!
//! - `relay_messages_routed_total` - chat messages routed
//! - `relay_deliveries_total{outcome}` - per-recipient delivery results
//! - `relay_translation_requests_total{outcome}` - ok / failed / timeout
//! - `relay_message_fanout` - recipients per routed message

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters
// ========================================================================

/// Chat messages accepted for routing.
pub static MESSAGES_ROUTED: OnceLock<IntCounter> = OnceLock::new();

/// Per-recipient deliveries by outcome (delivered, not_joined, dropped).
pub static DELIVERIES: OnceLock<IntCounterVec> = OnceLock::new();

/// Translation service calls by outcome.
pub static TRANSLATION_REQUESTS: OnceLock<IntCounterVec> = OnceLock::new();

/// Handwriting uploads by outcome.
pub static OCR_REQUESTS: OnceLock<IntCounterVec> = OnceLock::new();

/// WebSocket events processed by type.
pub static EVENT_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// WebSocket event errors by type and error code.
pub static EVENT_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Gauges
// ========================================================================

/// Open WebSocket connections.
pub static CONNECTED_CLIENTS: OnceLock<IntGauge> = OnceLock::new();

/// Usernames with a registered delivery channel.
pub static JOINED_ROOMS: OnceLock<IntGauge> = OnceLock::new();

// ========================================================================
// Histograms
// ========================================================================

/// Translation round-trip latency.
pub static TRANSLATION_LATENCY: OnceLock<Histogram> = OnceLock::new();

/// Event handling latency by type.
pub static EVENT_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Recipients per routed message.
pub static MESSAGE_FANOUT: OnceLock<Histogram> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Call once at startup; later calls only log registration conflicts.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            let m = $init.expect(concat!(stringify!($metric), " creation failed"));
            if let Err(e) = r.register(Box::new(m.clone())) {
                tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
            }
            let _ = $metric.set(m);
        };
    }

    register!(MESSAGES_ROUTED, IntCounter::new("relay_messages_routed_total", "Chat messages routed"));
    register!(DELIVERIES, IntCounterVec::new(Opts::new("relay_deliveries_total", "Per-recipient deliveries by outcome"), &["outcome"]));
    register!(TRANSLATION_REQUESTS, IntCounterVec::new(Opts::new("relay_translation_requests_total", "Translation service calls by outcome"), &["outcome"]));
    register!(OCR_REQUESTS, IntCounterVec::new(Opts::new("relay_ocr_requests_total", "Handwriting uploads by outcome"), &["outcome"]));
    register!(EVENT_COUNTER, IntCounterVec::new(Opts::new("relay_event_total", "WebSocket events processed by type"), &["event"]));
    register!(EVENT_ERRORS, IntCounterVec::new(Opts::new("relay_event_errors_total", "WebSocket event errors"), &["event", "error"]));
    register!(CONNECTED_CLIENTS, IntGauge::new("relay_connected_clients", "Open WebSocket connections"));
    register!(JOINED_ROOMS, IntGauge::new("relay_joined_rooms", "Usernames with a delivery channel"));
    register!(TRANSLATION_LATENCY, Histogram::with_opts(
        HistogramOpts::new("relay_translation_duration_seconds", "Translation round-trip latency")
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0])));
    register!(EVENT_LATENCY, HistogramVec::new(
        HistogramOpts::new("relay_event_duration_seconds", "Event handling latency by type")
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        &["event"]));
    register!(MESSAGE_FANOUT, Histogram::with_opts(
        HistogramOpts::new("relay_message_fanout", "Recipients per routed message")
            .buckets(vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0])));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Recording helpers
// ============================================================================

#[inline]
fn inc_vec(metric: &OnceLock<IntCounterVec>, labels: &[&str]) {
    if let Some(c) = metric.get() {
        c.with_label_values(labels).inc();
    }
}

/// Record one routed message and how many recipients it fanned out to.
#[inline]
pub fn record_route(recipients: usize) {
    if let Some(c) = MESSAGES_ROUTED.get() {
        c.inc();
    }
    if let Some(h) = MESSAGE_FANOUT.get() {
        h.observe(recipients as f64);
    }
}

#[inline]
pub fn record_delivery(outcome: &str) {
    inc_vec(&DELIVERIES, &[outcome]);
}

#[inline]
pub fn record_translation(outcome: &str, duration_secs: f64) {
    inc_vec(&TRANSLATION_REQUESTS, &[outcome]);
    if let Some(h) = TRANSLATION_LATENCY.get() {
        h.observe(duration_secs);
    }
}

#[inline]
pub fn record_ocr(outcome: &str) {
    inc_vec(&OCR_REQUESTS, &[outcome]);
}

/// Record an event execution with latency.
#[inline]
pub fn record_event(event: &str, duration_secs: f64) {
    inc_vec(&EVENT_COUNTER, &[event]);
    if let Some(h) = EVENT_LATENCY.get() {
        h.with_label_values(&[event]).observe(duration_secs);
    }
}

#[inline]
pub fn record_event_error(event: &str, error: &str) {
    inc_vec(&EVENT_ERRORS, &[event, error]);
}

#[inline]
pub fn set_joined_rooms(count: usize) {
    if let Some(g) = JOINED_ROOMS.get() {
        g.set(count as i64);
    }
}

#[inline]
pub fn client_connected() {
    if let Some(g) = CONNECTED_CLIENTS.get() {
        g.inc();
    }
}

#[inline]
pub fn client_disconnected() {
    if let Some(g) = CONNECTED_CLIENTS.get() {
        g.dec();
    }
}
