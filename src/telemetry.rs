//! Telemetry utilities for event timing and span construction.

use std::time::Instant;

/// Guard for timing event handling and recording metrics.
///
/// Records event latency when dropped.
pub struct EventTimer {
    event: &'static str,
    start: Instant,
}

impl EventTimer {
    /// Start timing an event.
    pub fn new(event: &'static str) -> Self {
        Self {
            event,
            start: Instant::now(),
        }
    }
}

impl Drop for EventTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_event(self.event, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use std::net::SocketAddr;
    use tracing::{Span, info_span};
    use uuid::Uuid;

    /// Span for a WebSocket connection.
    pub fn connection(id: Uuid, addr: SocketAddr) -> Span {
        info_span!("connection", conn = %id, addr = %addr)
    }

    /// Span for one inbound event.
    pub fn event(name: &str, username: Option<&str>) -> Span {
        if let Some(username) = username {
            info_span!("event", name = %name, username = %username)
        } else {
            info_span!("event", name = %name)
        }
    }

    /// Span for routing a single chat message.
    pub fn route(sender: &str) -> Span {
        info_span!("route", sender = %sender)
    }
}
