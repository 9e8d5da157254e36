//! Network listener and connection limit configuration.

use super::defaults::{default_idle_timeout, default_max_upload_bytes, default_outbound_queue};
use serde::Deserialize;
use std::net::SocketAddr;

/// HTTP/WebSocket listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:5000").
    pub address: SocketAddr,
    /// Allowed Origin headers for WebSocket upgrades.
    /// Empty list allows all origins.
    #[serde(default)]
    pub allow_origins: Vec<String>,
}

/// Per-connection limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Outbound events buffered per connection before deliveries are dropped.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
    /// Seconds without an inbound frame before a connection is closed.
    /// 0 disables the idle check.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    /// Largest accepted request body, in bytes (handwriting uploads).
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            outbound_queue: default_outbound_queue(),
            idle_timeout_secs: default_idle_timeout(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}
