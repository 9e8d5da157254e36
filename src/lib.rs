//! polyglot-relay - a multilingual chat relay.
//!
//! Users join under a username; every message is echoed to the sender,
//! delivered verbatim to users sharing the sender's language, and
//! machine-translated for everyone else. A handwriting endpoint turns
//! recognizer output into ordered lines of text.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod network;
pub mod ocr;
pub mod state;
pub mod telemetry;
pub mod translation;
