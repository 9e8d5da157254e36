//! Network module.
//!
//! Contains the Gateway (HTTP listener and router), the WebSocket
//! connection handler, the HTTP API endpoints and the wire protocol.

mod api;
mod connection;
mod gateway;
pub mod protocol;

pub use gateway::{AppState, Gateway, GatewayOptions, build_router};
