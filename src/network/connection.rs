//! WebSocket connection lifecycle.
//!
//! Each upgraded socket is split: a writer task drains the connection's
//! bounded outbound queue, while the reader loop decodes frames and hands
//! them to [`dispatch`]. On close every username this connection still owns
//! is released from the room registry.

use super::gateway::AppState;
use super::protocol::{ClientEvent, ServerEvent};
use crate::handlers::{HandlerError, Session, dispatch};
use crate::telemetry::spans;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info, warn};
use uuid::Uuid;

pub(super) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    if !origin_allowed(&state.allow_origins, &headers) {
        let origin = headers
            .get(header::ORIGIN)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        warn!(%addr, %origin, "WebSocket CORS rejected");
        return (StatusCode::FORBIDDEN, "CORS origin not allowed").into_response();
    }

    ws.on_upgrade(move |socket| {
        let id = Uuid::new_v4();
        handle_socket(socket, state, id).instrument(spans::connection(id, addr))
    })
}

/// Empty allow-list accepts everything, as does a `"*"` entry.
fn origin_allowed(allowed: &[String], headers: &HeaderMap) -> bool {
    if allowed.is_empty() {
        return true;
    }
    headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|origin| allowed.iter().any(|a| a == origin || a == "*"))
}

async fn handle_socket(socket: WebSocket, state: AppState, id: Uuid) {
    let hub = Arc::clone(&state.hub);
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Arc<ServerEvent>>(hub.outbound_queue);

    crate::metrics::client_connected();
    info!("Client connected");

    let mut writer = tokio::spawn(
        async move {
            while let Some(event) = rx.recv().await {
                let text = match serde_json::to_string(event.as_ref()) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "Failed to encode outbound event");
                        continue;
                    }
                };
                if sink.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        }
        .in_current_span(),
    );

    let mut session = Session::new(id, tx);

    loop {
        let next = tokio::select! {
            // Writer exits when the socket is gone.
            _ = &mut writer => break,
            next = next_frame(&mut stream, state.idle_timeout) => next,
        };

        let frame = match next {
            Frame::Message(frame) => frame,
            Frame::Idle => {
                info!("Closing idle connection");
                break;
            }
            Frame::Closed => break,
            Frame::Failed(e) => {
                debug!(error = %e, "WebSocket read error");
                break;
            }
        };

        match frame {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => dispatch(&hub, &mut session, event).await,
                Err(e) => {
                    debug!(error = %e, "Malformed event");
                    let err = HandlerError::Malformed(e.to_string());
                    crate::metrics::record_event_error("malformed", err.error_code());
                    session.reply(err.to_event());
                }
            },
            Message::Binary(_) => {
                let err = HandlerError::Malformed("binary frames are not supported".into());
                crate::metrics::record_event_error("malformed", err.error_code());
                session.reply(err.to_event());
            }
            Message::Close(_) => break,
            // Pings are answered by the socket itself.
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    for username in session.joined() {
        if hub.rooms.leave(username, session.id) {
            debug!(%username, "Room released");
        }
    }
    writer.abort();

    crate::metrics::client_disconnected();
    info!(rooms = session.joined().len(), "Client disconnected");
}

enum Frame {
    Message(Message),
    Idle,
    Closed,
    Failed(axum::Error),
}

async fn next_frame(
    stream: &mut futures_util::stream::SplitStream<WebSocket>,
    idle_timeout: Option<std::time::Duration>,
) -> Frame {
    let next = match idle_timeout {
        Some(limit) => match tokio::time::timeout(limit, stream.next()).await {
            Ok(next) => next,
            Err(_) => return Frame::Idle,
        },
        None => stream.next().await,
    };

    match next {
        Some(Ok(message)) => Frame::Message(message),
        Some(Err(e)) => Frame::Failed(e),
        None => Frame::Closed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_origin(origin: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ORIGIN, HeaderValue::from_str(origin).unwrap());
        headers
    }

    #[test]
    fn empty_allow_list_accepts_anything() {
        assert!(origin_allowed(&[], &HeaderMap::new()));
        assert!(origin_allowed(&[], &with_origin("http://evil.example")));
    }

    #[test]
    fn allow_list_matches_exactly() {
        let allowed = vec!["http://localhost:3000".to_string()];
        assert!(origin_allowed(&allowed, &with_origin("http://localhost:3000")));
        assert!(!origin_allowed(&allowed, &with_origin("http://localhost:4000")));
        assert!(!origin_allowed(&allowed, &HeaderMap::new()));
    }

    #[test]
    fn wildcard_accepts_any_origin() {
        let allowed = vec!["*".to_string()];
        assert!(origin_allowed(&allowed, &with_origin("http://anything")));
    }
}
