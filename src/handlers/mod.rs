//! WebSocket event handlers.
//!
//! Each connection owns a [`Session`]; every decoded [`ClientEvent`] is
//! passed to [`dispatch`] together with the shared [`Hub`].

mod join;
mod messaging;

pub use crate::error::{HandlerError, HandlerResult};
pub use join::handle_join;
pub use messaging::{MessageRouter, RouteSummary, handle_send};

use crate::network::protocol::{ClientEvent, ServerEvent};
use crate::state::{Hub, Outbound};
use crate::telemetry::{EventTimer, spans};
use std::sync::Arc;
use tracing::{Instrument, debug};
use uuid::Uuid;

/// Per-connection state.
pub struct Session {
    pub id: Uuid,
    pub tx: Outbound,
    joined: Vec<String>,
}

impl Session {
    pub fn new(id: Uuid, tx: Outbound) -> Self {
        Self {
            id,
            tx,
            joined: Vec::new(),
        }
    }

    /// Usernames this connection joined, oldest first.
    pub fn joined(&self) -> &[String] {
        &self.joined
    }

    /// The most recently joined username.
    pub fn current(&self) -> Option<&str> {
        self.joined.last().map(String::as_str)
    }

    fn remember(&mut self, username: &str) {
        self.joined.retain(|name| name != username);
        self.joined.push(username.to_string());
    }

    /// Queue a reply for this connection only.
    pub fn reply(&self, event: ServerEvent) {
        if self.tx.try_send(Arc::new(event)).is_err() {
            debug!(conn = %self.id, "Reply dropped, outbound queue unavailable");
        }
    }
}

/// Run one inbound event.
///
/// Errors are reported back to the connection and counted; they never
/// close it.
pub async fn dispatch(hub: &Hub, session: &mut Session, event: ClientEvent) {
    let name = event.name();
    let _timer = EventTimer::new(name);

    let span = match &event {
        ClientEvent::Join { username } => spans::event(name, Some(username)),
        ClientEvent::SendMessage { username, .. } => {
            spans::event(name, username.as_deref().or(session.current()))
        }
    };

    let result = async {
        match event {
            ClientEvent::Join { username } => handle_join(hub, session, username),
            ClientEvent::SendMessage { username, message } => {
                handle_send(hub, session, username, message).await
            }
        }
    }
    .instrument(span)
    .await;

    if let Err(e) = result {
        debug!(conn = %session.id, event = name, error = %e, "Event rejected");
        crate::metrics::record_event_error(name, e.error_code());
        session.reply(e.to_event());
    }
}
