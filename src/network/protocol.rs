//! WebSocket wire format.
//!
//! Every frame is a JSON text frame tagged by `type`:
//!
//! ```text
//! client -> server   {"type":"join","username":"alice"}
//!                    {"type":"send_message","username":"alice","message":"hello"}
//! server -> client   {"type":"joined","username":"alice"}
//!                    {"type":"receive_message","username":"alice","message":"hello"}
//!                    {"type":"error","code":"not_joined","message":"..."}
//! ```

use serde::{Deserialize, Serialize};

/// Events a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Start receiving messages addressed to `username`.
    Join { username: String },
    /// Relay `message` on behalf of `username`.
    ///
    /// Without a username the connection's most recent join is used.
    SendMessage {
        #[serde(default)]
        username: Option<String>,
        message: String,
    },
}

impl ClientEvent {
    /// Event name for spans and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::SendMessage { .. } => "send_message",
        }
    }
}

/// Events pushed to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Joined { username: String },
    /// A relayed chat message; `username` is the sender.
    ReceiveMessage { username: String, message: String },
    Error { code: String, message: String },
}

impl ServerEvent {
    pub fn receive(sender: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ReceiveMessage {
            username: sender.into(),
            message: message.into(),
        }
    }

    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_client_events() {
        let join: ClientEvent = serde_json::from_str(r#"{"type":"join","username":"alice"}"#).unwrap();
        assert_eq!(join, ClientEvent::Join { username: "alice".into() });

        let send: ClientEvent =
            serde_json::from_str(r#"{"type":"send_message","message":"hi"}"#).unwrap();
        assert_eq!(
            send,
            ClientEvent::SendMessage {
                username: None,
                message: "hi".into()
            }
        );
        assert_eq!(send.name(), "send_message");
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(serde_json::from_str::<ClientEvent>(r#"{"type":"leave"}"#).is_err());
    }

    #[test]
    fn server_event_shape() {
        let json = serde_json::to_value(ServerEvent::receive("bob", "こんにちは")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "receive_message", "username": "bob", "message": "こんにちは"})
        );
    }
}
