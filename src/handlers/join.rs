//! `join`: bind a username to this connection.

use super::{HandlerError, HandlerResult, Session};
use crate::network::protocol::ServerEvent;
use crate::state::Hub;
use tracing::info;

/// Register the connection as the delivery channel for `username`.
///
/// The username is trusted as given. Users missing from the directory may
/// still join; they receive their own echoes and nothing else.
pub fn handle_join(hub: &Hub, session: &mut Session, username: String) -> HandlerResult {
    let username = username.trim();
    if username.is_empty() {
        return Err(HandlerError::EmptyUsername);
    }

    let displaced = hub.rooms.join(username, session.id, session.tx.clone());
    session.remember(username);
    info!(%username, displaced, "User joined room");

    session.reply(ServerEvent::Joined {
        username: username.to_string(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Hub, Language};
    use crate::translation::PassthroughTranslator;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    fn hub() -> Hub {
        Hub::builder()
            .translator(Arc::new(PassthroughTranslator), Duration::from_secs(1))
            .fallback_language(Language::English)
            .build()
    }

    #[tokio::test]
    async fn join_registers_and_acknowledges() {
        let hub = hub();
        let (tx, mut rx) = mpsc::channel(4);
        let mut session = Session::new(Uuid::new_v4(), tx);

        handle_join(&hub, &mut session, " alice ".into()).unwrap();

        assert!(hub.rooms.is_joined("alice"));
        assert_eq!(session.current(), Some("alice"));
        assert_eq!(
            *rx.recv().await.unwrap(),
            ServerEvent::Joined {
                username: "alice".into()
            }
        );
    }

    #[test]
    fn blank_username_is_rejected() {
        let hub = hub();
        let (tx, _rx) = mpsc::channel(4);
        let mut session = Session::new(Uuid::new_v4(), tx);

        assert!(matches!(
            handle_join(&hub, &mut session, "   ".into()),
            Err(HandlerError::EmptyUsername)
        ));
        assert!(hub.rooms.is_empty());
    }

    #[test]
    fn rejoin_moves_name_to_front() {
        let hub = hub();
        let (tx, _rx) = mpsc::channel(8);
        let mut session = Session::new(Uuid::new_v4(), tx);

        handle_join(&hub, &mut session, "alice".into()).unwrap();
        handle_join(&hub, &mut session, "bob".into()).unwrap();
        handle_join(&hub, &mut session, "alice".into()).unwrap();

        assert_eq!(session.joined(), ["bob".to_string(), "alice".to_string()]);
        assert_eq!(session.current(), Some("alice"));
    }
}
