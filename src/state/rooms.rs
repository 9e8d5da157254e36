//! Room registry: one delivery channel per online username.
//!
//! A "room" is not a group. It is the outbound queue of whichever
//! connection last joined under a username. All operations are thread-safe
//! via DashMap; a delivery never waits on a slow reader.

use crate::network::protocol::ServerEvent;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;
use uuid::Uuid;

/// Sending half of a connection's outbound queue.
pub type Outbound = mpsc::Sender<Arc<ServerEvent>>;

/// Result of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Queued on the recipient's connection.
    Delivered,
    /// Nobody has joined under that username.
    NotJoined,
    /// The queue was full or the connection is gone.
    Dropped,
}

impl DeliveryOutcome {
    /// Label used for metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::NotJoined => "not_joined",
            Self::Dropped => "dropped",
        }
    }
}

struct Room {
    connection: Uuid,
    tx: Outbound,
}

/// Maps usernames to the connection currently receiving for them.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `tx` as the delivery channel for `username`.
    ///
    /// Re-joining from the same connection is a no-op; joining from another
    /// connection replaces the previous channel. Returns `true` when a
    /// different connection was displaced.
    pub fn join(&self, username: &str, connection: Uuid, tx: Outbound) -> bool {
        let previous = self
            .rooms
            .insert(username.to_string(), Room { connection, tx });
        crate::metrics::set_joined_rooms(self.rooms.len());

        match previous {
            Some(room) if room.connection != connection => {
                debug!(%username, old = %room.connection, new = %connection, "Room taken over");
                true
            }
            _ => false,
        }
    }

    /// Remove `username` if it is still owned by `connection`.
    ///
    /// A connection that lost the room to a newer join leaves nothing behind.
    pub fn leave(&self, username: &str, connection: Uuid) -> bool {
        let removed = self
            .rooms
            .remove_if(username, |_, room| room.connection == connection)
            .is_some();
        if removed {
            crate::metrics::set_joined_rooms(self.rooms.len());
        }
        removed
    }

    /// Current delivery channel for `username`.
    pub fn channel_for(&self, username: &str) -> Option<Outbound> {
        self.rooms.get(username).map(|room| room.tx.clone())
    }

    pub fn is_joined(&self, username: &str) -> bool {
        self.rooms.contains_key(username)
    }

    /// Queue `event` for `username` without waiting.
    pub fn deliver(&self, username: &str, event: Arc<ServerEvent>) -> DeliveryOutcome {
        let Some(tx) = self.channel_for(username) else {
            return DeliveryOutcome::NotJoined;
        };

        match tx.try_send(event) {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(TrySendError::Full(_)) => {
                debug!(%username, "Outbound queue full, delivery dropped");
                DeliveryOutcome::Dropped
            }
            Err(TrySendError::Closed(_)) => {
                debug!(%username, "Connection gone, delivery dropped");
                DeliveryOutcome::Dropped
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(text: &str) -> Arc<ServerEvent> {
        Arc::new(ServerEvent::receive("alice", text))
    }

    #[tokio::test]
    async fn deliver_reaches_joined_connection() {
        let rooms = RoomRegistry::new();
        let (tx, mut rx) = mpsc::channel(4);
        rooms.join("alice", Uuid::new_v4(), tx);

        assert_eq!(rooms.deliver("alice", event("hi")), DeliveryOutcome::Delivered);
        let got = rx.recv().await.unwrap();
        assert_eq!(*got, ServerEvent::receive("alice", "hi"));
    }

    #[test]
    fn deliver_to_unknown_is_not_joined() {
        let rooms = RoomRegistry::new();
        assert_eq!(rooms.deliver("ghost", event("hi")), DeliveryOutcome::NotJoined);
        assert!(rooms.channel_for("ghost").is_none());
    }

    #[test]
    fn full_queue_drops() {
        let rooms = RoomRegistry::new();
        let (tx, _rx) = mpsc::channel(1);
        rooms.join("alice", Uuid::new_v4(), tx);

        assert_eq!(rooms.deliver("alice", event("1")), DeliveryOutcome::Delivered);
        assert_eq!(rooms.deliver("alice", event("2")), DeliveryOutcome::Dropped);
    }

    #[test]
    fn closed_receiver_drops() {
        let rooms = RoomRegistry::new();
        let (tx, rx) = mpsc::channel(1);
        rooms.join("alice", Uuid::new_v4(), tx);
        drop(rx);

        assert_eq!(rooms.deliver("alice", event("1")), DeliveryOutcome::Dropped);
    }

    #[test]
    fn join_is_idempotent_for_same_connection() {
        let rooms = RoomRegistry::new();
        let conn = Uuid::new_v4();
        let (tx, _rx) = mpsc::channel(1);

        assert!(!rooms.join("alice", conn, tx.clone()));
        assert!(!rooms.join("alice", conn, tx));
        assert_eq!(rooms.len(), 1);
    }

    #[tokio::test]
    async fn rejoin_replaces_and_stale_leave_is_ignored() {
        let rooms = RoomRegistry::new();
        let (old_conn, new_conn) = (Uuid::new_v4(), Uuid::new_v4());
        let (old_tx, mut old_rx) = mpsc::channel(4);
        let (new_tx, mut new_rx) = mpsc::channel(4);

        rooms.join("alice", old_conn, old_tx);
        assert!(rooms.join("alice", new_conn, new_tx));

        // The displaced connection closing must not evict the new one.
        assert!(!rooms.leave("alice", old_conn));
        assert!(rooms.is_joined("alice"));

        rooms.deliver("alice", event("hi"));
        assert!(new_rx.recv().await.is_some());
        assert!(old_rx.try_recv().is_err());

        assert!(rooms.leave("alice", new_conn));
        assert!(rooms.is_empty());
    }
}
