//! Message routing: per-recipient, per-language fan-out.
//!
//! The sender always gets their own text back first. Everyone else in the
//! directory gets it verbatim when they share the sender's language, or a
//! translation otherwise. Translations run concurrently, one per distinct
//! target language, and never hold up the echo.

use super::{HandlerError, HandlerResult, Session};
use crate::network::protocol::ServerEvent;
use crate::state::{DeliveryOutcome, Hub, Language, RoomRegistry, UserDirectory};
use crate::telemetry::spans;
use crate::translation::TranslationGateway;
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{Instrument, debug, info, warn};

/// What happened to one routed message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteSummary {
    /// Delivery attempts, echo included.
    pub recipients: usize,
    pub delivered: usize,
    pub not_joined: usize,
    pub dropped: usize,
    /// Distinct translations requested.
    pub translations: usize,
}

impl RouteSummary {
    fn record(&mut self, outcome: DeliveryOutcome) {
        self.recipients += 1;
        match outcome {
            DeliveryOutcome::Delivered => self.delivered += 1,
            DeliveryOutcome::NotJoined => self.not_joined += 1,
            DeliveryOutcome::Dropped => self.dropped += 1,
        }
        crate::metrics::record_delivery(outcome.as_str());
    }
}

/// Routes chat messages from one sender to every known user.
#[derive(Clone)]
pub struct MessageRouter {
    directory: Arc<dyn UserDirectory>,
    rooms: Arc<RoomRegistry>,
    gateway: TranslationGateway,
    fallback_language: Language,
}

impl MessageRouter {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        rooms: Arc<RoomRegistry>,
        gateway: TranslationGateway,
        fallback_language: Language,
    ) -> Self {
        Self {
            directory,
            rooms,
            gateway,
            fallback_language,
        }
    }

    /// Deliver `text` from `sender` to everyone.
    pub async fn route(&self, sender: &str, text: &str) -> RouteSummary {
        self.route_inner(sender, text)
            .instrument(spans::route(sender))
            .await
    }

    async fn route_inner(&self, sender: &str, text: &str) -> RouteSummary {
        let source = match self.directory.find_by_username(sender) {
            Some(user) => user.language,
            None => {
                warn!(fallback = %self.fallback_language, "Unknown sender, using fallback language");
                self.fallback_language
            }
        };

        let mut summary = RouteSummary::default();
        let original = Arc::new(ServerEvent::receive(sender, text));

        // Echo, verbatim, before anything can wait on a translation.
        summary.record(self.rooms.deliver(sender, Arc::clone(&original)));

        let mut pending: Vec<(Language, Vec<String>)> = Vec::new();
        for user in self.directory.list_all() {
            if user.username == sender {
                continue;
            }
            if user.language == source {
                summary.record(self.rooms.deliver(&user.username, Arc::clone(&original)));
                continue;
            }
            // Nobody to hand a translation to.
            if !self.rooms.is_joined(&user.username) {
                summary.record(DeliveryOutcome::NotJoined);
                continue;
            }
            match pending.iter_mut().find(|(lang, _)| *lang == user.language) {
                Some((_, names)) => names.push(user.username),
                None => pending.push((user.language, vec![user.username])),
            }
        }

        summary.translations = pending.len();
        let translations = join_all(
            pending
                .iter()
                .map(|(target, _)| self.gateway.translate(text, source, *target)),
        )
        .await;

        for ((target, names), translated) in pending.into_iter().zip(translations) {
            debug!(target = target.code(), recipients = names.len(), "Delivering translation");
            let event = Arc::new(ServerEvent::receive(sender, translated));
            for name in names {
                summary.record(self.rooms.deliver(&name, Arc::clone(&event)));
            }
        }

        crate::metrics::record_route(summary.recipients);
        summary
    }
}

/// Handle `send_message`.
///
/// An explicit username wins; otherwise the connection's latest join is used.
pub async fn handle_send(
    hub: &Hub,
    session: &Session,
    username: Option<String>,
    message: String,
) -> HandlerResult {
    let sender = match username.as_deref().map(str::trim) {
        Some("") => return Err(HandlerError::EmptyUsername),
        // Same trimming as `join`.
        Some(name) => name.to_string(),
        None => session
            .current()
            .map(str::to_string)
            .ok_or(HandlerError::NotJoined)?,
    };

    // Whitespace-only text is refused, not relayed.
    if message.trim().is_empty() {
        return Err(HandlerError::EmptyMessage);
    }

    info!(sender = %sender, chars = message.chars().count(), "Received message");
    let summary = hub.router.route(&sender, &message).await;
    debug!(?summary, "Message routed");
    Ok(())
}
