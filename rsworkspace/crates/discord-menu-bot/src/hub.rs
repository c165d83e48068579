//! Fan-out of gateway reaction events to the menus watching each message.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use futures::channel::mpsc;
use futures::stream::{BoxStream, StreamExt};
use reaction_menu::{
    EmojiKey, MessageRef, Reaction, ReactionEvent, ReactionEventKind, RemoteEvent, UserId,
};
use serenity::prelude::TypeMapKey;
use tracing::debug;

type Subscribers = HashMap<MessageRef, Vec<mpsc::UnboundedSender<RemoteEvent>>>;

/// Registry of live subscriptions, keyed by message.
///
/// The serenity event handler publishes into it; [`crate::client::SerenityReactionClient`]
/// hands out its streams.
#[derive(Clone, Default)]
pub struct ReactionHub {
    subscribers: Arc<Mutex<Subscribers>>,
}

impl TypeMapKey for ReactionHub {
    type Value = ReactionHub;
}

impl ReactionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream of events on `message`, open until the hub is dropped.
    pub fn subscribe(&self, message: MessageRef) -> BoxStream<'static, RemoteEvent> {
        let (tx, rx) = mpsc::unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(message)
            .or_default()
            .push(tx);
        debug!("New subscription on {}", message);
        rx.boxed()
    }

    /// Deliver `event` to every subscriber of `message`.
    ///
    /// Returns the number of subscribers reached. Subscribers whose stream
    /// was dropped are forgotten.
    pub fn publish(&self, message: MessageRef, event: RemoteEvent) -> usize {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(senders) = subscribers.get_mut(&message) else {
            return 0;
        };
        senders.retain(|tx| tx.unbounded_send(event.clone()).is_ok());
        let reached = senders.len();
        if reached == 0 {
            subscribers.remove(&message);
        }
        reached
    }

    /// Publish a per-emoji reaction event.
    pub fn publish_reaction(
        &self,
        kind: ReactionEventKind,
        message: MessageRef,
        emoji: EmojiKey,
        user: Option<UserId>,
    ) -> usize {
        let event = ReactionEvent {
            kind,
            reaction: Reaction::new(message, emoji),
            user,
        };
        self.publish(message, RemoteEvent::Reaction(event))
    }

    pub fn publish_all_removed(&self, message: MessageRef) -> usize {
        self.publish(message, RemoteEvent::AllRemoved(message))
    }

    #[cfg(test)]
    pub fn subscriber_count(&self, message: MessageRef) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&message)
            .map_or(0, Vec::len)
    }
}
