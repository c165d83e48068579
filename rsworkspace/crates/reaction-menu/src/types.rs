//! Platform-neutral views of messages, reactions and reaction events.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::emoji::EmojiKey;

/// A user on the chat platform.
///
/// The controller's own identity is just another `UserId`; "is this the
/// bot" is always an explicit comparison against the id the menu was
/// constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl UserId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable address of the menu message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel_id: u64,
    pub message_id: u64,
}

impl MessageRef {
    pub fn new(channel_id: u64, message_id: u64) -> Self {
        Self {
            channel_id,
            message_id,
        }
    }
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.channel_id, self.message_id)
    }
}

/// One emoji's reaction entity on a message.
///
/// Only the address is kept. Who voted is always fetched fresh through
/// [`crate::ReactionClient::fetch_reactors`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    pub message: MessageRef,
    pub emoji: EmojiKey,
}

impl Reaction {
    pub fn new(message: MessageRef, emoji: EmojiKey) -> Self {
        Self { message, emoji }
    }
}

/// A freshly fetched copy of the menu message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub reference: MessageRef,
    pub reactions: Vec<Reaction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionEventKind {
    /// A vote was added.
    Collect,
    /// A vote was retracted.
    Remove,
    /// The whole reaction entity is gone.
    Dispose,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReactionEvent {
    pub kind: ReactionEventKind,
    pub reaction: Reaction,
    /// Acting user; `None` for dispose events.
    pub user: Option<UserId>,
}

impl ReactionEvent {
    pub fn collect(reaction: Reaction, user: UserId) -> Self {
        Self {
            kind: ReactionEventKind::Collect,
            reaction,
            user: Some(user),
        }
    }

    pub fn remove(reaction: Reaction, user: UserId) -> Self {
        Self {
            kind: ReactionEventKind::Remove,
            reaction,
            user: Some(user),
        }
    }

    pub fn dispose(reaction: Reaction) -> Self {
        Self {
            kind: ReactionEventKind::Dispose,
            reaction,
            user: None,
        }
    }
}

/// Item of a message's event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteEvent {
    Reaction(ReactionEvent),
    /// Every reaction on the message was cleared in one action.
    AllRemoved(MessageRef),
}
