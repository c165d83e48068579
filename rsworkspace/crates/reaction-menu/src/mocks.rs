//! In-memory chat platform for unit testing without a live gateway.
//!
//! Enabled with the `test-support` feature:
//!
//! ```toml
//! [dev-dependencies]
//! reaction-menu = { path = "...", features = ["test-support"] }
//! ```
//!
//! The mock keeps one message with its reactions, records every call, and can
//! be told to fail the next call of a given kind. Mutations made through the
//! [`ReactionClient`] methods do not emit events; use [`MockReactionClient::react`],
//! [`MockReactionClient::unreact`] or [`MockReactionClient::emit`] to drive
//! subscribers.

use std::sync::{Arc, Mutex};

use futures::channel::mpsc;
use futures::stream::BoxStream;
use futures::StreamExt;

use crate::client::{ReactionClient, RemoteFailure};
use crate::emoji::{same_emoji, EmojiKey};
use crate::types::{Message, MessageRef, Reaction, ReactionEvent, RemoteEvent, UserId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MockError {
    #[error("Unknown Message")]
    Gone,
    #[error("Missing Permissions")]
    Forbidden,
}

impl RemoteFailure for MockError {
    fn is_gone(&self) -> bool {
        matches!(self, Self::Gone)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    FetchMessage,
    FetchReactors,
    AddReaction,
    RemoveVote,
    RemoveReaction,
    Subscribe,
}

/// A recorded call against the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    FetchMessage,
    FetchReactors(EmojiKey),
    AddReaction(EmojiKey),
    RemoveVote(EmojiKey, UserId),
    RemoveReaction(EmojiKey),
    Subscribe,
}

impl RemoteCall {
    pub fn kind(&self) -> CallKind {
        match self {
            Self::FetchMessage => CallKind::FetchMessage,
            Self::FetchReactors(_) => CallKind::FetchReactors,
            Self::AddReaction(_) => CallKind::AddReaction,
            Self::RemoveVote(..) => CallKind::RemoveVote,
            Self::RemoveReaction(_) => CallKind::RemoveReaction,
            Self::Subscribe => CallKind::Subscribe,
        }
    }

    pub fn is_mutation(&self) -> bool {
        matches!(
            self.kind(),
            CallKind::AddReaction | CallKind::RemoveVote | CallKind::RemoveReaction
        )
    }
}

struct MockState {
    exists: bool,
    reactions: Vec<(EmojiKey, Vec<UserId>)>,
    calls: Vec<RemoteCall>,
    failures: Vec<(CallKind, MockError)>,
    subscribers: Vec<mpsc::UnboundedSender<RemoteEvent>>,
}

impl MockState {
    fn entry_mut(&mut self, emoji: &EmojiKey) -> Option<&mut Vec<UserId>> {
        self.reactions
            .iter_mut()
            .find(|(key, _)| same_emoji(key, emoji))
            .map(|(_, users)| users)
    }

    fn add_vote(&mut self, emoji: &EmojiKey, user: UserId) {
        if let Some(users) = self.entry_mut(emoji) {
            if !users.contains(&user) {
                users.push(user);
            }
            return;
        }
        self.reactions.push((emoji.clone(), vec![user]));
    }

    fn take_failure(&mut self, kind: CallKind) -> Option<MockError> {
        let idx = self.failures.iter().position(|(k, _)| *k == kind)?;
        Some(self.failures.remove(idx).1)
    }

    fn prune_empty(&mut self) {
        self.reactions.retain(|(_, users)| !users.is_empty());
    }
}

#[derive(Clone)]
pub struct MockReactionClient {
    me: UserId,
    message: MessageRef,
    state: Arc<Mutex<MockState>>,
}

impl MockReactionClient {
    /// A message with no reactions, controlled by `me`.
    pub fn new(me: UserId, message: MessageRef) -> Self {
        Self {
            me,
            message,
            state: Arc::new(Mutex::new(MockState {
                exists: true,
                reactions: Vec::new(),
                calls: Vec::new(),
                failures: Vec::new(),
                subscribers: Vec::new(),
            })),
        }
    }

    /// Seed a reaction without recording a call or emitting an event.
    pub fn with_reaction(self, emoji: EmojiKey, users: impl IntoIterator<Item = UserId>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for user in users {
                state.add_vote(&emoji, user);
            }
        }
        self
    }

    /// Seed a reaction the message still lists but whose last vote is gone,
    /// as a fetch racing a retraction would report it.
    pub fn with_stale_reaction(self, emoji: EmojiKey) -> Self {
        self.state.lock().unwrap().reactions.push((emoji, Vec::new()));
        self
    }

    pub fn me(&self) -> UserId {
        self.me
    }

    pub fn message_ref(&self) -> MessageRef {
        self.message
    }

    /// `user` reacts with `emoji`; subscribers see a collect event.
    pub fn react(&self, emoji: EmojiKey, user: UserId) {
        let event = {
            let mut state = self.state.lock().unwrap();
            state.add_vote(&emoji, user);
            RemoteEvent::Reaction(ReactionEvent::collect(self.reaction(emoji.clone()), user))
        };
        self.emit(event);
    }

    /// `user` withdraws their vote on `emoji`; subscribers see a remove event.
    pub fn unreact(&self, emoji: EmojiKey, user: UserId) {
        let event = {
            let mut state = self.state.lock().unwrap();
            if let Some(users) = state.entry_mut(&emoji) {
                users.retain(|u| *u != user);
            }
            let reaction = self.reaction(emoji.clone());
            state.prune_empty();
            RemoteEvent::Reaction(ReactionEvent::remove(reaction, user))
        };
        self.emit(event);
    }

    /// Deliver `event` to every live subscriber.
    pub fn emit(&self, event: RemoteEvent) {
        let mut state = self.state.lock().unwrap();
        state
            .subscribers
            .retain(|tx| tx.unbounded_send(event.clone()).is_ok());
    }

    /// Close every subscription stream.
    pub fn close_subscriptions(&self) {
        self.state.lock().unwrap().subscribers.clear();
    }

    pub fn delete_message(&self) {
        let mut state = self.state.lock().unwrap();
        state.exists = false;
        state.reactions.clear();
    }

    /// Make the next call of `kind` fail with `error`.
    pub fn fail_next(&self, kind: CallKind, error: MockError) {
        self.state.lock().unwrap().failures.push((kind, error));
    }

    pub fn reactors(&self, emoji: &EmojiKey) -> Vec<UserId> {
        let mut state = self.state.lock().unwrap();
        state.entry_mut(emoji).cloned().unwrap_or_default()
    }

    /// Emoji currently on the message, in the order they were first added.
    pub fn emojis(&self) -> Vec<EmojiKey> {
        let state = self.state.lock().unwrap();
        state.reactions.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutations(&self) -> Vec<RemoteCall> {
        self.calls().into_iter().filter(RemoteCall::is_mutation).collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        let mut state = self.state.lock().unwrap();
        state.subscribers.retain(|tx| !tx.is_closed());
        state.subscribers.len()
    }

    /// A reaction handle for `emoji` as the platform would report it now.
    pub fn reaction(&self, emoji: EmojiKey) -> Reaction {
        Reaction::new(self.message, emoji)
    }

    fn begin(&self, call: RemoteCall) -> Result<std::sync::MutexGuard<'_, MockState>, MockError> {
        let mut state = self.state.lock().unwrap();
        let kind = call.kind();
        state.calls.push(call);
        if let Some(err) = state.take_failure(kind) {
            return Err(err);
        }
        if !state.exists {
            return Err(MockError::Gone);
        }
        Ok(state)
    }
}

impl ReactionClient for MockReactionClient {
    type Error = MockError;

    async fn fetch_message(&self, message: MessageRef) -> Result<Message, MockError> {
        let state = self.begin(RemoteCall::FetchMessage)?;
        if message != self.message {
            return Err(MockError::Gone);
        }
        let reactions = state
            .reactions
            .iter()
            .map(|(emoji, _)| self.reaction(emoji.clone()))
            .collect();
        Ok(Message {
            reference: self.message,
            reactions,
        })
    }

    async fn fetch_reactors(&self, reaction: &Reaction) -> Result<Vec<UserId>, MockError> {
        let mut state = self.begin(RemoteCall::FetchReactors(reaction.emoji.clone()))?;
        Ok(state.entry_mut(&reaction.emoji).cloned().unwrap_or_default())
    }

    async fn add_reaction(&self, _message: MessageRef, emoji: &EmojiKey) -> Result<(), MockError> {
        let me = self.me;
        let mut state = self.begin(RemoteCall::AddReaction(emoji.clone()))?;
        state.add_vote(emoji, me);
        Ok(())
    }

    async fn remove_vote(&self, reaction: &Reaction, user: UserId) -> Result<(), MockError> {
        let mut state = self.begin(RemoteCall::RemoveVote(reaction.emoji.clone(), user))?;
        if let Some(users) = state.entry_mut(&reaction.emoji) {
            users.retain(|u| *u != user);
        }
        state.prune_empty();
        Ok(())
    }

    async fn remove_reaction(&self, reaction: &Reaction) -> Result<(), MockError> {
        let mut state = self.begin(RemoteCall::RemoveReaction(reaction.emoji.clone()))?;
        state
            .reactions
            .retain(|(key, _)| !same_emoji(key, &reaction.emoji));
        Ok(())
    }

    async fn subscribe(
        &self,
        _message: MessageRef,
    ) -> Result<BoxStream<'static, RemoteEvent>, MockError> {
        let mut state = self.begin(RemoteCall::Subscribe)?;
        let (tx, rx) = mpsc::unbounded();
        state.subscribers.push(tx);
        Ok(rx.boxed())
    }
}
