use std::future::Future;

use futures::stream::BoxStream;

use crate::emoji::EmojiKey;
use crate::types::{Message, MessageRef, Reaction, RemoteEvent, UserId};

/// Classification a remote failure must expose to the menu.
pub trait RemoteFailure: std::error::Error + Send + Sync + 'static {
    /// True when the call failed because the message or reaction no longer
    /// exists. Such failures are swallowed; everything else propagates.
    fn is_gone(&self) -> bool;
}

/// Chat-platform capabilities the menu consumes.
///
/// Implemented by the serenity adapter in production and by
/// `MockReactionClient` in tests. All calls address the remote state
/// directly; nothing is cached between calls.
pub trait ReactionClient: Send + Sync + Clone + 'static {
    type Error: RemoteFailure;

    /// Fetch the message together with its current reactions.
    fn fetch_message(
        &self,
        message: MessageRef,
    ) -> impl Future<Output = Result<Message, Self::Error>> + Send;

    /// Every user currently voting on `reaction`. May be empty.
    fn fetch_reactors(
        &self,
        reaction: &Reaction,
    ) -> impl Future<Output = Result<Vec<UserId>, Self::Error>> + Send;

    /// React with `emoji` as the controller. Adding an existing vote is a no-op.
    fn add_reaction(
        &self,
        message: MessageRef,
        emoji: &EmojiKey,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Retract one user's vote. Retracting an absent vote is a no-op.
    fn remove_vote(
        &self,
        reaction: &Reaction,
        user: UserId,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Remove the reaction entity with all its votes.
    fn remove_reaction(
        &self,
        reaction: &Reaction,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Stream of reaction events observed on `message`, unfiltered.
    fn subscribe(
        &self,
        message: MessageRef,
    ) -> impl Future<Output = Result<BoxStream<'static, RemoteEvent>, Self::Error>> + Send;
}
