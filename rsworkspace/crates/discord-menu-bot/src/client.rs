//! [`ReactionClient`] over serenity's REST client and the gateway hub.

#[path = "client_tests.rs"]
mod client_tests;

use std::sync::Arc;

use futures::stream::BoxStream;
use reaction_menu::{
    EmojiKey, Message, MessageRef, Reaction, ReactionClient, RemoteEvent, RemoteFailure, UserId,
};
use serenity::http::Http;
use serenity::model::channel::ReactionType;
use serenity::model::id::{ChannelId, EmojiId, MessageId, UserId as DiscordUserId};
use tracing::{debug, warn};

use crate::errors::DiscordClientError;
use crate::hub::ReactionHub;

/// Discord's maximum page size for the reaction users endpoint.
const REACTORS_PAGE: u8 = 100;

pub fn reaction_type(emoji: &EmojiKey) -> ReactionType {
    match emoji {
        EmojiKey::Unicode(s) => ReactionType::Unicode(s.clone()),
        EmojiKey::Custom { id, name, animated } => ReactionType::Custom {
            animated: *animated,
            id: EmojiId::new(*id),
            name: name.clone(),
        },
    }
}

/// `None` for reaction kinds a menu cannot offer.
#[allow(unreachable_patterns)]
pub fn emoji_key(reaction: &ReactionType) -> Option<EmojiKey> {
    match reaction {
        ReactionType::Unicode(s) => Some(EmojiKey::Unicode(s.clone())),
        ReactionType::Custom { animated, id, name } => Some(EmojiKey::Custom {
            id: id.get(),
            name: name.clone(),
            animated: *animated,
        }),
        _ => None,
    }
}

fn ids(message: MessageRef) -> (ChannelId, MessageId) {
    (
        ChannelId::new(message.channel_id),
        MessageId::new(message.message_id),
    )
}

#[derive(Clone)]
pub struct SerenityReactionClient {
    http: Arc<Http>,
    hub: ReactionHub,
    me: UserId,
    page_size: u8,
}

impl SerenityReactionClient {
    pub fn new(http: Arc<Http>, hub: ReactionHub, me: UserId) -> Self {
        Self {
            http,
            hub,
            me,
            page_size: REACTORS_PAGE,
        }
    }

    #[cfg(test)]
    fn with_page_size(mut self, page_size: u8) -> Self {
        self.page_size = page_size;
        self
    }

    fn fail(
        operation: &'static str,
        target: MessageRef,
    ) -> impl FnOnce(serenity::Error) -> DiscordClientError {
        move |err| {
            let err = DiscordClientError::classify(operation, &err);
            if err.is_gone() {
                debug!("{} on {}: {}", operation, target, err);
            } else if err.code.is_permanent() {
                warn!("{} on {}: {}", operation, target, err);
            } else {
                debug!("{} on {} (transient): {}", operation, target, err);
            }
            err
        }
    }
}

impl ReactionClient for SerenityReactionClient {
    type Error = DiscordClientError;

    async fn fetch_message(&self, message: MessageRef) -> Result<Message, Self::Error> {
        let (channel_id, message_id) = ids(message);
        let fetched = self
            .http
            .get_message(channel_id, message_id)
            .await
            .map_err(Self::fail("get_message", message))?;

        let reactions = fetched
            .reactions
            .iter()
            .filter_map(|r| emoji_key(&r.reaction_type))
            .map(|emoji| Reaction::new(message, emoji))
            .collect();

        Ok(Message {
            reference: message,
            reactions,
        })
    }

    async fn fetch_reactors(&self, reaction: &Reaction) -> Result<Vec<UserId>, Self::Error> {
        let (channel_id, message_id) = ids(reaction.message);
        let emoji = reaction_type(&reaction.emoji);
        let mut reactors = Vec::new();
        let mut after = None;

        loop {
            let page = self
                .http
                .get_reaction_users(channel_id, message_id, &emoji, self.page_size, after)
                .await
                .map_err(Self::fail("get_reaction_users", reaction.message))?;

            let full = page.len() >= usize::from(self.page_size);
            after = page.last().map(|user| user.id.get());
            reactors.extend(page.into_iter().map(|user| UserId(user.id.get())));

            if !full || after.is_none() {
                break;
            }
        }

        Ok(reactors)
    }

    async fn add_reaction(&self, message: MessageRef, emoji: &EmojiKey) -> Result<(), Self::Error> {
        let (channel_id, message_id) = ids(message);
        self.http
            .create_reaction(channel_id, message_id, &reaction_type(emoji))
            .await
            .map_err(Self::fail("create_reaction", message))
    }

    async fn remove_vote(&self, reaction: &Reaction, user: UserId) -> Result<(), Self::Error> {
        let (channel_id, message_id) = ids(reaction.message);
        let emoji = reaction_type(&reaction.emoji);
        let result = if user == self.me {
            self.http
                .delete_reaction_me(channel_id, message_id, &emoji)
                .await
        } else {
            self.http
                .delete_reaction(channel_id, message_id, DiscordUserId::new(user.get()), &emoji)
                .await
        };
        result.map_err(Self::fail("delete_reaction", reaction.message))
    }

    async fn remove_reaction(&self, reaction: &Reaction) -> Result<(), Self::Error> {
        let (channel_id, message_id) = ids(reaction.message);
        self.http
            .delete_message_reaction_emoji(channel_id, message_id, &reaction_type(&reaction.emoji))
            .await
            .map_err(Self::fail("delete_message_reaction_emoji", reaction.message))
    }

    async fn subscribe(
        &self,
        message: MessageRef,
    ) -> Result<BoxStream<'static, RemoteEvent>, Self::Error> {
        Ok(self.hub.subscribe(message))
    }
}
