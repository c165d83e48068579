//! Serenity event handler: forwards gateway reaction events to the hub.

use reaction_menu::{MessageRef, ReactionEventKind, UserId};
use serenity::async_trait;
use serenity::model::channel::Reaction;
use serenity::model::gateway::Ready;
use serenity::model::id::{ChannelId, MessageId};
use serenity::prelude::*;
use tracing::{debug, info};

use crate::client::emoji_key;
use crate::health::AppState;
use crate::hub::ReactionHub;

pub struct Handler;

async fn hub(ctx: &Context) -> Option<ReactionHub> {
    let data = ctx.data.read().await;
    data.get::<ReactionHub>().cloned()
}

/// Publish a gateway reaction event as a menu event.
///
/// Returns the number of menus reached.
pub fn forward(hub: &ReactionHub, kind: ReactionEventKind, reaction: &Reaction) -> usize {
    let Some(emoji) = emoji_key(&reaction.emoji) else {
        debug!("Ignoring unsupported reaction type on {}", reaction.message_id);
        return 0;
    };
    let message = MessageRef::new(reaction.channel_id.get(), reaction.message_id.get());
    let user = match kind {
        ReactionEventKind::Dispose => None,
        _ => reaction.user_id.map(|id| UserId(id.get())),
    };
    hub.publish_reaction(kind, message, emoji, user)
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            "Discord bot connected as {}#{:04}",
            ready.user.name,
            ready.user.discriminator.map_or(0, |d| d.get())
        );

        let data = ctx.data.read().await;
        if let Some(state) = data.get::<AppState>() {
            state.set_bot_username(ready.user.name.clone()).await;
        }
    }

    async fn reaction_add(&self, ctx: Context, add_reaction: Reaction) {
        if let Some(hub) = hub(&ctx).await {
            forward(&hub, ReactionEventKind::Collect, &add_reaction);
        }
    }

    async fn reaction_remove(&self, ctx: Context, removed_reaction: Reaction) {
        if let Some(hub) = hub(&ctx).await {
            forward(&hub, ReactionEventKind::Remove, &removed_reaction);
        }
    }

    async fn reaction_remove_emoji(&self, ctx: Context, removed_reactions: Reaction) {
        if let Some(hub) = hub(&ctx).await {
            forward(&hub, ReactionEventKind::Dispose, &removed_reactions);
        }
    }

    async fn reaction_remove_all(
        &self,
        ctx: Context,
        channel_id: ChannelId,
        removed_from_message_id: MessageId,
    ) {
        if let Some(hub) = hub(&ctx).await {
            hub.publish_all_removed(MessageRef::new(
                channel_id.get(),
                removed_from_message_id.get(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use reaction_menu::{EmojiKey, RemoteEvent};

    fn reaction(user_id: Option<u64>, emoji: serde_json::Value) -> Reaction {
        let mut json = serde_json::json!({
            "channel_id": "10",
            "message_id": "20",
            "emoji": emoji,
            "burst": false,
            "burst_colors": [],
            "type": 0
        });
        if let Some(id) = user_id {
            json["user_id"] = serde_json::Value::String(id.to_string());
        }
        serde_json::from_value(json).expect("construct Reaction")
    }

    fn unicode(name: &str) -> serde_json::Value {
        serde_json::json!({ "id": null, "name": name })
    }

    #[tokio::test]
    async fn test_forward_collect_carries_user_and_emoji() {
        let hub = ReactionHub::new();
        let mut events = hub.subscribe(MessageRef::new(10, 20));

        let added = reaction(Some(7), unicode("✅"));
        let reached = forward(&hub, ReactionEventKind::Collect, &added);
        assert_eq!(reached, 1);

        match events.next().await {
            Some(RemoteEvent::Reaction(event)) => {
                assert_eq!(event.kind, ReactionEventKind::Collect);
                assert_eq!(event.user, Some(UserId(7)));
                assert_eq!(event.reaction.emoji, EmojiKey::unicode("✅"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_forward_dispose_has_no_user() {
        let hub = ReactionHub::new();
        let mut events = hub.subscribe(MessageRef::new(10, 20));

        forward(&hub, ReactionEventKind::Dispose, &reaction(None, unicode("🍕")));

        match events.next().await {
            Some(RemoteEvent::Reaction(event)) => {
                assert_eq!(event.kind, ReactionEventKind::Dispose);
                assert_eq!(event.user, None);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_forward_custom_emoji() {
        let hub = ReactionHub::new();
        let _events = hub.subscribe(MessageRef::new(10, 20));

        let reached = forward(
            &hub,
            ReactionEventKind::Remove,
            &reaction(Some(7), serde_json::json!({ "id": "555", "name": "blob" })),
        );

        assert_eq!(reached, 1);
    }
}
