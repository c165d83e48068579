//! REST adapter tests against a wiremock Discord.
//!
//! Uses serenity's `HttpBuilder::proxy()` to route every API call to a
//! local mock server and asserts on the exact method and path.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use reaction_menu::{
        EmojiKey, Menu, MenuError, MenuOption, MessageRef, Reaction, ReactionClient,
        RemoteFailure, UserId,
    };
    use serenity::model::channel::ReactionType;
    use serenity::model::id::EmojiId;
    use wiremock::matchers::{method, path, path_regex, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::client::{emoji_key, reaction_type, SerenityReactionClient};
    use crate::errors::DiscordErrorCode;
    use crate::hub::ReactionHub;

    const ME: UserId = UserId(1);

    fn msg() -> MessageRef {
        MessageRef::new(10, 20)
    }

    fn proxy_http(proxy_url: &str) -> Arc<serenity::http::Http> {
        Arc::new(
            serenity::http::HttpBuilder::new("fake-token")
                .proxy(proxy_url)
                .ratelimiter_disabled(true)
                .build(),
        )
    }

    fn client(server: &MockServer) -> SerenityReactionClient {
        SerenityReactionClient::new(proxy_http(&server.uri()), ReactionHub::new(), ME)
    }

    fn user_json(id: u64) -> serde_json::Value {
        serde_json::json!({
            "id": id.to_string(),
            "username": format!("user{}", id),
            "global_name": null,
            "avatar": null,
            "bot": false
        })
    }

    fn reaction_json(emoji: serde_json::Value, count: u64, me: bool) -> serde_json::Value {
        serde_json::json!({
            "count": count,
            "count_details": { "burst": 0, "normal": count },
            "me": me,
            "me_burst": false,
            "burst_colors": [],
            "emoji": emoji
        })
    }

    fn message_json(reactions: Vec<serde_json::Value>) -> serde_json::Value {
        serde_json::json!({
            "id": "20",
            "channel_id": "10",
            "author": user_json(1),
            "content": "Pick one",
            "timestamp": "2024-01-01T00:00:00+00:00",
            "edited_timestamp": null,
            "tts": false,
            "mention_everyone": false,
            "mentions": [],
            "mention_roles": [],
            "attachments": [],
            "embeds": [],
            "pinned": false,
            "type": 0,
            "reactions": reactions
        })
    }

    fn not_found() -> ResponseTemplate {
        ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "code": 10008,
            "message": "Unknown Message"
        }))
    }

    fn forbidden() -> ResponseTemplate {
        ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "code": 50013,
            "message": "Missing Permissions"
        }))
    }

    // ── emoji conversion ──────────────────────────────────────────────────────

    #[test]
    fn test_unicode_emoji_converts_both_ways() {
        let key = EmojiKey::unicode("✅");
        let rt = reaction_type(&key);
        assert!(matches!(&rt, ReactionType::Unicode(s) if s == "✅"));
        assert_eq!(emoji_key(&rt), Some(key));
    }

    #[test]
    fn test_custom_emoji_converts_both_ways() {
        let key = EmojiKey::custom(555, "blob");
        let rt = reaction_type(&key);
        match &rt {
            ReactionType::Custom { animated, id, name } => {
                assert!(!animated);
                assert_eq!(*id, EmojiId::new(555));
                assert_eq!(name.as_deref(), Some("blob"));
            }
            other => panic!("unexpected reaction type: {:?}", other),
        }
        assert_eq!(emoji_key(&rt), Some(key));
    }

    // ── fetch_message ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_fetch_message_maps_reactions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v10/channels/10/messages/20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_json(vec![
                reaction_json(serde_json::json!({ "id": null, "name": "✅" }), 2, true),
                reaction_json(
                    serde_json::json!({ "id": "555", "name": "blob", "animated": false }),
                    1,
                    false,
                ),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let message = client(&server).fetch_message(msg()).await.unwrap();

        assert_eq!(message.reference, msg());
        assert_eq!(message.reactions.len(), 2);
        assert_eq!(message.reactions[0].emoji, EmojiKey::unicode("✅"));
        assert_eq!(message.reactions[1].emoji, EmojiKey::custom(555, "blob"));
    }

    #[tokio::test]
    async fn test_deleted_message_is_gone() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v10/channels/10/messages/20"))
            .respond_with(not_found())
            .mount(&server)
            .await;

        let err = client(&server).fetch_message(msg()).await.unwrap_err();

        assert!(err.is_gone());
        assert_eq!(err.code, DiscordErrorCode::UnknownMessage);
        assert_eq!(err.http_status, 404);
    }

    // ── fetch_reactors ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_fetch_reactors_follows_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/api/v10/channels/10/messages/20/reactions/[^/]+/?$"))
            .and(query_param_is_missing("after"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([user_json(100), user_json(101)])),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/api/v10/channels/10/messages/20/reactions/[^/]+/?$"))
            .and(query_param("after", "101"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([user_json(102)])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let reaction = Reaction::new(msg(), EmojiKey::unicode("✅"));
        let reactors = client(&server)
            .with_page_size(2)
            .fetch_reactors(&reaction)
            .await
            .unwrap();

        assert_eq!(reactors, vec![UserId(100), UserId(101), UserId(102)]);
    }

    #[tokio::test]
    async fn test_fetch_reactors_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/api/v10/channels/10/messages/20/reactions/[^/]+/?$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let reaction = Reaction::new(msg(), EmojiKey::unicode("✅"));
        let reactors = client(&server).fetch_reactors(&reaction).await.unwrap();

        assert!(reactors.is_empty());
    }

    // ── mutations ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_add_reaction_uses_me_route() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path_regex(r"^/api/v10/channels/10/messages/20/reactions/[^/]+/@me$"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .add_reaction(msg(), &EmojiKey::unicode("✅"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_remove_own_vote_uses_me_route() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path_regex(r"^/api/v10/channels/10/messages/20/reactions/[^/]+/@me$"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let reaction = Reaction::new(msg(), EmojiKey::unicode("✅"));
        client(&server).remove_vote(&reaction, ME).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_user_vote_uses_user_route() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path_regex(r"^/api/v10/channels/10/messages/20/reactions/[^/]+/100$"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let reaction = Reaction::new(msg(), EmojiKey::unicode("✅"));
        client(&server)
            .remove_vote(&reaction, UserId(100))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_remove_reaction_clears_emoji() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path_regex(r"^/api/v10/channels/10/messages/20/reactions/[^/@]+$"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let reaction = Reaction::new(msg(), EmojiKey::unicode("🍕"));
        client(&server).remove_reaction(&reaction).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_permissions_is_not_gone() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(forbidden())
            .mount(&server)
            .await;

        let reaction = Reaction::new(msg(), EmojiKey::unicode("✅"));
        let err = client(&server)
            .remove_vote(&reaction, UserId(100))
            .await
            .unwrap_err();

        assert!(!err.is_gone());
        assert_eq!(err.code, DiscordErrorCode::MissingPermissions);
        assert_eq!(err.raw_discord_code, 50013);
    }

    #[tokio::test]
    async fn test_deleted_custom_emoji_is_not_gone() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "code": 10014,
                "message": "Unknown Emoji"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .add_reaction(msg(), &EmojiKey::custom(555, "blob"))
            .await
            .unwrap_err();

        assert_eq!(err.code, DiscordErrorCode::UnknownEmoji);
        assert!(!err.is_gone());
    }

    // ── menu over REST ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_menu_startup_adds_missing_option_then_subscribes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v10/channels/10/messages/20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_json(vec![])))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path_regex(r"^/api/v10/channels/10/messages/20/reactions/[^/]+/@me$"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let hub = ReactionHub::new();
        let client = SerenityReactionClient::new(proxy_http(&server.uri()), hub.clone(), ME);
        let (menu, running) = Menu::new(
            client,
            ME,
            msg(),
            [MenuOption::new(EmojiKey::unicode("✅"))],
            None,
        );

        tokio::time::timeout(Duration::from_secs(5), async {
            while hub.subscriber_count(msg()) == 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("menu did not subscribe");
        running.abort();

        let requests = server.received_requests().await.unwrap();
        let puts = requests
            .iter()
            .filter(|r| r.method.to_string() == "PUT")
            .count();
        assert_eq!(puts, 1);
        assert!(menu.last_message().is_some());
    }

    #[tokio::test]
    async fn test_reconcile_surfaces_permission_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v10/channels/10/messages/20"))
            .respond_with(forbidden())
            .mount(&server)
            .await;

        let (menu, running) =
            Menu::new(client(&server), ME, msg(), Vec::<MenuOption>::new(), None);
        running.abort();

        let err = menu.reconcile().await.unwrap_err();

        assert!(matches!(err, MenuError::Remote(_)));
        assert!(err.to_string().contains("Missing Permissions"));
    }
}
