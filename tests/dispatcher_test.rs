//! Command dispatch tests
//! Run with: cargo test --test dispatcher_test

mod common;

use std::sync::Arc;

use common::{ensure_init, Call, FakeClient, StubResolver};
use wa_groupbot::application::errors::MediaError;
use wa_groupbot::application::messaging::MessageDispatcher;
use wa_groupbot::application::services::command_service::{
    ADMIN_REFUSAL, DOWNLOAD_CAPTION, DOWNLOAD_ERROR, DOWNLOAD_FAILED, REMOVE_REFUSAL,
};
use wa_groupbot::application::services::CommandService;
use wa_groupbot::domain::entities::{InboundMessage, MediaRef, Participant, ParticipantAction};

const GROUP: &str = "g1@g.us";
const ADMIN: &str = "999@s.whatsapp.net";
const MEMBER: &str = "111@s.whatsapp.net";

fn dispatcher_with(resolver: StubResolver) -> MessageDispatcher {
    MessageDispatcher::new(CommandService::with_defaults(Arc::new(resolver)))
}

fn dispatcher() -> MessageDispatcher {
    dispatcher_with(StubResolver(Ok("https://cdn.example/v.mp4".to_string())))
}

fn group() -> FakeClient {
    FakeClient::with_participants(vec![
        Participant::admin(ADMIN),
        Participant::member(MEMBER),
        Participant::member("222@s.whatsapp.net"),
    ])
}

fn msg(sender: &str, text: &str) -> InboundMessage {
    InboundMessage::new(GROUP, sender, text)
}

#[tokio::test]
async fn test_self_authored_messages_are_ignored() {
    ensure_init();
    let client = group();

    for text in ["!hello", "!help", "!admin", "@all", "!remove 123", "!download https://x"] {
        let message = msg(ADMIN, text).with_from_self(true);
        let handled = dispatcher().dispatch(&client, &message).await.unwrap();
        assert_eq!(handled, None);
    }
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_non_group_messages_are_ignored() {
    let client = group();
    let message = InboundMessage::new(ADMIN, ADMIN, "!hello");

    assert_eq!(dispatcher().dispatch(&client, &message).await.unwrap(), None);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_text_is_ignored() {
    let client = group();

    for text in ["hello", "!hello world", "!remove", "!download"] {
        assert_eq!(dispatcher().dispatch(&client, &msg(MEMBER, text)).await.unwrap(), None);
    }
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_hello_mentions_exactly_the_sender() {
    let client = group();

    let handled = dispatcher().dispatch(&client, &msg(MEMBER, "!hello")).await.unwrap();
    assert_eq!(handled, Some("!hello"));

    let sent = client.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text.as_deref(), Some("👋 Hello @111!"));
    assert_eq!(sent[0].mentions, vec![MEMBER.to_string()]);
    assert!(matches!(&client.calls()[0], Call::Send { jid, .. } if jid == GROUP));
}

#[tokio::test]
async fn test_help_lists_commands() {
    let client = group();

    dispatcher().dispatch(&client, &msg(MEMBER, "!help")).await.unwrap();

    assert_eq!(
        client.sent_texts(),
        vec!["🛠 *Available Commands*:\n!hello\n!help\n!admin\n@all\n!download <url>\n!remove <number>"]
    );
}

#[tokio::test]
async fn test_admin_greets_admins_only() {
    let client = group();
    dispatcher().dispatch(&client, &msg(ADMIN, "!admin")).await.unwrap();
    assert_eq!(client.sent_texts(), vec!["🫡 Hello Admin @999"]);
    assert_eq!(client.sent()[0].mentions, vec![ADMIN.to_string()]);

    let client = group();
    dispatcher().dispatch(&client, &msg(MEMBER, "!admin")).await.unwrap();
    assert_eq!(client.sent_texts(), vec![ADMIN_REFUSAL]);
    assert!(client.sent()[0].mentions.is_empty());
}

#[tokio::test]
async fn test_admin_metadata_failure_propagates() {
    let client = FakeClient {
        fail_metadata: true,
        ..group()
    };

    let result = dispatcher().dispatch(&client, &msg(ADMIN, "!admin")).await;
    assert!(result.is_err());
    assert!(client.sent().is_empty());
}

#[tokio::test]
async fn test_mention_all_preserves_order_and_count() {
    let client = group();

    dispatcher().dispatch(&client, &msg(MEMBER, "@all")).await.unwrap();

    let sent = client.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text.as_deref(), Some("📢 @all\n@999 @111 @222 "));
    assert_eq!(
        sent[0].mentions,
        vec![ADMIN.to_string(), MEMBER.to_string(), "222@s.whatsapp.net".to_string()]
    );
}

#[tokio::test]
async fn test_remove_strips_non_digits() {
    let client = group();

    let handled = dispatcher().dispatch(&client, &msg(ADMIN, "!remove 123-456")).await.unwrap();
    assert_eq!(handled, Some("!remove "));
    assert_eq!(
        client.removals(),
        vec![(GROUP.to_string(), vec!["123456@s.whatsapp.net".to_string()])]
    );
    assert!(client.sent().is_empty());
}

#[tokio::test]
async fn test_remove_scenario() {
    let client = group();

    dispatcher().dispatch(&client, &msg(ADMIN, "!remove 91-234")).await.unwrap();

    let calls = client.calls();
    assert_eq!(calls[0], Call::Metadata { group_id: GROUP.to_string() });
    assert_eq!(
        calls[1],
        Call::Participants {
            group_id: GROUP.to_string(),
            participants: vec!["91234@s.whatsapp.net".to_string()],
            action: ParticipantAction::Remove,
        }
    );
}

#[tokio::test]
async fn test_remove_refused_for_non_admin() {
    let client = group();

    dispatcher().dispatch(&client, &msg(MEMBER, "!remove 123")).await.unwrap();

    assert!(client.removals().is_empty());
    assert_eq!(client.sent_texts(), vec![REMOVE_REFUSAL]);
}

#[tokio::test]
async fn test_remove_without_digits_is_ignored() {
    let client = group();

    dispatcher().dispatch(&client, &msg(ADMIN, "!remove abc")).await.unwrap();
    dispatcher().dispatch(&client, &msg(ADMIN, "!remove  123")).await.unwrap();

    assert!(client.removals().is_empty());
    assert!(client.sent().is_empty());
}

#[tokio::test]
async fn test_download_sends_resolved_video() {
    let client = group();

    dispatcher()
        .dispatch(&client, &msg(MEMBER, "!download https://www.tiktok.com/@a/video/1"))
        .await
        .unwrap();

    let sent = client.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].video, Some(MediaRef { url: "https://cdn.example/v.mp4".to_string() }));
    assert_eq!(sent[0].caption.as_deref(), Some(DOWNLOAD_CAPTION));
    assert_eq!(sent[0].text, None);
}

#[tokio::test]
async fn test_download_resolution_failure_sends_notice() {
    let client = group();
    let dispatcher = dispatcher_with(StubResolver(Err(MediaError::ResolutionFailed("status \"error\"".to_string()))));

    let result = dispatcher.dispatch(&client, &msg(MEMBER, "!download https://x")).await;

    assert!(result.is_ok());
    assert_eq!(client.sent_texts(), vec![DOWNLOAD_FAILED]);
}

#[tokio::test]
async fn test_download_transport_error_sends_notice() {
    let client = group();
    let dispatcher = dispatcher_with(StubResolver(Err(MediaError::Transport("timed out".to_string()))));

    let result = dispatcher.dispatch(&client, &msg(MEMBER, "!download https://x")).await;

    assert!(result.is_ok());
    assert_eq!(client.sent_texts(), vec![DOWNLOAD_ERROR]);
}
