use haven::event::KIND_GIFT_WRAP;
use haven::relay::{Filter, RelayGateway};
use haven::session::Credential;
use haven::{Clock, Identity};

use crate::context::TestContext;
use crate::helpers::PASSPHRASE;

#[tokio::test]
async fn direct_message_reaches_recipient_and_sender() {
    let ctx = TestContext::new();
    let (alice, alice_key) = ctx.logged_in_client().await;
    let (bob, bob_key) = ctx.logged_in_client().await;

    alice
        .send_direct_message(&bob_key, "bring the blankets")
        .await
        .unwrap();
    assert_eq!(ctx.relay().len().await, 2);

    let inbox = bob.fetch_direct_messages().await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].sender, alice_key);
    assert_eq!(inbox[0].recipient, bob_key);
    assert_eq!(inbox[0].body, "bring the blankets");

    let sent = alice.fetch_direct_messages().await.unwrap();
    assert_eq!(sent, inbox);
}

#[tokio::test]
async fn relay_contents_do_not_reveal_the_sender() {
    let ctx = TestContext::new();
    let (alice, alice_key) = ctx.logged_in_client().await;
    let (_bob, bob_key) = ctx.logged_in_client().await;

    let gift = alice
        .send_direct_message(&bob_key, "private plans")
        .await
        .unwrap();
    assert_eq!(gift.recipient(), Some(bob_key));

    let now = ctx.clock().now_secs();
    let jitter = alice.config().messaging.timestamp_jitter_secs;
    for event in ctx.relay().events().await {
        let json = event.to_json().unwrap();
        assert_ne!(event.pubkey, alice_key);
        assert!(!json.contains(&alice_key.to_hex()));
        assert!(!json.contains("private plans"));
        assert!(event.created_at < now && event.created_at >= now - jitter);
    }
}

#[tokio::test]
async fn unauthenticated_query_for_wraps_is_refused() {
    let ctx = TestContext::new();
    let (alice, _) = ctx.logged_in_client().await;
    let bob = Identity::generate().public_key();
    alice.send_direct_message(&bob, "hello").await.unwrap();

    let err = ctx
        .relay()
        .query(&Filter::new().kind(KIND_GIFT_WRAP).p_tag(bob))
        .await
        .unwrap_err();
    assert!(err.is_not_authenticated());
}

#[tokio::test]
async fn messages_arrive_oldest_first() {
    let ctx = TestContext::new();
    let (alice, _) = ctx.logged_in_client().await;
    let (bob, bob_key) = ctx.logged_in_client().await;

    // Spacing the sends beyond the jitter bound fixes their order. Both sessions are
    // kept alive along the way.
    let step = alice.config().messaging.timestamp_jitter_secs / 2 + 1;
    for body in ["first", "second", "third"] {
        alice.send_direct_message(&bob_key, body).await.unwrap();
        for _ in 0..2 {
            ctx.clock().advance_secs(step);
            alice.touch().await.unwrap();
            bob.touch().await.unwrap();
        }
    }

    let bodies: Vec<_> = bob
        .fetch_direct_messages()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.body)
        .collect();
    assert_eq!(bodies, ["first", "second", "third"]);
}

#[tokio::test]
async fn sending_requires_a_session() {
    let ctx = TestContext::new();
    let (alice, _) = ctx.logged_in_client().await;
    alice.logout().await.unwrap();

    let err = alice
        .send_direct_message(&Identity::generate().public_key(), "hello")
        .await
        .unwrap_err();
    assert!(err.is_not_authenticated());
    assert!(ctx.relay().is_empty().await);
}

#[tokio::test]
async fn forgotten_identity_cannot_log_back_in() {
    let ctx = TestContext::new();
    let (alice, _) = ctx.logged_in_client().await;

    alice.forget_identity().await.unwrap();
    assert!(alice.stored_record().await.unwrap().is_none());
    let err = alice
        .login(Credential::passphrase(PASSPHRASE))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
