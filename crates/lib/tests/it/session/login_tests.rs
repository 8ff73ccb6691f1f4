use haven::session::{Credential, SessionState};
use haven::{Clock, Identity};

use crate::context::TestContext;
use crate::helpers::{PASSPHRASE, identity};

#[tokio::test]
async fn sixth_attempt_is_throttled_even_with_the_right_passphrase() {
    let ctx = TestContext::new();
    let client = ctx.client();
    client.create_identity(PASSPHRASE).await.unwrap();

    for _ in 0..5 {
        let err = client
            .login(Credential::passphrase("wrong but long passphrase"))
            .await
            .unwrap_err();
        assert!(err.is_decryption_failed());
    }

    let err = client
        .login(Credential::passphrase(PASSPHRASE))
        .await
        .unwrap_err();
    assert!(err.is_rate_limited());
    assert!(err.is_retryable_after_delay());
    assert_eq!(client.session_state().await, SessionState::LoggedOut);

    ctx.clock().advance_secs(15 * 60);
    client
        .login(Credential::passphrase(PASSPHRASE))
        .await
        .unwrap();
    assert_eq!(client.session_state().await, SessionState::Active);
    assert_eq!(client.session().login_attempts().await.unwrap().attempts(), 0);
}

#[tokio::test]
async fn secret_key_credential_logs_in_without_a_record() {
    let ctx = TestContext::new();
    let client = ctx.client();
    let me = identity(3);

    let metadata = client
        .login(Credential::secret_key(me.to_nsec().as_str()))
        .await
        .unwrap();
    assert_eq!(metadata.public_key, me.public_key());
    assert_eq!(metadata.created_at, ctx.clock().now_millis());
    assert_eq!(client.public_key().await.unwrap(), me.public_key());
}

#[tokio::test]
async fn malformed_secret_key_counts_as_failed_attempt() {
    let ctx = TestContext::new();
    let client = ctx.client();

    let err = client
        .login(Credential::secret_key("nsec1notakey"))
        .await
        .unwrap_err();
    assert!(err.is_invalid_key_format());
    assert_eq!(client.session().login_attempts().await.unwrap().attempts(), 1);
}

#[tokio::test]
async fn login_replaces_the_previous_session() {
    let ctx = TestContext::new();
    let (client, first) = ctx.logged_in_client().await;
    let before = client.session().current().await.unwrap();

    let other = Identity::generate();
    let after = client
        .login(Credential::secret_key(other.to_secret_hex().as_str()))
        .await
        .unwrap();

    assert_ne!(before.id, after.id);
    assert_ne!(first, other.public_key());
    assert_eq!(client.public_key().await.unwrap(), other.public_key());
}

#[tokio::test]
async fn failed_login_ends_the_previous_session() {
    let ctx = TestContext::new();
    let (client, _) = ctx.logged_in_client().await;

    assert!(
        client
            .login(Credential::passphrase("wrong but long passphrase"))
            .await
            .is_err()
    );
    assert_eq!(client.session_state().await, SessionState::LoggedOut);
    assert!(client.public_key().await.unwrap_err().is_not_authenticated());
}

#[tokio::test]
async fn passphrase_login_without_record_is_not_found() {
    let ctx = TestContext::new();
    let err = ctx
        .client()
        .login(Credential::passphrase(PASSPHRASE))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
