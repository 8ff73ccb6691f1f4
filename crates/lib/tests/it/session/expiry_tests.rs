use std::time::Duration;

use haven::session::{ExpiryStatus, SessionState};

use crate::context::TestContext;

#[tokio::test]
async fn warning_then_expiry_at_the_idle_deadline() {
    let ctx = TestContext::new();
    let (client, _) = ctx.logged_in_client().await;

    ctx.clock().advance_secs(10 * 60);
    assert_eq!(
        client.check_expiry().await.unwrap(),
        ExpiryStatus::Active {
            remaining: Duration::from_secs(20 * 60)
        }
    );

    ctx.clock().advance_secs(19 * 60);
    assert_eq!(
        client.check_expiry().await.unwrap(),
        ExpiryStatus::Warning {
            remaining: Duration::from_secs(60)
        }
    );

    ctx.clock().advance_secs(60);
    assert_eq!(client.check_expiry().await.unwrap(), ExpiryStatus::Expired);
    assert_eq!(client.session_state().await, SessionState::IdleExpired);
    assert_eq!(client.check_expiry().await.unwrap(), ExpiryStatus::Expired);
}

#[tokio::test]
async fn activity_pushes_the_deadline_back() {
    let ctx = TestContext::new();
    let (client, _) = ctx.logged_in_client().await;

    ctx.clock().advance_secs(25 * 60);
    client.touch().await.unwrap();
    ctx.clock().advance_secs(25 * 60);

    assert!(client.check_expiry().await.unwrap().is_usable());
    assert!(client.public_key().await.is_ok());
}

#[tokio::test]
async fn expired_session_refuses_operations() {
    let ctx = TestContext::new();
    let (client, _) = ctx.logged_in_client().await;

    ctx.clock().advance_secs(31 * 60);
    let err = client.touch().await.unwrap_err();
    assert!(err.is_not_authenticated());
    assert_eq!(client.session_state().await, SessionState::IdleExpired);
    assert!(client.session().current().await.is_none());
}

#[tokio::test]
async fn logout_is_immediate_and_repeatable() {
    let ctx = TestContext::new();
    let (client, _) = ctx.logged_in_client().await;

    client.logout().await.unwrap();
    assert_eq!(client.session_state().await, SessionState::LoggedOut);
    assert_eq!(client.check_expiry().await.unwrap(), ExpiryStatus::NoSession);

    client.logout().await.unwrap();
    assert!(client.public_key().await.unwrap_err().is_not_authenticated());
}
