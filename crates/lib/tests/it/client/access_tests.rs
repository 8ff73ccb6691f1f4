use haven::access::{
    AccessPolicy, Action, CalendarEntry, CalendarView, Decision, Section, Target, Zone,
};
use haven::session::Credential;
use haven::{Client, Identity, PublicKey};

use crate::context::TestContext;
use crate::helpers::PASSPHRASE;

/// Register the community layout on a client's engine.
fn register(client: &Client, admin: &PublicKey) {
    client
        .access()
        .add_zone(Zone::new("Z", "Members", AccessPolicy::ApprovalRequired).with_admin(*admin))
        .unwrap();
    client
        .access()
        .add_section(Section::new("S", "Z", "Planning", AccessPolicy::ApprovalRequired))
        .unwrap();
}

#[tokio::test]
async fn request_and_decide_as_logged_in_identities() {
    let ctx = TestContext::new();
    let (admin, admin_key) = ctx.logged_in_client().await;
    register(&admin, &admin_key);

    // Both sides act on one engine; the member logs in on it with their own key.
    let member = Identity::generate();
    admin
        .login(Credential::secret_key(member.to_nsec().as_str()))
        .await
        .unwrap();
    let pending = admin.request_access(&Target::section("S"), None).await.unwrap();
    let zone_pending = admin
        .access()
        .grant(&member.public_key(), &Target::zone("Z"))
        .unwrap();
    assert!(
        admin
            .decide(&zone_pending, Decision::Approve)
            .await
            .unwrap_err()
            .is_forbidden()
    );

    admin
        .login(Credential::passphrase(PASSPHRASE))
        .await
        .unwrap();
    admin.decide(&zone_pending, Decision::Approve).await.unwrap();
    admin.decide(&pending, Decision::Approve).await.unwrap();
    admin
        .access()
        .authorize(&member.public_key(), &Target::section("S"), Action::Read)
        .unwrap();
}

#[tokio::test]
async fn access_calls_require_a_session() {
    let ctx = TestContext::new();
    let (client, me) = ctx.logged_in_client().await;
    register(&client, &me);
    client.authorize(&Target::zone("Z"), Action::Administer).await.unwrap();

    client.logout().await.unwrap();
    let err = client
        .request_access(&Target::zone("Z"), None)
        .await
        .unwrap_err();
    assert!(err.is_not_authenticated());
}

#[tokio::test]
async fn calendar_masks_by_logged_in_identity() {
    let ctx = TestContext::new();
    let (client, me) = ctx.logged_in_client().await;
    register(&client, &me);

    let entry = CalendarEntry {
        id: "picnic".to_string(),
        section: "S".into(),
        starts_at: 1_706_000_000,
        title: "Picnic".to_string(),
        details: "North meadow, bring blankets".to_string(),
    };

    // Administering a zone does not by itself admit its sections.
    assert!(client.calendar(vec![entry.clone()]).await.unwrap().is_empty());

    let section = client.request_access(&Target::section("S"), None).await.unwrap();
    let zone = client.access().grant(&me, &Target::zone("Z")).unwrap();
    client.decide(&zone, Decision::Approve).await.unwrap();
    assert!(matches!(
        client.calendar(vec![entry.clone()]).await.unwrap()[..],
        [CalendarView::DateOnly { .. }]
    ));

    client.decide(&section, Decision::Approve).await.unwrap();
    assert_eq!(
        client.calendar(vec![entry.clone()]).await.unwrap(),
        vec![CalendarView::Full(entry)]
    );
}
