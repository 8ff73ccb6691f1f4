use std::collections::HashSet;

use haven::Identity;
use haven::event::{Event, KIND_GIFT_WRAP};
use haven::messaging::{self, GiftWrap, TimestampFuzz};

const NOW: u64 = 1_704_067_200;
const JITTER: u64 = 30 * 60;

fn fuzz() -> TimestampFuzz {
    TimestampFuzz::new(NOW, JITTER)
}

#[test]
fn recipient_recovers_body_and_true_sender() {
    let alice = Identity::generate();
    let bob = Identity::generate();

    let gift =
        messaging::wrap("see you at the picnic", &bob.public_key(), &alice, &fuzz()).unwrap();
    let message = messaging::unwrap(&gift, &bob).unwrap();

    assert_eq!(message.body, "see you at the picnic");
    assert_eq!(message.sender, alice.public_key());
    assert_eq!(message.recipient, bob.public_key());
}

#[test]
fn observer_sees_neither_sender_nor_body() {
    let alice = Identity::generate();
    let bob = Identity::generate();

    let gift = messaging::wrap("meet at noon", &bob.public_key(), &alice, &fuzz()).unwrap();
    let wire = gift.event().to_json().unwrap();

    assert_eq!(gift.event().kind, KIND_GIFT_WRAP);
    assert_eq!(gift.recipient(), Some(bob.public_key()));
    assert_ne!(gift.ephemeral_key(), alice.public_key());
    assert!(!wire.contains(&alice.public_key().to_hex()));
    assert!(!wire.contains("meet at noon"));
    gift.event().verify().unwrap();
}

#[test]
fn every_wrap_uses_a_fresh_ephemeral_key() {
    let alice = Identity::generate();
    let bob = Identity::generate().public_key();

    let keys: HashSet<_> = (0..8)
        .map(|_| messaging::wrap("ping", &bob, &alice, &fuzz()).unwrap().ephemeral_key())
        .collect();
    assert_eq!(keys.len(), 8);
}

#[test]
fn wire_timestamps_stay_within_the_jitter_bound() {
    let alice = Identity::generate();
    let bob = Identity::generate();

    for _ in 0..16 {
        let gift = messaging::wrap("tick", &bob.public_key(), &alice, &fuzz()).unwrap();
        assert!((NOW - JITTER..NOW).contains(&gift.created_at()));

        let message = messaging::unwrap(&gift, &bob).unwrap();
        assert!((NOW - JITTER..NOW).contains(&message.created_at));
    }
}

#[test]
fn third_party_cannot_open() {
    let alice = Identity::generate();
    let bob = Identity::generate();
    let eve = Identity::generate();

    let gift = messaging::wrap("for bob only", &bob.public_key(), &alice, &fuzz()).unwrap();
    let err = messaging::unwrap(&gift, &eve).unwrap_err();
    assert!(err.is_undecryptable());
}

#[test]
fn self_copy_opens_for_the_sender() {
    let alice = Identity::generate();
    let bob = Identity::generate();

    let wrapped =
        messaging::wrap_with_self_copy("note to both", &bob.public_key(), &alice, &fuzz()).unwrap();
    assert_eq!(wrapped.to_sender.recipient(), Some(alice.public_key()));
    assert_ne!(
        wrapped.to_sender.ephemeral_key(),
        wrapped.to_recipient.ephemeral_key()
    );

    let mine = messaging::unwrap(&wrapped.to_sender, &alice).unwrap();
    let theirs = messaging::unwrap(&wrapped.to_recipient, &bob).unwrap();
    assert_eq!(mine, theirs);
    assert!(messaging::unwrap(&wrapped.to_sender, &bob).is_err());
}

#[test]
fn tampered_wrap_is_undecryptable() {
    let alice = Identity::generate();
    let bob = Identity::generate();
    let gift = messaging::wrap("intact", &bob.public_key(), &alice, &fuzz()).unwrap();

    let mut event: Event = gift.into_event();
    event.created_at += 1;
    let tampered = GiftWrap::from_event(event).unwrap();
    assert!(messaging::unwrap(&tampered, &bob).unwrap_err().is_undecryptable());
}

#[test]
fn non_wrap_events_are_refused() {
    let author = Identity::generate();
    let note = haven::event::UnsignedEvent::new(author.public_key(), NOW, 1, Vec::new(), "hi")
        .sign(&author)
        .unwrap();
    assert!(GiftWrap::from_event(note).is_err());
}
