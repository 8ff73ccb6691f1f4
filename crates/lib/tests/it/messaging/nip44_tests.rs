use haven::messaging::ConversationKey;
use haven::messaging::nip44;

use crate::helpers::identity;

#[test]
fn conversation_key_is_symmetric() {
    let alice = identity(1);
    let bob = identity(2);

    let ab = ConversationKey::derive(&alice, &bob.public_key()).unwrap();
    let ba = ConversationKey::derive(&bob, &alice.public_key()).unwrap();
    assert_eq!(ab.as_bytes(), ba.as_bytes());
    assert_eq!(
        hex::encode(ab.as_bytes()),
        "c41c775356fd92eadc63ff5a0dc1da211b268cbea22316767095b2871ea1412d"
    );
}

#[test]
fn known_payload_decrypts_from_either_side() {
    let payload =
        "AgAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAABee0G5VSK0/9YypIObAtDKfYEAjD35uVkHyB0F4DwrcNaCXlCWZKaArsGrY6M9wnuTMxWfp1RTN9Xga8no+kF5Vsb";
    let alice = identity(1);
    let bob = identity(2);

    let key = ConversationKey::derive(&bob, &alice.public_key()).unwrap();
    assert_eq!(nip44::decrypt(&key, payload).unwrap(), "a");
}

#[test]
fn fresh_nonce_per_message() {
    let key = ConversationKey::derive(&identity(1), &identity(2).public_key()).unwrap();
    let first = nip44::encrypt(&key, "same text").unwrap();
    let second = nip44::encrypt(&key, "same text").unwrap();
    assert_ne!(first, second);
    assert_eq!(nip44::decrypt(&key, &second).unwrap(), "same text");
}

#[test]
fn wrong_key_fails_authentication() {
    let key = ConversationKey::derive(&identity(1), &identity(2).public_key()).unwrap();
    let other = ConversationKey::derive(&identity(1), &identity(3).public_key()).unwrap();
    let payload = nip44::encrypt(&key, "secret").unwrap();
    assert!(nip44::decrypt(&other, &payload).is_err());
}
