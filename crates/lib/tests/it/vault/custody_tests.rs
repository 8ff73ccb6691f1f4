use std::time::Duration;

use haven::Identity;
use zeroize::Zeroizing;

use crate::helpers::{PASSPHRASE, identity, test_vault};

const TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::test]
async fn seal_then_unlock_restores_identity() {
    let (vault, _, _) = test_vault();
    let original = vault.generate();

    let record = vault
        .seal(&original, Zeroizing::new(PASSPHRASE.to_string()), TIMEOUT)
        .await
        .unwrap();
    let restored = vault
        .unlock(&record, Zeroizing::new(PASSPHRASE.to_string()), TIMEOUT)
        .await
        .unwrap();

    assert_eq!(restored.public_key(), original.public_key());
    assert_eq!(*restored.to_nsec(), *original.to_nsec());
}

#[tokio::test]
async fn wrong_passphrase_and_swapped_key_look_alike() {
    let (vault, _, _) = test_vault();
    let record = vault
        .seal(&vault.generate(), Zeroizing::new(PASSPHRASE.to_string()), TIMEOUT)
        .await
        .unwrap();

    let wrong = vault
        .unlock(&record, Zeroizing::new("Correct Horse Battery Staple".to_string()), TIMEOUT)
        .await
        .unwrap_err();
    assert!(wrong.is_decryption_failed());

    let mut swapped = record.clone();
    swapped.public_key = identity(7).public_key();
    let tampered = vault
        .unlock(&swapped, Zeroizing::new(PASSPHRASE.to_string()), TIMEOUT)
        .await
        .unwrap_err();
    assert!(tampered.is_decryption_failed());
    assert_eq!(wrong.to_string(), tampered.to_string());
}

#[tokio::test]
async fn weak_passphrase_rejected_before_sealing() {
    let (vault, _, _) = test_vault();
    let err = vault
        .seal(&vault.generate(), Zeroizing::new("password1".to_string()), TIMEOUT)
        .await
        .unwrap_err();
    assert!(err.is_weak_passphrase());
}

#[test]
fn import_accepts_nsec_and_hex_of_the_same_key() {
    let (vault, _, _) = test_vault();
    let original = identity(1);

    let from_nsec = vault.import_from_text(&original.to_nsec()).unwrap();
    let from_hex = vault.import_from_text(&original.to_secret_hex()).unwrap();
    let from_padded = vault
        .import_from_text(&format!("  {}\n", original.to_nsec().as_str()))
        .unwrap();

    assert_eq!(vault.derive_public_key(&from_nsec), original.public_key());
    assert_eq!(from_hex.public_key(), original.public_key());
    assert_eq!(from_padded.public_key(), original.public_key());
    assert_eq!(
        original.public_key().to_hex(),
        "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
    );
}

#[test]
fn import_rejects_malformed_keys() {
    let (vault, _, _) = test_vault();
    let malformed = [
        String::new(),
        "nsec1".to_string(),
        "not a key".to_string(),
        "0".repeat(64),
        "g".repeat(64),
        Identity::generate().public_key().to_npub(),
    ];

    for text in &malformed {
        let err = vault.import_from_text(text).unwrap_err();
        assert!(err.is_invalid_key_format(), "accepted {text:?}");
    }
}
