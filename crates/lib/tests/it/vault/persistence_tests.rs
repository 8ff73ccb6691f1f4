use std::sync::Arc;

use haven::FixedClock;
use haven::session::{Credential, SessionGuard};
use haven::store::{FileStore, Region, Store};
use haven::vault::{KeyVault, RECORD_KEY};

use crate::helpers::{PASSPHRASE, test_config};

async fn open(path: &std::path::Path) -> (Arc<KeyVault>, SessionGuard, Arc<FileStore>) {
    let store = Arc::new(FileStore::open(path).await.unwrap());
    let clock = Arc::new(FixedClock::default());
    let config = test_config();
    let vault = Arc::new(KeyVault::new(&config, store.clone(), clock.clone()));
    let session = SessionGuard::new(&config, vault.clone(), store.clone(), clock);
    (vault, session, store)
}

#[tokio::test]
async fn record_survives_reopen_and_unlocks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("haven.json");

    let public_key = {
        let (vault, _, _) = open(&path).await;
        let identity = vault.generate();
        let record = vault.encrypt_for_storage(&identity, PASSPHRASE).unwrap();
        vault.store_record(&record).await.unwrap();
        identity.public_key()
    };

    let (vault, session, _) = open(&path).await;
    assert_eq!(
        vault.require_record().await.unwrap().public_key,
        public_key
    );
    let metadata = session
        .attempt_login(Credential::passphrase(PASSPHRASE))
        .await
        .unwrap();
    assert_eq!(metadata.public_key, public_key);
}

#[tokio::test]
async fn file_never_holds_plaintext_secret_or_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("haven.json");
    let (vault, session, store) = open(&path).await;

    let identity = vault.generate();
    vault
        .store_record(&vault.encrypt_for_storage(&identity, PASSPHRASE).unwrap())
        .await
        .unwrap();
    session
        .attempt_login(Credential::passphrase(PASSPHRASE))
        .await
        .unwrap();
    assert!(store.get(Region::Volatile, "session/current").await.unwrap().is_some());

    let on_disk = tokio::fs::read_to_string(&path).await.unwrap();
    assert!(on_disk.contains(RECORD_KEY));
    assert!(!on_disk.contains(identity.to_secret_hex().as_str()));
    assert!(!on_disk.contains(identity.to_nsec().as_str()));
    assert!(!on_disk.contains("session/current"));
}

#[tokio::test]
async fn failed_attempts_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("haven.json");

    {
        let (vault, session, _) = open(&path).await;
        vault
            .store_record(&vault.encrypt_for_storage(&vault.generate(), PASSPHRASE).unwrap())
            .await
            .unwrap();
        for _ in 0..2 {
            let err = session
                .attempt_login(Credential::passphrase("not the passphrase"))
                .await
                .unwrap_err();
            assert!(err.is_decryption_failed());
        }
    }

    let (_, session, _) = open(&path).await;
    assert_eq!(session.login_attempts().await.unwrap().attempts(), 2);
}

#[tokio::test]
async fn removing_the_record_makes_login_fail() {
    let dir = tempfile::tempdir().unwrap();
    let (vault, session, _) = open(&dir.path().join("haven.json")).await;
    vault
        .store_record(&vault.encrypt_for_storage(&vault.generate(), PASSPHRASE).unwrap())
        .await
        .unwrap();
    vault.remove_record().await.unwrap();

    assert!(vault.load_record().await.unwrap().is_none());
    let err = session
        .attempt_login(Credential::passphrase(PASSPHRASE))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
