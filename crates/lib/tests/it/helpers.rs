use std::sync::Arc;

use haven::config::Config;
use haven::store::InMemoryStore;
use haven::vault::{KdfParams, KeyVault};
use haven::{FixedClock, Identity};

pub const PASSPHRASE: &str = "correct horse battery staple";
pub const RELAY_URL: &str = "wss://relay.haven.test";

/// Defaults with Argon2 costs small enough for tests.
pub fn test_config() -> Config {
    Config {
        kdf: KdfParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        ..Config::default()
    }
}

pub fn test_vault() -> (KeyVault, Arc<InMemoryStore>, Arc<FixedClock>) {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(FixedClock::default());
    let vault = KeyVault::new(&test_config(), store.clone(), clock.clone());
    (vault, store, clock)
}

/// Identity from a fixed scalar, for tests that need stable keys.
pub fn identity(n: u8) -> Identity {
    let mut bytes = [0u8; 32];
    bytes[31] = n;
    Identity::from_secret_bytes(&bytes).expect("valid scalar")
}
