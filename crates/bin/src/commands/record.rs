//! Key record commands - seal a private key to a file and unseal it again.

use std::sync::Arc;

use haven::clock::format_rfc3339;
use haven::store::InMemoryStore;
use haven::vault::{EncryptedKeyRecord, KeyVault};
use haven::{Config, SystemClock};
use tracing::info;
use zeroize::Zeroizing;

use crate::cli::{Format, SealArgs, UnsealArgs};
use crate::output::print_record;

fn vault(config: &Config) -> KeyVault {
    KeyVault::new(config, Arc::new(InMemoryStore::new()), Arc::new(SystemClock))
}

/// Run the seal command
pub async fn seal(
    args: &SealArgs,
    config: &Config,
    format: Format,
) -> Result<(), Box<dyn std::error::Error>> {
    let vault = vault(config);
    let identity = vault.import_from_text(&args.key)?;
    let record = vault
        .seal(
            &identity,
            Zeroizing::new(args.passphrase.clone()),
            config.timeouts.kdf(),
        )
        .await?;
    tokio::fs::write(&args.out, record.to_json()?).await?;
    info!(path = %args.out.display(), "Wrote key record");

    print_record(
        format,
        &[
            ("npub", record.public_key.to_npub()),
            ("record", args.out.display().to_string()),
        ],
    )
}

/// Run the unseal command
pub async fn unseal(
    args: &UnsealArgs,
    config: &Config,
    format: Format,
) -> Result<(), Box<dyn std::error::Error>> {
    let vault = vault(config);
    let json = tokio::fs::read_to_string(&args.record).await?;
    let record = EncryptedKeyRecord::from_json(&json)?;
    let identity = vault
        .unlock(
            &record,
            Zeroizing::new(args.passphrase.clone()),
            config.timeouts.kdf(),
        )
        .await?;

    let public = identity.public_key();
    let mut fields = vec![
        ("npub", public.to_npub()),
        ("public_hex", public.to_hex()),
        ("sealed_at", format_rfc3339(record.created_at)),
    ];
    if args.reveal {
        fields.push(("nsec", identity.to_nsec().to_string()));
    }
    print_record(format, &fields)
}
