//! Key commands - generate identities and show key encodings.

use haven::{Identity, PublicKey};
use tracing::warn;

use crate::cli::{Format, InspectArgs};
use crate::output::print_record;

/// Run the keygen command
pub fn keygen(format: Format) -> Result<(), Box<dyn std::error::Error>> {
    let identity = Identity::generate();
    let public = identity.public_key();
    warn!("Printing a private key; store it somewhere safe, it cannot be recovered");
    print_record(
        format,
        &[
            ("npub", public.to_npub()),
            ("public_hex", public.to_hex()),
            ("nsec", identity.to_nsec().to_string()),
        ],
    )
}

/// Run the inspect command
///
/// Private keys are reduced to their public key; nothing secret is printed.
pub fn inspect(args: &InspectArgs, format: Format) -> Result<(), Box<dyn std::error::Error>> {
    let (kind, public) = match Identity::from_text(&args.key) {
        Ok(identity) => ("private", identity.public_key()),
        Err(_) => ("public", PublicKey::from_text(&args.key)?),
    };
    print_record(
        format,
        &[
            ("kind", kind.to_string()),
            ("npub", public.to_npub()),
            ("public_hex", public.to_hex()),
        ],
    )
}
