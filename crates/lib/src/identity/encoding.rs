//! Textual key encodings.
//!
//! Keys are accepted either as NIP-19 bech32 strings (`nsec1…`, `npub1…`) or as 64
//! hexadecimal characters. Input text is classified once into a [`KeyText`] and then
//! resolved into the canonical 32 bytes; nothing downstream looks at the text again.

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};
use zeroize::Zeroizing;

use super::errors::IdentityError;

/// Human-readable part of bech32-encoded secret keys.
pub const NSEC_HRP: Hrp = Hrp::parse_unchecked("nsec");

/// Human-readable part of bech32-encoded public keys.
pub const NPUB_HRP: Hrp = Hrp::parse_unchecked("npub");

/// Length of a hex-encoded key.
pub const HEX_KEY_LENGTH: usize = 64;

/// Key text classified by encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyText<'a> {
    /// Checksummed bech32 form with a human-readable prefix.
    Bech32Encoded(&'a str),
    /// Fixed-length hexadecimal form.
    HexEncoded(&'a str),
}

impl<'a> KeyText<'a> {
    /// Classify key text. Surrounding whitespace is ignored.
    pub fn parse(text: &'a str) -> Result<Self, IdentityError> {
        let text = text.trim();
        if text.len() > 5 && text.as_bytes()[4] == b'1' {
            let prefix = text[..4].to_ascii_lowercase();
            if prefix == "nsec" || prefix == "npub" {
                return Ok(KeyText::Bech32Encoded(text));
            }
        }
        if text.len() == HEX_KEY_LENGTH && text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Ok(KeyText::HexEncoded(text));
        }
        Err(IdentityError::invalid_format(
            "expected a bech32 key or 64 hexadecimal characters",
        ))
    }

    /// Resolve to raw key bytes, requiring `expected` as the bech32 prefix.
    ///
    /// The result is wrapped in [`Zeroizing`] because it may hold secret material.
    pub fn resolve(self, expected: Hrp) -> Result<Zeroizing<[u8; 32]>, IdentityError> {
        match self {
            KeyText::Bech32Encoded(text) => decode_bech32(expected, text),
            KeyText::HexEncoded(text) => {
                let mut out = Zeroizing::new([0u8; 32]);
                hex::decode_to_slice(text, &mut out[..])
                    .map_err(|e| IdentityError::invalid_format(format!("invalid hex: {e}")))?;
                Ok(out)
            }
        }
    }
}

/// Encode 32 key bytes with the given bech32 prefix.
pub fn encode_bech32(hrp: Hrp, bytes: &[u8; 32]) -> String {
    bech32::encode::<Bech32>(hrp, bytes).expect("32-byte payload is within bech32 length limits")
}

/// Decode a bech32 string carrying exactly 32 bytes under the `expected` prefix.
pub fn decode_bech32(expected: Hrp, text: &str) -> Result<Zeroizing<[u8; 32]>, IdentityError> {
    let checked = CheckedHrpstring::new::<Bech32>(text.trim())
        .map_err(|e| IdentityError::invalid_format(format!("invalid bech32: {e}")))?;
    if checked.hrp() != expected {
        return Err(IdentityError::invalid_format(format!(
            "expected '{}' prefix, found '{}'",
            expected,
            checked.hrp()
        )));
    }
    let data = Zeroizing::new(checked.byte_iter().collect::<Vec<u8>>());
    if data.len() != 32 {
        return Err(IdentityError::invalid_format(format!(
            "expected 32 key bytes, found {}",
            data.len()
        )));
    }
    let mut out = Zeroizing::new([0u8; 32]);
    out.copy_from_slice(&data);
    Ok(out)
}
