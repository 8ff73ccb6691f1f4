//! Passphrase policy.

use serde::{Deserialize, Serialize};

use super::errors::VaultError;

/// Minimum requirements for passphrases protecting a key record.
///
/// Entropy is estimated from the character classes present and the number of
/// distinct characters: `min(len, 2 * distinct) * log2(pool)`. Repetitive input
/// such as `aaaaaaaaaaaa` therefore scores low regardless of length.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassphrasePolicy {
    /// Minimum number of characters
    pub min_length: usize,
    /// Minimum estimated entropy in bits
    pub min_entropy_bits: f64,
}

impl Default for PassphrasePolicy {
    fn default() -> Self {
        Self {
            min_length: 10,
            min_entropy_bits: 50.0,
        }
    }
}

impl PassphrasePolicy {
    /// Accept or reject a passphrase.
    pub fn check(&self, passphrase: &str) -> Result<(), VaultError> {
        let length = passphrase.chars().count();
        if length < self.min_length {
            return Err(VaultError::WeakPassphrase {
                reason: format!("must be at least {} characters", self.min_length),
            });
        }
        let bits = estimate_entropy_bits(passphrase);
        if bits < self.min_entropy_bits {
            return Err(VaultError::WeakPassphrase {
                reason: format!(
                    "estimated strength {bits:.0} bits, at least {:.0} required",
                    self.min_entropy_bits
                ),
            });
        }
        Ok(())
    }
}

/// Rough entropy estimate in bits.
pub fn estimate_entropy_bits(passphrase: &str) -> f64 {
    let mut lower = false;
    let mut upper = false;
    let mut digit = false;
    let mut symbol = false;
    let mut other = false;
    let mut distinct: Vec<char> = Vec::new();

    for c in passphrase.chars() {
        match c {
            'a'..='z' => lower = true,
            'A'..='Z' => upper = true,
            '0'..='9' => digit = true,
            c if c.is_ascii() => symbol = true,
            _ => other = true,
        }
        if !distinct.contains(&c) {
            distinct.push(c);
        }
    }

    let pool = [(lower, 26), (upper, 26), (digit, 10), (symbol, 33), (other, 100)]
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, size)| *size)
        .sum::<u32>();
    if pool == 0 {
        return 0.0;
    }

    let effective = passphrase.chars().count().min(distinct.len() * 2);
    effective as f64 * f64::from(pool).log2()
}
