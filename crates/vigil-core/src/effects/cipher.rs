//! Field decryption collaborator contract.
//!
//! Used for the owner's sealed signing key and recipients' sealed contact
//! fields. The key is always the normalized 32-byte [`SecretKey`]; ambiguous
//! printable/raw dual forms are rejected at the type level.

use crate::errors::Result;
use crate::types::SecretKey;

/// Symmetric field decryption effects.
pub trait CipherEffects: Send + Sync {
    /// Decrypt one sealed field with the given key.
    fn decrypt(&self, ciphertext: &[u8], key: &SecretKey) -> Result<Vec<u8>>;
}
