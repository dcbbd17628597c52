//! Secure sealing for data at rest.
//!
//! Generic AEAD encryption using AES-256-GCM with BLAKE3 context-separated
//! key derivation. Used for owner signing keys and recipient contact fields
//! at rest, and as the AEAD inside gift-wrap envelopes.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key,
};
use blake3::Hasher;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::effects::Effects;
use vigil_core::effects::CipherEffects;
use vigil_core::{Result, SecretKey, VigilError};

/// Sealed data container.
///
/// # Security
///
/// - Ciphertext is zeroized on drop
/// - Nonces are random and never reused
/// - The context string separates keys across uses
/// - Associated data binds the seal to its surroundings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedData {
    /// Encrypted payload - zeroized on drop
    pub ciphertext: Vec<u8>,
    /// Random nonce for GCM (12 bytes)
    pub nonce: [u8; 12],
    /// Context string used for key derivation
    pub context: String,
    /// Optional associated data, authenticated but not encrypted
    pub associated_data: Option<Vec<u8>>,
}

impl SealedData {
    /// Seal a serializable value with a 32-byte secret.
    ///
    /// The value is bincode-serialized, the AEAD key is derived from the
    /// secret and `context` with BLAKE3, and a fresh random nonce comes from
    /// the injected effects.
    pub fn seal_value<T: Serialize>(
        value: &T,
        secret: &SecretKey,
        context: &str,
        associated_data: Option<&[u8]>,
        effects: &Effects,
    ) -> Result<Self> {
        let plaintext = bincode::serialize(value)
            .map_err(|e| VigilError::serialization(format!("Failed to serialize: {e}")))?;

        let nonce: [u8; 12] = effects.random_bytes();
        let gcm_nonce = &nonce.into();

        let encryption_key = derive_key(secret, context);
        let cipher = Aes256Gcm::new(&encryption_key);

        let aad = associated_data.unwrap_or(&[]);
        let ciphertext = cipher
            .encrypt(
                gcm_nonce,
                aes_gcm::aead::Payload {
                    msg: &plaintext,
                    aad,
                },
            )
            .map_err(|e| VigilError::crypto(format!("AES-GCM encryption failed: {e}")))?;

        Ok(SealedData {
            ciphertext,
            nonce,
            context: context.to_string(),
            associated_data: associated_data.map(|d| d.to_vec()),
        })
    }

    /// Unseal and deserialize back to the original type.
    ///
    /// # Errors
    ///
    /// Fails when the authentication tag does not verify (wrong secret or
    /// tampering) or when deserialization fails.
    pub fn unseal_value<T: serde::de::DeserializeOwned>(&self, secret: &SecretKey) -> Result<T> {
        let encryption_key = derive_key(secret, &self.context);
        let cipher = Aes256Gcm::new(&encryption_key);

        let gcm_nonce = &self.nonce.into();
        let aad = self.associated_data.as_deref().unwrap_or(&[]);

        let plaintext = cipher
            .decrypt(
                gcm_nonce,
                aes_gcm::aead::Payload {
                    msg: &self.ciphertext,
                    aad,
                },
            )
            .map_err(|e| VigilError::crypto(format!("AES-GCM decryption failed: {e}")))?;

        bincode::deserialize(&plaintext)
            .map_err(|e| VigilError::crypto(format!("Failed to deserialize: {e}")))
    }

    /// Serialize this container to opaque bytes for storage in a single field
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| VigilError::serialization(format!("Failed to serialize seal: {e}")))
    }

    /// Parse a container previously produced by [`SealedData::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes)
            .map_err(|e| VigilError::crypto(format!("Malformed sealed field: {e}")))
    }
}

/// Derive an AES-256 key from a secret and context using BLAKE3.
///
/// The context string prevents key reuse across different seal sites.
fn derive_key(secret: &SecretKey, context: &str) -> Key<Aes256Gcm> {
    let mut hasher = Hasher::new();
    hasher.update(b"vigil-sealing-v1:");
    hasher.update(secret.as_bytes());
    hasher.update(b":");
    hasher.update(context.as_bytes());
    let derived_key: [u8; 32] = hasher.finalize().into();
    derived_key.into()
}

impl Drop for SealedData {
    fn drop(&mut self) {
        self.ciphertext.zeroize();
        if let Some(ref mut aad) = self.associated_data {
            aad.zeroize();
        }
    }
}

/// Context used for sealed owner/recipient fields.
const FIELD_CONTEXT: &str = "vigil-field-v1";

/// Production field cipher over [`SealedData`].
///
/// Implements the [`CipherEffects`] collaborator contract: sealed fields are
/// serialized `SealedData` containers, decrypted with the service master key.
#[derive(Debug, Clone)]
pub struct SealingCipher {
    effects: Effects,
}

impl SealingCipher {
    /// Create a cipher drawing nonces from the given effects
    pub fn new(effects: Effects) -> Self {
        Self { effects }
    }

    /// Seal one field value into opaque bytes.
    ///
    /// The inverse of [`CipherEffects::decrypt`]; used when records are
    /// written by owner-facing collaborators and by test fixtures.
    pub fn encrypt(&self, plaintext: &[u8], key: &SecretKey) -> Result<Vec<u8>> {
        let sealed = SealedData::seal_value(
            &plaintext.to_vec(),
            key,
            FIELD_CONTEXT,
            None,
            &self.effects,
        )?;
        sealed.to_bytes()
    }
}

impl CipherEffects for SealingCipher {
    fn decrypt(&self, ciphertext: &[u8], key: &SecretKey) -> Result<Vec<u8>> {
        let sealed = SealedData::from_bytes(ciphertext)?;
        sealed.unseal_value(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_unseal_roundtrip() {
        let effects = Effects::test();
        let secret = SecretKey::from_bytes(effects.random_bytes());
        let original = vec![1u8, 2, 3, 4, 5];

        let sealed =
            SealedData::seal_value(&original, &secret, "test-context", None, &effects).unwrap();
        let unsealed: Vec<u8> = sealed.unseal_value(&secret).unwrap();

        assert_eq!(original, unsealed);
    }

    #[test]
    fn seal_deterministic_with_same_effects() {
        let effects1 = Effects::deterministic(42, 1000);
        let effects2 = Effects::deterministic(42, 1000);
        let secret = SecretKey::from_bytes([1u8; 32]);
        let value = vec![1u8, 2, 3];

        let sealed1 =
            SealedData::seal_value(&value, &secret, "test-context", None, &effects1).unwrap();
        let sealed2 =
            SealedData::seal_value(&value, &secret, "test-context", None, &effects2).unwrap();

        assert_eq!(sealed1.nonce, sealed2.nonce);
        assert_eq!(sealed1.ciphertext, sealed2.ciphertext);
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let effects = Effects::test();
        let secret = SecretKey::from_bytes(effects.random_bytes());
        let wrong = SecretKey::from_bytes(effects.random_bytes());

        let sealed =
            SealedData::seal_value(&vec![9u8; 8], &secret, "test-context", None, &effects)
                .unwrap();
        let result: Result<Vec<u8>> = sealed.unseal_value(&wrong);
        assert!(result.is_err());
    }

    #[test]
    fn associated_data_is_authenticated() {
        let effects = Effects::test();
        let secret = SecretKey::from_bytes(effects.random_bytes());
        let aad = b"switch-id-binding";

        let sealed =
            SealedData::seal_value(&vec![1u8, 2], &secret, "test-context", Some(aad), &effects)
                .unwrap();

        let unsealed: Vec<u8> = sealed.unseal_value(&secret).unwrap();
        assert_eq!(unsealed, vec![1u8, 2]);

        let mut tampered = sealed.clone();
        tampered.associated_data = Some(b"other-binding".to_vec());
        let result: Result<Vec<u8>> = tampered.unseal_value(&secret);
        assert!(result.is_err());
    }

    #[test]
    fn context_separates_keys() {
        let effects = Effects::test();
        let secret = SecretKey::from_bytes(effects.random_bytes());

        let sealed =
            SealedData::seal_value(&vec![7u8], &secret, "context-a", None, &effects).unwrap();
        let mut moved = sealed.clone();
        moved.context = "context-b".to_string();
        let result: Result<Vec<u8>> = moved.unseal_value(&secret);
        assert!(result.is_err());
    }

    #[test]
    fn sealing_cipher_field_roundtrip() {
        let effects = Effects::test();
        let key = SecretKey::from_bytes(effects.random_bytes());
        let cipher = SealingCipher::new(effects);

        let sealed = cipher.encrypt(b"r1@example.com", &key).unwrap();
        let plain = cipher.decrypt(&sealed, &key).unwrap();
        assert_eq!(plain, b"r1@example.com");
    }

    #[test]
    fn sealing_cipher_rejects_garbage() {
        let effects = Effects::test();
        let key = SecretKey::from_bytes(effects.random_bytes());
        let cipher = SealingCipher::new(effects);

        assert!(cipher.decrypt(b"not a sealed field", &key).is_err());
    }
}
