//! Gift-wrap envelope protocol.
//!
//! An inner signed record carries the payload and the author's signature.
//! The outer record ("gift wrap") seals the whole inner record to the
//! recipient: an ephemeral X25519 key agreement feeds HKDF-SHA256, and the
//! derived secret drives the AES-256-GCM seal. Observers of the outer record
//! learn nothing but an ephemeral public key and ciphertext.
//!
//! Wrapping is an optional capability. When [`CryptoCapabilities`] reports it
//! unavailable, [`gift_wrap`] degrades to the signed-but-unencrypted inner
//! record; callers must treat that as reduced confidentiality and log it.

use curve25519_dalek::constants::X25519_BASEPOINT;
use ed25519_dalek::{Signature, VerifyingKey};
use hkdf::Hkdf;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::effects::Effects;
use crate::keys::{self, SigningKeyMaterial};
use crate::sealing::SealedData;
use vigil_core::{Result, SecretKey, VigilError};

/// Key-derivation info string for wrap keys
const WRAP_INFO: &[u8] = b"vigil-gift-wrap-v1";

/// Sealing context for the wrapped inner record
const WRAP_CONTEXT: &str = "vigil-wrap-v1";

/// Which optional crypto features the underlying implementation provides.
///
/// Resolved once at service construction and branched on; never re-probed
/// per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CryptoCapabilities {
    /// Whether envelope wrapping is available
    pub supports_gift_wrap: bool,
}

impl Default for CryptoCapabilities {
    fn default() -> Self {
        Self {
            supports_gift_wrap: true,
        }
    }
}

/// Inner record: payload bytes signed by their author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedRecord {
    /// Author's verifying key bytes
    pub author: [u8; 32],
    /// Payload bytes
    pub payload: Vec<u8>,
    /// Ed25519 signature over the payload
    pub signature: Signature,
}

impl SignedRecord {
    /// Sign `payload` as `author`
    pub fn sign(payload: &[u8], author: &SigningKeyMaterial) -> Self {
        Self {
            author: author.public_bytes(),
            payload: payload.to_vec(),
            signature: author.sign(payload),
        }
    }

    /// Verify the author signature and return the payload
    pub fn verify(&self) -> Result<&[u8]> {
        let verifying = keys::verifying_key_from_bytes(&self.author)?;
        keys::verify_signature(&verifying, &self.payload, &self.signature)?;
        Ok(&self.payload)
    }
}

/// Outer record: the inner record sealed to one recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrappedRecord {
    /// Ephemeral X25519 public key for this wrap
    pub ephemeral_public: [u8; 32],
    /// Sealed inner record; opaque to observers
    pub sealed: SealedData,
}

impl WrappedRecord {
    /// Seal `inner` to the holder of `recipient`'s secret key.
    pub fn wrap(
        inner: &SignedRecord,
        recipient: &VerifyingKey,
        effects: &Effects,
    ) -> Result<Self> {
        let ephemeral: [u8; 32] = effects.random_bytes();
        let ephemeral_public = X25519_BASEPOINT.mul_clamped(ephemeral);
        let shared = keys::x25519_public(recipient).mul_clamped(ephemeral);

        let wrap_key = derive_wrap_key(shared.as_bytes(), &ephemeral_public.to_bytes())?;
        let sealed = SealedData::seal_value(inner, &wrap_key, WRAP_CONTEXT, None, effects)?;

        Ok(Self {
            ephemeral_public: ephemeral_public.to_bytes(),
            sealed,
        })
    }

    /// Recover the inner record with the recipient's secret key.
    pub fn unwrap(&self, recipient: &SecretKey) -> Result<SignedRecord> {
        let scalar = SigningKeyMaterial::from_secret(recipient).x25519_scalar();
        let ephemeral = curve25519_dalek::montgomery::MontgomeryPoint(self.ephemeral_public);
        let shared = ephemeral * scalar;

        let wrap_key = derive_wrap_key(shared.as_bytes(), &self.ephemeral_public)?;
        self.sealed.unseal_value(&wrap_key)
    }
}

/// A record as published: wrapped when the capability exists, otherwise the
/// plain signed record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EnvelopeRecord {
    /// Sealed to the recipient; body is opaque ciphertext
    GiftWrapped(WrappedRecord),
    /// Signed but unencrypted fallback; reduced confidentiality
    PlainSigned(SignedRecord),
}

impl EnvelopeRecord {
    /// Whether this record went out without envelope encryption
    pub fn is_plain(&self) -> bool {
        matches!(self, Self::PlainSigned(_))
    }

    /// Serialize for endpoint publication
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| VigilError::serialization(format!("Failed to serialize envelope: {e}")))
    }

    /// Parse a record fetched from an endpoint
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes)
            .map_err(|e| VigilError::crypto(format!("Malformed envelope record: {e}")))
    }
}

/// Derive the AEAD wrap secret from an X25519 shared point.
fn derive_wrap_key(shared: &[u8; 32], ephemeral_public: &[u8; 32]) -> Result<SecretKey> {
    let hkdf = Hkdf::<Sha256>::new(Some(ephemeral_public), shared);
    let mut okm = [0u8; 32];
    hkdf.expand(WRAP_INFO, &mut okm)
        .map_err(|e| VigilError::crypto(format!("Wrap key derivation failed: {e}")))?;
    Ok(SecretKey::from_bytes(okm))
}

/// Build a signed inner record and wrap it for `recipient`.
///
/// Falls back to the plain signed record when wrapping is unavailable; the
/// caller owns logging the reduced-confidentiality path.
pub fn gift_wrap(
    content: &[u8],
    recipient: &VerifyingKey,
    sender: &SigningKeyMaterial,
    capabilities: CryptoCapabilities,
    effects: &Effects,
) -> Result<EnvelopeRecord> {
    let inner = SignedRecord::sign(content, sender);
    if !capabilities.supports_gift_wrap {
        return Ok(EnvelopeRecord::PlainSigned(inner));
    }
    let wrapped = WrappedRecord::wrap(&inner, recipient, effects)?;
    Ok(EnvelopeRecord::GiftWrapped(wrapped))
}

/// Unwrap an envelope, verify the author signature, and return the payload.
pub fn unwrap_envelope(record: &EnvelopeRecord, recipient: &SecretKey) -> Result<Vec<u8>> {
    let inner = match record {
        EnvelopeRecord::GiftWrapped(wrapped) => wrapped.unwrap(recipient)?,
        EnvelopeRecord::PlainSigned(inner) => inner.clone(),
    };
    let payload = inner.verify()?;
    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_pair(effects: &Effects) -> (SecretKey, SigningKeyMaterial) {
        let secret = SecretKey::from_bytes(effects.random_bytes());
        let material = SigningKeyMaterial::from_secret(&secret);
        (secret, material)
    }

    #[test]
    fn gift_wrap_roundtrip() {
        let effects = Effects::test();
        let (_, sender) = key_pair(&effects);
        let (recipient_secret, recipient) = key_pair(&effects);

        let record = gift_wrap(
            b"the payload",
            &recipient.verifying_key(),
            &sender,
            CryptoCapabilities::default(),
            &effects,
        )
        .unwrap();

        assert!(!record.is_plain());
        let payload = unwrap_envelope(&record, &recipient_secret).unwrap();
        assert_eq!(payload, b"the payload");
    }

    #[test]
    fn wrapped_body_hides_content() {
        let effects = Effects::test();
        let (_, sender) = key_pair(&effects);
        let (_, recipient) = key_pair(&effects);

        let record = gift_wrap(
            b"very secret content",
            &recipient.verifying_key(),
            &sender,
            CryptoCapabilities::default(),
            &effects,
        )
        .unwrap();

        let bytes = record.to_bytes().unwrap();
        let needle = b"very secret content";
        assert!(!bytes.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn wrong_recipient_cannot_unwrap() {
        let effects = Effects::test();
        let (_, sender) = key_pair(&effects);
        let (_, recipient) = key_pair(&effects);
        let (other_secret, _) = key_pair(&effects);

        let record = gift_wrap(
            b"payload",
            &recipient.verifying_key(),
            &sender,
            CryptoCapabilities::default(),
            &effects,
        )
        .unwrap();

        assert!(unwrap_envelope(&record, &other_secret).is_err());
    }

    #[test]
    fn capability_gate_falls_back_to_plain_signed() {
        let effects = Effects::test();
        let (_, sender) = key_pair(&effects);
        let (recipient_secret, recipient) = key_pair(&effects);

        let record = gift_wrap(
            b"payload",
            &recipient.verifying_key(),
            &sender,
            CryptoCapabilities {
                supports_gift_wrap: false,
            },
            &effects,
        )
        .unwrap();

        assert!(record.is_plain());
        // Still signed and recoverable by anyone, including the recipient.
        let payload = unwrap_envelope(&record, &recipient_secret).unwrap();
        assert_eq!(payload, b"payload");
    }

    #[test]
    fn tampered_inner_signature_fails_verification() {
        let effects = Effects::test();
        let (_, sender) = key_pair(&effects);
        let (recipient_secret, _) = key_pair(&effects);

        let mut inner = SignedRecord::sign(b"payload", &sender);
        inner.payload = b"forged payload".to_vec();
        let record = EnvelopeRecord::PlainSigned(inner);

        assert!(unwrap_envelope(&record, &recipient_secret).is_err());
    }

    #[test]
    fn envelope_bytes_roundtrip() {
        let effects = Effects::deterministic(7, 1000);
        let (_, sender) = key_pair(&effects);
        let (recipient_secret, recipient) = key_pair(&effects);

        let record = gift_wrap(
            b"payload",
            &recipient.verifying_key(),
            &sender,
            CryptoCapabilities::default(),
            &effects,
        )
        .unwrap();

        let bytes = record.to_bytes().unwrap();
        let parsed = EnvelopeRecord::from_bytes(&bytes).unwrap();
        assert_eq!(unwrap_envelope(&parsed, &recipient_secret).unwrap(), b"payload");
    }
}
