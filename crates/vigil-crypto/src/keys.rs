//! Ed25519 signing material and its X25519 conversions.
//!
//! All key material enters as the normalized 32-byte [`SecretKey`]; the
//! montgomery-form conversions here are what the envelope layer uses for
//! ECDH key agreement, so one ed25519 key pair serves both signing and
//! wrapping.

use curve25519_dalek::montgomery::MontgomeryPoint;
use curve25519_dalek::scalar::Scalar;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use vigil_core::{Result, SecretKey, VigilError};

/// Ed25519 signing material derived from a normalized secret.
#[derive(Clone)]
pub struct SigningKeyMaterial {
    signing: SigningKey,
}

impl SigningKeyMaterial {
    /// Build signing material from a normalized secret key
    pub fn from_secret(secret: &SecretKey) -> Self {
        Self {
            signing: SigningKey::from_bytes(secret.as_bytes()),
        }
    }

    /// The corresponding verifying (public) key
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing.verifying_key()
    }

    /// Verifying key as raw bytes
    pub fn public_bytes(&self) -> [u8; 32] {
        self.signing.verifying_key().to_bytes()
    }

    /// Sign arbitrary bytes
    pub fn sign(&self, data: &[u8]) -> Signature {
        self.signing.sign(data)
    }

    /// The clamped scalar form of this key, for X25519 key agreement
    pub fn x25519_scalar(&self) -> Scalar {
        self.signing.to_scalar()
    }
}

impl std::fmt::Debug for SigningKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyMaterial")
            .field("public", &hex::encode(self.public_bytes()))
            .finish()
    }
}

/// Montgomery form of an ed25519 verifying key, for X25519 key agreement
pub fn x25519_public(verifying: &VerifyingKey) -> MontgomeryPoint {
    verifying.to_montgomery()
}

/// Parse a verifying key from raw bytes
pub fn verifying_key_from_bytes(bytes: &[u8; 32]) -> Result<VerifyingKey> {
    VerifyingKey::from_bytes(bytes)
        .map_err(|e| VigilError::crypto(format!("Invalid verifying key: {e}")))
}

/// Verify an ed25519 signature over `data`
pub fn verify_signature(
    verifying: &VerifyingKey,
    data: &[u8],
    signature: &Signature,
) -> Result<()> {
    verifying
        .verify(data, signature)
        .map_err(|e| VigilError::crypto(format!("Signature verification failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Effects;

    #[test]
    fn sign_and_verify() {
        let effects = Effects::test();
        let secret = SecretKey::from_bytes(effects.random_bytes());
        let material = SigningKeyMaterial::from_secret(&secret);

        let sig = material.sign(b"due switch payload");
        verify_signature(&material.verifying_key(), b"due switch payload", &sig).unwrap();

        assert!(
            verify_signature(&material.verifying_key(), b"tampered payload", &sig).is_err()
        );
    }

    #[test]
    fn x25519_agreement_matches_both_directions() {
        let effects = Effects::test();
        let a = SigningKeyMaterial::from_secret(&SecretKey::from_bytes(effects.random_bytes()));
        let b = SigningKeyMaterial::from_secret(&SecretKey::from_bytes(effects.random_bytes()));

        let shared_ab = x25519_public(&b.verifying_key()) * a.x25519_scalar();
        let shared_ba = x25519_public(&a.verifying_key()) * b.x25519_scalar();
        assert_eq!(shared_ab.to_bytes(), shared_ba.to_bytes());
    }

    #[test]
    fn same_secret_yields_same_public() {
        let secret = SecretKey::from_bytes([3u8; 32]);
        let m1 = SigningKeyMaterial::from_secret(&secret);
        let m2 = SigningKeyMaterial::from_secret(&secret);
        assert_eq!(m1.public_bytes(), m2.public_bytes());
    }
}
