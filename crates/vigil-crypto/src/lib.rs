//! Vigil crypto: sealing, signing, and the gift-wrap envelope protocol.
//!
//! Three layers:
//!
//! - [`sealing`] — symmetric AES-256-GCM sealing with BLAKE3 context-separated
//!   key derivation, used for fields at rest and as the AEAD inside envelopes.
//! - [`keys`] — ed25519 signing material built from the normalized 32-byte
//!   [`vigil_core::SecretKey`], plus the X25519 conversions used for envelope
//!   key agreement.
//! - [`envelope`] — the gift-wrap protocol: an inner signed record wrapped
//!   into an opaque outer record, with a capability-gated plain-signed
//!   fallback.
//!
//! Randomness and time are injected through [`effects::Effects`] so every
//! operation is reproducible under a seeded rng in tests.

pub mod effects;
pub mod envelope;
pub mod keys;
pub mod sealing;

pub use effects::{Effects, SimulatedTimeSource, SystemTimeSource, TimeSource};
pub use envelope::{
    gift_wrap, unwrap_envelope, CryptoCapabilities, EnvelopeRecord, SignedRecord, WrappedRecord,
};
pub use keys::SigningKeyMaterial;
pub use sealing::{SealedData, SealingCipher};

pub use vigil_core::{Result, VigilError};
