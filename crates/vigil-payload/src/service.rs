//! The secure payload service.
//!
//! Every operation that can fail on an optional path degrades instead of
//! propagating: `decrypt` and `retrieve` map all failures to `None` so the
//! dispatch coordinator can apply default-content policy, and `notify_public`
//! publishes each notice independently. Only `store` raises, because a switch
//! without a stored payload is an owner-visible configuration action.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ed25519_dalek::VerifyingKey;

use vigil_core::effects::{EndpointEffects, EndpointRecord, RecordFilter, RecordKind};
use vigil_core::{ContentId, EndpointList, Result, SecretKey};
use vigil_crypto::{
    gift_wrap, unwrap_envelope, CryptoCapabilities, Effects, EnvelopeRecord, SigningKeyMaterial,
};

use crate::types::{default_endpoints, NoticeSummary, StoredPayload};

/// Envelope encryption and endpoint publication for switch payloads.
pub struct PayloadService {
    endpoints: Arc<dyn EndpointEffects>,
    capabilities: CryptoCapabilities,
    defaults: EndpointList,
    effects: Effects,
}

impl PayloadService {
    /// Build a service over the given endpoint client.
    ///
    /// Capabilities are resolved here, once; operations branch on the stored
    /// descriptor rather than re-probing.
    pub fn new(
        endpoints: Arc<dyn EndpointEffects>,
        capabilities: CryptoCapabilities,
        effects: Effects,
    ) -> Self {
        Self {
            endpoints,
            capabilities,
            defaults: default_endpoints(),
            effects,
        }
    }

    /// Replace the compiled-in default endpoint list (test hook).
    pub fn with_defaults(mut self, defaults: EndpointList) -> Self {
        self.defaults = defaults;
        self
    }

    /// Envelope-encrypt `content` from `sender` to `recipient`.
    ///
    /// When gift wrapping is unavailable the result is the signed but
    /// unencrypted inner record; that reduced-confidentiality path is logged
    /// and visible to callers through [`EnvelopeRecord::is_plain`].
    pub fn encrypt(
        &self,
        content: &[u8],
        recipient: &VerifyingKey,
        sender: &SecretKey,
    ) -> Result<EnvelopeRecord> {
        let material = SigningKeyMaterial::from_secret(sender);
        let record = gift_wrap(content, recipient, &material, self.capabilities, &self.effects)?;
        if record.is_plain() {
            tracing::warn!(
                "gift wrap capability unavailable; publishing signed-but-unencrypted record \
                 (reduced confidentiality)"
            );
        }
        Ok(record)
    }

    /// Unwrap and verify an envelope. Returns `None` on any failure so
    /// callers can fall back to default content; the failure is logged.
    pub fn decrypt(&self, record: &EnvelopeRecord, recipient: &SecretKey) -> Option<Vec<u8>> {
        match unwrap_envelope(record, recipient) {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::warn!(error = %e, "envelope decryption failed; treating as missing");
                None
            }
        }
    }

    /// Store a payload: self-encrypt to the owner's own key and publish to
    /// every endpoint in the owner's list (or the defaults).
    ///
    /// A publish failure propagates; there is no per-endpoint
    /// partial-success reporting.
    pub async fn store(
        &self,
        owner_endpoints: &EndpointList,
        payload: &StoredPayload,
        owner_secret: &SecretKey,
    ) -> Result<ContentId> {
        let endpoints = owner_endpoints.resolve_or(&self.defaults);
        let material = SigningKeyMaterial::from_secret(owner_secret);

        let json = serde_json::to_vec(payload).map_err(|e| {
            vigil_core::VigilError::serialization(format!("Failed to encode payload: {e}"))
        })?;

        // Self-encrypted: the owner is both author and recipient, so only the
        // owner's key can recover the content later.
        let envelope = self.encrypt(&json, &material.verifying_key(), owner_secret)?;
        let body = envelope.to_bytes()?;

        let id = ContentId::new(hex::encode(blake3::hash(&body).as_bytes()));
        let record = EndpointRecord {
            id: id.clone(),
            author: material.public_bytes(),
            kind: RecordKind::SealedPayload,
            created_at: self.now(),
            body,
        };

        self.endpoints.publish(endpoints, &record).await?;
        tracing::debug!(content_id = %id, endpoints = endpoints.len(), "payload stored");
        Ok(id)
    }

    /// Retrieve and decrypt a stored payload.
    ///
    /// Any stage failing — fetch, envelope parse, unwrap, JSON parse —
    /// yields `None`, logged but never thrown.
    pub async fn retrieve(
        &self,
        content_id: &ContentId,
        recipient: &SecretKey,
        endpoints: Option<&EndpointList>,
    ) -> Option<StoredPayload> {
        let endpoints = endpoints.unwrap_or(&self.defaults);
        let filter = RecordFilter::by_id(content_id.clone());

        let record = match self.endpoints.fetch(endpoints, &filter).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::warn!(content_id = %content_id, "payload not found on any endpoint");
                return None;
            }
            Err(e) => {
                tracing::warn!(content_id = %content_id, error = %e, "payload fetch failed");
                return None;
            }
        };

        let envelope = match EnvelopeRecord::from_bytes(&record.body) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(content_id = %content_id, error = %e, "malformed payload record");
                return None;
            }
        };

        let plain = self.decrypt(&envelope, recipient)?;
        match serde_json::from_slice(&plain) {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::warn!(content_id = %content_id, error = %e, "payload JSON parse failed");
                None
            }
        }
    }

    /// Broadcast the content-free public notice that a switch fired.
    ///
    /// One notice per logical recipient, each published independently; a
    /// failure is logged and never blocks the remaining notices or the
    /// caller.
    pub async fn notify_public(
        &self,
        summary: &NoticeSummary,
        sender: &SecretKey,
        endpoints: Option<&EndpointList>,
    ) {
        let endpoints = endpoints.unwrap_or(&self.defaults);
        let material = SigningKeyMaterial::from_secret(sender);

        for sequence in 0..summary.recipient_count {
            let notice = serde_json::json!({
                "message": summary.message,
                "sequence": sequence,
            });
            let content = notice.to_string().into_bytes();

            // Public notices are deliberately plain-signed: content-free and
            // world-readable by design of the announcement.
            let inner = vigil_crypto::SignedRecord::sign(&content, &material);
            let envelope = EnvelopeRecord::PlainSigned(inner);
            let body = match envelope.to_bytes() {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(sequence, error = %e, "public notice encode failed");
                    continue;
                }
            };

            let record = EndpointRecord {
                id: ContentId::new(hex::encode(blake3::hash(&body).as_bytes())),
                author: material.public_bytes(),
                kind: RecordKind::PublicNotice,
                created_at: self.now(),
                body,
            };

            if let Err(e) = self.endpoints.publish(endpoints, &record).await {
                tracing::warn!(sequence, error = %e, "public notice publish failed");
            }
        }
    }

    /// Wall-clock from the injected effects, with a system-time fallback.
    fn now(&self) -> DateTime<Utc> {
        self.effects
            .current_timestamp()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
            .unwrap_or_else(Utc::now)
    }
}

impl std::fmt::Debug for PayloadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadService")
            .field("capabilities", &self.capabilities)
            .field("default_endpoints", &self.defaults.len())
            .finish()
    }
}
