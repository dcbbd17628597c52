//! Domain model for the trigger-and-delivery engine.
//!
//! The engine only ever reads `Owner` and `Recipient`, and only ever mutates
//! a switch's `is_sent` / `sent_at` / `updated_at`. Creation and deletion of
//! these records belongs to out-of-scope owner-facing collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::VigilError;

/// Identifier for a configured switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwitchId(pub Uuid);

impl SwitchId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SwitchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SwitchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier for a switch owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub Uuid);

impl OwnerId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier for a switch recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipientId(pub Uuid);

impl RecipientId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecipientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecipientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier for a record published to the external content store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(String);

impl ContentId {
    /// Wrap an existing content-store identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Trigger condition for a switch.
///
/// Exactly one of the two kinds; immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleKind {
    /// Fire at a fixed wall-clock time
    FixedTime(DateTime<Utc>),
    /// Fire after this many days of owner inactivity
    InactivityInterval {
        /// Days of inactivity before the switch becomes due
        days: u32,
    },
}

/// A configured dead-man's-switch message awaiting its trigger condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Switch {
    /// Switch identifier
    pub id: SwitchId,
    /// Owning account
    pub owner_id: OwnerId,
    /// Owner-facing title; never sent to recipients
    pub title: String,
    /// Trigger condition
    pub schedule: ScheduleKind,
    /// Content-store reference to the sealed payload, when one was stored
    pub payload_ref: Option<ContentId>,
    /// Whether the owner has the switch armed
    pub is_active: bool,
    /// Terminal dispatch flag; once true it is never reset
    pub is_sent: bool,
    /// When dispatch was recorded, if it was
    pub sent_at: Option<DateTime<Utc>>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

/// A switch owner as seen by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    /// Owner identifier
    pub id: OwnerId,
    /// Last proof-of-life check-in
    pub last_check_in: DateTime<Utc>,
    /// Owner signing key, sealed with the service master key
    pub encrypted_signing_key: Vec<u8>,
    /// Contact email, used as the from-display fallback
    pub email: String,
    /// Owner-configured endpoints; empty means use the compiled-in defaults
    pub endpoints: EndpointList,
}

/// A designated recipient of one switch. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    /// Recipient identifier
    pub id: RecipientId,
    /// Switch this recipient belongs to
    pub switch_id: SwitchId,
    /// Contact email, sealed with the service master key
    pub encrypted_email: Vec<u8>,
    /// Display name, sealed with the service master key
    pub encrypted_name: Option<Vec<u8>>,
}

/// Outcome classification for an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    /// The switch was dispatched (all recipients were attempted)
    Dispatched,
    /// Dispatch failed before the switch could be marked sent
    DispatchFailed,
}

/// Per-recipient result of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOutcome {
    /// Whether the transport accepted the message
    pub success: bool,
    /// Decrypted recipient address, or `"unknown"` when it never decrypted
    pub recipient: String,
    /// Transport or decryption error text, on failure
    pub error: Option<String>,
}

/// Structured detail payload of one audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchDetails {
    /// Number of recipients configured on the switch
    pub recipient_count: usize,
    /// Per-recipient outcomes, in processing order
    pub outcomes: Vec<SendOutcome>,
    /// Failure description for `DispatchFailed` entries
    pub error: Option<String>,
}

/// One append-only audit record; exactly one is written per dispatch attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Entry identifier
    pub id: Uuid,
    /// Owner of the switch the entry concerns
    pub owner_id: OwnerId,
    /// Outcome classification
    pub action: AuditAction,
    /// Structured outcome detail
    pub details: DispatchDetails,
    /// When the entry was written
    pub timestamp: DateTime<Utc>,
}

/// Ordered, de-duplicated list of content-store endpoint addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointList(Vec<String>);

impl EndpointList {
    /// Build a list, preserving order and dropping duplicates
    pub fn new(endpoints: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut seen = Vec::new();
        for endpoint in endpoints {
            let endpoint = endpoint.into();
            if !seen.contains(&endpoint) {
                seen.push(endpoint);
            }
        }
        Self(seen)
    }

    /// Whether no endpoints are configured
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of endpoints
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate endpoint addresses in order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// This list when non-empty, otherwise the given fallback
    pub fn resolve_or<'a>(&'a self, fallback: &'a EndpointList) -> &'a EndpointList {
        if self.is_empty() {
            fallback
        } else {
            self
        }
    }
}

/// Normalized 32-byte secret key.
///
/// This is the only key representation accepted at the payload-service
/// boundary. Hex input is decoded at construction; raw bytes are taken as-is.
/// The material is zeroized on drop and redacted from debug output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Construct from raw 32-byte material
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Construct from a 64-character hex encoding
    pub fn from_hex(hex_str: &str) -> Result<Self, VigilError> {
        let decoded = hex::decode(hex_str)
            .map_err(|e| VigilError::invalid(format!("Secret key is not valid hex: {e}")))?;
        let bytes: [u8; 32] = decoded.try_into().map_err(|v: Vec<u8>| {
            VigilError::invalid(format!(
                "Secret key must be 32 bytes, got {}",
                v.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// The raw key material
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_list_dedupes_preserving_order() {
        let list = EndpointList::new(["wss://a", "wss://b", "wss://a", "wss://c"]);
        assert_eq!(list.len(), 3);
        let collected: Vec<&str> = list.iter().collect();
        assert_eq!(collected, vec!["wss://a", "wss://b", "wss://c"]);
    }

    #[test]
    fn empty_endpoint_list_resolves_to_fallback() {
        let configured = EndpointList::default();
        let defaults = EndpointList::new(["wss://default"]);
        assert_eq!(configured.resolve_or(&defaults), &defaults);

        let configured = EndpointList::new(["wss://mine"]);
        assert_eq!(configured.resolve_or(&defaults), &configured);
    }

    #[test]
    fn secret_key_hex_roundtrip() {
        let bytes = [7u8; 32];
        let key = SecretKey::from_hex(&hex::encode(bytes)).unwrap();
        assert_eq!(key.as_bytes(), &bytes);
    }

    #[test]
    fn secret_key_rejects_wrong_length() {
        assert!(SecretKey::from_hex("abcd").is_err());
        assert!(SecretKey::from_hex("not hex at all").is_err());
    }

    #[test]
    fn secret_key_debug_is_redacted() {
        let key = SecretKey::from_bytes([9u8; 32]);
        assert_eq!(format!("{key:?}"), "SecretKey(..)");
    }

    #[test]
    fn schedule_kind_serde_roundtrip() {
        let schedule = ScheduleKind::InactivityInterval { days: 7 };
        let json = serde_json::to_string(&schedule).unwrap();
        let back: ScheduleKind = serde_json::from_str(&json).unwrap();
        assert_eq!(schedule, back);
    }
}
