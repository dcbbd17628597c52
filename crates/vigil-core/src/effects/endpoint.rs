//! Content-store endpoint client contract.
//!
//! Endpoints store and serve published records. The wire protocol is out of
//! scope; the engine depends only on this publish/fetch contract. Record
//! bodies are opaque bytes — the payload service seals them before they
//! reach this layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::types::{ContentId, EndpointList};

/// What a published record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    /// A sealed switch payload, retrievable by its content id
    SealedPayload,
    /// A content-free public announcement that a switch fired
    PublicNotice,
}

/// One record as stored on an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRecord {
    /// Content-addressed identifier
    pub id: ContentId,
    /// Author's verifying key bytes
    pub author: [u8; 32],
    /// Record classification
    pub kind: RecordKind,
    /// Publication time
    pub created_at: DateTime<Utc>,
    /// Opaque body; sealed envelope bytes for payloads, plain-signed bytes
    /// for public notices
    pub body: Vec<u8>,
}

/// Fetch filter; unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Match a specific record id
    pub id: Option<ContentId>,
    /// Match records by this author
    pub author: Option<[u8; 32]>,
    /// Match records of this kind
    pub kind: Option<RecordKind>,
}

impl RecordFilter {
    /// Filter matching one record id
    pub fn by_id(id: ContentId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Whether `record` satisfies every set field
    pub fn matches(&self, record: &EndpointRecord) -> bool {
        if let Some(id) = &self.id {
            if &record.id != id {
                return false;
            }
        }
        if let Some(author) = &self.author {
            if &record.author != author {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if record.kind != kind {
                return false;
            }
        }
        true
    }
}

/// Endpoint client effects.
#[async_trait]
pub trait EndpointEffects: Send + Sync {
    /// Publish one record to every endpoint in the list. Implementations
    /// report failure if any endpoint rejects the record; there is no
    /// per-endpoint partial-success reporting.
    async fn publish(&self, endpoints: &EndpointList, record: &EndpointRecord) -> Result<()>;

    /// Fetch the first record matching `filter` from the endpoint set, or
    /// `None` when nothing matches.
    async fn fetch(
        &self,
        endpoints: &EndpointList,
        filter: &RecordFilter,
    ) -> Result<Option<EndpointRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: RecordKind) -> EndpointRecord {
        EndpointRecord {
            id: ContentId::new("abc"),
            author: [1u8; 32],
            kind,
            created_at: Utc::now(),
            body: vec![1, 2, 3],
        }
    }

    #[test]
    fn default_filter_matches_everything() {
        assert!(RecordFilter::default().matches(&record(RecordKind::SealedPayload)));
        assert!(RecordFilter::default().matches(&record(RecordKind::PublicNotice)));
    }

    #[test]
    fn filter_fields_are_conjunctive() {
        let rec = record(RecordKind::SealedPayload);

        let mut filter = RecordFilter::by_id(ContentId::new("abc"));
        assert!(filter.matches(&rec));

        filter.kind = Some(RecordKind::PublicNotice);
        assert!(!filter.matches(&rec));

        filter.kind = Some(RecordKind::SealedPayload);
        filter.author = Some([2u8; 32]);
        assert!(!filter.matches(&rec));
    }
}
