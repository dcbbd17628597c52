//! In-memory endpoint client.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use vigil_core::effects::{EndpointEffects, EndpointRecord, RecordFilter, RecordKind};
use vigil_core::{EndpointList, Result, VigilError};

/// In-memory content store keyed by endpoint address.
///
/// Publishing writes the record to every listed endpoint; fetching scans the
/// listed endpoints in order and returns the first match. `fail_publishes`
/// makes publishes error, for store/notice failure tests.
#[derive(Default)]
pub struct MemoryEndpoint {
    records: Mutex<HashMap<String, Vec<EndpointRecord>>>,
    fail_publishes: Mutex<bool>,
}

impl MemoryEndpoint {
    /// Create an empty endpoint set
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent publish fail
    pub fn fail_publishes(&self) {
        *self.fail_publishes.lock() = true;
    }

    /// Records currently held by `endpoint`
    pub fn records_at(&self, endpoint: &str) -> Vec<EndpointRecord> {
        self.records
            .lock()
            .get(endpoint)
            .cloned()
            .unwrap_or_default()
    }

    /// Total records of one kind across all endpoints
    pub fn count_kind(&self, kind: RecordKind) -> usize {
        self.records
            .lock()
            .values()
            .flatten()
            .filter(|r| r.kind == kind)
            .count()
    }
}

#[async_trait]
impl EndpointEffects for MemoryEndpoint {
    async fn publish(&self, endpoints: &EndpointList, record: &EndpointRecord) -> Result<()> {
        if *self.fail_publishes.lock() {
            return Err(VigilError::network("injected publish failure"));
        }
        if endpoints.is_empty() {
            return Err(VigilError::configuration("no endpoints to publish to"));
        }
        let mut records = self.records.lock();
        for endpoint in endpoints.iter() {
            records
                .entry(endpoint.to_string())
                .or_default()
                .push(record.clone());
        }
        Ok(())
    }

    async fn fetch(
        &self,
        endpoints: &EndpointList,
        filter: &RecordFilter,
    ) -> Result<Option<EndpointRecord>> {
        let records = self.records.lock();
        for endpoint in endpoints.iter() {
            if let Some(held) = records.get(endpoint) {
                if let Some(found) = held.iter().find(|r| filter.matches(r)) {
                    return Ok(Some(found.clone()));
                }
            }
        }
        Ok(None)
    }
}
