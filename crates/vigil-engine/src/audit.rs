//! Append-only audit recorder.
//!
//! One entry per dispatch attempt. The engine never reads entries back;
//! read access belongs to external operator tooling.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use vigil_core::effects::SwitchStore;
use vigil_core::{AuditAction, AuditEntry, DispatchDetails, OwnerId, Result, SendOutcome};

/// Writes dispatch outcomes to the store's audit log.
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn SwitchStore>,
}

impl AuditRecorder {
    /// Create a recorder over the given store
    pub fn new(store: Arc<dyn SwitchStore>) -> Self {
        Self { store }
    }

    /// Record a completed dispatch: every recipient was attempted.
    pub async fn record_dispatched(
        &self,
        owner_id: OwnerId,
        outcomes: Vec<SendOutcome>,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            owner_id,
            action: AuditAction::Dispatched,
            details: DispatchDetails {
                recipient_count: outcomes.len(),
                outcomes,
                error: None,
            },
            timestamp: at,
        };
        self.store.append_audit(entry).await
    }

    /// Record a dispatch that failed before the switch was marked sent.
    pub async fn record_failed(
        &self,
        owner_id: OwnerId,
        error: String,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            owner_id,
            action: AuditAction::DispatchFailed,
            details: DispatchDetails {
                recipient_count: 0,
                outcomes: Vec::new(),
                error: Some(error),
            },
            timestamp: at,
        };
        self.store.append_audit(entry).await
    }
}

impl std::fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuditRecorder")
    }
}
