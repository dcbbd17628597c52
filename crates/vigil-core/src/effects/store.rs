//! Persistence effects consumed by the scheduler and dispatch coordinator.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::types::{AuditEntry, Owner, OwnerId, Recipient, Switch, SwitchId};

/// Store contract for switches, owners, recipients, and the audit log.
///
/// Selection predicates live in the store so the `is_sent` re-check happens
/// at query time; that re-check is the only overlap guard between sweeps
/// (single-instance deployment is an operational requirement).
#[async_trait]
pub trait SwitchStore: Send + Sync {
    /// Fixed-time switches due now: active, unsent, and scheduled at or
    /// before `now`.
    async fn due_fixed_time(&self, now: DateTime<Utc>) -> Result<Vec<Switch>>;

    /// Active, unsent switches with an inactivity-interval schedule. The
    /// caller evaluates elapsed time against each owner's last check-in.
    async fn inactivity_candidates(&self) -> Result<Vec<Switch>>;

    /// Load one owner
    async fn owner(&self, id: OwnerId) -> Result<Owner>;

    /// Recipients configured on one switch
    async fn recipients(&self, switch_id: SwitchId) -> Result<Vec<Recipient>>;

    /// Mark a switch dispatched. Sets `is_sent = true`, `sent_at = at`, and
    /// refreshes `updated_at`. Never un-sets.
    async fn mark_sent(&self, switch_id: SwitchId, at: DateTime<Utc>) -> Result<()>;

    /// Append one audit entry. The engine never reads these back.
    async fn append_audit(&self, entry: AuditEntry) -> Result<()>;

    /// Housekeeping: delete temporary owner credentials that expired before
    /// `now`. Returns the number cleared.
    async fn clear_expired_credentials(&self, now: DateTime<Utc>) -> Result<u64>;
}
