//! In-memory `SwitchStore` with the production selection predicates.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use vigil_core::effects::SwitchStore;
use vigil_core::{
    AuditEntry, Owner, OwnerId, Recipient, Result, ScheduleKind, Switch, SwitchId, VigilError,
};

/// A temporary owner credential, cleared by housekeeping once expired.
#[derive(Debug, Clone)]
pub struct TempCredential {
    /// Owning account
    pub owner_id: OwnerId,
    /// Expiry time
    pub expires_at: DateTime<Utc>,
}

/// In-memory store for engine tests.
///
/// Implements the due-selection predicates exactly as a production backend
/// would, including the `is_sent` re-check at query time. `fail_next_load`
/// makes the next candidate query error, for sweep-abort tests.
#[derive(Default)]
pub struct MemoryStore {
    switches: Mutex<HashMap<SwitchId, Switch>>,
    owners: Mutex<HashMap<OwnerId, Owner>>,
    recipients: Mutex<HashMap<SwitchId, Vec<Recipient>>>,
    audits: Mutex<Vec<AuditEntry>>,
    credentials: Mutex<Vec<TempCredential>>,
    fail_next_load: Mutex<bool>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a switch
    pub fn insert_switch(&self, switch: Switch) {
        self.switches.lock().insert(switch.id, switch);
    }

    /// Insert or replace an owner
    pub fn insert_owner(&self, owner: Owner) {
        self.owners.lock().insert(owner.id, owner);
    }

    /// Add a recipient to its switch
    pub fn insert_recipient(&self, recipient: Recipient) {
        self.recipients
            .lock()
            .entry(recipient.switch_id)
            .or_default()
            .push(recipient);
    }

    /// Add a temporary credential
    pub fn insert_credential(&self, credential: TempCredential) {
        self.credentials.lock().push(credential);
    }

    /// Snapshot one switch
    pub fn switch(&self, id: SwitchId) -> Option<Switch> {
        self.switches.lock().get(&id).cloned()
    }

    /// Snapshot the audit log
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audits.lock().clone()
    }

    /// Remaining temporary credentials
    pub fn credential_count(&self) -> usize {
        self.credentials.lock().len()
    }

    /// Make the next candidate load fail with a storage error
    pub fn fail_next_load(&self) {
        *self.fail_next_load.lock() = true;
    }

    fn take_load_failure(&self) -> Result<()> {
        let mut flag = self.fail_next_load.lock();
        if *flag {
            *flag = false;
            return Err(VigilError::storage("injected candidate load failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl SwitchStore for MemoryStore {
    async fn due_fixed_time(&self, now: DateTime<Utc>) -> Result<Vec<Switch>> {
        self.take_load_failure()?;
        Ok(self
            .switches
            .lock()
            .values()
            .filter(|s| {
                s.is_active
                    && !s.is_sent
                    && matches!(s.schedule, ScheduleKind::FixedTime(at) if at <= now)
            })
            .cloned()
            .collect())
    }

    async fn inactivity_candidates(&self) -> Result<Vec<Switch>> {
        self.take_load_failure()?;
        Ok(self
            .switches
            .lock()
            .values()
            .filter(|s| {
                s.is_active
                    && !s.is_sent
                    && matches!(s.schedule, ScheduleKind::InactivityInterval { .. })
            })
            .cloned()
            .collect())
    }

    async fn owner(&self, id: OwnerId) -> Result<Owner> {
        self.owners
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| VigilError::not_found(format!("Owner {id}")))
    }

    async fn recipients(&self, switch_id: SwitchId) -> Result<Vec<Recipient>> {
        Ok(self
            .recipients
            .lock()
            .get(&switch_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn mark_sent(&self, switch_id: SwitchId, at: DateTime<Utc>) -> Result<()> {
        let mut switches = self.switches.lock();
        let switch = switches
            .get_mut(&switch_id)
            .ok_or_else(|| VigilError::not_found(format!("Switch {switch_id}")))?;
        // is_sent is terminal; a second mark is a no-op.
        if !switch.is_sent {
            switch.is_sent = true;
            switch.sent_at = Some(at);
        }
        switch.updated_at = at;
        Ok(())
    }

    async fn append_audit(&self, entry: AuditEntry) -> Result<()> {
        self.audits.lock().push(entry);
        Ok(())
    }

    async fn clear_expired_credentials(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut credentials = self.credentials.lock();
        let before = credentials.len();
        credentials.retain(|c| c.expires_at > now);
        Ok((before - credentials.len()) as u64)
    }
}
