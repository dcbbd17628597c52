//! Fixture builders for engine scenarios.
//!
//! Sealed fields are produced with the production `SealingCipher` so the
//! dispatch pipeline exercises real decryption, not stubs.

use chrono::{DateTime, Utc};

use vigil_core::{
    EndpointList, Owner, OwnerId, Recipient, RecipientId, ScheduleKind, SecretKey, Switch,
    SwitchId,
};
use vigil_crypto::{Effects, SealingCipher};

/// Sealed-field factory bound to one service master key.
pub struct FieldSealer {
    cipher: SealingCipher,
    master_key: SecretKey,
}

impl FieldSealer {
    /// Create a sealer over a fresh cipher
    pub fn new(master_key: SecretKey) -> Self {
        Self {
            cipher: SealingCipher::new(Effects::test()),
            master_key,
        }
    }

    /// Seal one field value
    pub fn seal(&self, value: &[u8]) -> Vec<u8> {
        self.cipher
            .encrypt(value, &self.master_key)
            .expect("fixture sealing cannot fail")
    }

    /// The cipher handle, for injecting into the dispatcher
    pub fn cipher(&self) -> SealingCipher {
        self.cipher.clone()
    }
}

/// Owner with a sealed signing key and the given last check-in.
pub fn owner(
    sealer: &FieldSealer,
    signing_secret: &SecretKey,
    email: &str,
    last_check_in: DateTime<Utc>,
) -> Owner {
    Owner {
        id: OwnerId::new(),
        last_check_in,
        encrypted_signing_key: sealer.seal(signing_secret.as_bytes()),
        email: email.to_string(),
        endpoints: EndpointList::default(),
    }
}

/// Active, unsent switch firing at a fixed time.
pub fn fixed_time_switch(owner_id: OwnerId, scheduled_for: DateTime<Utc>) -> Switch {
    switch(owner_id, ScheduleKind::FixedTime(scheduled_for))
}

/// Active, unsent switch firing after `days` of owner inactivity.
pub fn inactivity_switch(owner_id: OwnerId, days: u32) -> Switch {
    switch(owner_id, ScheduleKind::InactivityInterval { days })
}

fn switch(owner_id: OwnerId, schedule: ScheduleKind) -> Switch {
    let now = Utc::now();
    Switch {
        id: SwitchId::new(),
        owner_id,
        title: "test switch".to_string(),
        schedule,
        payload_ref: None,
        is_active: true,
        is_sent: false,
        sent_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// Recipient with sealed contact fields.
pub fn recipient(
    sealer: &FieldSealer,
    switch_id: SwitchId,
    email: &str,
    name: Option<&str>,
) -> Recipient {
    Recipient {
        id: RecipientId::new(),
        switch_id,
        encrypted_email: sealer.seal(email.as_bytes()),
        encrypted_name: name.map(|n| sealer.seal(n.as_bytes())),
    }
}
