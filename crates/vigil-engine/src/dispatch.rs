//! Dispatch coordinator.
//!
//! Processes one due switch, strictly in order: load recipients, retrieve
//! and decrypt the stored payload (default content on any failure), send to
//! every recipient independently, mark the switch sent, broadcast the
//! public notice best-effort, and append the audit entry.
//!
//! The terminal state is driven by "attempted", not "all succeeded": the
//! switch is marked sent after the full per-recipient loop regardless of
//! individual outcomes. Any failure before that mark propagates, leaves the
//! switch due for the next sweep, and is recorded as `DispatchFailed`.

use std::sync::Arc;

use vigil_core::effects::{CipherEffects, ClockEffects, EmailEffects, SwitchStore};
use vigil_core::{Owner, Recipient, Result, SecretKey, SendOutcome, Switch, VigilError};
use vigil_payload::{NoticeSummary, PayloadService, StoredPayload};

use crate::audit::AuditRecorder;

/// Subject used when the stored payload cannot be retrieved or decrypted.
pub const DEFAULT_SUBJECT: &str = "Dead Man's Switch Notification";

/// Body used when the stored payload cannot be retrieved or decrypted.
pub const DEFAULT_BODY: &str = "This is an automated message from a Dead Man's Switch.";

/// From-display used when neither a recipient name nor an owner email exists.
const FALLBACK_DISPLAY: &str = "A friend";

/// Recipient label recorded when the address never decrypted.
const UNKNOWN_RECIPIENT: &str = "unknown";

/// Public announcement text; deliberately content-free.
const NOTICE_MESSAGE: &str = "A dead man's switch has been triggered.";

/// How one dispatch attempt concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// All recipients were attempted and the switch was marked sent
    Dispatched {
        /// Recipients attempted
        attempted: usize,
        /// Sends the transport accepted
        succeeded: usize,
    },
    /// The switch has no recipients; nothing was sent and it stays due.
    ///
    /// Retry-until-configured behavior: the switch is reselected every
    /// future sweep until recipients are added.
    SkippedNoRecipients,
}

/// Coordinates the dispatch of one due switch.
pub struct Dispatcher {
    store: Arc<dyn SwitchStore>,
    transport: Arc<dyn EmailEffects>,
    cipher: Arc<dyn CipherEffects>,
    clock: Arc<dyn ClockEffects>,
    payload: Arc<PayloadService>,
    audit: AuditRecorder,
    master_key: SecretKey,
}

impl Dispatcher {
    /// Build a dispatcher over injected collaborators.
    pub fn new(
        store: Arc<dyn SwitchStore>,
        transport: Arc<dyn EmailEffects>,
        cipher: Arc<dyn CipherEffects>,
        clock: Arc<dyn ClockEffects>,
        payload: Arc<PayloadService>,
        master_key: SecretKey,
    ) -> Self {
        let audit = AuditRecorder::new(store.clone());
        Self {
            store,
            transport,
            cipher,
            clock,
            payload,
            audit,
            master_key,
        }
    }

    /// Dispatch one due switch.
    ///
    /// On failure, writes the `DispatchFailed` audit entry and returns the
    /// error; the switch stays un-sent and due.
    pub async fn dispatch(&self, switch: &Switch) -> Result<DispatchOutcome> {
        match self.run(switch).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                let now = self.clock.now().await;
                if let Err(audit_err) = self
                    .audit
                    .record_failed(switch.owner_id, e.to_string(), now)
                    .await
                {
                    tracing::error!(
                        switch_id = %switch.id,
                        error = %audit_err,
                        "could not record dispatch failure"
                    );
                }
                Err(e)
            }
        }
    }

    async fn run(&self, switch: &Switch) -> Result<DispatchOutcome> {
        // 1. Recipients. A switch without any stays due forever.
        let recipients = self.store.recipients(switch.id).await?;
        if recipients.is_empty() {
            tracing::warn!(
                switch_id = %switch.id,
                "due switch has no recipients; sending nothing and leaving it un-sent"
            );
            return Ok(DispatchOutcome::SkippedNoRecipients);
        }

        // 2. Payload content. Retrieval or decryption failure never blocks
        // sending; the defaults take over.
        let owner = self.store.owner(switch.owner_id).await?;
        let owner_secret = self.unseal_owner_key(&owner);
        let stored = self.load_payload(switch, &owner, &owner_secret).await;
        let (subject, body) = match &stored {
            Some(p) => (p.subject.as_str(), p.content.as_str()),
            None => (DEFAULT_SUBJECT, DEFAULT_BODY),
        };

        // 3. Per-recipient sends, each isolated.
        let mut outcomes = Vec::with_capacity(recipients.len());
        for recipient in &recipients {
            outcomes.push(self.send_one(recipient, &owner, subject, body).await);
        }

        // 4. Terminal state, exactly once, after the full loop.
        let now = self.clock.now().await;
        self.store.mark_sent(switch.id, now).await?;

        // 5. Public notice, best-effort; requires the payload to have
        // existed and the owner key to sign with.
        if stored.is_some() {
            if let Some(secret) = &owner_secret {
                let summary = NoticeSummary {
                    message: NOTICE_MESSAGE.to_string(),
                    recipient_count: recipients.len(),
                };
                let endpoints = (!owner.endpoints.is_empty()).then_some(&owner.endpoints);
                self.payload.notify_public(&summary, secret, endpoints).await;
            }
        }

        // 6. Audit. The switch is already sent, so an append failure is
        // logged rather than propagated.
        let attempted = outcomes.len();
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        if let Err(e) = self
            .audit
            .record_dispatched(switch.owner_id, outcomes, now)
            .await
        {
            tracing::error!(switch_id = %switch.id, error = %e, "audit append failed after dispatch");
        }

        tracing::info!(
            switch_id = %switch.id,
            attempted,
            succeeded,
            "switch dispatched"
        );
        Ok(DispatchOutcome::Dispatched {
            attempted,
            succeeded,
        })
    }

    /// Retrieve the stored payload when a reference and key material exist.
    async fn load_payload(
        &self,
        switch: &Switch,
        owner: &Owner,
        owner_secret: &Option<SecretKey>,
    ) -> Option<StoredPayload> {
        let content_id = switch.payload_ref.as_ref()?;
        let secret = match owner_secret {
            Some(secret) => secret,
            None => {
                tracing::warn!(
                    switch_id = %switch.id,
                    "payload reference present but owner key unavailable; using default content"
                );
                return None;
            }
        };
        let endpoints = (!owner.endpoints.is_empty()).then_some(&owner.endpoints);
        let stored = self.payload.retrieve(content_id, secret, endpoints).await;
        if stored.is_none() {
            tracing::warn!(
                switch_id = %switch.id,
                content_id = %content_id,
                "payload retrieval failed; using default content"
            );
        }
        stored
    }

    /// One isolated send attempt.
    async fn send_one(
        &self,
        recipient: &Recipient,
        owner: &Owner,
        subject: &str,
        body: &str,
    ) -> SendOutcome {
        let email = match self.unseal_string(&recipient.encrypted_email) {
            Ok(email) => email,
            Err(e) => {
                tracing::warn!(
                    recipient_id = %recipient.id,
                    error = %e,
                    "recipient email decryption failed"
                );
                return SendOutcome {
                    success: false,
                    recipient: UNKNOWN_RECIPIENT.to_string(),
                    error: Some(e.to_string()),
                };
            }
        };

        let display_name = recipient.encrypted_name.as_ref().and_then(|sealed| {
            match self.unseal_string(sealed) {
                Ok(name) => Some(name),
                Err(e) => {
                    tracing::warn!(
                        recipient_id = %recipient.id,
                        error = %e,
                        "recipient name decryption failed; falling back"
                    );
                    None
                }
            }
        });
        let from_display = display_name.unwrap_or_else(|| {
            if owner.email.is_empty() {
                FALLBACK_DISPLAY.to_string()
            } else {
                owner.email.clone()
            }
        });

        match self.transport.send(&email, subject, body, &from_display).await {
            Ok(()) => SendOutcome {
                success: true,
                recipient: email,
                error: None,
            },
            Err(e) => {
                tracing::warn!(recipient = %email, error = %e, "send failed");
                SendOutcome {
                    success: false,
                    recipient: email,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn unseal_string(&self, sealed: &[u8]) -> Result<String> {
        let bytes = self.cipher.decrypt(sealed, &self.master_key)?;
        String::from_utf8(bytes)
            .map_err(|e| VigilError::crypto(format!("Decrypted field is not UTF-8: {e}")))
    }

    /// Unseal the owner's signing key to the normalized representation.
    /// Failure degrades to default content rather than blocking dispatch.
    fn unseal_owner_key(&self, owner: &Owner) -> Option<SecretKey> {
        match self.cipher.decrypt(&owner.encrypted_signing_key, &self.master_key) {
            Ok(bytes) => match <[u8; 32]>::try_from(bytes.as_slice()) {
                Ok(key) => Some(SecretKey::from_bytes(key)),
                Err(_) => {
                    tracing::warn!(owner_id = %owner.id, "owner signing key has wrong length");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(
                    owner_id = %owner.id,
                    error = %e,
                    "owner signing key decryption failed"
                );
                None
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Dispatcher")
    }
}
