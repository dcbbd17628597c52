//! Outbound message transport contract.
//!
//! Transport selection and configuration (SMTP, API relays) is out of scope;
//! the engine only needs this send contract.

use async_trait::async_trait;

use crate::errors::Result;

/// Email delivery effects.
#[async_trait]
pub trait EmailEffects: Send + Sync {
    /// Send one message. `from_display` is the human-readable sender name
    /// shown to the recipient, not an address.
    async fn send(&self, to: &str, subject: &str, body: &str, from_display: &str) -> Result<()>;
}
