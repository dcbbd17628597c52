//! Payload service data types and the compiled-in endpoint defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vigil_core::EndpointList;

/// Endpoint addresses used when an owner has none configured.
const DEFAULT_ENDPOINT_ADDRS: &[&str] = &[
    "wss://relay.damus.io",
    "wss://nos.lol",
    "wss://relay.primal.net",
    "wss://offchain.pub",
];

/// The compiled-in default endpoint list.
pub fn default_endpoints() -> EndpointList {
    EndpointList::new(DEFAULT_ENDPOINT_ADDRS.iter().copied())
}

/// The switch content as stored on endpoints, self-encrypted to the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPayload {
    /// Message subject
    pub subject: String,
    /// Message body
    pub content: String,
    /// Recipient labels recorded at store time
    pub recipients: Vec<String>,
    /// When the payload was stored
    pub created_at: DateTime<Utc>,
}

/// Content-free summary broadcast when a switch fires.
///
/// Carries no payload content and no recipient identities — only that a
/// dispatch happened and to how many logical recipients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeSummary {
    /// Public announcement text
    pub message: String,
    /// How many logical recipients were dispatched to
    pub recipient_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoints_are_nonempty_and_unique() {
        let defaults = default_endpoints();
        assert!(!defaults.is_empty());
        assert_eq!(defaults.len(), DEFAULT_ENDPOINT_ADDRS.len());
    }
}
