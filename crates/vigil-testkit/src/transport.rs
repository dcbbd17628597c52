//! Recording email transport with per-address failure injection.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;

use vigil_core::effects::EmailEffects;
use vigil_core::{Result, VigilError};

/// One message accepted by the mock transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Message body
    pub body: String,
    /// Human-readable sender name
    pub from_display: String,
}

/// Mock transport that records every send and can fail chosen addresses.
#[derive(Default)]
pub struct MockEmailTransport {
    sent: Mutex<Vec<SentEmail>>,
    failing: Mutex<HashSet<String>>,
}

impl MockEmailTransport {
    /// Create a transport that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sends to `address` fail
    pub fn fail_address(&self, address: &str) {
        self.failing.lock().insert(address.to_string());
    }

    /// Snapshot of accepted messages, in send order
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().clone()
    }

    /// Number of accepted messages
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl EmailEffects for MockEmailTransport {
    async fn send(&self, to: &str, subject: &str, body: &str, from_display: &str) -> Result<()> {
        if self.failing.lock().contains(to) {
            return Err(VigilError::transport(format!("injected failure for {to}")));
        }
        self.sent.lock().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            from_display: from_display.to_string(),
        });
        Ok(())
    }
}
