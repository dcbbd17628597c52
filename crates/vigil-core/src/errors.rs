//! Unified error system for Vigil.
//!
//! One error type covers the whole engine. Variants map onto the failure
//! taxonomy the dispatch pipeline distinguishes: transient I/O (storage,
//! network, transport), decryption failures, configuration gaps, and missing
//! optional capabilities. Callers decide scope: per-recipient and
//! optional-step failures are caught and logged; anything that fails before a
//! switch is marked sent propagates so the switch stays due.

use serde::{Deserialize, Serialize};

/// Result alias used across all Vigil crates.
pub type Result<T> = std::result::Result<T, VigilError>;

/// Unified error type for all Vigil operations.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum VigilError {
    /// Invalid input or malformed data
    #[error("Invalid: {message}")]
    Invalid {
        /// Description of the invalid input
        message: String,
    },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        /// Description of what was not found
        message: String,
    },

    /// Store read or write failed
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage failure
        message: String,
    },

    /// Endpoint publish or fetch failed
    #[error("Network error: {message}")]
    Network {
        /// Description of the network failure
        message: String,
    },

    /// Outbound message transport failed
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure
        message: String,
    },

    /// Cryptographic operation failed (bad key or malformed ciphertext)
    #[error("Crypto error: {message}")]
    Crypto {
        /// Description of the cryptographic failure
        message: String,
    },

    /// Required configuration is absent (no recipients, no endpoints)
    #[error("Configuration gap: {message}")]
    Configuration {
        /// Description of the missing configuration
        message: String,
    },

    /// An optional capability is missing; callers must take a fallback path
    #[error("Capability unavailable: {message}")]
    CapabilityUnavailable {
        /// Description of the missing capability
        message: String,
    },

    /// Serialization or deserialization failed
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the serialization failure
        message: String,
    },

    /// Internal invariant violation
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

impl VigilError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a crypto error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    /// Create a configuration gap error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a capability unavailable error
    pub fn capability_unavailable(message: impl Into<String>) -> Self {
        Self::CapabilityUnavailable {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this failure class is worth retrying on a later sweep
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Network { .. } | Self::Transport { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helper_constructors_set_variant() {
        assert!(matches!(
            VigilError::storage("db down"),
            VigilError::Storage { .. }
        ));
        assert!(matches!(
            VigilError::capability_unavailable("no gift wrap"),
            VigilError::CapabilityUnavailable { .. }
        ));
    }

    #[test]
    fn transient_classification() {
        assert!(VigilError::network("timeout").is_transient());
        assert!(VigilError::transport("smtp refused").is_transient());
        assert!(!VigilError::crypto("bad key").is_transient());
        assert!(!VigilError::configuration("no recipients").is_transient());
    }

    #[test]
    fn display_includes_message() {
        let err = VigilError::configuration("no endpoints configured");
        assert_eq!(
            err.to_string(),
            "Configuration gap: no endpoints configured"
        );
    }
}
