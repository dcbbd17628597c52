//! Engine configuration.
//!
//! Sweep cadences default to the production schedule (hourly fixed-time,
//! 6-hourly inactivity, daily housekeeping) and are configurable so tests
//! and staging can run short intervals. The service master key arrives as
//! hex and is normalized to the binary [`SecretKey`] representation here,
//! at the boundary.

use std::time::Duration;

use serde::Deserialize;

use vigil_core::{Result, SecretKey, VigilError};

/// Engine settings, loadable from TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds between fixed-time sweeps
    pub fixed_time_sweep_secs: u64,
    /// Seconds between inactivity sweeps
    pub inactivity_sweep_secs: u64,
    /// Seconds between housekeeping sweeps
    pub housekeeping_sweep_secs: u64,
    /// Service master key, hex-encoded 32 bytes
    pub master_key_hex: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fixed_time_sweep_secs: 60 * 60,
            inactivity_sweep_secs: 6 * 60 * 60,
            housekeeping_sweep_secs: 24 * 60 * 60,
            master_key_hex: None,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| VigilError::invalid(format!("Bad engine config: {e}")))
    }

    /// Fixed-time sweep cadence
    pub fn fixed_time_interval(&self) -> Duration {
        Duration::from_secs(self.fixed_time_sweep_secs)
    }

    /// Inactivity sweep cadence
    pub fn inactivity_interval(&self) -> Duration {
        Duration::from_secs(self.inactivity_sweep_secs)
    }

    /// Housekeeping cadence
    pub fn housekeeping_interval(&self) -> Duration {
        Duration::from_secs(self.housekeeping_sweep_secs)
    }

    /// Decode the configured master key
    pub fn master_key(&self) -> Result<SecretKey> {
        let hex = self
            .master_key_hex
            .as_deref()
            .ok_or_else(|| VigilError::configuration("master_key_hex is not set"))?;
        SecretKey::from_hex(hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_cadence() {
        let config = EngineConfig::default();
        assert_eq!(config.fixed_time_interval(), Duration::from_secs(3600));
        assert_eq!(config.inactivity_interval(), Duration::from_secs(21_600));
        assert_eq!(config.housekeeping_interval(), Duration::from_secs(86_400));
        assert!(config.master_key().is_err());
    }

    #[test]
    fn parses_partial_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            fixed_time_sweep_secs = 10
            master_key_hex = "0101010101010101010101010101010101010101010101010101010101010101"
            "#,
        )
        .unwrap();
        assert_eq!(config.fixed_time_sweep_secs, 10);
        assert_eq!(config.inactivity_sweep_secs, 21_600);
        assert_eq!(config.master_key().unwrap().as_bytes(), &[1u8; 32]);
    }

    #[test]
    fn rejects_bad_master_key() {
        let config = EngineConfig {
            master_key_hex: Some("abcd".to_string()),
            ..EngineConfig::default()
        };
        assert!(config.master_key().is_err());
    }
}
