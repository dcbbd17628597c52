//! Injectable effects for deterministic crypto tests.
//!
//! Randomness and time are the only side effects this crate performs. Both
//! are injected so tests can pin them: a seeded rng makes nonces and
//! ephemeral keys reproducible, and a simulated time source lets tests
//! control record timestamps without sleeping.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use vigil_core::{Result, VigilError};

/// Abstract time source — real system time or simulated time.
pub trait TimeSource: Send + Sync {
    /// Current Unix timestamp in seconds
    fn current_timestamp(&self) -> Result<u64>;

    /// Advance time by N seconds (no-op for real time sources)
    fn advance(&self, _seconds: u64) -> Result<()> {
        Ok(())
    }

    /// Whether this is a simulated source
    fn is_simulated(&self) -> bool {
        false
    }
}

/// Real system time source (production use).
#[derive(Debug, Clone, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn current_timestamp(&self) -> Result<u64> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|e| VigilError::internal(format!("System time before UNIX epoch: {e}")))
    }
}

/// Simulated time source for deterministic tests.
#[derive(Debug, Clone)]
pub struct SimulatedTimeSource {
    current_time: Arc<Mutex<u64>>,
}

impl SimulatedTimeSource {
    /// Create a simulated source starting at the given timestamp
    pub fn new(initial_timestamp: u64) -> Self {
        Self {
            current_time: Arc::new(Mutex::new(initial_timestamp)),
        }
    }
}

impl TimeSource for SimulatedTimeSource {
    fn current_timestamp(&self) -> Result<u64> {
        Ok(*self.current_time.lock())
    }

    fn advance(&self, seconds: u64) -> Result<()> {
        let mut time = self.current_time.lock();
        *time = time.saturating_add(seconds);
        Ok(())
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

/// Bundle of injectable side effects: randomness plus a time source.
#[derive(Clone)]
pub struct Effects {
    rng: Arc<Mutex<StdRng>>,
    time: Arc<dyn TimeSource>,
}

impl Effects {
    /// Production effects: OS-seeded rng, system time
    pub fn production() -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
            time: Arc::new(SystemTimeSource),
        }
    }

    /// Test effects: entropy-seeded rng, system time
    pub fn test() -> Self {
        Self::production()
    }

    /// Fully deterministic effects: seeded rng and a simulated clock
    pub fn deterministic(seed: u64, initial_timestamp: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
            time: Arc::new(SimulatedTimeSource::new(initial_timestamp)),
        }
    }

    /// Draw N random bytes from the injected rng
    pub fn random_bytes<const N: usize>(&self) -> [u8; N] {
        let mut bytes = [0u8; N];
        self.rng.lock().fill_bytes(&mut bytes);
        bytes
    }

    /// Current Unix timestamp in seconds from the injected time source
    pub fn current_timestamp(&self) -> Result<u64> {
        self.time.current_timestamp()
    }

    /// The injected time source
    pub fn time_source(&self) -> &Arc<dyn TimeSource> {
        &self.time
    }
}

impl std::fmt::Debug for Effects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effects")
            .field("simulated_time", &self.time.is_simulated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_effects_reproduce_randomness() {
        let effects1 = Effects::deterministic(42, 1000);
        let effects2 = Effects::deterministic(42, 1000);

        let bytes1: [u8; 32] = effects1.random_bytes();
        let bytes2: [u8; 32] = effects2.random_bytes();
        assert_eq!(bytes1, bytes2);
    }

    #[test]
    fn simulated_time_advances() {
        let effects = Effects::deterministic(1, 1000);
        assert_eq!(effects.current_timestamp().unwrap(), 1000);
        effects.time_source().advance(60).unwrap();
        assert_eq!(effects.current_timestamp().unwrap(), 1060);
    }

    #[test]
    fn production_time_is_not_simulated() {
        let effects = Effects::production();
        assert!(!effects.time_source().is_simulated());
        assert!(effects.current_timestamp().unwrap() > 1_700_000_000);
    }
}
