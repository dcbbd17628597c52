//! Production effect handlers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use vigil_core::effects::ClockEffects;

/// Real wall-clock handler, delegating to system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ClockEffects for SystemClock {
    async fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn system_clock_advances() {
        let clock = SystemClock::new();
        let t1 = clock.now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let t2 = clock.now().await;
        assert!(t2 > t1);
    }
}
