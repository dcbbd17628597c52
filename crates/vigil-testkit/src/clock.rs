//! Manually driven clock.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use vigil_core::effects::ClockEffects;

/// Clock whose time tests set and advance explicitly.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock pinned at `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    /// Pin the clock to an absolute time
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

#[async_trait]
impl ClockEffects for ManualClock {
    async fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
