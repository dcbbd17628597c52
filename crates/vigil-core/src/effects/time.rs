//! Wall-clock effects.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Clock effects for due-ness evaluation and timestamps.
#[async_trait]
pub trait ClockEffects: Send + Sync {
    /// Current wall-clock time
    async fn now(&self) -> DateTime<Utc>;
}
