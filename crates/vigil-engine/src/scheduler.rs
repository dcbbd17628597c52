//! Trigger scheduler.
//!
//! Three independent periodic sweeps: fixed-time (hourly), inactivity
//! (6-hourly), and housekeeping (daily). Due switches are dispatched
//! sequentially; a per-switch failure is logged and the sweep continues. A
//! failure loading the candidate set aborts that sweep only — every
//! candidate is retried on the next cycle.
//!
//! No cross-run or cross-instance locking exists: the `is_sent` re-check in
//! the selection query is the only overlap guard, so running more than one
//! scheduler instance can double-dispatch. Single-instance deployment is an
//! operational requirement.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use vigil_core::effects::{ClockEffects, SwitchStore};
use vigil_core::{ScheduleKind, Switch};

use crate::config::EngineConfig;
use crate::dispatch::Dispatcher;
use crate::tasks::TaskRegistry;

/// Whole days elapsed since `last_check_in`, floored. Negative when the
/// check-in is in the future.
fn elapsed_days(now: DateTime<Utc>, last_check_in: DateTime<Utc>) -> i64 {
    (now - last_check_in).num_days()
}

/// Runs the periodic sweeps over an injected store, clock, and dispatcher.
pub struct SweepScheduler {
    store: Arc<dyn SwitchStore>,
    clock: Arc<dyn ClockEffects>,
    dispatcher: Arc<Dispatcher>,
    config: EngineConfig,
}

impl SweepScheduler {
    /// Build a scheduler over injected collaborators.
    pub fn new(
        store: Arc<dyn SwitchStore>,
        clock: Arc<dyn ClockEffects>,
        dispatcher: Arc<Dispatcher>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            clock,
            dispatcher,
            config,
        }
    }

    /// Spawn the three sweeps on `registry` at their configured cadences.
    pub fn start(self: &Arc<Self>, registry: &TaskRegistry) {
        let scheduler = self.clone();
        registry.spawn_interval_until(self.config.fixed_time_interval(), move || {
            let scheduler = scheduler.clone();
            async move {
                scheduler.run_fixed_time_sweep().await;
                true
            }
        });

        let scheduler = self.clone();
        registry.spawn_interval_until(self.config.inactivity_interval(), move || {
            let scheduler = scheduler.clone();
            async move {
                scheduler.run_inactivity_sweep().await;
                true
            }
        });

        let scheduler = self.clone();
        registry.spawn_interval_until(self.config.housekeeping_interval(), move || {
            let scheduler = scheduler.clone();
            async move {
                scheduler.run_housekeeping().await;
                true
            }
        });
    }

    /// One fixed-time sweep: dispatch every active, unsent switch whose
    /// scheduled time has passed.
    pub async fn run_fixed_time_sweep(&self) {
        let now = self.clock.now().await;
        let due = match self.store.due_fixed_time(now).await {
            Ok(due) => due,
            Err(e) => {
                tracing::error!(error = %e, "fixed-time sweep aborted: candidate load failed");
                return;
            }
        };
        tracing::debug!(candidates = due.len(), "fixed-time sweep selected");
        self.dispatch_all(&due).await;
    }

    /// One inactivity sweep: dispatch every candidate whose owner has been
    /// silent at least the configured number of whole days.
    pub async fn run_inactivity_sweep(&self) {
        let now = self.clock.now().await;
        let candidates = match self.store.inactivity_candidates().await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::error!(error = %e, "inactivity sweep aborted: candidate load failed");
                return;
            }
        };

        let mut due = Vec::new();
        for switch in candidates {
            let days = match switch.schedule {
                ScheduleKind::InactivityInterval { days } => days,
                // Candidate query only returns interval switches.
                ScheduleKind::FixedTime(_) => continue,
            };
            let owner = match self.store.owner(switch.owner_id).await {
                Ok(owner) => owner,
                Err(e) => {
                    tracing::error!(
                        switch_id = %switch.id,
                        error = %e,
                        "owner load failed; skipping switch this sweep"
                    );
                    continue;
                }
            };
            if elapsed_days(now, owner.last_check_in) >= i64::from(days) {
                due.push(switch);
            }
        }
        tracing::debug!(candidates = due.len(), "inactivity sweep selected");
        self.dispatch_all(&due).await;
    }

    /// One housekeeping sweep: clear expired temporary owner credentials.
    pub async fn run_housekeeping(&self) {
        let now = self.clock.now().await;
        match self.store.clear_expired_credentials(now).await {
            Ok(cleared) if cleared > 0 => {
                tracing::info!(cleared, "housekeeping cleared expired credentials");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "housekeeping sweep failed");
            }
        }
    }

    /// Dispatch due switches sequentially; per-switch failures are logged
    /// and never abort the sweep.
    async fn dispatch_all(&self, due: &[Switch]) {
        for switch in due {
            if let Err(e) = self.dispatcher.dispatch(switch).await {
                tracing::error!(
                    switch_id = %switch.id,
                    error = %e,
                    "dispatch failed; switch remains due for next sweep"
                );
            }
        }
    }
}

impl std::fmt::Debug for SweepScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepScheduler")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn elapsed_days_floors() {
        let last = Utc::now();
        assert_eq!(elapsed_days(last + Duration::hours(23), last), 0);
        assert_eq!(elapsed_days(last + Duration::hours(24), last), 1);
        assert_eq!(elapsed_days(last + Duration::days(8), last), 8);
        assert_eq!(
            elapsed_days(last + Duration::days(7) + Duration::hours(23), last),
            7
        );
    }

    #[test]
    fn elapsed_days_negative_for_future_check_in() {
        let now = Utc::now();
        assert!(elapsed_days(now, now + Duration::days(1)) < 0);
    }
}
