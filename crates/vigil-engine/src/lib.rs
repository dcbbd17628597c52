//! Vigil engine: trigger scheduler, dispatch coordinator, and audit recorder.
//!
//! Three periodic sweeps (fixed-time, inactivity, housekeeping) select due
//! switches; the dispatch coordinator retrieves and decrypts each switch's
//! payload, sends to every recipient with isolated failure handling, flips
//! the terminal `is_sent` state, and writes the audit trail.
//!
//! All collaborators — store, email transport, endpoint client, clock,
//! field cipher — are constructed at process bootstrap and injected; there
//! is no lazily initialized global state.

pub mod audit;
pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod scheduler;
pub mod tasks;
pub mod telemetry;

pub use audit::AuditRecorder;
pub use config::EngineConfig;
pub use dispatch::{DispatchOutcome, Dispatcher, DEFAULT_BODY, DEFAULT_SUBJECT};
pub use handlers::SystemClock;
pub use scheduler::SweepScheduler;
pub use tasks::TaskRegistry;
