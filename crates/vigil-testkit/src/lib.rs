//! Vigil testkit: mock effect handlers and fixtures.
//!
//! Test doubles live here, never in production crates. Each mock implements
//! one effect trait from `vigil-core` with observable state and failure
//! injection, so the engine suites can drive partial-failure scenarios
//! deterministically.

#![allow(clippy::unwrap_used, clippy::expect_used)]

pub mod clock;
pub mod endpoint;
pub mod fixtures;
pub mod store;
pub mod transport;

pub use clock::ManualClock;
pub use endpoint::MemoryEndpoint;
pub use store::{MemoryStore, TempCredential};
pub use transport::{MockEmailTransport, SentEmail};
