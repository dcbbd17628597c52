//! Effect trait definitions.
//!
//! The engine touches the outside world only through these interfaces.
//! Production handlers are constructed at process bootstrap and injected;
//! nothing here is lazily initialized on first use. Mocks live in
//! `vigil-testkit`.

pub mod cipher;
pub mod endpoint;
pub mod store;
pub mod time;
pub mod transport;

pub use cipher::CipherEffects;
pub use endpoint::{EndpointEffects, EndpointRecord, RecordFilter, RecordKind};
pub use store::SwitchStore;
pub use time::ClockEffects;
pub use transport::EmailEffects;
