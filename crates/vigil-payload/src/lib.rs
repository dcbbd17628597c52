//! Vigil payload: the secure payload service.
//!
//! Envelope-encrypts switch content and publishes/fetches it against a set
//! of content-store endpoints, with a compiled-in default endpoint list used
//! whenever an owner has none configured. Also broadcasts the content-free
//! public notice once a switch fires.

pub mod service;
pub mod types;

pub use service::PayloadService;
pub use types::{default_endpoints, NoticeSummary, StoredPayload};
