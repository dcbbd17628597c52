//! Vigil core: domain types, unified errors, and effect trait definitions.
//!
//! This crate is trait-only. Production handlers live in `vigil-engine` and
//! `vigil-crypto`; test doubles live in `vigil-testkit`. Domain crates depend
//! on the interfaces here, never on concrete collaborators.

pub mod effects;
pub mod errors;
pub mod types;

pub use errors::{Result, VigilError};
pub use types::{
    AuditAction, AuditEntry, ContentId, DispatchDetails, EndpointList, Owner, OwnerId, Recipient,
    RecipientId, ScheduleKind, SecretKey, SendOutcome, Switch, SwitchId,
};
