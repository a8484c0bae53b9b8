//! aud-service
//!
//! The audit core's unit-of-work layer: one function per HTTP operation,
//! each taking a `&PgPool` plus whichever collaborator clients it needs and
//! returning `Result<T, AuditError>`. Transaction boundaries and
//! collaborator calls live here; `aud-daemon` only extracts the caller,
//! checks roles, and maps `AuditError` to an HTTP response.

pub mod action_builder;
pub mod approval;
pub mod apply;
pub mod close;
pub mod error;
pub mod plans;
pub mod report;
pub mod resolution;
pub mod scan;
pub mod session_crud;
pub mod snapshot;

pub use error::{from_collab, AuditError};
