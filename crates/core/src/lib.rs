//! `ledgerdesk-core` — shared domain primitives.
//!
//! Strongly-typed identifiers and the domain error model used by every other
//! crate. No infrastructure concerns live here.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{PrincipalId, TenantId};
