//! `ledgerdesk-infra` — infrastructure adapters for the auth boundary.
//!
//! Concrete implementations of the collaborator traits the core consumes:
//! the credential-verification store and session invalidation.

pub mod session_store;

pub use session_store::{InMemorySessionStore, SessionRecord, SessionStoreError};
