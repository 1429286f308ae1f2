//! `ledgerdesk-auth` — authorization boundary (zero-trust).
//!
//! Resolves inbound credentials to a [`Principal`], decides allow/deny per
//! action, and computes the tenant scope applied to every tenant-scoped
//! query. Intentionally decoupled from HTTP and storage: the credential
//! lookup is an injected collaborator, and scopes are plain data values.

pub mod actions;
pub mod credential;
pub mod error;
pub mod guard;
pub mod permissions;
pub mod principal;
pub mod resolver;
pub mod roles;
pub mod scope;

pub use actions::Action;
pub use credential::{CredentialVerifier, IdentityRecord, RawCredential};
pub use error::AuthError;
pub use guard::AuthorizationGuard;
pub use permissions::PermissionTable;
pub use principal::Principal;
pub use resolver::PrincipalResolver;
pub use roles::Role;
pub use scope::{BindValue, QueryFilter, TenantScope};
