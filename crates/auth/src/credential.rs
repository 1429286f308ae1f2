use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerdesk_core::{PrincipalId, TenantId};

use crate::Role;

/// Opaque credential material taken from an inbound request (bearer token or
/// session cookie value). Format is an external concern; this layer only
/// carries it to the verifier.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RawCredential(String);

impl RawCredential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Extract a credential from an `Authorization` header value.
    ///
    /// Returns `None` for a missing scheme, wrong scheme, or empty token —
    /// callers surface all of those as `Unauthenticated`.
    pub fn from_authorization_header(value: &str) -> Option<Self> {
        let token = value.strip_prefix("Bearer ")?.trim();
        if token.is_empty() {
            return None;
        }
        Some(Self(token.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

// Credential material must not end up in logs.
impl core::fmt::Debug for RawCredential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("RawCredential(<redacted>)")
    }
}

/// Identity record resolved from a credential by the verification
/// collaborator (session/token store).
///
/// The record's `role` string has already been parsed into the closed
/// [`Role`] enum by the store boundary; permissions are *not* part of the
/// record — they are always recomputed from the permission table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub principal_id: PrincipalId,
    pub role: Role,
    pub tenant_id: Option<TenantId>,
}

/// External credential-verification collaborator.
///
/// `verify` answers "does this credential currently map to an identity?".
/// Not-found, expired and malformed credentials all collapse to `None`; the
/// caller cannot distinguish them, by design. `now` is passed explicitly so
/// implementations stay deterministic under test.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, credential: &RawCredential, now: DateTime<Utc>) -> Option<IdentityRecord>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bearer_token() {
        let cred = RawCredential::from_authorization_header("Bearer abc123 ").unwrap();
        assert_eq!(cred.expose(), "abc123");
    }

    #[test]
    fn rejects_non_bearer_and_empty() {
        assert!(RawCredential::from_authorization_header("Basic abc").is_none());
        assert!(RawCredential::from_authorization_header("Bearer ").is_none());
        assert!(RawCredential::from_authorization_header("abc123").is_none());
    }

    #[test]
    fn debug_never_prints_the_token() {
        let cred = RawCredential::new("top-secret");
        assert!(!format!("{cred:?}").contains("top-secret"));
    }
}
