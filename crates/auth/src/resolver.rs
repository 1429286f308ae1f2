use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{AuthError, CredentialVerifier, PermissionTable, Principal, RawCredential};

/// Turns raw credential material into a typed [`Principal`], or fails with
/// [`AuthError::Unauthenticated`].
///
/// The resolver trusts exactly two inputs: the verifier's identity record and
/// the injected permission table. Role or permission claims transmitted by
/// the client are never consulted, so a tampered or stale claim cannot
/// escalate privilege — the principal's permissions always reflect the
/// record's role at resolution time.
pub struct PrincipalResolver {
    verifier: Arc<dyn CredentialVerifier>,
    table: Arc<PermissionTable>,
}

impl PrincipalResolver {
    pub fn new(verifier: Arc<dyn CredentialVerifier>, table: Arc<PermissionTable>) -> Self {
        Self { verifier, table }
    }

    /// Resolve `credential` to a principal.
    ///
    /// - No IO beyond the verifier lookup
    /// - No implicit session extension
    /// - Fail-closed: an unresolvable credential or a malformed record
    ///   (non-master without a tenant) is `Unauthenticated`
    pub fn resolve(
        &self,
        credential: &RawCredential,
        now: DateTime<Utc>,
    ) -> Result<Principal, AuthError> {
        let Some(record) = self.verifier.verify(credential, now) else {
            tracing::debug!("credential did not resolve to an identity");
            return Err(AuthError::Unauthenticated);
        };

        if record.tenant_id.is_none() && !record.role.is_master() {
            tracing::debug!(
                principal_id = %record.principal_id,
                role = %record.role,
                "identity record has no tenant for a tenant-bound role"
            );
            return Err(AuthError::Unauthenticated);
        }

        Ok(Principal {
            id: record.principal_id,
            role: record.role,
            tenant_id: record.tenant_id,
            permissions: self.table.permissions_for(record.role).clone(),
        })
    }
}
