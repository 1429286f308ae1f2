use std::sync::Arc;

use ledgerdesk_core::TenantId;

use crate::{Action, AuthError, PermissionTable, Principal, TenantScope};

/// Stateless per-call authorization decisions.
///
/// Every inbound action passes `authorize`/`require` before reaching a
/// handler, and every tenant-scoped read/write derives its tenant constraint
/// from `scope_to_tenant` — no handler may build a tenant filter from raw
/// request input.
pub struct AuthorizationGuard {
    table: Arc<PermissionTable>,
}

impl AuthorizationGuard {
    pub fn new(table: Arc<PermissionTable>) -> Self {
        Self { table }
    }

    /// Pure allow/deny: allow iff the action is granted to the principal's
    /// role in the permission table. Deny is the default.
    pub fn authorize(&self, principal: &Principal, action: &Action) -> bool {
        self.table.is_granted(principal.role, action)
    }

    /// Boundary helper mapping a denial to [`AuthError::Forbidden`].
    ///
    /// The error carries no detail; what was denied and why goes to the log.
    pub fn require(&self, principal: &Principal, action: &Action) -> Result<(), AuthError> {
        if self.authorize(principal, action) {
            Ok(())
        } else {
            tracing::debug!(
                principal_id = %principal.id,
                role = %principal.role,
                action = %action,
                "action denied"
            );
            Err(AuthError::Forbidden)
        }
    }

    /// Compute the effective tenant scope for a tenant-scoped operation.
    ///
    /// - `master`: the requested tenant if given, else unscoped (all
    ///   tenants).
    /// - Any other role: always the principal's own tenant. A request for
    ///   another tenant's id is not an error — it is silently overridden,
    ///   so tenant spoofing via parameter injection cannot widen the scope
    ///   and handlers always receive a usable filter.
    pub fn scope_to_tenant(
        &self,
        principal: &Principal,
        requested: Option<TenantId>,
    ) -> Result<TenantScope, AuthError> {
        if principal.is_master() {
            return Ok(match requested {
                Some(tenant_id) => TenantScope::Tenant(tenant_id),
                None => TenantScope::Unscoped,
            });
        }

        match principal.tenant_id {
            Some(own) => {
                if requested.is_some_and(|req| req != own) {
                    tracing::debug!(
                        principal_id = %principal.id,
                        "requested tenant overridden to the principal's own"
                    );
                }
                Ok(TenantScope::Tenant(own))
            }
            // Unreachable for resolver-built principals; fail closed anyway.
            None => Err(AuthError::Forbidden),
        }
    }
}
