use std::collections::BTreeSet;

use serde::Serialize;

use ledgerdesk_core::{PrincipalId, TenantId};

use crate::{Action, Role};

/// A fully resolved principal for authorization decisions.
///
/// Built fresh by [`crate::PrincipalResolver`] on every resolution and
/// discarded at end of request; never cached across requests. `permissions`
/// is derived from `role` via the permission table at resolution time — it is
/// never persisted and never taken from anything the client transmitted.
///
/// # Invariants
/// - `tenant_id` is `None` only for [`Role::Master`] ("all tenants").
/// - `permissions == table.permissions_for(role)` as of resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub role: Role,
    pub tenant_id: Option<TenantId>,
    pub permissions: BTreeSet<Action>,
}

impl Principal {
    pub fn is_master(&self) -> bool {
        self.role.is_master()
    }
}
