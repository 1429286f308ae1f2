use core::str::FromStr;

use serde::{Deserialize, Serialize};

use ledgerdesk_core::DomainError;

/// Role of an authenticated principal.
///
/// The enumeration is closed: identity records carrying any other role
/// string fail to parse and never become a [`crate::Principal`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Cross-tenant super-user; the only role that may act without a tenant.
    Master,
    /// Full control within exactly one tenant.
    Administrator,
    /// Restricted, entry-level actions within one tenant.
    Operational,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Master, Role::Administrator, Role::Operational];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::Administrator => "administrator",
            Role::Operational => "operational",
        }
    }

    pub fn is_master(&self) -> bool {
        matches!(self, Role::Master)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "master" => Ok(Role::Master),
            "administrator" => Ok(Role::Administrator),
            "operational" => Ok(Role::Operational),
            other => Err(DomainError::invalid_id(format!("unknown role: {other}"))),
        }
    }
}
