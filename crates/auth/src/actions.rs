use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Action token naming a permissible operation.
///
/// Actions are opaque strings (e.g. `"create_entries"`); the well-known
/// tokens of the back-office are provided as constants. Granting an action
/// to a role happens only in [`crate::PermissionTable`], never at call sites.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(Cow<'static, str>);

impl Action {
    /// Register a new company (tenant).
    pub const CREATE_COMPANY: Action = Action(Cow::Borrowed("create_company"));
    /// Administer a company's settings and users.
    pub const MANAGE_COMPANY: Action = Action(Cow::Borrowed("manage_company"));
    /// Post financial entries (payables, receivables, orders).
    pub const CREATE_ENTRIES: Action = Action(Cow::Borrowed("create_entries"));
    /// Read a company's data.
    pub const VIEW_COMPANY: Action = Action(Cow::Borrowed("view_company"));
    /// Read across all tenants.
    pub const VIEW_ALL_COMPANIES: Action = Action(Cow::Borrowed("view_all_companies"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
