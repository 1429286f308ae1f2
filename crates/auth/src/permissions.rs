use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::{Action, Role};

/// Immutable mapping from role to granted actions.
///
/// The table is the single source of truth for every action check: resolvers
/// derive a principal's permissions from it, and the guard consults it for
/// each decision. Construct it once at process start and inject it
/// (`Arc<PermissionTable>`) rather than reaching for a hidden global.
///
/// Lookups are fail-closed: a role with no entry has the empty grant set.
#[derive(Debug, Clone, Serialize)]
pub struct PermissionTable {
    grants: HashMap<Role, BTreeSet<Action>>,
    #[serde(skip)]
    empty: BTreeSet<Action>,
}

impl PermissionTable {
    pub fn new(grants: HashMap<Role, BTreeSet<Action>>) -> Self {
        Self {
            grants,
            empty: BTreeSet::new(),
        }
    }

    /// The back-office grant matrix.
    ///
    /// | role          | granted actions                                   |
    /// |---------------|---------------------------------------------------|
    /// | master        | all five tokens                                   |
    /// | administrator | manage_company, create_entries, view_company      |
    /// | operational   | create_entries, view_company                      |
    pub fn builtin() -> Self {
        let mut grants: HashMap<Role, BTreeSet<Action>> = HashMap::new();

        grants.insert(
            Role::Master,
            BTreeSet::from([
                Action::CREATE_COMPANY,
                Action::MANAGE_COMPANY,
                Action::CREATE_ENTRIES,
                Action::VIEW_COMPANY,
                Action::VIEW_ALL_COMPANIES,
            ]),
        );
        grants.insert(
            Role::Administrator,
            BTreeSet::from([
                Action::MANAGE_COMPANY,
                Action::CREATE_ENTRIES,
                Action::VIEW_COMPANY,
            ]),
        );
        grants.insert(
            Role::Operational,
            BTreeSet::from([Action::CREATE_ENTRIES, Action::VIEW_COMPANY]),
        );

        Self::new(grants)
    }

    /// Granted actions for `role`; empty if the role has no entry.
    pub fn permissions_for(&self, role: Role) -> &BTreeSet<Action> {
        self.grants.get(&role).unwrap_or(&self.empty)
    }

    pub fn is_granted(&self, role: Role, action: &Action) -> bool {
        self.permissions_for(role).contains(action)
    }
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_total() {
        let table = PermissionTable::builtin();
        for role in Role::ALL {
            // Every enumerated role has a (possibly empty) grant set.
            let _ = table.permissions_for(role);
        }
        assert!(!table.permissions_for(Role::Operational).is_empty());
    }

    #[test]
    fn missing_entry_fails_closed() {
        let table = PermissionTable::new(HashMap::new());
        for role in Role::ALL {
            assert!(table.permissions_for(role).is_empty());
            assert!(!table.is_granted(role, &Action::VIEW_COMPANY));
        }
    }

    #[test]
    fn operational_grants_match_entry_level_work() {
        let table = PermissionTable::builtin();
        assert!(table.is_granted(Role::Operational, &Action::CREATE_ENTRIES));
        assert!(!table.is_granted(Role::Operational, &Action::CREATE_COMPANY));
        assert!(!table.is_granted(Role::Operational, &Action::VIEW_ALL_COMPANIES));
    }

    #[test]
    fn table_serializes_to_a_readable_audit_dump() {
        let table = PermissionTable::builtin();
        let dump = serde_json::to_value(&table).unwrap();

        let grants = dump
            .get("grants")
            .and_then(|g| g.as_object())
            .unwrap();
        assert_eq!(grants.len(), Role::ALL.len());

        let operational: Vec<&str> = grants["operational"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a.as_str().unwrap())
            .collect();
        assert_eq!(operational, ["create_entries", "view_company"]);
        assert_eq!(grants["master"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn master_is_granted_every_builtin_action() {
        let table = PermissionTable::builtin();
        for action in [
            Action::CREATE_COMPANY,
            Action::MANAGE_COMPANY,
            Action::CREATE_ENTRIES,
            Action::VIEW_COMPANY,
            Action::VIEW_ALL_COMPANIES,
        ] {
            assert!(table.is_granted(Role::Master, &action));
        }
    }
}
