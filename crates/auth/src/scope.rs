use serde::Serialize;
use uuid::Uuid;

use ledgerdesk_core::{DomainError, TenantId};

/// Effective tenant constraint for one data operation.
///
/// Produced only by [`crate::AuthorizationGuard::scope_to_tenant`]; handlers
/// apply it verbatim. `Unscoped` (master only) means all tenants.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantScope {
    Unscoped,
    Tenant(TenantId),
}

impl TenantScope {
    pub fn tenant_id(&self) -> Option<TenantId> {
        match self {
            TenantScope::Unscoped => None,
            TenantScope::Tenant(id) => Some(*id),
        }
    }

    pub fn is_unscoped(&self) -> bool {
        matches!(self, TenantScope::Unscoped)
    }

    /// Conjoin this scope onto `filter` as `column = $n`.
    ///
    /// The scope is appended to whatever conditions the handler already
    /// built, never substituted for them, and the tenant id travels as a
    /// bound parameter — it never appears in the clause text.
    pub fn apply(&self, column: &str, filter: &mut QueryFilter) -> Result<(), DomainError> {
        match self {
            TenantScope::Unscoped => Ok(()),
            TenantScope::Tenant(id) => {
                filter.push_eq(column, BindValue::Uuid(*id.as_uuid()))
            }
        }
    }
}

/// A value bound to a query parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindValue {
    Uuid(Uuid),
    Text(String),
    Integer(i64),
    Bool(bool),
}

/// Conjunctive filter for a row-returning query.
///
/// Clause text contains only column identifiers, `=`, and `$n` placeholders;
/// every value is carried in `params` in placeholder order. The query layer
/// binds them — nothing here is ever string-interpolated into SQL.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryFilter {
    clauses: Vec<String>,
    params: Vec<BindValue>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an equality condition (AND-composed with existing ones).
    pub fn push_eq(&mut self, column: &str, value: BindValue) -> Result<(), DomainError> {
        validate_identifier(column)?;
        self.params.push(value);
        self.clauses.push(format!("{column} = ${}", self.params.len()));
        Ok(())
    }

    /// `WHERE` text (without the keyword), or `None` if no conditions.
    pub fn to_sql(&self) -> Option<String> {
        if self.clauses.is_empty() {
            None
        } else {
            Some(self.clauses.join(" AND "))
        }
    }

    pub fn params(&self) -> &[BindValue] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Column names come from code, not requests; reject anything that is not a
/// plain (optionally qualified) identifier all the same.
fn validate_identifier(column: &str) -> Result<(), DomainError> {
    let valid = !column.is_empty()
        && !column.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && column
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "invalid column identifier: {column:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_is_conjoined_not_substituted() {
        let tenant = TenantId::new();
        let mut filter = QueryFilter::new();
        filter
            .push_eq("status", BindValue::Text("open".into()))
            .unwrap();

        TenantScope::Tenant(tenant)
            .apply("invoices.tenant_id", &mut filter)
            .unwrap();

        assert_eq!(
            filter.to_sql().unwrap(),
            "status = $1 AND invoices.tenant_id = $2"
        );
        assert_eq!(
            filter.params(),
            &[
                BindValue::Text("open".into()),
                BindValue::Uuid(*tenant.as_uuid())
            ]
        );
    }

    #[test]
    fn tenant_id_never_appears_in_clause_text() {
        let tenant = TenantId::new();
        let mut filter = QueryFilter::new();
        TenantScope::Tenant(tenant)
            .apply("tenant_id", &mut filter)
            .unwrap();

        let sql = filter.to_sql().unwrap();
        assert!(!sql.contains(&tenant.to_string()));
        assert_eq!(sql, "tenant_id = $1");
    }

    #[test]
    fn unscoped_leaves_the_filter_untouched() {
        let mut filter = QueryFilter::new();
        TenantScope::Unscoped.apply("tenant_id", &mut filter).unwrap();
        assert!(filter.is_empty());
        assert_eq!(filter.to_sql(), None);
    }

    #[test]
    fn hostile_column_identifiers_are_rejected() {
        let mut filter = QueryFilter::new();
        for column in ["", "1col", "t; DROP TABLE users", "a = b OR 1=1", ".x"] {
            assert!(filter.push_eq(column, BindValue::Bool(true)).is_err());
        }
        assert!(filter.is_empty());
    }

    #[test]
    fn qualified_identifiers_are_accepted() {
        let mut filter = QueryFilter::new();
        filter.push_eq("orders.tenant_id", BindValue::Integer(1)).unwrap();
        assert_eq!(filter.to_sql().unwrap(), "orders.tenant_id = $1");
    }
}
