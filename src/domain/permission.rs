use crate::error::AuthError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const WILDCARD: &str = "*";

/// Internal representation of a permission string: `resource:action[:scope]`.
/// The sole parser used by both storage-layer validation (I3) and
/// PermissionResolver matching (§4.4) — one place, not duplicated per layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PermissionTriple {
    pub resource: String,
    pub action: String,
    pub scope: Option<String>,
}

impl PermissionTriple {
    /// Parses a canonical permission string. `allow_wildcard` must be false
    /// for queries (spec §4.4: "Queries with `*` are rejected as InvalidFormat")
    /// and true for permissions loaded from storage.
    pub fn parse(raw: &str, allow_wildcard: bool) -> Result<Self, AuthError> {
        let parts: Vec<&str> = raw.split(':').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(AuthError::invalid_format("permission_string"));
        }
        for part in &parts {
            if part.is_empty() {
                return Err(AuthError::invalid_format("permission_string"));
            }
            if *part != part.to_lowercase() {
                return Err(AuthError::invalid_format("permission_string"));
            }
            if part.contains(WILDCARD) && !(*part == WILDCARD) {
                return Err(AuthError::invalid_format("permission_string"));
            }
            if *part == WILDCARD && !allow_wildcard {
                return Err(AuthError::invalid_format("permission_string"));
            }
        }
        Ok(Self {
            resource: parts[0].to_string(),
            action: parts[1].to_string(),
            scope: parts.get(2).map(|s| s.to_string()),
        })
    }

    pub fn canonical(&self) -> String {
        match &self.scope {
            Some(scope) => format!("{}:{}:{}", self.resource, self.action, scope),
            None => format!("{}:{}", self.resource, self.action),
        }
    }

    /// The same permission with its scope component dropped, used for
    /// match rule (e): a scoped query also checks the non-scoped grant.
    pub fn without_scope(&self) -> Self {
        Self {
            resource: self.resource.clone(),
            action: self.action.clone(),
            scope: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub resource: String,
    pub action: String,
    pub permission_string: String,
    pub display_name: String,
    pub is_dangerous: bool,
    pub requires_approval: bool,
    pub dependencies: Vec<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const PERMISSION_IMMUTABLE_FIELDS: &[&str] = &["permission_string", "created_at", "tenant_id"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_resource_action() {
        let t = PermissionTriple::parse("order:read", false).unwrap();
        assert_eq!(t.resource, "order");
        assert_eq!(t.action, "read");
        assert_eq!(t.scope, None);
    }

    #[test]
    fn parses_scoped_form() {
        let t = PermissionTriple::parse("order:read:own", false).unwrap();
        assert_eq!(t.scope.as_deref(), Some("own"));
        assert_eq!(t.canonical(), "order:read:own");
    }

    #[test]
    fn rejects_wildcard_in_queries() {
        assert!(PermissionTriple::parse("*:*", false).is_err());
        assert!(PermissionTriple::parse("order:*", false).is_err());
    }

    #[test]
    fn allows_wildcard_in_stored_permissions() {
        assert!(PermissionTriple::parse("*:*", true).is_ok());
        assert!(PermissionTriple::parse("order:*", true).is_ok());
    }

    #[test]
    fn rejects_uppercase_and_empty_components() {
        assert!(PermissionTriple::parse("Order:read", true).is_err());
        assert!(PermissionTriple::parse("order:", true).is_err());
        assert!(PermissionTriple::parse("order", true).is_err());
    }

    #[test]
    fn without_scope_drops_scope_component() {
        let t = PermissionTriple::parse("order:read:own", false).unwrap();
        assert_eq!(t.without_scope().canonical(), "order:read");
    }
}
