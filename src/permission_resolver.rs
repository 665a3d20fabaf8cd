//! PermissionResolver (spec §4.4): assembles a user's effective permission
//! set from roles + additional grants - revocations, then answers wildcard-
//! aware membership queries in caller order.

use crate::domain::permission::PermissionTriple;
use crate::error::AuthError;
use crate::store::{CredentialStore, UserFilter};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

pub struct PermissionResolver {
    store: Arc<dyn CredentialStore>,
}

impl PermissionResolver {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Steps 1-3 of §4.4: load user, load roles via the aggregation method,
    /// compute `E = (⋃ role.permissions ∪ additional) − revoked`.
    pub async fn effective_permissions(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<HashSet<String>, AuthError> {
        let user = self.store.find_user(UserFilter::by_id(tenant_id, user_id)).await?;

        let role_permissions = match self.store.user_permissions(tenant_id, user_id).await {
            Ok(perms) => perms.into_iter().map(|p| p.permission_string).collect::<HashSet<_>>(),
            Err(err) => {
                tracing::warn!("aggregated user_permissions unavailable, falling back to sequential lookups: {err}");
                self.sequential_role_permissions(tenant_id, &user.role_ids()).await?
            }
        };

        let mut effective: HashSet<String> = role_permissions;
        effective.extend(user.additional_permissions.iter().cloned());
        for revoked in &user.revoked_permissions {
            effective.remove(revoked);
        }
        Ok(effective)
    }

    async fn sequential_role_permissions(
        &self,
        tenant_id: Uuid,
        role_ids: &[Uuid],
    ) -> Result<HashSet<String>, AuthError> {
        let mut permissions = HashSet::new();
        for role_id in role_ids {
            let role = self
                .store
                .find_role(crate::store::RoleFilter { tenant_id, id: Some(*role_id), name: None })
                .await?;
            permissions.extend(role.permissions);
        }
        Ok(permissions)
    }

    /// Step 4's match rule (a)-(e), first match wins.
    pub fn matches(effective: &HashSet<String>, query: &PermissionTriple) -> bool {
        if effective.contains("*:*") {
            return true;
        }
        if effective.contains(&format!("{}:*", query.resource)) {
            return true;
        }
        if effective.contains(&format!("*:{}", query.action)) {
            return true;
        }
        if effective.contains(&query.canonical()) {
            return true;
        }
        if query.scope.is_some() && effective.contains(&query.without_scope().canonical()) {
            return true;
        }
        false
    }

    pub async fn check(&self, tenant_id: Uuid, user_id: Uuid, permission: &str) -> Result<bool, AuthError> {
        let effective = self.effective_permissions(tenant_id, user_id).await?;
        let query = PermissionTriple::parse(permission, false)?;
        Ok(Self::matches(&effective, &query))
    }

    /// Step 5: returns `(query, bool)` pairs preserving caller order.
    pub async fn check_many(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        permissions: &[String],
    ) -> Result<Vec<(String, bool)>, AuthError> {
        let effective = self.effective_permissions(tenant_id, user_id).await?;
        let mut results = Vec::with_capacity(permissions.len());
        for raw in permissions {
            let query = PermissionTriple::parse(raw, false)?;
            results.push((raw.clone(), Self::matches(&effective, &query)));
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn global_wildcard_matches_anything() {
        let effective = set(&["*:*"]);
        let q = PermissionTriple::parse("order:delete", false).unwrap();
        assert!(PermissionResolver::matches(&effective, &q));
    }

    #[test]
    fn resource_wildcard_matches_any_action_on_resource() {
        let effective = set(&["order:*"]);
        assert!(PermissionResolver::matches(&effective, &PermissionTriple::parse("order:delete", false).unwrap()));
        assert!(!PermissionResolver::matches(&effective, &PermissionTriple::parse("user:delete", false).unwrap()));
    }

    #[test]
    fn action_wildcard_matches_any_resource_with_action() {
        let effective = set(&["*:read"]);
        assert!(PermissionResolver::matches(&effective, &PermissionTriple::parse("order:read", false).unwrap()));
        assert!(!PermissionResolver::matches(&effective, &PermissionTriple::parse("order:write", false).unwrap()));
    }

    #[test]
    fn scoped_query_falls_back_to_unscoped_grant() {
        let effective = set(&["order:read"]);
        let q = PermissionTriple::parse("order:read:own", false).unwrap();
        assert!(PermissionResolver::matches(&effective, &q));
    }

    #[test]
    fn exact_match_required_when_no_wildcard_present() {
        let effective = set(&["order:read"]);
        let q = PermissionTriple::parse("order:write", false).unwrap();
        assert!(!PermissionResolver::matches(&effective, &q));
    }
}
