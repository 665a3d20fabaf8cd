//! VerificationAPI (spec §4.7): stateless façade over PermissionResolver and
//! CredentialStore, consumed by sibling services over the RPC/HTTP boundary.
//! No cache, no mutable state — matching the pack's `fraiseql-server`
//! read-only rbac façade shape.

use crate::error::AuthError;
use crate::permission_resolver::PermissionResolver;
use crate::store::{CredentialStore, UserFilter};
use std::sync::Arc;
use uuid::Uuid;

pub struct VerificationAPI {
    store: Arc<dyn CredentialStore>,
    resolver: Arc<PermissionResolver>,
    system_tenant_id: Uuid,
}

impl VerificationAPI {
    pub fn new(store: Arc<dyn CredentialStore>, resolver: Arc<PermissionResolver>, system_tenant_id: Uuid) -> Self {
        Self { store, resolver, system_tenant_id }
    }

    /// If `target_tenant_id != tenant_id`, the caller must also hold the
    /// global `*:*` permission (system-tenant case).
    async fn authorize_cross_tenant(&self, tenant_id: Uuid, user_id: Uuid, target_tenant_id: Uuid) -> Result<(), AuthError> {
        if target_tenant_id != tenant_id {
            // "*:*" is a stored-permission form, not a valid query (spec
            // §4.4: queries containing `*` are rejected), so the global
            // grant is checked directly against the effective set rather
            // than through `PermissionResolver::check`.
            let effective = self.resolver.effective_permissions(tenant_id, user_id).await?;
            if !effective.contains("*:*") {
                return Err(AuthError::permission_denied());
            }
        }
        Ok(())
    }

    pub async fn has_permission(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        permission: &str,
        target_tenant_id: Uuid,
    ) -> Result<(), AuthError> {
        self.authorize_cross_tenant(tenant_id, user_id, target_tenant_id).await?;
        let allowed = self.resolver.check(tenant_id, user_id, permission).await?;
        if allowed {
            Ok(())
        } else {
            Err(AuthError::permission_denied())
        }
    }

    pub async fn check_permissions(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        permissions: &[String],
    ) -> Result<Vec<(String, bool)>, AuthError> {
        self.resolver.check_many(tenant_id, user_id, permissions).await
    }

    /// `target_tenant_id` lets a system-tenant caller query a user in a
    /// different tenant, exactly like `has_permission`'s gate (spec §4.7).
    pub async fn get_user_permissions(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        target_user_id: Uuid,
        target_tenant_id: Uuid,
    ) -> Result<Vec<String>, AuthError> {
        self.authorize_cross_tenant(tenant_id, user_id, target_tenant_id).await?;
        let effective = self.resolver.effective_permissions(target_tenant_id, target_user_id).await?;
        Ok(effective.into_iter().collect())
    }

    pub async fn get_user_roles(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        target_user_id: Uuid,
        target_tenant_id: Uuid,
    ) -> Result<Vec<Uuid>, AuthError> {
        self.authorize_cross_tenant(tenant_id, user_id, target_tenant_id).await?;
        let user = self.store.find_user(UserFilter::by_id(target_tenant_id, target_user_id)).await?;
        Ok(user.role_ids())
    }

    pub fn is_system_tenant(&self, tenant_id: Uuid) -> bool {
        tenant_id == self.system_tenant_id
    }
}
