//! RBACManager (spec §4.6): permission-gated CRUD on roles and permissions.
//!
//! Every operation follows the permission-gate-then-delegate pattern visible
//! in the pack's `vbrevik-ontology-manager` rebac service and `fraiseql`
//! rbac modules: resolve the required permission string, check it, then
//! delegate to the store. Denial never discloses whether the target exists.

use crate::domain::{Permission, Role};
use crate::error::AuthError;
use crate::permission_resolver::PermissionResolver;
use crate::store::{CredentialStore, ListOptions, PermissionFilter, RoleFilter};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub struct Caller {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
}

pub struct RBACManager {
    store: Arc<dyn CredentialStore>,
    resolver: Arc<PermissionResolver>,
}

impl RBACManager {
    pub fn new(store: Arc<dyn CredentialStore>, resolver: Arc<PermissionResolver>) -> Self {
        Self { store, resolver }
    }

    async fn require(&self, caller: &Caller, resource_type: &str, action: &str) -> Result<(), AuthError> {
        let required = format!("{resource_type}:{action}");
        let allowed = self.resolver.check(caller.tenant_id, caller.user_id, &required).await?;
        if allowed {
            Ok(())
        } else {
            Err(AuthError::permission_denied())
        }
    }

    pub async fn create_role(&self, caller: &Caller, mut role: Role) -> Result<Role, AuthError> {
        self.require(caller, "role", "create").await?;
        role.tenant_id = caller.tenant_id;
        role.id = Uuid::new_v4();
        let now = Utc::now();
        role.created_at = now;
        role.updated_at = now;
        self.store.create_role(role).await
    }

    pub async fn get_role(&self, caller: &Caller, id: Uuid) -> Result<Role, AuthError> {
        self.require(caller, "role", "read").await?;
        self.store.find_role(RoleFilter { tenant_id: caller.tenant_id, id: Some(id), name: None }).await
    }

    pub async fn list_roles(&self, caller: &Caller, options: ListOptions) -> Result<Vec<Role>, AuthError> {
        self.require(caller, "role", "read").await?;
        self.store.list_roles(caller.tenant_id, options).await
    }

    pub async fn update_role(&self, caller: &Caller, id: Uuid, role: Role) -> Result<Role, AuthError> {
        self.require(caller, "role", "update").await?;
        self.store
            .update_role(RoleFilter { tenant_id: caller.tenant_id, id: Some(id), name: None }, role)
            .await
    }

    /// A role in use by any user cannot be deleted (spec §4.6); a
    /// system-type role cannot be deleted regardless of use (spec §3).
    pub async fn delete_role(&self, caller: &Caller, id: Uuid) -> Result<(), AuthError> {
        self.require(caller, "role", "delete").await?;
        let role = self.get_role(caller, id).await?;
        if role.is_system_role() {
            return Err(AuthError::duplicate_resource("system role cannot be deleted"));
        }
        self.store
            .delete_role(RoleFilter { tenant_id: caller.tenant_id, id: Some(id), name: None })
            .await
    }

    pub async fn create_permission(
        &self,
        caller: &Caller,
        mut permission: Permission,
    ) -> Result<Permission, AuthError> {
        self.require(caller, "permission", "create").await?;
        let triple = crate::domain::permission::PermissionTriple::parse(&permission.permission_string, true)?;
        permission.resource = triple.resource;
        permission.action = triple.action;
        permission.permission_string = triple.canonical();
        permission.tenant_id = caller.tenant_id;
        permission.id = Uuid::new_v4();
        let now = Utc::now();
        permission.created_at = now;
        permission.updated_at = now;
        self.store.create_permission(permission).await
    }

    pub async fn get_permission(&self, caller: &Caller, id: Uuid) -> Result<Permission, AuthError> {
        self.require(caller, "permission", "read").await?;
        self.store
            .find_permission(PermissionFilter { tenant_id: caller.tenant_id, id: Some(id), permission_string: None })
            .await
    }

    pub async fn list_permissions(&self, caller: &Caller, options: ListOptions) -> Result<Vec<Permission>, AuthError> {
        self.require(caller, "permission", "read").await?;
        self.store.list_permissions(caller.tenant_id, options).await
    }

    pub async fn update_permission(
        &self,
        caller: &Caller,
        id: Uuid,
        permission: Permission,
    ) -> Result<Permission, AuthError> {
        self.require(caller, "permission", "update").await?;
        self.store
            .update_permission(
                PermissionFilter { tenant_id: caller.tenant_id, id: Some(id), permission_string: None },
                permission,
            )
            .await
    }

    pub async fn delete_permission(&self, caller: &Caller, id: Uuid) -> Result<(), AuthError> {
        self.require(caller, "permission", "delete").await?;
        self.store
            .delete_permission(PermissionFilter { tenant_id: caller.tenant_id, id: Some(id), permission_string: None })
            .await
    }
}
