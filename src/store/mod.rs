//! CredentialStore: tenant-scoped persistent collections (spec §4.2).
//!
//! Mirrors the teacher's split between a generic CRUD contract and a
//! concrete backend (`Repository<T>` / `DatabaseManager` there), except the
//! entity set here is fixed rather than dynamic, so no query-builder DSL is
//! needed — each backend hand-writes its own queries per entity.

pub mod memory;
pub mod postgres;

use crate::domain::{Permission, Role, Tenant, User};
use crate::error::AuthError;
use async_trait::async_trait;
use uuid::Uuid;

/// Every read/write filter except the tenant-registry operations carries a
/// mandatory `tenant_id`, enforced by the type system rather than by
/// convention (spec §9: "tenant isolation as an invariant, not a filter").
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct UserFilter {
    pub tenant_id: Uuid,
    pub id: Option<Uuid>,
    pub email: Option<String>,
    pub username: Option<String>,
}

impl UserFilter {
    pub fn by_id(tenant_id: Uuid, id: Uuid) -> Self {
        Self { tenant_id, id: Some(id), email: None, username: None }
    }

    pub fn by_identifier(tenant_id: Uuid, identifier: &str) -> Self {
        let identifier = identifier.to_lowercase();
        Self {
            tenant_id,
            id: None,
            email: Some(identifier.clone()),
            username: Some(identifier),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoleFilter {
    pub tenant_id: Uuid,
    pub id: Option<Uuid>,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PermissionFilter {
    pub tenant_id: Uuid,
    pub id: Option<Uuid>,
    pub permission_string: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TenantFilter {
    pub id: Option<Uuid>,
    pub slug: Option<String>,
}

/// Fields the caller must not change on update, checked by a
/// read-current-then-diff policy (spec §9) rather than trusting the payload.
pub fn reject_immutable_changes(
    immutable_fields: &[&str],
    changed_fields: &[String],
) -> Result<(), AuthError> {
    let offenders: Vec<String> = changed_fields
        .iter()
        .filter(|f| immutable_fields.contains(&f.as_str()))
        .cloned()
        .collect();
    if offenders.is_empty() {
        Ok(())
    } else {
        Err(AuthError::restricted_fields(offenders))
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn create_tenant(&self, tenant: Tenant) -> Result<Tenant, AuthError>;
    async fn find_tenant(&self, filter: TenantFilter) -> Result<Tenant, AuthError>;
    async fn list_tenants(&self, options: ListOptions) -> Result<Vec<Tenant>, AuthError>;
    async fn update_tenant(&self, id: Uuid, tenant: Tenant) -> Result<Tenant, AuthError>;
    /// Deletion cascades to all tenant-owned users/roles/permissions.
    async fn delete_tenant(&self, id: Uuid) -> Result<(), AuthError>;

    async fn create_user(&self, user: User) -> Result<User, AuthError>;
    async fn find_user(&self, filter: UserFilter) -> Result<User, AuthError>;
    async fn list_users(&self, tenant_id: Uuid, options: ListOptions) -> Result<Vec<User>, AuthError>;
    async fn update_user(&self, filter: UserFilter, user: User) -> Result<User, AuthError>;
    async fn delete_user(&self, filter: UserFilter) -> Result<(), AuthError>;

    async fn create_role(&self, role: Role) -> Result<Role, AuthError>;
    async fn find_role(&self, filter: RoleFilter) -> Result<Role, AuthError>;
    async fn list_roles(&self, tenant_id: Uuid, options: ListOptions) -> Result<Vec<Role>, AuthError>;
    async fn update_role(&self, filter: RoleFilter, role: Role) -> Result<Role, AuthError>;
    async fn delete_role(&self, filter: RoleFilter) -> Result<(), AuthError>;
    /// True if any user in the tenant still references this role.
    async fn role_in_use(&self, tenant_id: Uuid, role_id: Uuid) -> Result<bool, AuthError>;

    async fn create_permission(&self, permission: Permission) -> Result<Permission, AuthError>;
    async fn find_permission(&self, filter: PermissionFilter) -> Result<Permission, AuthError>;
    async fn list_permissions(
        &self,
        tenant_id: Uuid,
        options: ListOptions,
    ) -> Result<Vec<Permission>, AuthError>;
    async fn update_permission(
        &self,
        filter: PermissionFilter,
        permission: Permission,
    ) -> Result<Permission, AuthError>;
    async fn delete_permission(&self, filter: PermissionFilter) -> Result<(), AuthError>;

    /// Aggregation sub-contract (spec §4.2): user -> roles -> permissions,
    /// distinct by `permission_string`, in one round trip where the backend
    /// supports it.
    async fn user_permissions(&self, tenant_id: Uuid, user_id: Uuid) -> Result<Vec<Permission>, AuthError>;
}
