//! `RwLock<HashMap<...>>`-backed `CredentialStore`, used by unit tests and by
//! the CLI's fixture-bootstrapping path so PermissionResolver/TokenManager
//! tests don't need a live Postgres.

use super::{
    reject_immutable_changes, CredentialStore, ListOptions, PermissionFilter, RoleFilter,
    TenantFilter, UserFilter,
};
use crate::domain::permission::PERMISSION_IMMUTABLE_FIELDS;
use crate::domain::role::ROLE_IMMUTABLE_FIELDS;
use crate::domain::user::USER_IMMUTABLE_FIELDS;
use crate::domain::{Permission, Role, Tenant, User};
use crate::error::AuthError;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryCredentialStore {
    tenants: RwLock<HashMap<Uuid, Tenant>>,
    users: RwLock<HashMap<Uuid, User>>,
    roles: RwLock<HashMap<Uuid, Role>>,
    permissions: RwLock<HashMap<Uuid, Permission>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create_tenant(&self, tenant: Tenant) -> Result<Tenant, AuthError> {
        let mut tenants = self.tenants.write().await;
        if tenants.values().any(|t| t.slug == tenant.slug) {
            return Err(AuthError::duplicate_resource("tenant slug"));
        }
        tenants.insert(tenant.id, tenant.clone());
        Ok(tenant)
    }

    async fn find_tenant(&self, filter: TenantFilter) -> Result<Tenant, AuthError> {
        let tenants = self.tenants.read().await;
        let found = if let Some(id) = filter.id {
            tenants.get(&id).cloned()
        } else if let Some(slug) = filter.slug {
            tenants.values().find(|t| t.slug == slug).cloned()
        } else {
            return Err(AuthError::required_fields(["id or slug"]));
        };
        found.ok_or_else(|| AuthError::not_found("tenant", "unknown"))
    }

    async fn list_tenants(&self, options: ListOptions) -> Result<Vec<Tenant>, AuthError> {
        let tenants = self.tenants.read().await;
        let mut all: Vec<Tenant> = tenants.values().cloned().collect();
        all.sort_by_key(|t| t.created_at);
        Ok(paginate(all, options))
    }

    async fn update_tenant(&self, id: Uuid, tenant: Tenant) -> Result<Tenant, AuthError> {
        let mut tenants = self.tenants.write().await;
        let current = tenants.get(&id).ok_or_else(|| AuthError::not_found("tenant", id.to_string()))?;
        if current.slug != tenant.slug || current.created_at != tenant.created_at {
            return Err(AuthError::restricted_fields(["slug", "created_at"]));
        }
        let tenant = Tenant { updated_at: Utc::now(), ..tenant };
        tenants.insert(id, tenant.clone());
        Ok(tenant)
    }

    async fn delete_tenant(&self, id: Uuid) -> Result<(), AuthError> {
        self.tenants.write().await.remove(&id);
        self.users.write().await.retain(|_, u| u.tenant_id != id);
        self.roles.write().await.retain(|_, r| r.tenant_id != id);
        self.permissions.write().await.retain(|_, p| p.tenant_id != id);
        Ok(())
    }

    async fn create_user(&self, user: User) -> Result<User, AuthError> {
        let mut users = self.users.write().await;
        let tenant_users = || users.values().filter(|u| u.tenant_id == user.tenant_id);
        if tenant_users().any(|u| u.email == user.email) {
            return Err(AuthError::duplicate_email());
        }
        if tenant_users().any(|u| u.username == user.username) {
            return Err(AuthError::duplicate_username());
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, filter: UserFilter) -> Result<User, AuthError> {
        let users = self.users.read().await;
        let found = if let Some(id) = filter.id {
            users.get(&id).filter(|u| u.tenant_id == filter.tenant_id).cloned()
        } else {
            users
                .values()
                .find(|u| {
                    u.tenant_id == filter.tenant_id
                        && (filter.email.as_deref() == Some(u.email.as_str())
                            || filter.username.as_deref() == Some(u.username.as_str()))
                })
                .cloned()
        };
        found.ok_or_else(|| AuthError::not_found("user", "unknown"))
    }

    async fn list_users(&self, tenant_id: Uuid, options: ListOptions) -> Result<Vec<User>, AuthError> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().filter(|u| u.tenant_id == tenant_id).cloned().collect();
        all.sort_by_key(|u| u.created_at);
        Ok(paginate(all, options))
    }

    async fn update_user(&self, filter: UserFilter, user: User) -> Result<User, AuthError> {
        let current = self.find_user(filter).await?;
        let mut changed = Vec::new();
        if current.username != user.username {
            changed.push("username".to_string());
        }
        if current.created_at != user.created_at {
            changed.push("created_at".to_string());
        }
        if current.tenant_id != user.tenant_id {
            changed.push("tenant_id".to_string());
        }
        reject_immutable_changes(USER_IMMUTABLE_FIELDS, &changed)?;
        let user = User { updated_at: Utc::now(), ..user };
        self.users.write().await.insert(current.id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, filter: UserFilter) -> Result<(), AuthError> {
        let id = filter.id.ok_or_else(|| AuthError::required_fields(["id"]))?;
        self.users.write().await.remove(&id);
        Ok(())
    }

    async fn create_role(&self, role: Role) -> Result<Role, AuthError> {
        let mut roles = self.roles.write().await;
        if roles.values().any(|r| r.tenant_id == role.tenant_id && r.name == role.name) {
            return Err(AuthError::duplicate_resource("role name"));
        }
        roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn find_role(&self, filter: RoleFilter) -> Result<Role, AuthError> {
        let roles = self.roles.read().await;
        let found = if let Some(id) = filter.id {
            roles.get(&id).filter(|r| r.tenant_id == filter.tenant_id).cloned()
        } else {
            roles
                .values()
                .find(|r| r.tenant_id == filter.tenant_id && Some(&r.name) == filter.name.as_ref())
                .cloned()
        };
        found.ok_or_else(|| AuthError::not_found("role", "unknown"))
    }

    async fn list_roles(&self, tenant_id: Uuid, options: ListOptions) -> Result<Vec<Role>, AuthError> {
        let roles = self.roles.read().await;
        let mut all: Vec<Role> = roles.values().filter(|r| r.tenant_id == tenant_id).cloned().collect();
        all.sort_by_key(|r| r.created_at);
        Ok(paginate(all, options))
    }

    async fn update_role(&self, filter: RoleFilter, role: Role) -> Result<Role, AuthError> {
        let current = self.find_role(filter).await?;
        let mut changed = Vec::new();
        if current.created_at != role.created_at {
            changed.push("created_at".to_string());
        }
        if current.tenant_id != role.tenant_id {
            changed.push("tenant_id".to_string());
        }
        reject_immutable_changes(ROLE_IMMUTABLE_FIELDS, &changed)?;
        let role = Role { updated_at: Utc::now(), ..role };
        self.roles.write().await.insert(current.id, role.clone());
        Ok(role)
    }

    async fn delete_role(&self, filter: RoleFilter) -> Result<(), AuthError> {
        let id = filter.id.ok_or_else(|| AuthError::required_fields(["id"]))?;
        if self.role_in_use(filter.tenant_id, id).await? {
            return Err(AuthError::duplicate_resource("role still assigned to users"));
        }
        self.roles.write().await.remove(&id);
        Ok(())
    }

    async fn role_in_use(&self, tenant_id: Uuid, role_id: Uuid) -> Result<bool, AuthError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .any(|u| u.tenant_id == tenant_id && u.roles.iter().any(|r| r.role_id == role_id)))
    }

    async fn create_permission(&self, permission: Permission) -> Result<Permission, AuthError> {
        let mut permissions = self.permissions.write().await;
        if permissions
            .values()
            .any(|p| p.tenant_id == permission.tenant_id && p.permission_string == permission.permission_string)
        {
            return Err(AuthError::duplicate_resource("permission_string"));
        }
        permissions.insert(permission.id, permission.clone());
        Ok(permission)
    }

    async fn find_permission(&self, filter: PermissionFilter) -> Result<Permission, AuthError> {
        let permissions = self.permissions.read().await;
        let found = if let Some(id) = filter.id {
            permissions.get(&id).filter(|p| p.tenant_id == filter.tenant_id).cloned()
        } else {
            permissions
                .values()
                .find(|p| {
                    p.tenant_id == filter.tenant_id
                        && Some(&p.permission_string) == filter.permission_string.as_ref()
                })
                .cloned()
        };
        found.ok_or_else(|| AuthError::not_found("permission", "unknown"))
    }

    async fn list_permissions(
        &self,
        tenant_id: Uuid,
        options: ListOptions,
    ) -> Result<Vec<Permission>, AuthError> {
        let permissions = self.permissions.read().await;
        let mut all: Vec<Permission> =
            permissions.values().filter(|p| p.tenant_id == tenant_id).cloned().collect();
        all.sort_by_key(|p| p.created_at);
        Ok(paginate(all, options))
    }

    async fn update_permission(
        &self,
        filter: PermissionFilter,
        permission: Permission,
    ) -> Result<Permission, AuthError> {
        let current = self.find_permission(filter).await?;
        let mut changed = Vec::new();
        if current.permission_string != permission.permission_string {
            changed.push("permission_string".to_string());
        }
        if current.created_at != permission.created_at {
            changed.push("created_at".to_string());
        }
        if current.tenant_id != permission.tenant_id {
            changed.push("tenant_id".to_string());
        }
        reject_immutable_changes(PERMISSION_IMMUTABLE_FIELDS, &changed)?;
        let permission = Permission { updated_at: Utc::now(), ..permission };
        self.permissions.write().await.insert(current.id, permission.clone());
        Ok(permission)
    }

    async fn delete_permission(&self, filter: PermissionFilter) -> Result<(), AuthError> {
        let id = filter.id.ok_or_else(|| AuthError::required_fields(["id"]))?;
        self.permissions.write().await.remove(&id);
        Ok(())
    }

    async fn user_permissions(&self, tenant_id: Uuid, user_id: Uuid) -> Result<Vec<Permission>, AuthError> {
        let user = self
            .find_user(UserFilter::by_id(tenant_id, user_id))
            .await?;
        let roles = self.roles.read().await;
        let permissions = self.permissions.read().await;

        let mut seen = std::collections::HashSet::new();
        let mut result = Vec::new();
        for role_id in user.role_ids() {
            let Some(role) = roles.get(&role_id).filter(|r| r.tenant_id == tenant_id) else {
                continue;
            };
            for perm_string in &role.permissions {
                if !seen.insert(perm_string.clone()) {
                    continue;
                }
                if let Some(p) = permissions
                    .values()
                    .find(|p| p.tenant_id == tenant_id && &p.permission_string == perm_string)
                {
                    result.push(p.clone());
                }
            }
        }
        Ok(result)
    }
}

fn paginate<T>(mut items: Vec<T>, options: ListOptions) -> Vec<T> {
    let offset = options.offset.unwrap_or(0).max(0) as usize;
    if offset >= items.len() {
        return Vec::new();
    }
    items.drain(..offset);
    if let Some(limit) = options.limit {
        items.truncate(limit.max(0) as usize);
    }
    items
}
