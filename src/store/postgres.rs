//! `sqlx::PgPool`-backed `CredentialStore`. Hand-written SQL per entity — the
//! entity set is fixed, unlike the teacher's dynamic-schema query builder, so
//! no DSL is needed. JSON-bearing columns round-trip through `sqlx::types::
//! Json<T>` row structs rather than the domain structs directly, since the
//! domain types carry plain collections for ergonomic use elsewhere.

use super::{
    reject_immutable_changes, CredentialStore, ListOptions, PermissionFilter, RoleFilter,
    TenantFilter, UserFilter,
};
use crate::domain::permission::PERMISSION_IMMUTABLE_FIELDS;
use crate::domain::role::ROLE_IMMUTABLE_FIELDS;
use crate::domain::user::USER_IMMUTABLE_FIELDS;
use crate::domain::{Permission, Role, RoleType, Tenant, TenantStatus, User, UserRoleAssignment, UserStatus};
use crate::error::AuthError;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::HashSet;
use std::str::FromStr;
use uuid::Uuid;

pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TenantRow {
    id: Uuid,
    name: String,
    slug: String,
    status: String,
    created_by: Option<Uuid>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<TenantRow> for Tenant {
    type Error = AuthError;

    fn try_from(row: TenantRow) -> Result<Self, Self::Error> {
        Ok(Tenant {
            id: row.id,
            name: row.name,
            slug: row.slug,
            status: TenantStatus::from_str(&row.status)?,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    tenant_id: Uuid,
    email: String,
    username: String,
    password_hash: String,
    status: String,
    roles: Json<Vec<UserRoleAssignment>>,
    additional_permissions: Json<HashSet<String>>,
    revoked_permissions: Json<HashSet<String>>,
    created_by: Option<Uuid>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AuthError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            tenant_id: row.tenant_id,
            email: row.email,
            username: row.username,
            password_hash: row.password_hash,
            status: UserStatus::from_str(&row.status)?,
            roles: row.roles.0,
            additional_permissions: row.additional_permissions.0,
            revoked_permissions: row.revoked_permissions.0,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RoleRow {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    slug: String,
    description: Option<String>,
    role_type: String,
    permissions: Json<Vec<String>>,
    status: String,
    created_by: Option<Uuid>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<RoleRow> for Role {
    type Error = AuthError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        Ok(Role {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            r#type: RoleType::from_str(&row.role_type)?,
            permissions: row.permissions.0,
            status: row.status,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PermissionRow {
    id: Uuid,
    tenant_id: Uuid,
    resource: String,
    action: String,
    permission_string: String,
    display_name: String,
    is_dangerous: bool,
    requires_approval: bool,
    dependencies: Json<Vec<String>>,
    created_by: Option<Uuid>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<PermissionRow> for Permission {
    fn from(row: PermissionRow) -> Self {
        Permission {
            id: row.id,
            tenant_id: row.tenant_id,
            resource: row.resource,
            action: row.action,
            permission_string: row.permission_string,
            display_name: row.display_name,
            is_dangerous: row.is_dangerous,
            requires_approval: row.requires_approval,
            dependencies: row.dependencies.0,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn create_tenant(&self, tenant: Tenant) -> Result<Tenant, AuthError> {
        let row = sqlx::query_as::<_, TenantRow>(
            r#"INSERT INTO tenants (id, name, slug, status, created_by, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id, name, slug, status, created_by, created_at, updated_at"#,
        )
        .bind(tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.slug)
        .bind(tenant.status.as_str())
        .bind(tenant.created_by)
        .bind(tenant.created_at)
        .bind(tenant.updated_at)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn find_tenant(&self, filter: TenantFilter) -> Result<Tenant, AuthError> {
        let row = if let Some(id) = filter.id {
            sqlx::query_as::<_, TenantRow>(
                "SELECT id, name, slug, status, created_by, created_at, updated_at FROM tenants WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        } else if let Some(slug) = filter.slug {
            sqlx::query_as::<_, TenantRow>(
                "SELECT id, name, slug, status, created_by, created_at, updated_at FROM tenants WHERE slug = $1",
            )
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?
        } else {
            return Err(AuthError::required_fields(["id or slug"]));
        };
        match row {
            Some(row) => row.try_into(),
            None => Err(AuthError::not_found("tenant", "unknown")),
        }
    }

    async fn list_tenants(&self, options: ListOptions) -> Result<Vec<Tenant>, AuthError> {
        let rows = sqlx::query_as::<_, TenantRow>(
            "SELECT id, name, slug, status, created_by, created_at, updated_at FROM tenants ORDER BY created_at LIMIT $1 OFFSET $2",
        )
        .bind(options.limit.unwrap_or(100))
        .bind(options.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn update_tenant(&self, id: Uuid, tenant: Tenant) -> Result<Tenant, AuthError> {
        let current = self.find_tenant(TenantFilter { id: Some(id), slug: None }).await?;
        if current.slug != tenant.slug || current.created_at != tenant.created_at {
            return Err(AuthError::restricted_fields(["slug", "created_at"]));
        }
        let row = sqlx::query_as::<_, TenantRow>(
            r#"UPDATE tenants SET name = $2, status = $3, updated_at = now()
               WHERE id = $1
               RETURNING id, name, slug, status, created_by, created_at, updated_at"#,
        )
        .bind(id)
        .bind(&tenant.name)
        .bind(tenant.status.as_str())
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn delete_tenant(&self, id: Uuid) -> Result<(), AuthError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM permissions WHERE tenant_id = $1").bind(id).execute(&mut *tx).await?;
        sqlx::query("DELETE FROM roles WHERE tenant_id = $1").bind(id).execute(&mut *tx).await?;
        sqlx::query("DELETE FROM users WHERE tenant_id = $1").bind(id).execute(&mut *tx).await?;
        sqlx::query("DELETE FROM tenants WHERE id = $1").bind(id).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn create_user(&self, user: User) -> Result<User, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"INSERT INTO users (id, tenant_id, email, username, password_hash, status,
                                   roles, additional_permissions, revoked_permissions,
                                   created_by, created_at, updated_at)
               VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
               RETURNING id, tenant_id, email, username, password_hash, status,
                         roles, additional_permissions, revoked_permissions,
                         created_by, created_at, updated_at"#,
        )
        .bind(user.id)
        .bind(user.tenant_id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.status.as_str())
        .bind(Json(&user.roles))
        .bind(Json(&user.additional_permissions))
        .bind(Json(&user.revoked_permissions))
        .bind(user.created_by)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                match db.constraint() {
                    Some(c) if c.contains("username") => AuthError::duplicate_username(),
                    _ => AuthError::duplicate_email(),
                }
            }
            other => other.into(),
        })?;
        row.try_into()
    }

    async fn find_user(&self, filter: UserFilter) -> Result<User, AuthError> {
        let row = if let Some(id) = filter.id {
            sqlx::query_as::<_, UserRow>(
                r#"SELECT id, tenant_id, email, username, password_hash, status,
                          roles, additional_permissions, revoked_permissions,
                          created_by, created_at, updated_at
                   FROM users WHERE tenant_id = $1 AND id = $2"#,
            )
            .bind(filter.tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, UserRow>(
                r#"SELECT id, tenant_id, email, username, password_hash, status,
                          roles, additional_permissions, revoked_permissions,
                          created_by, created_at, updated_at
                   FROM users WHERE tenant_id = $1 AND (email = $2 OR username = $3)"#,
            )
            .bind(filter.tenant_id)
            .bind(filter.email)
            .bind(filter.username)
            .fetch_optional(&self.pool)
            .await?
        };
        match row {
            Some(row) => row.try_into(),
            None => Err(AuthError::not_found("user", "unknown")),
        }
    }

    async fn list_users(&self, tenant_id: Uuid, options: ListOptions) -> Result<Vec<User>, AuthError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"SELECT id, tenant_id, email, username, password_hash, status,
                      roles, additional_permissions, revoked_permissions,
                      created_by, created_at, updated_at
               FROM users WHERE tenant_id = $1 ORDER BY created_at LIMIT $2 OFFSET $3"#,
        )
        .bind(tenant_id)
        .bind(options.limit.unwrap_or(100))
        .bind(options.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn update_user(&self, filter: UserFilter, user: User) -> Result<User, AuthError> {
        let current = self.find_user(filter.clone()).await?;
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

        let row = sqlx::query_as::<_, UserRow>(
            r#"UPDATE users SET email = $3, password_hash = $4, status = $5,
                                 roles = $6, additional_permissions = $7, revoked_permissions = $8,
                                 updated_at = now()
               WHERE tenant_id = $1 AND id = $2
               RETURNING id, tenant_id, email, username, password_hash, status,
                         roles, additional_permissions, revoked_permissions,
                         created_by, created_at, updated_at"#,
        )
        .bind(current.tenant_id)
        .bind(current.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.status.as_str())
        .bind(Json(&user.roles))
        .bind(Json(&user.additional_permissions))
        .bind(Json(&user.revoked_permissions))
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn delete_user(&self, filter: UserFilter) -> Result<(), AuthError> {
        let id = filter.id.ok_or_else(|| AuthError::required_fields(["id"]))?;
        sqlx::query("DELETE FROM users WHERE tenant_id = $1 AND id = $2")
            .bind(filter.tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_role(&self, role: Role) -> Result<Role, AuthError> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"INSERT INTO roles (id, tenant_id, name, slug, description, role_type,
                                   permissions, status, created_by, created_at, updated_at)
               VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
               RETURNING id, tenant_id, name, slug, description, role_type,
                         permissions, status, created_by, created_at, updated_at"#,
        )
        .bind(role.id)
        .bind(role.tenant_id)
        .bind(&role.name)
        .bind(&role.slug)
        .bind(&role.description)
        .bind(role.r#type.as_str())
        .bind(Json(&role.permissions))
        .bind(&role.status)
        .bind(role.created_by)
        .bind(role.created_at)
        .bind(role.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AuthError::duplicate_resource("role")
            }
            other => other.into(),
        })?;
        row.try_into()
    }

    async fn find_role(&self, filter: RoleFilter) -> Result<Role, AuthError> {
        let row = if let Some(id) = filter.id {
            sqlx::query_as::<_, RoleRow>(
                r#"SELECT id, tenant_id, name, slug, description, role_type,
                          permissions, status, created_by, created_at, updated_at
                   FROM roles WHERE tenant_id = $1 AND id = $2"#,
            )
            .bind(filter.tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, RoleRow>(
                r#"SELECT id, tenant_id, name, slug, description, role_type,
                          permissions, status, created_by, created_at, updated_at
                   FROM roles WHERE tenant_id = $1 AND name = $2"#,
            )
            .bind(filter.tenant_id)
            .bind(filter.name)
            .fetch_optional(&self.pool)
            .await?
        };
        match row {
            Some(row) => row.try_into(),
            None => Err(AuthError::not_found("role", "unknown")),
        }
    }

    async fn list_roles(&self, tenant_id: Uuid, options: ListOptions) -> Result<Vec<Role>, AuthError> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"SELECT id, tenant_id, name, slug, description, role_type,
                      permissions, status, created_by, created_at, updated_at
               FROM roles WHERE tenant_id = $1 ORDER BY created_at LIMIT $2 OFFSET $3"#,
        )
        .bind(tenant_id)
        .bind(options.limit.unwrap_or(100))
        .bind(options.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn update_role(&self, filter: RoleFilter, role: Role) -> Result<Role, AuthError> {
        let current = self.find_role(filter.clone()).await?;
        let mut changed = Vec::new();
        if current.created_at != role.created_at {
            changed.push("created_at".to_string());
        }
        if current.tenant_id != role.tenant_id {
            changed.push("tenant_id".to_string());
        }
        reject_immutable_changes(ROLE_IMMUTABLE_FIELDS, &changed)?;

        let row = sqlx::query_as::<_, RoleRow>(
            r#"UPDATE roles SET name = $3, description = $4, permissions = $5, status = $6, updated_at = now()
               WHERE tenant_id = $1 AND id = $2
               RETURNING id, tenant_id, name, slug, description, role_type,
                         permissions, status, created_by, created_at, updated_at"#,
        )
        .bind(current.tenant_id)
        .bind(current.id)
        .bind(&role.name)
        .bind(&role.description)
        .bind(Json(&role.permissions))
        .bind(&role.status)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn delete_role(&self, filter: RoleFilter) -> Result<(), AuthError> {
        let id = filter.id.ok_or_else(|| AuthError::required_fields(["id"]))?;
        if self.role_in_use(filter.tenant_id, id).await? {
            return Err(AuthError::duplicate_resource("role still assigned to users"));
        }
        sqlx::query("DELETE FROM roles WHERE tenant_id = $1 AND id = $2")
            .bind(filter.tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn role_in_use(&self, tenant_id: Uuid, role_id: Uuid) -> Result<bool, AuthError> {
        let count: i64 = sqlx::query_scalar(
            r#"SELECT count(*) FROM users, jsonb_array_elements(roles) AS r
               WHERE tenant_id = $1 AND (r->>'role_id')::uuid = $2"#,
        )
        .bind(tenant_id)
        .bind(role_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn create_permission(&self, permission: Permission) -> Result<Permission, AuthError> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"INSERT INTO permissions (id, tenant_id, resource, action, permission_string,
                                          display_name, is_dangerous, requires_approval, dependencies,
                                          created_by, created_at, updated_at)
               VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
               RETURNING id, tenant_id, resource, action, permission_string, display_name,
                         is_dangerous, requires_approval, dependencies, created_by, created_at, updated_at"#,
        )
        .bind(permission.id)
        .bind(permission.tenant_id)
        .bind(&permission.resource)
        .bind(&permission.action)
        .bind(&permission.permission_string)
        .bind(&permission.display_name)
        .bind(permission.is_dangerous)
        .bind(permission.requires_approval)
        .bind(Json(&permission.dependencies))
        .bind(permission.created_by)
        .bind(permission.created_at)
        .bind(permission.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AuthError::duplicate_resource("permission_string")
            }
            other => other.into(),
        })?;
        Ok(row.into())
    }

    async fn find_permission(&self, filter: PermissionFilter) -> Result<Permission, AuthError> {
        let row = if let Some(id) = filter.id {
            sqlx::query_as::<_, PermissionRow>(
                r#"SELECT id, tenant_id, resource, action, permission_string, display_name,
                          is_dangerous, requires_approval, dependencies, created_by, created_at, updated_at
                   FROM permissions WHERE tenant_id = $1 AND id = $2"#,
            )
            .bind(filter.tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, PermissionRow>(
                r#"SELECT id, tenant_id, resource, action, permission_string, display_name,
                          is_dangerous, requires_approval, dependencies, created_by, created_at, updated_at
                   FROM permissions WHERE tenant_id = $1 AND permission_string = $2"#,
            )
            .bind(filter.tenant_id)
            .bind(filter.permission_string)
            .fetch_optional(&self.pool)
            .await?
        };
        match row {
            Some(row) => Ok(row.into()),
            None => Err(AuthError::not_found("permission", "unknown")),
        }
    }

    async fn list_permissions(
        &self,
        tenant_id: Uuid,
        options: ListOptions,
    ) -> Result<Vec<Permission>, AuthError> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"SELECT id, tenant_id, resource, action, permission_string, display_name,
                      is_dangerous, requires_approval, dependencies, created_by, created_at, updated_at
               FROM permissions WHERE tenant_id = $1 ORDER BY created_at LIMIT $2 OFFSET $3"#,
        )
        .bind(tenant_id)
        .bind(options.limit.unwrap_or(100))
        .bind(options.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_permission(
        &self,
        filter: PermissionFilter,
        permission: Permission,
    ) -> Result<Permission, AuthError> {
        let current = self.find_permission(filter.clone()).await?;
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

        let row = sqlx::query_as::<_, PermissionRow>(
            r#"UPDATE permissions SET display_name = $3, is_dangerous = $4,
                                        requires_approval = $5, dependencies = $6, updated_at = now()
               WHERE tenant_id = $1 AND id = $2
               RETURNING id, tenant_id, resource, action, permission_string, display_name,
                         is_dangerous, requires_approval, dependencies, created_by, created_at, updated_at"#,
        )
        .bind(current.tenant_id)
        .bind(current.id)
        .bind(&permission.display_name)
        .bind(permission.is_dangerous)
        .bind(permission.requires_approval)
        .bind(Json(&permission.dependencies))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn delete_permission(&self, filter: PermissionFilter) -> Result<(), AuthError> {
        let id = filter.id.ok_or_else(|| AuthError::required_fields(["id"]))?;
        sqlx::query("DELETE FROM permissions WHERE tenant_id = $1 AND id = $2")
            .bind(filter.tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn user_permissions(&self, tenant_id: Uuid, user_id: Uuid) -> Result<Vec<Permission>, AuthError> {
        // Single round trip (spec §4.2 aggregation sub-contract): user ->
        // role ids -> role documents -> permission_string list -> distinct
        // permission rows, joined via the roles jsonb column and the
        // permission_string array each role stores.
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"SELECT DISTINCT ON (p.permission_string)
                      p.id, p.tenant_id, p.resource, p.action, p.permission_string, p.display_name,
                      p.is_dangerous, p.requires_approval, p.dependencies, p.created_by, p.created_at, p.updated_at
               FROM users u
               JOIN LATERAL jsonb_array_elements(u.roles) AS ur(role) ON true
               JOIN roles r ON r.tenant_id = u.tenant_id AND r.id = (ur.role->>'role_id')::uuid
               JOIN LATERAL jsonb_array_elements_text(r.permissions) AS perm_string ON true
               JOIN permissions p ON p.tenant_id = u.tenant_id AND p.permission_string = perm_string
               WHERE u.tenant_id = $1 AND u.id = $2"#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
