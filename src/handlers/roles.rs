//! RoleService routes (spec §6), thin wrappers over `RBACManager`.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{Role, RoleType};
use crate::error::AuthError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::ApiResult;
use crate::middleware::ApiResponse;
use crate::rbac_manager::Caller;
use crate::state::AppState;
use crate::store::ListOptions;

fn caller(auth_user: &AuthUser) -> Caller {
    Caller { tenant_id: auth_user.tenant_id, user_id: auth_user.user_id }
}

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub permissions: Vec<String>,
}

pub async fn create_role(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
    Json(body): Json<CreateRoleRequest>,
) -> ApiResult<Role> {
    if body.name.is_empty() {
        return Err(AuthError::required_fields(["name"]));
    }
    let now = Utc::now();
    let role = Role {
        id: Uuid::nil(),
        tenant_id: Uuid::nil(),
        name: body.name,
        slug: body.slug,
        description: body.description,
        r#type: RoleType::Custom,
        permissions: body.permissions,
        status: "active".to_string(),
        created_by: Some(auth_user.user_id),
        created_at: now,
        updated_at: now,
    };
    let created = state.rbac.create_role(&caller(&auth_user), role).await?;
    Ok(ApiResponse::created(created))
}

pub async fn get_role(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Role> {
    let role = state.rbac.get_role(&caller(&auth_user), id).await?;
    Ok(ApiResponse::success(role))
}

pub async fn list_roles(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
) -> ApiResult<Vec<Role>> {
    let roles = state.rbac.list_roles(&caller(&auth_user), ListOptions::default()).await?;
    Ok(ApiResponse::success(roles))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<Vec<String>>,
}

pub async fn update_role(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateRoleRequest>,
) -> ApiResult<Role> {
    let mut current = state.rbac.get_role(&caller(&auth_user), id).await?;
    if let Some(name) = body.name {
        current.name = name;
    }
    if let Some(description) = body.description {
        current.description = Some(description);
    }
    if let Some(permissions) = body.permissions {
        current.permissions = permissions;
    }
    let updated = state.rbac.update_role(&caller(&auth_user), id, current).await?;
    Ok(ApiResponse::success(updated))
}

pub async fn delete_role(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AuthError> {
    state.rbac.delete_role(&caller(&auth_user), id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
