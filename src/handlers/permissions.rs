//! PermissionService routes (spec §6), thin wrappers over `RBACManager`.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::Permission;
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
pub struct CreatePermissionRequest {
    pub permission_string: String,
    pub display_name: String,
    pub is_dangerous: bool,
    pub requires_approval: bool,
    pub dependencies: Vec<String>,
}

pub async fn create_permission(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
    Json(body): Json<CreatePermissionRequest>,
) -> ApiResult<Permission> {
    if body.permission_string.is_empty() {
        return Err(AuthError::required_fields(["permission_string"]));
    }
    let now = Utc::now();
    let permission = Permission {
        id: Uuid::nil(),
        tenant_id: Uuid::nil(),
        resource: String::new(),
        action: String::new(),
        permission_string: body.permission_string,
        display_name: body.display_name,
        is_dangerous: body.is_dangerous,
        requires_approval: body.requires_approval,
        dependencies: body.dependencies,
        created_by: Some(auth_user.user_id),
        created_at: now,
        updated_at: now,
    };
    let created = state.rbac.create_permission(&caller(&auth_user), permission).await?;
    Ok(ApiResponse::created(created))
}

pub async fn get_permission(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Permission> {
    let permission = state.rbac.get_permission(&caller(&auth_user), id).await?;
    Ok(ApiResponse::success(permission))
}

pub async fn list_permissions(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
) -> ApiResult<Vec<Permission>> {
    let permissions = state.rbac.list_permissions(&caller(&auth_user), ListOptions::default()).await?;
    Ok(ApiResponse::success(permissions))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePermissionRequest {
    pub display_name: Option<String>,
    pub is_dangerous: Option<bool>,
    pub requires_approval: Option<bool>,
    pub dependencies: Option<Vec<String>>,
}

pub async fn update_permission(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePermissionRequest>,
) -> ApiResult<Permission> {
    let mut current = state.rbac.get_permission(&caller(&auth_user), id).await?;
    if let Some(display_name) = body.display_name {
        current.display_name = display_name;
    }
    if let Some(is_dangerous) = body.is_dangerous {
        current.is_dangerous = is_dangerous;
    }
    if let Some(requires_approval) = body.requires_approval {
        current.requires_approval = requires_approval;
    }
    if let Some(dependencies) = body.dependencies {
        current.dependencies = dependencies;
    }
    let updated = state.rbac.update_permission(&caller(&auth_user), id, current).await?;
    Ok(ApiResponse::success(updated))
}

pub async fn delete_permission(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AuthError> {
    state.rbac.delete_permission(&caller(&auth_user), id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
