//! VerificationService routes (spec §4.7, §6): the five read-only methods
//! sibling services call over RPC to answer permission questions without
//! duplicating RBAC logic locally.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::ApiResult;
use crate::middleware::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HasPermissionRequest {
    pub permission: String,
    #[serde(default)]
    pub target_tenant_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct HasPermissionResponse {
    pub allowed: bool,
}

pub async fn has_permission(
    State(state): State<AppState>,
    axum::Extension(caller): axum::Extension<AuthUser>,
    Json(body): Json<HasPermissionRequest>,
) -> ApiResult<HasPermissionResponse> {
    let target = body.target_tenant_id.unwrap_or(caller.tenant_id);
    match state
        .verification
        .has_permission(caller.tenant_id, caller.user_id, &body.permission, target)
        .await
    {
        Ok(()) => Ok(ApiResponse::success(HasPermissionResponse { allowed: true })),
        Err(AuthError::Auth { code: crate::error::AuthCode::PermissionDenied, .. }) => {
            Ok(ApiResponse::success(HasPermissionResponse { allowed: false }))
        }
        Err(other) => Err(other),
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckPermissionsRequest {
    pub permissions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckPermissionsResponse {
    pub results: Vec<(String, bool)>,
}

pub async fn check_permissions(
    State(state): State<AppState>,
    axum::Extension(caller): axum::Extension<AuthUser>,
    Json(body): Json<CheckPermissionsRequest>,
) -> ApiResult<CheckPermissionsResponse> {
    let results = state
        .verification
        .check_permissions(caller.tenant_id, caller.user_id, &body.permissions)
        .await?;
    Ok(ApiResponse::success(CheckPermissionsResponse { results }))
}

#[derive(Debug, Deserialize)]
pub struct TargetTenantQuery {
    #[serde(default)]
    pub target_tenant_id: Option<Uuid>,
}

pub async fn get_user_permissions(
    State(state): State<AppState>,
    axum::Extension(caller): axum::Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<TargetTenantQuery>,
) -> ApiResult<Vec<String>> {
    let target_tenant_id = query.target_tenant_id.unwrap_or(caller.tenant_id);
    let permissions = state
        .verification
        .get_user_permissions(caller.tenant_id, caller.user_id, user_id, target_tenant_id)
        .await?;
    Ok(ApiResponse::success(permissions))
}

pub async fn get_user_roles(
    State(state): State<AppState>,
    axum::Extension(caller): axum::Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<TargetTenantQuery>,
) -> ApiResult<Vec<Uuid>> {
    let target_tenant_id = query.target_tenant_id.unwrap_or(caller.tenant_id);
    let roles = state
        .verification
        .get_user_roles(caller.tenant_id, caller.user_id, user_id, target_tenant_id)
        .await?;
    Ok(ApiResponse::success(roles))
}

#[derive(Debug, Serialize)]
pub struct IsSystemTenantResponse {
    pub is_system_tenant: bool,
}

pub async fn is_system_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> ApiResult<IsSystemTenantResponse> {
    Ok(ApiResponse::success(IsSystemTenantResponse {
        is_system_tenant: state.verification.is_system_tenant(tenant_id),
    }))
}
