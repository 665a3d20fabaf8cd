//! TenantService routes (spec §6): tenant CRUD. Unlike roles/permissions,
//! tenant management is gated on the global `tenant:*` permission set since
//! tenants have no owning tenant of their own — callers act as the system
//! tenant (spec §4.7 "system-tenant case").

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{Tenant, TenantStatus};
use crate::error::AuthError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::ApiResult;
use crate::middleware::ApiResponse;
use crate::state::AppState;
use crate::store::{ListOptions, TenantFilter};

async fn require_system_permission(state: &AppState, caller: &AuthUser, permission: &str) -> Result<(), AuthError> {
    let allowed = state.resolver.check(caller.tenant_id, caller.user_id, permission).await?;
    if allowed {
        Ok(())
    } else {
        Err(AuthError::permission_denied())
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    pub slug: String,
}

pub async fn create_tenant(
    State(state): State<AppState>,
    axum::Extension(caller): axum::Extension<AuthUser>,
    Json(body): Json<CreateTenantRequest>,
) -> ApiResult<Tenant> {
    require_system_permission(&state, &caller, "tenant:create").await?;
    if body.name.is_empty() || body.slug.is_empty() {
        return Err(AuthError::required_fields(["name", "slug"]));
    }
    let now = Utc::now();
    let tenant = Tenant {
        id: Uuid::new_v4(),
        name: body.name,
        slug: body.slug.to_lowercase(),
        status: TenantStatus::Active,
        created_by: Some(caller.user_id),
        created_at: now,
        updated_at: now,
    };
    let created = state.store.create_tenant(tenant).await?;
    Ok(ApiResponse::created(created))
}

pub async fn get_tenant(
    State(state): State<AppState>,
    axum::Extension(caller): axum::Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Tenant> {
    require_system_permission(&state, &caller, "tenant:read").await?;
    let tenant = state.store.find_tenant(TenantFilter { id: Some(id), slug: None }).await?;
    Ok(ApiResponse::success(tenant))
}

pub async fn list_tenants(
    State(state): State<AppState>,
    axum::Extension(caller): axum::Extension<AuthUser>,
) -> ApiResult<Vec<Tenant>> {
    require_system_permission(&state, &caller, "tenant:read").await?;
    let tenants = state.store.list_tenants(ListOptions::default()).await?;
    Ok(ApiResponse::success(tenants))
}

#[derive(Debug, Deserialize)]
pub struct UpdateTenantRequest {
    pub name: Option<String>,
    pub status: Option<TenantStatus>,
}

pub async fn update_tenant(
    State(state): State<AppState>,
    axum::Extension(caller): axum::Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTenantRequest>,
) -> ApiResult<Tenant> {
    require_system_permission(&state, &caller, "tenant:update").await?;
    let mut current = state.store.find_tenant(TenantFilter { id: Some(id), slug: None }).await?;
    if let Some(name) = body.name {
        current.name = name;
    }
    if let Some(status) = body.status {
        current.status = status;
    }
    let updated = state.store.update_tenant(id, current).await?;
    Ok(ApiResponse::success(updated))
}

/// Deletion cascades to all tenant-owned users/roles/permissions (spec §3)
/// and, per the Open Question resolution in SPEC_FULL.md §9, to that
/// tenant's live tokens — orphaned tokens after a tenant delete are a
/// security hazard, not a convenience to preserve.
pub async fn delete_tenant(
    State(state): State<AppState>,
    axum::Extension(caller): axum::Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AuthError> {
    require_system_permission(&state, &caller, "tenant:delete").await?;
    state.tokens.revoke_all_for_tenant(id).await?;
    state.store.delete_tenant(id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
