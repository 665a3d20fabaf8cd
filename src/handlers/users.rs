//! UserService routes (spec §6): CRUD gated by the same permission-check-
//! then-delegate pattern RBACManager uses for roles/permissions, applied
//! here directly against CredentialStore since user management has no
//! dedicated manager type in the component design (§4).

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::domain::{User, UserStatus};
use crate::error::AuthError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::ApiResult;
use crate::middleware::ApiResponse;
use crate::state::AppState;
use crate::store::{ListOptions, UserFilter};

async fn require(state: &AppState, caller: &AuthUser, action: &str) -> Result<(), AuthError> {
    let allowed = state.resolver.check(caller.tenant_id, caller.user_id, &format!("user:{action}")).await?;
    if allowed {
        Ok(())
    } else {
        Err(AuthError::permission_denied())
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub status: UserStatus,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self { id: u.id, email: u.email, username: u.username, status: u.status }
    }
}

pub async fn create_user(
    State(state): State<AppState>,
    axum::Extension(caller): axum::Extension<AuthUser>,
    Json(body): Json<CreateUserRequest>,
) -> ApiResult<UserResponse> {
    require(&state, &caller, "create").await?;
    if body.email.is_empty() || body.username.is_empty() {
        return Err(AuthError::required_fields(["email", "username"]));
    }
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        tenant_id: caller.tenant_id,
        email: body.email.to_lowercase(),
        username: body.username.to_lowercase(),
        password_hash: body.password_hash,
        status: UserStatus::Active,
        roles: Vec::new(),
        additional_permissions: HashSet::new(),
        revoked_permissions: HashSet::new(),
        created_by: Some(caller.user_id),
        created_at: now,
        updated_at: now,
    };
    let created = state.store.create_user(user).await?;
    Ok(ApiResponse::created(created.into()))
}

pub async fn get_user(
    State(state): State<AppState>,
    axum::Extension(caller): axum::Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<UserResponse> {
    require(&state, &caller, "read").await?;
    let user = state.store.find_user(UserFilter::by_id(caller.tenant_id, id)).await?;
    Ok(ApiResponse::success(user.into()))
}

pub async fn list_users(
    State(state): State<AppState>,
    axum::Extension(caller): axum::Extension<AuthUser>,
) -> ApiResult<Vec<UserResponse>> {
    require(&state, &caller, "read").await?;
    let users = state.store.list_users(caller.tenant_id, ListOptions::default()).await?;
    Ok(ApiResponse::success(users.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    /// Accepted so a changed username reaches the store's immutability
    /// check (spec §3, §8 Scenario 6) instead of being silently dropped.
    pub username: Option<String>,
    pub status: Option<UserStatus>,
}

pub async fn update_user(
    State(state): State<AppState>,
    axum::Extension(caller): axum::Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> ApiResult<UserResponse> {
    require(&state, &caller, "update").await?;
    let mut current = state.store.find_user(UserFilter::by_id(caller.tenant_id, id)).await?;
    if let Some(email) = body.email {
        current.email = email.to_lowercase();
    }
    if let Some(username) = body.username {
        current.username = username.to_lowercase();
    }
    if let Some(status) = body.status {
        current.status = status;
    }
    let updated = state.store.update_user(UserFilter::by_id(caller.tenant_id, id), current).await?;
    Ok(ApiResponse::success(updated.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    axum::Extension(caller): axum::Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AuthError> {
    require(&state, &caller, "delete").await?;
    state.store.delete_user(UserFilter::by_id(caller.tenant_id, id)).await?;
    state.tokens.revoke(caller.tenant_id, id, crate::token_manager::RevokeScope::Both).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
