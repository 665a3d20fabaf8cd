//! AuthService routes (spec §6): login, refresh, logout, verify. One HTTP+
//! JSON request/response pair stands in for each RPC operation, matching
//! the teacher's handler surface.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::ApiResult;
use crate::middleware::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub tenant_id: Uuid,
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
    pub access_exp: i64,
    pub refresh_exp: i64,
}

pub async fn login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> ApiResult<TokenResponse> {
    let issued = state.auth.authenticate(body.tenant_id, &body.identifier, &body.password).await?;
    Ok(ApiResponse::success(TokenResponse {
        access: issued.access_token,
        refresh: issued.refresh_token,
        access_exp: issued.access_expires_at.timestamp(),
        refresh_exp: issued.refresh_expires_at.timestamp(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub refresh_token: String,
}

pub async fn refresh(State(state): State<AppState>, Json(body): Json<RefreshRequest>) -> ApiResult<TokenResponse> {
    let issued = state.auth.refresh(body.tenant_id, body.user_id, &body.refresh_token).await?;
    Ok(ApiResponse::success(TokenResponse {
        access: issued.access_token,
        refresh: issued.refresh_token,
        access_exp: issued.access_expires_at.timestamp(),
        refresh_exp: issued.refresh_expires_at.timestamp(),
    }))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn logout(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
) -> ApiResult<MessageResponse> {
    let outcome = state.auth.logout(auth_user.tenant_id, auth_user.user_id).await?;
    Ok(ApiResponse::success(MessageResponse { message: outcome.message.to_string() }))
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub ok: bool,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub access_token: String,
}

pub async fn verify(
    State(state): State<AppState>,
    Json(body): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, AuthError> {
    state.auth.verify(&body.access_token).await?;
    Ok(Json(VerifyResponse { ok: true }))
}
