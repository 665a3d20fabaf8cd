//! JWT auth middleware, generalized from the teacher's `jwt_auth_middleware`
//! to delegate signature + cache cross-check to `TokenManager::verify_access`
//! rather than decoding the token in the middleware itself.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::AuthError;
use crate::state::AppState;

/// Authenticated caller context extracted from a verified access token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
}

pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_bearer_token(&headers)?;
    let metadata = state.tokens.verify_access(&token).await?;

    request.extensions_mut().insert(AuthUser { tenant_id: metadata.tenant_id, user_id: metadata.user_id });

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers.get("authorization").ok_or_else(AuthError::token_invalid)?;
    let auth_str = auth_header.to_str().map_err(|_| AuthError::token_invalid())?;
    let token = auth_str.strip_prefix("Bearer ").ok_or_else(AuthError::token_invalid)?;
    if token.trim().is_empty() {
        return Err(AuthError::token_invalid());
    }
    Ok(token.to_string())
}
