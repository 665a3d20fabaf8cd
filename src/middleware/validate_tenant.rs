//! Tenant-status gate, generalized from the teacher's `validate_tenant_middleware`
//! (which validated against a sharded-per-tenant database registry) to the
//! single-database, `tenant_id`-column model: confirms the tenant named by
//! the verified access token still exists and has not gone inactive (I1).

use axum::{extract::State, middleware::Next, response::Response};

use super::auth::AuthUser;
use crate::error::AuthError;
use crate::state::AppState;
use crate::store::TenantFilter;

pub async fn validate_tenant_middleware(
    State(state): State<AppState>,
    mut request: axum::extract::Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(AuthError::token_invalid)?;

    let tenant = state
        .store
        .find_tenant(TenantFilter { id: Some(auth_user.tenant_id), slug: None })
        .await
        .map_err(|_| AuthError::token_invalid())?;

    if !tenant.accepts_writes() {
        return Err(AuthError::invalid_credentials());
    }

    request.extensions_mut().insert(tenant);
    Ok(next.run(request).await)
}
