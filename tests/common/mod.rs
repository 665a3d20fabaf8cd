//! Shared test harness: builds the real `axum::Router` over a fresh
//! in-memory `AppState` and drives it with `tower::ServiceExt::oneshot`,
//! generalized from the teacher's subprocess-spawning `TestServer` (which
//! needed a live tenant database per request) to the in-process form the
//! in-memory `CredentialStore`/`TokenCache` backends make possible.

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use erp_auth_core::state::AppState;
use erp_auth_core::testing;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub struct Harness {
    pub router: Router,
    pub tenant_id: Uuid,
}

/// Seeds a tenant, an `admin` role holding `*:*`, and a user with that role
/// so scenarios only need to vary what they test instead of re-deriving
/// the whole object graph every time.
pub async fn harness_with_admin(email: &str, username: &str, password: &str) -> (Harness, Uuid) {
    let state = testing::test_state();
    let tenant = testing::seed_tenant(&state, "acme").await;
    let admin_role = testing::seed_role(&state, tenant.id, "admin", &["*:*"]).await;
    let user = testing::seed_user(&state, tenant.id, email, username, password, &[admin_role.id]).await;
    let router = erp_auth_core::router::build(state);
    (Harness { router, tenant_id: tenant.id }, user.id)
}

pub fn bare_state() -> AppState {
    testing::test_state()
}

pub async fn post_json(router: &Router, path: &str, body: Value) -> Result<(StatusCode, Value)> {
    send(router, "POST", path, Some(body), None).await
}

pub async fn post_json_auth(router: &Router, path: &str, body: Value, bearer: &str) -> Result<(StatusCode, Value)> {
    send(router, "POST", path, Some(body), Some(bearer)).await
}

pub async fn get_auth(router: &Router, path: &str, bearer: &str) -> Result<(StatusCode, Value)> {
    send(router, "GET", path, None, Some(bearer)).await
}

pub async fn send_put(router: &Router, path: &str, body: Value, bearer: &str) -> Result<(StatusCode, Value)> {
    send(router, "PUT", path, Some(body), Some(bearer)).await
}

pub async fn send_delete(router: &Router, path: &str, bearer: &str) -> Result<StatusCode> {
    let (status, _body) = send(router, "DELETE", path, None, Some(bearer)).await?;
    Ok(status)
}

async fn send(
    router: &Router,
    method: &str,
    path: &str,
    body: Option<Value>,
    bearer: Option<&str>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(path).header("content-type", "application/json");
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => Body::from(serde_json::to_vec(&value)?),
        None => Body::empty(),
    };
    let request = builder.body(body)?;
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}
