//! Route table for the RPC surface named in spec §6, generalized from the
//! teacher's flat `Router::new().route(...)` chain in `main.rs` to a
//! public/protected split: `AuthService::Login` and `::Refresh` are the only
//! unauthenticated endpoints, everything else runs behind
//! [`jwt_auth_middleware`] + [`validate_tenant_middleware`].

use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, permissions, roles, tenants, users, verification};
use crate::middleware::{jwt_auth_middleware, validate_tenant_middleware};
use crate::state::AppState;

pub fn build(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/roles", get(roles::list_roles).post(roles::create_role))
        .route(
            "/api/roles/:id",
            get(roles::get_role).put(roles::update_role).delete(roles::delete_role),
        )
        .route(
            "/api/permissions",
            get(permissions::list_permissions).post(permissions::create_permission),
        )
        .route(
            "/api/permissions/:id",
            get(permissions::get_permission)
                .put(permissions::update_permission)
                .delete(permissions::delete_permission),
        )
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/users/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .route("/api/tenants", get(tenants::list_tenants).post(tenants::create_tenant))
        .route(
            "/api/tenants/:id",
            get(tenants::get_tenant).put(tenants::update_tenant).delete(tenants::delete_tenant),
        )
        .route("/api/verify/has-permission", post(verification::has_permission))
        .route("/api/verify/check-permissions", post(verification::check_permissions))
        .route("/api/verify/users/:user_id/permissions", get(verification::get_user_permissions))
        .route("/api/verify/users/:user_id/roles", get(verification::get_user_roles))
        .layer(axum::middleware::from_fn_with_state(state.clone(), validate_tenant_middleware))
        .layer(axum::middleware::from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/verify", post(auth::verify))
        .route("/api/verify/tenants/:tenant_id/is-system", get(verification::is_system_tenant))
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> axum::Json<Value> {
    axum::Json(json!({
        "name": "erp-auth-core",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> axum::Json<Value> {
    axum::Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}
