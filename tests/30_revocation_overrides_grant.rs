//! Scenario 3 (spec §8): a user-level revoked permission wins over a
//! role-granted one, and logging out revokes the access token immediately.

mod common;

use erp_auth_core::domain::User;
use erp_auth_core::store::UserFilter;
use serde_json::json;

#[tokio::test]
async fn revoked_permission_overrides_additional_grant() {
    // Mirrors spec scenario 3 exactly: role `clerk` grants `order:read`;
    // `order:write` is both an additional grant and a revocation, so I4's
    // set difference must cancel it while leaving the role grant intact.
    let state = common::bare_state();
    let tenant = erp_auth_core::testing::seed_tenant(&state, "acme").await;
    let role = erp_auth_core::testing::seed_role(&state, tenant.id, "clerk", &["order:read"]).await;
    let user = erp_auth_core::testing::seed_user(
        &state,
        tenant.id,
        "clerk@acme.com",
        "clerk",
        "pw",
        &[role.id],
    )
    .await;

    let mut updated: User = user.clone();
    updated.additional_permissions.insert("order:write".to_string());
    updated.revoked_permissions.insert("order:write".to_string());
    state.store.update_user(UserFilter::by_id(tenant.id, user.id), updated).await.unwrap();

    let router = erp_auth_core::router::build(state);
    let (status, login_body) = common::post_json(
        &router,
        "/api/auth/login",
        json!({ "tenant_id": tenant.id, "identifier": "clerk@acme.com", "password": "pw" }),
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::OK);
    let access = login_body["data"]["access"].as_str().unwrap();

    let (status, body) =
        common::post_json_auth(&router, "/api/verify/has-permission", json!({ "permission": "order:read" }), access)
            .await
            .unwrap();
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(body["data"]["allowed"], true);

    let (status, body) = common::post_json_auth(
        &router,
        "/api/verify/has-permission",
        json!({ "permission": "order:write" }),
        access,
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(body["data"]["allowed"], false, "revoked permission must override the additional grant");
}

#[tokio::test]
async fn logout_revokes_access_token_immediately() {
    let (harness, _user_id) = common::harness_with_admin("u2@x.com", "u2", "pw").await;
    let (_status, login_body) = common::post_json(
        &harness.router,
        "/api/auth/login",
        json!({ "tenant_id": harness.tenant_id, "identifier": "u2@x.com", "password": "pw" }),
    )
    .await
    .unwrap();
    let access = login_body["data"]["access"].as_str().unwrap().to_string();

    common::post_json_auth(&harness.router, "/api/auth/logout", json!({}), &access).await.unwrap();

    let (status, body) =
        common::get_auth(&harness.router, "/api/roles", &access).await.unwrap();
    assert_eq!(status, axum::http::StatusCode::UNAUTHORIZED, "unexpected body: {body}");
}
