//! Scenario 2 (spec §8): a role holding the `*:*` wildcard permission passes
//! every permission check; a role scoped to a single resource does not.

mod common;

use serde_json::json;

#[tokio::test]
async fn wildcard_role_is_allowed_everything() {
    let (harness, _admin_id) = common::harness_with_admin("owner@acme.com", "owner", "pw").await;

    let (status, login_body) = common::post_json(
        &harness.router,
        "/api/auth/login",
        json!({ "tenant_id": harness.tenant_id, "identifier": "owner@acme.com", "password": "pw" }),
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::OK);
    let access = login_body["data"]["access"].as_str().unwrap();

    let (status, body) = common::post_json_auth(
        &harness.router,
        "/api/verify/has-permission",
        json!({ "permission": "role:delete" }),
        access,
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(body["data"]["allowed"], true);

    let (status, body) = common::post_json_auth(
        &harness.router,
        "/api/verify/check-permissions",
        json!({ "permissions": ["user:create", "tenant:delete", "garbage:nonsense"] }),
        access,
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::OK);
    let results = body["data"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    for pair in results {
        let arr = pair.as_array().unwrap();
        assert_eq!(arr[1], true, "expected wildcard role to allow {arr:?}");
    }
}

#[tokio::test]
async fn scoped_role_is_denied_outside_its_resource() {
    let state = common::bare_state();
    let tenant = erp_auth_core::testing::seed_tenant(&state, "scoped").await;
    let reader_role =
        erp_auth_core::testing::seed_role(&state, tenant.id, "reader", &["role:read"]).await;
    let user = erp_auth_core::testing::seed_user(
        &state,
        tenant.id,
        "reader@scoped.com",
        "reader",
        "pw",
        &[reader_role.id],
    )
    .await;
    let _ = user;
    let router = erp_auth_core::router::build(state);

    let (status, login_body) = common::post_json(
        &router,
        "/api/auth/login",
        json!({ "tenant_id": tenant.id, "identifier": "reader@scoped.com", "password": "pw" }),
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::OK);
    let access = login_body["data"]["access"].as_str().unwrap();

    let (status, body) =
        common::post_json_auth(&router, "/api/verify/has-permission", json!({ "permission": "role:read" }), access)
            .await
            .unwrap();
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(body["data"]["allowed"], true);

    let (status, body) = common::post_json_auth(
        &router,
        "/api/verify/has-permission",
        json!({ "permission": "role:delete" }),
        access,
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(body["data"]["allowed"], false);

    let (status, create_body) = common::post_json_auth(
        &router,
        "/api/roles",
        json!({ "name": "x", "slug": "x", "permissions": [] }),
        access,
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::FORBIDDEN, "unexpected body: {create_body}");
}
