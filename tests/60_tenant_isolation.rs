//! Scenario 6 (spec §8) plus the tenant-isolation invariant (I1): a user in
//! one tenant cannot see or act on another tenant's resources even holding
//! an admin role, and `username` cannot be changed after creation.

mod common;

use serde_json::json;

async fn access_token(router: &axum::Router, tenant_id: uuid::Uuid, identifier: &str, password: &str) -> String {
    let (status, body) = common::post_json(
        router,
        "/api/auth/login",
        json!({ "tenant_id": tenant_id, "identifier": identifier, "password": password }),
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::OK, "login failed: {body}");
    body["data"]["access"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn admin_in_one_tenant_cannot_read_another_tenants_role() {
    let state = common::bare_state();

    let tenant_a = erp_auth_core::testing::seed_tenant(&state, "tenant-a").await;
    let admin_a = erp_auth_core::testing::seed_role(&state, tenant_a.id, "admin", &["*:*"]).await;
    erp_auth_core::testing::seed_user(&state, tenant_a.id, "a@a.com", "a-admin", "pw", &[admin_a.id]).await;

    let tenant_b = erp_auth_core::testing::seed_tenant(&state, "tenant-b").await;
    let admin_b = erp_auth_core::testing::seed_role(&state, tenant_b.id, "admin", &["*:*"]).await;
    let secret_role = erp_auth_core::testing::seed_role(&state, tenant_b.id, "secret", &["ledger:read"]).await;
    erp_auth_core::testing::seed_user(&state, tenant_b.id, "b@b.com", "b-admin", "pw", &[admin_b.id]).await;

    let router = erp_auth_core::router::build(state);
    let access_a = access_token(&router, tenant_a.id, "a@a.com", "pw").await;

    let (status, body) =
        common::get_auth(&router, &format!("/api/roles/{}", secret_role.id), &access_a).await.unwrap();
    assert_eq!(status, axum::http::StatusCode::NOT_FOUND, "tenant A must not see tenant B's role: {body}");

    let (status, listed) = common::get_auth(&router, "/api/roles", &access_a).await.unwrap();
    assert_eq!(status, axum::http::StatusCode::OK);
    let names: Vec<String> = listed["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    assert!(!names.contains(&"secret".to_string()), "tenant A's role list leaked tenant B's role: {names:?}");
}

#[tokio::test]
async fn username_is_immutable_after_create() {
    let (harness, admin_id) = common::harness_with_admin("admin@immut.com", "immutadmin", "pw").await;
    let access = access_token(&harness.router, harness.tenant_id, "admin@immut.com", "pw").await;

    let (status, body) = common::send_put(
        &harness.router,
        &format!("/api/users/{admin_id}"),
        json!({ "email": "changed@immut.com" }),
        &access,
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::OK, "email update should succeed: {body}");
    assert_eq!(body["data"]["email"], "changed@immut.com");

    // Spec §8 Scenario 6: an actual attempted username change must be
    // rejected with RESTRICTED_FIELDS and persist nothing.
    let (status, body) = common::send_put(
        &harness.router,
        &format!("/api/users/{admin_id}"),
        json!({ "username": "renamed-admin" }),
        &access,
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST, "username change should be rejected: {body}");
    assert_eq!(body["code"], "RESTRICTED_FIELDS");

    let (status, body) = common::get_auth(&harness.router, &format!("/api/users/{admin_id}"), &access).await.unwrap();
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(body["data"]["username"], "immutadmin", "rejected update must not persist: {body}");
    assert_eq!(body["data"]["email"], "changed@immut.com");
}
