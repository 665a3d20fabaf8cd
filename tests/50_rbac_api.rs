//! RoleService / PermissionService / UserService CRUD (spec §6), exercised
//! through HTTP with the admin role's `*:*` grant, plus the immutable-field
//! guards (name/slug on permissions aren't tested directly here since the
//! handlers don't expose them for update; username immutability is covered
//! in 60_tenant_isolation.rs).

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
async fn role_crud_round_trip() {
    let (harness, _admin_id) = common::harness_with_admin("admin@acme.com", "admin", "pw").await;
    let access = access_token(&harness.router, harness.tenant_id, "admin@acme.com", "pw").await;

    let (status, created) = common::post_json_auth(
        &harness.router,
        "/api/roles",
        json!({ "name": "Auditor", "slug": "auditor", "permissions": ["report:read"] }),
        &access,
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::CREATED, "create failed: {created}");
    let role_id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, fetched) =
        common::get_auth(&harness.router, &format!("/api/roles/{role_id}"), &access).await.unwrap();
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(fetched["data"]["name"], "Auditor");

    let (status, listed) = common::get_auth(&harness.router, "/api/roles", &access).await.unwrap();
    assert_eq!(status, axum::http::StatusCode::OK);
    let roles = listed["data"].as_array().unwrap();
    assert!(roles.len() >= 2, "expected at least the seeded admin role plus the new one");

    let (status, updated) = common::send_put(
        &harness.router,
        &format!("/api/roles/{role_id}"),
        json!({ "permissions": ["report:read", "report:export"] }),
        &access,
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::OK, "update failed: {updated}");
    let perms = updated["data"]["permissions"].as_array().unwrap();
    assert_eq!(perms.len(), 2);

    let status = common::send_delete(&harness.router, &format!("/api/roles/{role_id}"), &access).await.unwrap();
    assert_eq!(status, axum::http::StatusCode::NO_CONTENT);

    let (status, _body) =
        common::get_auth(&harness.router, &format!("/api/roles/{role_id}"), &access).await.unwrap();
    assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn permission_crud_validates_permission_string() {
    let (harness, _admin_id) = common::harness_with_admin("admin2@acme.com", "admin2", "pw").await;
    let access = access_token(&harness.router, harness.tenant_id, "admin2@acme.com", "pw").await;

    let (status, bad) = common::post_json_auth(
        &harness.router,
        "/api/permissions",
        json!({
            "permission_string": "not-a-valid-triple!!",
            "display_name": "Bad",
            "is_dangerous": false,
            "requires_approval": false,
            "dependencies": []
        }),
        &access,
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST, "unexpected body: {bad}");

    let (status, good) = common::post_json_auth(
        &harness.router,
        "/api/permissions",
        json!({
            "permission_string": "invoice:approve",
            "display_name": "Approve invoices",
            "is_dangerous": true,
            "requires_approval": true,
            "dependencies": []
        }),
        &access,
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::CREATED, "unexpected body: {good}");
    assert_eq!(good["data"]["resource"], "invoice");
    assert_eq!(good["data"]["action"], "approve");
}

#[tokio::test]
async fn user_create_and_list_round_trip() {
    let (harness, _admin_id) = common::harness_with_admin("admin3@acme.com", "admin3", "pw").await;
    let access = access_token(&harness.router, harness.tenant_id, "admin3@acme.com", "pw").await;

    let (status, created) = common::post_json_auth(
        &harness.router,
        "/api/users",
        json!({ "email": "New.User@Acme.com", "username": "NewUser", "password_hash": "precomputed-hash" }),
        &access,
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::CREATED, "unexpected body: {created}");
    assert_eq!(created["data"]["email"], "new.user@acme.com");
    assert_eq!(created["data"]["username"], "newuser");

    let (status, listed) = common::get_auth(&harness.router, "/api/users", &access).await.unwrap();
    assert_eq!(status, axum::http::StatusCode::OK);
    assert!(listed["data"].as_array().unwrap().len() >= 2);
}
