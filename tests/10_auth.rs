//! End-to-end scenario 1 (spec §8): login, verify, logout, then the old
//! access token must be rejected.

mod common;

use serde_json::json;

#[tokio::test]
async fn health_endpoint_responds() {
    let (harness, _user_id) = common::harness_with_admin("u1@x.com", "u1", "pw").await;
    let (status, body) = common::post_json(&harness.router, "/health", json!({})).await.unwrap();
    // /health is a GET; posting to it is expected to 405, but the router
    // must at least be wired and answer rather than panic.
    assert!(status.is_client_error() || status.is_success());
    let _ = body;
}

#[tokio::test]
async fn login_verify_logout_round_trip() {
    let (harness, _user_id) = common::harness_with_admin("u1@x.com", "u1", "pw").await;

    let (status, login_body) = common::post_json(
        &harness.router,
        "/api/auth/login",
        json!({ "tenant_id": harness.tenant_id, "identifier": "u1@x.com", "password": "pw" }),
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::OK, "login failed: {login_body}");
    let access = login_body["data"]["access"].as_str().unwrap().to_string();
    assert!(login_body["data"]["access_exp"].as_i64().unwrap() > 0);
    assert!(login_body["data"]["refresh_exp"].as_i64().unwrap() > 0);

    let (status, verify_body) =
        common::post_json(&harness.router, "/api/auth/verify", json!({ "access_token": access })).await.unwrap();
    assert_eq!(status, axum::http::StatusCode::OK, "verify failed: {verify_body}");
    assert_eq!(verify_body["ok"], true);

    let (status, logout_body) = common::post_json_auth(&harness.router, "/api/auth/logout", json!({}), &access)
        .await
        .unwrap();
    assert_eq!(status, axum::http::StatusCode::OK, "logout failed: {logout_body}");
    assert_eq!(logout_body["data"]["message"], "logout successful");

    let (_status, verify_again) =
        common::post_json(&harness.router, "/api/auth/verify", json!({ "access_token": access })).await.unwrap();
    assert_eq!(verify_again["code"], "TOKEN_INVALID");
}
