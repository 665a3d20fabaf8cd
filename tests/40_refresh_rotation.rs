//! Scenarios 4 and 5 (spec §8): refresh rotates both tokens and invalidates
//! the old pair; presenting a refresh token a second time within the reuse
//! window is treated as theft and revokes every token for the user.

mod common;

use serde_json::json;

async fn login(
    router: &axum::Router,
    tenant_id: uuid::Uuid,
    identifier: &str,
    password: &str,
) -> serde_json::Value {
    let (status, body) = common::post_json(
        router,
        "/api/auth/login",
        json!({ "tenant_id": tenant_id, "identifier": identifier, "password": password }),
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::OK, "login failed: {body}");
    body["data"].clone()
}

#[tokio::test]
async fn refresh_rotates_tokens_and_invalidates_prior_access() {
    let (harness, user_id) = common::harness_with_admin("u4@x.com", "u4", "pw").await;
    let first = login(&harness.router, harness.tenant_id, "u4@x.com", "pw").await;
    let first_access = first["access"].as_str().unwrap().to_string();
    let first_refresh = first["refresh"].as_str().unwrap().to_string();

    let (status, refreshed_body) = common::post_json(
        &harness.router,
        "/api/auth/refresh",
        json!({ "tenant_id": harness.tenant_id, "user_id": user_id, "refresh_token": first_refresh }),
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::OK, "refresh failed: {refreshed_body}");
    let second_access = refreshed_body["data"]["access"].as_str().unwrap().to_string();
    let second_refresh = refreshed_body["data"]["refresh"].as_str().unwrap().to_string();
    assert_ne!(first_access, second_access);
    assert_ne!(first_refresh, second_refresh);

    let (_status, verify_old) =
        common::post_json(&harness.router, "/api/auth/verify", json!({ "access_token": first_access })).await.unwrap();
    assert_eq!(verify_old["code"], "TOKEN_INVALID");

    let (status, verify_new) =
        common::post_json(&harness.router, "/api/auth/verify", json!({ "access_token": second_access })).await.unwrap();
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(verify_new["ok"], true);
}

#[tokio::test]
async fn reused_refresh_token_triggers_theft_response() {
    let (harness, user_id) = common::harness_with_admin("u5@x.com", "u5", "pw").await;
    let first = login(&harness.router, harness.tenant_id, "u5@x.com", "pw").await;
    let first_refresh = first["refresh"].as_str().unwrap().to_string();

    let (status, second) = common::post_json(
        &harness.router,
        "/api/auth/refresh",
        json!({ "tenant_id": harness.tenant_id, "user_id": user_id, "refresh_token": first_refresh }),
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::OK);
    let second_access = second["data"]["access"].as_str().unwrap().to_string();

    // Re-presenting the rotated-away first refresh token within the reuse
    // window is theft: every token for the user is revoked.
    let (status, reused) = common::post_json(
        &harness.router,
        "/api/auth/refresh",
        json!({ "tenant_id": harness.tenant_id, "user_id": user_id, "refresh_token": first_refresh }),
    )
    .await
    .unwrap();
    assert_eq!(reused["code"], "TOKEN_INVALID", "unexpected status {status}: {reused}");

    let (_status, verify_second) = common::post_json(
        &harness.router,
        "/api/auth/verify",
        json!({ "access_token": second_access }),
    )
    .await
    .unwrap();
    assert_eq!(
        verify_second["code"], "TOKEN_INVALID",
        "theft response must revoke the most recently issued access token too"
    );
}
