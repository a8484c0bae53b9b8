//! Bearer-token and role enforcement at the HTTP boundary (spec.md §4.2/§7).
//!
//! GREEN when: a request with no `Authorization` header is rejected 401
//! before touching `aud-service`, a request with a valid token but the wrong
//! role is rejected 403, and a request with an allowed role succeeds.

mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn missing_bearer_token_is_401() {
    let d = common::setup().await;
    let (status, body) = common::call(common::router(&d), common::get("/plans", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "missing_bearer_token");
}

#[tokio::test]
async fn rejected_token_is_401() {
    let d = common::setup().await;
    common::stubs::stub_auth_me_unauthorised(&d.stubs.auth).await;

    let (status, body) = common::call(common::router(&d), common::get("/plans", Some("bad-token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "token_rejected");
}

#[tokio::test]
async fn wrong_role_is_403_on_create_plan() {
    let d = common::setup().await;
    // create_plan requires Auditor; a caller with only the Supervisor role is refused.
    common::stubs::stub_auth_me(&d.stubs.auth, 1, &["inventory_audit_supervisor"]).await;

    let body = serde_json::json!({
        "title": "Q3 warehouse sweep",
        "scope_type": "location",
    });
    let (status, resp) = common::call(common::router(&d), common::post_json("/plans", Some("tok"), body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(resp["detail"], "role_required");
}

#[tokio::test]
async fn system_admin_satisfies_any_role_requirement() {
    let d = common::setup().await;
    common::stubs::stub_auth_me(&d.stubs.auth, 1, &["system_admin"]).await;

    let body = serde_json::json!({
        "title": "Q3 warehouse sweep",
        "scope_type": "location",
    });
    let (status, resp) = common::call(common::router(&d), common::post_json("/plans", Some("tok"), body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(resp["title"], "Q3 warehouse sweep");
}
