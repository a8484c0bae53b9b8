//! In-process router scaffolding shared by aud-daemon scenario tests: a
//! migrated Postgres pool, collaborator stubs, and an `AppState` pointed at
//! all four mock servers. No TCP socket is bound — `tower::ServiceExt::oneshot`
//! drives the router directly.

use std::sync::Arc;

use aud_config::Settings;
use aud_daemon::state::AppState;
use aud_testkit::stubs::CollaboratorStubs;
pub use aud_testkit::stubs;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;

pub struct Daemon {
    pub state: Arc<AppState>,
    pub stubs: CollaboratorStubs,
}

pub async fn setup() -> Daemon {
    let pool = aud_testkit::testkit_db_pool().await.expect("migrated test db pool");
    let stubs = CollaboratorStubs::start().await;

    let settings = Settings {
        database_url: String::new(),
        auth_service_url: stubs.auth.uri(),
        location_service_url: stubs.location.uri(),
        inventory_service_url: stubs.inventory.uri(),
        notification_service_url: stubs.notification.uri(),
        notification_internal_token: "internal-test-token".to_string(),
        system_admin_role: "system_admin".to_string(),
        audit_auditor_role: "inventory_auditor".to_string(),
        audit_supervisor_role: "inventory_audit_supervisor".to_string(),
        daemon_addr: "127.0.0.1:0".to_string(),
    };

    let state = Arc::new(AppState::new(pool, &settings));
    Daemon { state, stubs }
}

pub fn router(d: &Daemon) -> axum::Router {
    aud_daemon::routes::build_router(Arc::clone(&d.state))
}

pub async fn call(router: axum::Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    use tower::ServiceExt;
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let bytes = resp.into_body().collect().await.expect("body collect failed").to_bytes();
    let json = if bytes.is_empty() { serde_json::Value::Null } else { serde_json::from_slice(&bytes).expect("json body") };
    (status, json)
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().method("GET").uri(uri);
    if let Some(t) = token {
        b = b.header("Authorization", format!("Bearer {t}"));
    }
    b.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut b = Request::builder().method("POST").uri(uri).header("content-type", "application/json");
    if let Some(t) = token {
        b = b.header("Authorization", format!("Bearer {t}"));
    }
    b.body(Body::from(serde_json::to_vec(&body).unwrap())).unwrap()
}
