//! `wiremock` stubs for the four collaborator contracts in spec.md §6.
//!
//! Each helper mounts one expectation on a caller-owned [`wiremock::MockServer`]
//! so a scenario test can compose exactly the collaborator behaviour it needs
//! (e.g. a 403 from location, a 404 from inventory resolve) without spinning
//! up a real auth/inventory/location/notification service.

use serde_json::{json, Value};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Bundles a running mock for each collaborator; `aud_collab::*Client::new`
/// is pointed at the relevant `.uri()`.
pub struct CollaboratorStubs {
    pub auth: MockServer,
    pub location: MockServer,
    pub inventory: MockServer,
    pub notification: MockServer,
}

impl CollaboratorStubs {
    pub async fn start() -> Self {
        Self {
            auth: MockServer::start().await,
            location: MockServer::start().await,
            inventory: MockServer::start().await,
            notification: MockServer::start().await,
        }
    }
}

/// `GET /auth/me` -> 200 with the given caller id and roles.
pub async fn stub_auth_me(server: &MockServer, caller_id: i64, roles: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": caller_id, "roles": roles })))
        .mount(server)
        .await;
}

/// `GET /auth/me` -> 401 (token rejected).
pub async fn stub_auth_me_unauthorised(server: &MockServer) {
    Mock::given(method("GET")).and(path("/auth/me")).respond_with(ResponseTemplate::new(401)).mount(server).await;
}

/// `GET /rooms/my/{id}` -> 200 (access granted) or 403 (denied).
pub async fn stub_room_access(server: &MockServer, room_id: i64, allowed: bool) {
    let status = if allowed { 200 } else { 403 };
    Mock::given(method("GET"))
        .and(path(format!("/rooms/my/{room_id}")))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// `GET /items/room/{id}` -> the room's current item set.
pub async fn stub_items_by_room(server: &MockServer, room_id: i64, items: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/items/room/{room_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(items))
        .mount(server)
        .await;
}

/// `POST /items/resolve` -> 200 with the resolved item, or 404 if
/// `item` is `None` (the barcode doesn't resolve — a legitimate outcome).
pub async fn stub_resolve_by_barcode(server: &MockServer, item: Option<Value>) {
    let response = match item {
        Some(item) => ResponseTemplate::new(200).set_body_json(item),
        None => ResponseTemplate::new(404),
    };
    Mock::given(method("POST")).and(path("/items/resolve")).respond_with(response).mount(server).await;
}

/// `POST /items/bulk-move` -> 200, or the given failure status (e.g. 503).
pub async fn stub_bulk_move(server: &MockServer, success: bool) {
    let status = if success { 200 } else { 503 };
    Mock::given(method("POST")).and(path("/items/bulk-move")).respond_with(ResponseTemplate::new(status)).mount(server).await;
}

/// `POST /internal/notifications` -> 200, accepting anything.
pub async fn stub_notifications_accept(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path_regex("^/internal/notifications"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}
