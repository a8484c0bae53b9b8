//! Full session lifecycle driven entirely through the HTTP surface: create,
//! start, scan, close, resolve, approve, build-actions, apply. Mirrors S1
//! (spec.md §8) but exercised via the router instead of calling aud-service
//! directly, so the auth/role layer and JSON (de)serialisation are in scope.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn session_lifecycle_end_to_end_over_http() {
    let d = common::setup().await;
    common::stubs::stub_auth_me(&d.stubs.auth, 1, &["inventory_auditor", "inventory_audit_supervisor", "system_admin"])
        .await;
    common::stubs::stub_notifications_accept(&d.stubs.notification).await;

    let location_id = 10;
    common::stubs::stub_room_access(&d.stubs.location, location_id, true).await;
    common::stubs::stub_items_by_room(
        &d.stubs.inventory,
        location_id,
        json!([
            { "id": 1, "location_id": 10, "responsible_id": null, "barcode_id": null },
            { "id": 2, "location_id": 10, "responsible_id": null, "barcode_id": null },
        ]),
    )
    .await;

    let (status, session) = common::call(
        common::router(&d),
        common::post_json("/sessions", Some("tok"), json!({ "plan_id": null, "location_id": location_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id: Uuid = serde_json::from_value(session["id"].clone()).unwrap();

    let (status, started) =
        common::call(common::router(&d), common::post_json(&format!("/sessions/{session_id}/start"), Some("tok"), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["status"], "in_progress");

    for (client_scan_id, item_id, found) in [("a", 1, 10), ("b", 2, 11)] {
        let (status, _) = common::call(
            common::router(&d),
            common::post_json(
                &format!("/sessions/{session_id}/scans"),
                Some("tok"),
                json!({ "item_id": item_id, "found_location_id": found, "client_scan_id": client_scan_id }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, closed) =
        common::call(common::router(&d), common::post_json(&format!("/sessions/{session_id}/close"), Some("tok"), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["status"], "awaiting_approval");

    let (status, discrepancies) =
        common::call(common::router(&d), common::get(&format!("/sessions/{session_id}/discrepancies"), Some("tok"))).await;
    assert_eq!(status, StatusCode::OK);
    let discrepancies = discrepancies.as_array().unwrap();
    assert_eq!(discrepancies.len(), 1);
    let discrepancy_id = discrepancies[0]["id"].as_str().unwrap();

    let (status, _) = common::call(
        common::router(&d),
        common::post_json(
            &format!("/discrepancies/{discrepancy_id}/resolve"),
            Some("tok"),
            json!({ "resolution_status": "resolved", "resolution_payload": { "action": "move", "to_location_id": 10 } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, approved) =
        common::call(common::router(&d), common::post_json(&format!("/sessions/{session_id}/approve"), Some("tok"), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");

    let (status, built) = common::call(
        common::router(&d),
        common::post_json(&format!("/sessions/{session_id}/build-actions"), Some("tok"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(built["actions_created"], 1);

    common::stubs::stub_bulk_move(&d.stubs.inventory, true).await;

    let (status, applied) =
        common::call(common::router(&d), common::post_json(&format!("/sessions/{session_id}/apply"), Some("tok"), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(applied["status"], "applied");
}
