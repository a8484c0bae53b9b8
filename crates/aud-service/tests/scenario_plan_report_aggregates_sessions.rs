//! Reporting Aggregator (C8): a plan report sums per-session counts rather
//! than averaging rates, and `rooms_done` counts only `applied`/`closed`
//! sessions.

mod common;

use aud_schemas::PlanStatus;
use serde_json::json;

#[tokio::test]
async fn plan_report_sums_two_sessions() {
    let h = common::setup().await;

    let plan = aud_db::plans::create_plan(
        &h.pool,
        &aud_db::plans::NewPlan {
            title: "Quarterly sweep".to_string(),
            scope_type: aud_schemas::ScopeType::Location,
            scope_payload: json!({}),
            start_date: None,
            end_date: None,
            created_by: 1,
        },
    )
    .await
    .expect("create plan");
    assert_eq!(plan.status, PlanStatus::Draft);

    // Room A: one expected item, found in place -> fully reconciled.
    common::stubs::stub_items_by_room(
        &h.stubs.inventory,
        10,
        json!([{ "id": 1, "location_id": 10, "responsible_id": null, "barcode_id": null }]),
    )
    .await;
    common::stubs::stub_room_access(&h.stubs.location, 10, true).await;
    let session_a = aud_service::session_crud::create_session(&h.pool, &h.location, Some(plan.id), 10, "tok")
        .await
        .expect("create session a");
    aud_service::snapshot::start_session(&h.pool, &h.inventory, session_a.id, 1, "tok").await.expect("start a");
    aud_service::scan::create_scan(
        &h.pool,
        &h.inventory,
        session_a.id,
        aud_service::scan::ScanPayload {
            item_id: Some(1),
            barcode_value: None,
            found_location_id: 10,
            notes: None,
            photo_url: None,
            client_scan_id: "a1".to_string(),
            extra: None,
        },
        1,
        "tok",
    )
    .await
    .expect("scan a1");
    aud_service::close::close_session(&h.pool, session_a.id, 1).await.expect("close a");
    aud_service::approval::approve_session(&h.pool, session_a.id, 9).await.expect("approve a");

    // Room B: one expected item, never scanned -> stays open, never applied.
    common::stubs::stub_items_by_room(
        &h.stubs.inventory,
        11,
        json!([{ "id": 2, "location_id": 11, "responsible_id": null, "barcode_id": null }]),
    )
    .await;
    common::stubs::stub_room_access(&h.stubs.location, 11, true).await;
    let session_b = aud_service::session_crud::create_session(&h.pool, &h.location, Some(plan.id), 11, "tok")
        .await
        .expect("create session b");
    aud_service::snapshot::start_session(&h.pool, &h.inventory, session_b.id, 1, "tok").await.expect("start b");
    aud_service::close::close_session(&h.pool, session_b.id, 1).await.expect("close b");

    let report = aud_service::report::get_plan_report(&h.pool, plan.id).await.expect("report");
    assert_eq!(report.sessions.len(), 2);
    assert_eq!(report.totals.expected_total, 2);
    assert_eq!(report.totals.found_in_place, 1);
    assert_eq!(report.rooms_done, 0, "neither session reached applied/closed yet");

    let applied = aud_service::apply::apply_session(&h.pool, &h.inventory, session_a.id, "tok").await;
    // Session A has no resolved discrepancies and so no Actions; apply_session
    // requires `approved` and transitions straight to `applied` with zero
    // pending/failed Actions.
    let applied = applied.expect("apply a");
    assert_eq!(applied.status, aud_schemas::SessionStatus::Applied);

    let report = aud_service::report::get_plan_report(&h.pool, plan.id).await.expect("report again");
    assert_eq!(report.rooms_done, 1, "only the applied session counts");
}
