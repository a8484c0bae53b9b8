//! Happy path, single room, one misplacement.
//!
//! GREEN when: two items expected at location 10, one scanned in place and
//! one scanned at location 11. Canonical rebuild on close yields exactly one
//! `misplaced` discrepancy for the moved item. Supervisor resolves it with a
//! move back to 10, approves, builds one Action, applies it, and the session
//! reaches `applied`.

mod common;

use aud_schemas::{DiscrepancyType, ResolutionStatus, SessionStatus};
use serde_json::json;

#[tokio::test]
async fn happy_path_single_misplacement() {
    let h = common::setup().await;
    let location_id = 10;

    common::stubs::stub_items_by_room(
        &h.stubs.inventory,
        location_id,
        json!([
            { "id": 1, "location_id": 10, "responsible_id": null, "barcode_id": null },
            { "id": 2, "location_id": 10, "responsible_id": null, "barcode_id": null },
        ]),
    )
    .await;

    let session = common::new_session(&h, location_id).await;

    let started =
        aud_service::snapshot::start_session(&h.pool, &h.inventory, session.id, 1, "tok").await.expect("start");
    assert_eq!(started.status, SessionStatus::InProgress);

    aud_service::scan::create_scan(
        &h.pool,
        &h.inventory,
        session.id,
        aud_service::scan::ScanPayload {
            item_id: Some(1),
            barcode_value: None,
            found_location_id: 10,
            notes: None,
            photo_url: None,
            client_scan_id: "a".to_string(),
            extra: None,
        },
        1,
        "tok",
    )
    .await
    .expect("scan a");

    aud_service::scan::create_scan(
        &h.pool,
        &h.inventory,
        session.id,
        aud_service::scan::ScanPayload {
            item_id: Some(2),
            barcode_value: None,
            found_location_id: 11,
            notes: None,
            photo_url: None,
            client_scan_id: "b".to_string(),
            extra: None,
        },
        1,
        "tok",
    )
    .await
    .expect("scan b");

    let closed = aud_service::close::close_session(&h.pool, session.id, 1).await.expect("close");
    assert_eq!(closed.status, SessionStatus::AwaitingApproval);

    let discrepancies = aud_db::discrepancies::list_for_session(&h.pool, session.id).await.expect("list");
    assert_eq!(discrepancies.len(), 1);
    let misplaced = &discrepancies[0];
    assert_eq!(misplaced.discrepancy_type, DiscrepancyType::Misplaced);
    assert_eq!(misplaced.item_id, Some(2));
    assert_eq!(misplaced.expected_location_id, Some(10));
    assert_eq!(misplaced.found_location_id, Some(11));

    aud_service::resolution::resolve_discrepancy(
        &h.pool,
        misplaced.id,
        ResolutionStatus::Resolved,
        Some(json!({ "action": "move", "to_location_id": 10 })),
    )
    .await
    .expect("resolve");

    let approved = aud_service::approval::approve_session(&h.pool, session.id, 9).await.expect("approve");
    assert_eq!(approved.status, SessionStatus::Approved);

    let created = aud_service::action_builder::build_actions_from_resolutions(&h.pool, session.id)
        .await
        .expect("build actions");
    assert_eq!(created, 1);

    common::stubs::stub_bulk_move(&h.stubs.inventory, true).await;

    let applied = aud_service::apply::apply_session(&h.pool, &h.inventory, session.id, "tok").await.expect("apply");
    assert_eq!(applied.status, SessionStatus::Applied);

    let actions = aud_db::actions::list_for_session(&h.pool, session.id).await.expect("list actions");
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].status, aud_schemas::ActionStatus::Done);
}
