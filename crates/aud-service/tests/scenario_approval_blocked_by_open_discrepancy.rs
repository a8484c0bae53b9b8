//! S6 — approval blocked by open discrepancies (spec.md §8, I3/P3).
//!
//! GREEN when: a session in `awaiting_approval` with one still-open
//! discrepancy rejects `approve_session` with a `state_conflict` carrying
//! `discrepancies_not_resolved`, and the session's status is unchanged.

mod common;

use aud_schemas::SessionStatus;
use serde_json::json;

#[tokio::test]
async fn approval_blocked_while_a_discrepancy_is_open() {
    let h = common::setup().await;
    let location_id = 8;

    common::stubs::stub_items_by_room(
        &h.stubs.inventory,
        location_id,
        json!([{ "id": 42, "location_id": 8, "responsible_id": null, "barcode_id": null }]),
    )
    .await;

    let session = common::new_session(&h, location_id).await;
    aud_service::snapshot::start_session(&h.pool, &h.inventory, session.id, 1, "tok").await.expect("start");

    // Item 42 never scanned -> canonical rebuild leaves one open `missing`.
    let closed = aud_service::close::close_session(&h.pool, session.id, 1).await.expect("close");
    assert_eq!(closed.status, SessionStatus::AwaitingApproval);

    let discrepancies = aud_db::discrepancies::list_for_session(&h.pool, session.id).await.expect("list");
    assert_eq!(discrepancies.len(), 1);

    let err = aud_service::approval::approve_session(&h.pool, session.id, 9).await.expect_err("must reject");
    match err {
        aud_service::AuditError::StateConflict(detail) => assert_eq!(detail, "discrepancies_not_resolved"),
        other => panic!("expected StateConflict, got {other:?}"),
    }

    let unchanged = aud_service::session_crud::get_session(&h.pool, session.id).await.expect("get");
    assert_eq!(unchanged.status, SessionStatus::AwaitingApproval);
}
