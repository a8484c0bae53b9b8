//! S5 — partial apply failure (spec.md §8, P5/P6).
//!
//! GREEN when: two resolved `move` discrepancies target different
//! locations, inventory accepts the bulk-move for one group and rejects the
//! other with 503. After `apply_session` the accepted group's Action is
//! `done`, the rejected group's is `failed`, and the session stays
//! `approved`. A bare follow-up `apply_session` call does not retry the
//! failed group on its own — it stays `failed` until a new resolution
//! produces a fresh Action (a different idempotency key), at which point
//! `build_actions_from_resolutions` creates the new pending Action and a
//! further `apply_session` call applies it.

mod common;

use aud_schemas::{ActionStatus, ResolutionStatus, SessionStatus};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn partial_apply_failure_then_retry() {
    let h = common::setup().await;
    let location_id = 1;

    common::stubs::stub_items_by_room(
        &h.stubs.inventory,
        location_id,
        json!([
            { "id": 100, "location_id": 1, "responsible_id": null, "barcode_id": null },
            { "id": 200, "location_id": 1, "responsible_id": null, "barcode_id": null },
        ]),
    )
    .await;

    let session = common::new_session(&h, location_id).await;
    aud_service::snapshot::start_session(&h.pool, &h.inventory, session.id, 1, "tok").await.expect("start");

    for (client_scan_id, item_id, found_location_id) in [("a", 100, 20), ("b", 200, 21)] {
        aud_service::scan::create_scan(
            &h.pool,
            &h.inventory,
            session.id,
            aud_service::scan::ScanPayload {
                item_id: Some(item_id),
                barcode_value: None,
                found_location_id,
                notes: None,
                photo_url: None,
                client_scan_id: client_scan_id.to_string(),
                extra: None,
            },
            1,
            "tok",
        )
        .await
        .expect("scan");
    }

    aud_service::close::close_session(&h.pool, session.id, 1).await.expect("close");

    let discrepancies = aud_db::discrepancies::list_for_session(&h.pool, session.id).await.expect("list");
    assert_eq!(discrepancies.len(), 2);
    for d in &discrepancies {
        aud_service::resolution::resolve_discrepancy(
            &h.pool,
            d.id,
            ResolutionStatus::Resolved,
            Some(json!({ "action": "move", "to_location_id": d.found_location_id.unwrap() })),
        )
        .await
        .expect("resolve");
    }

    aud_service::approval::approve_session(&h.pool, session.id, 9).await.expect("approve");
    let created =
        aud_service::action_builder::build_actions_from_resolutions(&h.pool, session.id).await.expect("build");
    assert_eq!(created, 2);

    // location 20 accepts, location 21 fails with 503.
    Mock::given(method("POST"))
        .and(path("/items/bulk-move"))
        .and(body_json(json!({ "item_ids": [100], "location_id": 20 })))
        .respond_with(ResponseTemplate::new(200))
        .mount(&h.stubs.inventory)
        .await;
    Mock::given(method("POST"))
        .and(path("/items/bulk-move"))
        .and(body_json(json!({ "item_ids": [200], "location_id": 21 })))
        .respond_with(ResponseTemplate::new(503))
        .mount(&h.stubs.inventory)
        .await;

    let after_first_apply =
        aud_service::apply::apply_session(&h.pool, &h.inventory, session.id, "tok").await.expect("apply");
    assert_eq!(after_first_apply.status, SessionStatus::Approved);

    let actions = aud_db::actions::list_for_session(&h.pool, session.id).await.expect("list actions");
    let done = actions.iter().find(|a| a.payload.get("item_id").and_then(|v| v.as_i64()) == Some(100)).unwrap();
    let failed = actions.iter().find(|a| a.payload.get("item_id").and_then(|v| v.as_i64()) == Some(200)).unwrap();
    assert_eq!(done.status, ActionStatus::Done);
    assert_eq!(failed.status, ActionStatus::Failed);
    assert!(failed.last_error.is_some());

    // A bare re-invocation of apply_session, with no new resolution, must
    // not auto-retry the failed group: it only re-attempts `pending`
    // Actions, and there are none left.
    let after_bare_retry =
        aud_service::apply::apply_session(&h.pool, &h.inventory, session.id, "tok").await.expect("bare retry");
    assert_eq!(after_bare_retry.status, SessionStatus::Approved);
    let actions = aud_db::actions::list_for_session(&h.pool, session.id).await.expect("list actions");
    let still_failed = actions.iter().find(|a| a.payload.get("item_id").and_then(|v| v.as_i64()) == Some(200)).unwrap();
    assert_eq!(still_failed.status, ActionStatus::Failed);

    // Retrying for real requires a new resolution: the supervisor redirects
    // item 200's discrepancy to location 22, which yields a different
    // idempotency key and so a fresh pending Action.
    let discrepancy_200 = discrepancies.iter().find(|d| d.found_location_id == Some(21)).unwrap();
    aud_service::resolution::resolve_discrepancy(
        &h.pool,
        discrepancy_200.id,
        ResolutionStatus::Resolved,
        Some(json!({ "action": "move", "to_location_id": 22 })),
    )
    .await
    .expect("re-resolve");
    let created_on_retry =
        aud_service::action_builder::build_actions_from_resolutions(&h.pool, session.id).await.expect("rebuild");
    assert_eq!(created_on_retry, 1);

    Mock::given(method("POST"))
        .and(path("/items/bulk-move"))
        .and(body_json(json!({ "item_ids": [200], "location_id": 22 })))
        .respond_with(ResponseTemplate::new(200))
        .mount(&h.stubs.inventory)
        .await;

    let after_second_apply =
        aud_service::apply::apply_session(&h.pool, &h.inventory, session.id, "tok").await.expect("retry apply");
    assert_eq!(after_second_apply.status, SessionStatus::Applied);
}
