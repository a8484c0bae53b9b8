//! Retrying the same scan is idempotent.
//!
//! GREEN when: two POSTs carrying identical `client_scan_id="same"` leave
//! exactly one Scan row, both calls return the same id, and the
//! corresponding ItemResult reaches `found` exactly once.

mod common;

use aud_schemas::ItemResultStatus;
use serde_json::json;

#[tokio::test]
async fn retrying_a_scan_is_idempotent() {
    let h = common::setup().await;
    let location_id = 10;

    common::stubs::stub_items_by_room(
        &h.stubs.inventory,
        location_id,
        json!([{ "id": 1, "location_id": 10, "responsible_id": null, "barcode_id": null }]),
    )
    .await;

    let session = common::new_session(&h, location_id).await;
    aud_service::snapshot::start_session(&h.pool, &h.inventory, session.id, 1, "tok").await.expect("start");

    let payload = || aud_service::scan::ScanPayload {
        item_id: Some(1),
        barcode_value: None,
        found_location_id: 11,
        notes: None,
        photo_url: None,
        client_scan_id: "same".to_string(),
        extra: None,
    };

    let first =
        aud_service::scan::create_scan(&h.pool, &h.inventory, session.id, payload(), 1, "tok").await.expect("first");
    let second = aud_service::scan::create_scan(&h.pool, &h.inventory, session.id, payload(), 1, "tok")
        .await
        .expect("second");

    assert_eq!(first.id, second.id);

    let count = aud_db::scans::count_for_session(&h.pool, session.id).await.expect("count");
    assert_eq!(count, 1);

    let result = aud_db::item_results::get(&h.pool, session.id, 1).await.expect("get").expect("exists");
    assert_eq!(result.status, ItemResultStatus::Found);
}
