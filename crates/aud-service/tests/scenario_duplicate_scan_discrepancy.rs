//! The same expected item scanned twice under different client scan ids.
//!
//! GREEN when: the same expected item is scanned twice at its expected
//! location under two different `client_scan_id`s. The item result reaches
//! `found_in_place` and canonical rebuild emits one `duplicate` discrepancy
//! carrying `resolution_payload.count=2`.

mod common;

use aud_schemas::{DiscrepancyType, ItemResultStatus};
use serde_json::json;

#[tokio::test]
async fn duplicate_scan_of_same_item() {
    let h = common::setup().await;
    let location_id = 2;

    common::stubs::stub_items_by_room(
        &h.stubs.inventory,
        location_id,
        json!([{ "id": 3, "location_id": 2, "responsible_id": null, "barcode_id": null }]),
    )
    .await;

    let session = common::new_session(&h, location_id).await;
    aud_service::snapshot::start_session(&h.pool, &h.inventory, session.id, 1, "tok").await.expect("start");

    for client_scan_id in ["p", "q"] {
        aud_service::scan::create_scan(
            &h.pool,
            &h.inventory,
            session.id,
            aud_service::scan::ScanPayload {
                item_id: Some(3),
                barcode_value: None,
                found_location_id: 2,
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

    let result = aud_db::item_results::get(&h.pool, session.id, 3).await.expect("get result").expect("exists");
    assert_eq!(result.status, ItemResultStatus::FoundInPlace);

    aud_service::close::close_session(&h.pool, session.id, 1).await.expect("close");

    let discrepancies = aud_db::discrepancies::list_for_session(&h.pool, session.id).await.expect("list");
    assert_eq!(discrepancies.len(), 1);
    let dup = &discrepancies[0];
    assert_eq!(dup.discrepancy_type, DiscrepancyType::Duplicate);
    assert_eq!(dup.item_id, Some(3));
    let payload = dup.resolution_payload.as_ref().expect("count payload");
    assert_eq!(payload.get("count").and_then(|v| v.as_i64()), Some(2));
}
