//! A scan whose barcode the inventory collaborator cannot resolve.
//!
//! GREEN when: a scan carrying only a barcode that the inventory
//! collaborator cannot resolve (404 on `/items/resolve`) is still accepted
//! with `item_id=null`, the incremental classifier records
//! `unknown_barcode`, and canonical rebuild on close additionally reports
//! the untouched expected item as `missing`.

mod common;

use aud_schemas::DiscrepancyType;
use serde_json::json;

#[tokio::test]
async fn unknown_barcode_and_resulting_missing() {
    let h = common::setup().await;
    let location_id = 5;

    common::stubs::stub_items_by_room(
        &h.stubs.inventory,
        location_id,
        json!([{ "id": 7, "location_id": 5, "responsible_id": null, "barcode_id": null }]),
    )
    .await;
    common::stubs::stub_resolve_by_barcode(&h.stubs.inventory, None).await;

    let session = common::new_session(&h, location_id).await;
    aud_service::snapshot::start_session(&h.pool, &h.inventory, session.id, 1, "tok").await.expect("start");

    let scan = aud_service::scan::create_scan(
        &h.pool,
        &h.inventory,
        session.id,
        aud_service::scan::ScanPayload {
            item_id: None,
            barcode_value: Some("4607177123451".to_string()),
            found_location_id: 5,
            notes: None,
            photo_url: None,
            client_scan_id: "x".to_string(),
            extra: None,
        },
        1,
        "tok",
    )
    .await
    .expect("scan");
    assert_eq!(scan.item_id, None);

    let incremental = aud_db::discrepancies::list_for_session(&h.pool, session.id).await.expect("list");
    assert_eq!(incremental.len(), 1);
    assert_eq!(incremental[0].discrepancy_type, DiscrepancyType::UnknownBarcode);
    assert_eq!(incremental[0].barcode_value.as_deref(), Some("4607177123451"));

    aud_service::close::close_session(&h.pool, session.id, 1).await.expect("close");

    let mut rebuilt = aud_db::discrepancies::list_for_session(&h.pool, session.id).await.expect("list");
    rebuilt.sort_by_key(|d| d.discrepancy_type.as_str().to_string());
    assert_eq!(rebuilt.len(), 2);
    assert!(rebuilt.iter().any(|d| d.discrepancy_type == DiscrepancyType::UnknownBarcode
        && d.barcode_value.as_deref() == Some("4607177123451")));
    assert!(rebuilt.iter().any(|d| d.discrepancy_type == DiscrepancyType::Missing && d.item_id == Some(7)));
}
