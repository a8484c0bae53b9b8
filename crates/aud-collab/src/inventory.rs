//! Inventory collaborator adapter: item lookup, barcode resolution, bulk move.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{map_error_status, CollabError};

const READ_TIMEOUT: Duration = Duration::from_secs(10);
const BULK_MOVE_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Deserialize)]
pub struct InventoryItem {
    pub id: i64,
    pub location_id: Option<i64>,
    pub responsible_id: Option<i64>,
    pub barcode_id: Option<i64>,
}

/// Mirrors the inventory collaborator's item shape but leaves `id` untyped:
/// `GET /items/room/{id}` can return a row with a non-integer or missing id,
/// and the caller (snapshot start) must skip just that item rather than fail
/// the whole room listing.
#[derive(Debug, Clone, Deserialize)]
struct RawInventoryItem {
    id: serde_json::Value,
    location_id: Option<i64>,
    responsible_id: Option<i64>,
    barcode_id: Option<i64>,
}

#[derive(Clone)]
pub struct InventoryClient {
    base_url: String,
    client: reqwest::Client,
}

impl InventoryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), client: reqwest::Client::new() }
    }

    /// `GET /items/room/{id}` — the room's current item set, used to seed an
    /// expected snapshot. An item whose `id` is not an integer is skipped
    /// rather than failing the whole room listing (spec.md §4.2 step 3).
    pub async fn list_items_by_room(&self, token: &str, room_id: i64) -> Result<Vec<InventoryItem>, CollabError> {
        let resp = self
            .client
            .get(format!("{}/items/room/{room_id}", self.base_url))
            .bearer_auth(token)
            .timeout(READ_TIMEOUT)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(map_error_status(resp.status()));
        }
        let raw: Vec<RawInventoryItem> = resp.json().await.map_err(|e| CollabError::Upstream(e.to_string()))?;
        Ok(raw
            .into_iter()
            .filter_map(|r| {
                let id = r.id.as_i64()?;
                Some(InventoryItem {
                    id,
                    location_id: r.location_id,
                    responsible_id: r.responsible_id,
                    barcode_id: r.barcode_id,
                })
            })
            .collect())
    }

    /// `POST /items/resolve {barcode_value}` — `None` on 404 (a barcode that
    /// doesn't resolve is a legitimate outcome, not an error: it feeds the
    /// classifier as `unknown_barcode`).
    pub async fn resolve_by_barcode(&self, token: &str, barcode_value: &str) -> Result<Option<InventoryItem>, CollabError> {
        let resp = self
            .client
            .post(format!("{}/items/resolve", self.base_url))
            .bearer_auth(token)
            .timeout(READ_TIMEOUT)
            .json(&json!({ "barcode_value": barcode_value }))
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(map_error_status(resp.status()));
        }
        resp.json().await.map(Some).map_err(|e| CollabError::Upstream(e.to_string()))
    }

    /// `POST /items/bulk-move {item_ids, location_id, responsible_id}` —
    /// applies atomically on the inventory side (row-level `FOR UPDATE`).
    /// `responsible_id` is tri-state: omitted when `responsible.is_set` is
    /// false, present (possibly `null`) otherwise.
    pub async fn bulk_move(
        &self,
        token: &str,
        item_ids: &[i64],
        location_id: i64,
        responsible: &BulkMoveResponsible,
    ) -> Result<(), CollabError> {
        let mut body = serde_json::Map::new();
        body.insert("item_ids".to_string(), json!(item_ids));
        body.insert("location_id".to_string(), json!(location_id));
        if responsible.is_set {
            body.insert("responsible_id".to_string(), json!(responsible.value));
        }

        let resp = self
            .client
            .post(format!("{}/items/bulk-move", self.base_url))
            .bearer_auth(token)
            .timeout(BULK_MOVE_TIMEOUT)
            .json(&serde_json::Value::Object(body))
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(map_error_status(resp.status()))
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BulkMoveResponsible {
    pub is_set: bool,
    pub value: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn list_items_by_room_skips_non_integer_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items/room/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "location_id": 10, "responsible_id": null, "barcode_id": null },
                { "id": "not-a-number", "location_id": 10, "responsible_id": null, "barcode_id": null },
                { "id": null, "location_id": 10, "responsible_id": null, "barcode_id": null },
                { "id": 3, "location_id": 11, "responsible_id": 7, "barcode_id": 99 },
            ])))
            .mount(&server)
            .await;

        let client = InventoryClient::new(server.uri());
        let items = client.list_items_by_room("tok", 5).await.expect("list");
        assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 3]);
    }
}
