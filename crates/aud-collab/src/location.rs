//! Location collaborator adapter: room access check.

use std::time::Duration;

use crate::error::{map_error_status, CollabError};

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct LocationClient {
    base_url: String,
    client: reqwest::Client,
}

impl LocationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::builder().timeout(TIMEOUT).build().expect("reqwest client"),
        }
    }

    /// `GET /rooms/my/{id}` — 200 iff the caller may act on that room.
    pub async fn assert_room_access(&self, token: &str, room_id: i64) -> Result<(), CollabError> {
        let resp = self
            .client
            .get(format!("{}/rooms/my/{room_id}", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(map_error_status(resp.status()))
        }
    }
}
