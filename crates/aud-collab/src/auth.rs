//! Auth collaborator adapter: `GET /auth/me`.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{map_error_status, CollabError};

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub roles: Vec<String>,
}

#[derive(Clone)]
pub struct AuthClient {
    base_url: String,
    client: reqwest::Client,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::builder().timeout(TIMEOUT).build().expect("reqwest client"),
        }
    }

    /// Validates `token` against the auth collaborator. A non-2xx response
    /// (including 401) maps to `Forbidden`/`Unavailable` as appropriate — the
    /// daemon boundary turns any failure here into `unauthorised`.
    pub async fn me(&self, token: &str) -> Result<AuthUser, CollabError> {
        let resp = self
            .client
            .get(format!("{}/auth/me", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(map_error_status(resp.status()));
        }
        resp.json::<AuthUser>().await.map_err(|e| CollabError::Upstream(e.to_string()))
    }
}
