//! Notification collaborator adapter: best-effort fan-out.
//!
//! Every call here is fire-and-forget: any transport error, timeout, or
//! non-2xx response is logged and swallowed. Never propagate a failure from
//! this module into a transaction that commits a state transition.

use std::time::Duration;

use serde_json::Value;

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct NotificationClient {
    base_url: String,
    internal_token: String,
    client: reqwest::Client,
}

impl NotificationClient {
    pub fn new(base_url: impl Into<String>, internal_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            internal_token: internal_token.into(),
            client: reqwest::Client::builder().timeout(TIMEOUT).build().expect("reqwest client"),
        }
    }

    /// `POST /internal/notifications`, authenticated by a shared secret
    /// header rather than the caller's bearer token. Success is `2xx`;
    /// everything else is logged at `warn` and discarded.
    pub async fn notify_best_effort(&self, payload: Value) {
        let result = self
            .client
            .post(format!("{}/internal/notifications", self.base_url))
            .header("X-Internal-Token", &self.internal_token)
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "notification collaborator returned non-2xx, ignoring");
            }
            Err(err) => {
                tracing::warn!(error = %err, "notification collaborator unreachable, ignoring");
            }
        }
    }
}
