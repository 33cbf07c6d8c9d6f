//! Day-timer-check endpoint client.
//!
//! Invoked once per page load / timer check. The server resolves the
//! canonical day from the same fixed epoch, creates today's execution
//! window if absent, and -- if yesterday's window elapsed unanswered --
//! atomically writes the missed-day record plus its punishment. The call
//! is idempotent and safe to repeat.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::RemoteError;

/// Wire shape of the day-timer-check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCheckResponse {
    pub message: String,
    /// The execution window record; opaque to the core.
    pub timer: serde_json::Value,
    /// Present only when a new window was created.
    #[serde(default)]
    pub current_day_number: Option<u32>,
    pub timer_created: bool,
}

/// Bearer-token client for the day-timer-check endpoint.
pub struct DayCheckClient {
    client: reqwest::Client,
    url: Url,
    token: String,
}

impl DayCheckClient {
    pub fn new(url: &str, token: impl Into<String>) -> Result<Self, RemoteError> {
        Ok(Self {
            client: reqwest::Client::new(),
            url: Url::parse(url)?,
            token: token.into(),
        })
    }

    /// Run the day check. Aborts before the network call when no token is
    /// configured; nothing partial is ever written.
    pub async fn check(&self) -> Result<DayCheckResponse, RemoteError> {
        if self.token.is_empty() {
            return Err(RemoteError::NotAuthenticated);
        }
        let response = self
            .client
            .post(self.url.clone())
            .bearer_auth(&self.token)
            .send()
            .await?;

        match response.status().as_u16() {
            401 => Err(RemoteError::NotAuthenticated),
            500 => {
                let body = response.text().await.unwrap_or_default();
                // The client must not fabricate a local fallback day
                // number when the server cannot resolve one.
                Err(RemoteError::ServerConfiguration(if body.is_empty() {
                    "day-check failed".into()
                } else {
                    body
                }))
            }
            status if !(200..300).contains(&status) => Err(RemoteError::UnexpectedStatus {
                endpoint: self.url.to_string(),
                status,
            }),
            _ => response
                .json()
                .await
                .map_err(|e| RemoteError::Decode(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn existing_window_parses() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/day-check")
            .match_header("authorization", "Bearer token-1")
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "message": "Timer already exists",
                    "timer": {"dateKey": "2026-02-03"},
                    "timerCreated": false
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client =
            DayCheckClient::new(&format!("{}/api/day-check", server.url()), "token-1").unwrap();
        let response = client.check().await.unwrap();
        assert!(!response.timer_created);
        assert!(response.current_day_number.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn created_window_carries_day_number() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/day-check")
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "message": "Timer created",
                    "timer": {"dateKey": "2026-02-04"},
                    "currentDayNumber": 4,
                    "timerCreated": true
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client =
            DayCheckClient::new(&format!("{}/api/day-check", server.url()), "token-1").unwrap();
        let response = client.check().await.unwrap();
        assert!(response.timer_created);
        assert_eq!(response.current_day_number, Some(4));
    }

    #[tokio::test]
    async fn missing_token_aborts_before_network() {
        // No mock registered: a request would fail the test server-side.
        let client = DayCheckClient::new("http://127.0.0.1:1/api/day-check", "").unwrap();
        let err = client.check().await.unwrap_err();
        assert!(matches!(err, RemoteError::NotAuthenticated));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_not_authenticated() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/day-check")
            .with_status(401)
            .create_async()
            .await;

        let client =
            DayCheckClient::new(&format!("{}/api/day-check", server.url()), "expired").unwrap();
        let err = client.check().await.unwrap_err();
        assert!(matches!(err, RemoteError::NotAuthenticated));
    }

    #[tokio::test]
    async fn server_error_maps_to_configuration_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/day-check")
            .with_status(500)
            .with_body("System epoch not configured")
            .create_async()
            .await;

        let client =
            DayCheckClient::new(&format!("{}/api/day-check", server.url()), "token-1").unwrap();
        let err = client.check().await.unwrap_err();
        assert!(matches!(
            err,
            RemoteError::ServerConfiguration(msg) if msg.contains("epoch")
        ));
    }
}
