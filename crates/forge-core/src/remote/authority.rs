//! Time authority endpoint client.
//!
//! The endpoint returns the server's clock plus every derived quantity.
//! The client takes those values verbatim -- it never recomputes the day
//! number from the local clock. On failure the caller keeps interpolating
//! from the last good state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::RemoteError;
use crate::time::{Breakdown, TimeState};
use crate::epoch;

/// Wire shape of the time authority response (§ camelCase JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTimeResponse {
    pub server_time: DateTime<Utc>,
    pub system_start: DateTime<Utc>,
    pub system_end: DateTime<Utc>,
    pub elapsed: WireBreakdown,
    pub remaining: WireBreakdown,
    pub day_number: u32,
    pub total_days: u32,
    pub percent_complete: f64,
    pub current_date_key: String,
    pub is_before_start: bool,
    pub is_after_end: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBreakdown {
    pub ms: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl From<WireBreakdown> for Breakdown {
    fn from(w: WireBreakdown) -> Self {
        Breakdown {
            ms: w.ms,
            days: w.days,
            hours: w.hours,
            minutes: w.minutes,
            seconds: w.seconds,
        }
    }
}

impl CanonicalTimeResponse {
    /// Adopt the server's answer as the authoritative state.
    ///
    /// Rejects responses whose epoch constants disagree with the baked-in
    /// pair: mismatched constants would silently corrupt every day-number
    /// decision downstream.
    pub fn into_state(self) -> Result<TimeState, RemoteError> {
        if self.system_start != epoch::system_start() || self.system_end != epoch::system_end() {
            return Err(RemoteError::Decode(format!(
                "server epoch {}..{} does not match client epoch",
                self.system_start, self.system_end
            )));
        }
        Ok(TimeState {
            now: self.server_time,
            elapsed: self.elapsed.into(),
            remaining: self.remaining.into(),
            percent_complete: self.percent_complete.clamp(0.0, 100.0),
            day_number: self.day_number.min(self.total_days),
            total_days: self.total_days,
            date_key: self.current_date_key,
            is_before_start: self.is_before_start,
            is_after_end: self.is_after_end,
            is_active: self.is_active,
        })
    }
}

/// HTTP client for the time authority endpoint. Safe to poll at least
/// once per minute per active client.
pub struct TimeAuthorityClient {
    client: reqwest::Client,
    url: Url,
}

impl TimeAuthorityClient {
    pub fn new(url: &str) -> Result<Self, RemoteError> {
        Ok(Self {
            client: reqwest::Client::new(),
            url: Url::parse(url)?,
        })
    }

    /// Fetch the canonical time state.
    pub async fn fetch(&self) -> Result<TimeState, RemoteError> {
        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::UnexpectedStatus {
                endpoint: self.url.to_string(),
                status: status.as_u16(),
            });
        }
        let body: CanonicalTimeResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        body.into_state()
    }
}
