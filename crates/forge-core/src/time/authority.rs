//! Canonical time computation against the fixed system epoch.
//!
//! `TimeState` is a pure function of (epoch, now). It is recomputed on every
//! tick and never persisted as authoritative -- the server recomputes the
//! same values independently on each request, so any client holding a stale
//! or skewed clock converges as soon as it resyncs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::epoch;

/// A duration broken into display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub ms: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Breakdown {
    /// Split a millisecond count into day/hour/minute/second units.
    /// Negative inputs clamp to zero.
    pub fn from_ms(ms: i64) -> Self {
        let ms = ms.max(0);
        let total_secs = ms / 1000;
        Self {
            ms,
            days: total_secs / 86_400,
            hours: (total_secs % 86_400) / 3600,
            minutes: (total_secs % 3600) / 60,
            seconds: total_secs % 60,
        }
    }
}

/// Canonical time state derived from the epoch and a single instant.
///
/// A value of this type carries no authority by itself; it records the
/// instant it was derived from so the projection layer can interpolate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeState {
    /// The instant this state was computed from (server time when fetched
    /// from the authority endpoint, local time when projected).
    pub now: DateTime<Utc>,
    pub elapsed: Breakdown,
    pub remaining: Breakdown,
    /// 0.0 ..= 100.0, clamped even under clock anomalies.
    pub percent_complete: f64,
    /// 1-indexed execution day, clamped to [0, TOTAL_DAYS]; 0 = not started.
    pub day_number: u32,
    pub total_days: u32,
    /// UTC calendar date key, `YYYY-MM-DD`.
    pub date_key: String,
    pub is_before_start: bool,
    pub is_after_end: bool,
    pub is_active: bool,
}

impl TimeState {
    /// Compute the canonical state for `now` against the fixed epoch.
    ///
    /// Idempotent and cheap; safe to call at high frequency.
    pub fn at(now: DateTime<Utc>) -> Self {
        let start = epoch::system_start();
        let end = epoch::system_end();
        let total_ms = epoch::total_duration_ms();

        let raw_elapsed = (now - start).num_milliseconds();
        let elapsed_ms = raw_elapsed.clamp(0, total_ms);
        let remaining_ms = total_ms - elapsed_ms;

        let is_before_start = now < start;
        let is_after_end = now > end;

        let day_number = if is_before_start {
            0
        } else if is_after_end {
            epoch::TOTAL_DAYS
        } else {
            // Day 1 covers [start, start + 24h).
            let day = (elapsed_ms / 86_400_000) as u32 + 1;
            day.min(epoch::TOTAL_DAYS)
        };

        let percent_complete = if total_ms == 0 {
            0.0
        } else {
            (elapsed_ms as f64 / total_ms as f64 * 100.0).clamp(0.0, 100.0)
        };

        Self {
            now,
            elapsed: Breakdown::from_ms(elapsed_ms),
            remaining: Breakdown::from_ms(remaining_ms),
            percent_complete,
            day_number,
            total_days: epoch::TOTAL_DAYS,
            date_key: date_key(now),
            is_before_start,
            is_after_end,
            is_active: !is_before_start && !is_after_end,
        }
    }
}

/// Format an instant as its UTC `YYYY-MM-DD` date key.
pub fn date_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::epoch::{system_end, system_start, TOTAL_DAYS};

    #[test]
    fn before_start_clamps_to_day_zero() {
        let state = TimeState::at(system_start() - Duration::hours(5));
        assert_eq!(state.day_number, 0);
        assert!(state.is_before_start);
        assert!(!state.is_active);
        assert_eq!(state.elapsed.ms, 0);
        assert_eq!(state.remaining.ms, crate::epoch::total_duration_ms());
        assert_eq!(state.percent_complete, 0.0);
    }

    #[test]
    fn after_end_clamps_to_total_days() {
        let state = TimeState::at(system_end() + Duration::days(10));
        assert_eq!(state.day_number, TOTAL_DAYS);
        assert!(state.is_after_end);
        assert_eq!(state.percent_complete, 100.0);
        assert_eq!(state.remaining.ms, 0);
    }

    #[test]
    fn first_instant_is_day_one() {
        let state = TimeState::at(system_start());
        assert_eq!(state.day_number, 1);
        assert!(state.is_active);
        assert_eq!(state.date_key, "2026-02-01");
    }

    #[test]
    fn day_advances_at_24h_boundary() {
        let just_before = system_start() + Duration::hours(24) - Duration::seconds(1);
        let just_after = system_start() + Duration::hours(24);
        assert_eq!(TimeState::at(just_before).day_number, 1);
        assert_eq!(TimeState::at(just_after).day_number, 2);
    }

    #[test]
    fn breakdown_splits_units() {
        // 2 days, 3 hours, 4 minutes, 5 seconds
        let ms = ((2 * 86_400 + 3 * 3600 + 4 * 60 + 5) * 1000) as i64;
        let b = Breakdown::from_ms(ms);
        assert_eq!(b.days, 2);
        assert_eq!(b.hours, 3);
        assert_eq!(b.minutes, 4);
        assert_eq!(b.seconds, 5);
    }

    #[test]
    fn breakdown_clamps_negative() {
        let b = Breakdown::from_ms(-500);
        assert_eq!(b.ms, 0);
        assert_eq!(b.seconds, 0);
    }

    #[test]
    fn midpoint_percent_is_half() {
        let mid = system_start() + Duration::milliseconds(crate::epoch::total_duration_ms() / 2);
        let state = TimeState::at(mid);
        assert!((state.percent_complete - 50.0).abs() < 0.01);
    }
}
