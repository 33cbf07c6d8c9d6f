//! Local projection of the canonical time state.
//!
//! The projection avoids hammering the time authority every second while
//! staying accurate. It holds the last fetched canonical state plus the
//! local instant it was fetched at; each tick interpolates from that anchor
//! instead of re-deriving from the local wall clock alone. No component
//! should read the local clock directly for day-number decisions -- it must
//! go through this projection.
//!
//! ## Resync triggers
//!
//! Any one of these schedules a re-fetch from the authority:
//! - the resync interval (default 60 s) elapsed since the last sync
//! - the host became visible / regained focus / came back online
//! - the projected day number differs from the last observed day number
//!
//! Resync attempts are serialized through an in-flight guard; a failed
//! attempt retains the last good state and retries at the next trigger.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::authority::TimeState;
use crate::events::Event;

/// Host-level wake signals that force an immediate resync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostSignal {
    VisibilityRegained,
    FocusRegained,
    ConnectivityRestored,
}

/// Why a resync was scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResyncReason {
    /// First sync, or the resync interval elapsed.
    Interval,
    /// A host wake signal fired.
    Host(HostSignal),
    /// The interpolated day number drifted from the last observed day.
    DayMismatch,
}

#[derive(Debug, Clone)]
struct SyncAnchor {
    /// Canonical state at the time of the fetch (server-derived).
    state: TimeState,
    /// Local instant the fetch landed.
    fetched_at: DateTime<Utc>,
}

/// Cached canonical time with local interpolation between resyncs.
#[derive(Debug, Clone)]
pub struct TimeProjection {
    anchor: Option<SyncAnchor>,
    last_observed_day: Option<u32>,
    resync_interval: Duration,
    in_flight: bool,
}

impl Default for TimeProjection {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProjection {
    pub const DEFAULT_RESYNC_INTERVAL_SECS: i64 = 60;

    pub fn new() -> Self {
        Self::with_resync_interval(Duration::seconds(Self::DEFAULT_RESYNC_INTERVAL_SECS))
    }

    pub fn with_resync_interval(resync_interval: Duration) -> Self {
        Self {
            anchor: None,
            last_observed_day: None,
            resync_interval,
            in_flight: false,
        }
    }

    /// Last authoritative state, un-interpolated.
    pub fn last_synced(&self) -> Option<&TimeState> {
        self.anchor.as_ref().map(|a| &a.state)
    }

    /// Day number last confirmed by a resync.
    pub fn last_observed_day(&self) -> Option<u32> {
        self.last_observed_day
    }

    /// Interpolated state for the current tick, or `None` before the
    /// first successful sync.
    ///
    /// Projects the server clock forward by the local delta since the
    /// fetch, then recomputes the full state from the epoch. Display-only
    /// skew within a few seconds is tolerable; the next resync corrects it.
    pub fn project(&self, local_now: DateTime<Utc>) -> Option<TimeState> {
        let anchor = self.anchor.as_ref()?;
        let delta = local_now - anchor.fetched_at;
        // A regressing local clock must not rewind the projection.
        let delta = delta.max(Duration::zero());
        Some(TimeState::at(anchor.state.now + delta))
    }

    /// Decide whether this tick should trigger a resync.
    ///
    /// Returns `None` while a resync is already in flight so attempts
    /// never overlap. Host signals take priority over the interval check.
    pub fn resync_due(
        &self,
        local_now: DateTime<Utc>,
        signal: Option<HostSignal>,
    ) -> Option<ResyncReason> {
        if self.in_flight {
            return None;
        }
        if let Some(signal) = signal {
            return Some(ResyncReason::Host(signal));
        }
        let anchor = match self.anchor.as_ref() {
            None => return Some(ResyncReason::Interval),
            Some(a) => a,
        };
        if local_now - anchor.fetched_at >= self.resync_interval {
            return Some(ResyncReason::Interval);
        }
        if let (Some(projected), Some(last)) = (self.project(local_now), self.last_observed_day) {
            if projected.day_number != last {
                return Some(ResyncReason::DayMismatch);
            }
        }
        None
    }

    /// Mark a resync as started. Returns `false` if one is already
    /// outstanding (the caller must not issue a second request).
    pub fn begin_resync(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Whether a resync request is currently outstanding.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Apply a successful resync.
    ///
    /// Always yields a [`Event::TimeSynced`], followed by a
    /// [`Event::DayRolledOver`] when the confirmed day differs from the
    /// previously observed day and the previous value was positive (the
    /// initial sync never counts as a rollover).
    pub fn apply_sync(
        &mut self,
        state: TimeState,
        local_now: DateTime<Utc>,
        reason: ResyncReason,
    ) -> Vec<Event> {
        self.in_flight = false;
        let new_day = state.day_number;
        let date_key = state.date_key.clone();
        self.anchor = Some(SyncAnchor {
            state,
            fetched_at: local_now,
        });
        let previous = self.last_observed_day.replace(new_day);

        let mut events = vec![Event::TimeSynced {
            day_number: new_day,
            date_key: date_key.clone(),
            reason,
            at: local_now,
        }];
        if let Some(prev) = previous {
            if prev > 0 && prev != new_day {
                events.push(Event::DayRolledOver {
                    previous_day: prev,
                    new_day,
                    date_key,
                    at: local_now,
                });
            }
        }
        events
    }

    /// Record a failed resync: clear the in-flight guard, keep the last
    /// good anchor untouched. The next trigger retries.
    pub fn sync_failed(&mut self) {
        self.in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epoch::system_start;

    fn state_at_day(day: u32) -> TimeState {
        TimeState::at(system_start() + Duration::days(day as i64 - 1) + Duration::hours(12))
    }

    fn sync(projection: &mut TimeProjection, state: TimeState, local: DateTime<Utc>) -> Vec<Event> {
        projection.apply_sync(state, local, ResyncReason::Interval)
    }

    fn rollover_of(events: &[Event]) -> Option<(u32, u32, String)> {
        events.iter().find_map(|e| match e {
            Event::DayRolledOver {
                previous_day,
                new_day,
                date_key,
                ..
            } => Some((*previous_day, *new_day, date_key.clone())),
            _ => None,
        })
    }

    #[test]
    fn no_projection_before_first_sync() {
        let projection = TimeProjection::new();
        assert!(projection.project(Utc::now()).is_none());
        assert_eq!(
            projection.resync_due(Utc::now(), None),
            Some(ResyncReason::Interval)
        );
    }

    #[test]
    fn interpolates_from_server_anchor() {
        let mut projection = TimeProjection::new();
        let local = Utc::now();
        sync(&mut projection, state_at_day(3), local);

        let projected = projection
            .project(local + Duration::seconds(30))
            .expect("anchored");
        assert_eq!(projected.day_number, 3);
        // Elapsed advanced by the local delta, not re-derived from local wall time.
        let base = state_at_day(3);
        assert_eq!(projected.elapsed.ms - base.elapsed.ms, 30_000);
    }

    #[test]
    fn regressing_local_clock_does_not_rewind() {
        let mut projection = TimeProjection::new();
        let local = Utc::now();
        sync(&mut projection, state_at_day(3), local);

        let projected = projection
            .project(local - Duration::seconds(45))
            .expect("anchored");
        assert_eq!(projected.elapsed.ms, state_at_day(3).elapsed.ms);
    }

    #[test]
    fn interval_elapse_triggers_resync() {
        let mut projection = TimeProjection::new();
        let local = Utc::now();
        sync(&mut projection, state_at_day(1), local);

        assert_eq!(projection.resync_due(local + Duration::seconds(30), None), None);
        assert_eq!(
            projection.resync_due(local + Duration::seconds(61), None),
            Some(ResyncReason::Interval)
        );
    }

    #[test]
    fn host_signal_triggers_resync() {
        let mut projection = TimeProjection::new();
        let local = Utc::now();
        sync(&mut projection, state_at_day(1), local);

        assert_eq!(
            projection.resync_due(local, Some(HostSignal::VisibilityRegained)),
            Some(ResyncReason::Host(HostSignal::VisibilityRegained))
        );
    }

    #[test]
    fn day_mismatch_triggers_resync() {
        let mut projection =
            TimeProjection::with_resync_interval(Duration::seconds(3600));
        let local = Utc::now();
        // Anchor 30 s before the day-2 boundary.
        let near_boundary = system_start() + Duration::hours(24) - Duration::seconds(30);
        sync(&mut projection, TimeState::at(near_boundary), local);

        // 10 s later: still day 1.
        assert_eq!(projection.resync_due(local + Duration::seconds(10), None), None);
        // 60 s later: projected day 2 != observed day 1.
        assert_eq!(
            projection.resync_due(local + Duration::seconds(60), None),
            Some(ResyncReason::DayMismatch)
        );
    }

    #[test]
    fn in_flight_guard_serializes_attempts() {
        let mut projection = TimeProjection::new();
        assert!(projection.begin_resync());
        assert!(!projection.begin_resync());
        // Nothing is due while a request is outstanding.
        assert_eq!(projection.resync_due(Utc::now(), None), None);
        assert_eq!(
            projection.resync_due(Utc::now(), Some(HostSignal::FocusRegained)),
            None
        );

        projection.sync_failed();
        assert!(projection.begin_resync());
    }

    #[test]
    fn failed_sync_retains_last_good_state() {
        let mut projection = TimeProjection::new();
        let local = Utc::now();
        sync(&mut projection, state_at_day(5), local);

        projection.begin_resync();
        projection.sync_failed();

        let projected = projection.project(local + Duration::seconds(5)).unwrap();
        assert_eq!(projected.day_number, 5);
    }

    #[test]
    fn every_sync_emits_time_synced_with_its_reason() {
        let mut projection = TimeProjection::new();
        let local = Utc::now();
        let events = projection.apply_sync(
            state_at_day(3),
            local,
            ResyncReason::Host(HostSignal::ConnectivityRestored),
        );
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            Event::TimeSynced {
                day_number: 3,
                reason: ResyncReason::Host(HostSignal::ConnectivityRestored),
                ..
            }
        ));
    }

    #[test]
    fn rollover_emitted_on_day_change() {
        let mut projection = TimeProjection::new();
        let local = Utc::now();

        // Initial sync never counts as a rollover.
        let events = sync(&mut projection, state_at_day(4), local);
        assert!(rollover_of(&events).is_none());

        let events = sync(&mut projection, state_at_day(5), local + Duration::hours(13));
        let (previous_day, new_day, date_key) = rollover_of(&events).expect("rollover");
        assert_eq!(previous_day, 4);
        assert_eq!(new_day, 5);
        assert_eq!(date_key, state_at_day(5).date_key);

        // Same day resync: sync event only.
        let events = sync(&mut projection, state_at_day(5), local + Duration::hours(14));
        assert!(rollover_of(&events).is_none());
    }

    #[test]
    fn rollover_suppressed_when_previous_day_was_zero() {
        let mut projection = TimeProjection::new();
        let local = Utc::now();
        let before_start = TimeState::at(system_start() - Duration::hours(1));
        assert_eq!(before_start.day_number, 0);

        sync(&mut projection, before_start, local);
        // 0 -> 1 is the initial unset-to-started transition, not a rollover.
        let events = sync(&mut projection, state_at_day(1), local + Duration::hours(2));
        assert!(rollover_of(&events).is_none());
    }
}
