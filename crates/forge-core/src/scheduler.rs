//! Reminder scheduler for check-in nudges.
//!
//! An owned object with an explicit start/stop lifecycle -- no
//! module-level interval handles. The caller drives it with `tick(now)`
//! against an injected clock value, which makes the cadence fully
//! testable with a fake clock.

use chrono::{DateTime, Duration, Timelike, Utc};

use crate::events::Event;
use crate::storage::RemindersConfig;

/// Emits a `ReminderDue` event when the configured cadence elapses
/// inside the allowed window of the day.
#[derive(Debug, Clone)]
pub struct ReminderScheduler {
    config: RemindersConfig,
    running: bool,
    last_fired: Option<DateTime<Utc>>,
}

impl ReminderScheduler {
    pub fn new(config: RemindersConfig) -> Self {
        Self {
            config,
            running: false,
            last_fired: None,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.last_fired = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether `at` falls inside the reminder window. Supports overnight
    /// windows (start hour above end hour).
    fn in_window(&self, at: DateTime<Utc>) -> bool {
        let hour = at.hour();
        let start = self.config.start_hour as u32;
        let end = self.config.end_hour as u32;
        if start > end {
            hour >= start || hour < end
        } else {
            hour >= start && hour < end
        }
    }

    /// Drive the scheduler. Returns a reminder event when one is due.
    /// Once the day's check-in exists there is nothing to nudge about.
    pub fn tick(&mut self, now: DateTime<Utc>, day_number: u32, checked_in: bool) -> Option<Event> {
        if checked_in || !self.running || !self.config.enabled || !self.in_window(now) {
            return None;
        }
        let cadence = Duration::minutes(self.config.cadence_min as i64);
        let due = match self.last_fired {
            None => true,
            Some(last) => now - last >= cadence,
        };
        if !due {
            return None;
        }
        self.last_fired = Some(now);
        Some(Event::ReminderDue {
            day_number,
            at: now,
        })
    }
}
