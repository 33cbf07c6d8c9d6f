use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::ResyncReason;

/// Every notable state change in the system produces an Event.
/// The GUI polls for events; schedulers and loggers subscribe to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A resync against the time authority landed.
    TimeSynced {
        day_number: u32,
        date_key: String,
        reason: ResyncReason,
        at: DateTime<Utc>,
    },
    /// A resync confirmed a new execution day. Consumers re-fetch rule
    /// state and today's check-in status.
    DayRolledOver {
        previous_day: u32,
        new_day: u32,
        date_key: String,
        at: DateTime<Utc>,
    },
    /// A check-in was scored and persisted.
    CheckInSubmitted {
        date_key: String,
        percentage: u32,
        discipline_breach: bool,
        at: DateTime<Utc>,
    },
    /// The server recorded a zero-score missed day.
    MissedDayRecorded {
        date_key: String,
        at: DateTime<Utc>,
    },
    /// A punishment was drawn for a qualifying day.
    PunishmentDrawn {
        date_key: String,
        catalog_index: usize,
        at: DateTime<Utc>,
    },
    /// Punishment proof was recorded; the record is now immutable.
    PunishmentResolved {
        date_key: String,
        at: DateTime<Utc>,
    },
    /// The reminder scheduler says a check-in nudge is due.
    ReminderDue {
        day_number: u32,
        at: DateTime<Utc>,
    },
}
