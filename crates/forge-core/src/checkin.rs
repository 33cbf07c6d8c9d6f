//! Check-in submission flow.
//!
//! Preview and submit share the exact same scoring function, so what the
//! user previews is what gets persisted. Submission is guarded twice:
//! a client-side has-checked-in check here, and the UNIQUE(user, date)
//! constraint in storage that makes double submission impossible even
//! when two clients race.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::error::{CoreError, DatabaseError};
use crate::events::Event;
use crate::floor::FloorAction;
use crate::punishment::{self, Commitment, Punishment};
use crate::rules::{validate_pillars, Pillar, RuleSet};
use crate::scoring::{score, AnswerSheet, CheckInResult};
use crate::storage::{CheckInRecord, Database};

/// Result of a persisted submission.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub record: CheckInRecord,
    /// Drawn iff the percentage hit the punishment threshold.
    pub punishment: Option<Punishment>,
    pub reward_eligible: bool,
    /// What happened, for host layers that surface notifications.
    pub events: Vec<Event>,
}

/// Score without persisting. Never fails for a well-typed answer set.
pub fn preview(
    sheet: &AnswerSheet,
    pillars: &BTreeSet<Pillar>,
    floor_actions: &[FloorAction],
    rules: &RuleSet,
) -> CheckInResult {
    score(sheet, pillars, floor_actions, rules)
}

/// Validate, score, and persist today's check-in; draw a punishment when
/// the threshold demands one.
///
/// Fails fast with [`DatabaseError::AlreadySubmitted`] when a record
/// exists -- the caller switches to read-only presentation, never retries.
#[allow(clippy::too_many_arguments)]
pub fn submit<R: Rng + ?Sized>(
    db: &Database,
    user_id: &str,
    date_key: &str,
    day_number: u32,
    sheet: &AnswerSheet,
    pillars: &BTreeSet<Pillar>,
    floor_actions: &[FloorAction],
    rules: &RuleSet,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<SubmissionOutcome, CoreError> {
    validate_pillars(pillars)?;

    if db.has_checked_in(user_id, date_key)? {
        return Err(DatabaseError::AlreadySubmitted {
            date_key: date_key.to_string(),
        }
        .into());
    }

    let result = score(sheet, pillars, floor_actions, rules);
    let record = db.submit_check_in(user_id, date_key, day_number, pillars, &result, now)?;

    let mut events = vec![Event::CheckInSubmitted {
        date_key: record.date_key.clone(),
        percentage: record.result.percentage,
        discipline_breach: record.result.discipline_breach,
        at: now,
    }];
    let punishment = if punishment::requires_punishment(result.percentage) {
        let drawn = Punishment::draw(rng, record.id, result.percentage, date_key);
        db.insert_punishment(&drawn)?;
        events.push(Event::PunishmentDrawn {
            date_key: drawn.date_key.clone(),
            catalog_index: drawn.catalog_index,
            at: now,
        });
        Some(drawn)
    } else {
        None
    };

    Ok(SubmissionOutcome {
        reward_eligible: punishment::reward_eligible(record.result.percentage),
        record,
        punishment,
        events,
    })
}

/// Result of a missed-day enforcement pass that created records.
#[derive(Debug, Clone)]
pub struct MissedDayOutcome {
    pub record: CheckInRecord,
    pub punishment: Punishment,
    pub events: Vec<Event>,
}

/// Enforce an elapsed, unanswered day: create the zero-score record and
/// its punishment, exactly once.
///
/// Returns `Ok(None)` when any record already exists for (user, date);
/// repeat calls are safe.
pub fn enforce_missed_day<R: Rng + ?Sized>(
    db: &mut Database,
    user_id: &str,
    date_key: &str,
    day_number: u32,
    rng: &mut R,
) -> Result<Option<MissedDayOutcome>, CoreError> {
    let (record, punishment) = match db.record_missed_day(user_id, date_key, day_number, rng)? {
        Some(created) => created,
        None => return Ok(None),
    };
    let at = record.submitted_at;
    let events = vec![
        Event::MissedDayRecorded {
            date_key: record.date_key.clone(),
            at,
        },
        Event::PunishmentDrawn {
            date_key: punishment.date_key.clone(),
            catalog_index: punishment.catalog_index,
            at,
        },
    ];
    Ok(Some(MissedDayOutcome {
        record,
        punishment,
        events,
    }))
}

/// Submit punishment proof and resolve the record, irreversibly.
pub fn resolve_proof(
    db: &Database,
    id: Uuid,
    feeling: &str,
    commitment: Commitment,
    now: DateTime<Utc>,
) -> Result<(Punishment, Event), CoreError> {
    let punishment = db.resolve_punishment(id, feeling, commitment, now)?;
    let event = Event::PunishmentResolved {
        date_key: punishment.date_key.clone(),
        at: now,
    };
    Ok((punishment, event))
}
