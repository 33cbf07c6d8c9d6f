//! End-to-end check-in flow against an on-disk database.
//!
//! Covers the full day lifecycle: preview, submit, conflict on
//! resubmission, punishment draw and proof, missed-day enforcement, and
//! history aggregation.

use std::collections::BTreeSet;

use chrono::Utc;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use tempfile::TempDir;

use forge_core::checkin::{enforce_missed_day, preview, resolve_proof, submit};
use forge_core::error::{CoreError, DatabaseError};
use forge_core::punishment::{Commitment, Stage};
use forge_core::rules::{Pillar, RuleSet, ScoringLogic};
use forge_core::scoring::{Answer, AnswerSheet};
use forge_core::stats;
use forge_core::storage::Database;

fn open_db(dir: &TempDir) -> Database {
    Database::open_at(&dir.path().join("forge.db")).expect("open database")
}

fn pillars(list: &[Pillar]) -> BTreeSet<Pillar> {
    list.iter().copied().collect()
}

/// Answer everything correctly except `leave_unset` questions from
/// section H.
fn mostly_perfect_sheet(rules: &RuleSet, sel: &BTreeSet<Pillar>, leave_unset: usize) -> AnswerSheet {
    let mut sheet = AnswerSheet::new();
    for section in rules.visible_sections(sel) {
        for q in &section.questions {
            match section.scoring_logic {
                ScoringLogic::Inverted => sheet.set(q.id.clone(), Answer::Fail),
                _ => sheet.set(q.id.clone(), Answer::Pass),
            }
        }
    }
    for i in 0..leave_unset {
        sheet.set(format!("h{}", i + 1), Answer::Unset);
    }
    sheet
}

#[test]
fn submitted_record_is_immutable_across_reopen() {
    let dir = TempDir::new().unwrap();
    let rules = RuleSet::current();
    let sel = pillars(&[Pillar::Cash]);
    let sheet = mostly_perfect_sheet(&rules, &sel, 0);
    let mut rng = Pcg64::seed_from_u64(1);

    let outcome = {
        let db = open_db(&dir);
        submit(
            &db, "user-1", "2026-02-10", 10, &sheet, &sel, &[], &rules, &mut rng,
            Utc::now(),
        )
        .unwrap()
    };
    assert_eq!(outcome.record.result.percentage, 100);
    assert!(outcome.punishment.is_none());

    // Reopen: the record is there, byte-identical, and resubmission conflicts.
    let db = open_db(&dir);
    let stored = db.get_check_in("user-1", "2026-02-10").unwrap().unwrap();
    assert_eq!(stored, outcome.record);

    let err = submit(
        &db, "user-1", "2026-02-10", 10, &sheet, &sel, &[], &rules, &mut rng,
        Utc::now(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Database(DatabaseError::AlreadySubmitted { .. })
    ));
    assert_eq!(
        db.get_check_in("user-1", "2026-02-10").unwrap().unwrap(),
        stored
    );
}

#[test]
fn threshold_day_draws_punishment_and_proof_resolves_it() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);
    let rules = RuleSet::current();
    let sel = pillars(&[Pillar::Cash]);
    let mut rng = Pcg64::seed_from_u64(2);

    // Leave enough of H unset to land at or under the threshold:
    // full pass is 94/94; dropping all of H gives 74/94 = 79%.
    let sheet = mostly_perfect_sheet(&rules, &sel, 5);
    let previewed = preview(&sheet, &sel, &[], &rules);
    assert!(previewed.percentage <= 85);

    let outcome = submit(
        &db, "user-1", "2026-02-10", 10, &sheet, &sel, &[], &rules, &mut rng,
        Utc::now(),
    )
    .unwrap();
    // What was previewed is exactly what was persisted.
    assert_eq!(outcome.record.result, previewed);

    let punishment = outcome.punishment.expect("threshold day draws");
    assert_eq!(punishment.stage, Stage::Revealed);

    // Re-presented until resolved.
    assert_eq!(db.unresolved_punishments("user-1").unwrap().len(), 1);

    let acked = db.acknowledge_punishment(punishment.id).unwrap();
    assert_eq!(acked.stage, Stage::ProofPending);
    resolve_proof(
        &db,
        punishment.id,
        "Deserved. Tomorrow is different.",
        Commitment::Yes,
        Utc::now(),
    )
    .unwrap();
    assert!(db.unresolved_punishments("user-1").unwrap().is_empty());

    // Resolution is terminal.
    let err = db
        .resolve_punishment(punishment.id, "edit attempt", Commitment::No, Utc::now())
        .unwrap_err();
    assert!(matches!(err, DatabaseError::PunishmentResolved { .. }));
}

#[test]
fn missed_day_flows_into_history_like_any_low_score() {
    let dir = TempDir::new().unwrap();
    let mut db = open_db(&dir);
    let rules = RuleSet::current();
    let sel = pillars(&[Pillar::Cash]);
    let mut rng = Pcg64::seed_from_u64(3);

    let sheet = mostly_perfect_sheet(&rules, &sel, 0);
    submit(&db, "user-1", "2026-02-10", 10, &sheet, &sel, &[], &rules, &mut rng, Utc::now())
        .unwrap();

    // Server-side enforcement for the elapsed, unanswered next day.
    let outcome = enforce_missed_day(&mut db, "user-1", "2026-02-11", 11, &mut rng)
        .unwrap()
        .expect("created once");
    assert!(outcome.record.is_missed);
    assert_eq!(outcome.record.result.percentage, 0);
    assert!(outcome.record.result.discipline_breach);
    assert_eq!(outcome.punishment.percentage, 0);

    // Repeat call: exactly-once semantics.
    assert!(enforce_missed_day(&mut db, "user-1", "2026-02-11", 11, &mut rng)
        .unwrap()
        .is_none());

    let history = db.list_check_ins("user-1").unwrap();
    let aggregated = stats::compute(&history);
    assert_eq!(aggregated.total_days, 2);
    assert_eq!(aggregated.missed_days, 1);
    assert_eq!(aggregated.breach_days, 1);
    assert_eq!(aggregated.reward_days, 1);
    assert_eq!(aggregated.current_streak, 0);
}
