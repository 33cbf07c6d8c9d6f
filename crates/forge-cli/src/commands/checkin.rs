//! Check-in subcommands.
//!
//! The submission file is JSON: a pillar selection plus a map from
//! question id to "pass"/"fail". Anything unanswered is simply omitted
//! and scores as a failure. The date key and day number always come from
//! the time authority, never from this machine's clock.

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::Subcommand;
use serde::Deserialize;

use forge_core::floor::build_floor_actions;
use forge_core::rules::{Pillar, RuleSet};
use forge_core::scoring::{Answer, AnswerSheet};
use forge_core::storage::{Config, Database};

use super::fetch_canonical_time;

#[derive(Subcommand)]
pub enum CheckinAction {
    /// Show the questions visible for a pillar selection
    Questions {
        /// Pillar (school, startup, cash, floor); repeat for two
        #[arg(long = "pillar", required = true)]
        pillars: Vec<Pillar>,
    },
    /// Score a submission file without persisting anything
    Preview {
        /// Path to the submission JSON
        file: PathBuf,
    },
    /// Score and persist today's check-in
    Submit {
        /// Path to the submission JSON
        file: PathBuf,
    },
    /// Show the stored record for a date (defaults to today)
    Status {
        /// Date key (YYYY-MM-DD)
        date_key: Option<String>,
    },
}

/// On-disk submission shape.
#[derive(Deserialize)]
struct SubmissionFile {
    pillars: Vec<Pillar>,
    #[serde(default)]
    answers: std::collections::BTreeMap<String, Answer>,
}

pub fn run(action: CheckinAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    match action {
        CheckinAction::Questions { pillars } => {
            let selection: BTreeSet<Pillar> = pillars.into_iter().collect();
            let rules = RuleSet::current();
            let sections = rules.visible_sections(&selection);
            println!("{}", serde_json::to_string_pretty(&sections)?);
            if selection.contains(&Pillar::Floor) {
                let actions = build_floor_actions(&config.floor.actions);
                println!("{}", serde_json::to_string_pretty(&actions)?);
            }
        }
        CheckinAction::Preview { file } => {
            let (selection, sheet) = load_submission(&file)?;
            let rules = RuleSet::current();
            let floor_actions = floor_actions_for(&config, &selection);
            let result = forge_core::checkin::preview(&sheet, &selection, &floor_actions, &rules);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        CheckinAction::Submit { file } => {
            let (selection, sheet) = load_submission(&file)?;
            let state = fetch_canonical_time(&config)?;
            let date = chrono::NaiveDate::parse_from_str(&state.date_key, "%Y-%m-%d")?;
            let rules = RuleSet::for_date(date);
            let floor_actions = floor_actions_for(&config, &selection);

            let db = Database::open()?;
            let mut rng = rand::thread_rng();
            let outcome = forge_core::checkin::submit(
                &db,
                &config.user_id,
                &state.date_key,
                state.day_number,
                &sheet,
                &selection,
                &floor_actions,
                &rules,
                &mut rng,
                chrono::Utc::now(),
            )?;

            println!("{}", serde_json::to_string_pretty(&outcome.record)?);
            if let Some(punishment) = &outcome.punishment {
                println!("{}", serde_json::to_string_pretty(punishment)?);
            } else if outcome.reward_eligible {
                println!("Reward unlocked.");
            }
        }
        CheckinAction::Status { date_key } => {
            let date_key = match date_key {
                Some(key) => key,
                None => fetch_canonical_time(&config)?.date_key,
            };
            let db = Database::open()?;
            match db.get_check_in(&config.user_id, &date_key)? {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => println!("No check-in for {date_key}"),
            }
        }
    }
    Ok(())
}

fn load_submission(
    path: &std::path::Path,
) -> Result<(BTreeSet<Pillar>, AnswerSheet), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let file: SubmissionFile = serde_json::from_str(&content)?;
    let selection: BTreeSet<Pillar> = file.pillars.into_iter().collect();
    let mut sheet = AnswerSheet::new();
    for (id, answer) in file.answers {
        sheet.set(id, answer);
    }
    Ok((selection, sheet))
}

fn floor_actions_for(config: &Config, selection: &BTreeSet<Pillar>) -> Vec<forge_core::floor::FloorAction> {
    if selection.contains(&Pillar::Floor) {
        build_floor_actions(&config.floor.actions)
    } else {
        Vec::new()
    }
}
