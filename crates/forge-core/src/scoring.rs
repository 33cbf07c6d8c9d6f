//! Check-in scoring engine.
//!
//! `score` is a pure, deterministic function with no I/O: the live preview
//! and the final submission call the exact same code path, so what the user
//! previews is byte-for-byte what gets persisted. It never fails for
//! well-typed input -- a missing answer is valid input meaning "not
//! completed", not an error.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::floor::{floor_total, FloorAction};
use crate::rules::{Pillar, RuleSet, ScoringLogic, Section};

/// Tier values for percentage-tier sections: >=75% completion earns 15,
/// >=50% earns 10, anything lower earns 0. Full completion earns the
/// section max.
const TIER_75_POINTS: u32 = 15;
const TIER_50_POINTS: u32 = 10;

/// Section code used for the synthesized floor section.
pub const FLOOR_SECTION_CODE: &str = "L";
const FLOOR_SECTION_TITLE: &str = "The Floor";

/// Explicit tri-state answer. `Unset` (unanswered) always scores as a
/// failure, never as a free pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    #[default]
    Unset,
    Pass,
    Fail,
}

/// Mapping from question id (including floor-action ids) to answer.
///
/// Uses direct setters rather than a cycling toggle so a state can never
/// be skipped by calling twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSheet {
    answers: BTreeMap<String, Answer>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, question_id: impl Into<String>, answer: Answer) {
        match answer {
            Answer::Unset => {
                self.answers.remove(&question_id.into());
            }
            other => {
                self.answers.insert(question_id.into(), other);
            }
        }
    }

    pub fn set_pass(&mut self, question_id: impl Into<String>) {
        self.set(question_id, Answer::Pass);
    }

    pub fn set_fail(&mut self, question_id: impl Into<String>) {
        self.set(question_id, Answer::Fail);
    }

    pub fn clear(&mut self, question_id: &str) {
        self.answers.remove(question_id);
    }

    /// Missing entries read back as `Unset`.
    pub fn get(&self, question_id: &str) -> Answer {
        self.answers.get(question_id).copied().unwrap_or_default()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }
}

/// Severity of a failed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Standard,
    Critical,
}

/// One question that did not earn its points, kept for transparency in
/// the persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedItem {
    pub section_code: String,
    pub section_title: String,
    pub question_id: String,
    pub question_text: String,
    pub points_lost: u32,
    pub severity: Severity,
}

/// Per-section score line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionScore {
    pub code: String,
    pub title: String,
    pub earned: u32,
    pub max: u32,
}

/// The full, immutable output of a scoring pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInResult {
    pub total_score: u32,
    pub max_score: u32,
    /// Rounded to the nearest integer (half up); 0 when `max_score` is 0.
    pub percentage: u32,
    pub discipline_breach: bool,
    /// Ordered by section iteration order, not severity.
    pub failed_items: Vec<FailedItem>,
    pub sections: Vec<SectionScore>,
    /// Rule-set version the result was computed against.
    pub rule_version: u32,
}

/// Score an answer set against the rubric.
///
/// Pure and idempotent: identical inputs yield identical output.
pub fn score(
    sheet: &AnswerSheet,
    pillars: &BTreeSet<Pillar>,
    floor_actions: &[FloorAction],
    rules: &RuleSet,
) -> CheckInResult {
    let mut total_score = 0u32;
    let mut discipline_breach = false;
    let mut failed_items = Vec::new();
    let mut sections = Vec::new();

    for section in rules.visible_sections(pillars) {
        let earned = match section.scoring_logic {
            ScoringLogic::Standard => {
                score_standard(section, sheet, &mut failed_items, &mut discipline_breach)
            }
            ScoringLogic::PercentageTier => score_tiered(section, sheet, &mut failed_items),
            ScoringLogic::Inverted => score_inverted(section, sheet, &mut failed_items),
        };
        total_score += earned;
        sections.push(SectionScore {
            code: section.code.clone(),
            title: section.title.clone(),
            earned,
            max: section.max_points,
        });
    }

    let floor_points = floor_total(floor_actions);
    if pillars.contains(&Pillar::Floor) && !floor_actions.is_empty() {
        let mut earned = 0u32;
        for action in floor_actions {
            if sheet.get(&action.id) == Answer::Pass {
                earned += action.points;
            } else {
                failed_items.push(FailedItem {
                    section_code: FLOOR_SECTION_CODE.into(),
                    section_title: FLOOR_SECTION_TITLE.into(),
                    question_id: action.id.clone(),
                    question_text: action.text.clone(),
                    points_lost: action.points,
                    severity: Severity::Standard,
                });
            }
        }
        total_score += earned;
        sections.push(SectionScore {
            code: FLOOR_SECTION_CODE.into(),
            title: FLOOR_SECTION_TITLE.into(),
            earned,
            max: floor_points,
        });
    }

    let max_score = rules.total_possible_points(pillars, floor_points);
    let percentage = percentage_of(total_score, max_score);

    CheckInResult {
        total_score,
        max_score,
        percentage,
        discipline_breach,
        failed_items,
        sections,
        rule_version: rules.version,
    }
}

/// Rounded percentage, defined as 0 when the denominator is 0.
pub fn percentage_of(earned: u32, max: u32) -> u32 {
    if max == 0 {
        return 0;
    }
    (earned as f64 / max as f64 * 100.0).round() as u32
}

fn score_standard(
    section: &Section,
    sheet: &AnswerSheet,
    failed_items: &mut Vec<FailedItem>,
    discipline_breach: &mut bool,
) -> u32 {
    let mut earned = 0u32;
    for question in &section.questions {
        match sheet.get(&question.id) {
            Answer::Pass => earned += question.points,
            answer => {
                // An explicit fail in a critical section is a discipline
                // breach; a merely unanswered question is not.
                if answer == Answer::Fail && section.is_critical {
                    *discipline_breach = true;
                }
                failed_items.push(failed(section, question, section_severity(section)));
            }
        }
    }
    earned
}

fn score_tiered(section: &Section, sheet: &AnswerSheet, failed_items: &mut Vec<FailedItem>) -> u32 {
    let total = section.questions.len();
    let mut passed = 0usize;
    for question in &section.questions {
        if sheet.get(&question.id) == Answer::Pass {
            passed += 1;
        } else {
            // Listed for transparency even though the section score is
            // tier-based rather than additive.
            failed_items.push(failed(section, question, Severity::Standard));
        }
    }
    if total == 0 {
        return 0;
    }
    if passed == total {
        section.max_points
    } else {
        let pct = passed as f64 / total as f64 * 100.0;
        if pct >= 75.0 {
            TIER_75_POINTS
        } else if pct >= 50.0 {
            TIER_50_POINTS
        } else {
            0
        }
    }
}

fn score_inverted(
    section: &Section,
    sheet: &AnswerSheet,
    failed_items: &mut Vec<FailedItem>,
) -> u32 {
    // Reversed semantics: an explicit "no" earns the points; "yes" (and
    // silence) is the failure. The one place where pass != success.
    let mut earned = 0u32;
    for question in &section.questions {
        if sheet.get(&question.id) == Answer::Fail {
            earned += question.points;
        } else {
            failed_items.push(failed(section, question, section_severity(section)));
        }
    }
    earned
}

fn section_severity(section: &Section) -> Severity {
    if section.is_critical {
        Severity::Critical
    } else {
        Severity::Standard
    }
}

fn failed(section: &Section, question: &crate::rules::Question, severity: Severity) -> FailedItem {
    FailedItem {
        section_code: section.code.clone(),
        section_title: section.title.clone(),
        question_id: question.id.clone(),
        question_text: question.text.clone(),
        points_lost: question.points,
        severity,
    }
}
