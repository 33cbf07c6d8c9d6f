//! Check-in rule model: the canonical, versioned scoring rubric.
//!
//! Sections are immutable reference data. Wording and point values must
//! never change retroactively, because past scores must stay reproducible
//! from the historical answer set plus the rule set in force on that date.
//! Rule sets are therefore versioned by effective date; editing the rubric
//! means appending a new version, never rewriting an old one.

mod sections;

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::epoch;

/// A daily focus area. A day's check-in selects one or two pillars,
/// which gate the conditional sections and the floor actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pillar {
    School,
    Startup,
    Cash,
    Floor,
}

impl Pillar {
    pub fn as_str(self) -> &'static str {
        match self {
            Pillar::School => "school",
            Pillar::Startup => "startup",
            Pillar::Cash => "cash",
            Pillar::Floor => "floor",
        }
    }

    pub const ALL: [Pillar; 4] = [Pillar::School, Pillar::Startup, Pillar::Cash, Pillar::Floor];
}

impl FromStr for Pillar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "school" => Ok(Pillar::School),
            "startup" => Ok(Pillar::Startup),
            "cash" => Ok(Pillar::Cash),
            "floor" => Ok(Pillar::Floor),
            other => Err(format!("unknown pillar: {other}")),
        }
    }
}

/// How a section converts answers into points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringLogic {
    /// Earned = sum of points for passed questions.
    #[default]
    Standard,
    /// Earned is a step function of the completion fraction:
    /// 100% -> section max, >=75% -> 15, >=50% -> 10, else 0.
    PercentageTier,
    /// Single-question self-honesty check with reversed semantics:
    /// an explicit "no" earns the points, "yes" is the failure.
    Inverted,
}

/// A single rubric question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub points: u32,
}

/// A static rubric section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Single-letter section code.
    pub code: String,
    pub title: String,
    pub questions: Vec<Question>,
    /// Must equal the sum of question points except under percentage-tier
    /// scoring, where it is the top tier value.
    pub max_points: u32,
    /// An explicit fail in a critical section sets the discipline breach flag.
    #[serde(default)]
    pub is_critical: bool,
    /// Present = visible only when this pillar is among the day's selection.
    #[serde(default)]
    pub pillar_required: Option<Pillar>,
    #[serde(default)]
    pub scoring_logic: ScoringLogic,
}

/// A dated version of the full rubric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    pub version: u32,
    /// First UTC date this version applies to.
    pub effective_from: NaiveDate,
    pub sections: Vec<Section>,
}

impl RuleSet {
    /// All published rule-set versions, oldest first.
    pub fn all() -> Vec<RuleSet> {
        vec![sections::version_1()]
    }

    /// The version currently in force.
    pub fn current() -> RuleSet {
        RuleSet::all().pop().unwrap_or_else(sections::version_1)
    }

    /// The version in force on `date`. Dates before the first version
    /// resolve to the first version so historical recomputation never fails.
    pub fn for_date(date: NaiveDate) -> RuleSet {
        let mut all = RuleSet::all();
        let idx = all
            .iter()
            .rposition(|rs| rs.effective_from <= date)
            .unwrap_or(0);
        all.swap_remove(idx)
    }

    /// Sections visible for the given pillar selection, in rubric order.
    ///
    /// Unconditional sections are always included. Floor-gated sections are
    /// never returned here -- the floor section is synthesized from the
    /// day's dynamic actions, not the static table. Any other conditional
    /// section is included iff its pillar is selected.
    pub fn visible_sections(&self, pillars: &BTreeSet<Pillar>) -> Vec<&Section> {
        self.sections
            .iter()
            .filter(|s| match s.pillar_required {
                None => true,
                Some(Pillar::Floor) => false,
                Some(p) => pillars.contains(&p),
            })
            .collect()
    }

    /// Denominator for the day's percentage: static visible sections' max
    /// plus the floor budget when the floor pillar is selected.
    ///
    /// The percentage is always relative to what was actually offered that
    /// day, never to a fixed global maximum.
    pub fn total_possible_points(&self, pillars: &BTreeSet<Pillar>, floor_points: u32) -> u32 {
        let static_max: u32 = self
            .visible_sections(pillars)
            .iter()
            .map(|s| s.max_points)
            .sum();
        if pillars.contains(&Pillar::Floor) {
            static_max + floor_points
        } else {
            static_max
        }
    }

    pub fn section(&self, code: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.code == code)
    }
}

/// Validate a pillar selection: one or two pillars per day.
pub fn validate_pillars(pillars: &BTreeSet<Pillar>) -> Result<(), crate::error::ValidationError> {
    if pillars.is_empty() {
        return Err(crate::error::ValidationError::NoPillarsSelected);
    }
    if pillars.len() > 2 {
        return Err(crate::error::ValidationError::TooManyPillars {
            count: pillars.len(),
        });
    }
    Ok(())
}

/// The rule-set version in force on epoch start (version 1's effective date).
pub fn initial_effective_date() -> NaiveDate {
    epoch::system_start().date_naive()
}
