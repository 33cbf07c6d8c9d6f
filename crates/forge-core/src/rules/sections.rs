//! Published rule-set versions.
//!
//! Version 1 is the rubric in force since epoch start. Never edit a
//! published version -- append a new one with a later effective date.

use super::{Pillar, Question, RuleSet, ScoringLogic, Section};

fn q(id: &str, text: &str, points: u32) -> Question {
    Question {
        id: id.into(),
        text: text.into(),
        points,
    }
}

/// Rubric version 1, effective from epoch start.
pub(super) fn version_1() -> RuleSet {
    RuleSet {
        version: 1,
        effective_from: super::initial_effective_date(),
        sections: vec![
            Section {
                code: "A".into(),
                title: "Launch Protocol".into(),
                questions: vec![
                    q("a1", "Woke up at the planned time, no snooze", 4),
                    q("a2", "Executed the full morning routine", 3),
                    q("a3", "No phone for the first hour", 3),
                ],
                max_points: 10,
                is_critical: true,
                pillar_required: None,
                scoring_logic: ScoringLogic::Standard,
            },
            Section {
                code: "B".into(),
                title: "Deep Work".into(),
                questions: vec![
                    q("b1", "Completed at least two uninterrupted deep work blocks", 5),
                    q("b2", "Zero context switching inside the blocks", 5),
                ],
                max_points: 10,
                is_critical: true,
                pillar_required: None,
                scoring_logic: ScoringLogic::Standard,
            },
            Section {
                code: "C".into(),
                title: "Cash Engine".into(),
                questions: vec![
                    q("c1", "Did outreach to at least three prospects", 5),
                    q("c2", "Shipped client work before anything else", 5),
                    q("c3", "Logged every expense and income line", 5),
                    q("c4", "Moved one deal forward concretely", 5),
                ],
                max_points: 20,
                is_critical: false,
                pillar_required: Some(Pillar::Cash),
                scoring_logic: ScoringLogic::Standard,
            },
            Section {
                code: "D".into(),
                title: "School Block".into(),
                questions: vec![
                    q("d1", "Attended or caught up on every lecture", 5),
                    q("d2", "Finished the day's assigned coursework", 5),
                    q("d3", "Reviewed notes before closing the books", 5),
                ],
                max_points: 15,
                is_critical: false,
                pillar_required: Some(Pillar::School),
                scoring_logic: ScoringLogic::Standard,
            },
            Section {
                code: "S".into(),
                title: "Startup Sprint".into(),
                questions: vec![
                    q("s1", "Shipped something users can see", 5),
                    q("s2", "Talked to at least one user or prospect", 5),
                    q("s3", "Closed the day's top priority ticket", 5),
                ],
                max_points: 15,
                is_critical: false,
                pillar_required: Some(Pillar::Startup),
                scoring_logic: ScoringLogic::Standard,
            },
            Section {
                code: "E".into(),
                title: "Body".into(),
                questions: vec![
                    q("e1", "Trained or moved hard for 45 minutes", 5),
                    q("e2", "Ate to plan, nothing mindless", 5),
                ],
                max_points: 10,
                is_critical: false,
                pillar_required: None,
                scoring_logic: ScoringLogic::Standard,
            },
            Section {
                code: "F".into(),
                title: "Digital Discipline".into(),
                questions: vec![
                    q("f1", "No social media outside the allowed window", 4),
                    q("f2", "No video content during work hours", 4),
                    q("f3", "Phone stayed out of the work room", 3),
                    q("f4", "Inbox and messages batched, not grazed", 3),
                ],
                max_points: 14,
                is_critical: true,
                pillar_required: None,
                scoring_logic: ScoringLogic::Standard,
            },
            Section {
                code: "H".into(),
                title: "Non-Negotiables".into(),
                questions: vec![
                    q("h1", "Drank water before coffee", 4),
                    q("h2", "Ten minutes of reading", 4),
                    q("h3", "Planned tomorrow before shutdown", 4),
                    q("h4", "In bed by the target time", 4),
                    q("h5", "No food after the cutoff", 4),
                ],
                max_points: 20,
                is_critical: false,
                pillar_required: None,
                scoring_logic: ScoringLogic::PercentageTier,
            },
            Section {
                code: "G".into(),
                title: "Closing Honesty".into(),
                questions: vec![q(
                    "g1",
                    "Deep down, do you know you could have done more today?",
                    10,
                )],
                max_points: 10,
                is_critical: false,
                pillar_required: None,
                scoring_logic: ScoringLogic::Inverted,
            },
            // Placeholder entry for the floor pillar. The rule model never
            // returns it; the floor section is synthesized per day from
            // dynamic actions (see crate::floor).
            Section {
                code: "L".into(),
                title: "The Floor".into(),
                questions: vec![],
                max_points: crate::epoch::FLOOR_POINT_BUDGET,
                is_critical: false,
                pillar_required: Some(Pillar::Floor),
                scoring_logic: ScoringLogic::Standard,
            },
        ],
    }
}
