//! Punishment gate: threshold evaluation, catalog selection, and the
//! proof-of-discipline state machine.
//!
//! ## Workflow
//!
//! ```text
//! Selecting -> Revealed -> ProofPending -> Resolved
//! ```
//!
//! A punishment is drawn once per qualifying day, updated once when proof
//! is submitted, and never edited again. An abandoned punishment stays in
//! `ProofPending` indefinitely and is re-presented on every visit.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::epoch::{PUNISHMENT_THRESHOLD, REWARD_THRESHOLD};
use crate::error::ValidationError;

/// The fixed punishment catalog. Historical records store the selected
/// index and text verbatim, so this list is append-only: never reword or
/// reorder existing entries.
pub const CATALOG: [&str; 8] = [
    "100 burpees before anything else tomorrow, filmed start to finish",
    "Cold shower only for the next three days",
    "Wake up one hour earlier tomorrow and start with the hardest task",
    "No music, podcasts, or video for 48 hours",
    "Donate to a cause you dislike and write down why it stings",
    "5 km run before breakfast, no headphones",
    "Phone stays in another room for a full day",
    "Write a one-page letter to your future self about today's slack",
];

/// Whether a computed percentage mandates the punishment workflow.
/// A score of exactly 85 triggers it.
pub fn requires_punishment(percentage: u32) -> bool {
    percentage <= PUNISHMENT_THRESHOLD
}

/// Whether a computed percentage is reward-eligible. 86 is the first
/// rewardable score; intentionally not derived from the punishment
/// threshold.
pub fn reward_eligible(percentage: u32) -> bool {
    percentage >= REWARD_THRESHOLD
}

/// Draw a punishment uniformly at random from the catalog.
///
/// True uniform sampling with replacement: no weighting, no exclusion of
/// recently used entries.
pub fn select_punishment<R: Rng + ?Sized>(rng: &mut R) -> (usize, &'static str) {
    let index = rng.gen_range(0..CATALOG.len());
    (index, CATALOG[index])
}

/// Binary commitment answer on the proof form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Yes,
    No,
}

impl Commitment {
    pub fn as_str(self) -> &'static str {
        match self {
            Commitment::Yes => "yes",
            Commitment::No => "no",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_lowercase().as_str() {
            "yes" => Ok(Commitment::Yes),
            "no" => Ok(Commitment::No),
            other => Err(ValidationError::InvalidValue {
                field: "commitment".into(),
                message: format!("expected yes/no, got '{other}'"),
            }),
        }
    }
}

/// Punishment workflow stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Draw pending; no record stored yet.
    Selecting,
    /// Drawn and stored; awaiting user acknowledgment.
    Revealed,
    /// Acknowledged; proof not yet submitted.
    ProofPending,
    /// Proof recorded. Terminal and irreversible.
    Resolved,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Selecting => "selecting",
            Stage::Revealed => "revealed",
            Stage::ProofPending => "proof_pending",
            Stage::Resolved => "resolved",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "selecting" => Ok(Stage::Selecting),
            "revealed" => Ok(Stage::Revealed),
            "proof_pending" => Ok(Stage::ProofPending),
            "resolved" => Ok(Stage::Resolved),
            other => Err(ValidationError::InvalidValue {
                field: "stage".into(),
                message: format!("unknown stage '{other}'"),
            }),
        }
    }
}

/// A drawn punishment attached to a scored day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Punishment {
    pub id: Uuid,
    /// Owning check-in record.
    pub check_in_id: Uuid,
    /// Index into [`CATALOG`] at draw time.
    pub catalog_index: usize,
    /// Text stored verbatim so the record survives catalog appends.
    pub text: String,
    /// The percentage that triggered the draw.
    pub percentage: u32,
    pub date_key: String,
    pub stage: Stage,
    pub feeling: Option<String>,
    pub commitment: Option<Commitment>,
    pub proof_submitted_at: Option<DateTime<Utc>>,
}

impl Punishment {
    /// Draw a punishment for a qualifying day. The record enters the
    /// workflow at `Revealed` -- `Selecting` only exists before storage.
    pub fn draw<R: Rng + ?Sized>(
        rng: &mut R,
        check_in_id: Uuid,
        percentage: u32,
        date_key: impl Into<String>,
    ) -> Self {
        let (catalog_index, text) = select_punishment(rng);
        Self {
            id: Uuid::new_v4(),
            check_in_id,
            catalog_index,
            text: text.to_string(),
            percentage,
            date_key: date_key.into(),
            stage: Stage::Revealed,
            feeling: None,
            commitment: None,
            proof_submitted_at: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.stage == Stage::Resolved
    }

    /// User acknowledgment: `Revealed -> ProofPending`. No server effect.
    pub fn acknowledge(&mut self) -> Result<(), ValidationError> {
        match self.stage {
            Stage::Revealed => {
                self.stage = Stage::ProofPending;
                Ok(())
            }
            other => Err(ValidationError::InvalidTransition {
                from: other.as_str(),
                via: "acknowledge",
            }),
        }
    }

    /// Submit proof: `ProofPending -> Resolved`. One-way; requires a
    /// non-empty reflection and a commitment answer.
    pub fn resolve(
        &mut self,
        feeling: &str,
        commitment: Commitment,
        at: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        if self.stage != Stage::ProofPending {
            return Err(ValidationError::InvalidTransition {
                from: self.stage.as_str(),
                via: "resolve",
            });
        }
        if feeling.trim().is_empty() {
            return Err(ValidationError::MissingProofField { field: "feeling" });
        }
        self.feeling = Some(feeling.trim().to_string());
        self.commitment = Some(commitment);
        self.proof_submitted_at = Some(at);
        self.stage = Stage::Resolved;
        Ok(())
    }
}
