//! # Forge Core Library
//!
//! Core business logic for Forge, a fixed-timeline accountability system.
//! All operations are available through a standalone CLI binary; GUI
//! layers are thin shells over this same library.
//!
//! ## Architecture
//!
//! - **Time**: a server-anchored time authority defines "now" against a
//!   fixed one-year epoch; a local projection interpolates between
//!   resyncs and detects day rollovers
//! - **Rules**: the versioned check-in rubric with pillar-conditional
//!   sections
//! - **Scoring**: a pure, deterministic engine turning answers into an
//!   immutable scored result
//! - **Punishment**: threshold gate, uniform catalog draw, and the
//!   proof-of-discipline state machine
//! - **Storage**: SQLite records with hard uniqueness per (user, date)
//!   and TOML configuration
//!
//! ## Key Components
//!
//! - [`TimeState`]: canonical time derived from the epoch
//! - [`TimeProjection`]: cached authority state with local interpolation
//! - [`RuleSet`]: the rubric version in force on a given date
//! - [`score`]: the scoring function shared by preview and submission
//! - [`Database`]: check-in and punishment persistence

pub mod checkin;
pub mod epoch;
pub mod error;
pub mod events;
pub mod floor;
pub mod punishment;
pub mod remote;
pub mod rules;
pub mod scheduler;
pub mod scoring;
pub mod stats;
pub mod storage;
pub mod time;

pub use checkin::{
    enforce_missed_day, preview, resolve_proof, submit, MissedDayOutcome, SubmissionOutcome,
};
pub use error::{ConfigError, CoreError, DatabaseError, RemoteError, ValidationError};
pub use events::Event;
pub use floor::{build_floor_actions, FloorAction};
pub use punishment::{requires_punishment, reward_eligible, Commitment, Punishment, Stage};
pub use rules::{Pillar, Question, RuleSet, ScoringLogic, Section};
pub use scheduler::ReminderScheduler;
pub use scoring::{score, Answer, AnswerSheet, CheckInResult, FailedItem, SectionScore, Severity};
pub use stats::HistoryStats;
pub use storage::{CheckInRecord, Config, Database};
pub use time::{TimeProjection, TimeState};
