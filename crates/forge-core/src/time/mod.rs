//! Time authority and local projection.
//!
//! `authority` computes the canonical `TimeState` from the fixed epoch;
//! `projection` caches the last authoritative fetch and interpolates
//! locally between resyncs.

pub mod authority;
pub mod projection;

pub use authority::{date_key, Breakdown, TimeState};
pub use projection::{HostSignal, ResyncReason, TimeProjection};
