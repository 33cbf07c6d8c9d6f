//! History aggregation over stored check-in records.
//!
//! Missed-day records flow through unchanged: they count as zero-score
//! breach days exactly like a user-submitted low score.

use serde::{Deserialize, Serialize};

use crate::epoch::REWARD_THRESHOLD;
use crate::storage::CheckInRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_days: u64,
    pub average_percentage: f64,
    pub best_percentage: u32,
    pub worst_percentage: u32,
    /// Days at or above the reward threshold.
    pub reward_days: u64,
    pub breach_days: u64,
    pub missed_days: u64,
    /// Trailing run of breach-free days.
    pub current_streak: u64,
    pub longest_streak: u64,
}

/// Aggregate a user's history, oldest first.
pub fn compute(records: &[CheckInRecord]) -> HistoryStats {
    if records.is_empty() {
        return HistoryStats::default();
    }

    let mut stats = HistoryStats {
        total_days: records.len() as u64,
        worst_percentage: u32::MAX,
        ..HistoryStats::default()
    };

    let mut sum = 0u64;
    let mut run = 0u64;
    for record in records {
        let pct = record.result.percentage;
        sum += pct as u64;
        stats.best_percentage = stats.best_percentage.max(pct);
        stats.worst_percentage = stats.worst_percentage.min(pct);

        if pct >= REWARD_THRESHOLD {
            stats.reward_days += 1;
        }
        if record.result.discipline_breach {
            stats.breach_days += 1;
            run = 0;
        } else {
            run += 1;
            stats.longest_streak = stats.longest_streak.max(run);
        }
        if record.is_missed {
            stats.missed_days += 1;
        }
    }
    stats.current_streak = run;
    stats.average_percentage = sum as f64 / records.len() as f64;
    stats
}
