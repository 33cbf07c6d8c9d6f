//! Floor actions: the per-day dynamic checklist outside the static rubric.
//!
//! A fixed daily point budget is spread evenly across the day's configured
//! actions. Each action's value is rounded independently; the aggregate may
//! drift slightly above or below the nominal budget and is never
//! redistributed to compensate. Historical scores depend on this exact
//! behavior, so the drift is preserved, not corrected.

use serde::{Deserialize, Serialize};

use crate::epoch::FLOOR_POINT_BUDGET;

/// A dynamically sourced per-day question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorAction {
    pub id: String,
    pub text: String,
    pub points: u32,
}

/// Points per action for `count` actions: `round(budget / count)`.
pub fn points_per_action(budget: u32, count: usize) -> u32 {
    if count == 0 {
        return 0;
    }
    (budget as f64 / count as f64).round() as u32
}

/// Build floor actions from the day's configured texts, distributing the
/// standard budget evenly with independent per-action rounding.
pub fn build_floor_actions(texts: &[String]) -> Vec<FloorAction> {
    let per_action = points_per_action(FLOOR_POINT_BUDGET, texts.len());
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| FloorAction {
            id: format!("floor-{}", i + 1),
            text: text.clone(),
            points: per_action,
        })
        .collect()
}

/// Sum of the day's actual floor points (may drift from the nominal budget).
pub fn floor_total(actions: &[FloorAction]) -> u32 {
    actions.iter().map(|a| a.points).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Floor action {i}")).collect()
    }

    #[test]
    fn three_actions_round_up_to_seven_each() {
        let actions = build_floor_actions(&texts(3));
        assert!(actions.iter().all(|a| a.points == 7));
        // Drifts +1 over the nominal 20; accepted, not redistributed.
        assert_eq!(floor_total(&actions), 21);
    }

    #[test]
    fn four_actions_split_exactly() {
        let actions = build_floor_actions(&texts(4));
        assert!(actions.iter().all(|a| a.points == 5));
        assert_eq!(floor_total(&actions), 20);
    }

    #[test]
    fn six_actions_drift_under_budget() {
        // 20 / 6 = 3.33 -> 3 each, total 18.
        let actions = build_floor_actions(&texts(6));
        assert!(actions.iter().all(|a| a.points == 3));
        assert_eq!(floor_total(&actions), 18);
    }

    #[test]
    fn no_actions_no_points() {
        assert_eq!(points_per_action(FLOOR_POINT_BUDGET, 0), 0);
        assert!(build_floor_actions(&[]).is_empty());
    }

    #[test]
    fn ids_are_stable_and_ordered() {
        let actions = build_floor_actions(&texts(2));
        assert_eq!(actions[0].id, "floor-1");
        assert_eq!(actions[1].id, "floor-2");
    }
}
