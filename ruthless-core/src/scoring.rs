//! Scoring functions: failure rate, glitch level and the display-only
//! exaggeration metrics.
//!
//! Everything here is pure. Tuning constants are grouped at the top so the
//! seizure threshold can be adjusted without touching the board logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskStatus};

/// Decay bonus added per whole day a live task has been overdue.
pub const DECAY_POINTS_PER_DAY: f64 = 5.0;
/// Upper bound on the decay bonus contributed by a single task.
pub const DECAY_CAP_PER_TASK: f64 = 50.0;

pub const CHEATING_GLITCH_PENALTY: f64 = 20.0;
pub const AWAY_GLITCH_PENALTY: f64 = 15.0;
/// Absence longer than this between two syncs counts as "away".
pub const AWAY_THRESHOLD_HOURS: i64 = 24;

/// Multiplier for the cosmetic failure factor. Negative on purpose.
pub const EXAGGERATION_MULTIPLIER: f64 = -6666.0;
/// Seizure fires when the magnitude of the exaggerated factor exceeds this,
/// i.e. when more than three quarters of live tasks are failures.
pub const SEIZURE_THRESHOLD: f64 = 5000.0;

pub const HOURS_WASTED_PER_OPEN_TASK: f64 = 2.5;
pub const MONTHLY_HOURS: f64 = 720.0;

/// Failure rate over live tasks plus shame history, with a decay bonus for
/// live overdue tasks. Always in `[0, 100]`.
pub fn failure_rate(live: &[Task], history: &[Task], now: DateTime<Utc>) -> f64 {
    let total = live.len() + history.len();
    if total == 0 {
        return 0.0;
    }

    let failed = live
        .iter()
        .chain(history.iter())
        .filter(|t| t.status.is_failure())
        .count();
    let raw = 100.0 * failed as f64 / total as f64;

    (raw + decay_bonus(live, now)).clamp(0.0, 100.0)
}

/// Sum of per-task decay for currently overdue live tasks.
pub fn decay_bonus(live: &[Task], now: DateTime<Utc>) -> f64 {
    live.iter()
        .filter(|t| t.status == TaskStatus::Overdue)
        .map(|t| (t.days_overdue(now) as f64 * DECAY_POINTS_PER_DAY).min(DECAY_CAP_PER_TASK))
        .sum()
}

pub fn glitch_level(failure_rate: f64, is_cheating: bool, was_away: bool) -> f64 {
    let mut level = failure_rate;
    if is_cheating {
        level += CHEATING_GLITCH_PENALTY;
    }
    if was_away {
        level += AWAY_GLITCH_PENALTY;
    }
    level.clamp(0.0, 100.0)
}

/// Cosmetic failure factor: `-6666 * failed / total` over live tasks.
pub fn exaggerated_failure_factor(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let failed = tasks.iter().filter(|t| t.status.is_failure()).count();
    EXAGGERATION_MULTIPLIER * failed as f64 / tasks.len() as f64
}

pub fn exceeds_seizure_threshold(tasks: &[Task]) -> bool {
    exaggerated_failure_factor(tasks).abs() > SEIZURE_THRESHOLD
}

/// Share of a month spent on open work, capped at 100.
pub fn life_wasted_percent(tasks: &[Task]) -> f64 {
    let open = tasks
        .iter()
        .filter(|t| matches!(t.status, TaskStatus::Pending | TaskStatus::Overdue))
        .count();
    (open as f64 * HOURS_WASTED_PER_OPEN_TASK / MONTHLY_HOURS * 100.0).min(100.0)
}

pub fn verdict(tasks: &[Task]) -> &'static str {
    if tasks.is_empty() {
        return "YOUR EXISTENCE IS A PRODUCTIVITY VACUUM.";
    }
    let completed = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count();
    let rate = 100.0 * completed as f64 / tasks.len() as f64;

    match rate {
        r if r < 20.0 => "PATHETIC EFFORT. TRY BREATHING LESS.",
        r if r < 50.0 => "BELOW AVERAGE. AS EXPECTED.",
        r if r < 80.0 => "MEDIOCRE. YOU'RE STILL A DISAPPOINTMENT.",
        r if r < 100.0 => "DON'T GET COCKY. YOU STILL MISSED SOMETHING.",
        _ => "ALL TASKS DONE? YOU PROBABLY CHEATED.",
    }
}

/// Per-request cosmetic numbers for the presentation layer. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayMetrics {
    pub exaggerated_failure_rate: String,
    pub life_wasted_percent: f64,
    pub verdict: String,
}

impl DisplayMetrics {
    pub fn compute(tasks: &[Task]) -> Self {
        let factor = exaggerated_failure_factor(tasks);
        Self {
            exaggerated_failure_rate: format!("{}%", factor.round() as i64),
            life_wasted_percent: life_wasted_percent(tasks),
            verdict: verdict(tasks).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
    }

    fn task(id: &str, status: TaskStatus, deadline: DateTime<Utc>) -> Task {
        Task::new(id, deadline, now() - Duration::days(30))
            .with_id(id)
            .with_status(status)
    }

    #[test]
    fn empty_universe_scores_zero() {
        assert_eq!(failure_rate(&[], &[], now()), 0.0);
        assert_eq!(exaggerated_failure_factor(&[]), 0.0);
        assert_eq!(life_wasted_percent(&[]), 0.0);
    }

    #[test]
    fn two_of_four_overdue_one_day_each_scores_sixty() {
        let yesterday = now() - Duration::days(1);
        let live = vec![
            task("a", TaskStatus::Overdue, yesterday),
            task("b", TaskStatus::Overdue, yesterday),
            task("c", TaskStatus::Pending, now() + Duration::days(1)),
            task("d", TaskStatus::Completed, yesterday),
        ];
        assert_eq!(failure_rate(&live, &[], now()), 60.0);
    }

    #[test]
    fn history_counts_in_ratio_but_not_in_decay() {
        let long_ago = now() - Duration::days(20);
        let live = vec![task("a", TaskStatus::Completed, long_ago)];
        let history = vec![task("h", TaskStatus::Overdue, long_ago)];
        assert_eq!(failure_rate(&live, &history, now()), 50.0);
    }

    #[test]
    fn decay_is_capped_per_task_and_rate_clamped() {
        let ancient = now() - Duration::days(40);
        let live = vec![task("a", TaskStatus::Overdue, ancient)];
        assert_eq!(decay_bonus(&live, now()), DECAY_CAP_PER_TASK);
        assert_eq!(failure_rate(&live, &[], now()), 100.0);
    }

    #[test]
    fn glitch_adds_penalties_and_clamps() {
        assert_eq!(glitch_level(60.0, false, false), 60.0);
        assert_eq!(glitch_level(60.0, true, false), 80.0);
        assert_eq!(glitch_level(60.0, true, true), 95.0);
        assert_eq!(glitch_level(90.0, true, true), 100.0);
    }

    #[test]
    fn exaggeration_and_threshold() {
        let d = now();
        let mostly_failed = vec![
            task("a", TaskStatus::Overdue, d),
            task("b", TaskStatus::Abandoned, d),
            task("c", TaskStatus::Overdue, d),
            task("d", TaskStatus::Overdue, d),
            task("e", TaskStatus::Completed, d),
        ];
        assert_eq!(DisplayMetrics::compute(&mostly_failed).exaggerated_failure_rate, "-5333%");
        assert!(exceeds_seizure_threshold(&mostly_failed));

        let half = &mostly_failed[2..];
        assert!(!exceeds_seizure_threshold(half));
    }

    #[test]
    fn life_wasted_counts_open_tasks() {
        let d = now();
        let tasks = vec![
            task("a", TaskStatus::Pending, d),
            task("b", TaskStatus::Overdue, d),
            task("c", TaskStatus::Completed, d),
        ];
        let pct = life_wasted_percent(&tasks);
        assert!((pct - 5.0 / 720.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn verdict_buckets() {
        let d = now();
        let done = vec![task("a", TaskStatus::Completed, d)];
        assert_eq!(verdict(&done), "ALL TASKS DONE? YOU PROBABLY CHEATED.");

        let none_done = vec![task("a", TaskStatus::Pending, d)];
        assert_eq!(verdict(&none_done), "PATHETIC EFFORT. TRY BREATHING LESS.");

        let mut mixed = vec![task("a", TaskStatus::Completed, d), task("b", TaskStatus::Pending, d)];
        assert_eq!(verdict(&mixed), "MEDIOCRE. YOU'RE STILL A DISAPPOINTMENT.");
        mixed.push(task("c", TaskStatus::Pending, d));
        assert_eq!(verdict(&mixed), "BELOW AVERAGE. AS EXPECTED.");
    }
}
