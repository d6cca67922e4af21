//! Sync pass: lazy, read-triggered re-evaluation of deadlines and derived
//! metrics.
//!
//! Order matters:
//! 1) flip expired pending tasks to overdue
//! 2) failure rate
//! 3) seizure (at most one completed task per pass)
//! 4) glitch level, using the *previous* `last_access`
//! 5) stamp `last_access` / `last_calculated_at`

use chrono::{DateTime, Duration, Utc};

use crate::board::Board;
use crate::random::RandomSource;
use crate::scoring::{self, AWAY_THRESHOLD_HOURS};
use crate::task::{Task, TaskStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Ids flipped to overdue in this pass.
    pub newly_overdue: Vec<String>,
    /// Completed task seized into stolen valor, if the rule fired.
    pub seized: Option<Task>,
    pub was_away: bool,
}

pub fn sync_deadlines(board: &mut Board, now: DateTime<Utc>, rng: &mut dyn RandomSource) -> SyncReport {
    let mut newly_overdue = Vec::new();
    for task in board
        .tasks
        .iter_mut()
        .filter(|t| t.status == TaskStatus::Pending && t.deadline < now)
    {
        task.status = TaskStatus::Overdue;
        newly_overdue.push(task.id.clone());
    }
    if !newly_overdue.is_empty() {
        tracing::debug!(board = %board.id, count = newly_overdue.len(), "tasks went overdue");
    }
    board.newly_overdue = newly_overdue.clone();

    board.failure_rate = scoring::failure_rate(&board.tasks, &board.shame_history, now);

    let seized = seize_completed(board, rng);

    let was_away = now - board.last_access > Duration::hours(AWAY_THRESHOLD_HOURS);
    board.glitch_level = scoring::glitch_level(board.failure_rate, board.is_cheating, was_away);

    board.last_calculated_at = now;
    board.last_access = now;

    SyncReport {
        newly_overdue,
        seized,
        was_away,
    }
}

fn seize_completed(board: &mut Board, rng: &mut dyn RandomSource) -> Option<Task> {
    if !scoring::exceeds_seizure_threshold(&board.tasks) {
        return None;
    }

    let completed: Vec<usize> = board
        .tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.status == TaskStatus::Completed)
        .map(|(i, _)| i)
        .collect();
    if completed.is_empty() {
        return None;
    }

    let idx = completed[rng.pick_index(completed.len())];
    let task = board.tasks.remove(idx);
    tracing::warn!(board = %board.id, task = %task.id, "completed task seized into stolen valor");
    board.stolen_valor.push(task.clone());
    Some(task)
}
