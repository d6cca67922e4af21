//! Board state machine: the per-user document and its mutation rules.
//!
//! Invariants:
//! - a task lives in exactly one of `tasks`, `shame_history`, `stolen_valor`
//! - `shame_history` and `stolen_valor` are append-only
//! - `is_cheating` never goes back to false
//!
//! Derived fields (`failure_rate`, `glitch_level`, `newly_overdue`) are only
//! written by `crate::sync`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskPatch, TaskStatus};

/// Length of the lockout armed by abandoning a task.
pub const LOCKOUT_SECS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub(crate) id: String,
    /// Most recent additions first.
    pub(crate) tasks: Vec<Task>,
    #[serde(default)]
    pub(crate) shame_history: Vec<Task>,
    #[serde(default)]
    pub(crate) stolen_valor: Vec<Task>,
    #[serde(default)]
    pub(crate) newly_overdue: Vec<String>,
    #[serde(default)]
    pub(crate) failure_rate: f64,
    #[serde(default)]
    pub(crate) glitch_level: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) lockout_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub(crate) is_cheating: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) nickname: Option<String>,
    pub(crate) last_access: DateTime<Utc>,
    pub(crate) last_calculated_at: DateTime<Utc>,
}

/// What an applied update did, for feedback and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub previous_status: TaskStatus,
    pub status: TaskStatus,
    pub deadline_extended: bool,
    pub lockout_armed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Failed task moved into the shame history.
    Shamed,
    /// Pending or completed task dropped without trace.
    Discarded,
}

impl Board {
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            tasks: Vec::new(),
            shame_history: Vec::new(),
            stolen_valor: Vec::new(),
            newly_overdue: Vec::new(),
            failure_rate: 0.0,
            glitch_level: 0.0,
            lockout_until: None,
            is_cheating: false,
            nickname: None,
            last_access: now,
            last_calculated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn shame_history(&self) -> &[Task] {
        &self.shame_history
    }

    pub fn stolen_valor(&self) -> &[Task] {
        &self.stolen_valor
    }

    pub fn newly_overdue(&self) -> &[String] {
        &self.newly_overdue
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }

    pub fn glitch_level(&self) -> f64 {
        self.glitch_level
    }

    pub fn lockout_until(&self) -> Option<DateTime<Utc>> {
        self.lockout_until
    }

    pub fn is_cheating(&self) -> bool {
        self.is_cheating
    }

    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }

    pub fn last_access(&self) -> DateTime<Utc> {
        self.last_access
    }

    pub fn last_calculated_at(&self) -> DateTime<Utc> {
        self.last_calculated_at
    }

    /// Time left in the lockout window, if any.
    pub fn lockout_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.lockout_until
            .filter(|until| *until > now)
            .map(|until| until - now)
    }

    pub fn is_locked_out(&self, now: DateTime<Utc>) -> bool {
        self.lockout_remaining(now).is_some()
    }

    /// Remaining lockout in whole seconds, rounded up.
    pub fn lockout_remaining_secs(&self, now: DateTime<Utc>) -> Option<i64> {
        self.lockout_remaining(now)
            .map(|d| (d.num_milliseconds() + 999) / 1000)
    }

    pub fn add_task(&mut self, task: Task) {
        tracing::debug!(board = %self.id, task = %task.id, "task added");
        self.tasks.insert(0, task);
    }

    /// Apply a partial update. Returns `None` (and changes nothing) when the
    /// id is unknown.
    pub fn update_task(
        &mut self,
        id: &str,
        patch: TaskPatch,
        now: DateTime<Utc>,
    ) -> Option<UpdateOutcome> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;

        let previous_status = task.status;
        let deadline_extended = patch.deadline.is_some_and(|d| d > task.deadline);
        let lockout_armed = patch.status == Some(TaskStatus::Abandoned);

        patch.apply(task);
        let status = task.status;

        if deadline_extended {
            tracing::warn!(board = %self.id, task = %id, "deadline pushed back; flagged as cheating");
            self.is_cheating = true;
        }
        if lockout_armed {
            let until = now + Duration::seconds(LOCKOUT_SECS);
            tracing::info!(board = %self.id, task = %id, %until, "task abandoned; lockout armed");
            self.lockout_until = Some(until);
        }

        Some(UpdateOutcome {
            previous_status,
            status,
            deadline_extended,
            lockout_armed,
        })
    }

    /// Remove a task. Failed tasks are preserved in the shame history.
    pub fn delete_task(&mut self, id: &str) -> Option<Removal> {
        let idx = self.tasks.iter().position(|t| t.id == id)?;
        let task = self.tasks.remove(idx);

        if task.status.is_failure() {
            tracing::info!(board = %self.id, task = %task.id, status = task.status.as_str(), "task entered shame history");
            self.shame_history.push(task);
            Some(Removal::Shamed)
        } else {
            tracing::debug!(board = %self.id, task = %task.id, "task discarded");
            Some(Removal::Discarded)
        }
    }

    pub fn set_nickname(&mut self, name: impl Into<String>) {
        self.nickname = Some(name.into());
    }

    pub fn clear_new_failures(&mut self) {
        self.newly_overdue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 2, 18, 0, 0).unwrap()
    }

    fn board_with(tasks: Vec<Task>) -> Board {
        let mut b = Board::new("b1", now());
        for t in tasks.into_iter().rev() {
            b.add_task(t);
        }
        b
    }

    fn task(id: &str, status: TaskStatus) -> Task {
        Task::new(id, now() + Duration::hours(4), now())
            .with_id(id)
            .with_status(status)
    }

    #[test]
    fn add_inserts_at_front() {
        let mut b = Board::new("b1", now());
        b.add_task(task("first", TaskStatus::Pending));
        b.add_task(task("second", TaskStatus::Pending));
        let ids: Vec<_> = b.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["second", "first"]);
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let mut b = board_with(vec![task("a", TaskStatus::Pending)]);
        let before = b.clone();
        assert!(b.update_task("nope", TaskPatch::status(TaskStatus::Abandoned), now()).is_none());
        assert_eq!(b, before);
    }

    #[test]
    fn later_deadline_flags_cheating_forever() {
        let mut b = board_with(vec![task("a", TaskStatus::Pending)]);
        let original = b.task("a").unwrap().deadline;

        let earlier = b
            .update_task("a", TaskPatch::deadline(original - Duration::hours(1)), now())
            .unwrap();
        assert!(!earlier.deadline_extended);
        assert!(!b.is_cheating());

        b.update_task("a", TaskPatch::deadline(original + Duration::days(1)), now());
        assert!(b.is_cheating());

        b.update_task("a", TaskPatch::deadline(original - Duration::days(3)), now());
        assert!(b.is_cheating());
    }

    #[test]
    fn abandon_arms_and_supersedes_lockout() {
        let mut b = board_with(vec![task("a", TaskStatus::Pending), task("b", TaskStatus::Pending)]);
        let out = b.update_task("a", TaskPatch::status(TaskStatus::Abandoned), now()).unwrap();
        assert!(out.lockout_armed);
        assert_eq!(b.lockout_until(), Some(now() + Duration::seconds(LOCKOUT_SECS)));
        assert_eq!(b.lockout_remaining_secs(now() + Duration::milliseconds(500)), Some(30));

        let later = now() + Duration::seconds(10);
        b.update_task("b", TaskPatch::status(TaskStatus::Abandoned), later);
        assert_eq!(b.lockout_until(), Some(later + Duration::seconds(LOCKOUT_SECS)));

        assert!(b.is_locked_out(later + Duration::seconds(29)));
        assert!(!b.is_locked_out(later + Duration::seconds(30)));
    }

    #[test]
    fn delete_failed_task_goes_to_shame() {
        let mut b = board_with(vec![
            task("o", TaskStatus::Overdue),
            task("x", TaskStatus::Abandoned),
            task("c", TaskStatus::Completed),
            task("p", TaskStatus::Pending),
        ]);

        assert_eq!(b.delete_task("o"), Some(Removal::Shamed));
        assert_eq!(b.delete_task("x"), Some(Removal::Shamed));
        assert_eq!(b.shame_history().len(), 2);

        assert_eq!(b.delete_task("c"), Some(Removal::Discarded));
        assert_eq!(b.delete_task("p"), Some(Removal::Discarded));
        assert_eq!(b.shame_history().len(), 2);
        assert!(b.tasks().is_empty());

        assert_eq!(b.delete_task("o"), None);
        assert_eq!(b.shame_history().len(), 2);
    }

    #[test]
    fn board_document_uses_camel_case_keys() {
        let mut b = board_with(vec![task("a", TaskStatus::Pending)]);
        b.set_nickname("loser");
        let json = serde_json::to_string(&b).unwrap();
        for key in ["shameHistory", "stolenValor", "failureRate", "glitchLevel", "isCheating", "lastAccess"] {
            assert!(json.contains(key), "missing {key}");
        }
        assert!(!json.contains("lockoutUntil"));

        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
    }
}
