//! Mutation gateway: the only entry points collaborators use to read or
//! change a board.
//!
//! Every call runs under a per-board exclusive lock held across
//! load -> sync/mutate -> save, so a sync pass and its seizure always see a
//! consistent document. Two layers: an in-process mutex per board id, then
//! the store's own lock (`BoardStore::lock`), which for the file store also
//! excludes other processes. Different boards never contend.
//!
//! Lockout guards `update_task` and `delete_task`. Adding tasks and setting
//! the nickname stay available while locked out.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::board::Board;
use crate::error::BoardError;
use crate::feedback::{self, FeedbackEvent};
use crate::random::RandomSource;
use crate::scoring::DisplayMetrics;
use crate::store::{validate_board_id, BoardStore};
use crate::sync::sync_deadlines;
use crate::task::{NewTask, TaskPatch};

/// Board document plus per-request extras for the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    #[serde(flatten)]
    pub board: Board,
    pub metrics: DisplayMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lockout_remaining_secs: Option<i64>,
    pub events: Vec<FeedbackEvent>,
}

impl BoardView {
    pub fn new(board: Board, now: DateTime<Utc>, events: Vec<FeedbackEvent>) -> Self {
        Self {
            metrics: DisplayMetrics::compute(board.tasks()),
            lockout_remaining_secs: board.lockout_remaining_secs(now),
            board,
            events,
        }
    }
}

pub struct BoardService<S, R> {
    store: S,
    rng: Mutex<R>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: BoardStore, R: RandomSource> BoardService<S, R> {
    pub fn new(store: S, rng: R) -> Self {
        Self {
            store,
            rng: Mutex::new(rng),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Sync then return the board. Creates the board on first access.
    pub fn get_board(&self, board_id: &str, now: DateTime<Utc>) -> Result<BoardView, BoardError> {
        self.with_board(board_id, now, |board, created| {
            let report = {
                let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
                sync_deadlines(board, now, &mut *rng)
            };

            let mut events = Vec::new();
            if created {
                events.push(FeedbackEvent::Welcome);
            }
            events.extend(feedback::from_sync(&report));
            Ok(events)
        })
    }

    pub fn add_task(
        &self,
        board_id: &str,
        new_task: NewTask,
        now: DateTime<Utc>,
    ) -> Result<BoardView, BoardError> {
        self.with_board(board_id, now, |board, _| {
            let task = new_task.into_task(now)?;
            let task_id = task.id.clone();
            board.add_task(task);
            board.clear_new_failures();
            Ok(vec![FeedbackEvent::TaskAdded { task_id }])
        })
    }

    /// Unknown `task_id` is a silent no-op.
    pub fn update_task(
        &self,
        board_id: &str,
        task_id: &str,
        patch: TaskPatch,
        now: DateTime<Utc>,
    ) -> Result<BoardView, BoardError> {
        self.with_board(board_id, now, |board, _| {
            ensure_unlocked(board, now)?;
            match board.update_task(task_id, patch, now) {
                Some(outcome) => {
                    board.clear_new_failures();
                    Ok(feedback::from_update(task_id, &outcome))
                }
                None => {
                    tracing::debug!(board = %board_id, task = %task_id, "update for unknown task ignored");
                    Ok(vec![])
                }
            }
        })
    }

    /// Unknown `task_id` is a silent no-op.
    pub fn delete_task(
        &self,
        board_id: &str,
        task_id: &str,
        now: DateTime<Utc>,
    ) -> Result<BoardView, BoardError> {
        self.with_board(board_id, now, |board, _| {
            ensure_unlocked(board, now)?;
            match board.delete_task(task_id) {
                Some(removal) => {
                    board.clear_new_failures();
                    Ok(feedback::from_removal(task_id, removal))
                }
                None => {
                    tracing::debug!(board = %board_id, task = %task_id, "delete for unknown task ignored");
                    Ok(vec![])
                }
            }
        })
    }

    pub fn set_nickname(
        &self,
        board_id: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<BoardView, BoardError> {
        self.with_board(board_id, now, |board, _| {
            board.set_nickname(name);
            board.clear_new_failures();
            Ok(vec![])
        })
    }

    /// Load (or lazily create), run `f`, save. Nothing is saved when `f`
    /// fails.
    fn with_board<F>(&self, board_id: &str, now: DateTime<Utc>, f: F) -> Result<BoardView, BoardError>
    where
        F: FnOnce(&mut Board, bool) -> Result<Vec<FeedbackEvent>, BoardError>,
    {
        validate_board_id(board_id)?;
        let lock = self.board_lock(board_id);
        let result = {
            let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
            self.load_mutate_save(board_id, now, f)
        };
        self.release_board_lock(board_id, lock);
        result
    }

    fn load_mutate_save<F>(&self, board_id: &str, now: DateTime<Utc>, f: F) -> Result<BoardView, BoardError>
    where
        F: FnOnce(&mut Board, bool) -> Result<Vec<FeedbackEvent>, BoardError>,
    {
        let _store_lock = self.store.lock(board_id)?;

        let (mut board, created) = match self.store.load(board_id)? {
            Some(board) => (board, false),
            None => {
                tracing::info!(board = %board_id, "creating board on first access");
                (Board::new(board_id, now), true)
            }
        };

        let events = f(&mut board, created)?;
        self.store.save(&board)?;
        Ok(BoardView::new(board, now, events))
    }

    fn board_lock(&self, board_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(board_id.to_string()).or_default().clone()
    }

    /// Drop our handle and forget the entry once nobody else holds or waits
    /// on it. Clones are only handed out under the map lock, so the count
    /// cannot grow while we check it.
    fn release_board_lock(&self, board_id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        drop(lock);
        if locks
            .get(board_id)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(board_id);
        }
    }
}

fn ensure_unlocked(board: &Board, now: DateTime<Utc>) -> Result<(), BoardError> {
    match board.lockout_remaining_secs(now) {
        Some(remaining_secs) => {
            tracing::warn!(board = %board.id(), remaining_secs, "mutation rejected during lockout");
            Err(BoardError::LockedOut { remaining_secs })
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::FixedIndex;
    use crate::store::MemoryStore;
    use crate::task::TaskStatus;
    use chrono::{Duration, TimeZone};

    const BOARD: &str = "main_board";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 14, 9, 30, 0).unwrap()
    }

    fn service() -> BoardService<MemoryStore, FixedIndex> {
        BoardService::new(MemoryStore::new(), FixedIndex(0))
    }

    fn add(svc: &BoardService<MemoryStore, FixedIndex>, title: &str, deadline: DateTime<Utc>) -> String {
        let view = svc.add_task(BOARD, NewTask::new(title, deadline), now()).unwrap();
        view.board.tasks()[0].id.clone()
    }

    #[test]
    fn first_read_creates_board_and_welcomes() {
        let svc = service();
        let view = svc.get_board(BOARD, now()).unwrap();
        assert_eq!(view.events, vec![FeedbackEvent::Welcome]);
        assert!(svc.store().load(BOARD).unwrap().is_some());

        let again = svc.get_board(BOARD, now()).unwrap();
        assert!(again.events.is_empty());
    }

    #[test]
    fn add_rejects_missing_fields_without_creating_board() {
        let svc = service();
        let err = svc.add_task(BOARD, NewTask::default(), now()).unwrap_err();
        assert!(matches!(err, BoardError::Validation(_)));
        assert!(svc.store().load(BOARD).unwrap().is_none());
    }

    #[test]
    fn abandon_locks_out_update_and_delete_but_not_add() {
        let svc = service();
        let a = add(&svc, "a", now() + Duration::hours(1));
        let b = add(&svc, "b", now() + Duration::hours(1));

        let view = svc
            .update_task(BOARD, &a, TaskPatch::status(TaskStatus::Abandoned), now())
            .unwrap();
        assert_eq!(view.lockout_remaining_secs, Some(30));
        assert_eq!(view.events, vec![FeedbackEvent::TaskAbandoned { task_id: a.clone() }]);

        let soon = now() + Duration::seconds(12);
        let before = svc.store().load(BOARD).unwrap().unwrap();
        let err = svc
            .update_task(BOARD, &b, TaskPatch::status(TaskStatus::Completed), soon)
            .unwrap_err();
        assert!(matches!(err, BoardError::LockedOut { remaining_secs: 18 }));
        assert!(matches!(
            svc.delete_task(BOARD, &a, soon),
            Err(BoardError::LockedOut { .. })
        ));
        assert_eq!(svc.store().load(BOARD).unwrap().unwrap(), before);

        svc.add_task(BOARD, NewTask::new("c", now() + Duration::hours(2)), soon)
            .unwrap();

        let after = now() + Duration::seconds(31);
        let view = svc.delete_task(BOARD, &a, after).unwrap();
        assert_eq!(view.board.shame_history().len(), 1);
        assert_eq!(view.events, vec![FeedbackEvent::TaskShamed { task_id: a }]);
    }

    #[test]
    fn unknown_ids_are_noops() {
        let svc = service();
        add(&svc, "a", now() + Duration::hours(1));
        let before = svc.get_board(BOARD, now()).unwrap().board;

        let view = svc
            .update_task(BOARD, "ghost", TaskPatch::status(TaskStatus::Completed), now())
            .unwrap();
        assert_eq!(view.board, before);
        let view = svc.delete_task(BOARD, "ghost", now()).unwrap();
        assert_eq!(view.board, before);
    }

    #[test]
    fn write_clears_overdue_notifications() {
        let svc = service();
        let late = add(&svc, "late", now() - Duration::minutes(5));

        let view = svc.get_board(BOARD, now()).unwrap();
        assert_eq!(view.board.newly_overdue(), [late.clone()]);
        assert!(view.events.contains(&FeedbackEvent::TaskOverdue { task_id: late.clone() }));

        let view = svc
            .update_task(BOARD, &late, TaskPatch { title: Some("still late".into()), ..TaskPatch::default() }, now())
            .unwrap();
        assert!(view.board.newly_overdue().is_empty());
    }

    #[test]
    fn nickname_is_allowed_during_lockout() {
        let svc = service();
        let a = add(&svc, "a", now() + Duration::hours(1));
        svc.update_task(BOARD, &a, TaskPatch::status(TaskStatus::Abandoned), now())
            .unwrap();
        let view = svc.set_nickname(BOARD, "quitter", now()).unwrap();
        assert_eq!(view.board.nickname(), Some("quitter"));
    }

    #[test]
    fn view_serializes_flat_board_with_metrics() {
        let svc = service();
        add(&svc, "a", now() + Duration::hours(1));
        let view = svc.get_board(BOARD, now()).unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("tasks").is_some());
        assert!(json.get("failureRate").is_some());
        assert_eq!(json["metrics"]["exaggeratedFailureRate"], "0%");
    }

    #[test]
    fn lock_table_is_pruned_after_each_call() {
        let svc = service();
        let id = add(&svc, "a", now() + Duration::hours(1));
        svc.get_board("other", now()).unwrap();
        assert!(svc.update_task(BOARD, &id, TaskPatch::status(TaskStatus::Abandoned), now()).is_ok());
        assert!(svc.delete_task(BOARD, &id, now()).is_err());
        assert!(svc.locks.lock().unwrap().is_empty());
    }

    #[test]
    fn concurrent_writers_in_one_process_keep_every_task() {
        let svc = service();
        std::thread::scope(|s| {
            for worker in 0..4 {
                let svc = &svc;
                s.spawn(move || {
                    for i in 0..25 {
                        svc.add_task(BOARD, NewTask::new(format!("w{worker}-{i}"), now()), now())
                            .unwrap();
                    }
                });
            }
        });
        assert_eq!(svc.get_board(BOARD, now()).unwrap().board.tasks().len(), 100);
        assert!(svc.locks.lock().unwrap().is_empty());
    }

    #[test]
    fn rejects_invalid_board_ids() {
        let svc = service();
        assert!(matches!(
            svc.get_board("../x", now()),
            Err(BoardError::Store(_))
        ));
    }
}
