//! ruthless-core: punitive task-board engine.
//!
//! Tasks flip to overdue when their deadline passes, failures are kept
//! forever in a shame history, and bad standing triggers seizures, lockouts
//! and a rising glitch level. All derived state is recomputed lazily when a
//! board is read.

pub mod board;
pub mod error;
pub mod feedback;
pub mod gateway;
pub mod random;
pub mod scoring;
pub mod store;
pub mod sync;
pub mod task;
pub mod time;

pub use board::{Board, Removal, UpdateOutcome, LOCKOUT_SECS};
pub use error::{BoardError, StoreError};
pub use feedback::{FeedbackEvent, FeedbackSink};
pub use gateway::{BoardService, BoardView};
pub use random::{FixedIndex, RandomSource, ThreadRandom};
pub use scoring::DisplayMetrics;
pub use store::{BoardFileLock, BoardStore, JsonFileStore, MemoryStore};
pub use sync::{sync_deadlines, SyncReport};
pub use task::{NewTask, Priority, Task, TaskPatch, TaskStatus};
