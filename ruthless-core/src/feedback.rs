//! Feedback events handed to the presentation layer.
//!
//! The core only *reports* what happened. Speech, sound and toasts belong to
//! whoever implements [`FeedbackSink`].

use serde::{Deserialize, Serialize};

use crate::board::{Removal, UpdateOutcome};
use crate::sync::SyncReport;
use crate::task::TaskStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum FeedbackEvent {
    Welcome,
    TaskAdded { task_id: String },
    TaskCompleted { task_id: String },
    TaskAbandoned { task_id: String },
    TaskOverdue { task_id: String },
    ValorStolen { task_id: String },
    CheatingDetected { task_id: String },
    TaskShamed { task_id: String },
    IdleShame,
}

/// Collaborator capability that reacts to events (voice, toast, log line).
pub trait FeedbackSink {
    fn notify(&mut self, event: &FeedbackEvent, nickname: Option<&str>);
}

pub fn from_sync(report: &SyncReport) -> Vec<FeedbackEvent> {
    let mut events = Vec::new();
    if report.was_away {
        events.push(FeedbackEvent::IdleShame);
    }
    events.extend(
        report
            .newly_overdue
            .iter()
            .map(|id| FeedbackEvent::TaskOverdue { task_id: id.clone() }),
    );
    if let Some(task) = &report.seized {
        events.push(FeedbackEvent::ValorStolen {
            task_id: task.id.clone(),
        });
    }
    events
}

pub fn from_update(task_id: &str, outcome: &UpdateOutcome) -> Vec<FeedbackEvent> {
    let mut events = Vec::new();
    if outcome.deadline_extended {
        events.push(FeedbackEvent::CheatingDetected {
            task_id: task_id.to_string(),
        });
    }
    if outcome.status != outcome.previous_status {
        let task_id = task_id.to_string();
        match outcome.status {
            TaskStatus::Completed => events.push(FeedbackEvent::TaskCompleted { task_id }),
            TaskStatus::Abandoned => events.push(FeedbackEvent::TaskAbandoned { task_id }),
            _ => {}
        }
    }
    events
}

pub fn from_removal(task_id: &str, removal: Removal) -> Vec<FeedbackEvent> {
    match removal {
        Removal::Shamed => vec![FeedbackEvent::TaskShamed {
            task_id: task_id.to_string(),
        }],
        Removal::Discarded => vec![],
    }
}
