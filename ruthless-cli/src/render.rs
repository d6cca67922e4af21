//! Plain-text rendering of board views.

use chrono_tz::Tz;
use ruthless_core::time::format_local;
use ruthless_core::{BoardView, Task, TaskStatus};

pub fn render_board(view: &BoardView, tz: Tz) -> String {
    let board = &view.board;
    let mut out = String::new();

    out.push_str("# RUTHLESS\n\n");
    if let Some(name) = board.nickname() {
        out.push_str(&format!("Subject: {name}\n"));
    }
    out.push_str(&format!(
        "Failure rate: {}%  (glitch {:.0}, displayed as {})\n",
        board.failure_rate().round() as i64,
        board.glitch_level(),
        view.metrics.exaggerated_failure_rate
    ));
    out.push_str(&format!("Life wasted: {:.1}%\n", view.metrics.life_wasted_percent));
    out.push_str(&format!("Verdict: {}\n", view.metrics.verdict));
    if board.is_cheating() {
        out.push_str("Flag: CHEATER\n");
    }
    if let Some(secs) = view.lockout_remaining_secs {
        out.push_str(&format!("LOCKED OUT for {secs}s\n"));
    }

    out.push_str("\n## Active burdens\n\n");
    let active: Vec<&Task> = board
        .tasks()
        .iter()
        .filter(|t| t.status != TaskStatus::Abandoned)
        .collect();
    if active.is_empty() {
        out.push_str("NO BURDENS. YOU ARE USELESS.\n");
    }
    for t in active {
        let marker = if board.newly_overdue().contains(&t.id) { " (NEW)" } else { "" };
        out.push_str(&format!(
            "- [{}]{} {} | {:?} | due {} | {}\n",
            t.status.as_str(),
            marker,
            t.title,
            t.priority,
            format_local(t.deadline, tz),
            t.id
        ));
    }

    if !board.stolen_valor().is_empty() {
        out.push_str(&format!(
            "\nConfiscated achievements: {}\n",
            board.stolen_valor().len()
        ));
    }

    out
}

/// Hall of shame: permanent history first, then live failures.
pub fn render_shame(view: &BoardView, tz: Tz) -> String {
    let board = &view.board;
    let failures: Vec<&Task> = board
        .shame_history()
        .iter()
        .chain(board.tasks().iter().filter(|t| t.status.is_failure()))
        .collect();

    let mut out = String::from("# HALL OF SHAME\n\nYOUR PERMANENT CRIMINAL RECORD\n\n");
    if failures.is_empty() {
        out.push_str("NO FAILURES YET? I DON'T BELIEVE YOU.\n");
        return out;
    }

    for t in &failures {
        let stamp = if t.status == TaskStatus::Abandoned { "COWARD" } else { "FAILURE" };
        out.push_str(&format!(
            "- {} [{}] created {} | deadline {}\n",
            t.title.to_uppercase(),
            stamp,
            format_local(t.created_at, tz),
            format_local(t.deadline, tz)
        ));
    }
    out.push_str(&format!("\nTOTAL DISGRACE COUNT: {}\n", failures.len()));
    out
}
