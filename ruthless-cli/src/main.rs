use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use ruthless_core::{
    BoardError, BoardService, BoardView, FeedbackSink, NewTask, Priority, TaskPatch, TaskStatus,
    ThreadRandom,
};
use ruthless_core::time::{parse_deadline, parse_tz};
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod setup;
mod snark;
mod state;

#[derive(Parser, Debug)]
#[command(
    name = "ruthless",
    version = env!("RUTHLESS_VERSION"),
    about = "A task tracker that does not forgive"
)]
struct Cli {
    /// Board id (default: config board.id)
    #[arg(long, global = true)]
    board: Option<String>,

    /// Print the board as JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Onboarding: pick a nickname and timezone
    Setup,

    /// Write a default ~/.ruthless/config.toml
    InitConfig,

    #[command(flatten)]
    OnBoard(BoardCommand),
}

/// Commands that open the board store.
#[derive(Subcommand, Debug)]
enum BoardCommand {
    /// Show the board (runs the deadline sync)
    Board,

    /// Accept a new burden
    Add {
        #[arg(long)]
        title: String,

        /// RFC 3339, or local "YYYY-MM-DD HH:MM" in the configured timezone
        #[arg(long)]
        deadline: String,

        /// low | medium | high | critical
        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Mark a task completed
    Complete { id: String },

    /// Give up on a task (locks the board for 30s)
    Abandon { id: String },

    /// Edit any task field. Pushing a deadline back is noticed.
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        deadline: Option<String>,

        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,

        /// pending | completed | overdue | abandoned
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,
    },

    /// Delete a task (failures go to the hall of shame)
    Delete { id: String },

    /// Set your display name
    Nickname { name: String },

    /// Show the hall of shame
    Shame,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Setup => setup::run_setup(),
        Command::InitConfig => config::init_config(),
        Command::OnBoard(command) => run_board_command(cli.board, cli.json, command),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
}

fn run_board_command(board: Option<String>, json: bool, command: BoardCommand) -> Result<()> {
    let cfg = config::load_config()?;
    let tz = parse_tz(&cfg.display.timezone)?;
    let board_id = board.unwrap_or_else(|| cfg.board.id.clone());
    let svc = BoardService::new(state::open_store(&cfg)?, ThreadRandom);
    let now = Utc::now();
    tracing::debug!(board = %board_id, ?command, "dispatching");

    let result = match &command {
        BoardCommand::Board | BoardCommand::Shame => svc.get_board(&board_id, now),
        BoardCommand::Add {
            title,
            deadline,
            priority,
            description,
        } => {
            let new_task = NewTask {
                title: Some(title.clone()),
                description: description.clone(),
                priority: *priority,
                deadline: Some(parse_deadline(deadline, &cfg.display.timezone)?),
            };
            svc.add_task(&board_id, new_task, now)
        }
        BoardCommand::Complete { id } => {
            svc.update_task(&board_id, id, TaskPatch::status(TaskStatus::Completed), now)
        }
        BoardCommand::Abandon { id } => {
            svc.update_task(&board_id, id, TaskPatch::status(TaskStatus::Abandoned), now)
        }
        BoardCommand::Edit {
            id,
            title,
            description,
            deadline,
            priority,
            status,
        } => {
            let deadline = deadline
                .as_deref()
                .map(|d| parse_deadline(d, &cfg.display.timezone))
                .transpose()?;
            let patch = TaskPatch {
                title: title.clone(),
                description: description.clone(),
                deadline,
                priority: *priority,
                status: *status,
            };
            svc.update_task(&board_id, id, patch, now)
        }
        BoardCommand::Delete { id } => svc.delete_task(&board_id, id, now),
        BoardCommand::Nickname { name } => svc.set_nickname(&board_id, name, now),
    };

    let view = match result {
        Ok(view) => view,
        Err(BoardError::LockedOut { remaining_secs }) => {
            anyhow::bail!("LOCKED OUT. You quit on something; wait {remaining_secs}s.")
        }
        Err(e) => return Err(e).with_context(|| format!("board {board_id}")),
    };

    speak(&view, cfg.display.snark);

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else if matches!(command, BoardCommand::Shame) {
        print!("{}", render::render_shame(&view, tz));
    } else {
        print!("{}", render::render_board(&view, tz));
    }

    Ok(())
}

fn speak(view: &BoardView, enabled: bool) {
    let mut sink = snark::TerminalSink { muted: !enabled };
    for event in &view.events {
        sink.notify(event, view.board.nickname());
    }
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    match s.to_ascii_lowercase().as_str() {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        "critical" => Ok(Priority::Critical),
        other => Err(format!("unknown priority: {other}")),
    }
}

fn parse_status(s: &str) -> Result<TaskStatus, String> {
    match s.to_ascii_lowercase().as_str() {
        "pending" => Ok(TaskStatus::Pending),
        "completed" => Ok(TaskStatus::Completed),
        "overdue" => Ok(TaskStatus::Overdue),
        "abandoned" => Ok(TaskStatus::Abandoned),
        other => Err(format!("unknown status: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_edit_with_status_and_priority() {
        let cli = Cli::try_parse_from([
            "ruthless", "edit", "t1", "--status", "ABANDONED", "--priority", "high", "--board", "work",
        ])
        .unwrap();
        assert_eq!(cli.board.as_deref(), Some("work"));
        match cli.command {
            Command::OnBoard(BoardCommand::Edit { id, status, priority, .. }) => {
                assert_eq!(id, "t1");
                assert_eq!(status, Some(TaskStatus::Abandoned));
                assert_eq!(priority, Some(Priority::High));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn setup_commands_stay_off_the_board_path() {
        let cli = Cli::try_parse_from(["ruthless", "init-config"]).unwrap();
        assert!(matches!(cli.command, Command::InitConfig));
        let cli = Cli::try_parse_from(["ruthless", "shame"]).unwrap();
        assert!(matches!(cli.command, Command::OnBoard(BoardCommand::Shame)));
    }

    #[test]
    fn version_leads_with_package_version() {
        let cmd = Cli::command();
        let version = cmd.get_version().unwrap();
        assert!(version.starts_with(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn rejects_unknown_priority() {
        assert!(Cli::try_parse_from(["ruthless", "add", "--title", "x", "--deadline", "2026-01-01 10:00", "--priority", "meh"]).is_err());
    }
}
