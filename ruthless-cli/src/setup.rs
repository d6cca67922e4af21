use anyhow::{Context, Result};
use chrono::Utc;
use ruthless_core::{BoardService, ThreadRandom};
use std::io::{self, Write};

use crate::config::{config_path, load_config, save_config};
use crate::state::open_store;

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

/// Onboarding: a nickname is mandatory, the timezone is optional.
pub fn run_setup() -> Result<()> {
    println!("Ruthless setup\n");

    let nickname = loop {
        let name = prompt("What should I call you (required)")?;
        if !name.is_empty() {
            break name;
        }
        println!("No name, no service.");
    };

    let mut cfg = load_config()?;
    let tz = prompt(&format!("Timezone [{}]", cfg.display.timezone))?;
    if !tz.is_empty() {
        ruthless_core::time::parse_tz(&tz)?;
        cfg.display.timezone = tz;
    }
    save_config(&cfg)?;

    let svc = BoardService::new(open_store(&cfg)?, ThreadRandom);
    svc.set_nickname(&cfg.board.id, &nickname, Utc::now())
        .with_context(|| format!("set nickname on board {}", cfg.board.id))?;

    println!("\nWrote:");
    println!("- {}", config_path()?.display());
    println!("\nNext: ruthless add --title \"...\" --deadline \"YYYY-MM-DD HH:MM\"");

    Ok(())
}
