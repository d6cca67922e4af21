use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use ruthless_core::JsonFileStore;

use crate::config::Config;

/// `$RUTHLESS_HOME`, or `~/.ruthless`.
pub fn ruthless_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("RUTHLESS_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".ruthless"))
}

pub fn ensure_ruthless_home() -> Result<PathBuf> {
    let dir = ruthless_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Board documents live in `config.board.data_dir`, resolved against the home
/// dir when relative.
pub fn boards_dir(cfg: &Config) -> Result<PathBuf> {
    let dir = PathBuf::from(&cfg.board.data_dir);
    if dir.is_absolute() {
        return Ok(dir);
    }
    Ok(ensure_ruthless_home()?.join(dir))
}

pub fn open_store(cfg: &Config) -> Result<JsonFileStore> {
    Ok(JsonFileStore::new(boards_dir(cfg)?))
}
