// src/config/validate.rs

use tracing::warn;

use crate::config::model::RawRunFile;
use crate::errors::{Result, TermrunError};
use crate::strategy::TaskCommand;
use crate::types::QuitOnExit;

/// Run semantic validation against a raw run file.
///
/// Errors:
/// - missing or empty `[task].cmd`
/// - an argument list whose program (first element) is empty
/// - an explicit but blank `[task].name`
/// - a `[task].cwd` that is not an existing directory
///
/// Warnings only (the combination still works, it is just redundant or
/// surprising):
/// - `close_on_exit = true` together with a `quit_on_exit` other than "never"
/// - `hidden = true` together with `open_on_start = true`
pub fn validate_run_file(raw: &RawRunFile) -> Result<()> {
    validate_task(raw)?;
    warn_on_strategy_combinations(raw);
    Ok(())
}

fn validate_task(raw: &RawRunFile) -> Result<()> {
    let task = &raw.task;

    match &task.cmd {
        None => {
            return Err(TermrunError::ConfigError(
                "[task].cmd is required (or pass a command after `--`)".to_string(),
            ));
        }
        Some(cmd) if cmd.is_empty() => {
            return Err(TermrunError::ConfigError(
                "[task].cmd must not be empty".to_string(),
            ));
        }
        Some(TaskCommand::Args(args)) if args[0].trim().is_empty() => {
            return Err(TermrunError::ConfigError(
                "[task].cmd: first argument (the program) must not be empty".to_string(),
            ));
        }
        Some(_) => {}
    }

    if let Some(name) = &task.name {
        if name.trim().is_empty() {
            return Err(TermrunError::ConfigError(
                "[task].name must not be blank when given".to_string(),
            ));
        }
    }

    if let Some(cwd) = &task.cwd {
        if !cwd.is_dir() {
            return Err(TermrunError::ConfigError(format!(
                "[task].cwd {:?} is not an existing directory",
                cwd
            )));
        }
    }

    Ok(())
}

fn warn_on_strategy_combinations(raw: &RawRunFile) {
    let strategy = &raw.strategy;

    if strategy.close_on_exit && strategy.quit_on_exit != QuitOnExit::Never {
        warn!(
            quit_on_exit = ?strategy.quit_on_exit,
            "close_on_exit already closes the terminal on exit; quit_on_exit is redundant"
        );
    }

    if strategy.hidden && strategy.open_on_start {
        warn!("hidden terminal will still be shown on start because open_on_start = true");
    }
}
