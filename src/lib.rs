// src/lib.rs

pub mod cli;
pub mod config;
pub mod console;
pub mod errors;
pub mod exec;
pub mod host;
pub mod logging;
pub mod strategy;
pub mod terminal;
pub mod types;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{default_config_path, load_from_path, RawRunFile, RunFile};
use crate::console::ConsoleTask;
use crate::exec::{escape_args, JobRegistry, QuoteMode, EXIT_STATUS_LINE};
use crate::host::HostState;
use crate::strategy::{resolve_command, Strategy, TaskCommand, TerminalStrategy};
use crate::terminal::PipeTerminalService;

/// Exit code reported when the run is interrupted with Ctrl-C.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - run file loading (plus the command-line override)
/// - the pipe terminal service
/// - the terminal strategy and a console task
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<i32> {
    let run_file = load_run_file(&args)?;

    if args.dry_run {
        print_dry_run(&run_file);
        return Ok(0);
    }

    let service = Arc::new(PipeTerminalService::new());
    let (exit_tx, mut exit_rx) = mpsc::unbounded_channel::<i32>();
    let task = Arc::new(ConsoleTask::new(run_file.task.clone(), exit_tx));

    let mut strategy = TerminalStrategy::new(run_file.strategy.clone(), service.clone());
    strategy
        .start(task)
        .with_context(|| format!("starting task '{}'", run_file.task.name))?;

    let code = tokio::select! {
        code = exit_rx.recv() => code.unwrap_or(-1),
        _ = wait_for_ctrl_c() => {
            info!("interrupted; stopping jobs");
            HostState::global().begin_shutdown();
            JobRegistry::global().stop_all(service.as_ref());
            INTERRUPTED_EXIT_CODE
        }
    };

    strategy.dispose();
    debug!(code, "run finished");
    Ok(code)
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Build the validated run file from `--config` and the trailing command.
///
/// The default run file may be absent when a command is given on the
/// command line; an explicitly named file must exist.
pub fn load_run_file(args: &CliArgs) -> Result<RunFile> {
    let config_path = PathBuf::from(&args.config);

    let mut raw = if !config_path.exists()
        && !args.cmd.is_empty()
        && config_path == default_config_path()
    {
        debug!(path = ?config_path, "no run file; using command line only");
        RawRunFile::default()
    } else {
        let mut raw = load_from_path(&config_path)
            .with_context(|| format!("loading run file {:?}", config_path))?;
        if let Some(cwd) = raw.task.cwd.take() {
            raw.task.cwd = Some(resolve_against(&config_root_dir(&config_path), cwd));
        }
        raw
    };

    if !args.cmd.is_empty() {
        raw.task.cmd = Some(TaskCommand::Args(args.cmd.clone()));
    }

    RunFile::try_from(raw).with_context(|| format!("validating run file {:?}", config_path))
}

/// Directory relative task paths are resolved against.
///
/// - If the run file path has a non-empty parent (e.g. "ci/Termrun.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Termrun.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn resolve_against(root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

/// Simple dry-run output: print the strategy options and the command.
fn print_dry_run(run_file: &RunFile) {
    print!("{}", dry_run_report(run_file));
    debug!("dry-run complete (no execution)");
}

/// Text printed by `--dry-run`.
///
/// Argument lists are also shown minimally escaped (`argv:`), which is easier
/// to read than the fully quoted line the terminal receives.
pub fn dry_run_report(run_file: &RunFile) -> String {
    let strategy = &run_file.strategy;
    let task = &run_file.task;
    let resolved = resolve_command(&task.cmd);
    let mut out = String::new();

    let _ = writeln!(out, "termrun dry-run");
    let _ = writeln!(out, "  strategy.use_shell = {}", strategy.use_shell);
    let _ = writeln!(out, "  strategy.direction = {:?}", strategy.direction);
    let _ = writeln!(out, "  strategy.close_on_exit = {}", strategy.close_on_exit);
    let _ = writeln!(out, "  strategy.quit_on_exit = {:?}", strategy.quit_on_exit);
    let _ = writeln!(out, "  strategy.open_on_start = {}", strategy.open_on_start);
    let _ = writeln!(out, "  strategy.hidden = {}", strategy.hidden);
    if let Some(auto_scroll) = strategy.auto_scroll {
        let _ = writeln!(out, "  strategy.auto_scroll = {auto_scroll}");
    }
    if let Some(ref highlights) = strategy.highlights {
        let _ = writeln!(
            out,
            "  strategy.highlights = {:?}",
            highlights.keys().collect::<Vec<_>>()
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "task: {}", task.name);
    if let TaskCommand::Args(args) = &task.cmd {
        let _ = writeln!(out, "  argv: {}", escape_args(args, QuoteMode::Escape));
    }
    if strategy.use_shell {
        let _ = writeln!(out, "  send: {resolved}");
        let _ = writeln!(out, "  send: {}", EXIT_STATUS_LINE);
    } else {
        let _ = writeln!(out, "  cmd: {resolved}");
    }
    if let Some(ref cwd) = task.cwd {
        let _ = writeln!(out, "  cwd: {}", cwd.display());
    }
    for (key, value) in task.env.iter() {
        let _ = writeln!(out, "  env: {key}={value}");
    }

    out
}
