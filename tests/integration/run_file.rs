// tests/integration/run_file.rs

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use termrun::cli::CliArgs;
use termrun::config::load_and_validate;
use termrun::strategy::TaskCommand;
use termrun::types::{Direction, QuitOnExit};
use termrun::{dry_run_report, load_run_file, run};

use crate::common::init_tracing;

fn args(argv: &[&str]) -> CliArgs {
    let mut full = vec!["termrun"];
    full.extend_from_slice(argv);
    CliArgs::try_parse_from(full).unwrap()
}

#[test]
fn full_run_file_is_parsed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Termrun.toml");
    fs::write(
        &path,
        r##"
[strategy]
use_shell = true
direction = "vertical"
quit_on_exit = "success"
open_on_start = false
auto_scroll = true

[strategy.highlights]
Normal = { bg = "#1e1e2e" }
Comment = { link = "Normal" }

[task]
name = "build"
cmd = ["cargo", "build", "--release"]
env = { RUST_LOG = "info" }
"##,
    )
    .unwrap();

    let run_file = load_and_validate(&path).unwrap();
    let strategy = &run_file.strategy;
    assert!(strategy.use_shell);
    assert_eq!(strategy.direction, Direction::Vertical);
    assert_eq!(strategy.quit_on_exit, QuitOnExit::Success);
    assert!(!strategy.open_on_start);
    assert!(!strategy.close_on_exit);
    assert_eq!(strategy.auto_scroll, Some(true));
    let highlights = strategy.highlights.as_ref().unwrap();
    assert_eq!(highlights["Normal"].bg.as_deref(), Some("#1e1e2e"));
    assert_eq!(highlights["Comment"].link.as_deref(), Some("Normal"));

    assert_eq!(run_file.task.name, "build");
    assert_eq!(
        run_file.task.cmd,
        TaskCommand::Args(vec!["cargo".into(), "build".into(), "--release".into()])
    );
    assert_eq!(run_file.task.env["RUST_LOG"], "info");
}

#[test]
fn defaults_apply_and_name_falls_back_to_command() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Termrun.toml");
    fs::write(&path, "[task]\ncmd = \"make test\"\n").unwrap();

    let run_file = load_and_validate(&path).unwrap();
    assert!(!run_file.strategy.use_shell);
    assert!(run_file.strategy.open_on_start);
    assert_eq!(run_file.strategy.quit_on_exit, QuitOnExit::Never);
    assert_eq!(run_file.strategy.direction, Direction::None);
    assert_eq!(run_file.task.name, "make test");
}

#[test]
fn relative_cwd_resolves_against_run_file_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    let path = dir.path().join("Termrun.toml");
    fs::write(&path, "[task]\ncmd = \"ls\"\ncwd = \"sub\"\n").unwrap();

    let run_file = load_run_file(&args(&["--config", path.to_str().unwrap()])).unwrap();
    assert_eq!(run_file.task.cwd, Some(dir.path().join("sub")));
}

#[test]
fn command_line_overrides_task_cmd() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Termrun.toml");
    fs::write(&path, "[task]\nname = \"t\"\ncmd = \"false\"\n").unwrap();

    let run_file = load_run_file(&args(&[
        "--config",
        path.to_str().unwrap(),
        "--",
        "echo",
        "a b",
    ]))
    .unwrap();
    assert_eq!(run_file.task.name, "t");
    assert_eq!(
        run_file.task.cmd,
        TaskCommand::Args(vec!["echo".into(), "a b".into()])
    );
}

#[test]
fn default_run_file_may_be_missing_when_command_given() {
    let run_file = load_run_file(&args(&["--", "echo", "hi"])).unwrap();
    assert_eq!(run_file.task.name, "echo hi");
    assert_eq!(run_file.task.cwd, None);
}

#[test]
fn explicit_run_file_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let missing: PathBuf = dir.path().join("missing.toml");

    let err = load_run_file(&args(&["--config", missing.to_str().unwrap(), "--", "true"]))
        .unwrap_err();
    assert!(format!("{err:#}").contains("missing.toml"));
}

#[cfg(unix)]
#[tokio::test]
async fn run_returns_the_task_exit_code() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Termrun.toml");
    fs::write(
        &path,
        "[strategy]\nquit_on_exit = \"always\"\n\n[task]\ncmd = \"echo done; exit 7\"\n",
    )
    .unwrap();

    let code = run(args(&["--config", path.to_str().unwrap()])).await.unwrap();
    assert_eq!(code, 7);
}

#[tokio::test]
async fn dry_run_does_not_execute() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("ran");
    let cmd = format!("touch {}", marker.display());

    let code = run(args(&["--dry-run", "--", "sh", "-c", cmd.as_str()])).await.unwrap();
    assert_eq!(code, 0);
    assert!(!marker.exists());
}

#[test]
fn dry_run_report_shows_readable_argv_and_quoted_cmd() {
    let run_file = load_run_file(&args(&["--", "echo", "a b", "plain"])).unwrap();
    let report = dry_run_report(&run_file);

    assert!(report.contains("  argv: echo 'a b' plain\n"), "{report}");
    assert!(report.contains("  cmd: 'echo' 'a b' 'plain'\n"), "{report}");
    assert!(!report.contains("send:"));
}
