mod common;
use crate::common::{Harness, RecordingTask, StrategyConfigBuilder};

use std::sync::{Arc, Mutex};

use termrun::config::StrategyConfig;
use termrun::errors::TermrunError;
use termrun::strategy::{Strategy, TaskCommand};
use termrun::terminal::TerminalSession;
use termrun::types::QuitOnExit;

fn closes_after_exit(quit_on_exit: QuitOnExit, code: i32) -> usize {
    let config = StrategyConfigBuilder::new().quit_on_exit(quit_on_exit).build();
    let mut h = Harness::new(config);
    let task = RecordingTask::shell("exit");
    h.strategy.start(task.clone()).unwrap();
    let job = h.session().job().unwrap();

    h.service.emit_exit(job, code);
    assert_eq!(task.exits(), vec![code]);
    h.session().closes()
}

#[test]
fn quit_on_exit_decides_whether_the_session_closes() {
    assert_eq!(closes_after_exit(QuitOnExit::Never, 0), 0);
    assert_eq!(closes_after_exit(QuitOnExit::Never, 1), 0);
    assert_eq!(closes_after_exit(QuitOnExit::Always, 0), 1);
    assert_eq!(closes_after_exit(QuitOnExit::Always, 1), 1);
    assert_eq!(closes_after_exit(QuitOnExit::Success, 0), 1);
    assert_eq!(closes_after_exit(QuitOnExit::Success, 2), 0);
}

#[test]
fn exit_is_reported_once() {
    let mut h = Harness::new(StrategyConfig::default());
    let task = RecordingTask::shell("true");
    h.strategy.start(task.clone()).unwrap();
    let job = h.session().job().unwrap();

    h.service.emit_exit(job, 0);
    h.service.emit_exit(job, 0);

    assert_eq!(task.exits(), vec![0]);
}

#[test]
fn host_shutdown_suppresses_exit_notification() {
    let config = StrategyConfigBuilder::new()
        .quit_on_exit(QuitOnExit::Always)
        .build();
    let mut h = Harness::new(config);
    let task = RecordingTask::shell("sleep 10");
    h.strategy.start(task.clone()).unwrap();
    let job = h.session().job().unwrap();

    h.service.emit_stdout(job, &["bye"]);
    h.host.begin_shutdown();
    h.service.emit_exit(job, 130);

    assert!(task.exits().is_empty());
    assert_eq!(task.lines(), vec!["bye"], "trailing output is still flushed");
    assert_eq!(h.session().closes(), 1);
    assert!(h.registry.is_empty());
}

#[test]
fn invalid_arguments_handle_is_an_error() {
    let mut h = Harness::new(StrategyConfig::default());
    h.service.force_next_handle(0);

    let err = h.strategy.start(RecordingTask::shell("bad")).unwrap_err();
    match err {
        TermrunError::InvalidArguments { task } => assert_eq!(task, "bad"),
        other => panic!("expected InvalidArguments, got {other:?}"),
    }
    assert_eq!(h.strategy.channel_id(), None);
    assert!(h.registry.is_empty());
    assert!(h.strategy.has_session(), "session is kept for reset/dispose");
}

#[test]
fn not_executable_handle_names_the_command() {
    let mut h = Harness::new(StrategyConfig::default());
    h.service.force_next_handle(-1);

    let task = Arc::new(RecordingTask::new(
        "missing",
        TaskCommand::Args(vec!["no-such-binary".into(), "--flag".into()]),
    ));
    let err = h.strategy.start(task).unwrap_err();
    match &err {
        TermrunError::CommandNotExecutable { task, command } => {
            assert_eq!(task, "missing");
            assert!(command.contains("no-such-binary"));
        }
        other => panic!("expected CommandNotExecutable, got {other:?}"),
    }
    assert!(err.to_string().contains("not executable"));
    assert!(h.registry.is_empty());

    // A failed start can still be cleaned up.
    h.strategy.reset();
    assert_eq!(h.service.deleted_buffers().len(), 1);
    assert!(h.service.stopped_jobs().is_empty());
}

#[test]
fn use_shell_types_command_then_exit_status() {
    let config = StrategyConfigBuilder::new().use_shell(true).build();
    let mut h = Harness::new(config);

    let task = Arc::new(RecordingTask::new(
        "greet",
        TaskCommand::Args(vec!["echo".into(), "it's".into()]),
    ));
    h.strategy.start(task).unwrap();

    let session = h.session();
    assert_eq!(session.cmd(), None, "the shell itself is started");
    assert_eq!(session.sends(), vec!["'echo' 'it'\\''s'", "exit $?"]);
}

#[test]
fn without_use_shell_nothing_is_typed() {
    let mut h = Harness::new(StrategyConfig::default());
    h.strategy.start(RecordingTask::shell("echo hi")).unwrap();

    let session = h.session();
    assert_eq!(session.cmd().as_deref(), Some("echo hi"));
    assert!(session.sends().is_empty());
}

#[test]
fn user_on_create_runs_before_shell_input() {
    let seen = Arc::new(Mutex::new(Vec::<Option<u64>>::new()));
    let seen_in_hook = Arc::clone(&seen);

    let config = StrategyConfigBuilder::new()
        .use_shell(true)
        .on_create(move |session: &mut dyn TerminalSession| {
            seen_in_hook
                .lock()
                .unwrap()
                .push(session.buffer_id().map(|b| b.0));
            session.send("export GREETING=hi");
        })
        .build();
    let mut h = Harness::new(config);
    h.strategy.start(RecordingTask::shell("echo $GREETING")).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![Some(1)]);
    assert_eq!(
        h.session().sends(),
        vec!["export GREETING=hi", "echo $GREETING", "exit $?"]
    );
}
