use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use termrun::strategy::{Task, TaskCommand, TaskEvent};

/// Something a `RecordingTask` was told, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Event(TaskEvent),
    Exit(i32),
}

/// A task that records every event and exit notification.
pub struct RecordingTask {
    name: String,
    cmd: TaskCommand,
    env: BTreeMap<String, String>,
    cwd: Option<PathBuf>,
    log: Mutex<Vec<Recorded>>,
}

impl RecordingTask {
    pub fn new(name: &str, cmd: TaskCommand) -> Self {
        Self {
            name: name.to_string(),
            cmd,
            env: BTreeMap::new(),
            cwd: None,
            log: Mutex::new(Vec::new()),
        }
    }

    /// Shell-string task named after its command.
    pub fn shell(cmd: &str) -> Arc<Self> {
        Arc::new(Self::new(cmd, TaskCommand::Shell(cmd.to_string())))
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    /// All lines delivered through `output-lines` events, concatenated.
    pub fn lines(&self) -> Vec<String> {
        self.recorded()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Event(TaskEvent::OutputLines(lines)) => Some(lines),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn exits(&self) -> Vec<i32> {
        self.recorded()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Exit(code) => Some(code),
                _ => None,
            })
            .collect()
    }

    /// Event names in arrival order (`output`, `output-lines`, `exit`).
    pub fn event_names(&self) -> Vec<&'static str> {
        self.recorded()
            .iter()
            .map(|r| match r {
                Recorded::Event(e) => e.name(),
                Recorded::Exit(_) => "exit",
            })
            .collect()
    }
}

impl Task for RecordingTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn cmd(&self) -> &TaskCommand {
        &self.cmd
    }

    fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    fn dispatch(&self, event: TaskEvent) {
        self.log.lock().unwrap().push(Recorded::Event(event));
    }

    fn notify_exit(&self, code: i32) {
        self.log.lock().unwrap().push(Recorded::Exit(code));
    }
}
