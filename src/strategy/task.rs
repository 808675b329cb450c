// src/strategy/task.rs

//! The task side of a strategy: what to run and where events go.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

/// Command of a task, either a ready-made command line or an argument list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TaskCommand {
    Shell(String),
    Args(Vec<String>),
}

impl TaskCommand {
    pub fn is_empty(&self) -> bool {
        match self {
            TaskCommand::Shell(s) => s.trim().is_empty(),
            TaskCommand::Args(args) => args.is_empty(),
        }
    }
}

impl fmt::Display for TaskCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskCommand::Shell(s) => f.write_str(s),
            TaskCommand::Args(args) => write!(f, "{}", args.join(" ")),
        }
    }
}

/// Events a strategy dispatches to its task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// Raw output chunk, exactly as the session reported it.
    Output(Vec<String>),
    /// Lines completed by the latest chunk (or by the final flush).
    OutputLines(Vec<String>),
}

impl TaskEvent {
    /// Event name as seen by task listeners.
    pub fn name(&self) -> &'static str {
        match self {
            TaskEvent::Output(_) => "output",
            TaskEvent::OutputLines(_) => "output-lines",
        }
    }
}

/// A unit of work run by a strategy.
///
/// Implementations are shared with session callbacks, which may be invoked
/// from the terminal backend's runtime, hence `Send + Sync`.
pub trait Task: Send + Sync {
    fn name(&self) -> &str;
    fn cmd(&self) -> &TaskCommand;
    fn env(&self) -> &BTreeMap<String, String>;
    fn cwd(&self) -> Option<&Path>;

    /// Receive an output event.
    fn dispatch(&self, event: TaskEvent);

    /// The job finished with `code`.
    fn notify_exit(&self, code: i32);
}
