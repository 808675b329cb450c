// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Raw handle value meaning "the session rejected its arguments".
pub const INVALID_ARGUMENTS_HANDLE: i64 = 0;

/// Raw handle value meaning "the command could not be executed".
pub const NOT_EXECUTABLE_HANDLE: i64 = -1;

/// Identifier of a live job started by a terminal session.
///
/// Only non-sentinel handles are ever wrapped in a `JobId`; see
/// [`classify_job_handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(i64);

impl JobId {
    /// Wrap a raw handle, or `None` if it is one of the sentinel values.
    pub fn new(raw: i64) -> Option<JobId> {
        match classify_job_handle(raw) {
            JobHandle::Running(id) => Some(id),
            _ => None,
        }
    }

    pub fn raw(self) -> i64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the output buffer attached to a terminal session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a raw job handle returned by a session means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobHandle {
    /// Handle `0`.
    InvalidArguments,
    /// Handle `-1`.
    NotExecutable,
    /// Any other value.
    Running(JobId),
}

/// Sort a raw handle into the sentinel cases or a live job id.
pub fn classify_job_handle(raw: i64) -> JobHandle {
    match raw {
        INVALID_ARGUMENTS_HANDLE => JobHandle::InvalidArguments,
        NOT_EXECUTABLE_HANDLE => JobHandle::NotExecutable,
        id => JobHandle::Running(JobId(id)),
    }
}

/// Where the terminal window is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Vertical,
    Horizontal,
    Tab,
    /// Let the terminal component pick (its own default layout).
    #[default]
    None,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vertical" => Ok(Direction::Vertical),
            "horizontal" => Ok(Direction::Horizontal),
            "tab" => Ok(Direction::Tab),
            "none" => Ok(Direction::None),
            other => Err(format!(
                "invalid direction: {other} (expected \"vertical\", \"horizontal\", \"tab\" or \"none\")"
            )),
        }
    }
}

/// Whether the terminal session is closed once the job exits.
///
/// - `Never` (default): leave the terminal around for inspection.
/// - `Always`: close it regardless of the exit code.
/// - `Success`: close it only when the exit code is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuitOnExit {
    #[default]
    Never,
    Always,
    Success,
}

impl QuitOnExit {
    /// Decide whether a job that exited with `code` should close its session.
    pub fn should_close(self, code: i32) -> bool {
        match self {
            QuitOnExit::Never => false,
            QuitOnExit::Always => true,
            QuitOnExit::Success => code == 0,
        }
    }
}

impl FromStr for QuitOnExit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "never" => Ok(QuitOnExit::Never),
            "always" => Ok(QuitOnExit::Always),
            "success" => Ok(QuitOnExit::Success),
            other => Err(format!(
                "invalid quit_on_exit: {other} (expected \"never\", \"always\" or \"success\")"
            )),
        }
    }
}
