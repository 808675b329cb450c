// src/terminal/mod.rs

//! Interface to the terminal component that owns processes and buffers.
//!
//! The strategy never creates processes itself. It describes what it wants
//! in [`SessionOptions`], hands that to a [`TerminalService`], and reacts to
//! the hooks the session calls back into.
//!
//! - [`pipe`] is a headless implementation on top of `tokio::process`.
//! - Tests use the fake service from the `termrun-test-utils` crate.

pub mod pipe;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::config::HighlightStyle;
use crate::types::{BufferId, Direction, JobId};

pub use pipe::PipeTerminalService;

/// Called once the session has been created and its job started.
pub type OnCreateHook = Box<dyn FnMut(&mut dyn TerminalSession) + Send>;

/// Called with each raw output chunk (see [`crate::exec::lines`]).
pub type OnStdoutHook = Box<dyn FnMut(&mut dyn TerminalSession, JobId, &[String]) + Send>;

/// Called once when a job exits, with its exit code.
pub type OnExitHook = Box<dyn FnMut(&mut dyn TerminalSession, JobId, i32) + Send>;

/// Everything a terminal service needs to create a session.
#[derive(Default)]
pub struct SessionOptions {
    /// Command to run. `None` starts the session's own shell.
    pub cmd: Option<String>,
    pub env: BTreeMap<String, String>,
    pub dir: Option<PathBuf>,
    pub direction: Option<Direction>,
    pub highlights: Option<BTreeMap<String, HighlightStyle>>,
    pub auto_scroll: Option<bool>,
    pub close_on_exit: bool,
    pub hidden: bool,
    pub on_create: Option<OnCreateHook>,
    pub on_stdout: Option<OnStdoutHook>,
    pub on_exit: Option<OnExitHook>,
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("cmd", &self.cmd)
            .field("env", &self.env)
            .field("dir", &self.dir)
            .field("direction", &self.direction)
            .field("highlights", &self.highlights)
            .field("auto_scroll", &self.auto_scroll)
            .field("close_on_exit", &self.close_on_exit)
            .field("hidden", &self.hidden)
            .field("on_create", &self.on_create.is_some())
            .field("on_stdout", &self.on_stdout.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .finish()
    }
}

/// A terminal session: one UI buffer plus at most one job.
pub trait TerminalSession: Send {
    /// Buffer holding the session output, once one exists.
    fn buffer_id(&self) -> Option<BufferId>;

    /// Raw job handle. `0` until a job has been started, `-1` when the
    /// command could not be executed, a job id otherwise.
    fn job_handle(&self) -> i64;

    /// Show the session, starting its job if it has not been started yet.
    fn toggle(&mut self);

    /// Start the job without showing anything.
    fn spawn(&mut self);

    /// Close the session UI.
    fn close(&mut self);

    /// Type a line of input into the job.
    fn send(&mut self, text: &str);
}

/// Factory for sessions plus the job/buffer operations that are not tied to
/// a session handle.
pub trait TerminalService: Send + Sync {
    fn create(&self, options: SessionOptions) -> Box<dyn TerminalSession>;

    /// Ask a job to terminate. Must be a no-op for jobs that already exited.
    fn stop_job(&self, job: JobId);

    /// Delete a buffer. Must be a no-op for buffers that no longer exist.
    fn delete_buffer(&self, buffer: BufferId);
}
