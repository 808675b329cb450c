// src/strategy/mod.rs

//! Execution strategies.
//!
//! A strategy decides *how* a task's command is run. Every strategy exposes
//! the same lifecycle through the [`Strategy`] trait so callers can pick one
//! per task without caring about the details:
//!
//! - [`terminal`] runs the command inside a terminal session provided by a
//!   [`crate::terminal::TerminalService`].
//! - [`task`] defines the task side of the contract ([`Task`], [`TaskEvent`]).

pub mod task;
pub mod terminal;

use std::sync::Arc;

use crate::errors::Result;
use crate::types::BufferId;

pub use task::{Task, TaskCommand, TaskEvent};
pub use terminal::{resolve_command, TerminalStrategy};

/// Lifecycle shared by all execution strategies.
pub trait Strategy: Send {
    /// Start running `task`. Output and exit are reported to the task.
    fn start(&mut self, task: Arc<dyn Task>) -> Result<()>;

    /// Ask the running job to terminate. Never fails.
    fn stop(&mut self);

    /// Release the job, buffer and session so the strategy can start again.
    fn reset(&mut self);

    /// Stop and release everything for good.
    fn dispose(&mut self);

    /// Buffer holding the task output, if any.
    fn buffer_id(&self) -> Option<BufferId>;
}
