// src/strategy/terminal.rs

//! Strategy that runs a task inside a terminal session.
//!
//! The terminal component creates the process and the UI buffer; this
//! strategy builds the command, wires the session hooks, reassembles output
//! lines and decides what happens when the job exits.
//!
//! Session hooks can fire at any time relative to `stop`/`reset`/`dispose`.
//! Each hook compares the job id it was called with against the current
//! `channel_id`; once that has been cleared (by `stop` or by the exit hook)
//! every late callback for the old job is ignored.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use tracing::{debug, info, trace, warn};

use crate::config::StrategyConfig;
use crate::errors::{Result, TermrunError};
use crate::exec::lines::LineSplitter;
use crate::exec::registry::JobRegistry;
use crate::exec::shell::{escape_args, QuoteMode, EXIT_STATUS_LINE};
use crate::host::HostState;
use crate::strategy::{Strategy, Task, TaskCommand, TaskEvent};
use crate::terminal::{
    OnCreateHook, OnExitHook, OnStdoutHook, SessionOptions, TerminalService, TerminalSession,
};
use crate::types::{classify_job_handle, BufferId, Direction, JobHandle, JobId};

/// Mutable per-instance state, shared with the session hooks.
#[derive(Default)]
struct StrategyState {
    buffer_id: Option<BufferId>,
    channel_id: Option<JobId>,
    session: Option<Box<dyn TerminalSession>>,
    splitter: LineSplitter,
}

type SharedState = Arc<Mutex<StrategyState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, StrategyState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Runs tasks through a [`TerminalService`].
pub struct TerminalStrategy {
    config: StrategyConfig,
    service: Arc<dyn TerminalService>,
    registry: Arc<JobRegistry>,
    host: HostState,
    state: SharedState,
    disposed: bool,
}

impl TerminalStrategy {
    /// Create a strategy using the process-wide job registry and host flag.
    pub fn new(config: StrategyConfig, service: Arc<dyn TerminalService>) -> Self {
        Self {
            config,
            service,
            registry: JobRegistry::global(),
            host: HostState::global(),
            state: SharedState::default(),
            disposed: false,
        }
    }

    /// Track jobs in `registry` instead of the process-wide one.
    pub fn with_registry(mut self, registry: Arc<JobRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Consult `host` instead of the process-wide shutdown flag.
    pub fn with_host(mut self, host: HostState) -> Self {
        self.host = host;
        self
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Job currently owned by this strategy, if it is still running.
    pub fn channel_id(&self) -> Option<JobId> {
        lock(&self.state).channel_id
    }

    pub fn has_session(&self) -> bool {
        lock(&self.state).session.is_some()
    }

    fn build_on_create(&self, shell_input: Option<String>) -> OnCreateHook {
        let user_hook = self.config.on_create.clone();

        Box::new(move |session: &mut dyn TerminalSession| {
            if let Some(hook) = &user_hook {
                hook(&mut *session);
            }
            if let Some(cmd) = &shell_input {
                session.send(cmd);
                session.send(EXIT_STATUS_LINE);
            }
        })
    }

    fn build_on_stdout(&self, task: &Arc<dyn Task>) -> OnStdoutHook {
        let state = Arc::clone(&self.state);
        let task = Arc::clone(task);

        Box::new(move |_session: &mut dyn TerminalSession, job: JobId, chunk: &[String]| {
            let lines = {
                let mut st = lock(&state);
                if st.channel_id != Some(job) {
                    trace!(task = %task.name(), job = %job, "dropping output from stale job");
                    return;
                }
                st.splitter.feed(chunk)
            };

            forward_chunk(&*task, chunk, lines);
        })
    }

    fn build_on_exit(&self, task: &Arc<dyn Task>) -> OnExitHook {
        let state = Arc::clone(&self.state);
        let task = Arc::clone(task);
        let registry = Arc::clone(&self.registry);
        let host = self.host.clone();
        let quit_on_exit = self.config.quit_on_exit;

        Box::new(move |session: &mut dyn TerminalSession, job: JobId, code: i32| {
            registry.unregister(job);

            let flush = [String::new()];
            let trailing = {
                let mut st = lock(&state);
                if st.channel_id != Some(job) {
                    debug!(task = %task.name(), job = %job, code, "ignoring exit of stale job");
                    return;
                }
                let trailing = st.splitter.feed(&flush);
                st.channel_id = None;
                trailing
            };

            info!(task = %task.name(), job = %job, exit_code = code, "terminal job exited");

            forward_chunk(&*task, &flush, trailing);

            if host.is_exiting() {
                debug!(task = %task.name(), "host is exiting; not notifying task");
            } else {
                task.notify_exit(code);
            }

            if quit_on_exit.should_close(code) {
                debug!(task = %task.name(), ?quit_on_exit, code, "closing terminal after exit");
                session.close();
            }
        })
    }
}

/// Dispatch a raw chunk as `output`, then the lines it completed (if any)
/// as `output-lines`.
fn forward_chunk(task: &dyn Task, chunk: &[String], lines: Vec<String>) {
    task.dispatch(TaskEvent::Output(chunk.to_vec()));
    if !lines.is_empty() {
        task.dispatch(TaskEvent::OutputLines(lines));
    }
}

/// Turn the task command into one command line.
pub fn resolve_command(cmd: &TaskCommand) -> String {
    match cmd {
        TaskCommand::Shell(s) => s.clone(),
        TaskCommand::Args(args) => escape_args(args, QuoteMode::Strong),
    }
}

impl Strategy for TerminalStrategy {
    fn start(&mut self, task: Arc<dyn Task>) -> Result<()> {
        if self.disposed {
            return Err(TermrunError::Other(anyhow!(
                "cannot start task '{}': strategy has been disposed",
                task.name()
            )));
        }

        if self.has_session() {
            debug!(task = %task.name(), "strategy already owns a session; resetting first");
            self.reset();
        }

        let resolved = resolve_command(task.cmd());
        let (passed_cmd, shell_input) = if self.config.use_shell {
            (None, Some(resolved.clone()))
        } else {
            (Some(resolved.clone()), None)
        };

        lock(&self.state).splitter = LineSplitter::new();

        let options = SessionOptions {
            cmd: passed_cmd,
            env: task.env().clone(),
            dir: task.cwd().map(|p| p.to_path_buf()),
            direction: match self.config.direction {
                Direction::None => None,
                d => Some(d),
            },
            highlights: self.config.highlights.clone(),
            auto_scroll: self.config.auto_scroll,
            close_on_exit: self.config.close_on_exit,
            hidden: self.config.hidden,
            on_create: Some(self.build_on_create(shell_input)),
            on_stdout: Some(self.build_on_stdout(&task)),
            on_exit: Some(self.build_on_exit(&task)),
        };

        info!(
            task = %task.name(),
            cmd = %resolved,
            use_shell = self.config.use_shell,
            "starting task in terminal"
        );

        let mut session = self.service.create(options);
        if self.config.open_on_start {
            session.toggle();
        } else {
            session.spawn();
        }

        let raw_handle = session.job_handle();
        let buffer_id = session.buffer_id();
        {
            let mut st = lock(&self.state);
            st.buffer_id = buffer_id;
            st.session = Some(session);
        }

        match classify_job_handle(raw_handle) {
            JobHandle::InvalidArguments => {
                warn!(task = %task.name(), "terminal rejected job arguments");
                Err(TermrunError::InvalidArguments {
                    task: task.name().to_string(),
                })
            }
            JobHandle::NotExecutable => {
                warn!(task = %task.name(), cmd = %resolved, "command is not executable");
                Err(TermrunError::CommandNotExecutable {
                    task: task.name().to_string(),
                    command: format!("{resolved:?}"),
                })
            }
            JobHandle::Running(job) => {
                self.registry.register(job);
                lock(&self.state).channel_id = Some(job);
                debug!(task = %task.name(), job = %job, buffer = ?buffer_id, "terminal job started");
                Ok(())
            }
        }
    }

    fn stop(&mut self) {
        let Some(job) = lock(&self.state).channel_id.take() else {
            return;
        };

        // Not registered any more: a shutdown routine already signalled it.
        if self.registry.unregister(job) {
            info!(job = %job, "stopping terminal job");
            self.service.stop_job(job);
        } else {
            debug!(job = %job, "job already stopped through the registry");
        }
    }

    fn reset(&mut self) {
        let buffer = lock(&self.state).buffer_id.take();
        if let Some(buffer) = buffer {
            self.service.delete_buffer(buffer);
        }

        self.stop();

        let session = lock(&self.state).session.take();
        if let Some(mut session) = session {
            session.close();
        }
    }

    fn dispose(&mut self) {
        self.stop();

        let (buffer, session) = {
            let mut st = lock(&self.state);
            (st.buffer_id.take(), st.session.take())
        };
        if let Some(buffer) = buffer {
            self.service.delete_buffer(buffer);
        }
        drop(session);

        self.disposed = true;
        debug!("terminal strategy disposed");
    }

    fn buffer_id(&self) -> Option<BufferId> {
        lock(&self.state).buffer_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_lists_are_strongly_quoted() {
        let cmd = TaskCommand::Args(vec!["echo".into(), "hi there".into()]);
        assert_eq!(resolve_command(&cmd), "'echo' 'hi there'");
    }

    #[test]
    fn shell_strings_pass_through() {
        let cmd = TaskCommand::Shell("echo $HOME | wc -c".into());
        assert_eq!(resolve_command(&cmd), "echo $HOME | wc -c");
    }
}
