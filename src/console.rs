// src/console.rs

//! Task implementation used by the `termrun` binary: prints completed output
//! lines to stdout and reports the exit code over a channel.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::config::TaskSpec;
use crate::strategy::{Task, TaskCommand, TaskEvent};

pub struct ConsoleTask {
    spec: TaskSpec,
    exit_tx: mpsc::UnboundedSender<i32>,
}

impl ConsoleTask {
    pub fn new(spec: TaskSpec, exit_tx: mpsc::UnboundedSender<i32>) -> Self {
        Self { spec, exit_tx }
    }
}

impl Task for ConsoleTask {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn cmd(&self) -> &TaskCommand {
        &self.spec.cmd
    }

    fn env(&self) -> &BTreeMap<String, String> {
        &self.spec.env
    }

    fn cwd(&self) -> Option<&Path> {
        self.spec.cwd.as_deref()
    }

    fn dispatch(&self, event: TaskEvent) {
        match event {
            TaskEvent::Output(chunk) => {
                trace!(task = %self.spec.name, fragments = chunk.len(), "output chunk");
            }
            TaskEvent::OutputLines(lines) => {
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                for line in lines {
                    // A closed stdout (e.g. piped into `head`) is not our problem.
                    let _ = writeln!(out, "{line}");
                }
                let _ = out.flush();
            }
        }
    }

    fn notify_exit(&self, code: i32) {
        debug!(task = %self.spec.name, code, "task exited");
        let _ = self.exit_tx.send(code);
    }
}
