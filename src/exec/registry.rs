// src/exec/registry.rs

//! Registry of jobs started by terminal strategies.
//!
//! Shutdown code uses it to tell the jobs we own apart from anything else the
//! terminal component may be running, and to signal each of ours only once.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::Lazy;
use tracing::{debug, info};

use crate::terminal::TerminalService;
use crate::types::JobId;

static GLOBAL: Lazy<Arc<JobRegistry>> = Lazy::new(|| Arc::new(JobRegistry::new()));

/// Set of live job ids. Every operation is idempotent.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Mutex<BTreeSet<JobId>>,
}

impl JobRegistry {
    /// A fresh, empty registry (mostly useful for tests).
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry shared by every strategy instance.
    pub fn global() -> Arc<JobRegistry> {
        Arc::clone(&GLOBAL)
    }

    pub fn register(&self, job: JobId) {
        let inserted = self.lock().insert(job);
        debug!(job = %job, inserted, "registered job");
    }

    /// Remove `job`. Returns whether it was registered.
    pub fn unregister(&self, job: JobId) -> bool {
        let removed = self.lock().remove(&job);
        debug!(job = %job, removed, "unregistered job");
        removed
    }

    pub fn contains(&self, job: JobId) -> bool {
        self.lock().contains(&job)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Currently registered jobs, in ascending id order.
    pub fn snapshot(&self) -> Vec<JobId> {
        self.lock().iter().copied().collect()
    }

    /// Drain the registry and ask `service` to stop every job that was in it.
    ///
    /// Returns the jobs that were signalled. A second call signals nothing
    /// unless new jobs were registered in between.
    pub fn stop_all(&self, service: &dyn TerminalService) -> Vec<JobId> {
        let jobs: Vec<JobId> = std::mem::take(&mut *self.lock()).into_iter().collect();

        if !jobs.is_empty() {
            info!(count = jobs.len(), "stopping registered jobs");
        }
        for job in &jobs {
            service.stop_job(*job);
        }
        jobs
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<JobId>> {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner())
    }
}
