use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use termrun::terminal::{
    OnCreateHook, OnExitHook, OnStdoutHook, SessionOptions, TerminalService, TerminalSession,
};
use termrun::types::{BufferId, Direction, JobId};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap()
}

/// A terminal service that:
/// - records every session it creates and every call made on them
/// - hands out job ids on toggle/spawn (or a forced sentinel handle)
/// - only fires stdout/exit hooks when the test asks it to.
#[derive(Clone, Default)]
pub struct FakeTerminalService {
    state: Arc<Mutex<ServiceState>>,
}

#[derive(Default)]
struct ServiceState {
    next_job: i64,
    next_buffer: u64,
    forced_handle: Option<i64>,
    sessions: Vec<FakeSession>,
    stopped_jobs: Vec<JobId>,
    deleted_buffers: Vec<BufferId>,
}

impl FakeTerminalService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next started session report `handle` (e.g. `0` or `-1`).
    pub fn force_next_handle(&self, handle: i64) {
        lock(&self.state).forced_handle = Some(handle);
    }

    pub fn sessions(&self) -> Vec<FakeSession> {
        lock(&self.state).sessions.clone()
    }

    pub fn last_session(&self) -> Option<FakeSession> {
        lock(&self.state).sessions.last().cloned()
    }

    pub fn stopped_jobs(&self) -> Vec<JobId> {
        lock(&self.state).stopped_jobs.clone()
    }

    pub fn deleted_buffers(&self) -> Vec<BufferId> {
        lock(&self.state).deleted_buffers.clone()
    }

    /// Deliver an output chunk for `job` through its session's stdout hook.
    pub fn emit_stdout(&self, job: JobId, chunk: &[&str]) {
        let chunk: Vec<String> = chunk.iter().map(|s| s.to_string()).collect();
        if let Some(mut session) = self.session_for(job) {
            session.fire_stdout(job, &chunk);
        }
    }

    /// Deliver the exit of `job` through its session's exit hook.
    pub fn emit_exit(&self, job: JobId, code: i32) {
        if let Some(mut session) = self.session_for(job) {
            session.fire_exit(job, code);
        }
    }

    fn session_for(&self, job: JobId) -> Option<FakeSession> {
        let sessions = self.sessions();
        sessions
            .into_iter()
            .rev()
            .find(|s| s.job_handle() == job.raw())
    }

    fn allocate_handle(&self) -> i64 {
        let mut st = lock(&self.state);
        if let Some(forced) = st.forced_handle.take() {
            return forced;
        }
        st.next_job += 1;
        st.next_job
    }
}

impl TerminalService for FakeTerminalService {
    fn create(&self, options: SessionOptions) -> Box<dyn TerminalSession> {
        let buffer_id = {
            let mut st = lock(&self.state);
            st.next_buffer += 1;
            BufferId(st.next_buffer)
        };

        let SessionOptions {
            cmd,
            env,
            dir,
            direction,
            auto_scroll,
            close_on_exit,
            hidden,
            on_create,
            on_stdout,
            on_exit,
            ..
        } = options;

        let session = FakeSession {
            service: self.clone(),
            record: Arc::new(Mutex::new(SessionRecord {
                cmd,
                env,
                dir,
                direction,
                auto_scroll,
                close_on_exit,
                hidden,
                buffer_id,
                job_handle: 0,
                toggles: 0,
                spawns: 0,
                closes: 0,
                sends: Vec::new(),
            })),
            hooks: Arc::new(Mutex::new(Hooks {
                on_create,
                on_stdout,
                on_exit,
            })),
        };

        lock(&self.state).sessions.push(session.clone());
        Box::new(session)
    }

    fn stop_job(&self, job: JobId) {
        lock(&self.state).stopped_jobs.push(job);
    }

    fn delete_buffer(&self, buffer: BufferId) {
        lock(&self.state).deleted_buffers.push(buffer);
    }
}

struct SessionRecord {
    cmd: Option<String>,
    env: BTreeMap<String, String>,
    dir: Option<PathBuf>,
    direction: Option<Direction>,
    auto_scroll: Option<bool>,
    close_on_exit: bool,
    hidden: bool,
    buffer_id: BufferId,
    job_handle: i64,
    toggles: usize,
    spawns: usize,
    closes: usize,
    sends: Vec<String>,
}

struct Hooks {
    on_create: Option<OnCreateHook>,
    on_stdout: Option<OnStdoutHook>,
    on_exit: Option<OnExitHook>,
}

/// Shared handle to one fake session.
#[derive(Clone)]
pub struct FakeSession {
    service: FakeTerminalService,
    record: Arc<Mutex<SessionRecord>>,
    hooks: Arc<Mutex<Hooks>>,
}

impl FakeSession {
    pub fn cmd(&self) -> Option<String> {
        lock(&self.record).cmd.clone()
    }

    pub fn env(&self) -> BTreeMap<String, String> {
        lock(&self.record).env.clone()
    }

    pub fn dir(&self) -> Option<PathBuf> {
        lock(&self.record).dir.clone()
    }

    pub fn direction(&self) -> Option<Direction> {
        lock(&self.record).direction
    }

    pub fn auto_scroll(&self) -> Option<bool> {
        lock(&self.record).auto_scroll
    }

    pub fn close_on_exit(&self) -> bool {
        lock(&self.record).close_on_exit
    }

    pub fn hidden(&self) -> bool {
        lock(&self.record).hidden
    }

    pub fn sends(&self) -> Vec<String> {
        lock(&self.record).sends.clone()
    }

    pub fn toggles(&self) -> usize {
        lock(&self.record).toggles
    }

    pub fn spawns(&self) -> usize {
        lock(&self.record).spawns
    }

    pub fn closes(&self) -> usize {
        lock(&self.record).closes
    }

    /// The live job of this session, if it started one.
    pub fn job(&self) -> Option<JobId> {
        JobId::new(lock(&self.record).job_handle)
    }

    fn start(&mut self) {
        {
            let mut rec = lock(&self.record);
            if rec.job_handle != 0 {
                return;
            }
            drop(rec);
            let handle = self.service.allocate_handle();
            rec = lock(&self.record);
            rec.job_handle = handle;
            if JobId::new(handle).is_none() {
                return;
            }
        }

        let hooks = Arc::clone(&self.hooks);
        let mut hooks = lock(&hooks);
        if let Some(on_create) = hooks.on_create.as_mut() {
            on_create(self);
        }
    }

    fn fire_stdout(&mut self, job: JobId, chunk: &[String]) {
        let hooks = Arc::clone(&self.hooks);
        let mut hooks = lock(&hooks);
        if let Some(on_stdout) = hooks.on_stdout.as_mut() {
            on_stdout(self, job, chunk);
        }
    }

    fn fire_exit(&mut self, job: JobId, code: i32) {
        let hooks = Arc::clone(&self.hooks);
        let mut hooks = lock(&hooks);
        if let Some(on_exit) = hooks.on_exit.as_mut() {
            on_exit(self, job, code);
        }
    }
}

impl TerminalSession for FakeSession {
    fn buffer_id(&self) -> Option<BufferId> {
        Some(lock(&self.record).buffer_id)
    }

    fn job_handle(&self) -> i64 {
        lock(&self.record).job_handle
    }

    fn toggle(&mut self) {
        lock(&self.record).toggles += 1;
        self.start();
    }

    fn spawn(&mut self) {
        lock(&self.record).spawns += 1;
        self.start();
    }

    fn close(&mut self) {
        lock(&self.record).closes += 1;
    }

    fn send(&mut self, text: &str) {
        lock(&self.record).sends.push(text.to_string());
    }
}
