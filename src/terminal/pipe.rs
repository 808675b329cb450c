// src/terminal/pipe.rs

//! Headless terminal service backed by `tokio::process`.
//!
//! There is no UI: "showing" a session only starts its job, and closing a
//! session just marks it closed and stops feeding its stdin. Output is kept
//! as a plain-text transcript per buffer.
//!
//! Hooks are invoked from a Tokio task spawned on the current runtime. Drive
//! the service from a current-thread runtime to get the single-control-thread
//! behaviour strategies expect: no hook can then run while `start` is still
//! executing.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::exec::lines::chunk_from_text;
use crate::terminal::{
    OnCreateHook, OnExitHook, OnStdoutHook, SessionOptions, TerminalService, TerminalSession,
};
use crate::types::{BufferId, JobId, INVALID_ARGUMENTS_HANDLE, NOT_EXECUTABLE_HANDLE};

const READ_BUF_SIZE: usize = 4096;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Pipe-backed [`TerminalService`].
#[derive(Clone)]
pub struct PipeTerminalService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    shell: String,
    next_job: AtomicI64,
    next_buffer: AtomicU64,
    /// Cancel senders of running jobs.
    jobs: Mutex<HashMap<JobId, oneshot::Sender<()>>>,
    buffers: Mutex<HashMap<BufferId, String>>,
}

impl PipeTerminalService {
    /// Sessions without a command start `$SHELL` (or `sh` when unset).
    pub fn new() -> Self {
        let shell = std::env::var("SHELL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "sh".to_string());
        Self::with_shell(shell)
    }

    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                shell: shell.into(),
                next_job: AtomicI64::new(1),
                next_buffer: AtomicU64::new(1),
                jobs: Mutex::new(HashMap::new()),
                buffers: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Everything a buffer has received so far, if it still exists.
    pub fn buffer_text(&self, buffer: BufferId) -> Option<String> {
        lock(&self.inner.buffers).get(&buffer).cloned()
    }

    /// Jobs that have been started and have not exited yet.
    pub fn running_jobs(&self) -> usize {
        lock(&self.inner.jobs).len()
    }
}

impl Default for PipeTerminalService {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalService for PipeTerminalService {
    fn create(&self, options: SessionOptions) -> Box<dyn TerminalSession> {
        let buffer_id = BufferId(self.inner.next_buffer.fetch_add(1, Ordering::SeqCst));
        lock(&self.inner.buffers).insert(buffer_id, String::new());

        debug!(
            buffer = %buffer_id,
            cmd = ?options.cmd,
            direction = ?options.direction,
            hidden = options.hidden,
            "creating pipe terminal session"
        );

        let SessionOptions {
            cmd,
            env,
            dir,
            close_on_exit,
            on_create,
            on_stdout,
            on_exit,
            ..
        } = options;

        Box::new(PipeSession {
            service: Arc::clone(&self.inner),
            shared: Arc::new(Mutex::new(SessionShared {
                cmd,
                env: env.into_iter().collect(),
                dir,
                close_on_exit,
                buffer_id,
                job_handle: INVALID_ARGUMENTS_HANDLE,
                started: false,
                visible: false,
                closed: false,
                stdin_tx: None,
            })),
            hooks: Arc::new(Mutex::new(SessionHooks {
                on_create,
                on_stdout,
                on_exit,
            })),
        })
    }

    fn stop_job(&self, job: JobId) {
        let cancel = lock(&self.inner.jobs).remove(&job);
        match cancel {
            Some(cancel) => {
                info!(job = %job, "stopping pipe job");
                if cancel.send(()).is_err() {
                    debug!(job = %job, "job already finished while stopping");
                }
            }
            None => debug!(job = %job, "stop requested for unknown or finished job"),
        }
    }

    fn delete_buffer(&self, buffer: BufferId) {
        let removed = lock(&self.inner.buffers).remove(&buffer).is_some();
        debug!(buffer = %buffer, removed, "deleted buffer");
    }
}

struct SessionShared {
    cmd: Option<String>,
    env: Vec<(String, String)>,
    dir: Option<PathBuf>,
    close_on_exit: bool,
    buffer_id: BufferId,
    job_handle: i64,
    started: bool,
    visible: bool,
    closed: bool,
    stdin_tx: Option<mpsc::UnboundedSender<String>>,
}

struct SessionHooks {
    on_create: Option<OnCreateHook>,
    on_stdout: Option<OnStdoutHook>,
    on_exit: Option<OnExitHook>,
}

/// Handle to a pipe session. The strategy owns one; the job's reader task
/// owns a clone so it can hand a session to the hooks.
#[derive(Clone)]
pub struct PipeSession {
    service: Arc<ServiceInner>,
    shared: Arc<Mutex<SessionShared>>,
    hooks: Arc<Mutex<SessionHooks>>,
}

impl PipeSession {
    fn start_job(&mut self) {
        let mut shared = lock(&self.shared);
        if shared.started {
            return;
        }
        shared.started = true;

        let cmd = shared.cmd.clone();
        let mut command = match cmd {
            Some(cmd) if cmd.trim().is_empty() => {
                warn!(buffer = %shared.buffer_id, "refusing to start an empty command");
                shared.job_handle = INVALID_ARGUMENTS_HANDLE;
                return;
            }
            Some(cmd) => {
                let mut c = Command::new("sh");
                c.arg("-c").arg(&cmd);
                c
            }
            None => Command::new(&self.service.shell),
        };

        command
            .envs(shared.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &shared.dir {
            command.current_dir(dir);
        }

        if tokio::runtime::Handle::try_current().is_err() {
            warn!(buffer = %shared.buffer_id, "no Tokio runtime available; cannot start job");
            shared.job_handle = NOT_EXECUTABLE_HANDLE;
            return;
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(buffer = %shared.buffer_id, error = %e, "failed to spawn job");
                shared.job_handle = NOT_EXECUTABLE_HANDLE;
                return;
            }
        };

        let raw = self.service.next_job.fetch_add(1, Ordering::SeqCst);
        let Some(job) = JobId::new(raw) else {
            shared.job_handle = NOT_EXECUTABLE_HANDLE;
            return;
        };
        shared.job_handle = job.raw();

        if let Some(stdin) = child.stdin.take() {
            shared.stdin_tx = Some(spawn_stdin_writer(job, stdin));
        }

        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        lock(&self.service.jobs).insert(job, cancel_tx);

        info!(job = %job, buffer = %shared.buffer_id, "pipe job started");
        drop(shared);

        tokio::spawn(run_job(self.clone(), job, child, cancel_rx));

        let hooks = Arc::clone(&self.hooks);
        let mut hooks = lock(&hooks);
        if let Some(on_create) = hooks.on_create.as_mut() {
            on_create(self);
        }
    }

    fn deliver_output(&mut self, job: JobId, text: &str) {
        if text.is_empty() {
            return;
        }

        let buffer_id = lock(&self.shared).buffer_id;
        if let Some(transcript) = lock(&self.service.buffers).get_mut(&buffer_id) {
            transcript.push_str(text);
        }

        let chunk = chunk_from_text(text);
        let hooks = Arc::clone(&self.hooks);
        let mut hooks = lock(&hooks);
        if let Some(on_stdout) = hooks.on_stdout.as_mut() {
            on_stdout(self, job, &chunk);
        }
    }

    fn deliver_exit(&mut self, job: JobId, code: i32) {
        {
            let hooks = Arc::clone(&self.hooks);
            let mut hooks = lock(&hooks);
            if let Some(on_exit) = hooks.on_exit.as_mut() {
                on_exit(self, job, code);
            }
        }

        if lock(&self.shared).close_on_exit {
            self.close();
        }
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.shared).closed
    }

    pub fn is_visible(&self) -> bool {
        lock(&self.shared).visible
    }
}

impl TerminalSession for PipeSession {
    fn buffer_id(&self) -> Option<BufferId> {
        Some(lock(&self.shared).buffer_id)
    }

    fn job_handle(&self) -> i64 {
        lock(&self.shared).job_handle
    }

    fn toggle(&mut self) {
        self.start_job();
        let mut shared = lock(&self.shared);
        shared.visible = !shared.visible;
    }

    fn spawn(&mut self) {
        self.start_job();
    }

    fn close(&mut self) {
        let mut shared = lock(&self.shared);
        if shared.closed {
            return;
        }
        shared.closed = true;
        shared.visible = false;
        shared.stdin_tx = None;
        debug!(buffer = %shared.buffer_id, "pipe session closed");
    }

    fn send(&mut self, text: &str) {
        let shared = lock(&self.shared);
        match &shared.stdin_tx {
            Some(tx) => {
                if tx.send(text.to_string()).is_err() {
                    debug!(buffer = %shared.buffer_id, "stdin writer gone; dropping input");
                }
            }
            None => warn!(buffer = %shared.buffer_id, "session has no stdin; dropping input"),
        }
    }
}

/// Forward lines sent to the session into the child's stdin.
fn spawn_stdin_writer(job: JobId, mut stdin: ChildStdin) -> mpsc::UnboundedSender<String> {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            let res = async {
                stdin.write_all(line.as_bytes()).await?;
                stdin.write_all(b"\n").await?;
                stdin.flush().await
            }
            .await;
            if let Err(e) = res {
                debug!(job = %job, error = %e, "stdin closed");
                break;
            }
        }
    });

    tx
}

/// Pump output into the hooks until both streams end (or the job is
/// stopped), then reap the child and report its exit.
async fn run_job(
    mut session: PipeSession,
    job: JobId,
    mut child: Child,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();
    let mut out_dec = Utf8Carry::default();
    let mut err_dec = Utf8Carry::default();
    let mut out_buf = [0u8; READ_BUF_SIZE];
    let mut err_buf = [0u8; READ_BUF_SIZE];
    let mut cancel_open = true;

    while stdout.is_some() || stderr.is_some() {
        tokio::select! {
            res = read_chunk(&mut stdout, &mut out_buf), if stdout.is_some() => match res {
                Ok(n) if n > 0 => {
                    let text = out_dec.push(&out_buf[..n]);
                    session.deliver_output(job, &text);
                }
                _ => stdout = None,
            },
            res = read_chunk(&mut stderr, &mut err_buf), if stderr.is_some() => match res {
                Ok(n) if n > 0 => {
                    let text = err_dec.push(&err_buf[..n]);
                    session.deliver_output(job, &text);
                }
                _ => stderr = None,
            },
            cancel = &mut cancel_rx, if cancel_open => match cancel {
                Ok(()) => {
                    info!(job = %job, "killing pipe job");
                    if let Err(e) = child.start_kill() {
                        warn!(job = %job, error = %e, "failed to kill job");
                    }
                    break;
                }
                Err(_) => cancel_open = false,
            },
        }
    }

    let tail = format!("{}{}", out_dec.finish(), err_dec.finish());
    session.deliver_output(job, &tail);

    let code = match child.wait().await {
        Ok(status) => status.code().unwrap_or(-1),
        Err(e) => {
            warn!(job = %job, error = %e, "waiting for job failed");
            -1
        }
    };

    lock(&session.service.jobs).remove(&job);
    info!(job = %job, exit_code = code, "pipe job exited");

    session.deliver_exit(job, code);
}

async fn read_chunk<R: AsyncRead + Unpin>(
    reader: &mut Option<R>,
    buf: &mut [u8],
) -> std::io::Result<usize> {
    match reader {
        Some(r) => r.read(buf).await,
        None => std::future::pending().await,
    }
}

/// Decodes UTF-8 across reads, holding back a multi-byte sequence that was
/// cut in half by a read boundary.
#[derive(Debug, Default)]
struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let complete = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(_) => self.pending.len(),
        };

        let rest = self.pending.split_off(complete);
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending = rest;
        text
    }

    fn finish(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_sequences_split_across_reads_are_joined() {
        let bytes = "héllo".as_bytes();
        let mut dec = Utf8Carry::default();

        // 'é' is two bytes; cut between them.
        assert_eq!(dec.push(&bytes[..2]), "h");
        assert_eq!(dec.push(&bytes[2..]), "éllo");
        assert_eq!(dec.finish(), "");
    }

    #[test]
    fn invalid_bytes_are_replaced() {
        let mut dec = Utf8Carry::default();
        let text = dec.push(&[b'a', 0xff, b'b']);
        assert!(text.starts_with('a'));
        assert!(text.ends_with('b'));
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn truncated_tail_is_flushed_lossily() {
        let mut dec = Utf8Carry::default();
        assert_eq!(dec.push(&[0xc3]), "");
        assert_eq!(dec.finish(), "\u{FFFD}");
    }
}
