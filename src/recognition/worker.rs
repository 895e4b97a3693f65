//! Recognition workers.
//!
//! A [`Recognizer`] starts one worker per request. The bridge keeps at most one
//! [`WorkerHandle`] alive and terminates it before dispatching the next request,
//! so a late answer from a superseded worker is never observed.

use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use thiserror::Error;
use tracing::{debug, warn};

use super::protocol::{RecognitionRequest, RecognitionResponse};

#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("no recognizer configured")]
    NotConfigured,

    #[error("failed to start recognizer: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("malformed recognizer message: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("recognizer failed: {0}")]
    Worker(String),

    #[error("recognizer exited without answering")]
    Disconnected,
}

pub type RecognitionResult<T> = Result<T, RecognitionError>;

/// One outstanding computation.
pub trait WorkerHandle: Send {
    /// Non-blocking poll for the answer.
    fn try_recv(&mut self) -> RecognitionResult<Option<RecognitionResponse>>;

    /// Stop the worker. Its answer, if any, is discarded.
    fn terminate(&mut self);
}

pub trait Recognizer: Send + Sync {
    fn spawn(&self, request: RecognitionRequest) -> RecognitionResult<Box<dyn WorkerHandle>>;
}

type Answer = RecognitionResult<RecognitionResponse>;

fn poll_channel(rx: &Receiver<Answer>) -> RecognitionResult<Option<RecognitionResponse>> {
    match rx.try_recv() {
        Ok(answer) => answer.map(Some),
        Err(TryRecvError::Empty) => Ok(None),
        Err(TryRecvError::Disconnected) => Err(RecognitionError::Disconnected),
    }
}

// ---------------------------------------------------------------------------
// In-process recognizer
// ---------------------------------------------------------------------------

/// Set when the worker computing a request is terminated.
///
/// Long-running recognition functions should poll
/// [`is_cancelled`](Self::is_cancelled) and return early; their answer is
/// discarded either way.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// `Err` once cancelled, for use with `?` inside a recognition function.
    pub fn check(&self) -> anyhow::Result<()> {
        if self.is_cancelled() {
            anyhow::bail!("recognition cancelled");
        }
        Ok(())
    }
}

type RecognizeFn =
    dyn Fn(&RecognitionRequest, &CancelFlag) -> anyhow::Result<RecognitionResponse> + Send + Sync;

/// Runs a recognition function on a background thread per request.
#[derive(Clone)]
pub struct ThreadRecognizer {
    recognize: Arc<RecognizeFn>,
}

impl ThreadRecognizer {
    pub fn new<F>(recognize: F) -> Self
    where
        F: Fn(&RecognitionRequest, &CancelFlag) -> anyhow::Result<RecognitionResponse>
            + Send
            + Sync
            + 'static,
    {
        Self {
            recognize: Arc::new(recognize),
        }
    }
}

impl Recognizer for ThreadRecognizer {
    fn spawn(&self, request: RecognitionRequest) -> RecognitionResult<Box<dyn WorkerHandle>> {
        let (tx, rx) = mpsc::channel();
        let recognize = Arc::clone(&self.recognize);
        let cancel = CancelFlag::new();
        let worker_cancel = cancel.clone();
        thread::Builder::new()
            .name("recognizer".into())
            .spawn(move || {
                if worker_cancel.is_cancelled() {
                    debug!("Recognizer cancelled before it started");
                    return;
                }
                let answer = recognize(&request, &worker_cancel)
                    .map_err(|e| RecognitionError::Worker(format!("{e:#}")));
                if worker_cancel.is_cancelled() {
                    debug!("Discarding answer of cancelled recognizer");
                    return;
                }
                let _ = tx.send(answer);
            })?;
        Ok(Box::new(ThreadHandle {
            rx: Some(rx),
            cancel,
        }))
    }
}

struct ThreadHandle {
    rx: Option<Receiver<Answer>>,
    cancel: CancelFlag,
}

impl WorkerHandle for ThreadHandle {
    fn try_recv(&mut self) -> RecognitionResult<Option<RecognitionResponse>> {
        match &self.rx {
            Some(rx) => poll_channel(rx),
            None => Err(RecognitionError::Disconnected),
        }
    }

    fn terminate(&mut self) {
        self.cancel.cancel();
        self.rx = None;
    }
}

impl Drop for ThreadHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ---------------------------------------------------------------------------
// External process recognizer
// ---------------------------------------------------------------------------

/// Runs an external command per request: the request JSON goes to its stdin,
/// and the first line of its stdout is the response JSON. The process is
/// killed once it has answered, so a recognizer may exit or keep running.
#[derive(Debug, Clone)]
pub struct ProcessRecognizer {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessRecognizer {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }
}

impl Recognizer for ProcessRecognizer {
    fn spawn(&self, request: RecognitionRequest) -> RecognitionResult<Box<dyn WorkerHandle>> {
        let payload = serde_json::to_vec(&request)?;
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        debug!(program = %self.program.display(), pid = child.id(), "Started recognizer process");

        let (Some(mut stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(RecognitionError::Disconnected);
        };

        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("recognizer-io".into())
            .spawn(move || {
                let answer = (|| -> Answer {
                    stdin.write_all(&payload)?;
                    drop(stdin);
                    let mut line = String::new();
                    BufReader::new(stdout).read_line(&mut line)?;
                    if line.trim().is_empty() {
                        return Err(RecognitionError::Disconnected);
                    }
                    Ok(serde_json::from_str(&line)?)
                })();
                let _ = tx.send(answer);
            })?;

        Ok(Box::new(ProcessHandle {
            child: Some(child),
            rx,
        }))
    }
}

struct ProcessHandle {
    child: Option<Child>,
    rx: Receiver<Answer>,
}

impl ProcessHandle {
    fn reap(&mut self) {
        if let Some(mut child) = self.child.take()
            && let Err(e) = child.wait()
        {
            warn!("Failed to reap recognizer process: {e}");
        }
    }
}

impl WorkerHandle for ProcessHandle {
    fn try_recv(&mut self) -> RecognitionResult<Option<RecognitionResponse>> {
        let polled = poll_channel(&self.rx);
        if !matches!(polled, Ok(None)) {
            // Answered or failed; a process that lingers after its answer is stopped.
            self.terminate();
        }
        polled
    }

    fn terminate(&mut self) {
        if let Some(child) = self.child.as_mut() {
            debug!(pid = child.id(), "Killing recognizer process");
            let _ = child.kill();
        }
        self.reap();
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        self.terminate();
    }
}

// ---------------------------------------------------------------------------
// No recognizer
// ---------------------------------------------------------------------------

/// Used when no recognizer is configured; every dispatch is refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRecognizer;

impl Recognizer for DisabledRecognizer {
    fn spawn(&self, _request: RecognitionRequest) -> RecognitionResult<Box<dyn WorkerHandle>> {
        Err(RecognitionError::NotConfigured)
    }
}
