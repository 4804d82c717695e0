//! Output collection for a running child.
//!
//! IMPORTANT: stdout and stderr are drained by two reader threads while the
//! process runs. Reading them one after the other deadlocks as soon as the
//! child fills the pipe (~64KB) of the stream we are not reading yet.
//! The exit status is read only after both streams hit end-of-stream.

use serde::Serialize;
use std::io::{BufRead, BufReader, Read};
use std::thread::{self, ScopedJoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::process::RunningProcess;

/// Poll interval while waiting for the readers under a deadline
const DEADLINE_CHECK_INTERVAL_MS: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Stdout,
    Stderr,
}

/// Receives each line as it is read, before it is accumulated.
pub trait OutputSink: Send + Sync {
    fn on_line(&self, stream: StreamKind, line: &str);
}

/// Default sink: stderr lines at ERROR, stdout lines at DEBUG.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl OutputSink for TracingSink {
    fn on_line(&self, stream: StreamKind, line: &str) {
        match stream {
            StreamKind::Stderr => tracing::error!(target: "scriptheal::script", "{}", line),
            StreamKind::Stdout => tracing::debug!(target: "scriptheal::script", "{}", line),
        }
    }
}

/// Outcome of one process run. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("process killed: exceeded deadline of {after:?}")]
    Timeout {
        after: Duration,
        /// Whatever was read before the kill
        partial: ProcessResult,
    },

    #[error("failed to wait for process: {0}")]
    Wait(#[from] std::io::Error),
}

/// Drain both streams concurrently, then wait for exit.
///
/// With `timeout`, the process group is killed once the deadline passes and
/// [`CollectError::Timeout`] is returned with the partial output.
pub fn collect(
    mut process: RunningProcess,
    sink: &dyn OutputSink,
    timeout: Option<Duration>,
) -> Result<ProcessResult, CollectError> {
    let start = Instant::now();
    let stdout = process.child.stdout.take();
    let stderr = process.child.stderr.take();

    let (stdout, stderr, timed_out) = thread::scope(|scope| {
        let out_handle = scope.spawn(move || drain(stdout, StreamKind::Stdout, sink));
        let err_handle = scope.spawn(move || drain(stderr, StreamKind::Stderr, sink));

        let mut timed_out = false;
        if let Some(limit) = timeout {
            let check_interval = Duration::from_millis(DEADLINE_CHECK_INTERVAL_MS);
            loop {
                // A child can close both streams and keep running: the deadline
                // covers the exit too, not just the drain.
                if out_handle.is_finished()
                    && err_handle.is_finished()
                    && !matches!(process.child.try_wait(), Ok(None))
                {
                    break;
                }
                if start.elapsed() >= limit {
                    tracing::warn!(
                        pid = process.id(),
                        program = %process.program(),
                        "Deadline of {:?} exceeded, killing process group",
                        limit
                    );
                    process.kill_tree();
                    timed_out = true;
                    break;
                }
                thread::sleep(check_interval);
            }
        }

        (
            join_reader(out_handle, StreamKind::Stdout),
            join_reader(err_handle, StreamKind::Stderr),
            timed_out,
        )
    });

    let status = process.child.wait()?;
    let result = ProcessResult {
        exit_code: status.code().unwrap_or(-1),
        stdout,
        stderr,
    };

    match timeout {
        Some(after) if timed_out => Err(CollectError::Timeout {
            after,
            partial: result,
        }),
        _ => Ok(result),
    }
}

fn join_reader(handle: ScopedJoinHandle<'_, String>, kind: StreamKind) -> String {
    handle.join().unwrap_or_else(|_| {
        tracing::warn!(stream = ?kind, "Output reader panicked, captured output dropped");
        String::new()
    })
}

/// Read `stream` to EOF line by line, forwarding each line to `sink`.
/// Lines are newline-joined; invalid UTF-8 is replaced.
fn drain<R: Read>(stream: Option<R>, kind: StreamKind, sink: &dyn OutputSink) -> String {
    let Some(stream) = stream else {
        return String::new();
    };
    let mut reader = BufReader::new(stream);
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf)
                    .trim_end_matches(|c| c == '\n' || c == '\r')
                    .to_string();
                sink.on_line(kind, &line);
                lines.push(line);
            }
            Err(e) => {
                tracing::warn!(stream = ?kind, "Stopped reading child output: {}", e);
                break;
            }
        }
    }
    lines.join("\n")
}
