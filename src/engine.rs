//! LintEngine — owns the single in-flight build process per editing context.
//!
//! `start_lint` preempts any run still in flight for the context and spawns
//! the new process; completions arrive on an event channel and are delivered
//! through [`LintEngine::poll_completions`] or
//! [`LintEngine::next_completion`] after an identity check. A stale event
//! (the map entry has moved on) is logged and dropped — that check is the
//! sole serialization mechanism, since at most one process is ever current
//! per context.

use std::collections::HashMap;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{ChildStderr, ChildStdout, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::classify::{self, Classification};
use crate::parser::OutputGrammar;
use crate::position;
use crate::types::{
    ContextId, Diagnostic, DocumentSnapshot, LintCommand, LintCompletion, LintOutcome, RequestId,
};

/// Channel capacity for run events between capture tasks and the engine.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Capture cap (4 MiB). Output past this is drained and discarded so the
/// child cannot block on a full pipe.
const MAX_CAPTURE_BYTES: u64 = 4 * 1024 * 1024;

/// One finished run, reported by its capture task.
#[derive(Debug)]
struct RunEvent {
    context: ContextId,
    request: RequestId,
    /// `ExitStatus::code()`; `None` when the process did not exit normally.
    code: Option<i32>,
    captured: String,
}

/// The live build invocation for one context.
///
/// Removal from the engine's map is the state transition for death: `Drop`
/// aborts the capture task, dropping the child, and `kill_on_drop(true)`
/// takes the process down. The snapshot and capture buffer go with it.
struct RunningLint {
    request: RequestId,
    doc: DocumentSnapshot,
    grammar: OutputGrammar,
    /// Human-readable process identity for failure descriptions.
    process: String,
    task: JoinHandle<()>,
}

impl Drop for RunningLint {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Public facade for the lint subsystem.
///
/// Holds the per-context map of running lints; the host calls
/// [`LintEngine::start_lint`] on demand and drains completions from its
/// event loop.
pub struct LintEngine {
    running: HashMap<ContextId, RunningLint>,
    event_rx: mpsc::Receiver<RunEvent>,
    event_tx: mpsc::Sender<RunEvent>,
    next_request: u64,
}

impl Default for LintEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LintEngine {
    #[must_use]
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            running: HashMap::new(),
            event_rx,
            event_tx,
            next_request: 1,
        }
    }

    /// Start a lint run for `context`, preempting any run still in flight.
    ///
    /// Returns as soon as the process is spawned; the result arrives later
    /// as a [`LintCompletion`]. `command` must carry a fully resolved
    /// executable path and the externally detected project root; `document`
    /// is the content the diagnostics will anchor to. Must be called from
    /// within a tokio runtime.
    pub fn start_lint(
        &mut self,
        context: ContextId,
        document: DocumentSnapshot,
        command: &LintCommand,
    ) -> Result<RequestId> {
        let grammar = OutputGrammar::detect(document.path())?;

        if let Some(prev) = self.running.remove(&context) {
            tracing::debug!(%context, request = %prev.request, "killing superseded lint process");
        }

        let mut cmd = Command::new(command.program());
        cmd.args(command.args())
            .current_dir(command.working_dir())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning {}", command.program().display()))?;

        let stdout = child.stdout.take().context("no stdout from child")?;
        let stderr = child.stderr.take().context("no stderr from child")?;

        let request = RequestId::new(self.next_request);
        self.next_request += 1;

        let tool = command.program().file_name().map_or_else(
            || command.program().display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        let process = match child.id() {
            Some(pid) => format!("{tool} (pid {pid})"),
            None => tool,
        };
        tracing::info!(%context, %request, process = %process, "lint process started");

        let event_tx = self.event_tx.clone();
        let task = tokio::spawn(async move {
            let captured = capture_merged(stdout, stderr).await;
            let code = match child.wait().await {
                Ok(status) => status.code(),
                Err(e) => {
                    tracing::warn!("waiting on lint process failed: {e}");
                    None
                }
            };
            let _ = event_tx
                .send(RunEvent {
                    context,
                    request,
                    code,
                    captured,
                })
                .await;
        });

        self.running.insert(
            context,
            RunningLint {
                request,
                doc: document,
                grammar,
                process,
                task,
            },
        );
        Ok(request)
    }

    /// Drain pending run events, up to `budget`, and return the completions
    /// that were still current. Non-blocking; stale events count toward the
    /// budget but produce nothing.
    pub fn poll_completions(&mut self, budget: usize) -> Vec<LintCompletion> {
        let mut completions = Vec::new();
        for _ in 0..budget {
            match self.event_rx.try_recv() {
                Ok(event) => {
                    if let Some(completion) = self.handle_event(event) {
                        completions.push(completion);
                    }
                }
                Err(mpsc::error::TryRecvError::Empty | mpsc::error::TryRecvError::Disconnected) => {
                    break;
                }
            }
        }
        completions
    }

    /// Await the next completion that is still current.
    ///
    /// Returns `None` only if the event channel closes, which cannot happen
    /// while the engine is alive.
    pub async fn next_completion(&mut self) -> Option<LintCompletion> {
        while let Some(event) = self.event_rx.recv().await {
            if let Some(completion) = self.handle_event(event) {
                return Some(completion);
            }
        }
        None
    }

    /// Kill the running lint for `context`, if any. Returns whether one was
    /// running. A completion already in flight is discarded as stale.
    pub fn cancel(&mut self, context: ContextId) -> bool {
        match self.running.remove(&context) {
            Some(run) => {
                tracing::debug!(%context, request = %run.request, "cancelling lint process");
                true
            }
            None => false,
        }
    }

    /// Whether any lint process is currently in flight.
    #[must_use]
    pub fn has_running(&self) -> bool {
        !self.running.is_empty()
    }

    #[must_use]
    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    /// Handle a single run event: identity check, then classify, parse, and
    /// resolve. The running entry (snapshot and all) is released on every
    /// path out of here.
    fn handle_event(&mut self, event: RunEvent) -> Option<LintCompletion> {
        let RunEvent {
            context,
            request,
            code,
            captured,
        } = event;

        let is_current = self
            .running
            .get(&context)
            .is_some_and(|run| run.request == request);
        if !is_current {
            tracing::debug!(%context, %request, "discarding superseded lint result");
            return None;
        }
        let run = self.running.remove(&context)?;

        let classification = classify::classify(
            code,
            &captured,
            &run.process,
            run.grammar,
            run.doc.file_name(),
        );
        let outcome = match classification {
            Classification::Clean => LintOutcome::Clean,
            Classification::Issues(records) => LintOutcome::Issues(
                records
                    .into_iter()
                    .map(|record| {
                        let span =
                            position::resolve(run.doc.text(), record.line(), record.column());
                        Diagnostic::new(span, record.severity(), record.message().to_string())
                    })
                    .collect(),
            ),
            Classification::ToolFailed(reason) => LintOutcome::ToolFailed(reason),
        };

        Some(LintCompletion {
            context,
            request,
            outcome,
        })
    }
}

/// Read stdout and stderr concurrently to EOF into one buffer, stdout first.
async fn capture_merged(stdout: ChildStdout, stderr: ChildStderr) -> String {
    let (mut merged, err) = tokio::join!(read_capped(stdout), read_capped(stderr));
    merged.push_str(&err);
    merged
}

async fn read_capped<R: AsyncRead + Unpin>(reader: R) -> String {
    let mut limited = reader.take(MAX_CAPTURE_BYTES);
    let mut buf = Vec::new();
    if let Err(e) = limited.read_to_end(&mut buf).await {
        tracing::warn!("reading lint output failed: {e}");
    }
    // The child must reach EOF to exit; keep the pipe flowing past the cap.
    let mut rest = limited.into_inner();
    if let Err(e) = tokio::io::copy(&mut rest, &mut tokio::io::sink()).await {
        tracing::debug!("draining lint output failed: {e}");
    }
    String::from_utf8_lossy(&buf).into_owned()
}
