//! Optional out-of-band molecule deduction.
//!
//! An external collaborator is asked for free-text speculation about the
//! identified groups. The request runs as its own tokio task under a timeout
//! and can be cancelled; whatever happens to it, the finished
//! [`AnalysisReport`](crate::pipeline::AnalysisReport) is untouched.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::task::{AbortHandle, JoinHandle};

use crate::config::DeductionConfig;

/// Failure reported by a deduction service.
#[derive(Debug, Error)]
pub enum DeductionError {
    #[error("deduction service failed: {0}")]
    Service(String),
    #[error("deduction I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DeductionFuture = Pin<Box<dyn Future<Output = Result<String, DeductionError>> + Send>>;

/// Something that turns a prompt into free-text speculation.
pub trait DeductionService: Send + Sync {
    fn deduce(&self, prompt: String) -> DeductionFuture;
}

/// How a deduction request ended. Never converted into an analysis error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeductionOutcome {
    Answer(String),
    Failed(String),
    TimedOut(Duration),
    Cancelled,
    /// Nothing to ask about: no groups were identified.
    Skipped,
}

/// Prompt sent to the collaborator for a set of distinct group names.
pub fn build_prompt(groups: &[&str]) -> String {
    let mut prompt = String::from(
        "The following functional groups were identified in an FTIR spectrum:\n",
    );
    for g in groups {
        prompt.push_str("- ");
        prompt.push_str(g);
        prompt.push('\n');
    }
    prompt.push_str("Which molecule could this spectrum belong to? Answer briefly.\n");
    prompt
}

/// Handle to a running deduction request.
pub struct DeductionTask {
    handle: JoinHandle<DeductionOutcome>,
}

impl DeductionTask {
    /// Abort the request. Awaiting [`outcome`](Self::outcome) afterwards
    /// yields `Cancelled` unless it had already finished.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Cancels the request independently of this handle, e.g. from another
    /// branch of a `select!` that owns the outcome future.
    pub fn abort_handle(&self) -> AbortHandle {
        self.handle.abort_handle()
    }

    pub async fn outcome(self) -> DeductionOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => DeductionOutcome::Cancelled,
            Err(e) => DeductionOutcome::Failed(format!("deduction task panicked: {e}")),
        }
    }
}

/// Start a deduction request on the current tokio runtime.
///
/// # Panics
/// Panics when called outside a tokio runtime.
pub fn spawn_deduction(
    service: Arc<dyn DeductionService>,
    groups: &[&str],
    config: &DeductionConfig,
) -> DeductionTask {
    let prompt = (!groups.is_empty()).then(|| build_prompt(groups));
    let timeout = config.timeout();

    let handle = tokio::spawn(async move {
        let Some(prompt) = prompt else {
            return DeductionOutcome::Skipped;
        };
        match tokio::time::timeout(timeout, service.deduce(prompt)).await {
            Ok(Ok(answer)) => DeductionOutcome::Answer(answer),
            Ok(Err(e)) => {
                log::warn!("{e}");
                DeductionOutcome::Failed(e.to_string())
            }
            Err(_) => {
                log::warn!("deduction timed out after {timeout:?}");
                DeductionOutcome::TimedOut(timeout)
            }
        }
    });

    DeductionTask { handle }
}

// ---------------------------------------------------------------------------
// External program collaborator
// ---------------------------------------------------------------------------

/// Runs an external program, writes the prompt to its stdin and returns its
/// trimmed stdout. The child is killed if the request is dropped.
#[derive(Debug, Clone)]
pub struct CommandDeducer {
    program: String,
    args: Vec<String>,
}

impl CommandDeducer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl DeductionService for CommandDeducer {
    fn deduce(&self, prompt: String) -> DeductionFuture {
        let program = self.program.clone();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        Box::pin(async move {
            let mut child = cmd.spawn()?;
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(prompt.as_bytes()).await?;
            }
            let output = child.wait_with_output().await?;
            if !output.status.success() {
                return Err(DeductionError::Service(format!(
                    "{program} exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                )));
            }
            Ok::<_, DeductionError>(String::from_utf8_lossy(&output.stdout).trim().to_string())
        })
    }
}
