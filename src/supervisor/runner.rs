//! Supervisor runner for a single Codex execution.
//!
//! This module connects the argument builder, process spawner and stream
//! parser, and enforces the run timeout and interrupt handling.

use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::ChildStdin;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

use crate::cli::{
    build_args, exit_code_of, write_task, CodexEvent, CodexProcess, DeliveryMode,
    EventAccumulator, InvocationDescriptor, StreamParser, DEFAULT_CHANNEL_BUFFER,
};
use crate::config::RunnerConfig;
use crate::display;
use crate::supervisor::{RunError, RunOutcome, RunState, RunStateMachine};

/// How the wait for the child ended.
enum WaitResult {
    Exited(std::io::Result<ExitStatus>),
    TimedOut,
    Interrupted,
}

/// Supervisor for one Codex run.
pub struct Supervisor {
    config: RunnerConfig,
    timeout: Duration,
    cancel: Option<CancellationToken>,
    state: RunStateMachine,
}

impl Supervisor {
    /// Create a supervisor that kills the run after `timeout`.
    #[must_use]
    pub fn new(config: RunnerConfig, timeout: Duration) -> Self {
        Self {
            config,
            timeout,
            cancel: None,
            state: RunStateMachine::new(),
        }
    }

    /// Set a cancellation token; cancelling it interrupts the run.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Current run state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state.state()
    }

    /// Run Codex for `desc` to completion, timeout, or interrupt.
    ///
    /// Never returns with the child still running.
    pub async fn run(&mut self, desc: &InvocationDescriptor) -> RunOutcome {
        let delivery = DeliveryMode::select(&desc.task, self.config.stdin_threshold);
        let args = build_args(desc, delivery);
        tracing::debug!(
            binary = %self.config.binary,
            argc = args.len(),
            resume = desc.is_resume(),
            ?delivery,
            "Built Codex arguments"
        );

        let mut process = match CodexProcess::spawn(&self.config.binary, &args, delivery) {
            Ok(process) => process,
            Err(e) => {
                self.state.transition(RunState::SpawnFailed);
                return RunOutcome::failure(e, EventAccumulator::new());
            }
        };
        self.state.transition(RunState::Spawned);

        let Some(stdout) = process.take_stdout() else {
            return self
                .abort(
                    &mut process,
                    std::io::Error::other("Codex stdout not available").into(),
                    EventAccumulator::new(),
                )
                .await;
        };
        let mut events = StreamParser::into_channel(stdout, DEFAULT_CHANNEL_BUFFER);
        let stdin = if delivery.is_piped() {
            process.take_stdin()
        } else {
            None
        };

        self.state.transition(RunState::Running);
        let mut acc = EventAccumulator::new();
        let cancel = self.cancel.clone().unwrap_or_default();

        let result = tokio::select! {
            biased;

            () = cancel.cancelled() => WaitResult::Interrupted,
            () = tokio::time::sleep(self.timeout) => WaitResult::TimedOut,
            status = drain_and_wait(&mut process, stdin, &desc.task, &mut events, &mut acc) => {
                WaitResult::Exited(status)
            }
        };

        if !matches!(result, WaitResult::Exited(Ok(_))) {
            while let Ok(event) = events.try_recv() {
                acc.apply(&event);
            }
        }

        match result {
            WaitResult::Exited(Ok(status)) => {
                self.state.transition(RunState::Completed);
                tracing::info!(?status, events = acc.event_count(), "Codex process exited");
                Self::classify_exit(status, acc)
            }
            WaitResult::Exited(Err(e)) => self.abort(&mut process, e.into(), acc).await,
            WaitResult::TimedOut => {
                self.state.transition(RunState::TimedOut);
                let secs = self.timeout.as_secs();
                self.abort(&mut process, RunError::Timeout { secs }, acc).await
            }
            WaitResult::Interrupted => {
                self.state.transition(RunState::Interrupted);
                self.abort(&mut process, RunError::Interrupted, acc).await
            }
        }
    }

    /// Map a finished child's status to an outcome.
    fn classify_exit(status: ExitStatus, acc: EventAccumulator) -> RunOutcome {
        if status.success() {
            RunOutcome::completed(acc)
        } else {
            let code = exit_code_of(status);
            RunOutcome::failure(RunError::ChildFailed { code }, acc)
        }
    }

    /// Terminate the child, then fail with `error`.
    async fn abort(
        &self,
        process: &mut CodexProcess,
        error: RunError,
        acc: EventAccumulator,
    ) -> RunOutcome {
        match process.graceful_terminate(self.config.terminate_grace()).await {
            Ok(termination) => tracing::debug!(?termination, "Codex process terminated"),
            Err(e) => tracing::warn!(error = %e, "Failed to terminate Codex process"),
        }
        RunOutcome::failure(error, acc)
    }
}

/// Feed the task to stdin and drain all events while waiting for the child
/// to exit.
///
/// A blocked stdin write stays inside this future, so the caller's timeout
/// and cancellation still apply to it.
async fn drain_and_wait(
    process: &mut CodexProcess,
    stdin: Option<ChildStdin>,
    task: &str,
    events: &mut Receiver<CodexEvent>,
    acc: &mut EventAccumulator,
) -> std::io::Result<ExitStatus> {
    let feed = async {
        if let Some(stdin) = stdin {
            if let Err(e) = write_task(stdin, task).await {
                display::print_warning(&format!("Failed to write task to Codex stdin: {e}"));
            }
        }
    };
    let drain = async {
        while let Some(event) = events.recv().await {
            acc.apply(&event);
        }
    };
    let ((), (), status) = tokio::join!(feed, drain, process.wait());
    status
}
