//! Execution poller
//!
//! Polls the workflow engine for the status of one execution until it reaches a
//! terminal status, the attempt or time budget is exhausted, or the caller
//! cancels. Each `PollSession` owns its own attempt counter and history, so
//! concurrent sessions against the same execution never interfere.

use async_trait::async_trait;
use ideaprobe_core::domain::execution::{ExecutionId, PollAttempt, ProcessingStatus};
use serde_json::Value;
use std::time::Duration;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Anything that can report the status payload of an execution
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Perform one status round-trip
    async fn fetch_status(&self, execution_id: &ExecutionId) -> Result<Value>;
}

/// Poll budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Maximum number of status requests
    pub max_attempts: u32,

    /// Suspension between a non-terminal attempt and the next one
    pub delay: Duration,

    /// Optional wall-clock limit on top of the attempt budget
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            delay: Duration::from_secs(5),
            timeout: None,
        }
    }
}

impl PollConfig {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Longest time the attempt budget alone can take, ignoring request latency
    pub fn max_wait(&self) -> Duration {
        self.delay * self.max_attempts.saturating_sub(1)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_attempts == 0 {
            anyhow::bail!("max_attempts must be greater than 0");
        }

        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                anyhow::bail!("timeout must be greater than 0");
            }
        }

        Ok(())
    }
}

/// Loop state
///
/// A `PollSession` is `Polling` for as long as it exists; `run` consumes it and
/// the resulting `PollOutcome` is always in one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling,
    Finished,
    Failed,
    BudgetExhausted,
    Cancelled,
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Polling)
    }
}

/// Why the poller gave up waiting
#[derive(Debug, Clone, PartialEq)]
pub enum ExhaustionReason {
    /// Responses decoded but never reported a terminal status
    StillInProgress {
        last_status: Option<ProcessingStatus>,
    },
    /// Every attempt failed before a payload could be decoded
    NoSuccessfulResponse { last_error: Option<String> },
    /// The wall-clock timeout elapsed
    Timeout {
        last_status: Option<ProcessingStatus>,
    },
}

/// Final result of a polling session
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// The engine reported `finished`; `payload` is that response
    Finished {
        payload: Value,
        attempts: Vec<PollAttempt>,
    },
    /// The engine reported `failed`; `payload` is that response
    Failed {
        payload: Value,
        attempts: Vec<PollAttempt>,
    },
    /// The client stopped waiting; distinct from a remote failure
    BudgetExhausted {
        reason: ExhaustionReason,
        attempts: Vec<PollAttempt>,
    },
    /// Cancelled by the caller; no further requests were issued
    Cancelled { attempts: Vec<PollAttempt> },
}

impl PollOutcome {
    pub fn state(&self) -> PollState {
        match self {
            Self::Finished { .. } => PollState::Finished,
            Self::Failed { .. } => PollState::Failed,
            Self::BudgetExhausted { .. } => PollState::BudgetExhausted,
            Self::Cancelled { .. } => PollState::Cancelled,
        }
    }

    pub fn attempts(&self) -> &[PollAttempt] {
        match self {
            Self::Finished { attempts, .. }
            | Self::Failed { attempts, .. }
            | Self::BudgetExhausted { attempts, .. }
            | Self::Cancelled { attempts } => attempts,
        }
    }

    /// Terminal payload, present only for `Finished` and `Failed`
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Finished { payload, .. } | Self::Failed { payload, .. } => Some(payload),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }
}

/// One polling session for one execution
///
/// Constructed fresh per execution and consumed by `run`.
#[derive(Debug)]
pub struct PollSession {
    execution_id: ExecutionId,
    config: PollConfig,
    attempts: Vec<PollAttempt>,
}

impl PollSession {
    pub fn new(execution_id: ExecutionId, config: PollConfig) -> Self {
        Self {
            execution_id,
            config,
            attempts: Vec::new(),
        }
    }

    pub fn execution_id(&self) -> &ExecutionId {
        &self.execution_id
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    pub fn state(&self) -> PollState {
        PollState::Polling
    }

    /// Poll until a terminal outcome
    pub async fn run<S>(self, source: &S, cancel: &CancellationToken) -> PollOutcome
    where
        S: StatusSource + ?Sized,
    {
        self.run_with_observer(source, cancel, |_| {}).await
    }

    /// Poll until a terminal outcome, reporting every recorded attempt
    ///
    /// Attempts are strictly sequential. A failed attempt (transport, decode or
    /// error status) counts toward the budget and polling continues after the
    /// delay. Cancellation is checked after each response and during each delay;
    /// a response that arrives after cancellation is discarded unrecorded.
    pub async fn run_with_observer<S, F>(
        mut self,
        source: &S,
        cancel: &CancellationToken,
        mut observer: F,
    ) -> PollOutcome
    where
        S: StatusSource + ?Sized,
        F: FnMut(&PollAttempt),
    {
        let max_attempts = self.config.max_attempts.max(1);
        let deadline = self.config.timeout.map(|t| Instant::now() + t);

        info!(
            execution_id = %self.execution_id,
            max_attempts,
            delay_ms = self.config.delay.as_millis() as u64,
            "Polling execution"
        );

        loop {
            if cancel.is_cancelled() {
                return self.cancelled();
            }

            let sequence_number = self.attempts.len() as u32 + 1;
            let fetch = source.fetch_status(&self.execution_id);
            let result = match deadline {
                // The deadline also bounds a request that never returns
                Some(deadline) => match time::timeout_at(deadline, fetch).await {
                    Ok(result) => result,
                    Err(_) if cancel.is_cancelled() => return self.cancelled(),
                    Err(_) => {
                        debug!(
                            execution_id = %self.execution_id,
                            sequence_number,
                            "Abandoning status request at poll deadline"
                        );
                        return self.timed_out();
                    }
                },
                None => fetch.await,
            };

            if cancel.is_cancelled() {
                debug!(
                    execution_id = %self.execution_id,
                    sequence_number,
                    "Discarding response received after cancellation"
                );
                return self.cancelled();
            }

            let attempt = match result {
                Ok(payload) => PollAttempt::decoded(sequence_number, payload),
                Err(e) => {
                    warn!(
                        execution_id = %self.execution_id,
                        sequence_number,
                        "Poll attempt failed: {}",
                        e
                    );
                    PollAttempt::errored(sequence_number, e.to_string())
                }
            };

            debug!(
                execution_id = %self.execution_id,
                sequence_number,
                status = ?attempt.observed_status,
                "Poll attempt recorded"
            );

            observer(&attempt);
            let status = attempt.observed_status;
            let payload = attempt.raw_response.clone();
            self.attempts.push(attempt);

            match (status, payload) {
                (Some(ProcessingStatus::Finished), Some(payload)) => {
                    info!(execution_id = %self.execution_id, sequence_number, "Execution finished");
                    return PollOutcome::Finished {
                        payload,
                        attempts: self.attempts,
                    };
                }
                (Some(ProcessingStatus::Failed), Some(payload)) => {
                    warn!(execution_id = %self.execution_id, sequence_number, "Execution failed remotely");
                    return PollOutcome::Failed {
                        payload,
                        attempts: self.attempts,
                    };
                }
                _ => {}
            }

            if sequence_number >= max_attempts {
                let reason = self.exhaustion_reason();
                warn!(
                    execution_id = %self.execution_id,
                    attempts = sequence_number,
                    ?reason,
                    "Poll budget exhausted"
                );
                return PollOutcome::BudgetExhausted {
                    reason,
                    attempts: self.attempts,
                };
            }

            let mut wake = Instant::now() + self.config.delay;
            let mut timed_out = false;
            if let Some(deadline) = deadline {
                if wake >= deadline {
                    wake = deadline;
                    timed_out = true;
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => return self.cancelled(),
                _ = time::sleep_until(wake) => {}
            }

            if timed_out {
                return self.timed_out();
            }
        }
    }

    fn cancelled(self) -> PollOutcome {
        info!(
            execution_id = %self.execution_id,
            attempts = self.attempts.len(),
            "Polling cancelled"
        );
        PollOutcome::Cancelled {
            attempts: self.attempts,
        }
    }

    fn timed_out(self) -> PollOutcome {
        let reason = ExhaustionReason::Timeout {
            last_status: self.last_status(),
        };
        warn!(execution_id = %self.execution_id, ?reason, "Poll timeout elapsed");
        PollOutcome::BudgetExhausted {
            reason,
            attempts: self.attempts,
        }
    }

    fn last_status(&self) -> Option<ProcessingStatus> {
        self.attempts.iter().rev().find_map(|a| a.observed_status)
    }

    fn exhaustion_reason(&self) -> ExhaustionReason {
        if self.attempts.iter().any(PollAttempt::is_decoded) {
            ExhaustionReason::StillInProgress {
                last_status: self.last_status(),
            }
        } else {
            ExhaustionReason::NoSuccessfulResponse {
                last_error: self.attempts.last().and_then(|a| a.error.clone()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Clone)]
    enum Step {
        Status(&'static str),
        Payload(Value),
        Garbage,
        ServerError,
        /// Sleeps this long, then reports `pending`
        Hang(Duration),
    }

    /// Replays a fixed script of responses, then repeats `tail` forever
    struct ScriptedSource {
        script: Mutex<VecDeque<Step>>,
        tail: Step,
        calls: AtomicU32,
        cancel_on_call: Option<(u32, CancellationToken)>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Step>, tail: Step) -> Self {
            Self {
                script: Mutex::new(script.into()),
                tail,
                calls: AtomicU32::new(0),
                cancel_on_call: None,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn fetch_status(&self, _execution_id: &ExecutionId) -> Result<Value> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((at, token)) = &self.cancel_on_call {
                if *at == call {
                    token.cancel();
                }
            }

            let step = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.tail.clone());

            match step {
                Step::Status(s) => Ok(json!({ "processing_status": s })),
                Step::Payload(v) => Ok(v),
                Step::Garbage => Err(ClientError::DecodeFailed {
                    message: "expected value at line 1 column 1".into(),
                    body: "Warning: mysqli_connect()".into(),
                }),
                Step::ServerError => Err(ClientError::api_error(502, "Bad Gateway")),
                Step::Hang(d) => {
                    time::sleep(d).await;
                    Ok(json!({ "processing_status": "pending" }))
                }
            }
        }
    }

    fn execution_id() -> ExecutionId {
        ExecutionId::new("1fcda3d7-5c1e").unwrap()
    }

    fn config(max_attempts: u32) -> PollConfig {
        PollConfig::new(max_attempts, Duration::from_secs(5))
    }

    #[tokio::test(start_paused = true)]
    async fn test_finishes_after_pending_responses() {
        let finished = json!({"processing_status": "finished", "title": "Report X"});
        let source = ScriptedSource::new(
            vec![
                Step::Status("pending"),
                Step::Status("pending"),
                Step::Payload(finished.clone()),
            ],
            Step::Status("pending"),
        );

        let outcome = PollSession::new(execution_id(), config(10))
            .run(&source, &CancellationToken::new())
            .await;

        assert_eq!(source.calls(), 3);
        assert_eq!(outcome.state(), PollState::Finished);
        assert_eq!(outcome.payload(), Some(&finished));
        let numbers: Vec<u32> = outcome.attempts().iter().map(|a| a.sequence_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_at_remote_failure() {
        let failed = json!({"processing_status": "failed", "error": "flow crashed"});
        let source = ScriptedSource::new(
            vec![Step::Status("pending"), Step::Payload(failed.clone())],
            Step::Status("finished"),
        );

        let outcome = PollSession::new(execution_id(), config(10))
            .run(&source, &CancellationToken::new())
            .await;

        assert_eq!(source.calls(), 2);
        assert_eq!(outcome.state(), PollState::Failed);
        assert_eq!(outcome.payload(), Some(&failed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_budget_while_pending() {
        let source = ScriptedSource::new(vec![], Step::Status("pending"));
        let start = Instant::now();

        let outcome = PollSession::new(execution_id(), config(4))
            .run(&source, &CancellationToken::new())
            .await;

        assert_eq!(source.calls(), 4);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(15) && elapsed < Duration::from_secs(16));
        assert!(outcome.payload().is_none());
        match outcome {
            PollOutcome::BudgetExhausted { reason, attempts } => {
                assert_eq!(attempts.len(), 4);
                assert_eq!(
                    reason,
                    ExhaustionReason::StillInProgress {
                        last_status: Some(ProcessingStatus::Pending)
                    }
                );
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_without_any_decoded_response_is_distinguished() {
        let source = ScriptedSource::new(vec![Step::ServerError], Step::Garbage);

        let outcome = PollSession::new(execution_id(), config(3))
            .run(&source, &CancellationToken::new())
            .await;

        assert_eq!(source.calls(), 3);
        match outcome {
            PollOutcome::BudgetExhausted {
                reason: ExhaustionReason::NoSuccessfulResponse { last_error },
                ..
            } => assert!(last_error.unwrap().contains("decode")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_from_undecodable_attempt() {
        let source = ScriptedSource::new(
            vec![Step::Status("pending"), Step::Garbage, Step::Status("finished")],
            Step::Status("pending"),
        );
        let mut seen = Vec::new();

        let outcome = PollSession::new(execution_id(), config(5))
            .run_with_observer(&source, &CancellationToken::new(), |a| {
                seen.push((a.sequence_number, a.is_decoded()))
            })
            .await;

        assert_eq!(outcome.state(), PollState::Finished);
        assert_eq!(seen, vec![(1, true), (2, false), (3, true)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_progress_status_values_keep_polling() {
        let source = ScriptedSource::new(
            vec![
                Step::Status("processing"),
                Step::Payload(json!({"no_status": true})),
                Step::Status("pending"),
                Step::Status("Finished"),
            ],
            Step::Status("pending"),
        );

        let outcome = PollSession::new(execution_id(), config(10))
            .run(&source, &CancellationToken::new())
            .await;

        assert_eq!(source.calls(), 4);
        assert!(outcome.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_between_attempts_issues_no_further_request() {
        let source = ScriptedSource::new(vec![], Step::Status("pending"));
        let cancel = CancellationToken::new();

        let outcome = PollSession::new(execution_id(), config(10))
            .run_with_observer(&source, &cancel, |a| {
                if a.sequence_number == 2 {
                    cancel.cancel();
                }
            })
            .await;

        assert_eq!(outcome.state(), PollState::Cancelled);
        assert_eq!(outcome.attempts().len(), 2);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_delay() {
        let source = ScriptedSource::new(vec![], Step::Status("pending"));
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(7)).await;
            canceller.cancel();
        });

        let outcome = PollSession::new(execution_id(), config(10))
            .run(&source, &cancel)
            .await;

        assert_eq!(outcome.state(), PollState::Cancelled);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_after_cancellation_is_discarded() {
        let cancel = CancellationToken::new();
        let mut source = ScriptedSource::new(vec![], Step::Status("finished"));
        source.cancel_on_call = Some((1, cancel.clone()));

        let outcome = PollSession::new(execution_id(), config(10))
            .run(&source, &cancel)
            .await;

        assert_eq!(source.calls(), 1);
        assert_eq!(outcome.state(), PollState::Cancelled);
        assert!(outcome.attempts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_issues_nothing() {
        let source = ScriptedSource::new(vec![], Step::Status("finished"));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = PollSession::new(execution_id(), config(10))
            .run(&source, &cancel)
            .await;

        assert_eq!(source.calls(), 0);
        assert_eq!(outcome.state(), PollState::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wall_clock_timeout() {
        let source = ScriptedSource::new(vec![], Step::Status("pending"));
        let config = config(100).with_timeout(Duration::from_secs(12));

        let outcome = PollSession::new(execution_id(), config)
            .run(&source, &CancellationToken::new())
            .await;

        // Attempts at 0s, 5s and 10s; the next would start past the deadline
        assert_eq!(source.calls(), 3);
        match outcome {
            PollOutcome::BudgetExhausted {
                reason: ExhaustionReason::Timeout { last_status },
                ..
            } => assert_eq!(last_status, Some(ProcessingStatus::Pending)),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wall_clock_timeout_abandons_hung_request() {
        let source = ScriptedSource::new(
            vec![
                Step::Status("pending"),
                Step::Hang(Duration::from_secs(3600)),
            ],
            Step::Status("pending"),
        );
        let config = config(100).with_timeout(Duration::from_secs(12));
        let start = Instant::now();

        let outcome = PollSession::new(execution_id(), config)
            .run(&source, &CancellationToken::new())
            .await;

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(12) && elapsed < Duration::from_secs(13));
        assert_eq!(source.calls(), 2);
        // The abandoned request is not recorded as an attempt
        assert_eq!(outcome.attempts().len(), 1);
        assert!(matches!(
            outcome,
            PollOutcome::BudgetExhausted {
                reason: ExhaustionReason::Timeout { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_session_is_polling_until_run() {
        let session = PollSession::new(execution_id(), config(3));
        assert_eq!(session.state(), PollState::Polling);
        assert!(!session.state().is_terminal());
        assert!(PollState::Cancelled.is_terminal());
    }

    #[test]
    fn test_config_validation() {
        assert!(PollConfig::default().validate().is_ok());
        assert!(PollConfig::new(0, Duration::from_secs(1)).validate().is_err());
        assert!(
            PollConfig::default()
                .with_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert_eq!(config(4).max_wait(), Duration::from_secs(15));
    }
}
