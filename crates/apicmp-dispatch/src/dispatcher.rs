//! Chunked, bounded-parallelism replay of rows against two hosts

use crate::cancel::CancelToken;
use crate::chunk::chunk_ranges;
use crate::error::{DispatchError, DispatchResult};
use crate::request::{validate_header, KnownHeaders, RequestFactory};
use crate::retry::RetryPolicy;
use crate::transport::Transport;
use apicmp_core::{
    NoopTransform, RequestSpec, RequestTransform, ResponseHandler, ResponseRecord, Row,
};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Static configuration of a replay run
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Base URL of the "before" deployment
    pub before: String,
    /// Base URL of the "after" deployment
    pub after: String,
    /// Rows processed concurrently (chunk width)
    pub threads: usize,
    pub retry: RetryPolicy,
    /// Headers added to every request
    pub headers: Vec<(String, String)>,
    pub known_headers: KnownHeaders,
}

impl DispatcherConfig {
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
            threads: 4,
            retry: RetryPolicy::default(),
            headers: Vec::new(),
            known_headers: KnownHeaders::default(),
        }
    }

    fn validate(&self) -> DispatchResult<()> {
        if self.threads == 0 {
            return Err(DispatchError::InvalidConfig(
                "threads must be at least 1".to_string(),
            ));
        }
        if self.before.trim().is_empty() || self.after.trim().is_empty() {
            return Err(DispatchError::InvalidConfig(
                "both before and after hosts are required".to_string(),
            ));
        }
        for (name, value) in &self.headers {
            validate_header(name, value).map_err(DispatchError::InvalidConfig)?;
        }
        if self.retry.max_attempts == 0 {
            return Err(DispatchError::InvalidConfig(
                "retry policy must allow at least one attempt".to_string(),
            ));
        }
        Ok(())
    }
}

/// How a run that did not fail ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every chunk finished without interruption
    Completed,
    /// The run was interrupted; rows compared so far stay reported
    Aborted,
}

/// Lifecycle of a dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunState {
    Idle = 0,
    Running = 1,
    Completed = 2,
    Aborted = 3,
    Failed = 4,
}

impl RunState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => RunState::Idle,
            1 => RunState::Running,
            2 => RunState::Completed,
            3 => RunState::Aborted,
            _ => RunState::Failed,
        }
    }
}

/// Replays rows against both hosts and hands every answered pair to a
/// [`ResponseHandler`]
///
/// Chunks of at most `threads` rows run one after the other; the rows of a
/// chunk, and the two requests of each row, run concurrently. Handler calls
/// happen one at a time on the task driving [`Dispatcher::run`].
pub struct Dispatcher {
    config: DispatcherConfig,
    factory: RequestFactory,
    transport: Arc<dyn Transport>,
    transform: Arc<dyn RequestTransform>,
    cancel: CancelToken,
    state: AtomicU8,
}

impl Dispatcher {
    /// Create a dispatcher, rejecting unusable configuration before any
    /// request is sent
    pub fn new(config: DispatcherConfig, transport: Arc<dyn Transport>) -> DispatchResult<Self> {
        config.validate()?;
        let factory = RequestFactory::new(config.headers.clone(), config.known_headers.clone());

        Ok(Self {
            config,
            factory,
            transport,
            transform: Arc::new(NoopTransform),
            cancel: CancelToken::new(),
            state: AtomicU8::new(RunState::Idle as u8),
        })
    }

    /// Rewrite both requests of every row before dispatch
    pub fn with_transform(mut self, transform: Arc<dyn RequestTransform>) -> Self {
        self.transform = transform;
        self
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Handle that cancels this dispatcher's run
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Stop the run: no new chunk starts and in-flight requests are dropped
    pub fn interrupt(&self) {
        info!("Interrupt requested, aborting run");
        self.cancel.cancel();
    }

    pub fn state(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: RunState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    /// Replay `rows` and call `handler` once per row answered by both hosts
    ///
    /// Returns [`RunOutcome::Aborted`] when cancelled, and an error when a
    /// host could not be reached at all. Rows already handed to the handler
    /// stay handled in both cases.
    pub async fn run<H>(&self, rows: &[Row], handler: &mut H) -> DispatchResult<RunOutcome>
    where
        H: ResponseHandler + ?Sized,
    {
        if self
            .state
            .compare_exchange(
                RunState::Idle as u8,
                RunState::Running as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            return Err(DispatchError::AlreadyStarted);
        }

        info!(
            rows = rows.len(),
            threads = self.config.threads,
            before = %self.config.before,
            after = %self.config.after,
            "Starting replay"
        );

        match self.run_chunks(rows, handler).await {
            Ok(outcome) => {
                self.set_state(match outcome {
                    RunOutcome::Completed => RunState::Completed,
                    RunOutcome::Aborted => RunState::Aborted,
                });
                Ok(outcome)
            }
            Err(err) => {
                self.set_state(RunState::Failed);
                Err(err)
            }
        }
    }

    async fn run_chunks<H>(&self, rows: &[Row], handler: &mut H) -> DispatchResult<RunOutcome>
    where
        H: ResponseHandler + ?Sized,
    {
        for (chunk, range) in chunk_ranges(rows.len(), self.config.threads).enumerate() {
            if self.cancel.is_cancelled() {
                return Ok(RunOutcome::Aborted);
            }
            debug!(chunk, start = range.start, end = range.end, "Dispatching chunk");

            let mut in_flight: FuturesUnordered<_> = rows[range]
                .iter()
                .map(|row| async move { (row, self.request_row(row).await) })
                .collect();

            while let Some((row, result)) = in_flight.next().await {
                match result? {
                    Some((before, after)) => handler.on_response(row, &before, &after),
                    None => trace!(row = row.index, "Row cancelled, skipping comparison"),
                }
            }
        }

        if self.cancel.is_cancelled() {
            Ok(RunOutcome::Aborted)
        } else {
            Ok(RunOutcome::Completed)
        }
    }

    /// Send both requests of a row; `None` when either side was cancelled
    async fn request_row(
        &self,
        row: &Row,
    ) -> DispatchResult<Option<(ResponseRecord, ResponseRecord)>> {
        let (mut before, mut after) = self
            .factory
            .build_pair(&self.config.before, &self.config.after, row);
        self.transform.transform(&mut before, &mut after);

        let (before, after) =
            futures::try_join!(self.send(row, before), self.send(row, after))?;

        Ok(before.zip(after))
    }

    /// Send one request, retrying retry-eligible statuses
    async fn send(&self, row: &Row, spec: RequestSpec) -> DispatchResult<Option<ResponseRecord>> {
        let mut attempt = 1;
        loop {
            debug!(row = row.index, attempt, "{}", spec.to_curl());

            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Ok(None),
                result = self.transport.send(&spec) => result,
            };

            let response = match result {
                Ok(response) => response,
                Err(_) if self.cancel.is_cancelled() => return Ok(None),
                Err(source) => {
                    return Err(DispatchError::Transport {
                        url: spec.url.clone(),
                        source,
                    })
                }
            };

            if !self.config.retry.should_retry(response.status, attempt) {
                return Ok(Some(ResponseRecord::new(
                    response.status,
                    response.body,
                    spec,
                )));
            }

            debug!(
                row = row.index,
                status = response.status,
                attempt,
                "Request failed with retryable status, retrying"
            );
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Ok(None),
                _ = tokio::time::sleep(self.config.retry.backoff) => {}
            }
            attempt += 1;
        }
    }
}
