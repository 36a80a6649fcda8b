//! Concurrent, rate-limited, retrying execution of request batches
//!
//! Every input gets its own tokio task. Tasks share one semaphore bounding
//! concurrency and one token bucket bounding the request rate; nothing else
//! is shared apart from the progress counter. Results come back in input
//! order regardless of completion order.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use postkit_common::resilience::policies::PredicateRetry;
use postkit_common::{BackoffStrategy, RetryConfig, TokenBucket};
use postkit_domain::constants::MAX_BACKOFF_EXPONENT;
use postkit_domain::{
    BulkConfig, BulkOutcome, BulkProgress, BulkResult, CancelReason, PostalError,
    ProgressCallback, Result,
};
use tokio::sync::Semaphore;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::scope::CancelScope;

/// Runs a per-request operation over a batch of inputs
#[derive(Debug, Clone)]
pub struct BulkExecutor {
    config: BulkConfig,
    retry: RetryConfig,
}

impl BulkExecutor {
    /// Create an executor from a validated bulk configuration
    ///
    /// # Errors
    /// Returns `PostalError::Config` if `config` is invalid.
    pub fn new(config: BulkConfig) -> Result<Self> {
        config.validate()?;
        let retry = RetryConfig::new(
            config.max_retries,
            BackoffStrategy::exponential(config.retry_backoff, MAX_BACKOFF_EXPONENT),
        );
        Ok(Self { config, retry })
    }

    #[must_use]
    pub fn config(&self) -> &BulkConfig {
        &self.config
    }

    #[must_use]
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Execute `op` once per request, retrying transient failures
    ///
    /// The returned vector has one entry per input, at the input's index.
    /// Every input produces exactly one progress event. Dropping the returned
    /// future cancels the workers it spawned.
    pub async fn execute<Req, Resp, F, Fut>(
        &self,
        scope: &CancelScope,
        requests: Vec<Req>,
        op: F,
    ) -> Vec<BulkResult<Req, Resp>>
    where
        Req: Clone + Send + 'static,
        Resp: Send + 'static,
        F: Fn(CancelScope, Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resp>> + Send + 'static,
    {
        let total = requests.len();
        let run_id = Uuid::now_v7();
        let span = info_span!("bulk_run", %run_id, total);
        if total == 0 {
            return Vec::new();
        }

        let limiter = match TokenBucket::per_second(self.config.requests_per_second) {
            Ok(limiter) => limiter,
            Err(err) => {
                let err = PostalError::Config(err.to_string());
                return requests
                    .into_iter()
                    .enumerate()
                    .map(|(index, request)| BulkResult::new(index, request, Err(err.clone())))
                    .collect();
            }
        };

        let run_scope = scope.child();
        let _cancel_workers = run_scope.cancel_on_drop();
        let run = Arc::new(Run {
            op,
            scope: run_scope,
            semaphore: Semaphore::new(self.config.max_concurrency),
            limiter,
            retry: self.retry,
            progress: self.config.progress.clone(),
            completed: AtomicUsize::new(0),
            reported: (0..total).map(|_| AtomicBool::new(false)).collect(),
            total,
        });

        let started = Instant::now();
        let handles: Vec<_> = requests
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, request)| {
                let run = Arc::clone(&run);
                let worker = async move { run.execute_one(index, request).await };
                tokio::spawn(worker.instrument(span.clone()))
            })
            .collect();
        let joined = join_all(handles).await;

        let results: Vec<BulkResult<Req, Resp>> = requests
            .into_iter()
            .zip(joined)
            .enumerate()
            .map(|(index, (request, joined))| {
                let result = joined.unwrap_or_else(|err| {
                    span.in_scope(|| warn!(index, error = %err, "bulk worker did not complete"));
                    run.report(index, BulkOutcome::Failed);
                    Err(PostalError::Internal(format!("bulk worker {index} failed: {err}")))
                });
                BulkResult::new(index, request, result)
            })
            .collect();

        let mut succeeded = 0usize;
        let mut failed = 0usize;
        let mut cancelled = 0usize;
        for result in &results {
            match result.outcome() {
                BulkOutcome::Succeeded => succeeded += 1,
                BulkOutcome::Failed => failed += 1,
                BulkOutcome::Cancelled => cancelled += 1,
            }
        }
        span.in_scope(|| {
            info!(
                succeeded,
                failed,
                cancelled,
                elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                "bulk run complete"
            );
        });

        results
    }
}

/// State shared by the workers of one run
struct Run<F> {
    op: F,
    scope: CancelScope,
    semaphore: Semaphore,
    limiter: TokenBucket,
    retry: RetryConfig,
    progress: Option<ProgressCallback>,
    completed: AtomicUsize,
    reported: Vec<AtomicBool>,
    total: usize,
}

impl<F> Run<F> {
    /// Emit the progress event for `index`, at most once
    fn report(&self, index: usize, outcome: BulkOutcome) {
        if self.reported[index].swap(true, Ordering::AcqRel) {
            return;
        }
        let completed = self.completed.fetch_add(1, Ordering::AcqRel) + 1;
        if let Some(progress) = &self.progress {
            progress(&BulkProgress { index, completed, total: self.total, outcome });
        }
    }

    fn interrupted(&self) -> PostalError {
        PostalError::Cancelled(self.scope.reason().unwrap_or(CancelReason::Cancelled))
    }

    async fn execute_one<Req, Resp, Fut>(&self, index: usize, request: Req) -> Result<Resp>
    where
        F: Fn(CancelScope, Req) -> Fut,
        Fut: Future<Output = Result<Resp>>,
        Req: Clone,
    {
        let result = self.with_permit(index, request).await;
        let outcome = match &result {
            Ok(_) => BulkOutcome::Succeeded,
            Err(err) => BulkOutcome::from_error(err),
        };
        self.report(index, outcome);
        result
    }

    async fn with_permit<Req, Resp, Fut>(&self, index: usize, request: Req) -> Result<Resp>
    where
        F: Fn(CancelScope, Req) -> Fut,
        Fut: Future<Output = Result<Resp>>,
        Req: Clone,
    {
        let _permit = tokio::select! {
            biased;
            reason = self.scope.done() => return Err(reason.into()),
            permit = self.semaphore.acquire() => permit
                .map_err(|_| PostalError::Internal("bulk semaphore closed".into()))?,
        };
        self.attempt_all(index, request).await
    }

    /// Retry loop: rate token, call, classify, back off
    async fn attempt_all<Req, Resp, Fut>(&self, index: usize, request: Req) -> Result<Resp>
    where
        F: Fn(CancelScope, Req) -> Fut,
        Fut: Future<Output = Result<Resp>>,
        Req: Clone,
    {
        let policy = PredicateRetry::new(PostalError::is_retryable);
        let mut attempt = 0u32;
        loop {
            self.limiter.acquire_or_stop(self.scope.done()).await.map_err(|_| self.interrupted())?;

            let err = match self.scope.run((self.op)(self.scope.clone(), request.clone())).await {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(err)) | Err(err) => err,
            };

            let Some(delay) = self.retry.next_delay(&policy, &err, attempt) else {
                return Err(err);
            };
            debug!(
                index,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "retrying request"
            );
            self.scope.sleep(delay).await?;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_rejects_invalid_config() {
        let config = BulkConfig::default().with_max_concurrency(0);
        assert!(matches!(BulkExecutor::new(config), Err(PostalError::Config(_))));
    }

    #[test]
    fn test_retry_schedule_from_config() {
        let config = BulkConfig::default()
            .with_max_retries(4)
            .with_retry_backoff(Duration::from_millis(100));
        let executor = BulkExecutor::new(config).unwrap();
        let retry = executor.retry_config();
        assert_eq!(retry.max_attempts(), 5);
        assert_eq!(retry.backoff.calculate_delay(0), Duration::from_millis(100));
        assert_eq!(retry.backoff.calculate_delay(3), Duration::from_millis(800));
        assert_eq!(retry.backoff.calculate_delay(9), Duration::from_millis(3200));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let executor = BulkExecutor::new(BulkConfig::default()).unwrap();
        let results = executor
            .execute(&CancelScope::new(), Vec::<u32>::new(), |_scope, n: u32| async move {
                Ok::<_, PostalError>(n)
            })
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_results_in_input_order() {
        let executor = BulkExecutor::new(
            BulkConfig::default().with_max_concurrency(4).with_requests_per_second(1000),
        )
        .unwrap();
        let results = executor
            .execute(&CancelScope::new(), vec![30u64, 10, 20, 0], |_scope, delay: u64| async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok::<_, PostalError>(delay * 2)
            })
            .await;
        let responses: Vec<_> = results.iter().map(|r| *r.response().unwrap()).collect();
        assert_eq!(responses, vec![60, 20, 40, 0]);
        assert!(results.iter().enumerate().all(|(i, r)| r.index == i));
    }
}
