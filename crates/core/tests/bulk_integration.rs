//! Integration tests for the bulk executor and processor

mod support;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use postkit_core::{BulkExecutor, BulkProcessor, CancelScope};
use postkit_domain::{
    AddressRequest, BulkConfig, BulkOutcome, BulkProgress, CancelReason, CityStateRequest,
    PostalError, ZipCodeRequest,
};
use proptest::prelude::*;
use support::postal::{api_error, ScriptedPostalApi};

fn fast_config() -> BulkConfig {
    BulkConfig::default()
        .with_max_concurrency(1)
        .with_requests_per_second(1000)
        .with_retry_backoff(Duration::from_millis(5))
}

fn recorder() -> (Arc<Mutex<Vec<BulkProgress>>>, BulkConfig) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let config =
        fast_config().with_progress(Arc::new(move |p: &BulkProgress| sink.lock().unwrap().push(*p)));
    (events, config)
}

fn address(street: &str) -> AddressRequest {
    AddressRequest {
        street_address: street.into(),
        city: "springfield".into(),
        state: "il".into(),
        zip_code: "62704".into(),
        ..AddressRequest::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_rate_limit_bounds_throughput() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let config = BulkConfig::default()
        .with_max_concurrency(5)
        .with_requests_per_second(5)
        .with_progress(Arc::new(move |p: &BulkProgress| sink.lock().unwrap().push(*p)));
    let api = Arc::new(ScriptedPostalApi::default());
    let processor = BulkProcessor::new(api.clone(), config).unwrap();

    let requests: Vec<_> = (0..10).map(|i| address(&format!("{i} main st"))).collect();
    let started = Instant::now();
    let results = processor.process_addresses(&CancelScope::new(), requests).await;

    assert!(started.elapsed() >= Duration::from_millis(900), "took {:?}", started.elapsed());
    assert_eq!(results.len(), 10);
    assert!(results.iter().all(|r| r.is_success()));
    assert_eq!(api.calls(), 10);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 10);
    let completed: BTreeSet<_> = events.iter().map(|p| p.completed).collect();
    assert_eq!(completed, (1..=10).collect());
    assert!(events.iter().all(|p| p.total == 10 && p.outcome == BulkOutcome::Succeeded));
}

#[tokio::test]
async fn test_results_keep_input_order() {
    let api = Arc::new(ScriptedPostalApi::default());
    let processor =
        BulkProcessor::new(api, fast_config().with_max_concurrency(4)).unwrap();
    let requests: Vec<_> = ["1 a st", "2 b st", "3 c st"].into_iter().map(address).collect();

    let results = processor.process_addresses(&CancelScope::new(), requests).await;

    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.index, i);
        let response = result.response().unwrap();
        assert_eq!(response.address.street_address, result.request.street_address.to_uppercase());
    }
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let api = Arc::new(ScriptedPostalApi::new([Some(500), Some(500), None]));
    let processor = BulkProcessor::new(api.clone(), fast_config().with_max_retries(3)).unwrap();

    let results =
        processor.process_city_states(&CancelScope::new(), vec![CityStateRequest::new("62704")]).await;

    assert_eq!(api.calls(), 3);
    assert_eq!(results[0].response().unwrap().city, "SPRINGFIELD");
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let api = Arc::new(ScriptedPostalApi::new([Some(400)]));
    let processor = BulkProcessor::new(api.clone(), fast_config().with_max_retries(3)).unwrap();

    let results =
        processor.process_city_states(&CancelScope::new(), vec![CityStateRequest::new("00000")]).await;

    assert_eq!(api.calls(), 1);
    assert_eq!(results[0].error().and_then(PostalError::status), Some(400));
    assert_eq!(results[0].outcome(), BulkOutcome::Failed);
}

#[tokio::test]
async fn test_retry_budget_returns_last_error() {
    let api = Arc::new(ScriptedPostalApi::new([Some(503), Some(503), Some(429), Some(503)]));
    let processor = BulkProcessor::new(api.clone(), fast_config().with_max_retries(2)).unwrap();

    let results = processor
        .process_zip_codes(&CancelScope::new(), vec![ZipCodeRequest::default()])
        .await;

    assert_eq!(api.calls(), 3);
    assert_eq!(results[0].error().and_then(PostalError::status), Some(429));
}

#[tokio::test]
async fn test_cancel_stops_pending_workers() {
    let (events, config) = recorder();
    let api = Arc::new(ScriptedPostalApi::default().with_latency(Duration::from_secs(30)));
    let processor = BulkProcessor::new(api.clone(), config.with_max_concurrency(2)).unwrap();
    let scope = CancelScope::new();

    let canceller = scope.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });
    let requests: Vec<_> = (0..6).map(|i| address(&format!("{i} elm st"))).collect();
    let started = Instant::now();
    let results = processor.process_addresses(&scope, requests).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(api.calls() <= 2);
    assert!(results.iter().all(|r| matches!(
        r.error(),
        Some(PostalError::Cancelled(CancelReason::Cancelled))
    )));
    let events = events.lock().unwrap();
    assert_eq!(events.len(), 6);
    assert!(events.iter().all(|p| p.outcome == BulkOutcome::Cancelled));
}

#[tokio::test]
async fn test_cancelled_scope_issues_no_requests() {
    let api = Arc::new(ScriptedPostalApi::default());
    let processor = BulkProcessor::new(api.clone(), fast_config()).unwrap();
    let scope = CancelScope::new();
    scope.cancel();

    let results = processor
        .process_city_states(&scope, vec![CityStateRequest::new("1"), CityStateRequest::new("2")])
        .await;

    assert_eq!(api.calls(), 0);
    assert!(results.iter().all(|r| r.outcome() == BulkOutcome::Cancelled));
}

#[tokio::test]
async fn test_deadline_interrupts_backoff() {
    let api = Arc::new(ScriptedPostalApi::new([Some(503), Some(503), Some(503)]));
    let config = fast_config().with_max_retries(5).with_retry_backoff(Duration::from_secs(30));
    let processor = BulkProcessor::new(api.clone(), config).unwrap();
    let scope = CancelScope::with_timeout(Duration::from_millis(100));

    let results = processor.process_zip_codes(&scope, vec![ZipCodeRequest::default()]).await;

    assert_eq!(api.calls(), 1);
    assert!(matches!(
        results[0].error(),
        Some(PostalError::Cancelled(CancelReason::DeadlineExceeded))
    ));
}

#[tokio::test]
async fn test_panicking_worker_becomes_internal_error() {
    let (events, config) = recorder();
    let executor = BulkExecutor::new(config.with_max_concurrency(3)).unwrap();

    let results = executor
        .execute(&CancelScope::new(), vec![0u32, 1, 2], |_scope, n: u32| async move {
            assert!(n != 1, "worker {n} exploded");
            Ok::<_, PostalError>(n + 100)
        })
        .await;

    assert_eq!(results[0].response(), Some(&100));
    assert!(matches!(results[1].error(), Some(PostalError::Internal(_))));
    assert_eq!(results[1].request, 1);
    assert_eq!(results[2].response(), Some(&102));
    assert_eq!(events.lock().unwrap().len(), 3);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_one_result_per_input(
        failures in proptest::collection::vec(0u32..5, 0..12),
        max_retries in 0u32..3,
        concurrency in 1usize..4,
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let config = BulkConfig::default()
            .with_max_concurrency(concurrency)
            .with_requests_per_second(10_000)
            .with_max_retries(max_retries)
            .with_retry_backoff(Duration::from_millis(1));
        let executor = BulkExecutor::new(config).unwrap();

        let counter = Arc::clone(&calls);
        let attempts_by_index = Arc::new(Mutex::new(vec![0u32; failures.len()]));
        let attempts = Arc::clone(&attempts_by_index);
        let inputs: Vec<(usize, u32)> = failures.iter().copied().enumerate().collect();
        let results = runtime.block_on(executor.execute(
            &CancelScope::new(),
            inputs.clone(),
            move |_scope, (index, fail_times): (usize, u32)| {
                counter.fetch_add(1, Ordering::SeqCst);
                let seen = {
                    let mut attempts = attempts.lock().unwrap();
                    attempts[index] += 1;
                    attempts[index]
                };
                async move {
                    if seen <= fail_times { Err(api_error(503)) } else { Ok(index) }
                }
            },
        ));

        prop_assert_eq!(results.len(), inputs.len());
        for (i, result) in results.iter().enumerate() {
            prop_assert_eq!(result.index, i);
            prop_assert_eq!(result.request, inputs[i]);
            prop_assert!(result.response().is_some() != result.error().is_some());
            prop_assert_eq!(result.is_success(), failures[i] <= max_retries);
        }
        let attempts = attempts_by_index.lock().unwrap();
        for (i, made) in attempts.iter().enumerate() {
            prop_assert!(*made <= max_retries + 1);
            prop_assert_eq!(*made, (failures[i] + 1).min(max_retries + 1));
        }
        prop_assert!(calls.load(Ordering::SeqCst) <= inputs.len() * (max_retries as usize + 1));
    }
}
