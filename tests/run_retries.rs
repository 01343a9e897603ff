// tests/run_retries.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tapsuite::{RunOptions, RunStatus, Status};
use tapsuite_test_utils::builders::{SuiteBuilder, fail_body, flaky_body, quiet, sleep_body, test};
use tapsuite_test_utils::recorder::{EventRecorder, Recorded};
use tapsuite_test_utils::{init_tracing, with_timeout};

fn end_indices(recorder: &EventRecorder) -> Vec<(usize, usize)> {
    recorder
        .events()
        .into_iter()
        .filter_map(|event| match event {
            Recorded::End {
                repeat_index,
                retry_index,
                ..
            } => Some((repeat_index, retry_index)),
            Recorded::Start { .. } => None,
        })
        .collect()
}

#[tokio::test]
async fn retries_follow_their_failed_attempt_within_each_repeat() {
    init_tracing();

    let suite = SuiteBuilder::new("retries")
        .with_test(test("always fails", fail_body("still broken")).repeats(2).retries(2))
        .build();

    let recorder = EventRecorder::new();
    let result = with_timeout(suite.run(RunOptions::default().hooks(recorder.hooks()))).await;

    assert_eq!(result.count(Status::Failed), 6);
    assert_eq!(result.tests_in_run, 6);
    assert_eq!(result.run_status, RunStatus::Failed);
    assert_eq!(
        end_indices(&recorder),
        vec![(1, 0), (1, 1), (1, 2), (2, 0), (2, 1), (2, 2)]
    );

    let starts = recorder
        .events()
        .into_iter()
        .filter(|event| matches!(event, Recorded::Start { status: None, .. }))
        .count();
    assert_eq!(starts, 6);

    assert!(result.report.contains("  repeatIndex: 2\n  retryIndex: 2\n"));
}

#[tokio::test]
async fn flaky_test_stops_retrying_once_it_passes() {
    init_tracing();

    let calls = Arc::new(AtomicUsize::new(0));
    let suite = SuiteBuilder::new("flaky")
        .with_test(test("flaky", flaky_body(Arc::clone(&calls), 2)).retries(5))
        .build();

    let result = with_timeout(suite.run(quiet())).await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(result.count(Status::Failed), 2);
    assert_eq!(result.count(Status::Passed), 1);
    assert_eq!(result.run_status, RunStatus::Failed);
    assert!(result.report.contains("ok 3 - flaky\n"));
}

#[tokio::test(start_paused = true)]
async fn timed_out_attempts_are_retried() {
    init_tracing();

    let suite = SuiteBuilder::new("slow retries")
        .with_test(
            test("slow", sleep_body(100))
                .timeout(Duration::from_millis(10))
                .retries(1),
        )
        .build();

    let result = with_timeout(suite.run(quiet())).await;

    assert_eq!(result.count(Status::TimedOut), 2);
    assert!(result.report.contains("  retryIndex: 1\n"));
}

#[tokio::test]
async fn run_options_supply_repeats_and_retries() {
    init_tracing();

    let calls = Arc::new(AtomicUsize::new(0));
    let suite = SuiteBuilder::new("run defaults")
        .with_test(test("counted", flaky_body(Arc::clone(&calls), 1)))
        .build();

    let result = with_timeout(suite.run(quiet().repeats(3).retries(1))).await;

    // First call fails and is retried once; the rest pass.
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(result.count(Status::Failed), 1);
    assert_eq!(result.count(Status::Passed), 3);
}

#[tokio::test]
async fn skipped_tests_are_never_retried() {
    init_tracing();

    let suite = SuiteBuilder::new("skip")
        .with_test(test("skipped", fail_body("never")).skip(true).retries(3))
        .build();

    let result = with_timeout(suite.run(quiet())).await;

    assert_eq!(result.tests_in_run, 1);
    assert_eq!(result.count(Status::Skipped), 1);
}
