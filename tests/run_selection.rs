// tests/run_selection.rs

use serde_json::{Value, json};

use tapsuite::{Body, Hooks, RunOptions, RunStatus, Status, TestOptions};
use tapsuite_test_utils::builders::{SuiteBuilder, fail_body, pass_body, quiet, test};
use tapsuite_test_utils::init_tracing;
use tapsuite_test_utils::recorder::{EventRecorder, Recorded};

#[tokio::test]
async fn only_test_runs_alone() {
    init_tracing();

    let suite = SuiteBuilder::new("only")
        .with_test(test("a", pass_body()))
        .with_test(test("b", fail_body("not selected")).skip(true))
        .with_test(test("picked", pass_body()).only(true))
        .with_test(TestOptions::default().name("no body"))
        .with_test(test("d", fail_body("not selected")))
        .build();

    let result = suite.run(quiet()).await;

    assert_eq!(result.tests_in_suite, 5);
    assert_eq!(result.tests_in_run, 1);
    assert_eq!(result.count(Status::Passed), 1);
    assert_eq!(result.counts.total(), 1);
    assert_eq!(result.run_status, RunStatus::Passed);
}

#[tokio::test]
async fn only_tests_keep_their_repeats_and_ignore_skip() {
    init_tracing();

    let suite = SuiteBuilder::new("only repeats")
        .with_test(test("other", pass_body()))
        .with_test(
            test("picked", pass_body())
                .only(true)
                .skip("flagged anyway")
                .repeats(3),
        )
        .build();

    let result = suite.run(quiet().oneline_report(true)).await;

    assert_eq!(result.tests_in_run, 3);
    assert_eq!(result.count(Status::Passed), 3);
    assert!(
        result
            .report
            .starts_with("ok 1 - picked # skip flagged anyway\n")
    );
}

#[tokio::test]
async fn skipped_and_bodyless_tests_are_reported_without_running() {
    init_tracing();

    let suite = SuiteBuilder::new("selection")
        .with_test(test("s", fail_body("must not run")).skip(true).repeats(4))
        .with_test(TestOptions::default().name("empty"))
        .build();

    let recorder = EventRecorder::new();
    let result = suite.run(RunOptions::default().hooks(recorder.hooks())).await;

    assert_eq!(result.count(Status::Skipped), 1);
    assert_eq!(result.count(Status::HasNoBody), 1);
    assert_eq!(result.run_status, RunStatus::Passed);
    assert_eq!(
        result.report,
        "ok 1 - s # skip\n  ---\n  duration: 0.000\n  ...\n\
         ok 2 - empty\n  ---\n  duration: 0.000\n  status: hasNoBody\n  ...\n\
         1..2 # selection (hasNoBody: 1, skipped: 1)\n"
    );

    let events = recorder.events();
    assert_eq!(
        events[0],
        Recorded::Start {
            test: "s".into(),
            repeat_index: 1,
            retry_index: 0,
            status: Some(Status::Skipped),
        }
    );
    assert_eq!(events.len(), 4);

    assert_eq!(
        recorder.printed(),
        format!("TAP version 14\n{}", result.report)
    );
}

#[tokio::test]
async fn filter_excludes_tests_and_records_its_errors() {
    init_tracing();

    let suite = SuiteBuilder::new("filtered")
        .with_test(test("fast one", pass_body()))
        .with_test(test("slow one", pass_body()))
        .with_test(test("broken", pass_body()))
        .build();

    let hooks = Hooks::default().print(|_| {}).filter(|test| {
        if test.name == "broken" {
            anyhow::bail!("cannot classify {}", test.name);
        }
        Ok(test.name.starts_with("fast"))
    });

    let result = suite.run(RunOptions::default().hooks(hooks)).await;

    assert_eq!(result.tests_in_suite, 3);
    assert_eq!(result.tests_in_run, 1);
    assert_eq!(result.filter_errors.len(), 1);
    assert_eq!(result.filter_errors[0].test.name, "broken");
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.run_status, RunStatus::Passed);
}

#[tokio::test]
async fn parameters_reach_the_body_and_the_report() {
    init_tracing();

    let body = Body::sync(|params| {
        tapsuite::assert_value_is_true(params == [json!("foo"), json!(35)], "parameters")
    });
    let suite = SuiteBuilder::new("params")
        .with_test(
            test("p", body)
                .parameters(vec![Value::from("foo"), Value::from(35)])
                .extra("owner", json!("parser team")),
        )
        .build();

    let result = suite.run(quiet()).await;

    assert_eq!(result.count(Status::Passed), 1);
    assert!(result.report.contains("  parameters: [\"foo\",35]\n"));
}

#[tokio::test]
async fn empty_suite_reports_no_tests() {
    init_tracing();

    let suite = SuiteBuilder::new("nothing").build();
    let result = suite.run(quiet().name("renamed")).await;

    assert_eq!(result.name, "renamed");
    assert_eq!(result.tests_in_run, 0);
    assert_eq!(result.run_status, RunStatus::Passed);
    assert_eq!(result.report, "1..0 # renamed (no tests were run)\n");
}
