// tests/property_counters.rs

use proptest::prelude::*;

use tapsuite::{RunStatus, Status, StatusCounts, Suite, TestOptions};
use tapsuite_test_utils::builders::{fail_body, pass_body, quiet, test};

#[derive(Debug, Clone, Copy)]
enum Kind {
    Pass,
    Fail,
    Skip,
    NoBody,
}

fn kind_strategy() -> impl Strategy<Value = Kind> {
    prop_oneof![
        Just(Kind::Pass),
        Just(Kind::Fail),
        Just(Kind::Skip),
        Just(Kind::NoBody),
    ]
}

// (kind, repeats, retries) per declared test.
fn suite_strategy() -> impl Strategy<Value = Vec<(Kind, usize, usize)>> {
    proptest::collection::vec((kind_strategy(), 1..4usize, 0..3usize), 0..8)
}

fn build(tests: &[(Kind, usize, usize)]) -> (Suite, StatusCounts) {
    let mut suite = Suite::new("generated");
    let mut expected = StatusCounts::default();

    for (n, &(kind, repeats, retries)) in tests.iter().enumerate() {
        let name = format!("t{n}");
        let declared = match kind {
            Kind::Pass => {
                expected.passed += repeats;
                test(&name, pass_body())
            }
            Kind::Fail => {
                expected.failed += repeats * (retries + 1);
                test(&name, fail_body("generated failure"))
            }
            Kind::Skip => {
                expected.skipped += 1;
                test(&name, fail_body("must not run")).skip(true)
            }
            Kind::NoBody => {
                expected.has_no_body += 1;
                TestOptions::default().name(name)
            }
        };
        suite.add_test(declared.repeats(repeats).retries(retries));
    }

    (suite, expected)
}

proptest! {
    #[test]
    fn counters_match_the_declared_tests(
        tests in suite_strategy(),
        concurrency in 1..4usize,
    ) {
        let (suite, expected) = build(&tests);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let result = runtime.block_on(suite.run(quiet().concurrency(concurrency)));

        prop_assert_eq!(result.counts, expected);
        prop_assert_eq!(result.counts.total(), result.tests_in_run);
        prop_assert_eq!(result.tests_in_suite, tests.len());
        prop_assert_eq!(result.count(Status::WasNotRunInTime), 0);

        let any_failure = tests.iter().any(|(kind, _, _)| matches!(kind, Kind::Fail));
        let expected_status = if any_failure { RunStatus::Failed } else { RunStatus::Passed };
        prop_assert_eq!(result.run_status, expected_status);

        let plan = format!("1..{} # generated", result.tests_in_run);
        prop_assert!(result.summary.starts_with(&plan));
    }
}
