use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tapsuite::{Body, Hooks, RunOptions, Suite, SuiteConfig, TestOptions};

/// Body that passes immediately.
pub fn pass_body() -> Body {
    Body::sync(|_| Ok(()))
}

/// Body that fails immediately with `message`.
pub fn fail_body(message: &'static str) -> Body {
    Body::sync(move |_| Err(anyhow::anyhow!(message)))
}

/// Async body that sleeps for `ms` and then passes.
pub fn sleep_body(ms: u64) -> Body {
    Body::future(move |_| async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        anyhow::Ok(())
    })
}

/// Async body that sleeps for `ms` and then fails with `message`.
pub fn sleep_then_fail_body(ms: u64, message: &'static str) -> Body {
    Body::future(move |_| async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Err::<(), _>(anyhow::anyhow!(message))
    })
}

/// Sync body that counts its invocations and fails the first `failures`
/// of them.
pub fn flaky_body(calls: Arc<AtomicUsize>, failures: usize) -> Body {
    Body::sync(move |_| {
        let call = calls.fetch_add(1, Ordering::SeqCst);
        if call < failures {
            anyhow::bail!("flaky failure #{}", call + 1);
        }
        Ok(())
    })
}

/// Named test with a body.
pub fn test(name: &str, body: Body) -> TestOptions {
    TestOptions::default().name(name).body(body)
}

/// Run options whose output is discarded.
pub fn quiet() -> RunOptions {
    RunOptions::default().hooks(Hooks::default().print(|_| {}))
}

/// Builder for [`Suite`] to simplify test setup.
pub struct SuiteBuilder {
    suite: Suite,
}

impl SuiteBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            suite: Suite::new(name),
        }
    }

    pub fn with_config(mut self, config: SuiteConfig) -> Self {
        *self.suite.config_mut() = config;
        self
    }

    pub fn with_test(mut self, test: TestOptions) -> Self {
        self.suite.add_test(test);
        self
    }

    /// `count` tests named `<prefix>-<n>`, each sleeping `ms`.
    pub fn with_sleepers(mut self, prefix: &str, count: usize, ms: u64) -> Self {
        for n in 1..=count {
            self.suite.add_test(test(&format!("{prefix}-{n}"), sleep_body(ms)));
        }
        self
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.suite.set_hooks(hooks);
        self
    }

    pub fn build(self) -> Suite {
        self.suite
    }
}
