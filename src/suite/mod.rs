// src/suite/mod.rs

//! A suite: declared tests, suite-level defaults, default hooks and the
//! helper registry. A suite is never mutated by a run, so it can be run any
//! number of times.

pub mod declare;
pub mod helpers;
pub mod resolve;

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::config::loader::load_and_validate;
use crate::config::model::SuiteConfig;
use crate::config::options::{Hooks, RunOptions};
use crate::engine::result::RunResult;
use crate::engine::runtime::run_suite;
use crate::errors::Result;

pub use declare::{Body, Outcome, TestOptions, TestSpec};
pub use helpers::{Helper, HelperRegistry};
pub use resolve::{ANONYMOUS, ResolvedTest, TestDefaults, resolve_test};

#[derive(Debug, Clone, Default)]
pub struct Suite {
    config: SuiteConfig,
    hooks: Hooks,
    tests: Vec<TestOptions>,
    helpers: HelperRegistry,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(SuiteConfig::named(name))
    }

    pub fn with_config(config: SuiteConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Build an empty suite from a TOML configuration file.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = load_and_validate(path)?;
        info!(suite = %config.name, "loaded suite configuration");
        Ok(Self::with_config(config))
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SuiteConfig {
        &mut self.config
    }

    /// Hooks used when a run does not override them.
    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn set_hooks(&mut self, hooks: Hooks) -> &mut Self {
        self.hooks = hooks;
        self
    }

    /// Declare a test. Accepts a name, a [`TestOptions`] or a [`TestSpec`].
    pub fn add_test(&mut self, test: impl Into<TestSpec>) -> &mut Self {
        self.tests.push(test.into().into_declared());
        self
    }

    pub fn tests(&self) -> &[TestOptions] {
        &self.tests
    }

    /// Register a helper under `name` and hand back the shared callable, so
    /// bodies can capture it.
    pub fn add_helper<F>(&mut self, name: &str, helper: F) -> Result<Helper>
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let helper: Helper = Arc::new(helper);
        self.helpers.register(name, Arc::clone(&helper))?;
        Ok(helper)
    }

    /// Register an already shared helper. The same callable may be
    /// registered again under the same name.
    pub fn register_helper(&mut self, name: &str, helper: Helper) -> Result<()> {
        self.helpers.register(name, helper)
    }

    pub fn helper(&self, name: &str) -> Option<Helper> {
        self.helpers.get(name)
    }

    pub fn helpers(&self) -> &HelperRegistry {
        &self.helpers
    }

    /// Run every declared test once with `options`.
    pub async fn run(&self, options: RunOptions) -> RunResult {
        run_suite(&self.config, &self.hooks, &self.tests, options).await
    }
}
