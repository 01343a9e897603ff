// src/suite/declare.rs

//! Declared (partial) tests, as they are registered on a [`Suite`].
//!
//! A declaration only records what the user said explicitly; everything left
//! unset is filled in per run by [`resolve_test`].
//!
//! [`Suite`]: crate::suite::Suite
//! [`resolve_test`]: crate::suite::resolve::resolve_test

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::{Map, Value};

use crate::types::Marker;

/// What a test body or a suite hook hands back when invoked.
pub enum Outcome {
    /// Settled synchronously; no timer is armed.
    Ready(anyhow::Result<()>),
    /// Settles later; for test bodies this is raced against the test timeout.
    Pending(BoxFuture<'static, anyhow::Result<()>>),
}

impl Outcome {
    pub fn ok() -> Self {
        Outcome::Ready(Ok(()))
    }

    pub fn pending<F>(fut: F) -> Self
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Outcome::Pending(fut.boxed())
    }
}

impl From<anyhow::Result<()>> for Outcome {
    fn from(result: anyhow::Result<()>) -> Self {
        Outcome::Ready(result)
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Outcome::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// A test body. It receives the test's fixed parameter list.
#[derive(Clone)]
pub struct Body(Arc<dyn Fn(&[Value]) -> Outcome + Send + Sync>);

impl Body {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Outcome + Send + Sync + 'static,
    {
        Body(Arc::new(f))
    }

    /// Body that finishes before returning.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Body::new(move |params| Outcome::Ready(f(params)))
    }

    /// Body that returns a future; the attempt stays in flight until it settles.
    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Body::new(move |params| Outcome::pending(f(params)))
    }

    pub fn call(&self, params: &[Value]) -> Outcome {
        (self.0)(params)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Body(..)")
    }
}

/// Any subset of the fields of a test.
///
/// Unset fields fall back to run options, then suite configuration, then
/// built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct TestOptions {
    pub name: Option<String>,
    pub body: Option<Body>,
    /// Invert pass/fail: the attempt passes only if the body errors.
    pub fail: Option<bool>,
    pub only: Option<bool>,
    pub skip: Option<Marker>,
    pub todo: Option<Marker>,
    pub parameters: Option<Vec<Value>>,
    pub repeats: Option<usize>,
    pub retries: Option<usize>,
    pub timeout: Option<Duration>,
    /// User payload carried along untouched.
    pub extra: Map<String, Value>,
}

impl TestOptions {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn fail(mut self, fail: bool) -> Self {
        self.fail = Some(fail);
        self
    }

    pub fn only(mut self, only: bool) -> Self {
        self.only = Some(only);
        self
    }

    pub fn skip(mut self, skip: impl Into<Marker>) -> Self {
        self.skip = Some(skip.into());
        self
    }

    pub fn todo(mut self, todo: impl Into<Marker>) -> Self {
        self.todo = Some(todo.into());
        self
    }

    pub fn parameters(mut self, parameters: Vec<Value>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn repeats(mut self, repeats: usize) -> Self {
        self.repeats = Some(repeats);
        self
    }

    pub fn retries(mut self, retries: usize) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// A registration request.
///
/// `name` and `body` given directly on the spec win over the same fields
/// inside [`TestOptions`], whatever order the builder calls were made in.
#[derive(Debug, Clone, Default)]
pub struct TestSpec {
    name: Option<String>,
    body: Option<Body>,
    options: TestOptions,
}

impl TestSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new().name(name)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn options(mut self, options: TestOptions) -> Self {
        self.options = options;
        self
    }

    /// Collapse into the declared record stored by the suite.
    pub fn into_declared(self) -> TestOptions {
        let TestSpec {
            name,
            body,
            mut options,
        } = self;

        if name.is_some() {
            options.name = name;
        }
        if body.is_some() {
            options.body = body;
        }

        options
    }
}

impl From<&str> for TestSpec {
    fn from(name: &str) -> Self {
        TestSpec::named(name)
    }
}

impl From<TestOptions> for TestSpec {
    fn from(options: TestOptions) -> Self {
        TestSpec::new().options(options)
    }
}
