// src/suite/helpers.rs

//! Registry of helper functions shared by the bodies of a suite.
//!
//! Bodies do not look helpers up implicitly: they capture the callable they
//! need (see [`HelperRegistry::get`]) when they are built.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SuiteError};

/// A helper callable.
pub type Helper = Arc<dyn Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync>;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{XID_Start}_$][\p{XID_Continue}$]*$").expect("identifier regex is valid")
});

#[derive(Clone, Default)]
pub struct HelperRegistry {
    helpers: BTreeMap<String, Helper>,
}

impl HelperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `helper` under `name`.
    ///
    /// Registering the very same callable twice is a no-op; a different
    /// callable under a taken name is an error.
    pub fn register(&mut self, name: &str, helper: Helper) -> Result<()> {
        if let Some(existing) = self.helpers.get(name) {
            if Arc::ptr_eq(existing, &helper) {
                return Ok(());
            }
            return Err(SuiteError::DuplicateHelper(name.to_string()));
        }

        if !IDENTIFIER.is_match(name) {
            return Err(SuiteError::InvalidHelperName(name.to_string()));
        }

        debug!(helper = %name, "registered helper");
        self.helpers.insert(name.to_string(), helper);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Helper> {
        self.helpers.get(name).cloned()
    }

    /// Call a helper by name.
    pub fn call(&self, name: &str, args: &[Value]) -> anyhow::Result<Value> {
        let helper = self
            .helpers
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("no helper named \"{name}\""))?;
        helper(args)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.helpers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }
}

impl fmt::Debug for HelperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperRegistry")
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: i64) -> Helper {
        Arc::new(move |_| Ok(Value::from(value)))
    }

    #[test]
    fn rejects_invalid_names() {
        let mut registry = HelperRegistry::new();

        for name in ["", "1abc", "has space", "dash-ed"] {
            let err = registry.register(name, constant(1)).unwrap_err();
            assert!(matches!(err, SuiteError::InvalidHelperName(_)), "{name}");
        }

        registry.register("getTestData", constant(1)).unwrap();
        registry.register("$dollar_ok", constant(1)).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names().collect::<Vec<_>>(), ["$dollar_ok", "getTestData"]);
    }

    #[test]
    fn same_callable_twice_is_a_noop() {
        let mut registry = HelperRegistry::new();
        let helper = constant(7);

        registry.register("seven", helper.clone()).unwrap();
        registry.register("seven", helper).unwrap();

        assert_eq!(registry.call("seven", &[]).unwrap(), Value::from(7));
    }

    #[test]
    fn different_callable_under_same_name_fails() {
        let mut registry = HelperRegistry::new();
        registry.register("value", constant(1)).unwrap();

        let err = registry.register("value", constant(2)).unwrap_err();
        assert!(matches!(err, SuiteError::DuplicateHelper(name) if name == "value"));
    }

    #[test]
    fn calling_unknown_helper_errors() {
        let registry = HelperRegistry::new();
        assert!(registry.call("missing", &[]).is_err());
        assert!(registry.is_empty());
    }
}
