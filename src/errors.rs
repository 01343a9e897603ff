// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::any::Any;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("The function name \"{0}\" is not a valid identifier")]
    InvalidHelperName(String),

    #[error("Another function \"{0}\" already exists in the scope")]
    DuplicateHelper(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SuiteError>;

/// Turn a caught panic payload into an ordinary error so that panicking
/// bodies and hooks are reported like any other thrown error.
pub(crate) fn panic_to_error(payload: Box<dyn Any + Send>) -> Error {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with a non-string payload".to_string()
    };

    anyhow::anyhow!("panicked: {message}")
}

/// Run a user callback, folding a panic into its error result.
pub(crate) fn catch_panic<T>(f: impl FnOnce() -> anyhow::Result<T>) -> anyhow::Result<T> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(panic_to_error(payload)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_become_messages() {
        let err = panic_to_error(Box::new("boom"));
        assert_eq!(err.to_string(), "panicked: boom");

        let err = panic_to_error(Box::new(String::from("kaboom")));
        assert_eq!(err.to_string(), "panicked: kaboom");

        let err = panic_to_error(Box::new(42_u8));
        assert!(err.to_string().contains("non-string"));
    }

    #[test]
    fn catch_panic_passes_results_through() {
        assert_eq!(catch_panic(|| Ok(7)).unwrap(), 7);

        let err = catch_panic::<()>(|| panic!("hook exploded")).unwrap_err();
        assert_eq!(err.to_string(), "panicked: hook exploded");
    }
}
