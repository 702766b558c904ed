//! Error types for skitter.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`Error`] - Top-level error type
//! - [`ConfigError`] - Subscribe-time configuration errors
//! - [`InvokeError`] - Per-invocation failures, isolated by the dispatcher

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all skitter operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A listener could not be registered.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A handler invocation failed.
    #[error("invocation error: {0}")]
    Invoke(#[from] InvokeError),
}

/// Errors raised while registering a listener.
///
/// Each variant is fatal for the handler declaration that produced it. Handlers
/// of the same listener processed before the failing one stay registered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The handler is not visible outside its listener.
    #[error("handler `{listener}::{handler}` must be externally invocable")]
    Inaccessible {
        /// Listener type name.
        listener: &'static str,
        /// Handler method name.
        handler: &'static str,
    },

    /// The configured invoker strategy cannot bind this handler.
    #[error("cannot build a {strategy} invoker for handler `{listener}::{handler}`")]
    InvokerUnavailable {
        /// Listener type name.
        listener: &'static str,
        /// Handler method name.
        handler: &'static str,
        /// The strategy that was requested.
        strategy: &'static str,
    },
}

/// Errors produced by a single handler invocation.
#[derive(Error, Debug)]
pub enum InvokeError {
    /// The event is not of the handler's declared type.
    #[error("handler expects `{expected}` but received `{actual}`")]
    TypeMismatch {
        /// Declared event type name.
        expected: &'static str,
        /// Runtime event type name.
        actual: &'static str,
    },

    /// The weakly held listener has been dropped.
    #[error("listener has been released")]
    OwnerReleased,

    /// The handler returned an error.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panic(String),
}

impl InvokeError {
    /// Build an [`InvokeError::Panic`] from a caught panic payload.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        InvokeError::Panic(message)
    }
}

impl From<BoxError> for InvokeError {
    fn from(err: BoxError) -> Self {
        InvokeError::Handler(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inaccessible_message() {
        let err = ConfigError::Inaccessible {
            listener: "Audit",
            handler: "on_login",
        };
        assert_eq!(
            err.to_string(),
            "handler `Audit::on_login` must be externally invocable"
        );
    }

    #[test]
    fn test_panic_payloads() {
        let err = InvokeError::from_panic(Box::new("boom"));
        assert!(matches!(err, InvokeError::Panic(ref m) if m == "boom"));

        let err = InvokeError::from_panic(Box::new(String::from("bang")));
        assert!(matches!(err, InvokeError::Panic(ref m) if m == "bang"));

        let err = InvokeError::from_panic(Box::new(7_u32));
        assert!(matches!(err, InvokeError::Panic(_)));
    }

    #[test]
    fn test_top_level_from() {
        let err: Error = InvokeError::OwnerReleased.into();
        assert!(matches!(err, Error::Invoke(InvokeError::OwnerReleased)));
    }
}
