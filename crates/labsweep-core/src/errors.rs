//! Structured error types shared across labsweep crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Code, message and context carried by every [`SweepError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable kebab-case code, e.g. `column-duplicate`.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (column names, counts, paths).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// What the caller can change, or the text of an underlying I/O error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for sweeps, backends and user callables.
///
/// Errors are never retried or swallowed by the engine: whatever a callable
/// or backend returns reaches the caller of `run` unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum SweepError {
    /// Configuration problems detected before or during backend setup.
    #[error("configuration error: {0}")]
    Config(ErrorInfo),
    /// A measurement function returned values that do not match its columns.
    #[error("contract violation: {0}")]
    Contract(ErrorInfo),
    /// Failures raised by a storage or plotting backend.
    #[error("backend error: {0}")]
    Backend(ErrorInfo),
    /// Failures raised by user supplied setters, point sources or measurements.
    #[error("callable error: {0}")]
    Callable(ErrorInfo),
    /// Serialization and configuration parsing errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl SweepError {
    /// Shorthand for a [`SweepError::Config`] without context.
    pub fn config(code: impl Into<String>, message: impl Into<String>) -> Self {
        SweepError::Config(ErrorInfo::new(code, message))
    }

    /// Shorthand for a [`SweepError::Contract`] without context.
    pub fn contract(code: impl Into<String>, message: impl Into<String>) -> Self {
        SweepError::Contract(ErrorInfo::new(code, message))
    }

    /// Shorthand for a [`SweepError::Backend`] without context.
    pub fn backend(code: impl Into<String>, message: impl Into<String>) -> Self {
        SweepError::Backend(ErrorInfo::new(code, message))
    }

    /// Shorthand for a [`SweepError::Callable`] without context.
    pub fn callable(code: impl Into<String>, message: impl Into<String>) -> Self {
        SweepError::Callable(ErrorInfo::new(code, message))
    }

    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            SweepError::Config(info)
            | SweepError::Contract(info)
            | SweepError::Backend(info)
            | SweepError::Callable(info)
            | SweepError::Serde(info) => info,
        }
    }

    /// Stable machine readable code of the underlying payload.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Adds a context entry, keeping the family.
    pub fn with_context(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match self {
            SweepError::Config(info) => SweepError::Config(info.with_context(key, value)),
            SweepError::Contract(info) => SweepError::Contract(info.with_context(key, value)),
            SweepError::Backend(info) => SweepError::Backend(info.with_context(key, value)),
            SweepError::Callable(info) => SweepError::Callable(info.with_context(key, value)),
            SweepError::Serde(info) => SweepError::Serde(info.with_context(key, value)),
        }
    }
}
