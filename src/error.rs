//! Error types for save dispatch
//!
//! Port failures are structured so the dispatcher (and the person reading the
//! notification) can tell a rejected payload from a flaky backend.

use care_records_types::{ActionKind, DialogKind, RecordKind};
use serde::Serialize;
use thiserror::Error;

/// Failure category reported by a record port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortFailureKind {
    /// Payload rejected (missing required field, bad value). Retrying won't help.
    Validation,
    /// Network error or timeout. May succeed on retry.
    Transient,
    /// Write lost a race with another writer
    Conflict,
    /// Backend refused the call outright (misconfigured, down for maintenance)
    Unavailable,
}

impl PortFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Transient => "transient",
            Self::Conflict => "conflict",
            Self::Unavailable => "unavailable",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient)
    }

    /// What the user should do next, shown in the failure title
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Validation => "check the form",
            Self::Transient => "try again",
            Self::Conflict => "reload and try again",
            Self::Unavailable => "service unavailable",
        }
    }
}

impl std::fmt::Display for PortFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by a record port for one write attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} failure: {message}")]
pub struct PortError {
    pub kind: PortFailureKind,
    pub message: String,
}

impl PortError {
    pub fn new(kind: PortFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(PortFailureKind::Validation, message)
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(PortFailureKind::Transient, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(PortFailureKind::Conflict, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(PortFailureKind::Unavailable, message)
    }
}

/// Error returned from a dispatch.
///
/// By the time the caller sees one of these the user has already been told
/// (unless the late-completion policy suppressed or aborted the save).
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("No port registered for {record} (action '{action}')")]
    NoPortRegistered {
        action: ActionKind,
        record: RecordKind,
    },

    #[error("Action '{action}' has a fixed destination and cannot take an explicit target")]
    TargetNotApplicable { action: ActionKind },

    #[error("Saving {record} failed after {attempts} attempt(s): {source}")]
    Port {
        record: RecordKind,
        attempts: u32,
        #[source]
        source: PortError,
    },

    #[error("Save for dialog '{dialog}' was cancelled when the dialog closed")]
    Cancelled { dialog: DialogKind },
}

impl DispatchError {
    /// The port failure behind this error, if any
    pub fn port_error(&self) -> Option<&PortError> {
        match self {
            Self::Port { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Misuse by the calling code rather than a runtime failure
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            Self::NoPortRegistered { .. } | Self::TargetNotApplicable { .. }
        )
    }
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}
