//! Execution Outcome Types
//!
//! Every evaluation returns an [`ExecutionOutcome`]: either the stringified
//! JavaScript result or a [`Failure`] describing what went wrong. Failures are
//! ordinary values, so nothing thrown inside a script can take down the host.
//!
//! # Host Text
//!
//! Hosts that only understand strings (the JNI surface) receive the outcome
//! through [`ExecutionOutcome::to_host_string`]:
//!
//! | Outcome | Text |
//! |---------|------|
//! | `Value(s)` | `s` |
//! | `EngineNotReady` | `Error: QuickJS not initialized` |
//! | `SyntaxError`, `RuntimeError`, `HostBridge` | `JavaScript Error: <message>` |
//! | `RejectedPromise` | `Promise Rejection: <message>` |
//! | `Codec` | `Error: <message>` |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message reported when a session is used before it is ready.
pub const NOT_INITIALIZED_MESSAGE: &str = "QuickJS not initialized";

/// Category of a failed evaluation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The session was never initialized, was torn down, or lost its context
    EngineNotReady,
    /// The source failed to parse or compile
    SyntaxError,
    /// An exception was thrown while the script ran
    RuntimeError,
    /// The script's result was a promise that settled as rejected
    RejectedPromise,
    /// Serialized bytecode was absent, malformed or foreign
    Codec,
    /// The host's network handler was unavailable or failed
    HostBridge,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::EngineNotReady => "engine_not_ready",
            FailureKind::SyntaxError => "syntax_error",
            FailureKind::RuntimeError => "runtime_error",
            FailureKind::RejectedPromise => "rejected_promise",
            FailureKind::Codec => "codec",
            FailureKind::HostBridge => "host_bridge",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure with the engine's description of it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The failure returned for any call on a session that is not ready.
    pub fn not_ready() -> Self {
        Self::new(FailureKind::EngineNotReady, NOT_INITIALIZED_MESSAGE)
    }

    /// Renders the failure the way string-only hosts expect it.
    pub fn to_host_string(&self) -> String {
        match self.kind {
            FailureKind::EngineNotReady | FailureKind::Codec => format!("Error: {}", self.message),
            FailureKind::SyntaxError | FailureKind::RuntimeError | FailureKind::HostBridge => {
                format!("JavaScript Error: {}", self.message)
            }
            FailureKind::RejectedPromise => format!("Promise Rejection: {}", self.message),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Failure {}

/// Result of running source text or a compiled unit to completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// The stringified JavaScript result
    Value { value: String },
    /// The evaluation failed
    Failure(Failure),
}

impl ExecutionOutcome {
    pub fn value(value: impl Into<String>) -> Self {
        ExecutionOutcome::Value {
            value: value.into(),
        }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        ExecutionOutcome::Failure(Failure::new(kind, message))
    }

    pub fn not_ready() -> Self {
        ExecutionOutcome::Failure(Failure::not_ready())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Value { .. })
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            ExecutionOutcome::Value { value } => Some(value),
            ExecutionOutcome::Failure(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&Failure> {
        match self {
            ExecutionOutcome::Value { .. } => None,
            ExecutionOutcome::Failure(failure) => Some(failure),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.as_failure().map(|f| f.kind)
    }

    pub fn to_host_string(&self) -> String {
        match self {
            ExecutionOutcome::Value { value } => value.clone(),
            ExecutionOutcome::Failure(failure) => failure.to_host_string(),
        }
    }

    pub fn into_result(self) -> std::result::Result<String, Failure> {
        match self {
            ExecutionOutcome::Value { value } => Ok(value),
            ExecutionOutcome::Failure(failure) => Err(failure),
        }
    }
}

impl From<Failure> for ExecutionOutcome {
    fn from(failure: Failure) -> Self {
        ExecutionOutcome::Failure(failure)
    }
}
