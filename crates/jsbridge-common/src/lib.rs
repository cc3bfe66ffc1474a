//! jsbridge Common Types
//!
//! This crate provides the types shared between the QuickJS session core
//! (`jsbridge-engine`) and the hosts that embed it (`jsbridge-cli` and the
//! JNI library in `jsbridge-android`).
//!
//! # Overview
//!
//! A host creates a session, evaluates scripts or precompiled bytecode in it,
//! and receives an [`ExecutionOutcome`] for every call. Outcomes never carry
//! engine handles; they are plain strings tagged with a [`FailureKind`] so
//! they can cross a foreign-function boundary unchanged.
//!
//! # Components
//!
//! - [`protocol`] - Outcome types, the error type, and the JSON documents
//!   exchanged with a host's network handler
//! - [`limits`] - Memory ceiling and GC threshold configuration
//!
//! # Example
//!
//! ```
//! use jsbridge_common::{ExecutionOutcome, FailureKind};
//!
//! let outcome = ExecutionOutcome::failure(FailureKind::RejectedPromise, "Error: boom");
//! assert_eq!(outcome.to_host_string(), "Promise Rejection: Error: boom");
//! ```

pub mod limits;
pub mod protocol;

pub use limits::EngineLimits;
pub use protocol::*;
