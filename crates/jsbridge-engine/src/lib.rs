//! jsbridge Engine
//!
//! This crate owns the QuickJS side of jsbridge: a [`EngineSession`] holding
//! one runtime/context pair, evaluation of source text and precompiled
//! bytecode, and the polyfills installed into every fresh context.
//!
//! Network access from scripts goes through a [`HostBridge`] injected when
//! the session is created.

pub mod host;
pub mod runtime;
pub mod session;

pub use host::HostBridge;
pub use runtime::codec::{BytecodeCodec, CompiledUnit};
pub use runtime::evaluator::UNSETTLED_PROMISE_MESSAGE;
pub use runtime::polyfills::POLYFILL_VERSION;
pub use session::{EngineSession, MemoryStats, SessionState};

pub use jsbridge_common::{BridgeError, EngineLimits, ExecutionOutcome, Failure, FailureKind, Result};
