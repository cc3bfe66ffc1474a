//! Engine session lifecycle.
//!
//! An [`EngineSession`] owns at most one QuickJS runtime and one context
//! created from it. The context is always dropped before its runtime, and a
//! reset drops the old context before creating the new one.
//!
//! ```text
//!                  initialize                reset (context failure)
//! Uninitialized ──────────────▶ Ready ────────────────────────▶ Degraded ◀─┐
//!       ▲                        │  ▲                              │   │  │ reset
//!       │                        │  └────────── initialize ────────┘   └──┘
//!       │                teardown│
//!       │                        ▼
//!       └──── (new session)  Destroyed ──── initialize ──▶ Ready
//! ```
//!
//! Evaluating on a session that is not `Ready` returns an `EngineNotReady`
//! failure without touching the engine.

use jsbridge_common::{BridgeError, EngineLimits, ExecutionOutcome, Failure, Result};
use rquickjs::{Context, Runtime};
use serde::Serialize;
use std::sync::Arc;

use crate::host::HostBridge;
use crate::runtime::codec::{BytecodeCodec, CompiledUnit};
use crate::runtime::{evaluator, polyfills};

/// Lifecycle state of an [`EngineSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Never initialized
    Uninitialized,
    /// Runtime and context present; scripts can run
    Ready,
    /// Runtime present but a reset failed to create a new context; only
    /// `initialize` makes the session ready again
    Degraded,
    /// Torn down
    Destroyed,
}

/// Snapshot of the runtime allocator counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    pub malloc_size: i64,
    pub malloc_limit: i64,
    pub memory_used_size: i64,
    pub object_count: i64,
    pub string_count: i64,
    pub function_count: i64,
}

/// One QuickJS runtime/context pair plus the host bridge its scripts can reach.
///
/// Not internally synchronized: callers sharing a session between threads
/// must serialize access themselves.
pub struct EngineSession {
    host: Option<Arc<dyn HostBridge>>,
    limits: EngineLimits,
    // Field order matters: the context must drop before the runtime.
    context: Option<Context>,
    runtime: Option<Runtime>,
    initialized: bool,
    destroyed: bool,
}

impl EngineSession {
    /// Creates an uninitialized session.
    ///
    /// Without a host bridge, `fetch` rejects and `XMLHttpRequest` reports
    /// status 0.
    pub fn new(host: Option<Arc<dyn HostBridge>>) -> Self {
        Self {
            host,
            limits: EngineLimits::default(),
            context: None,
            runtime: None,
            initialized: false,
            destroyed: false,
        }
    }

    /// Creates an uninitialized session with a host bridge.
    pub fn with_host(host: impl HostBridge + 'static) -> Self {
        Self::new(Some(Arc::new(host)))
    }

    /// Creates the runtime and context and installs the polyfills.
    ///
    /// A session that is already ready is left untouched. A degraded or
    /// destroyed session is rebuilt from scratch.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if `limits` do not validate
    /// - `RuntimeCreation` / `ContextCreation` if the engine cannot allocate
    ///
    /// The session is not ready after any error.
    pub fn initialize(&mut self, limits: EngineLimits) -> Result<()> {
        if self.is_ready() {
            tracing::warn!("QuickJS already initialized");
            return Ok(());
        }

        limits.validate()?;
        self.release();

        tracing::info!(
            memory_limit = limits.memory_limit_bytes,
            gc_threshold = limits.gc_threshold_bytes,
            "Initializing QuickJS runtime"
        );

        let runtime = Runtime::new().map_err(|e| {
            tracing::error!("Failed to create QuickJS runtime: {}", e);
            BridgeError::RuntimeCreation(e.to_string())
        })?;
        runtime.set_memory_limit(limits.memory_limit_bytes);
        runtime.set_gc_threshold(limits.gc_threshold_bytes);

        let context = Context::full(&runtime).map_err(|e| {
            tracing::error!("Failed to create QuickJS context: {}", e);
            BridgeError::ContextCreation(e.to_string())
        })?;

        polyfills::install(&context, self.host.clone());

        self.limits = limits;
        self.context = Some(context);
        self.runtime = Some(runtime);
        self.initialized = true;
        self.destroyed = false;

        tracing::info!("QuickJS initialized successfully");
        Ok(())
    }

    /// Replaces the context with a fresh one, discarding all script state.
    ///
    /// # Errors
    ///
    /// - `NotInitialized` if there is no runtime
    /// - `ContextCreation` if the new context cannot be created; the session
    ///   is then [`SessionState::Degraded`] until initialized again, and
    ///   resetting a degraded session leaves it degraded
    pub fn reset(&mut self) -> Result<()> {
        let Some(runtime) = self.runtime.as_ref() else {
            tracing::error!("Cannot reset context: runtime not initialized");
            return Err(BridgeError::NotInitialized);
        };

        tracing::info!("Resetting QuickJS context");

        self.context = None;
        runtime.run_gc();

        match Context::full(runtime) {
            Ok(context) => {
                polyfills::install(&context, self.host.clone());
                self.context = Some(context);
                tracing::info!("QuickJS context reset successfully");
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to create new QuickJS context: {}", e);
                self.degrade();
                Err(BridgeError::ContextCreation(e.to_string()))
            }
        }
    }

    /// Releases the context, then the runtime. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if self.runtime.is_none() && self.context.is_none() {
            self.initialized = false;
            return;
        }

        tracing::info!("Cleaning up QuickJS");
        self.release();
        self.destroyed = true;
        tracing::info!("QuickJS cleanup completed");
    }

    /// Keeps the runtime but leaves the session not ready until it is
    /// initialized again; a later successful reset does not recover it.
    fn degrade(&mut self) {
        self.initialized = false;
        self.context = None;
    }

    fn release(&mut self) {
        self.initialized = false;
        self.context = None;
        self.runtime = None;
    }

    /// True iff initialized and a context is present.
    pub fn is_ready(&self) -> bool {
        self.initialized && self.runtime.is_some() && self.context.is_some()
    }

    pub fn state(&self) -> SessionState {
        match &self.runtime {
            _ if self.is_ready() => SessionState::Ready,
            Some(_) => SessionState::Degraded,
            None if self.destroyed => SessionState::Destroyed,
            None => SessionState::Uninitialized,
        }
    }

    /// The limits the current runtime was created with.
    pub fn limits(&self) -> EngineLimits {
        self.limits
    }

    /// Evaluates `source` as a global script and awaits a promise result.
    pub fn evaluate(&self, source: &str) -> ExecutionOutcome {
        match self.ready_context() {
            Some(context) => evaluator::evaluate_source(context, source),
            None => {
                tracing::error!("QuickJS not initialized");
                ExecutionOutcome::not_ready()
            }
        }
    }

    /// Decodes and runs a [`CompiledUnit`]'s bytes.
    pub fn evaluate_bytecode(&self, bytes: &[u8]) -> ExecutionOutcome {
        match self.ready_context() {
            Some(context) => evaluator::evaluate_bytecode(context, bytes),
            None => {
                tracing::error!("QuickJS not initialized");
                ExecutionOutcome::not_ready()
            }
        }
    }

    /// Compiles `source` without running it.
    pub fn compile(&self, source: &str) -> std::result::Result<CompiledUnit, Failure> {
        let context = self.ready_context().ok_or_else(Failure::not_ready)?;
        context.with(|ctx| BytecodeCodec::compile(&ctx, source))
    }

    /// Allocator counters, or `None` before initialization.
    pub fn memory_stats(&self) -> Option<MemoryStats> {
        let usage = self.runtime.as_ref()?.memory_usage();
        Some(MemoryStats {
            malloc_size: usage.malloc_size,
            malloc_limit: usage.malloc_limit,
            memory_used_size: usage.memory_used_size,
            object_count: usage.obj_count,
            string_count: usage.str_count,
            function_count: usage.js_func_count,
        })
    }

    /// Forces a garbage collection cycle.
    pub fn run_gc(&self) {
        if let Some(runtime) = self.runtime.as_ref() {
            runtime.run_gc();
        }
    }

    fn ready_context(&self) -> Option<&Context> {
        if self.initialized && self.runtime.is_some() {
            self.context.as_ref()
        } else {
            None
        }
    }
}

impl Default for EngineSession {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
