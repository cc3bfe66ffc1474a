//! Host-facing operations behind the JNI exports.
//!
//! Each function takes the session the Java object points at (if any) and
//! produces exactly what the Java side receives, so the string contract can
//! be exercised without a JVM.

use jsbridge_common::NOT_INITIALIZED_MESSAGE;
use jsbridge_engine::{EngineSession, ExecutionOutcome};

/// Returned when `executeBytecode` receives a null array.
pub const NULL_BYTECODE_MESSAGE: &str = "Error: Null bytecode";

/// Answer of the legacy `nativeHttpRequest` export.
pub const EMPTY_RESPONSE: &str = "{}";

fn ready(session: Option<&EngineSession>) -> Option<&EngineSession> {
    session.filter(|session| session.is_ready())
}

/// Text returned by `executeScript`.
pub fn execute_script(session: Option<&EngineSession>, source: &str) -> String {
    match ready(session) {
        Some(session) => session.evaluate(source).to_host_string(),
        None => ExecutionOutcome::not_ready().to_host_string(),
    }
}

/// Text returned by `executeBytecode`; `None` stands for a null Java array.
pub fn execute_bytecode(session: Option<&EngineSession>, bytes: Option<&[u8]>) -> String {
    let Some(session) = ready(session) else {
        tracing::error!("QuickJS not initialized for bytecode execution");
        return ExecutionOutcome::not_ready().to_host_string();
    };

    match bytes {
        Some(bytes) => session.evaluate_bytecode(bytes).to_host_string(),
        None => {
            tracing::error!("Null bytecode provided");
            NULL_BYTECODE_MESSAGE.to_string()
        }
    }
}

/// Bytes returned by `compileScript`; `None` becomes a null Java array.
pub fn compile_script(session: Option<&EngineSession>, source: &str) -> Option<Vec<u8>> {
    let Some(session) = ready(session) else {
        tracing::error!("QuickJS not initialized for compilation");
        return None;
    };

    match session.compile(source) {
        Ok(unit) => {
            tracing::info!("Compiled script to {} bytes of bytecode", unit.len());
            Some(unit.into_bytes())
        }
        Err(failure) => {
            tracing::error!("Compilation failed: {}", failure);
            None
        }
    }
}

/// JSON returned by `getMemoryUsage`.
///
/// Without a runtime the document is `{"error":"QuickJS not initialized"}`.
pub fn memory_usage_json(session: Option<&EngineSession>) -> String {
    let stats = session.and_then(EngineSession::memory_stats);
    let document = match stats {
        Some(stats) => serde_json::to_value(stats),
        None => Ok(serde_json::json!({ "error": NOT_INITIALIZED_MESSAGE })),
    };

    match document {
        Ok(document) => document.to_string(),
        Err(e) => serde_json::json!({ "error": e.to_string() }).to_string(),
    }
}
