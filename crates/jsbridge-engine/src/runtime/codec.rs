//! Bytecode compilation and decoding.
//!
//! A [`CompiledUnit`] is QuickJS's own serialized bytecode for a global
//! script (`JS_Eval` with `COMPILE_ONLY`, then `JS_WriteObject`), framed by a
//! small integrity envelope:
//!
//! ```text
//! +-------+---------+-------------------+------------------+
//! | QJSB  | version | SHA-256(payload)  | QuickJS bytecode |
//! | 4 B   | 1 B     | 32 B              | ...              |
//! +-------+---------+-------------------+------------------+
//! ```
//!
//! QuickJS does not verify bytecode it reads, so the envelope is checked
//! before any byte reaches `JS_ReadObject`. The payload is only meaningful to
//! the same engine build that produced it.
//!
//! # Safety
//!
//! The raw calls below follow the QuickJS ownership rules: every returned
//! `JSValue` is owned and immediately wrapped in a [`Value`], which frees it on
//! drop; `JS_EvalFunction` consumes its argument, so it is given a duplicated
//! reference and the original `Value` is dropped as usual.

use jsbridge_common::{Failure, FailureKind};
use rquickjs::{qjs, Ctx, Value};
use sha2::{Digest, Sha256};
use std::ffi::{c_void, CString};

use crate::runtime::conversions::describe_thrown;

const MAGIC: &[u8; 4] = b"QJSB";
const FORMAT_VERSION: u8 = 1;
const DIGEST_LEN: usize = 32;
const HEADER_LEN: usize = MAGIC.len() + 1 + DIGEST_LEN;

/// Serialized, executable form of a script.
///
/// The bytes are opaque: store them and hand them back to
/// [`EngineSession::evaluate_bytecode`](crate::EngineSession::evaluate_bytecode).
/// Every execution decodes the bytes again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledUnit(Vec<u8>);

impl CompiledUnit {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CompiledUnit {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Compiles scripts to [`CompiledUnit`]s and decodes them back into executable functions.
pub struct BytecodeCodec;

impl BytecodeCodec {
    /// Parses and compiles `source` as a global script without running it.
    ///
    /// # Errors
    ///
    /// - `SyntaxError` if the source does not parse (message from the engine)
    /// - `Codec` if the engine cannot serialize the compiled function
    pub fn compile<'js>(ctx: &Ctx<'js>, source: &str) -> Result<CompiledUnit, Failure> {
        let function = compile_function(ctx, source)?;
        let raw_ctx = ctx.as_raw().as_ptr();

        let mut len = 0;
        // SAFETY: `function` is a live compiled function; the buffer is freed below.
        let buffer = unsafe {
            qjs::JS_WriteObject(
                raw_ctx,
                &mut len,
                function.as_raw(),
                qjs::JS_WRITE_OBJ_BYTECODE as _,
            )
        };

        if buffer.is_null() {
            let thrown = ctx.catch();
            return Err(Failure::new(
                FailureKind::Codec,
                format!("Failed to serialize bytecode: {}", describe_thrown(ctx, &thrown)),
            ));
        }

        // SAFETY: QuickJS returned `len` initialized bytes at `buffer`, allocated with its allocator.
        let payload = unsafe {
            let payload = std::slice::from_raw_parts(buffer, len as usize).to_vec();
            qjs::js_free(raw_ctx, buffer as *mut c_void);
            payload
        };

        tracing::debug!(bytes = payload.len(), "Compiled script to bytecode");
        Ok(CompiledUnit(seal(&payload)))
    }

    /// Decodes serialized bytes into an executable function value.
    ///
    /// # Errors
    ///
    /// Returns a `Codec` failure if the bytes are empty, truncated, not a
    /// compiled unit, fail the integrity check, or are rejected by the engine.
    pub fn decode<'js>(ctx: &Ctx<'js>, bytes: &[u8]) -> Result<Value<'js>, Failure> {
        let payload = unseal(bytes)?;

        // SAFETY: `payload` passed the integrity check, so it is bytecode this codec wrote.
        let function = unsafe {
            let raw = qjs::JS_ReadObject(
                ctx.as_raw().as_ptr(),
                payload.as_ptr(),
                payload.len() as _,
                qjs::JS_READ_OBJ_BYTECODE as _,
            );
            Value::from_raw(ctx.clone(), raw)
        };

        if function.is_exception() {
            let thrown = ctx.catch();
            return Err(Failure::new(
                FailureKind::Codec,
                format!("Failed to read bytecode: {}", describe_thrown(ctx, &thrown)),
            ));
        }

        Ok(function)
    }
}

/// Parses `source` as a sloppy global script and returns the compiled
/// function without running it.
///
/// Any failure here is a parse failure and is reported as `SyntaxError`.
pub(crate) fn compile_function<'js>(ctx: &Ctx<'js>, source: &str) -> Result<Value<'js>, Failure> {
    let input = CString::new(source).map_err(|_| {
        Failure::new(FailureKind::SyntaxError, "SyntaxError: source contains a NUL byte")
    })?;
    let filename = c"<input>";

    // SAFETY: `input` is NUL-terminated and outlives the call; the result is owned.
    let function = unsafe {
        let raw = qjs::JS_Eval(
            ctx.as_raw().as_ptr(),
            input.as_ptr(),
            source.len() as _,
            filename.as_ptr(),
            (qjs::JS_EVAL_TYPE_GLOBAL | qjs::JS_EVAL_FLAG_COMPILE_ONLY) as _,
        );
        Value::from_raw(ctx.clone(), raw)
    };

    if function.is_exception() {
        let thrown = ctx.catch();
        return Err(Failure::new(
            FailureKind::SyntaxError,
            describe_thrown(ctx, &thrown),
        ));
    }

    Ok(function)
}

/// Runs a compiled or decoded function once as a global script.
pub(crate) fn execute<'js>(ctx: &Ctx<'js>, function: Value<'js>) -> rquickjs::Result<Value<'js>> {
    let raw_ctx = ctx.as_raw().as_ptr();

    // SAFETY: `JS_EvalFunction` frees its argument. `Value` offers no way to
    // give up ownership of its handle, so the call gets its own reference and
    // `function` releases the original one when dropped.
    let result = unsafe {
        let owned = qjs::JS_DupValue(raw_ctx, function.as_raw());
        drop(function);
        let raw = qjs::JS_EvalFunction(raw_ctx, owned);
        Value::from_raw(ctx.clone(), raw)
    };

    if result.is_exception() {
        Err(rquickjs::Error::Exception)
    } else {
        Ok(result)
    }
}

pub(crate) fn seal(payload: &[u8]) -> Vec<u8> {
    let mut sealed = Vec::with_capacity(HEADER_LEN + payload.len());
    sealed.extend_from_slice(MAGIC);
    sealed.push(FORMAT_VERSION);
    sealed.extend_from_slice(&Sha256::digest(payload));
    sealed.extend_from_slice(payload);
    sealed
}

fn unseal(bytes: &[u8]) -> Result<&[u8], Failure> {
    if bytes.is_empty() {
        return Err(codec_failure("Empty bytecode"));
    }

    if bytes.len() <= HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(codec_failure("Unrecognized bytecode format"));
    }

    let version = bytes[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(codec_failure(format!("Unsupported bytecode version {}", version)));
    }

    let (digest, payload) = bytes[MAGIC.len() + 1..].split_at(DIGEST_LEN);
    if Sha256::digest(payload).as_slice() != digest {
        return Err(codec_failure("Bytecode checksum mismatch"));
    }

    Ok(payload)
}

fn codec_failure(message: impl Into<String>) -> Failure {
    Failure::new(FailureKind::Codec, message)
}
