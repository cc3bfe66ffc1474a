//! Script evaluation.
//!
//! Source text is compiled first and then run, so a parse failure is always a
//! `SyntaxError` failure and anything thrown while running is a run-time
//! failure. From there source and decoded bytecode share one completion path:
//! a thrown value becomes a failure, a promise completion is driven through
//! the job queue until it settles, and the final value is stringified.

use jsbridge_common::{ExecutionOutcome, Failure, FailureKind};
use rquickjs::{context::EvalOptions, Context, Ctx, Value};

use crate::runtime::codec::{self, BytecodeCodec};
use crate::runtime::conversions::{describe_thrown, error_failure, stringify_result};

/// Message reported for a promise that is still pending once the job queue is empty.
pub const UNSETTLED_PROMISE_MESSAGE: &str = "Promise did not settle";

/// Options for a sloppy-mode global script, used for the polyfill assets.
pub(crate) fn script_options() -> EvalOptions {
    let mut options = EvalOptions::default();
    options.global = true;
    options.strict = false;
    options
}

/// Evaluates source text as a global script.
pub fn evaluate_source(context: &Context, source: &str) -> ExecutionOutcome {
    tracing::debug!("Evaluating script: {}", source);

    let outcome = context.with(|ctx| match codec::compile_function(&ctx, source) {
        Ok(function) => {
            let completion = codec::execute(&ctx, function);
            settle(&ctx, completion)
        }
        Err(failure) => failure.into(),
    });

    log_outcome(&outcome);
    outcome
}

/// Decodes `bytes` and runs the resulting function once.
pub fn evaluate_bytecode(context: &Context, bytes: &[u8]) -> ExecutionOutcome {
    tracing::debug!(bytes = bytes.len(), "Executing bytecode");

    let outcome = context.with(|ctx| match BytecodeCodec::decode(&ctx, bytes) {
        Ok(function) => {
            let completion = codec::execute(&ctx, function);
            settle(&ctx, completion)
        }
        Err(failure) => failure.into(),
    });

    log_outcome(&outcome);
    outcome
}

fn settle<'js>(ctx: &Ctx<'js>, completion: rquickjs::Result<Value<'js>>) -> ExecutionOutcome {
    let value = match completion {
        Ok(value) => value,
        Err(err) => return error_failure(ctx, err).into(),
    };

    let value = match value.as_promise() {
        Some(promise) => match promise.finish::<Value>() {
            Ok(resolved) => resolved,
            Err(rquickjs::Error::Exception) => {
                let reason = ctx.catch();
                return rejection(describe_thrown(ctx, &reason));
            }
            Err(rquickjs::Error::WouldBlock) => return rejection(UNSETTLED_PROMISE_MESSAGE),
            Err(other) => return rejection(other.to_string()),
        },
        None => value,
    };

    ExecutionOutcome::value(stringify_result(ctx, value))
}

fn rejection(message: impl Into<String>) -> ExecutionOutcome {
    Failure::new(FailureKind::RejectedPromise, message).into()
}

fn log_outcome(outcome: &ExecutionOutcome) {
    match outcome {
        ExecutionOutcome::Value { value } => tracing::debug!("Script result: {}", value),
        ExecutionOutcome::Failure(failure) => tracing::error!("Script failed: {}", failure),
    }
}
