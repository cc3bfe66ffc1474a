//! Script value to host text conversions.
//!
//! Everything that leaves the engine leaves it as a string. This module holds
//! the rules for turning a completion value, a thrown exception, or a
//! rejection reason into that string, and for classifying a thrown value into
//! a [`FailureKind`].
//!
//! # Description Strategy
//!
//! 1. Native string conversion of the thrown value (`String(e)`), which for
//!    `Error` objects already reads `"Name: message"`
//! 2. If that throws or is empty, `"name: message"` from the object's fields
//! 3. Otherwise [`UNKNOWN_ERROR`]

use jsbridge_common::{Failure, FailureKind};
use rquickjs::{Coerced, Ctx, FromJs, Object, Value};

use crate::runtime::bindings::{HTTP_FAILED_MESSAGE, HTTP_UNAVAILABLE_MESSAGE};

/// Description used when a thrown value offers nothing readable.
pub(crate) const UNKNOWN_ERROR: &str = "Unknown error";

/// Converts any value with the engine's `ToString`.
///
/// Returns `None` when the conversion throws (symbols, objects with a throwing
/// `toString`); the pending exception is cleared so it does not leak into the
/// next engine call.
pub(crate) fn coerce_string<'js>(ctx: &Ctx<'js>, value: Value<'js>) -> Option<String> {
    match Coerced::<String>::from_js(ctx, value) {
        Ok(Coerced(text)) => Some(text),
        Err(_) => {
            let _ = ctx.catch();
            None
        }
    }
}

/// Stringifies a settled completion value.
///
/// Objects and arrays use their native conversion (`[object Object]`,
/// `1,2,3`); anything unconvertible is reported as `"undefined"`.
pub(crate) fn stringify_result<'js>(ctx: &Ctx<'js>, value: Value<'js>) -> String {
    coerce_string(ctx, value).unwrap_or_else(|| "undefined".to_string())
}

/// Describes a thrown value or rejection reason.
pub(crate) fn describe_thrown<'js>(ctx: &Ctx<'js>, thrown: &Value<'js>) -> String {
    if let Some(text) = coerce_string(ctx, thrown.clone()).filter(|text| !text.is_empty()) {
        return text;
    }

    if let Some(object) = thrown.as_object() {
        let name = property_text(ctx, object, "name");
        let message = property_text(ctx, object, "message");
        if name.is_some() || message.is_some() {
            return format!(
                "{}: {}",
                name.unwrap_or_default(),
                message.unwrap_or_default()
            );
        }
    }

    UNKNOWN_ERROR.to_string()
}

/// Builds the failure for a value thrown synchronously by a script.
pub(crate) fn thrown_failure<'js>(ctx: &Ctx<'js>, thrown: &Value<'js>) -> Failure {
    let message = describe_thrown(ctx, thrown);
    Failure::new(classify_thrown(ctx, thrown), message)
}

/// Builds the failure for an engine call that returned an error.
///
/// `rquickjs::Error::Exception` means a script value was thrown and is
/// waiting in the context; any other error is reported by its own text.
pub(crate) fn error_failure<'js>(ctx: &Ctx<'js>, err: rquickjs::Error) -> Failure {
    match err {
        rquickjs::Error::Exception => {
            let thrown = ctx.catch();
            thrown_failure(ctx, &thrown)
        }
        other => Failure::new(FailureKind::RuntimeError, other.to_string()),
    }
}

/// Describes an engine error without classifying it.
pub(crate) fn error_description<'js>(ctx: &Ctx<'js>, err: rquickjs::Error) -> String {
    match err {
        rquickjs::Error::Exception => {
            let thrown = ctx.catch();
            describe_thrown(ctx, &thrown)
        }
        other => other.to_string(),
    }
}

/// Classifies a value thrown while running. Parse failures are reported by
/// compilation and never reach this point, so a thrown `SyntaxError` (from
/// `JSON.parse` or `eval`) is a run-time failure.
fn classify_thrown<'js>(ctx: &Ctx<'js>, thrown: &Value<'js>) -> FailureKind {
    let Some(object) = thrown.as_object() else {
        return FailureKind::RuntimeError;
    };

    let name = property_text(ctx, object, "name");
    let message = property_text(ctx, object, "message");

    match (name.as_deref(), message.as_deref()) {
        (Some("InternalError"), Some(HTTP_FAILED_MESSAGE))
        | (Some("ReferenceError"), Some(HTTP_UNAVAILABLE_MESSAGE)) => FailureKind::HostBridge,
        _ => FailureKind::RuntimeError,
    }
}

fn property_text<'js>(ctx: &Ctx<'js>, object: &Object<'js>, key: &str) -> Option<String> {
    let value: Value<'js> = match object.get(key) {
        Ok(value) => value,
        Err(_) => {
            let _ = ctx.catch();
            return None;
        }
    };

    if value.is_undefined() || value.is_null() {
        return None;
    }

    coerce_string(ctx, value).filter(|text| !text.is_empty())
}
