//! Native bindings installed into every context.
//!
//! This is the only place native Rust functions are exposed to scripts:
//!
//! - `_nativeHttpRequest(url, optionsJson)` - forwards to the session's
//!   [`HostBridge`] and returns the parsed JSON answer (used by `fetch` and
//!   `XMLHttpRequest`)
//! - `print(...args)` - writes a space-joined line to the `script` log target
//! - `scriptArgs` - always an empty array
//!
//! The host bridge `Arc` is cloned into the closure of the function that
//! needs it; nothing is stored on the global object.

use rquickjs::{function::Rest, Ctx, Exception, Function, Value};
use std::sync::Arc;

use crate::host::HostBridge;
use crate::runtime::conversions::{self, coerce_string};

/// Thrown as a `ReferenceError` when no host bridge is configured or no URL is given.
pub const HTTP_UNAVAILABLE_MESSAGE: &str = "HTTP service not available";
/// Thrown as an `InternalError` when the host bridge reports a failure or
/// answers with something that is not JSON.
pub const HTTP_FAILED_MESSAGE: &str = "HTTP request failed";

/// Installs `print` and `scriptArgs`.
pub(crate) fn install_std_helpers<'js>(ctx: &Ctx<'js>) -> rquickjs::Result<()> {
    let globals = ctx.globals();

    let print = Function::new(
        ctx.clone(),
        |ctx: Ctx<'js>, args: Rest<Value<'js>>| {
            let line = args
                .0
                .into_iter()
                .map(|value| coerce_string(&ctx, value).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(" ");
            tracing::info!(target: "script", "{}", line);
        },
    )?
    .with_name("print")?;

    globals.set("print", print)?;
    globals.set("scriptArgs", Vec::<String>::new())?;
    Ok(())
}

/// Installs `_nativeHttpRequest`, bound to `host` when one is configured.
pub(crate) fn install_http_binding<'js>(
    ctx: &Ctx<'js>,
    host: Option<Arc<dyn HostBridge>>,
) -> rquickjs::Result<()> {
    let http_request = Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>, args: Rest<Value<'js>>| -> rquickjs::Result<Value<'js>> {
            native_http_request(&ctx, host.as_deref(), &args.0)
        },
    )?
    .with_name("_nativeHttpRequest")?;

    ctx.globals().set("_nativeHttpRequest", http_request)?;
    Ok(())
}

fn native_http_request<'js>(
    ctx: &Ctx<'js>,
    host: Option<&dyn HostBridge>,
    args: &[Value<'js>],
) -> rquickjs::Result<Value<'js>> {
    let (Some(host), Some(url)) = (host, args.first()) else {
        return Err(Exception::throw_reference(ctx, HTTP_UNAVAILABLE_MESSAGE));
    };

    let url = coerce_string(ctx, url.clone())
        .ok_or_else(|| Exception::throw_type(ctx, "URL must be a string"))?;

    let options = match args.get(1) {
        Some(options) => coerce_string(ctx, options.clone())
            .ok_or_else(|| Exception::throw_type(ctx, "Options must be an object"))?,
        None => "{}".to_string(),
    };

    tracing::debug!(%url, "Forwarding HTTP request to host");

    let response = host.handle_http_request(&url, &options).map_err(|e| {
        tracing::error!(%url, "Host HTTP handler failed: {}", e);
        Exception::throw_internal(ctx, HTTP_FAILED_MESSAGE)
    })?;

    ctx.json_parse(response).map_err(|e| {
        let detail = conversions::error_description(ctx, e);
        tracing::error!(%url, "Host HTTP handler returned invalid JSON: {}", detail);
        Exception::throw_internal(ctx, HTTP_FAILED_MESSAGE)
    })
}
