//! Script polyfills installed into every fresh context.
//!
//! The JavaScript sources are fixed assets: scripts written against the
//! Android host depend on their exact behavior, including `setTimeout`
//! running its callback immediately and `console.log` returning the formatted
//! message instead of printing it. Changes to any file must bump
//! [`POLYFILL_VERSION`].
//!
//! # Installation Order
//!
//! 1. `print` / `scriptArgs` native helpers
//! 2. `console`
//! 3. timers
//! 4. `_nativeHttpRequest` binding, then `fetch` and `XMLHttpRequest`
//!
//! A polyfill that fails to install is logged and skipped; the context is
//! still usable.

use rquickjs::{Context, Ctx};
use std::sync::Arc;

use crate::host::HostBridge;
use crate::runtime::{bindings, conversions, evaluator};

/// Version of the embedded polyfill set.
pub const POLYFILL_VERSION: &str = "1.0.0";

/// An embedded polyfill script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Polyfill {
    pub name: &'static str,
    pub source: &'static str,
}

pub const CONSOLE: Polyfill = Polyfill {
    name: "<console-polyfill>",
    source: include_str!("console.js"),
};

pub const TIMERS: Polyfill = Polyfill {
    name: "<timer-polyfill>",
    source: include_str!("timers.js"),
};

pub const FETCH: Polyfill = Polyfill {
    name: "<fetch-polyfill>",
    source: include_str!("fetch.js"),
};

/// Installs native helpers and all polyfills into `context`.
pub(crate) fn install(context: &Context, host: Option<Arc<dyn HostBridge>>) {
    context.with(|ctx| {
        if let Err(err) = bindings::install_std_helpers(&ctx) {
            let detail = conversions::error_description(&ctx, err);
            tracing::error!("Failed to add standard helpers: {}", detail);
        }

        eval_polyfill(&ctx, &CONSOLE);
        eval_polyfill(&ctx, &TIMERS);

        if let Err(err) = bindings::install_http_binding(&ctx, host) {
            let detail = conversions::error_description(&ctx, err);
            tracing::error!("Failed to add native HTTP binding: {}", detail);
        }
        eval_polyfill(&ctx, &FETCH);
    });

    tracing::debug!(version = POLYFILL_VERSION, "Polyfills installed");
}

fn eval_polyfill(ctx: &Ctx<'_>, polyfill: &Polyfill) {
    if let Err(err) = ctx.eval_with_options::<(), _>(polyfill.source, evaluator::script_options()) {
        let detail = conversions::error_description(ctx, err);
        tracing::error!("Failed to install {}: {}", polyfill.name, detail);
    }
}
