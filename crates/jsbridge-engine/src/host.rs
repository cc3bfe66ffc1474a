//! Host network handler capability.
//!
//! Scripts reach the network through the `fetch` and `XMLHttpRequest`
//! polyfills, which call the native `_nativeHttpRequest` binding. The binding
//! forwards to the [`HostBridge`] the session was created with. The call is
//! synchronous: the script is suspended until the handler returns.

use jsbridge_common::Result;

/// A host-provided network handler.
///
/// `options_json` is the request options document produced by the polyfills
/// (see [`jsbridge_common::HttpRequestOptions`]). The returned string must be a
/// JSON document describing the response (see [`jsbridge_common::HttpResponse`]).
/// Returning an error makes the binding throw `InternalError: HTTP request failed`
/// inside the script.
///
/// Any `Fn(&str, &str) -> Result<String>` closure is a `HostBridge`:
///
/// ```
/// use jsbridge_engine::{BridgeError, EngineSession, EngineLimits};
///
/// let host = |_url: &str, _options: &str| {
///     Ok::<_, BridgeError>(r#"{"status":204,"statusText":"No Content","ok":true,"body":""}"#.to_string())
/// };
/// let mut session = EngineSession::with_host(host);
/// session.initialize(EngineLimits::default()).unwrap();
/// ```
pub trait HostBridge: Send + Sync {
    fn handle_http_request(&self, url: &str, options_json: &str) -> Result<String>;
}

impl<F> HostBridge for F
where
    F: Fn(&str, &str) -> Result<String> + Send + Sync,
{
    fn handle_http_request(&self, url: &str, options_json: &str) -> Result<String> {
        self(url, options_json)
    }
}
