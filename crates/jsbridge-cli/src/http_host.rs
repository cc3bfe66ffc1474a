//! Network handler for scripts run from the command line.
//!
//! [`ReqwestHostBridge`] answers `fetch` / `XMLHttpRequest` calls by
//! performing the request with `reqwest`. The engine calls the bridge
//! synchronously, so the bridge owns a current-thread Tokio runtime and blocks
//! on each request.

use jsbridge_common::{BridgeError, HttpRequestOptions, HttpResponse, Result};
use jsbridge_engine::HostBridge;
use reqwest::header::HeaderMap;
use reqwest::{redirect, Client, Method};
use std::time::Duration;

/// [`HostBridge`] backed by `reqwest`.
pub struct ReqwestHostBridge {
    runtime: tokio::runtime::Runtime,
    following: Client,
    manual: Client,
}

impl ReqwestHostBridge {
    /// Builds the runtime and both HTTP clients.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::HostBridge` if the runtime or a client cannot be built.
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| BridgeError::HostBridge(format!("Failed to build runtime: {}", e)))?;

        let following = Client::builder()
            .build()
            .map_err(|e| BridgeError::HostBridge(format!("Failed to build HTTP client: {}", e)))?;
        let manual = Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| BridgeError::HostBridge(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            runtime,
            following,
            manual,
        })
    }

    async fn perform(&self, url: &str, options: &HttpRequestOptions) -> Result<HttpResponse> {
        let client = if options.follows_redirects() {
            &self.following
        } else {
            &self.manual
        };

        let mut request = client
            .request(request_method(&options.method)?, url)
            .timeout(Duration::from_millis(options.timeout));

        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|e| BridgeError::HostBridge(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        let final_url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| BridgeError::HostBridge(format!("Failed to read body from {}: {}", url, e)))?;

        Ok(build_response(
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            url,
            &final_url,
            &headers,
            body,
        ))
    }
}

impl HostBridge for ReqwestHostBridge {
    fn handle_http_request(&self, url: &str, options_json: &str) -> Result<String> {
        let options = HttpRequestOptions::from_json(options_json)?;
        tracing::debug!(%url, method = %options.method, "Performing HTTP request");

        let response = self.runtime.block_on(self.perform(url, &options))?;
        tracing::debug!(%url, status = response.status, "HTTP request completed");

        Ok(response.to_json()?)
    }
}

/// Parses a script-supplied method name; lowercase names are accepted.
pub fn request_method(method: &str) -> Result<Method> {
    Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| BridgeError::HostBridge(format!("Invalid HTTP method '{}'", method)))
}

/// Builds the response document; `redirected` is set when the final URL differs from the requested one.
pub fn build_response(
    status: u16,
    status_text: &str,
    requested_url: &str,
    final_url: &str,
    headers: &HeaderMap,
    body: String,
) -> HttpResponse {
    let redirected = normalize(requested_url) != normalize(final_url);

    headers
        .iter()
        .fold(
            HttpResponse::new(status, status_text, final_url).with_redirected(redirected),
            |response, (name, value)| {
                response.with_header(name.as_str(), String::from_utf8_lossy(value.as_bytes()))
            },
        )
        .with_body(body)
}

fn normalize(url: &str) -> &str {
    url.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, CONTENT_TYPE, SET_COOKIE};

    #[test]
    fn test_request_method() {
        assert_eq!(request_method("GET").unwrap(), Method::GET);
        assert_eq!(request_method("post").unwrap(), Method::POST);
        assert_eq!(request_method(" Patch ").unwrap(), Method::PATCH);
        assert!(request_method("not a method").is_err());
    }

    #[test]
    fn test_build_response() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let response = build_response(
            200,
            "OK",
            "https://example.com",
            "https://example.com/",
            &headers,
            "hello".to_string(),
        );

        assert_eq!(response.status, 200);
        assert!(response.ok);
        assert!(!response.redirected);
        assert_eq!(response.url, "https://example.com/");
        assert_eq!(response.response_type, "basic");
        assert_eq!(response.headers.get("content-type").map(String::as_str), Some("text/plain"));
        assert_eq!(response.body, "hello");
    }

    #[test]
    fn test_build_response_redirected_and_repeated_headers() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2"));

        let response = build_response(
            404,
            "Not Found",
            "http://example.com/old",
            "http://example.com/new",
            &headers,
            String::new(),
        );

        assert!(!response.ok);
        assert!(response.redirected);
        assert_eq!(response.headers.get("set-cookie").map(String::as_str), Some("a=1, b=2"));
    }

    #[test]
    fn test_invalid_options_json() {
        let bridge = ReqwestHostBridge::new().unwrap();
        let err = bridge
            .handle_http_request("http://127.0.0.1:9", "{not json")
            .unwrap_err();
        assert!(matches!(err, BridgeError::JsonSerialization(_)));
    }

    #[test]
    fn test_connection_failure_is_bridge_error() {
        let bridge = ReqwestHostBridge::new().unwrap();
        // Port 9 (discard) is not listening on loopback in test environments.
        let err = bridge
            .handle_http_request("http://127.0.0.1:9/", r#"{"timeout":2000}"#)
            .unwrap_err();
        assert!(matches!(err, BridgeError::HostBridge(_)));
    }
}
