//! Host Network Handler Documents
//!
//! The `fetch` and `XMLHttpRequest` polyfills call the native
//! `_nativeHttpRequest(url, optionsJson)` binding, which forwards both strings
//! to the host's network handler and parses its JSON answer back into a
//! script value. This module types both documents so hosts don't have to
//! pick them apart by hand.
//!
//! # Request Options
//!
//! `fetch` always sends every field; `XMLHttpRequest` only sends `method`,
//! `headers` and `body`, so every field has a default:
//!
//! ```text
//! {"method":"GET","headers":{},"body":null,"timeout":30000,
//!  "redirect":"follow","credentials":"same-origin"}
//! ```
//!
//! # Response
//!
//! ```text
//! {"status":200,"statusText":"OK","ok":true,"redirected":false,
//!  "url":"https://example.com/","type":"basic","headers":{...},"body":"..."}
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default request timeout used by the `fetch` polyfill, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Options document passed to the host's network handler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpRequestOptions {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default, deserialize_with = "deserialize_headers")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "deserialize_body")]
    pub body: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_redirect")]
    pub redirect: String,
    #[serde(default = "default_credentials")]
    pub credentials: String,
}

impl Default for HttpRequestOptions {
    fn default() -> Self {
        Self {
            method: default_method(),
            headers: BTreeMap::new(),
            body: None,
            timeout: default_timeout(),
            redirect: default_redirect(),
            credentials: default_credentials(),
        }
    }
}

impl HttpRequestOptions {
    /// Parses the options string handed over by the polyfills.
    ///
    /// An empty string is treated as `{}`.
    pub fn from_json(options: &str) -> serde_json::Result<Self> {
        if options.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(options)
    }

    /// Whether redirects should be followed transparently.
    pub fn follows_redirects(&self) -> bool {
        self.redirect.eq_ignore_ascii_case("follow")
    }
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_redirect() -> String {
    "follow".to_string()
}

fn default_credentials() -> String {
    "same-origin".to_string()
}

// Scripts may put numbers or booleans in header values; they reach the host
// as whatever JSON.stringify produced, so coerce them back to strings.
fn deserialize_headers<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| (name, json_to_text(value)))
        .collect())
}

fn deserialize_body<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(value) => Some(json_to_text(value)),
    })
}

fn json_to_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Response document returned by the host's network handler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub ok: bool,
    pub redirected: bool,
    pub url: String,
    #[serde(rename = "type")]
    pub response_type: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    /// Builds a `basic` response; `ok` is derived from the status code.
    pub fn new(status: u16, status_text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            ok: (200..300).contains(&status),
            redirected: false,
            url: url.into(),
            response_type: "basic".to_string(),
            headers: BTreeMap::new(),
            body: String::new(),
        }
    }

    pub fn with_redirected(mut self, redirected: bool) -> Self {
        self.redirected = redirected;
        self
    }

    /// Adds a header, joining repeated names with `", "`.
    pub fn with_header(mut self, name: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.headers
            .entry(name.into())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value.as_ref());
            })
            .or_insert_with(|| value.as_ref().to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
