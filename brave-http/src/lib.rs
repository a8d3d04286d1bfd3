//! Minimal HTTP client with safe logging and header auth.
//!
//! - Request options: headers, `Auth`, query params, optional timeout
//! - Absent query values are never sent (see [`QueryParams::push_opt`])
//! - Redacts sensitive query params and never logs secret values
//! - Optional *raw* request/response logging via `BRAVE_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```no_run
//! # async fn demo() -> Result<(), brave_http::HttpError> {
//! let client = brave_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .get_json("v1/items", brave_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Requests are sent exactly once. There is no retry loop and, unless the
//! caller sets one, no timeout.
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), final errors, and (optionally)
//! raw request/response lines (target `http.raw`) when `BRAVE_HTTP_RAW=1`.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub use reqwest::StatusCode as HttpStatus;
pub use reqwest::header;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "BRAVE_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{}", method)];
    for (key, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", key, val.replace('\'', r"'\''")));
    }
    parts.push(format!("'{}'", redact_url(url)));
    parts.join(" ")
}

fn is_secret_header(name: &str) -> bool {
    name.eq_ignore_ascii_case("authorization") || name.eq_ignore_ascii_case("x-subscription-token")
}

fn is_secret_param(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "access_token"
            | "authorization"
            | "auth"
            | "key"
            | "api_key"
            | "token"
            | "secret"
            | "client_secret"
            | "bearer"
    )
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let val = if is_secret_header(&key) {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("").to_string()
            };
            (key, val)
        })
        .collect()
}

fn redact_url(url: &Url) -> String {
    let mut clone = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if is_secret_param(&k) {
                "<redacted>".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    if pairs.is_empty() {
        clone.set_query(None);
    } else {
        clone.query_pairs_mut().clear().extend_pairs(pairs);
    }
    clone.to_string()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    /// Non-success status. `body` is the raw response text, never JSON-parsed.
    #[error("{message}")]
    Api {
        status: StatusCode,
        message: String,
        body: String,
    },
}

impl HttpError {
    /// Status code of an [`HttpError::Api`] failure.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ==============================
// Auth, Query & Request Options
// ==============================

/// Authentication strategies supported by the HTTP client helpers.
///
/// ```
/// use brave_http::Auth;
///
/// let auth = Auth::header("x-subscription-token", "secret").unwrap();
/// assert!(matches!(auth, Auth::Header { .. }));
/// ```
#[derive(Clone, Debug, Default)]
pub enum Auth {
    /// Custom header (e.g., Brave: X-Subscription-Token)
    Header {
        name: HeaderName,
        value: HeaderValue,
    },
    #[default]
    None,
}

impl Auth {
    /// Build a header credential, validating both name and value up front.
    pub fn header(name: &str, value: &str) -> Result<Self, HttpError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| HttpError::Build(format!("invalid auth header name: {e}")))?;
        let mut value = HeaderValue::from_str(value.trim())
            .map_err(|e| HttpError::Build(format!("invalid auth header value: {e}")))?;
        value.set_sensitive(true);
        Ok(Auth::Header { name, value })
    }

    fn kind(&self) -> &'static str {
        match self {
            Auth::Header { .. } => "header",
            Auth::None => "none",
        }
    }
}

/// Ordered query parameters. Absent values are dropped at insertion time, so
/// nothing like `country=` or `country=None` ever reaches the wire.
///
/// ```
/// use brave_http::QueryParams;
///
/// let mut params = QueryParams::new();
/// params.push("q", "rust");
/// params.push_opt("count", Some(5));
/// params.push_opt::<String>("country", None);
///
/// assert_eq!(params.get("count"), Some("5"));
/// assert!(!params.contains("country"));
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(&'static str, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value, stringified with its `Display` impl.
    pub fn push(&mut self, key: &'static str, value: impl fmt::Display) -> &mut Self {
        self.0.push((key, value.to_string()));
        self
    }

    /// Append only when `value` is present.
    pub fn push_opt<V: fmt::Display>(&mut self, key: &'static str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.push(key, v);
        }
        self
    }

    /// Builder-style [`QueryParams::push`].
    pub fn with(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.push(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| *k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(k, _)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn redacted(&self) -> Vec<(&'static str, String)> {
        self.0
            .iter()
            .map(|(k, v)| {
                if is_secret_param(k) {
                    (*k, "<redacted>".to_string())
                } else {
                    (*k, v.clone())
                }
            })
            .collect()
    }
}

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use brave_http::{QueryParams, RequestOpts};
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     query: Some(QueryParams::new().with("q", "term")),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(opts.headers.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts {
    /// Overrides the client default; `None` on both means no timeout.
    pub timeout: Option<Duration>,
    pub auth: Option<Auth>,
    pub headers: Option<HeaderMap>,
    pub query: Option<QueryParams>,
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Option<Duration>,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// A trailing slash is added to the base so relative paths are appended
    /// rather than replacing its last segment.
    ///
    /// ```no_run
    /// use brave_http::{HttpClient, HttpError};
    ///
    /// let client = HttpClient::new("https://api.example.com/v2")?;
    /// assert_eq!(client.base().as_str(), "https://api.example.com/v2/");
    /// assert!(client.default_timeout.is_none());
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let mut base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let inner = Client::builder()
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: None,
        })
    }

    /// Set a default timeout applied to every request.
    ///
    /// ```no_run
    /// use brave_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?
    ///     .with_timeout(Some(Duration::from_secs(2)));
    /// assert_eq!(client.default_timeout, Some(Duration::from_secs(2)));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Option<Duration>) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// GET and decode the success body as JSON.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let (req_id, bytes) = self.request_internal(Method::GET, path, opts).await?;
        serde_json::from_slice::<T>(&bytes).map_err(|e| {
            let snippet = snip_body(&bytes);
            tracing::warn!(
                req_id=%req_id,
                serde_line=%e.line(),
                serde_col=%e.column(),
                serde_err=%e.to_string(),
                body_snippet=%snippet,
                "http.response.decode_error"
            );
            HttpError::Decode(e.to_string(), snippet)
        })
    }

    /// GET and return the raw success body without decoding it.
    pub async fn get_bytes(&self, path: &str, opts: RequestOpts) -> Result<Vec<u8>, HttpError> {
        let (_, bytes) = self.request_internal(Method::GET, path, opts).await?;
        Ok(bytes)
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn request_internal(
        &self,
        method: Method,
        path: &str,
        opts: RequestOpts,
    ) -> Result<(String, Vec<u8>), HttpError> {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;

        // ----- Build request -----
        let mut rb = self.inner.request(method.clone(), url.clone());

        let timeout = opts.timeout.or(self.default_timeout);
        if let Some(t) = timeout {
            rb = rb.timeout(t);
        }

        if let Some(q) = &opts.query {
            let pairs: Vec<(&str, &str)> = q.iter().collect();
            rb = rb.query(&pairs);
        }

        if let Some(hdrs) = &opts.headers {
            rb = rb.headers(hdrs.clone());
        }

        if let Some(Auth::Header { name, value }) = &opts.auth {
            rb = rb.header(name, value);
        }

        // ----- Safe request logging (pre-send) -----
        let auth_kind = opts.auth.as_ref().map(Auth::kind).unwrap_or("none");
        let redacted_q = opts
            .query
            .as_ref()
            .map(QueryParams::redacted)
            .unwrap_or_default();
        let req_id = uuid::Uuid::new_v4().simple().to_string();

        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            query=?redacted_q,
            timeout_ms=?timeout.map(|t| t.as_millis() as u64),
            auth_kind,
            "http.request.start"
        );

        if raw_enabled() {
            let mut merged = HeaderMap::new();
            if let Some(h) = &opts.headers {
                for (k, v) in h.iter() {
                    merged.append(k, v.clone());
                }
            }
            if let Some(Auth::Header { name, value }) = &opts.auth {
                merged.append(name, value.clone());
            }
            let mut shown = url.clone();
            if let Some(q) = &opts.query {
                shown.query_pairs_mut().extend_pairs(q.iter());
            }
            let curl = make_curl(&method, &shown, &merged);
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = std::time::Instant::now();
        let resp = rb.send().await.map_err(|err| {
            let message = err.to_string();
            tracing::warn!(
                req_id=%req_id,
                is_timeout=err.is_timeout(),
                is_connect=err.is_connect(),
                message=%message,
                "http.network_error.send"
            );
            HttpError::Network(message)
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|err| {
            let message = err.to_string();
            tracing::warn!(req_id=%req_id, message=%message, "http.network_error.body");
            HttpError::Network(message)
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        // Response header diagnostics
        let x_request_id = headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        let limit = headers
            .get("x-ratelimit-limit")
            .and_then(|v| v.to_str().ok());
        let remain = headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok());
        let reset = headers
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok());

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            x_request_id=%x_request_id,
            rate_limit.limit=?limit,
            rate_limit.remaining=?remain,
            rate_limit.reset=?reset,
            "http.response.headers"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&headers);
            let truncated = bytes.len() > RAW_MAX_BODY;
            let text = String::from_utf8_lossy(&bytes[..bytes.len().min(RAW_MAX_BODY)]);
            tracing::info!(
                target:"http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?hdrs,
                body=%text,
                truncated
            );
        }

        let snippet = snip_body(&bytes);
        tracing::trace!(
            req_id=%req_id,
            body_snippet=%snippet,
            "http.response.body_snippet"
        );

        if status.is_success() {
            return Ok((req_id, bytes.to_vec()));
        }

        let message = format!(
            "API request failed: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        )
        .trim_end()
        .to_string();
        tracing::warn!(
            req_id=%req_id,
            %status,
            message=%message,
            x_request_id=%x_request_id,
            body_snippet=%snippet,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

// ==============================
// Helpers
// ==============================

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        let mut cut = 500;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_opt_skips_none() {
        let mut q = QueryParams::new();
        q.push("q", "x").push_opt::<u32>("count", None).push_opt("offset", Some(0));
        assert_eq!(q.keys().collect::<Vec<_>>(), vec!["q", "offset"]);
        assert_eq!(q.get("offset"), Some("0"));
    }

    #[test]
    fn redaction_hides_secret_params() {
        let q = QueryParams::new().with("q", "rust").with("key", "s3cr3t");
        let red = q.redacted();
        assert_eq!(red[0], ("q", "rust".to_string()));
        assert_eq!(red[1], ("key", "<redacted>".to_string()));
    }

    #[test]
    fn redact_url_masks_key() {
        let url = Url::parse("https://example.com/s?q=a&key=abc").unwrap();
        let shown = redact_url(&url);
        assert!(shown.contains("q=a"));
        assert!(!shown.contains("abc"));
    }

    #[test]
    fn curl_never_contains_token() {
        let mut h = HeaderMap::new();
        h.insert("x-subscription-token", HeaderValue::from_static("tok-123"));
        h.insert("accept", HeaderValue::from_static("application/json"));
        let url = Url::parse("https://example.com/s?q=a").unwrap();
        let curl = make_curl(&Method::GET, &url, &h);
        assert!(!curl.contains("tok-123"));
        assert!(curl.contains("accept: application/json"));
    }

    #[test]
    fn snip_body_respects_char_boundaries() {
        let body = "é".repeat(400);
        let snip = snip_body(body.as_bytes());
        assert!(snip.ends_with("..."));
        assert!(snip.len() <= 503);
    }

    #[test]
    fn base_gets_trailing_slash() {
        let c = HttpClient::new("http://localhost:8080/api").unwrap();
        assert_eq!(c.base().as_str(), "http://localhost:8080/api/");
        let joined = c.base().join("res/v1/web/search").unwrap();
        assert_eq!(joined.path(), "/api/res/v1/web/search");
    }

    #[test]
    fn invalid_base_is_url_error() {
        assert!(matches!(HttpClient::new("not a url"), Err(HttpError::Url(_))));
    }

    #[test]
    fn auth_header_rejects_control_chars() {
        assert!(matches!(
            Auth::header("x-subscription-token", "bad\nvalue"),
            Err(HttpError::Build(_))
        ));
    }
}
