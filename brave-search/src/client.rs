//! Request client for the Brave Search API.
//!
//! [`SearchApi`] is the seam the blocks call through; [`BraveApi`] is the
//! production implementation on top of [`brave_http::HttpClient`]. Every call
//! is one GET with the subscription token in `X-Subscription-Token`, JSON and
//! gzip accept headers, and only the parameters the caller actually set.
use std::time::{Duration, Instant};

use async_trait::async_trait;
use brave_common::{
    DEFAULT_API_BASE, NEWS_SEARCH_PATH, SUBSCRIPTION_TOKEN_HEADER, SUMMARIZER_PATH,
    WEB_SEARCH_PATH,
};
use brave_http::{Auth, HttpClient, HttpError, QueryParams, RequestOpts};
use brave_http::header::{ACCEPT, ACCEPT_ENCODING, HeaderMap, HeaderValue};
use serde_json::Value;

const QUERY_LOG_MAX: usize = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    WebSearch,
    NewsSearch,
    Summarizer,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::WebSearch => WEB_SEARCH_PATH,
            Endpoint::NewsSearch => NEWS_SEARCH_PATH,
            Endpoint::Summarizer => SUMMARIZER_PATH,
        }
    }
}

/// One provider round-trip: GET `endpoint` with `params`, JSON body back.
#[async_trait]
pub trait SearchApi: Send + Sync {
    async fn request(&self, endpoint: Endpoint, params: QueryParams) -> Result<Value, HttpError>;
}

/// Installation-level settings shared by every invocation.
#[derive(Clone)]
pub struct ApiSettings {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl ApiSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl std::fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Production client for the Brave Search API.
#[derive(Clone)]
pub struct BraveApi {
    http: HttpClient,
    auth: Auth,
}

impl BraveApi {
    /// Build a client from installation settings.
    ///
    /// ```
    /// use brave_search::client::{ApiSettings, BraveApi};
    ///
    /// let api = BraveApi::new(&ApiSettings::new("token")).unwrap();
    /// assert_eq!(api.base_url(), "https://api.search.brave.com/");
    /// ```
    pub fn new(settings: &ApiSettings) -> Result<Self, HttpError> {
        let http = HttpClient::new(&settings.base_url)?.with_timeout(settings.timeout);
        let auth = Auth::header(SUBSCRIPTION_TOKEN_HEADER, &settings.api_key)?;
        Ok(Self { http, auth })
    }

    pub fn base_url(&self) -> &str {
        self.http.base().as_str()
    }

    fn opts(&self, params: QueryParams) -> RequestOpts {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        RequestOpts {
            auth: Some(self.auth.clone()),
            headers: Some(headers),
            query: Some(params),
            ..Default::default()
        }
    }

    /// Minimal authenticated search (`q=test&count=1`); the body is not parsed.
    pub async fn ping(&self) -> Result<(), HttpError> {
        let params = QueryParams::new().with("q", "test").with("count", 1);
        self.http
            .get_bytes(Endpoint::WebSearch.path(), self.opts(params))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl SearchApi for BraveApi {
    async fn request(&self, endpoint: Endpoint, params: QueryParams) -> Result<Value, HttpError> {
        let query_snippet = params.get("q").map(snippet).unwrap_or_default();
        let started = Instant::now();
        tracing::info!(
            target: "web.brave",
            endpoint = endpoint.path(),
            query = %query_snippet,
            "brave.request.start"
        );

        match self
            .http
            .get_json::<Value>(endpoint.path(), self.opts(params))
            .await
        {
            Ok(resp) => {
                tracing::info!(
                    target: "web.brave",
                    endpoint = endpoint.path(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "brave.request.success"
                );
                Ok(resp)
            }
            Err(e) => {
                tracing::warn!(
                    target: "web.brave",
                    endpoint = endpoint.path(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "brave.request.error"
                );
                Err(e)
            }
        }
    }
}

fn snippet(q: &str) -> String {
    match q.char_indices().nth(QUERY_LOG_MAX) {
        Some((idx, _)) => format!("{}…", &q[..idx]),
        None => q.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths() {
        assert_eq!(Endpoint::WebSearch.path(), "res/v1/web/search");
        assert_eq!(Endpoint::NewsSearch.path(), "res/v1/news/search");
        assert_eq!(Endpoint::Summarizer.path(), "res/v1/summarizer/search");
    }

    #[test]
    fn long_queries_are_snipped_for_logs() {
        let q = "ä".repeat(200);
        let s = snippet(&q);
        assert_eq!(s.chars().count(), QUERY_LOG_MAX + 1);
        assert_eq!(snippet("short"), "short");
    }

    #[test]
    fn settings_debug_hides_key() {
        let s = ApiSettings::new("abc123");
        assert!(!format!("{s:?}").contains("abc123"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let s = ApiSettings::new("k").with_base_url("::nope::");
        assert!(matches!(BraveApi::new(&s), Err(HttpError::Url(_))));
    }
}
