//! Connectivity probe run whenever the installed configuration changes.
use serde::Serialize;

use brave_http::HttpError;

use crate::client::{ApiSettings, BraveApi};

pub const MISSING_KEY: &str = "API Key is required";
pub const CONNECT_FAILED: &str =
    "Failed to connect to Brave Search API. Check your internet connection and API key.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProbeStatus {
    Ready,
    Failed { reason: String },
}

impl ProbeStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ProbeStatus::Ready)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ProbeStatus::Ready => None,
            ProbeStatus::Failed { reason } => Some(reason),
        }
    }

    fn failed(reason: impl Into<String>) -> Self {
        ProbeStatus::Failed {
            reason: reason.into(),
        }
    }
}

/// Confirm the configured key works with one minimal search.
///
/// A blank key fails without any network traffic. Errors never escape; they
/// become a [`ProbeStatus::Failed`] with a host-readable reason.
pub async fn probe(settings: &ApiSettings) -> ProbeStatus {
    if !settings.has_api_key() {
        tracing::warn!(reason = MISSING_KEY, "probe.failed");
        return ProbeStatus::failed(MISSING_KEY);
    }

    let api = match BraveApi::new(settings) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!(error = %e, "probe.failed");
            return ProbeStatus::failed(format!("Invalid API configuration: {e}"));
        }
    };

    match api.ping().await {
        Ok(()) => {
            tracing::info!(base = api.base_url(), "probe.ready");
            ProbeStatus::Ready
        }
        Err(HttpError::Api { status, body, .. }) => {
            tracing::error!(status = status.as_u16(), body = %body, "probe.failed");
            ProbeStatus::failed(format!(
                "API authentication failed: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            ))
        }
        Err(e) => {
            tracing::error!(error = %e, "probe.failed");
            ProbeStatus::failed(CONNECT_FAILED)
        }
    }
}
