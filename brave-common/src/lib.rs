//! Shared constants and utilities for the Brave Search workspace.
//!
//! This crate holds the provider endpoint layout and the observability
//! helpers used by every other crate. It stays dependency-light so the HTTP,
//! config and block crates can all depend on it.
//!
//! # Overview
//!
//! - Provider endpoint constants ([`DEFAULT_API_BASE`], [`WEB_SEARCH_PATH`], ...)
//! - [`observability`]: Centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use brave_common::{DEFAULT_API_BASE, WEB_SEARCH_PATH};
//!
//! let url = format!("{}/{}", DEFAULT_API_BASE, WEB_SEARCH_PATH);
//! assert_eq!(url, "https://api.search.brave.com/res/v1/web/search");
//! ```

pub mod observability;

/// Production base URL of the Brave Search API.
pub const DEFAULT_API_BASE: &str = "https://api.search.brave.com";

/// Web search endpoint, relative to the base URL.
pub const WEB_SEARCH_PATH: &str = "res/v1/web/search";
/// News search endpoint, relative to the base URL.
pub const NEWS_SEARCH_PATH: &str = "res/v1/news/search";
/// Summarizer endpoint; exchanges a `summarizer.key` for summary text.
pub const SUMMARIZER_PATH: &str = "res/v1/summarizer/search";

/// Header carrying the subscription token (API key).
pub const SUBSCRIPTION_TOKEN_HEADER: &str = "x-subscription-token";
