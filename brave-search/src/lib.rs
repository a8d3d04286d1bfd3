//! Brave Search blocks: web, news and summarized search as callable units.
//!
//! Each block validates its JSON input against a declarative field table,
//! issues one GET (two for the summarizer) through a [`SearchApi`], reshapes
//! the provider JSON and emits exactly one [`BlockEvent`].
//!
//! ```no_run
//! # async fn demo() -> Result<(), brave_search::BlockError> {
//! use brave_search::{ApiSettings, BraveApi, NewsSearchInput, news_search};
//!
//! let api = BraveApi::new(&ApiSettings::new("token"))?;
//! let news = news_search(&api, &NewsSearchInput::new("rust 2024")).await?;
//! println!("{} of {}", news.results.len(), news.total_count);
//! # Ok(()) }
//! ```
pub mod app;
pub mod block;
pub mod blocks;
pub mod client;
pub mod error;
pub mod params;
pub mod probe;
pub mod reshape;
pub mod schema;
pub mod types;

#[cfg(test)]
mod test_support;

pub use app::{BlockDescriptor, BraveSearchApp};
pub use block::{Block, BlockContext, CollectingSink, EventSink};
pub use blocks::{
    NewsSearchInput, SummarizerInput, WebSearchInput, news_search, summarizer_search, web_search,
};
pub use client::{ApiSettings, BraveApi, Endpoint, SearchApi};
pub use error::BlockError;
pub use params::{Freshness, SafeSearch, Units};
pub use probe::{ProbeStatus, probe};
pub use types::{BlockEvent, NewsSearchOutput, SourceRef, SummarizerOutput, WebSearchOutput};
