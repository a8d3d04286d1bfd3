//! The three search blocks. Each module owns its constraint table, typed
//! input, parameter mapping and a plain async entry point for library use.
pub mod news;
pub mod summarizer;
pub mod web;

pub use news::{NewsSearch, NewsSearchInput, news_search};
pub use summarizer::{SummarizerInput, SummarizerSearch, summarizer_search};
pub use web::{WebSearch, WebSearchInput, web_search};

use crate::block::Block;

/// Every block, in registration order.
pub fn all() -> Vec<Box<dyn Block>> {
    vec![
        Box::new(WebSearch),
        Box::new(SummarizerSearch),
        Box::new(NewsSearch),
    ]
}
