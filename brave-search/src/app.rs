//! The installable app: metadata, config schema, block registry and dispatch.
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;

use crate::block::{Block, BlockContext, EventSink};
use crate::blocks;
use crate::client::{ApiSettings, BraveApi, SearchApi};
use crate::error::BlockError;
use crate::probe::{self, ProbeStatus};
use crate::schema::{FieldKind, FieldSpec, OutputField};

pub const NAME: &str = "Brave Search";

pub const INSTALLATION_INSTRUCTIONS: &str = r#"
## Setup Instructions

1. **Get your API key**:
   - Go to [Brave Search API Dashboard](https://api-dashboard.search.brave.com)
   - Sign up for a free account or log in
   - Subscribe to a plan (Free plan available)
   - Copy your API key from the dashboard

2. **Configure the app**:
   - Paste your API key in the "API Key" field below
   - The app will validate your key during installation

## Features

- **Web Search**: General web search with standard results
- **Summarizer Search**: AI-powered search with content summarization
- **News Search**: News-specific search with filtering options

## Usage Notes

- All search operations require a valid API key
- Summarizer search requires a Pro AI plan
- Rate limits depend on your subscription level
"#;

pub const CONFIG_FIELDS: &[FieldSpec] = &[FieldSpec {
    key: "apiKey",
    name: "API Key",
    label: "API Key",
    description: "Your Brave Search API key (X-Subscription-Token)",
    kind: FieldKind::Text,
    required: true,
    sensitive: true,
}];

/// Host-facing description of one block.
#[derive(Debug, Clone, Serialize)]
pub struct BlockDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub inputs: &'static [FieldSpec],
    pub outputs: &'static [OutputField],
}

impl BlockDescriptor {
    pub fn of(block: &dyn Block) -> Self {
        Self {
            id: block.id(),
            name: block.name(),
            category: block.category(),
            description: block.description(),
            inputs: block.input_schema(),
            outputs: block.output_schema(),
        }
    }
}

pub struct BraveSearchApp {
    settings: ApiSettings,
    api: Arc<dyn SearchApi>,
    blocks: Vec<Box<dyn Block>>,
}

impl BraveSearchApp {
    /// App backed by the real provider client.
    ///
    /// ```
    /// use brave_search::{ApiSettings, BraveSearchApp};
    ///
    /// let app = BraveSearchApp::new(ApiSettings::new("token")).unwrap();
    /// assert!(app.block("newsSearch").is_some());
    /// ```
    pub fn new(settings: ApiSettings) -> Result<Self, BlockError> {
        let api = BraveApi::new(&settings)?;
        Ok(Self::with_api(settings, Arc::new(api)))
    }

    /// App backed by any [`SearchApi`], e.g. a test double.
    pub fn with_api(settings: ApiSettings, api: Arc<dyn SearchApi>) -> Self {
        Self {
            settings,
            api,
            blocks: blocks::all(),
        }
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    pub fn blocks(&self) -> impl Iterator<Item = &dyn Block> {
        self.blocks.iter().map(|b| b.as_ref())
    }

    pub fn block(&self, id: &str) -> Option<&dyn Block> {
        self.blocks().find(|b| b.id() == id)
    }

    pub fn describe(&self) -> Vec<BlockDescriptor> {
        self.blocks().map(BlockDescriptor::of).collect()
    }

    /// Run the connectivity probe for the installed settings.
    pub async fn sync(&self) -> ProbeStatus {
        probe::probe(&self.settings).await
    }

    /// Dispatch one invocation to `block_id`, emitting its event into `sink`.
    pub async fn invoke(
        &self,
        block_id: &str,
        input: &Value,
        sink: &dyn EventSink,
    ) -> Result<(), BlockError> {
        let block = self
            .block(block_id)
            .ok_or_else(|| BlockError::UnknownBlock(block_id.to_string()))?;

        let invocation_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("block", block_id, %invocation_id);
        let ctx = BlockContext {
            api: self.api.as_ref(),
            sink,
        };

        async move {
            let started = std::time::Instant::now();
            let result = block.on_event(ctx, input).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "block.invoke.ok"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "block.invoke.error"),
            }
            result
        }
        .instrument(span)
        .await
    }
}
