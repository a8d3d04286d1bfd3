//! Two-step summarized search.
//!
//! A web search with `summary=1` hands back an opaque summarizer key, which a
//! second request to the summarizer endpoint exchanges for the summary. The
//! key is only issued on plans that include the summarizer.
use async_trait::async_trait;
use brave_http::QueryParams;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::block::{Block, BlockContext};
use crate::client::{Endpoint, SearchApi};
use crate::error::BlockError;
use crate::reshape;
use crate::schema::{
    self, COUNT, COUNTRY, FieldKind, FieldSpec, ItemShape, LANGUAGE, OutputField, QUERY,
};
use crate::types::SummarizerOutput;

pub const ID: &str = "summarizerSearch";

pub const NO_KEY_MESSAGE: &str = "No summarizer key returned. This feature requires a Pro AI plan.";

pub const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        description: "The search query to execute and summarize",
        ..QUERY
    },
    FieldSpec {
        description: "Number of results to return for summarization (1-20, default: 10)",
        ..COUNT
    },
    COUNTRY,
    LANGUAGE,
    FieldSpec {
        key: "entity_info",
        name: "Include Entity Info",
        label: "Include entity info",
        description: "Include additional entity information in results",
        kind: FieldKind::Boolean,
        required: false,
        sensitive: false,
    },
];

const SOURCE: &[OutputField] = &[
    OutputField::scalar("title", "string", true),
    OutputField::scalar("url", "string", true),
];

pub const OUTPUT: &[OutputField] = &[
    OutputField::scalar("query", "string", true).describe("The search query used"),
    OutputField::scalar("summary", "string", true)
        .describe("AI-generated summary text from Brave Search summarizer"),
    OutputField::array("sources", ItemShape::object(SOURCE), false)
        .describe("Top source references used in the summary"),
    OutputField::array("followUps", ItemShape::STRING, false)
        .describe("Suggested follow-up questions"),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummarizerInput {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_info: Option<bool>,
}

impl SummarizerInput {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

fn search_params(input: &SummarizerInput) -> QueryParams {
    let mut params = QueryParams::new()
        .with("q", &input.query)
        .with("summary", 1);
    params
        .push_opt("count", input.count)
        .push_opt("country", input.country.as_deref())
        .push_opt("search_lang", input.language.as_deref());
    // Only the enabled flag is forwarded.
    if input.entity_info == Some(true) {
        params.push("entity_info", 1);
    }
    params
}

/// Run the summarizer chain for an already-typed input.
pub async fn summarizer_search(
    api: &dyn SearchApi,
    input: &SummarizerInput,
) -> Result<SummarizerOutput, BlockError> {
    let input = schema::checked(FIELDS, input)?;
    execute(api, input).await
}

async fn execute(api: &dyn SearchApi, input: SummarizerInput) -> Result<SummarizerOutput, BlockError> {
    let params = search_params(&input);
    tracing::info!(
        query = %input.query,
        params = ?params.keys().collect::<Vec<_>>(),
        "block.summarizer.search"
    );
    let search = api.request(Endpoint::WebSearch, params).await?;

    let Some(key) = reshape::summarizer_key(&search) else {
        tracing::warn!("block.summarizer.no_key");
        return Err(BlockError::FeatureUnavailable(NO_KEY_MESSAGE.to_string()));
    };

    tracing::info!("block.summarizer.fetch");
    let summary = api
        .request(Endpoint::Summarizer, QueryParams::new().with("key", key))
        .await?;

    let output = SummarizerOutput {
        query: input.query,
        summary: reshape::summary_text(&summary),
        sources: reshape::sources(&search),
        follow_ups: reshape::followups(&summary),
    };
    tracing::info!(
        summary_len = output.summary.len(),
        sources = output.sources.len(),
        follow_ups = output.follow_ups.len(),
        "block.summarizer.done"
    );
    Ok(output)
}

pub struct SummarizerSearch;

#[async_trait]
impl Block for SummarizerSearch {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "Summarizer Search"
    }

    fn description(&self) -> &'static str {
        "AI-powered search with content summarization (requires Pro AI plan)"
    }

    fn input_schema(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn output_schema(&self) -> &'static [OutputField] {
        OUTPUT
    }

    async fn on_event(&self, ctx: BlockContext<'_>, input: &Value) -> Result<(), BlockError> {
        let input: SummarizerInput = schema::parse_input(FIELDS, input)?;
        let output = execute(ctx.api, input).await?;
        ctx.sink.emit(output.into()).await
    }
}
