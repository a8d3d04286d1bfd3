use async_trait::async_trait;
use brave_http::QueryParams;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::block::{Block, BlockContext};
use crate::client::{Endpoint, SearchApi};
use crate::error::BlockError;
use crate::params::Freshness;
use crate::reshape;
use crate::schema::{
    self, COUNT, COUNTRY, FieldKind, FieldSpec, ItemShape, LANGUAGE, OutputField, QUERY,
};
use crate::types::NewsSearchOutput;

pub const ID: &str = "newsSearch";

pub const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        description: "The news search query to execute",
        ..QUERY
    },
    FieldSpec {
        description: "Number of news results to return (1-20, default: 10)",
        ..COUNT
    },
    FieldSpec {
        description: "Country code for localized news (e.g., 'us', 'gb', 'de')",
        ..COUNTRY
    },
    FieldSpec {
        description: "Language code for news search (e.g., 'en', 'es', 'fr')",
        ..LANGUAGE
    },
    FieldSpec {
        key: "spellcheck",
        name: "Enable Spellcheck",
        label: "Spellcheck",
        description: "Enable automatic spell correction for the query",
        kind: FieldKind::Boolean,
        required: false,
        sensitive: false,
    },
    FieldSpec {
        key: "freshness",
        name: "Freshness",
        label: "Freshness",
        description: "Filter results by recency (past day, week, month or year)",
        kind: FieldKind::Choice {
            options: Freshness::ALL,
        },
        required: false,
        sensitive: false,
    },
    FieldSpec {
        key: "offset",
        name: "Offset",
        label: "Offset",
        description: "Starting position for pagination (default: 0)",
        kind: FieldKind::Number {
            min: Some(0),
            max: None,
        },
        required: false,
        sensitive: false,
    },
];

const META_URL: &[OutputField] = &[
    OutputField::scalar("hostname", "string", false),
    OutputField::scalar("scheme", "string", false),
    OutputField::scalar("netloc", "string", false),
    OutputField::scalar("path", "string", false),
];

const THUMBNAIL: &[OutputField] = &[
    OutputField::scalar("src", "string", false),
    OutputField::scalar("original", "string", false),
];

const ARTICLE: &[OutputField] = &[
    OutputField::scalar("title", "string", true),
    OutputField::scalar("url", "string", true),
    OutputField::scalar("description", "string", true),
    OutputField::scalar("age", "string", false),
    OutputField::scalar("breaking", "boolean", false),
    OutputField::scalar("page_age", "string", false),
    OutputField::object("meta_url", META_URL),
    OutputField::object("thumbnail", THUMBNAIL),
    OutputField::scalar("language", "string", false),
    OutputField::scalar("family_friendly", "boolean", false),
];

pub const OUTPUT: &[OutputField] = &[
    OutputField::scalar("query", "string", true).describe("The search query used"),
    OutputField::array("results", ItemShape::object(ARTICLE), true)
        .describe("Array of news search results"),
    OutputField::scalar("totalCount", "number", false)
        .describe("Total number of matching articles reported by the provider"),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsSearchInput {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spellcheck: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freshness: Option<Freshness>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl NewsSearchInput {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

fn query_params(input: &NewsSearchInput) -> QueryParams {
    let mut params = QueryParams::new().with("q", &input.query);
    params
        .push_opt("count", input.count)
        .push_opt("country", input.country.as_deref())
        .push_opt("search_lang", input.language.as_deref())
        .push_opt("spellcheck", input.spellcheck.map(u8::from))
        .push_opt("freshness", input.freshness)
        .push_opt("offset", input.offset);
    params
}

/// Run a news search for an already-typed input.
pub async fn news_search(
    api: &dyn SearchApi,
    input: &NewsSearchInput,
) -> Result<NewsSearchOutput, BlockError> {
    let input = schema::checked(FIELDS, input)?;
    execute(api, input).await
}

async fn execute(api: &dyn SearchApi, input: NewsSearchInput) -> Result<NewsSearchOutput, BlockError> {
    let params = query_params(&input);
    tracing::info!(
        query = %input.query,
        params = ?params.keys().collect::<Vec<_>>(),
        "block.news_search.start"
    );

    let resp = api.request(Endpoint::NewsSearch, params).await?;
    let results = reshape::news_results(&resp);
    let total_count = reshape::total_count(&resp);

    tracing::info!(results = results.len(), total_count, "block.news_search.done");
    Ok(NewsSearchOutput {
        query: input.query,
        results,
        total_count,
    })
}

pub struct NewsSearch;

#[async_trait]
impl Block for NewsSearch {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "News Search"
    }

    fn description(&self) -> &'static str {
        "Search for news articles using Brave Search API"
    }

    fn input_schema(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn output_schema(&self) -> &'static [OutputField] {
        OUTPUT
    }

    async fn on_event(&self, ctx: BlockContext<'_>, input: &Value) -> Result<(), BlockError> {
        let input: NewsSearchInput = schema::parse_input(FIELDS, input)?;
        let output = execute(ctx.api, input).await?;
        ctx.sink.emit(output.into()).await
    }
}
