use async_trait::async_trait;
use brave_http::QueryParams;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::block::{Block, BlockContext};
use crate::client::{Endpoint, SearchApi};
use crate::error::BlockError;
use crate::params::{SafeSearch, Units};
use crate::reshape;
use crate::schema::{
    self, COUNT, COUNTRY, FieldKind, FieldSpec, ItemShape, LANGUAGE, OutputField, QUERY,
};
use crate::types::WebSearchOutput;

pub const ID: &str = "webSearch";

pub const FIELDS: &[FieldSpec] = &[
    QUERY,
    COUNT,
    COUNTRY,
    LANGUAGE,
    FieldSpec {
        key: "safesearch",
        name: "Safe Search",
        label: "Safe search",
        description: "Safe search setting",
        kind: FieldKind::Choice {
            options: SafeSearch::ALL,
        },
        required: false,
        sensitive: false,
    },
    FieldSpec {
        key: "units",
        name: "Units",
        label: "Units",
        description: "Unit system for measurements",
        kind: FieldKind::Choice {
            options: Units::ALL,
        },
        required: false,
        sensitive: false,
    },
];

const META_URL: &[OutputField] = &[
    OutputField::scalar("hostname", "string", false),
    OutputField::scalar("netloc", "string", false),
    OutputField::scalar("path", "string", false),
    OutputField::scalar("scheme", "string", false),
    OutputField::scalar("favicon", "string", false),
];

const PROFILE: &[OutputField] = &[
    OutputField::scalar("name", "string", false),
    OutputField::scalar("long_name", "string", false),
    OutputField::scalar("url", "string", false),
    OutputField::scalar("img", "string", false),
];

const THUMBNAIL: &[OutputField] = &[
    OutputField::scalar("src", "string", false),
    OutputField::scalar("original", "string", false),
    OutputField::scalar("logo", "boolean", false),
];

const RESULT: &[OutputField] = &[
    OutputField::scalar("title", "string", true),
    OutputField::scalar("url", "string", true),
    OutputField::scalar("description", "string", true),
    OutputField::scalar("type", "string", false),
    OutputField::scalar("subtype", "string", false),
    OutputField::scalar("family_friendly", "boolean", false),
    OutputField::scalar("language", "string", false),
    OutputField::object("meta_url", META_URL),
    OutputField::object("profile", PROFILE),
    OutputField::array("extra_snippets", ItemShape::STRING, false),
    OutputField::object("thumbnail", THUMBNAIL),
    OutputField::scalar("age", "string", false),
    OutputField::scalar("page_age", "string", false),
    OutputField::scalar("is_live", "boolean", false),
];

pub const OUTPUT: &[OutputField] = &[
    OutputField::scalar("query", "string", true).describe("The search query used"),
    OutputField::array("results", ItemShape::object(RESULT), true)
        .describe("Array of web search results"),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebSearchInput {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safesearch: Option<SafeSearch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<Units>,
}

impl WebSearchInput {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

fn query_params(input: &WebSearchInput) -> QueryParams {
    let mut params = QueryParams::new().with("q", &input.query);
    params
        .push_opt("count", input.count)
        .push_opt("country", input.country.as_deref())
        .push_opt("search_lang", input.language.as_deref())
        .push_opt("safesearch", input.safesearch)
        .push_opt("units", input.units);
    params
}

/// Run a web search for an already-typed input.
///
/// The input goes through the same checks as host-supplied JSON, so an empty
/// query fails here without touching the network.
pub async fn web_search(
    api: &dyn SearchApi,
    input: &WebSearchInput,
) -> Result<WebSearchOutput, BlockError> {
    let input = schema::checked(FIELDS, input)?;
    execute(api, input).await
}

async fn execute(api: &dyn SearchApi, input: WebSearchInput) -> Result<WebSearchOutput, BlockError> {
    let params = query_params(&input);
    tracing::info!(
        query = %input.query,
        params = ?params.keys().collect::<Vec<_>>(),
        "block.web_search.start"
    );

    let resp = api.request(Endpoint::WebSearch, params).await?;
    let results = reshape::web_results(&resp);

    tracing::info!(results = results.len(), "block.web_search.done");
    Ok(WebSearchOutput {
        query: input.query,
        results,
    })
}

pub struct WebSearch;

#[async_trait]
impl Block for WebSearch {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "Web Search"
    }

    fn description(&self) -> &'static str {
        "Search the web using Brave Search API"
    }

    fn input_schema(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn output_schema(&self) -> &'static [OutputField] {
        OUTPUT
    }

    async fn on_event(&self, ctx: BlockContext<'_>, input: &Value) -> Result<(), BlockError> {
        let input: WebSearchInput = schema::parse_input(FIELDS, input)?;
        let output = execute(ctx.api, input).await?;
        ctx.sink.emit(output.into()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::CollectingSink;
    use crate::test_support::FakeApi;
    use crate::types::BlockEvent;
    use serde_json::json;
    use tracing_test::traced_test;

    #[test]
    fn only_set_fields_become_params() {
        let p = query_params(&WebSearchInput::new("rust"));
        assert_eq!(p.keys().collect::<Vec<_>>(), vec!["q"]);

        let p = query_params(&WebSearchInput {
            query: "rust".into(),
            count: Some(3),
            country: Some("de".into()),
            language: Some("en".into()),
            safesearch: Some(SafeSearch::Strict),
            units: Some(Units::Metric),
        });
        assert_eq!(p.get("count"), Some("3"));
        assert_eq!(p.get("country"), Some("de"));
        assert_eq!(p.get("search_lang"), Some("en"));
        assert_eq!(p.get("safesearch"), Some("strict"));
        assert_eq!(p.get("units"), Some("metric"));
        assert!(!p.contains("language"));
    }

    #[test]
    fn output_schema_describes_result_items() {
        let rendered = serde_json::to_value(WebSearch.output_schema()).unwrap();
        let results = &rendered[1];
        assert_eq!(results["type"], json!("array"));
        let props = results["items"]["properties"].as_array().unwrap();
        let meta_url = props.iter().find(|p| p["key"] == json!("meta_url")).unwrap();
        assert_eq!(meta_url["type"], json!("object"));
        assert_eq!(meta_url["properties"].as_array().unwrap().len(), 5);
        let snippets = props
            .iter()
            .find(|p| p["key"] == json!("extra_snippets"))
            .unwrap();
        assert_eq!(snippets["items"], json!({"type": "string"}));
    }

    #[tokio::test]
    #[traced_test]
    async fn emits_results_and_trimmed_query() {
        let api = FakeApi::replying([Ok(json!({"web": {"results": [{"title": "t"}]}}))]);
        let sink = CollectingSink::new();
        let ctx = BlockContext {
            api: &api,
            sink: &sink,
        };

        WebSearch
            .on_event(ctx, &json!({"query": "  rust  ", "country": ""}))
            .await
            .unwrap();

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Endpoint::WebSearch);
        assert_eq!(calls[0].1.get("q"), Some("rust"));
        assert!(!calls[0].1.contains("country"));

        assert_eq!(
            sink.events(),
            vec![BlockEvent::Web(WebSearchOutput {
                query: "rust".into(),
                results: vec![json!({"title": "t"})],
            })]
        );
        assert!(logs_contain("block.web_search.start"));
    }

    #[tokio::test]
    async fn missing_web_key_yields_empty_results() {
        let api = FakeApi::replying([Ok(json!({"type": "search"}))]);
        let out = web_search(&api, &WebSearchInput::new("q")).await.unwrap();
        assert!(out.results.is_empty());
    }

    #[tokio::test]
    async fn invalid_input_never_calls_the_api() {
        let api = FakeApi::default();
        let sink = CollectingSink::new();
        let ctx = BlockContext {
            api: &api,
            sink: &sink,
        };

        for input in [
            json!({"query": "   "}),
            json!({"query": "q", "count": 21}),
            json!({"query": "q", "safesearch": "lenient"}),
        ] {
            assert!(matches!(
                WebSearch.on_event(ctx, &input).await,
                Err(BlockError::InvalidInput { .. })
            ));
        }
        let err = web_search(&api, &WebSearchInput::new("")).await.unwrap_err();
        assert_eq!(err.to_string(), "Search query is required and cannot be empty");

        assert_eq!(api.call_count(), 0);
        assert!(sink.is_empty());
    }
}
