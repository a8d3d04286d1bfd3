use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchOutput {
    pub query: String,
    pub results: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsSearchOutput {
    pub query: String,
    pub results: Vec<Value>,
    pub total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizerOutput {
    pub query: String,
    pub summary: String,
    pub sources: Vec<SourceRef>,
    pub follow_ups: Vec<String>,
}

/// The single event a block emits on success.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BlockEvent {
    Web(WebSearchOutput),
    News(NewsSearchOutput),
    Summarizer(SummarizerOutput),
}

impl From<WebSearchOutput> for BlockEvent {
    fn from(o: WebSearchOutput) -> Self {
        BlockEvent::Web(o)
    }
}

impl From<NewsSearchOutput> for BlockEvent {
    fn from(o: NewsSearchOutput) -> Self {
        BlockEvent::News(o)
    }
}

impl From<SummarizerOutput> for BlockEvent {
    fn from(o: SummarizerOutput) -> Self {
        BlockEvent::Summarizer(o)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outputs_use_host_field_names() {
        let news = BlockEvent::from(NewsSearchOutput {
            query: "q".into(),
            results: vec![],
            total_count: 3,
        });
        assert_eq!(
            serde_json::to_value(&news).unwrap(),
            json!({"query": "q", "results": [], "totalCount": 3})
        );

        let sum = BlockEvent::from(SummarizerOutput {
            query: "q".into(),
            summary: "s".into(),
            sources: vec![],
            follow_ups: vec!["f".into()],
        });
        let v = serde_json::to_value(&sum).unwrap();
        assert_eq!(v["followUps"], json!(["f"]));
        assert!(v.get("follow_ups").is_none());
    }
}
