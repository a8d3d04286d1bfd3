//! Mapping from loosely-typed provider JSON to block outputs.
//!
//! Responses are read only at the keys used here; anything missing or of the
//! wrong shape falls back to an empty default.
use serde_json::Value;

use crate::types::SourceRef;

pub const MAX_SOURCES: usize = 5;

fn array_at(resp: &Value, pointer: &str) -> Vec<Value> {
    resp.pointer(pointer)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// `web.results`, or empty.
pub fn web_results(resp: &Value) -> Vec<Value> {
    array_at(resp, "/web/results")
}

/// Top-level `results`, or empty.
pub fn news_results(resp: &Value) -> Vec<Value> {
    array_at(resp, "/results")
}

/// `totalCount`, or 0.
pub fn total_count(resp: &Value) -> u64 {
    resp.get("totalCount").and_then(Value::as_u64).unwrap_or(0)
}

/// The summarizer reference token from a web search, when the plan issued one.
pub fn summarizer_key(resp: &Value) -> Option<String> {
    resp.pointer("/summarizer/key")
        .and_then(Value::as_str)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

/// Concatenate `summary[].data` in order.
pub fn summary_text(resp: &Value) -> String {
    let Some(parts) = resp.get("summary").and_then(Value::as_array) else {
        return String::new();
    };
    parts
        .iter()
        .filter_map(|p| p.get("data"))
        .filter(|d| !d.is_null())
        .map(|d| match d {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

/// First [`MAX_SOURCES`] web results, cut down to title and url.
pub fn sources(resp: &Value) -> Vec<SourceRef> {
    let Some(results) = resp.pointer("/web/results").and_then(Value::as_array) else {
        return Vec::new();
    };
    results
        .iter()
        .take(MAX_SOURCES)
        .map(|r| SourceRef {
            title: str_field(r, "title"),
            url: str_field(r, "url"),
        })
        .collect()
}

/// `followups`, keeping string entries only.
pub fn followups(resp: &Value) -> Vec<String> {
    resp.get("followups")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn str_field(v: &Value, key: &str) -> String {
    v.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
