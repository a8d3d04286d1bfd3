//! Declarative input schemas and the single validation routine that reads them.
//!
//! Each block declares a `&'static [FieldSpec]` table. The same table is
//! rendered to the host as the block's configuration schema and consumed by
//! [`validate_input`], so field rules never drift between blocks.
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::BlockError;

pub const EMPTY_QUERY_MESSAGE: &str = "Search query is required and cannot be empty";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    /// The search query: required semantics come from [`validate_query`] and
    /// the accepted value is trimmed.
    #[serde(rename = "string")]
    Query,
    #[serde(rename = "string")]
    Text,
    /// Whole number with optional inclusive bounds.
    Number {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    Boolean,
    /// String restricted to a fixed set.
    #[serde(rename = "string")]
    Choice {
        #[serde(rename = "enum")]
        options: &'static [&'static str],
    },
}

/// One row of a block's constraint table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub key: &'static str,
    /// Display name shown by the host.
    pub name: &'static str,
    /// Subject used in validation messages ("Count must be ...").
    #[serde(skip)]
    pub label: &'static str,
    pub description: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub sensitive: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Declared shape of one field of an emitted event. Objects list their
/// `properties`; arrays describe their element in `items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutputField {
    pub key: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "is_blank")]
    pub description: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "has_no_fields")]
    pub properties: &'static [OutputField],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemShape>,
}

/// Element type of an array output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemShape {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "has_no_fields")]
    pub properties: &'static [OutputField],
}

impl OutputField {
    pub const fn scalar(key: &'static str, kind: &'static str, required: bool) -> Self {
        Self {
            key,
            kind,
            description: "",
            required,
            properties: &[],
            items: None,
        }
    }

    pub const fn object(key: &'static str, properties: &'static [OutputField]) -> Self {
        Self {
            properties,
            ..Self::scalar(key, "object", false)
        }
    }

    pub const fn array(key: &'static str, items: ItemShape, required: bool) -> Self {
        Self {
            items: Some(items),
            ..Self::scalar(key, "array", required)
        }
    }

    pub const fn describe(self, description: &'static str) -> Self {
        Self {
            description,
            ..self
        }
    }
}

impl ItemShape {
    pub const STRING: ItemShape = ItemShape {
        kind: "string",
        properties: &[],
    };

    pub const fn object(properties: &'static [OutputField]) -> Self {
        Self {
            kind: "object",
            properties,
        }
    }
}

fn is_blank(s: &&str) -> bool {
    s.is_empty()
}

fn has_no_fields(fields: &&[OutputField]) -> bool {
    fields.is_empty()
}

/// Reject a missing, non-string or blank query.
pub fn validate_query(query: Option<&Value>) -> Result<&str, BlockError> {
    match query {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.as_str()),
        _ => Err(BlockError::invalid("query", EMPTY_QUERY_MESSAGE)),
    }
}

/// Trim surrounding whitespace. Idempotent.
///
/// ```
/// use brave_search::schema::sanitize_query;
///
/// let once = sanitize_query("  rust async  ");
/// assert_eq!(once, "rust async");
/// assert_eq!(sanitize_query(&once), once);
/// ```
pub fn sanitize_query(query: &str) -> String {
    query.trim().to_string()
}

/// Check `input` against `schema` and return the accepted fields.
///
/// `null` values and blank optional strings count as absent and are dropped.
/// Keys the schema does not declare are ignored. Accepted numbers are
/// normalised to integers and the query is trimmed.
pub fn validate_input(schema: &[FieldSpec], input: &Value) -> Result<Map<String, Value>, BlockError> {
    let empty = Map::new();
    let fields = match input {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => {
            return Err(BlockError::invalid(
                "input",
                "Block input must be a JSON object",
            ));
        }
    };

    let ignored: Vec<&str> = fields
        .keys()
        .map(String::as_str)
        .filter(|k| !schema.iter().any(|s| s.key == *k))
        .collect();
    if !ignored.is_empty() {
        tracing::debug!(?ignored, "schema.ignored_fields");
    }

    let mut out = Map::new();
    for spec in schema {
        let raw = fields.get(spec.key).filter(|v| !v.is_null());
        if let Some(v) = check_field(spec, raw)? {
            out.insert(spec.key.to_string(), v);
        }
    }
    Ok(out)
}

fn check_field(spec: &FieldSpec, raw: Option<&Value>) -> Result<Option<Value>, BlockError> {
    if let FieldKind::Query = spec.kind {
        let q = validate_query(raw)?;
        return Ok(Some(Value::String(sanitize_query(q))));
    }

    let Some(value) = raw else {
        return if spec.required {
            Err(BlockError::invalid(
                spec.key,
                format!("{} is required", spec.label),
            ))
        } else {
            Ok(None)
        };
    };

    match spec.kind {
        FieldKind::Query | FieldKind::Text => match value {
            Value::String(s) if s.trim().is_empty() && !spec.required => Ok(None),
            Value::String(s) if s.trim().is_empty() => Err(BlockError::invalid(
                spec.key,
                format!("{} is required and cannot be empty", spec.label),
            )),
            Value::String(s) => Ok(Some(Value::String(s.clone()))),
            _ => Err(BlockError::invalid(
                spec.key,
                format!("{} must be a string", spec.label),
            )),
        },
        FieldKind::Choice { options } => match value {
            Value::String(s) if s.is_empty() && !spec.required => Ok(None),
            Value::String(s) if options.contains(&s.as_str()) => Ok(Some(value.clone())),
            _ => Err(BlockError::invalid(
                spec.key,
                format!("{} must be one of: {}", spec.label, options.join(", ")),
            )),
        },
        FieldKind::Boolean => match value {
            Value::Bool(_) => Ok(Some(value.clone())),
            _ => Err(BlockError::invalid(
                spec.key,
                format!("{} must be true or false", spec.label),
            )),
        },
        FieldKind::Number { min, max } => {
            let not_whole =
                || BlockError::invalid(spec.key, format!("{} must be a whole number", spec.label));
            // Range first, so 25.5 or 1e30 report the bounds.
            let f = value.as_f64().ok_or_else(not_whole)?;
            let below = min.is_some_and(|m| f < m as f64);
            let above = max.is_some_and(|m| f > m as f64);
            if below || above {
                return Err(BlockError::invalid(spec.key, range_message(spec.label, min, max)));
            }
            let n = as_whole_number(value).ok_or_else(not_whole)?;
            Ok(Some(Value::from(n)))
        }
    }
}

fn as_whole_number(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        _ => None,
    }
}

fn range_message(label: &str, min: Option<i64>, max: Option<i64>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) => format!("{label} must be between {lo} and {hi}"),
        (Some(0), None) => format!("{label} must be a non-negative number"),
        (Some(lo), None) => format!("{label} must be at least {lo}"),
        (None, Some(hi)) => format!("{label} must be at most {hi}"),
        (None, None) => format!("{label} is out of range"),
    }
}

/// Validate raw host input and deserialize it into a typed block input.
pub fn parse_input<T: DeserializeOwned>(schema: &[FieldSpec], input: &Value) -> Result<T, BlockError> {
    let accepted = validate_input(schema, input)?;
    serde_json::from_value(Value::Object(accepted))
        .map_err(|e| BlockError::invalid("input", e.to_string()))
}

/// Run an already-typed input through the same table, so library callers get
/// identical checks and the trimmed query.
pub fn checked<T: Serialize + DeserializeOwned>(schema: &[FieldSpec], input: &T) -> Result<T, BlockError> {
    let raw = serde_json::to_value(input).map_err(|e| BlockError::invalid("input", e.to_string()))?;
    parse_input(schema, &raw)
}

// Shared rows; each block picks the ones it accepts.

pub(crate) const QUERY: FieldSpec = FieldSpec {
    key: "query",
    name: "Search Query",
    label: "Search query",
    description: "The search query to execute",
    kind: FieldKind::Query,
    required: true,
    sensitive: false,
};

pub(crate) const COUNT: FieldSpec = FieldSpec {
    key: "count",
    name: "Result Count",
    label: "Count",
    description: "Number of results to return (1-20, default: 10)",
    kind: FieldKind::Number {
        min: Some(1),
        max: Some(20),
    },
    required: false,
    sensitive: false,
};

pub(crate) const COUNTRY: FieldSpec = FieldSpec {
    key: "country",
    name: "Country",
    label: "Country",
    description: "Country code for localized results (e.g., 'us', 'gb', 'de')",
    kind: FieldKind::Text,
    required: false,
    sensitive: false,
};

pub(crate) const LANGUAGE: FieldSpec = FieldSpec {
    key: "language",
    name: "Search Language",
    label: "Search language",
    description: "Language code for search (e.g., 'en', 'es', 'fr')",
    kind: FieldKind::Text,
    required: false,
    sensitive: false,
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TABLE: &[FieldSpec] = &[
        QUERY,
        COUNT,
        COUNTRY,
        FieldSpec {
            key: "offset",
            name: "Offset",
            label: "Offset",
            description: "",
            kind: FieldKind::Number {
                min: Some(0),
                max: None,
            },
            required: false,
            sensitive: false,
        },
        FieldSpec {
            key: "mode",
            name: "Mode",
            label: "Mode",
            description: "",
            kind: FieldKind::Choice {
                options: &["a", "b"],
            },
            required: false,
            sensitive: false,
        },
        FieldSpec {
            key: "flag",
            name: "Flag",
            label: "Flag",
            description: "",
            kind: FieldKind::Boolean,
            required: false,
            sensitive: false,
        },
    ];

    fn field_of(err: BlockError) -> (String, String) {
        match err {
            BlockError::InvalidInput { field, message } => (field, message),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn blank_queries_are_rejected() {
        for input in [
            json!({}),
            json!({"query": ""}),
            json!({"query": "   \t\n"}),
            json!({"query": 42}),
            json!({"query": null}),
            Value::Null,
        ] {
            let (field, msg) = field_of(validate_input(TABLE, &input).unwrap_err());
            assert_eq!(field, "query");
            assert_eq!(msg, EMPTY_QUERY_MESSAGE);
        }
    }

    #[test]
    fn query_is_trimmed() {
        let out = validate_input(TABLE, &json!({"query": "  hello world "})).unwrap();
        assert_eq!(out["query"], json!("hello world"));
    }

    #[test]
    fn sanitize_is_idempotent() {
        for q in ["a", "  a", "a  ", " \t a b \n", "no-trim"] {
            let once = sanitize_query(q);
            assert_eq!(sanitize_query(&once), once);
        }
    }

    #[test]
    fn count_bounds_are_inclusive() {
        for n in 1..=20 {
            let out = validate_input(TABLE, &json!({"query": "q", "count": n})).unwrap();
            assert_eq!(out["count"], json!(n));
        }
        for n in [0, 21, -1, 100] {
            let (field, msg) =
                field_of(validate_input(TABLE, &json!({"query": "q", "count": n})).unwrap_err());
            assert_eq!(field, "count");
            assert_eq!(msg, "Count must be between 1 and 20");
        }
    }

    #[test]
    fn count_must_be_whole() {
        let out = validate_input(TABLE, &json!({"query": "q", "count": 5.0})).unwrap();
        assert_eq!(out["count"], json!(5));
        let (_, msg) =
            field_of(validate_input(TABLE, &json!({"query": "q", "count": 2.5})).unwrap_err());
        assert_eq!(msg, "Count must be a whole number");
        assert!(validate_input(TABLE, &json!({"query": "q", "count": "5"})).is_err());
    }

    #[test]
    fn out_of_range_fractions_name_the_range() {
        for n in [json!(25.5), json!(1e30), json!(0.5), json!(-3.25)] {
            let (field, msg) =
                field_of(validate_input(TABLE, &json!({"query": "q", "count": n})).unwrap_err());
            assert_eq!(field, "count");
            assert_eq!(msg, "Count must be between 1 and 20");
        }
        let (_, msg) =
            field_of(validate_input(TABLE, &json!({"query": "q", "offset": -0.5})).unwrap_err());
        assert_eq!(msg, "Offset must be a non-negative number");
    }

    #[test]
    fn offset_must_be_non_negative() {
        let (field, msg) =
            field_of(validate_input(TABLE, &json!({"query": "q", "offset": -1})).unwrap_err());
        assert_eq!(field, "offset");
        assert_eq!(msg, "Offset must be a non-negative number");
        let out = validate_input(TABLE, &json!({"query": "q", "offset": 0})).unwrap();
        assert_eq!(out["offset"], json!(0));
    }

    #[test]
    fn absent_values_are_dropped() {
        let out = validate_input(
            TABLE,
            &json!({"query": "q", "country": "", "mode": null, "count": null, "extra": 1}),
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert!(out.contains_key("query"));
    }

    #[test]
    fn choices_and_booleans_are_typed() {
        let out = validate_input(TABLE, &json!({"query": "q", "mode": "b", "flag": false})).unwrap();
        assert_eq!(out["mode"], json!("b"));
        assert_eq!(out["flag"], json!(false));

        let (_, msg) =
            field_of(validate_input(TABLE, &json!({"query": "q", "mode": "c"})).unwrap_err());
        assert_eq!(msg, "Mode must be one of: a, b");
        let (_, msg) =
            field_of(validate_input(TABLE, &json!({"query": "q", "flag": "yes"})).unwrap_err());
        assert_eq!(msg, "Flag must be true or false");
    }

    #[test]
    fn non_object_input_is_rejected() {
        let (field, _) = field_of(validate_input(TABLE, &json!(["query"])).unwrap_err());
        assert_eq!(field, "input");
    }

    #[test]
    fn schema_serializes_for_the_host() {
        let rendered = serde_json::to_value(COUNT).unwrap();
        assert_eq!(rendered["key"], json!("count"));
        assert_eq!(rendered["type"], json!("number"));
        assert_eq!(rendered["min"], json!(1));
        assert_eq!(rendered["max"], json!(20));
        assert!(rendered.get("label").is_none());
        assert!(rendered.get("sensitive").is_none());

        let rendered = serde_json::to_value(QUERY).unwrap();
        assert_eq!(rendered["type"], json!("string"));
        assert_eq!(rendered["required"], json!(true));

        const ITEM: &[OutputField] = &[
            OutputField::scalar("title", "string", true),
            OutputField::object("meta", &[OutputField::scalar("host", "string", false)]),
        ];
        let field = OutputField::array("results", ItemShape::object(ITEM), true).describe("Hits");
        assert_eq!(
            serde_json::to_value(field).unwrap(),
            json!({
                "key": "results",
                "type": "array",
                "description": "Hits",
                "required": true,
                "items": {
                    "type": "object",
                    "properties": [
                        {"key": "title", "type": "string", "required": true},
                        {
                            "key": "meta",
                            "type": "object",
                            "required": false,
                            "properties": [{"key": "host", "type": "string", "required": false}],
                        },
                    ],
                },
            })
        );
        assert_eq!(
            serde_json::to_value(OutputField::array("tags", ItemShape::STRING, false)).unwrap()["items"],
            json!({"type": "string"})
        );
    }
}
