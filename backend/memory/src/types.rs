use greenlens_core::{LensError, LensResult};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Rejection reason for a missing or blank query.
pub const QUERY_REQUIRED: &str = "A single query string is required";

/// Key carrying a hit's distance in serialized output.
pub const SCORE_FIELD: &str = "similarity_score";

/// One row of the reference catalog.
///
/// Serializes flat: `{"text": ..., <metadata columns>...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub text: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl CatalogEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), metadata: Map::new() }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A catalog entry matched by a query, with its L2 distance (smaller is closer).
///
/// Serializes flat. The computed distance replaces any catalog column that is
/// also named `similarity_score`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub entry: CatalogEntry,
    pub similarity_score: f32,
    /// Catalog row the hit came from.
    pub row: usize,
}

impl Serialize for SearchHit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("text", &self.entry.text)?;
        for (key, value) in &self.entry.metadata {
            if key != "text" && key != SCORE_FIELD {
                map.serialize_entry(key, value)?;
            }
        }
        map.serialize_entry(SCORE_FIELD, &self.similarity_score)?;
        map.end()
    }
}

/// Body returned for a search: the query echoed back plus ranked matches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub matches: Vec<SearchHit>,
}

/// Incoming search parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub k: Option<usize>,
}

impl SearchRequest {
    /// Validate a loosely-typed JSON body such as `{"query": "solar", "k": 5}`.
    pub fn from_json(body: &Value) -> LensResult<Self> {
        let query = body
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| LensError::invalid(QUERY_REQUIRED))?;
        let query = validate_query(query)?.to_string();

        let k = match body.get("k") {
            None | Some(Value::Null) => None,
            Some(value) => {
                let k = value
                    .as_u64()
                    .ok_or_else(|| LensError::invalid("k must be a non-negative integer"))?;
                Some(usize::try_from(k).unwrap_or(usize::MAX))
            }
        };
        Ok(Self { query, k })
    }
}

/// A query must contain something other than whitespace.
pub fn validate_query(query: &str) -> LensResult<&str> {
    if query.trim().is_empty() {
        return Err(LensError::invalid(QUERY_REQUIRED));
    }
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hit_serializes_flat() {
        let hit = SearchHit {
            entry: CatalogEntry::new("solar panel kit").with_field("price", 120),
            similarity_score: 0.5,
            row: 3,
        };
        assert_eq!(
            serde_json::to_value(&hit).unwrap(),
            json!({"text": "solar panel kit", "price": 120, "similarity_score": 0.5})
        );
    }

    #[test]
    fn distance_replaces_catalog_score_column() {
        let hit = SearchHit {
            entry: CatalogEntry::new("solar panel kit").with_field(SCORE_FIELD, 7),
            similarity_score: 0.25,
            row: 0,
        };
        let body = serde_json::to_string(&hit).unwrap();
        assert_eq!(body.matches(SCORE_FIELD).count(), 1, "{body}");
        assert_eq!(
            serde_json::from_str::<Value>(&body).unwrap(),
            json!({"text": "solar panel kit", "similarity_score": 0.25})
        );
    }

    #[test]
    fn request_accepts_query_and_optional_k() {
        let req = SearchRequest::from_json(&json!({"query": "solar equipment"})).unwrap();
        assert_eq!(req, SearchRequest { query: "solar equipment".into(), k: None });

        let req = SearchRequest::from_json(&json!({"query": "wind", "k": 3})).unwrap();
        assert_eq!(req.k, Some(3));
    }

    #[test]
    fn request_rejects_missing_blank_or_non_string_query() {
        for body in [
            json!({}),
            json!({"query": ""}),
            json!({"query": "   "}),
            json!({"query": ["solar", "wind"]}),
            json!({"query": 42}),
        ] {
            let err = SearchRequest::from_json(&body).unwrap_err();
            assert!(err.is_client_error(), "{body}");
            assert!(err.to_string().contains(QUERY_REQUIRED));
        }
    }

    #[test]
    fn request_rejects_negative_k() {
        let err = SearchRequest::from_json(&json!({"query": "solar", "k": -1})).unwrap_err();
        assert!(err.is_client_error());
    }
}
