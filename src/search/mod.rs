//! Search execution against the document index
//!
//! The index itself is an external capability ([`SearchIndex`]). This module
//! shapes the composed query into an [`IndexRequest`], submits it, and maps
//! raw hits into client-facing [`ResponseSummary`] values.

mod executor;
mod summary;

pub use executor::{SearchExecutor, SearchPage, ORDER_BY_SCORE};
pub use summary::{normalize, normalize_all, DocumentFields, ResponseSummary};

use crate::query::{EnrichedQuery, SearchType};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("Search index is misconfigured: {0}")]
    Configuration(String),

    #[error("Not authorized to query the index: {0}")]
    Unauthorized(String),

    #[error("Index rejected the request: {0}")]
    InvalidRequest(String),

    #[error("Search index unreachable: {0}")]
    Transport(String),
}

/// How terms in the search text combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// A document matches if any term matches
    Any,
}

/// Query parser used by the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// Full syntax: boolean operators and quoted phrases
    Full,
}

/// Request in the index's shape
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRequest {
    pub search_text: String,
    pub search_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    pub order_by: Vec<String>,
    pub skip: u64,
    pub size: u32,
    pub include_total_count: bool,
    pub search_mode: SearchMode,
    pub query_type: QueryType,
    pub search_type: SearchType,
}

/// One page of raw hits in index relevance order
///
/// Index clients translate their wire format into this shape; unknown keys
/// are rejected so a foreign layout fails loudly instead of normalizing to
/// empty summaries.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IndexResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub hits: Vec<SearchHit>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// A raw record returned by the index. Fields may be absent or null,
/// including null entries inside `captions` and `highlights`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchHit {
    #[serde(default, deserialize_with = "null_as_default")]
    pub document: Map<String, Value>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "strings_skipping_nulls")]
    pub captions: Vec<String>,
    #[serde(default, deserialize_with = "highlights_skipping_nulls")]
    pub highlights: BTreeMap<String, Vec<String>>,
}

impl IndexRequest {
    /// Request for `query` matched against `search_fields`, ordered by
    /// relevance with total-count tracking
    pub fn from_query(query: &EnrichedQuery, search_fields: &[String]) -> Self {
        Self {
            search_text: query.expression.clone(),
            search_fields: search_fields.to_vec(),
            filter: query.filter_expression(),
            order_by: vec![ORDER_BY_SCORE.to_string()],
            skip: query.paging.skip(),
            size: query.paging.page_size(),
            include_total_count: true,
            search_mode: SearchMode::Any,
            query_type: QueryType::Full,
            search_type: query.search_type,
        }
    }
}

impl SearchHit {
    pub fn new(document: Map<String, Value>) -> Self {
        Self {
            document,
            ..Default::default()
        }
    }

    /// Field value as text. Absent keys and nulls are empty, scalars are
    /// rendered plainly, arrays and objects as compact JSON.
    pub fn field(&self, key: &str) -> String {
        match self.document.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => other.to_string(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn strings_skipping_nulls<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Option<String>>>::deserialize(deserializer)?;
    Ok(items.into_iter().flatten().flatten().collect())
}

fn highlights_skipping_nulls<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let fields = Option::<BTreeMap<String, Option<Vec<Option<String>>>>>::deserialize(deserializer)?;
    Ok(fields
        .unwrap_or_default()
        .into_iter()
        .map(|(field, fragments)| {
            let fragments: Vec<String> = fragments.into_iter().flatten().flatten().collect();
            (field, fragments)
        })
        .collect())
}

/// Document index capability
///
/// Implementations own connection pooling, retries and timeouts, and must
/// be safe to share across concurrent requests.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn search(&self, request: &IndexRequest) -> Result<IndexResponse, SearchError>;
}
