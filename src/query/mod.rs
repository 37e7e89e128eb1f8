//! Query requests and their composition into an enriched index query
//!
//! A [`QueryRequest`] arrives from the transport layer. After the variant set
//! is known, [`QueryComposer`] turns both into an [`EnrichedQuery`]: one
//! OR-expression over the quoted variants, the filter clauses, and the
//! clamped paging window.

mod composer;
mod date_range;
mod filter;
mod validator;

pub use composer::QueryComposer;
pub use date_range::{parse_date_filter, DateRange};
pub use filter::{any_of_clause, eq_clause, escape_literal, quote_phrase, range_clause};
pub use validator::RequestValidator;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Page size used when the caller supplies zero or a negative size
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page the index is asked for
pub const MAX_PAGE_SIZE: u32 = 100;

/// Retrieval strategy requested by the client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    Keyword,
    #[default]
    SemanticHybrid,
    Vector,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Keyword => "keyword",
            SearchType::SemanticHybrid => "semantic_hybrid",
            SearchType::Vector => "vector",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyword" => Ok(SearchType::Keyword),
            "semantic_hybrid" | "semantic" | "hybrid" => Ok(SearchType::SemanticHybrid),
            "vector" => Ok(SearchType::Vector),
            other => Err(format!(
                "unknown search type '{}', expected keyword, semantic_hybrid or vector",
                other
            )),
        }
    }
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE as i64
}

/// A client's name search request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Free-text name to search for
    #[serde(rename = "query", alias = "rawQuery")]
    pub raw_query: String,

    /// Application/county scope identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_id: Option<String>,

    #[serde(default)]
    pub search_type: SearchType,

    /// Record kind to restrict to (e.g. "I" or "B")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_restriction: Option<String>,

    /// Date field the date filter applies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_field: Option<String>,

    /// Relative date range phrase ("today", "last week", "last 30 days")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_filter: Option<String>,

    #[serde(default = "default_page")]
    pub page: i64,

    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl QueryRequest {
    pub fn new(raw_query: impl Into<String>) -> Self {
        Self {
            raw_query: raw_query.into(),
            scope_id: None,
            search_type: SearchType::default(),
            field_restriction: None,
            date_field: None,
            date_filter: None,
            page: default_page(),
            page_size: default_page_size(),
        }
    }

    pub fn with_scope(mut self, scope_id: impl Into<String>) -> Self {
        self.scope_id = Some(scope_id.into());
        self
    }

    pub fn with_search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    pub fn with_field_restriction(mut self, restriction: impl Into<String>) -> Self {
        self.field_restriction = Some(restriction.into());
        self
    }

    pub fn with_date_filter(
        mut self,
        date_field: Option<String>,
        date_filter: impl Into<String>,
    ) -> Self {
        self.date_field = date_field;
        self.date_filter = Some(date_filter.into());
        self
    }

    pub fn with_page(mut self, page: i64, page_size: i64) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    /// Query text with surrounding whitespace removed
    pub fn query_text(&self) -> &str {
        self.raw_query.trim()
    }
}

/// Effective paging window after clamping. Only built through
/// [`Paging::clamp`], so `page` is at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    page: u32,
    page_size: u32,
}

impl Paging {
    /// Page below 1 becomes 1. A size of zero or less becomes the default,
    /// anything above the maximum is capped.
    pub fn clamp(page: i64, page_size: i64) -> Self {
        let page = page.clamp(1, u32::MAX as i64) as u32;
        let page_size = if page_size <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size.min(MAX_PAGE_SIZE as i64) as u32
        };
        Self { page, page_size }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of records to skip before this page
    pub fn skip(&self) -> u64 {
        (self.page as u64).saturating_sub(1) * self.page_size as u64
    }
}

/// The composed query handed to the search executor
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedQuery {
    /// OR-composition of the quoted variants
    pub expression: String,
    /// Filter clauses, combined with AND by the executor
    pub filters: Vec<String>,
    pub paging: Paging,
    pub search_type: SearchType,
}

impl EnrichedQuery {
    /// Filter clauses joined into a single expression, `None` when unfiltered
    pub fn filter_expression(&self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.join(" and "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paging_clamps_low_values() {
        let paging = Paging::clamp(0, 0);
        assert_eq!(paging, Paging { page: 1, page_size: 10 });
        assert_eq!(paging.skip(), 0);

        let paging = Paging::clamp(-4, -1);
        assert_eq!(paging, Paging { page: 1, page_size: 10 });
    }

    #[test]
    fn test_paging_caps_page_size() {
        let paging = Paging::clamp(3, 500);
        assert_eq!(paging.page_size, MAX_PAGE_SIZE);
        assert_eq!(paging.skip(), 200);
    }

    #[test]
    fn test_paging_extremes_do_not_overflow() {
        let paging = Paging::clamp(i64::MIN, i64::MAX);
        assert_eq!(paging.page(), 1);
        assert_eq!(paging.page_size(), MAX_PAGE_SIZE);
        assert_eq!(paging.skip(), 0);

        let paging = Paging::clamp(i64::MAX, 100);
        assert_eq!(paging.page(), u32::MAX);
        assert_eq!(paging.skip(), (u32::MAX as u64 - 1) * 100);

        let zero = Paging { page: 0, page_size: 10 };
        assert_eq!(zero.skip(), 0);
    }

    #[test]
    fn test_paging_skip() {
        assert_eq!(Paging::clamp(2, 25).skip(), 25);
        assert_eq!(Paging::clamp(1, 100).skip(), 0);
    }

    #[test]
    fn test_request_defaults_from_json() {
        let request: QueryRequest = serde_json::from_str(r#"{"query": "jon"}"#).unwrap();
        assert_eq!(request.raw_query, "jon");
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, 10);
        assert_eq!(request.search_type, SearchType::SemanticHybrid);
        assert!(request.scope_id.is_none());
    }

    #[test]
    fn test_request_from_camel_case_json() {
        let request: QueryRequest = serde_json::from_str(
            r#"{"query": "jon", "scopeId": "12", "searchType": "keyword",
                "fieldRestriction": "I", "page": 2, "pageSize": 50}"#,
        )
        .unwrap();
        assert_eq!(request.scope_id.as_deref(), Some("12"));
        assert_eq!(request.search_type, SearchType::Keyword);
        assert_eq!(request.field_restriction.as_deref(), Some("I"));
        assert_eq!(request.page_size, 50);
    }

    #[test]
    fn test_search_type_parse() {
        assert_eq!("Keyword".parse::<SearchType>().unwrap(), SearchType::Keyword);
        assert_eq!(
            "semantic_hybrid".parse::<SearchType>().unwrap(),
            SearchType::SemanticHybrid
        );
        assert!("fuzzy".parse::<SearchType>().is_err());
    }

    #[test]
    fn test_filter_expression() {
        let mut query = EnrichedQuery {
            expression: "\"jon\"".to_string(),
            filters: vec![],
            paging: Paging::clamp(1, 10),
            search_type: SearchType::Keyword,
        };
        assert_eq!(query.filter_expression(), None);

        query.filters = vec!["a eq '1'".to_string(), "b eq '2'".to_string()];
        assert_eq!(query.filter_expression().unwrap(), "a eq '1' and b eq '2'");
    }
}
