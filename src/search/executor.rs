//! Turns an enriched query into an index request and submits it

use crate::config::{ConfigValidator, IndexConfig};
use crate::error::{NamesearchError, Result};
use crate::query::EnrichedQuery;
use crate::search::{IndexRequest, SearchError, SearchHit, SearchIndex};
use std::sync::Arc;

/// Relevance ordering, best first
pub const ORDER_BY_SCORE: &str = "search.score() desc";

/// Hits for one page plus the index-wide match count
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub hits: Vec<SearchHit>,
    pub total_count: u64,
}

/// Submits enriched queries to the search index
pub struct SearchExecutor {
    index: Arc<dyn SearchIndex>,
    search_fields: Vec<String>,
}

impl SearchExecutor {
    /// Fails with a configuration error when the field set is unusable
    pub fn new(index: Arc<dyn SearchIndex>, fields: &IndexConfig) -> Result<Self> {
        if fields.search_fields.is_empty() {
            return Err(NamesearchError::Configuration(
                "index.search_fields is empty".to_string(),
            ));
        }
        if let Some(bad) = fields
            .search_fields
            .iter()
            .find(|f| !ConfigValidator::is_field_name(f))
        {
            return Err(NamesearchError::Configuration(format!(
                "invalid search field '{}'",
                bad
            )));
        }

        Ok(Self {
            index,
            search_fields: fields.search_fields.clone(),
        })
    }

    /// The request submitted for `query`
    pub fn build_request(&self, query: &EnrichedQuery) -> IndexRequest {
        IndexRequest::from_query(query, &self.search_fields)
    }

    /// Run the query. A blank expression returns an empty page without
    /// contacting the index.
    pub async fn execute(&self, query: &EnrichedQuery) -> Result<SearchPage> {
        if query.expression.trim().is_empty() {
            tracing::debug!("Empty search expression, skipping index call");
            return Ok(SearchPage::default());
        }

        let request = self.build_request(query);
        tracing::debug!(
            "Searching index: text={} filter={:?} skip={} size={}",
            request.search_text,
            request.filter,
            request.skip,
            request.size
        );

        let response = self.index.search(&request).await.map_err(|e| match e {
            SearchError::Configuration(message) => NamesearchError::Configuration(message),
            other => NamesearchError::Search(other),
        })?;

        let total_count = response
            .total_count
            .unwrap_or(response.hits.len() as u64);

        tracing::info!(
            "Search returned {} hits of {} (query='{}')",
            response.hits.len(),
            total_count,
            request.search_text
        );

        Ok(SearchPage {
            hits: response.hits,
            total_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::VariantSet;
    use crate::query::{Paging, QueryComposer, QueryRequest, SearchType};
    use chrono::NaiveDate;
    use crate::search::{IndexResponse, QueryType, SearchMode};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct RecordingIndex {
        response: std::result::Result<IndexResponse, SearchError>,
        requests: Mutex<Vec<IndexRequest>>,
    }

    impl RecordingIndex {
        fn returning(response: std::result::Result<IndexResponse, SearchError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SearchIndex for RecordingIndex {
        async fn search(
            &self,
            request: &IndexRequest,
        ) -> std::result::Result<IndexResponse, SearchError> {
            self.requests.lock().unwrap().push(request.clone());
            self.response.clone()
        }
    }

    fn query(expression: &str, filters: &[&str], page: i64, page_size: i64) -> EnrichedQuery {
        EnrichedQuery {
            expression: expression.to_string(),
            filters: filters.iter().map(|f| f.to_string()).collect(),
            paging: Paging::clamp(page, page_size),
            search_type: SearchType::SemanticHybrid,
        }
    }

    fn hit(name: &str) -> SearchHit {
        let document = json!({ "fullName": name });
        SearchHit::new(document.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn test_build_request() {
        let index = RecordingIndex::returning(Ok(IndexResponse::default()));
        let executor = SearchExecutor::new(index, &IndexConfig::default()).unwrap();

        let request = executor.build_request(&query(
            "\"Jon\" OR \"John\"",
            &["countyId eq '1'", "individualFlag eq 'I'"],
            3,
            20,
        ));

        assert_eq!(request.search_text, "\"Jon\" OR \"John\"");
        assert_eq!(
            request.search_fields,
            vec!["fullName", "fullNameDoubleMet", "fullNameBeider"]
        );
        assert_eq!(
            request.filter.as_deref(),
            Some("countyId eq '1' and individualFlag eq 'I'")
        );
        assert_eq!(request.order_by, vec![ORDER_BY_SCORE]);
        assert_eq!(request.skip, 40);
        assert_eq!(request.size, 20);
        assert!(request.include_total_count);
        assert_eq!(request.search_mode, SearchMode::Any);
        assert_eq!(request.query_type, QueryType::Full);
    }

    #[test]
    fn test_rejects_empty_field_set() {
        let index = RecordingIndex::returning(Ok(IndexResponse::default()));
        let mut fields = IndexConfig::default();
        fields.search_fields.clear();

        let result = SearchExecutor::new(index, &fields);
        assert!(matches!(result, Err(NamesearchError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_execute_preserves_hit_order() {
        let index = RecordingIndex::returning(Ok(IndexResponse {
            hits: vec![hit("Johnny"), hit("Jon"), hit("John")],
            total_count: Some(42),
        }));
        let executor = SearchExecutor::new(index.clone(), &IndexConfig::default()).unwrap();

        let page = executor.execute(&query("\"jon\"", &[], 1, 10)).await.unwrap();
        let names: Vec<String> = page.hits.iter().map(|h| h.field("fullName")).collect();
        assert_eq!(names, vec!["Johnny", "Jon", "John"]);
        assert_eq!(page.total_count, 42);
        assert_eq!(index.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_total_count_uses_hit_count() {
        let index = RecordingIndex::returning(Ok(IndexResponse {
            hits: vec![hit("Jon")],
            total_count: None,
        }));
        let executor = SearchExecutor::new(index, &IndexConfig::default()).unwrap();

        let page = executor.execute(&query("\"jon\"", &[], 1, 10)).await.unwrap();
        assert_eq!(page.total_count, 1);
    }

    #[tokio::test]
    async fn test_blank_expression_skips_index() {
        let index = RecordingIndex::returning(Ok(IndexResponse::default()));
        let executor = SearchExecutor::new(index.clone(), &IndexConfig::default()).unwrap();

        let page = executor.execute(&query("   ", &[], 1, 10)).await.unwrap();
        assert!(page.hits.is_empty());
        assert_eq!(page.total_count, 0);
        assert!(index.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_name_composed_query_skips_index() {
        let fields = IndexConfig::default();
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let composed = QueryComposer::new(&fields, today)
            .compose(&QueryRequest::new("  "), &VariantSet::single("  "));
        assert_eq!(composed.expression, "");

        let index = RecordingIndex::returning(Ok(IndexResponse::default()));
        let executor = SearchExecutor::new(index.clone(), &fields).unwrap();

        let page = executor.execute(&composed).await.unwrap();
        assert!(page.hits.is_empty());
        assert!(index.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let index =
            RecordingIndex::returning(Err(SearchError::Transport("connection reset".into())));
        let executor = SearchExecutor::new(index, &IndexConfig::default()).unwrap();

        let err = executor
            .execute(&query("\"jon\"", &[], 1, 10))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NamesearchError::Search(SearchError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_configuration_failure_is_configuration_error() {
        let index = RecordingIndex::returning(Err(SearchError::Configuration(
            "unknown index".into(),
        )));
        let executor = SearchExecutor::new(index, &IndexConfig::default()).unwrap();

        let err = executor
            .execute(&query("\"jon\"", &[], 1, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, NamesearchError::Configuration(_)));
    }
}
