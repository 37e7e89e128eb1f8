//! Name search orchestration
//!
//! Runs one request through Enrich -> Compose -> Search -> Normalize. Each
//! stage only sees the previous stage's output; nothing is retried here.

use crate::config::{Config, IndexConfig};
use crate::enrichment::{DisabledGenerator, TextGenerator, VariantGenerator};
use crate::error::{NamesearchError, Result};
use crate::query::{QueryComposer, QueryRequest, RequestValidator};
use crate::search::{normalize_all, ResponseSummary, SearchExecutor, SearchIndex};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub original_query: String,
    pub searched_variations: Vec<String>,
    /// Normalized hits in index relevance order
    pub results: Vec<ResponseSummary>,
    pub total_count: u64,
}

/// Stateless per request; safe to share behind an `Arc`
pub struct NameSearchPipeline {
    variants: VariantGenerator,
    executor: SearchExecutor,
    index_fields: IndexConfig,
}

impl NameSearchPipeline {
    pub fn new(
        variants: VariantGenerator,
        executor: SearchExecutor,
        index_fields: IndexConfig,
    ) -> Self {
        Self {
            variants,
            executor,
            index_fields,
        }
    }

    /// Wire the pipeline from configuration. When `[llm]` is disabled the
    /// given generator is ignored and every request searches the original
    /// name only.
    pub fn from_config(
        config: &Config,
        generator: Arc<dyn TextGenerator>,
        index: Arc<dyn SearchIndex>,
    ) -> Result<Self> {
        let generator: Arc<dyn TextGenerator> = if config.llm.enabled {
            generator
        } else {
            tracing::info!("Name enrichment disabled, searching original names only");
            Arc::new(DisabledGenerator)
        };

        let variants = VariantGenerator::from_config(generator, &config.llm);
        let executor = SearchExecutor::new(index, &config.index)?;

        Ok(Self::new(variants, executor, config.index.clone()))
    }

    /// Run a request with relative date filters anchored on today (UTC)
    pub async fn run(
        &self,
        request: &QueryRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse> {
        self.run_at(request, cancel, Utc::now().date_naive()).await
    }

    /// Run a request with relative date filters anchored on `today`
    pub async fn run_at(
        &self,
        request: &QueryRequest,
        cancel: &CancellationToken,
        today: NaiveDate,
    ) -> Result<SearchResponse> {
        let span = tracing::info_span!("name_search", request_id = %Uuid::new_v4());
        self.execute(request, cancel, today).instrument(span).await
    }

    async fn execute(
        &self,
        request: &QueryRequest,
        cancel: &CancellationToken,
        today: NaiveDate,
    ) -> Result<SearchResponse> {
        RequestValidator::validate(request)?;

        let query = request.query_text();
        tracing::info!("Name search for '{}'", query);

        let variants = until_cancelled(cancel, self.variants.generate(query)).await?;
        tracing::info!("Searching {} variations: {:?}", variants.len(), variants.as_slice());

        let enriched = QueryComposer::new(&self.index_fields, today).compose(request, &variants);
        tracing::debug!(
            "Composed expression: {} filter: {:?}",
            enriched.expression,
            enriched.filter_expression()
        );

        let page = until_cancelled(cancel, self.executor.execute(&enriched)).await??;
        let results = normalize_all(&page.hits);

        tracing::info!(
            "Name search for '{}' complete: {} results of {}",
            query,
            results.len(),
            page.total_count
        );

        Ok(SearchResponse {
            original_query: request.raw_query.clone(),
            searched_variations: variants.into_vec(),
            results,
            total_count: page.total_count,
        })
    }
}

/// Drive `fut` unless `cancel` fires first, in which case `fut` is dropped
async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::info!("Request cancelled");
            Err(NamesearchError::Cancelled)
        }
        out = fut => Ok(out),
    }
}
