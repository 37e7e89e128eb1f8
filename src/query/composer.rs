//! Composition of a request and its variants into an enriched query

use crate::config::{ConfigValidator, IndexConfig};
use crate::enrichment::VariantSet;
use crate::query::{
    any_of_clause, eq_clause, parse_date_filter, quote_phrase, range_clause, EnrichedQuery,
    Paging, QueryRequest,
};
use chrono::NaiveDate;

/// Builds [`EnrichedQuery`] values. Pure: the same request, variants and
/// reference day always produce the same query.
#[derive(Debug, Clone)]
pub struct QueryComposer<'a> {
    fields: &'a IndexConfig,
    today: NaiveDate,
}

impl<'a> QueryComposer<'a> {
    /// `today` anchors relative date filters
    pub fn new(fields: &'a IndexConfig, today: NaiveDate) -> Self {
        Self { fields, today }
    }

    pub fn compose(&self, request: &QueryRequest, variants: &VariantSet) -> EnrichedQuery {
        EnrichedQuery {
            expression: Self::expression(variants),
            filters: self.filters(request),
            paging: Paging::clamp(request.page, request.page_size),
            search_type: request.search_type,
        }
    }

    /// `"Jon" OR "John" OR "Johnny"`, in variant order. Blank variants are
    /// skipped, so a set holding only a blank name yields an empty expression.
    pub fn expression(variants: &VariantSet) -> String {
        variants
            .iter()
            .filter(|v| !v.trim().is_empty())
            .map(|v| quote_phrase(v))
            .collect::<Vec<_>>()
            .join(" OR ")
    }

    fn filters(&self, request: &QueryRequest) -> Vec<String> {
        let mut filters = Vec::new();

        if let Some(scope) = non_empty(&request.scope_id) {
            filters.push(eq_clause(&self.fields.scope_field, scope));
        }

        match non_empty(&request.field_restriction) {
            Some(kind) => filters.push(eq_clause(&self.fields.kind_field, kind)),
            None => {
                let kinds = any_of_clause(&self.fields.kind_field, &self.fields.record_kinds);
                filters.extend(kinds);
            }
        }

        if let Some(clause) = self.date_clause(request) {
            filters.push(clause);
        }

        filters
    }

    fn date_clause(&self, request: &QueryRequest) -> Option<String> {
        let phrase = non_empty(&request.date_filter)?;
        let field = non_empty(&request.date_field).unwrap_or(&self.fields.date_field);

        // Field names cannot be escaped, only rejected
        if !ConfigValidator::is_field_name(field) {
            tracing::debug!("Skipping date filter on invalid field '{}'", field);
            return None;
        }

        let range = parse_date_filter(phrase, self.today)?;
        Some(range_clause(field, range.from, range.to))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
