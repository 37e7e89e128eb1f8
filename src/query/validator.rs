use crate::config::ConfigValidator;
use crate::error::{NamesearchError, Result, ValidationError};
use crate::query::{parse_date_filter, QueryRequest, MAX_PAGE_SIZE};
use chrono::Utc;

/// Shortest query accepted, in characters
pub const MIN_QUERY_CHARS: usize = 2;

/// Client request validator. Runs before any external call.
pub struct RequestValidator;

impl RequestValidator {
    /// Validate the request, reporting every failed rule at once
    pub fn validate(request: &QueryRequest) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_query(request, &mut errors);
        Self::validate_paging(request, &mut errors);
        Self::validate_date_filter(request, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(NamesearchError::Validation { errors })
        }
    }

    fn validate_query(request: &QueryRequest, errors: &mut Vec<ValidationError>) {
        let query = request.query_text();
        if query.is_empty() {
            errors.push(ValidationError::new("query", "Query cannot be empty"));
        } else if query.chars().count() < MIN_QUERY_CHARS {
            errors.push(ValidationError::new(
                "query",
                format!("Query must be at least {} characters", MIN_QUERY_CHARS),
            ));
        }
    }

    fn validate_paging(request: &QueryRequest, errors: &mut Vec<ValidationError>) {
        if request.page < 1 {
            errors.push(ValidationError::new(
                "page",
                format!("Page must be at least 1, got {}", request.page),
            ));
        }

        if !(1..=MAX_PAGE_SIZE as i64).contains(&request.page_size) {
            errors.push(ValidationError::new(
                "pageSize",
                format!(
                    "Page size must be between 1 and {}, got {}",
                    MAX_PAGE_SIZE, request.page_size
                ),
            ));
        }
    }

    fn validate_date_filter(request: &QueryRequest, errors: &mut Vec<ValidationError>) {
        if let Some(field) = request.date_field.as_deref().map(str::trim) {
            if !field.is_empty() && !ConfigValidator::is_field_name(field) {
                errors.push(ValidationError::new(
                    "dateField",
                    format!("Invalid field name: '{}'", field),
                ));
            }
        }

        if let Some(phrase) = request.date_filter.as_deref() {
            let today = Utc::now().date_naive();
            if !phrase.trim().is_empty() && parse_date_filter(phrase, today).is_none() {
                errors.push(ValidationError::new(
                    "dateFilter",
                    format!("Unrecognised date filter: '{}'", phrase),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed_paths(request: &QueryRequest) -> Vec<String> {
        match RequestValidator::validate(request) {
            Err(NamesearchError::Validation { errors }) => {
                errors.into_iter().map(|e| e.path).collect()
            }
            Ok(()) => Vec::new(),
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_valid_request() {
        let request = QueryRequest::new("John").with_page(1, 5);
        assert!(RequestValidator::validate(&request).is_ok());
    }

    #[test]
    fn test_empty_query_rejected() {
        assert_eq!(failed_paths(&QueryRequest::new("")), vec!["query"]);
        assert_eq!(failed_paths(&QueryRequest::new("   ")), vec!["query"]);
    }

    #[test]
    fn test_short_query_rejected() {
        assert_eq!(failed_paths(&QueryRequest::new("J")), vec!["query"]);
        assert!(failed_paths(&QueryRequest::new("Jo")).is_empty());
    }

    #[test]
    fn test_paging_out_of_range() {
        let request = QueryRequest::new("jon").with_page(0, 101);
        assert_eq!(failed_paths(&request), vec!["page", "pageSize"]);
    }

    #[test]
    fn test_reports_all_errors() {
        let request = QueryRequest::new("")
            .with_page(-1, 0)
            .with_date_filter(Some("1bad".to_string()), "whenever");
        assert_eq!(
            failed_paths(&request),
            vec!["query", "page", "pageSize", "dateField", "dateFilter"]
        );
    }

    #[test]
    fn test_known_date_filter_accepted() {
        let request = QueryRequest::new("jon").with_date_filter(None, "last 7 days");
        assert!(RequestValidator::validate(&request).is_ok());
    }
}
