//! Client-facing result shape

use crate::search::SearchHit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transaction fields copied from the indexed document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFields {
    pub policy_number: String,
    pub order_number: String,
    pub property_address: String,
    pub borrower_name: String,
    pub seller_name: String,
    pub buyer_name: String,
    pub closing_date: String,
    pub policy_date: String,
}

/// One normalized search hit. String fields are never null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSummary {
    pub summary: String,
    pub file_url: String,
    pub file_name: String,
    pub app_id: String,
    pub parent_id: String,
    pub score: String,
    pub captions: Vec<String>,
    pub highlights: BTreeMap<String, Vec<String>>,
    pub document_fields: DocumentFields,
    pub folder_name: String,
}

/// Map a raw hit into its summary. Total: absent or null fields become
/// empty strings and empty collections.
pub fn normalize(hit: &SearchHit) -> ResponseSummary {
    ResponseSummary {
        summary: hit.field("fullName"),
        file_url: hit.field("posted"),
        file_name: hit.field("sourceId"),
        app_id: hit.field("individualFlag"),
        parent_id: hit.field("nameId"),
        score: format_score(hit.score),
        captions: hit.captions.clone(),
        highlights: hit.highlights.clone(),
        document_fields: DocumentFields {
            policy_number: hit.field("policyNumber"),
            order_number: hit.field("orderNumber"),
            property_address: hit.field("propertyAddress"),
            borrower_name: hit.field("borrowerName"),
            seller_name: hit.field("sellerName"),
            buyer_name: hit.field("buyerName"),
            closing_date: hit.field("closingDate"),
            policy_date: hit.field("policyDate"),
        },
        folder_name: hit.field("folderName"),
    }
}

/// Normalize hits in the order received
pub fn normalize_all(hits: &[SearchHit]) -> Vec<ResponseSummary> {
    hits.iter().map(normalize).collect()
}

fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) if s.is_finite() => format!("{:.2}", s),
        _ => String::new(),
    }
}
