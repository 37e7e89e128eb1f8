//! Variant sets and the nickname variant generator

use crate::config::LlmConfig;
use crate::enrichment::{parse_variants, CompletionRequest, TextGenerator};
use ahash::{HashSet, HashSetExt};
use serde::Serialize;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You expand personal and business names for a records search. \
For the given name, list common nicknames, short forms and alternative spellings. \
Answer with a JSON array of strings only, no commentary, and include the name itself. \
For 'Jonathan' answer [\"Jonathan\", \"John\", \"Johnny\", \"Jon\", \"Johnathan\"]";

/// Ordered, case-insensitively distinct name variants.
///
/// Never empty. Sets built from model output always contain the original
/// name; when the model omitted it, it is placed first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VariantSet(Vec<String>);

impl VariantSet {
    /// A set holding only `name`, unchanged
    pub fn single(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    /// Build a set from candidate variants: blanks are dropped, duplicates
    /// removed keeping the first spelling, and `original` prepended if no
    /// candidate matches it case-insensitively.
    pub fn from_candidates<I>(original: &str, candidates: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen = HashSet::new();
        let mut variants = Vec::new();

        for candidate in candidates {
            let trimmed = candidate.trim();
            if trimmed.is_empty() {
                continue;
            }
            if seen.insert(trimmed.to_lowercase()) {
                variants.push(trimmed.to_string());
            }
        }

        if !seen.contains(&original.trim().to_lowercase()) {
            variants.insert(0, original.to_string());
        }

        Self(variants)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for a constructed set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Asks the language model for nickname variants of a name.
///
/// Fails soft: an unavailable or misbehaving model yields a set containing
/// only the original name, so search keeps working without enrichment.
pub struct VariantGenerator {
    client: Arc<dyn TextGenerator>,
    max_output_tokens: u32,
    temperature: f32,
}

impl VariantGenerator {
    pub fn new(client: Arc<dyn TextGenerator>) -> Self {
        Self {
            client,
            max_output_tokens: 150,
            temperature: 0.7,
        }
    }

    pub fn from_config(client: Arc<dyn TextGenerator>, config: &LlmConfig) -> Self {
        Self::new(client).with_sampling(config.max_tokens, config.temperature)
    }

    pub fn with_sampling(mut self, max_output_tokens: u32, temperature: f32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self.temperature = temperature;
        self
    }

    /// The completion request sent for `name`
    pub fn prompt(&self, name: &str) -> CompletionRequest {
        CompletionRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: format!("Name: {}", name),
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
        }
    }

    /// Generate variants for `name`. Never fails.
    pub async fn generate(&self, name: &str) -> VariantSet {
        if name.trim().is_empty() {
            return VariantSet::single(name);
        }

        tracing::info!(
            "Generating nickname variations for '{}' with {}",
            name,
            self.client.model_name()
        );

        let content = match self.client.complete(&self.prompt(name)).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    "Nickname generation failed for '{}', searching original name only: {}",
                    name,
                    e
                );
                return VariantSet::single(name);
            }
        };

        tracing::debug!("Model response: {}", content);

        let variants = parse_variants(&content, name);
        tracing::info!("Generated {} variations for '{}'", variants.len(), name);
        variants
    }
}
