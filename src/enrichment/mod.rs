/// Nickname enrichment
///
/// Expands a queried name into spelling and nickname variants using an
/// external text-generation capability.
/// Architecture:
/// - TextGenerator trait for the language model client
/// - VariantGenerator builds the prompt and absorbs every model failure
/// - parser turns free-form model output into a VariantSet
mod parser;
mod variants;

pub use parser::parse_variants;
pub use variants::{VariantGenerator, VariantSet};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Text generation is disabled")]
    Disabled,

    #[error("Text generation timed out")]
    Timeout,

    #[error("Transport failure: {0}")]
    Transport(String),
}

/// One chat-style completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

/// Language model capability
///
/// Implementations own their connection pooling and timeouts and must be
/// safe to share across concurrent requests.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Run a completion and return the generated text
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;

    /// Model or deployment name, for logging
    fn model_name(&self) -> &str;
}

/// Generator used when enrichment is switched off. Every call fails, so the
/// variant generator falls back to the original name.
#[derive(Debug, Default, Clone)]
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, CompletionError> {
        Err(CompletionError::Disabled)
    }

    fn model_name(&self) -> &str {
        "disabled"
    }
}
