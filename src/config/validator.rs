use crate::config::Config;
use crate::error::{NamesearchError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_llm(config, &mut errors);
        Self::validate_search(config, &mut errors);
        Self::validate_index(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(NamesearchError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_llm(config: &Config, errors: &mut Vec<ValidationError>) {
        let llm = &config.llm;

        // Endpoint and key are only required when enrichment is switched on
        if llm.enabled {
            if !Self::is_valid_endpoint(&llm.endpoint) {
                errors.push(ValidationError::new(
                    "llm.endpoint",
                    format!("Endpoint must be an http(s) URL, got '{}'", llm.endpoint),
                ));
            }
            if llm.deployment.trim().is_empty() {
                errors.push(ValidationError::new(
                    "llm.deployment",
                    "Deployment name cannot be empty when LLM is enabled",
                ));
            }
            match std::env::var(&llm.api_key_env) {
                Ok(key) if key.is_empty() => errors.push(ValidationError::new(
                    "llm.api_key_env",
                    format!("Environment variable {} is empty", llm.api_key_env),
                )),
                Ok(_) => {}
                Err(_) => errors.push(ValidationError::new(
                    "llm.api_key_env",
                    format!("Environment variable {} is not set", llm.api_key_env),
                )),
            }
        }

        if !(0.0..=2.0).contains(&llm.temperature) {
            errors.push(ValidationError::new(
                "llm.temperature",
                format!(
                    "Temperature must be between 0.0 and 2.0, got {}",
                    llm.temperature
                ),
            ));
        }

        if llm.max_tokens == 0 {
            errors.push(ValidationError::new(
                "llm.max_tokens",
                "Max tokens must be greater than 0",
            ));
        }

        let valid_providers = ["azure_openai", "openai", "ollama"];
        if !valid_providers.contains(&llm.provider.as_str()) {
            errors.push(ValidationError::new(
                "llm.provider",
                format!(
                    "Provider must be one of {:?}, got '{}'",
                    valid_providers, llm.provider
                ),
            ));
        }
    }

    fn validate_search(config: &Config, errors: &mut Vec<ValidationError>) {
        // An empty endpoint is allowed here; search_credentials() rejects it
        // when a client is actually built.
        let endpoint = &config.search.endpoint;
        if !endpoint.is_empty() && !Self::is_valid_endpoint(endpoint) {
            errors.push(ValidationError::new(
                "search.endpoint",
                format!("Endpoint must be an http(s) URL, got '{}'", endpoint),
            ));
        }

        if config.search.index_name.trim().is_empty() {
            errors.push(ValidationError::new(
                "search.index_name",
                "Index name cannot be empty",
            ));
        }
    }

    fn validate_index(config: &Config, errors: &mut Vec<ValidationError>) {
        let index = &config.index;

        if index.search_fields.is_empty() {
            errors.push(ValidationError::new(
                "index.search_fields",
                "At least one search field is required",
            ));
        }

        for (i, field) in index.search_fields.iter().enumerate() {
            if !Self::is_field_name(field) {
                errors.push(ValidationError::new(
                    format!("index.search_fields[{}]", i),
                    format!("Invalid field name: '{}'", field),
                ));
            }
        }

        for (path, field) in [
            ("index.scope_field", &index.scope_field),
            ("index.kind_field", &index.kind_field),
            ("index.date_field", &index.date_field),
        ] {
            if !Self::is_field_name(field) {
                errors.push(ValidationError::new(
                    path,
                    format!("Invalid field name: '{}'", field),
                ));
            }
        }

        if index.record_kinds.iter().all(|k| k.trim().is_empty()) {
            errors.push(ValidationError::new(
                "index.record_kinds",
                "At least one record kind is required",
            ));
        }
    }

    fn is_valid_endpoint(endpoint: &str) -> bool {
        let rest = endpoint
            .strip_prefix("https://")
            .or_else(|| endpoint.strip_prefix("http://"));
        matches!(rest, Some(host) if !host.trim_matches('/').is_empty())
    }

    /// Index field names are plain identifiers
    pub(crate) fn is_field_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    }
}
