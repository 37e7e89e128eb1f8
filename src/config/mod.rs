//! Configuration management for Namesearch
//!
//! Loads the TOML configuration, applies profile and environment overrides,
//! validates it, and resolves the credentials the external search index and
//! language model clients need at startup.

use crate::error::{NamesearchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub index: IndexConfig,
    #[serde(default)]
    pub profiles: HashMap<String, ProfileOverrides>,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Language model used for nickname enrichment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub enabled: bool,
    pub provider: String,
    pub endpoint: String,
    /// Deployment or model name
    pub deployment: String,
    pub api_key_env: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Search index connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub endpoint: String,
    pub api_key_env: String,
    pub index_name: String,
}

/// Field names of the document index used when building requests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexConfig {
    /// Name-bearing fields the enriched expression is matched against
    pub search_fields: Vec<String>,
    /// Field holding the application/county scope identifier
    pub scope_field: String,
    /// Field distinguishing individual and business records
    pub kind_field: String,
    /// Record kinds searched when no field restriction is given
    pub record_kinds: Vec<String>,
    /// Date field used by date-range filters when the request names none
    pub date_field: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            search_fields: vec![
                "fullName".to_string(),
                "fullNameDoubleMet".to_string(),
                "fullNameBeider".to_string(),
            ],
            scope_field: "countyId".to_string(),
            kind_field: "individualFlag".to_string(),
            record_kinds: vec!["I".to_string(), "B".to_string()],
            date_field: "closingDate".to_string(),
        }
    }
}

/// Profile-specific configuration overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
}

/// Resolved endpoint and key for a remote capability
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub endpoint: String,
    /// Index name or model deployment
    pub target: String,
    pub api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("endpoint", &self.endpoint)
            .field("target", &self.target)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(NamesearchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| NamesearchError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| NamesearchError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Load configuration with a specific profile applied
    pub fn load_with_profile(path: &Path, profile: &str) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_profile(profile)?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Apply a profile's overrides to the configuration
    pub fn apply_profile(&mut self, profile: &str) -> Result<()> {
        let overrides = self
            .profiles
            .get(profile)
            .cloned()
            .ok_or_else(|| NamesearchError::Config(format!("Unknown profile: {}", profile)))?;

        if let Some(enabled) = overrides.llm_enabled {
            self.llm.enabled = enabled;
        }
        if let Some(temperature) = overrides.llm_temperature {
            self.llm.temperature = temperature;
        }
        if let Some(index_name) = overrides.index_name {
            self.search.index_name = index_name;
        }
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: NAMESEARCH_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = override_key(&key) {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "LLM__ENABLED" => {
                self.llm.enabled = value
                    .parse()
                    .map_err(|_| invalid_value(path, format!("Cannot parse '{}' as boolean", value)))?;
            }
            "LLM__ENDPOINT" => self.llm.endpoint = value.to_string(),
            "LLM__DEPLOYMENT" => self.llm.deployment = value.to_string(),
            "LLM__TEMPERATURE" => {
                self.llm.temperature = value
                    .parse()
                    .map_err(|_| invalid_value(path, format!("Cannot parse '{}' as number", value)))?;
            }
            "LLM__MAX_TOKENS" => {
                self.llm.max_tokens = value
                    .parse()
                    .map_err(|_| invalid_value(path, format!("Cannot parse '{}' as integer", value)))?;
            }
            "SEARCH__ENDPOINT" => self.search.endpoint = value.to_string(),
            "SEARCH__INDEX_NAME" => self.search.index_name = value.to_string(),
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Resolve search index credentials, failing fast when anything is missing
    pub fn search_credentials(&self) -> Result<Credentials> {
        resolve_credentials(
            "search",
            &self.search.endpoint,
            &self.search.index_name,
            &self.search.api_key_env,
        )
    }

    /// Resolve language model credentials. `None` when enrichment is disabled.
    pub fn llm_credentials(&self) -> Result<Option<Credentials>> {
        if !self.llm.enabled {
            return Ok(None);
        }
        resolve_credentials(
            "llm",
            &self.llm.endpoint,
            &self.llm.deployment,
            &self.llm.api_key_env,
        )
        .map(Some)
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            NamesearchError::Config("Cannot determine config directory".to_string())
        })?;

        Ok(config_dir.join("namesearch").join("config.toml"))
    }
}

/// `SECTION__KEY` for a `NAMESEARCH_SECTION__KEY` variable. Variables
/// without a section separator are not overrides.
fn override_key(var: &str) -> Option<&str> {
    var.strip_prefix("NAMESEARCH_")
        .filter(|key| key.contains("__"))
}

fn invalid_value(path: &str, message: String) -> NamesearchError {
    NamesearchError::InvalidConfigValue {
        path: path.to_string(),
        message,
    }
}

fn resolve_credentials(
    section: &str,
    endpoint: &str,
    target: &str,
    api_key_env: &str,
) -> Result<Credentials> {
    if endpoint.trim().is_empty() {
        return Err(NamesearchError::Configuration(format!(
            "{}.endpoint is not set",
            section
        )));
    }
    if target.trim().is_empty() {
        return Err(NamesearchError::Configuration(format!(
            "{} target (index or deployment) is not set",
            section
        )));
    }

    let api_key = std::env::var(api_key_env).unwrap_or_default();
    if api_key.trim().is_empty() {
        return Err(NamesearchError::Configuration(format!(
            "{}: environment variable {} is not set",
            section, api_key_env
        )));
    }

    Ok(Credentials {
        endpoint: endpoint.trim_end_matches('/').to_string(),
        target: target.to_string(),
        api_key,
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            llm: LlmConfig {
                enabled: false,
                provider: "azure_openai".to_string(),
                endpoint: String::new(),
                deployment: String::new(),
                api_key_env: "AZURE_OPENAI_API_KEY".to_string(),
                max_tokens: 150,
                temperature: 0.7,
            },
            search: SearchConfig {
                endpoint: String::new(),
                api_key_env: "AZURE_SEARCH_API_KEY".to_string(),
                index_name: "hybrid".to_string(),
            },
            index: IndexConfig::default(),
            profiles: HashMap::new(),
        }
    }
}
