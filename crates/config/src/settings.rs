//! Settings loaded from YAML with working defaults

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use loan_agent_core::NIGERIAN_STATES;

/// Settings load/parse errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}: {1}")]
    FileNotFound(String, String),

    #[error("config parse error: {0}")]
    Parse(String),
}

/// Top-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub dialogue: DialogueSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub email: EmailSettings,
}

impl Settings {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::FileNotFound(path.as_ref().display().to_string(), e.to_string())
        })?;
        let settings: Settings =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        tracing::info!(path = %path.as_ref().display(), "settings loaded");
        Ok(settings)
    }
}

/// Token sets and gazetteer driving the dialogue stage machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueSettings {
    /// Affirmative tokens that move Confirming -> Processing
    #[serde(default = "default_confirm_tokens")]
    pub confirm_tokens: Vec<String>,
    /// Tokens that send Confirming back to Collecting for changes
    #[serde(default = "default_modify_tokens")]
    pub modify_tokens: Vec<String>,
    /// Accepted administrative regions for the location field
    #[serde(default = "default_regions")]
    pub regions: Vec<String>,
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self {
            confirm_tokens: default_confirm_tokens(),
            modify_tokens: default_modify_tokens(),
            regions: default_regions(),
        }
    }
}

impl DialogueSettings {
    /// Case-insensitive substring test against the confirm token set
    pub fn is_confirmation(&self, message: &str) -> bool {
        let lower = message.to_lowercase();
        self.confirm_tokens.iter().any(|t| lower.contains(t.as_str()))
    }

    /// Case-insensitive substring test against the modify token set
    pub fn is_modification(&self, message: &str) -> bool {
        let lower = message.to_lowercase();
        self.modify_tokens.iter().any(|t| lower.contains(t.as_str()))
    }
}

fn default_confirm_tokens() -> Vec<String> {
    ["confirm", "yes", "correct", "submit", "proceed"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_modify_tokens() -> Vec<String> {
    ["modify", "change", "edit", "no", "incorrect"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_regions() -> Vec<String> {
    NIGERIAN_STATES.iter().map(|s| s.to_string()).collect()
}

/// OpenAI-compatible endpoint settings shared by the scoring,
/// recommendation, and response-generation adapters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key: None,
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

fn default_llm_endpoint() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    30
}

/// Email provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSettings {
    #[serde(default = "default_email_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_from_address")]
    pub from_address: String,
    #[serde(default = "default_subject")]
    pub subject: String,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            api_base: default_email_api_base(),
            api_key: None,
            from_address: default_from_address(),
            subject: default_subject(),
        }
    }
}

fn default_email_api_base() -> String {
    "https://api.sendgrid.com".to_string()
}

fn default_from_address() -> String {
    "loans@example.com".to_string()
}

fn default_subject() -> String {
    "Your Loan Application Decision".to_string()
}
