//! Language model configuration.

use serde::{Deserialize, Serialize};

use super::prompts::COMPLIANCE_SUMMARY_PROMPT;

/// LLM provider type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Ollama API (local)
    #[default]
    Ollama,
    /// OpenAI-compatible chat completions API
    OpenAI,
}

impl LlmProvider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "openai" | "azure" | "together" => Some(Self::OpenAI),
            _ => None,
        }
    }
}

/// Configuration for the summarizing language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Whether AI summarization is enabled; disabled means every document
    /// gets the fallback summary
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub provider: LlmProvider,
    /// API endpoint (provider-specific defaults apply)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// API key for OpenAI-compatible providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens in response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Custom summary prompt (uses {filename} and {content} placeholders)
    #[serde(default)]
    pub summary_prompt: Option<String>,
    /// Maximum characters of document text sent to the model
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_content_chars() -> usize {
    4000
}

const OPENAI_ENDPOINT: &str = "https://api.openai.com";
const OPENAI_MODEL: &str = "gpt-4o-mini";

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            provider: LlmProvider::default(),
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            summary_prompt: None,
            max_content_chars: default_max_content_chars(),
        }
    }
}

impl LlmConfig {
    /// Check if the config equals the default (for skip_serializing_if).
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `LLM_ENABLED`: "true" or "false"
    /// - `LLM_PROVIDER`: "ollama" or "openai"
    /// - `LLM_ENDPOINT`: API endpoint (defaults based on provider)
    /// - `LLM_API_KEY`: API key for OpenAI-compatible providers
    /// - `LLM_MODEL`: Model name
    /// - `LLM_MAX_TOKENS`, `LLM_TEMPERATURE`, `LLM_MAX_CONTENT_CHARS`
    ///
    /// Without `LLM_PROVIDER`, an `OPENAI_API_KEY` switches the provider to
    /// OpenAI with its default endpoint and model.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("LLM_ENABLED") {
            self.enabled = val.eq_ignore_ascii_case("true") || val == "1";
        }

        let explicit_provider = std::env::var("LLM_PROVIDER")
            .ok()
            .and_then(|p| LlmProvider::from_str(&p));
        let explicit_endpoint = std::env::var("LLM_ENDPOINT").ok();
        let explicit_model = std::env::var("LLM_MODEL").ok();

        if let Ok(val) = std::env::var("LLM_API_KEY") {
            self.api_key = Some(val);
        }

        match explicit_provider {
            Some(provider) => self.provider = provider,
            None => {
                if self.api_key.is_none() {
                    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
                        self.api_key = Some(key);
                        self.provider = LlmProvider::OpenAI;
                    }
                }
            }
        }

        if self.provider == LlmProvider::OpenAI {
            if self.api_key.is_none() {
                self.api_key = std::env::var("OPENAI_API_KEY").ok();
            }
            if self.endpoint == default_endpoint() {
                self.endpoint = OPENAI_ENDPOINT.to_string();
            }
            if self.model == default_model() {
                self.model = OPENAI_MODEL.to_string();
            }
        }

        if let Some(endpoint) = explicit_endpoint {
            self.endpoint = endpoint;
        }
        if let Some(model) = explicit_model {
            self.model = model;
        }
        if let Ok(val) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(n) = val.parse() {
                self.max_tokens = n;
            }
        }
        if let Ok(val) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(t) = val.parse() {
                self.temperature = t;
            }
        }
        if let Ok(val) = std::env::var("LLM_MAX_CONTENT_CHARS") {
            if let Ok(n) = val.parse() {
                self.max_content_chars = n;
            }
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Get the summary prompt, using custom or default.
    pub fn get_summary_prompt(&self) -> &str {
        self.summary_prompt
            .as_deref()
            .unwrap_or(COMPLIANCE_SUMMARY_PROMPT)
    }
}
