//! Extraction configuration.

use serde::{Deserialize, Serialize};

use super::upload::DEFAULT_MAX_UPLOAD_BYTES;

/// Settings for the hosted OCR strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostedOcrConfig {
    /// OpenAI-compatible API base URL
    #[serde(default = "default_hosted_endpoint")]
    pub endpoint: String,
    /// Vision-capable model
    #[serde(default = "default_hosted_model")]
    pub model: String,
    /// API key; the strategy is skipped without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Maximum PDF pages sent per document
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_hosted_endpoint() -> String {
    "https://api.openai.com".to_string()
}

fn default_hosted_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_pages() -> u32 {
    5
}

impl Default for HostedOcrConfig {
    fn default() -> Self {
        Self {
            endpoint: default_hosted_endpoint(),
            model: default_hosted_model(),
            api_key: None,
            max_pages: default_max_pages(),
        }
    }
}

impl HostedOcrConfig {
    /// Apply environment variable overrides.
    ///
    /// - `HOSTED_OCR_ENDPOINT`, `HOSTED_OCR_MODEL`
    /// - `HOSTED_OCR_API_KEY`, falling back to `OPENAI_API_KEY`
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("HOSTED_OCR_ENDPOINT") {
            self.endpoint = val;
        }
        if let Ok(val) = std::env::var("HOSTED_OCR_MODEL") {
            self.model = val;
        }
        if let Ok(val) = std::env::var("HOSTED_OCR_API_KEY") {
            self.api_key = Some(val);
        } else if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        self
    }
}

/// Settings for the extraction chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Strategy names in priority order
    #[serde(default = "default_strategies")]
    pub strategies: Vec<String>,
    /// Text must be longer than this to be accepted
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,
    /// Upload size limit in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Tesseract language code
    #[serde(default = "default_tesseract_lang")]
    pub tesseract_lang: String,
    #[serde(default)]
    pub hosted: HostedOcrConfig,
}

fn default_strategies() -> Vec<String> {
    vec![
        "native".to_string(),
        "local_ocr".to_string(),
        "hosted_ocr".to_string(),
    ]
}

fn default_min_text_chars() -> usize {
    50
}

fn default_max_upload_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_tesseract_lang() -> String {
    "eng".to_string()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            min_text_chars: default_min_text_chars(),
            max_upload_bytes: default_max_upload_bytes(),
            tesseract_lang: default_tesseract_lang(),
            hosted: HostedOcrConfig::default(),
        }
    }
}

impl ExtractionConfig {
    pub fn with_env_overrides(mut self) -> Self {
        self.hosted = self.hosted.with_env_overrides();
        self
    }
}
