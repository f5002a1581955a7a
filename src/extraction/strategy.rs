//! Extraction strategy trait and shared types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::upload::{FileType, SourceFile};

/// Errors raised by a single extraction strategy.
///
/// The chain treats every variant as "this strategy failed" and moves on.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("{0} files are not handled by this strategy")]
    Unsupported(&'static str),

    #[error("Strategy not available: {0}")]
    Unavailable(String),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Extraction failed: {0}")]
    Failed(String),

    #[error("Rate limited by {service}")]
    RateLimited { service: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Identifies a strategy in configuration, logs and results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Structural parse of the file (pdftotext, plain text read).
    Native,
    /// Tesseract on the local machine.
    LocalOcr,
    /// Vision model behind an OpenAI-compatible API.
    HostedOcr,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::LocalOcr => "local_ocr",
            Self::HostedOcr => "hosted_ocr",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "native" | "pdftotext" | "text" => Some(Self::Native),
            "local_ocr" | "tesseract" | "ocr" => Some(Self::LocalOcr),
            "hosted_ocr" | "hosted" | "vision" | "openai" => Some(Self::HostedOcr),
            _ => None,
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw output of one strategy.
#[derive(Debug, Clone, Default)]
pub struct StrategyOutput {
    pub text: String,
    pub page_count: Option<u32>,
}

/// A way of turning a document into text.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Whether this strategy can handle the file type at all.
    fn supports(&self, file_type: FileType) -> bool;

    /// Whether required tools or credentials are present.
    fn is_available(&self) -> bool {
        true
    }

    /// Hint shown when the strategy is unavailable.
    fn availability_hint(&self) -> String {
        format!("{} is available", self.kind())
    }

    async fn extract(&self, file: &SourceFile) -> Result<StrategyOutput, StrategyError>;
}
