//! Hosted OCR through an OpenAI-compatible vision model.
//!
//! Images are sent inline as base64 data URLs. PDFs are rasterised
//! first and only the leading pages are sent.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tracing::debug;

use super::config::HostedOcrConfig;
use super::strategy::{ExtractionStrategy, StrategyError, StrategyKind, StrategyOutput};
use super::tools::render_pdf_pages;
use super::upload::{FileType, SourceFile};

/// Resolution for pages sent to the vision model.
const HOSTED_DPI: u32 = 150;

const OCR_INSTRUCTION: &str = "Extract all text from this image. Return only the extracted text, preserving the original layout and formatting as much as possible. Do not add any explanations or commentary.";

#[derive(Debug, Serialize)]
struct VisionRequest {
    model: String,
    messages: Vec<VisionMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct VisionMessage {
    role: String,
    content: Vec<VisionContent>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum VisionContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: VisionImageUrl },
}

#[derive(Debug, Serialize)]
struct VisionImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct VisionResponse {
    choices: Option<Vec<VisionChoice>>,
    error: Option<VisionError>,
}

#[derive(Debug, Deserialize)]
struct VisionChoice {
    message: VisionResponseMessage,
}

#[derive(Debug, Deserialize)]
struct VisionResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VisionError {
    message: String,
}

pub struct HostedOcrStrategy {
    config: HostedOcrConfig,
    client: reqwest::Client,
}

impl HostedOcrStrategy {
    pub fn new(config: HostedOcrConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    fn data_url(bytes: &[u8], mime_type: &str) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        format!("data:{};base64,{}", mime_type, encoded)
    }

    async fn recognise(&self, data_url: String) -> Result<String, StrategyError> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            StrategyError::Unavailable("HOSTED_OCR_API_KEY or OPENAI_API_KEY not set".to_string())
        })?;

        let request = VisionRequest {
            model: self.config.model.clone(),
            messages: vec![VisionMessage {
                role: "user".to_string(),
                content: vec![
                    VisionContent::Text {
                        text: OCR_INSTRUCTION.to_string(),
                    },
                    VisionContent::ImageUrl {
                        image_url: VisionImageUrl { url: data_url },
                    },
                ],
            }],
            max_tokens: 4096,
            temperature: 0.0,
        };

        let url = format!(
            "{}/v1/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| StrategyError::Failed(format!("HTTP request failed: {}", e)))?;

        if response.status().as_u16() == 429 {
            return Err(StrategyError::RateLimited {
                service: "hosted OCR".to_string(),
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StrategyError::Failed(format!(
                "Hosted OCR API error ({}): {}",
                status, body
            )));
        }

        let parsed: VisionResponse = response
            .json()
            .await
            .map_err(|e| StrategyError::Failed(format!("Failed to parse response: {}", e)))?;

        if let Some(error) = parsed.error {
            return Err(StrategyError::Failed(format!(
                "Hosted OCR API error: {}",
                error.message
            )));
        }

        Ok(parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    async fn recognise_pdf(&self, pdf_path: &Path) -> Result<StrategyOutput, StrategyError> {
        let temp_dir = TempDir::new()?;
        let pages = render_pdf_pages(
            pdf_path,
            temp_dir.path(),
            HOSTED_DPI,
            Some(self.config.max_pages),
        )
        .await?;

        let mut text = String::new();
        for (i, page) in pages.iter().enumerate() {
            debug!("Sending page {} to hosted OCR", i + 1);
            let bytes = tokio::fs::read(page).await?;
            text.push_str(&self.recognise(Self::data_url(&bytes, "image/png")).await?);
            text.push_str("\n\n");
        }

        Ok(StrategyOutput {
            text,
            page_count: Some(pages.len() as u32),
        })
    }
}

#[async_trait]
impl ExtractionStrategy for HostedOcrStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::HostedOcr
    }

    fn supports(&self, file_type: FileType) -> bool {
        matches!(file_type, FileType::Pdf | FileType::Image)
    }

    fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn availability_hint(&self) -> String {
        "set HOSTED_OCR_API_KEY or OPENAI_API_KEY".to_string()
    }

    async fn extract(&self, file: &SourceFile) -> Result<StrategyOutput, StrategyError> {
        match file.file_type {
            FileType::Image => {
                let text = self
                    .recognise(Self::data_url(&file.bytes, &file.mime_type()))
                    .await?;
                Ok(StrategyOutput {
                    text,
                    page_count: Some(1),
                })
            }
            FileType::Pdf => {
                let tmp = file.to_temp_file()?;
                self.recognise_pdf(tmp.path()).await
            }
            other => Err(StrategyError::Unsupported(other.as_str())),
        }
    }
}
