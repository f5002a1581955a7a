//! Local OCR through the tesseract binary.

use std::path::Path;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::debug;

use super::strategy::{ExtractionStrategy, StrategyError, StrategyKind, StrategyOutput};
use super::tools::{check_binary, handle_cmd_output, render_pdf_pages};
use super::upload::{FileType, SourceFile};

/// Rasterisation resolution for scanned PDFs.
const OCR_DPI: u32 = 300;

#[derive(Debug, Clone)]
pub struct LocalOcrStrategy {
    language: String,
}

impl Default for LocalOcrStrategy {
    fn default() -> Self {
        Self::new("eng")
    }
}

impl LocalOcrStrategy {
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
        }
    }

    async fn run_tesseract(&self, image_path: &Path) -> Result<String, StrategyError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output()
            .await;

        handle_cmd_output(output, "tesseract (install tesseract-ocr)", "tesseract failed")
    }

    async fn ocr_pdf(&self, pdf_path: &Path) -> Result<StrategyOutput, StrategyError> {
        let temp_dir = TempDir::new()?;
        let pages = render_pdf_pages(pdf_path, temp_dir.path(), OCR_DPI, None).await?;

        let mut all_text = String::new();
        for (i, page) in pages.iter().enumerate() {
            debug!("Running tesseract on page {}", i + 1);
            let text = self.run_tesseract(page).await?;
            all_text.push_str(&text);
            all_text.push_str("\n\n");
        }

        Ok(StrategyOutput {
            text: all_text,
            page_count: Some(pages.len() as u32),
        })
    }
}

#[async_trait]
impl ExtractionStrategy for LocalOcrStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::LocalOcr
    }

    fn supports(&self, file_type: FileType) -> bool {
        matches!(file_type, FileType::Pdf | FileType::Image)
    }

    fn is_available(&self) -> bool {
        check_binary("tesseract")
    }

    fn availability_hint(&self) -> String {
        "install tesseract-ocr (and poppler-utils for PDFs)".to_string()
    }

    async fn extract(&self, file: &SourceFile) -> Result<StrategyOutput, StrategyError> {
        let tmp = file.to_temp_file()?;
        match file.file_type {
            FileType::Image => {
                let text = self.run_tesseract(tmp.path()).await?;
                Ok(StrategyOutput {
                    text,
                    page_count: Some(1),
                })
            }
            FileType::Pdf => self.ocr_pdf(tmp.path()).await,
            other => Err(StrategyError::Unsupported(other.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_scans_only() {
        let strategy = LocalOcrStrategy::default();
        assert!(strategy.supports(FileType::Image));
        assert!(strategy.supports(FileType::Pdf));
        assert!(!strategy.supports(FileType::Text));
        assert!(!strategy.supports(FileType::Word));
    }
}
