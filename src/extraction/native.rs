//! Structural text extraction: pdftotext for PDFs, direct reads for text files.

use async_trait::async_trait;
use tokio::process::Command;

use super::strategy::{ExtractionStrategy, StrategyError, StrategyKind, StrategyOutput};
use super::tools::{check_binary, handle_cmd_output, pdf_page_count};
use super::upload::{FileType, SourceFile};

#[derive(Debug, Clone, Default)]
pub struct NativeStrategy;

impl NativeStrategy {
    pub fn new() -> Self {
        Self
    }

    async fn extract_pdf(&self, file: &SourceFile) -> Result<StrategyOutput, StrategyError> {
        let tmp = file.to_temp_file()?;

        let output = Command::new("pdftotext")
            .args(["-layout"])
            .arg(tmp.path())
            .arg("-")
            .output()
            .await;

        let text = handle_cmd_output(output, "pdftotext (install poppler-utils)", "pdftotext failed")?;
        let page_count = pdf_page_count(tmp.path()).await;

        Ok(StrategyOutput { text, page_count })
    }
}

#[async_trait]
impl ExtractionStrategy for NativeStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Native
    }

    fn supports(&self, file_type: FileType) -> bool {
        matches!(file_type, FileType::Pdf | FileType::Text)
    }

    fn availability_hint(&self) -> String {
        "install poppler-utils for pdftotext".to_string()
    }

    async fn extract(&self, file: &SourceFile) -> Result<StrategyOutput, StrategyError> {
        match file.file_type {
            FileType::Pdf => {
                if !check_binary("pdftotext") {
                    return Err(StrategyError::ToolNotFound(
                        "pdftotext (install poppler-utils)".to_string(),
                    ));
                }
                self.extract_pdf(file).await
            }
            FileType::Text => {
                let text = String::from_utf8_lossy(&file.bytes).to_string();
                if text.trim().is_empty() {
                    return Err(StrategyError::Failed("Text file is empty".to_string()));
                }
                Ok(StrategyOutput {
                    text,
                    page_count: Some(1),
                })
            }
            other => Err(StrategyError::Unsupported(other.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_plain_text() {
        let file = SourceFile::from_upload(
            "notes.txt",
            b"Fire alarm tested weekly, all call points operational.".to_vec(),
            1024,
        )
        .unwrap();
        let out = NativeStrategy::new().extract(&file).await.unwrap();
        assert!(out.text.starts_with("Fire alarm"));
        assert_eq!(out.page_count, Some(1));
    }

    #[tokio::test]
    async fn test_whitespace_text_file_fails() {
        let file = SourceFile::from_upload("blank.txt", b"   \n\n".to_vec(), 1024).unwrap();
        assert!(matches!(
            NativeStrategy::new().extract(&file).await,
            Err(StrategyError::Failed(_))
        ));
    }

    #[tokio::test]
    async fn test_word_documents_are_unsupported() {
        let file = SourceFile::from_upload("lease.docx", b"PK\x03\x04rest".to_vec(), 1024).unwrap();
        let strategy = NativeStrategy::new();
        assert!(!strategy.supports(file.file_type));
        assert!(matches!(
            strategy.extract(&file).await,
            Err(StrategyError::Unsupported(_))
        ));
    }
}
