//! Upload validation and file type detection.

use std::io::Write;

use tempfile::NamedTempFile;
use thiserror::Error;

/// Extensions accepted for upload.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "docx", "doc", "txt", "jpg", "jpeg", "png", "gif"];

/// Default maximum upload size (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Broad file families the extraction strategies care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Word,
    Text,
    Image,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Word => "word",
            Self::Text => "text",
            Self::Image => "image",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(Self::Pdf),
            "docx" | "doc" => Some(Self::Word),
            "txt" => Some(Self::Text),
            "jpg" | "jpeg" | "png" | "gif" => Some(Self::Image),
            _ => None,
        }
    }
}

/// Reasons an upload is rejected before any extraction runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("File is empty")]
    Empty,

    #[error("File is {size} bytes, larger than the {max} byte limit")]
    TooLarge { size: u64, max: u64 },

    #[error("Unsupported file type: {0}")]
    Unsupported(String),
}

impl ValidationError {
    pub fn suggestions(&self) -> Vec<String> {
        let items: &[&str] = match self {
            Self::Empty => &[
                "Check that the file is not corrupted",
                "Try uploading the file again",
            ],
            Self::TooLarge { .. } => &[
                "Compress the PDF before uploading",
                "Split the document into smaller files",
            ],
            Self::Unsupported(_) => &[
                "Upload a PDF, Word document, text file or image",
                "Convert the document to PDF format",
            ],
        };
        items.iter().map(|s| s.to_string()).collect()
    }
}

/// An uploaded file held in memory.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub file_type: FileType,
}

impl SourceFile {
    /// Validate an upload and detect its type.
    ///
    /// Content sniffing wins over the extension when they disagree about
    /// PDFs and images, since uploads are often misnamed.
    pub fn from_upload(
        filename: &str,
        bytes: Vec<u8>,
        max_bytes: u64,
    ) -> Result<Self, ValidationError> {
        if bytes.is_empty() {
            return Err(ValidationError::Empty);
        }
        let size = bytes.len() as u64;
        if size > max_bytes {
            return Err(ValidationError::TooLarge {
                size,
                max: max_bytes,
            });
        }

        let ext = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ValidationError::Unsupported(if ext.is_empty() {
                filename.to_string()
            } else {
                ext
            }));
        }

        let sniffed = infer::get(&bytes).and_then(|kind| match kind.mime_type() {
            "application/pdf" => Some(FileType::Pdf),
            m if m.starts_with("image/") => Some(FileType::Image),
            _ => None,
        });

        let file_type = sniffed
            .or_else(|| FileType::from_extension(&ext))
            .ok_or_else(|| ValidationError::Unsupported(ext.clone()))?;

        Ok(Self {
            filename: filename.to_string(),
            bytes,
            file_type,
        })
    }

    /// MIME type guessed from the file name.
    pub fn mime_type(&self) -> String {
        match self.file_type {
            FileType::Pdf => "application/pdf".to_string(),
            _ => mime_guess::from_path(&self.filename)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        }
    }

    /// Write the content to a temporary file for external tools.
    ///
    /// The file keeps the original extension so tools that dispatch on it
    /// behave.
    pub fn to_temp_file(&self) -> std::io::Result<NamedTempFile> {
        let suffix = std::path::Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        let mut file = tempfile::Builder::new()
            .prefix("blociq-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(&self.bytes)?;
        file.flush()?;
        Ok(file)
    }
}
