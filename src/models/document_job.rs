//! Uploaded documents moving through analysis and confirmation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::summary::StructuredSummary;

/// Where a document job is in its lifecycle.
///
/// `Summarized` is the presented state of the confirmation gate; `Confirmed`
/// and `Declined` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Uploaded,
    ExtractionFailed,
    Extracted,
    Summarized,
    Confirmed,
    Declined,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::ExtractionFailed => "extraction_failed",
            Self::Extracted => "extracted",
            Self::Summarized => "summarized",
            Self::Confirmed => "confirmed",
            Self::Declined => "declined",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "uploaded" => Some(Self::Uploaded),
            "extraction_failed" => Some(Self::ExtractionFailed),
            "extracted" => Some(Self::Extracted),
            "summarized" => Some(Self::Summarized),
            "confirmed" => Some(Self::Confirmed),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }
}

/// Whether raw text is available for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStatus {
    Pending,
    Extracted,
    NoText,
    Failed,
}

impl TextStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Extracted => "extracted",
            Self::NoText => "no_text",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "extracted" => Some(Self::Extracted),
            "no_text" => Some(Self::NoText),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// One uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentJob {
    pub id: String,
    pub filename: String,
    pub content_hash: String,
    pub file_size: u64,
    pub mime_type: String,
    pub page_count: Option<u32>,
    pub text_status: TextStatus,
    pub extraction_method: Option<String>,
    #[serde(skip_serializing)]
    pub extracted_text: Option<String>,
    pub summary: Option<StructuredSummary>,
    /// Set only once the confirmation gate accepts the job.
    pub building_id: Option<String>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentJob {
    pub fn new(filename: &str, content: &[u8], mime_type: &str) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            filename: filename.to_string(),
            content_hash: Self::compute_hash(content),
            file_size: content.len() as u64,
            mime_type: mime_type.to_string(),
            page_count: None,
            text_status: TextStatus::Pending,
            extraction_method: None,
            extracted_text: None,
            summary: None,
            building_id: None,
            status: JobStatus::Uploaded,
            created_at: now,
            updated_at: now,
        }
    }

    /// Compute SHA-256 hash of content.
    pub fn compute_hash(content: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content);
        hex::encode(hasher.finalize())
    }

    /// Name of the stored upload, unique per content.
    pub fn storage_name(&self) -> String {
        let ext = std::path::Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        format!("{}.{}", &self.content_hash[..16.min(self.content_hash.len())], ext)
    }
}
