//! Upload to presented summary: validate, extract, summarize.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::extraction::{Extraction, ExtractionChain, ExtractionFailure, FailureKind, SourceFile};
use crate::models::{Building, DocumentJob, JobStatus, TextStatus};
use crate::repository::{DbContext, DieselError};
use crate::summarizer::Summarizer;

#[derive(Debug, Error)]
pub enum IngestError {
    /// The job id is set when the upload was accepted and a job recorded.
    #[error("{failure}")]
    Extraction {
        job_id: Option<String>,
        failure: ExtractionFailure,
    },

    #[error("Building not found: {0}")]
    BuildingNotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] DieselError),
}

/// A job ready for the confirmation gate.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedDocument {
    pub job: DocumentJob,
    pub extraction: Extraction,
    /// Building named by the caller, or matched from the summary's
    /// property details.
    pub suggested_building: Option<Building>,
}

pub struct DocumentPipeline {
    db: DbContext,
    chain: Arc<ExtractionChain>,
    summarizer: Arc<Summarizer>,
    max_upload_bytes: u64,
    documents_dir: Option<PathBuf>,
}

impl DocumentPipeline {
    pub fn new(
        db: DbContext,
        chain: Arc<ExtractionChain>,
        summarizer: Arc<Summarizer>,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            db,
            chain,
            summarizer,
            max_upload_bytes,
            documents_dir: None,
        }
    }

    /// Keep a copy of every accepted upload in `dir`.
    pub fn with_documents_dir(mut self, dir: PathBuf) -> Self {
        self.documents_dir = Some(dir);
        self
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Run one upload through extraction and summarization.
    ///
    /// `building_hint` is checked up front so a typo fails before any work.
    pub async fn ingest(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        building_hint: Option<&str>,
    ) -> Result<AnalyzedDocument, IngestError> {
        let hinted = match building_hint.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => Some(
                self.db
                    .buildings()
                    .get(id)
                    .await?
                    .ok_or_else(|| IngestError::BuildingNotFound(id.to_string()))?,
            ),
            None => None,
        };

        let file = SourceFile::from_upload(filename, bytes, self.max_upload_bytes).map_err(|e| {
            IngestError::Extraction {
                job_id: None,
                failure: e.into(),
            }
        })?;

        let mut job = DocumentJob::new(&file.filename, &file.bytes, &file.mime_type());
        self.db.documents().save(&job).await?;
        self.store_upload(&job, &file).await;
        info!("Accepted upload {} ({} bytes) as {}", job.filename, job.file_size, job.id);

        let extraction = match self.chain.extract(&file).await {
            Ok(extraction) => extraction,
            Err(failure) => {
                job.text_status = match failure.kind {
                    FailureKind::NoText => TextStatus::NoText,
                    _ => TextStatus::Failed,
                };
                job.status = JobStatus::ExtractionFailed;
                job.updated_at = Utc::now();
                self.db.documents().save(&job).await?;
                return Err(IngestError::Extraction {
                    job_id: Some(job.id),
                    failure,
                });
            }
        };

        job.page_count = extraction.page_count;
        job.text_status = TextStatus::Extracted;
        job.extraction_method = Some(extraction.method.as_str().to_string());
        job.extracted_text = Some(extraction.text.clone());
        job.status = JobStatus::Extracted;
        job.updated_at = Utc::now();
        self.db.documents().save(&job).await?;

        let summary = self.summarizer.summarize(&extraction.text, &job.filename).await;

        let suggested_building = match hinted {
            Some(building) => Some(building),
            None => match summary
                .property_details
                .as_ref()
                .and_then(|p| p.building_name.as_deref())
            {
                Some(name) => self.db.buildings().find_by_name(name).await?,
                None => None,
            },
        };

        job.summary = Some(summary);
        job.status = JobStatus::Summarized;
        job.updated_at = Utc::now();
        self.db.documents().save(&job).await?;

        Ok(AnalyzedDocument {
            job,
            extraction,
            suggested_building,
        })
    }

    async fn store_upload(&self, job: &DocumentJob, file: &SourceFile) {
        let Some(dir) = &self.documents_dir else {
            return;
        };
        let path = dir.join(job.storage_name());
        if path.exists() {
            debug!("Upload already stored at {}", path.display());
            return;
        }
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            warn!("Failed to create {}: {}", dir.display(), e);
            return;
        }
        if let Err(e) = tokio::fs::write(&path, &file.bytes).await {
            warn!("Failed to store upload {}: {}", path.display(), e);
        }
    }
}
