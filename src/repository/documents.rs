//! Diesel-based document job repository for SQLite.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::DocumentJobRecord;
use super::pool::{AsyncSqlitePool, DieselError};
use super::util::parse_datetime;
use crate::models::{DocumentJob, JobStatus, StructuredSummary, TextStatus};
use crate::schema::document_jobs;

impl From<DocumentJobRecord> for DocumentJob {
    fn from(record: DocumentJobRecord) -> Self {
        DocumentJob {
            id: record.id,
            filename: record.filename,
            content_hash: record.content_hash,
            file_size: record.file_size.max(0) as u64,
            mime_type: record.mime_type,
            page_count: record.page_count.map(|p| p.max(0) as u32),
            text_status: TextStatus::from_str(&record.text_status).unwrap_or(TextStatus::Pending),
            extraction_method: record.extraction_method,
            extracted_text: record.extracted_text,
            summary: record
                .summary_json
                .as_deref()
                .and_then(StructuredSummary::from_json),
            building_id: record.building_id,
            status: JobStatus::from_str(&record.status).unwrap_or(JobStatus::Uploaded),
            created_at: parse_datetime(&record.created_at),
            updated_at: parse_datetime(&record.updated_at),
        }
    }
}

/// Diesel-based document job repository.
#[derive(Clone)]
pub struct DieselDocumentJobRepository {
    pool: AsyncSqlitePool,
}

impl DieselDocumentJobRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Get a job by ID.
    pub async fn get(&self, id: &str) -> Result<Option<DocumentJob>, DieselError> {
        let mut conn = self.pool.get().await?;

        document_jobs::table
            .find(id)
            .first::<DocumentJobRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(DocumentJob::from))
    }

    /// Most recent jobs first.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<DocumentJob>, DieselError> {
        let mut conn = self.pool.get().await?;

        document_jobs::table
            .order(document_jobs::created_at.desc())
            .limit(limit)
            .load::<DocumentJobRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(DocumentJob::from).collect())
    }

    /// Save a job (insert or replace).
    pub async fn save(&self, job: &DocumentJob) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        let summary_json = job.summary.as_ref().map(StructuredSummary::to_json);
        let created_at = job.created_at.to_rfc3339();
        let updated_at = job.updated_at.to_rfc3339();

        diesel::replace_into(document_jobs::table)
            .values((
                document_jobs::id.eq(&job.id),
                document_jobs::filename.eq(&job.filename),
                document_jobs::content_hash.eq(&job.content_hash),
                document_jobs::file_size.eq(job.file_size as i64),
                document_jobs::mime_type.eq(&job.mime_type),
                document_jobs::page_count.eq(job.page_count.map(|p| p as i32)),
                document_jobs::text_status.eq(job.text_status.as_str()),
                document_jobs::extraction_method.eq(&job.extraction_method),
                document_jobs::extracted_text.eq(&job.extracted_text),
                document_jobs::summary_json.eq(&summary_json),
                document_jobs::building_id.eq(&job.building_id),
                document_jobs::status.eq(job.status.as_str()),
                document_jobs::created_at.eq(&created_at),
                document_jobs::updated_at.eq(&updated_at),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}
