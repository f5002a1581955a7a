//! Diesel-based decision log repository for SQLite.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::models::{DecisionRecordRow, NewDecisionRecord};
use super::pool::{AsyncSqlitePool, DieselError};
use super::util::parse_datetime;
use crate::models::{Decision, DecisionRecord, JobStatus};
use crate::schema::{decision_log, document_jobs};

impl From<DecisionRecordRow> for DecisionRecord {
    fn from(row: DecisionRecordRow) -> Self {
        DecisionRecord {
            id: row.id,
            document_id: row.document_id,
            decision: Decision::from_str(&row.decision).unwrap_or(Decision::Declined),
            building_id: row.building_id,
            reason: row.reason,
            created_at: parse_datetime(&row.created_at),
        }
    }
}

/// Diesel-based decision log repository.
#[derive(Clone)]
pub struct DieselDecisionRepository {
    pool: AsyncSqlitePool,
}

impl DieselDecisionRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Mark a summarized job declined and append the decision.
    ///
    /// Returns false, writing nothing, when the job is missing or has
    /// already been decided.
    pub async fn record_decline(&self, entry: &DecisionRecord) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;
        let created_at = entry.created_at.to_rfc3339();

        conn.transaction(|conn| {
            Box::pin(async move {
                let claimed = diesel::update(
                    document_jobs::table
                        .find(&entry.document_id)
                        .filter(document_jobs::status.eq(JobStatus::Summarized.as_str())),
                )
                .set((
                    document_jobs::status.eq(JobStatus::Declined.as_str()),
                    document_jobs::updated_at.eq(Utc::now().to_rfc3339()),
                ))
                .execute(conn)
                .await?;
                if claimed == 0 {
                    return Ok(false);
                }

                diesel::insert_into(decision_log::table)
                    .values(NewDecisionRecord {
                        id: &entry.id,
                        document_id: &entry.document_id,
                        decision: entry.decision.as_str(),
                        building_id: entry.building_id.as_deref(),
                        reason: entry.reason.as_deref(),
                        created_at: &created_at,
                    })
                    .execute(conn)
                    .await?;

                Ok(true)
            })
        })
        .await
    }

    /// Decisions for a document, oldest first.
    pub async fn for_document(&self, document_id: &str) -> Result<Vec<DecisionRecord>, DieselError> {
        let mut conn = self.pool.get().await?;

        decision_log::table
            .filter(decision_log::document_id.eq(document_id))
            .order(decision_log::created_at.asc())
            .load::<DecisionRecordRow>(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(DecisionRecord::from).collect())
    }
}
