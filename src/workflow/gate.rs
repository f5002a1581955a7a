//! Human confirmation of analysed documents.
//!
//! A summarized job is *presented*. Confirming needs a building and hands
//! the summary to the commit sink; declining only logs the decision. Both
//! outcomes are terminal and there is no expiry.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::sink::{CommitOutcome, CommitSink, SinkError};
use crate::models::{Decision, DecisionRecord, DocumentJob, JobStatus};
use crate::repository::{DbContext, DieselError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    Presented,
    Confirmed,
    Declined,
}

impl GateState {
    /// Gate state for a job, if it has reached the gate.
    pub fn of(job: &DocumentJob) -> Option<Self> {
        match job.status {
            JobStatus::Summarized => Some(Self::Presented),
            JobStatus::Confirmed => Some(Self::Confirmed),
            JobStatus::Declined => Some(Self::Declined),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum GateError {
    #[error("Select a building before confirming")]
    BuildingRequired,

    #[error("Document {id} is {status} and awaits no decision")]
    NotPresented { id: String, status: &'static str },

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("Database error: {0}")]
    Database(#[from] DieselError),
}

pub struct ConfirmationGate {
    sink: Arc<dyn CommitSink>,
    db: DbContext,
}

impl ConfirmationGate {
    pub fn new(sink: Arc<dyn CommitSink>, db: DbContext) -> Self {
        Self { sink, db }
    }

    fn ensure_presented(job: &DocumentJob) -> Result<(), GateError> {
        match GateState::of(job) {
            Some(GateState::Presented) if job.summary.is_some() => Ok(()),
            _ => Err(GateError::NotPresented {
                id: job.id.clone(),
                status: job.status.as_str(),
            }),
        }
    }

    /// The stored job's status, for reporting a lost race.
    async fn already_decided(&self, id: &str) -> GateError {
        let status = match self.db.documents().get(id).await {
            Ok(Some(job)) => job.status.as_str(),
            Ok(None) => "missing",
            Err(e) => return GateError::Database(e),
        };
        GateError::NotPresented {
            id: id.to_string(),
            status,
        }
    }

    /// Accept the summary and commit it against a building.
    ///
    /// A missing or blank building is rejected before anything else runs.
    /// The commit only lands while the stored job is still presented, so a
    /// stale copy of a decided job is rejected.
    pub async fn confirm(
        &self,
        job: &DocumentJob,
        building_id: Option<&str>,
    ) -> Result<CommitOutcome, GateError> {
        let building_id = building_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(GateError::BuildingRequired)?;
        Self::ensure_presented(job)?;

        let summary = job.summary.as_ref().ok_or_else(|| GateError::NotPresented {
            id: job.id.clone(),
            status: job.status.as_str(),
        })?;

        let outcome = match self.sink.commit(&job.id, building_id, summary).await {
            Ok(outcome) => outcome,
            Err(SinkError::AlreadyDecided(id)) => return Err(self.already_decided(&id).await),
            Err(e) => return Err(e.into()),
        };
        info!(
            "Confirmed {} against building {} (asset {})",
            job.filename, building_id, outcome.building_asset_id
        );
        Ok(outcome)
    }

    /// Decline the summary.
    ///
    /// The stored job is checked first; the decision itself is written in
    /// the background and its failures are logged, never returned. The
    /// handle is returned for callers that want to wait.
    pub async fn decline(
        &self,
        job: &DocumentJob,
        reason: Option<&str>,
    ) -> Result<JoinHandle<()>, GateError> {
        Self::ensure_presented(job)?;
        let stored = self.db.documents().get(&job.id).await?;
        if stored.as_ref().map(|j| j.status) != Some(JobStatus::Summarized) {
            return Err(self.already_decided(&job.id).await);
        }

        let db = self.db.clone();
        let record = DecisionRecord::new(&job.id, Decision::Declined, None, reason);
        let filename = job.filename.clone();

        Ok(tokio::spawn(async move {
            match db.decisions().record_decline(&record).await {
                Ok(true) => info!("Declined {}", filename),
                Ok(false) => warn!("{} was decided elsewhere; decline not recorded", filename),
                Err(e) => warn!("Failed to log decline for {}: {}", filename, e),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BuildingComplianceSnapshot, Building, StructuredSummary};
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[derive(Default)]
    struct CountingSink {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CommitSink for CountingSink {
        async fn commit(
            &self,
            document_id: &str,
            building_id: &str,
            _summary: &StructuredSummary,
        ) -> Result<CommitOutcome, SinkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CommitOutcome {
                created: true,
                urgent_findings_count: 0,
                reminder_created: false,
                building_asset_id: format!("asset-for-{}", document_id),
                asset_type: "eicr".to_string(),
                next_inspection_due: NaiveDate::from_ymd_opt(2029, 3, 12).unwrap(),
                snapshot: BuildingComplianceSnapshot {
                    building: Building {
                        id: building_id.to_string(),
                        ..Building::new("Ashwood House", None, false)
                    },
                    assets: Vec::new(),
                    open_alerts: Vec::new(),
                    fetched_at: Utc::now(),
                },
            })
        }
    }

    async fn setup() -> (tempfile::TempDir, DbContext, Arc<CountingSink>, ConfirmationGate) {
        let dir = tempdir().unwrap();
        let db = DbContext::from_path(&dir.path().join("test.db"));
        db.init_schema().await.unwrap();
        let sink = Arc::new(CountingSink::default());
        let gate = ConfirmationGate::new(sink.clone(), db.clone());
        (dir, db, sink, gate)
    }

    async fn presented_job(db: &DbContext) -> DocumentJob {
        let mut job = DocumentJob::new("EICR_Flat3.pdf", b"%PDF-1.7", "application/pdf");
        job.summary = Some(StructuredSummary {
            document_type: Some("EICR".to_string()),
            ..Default::default()
        });
        job.status = JobStatus::Summarized;
        db.documents().save(&job).await.unwrap();
        job
    }

    #[tokio::test]
    async fn test_confirm_requires_building() {
        let (_dir, db, sink, gate) = setup().await;
        let job = presented_job(&db).await;

        for building in [None, Some(""), Some("   ")] {
            assert!(matches!(
                gate.confirm(&job, building).await,
                Err(GateError::BuildingRequired)
            ));
        }
        assert_eq!(sink.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_confirm_calls_sink_once() {
        let (_dir, db, sink, gate) = setup().await;
        let job = presented_job(&db).await;

        let outcome = gate.confirm(&job, Some("bld-1")).await.unwrap();
        assert!(outcome.created);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_decline_never_commits() {
        let (_dir, db, sink, gate) = setup().await;
        let job = presented_job(&db).await;

        gate.decline(&job, Some("wrong building"))
            .await
            .unwrap()
            .await
            .unwrap();

        assert_eq!(sink.calls.load(Ordering::SeqCst), 0);
        let stored = db.documents().get(&job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Declined);
        let log = db.decisions().for_document(&job.id).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].decision, Decision::Declined);
        assert_eq!(log[0].reason.as_deref(), Some("wrong building"));
    }

    #[tokio::test]
    async fn test_terminal_states_reject_decisions() {
        let (_dir, db, sink, gate) = setup().await;
        let mut job = presented_job(&db).await;
        job.status = JobStatus::Declined;

        assert!(matches!(
            gate.confirm(&job, Some("bld-1")).await,
            Err(GateError::NotPresented { .. })
        ));
        assert!(matches!(
            gate.decline(&job, None).await,
            Err(GateError::NotPresented { .. })
        ));
        assert_eq!(sink.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stale_copy_cannot_decline_a_confirmed_job() {
        let (_dir, db, _sink, gate) = setup().await;
        let stale = presented_job(&db).await;

        let mut stored = stale.clone();
        stored.status = JobStatus::Confirmed;
        db.documents().save(&stored).await.unwrap();

        assert!(matches!(
            gate.decline(&stale, Some("changed my mind")).await,
            Err(GateError::NotPresented { status: "confirmed", .. })
        ));
        assert!(db.decisions().for_document(&stale.id).await.unwrap().is_empty());
        let reloaded = db.documents().get(&stale.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, JobStatus::Confirmed);
    }

    struct DecidedSink;

    #[async_trait]
    impl CommitSink for DecidedSink {
        async fn commit(
            &self,
            document_id: &str,
            _building_id: &str,
            _summary: &StructuredSummary,
        ) -> Result<CommitOutcome, SinkError> {
            Err(SinkError::AlreadyDecided(document_id.to_string()))
        }
    }

    #[tokio::test]
    async fn test_lost_commit_reports_stored_status() {
        let (_dir, db, _sink, _gate) = setup().await;
        let gate = ConfirmationGate::new(Arc::new(DecidedSink), db.clone());
        let stale = presented_job(&db).await;

        let mut stored = stale.clone();
        stored.status = JobStatus::Declined;
        db.documents().save(&stored).await.unwrap();

        assert!(matches!(
            gate.confirm(&stale, Some("bld-1")).await,
            Err(GateError::NotPresented { status: "declined", .. })
        ));
    }

    #[tokio::test]
    async fn test_decline_failure_is_swallowed() {
        let (dir, db, _sink, gate) = setup().await;
        let job = presented_job(&db).await;

        let handle = gate.decline(&job, None).await.unwrap();
        // The database goes away before the background write runs; the task
        // logs and completes normally.
        drop(dir);
        handle.await.unwrap();
    }
}
