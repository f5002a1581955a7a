//! Persistence and notification for confirmed documents.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::calendar::{CalendarClient, CalendarConfig, ReminderRequest};
use crate::models::{
    AssetStatus, AssetType, Building, BuildingComplianceSnapshot, StructuredSummary,
};
use crate::repository::{AlertWrite, DbContext, DieselError, InspectionWrite};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Building not found: {0}")]
    BuildingNotFound(String),

    #[error("Document type '{0}' does not map to a compliance asset; it can only be declined")]
    UnmappedDocumentType(String),

    /// The job was decided by another caller, or no longer exists.
    #[error("Document {0} already has a decision")]
    AlreadyDecided(String),

    #[error("Database error: {0}")]
    Database(#[from] DieselError),
}

/// Result of committing a confirmed summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitOutcome {
    /// False when an existing (building, asset type) row was updated.
    pub created: bool,
    pub urgent_findings_count: usize,
    /// Reported separately; the database commit stands even when this is false.
    pub reminder_created: bool,
    pub building_asset_id: String,
    pub asset_type: String,
    pub next_inspection_due: NaiveDate,
    pub snapshot: BuildingComplianceSnapshot,
}

/// Write path invoked by the confirmation gate.
#[async_trait]
pub trait CommitSink: Send + Sync {
    async fn commit(
        &self,
        document_id: &str,
        building_id: &str,
        summary: &StructuredSummary,
    ) -> Result<CommitOutcome, SinkError>;
}

/// Commits to the database, then requests a calendar reminder.
pub struct PersistenceSink {
    db: DbContext,
    calendar: Arc<dyn CalendarClient>,
    calendar_config: CalendarConfig,
}

impl PersistenceSink {
    pub fn new(
        db: DbContext,
        calendar: Arc<dyn CalendarClient>,
        calendar_config: CalendarConfig,
    ) -> Self {
        Self {
            db,
            calendar,
            calendar_config,
        }
    }

    async fn request_reminder(
        &self,
        building: &Building,
        asset_id: &str,
        document_type: &str,
        due: NaiveDate,
        summary: &StructuredSummary,
        urgent: usize,
    ) -> bool {
        let request = ReminderRequest::renewal(
            document_type,
            building,
            due,
            summary.inspection_details.as_ref(),
            urgent,
            &self.calendar_config,
        );

        match self.calendar.create_reminder(&request).await {
            Ok(event_id) => {
                if let Err(e) = self
                    .db
                    .compliance()
                    .set_calendar_event(asset_id, &event_id)
                    .await
                {
                    warn!("Failed to store calendar event {}: {}", event_id, e);
                }
                true
            }
            Err(e) => {
                warn!("Calendar reminder for {} not created: {}", building.name, e);
                false
            }
        }
    }
}

/// Build the write for a confirmed summary.
pub fn inspection_write(
    document_id: &str,
    building_id: &str,
    summary: &StructuredSummary,
    today: NaiveDate,
) -> Result<InspectionWrite, SinkError> {
    let document_type = summary.document_type.as_deref().unwrap_or("unknown");
    let asset_type = AssetType::for_document_type(document_type)
        .ok_or_else(|| SinkError::UnmappedDocumentType(document_type.to_string()))?;

    let last_renewed = summary.inspection_date().unwrap_or(today);
    let next_due = summary
        .next_inspection_due()
        .unwrap_or_else(|| asset_type.next_due_after(last_renewed));
    let status = AssetStatus::from_inspection(summary.outcome(), Some(next_due), today);

    let notes = format!(
        "{} - {}. Certificate: {}",
        document_type,
        summary.compliance_status.as_deref().unwrap_or("unknown"),
        summary.certificate_number().unwrap_or("N/A")
    );

    let alerts = summary
        .key_findings
        .urgent()
        .into_iter()
        .filter_map(|finding| {
            let severity = finding.classification?;
            let (alert_type, priority) = severity.alert_kind()?;
            Some(AlertWrite {
                classification: severity.as_str().to_string(),
                alert_type: alert_type.to_string(),
                priority: priority.to_string(),
                message: format!("{}: {}", severity, finding.observation),
            })
        })
        .collect();

    Ok(InspectionWrite {
        document_id: document_id.to_string(),
        building_id: building_id.to_string(),
        asset_type: asset_type.key.to_string(),
        status,
        last_renewed_date: last_renewed,
        next_due_date: next_due,
        notes,
        contractor: summary.contractor().map(str::to_string),
        certificate_number: summary.certificate_number().map(str::to_string),
        alerts,
    })
}

/// Fresh compliance view of one building.
pub async fn compliance_snapshot(
    db: &DbContext,
    building: Building,
) -> Result<BuildingComplianceSnapshot, DieselError> {
    let compliance = db.compliance();
    let assets = compliance.list_for_building(&building.id).await?;
    let open_alerts = compliance.open_alerts(&building.id).await?;
    Ok(BuildingComplianceSnapshot {
        building,
        assets,
        open_alerts,
        fetched_at: Utc::now(),
    })
}

#[async_trait]
impl CommitSink for PersistenceSink {
    async fn commit(
        &self,
        document_id: &str,
        building_id: &str,
        summary: &StructuredSummary,
    ) -> Result<CommitOutcome, SinkError> {
        let building = self
            .db
            .buildings()
            .get(building_id)
            .await?
            .ok_or_else(|| SinkError::BuildingNotFound(building_id.to_string()))?;

        let write = inspection_write(document_id, building_id, summary, Utc::now().date_naive())?;
        let next_due = write.next_due_date;
        let recorded = self
            .db
            .compliance()
            .record_inspection(write)
            .await?
            .ok_or_else(|| SinkError::AlreadyDecided(document_id.to_string()))?;

        info!(
            "{} {} for {} ({} alerts)",
            if recorded.created { "Created" } else { "Updated" },
            recorded.asset.display_name(),
            building.name,
            recorded.alerts_created
        );

        let reminder_created = match summary.next_inspection_due() {
            Some(due) => {
                let document_type = summary.document_type.as_deref().unwrap_or("Compliance");
                self.request_reminder(
                    &building,
                    &recorded.asset.id,
                    document_type,
                    due,
                    summary,
                    recorded.alerts_created,
                )
                .await
            }
            None => false,
        };

        let snapshot = compliance_snapshot(&self.db, building).await?;

        Ok(CommitOutcome {
            created: recorded.created,
            urgent_findings_count: recorded.alerts_created,
            reminder_created,
            building_asset_id: recorded.asset.id,
            asset_type: recorded.asset.asset_type,
            next_inspection_due: next_due,
            snapshot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KeyFindings;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_write_for_satisfactory_eicr() {
        let summary = StructuredSummary::from_model_output(&json!({
            "document_type": "EICR",
            "compliance_status": "Satisfactory",
            "inspection_details": {
                "inspection_date": "2024-03-12",
                "certificate_number": "EICR-0042",
                "inspector_company": "Spark & Co"
            }
        }));

        let write = inspection_write("doc-1", "bld-1", &summary, today()).unwrap();
        assert_eq!(write.asset_type, "eicr");
        assert_eq!(write.status, AssetStatus::Compliant);
        assert_eq!(write.last_renewed_date, NaiveDate::from_ymd_opt(2024, 3, 12).unwrap());
        assert_eq!(write.next_due_date, NaiveDate::from_ymd_opt(2029, 3, 12).unwrap());
        assert_eq!(write.notes, "EICR - Satisfactory. Certificate: EICR-0042");
        assert_eq!(write.contractor.as_deref(), Some("Spark & Co"));
        assert!(write.alerts.is_empty());
    }

    #[test]
    fn test_urgent_findings_become_alerts() {
        let summary = StructuredSummary::from_model_output(&json!({
            "document_type": "EICR",
            "compliance_status": "Unsatisfactory",
            "key_findings": [
                {"classification": "C1", "observation": "Exposed live conductors"},
                {"classification": "C2", "observation": "No RCD protection"},
                {"classification": "C3", "observation": "Labels faded"},
                {"classification": "HIGH", "observation": "Overloaded board"}
            ]
        }));

        let write = inspection_write("doc-1", "bld-1", &summary, today()).unwrap();
        assert_eq!(write.status, AssetStatus::Overdue);
        assert_eq!(write.alerts.len(), 3);
        assert_eq!(write.alerts[0].alert_type, "immediate_danger");
        assert_eq!(write.alerts[0].priority, "immediate");
        assert_eq!(write.alerts[0].message, "C1: Exposed live conductors");
        assert_eq!(write.alerts[2].alert_type, "potentially_dangerous");
        assert!(write.notes.ends_with("Certificate: N/A"));
    }

    #[test]
    fn test_failing_certificate_is_never_compliant() {
        for (status, expected) in [
            ("Not satisfactory", AssetStatus::Overdue),
            ("Not compliant", AssetStatus::Overdue),
            ("Partially compliant", AssetStatus::Pending),
        ] {
            let summary = StructuredSummary::from_model_output(&json!({
                "document_type": "Fire Risk Assessment",
                "compliance_status": status,
                "inspection_details": {"inspection_date": "2024-05-01"}
            }));
            let write = inspection_write("doc-1", "bld-1", &summary, today()).unwrap();
            assert_eq!(write.status, expected, "{}", status);
        }
    }

    #[test]
    fn test_legacy_findings_never_alert() {
        let summary = StructuredSummary {
            document_type: Some("Fire Risk Assessment".to_string()),
            key_findings: KeyFindings::Legacy(vec!["C1 danger present".to_string()]),
            ..Default::default()
        };
        let write = inspection_write("doc-1", "bld-1", &summary, today()).unwrap();
        assert!(write.alerts.is_empty());
        assert_eq!(write.status, AssetStatus::Pending);
    }

    #[test]
    fn test_unmapped_document_type() {
        let summary = StructuredSummary {
            document_type: Some("Service Charge Budget".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            inspection_write("doc-1", "bld-1", &summary, today()),
            Err(SinkError::UnmappedDocumentType(t)) if t == "Service Charge Budget"
        ));
        assert!(matches!(
            inspection_write("doc-1", "bld-1", &StructuredSummary::default(), today()),
            Err(SinkError::UnmappedDocumentType(_))
        ));

        let err = inspection_write("doc-1", "bld-1", &StructuredSummary::default(), today())
            .unwrap_err();
        assert!(err.to_string().contains("can only be declined"));
    }
}
