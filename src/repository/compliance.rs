//! Diesel-based compliance asset and alert repository for SQLite.

use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::models::{
    BuildingAssetRecord, ComplianceAlertRecord, NewBuildingAsset, NewComplianceAlert,
    NewDecisionRecord,
};
use super::pool::{AsyncSqlitePool, DieselError};
use super::util::{format_date, parse_date_opt, parse_datetime};
use crate::models::{
    AssetSelection, AssetStatus, BuildingAsset, ComplianceAlert, Decision, JobStatus,
};
use crate::schema::{building_compliance_assets, compliance_alerts, decision_log, document_jobs};

impl From<BuildingAssetRecord> for BuildingAsset {
    fn from(record: BuildingAssetRecord) -> Self {
        BuildingAsset {
            id: record.id,
            building_id: record.building_id,
            asset_type: record.asset_type,
            status: AssetStatus::from_str(&record.status).unwrap_or(AssetStatus::Pending),
            next_due_date: parse_date_opt(record.next_due_date),
            last_renewed_date: parse_date_opt(record.last_renewed_date),
            notes: record.notes,
            contractor: record.contractor,
            certificate_number: record.certificate_number,
            document_id: record.document_id,
            calendar_event_id: record.calendar_event_id,
            created_at: parse_datetime(&record.created_at),
            updated_at: parse_datetime(&record.updated_at),
        }
    }
}

impl From<ComplianceAlertRecord> for ComplianceAlert {
    fn from(record: ComplianceAlertRecord) -> Self {
        ComplianceAlert {
            id: record.id,
            building_id: record.building_id,
            building_asset_id: record.building_asset_id,
            document_id: record.document_id,
            alert_type: record.alert_type,
            classification: record.classification,
            message: record.message,
            priority: record.priority,
            status: record.status,
            created_at: parse_datetime(&record.created_at),
        }
    }
}

/// An alert to raise alongside an inspection.
#[derive(Debug, Clone)]
pub struct AlertWrite {
    pub classification: String,
    pub alert_type: String,
    pub priority: String,
    pub message: String,
}

/// Everything written when a confirmed inspection is committed.
#[derive(Debug, Clone)]
pub struct InspectionWrite {
    pub document_id: String,
    pub building_id: String,
    pub asset_type: String,
    pub status: AssetStatus,
    pub last_renewed_date: NaiveDate,
    pub next_due_date: NaiveDate,
    pub notes: String,
    pub contractor: Option<String>,
    pub certificate_number: Option<String>,
    pub alerts: Vec<AlertWrite>,
}

/// Outcome of [`DieselComplianceRepository::record_inspection`].
#[derive(Debug, Clone)]
pub struct RecordedInspection {
    pub asset: BuildingAsset,
    /// False when an existing (building, asset type) row was updated.
    pub created: bool,
    pub alerts_created: usize,
}

/// Diesel-based compliance repository.
#[derive(Clone)]
pub struct DieselComplianceRepository {
    pool: AsyncSqlitePool,
}

impl DieselComplianceRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Assets tracked for a building.
    pub async fn list_for_building(
        &self,
        building_id: &str,
    ) -> Result<Vec<BuildingAsset>, DieselError> {
        let mut conn = self.pool.get().await?;

        building_compliance_assets::table
            .filter(building_compliance_assets::building_id.eq(building_id))
            .order(building_compliance_assets::asset_type.asc())
            .load::<BuildingAssetRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(BuildingAsset::from).collect())
    }

    /// Get one building asset by ID.
    pub async fn get_asset(&self, id: &str) -> Result<Option<BuildingAsset>, DieselError> {
        let mut conn = self.pool.get().await?;

        building_compliance_assets::table
            .find(id)
            .first::<BuildingAssetRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(BuildingAsset::from))
    }

    /// Asset type keys already tracked for a building.
    pub async fn tracked_types(&self, building_id: &str) -> Result<AssetSelection, DieselError> {
        let mut conn = self.pool.get().await?;

        let keys: Vec<String> = building_compliance_assets::table
            .filter(building_compliance_assets::building_id.eq(building_id))
            .select(building_compliance_assets::asset_type)
            .load(&mut conn)
            .await?;

        Ok(keys.into_iter().collect())
    }

    /// Start tracking the selected asset types as pending.
    ///
    /// Types already tracked are left untouched. Returns the rows created.
    pub async fn add_assets(
        &self,
        building_id: &str,
        selection: &AssetSelection,
    ) -> Result<Vec<BuildingAsset>, DieselError> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now().to_rfc3339();
        let building_id = building_id.to_string();
        let keys: Vec<String> = selection.iter().map(str::to_string).collect();

        let created_ids: Vec<String> = conn
            .transaction(|conn| {
                Box::pin(async move {
                    let mut created = Vec::new();
                    for key in &keys {
                        let id = uuid::Uuid::new_v4().to_string();
                        let rows = diesel::insert_or_ignore_into(building_compliance_assets::table)
                            .values(NewBuildingAsset {
                                id: &id,
                                building_id: &building_id,
                                asset_type: key,
                                status: AssetStatus::Pending.as_str(),
                                next_due_date: None,
                                last_renewed_date: None,
                                notes: None,
                                contractor: None,
                                certificate_number: None,
                                document_id: None,
                                calendar_event_id: None,
                                created_at: now.clone(),
                                updated_at: now.clone(),
                            })
                            .execute(conn)
                            .await?;
                        if rows > 0 {
                            created.push(id);
                        }
                    }
                    Ok::<_, DieselError>(created)
                })
            })
            .await?;

        building_compliance_assets::table
            .filter(building_compliance_assets::id.eq_any(&created_ids))
            .order(building_compliance_assets::asset_type.asc())
            .load::<BuildingAssetRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(BuildingAsset::from).collect())
    }

    /// Delete a building asset and its alerts.
    pub async fn delete_asset(&self, id: &str) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;

        conn.transaction(|conn| {
            Box::pin(async move {
                diesel::delete(
                    compliance_alerts::table.filter(compliance_alerts::building_asset_id.eq(id)),
                )
                .execute(conn)
                .await?;

                let rows = diesel::delete(building_compliance_assets::table.find(id))
                    .execute(conn)
                    .await?;

                Ok(rows > 0)
            })
        })
        .await
    }

    /// Commit a confirmed inspection in one transaction.
    ///
    /// Claims the document job (summarized → confirmed, linked to the
    /// building), upserts the (building, asset type) row, inserts one alert
    /// per entry in `write.alerts` and records the decision. Either all of it
    /// lands or none of it does.
    ///
    /// Returns `None` when the job is missing or no longer summarized.
    pub async fn record_inspection(
        &self,
        write: InspectionWrite,
    ) -> Result<Option<RecordedInspection>, DieselError> {
        let mut conn = self.pool.get().await?;

        conn.transaction(|conn| {
            Box::pin(async move {
                let now = Utc::now().to_rfc3339();
                let next_due = format_date(Some(write.next_due_date));
                let last_renewed = format_date(Some(write.last_renewed_date));

                // The claim is the first statement so the write lock is taken
                // before anything is read; concurrent commits queue behind it.
                let claimed = diesel::update(
                    document_jobs::table
                        .find(&write.document_id)
                        .filter(document_jobs::status.eq(JobStatus::Summarized.as_str())),
                )
                .set((
                    document_jobs::building_id.eq(Some(&write.building_id)),
                    document_jobs::status.eq(JobStatus::Confirmed.as_str()),
                    document_jobs::updated_at.eq(&now),
                ))
                .execute(conn)
                .await?;
                if claimed == 0 {
                    return Ok(None);
                }

                let existing = building_compliance_assets::table
                    .filter(building_compliance_assets::building_id.eq(&write.building_id))
                    .filter(building_compliance_assets::asset_type.eq(&write.asset_type))
                    .first::<BuildingAssetRecord>(conn)
                    .await
                    .optional()?;

                let (asset_id, created) = match existing {
                    Some(record) => {
                        diesel::update(building_compliance_assets::table.find(&record.id))
                            .set((
                                building_compliance_assets::status.eq(write.status.as_str()),
                                building_compliance_assets::next_due_date.eq(&next_due),
                                building_compliance_assets::last_renewed_date.eq(&last_renewed),
                                building_compliance_assets::notes.eq(Some(&write.notes)),
                                building_compliance_assets::contractor.eq(&write.contractor),
                                building_compliance_assets::certificate_number
                                    .eq(&write.certificate_number),
                                building_compliance_assets::document_id
                                    .eq(Some(&write.document_id)),
                                building_compliance_assets::updated_at.eq(&now),
                            ))
                            .execute(conn)
                            .await?;
                        (record.id, false)
                    }
                    None => {
                        let id = uuid::Uuid::new_v4().to_string();
                        diesel::insert_into(building_compliance_assets::table)
                            .values(NewBuildingAsset {
                                id: &id,
                                building_id: &write.building_id,
                                asset_type: &write.asset_type,
                                status: write.status.as_str(),
                                next_due_date: next_due.clone(),
                                last_renewed_date: last_renewed.clone(),
                                notes: Some(&write.notes),
                                contractor: write.contractor.as_deref(),
                                certificate_number: write.certificate_number.as_deref(),
                                document_id: Some(&write.document_id),
                                calendar_event_id: None,
                                created_at: now.clone(),
                                updated_at: now.clone(),
                            })
                            .execute(conn)
                            .await?;
                        (id, true)
                    }
                };

                for alert in &write.alerts {
                    let alert_id = uuid::Uuid::new_v4().to_string();
                    diesel::insert_into(compliance_alerts::table)
                        .values(NewComplianceAlert {
                            id: &alert_id,
                            building_id: &write.building_id,
                            building_asset_id: &asset_id,
                            document_id: &write.document_id,
                            alert_type: &alert.alert_type,
                            classification: &alert.classification,
                            message: &alert.message,
                            priority: &alert.priority,
                            status: "open",
                            created_at: &now,
                        })
                        .execute(conn)
                        .await?;
                }

                let decision_id = uuid::Uuid::new_v4().to_string();
                diesel::insert_into(decision_log::table)
                    .values(NewDecisionRecord {
                        id: &decision_id,
                        document_id: &write.document_id,
                        decision: Decision::Confirmed.as_str(),
                        building_id: Some(&write.building_id),
                        reason: None,
                        created_at: &now,
                    })
                    .execute(conn)
                    .await?;

                let record = building_compliance_assets::table
                    .find(&asset_id)
                    .first::<BuildingAssetRecord>(conn)
                    .await?;

                Ok(Some(RecordedInspection {
                    asset: BuildingAsset::from(record),
                    created,
                    alerts_created: write.alerts.len(),
                }))
            })
        })
        .await
    }

    /// Remember the external calendar event created for an asset.
    pub async fn set_calendar_event(
        &self,
        asset_id: &str,
        event_id: &str,
    ) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        let updated_at = Utc::now().to_rfc3339();

        diesel::update(building_compliance_assets::table.find(asset_id))
            .set((
                building_compliance_assets::calendar_event_id.eq(Some(event_id)),
                building_compliance_assets::updated_at.eq(&updated_at),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Open alerts for a building, newest first.
    pub async fn open_alerts(&self, building_id: &str) -> Result<Vec<ComplianceAlert>, DieselError> {
        let mut conn = self.pool.get().await?;

        compliance_alerts::table
            .filter(compliance_alerts::building_id.eq(building_id))
            .filter(compliance_alerts::status.eq("open"))
            .order(compliance_alerts::created_at.desc())
            .load::<ComplianceAlertRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(ComplianceAlert::from).collect())
    }

    /// Count alerts raised from one document.
    pub async fn count_alerts_for_document(&self, document_id: &str) -> Result<u64, DieselError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        let count: i64 = compliance_alerts::table
            .filter(compliance_alerts::document_id.eq(document_id))
            .select(count_star())
            .first(&mut conn)
            .await?;

        Ok(count as u64)
    }
}
