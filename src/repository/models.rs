//! Diesel ORM models for database tables.
//!
//! Timestamps are RFC 3339 text and dates are `YYYY-MM-DD` text; the
//! repositories convert to chrono types at the boundary.

use diesel::prelude::*;

use crate::schema;

/// Building record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::buildings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BuildingRecord {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub is_hrb: i32,
    pub created_at: String,
}

/// Unit record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::units)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UnitRecord {
    pub id: String,
    pub building_id: String,
    pub unit_number: String,
    pub floor: Option<String>,
    pub leaseholder_name: Option<String>,
    pub leaseholder_email: Option<String>,
    pub created_at: String,
}

/// New unit for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::units)]
pub struct NewUnit<'a> {
    pub id: &'a str,
    pub building_id: &'a str,
    pub unit_number: &'a str,
    pub floor: Option<&'a str>,
    pub leaseholder_name: Option<&'a str>,
    pub leaseholder_email: Option<&'a str>,
    pub created_at: &'a str,
}

/// Document job record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::document_jobs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DocumentJobRecord {
    pub id: String,
    pub filename: String,
    pub content_hash: String,
    pub file_size: i64,
    pub mime_type: String,
    pub page_count: Option<i32>,
    pub text_status: String,
    pub extraction_method: Option<String>,
    pub extracted_text: Option<String>,
    pub summary_json: Option<String>,
    pub building_id: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Building compliance asset record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::building_compliance_assets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BuildingAssetRecord {
    pub id: String,
    pub building_id: String,
    pub asset_type: String,
    pub status: String,
    pub next_due_date: Option<String>,
    pub last_renewed_date: Option<String>,
    pub notes: Option<String>,
    pub contractor: Option<String>,
    pub certificate_number: Option<String>,
    pub document_id: Option<String>,
    pub calendar_event_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// New building compliance asset for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::building_compliance_assets)]
pub struct NewBuildingAsset<'a> {
    pub id: &'a str,
    pub building_id: &'a str,
    pub asset_type: &'a str,
    pub status: &'a str,
    pub next_due_date: Option<String>,
    pub last_renewed_date: Option<String>,
    pub notes: Option<&'a str>,
    pub contractor: Option<&'a str>,
    pub certificate_number: Option<&'a str>,
    pub document_id: Option<&'a str>,
    pub calendar_event_id: Option<&'a str>,
    pub created_at: String,
    pub updated_at: String,
}

/// Compliance alert record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::compliance_alerts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ComplianceAlertRecord {
    pub id: String,
    pub building_id: String,
    pub building_asset_id: String,
    pub document_id: String,
    pub alert_type: String,
    pub classification: String,
    pub message: String,
    pub priority: String,
    pub status: String,
    pub created_at: String,
}

/// New compliance alert for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::compliance_alerts)]
pub struct NewComplianceAlert<'a> {
    pub id: &'a str,
    pub building_id: &'a str,
    pub building_asset_id: &'a str,
    pub document_id: &'a str,
    pub alert_type: &'a str,
    pub classification: &'a str,
    pub message: &'a str,
    pub priority: &'a str,
    pub status: &'a str,
    pub created_at: &'a str,
}

/// Decision log record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::decision_log)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DecisionRecordRow {
    pub id: String,
    pub document_id: String,
    pub decision: String,
    pub building_id: Option<String>,
    pub reason: Option<String>,
    pub created_at: String,
}

/// New decision log entry for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::decision_log)]
pub struct NewDecisionRecord<'a> {
    pub id: &'a str,
    pub document_id: &'a str,
    pub decision: &'a str,
    pub building_id: Option<&'a str>,
    pub reason: Option<&'a str>,
    pub created_at: &'a str,
}
