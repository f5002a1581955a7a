//! Database context for managing the connection factory and repository access.

use std::path::Path;

use diesel_async::SimpleAsyncConnection;

use super::buildings::DieselBuildingRepository;
use super::compliance::DieselComplianceRepository;
use super::decisions::DieselDecisionRepository;
use super::documents::DieselDocumentJobRepository;
use super::pool::{AsyncSqlitePool, DieselError};

/// Database context that hands out repositories sharing one connection
/// factory.
///
/// # Example
/// ```ignore
/// let ctx = DbContext::from_url("sqlite:blociq.db");
/// ctx.init_schema().await?;
/// let buildings = ctx.buildings().get_all().await?;
/// ```
#[derive(Clone)]
pub struct DbContext {
    pool: AsyncSqlitePool,
}

impl DbContext {
    /// Create a new database context from a SQLite file path.
    pub fn from_path(db_path: &Path) -> Self {
        Self {
            pool: AsyncSqlitePool::from_path(db_path),
        }
    }

    /// Create a new database context from a `sqlite:` URL or bare path.
    pub fn from_url(database_url: &str) -> Self {
        Self {
            pool: AsyncSqlitePool::new(database_url),
        }
    }

    /// Get the underlying connection factory.
    pub fn pool(&self) -> &AsyncSqlitePool {
        &self.pool
    }

    pub fn buildings(&self) -> DieselBuildingRepository {
        DieselBuildingRepository::new(self.pool.clone())
    }

    pub fn documents(&self) -> DieselDocumentJobRepository {
        DieselDocumentJobRepository::new(self.pool.clone())
    }

    pub fn compliance(&self) -> DieselComplianceRepository {
        DieselComplianceRepository::new(self.pool.clone())
    }

    pub fn decisions(&self) -> DieselDecisionRepository {
        DieselDecisionRepository::new(self.pool.clone())
    }

    /// Create all tables if they don't exist.
    pub async fn init_schema(&self) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute(
            r#"
            PRAGMA journal_mode = WAL;

            -- Buildings
            CREATE TABLE IF NOT EXISTS buildings (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                address TEXT,
                is_hrb INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            -- Units within buildings
            CREATE TABLE IF NOT EXISTS units (
                id TEXT PRIMARY KEY,
                building_id TEXT NOT NULL,
                unit_number TEXT NOT NULL,
                floor TEXT,
                leaseholder_name TEXT,
                leaseholder_email TEXT,
                created_at TEXT NOT NULL,
                UNIQUE(building_id, unit_number),
                FOREIGN KEY (building_id) REFERENCES buildings(id) ON DELETE CASCADE
            );

            -- Uploaded documents and their analysis
            CREATE TABLE IF NOT EXISTS document_jobs (
                id TEXT PRIMARY KEY,
                filename TEXT NOT NULL,
                content_hash TEXT NOT NULL,
                file_size INTEGER NOT NULL,
                mime_type TEXT NOT NULL,
                page_count INTEGER,
                text_status TEXT NOT NULL DEFAULT 'pending',
                extraction_method TEXT,
                extracted_text TEXT,
                summary_json TEXT,
                building_id TEXT,
                status TEXT NOT NULL DEFAULT 'uploaded',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (building_id) REFERENCES buildings(id)
            );

            -- One row per (building, asset type)
            CREATE TABLE IF NOT EXISTS building_compliance_assets (
                id TEXT PRIMARY KEY,
                building_id TEXT NOT NULL,
                asset_type TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                next_due_date TEXT,
                last_renewed_date TEXT,
                notes TEXT,
                contractor TEXT,
                certificate_number TEXT,
                document_id TEXT,
                calendar_event_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(building_id, asset_type),
                FOREIGN KEY (building_id) REFERENCES buildings(id) ON DELETE CASCADE
            );

            -- Alerts for urgent findings
            CREATE TABLE IF NOT EXISTS compliance_alerts (
                id TEXT PRIMARY KEY,
                building_id TEXT NOT NULL,
                building_asset_id TEXT NOT NULL,
                document_id TEXT NOT NULL,
                alert_type TEXT NOT NULL,
                classification TEXT NOT NULL,
                message TEXT NOT NULL,
                priority TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'open',
                created_at TEXT NOT NULL,
                FOREIGN KEY (building_asset_id) REFERENCES building_compliance_assets(id) ON DELETE CASCADE
            );

            -- Confirm/decline audit trail
            CREATE TABLE IF NOT EXISTS decision_log (
                id TEXT PRIMARY KEY,
                document_id TEXT NOT NULL,
                decision TEXT NOT NULL,
                building_id TEXT,
                reason TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_units_building ON units(building_id);
            CREATE INDEX IF NOT EXISTS idx_jobs_hash ON document_jobs(content_hash);
            CREATE INDEX IF NOT EXISTS idx_alerts_building ON compliance_alerts(building_id, status);
            CREATE INDEX IF NOT EXISTS idx_decisions_document ON decision_log(document_id);
            "#,
        )
        .await
    }
}
