//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM over SQLite through diesel-async's
//! SyncConnectionWrapper.

pub mod buildings;
pub mod compliance;
pub mod context;
pub mod decisions;
pub mod documents;
pub mod models;
pub mod pool;
pub mod util;

pub use buildings::DieselBuildingRepository;
pub use compliance::{AlertWrite, DieselComplianceRepository, InspectionWrite, RecordedInspection};
pub use context::DbContext;
pub use decisions::DieselDecisionRepository;
pub use documents::DieselDocumentJobRepository;
pub use pool::{AsyncSqlitePool, DieselError};
