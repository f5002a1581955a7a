//! Data models for BlocIQ.

mod building;
mod compliance;
mod confidence;
mod decision;
mod document_job;
mod finding;
mod selection;
mod snapshot;
mod summary;

pub use building::{Building, Unit};
pub use compliance::{AssetStatus, AssetType, BuildingAsset, ComplianceAlert, ASSET_TYPES};
pub use confidence::Confidence;
pub use decision::{Decision, DecisionRecord};
pub use document_job::{DocumentJob, JobStatus, TextStatus};
pub use finding::{Finding, KeyFindings, Severity};
pub use selection::AssetSelection;
pub use snapshot::{BuildingComplianceSnapshot, ComplianceBoard};
pub use summary::{
    parse_date_lenient, InspectionDetails, InspectionOutcome, PropertyDetails, Recommendation,
    StructuredSummary, SUMMARY_SCHEMA_VERSION,
};
