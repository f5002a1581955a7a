//! Building-scoped compliance assets and the alerts raised against them.

use std::sync::LazyLock;

use chrono::{DateTime, Months, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::summary::InspectionOutcome;

/// A kind of tracked regulatory obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssetType {
    /// Stable identifier stored in the database.
    pub key: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub frequency_months: u32,
    /// Only mandatory for high-risk buildings.
    pub hrb_only: bool,
}

/// Every asset type the system knows about.
pub const ASSET_TYPES: &[AssetType] = &[
    AssetType {
        key: "eicr",
        name: "Electrical Installation Condition Report",
        category: "electrical",
        frequency_months: 60,
        hrb_only: false,
    },
    AssetType {
        key: "fire_risk_assessment",
        name: "Fire Risk Assessment",
        category: "fire_safety",
        frequency_months: 12,
        hrb_only: false,
    },
    AssetType {
        key: "gas_safety",
        name: "Gas Safety Check",
        category: "gas",
        frequency_months: 12,
        hrb_only: false,
    },
    AssetType {
        key: "asbestos_survey",
        name: "Asbestos Survey",
        category: "health_safety",
        frequency_months: 12,
        hrb_only: false,
    },
    AssetType {
        key: "legionella",
        name: "Legionella Risk Assessment",
        category: "water",
        frequency_months: 12,
        hrb_only: false,
    },
    AssetType {
        key: "fire_alarm",
        name: "Fire Alarm Test",
        category: "fire_safety",
        frequency_months: 12,
        hrb_only: false,
    },
    AssetType {
        key: "emergency_lighting",
        name: "Emergency Lighting Test",
        category: "fire_safety",
        frequency_months: 12,
        hrb_only: false,
    },
    AssetType {
        key: "fire_door",
        name: "Fire Door Inspection",
        category: "fire_safety",
        frequency_months: 12,
        hrb_only: false,
    },
    AssetType {
        key: "lift_loler",
        name: "Lift Thorough Examination",
        category: "lifts",
        frequency_months: 6,
        hrb_only: false,
    },
    AssetType {
        key: "building_safety_case",
        name: "Building Safety Case Report",
        category: "building_safety",
        frequency_months: 24,
        hrb_only: true,
    },
    AssetType {
        key: "safety_case_review",
        name: "Resident Engagement Strategy Review",
        category: "building_safety",
        frequency_months: 12,
        hrb_only: true,
    },
];

/// Document type patterns in match order, whole words only.
static DOCUMENT_TYPE_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("eicr", r"\beicr\b|\belectrical installation\b"),
        ("fire_risk_assessment", r"\bfire risk\b|\bfra\b"),
        ("gas_safety", r"\bgas\b"),
        ("asbestos_survey", r"\basbestos\b"),
        ("legionella", r"\blegionella\b|\bwater hygiene\b"),
        ("fire_alarm", r"\bfire alarms?\b"),
        ("emergency_lighting", r"\bemergency light(?:s|ing)?\b"),
        ("fire_door", r"\bfire doors?\b"),
        ("lift_loler", r"\blifts?\b|\bloler\b"),
        ("building_safety_case", r"\bsafety case\b"),
    ]
    .into_iter()
    .map(|(key, pattern)| {
        let re = Regex::new(&format!("(?i){}", pattern)).expect("valid document type regex");
        (key, re)
    })
    .collect()
});

impl AssetType {
    pub fn by_key(key: &str) -> Option<&'static AssetType> {
        ASSET_TYPES.iter().find(|t| t.key == key)
    }

    /// Map an analysed document type onto the asset it evidences.
    pub fn for_document_type(document_type: &str) -> Option<&'static AssetType> {
        let t = document_type.trim();
        DOCUMENT_TYPE_PATTERNS
            .iter()
            .find(|(_, re)| re.is_match(t))
            .and_then(|(key, _)| Self::by_key(key))
    }

    /// Asset types every building must track.
    pub fn mandatory_for(is_hrb: bool) -> impl Iterator<Item = &'static AssetType> {
        ASSET_TYPES.iter().filter(move |t| is_hrb || !t.hrb_only)
    }

    /// Default next due date after a renewal.
    pub fn next_due_after(&self, renewed: NaiveDate) -> NaiveDate {
        renewed
            .checked_add_months(Months::new(self.frequency_months))
            .unwrap_or(renewed)
    }
}

/// Status of a building compliance asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    Pending,
    Compliant,
    Overdue,
    DueSoon,
}

/// A compliant asset due within this many days is reported as due soon.
pub const DUE_SOON_DAYS: i64 = 30;

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Compliant => "compliant",
            Self::Overdue => "overdue",
            Self::DueSoon => "due_soon",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "compliant" => Some(Self::Compliant),
            "overdue" => Some(Self::Overdue),
            "due_soon" => Some(Self::DueSoon),
            _ => None,
        }
    }

    /// Status after recording an inspection.
    pub fn from_inspection(
        outcome: InspectionOutcome,
        next_due: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Self {
        if let Some(due) = next_due {
            if due < today {
                return Self::Overdue;
            }
        }

        match outcome {
            InspectionOutcome::Unsatisfactory => Self::Overdue,
            InspectionOutcome::Unknown => Self::Pending,
            InspectionOutcome::Satisfactory => match next_due {
                Some(due) if (due - today).num_days() <= DUE_SOON_DAYS => Self::DueSoon,
                _ => Self::Compliant,
            },
        }
    }
}

/// One tracked obligation for one building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingAsset {
    pub id: String,
    pub building_id: String,
    pub asset_type: String,
    pub status: AssetStatus,
    pub next_due_date: Option<NaiveDate>,
    pub last_renewed_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub contractor: Option<String>,
    pub certificate_number: Option<String>,
    /// Document whose analysis last updated this row.
    pub document_id: Option<String>,
    /// Identifier of the external calendar reminder, once created.
    pub calendar_event_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BuildingAsset {
    /// A freshly tracked asset with no inspection recorded yet.
    pub fn pending(building_id: &str, asset_type: &AssetType) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            building_id: building_id.to_string(),
            asset_type: asset_type.key.to_string(),
            status: AssetStatus::Pending,
            next_due_date: None,
            last_renewed_date: None,
            notes: None,
            contractor: None,
            certificate_number: None,
            document_id: None,
            calendar_event_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn asset_type(&self) -> Option<&'static AssetType> {
        AssetType::by_key(&self.asset_type)
    }

    /// Display name, falling back to the stored key.
    pub fn display_name(&self) -> &str {
        self.asset_type().map(|t| t.name).unwrap_or(&self.asset_type)
    }

    /// Status as of `today`, accounting for dates that have passed since the
    /// row was written.
    pub fn effective_status(&self, today: NaiveDate) -> AssetStatus {
        match (self.status, self.next_due_date) {
            (AssetStatus::Pending, _) | (_, None) => self.status,
            (_, Some(due)) if due < today => AssetStatus::Overdue,
            (AssetStatus::Compliant, Some(due)) if (due - today).num_days() <= DUE_SOON_DAYS => {
                AssetStatus::DueSoon
            }
            (status, _) => status,
        }
    }
}

/// An alert raised for an urgent finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceAlert {
    pub id: String,
    pub building_id: String,
    pub building_asset_id: String,
    pub document_id: String,
    pub alert_type: String,
    pub classification: String,
    pub message: String,
    pub priority: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
