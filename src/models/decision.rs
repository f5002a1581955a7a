//! Audit entries for confirmation decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Confirmed,
    Declined,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Declined => "declined",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(Self::Confirmed),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub id: String,
    pub document_id: String,
    pub decision: Decision,
    pub building_id: Option<String>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DecisionRecord {
    pub fn new(
        document_id: &str,
        decision: Decision,
        building_id: Option<&str>,
        reason: Option<&str>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            document_id: document_id.to_string(),
            decision,
            building_id: building_id.map(str::to_string),
            reason: reason.map(str::to_string),
            created_at: Utc::now(),
        }
    }
}
