//! Buildings and the units inside them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    /// High-risk building under the Building Safety Act.
    pub is_hrb: bool,
    pub created_at: DateTime<Utc>,
}

impl Building {
    pub fn new(name: impl Into<String>, address: Option<String>, is_hrb: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            address,
            is_hrb,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub building_id: String,
    pub unit_number: String,
    pub floor: Option<String>,
    pub leaseholder_name: Option<String>,
    pub leaseholder_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Unit {
    pub fn new(building_id: &str, unit_number: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            building_id: building_id.to_string(),
            unit_number: unit_number.into(),
            floor: None,
            leaseholder_name: None,
            leaseholder_email: None,
            created_at: Utc::now(),
        }
    }
}
