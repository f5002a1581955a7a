//! Fresh per-building views returned after every mutation.
//!
//! Callers replace their copy of the affected building with the snapshot
//! instead of reloading everything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::building::Building;
use super::compliance::{BuildingAsset, ComplianceAlert};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingComplianceSnapshot {
    pub building: Building,
    pub assets: Vec<BuildingAsset>,
    pub open_alerts: Vec<ComplianceAlert>,
    pub fetched_at: DateTime<Utc>,
}

/// Compliance state for several buildings, keyed by building id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplianceBoard {
    pub buildings: Vec<BuildingComplianceSnapshot>,
}

impl ComplianceBoard {
    /// Replace the entry for the snapshot's building, or append it.
    ///
    /// A snapshot older than the entry it would replace is ignored.
    #[must_use]
    pub fn merge(&self, snapshot: BuildingComplianceSnapshot) -> Self {
        let mut buildings = self.buildings.clone();
        match buildings
            .iter_mut()
            .find(|s| s.building.id == snapshot.building.id)
        {
            Some(existing) if existing.fetched_at > snapshot.fetched_at => {}
            Some(existing) => *existing = snapshot,
            None => buildings.push(snapshot),
        }
        Self { buildings }
    }

    pub fn get(&self, building_id: &str) -> Option<&BuildingComplianceSnapshot> {
        self.buildings.iter().find(|s| s.building.id == building_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssetType, BuildingAsset};
    use chrono::Duration;

    fn snapshot(building: &Building, assets: usize, at: DateTime<Utc>) -> BuildingComplianceSnapshot {
        let eicr = AssetType::by_key("eicr").unwrap();
        BuildingComplianceSnapshot {
            building: building.clone(),
            assets: (0..assets)
                .map(|_| BuildingAsset::pending(&building.id, eicr))
                .collect(),
            open_alerts: Vec::new(),
            fetched_at: at,
        }
    }

    #[test]
    fn test_merge_replaces_only_affected_building() {
        let now = Utc::now();
        let ashwood = Building::new("Ashwood House", None, false);
        let birch = Building::new("Birch Court", None, true);

        let board = ComplianceBoard::default()
            .merge(snapshot(&ashwood, 1, now))
            .merge(snapshot(&birch, 3, now));

        let updated = board.merge(snapshot(&ashwood, 2, now + Duration::seconds(5)));
        assert_eq!(updated.get(&ashwood.id).unwrap().assets.len(), 2);
        assert_eq!(updated.get(&birch.id).unwrap().assets.len(), 3);
        assert_eq!(board.get(&ashwood.id).unwrap().assets.len(), 1);
        assert_eq!(updated.buildings.len(), 2);
    }

    #[test]
    fn test_merge_ignores_stale_snapshot() {
        let now = Utc::now();
        let ashwood = Building::new("Ashwood House", None, false);
        let board = ComplianceBoard::default().merge(snapshot(&ashwood, 2, now));
        let merged = board.merge(snapshot(&ashwood, 0, now - Duration::seconds(30)));
        assert_eq!(merged.get(&ashwood.id).unwrap().assets.len(), 2);
    }
}
