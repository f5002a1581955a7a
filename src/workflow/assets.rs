//! Building registration and manual asset tracking.
//!
//! Each mutation returns a fresh snapshot of the affected building.

use thiserror::Error;
use tracing::info;

use super::sink::compliance_snapshot;
use crate::models::{AssetSelection, AssetType, Building, BuildingAsset, BuildingComplianceSnapshot};
use crate::repository::{DbContext, DieselError};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Building not found: {0}")]
    BuildingNotFound(String),

    #[error("Building asset not found: {0}")]
    AssetNotFound(String),

    #[error("Unknown asset type: {0}")]
    UnknownAssetType(String),

    #[error("Building name must not be empty")]
    EmptyName,

    #[error("Database error: {0}")]
    Database(#[from] DieselError),
}

/// Keys of the asset types every building of this kind must track.
pub fn mandatory_selection(is_hrb: bool) -> AssetSelection {
    AssetType::mandatory_for(is_hrb).map(|t| t.key).collect()
}

/// Save a new building, optionally tracking its mandatory asset types.
pub async fn register_building(
    db: &DbContext,
    building: Building,
    track_mandatory: bool,
) -> Result<BuildingComplianceSnapshot, AssetError> {
    if building.name.trim().is_empty() {
        return Err(AssetError::EmptyName);
    }
    db.buildings().save(&building).await?;
    info!("Registered building {} ({})", building.name, building.id);

    if track_mandatory {
        let selection = mandatory_selection(building.is_hrb);
        db.compliance().add_assets(&building.id, &selection).await?;
    }
    Ok(compliance_snapshot(db, building).await?)
}

/// Start tracking the selected asset types for a building.
///
/// Types already tracked are skipped; only new rows are returned.
pub async fn track_assets(
    db: &DbContext,
    building_id: &str,
    selection: &AssetSelection,
) -> Result<(Vec<BuildingAsset>, BuildingComplianceSnapshot), AssetError> {
    if let Some(unknown) = selection.iter().find(|key| AssetType::by_key(key).is_none()) {
        return Err(AssetError::UnknownAssetType(unknown.to_string()));
    }
    let building = db
        .buildings()
        .get(building_id)
        .await?
        .ok_or_else(|| AssetError::BuildingNotFound(building_id.to_string()))?;

    let already = db.compliance().tracked_types(building_id).await?;
    let wanted = selection.subtract(&already);
    let created = if wanted.is_empty() {
        Vec::new()
    } else {
        db.compliance().add_assets(building_id, &wanted).await?
    };

    Ok((created, compliance_snapshot(db, building).await?))
}

/// Stop tracking one asset, removing its alerts.
pub async fn untrack_asset(
    db: &DbContext,
    asset_id: &str,
) -> Result<BuildingComplianceSnapshot, AssetError> {
    let asset = db
        .compliance()
        .get_asset(asset_id)
        .await?
        .ok_or_else(|| AssetError::AssetNotFound(asset_id.to_string()))?;
    if !db.compliance().delete_asset(asset_id).await? {
        return Err(AssetError::AssetNotFound(asset_id.to_string()));
    }
    info!("Removed {} from building {}", asset.display_name(), asset.building_id);

    let building = db
        .buildings()
        .get(&asset.building_id)
        .await?
        .ok_or_else(|| AssetError::BuildingNotFound(asset.building_id.clone()))?;
    Ok(compliance_snapshot(db, building).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup() -> (DbContext, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = DbContext::from_path(&dir.path().join("test.db"));
        db.init_schema().await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn test_register_building_tracks_mandatory_assets() {
        let (db, _dir) = setup().await;
        let building = Building::new("Birch Court", None, true);

        let snapshot = register_building(&db, building, true).await.unwrap();
        assert_eq!(snapshot.assets.len(), mandatory_selection(true).len());
        assert!(snapshot
            .assets
            .iter()
            .any(|a| a.asset_type == "building_safety_case"));
    }

    #[tokio::test]
    async fn test_register_building_rejects_blank_name() {
        let (db, _dir) = setup().await;
        let result = register_building(&db, Building::new("  ", None, false), false).await;
        assert!(matches!(result, Err(AssetError::EmptyName)));
    }

    #[tokio::test]
    async fn test_track_assets_skips_existing_and_rejects_unknown() {
        let (db, _dir) = setup().await;
        let building = Building::new("Ashwood House", None, false);
        register_building(&db, building.clone(), false).await.unwrap();

        let first: AssetSelection = ["eicr"].into_iter().collect();
        let (created, _) = track_assets(&db, &building.id, &first).await.unwrap();
        assert_eq!(created.len(), 1);

        let second = first.toggle("gas_safety");
        let (created, snapshot) = track_assets(&db, &building.id, &second).await.unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].asset_type, "gas_safety");
        assert_eq!(snapshot.assets.len(), 2);

        let bogus: AssetSelection = ["moat_inspection"].into_iter().collect();
        let result = track_assets(&db, &building.id, &bogus).await;
        assert!(matches!(result, Err(AssetError::UnknownAssetType(_))));
    }

    #[tokio::test]
    async fn test_untrack_asset_returns_fresh_snapshot() {
        let (db, _dir) = setup().await;
        let building = Building::new("Ashwood House", None, false);
        register_building(&db, building.clone(), false).await.unwrap();
        let selection: AssetSelection = ["eicr", "fire_door"].into_iter().collect();
        let (created, _) = track_assets(&db, &building.id, &selection).await.unwrap();

        let snapshot = untrack_asset(&db, &created[0].id).await.unwrap();
        assert_eq!(snapshot.assets.len(), 1);

        let again = untrack_asset(&db, &created[0].id).await;
        assert!(matches!(again, Err(AssetError::AssetNotFound(_))));
    }
}
