//! Compliance asset commands.

use console::style;

use crate::config::Settings;
use crate::models::{AssetSelection, ASSET_TYPES};
use crate::workflow::{compliance_snapshot, track_assets, untrack_asset};

use super::helpers::{open_db, print_snapshot};

pub fn cmd_assets_types() -> anyhow::Result<()> {
    println!("\n{}", style("Asset types").bold());
    println!("{}", "-".repeat(78));
    for t in ASSET_TYPES {
        let hrb = if t.hrb_only { " (HRB)" } else { "" };
        println!(
            "  {:<24} {:<42} every {} months{}",
            t.key, t.name, t.frequency_months, hrb
        );
    }
    Ok(())
}

pub async fn cmd_assets_list(settings: &Settings, building_id: &str) -> anyhow::Result<()> {
    let db = open_db(settings).await?;
    let building = db
        .buildings()
        .get(building_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Building not found: {}", building_id))?;

    print_snapshot(&compliance_snapshot(&db, building).await?);
    Ok(())
}

pub async fn cmd_assets_add(
    settings: &Settings,
    building_id: &str,
    asset_types: &[String],
) -> anyhow::Result<()> {
    let db = open_db(settings).await?;
    let selection: AssetSelection = asset_types.iter().map(String::as_str).collect();

    let (created, snapshot) = track_assets(&db, building_id, &selection).await?;
    println!(
        "{} Tracking {} new asset type(s)",
        style("✓").green(),
        created.len()
    );
    print_snapshot(&snapshot);
    Ok(())
}

pub async fn cmd_assets_remove(settings: &Settings, asset_id: &str) -> anyhow::Result<()> {
    let db = open_db(settings).await?;
    let snapshot = untrack_asset(&db, asset_id).await?;
    println!("{} Removed asset {}", style("✓").green(), asset_id);
    print_snapshot(&snapshot);
    Ok(())
}
