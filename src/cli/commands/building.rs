//! Building and unit management commands.

use console::style;

use crate::config::Settings;
use crate::models::{Building, Unit};
use crate::workflow::register_building;

use super::helpers::{open_db, print_snapshot};

pub async fn cmd_building_add(
    settings: &Settings,
    name: &str,
    address: Option<String>,
    is_hrb: bool,
    track_mandatory: bool,
) -> anyhow::Result<()> {
    let db = open_db(settings).await?;
    let building = Building::new(name.trim(), address, is_hrb);

    let snapshot = register_building(&db, building, track_mandatory).await?;
    println!(
        "{} Added building {} ({})",
        style("✓").green(),
        snapshot.building.name,
        snapshot.building.id
    );
    if track_mandatory {
        print_snapshot(&snapshot);
    }
    Ok(())
}

pub async fn cmd_building_list(settings: &Settings) -> anyhow::Result<()> {
    let db = open_db(settings).await?;
    let buildings = db.buildings().get_all().await?;

    if buildings.is_empty() {
        println!("{} No buildings registered", style("!").yellow());
        println!("  Add one with: blociq building add \"Ashwood House\"");
        return Ok(());
    }

    println!("\n{}", style("Buildings").bold());
    println!("{}", "-".repeat(70));
    for building in buildings {
        let hrb = if building.is_hrb {
            style("HRB").red().to_string()
        } else {
            String::new()
        };
        println!(
            "  {:<30} {:<4} {}",
            building.name,
            hrb,
            style(&building.id).dim()
        );
        if let Some(address) = &building.address {
            println!("    {}", style(address).dim());
        }
    }
    Ok(())
}

pub async fn cmd_building_units(settings: &Settings, building_id: &str) -> anyhow::Result<()> {
    let db = open_db(settings).await?;
    let building = db
        .buildings()
        .get(building_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Building not found: {}", building_id))?;
    let units = db.buildings().units(building_id).await?;

    println!("\n{} ({} units)", style(&building.name).bold(), units.len());
    for unit in units {
        let floor = unit
            .floor
            .as_deref()
            .map(|f| format!("floor {}", f))
            .unwrap_or_default();
        let leaseholder = match (&unit.leaseholder_name, &unit.leaseholder_email) {
            (Some(name), Some(email)) => format!("{} <{}>", name, email),
            (Some(name), None) => name.clone(),
            (None, Some(email)) => email.clone(),
            (None, None) => "-".to_string(),
        };
        println!("  {:<10} {:<10} {}", unit.unit_number, floor, leaseholder);
    }
    Ok(())
}

pub async fn cmd_building_add_unit(
    settings: &Settings,
    building_id: &str,
    unit_number: &str,
    floor: Option<String>,
    leaseholder_name: Option<String>,
    leaseholder_email: Option<String>,
) -> anyhow::Result<()> {
    let db = open_db(settings).await?;
    if !db.buildings().exists(building_id).await? {
        anyhow::bail!("Building not found: {}", building_id);
    }

    let unit = Unit {
        floor,
        leaseholder_name,
        leaseholder_email,
        ..Unit::new(building_id, unit_number.trim())
    };
    db.buildings().add_unit(&unit).await?;
    println!("{} Added unit {}", style("✓").green(), unit.unit_number);
    Ok(())
}
