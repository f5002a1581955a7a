//! Diesel-based building and unit repository for SQLite.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{BuildingRecord, NewUnit, UnitRecord};
use super::pool::{AsyncSqlitePool, DieselError};
use super::util::parse_datetime;
use crate::models::{Building, Unit};
use crate::schema::{buildings, units};

impl From<BuildingRecord> for Building {
    fn from(record: BuildingRecord) -> Self {
        Building {
            id: record.id,
            name: record.name,
            address: record.address,
            is_hrb: record.is_hrb != 0,
            created_at: parse_datetime(&record.created_at),
        }
    }
}

impl From<UnitRecord> for Unit {
    fn from(record: UnitRecord) -> Self {
        Unit {
            id: record.id,
            building_id: record.building_id,
            unit_number: record.unit_number,
            floor: record.floor,
            leaseholder_name: record.leaseholder_name,
            leaseholder_email: record.leaseholder_email,
            created_at: parse_datetime(&record.created_at),
        }
    }
}

/// Diesel-based building repository.
#[derive(Clone)]
pub struct DieselBuildingRepository {
    pool: AsyncSqlitePool,
}

impl DieselBuildingRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Get a building by ID.
    pub async fn get(&self, id: &str) -> Result<Option<Building>, DieselError> {
        let mut conn = self.pool.get().await?;

        buildings::table
            .find(id)
            .first::<BuildingRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Building::from))
    }

    /// Find a building by exact name (case-insensitive).
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Building>, DieselError> {
        let all = self.get_all().await?;
        Ok(all
            .into_iter()
            .find(|b| b.name.eq_ignore_ascii_case(name.trim())))
    }

    /// Get all buildings ordered by name.
    pub async fn get_all(&self) -> Result<Vec<Building>, DieselError> {
        let mut conn = self.pool.get().await?;

        buildings::table
            .order(buildings::name.asc())
            .load::<BuildingRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(Building::from).collect())
    }

    /// Save a building (insert or update).
    pub async fn save(&self, building: &Building) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        let created_at = building.created_at.to_rfc3339();

        // Upsert rather than REPLACE: a REPLACE deletes the old row first,
        // which would cascade to units and assets.
        diesel::insert_into(buildings::table)
            .values((
                buildings::id.eq(&building.id),
                buildings::name.eq(&building.name),
                buildings::address.eq(&building.address),
                buildings::is_hrb.eq(building.is_hrb as i32),
                buildings::created_at.eq(&created_at),
            ))
            .on_conflict(buildings::id)
            .do_update()
            .set((
                buildings::name.eq(&building.name),
                buildings::address.eq(&building.address),
                buildings::is_hrb.eq(building.is_hrb as i32),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Check if a building exists.
    pub async fn exists(&self, id: &str) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        let count: i64 = buildings::table
            .filter(buildings::id.eq(id))
            .select(count_star())
            .first(&mut conn)
            .await?;

        Ok(count > 0)
    }

    /// Units of a building ordered by unit number.
    pub async fn units(&self, building_id: &str) -> Result<Vec<Unit>, DieselError> {
        let mut conn = self.pool.get().await?;

        units::table
            .filter(units::building_id.eq(building_id))
            .order(units::unit_number.asc())
            .load::<UnitRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(Unit::from).collect())
    }

    /// Add a unit to a building.
    pub async fn add_unit(&self, unit: &Unit) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        let created_at = unit.created_at.to_rfc3339();

        diesel::insert_into(units::table)
            .values(NewUnit {
                id: &unit.id,
                building_id: &unit.building_id,
                unit_number: &unit.unit_number,
                floor: unit.floor.as_deref(),
                leaseholder_name: unit.leaseholder_name.as_deref(),
                leaseholder_email: unit.leaseholder_email.as_deref(),
                created_at: &created_at,
            })
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::DbContext;
    use tempfile::tempdir;

    async fn setup_test_db() -> (DbContext, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_path(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        (ctx, dir)
    }

    #[tokio::test]
    async fn test_building_crud() {
        let (ctx, _dir) = setup_test_db().await;
        let repo = ctx.buildings();

        let building = Building::new("Ashwood House", Some("1 Ashwood Lane".to_string()), false);
        repo.save(&building).await.unwrap();

        let fetched = repo.get(&building.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Ashwood House");
        assert!(!fetched.is_hrb);
        assert!(repo.exists(&building.id).await.unwrap());
        assert!(repo.get("missing").await.unwrap().is_none());

        let by_name = repo.find_by_name("ashwood house").await.unwrap();
        assert_eq!(by_name.map(|b| b.id), Some(building.id.clone()));
    }

    #[tokio::test]
    async fn test_units_are_scoped_to_building() {
        let (ctx, _dir) = setup_test_db().await;
        let repo = ctx.buildings();

        let ashwood = Building::new("Ashwood House", None, false);
        let birch = Building::new("Birch Court", None, true);
        repo.save(&ashwood).await.unwrap();
        repo.save(&birch).await.unwrap();

        let mut flat3 = Unit::new(&ashwood.id, "Flat 3");
        flat3.leaseholder_name = Some("J. Okafor".to_string());
        repo.add_unit(&flat3).await.unwrap();
        repo.add_unit(&Unit::new(&ashwood.id, "Flat 1")).await.unwrap();
        repo.add_unit(&Unit::new(&birch.id, "Flat 1")).await.unwrap();

        let units = repo.units(&ashwood.id).await.unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].unit_number, "Flat 1");
        assert_eq!(units[1].leaseholder_name.as_deref(), Some("J. Okafor"));

        // Same unit number twice in one building is rejected.
        assert!(repo.add_unit(&Unit::new(&ashwood.id, "Flat 3")).await.is_err());
    }
}
