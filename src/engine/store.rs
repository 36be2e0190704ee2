use dashmap::DashMap;
use serde::Deserialize;
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;

use super::BookingError;

/// Registry of everything that can be booked.
pub struct Catalog {
    facility_types: DashMap<Ulid, FacilityType>,
    facilities: DashMap<Ulid, SportFacility>,
    equipment_types: DashMap<Ulid, EquipmentType>,
    units: DashMap<Ulid, Equipment>,
    /// Equipment type → its units, in insertion order.
    pools: DashMap<Ulid, Vec<Ulid>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            facility_types: DashMap::new(),
            facilities: DashMap::new(),
            equipment_types: DashMap::new(),
            units: DashMap::new(),
            pools: DashMap::new(),
        }
    }

    // ── Facilities ───────────────────────────────────────────

    pub fn add_facility_type(&self, ty: FacilityType) -> Result<Ulid, BookingError> {
        if ty.name.len() > MAX_NAME_LEN {
            return Err(BookingError::LimitExceeded("facility type name too long"));
        }
        let id = ty.id;
        self.facility_types.insert(id, ty);
        Ok(id)
    }

    pub fn add_facility(&self, facility: SportFacility) -> Result<Ulid, BookingError> {
        if facility.name.len() > MAX_NAME_LEN {
            return Err(BookingError::LimitExceeded("facility name too long"));
        }
        if !self.facility_types.contains_key(&facility.facility_type) {
            return Err(BookingError::ResourceNotFound(facility.facility_type));
        }
        let id = facility.id;
        self.facilities.insert(id, facility);
        Ok(id)
    }

    pub fn set_facility_status(&self, id: &Ulid, status: FacilityStatus) -> Result<(), BookingError> {
        let mut facility = self
            .facilities
            .get_mut(id)
            .ok_or(BookingError::ResourceNotFound(*id))?;
        facility.status = status;
        Ok(())
    }

    pub fn contains_facility(&self, id: &Ulid) -> bool {
        self.facilities.contains_key(id)
    }

    pub fn facility(&self, id: &Ulid) -> Option<SportFacility> {
        self.facilities.get(id).map(|e| e.value().clone())
    }

    pub fn facility_status(&self, id: &Ulid) -> Option<FacilityStatus> {
        self.facilities.get(id).map(|e| e.status)
    }

    pub fn facility_type(&self, id: &Ulid) -> Option<FacilityType> {
        self.facility_types.get(id).map(|e| e.value().clone())
    }

    /// All facilities, ordered by name.
    pub fn facilities(&self) -> Vec<SportFacility> {
        let mut all: Vec<SportFacility> = self.facilities.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn facility_by_name(&self, name: &str) -> Option<SportFacility> {
        self.facilities
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value().clone())
    }

    // ── Equipment ────────────────────────────────────────────

    pub fn add_equipment_type(&self, ty: EquipmentType) -> Result<Ulid, BookingError> {
        if ty.name.len() > MAX_NAME_LEN || ty.short_name.len() > MAX_NAME_LEN {
            return Err(BookingError::LimitExceeded("equipment type name too long"));
        }
        let id = ty.id;
        self.equipment_types.insert(id, ty);
        self.pools.entry(id).or_default();
        Ok(id)
    }

    pub fn equipment_type(&self, id: &Ulid) -> Option<EquipmentType> {
        self.equipment_types.get(id).map(|e| e.value().clone())
    }

    pub fn equipment_type_by_code(&self, code: &str) -> Option<EquipmentType> {
        let code = code.to_uppercase();
        self.equipment_types
            .iter()
            .find(|e| e.code == code)
            .map(|e| e.value().clone())
    }

    /// Types of one category, optionally narrowed to a sport, ordered by code.
    pub fn equipment_types(&self, category: EquipmentCategory, sport: Option<&str>) -> Vec<EquipmentType> {
        let mut types: Vec<EquipmentType> = self
            .equipment_types
            .iter()
            .filter(|e| e.category == category && sport.is_none_or(|s| e.sport == s))
            .map(|e| e.value().clone())
            .collect();
        types.sort_by(|a, b| a.code.cmp(&b.code));
        types
    }

    /// Add one unit to a type's pool. Serial numbers count up from 1.
    pub fn add_unit(&self, type_id: Ulid) -> Result<Ulid, BookingError> {
        if !self.equipment_types.contains_key(&type_id) {
            return Err(BookingError::ResourceNotFound(type_id));
        }
        let mut pool = self.pools.entry(type_id).or_default();
        if pool.len() >= MAX_UNITS_PER_POOL {
            return Err(BookingError::LimitExceeded("too many units in pool"));
        }
        let unit = Equipment {
            id: Ulid::new(),
            serial: pool.len() as u32 + 1,
            equipment_type: type_id,
        };
        let id = unit.id;
        self.units.insert(id, unit);
        pool.push(id);
        Ok(id)
    }

    pub fn unit(&self, id: &Ulid) -> Option<Equipment> {
        self.units.get(id).map(|e| e.value().clone())
    }

    /// Unit ids of a type, in pool order.
    pub fn pool(&self, type_id: &Ulid) -> Vec<Ulid> {
        self.pools
            .get(type_id)
            .map(|e| e.value().clone())
            .unwrap_or_default()
    }

    pub fn units_of_type(&self, type_id: &Ulid) -> Vec<Equipment> {
        self.pool(type_id)
            .iter()
            .filter_map(|id| self.unit(id))
            .collect()
    }

    // ── Seeding ──────────────────────────────────────────────

    pub fn from_seed(seed: &CatalogSeed) -> Result<Self, BookingError> {
        let catalog = Self::new();
        for ft in &seed.facility_types {
            let type_id = catalog.add_facility_type(FacilityType {
                id: Ulid::new(),
                name: ft.name.clone(),
                sport: ft.sport.clone(),
                price_per_hour: ft.price_per_hour,
            })?;
            for f in &ft.facilities {
                catalog.add_facility(SportFacility {
                    id: Ulid::new(),
                    name: f.name.clone(),
                    facility_type: type_id,
                    status: f.status,
                })?;
            }
        }
        for et in &seed.equipment_types {
            let type_id = catalog.add_equipment_type(EquipmentType {
                id: Ulid::new(),
                code: et.code.to_uppercase(),
                name: et.name.clone(),
                short_name: et.short_name.clone(),
                sport: et.sport.clone(),
                price: et.price,
                category: et.category,
            })?;
            for _ in 0..et.units {
                catalog.add_unit(type_id)?;
            }
        }
        Ok(catalog)
    }
}

// ── Catalogue file format ────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub facility_types: Vec<FacilityTypeSeed>,
    #[serde(default)]
    pub equipment_types: Vec<EquipmentTypeSeed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FacilityTypeSeed {
    pub name: String,
    pub sport: String,
    pub price_per_hour: f64,
    #[serde(default)]
    pub facilities: Vec<FacilitySeed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FacilitySeed {
    pub name: String,
    #[serde(default = "default_facility_status")]
    pub status: FacilityStatus,
}

fn default_facility_status() -> FacilityStatus {
    FacilityStatus::Available
}

#[derive(Debug, Clone, Deserialize)]
pub struct EquipmentTypeSeed {
    pub code: String,
    pub name: String,
    pub short_name: String,
    pub sport: String,
    pub price: f64,
    pub category: EquipmentCategory,
    /// Number of physical units to create. Sellable types need just one.
    #[serde(default = "default_units")]
    pub units: u32,
}

fn default_units() -> u32 {
    1
}
