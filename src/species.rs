use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::errors::ValidationError;

/// Base stat block as it appears in `species.json`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: i32,
    pub atk: i32,
    pub def: i32,
    pub spa: i32,
    pub spd: i32,
    pub spe: i32,
}

/// One species definition. `types` also accepts the legacy singular `type`
/// key; producers are normalized to the plural form.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpeciesData {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "type")]
    pub types: Vec<String>,
    #[serde(rename = "baseStats")]
    pub base_stats: BaseStats,
    #[serde(default)]
    pub abilities: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct SpeciesDatabase {
    species: HashMap<String, SpeciesData>,
}

// Global species store, loaded once from the bundled data file and read-only
// thereafter.
static SPECIES_DB: LazyLock<SpeciesDatabase> = LazyLock::new(|| {
    SpeciesDatabase::load_from_json_str(include_str!("../data/species.json"))
        .expect("bundled species.json must parse")
});

impl SpeciesDatabase {
    pub fn new() -> Self {
        Self {
            species: HashMap::new(),
        }
    }

    pub fn insert(&mut self, data: SpeciesData) {
        self.species.insert(data.id.clone(), data);
    }

    pub fn get(&self, species_id: &str) -> Option<&SpeciesData> {
        self.species.get(species_id)
    }

    pub fn as_map(&self) -> &HashMap<String, SpeciesData> {
        &self.species
    }

    pub fn load_from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let map: HashMap<String, SpeciesData> = serde_json::from_str(json)?;
        let mut db = Self::new();
        for (_, data) in map {
            db.insert(data);
        }
        Ok(db)
    }
}

/// Look up a species in the global database.
pub fn get_species(species_id: &str) -> Result<&'static SpeciesData, ValidationError> {
    SPECIES_DB
        .get(species_id)
        .ok_or_else(|| ValidationError::UnknownSpecies(species_id.to_string()))
}

/// The global species database.
pub fn species_db() -> &'static SpeciesDatabase {
    &SPECIES_DB
}
