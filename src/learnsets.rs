use std::collections::HashMap;
use std::sync::LazyLock;

/// Map from species id to the move ids that species may be built with.
#[derive(Clone, Debug, Default)]
pub struct LearnsetDatabase {
    learnsets: HashMap<String, Vec<String>>,
}

static LEARNSET_DB: LazyLock<LearnsetDatabase> = LazyLock::new(|| {
    LearnsetDatabase::load_from_json_str(include_str!("../data/learnsets.json"))
        .expect("bundled learnsets.json must parse")
});

impl LearnsetDatabase {
    pub fn new() -> Self {
        Self {
            learnsets: HashMap::new(),
        }
    }

    pub fn insert(&mut self, species_id: String, moves: Vec<String>) {
        self.learnsets.insert(species_id, moves);
    }

    pub fn get(&self, species_id: &str) -> Option<&Vec<String>> {
        self.learnsets.get(species_id)
    }

    pub fn load_from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let map: HashMap<String, Vec<String>> = serde_json::from_str(json)?;
        let mut db = Self::new();
        for (species_id, moves) in map {
            db.insert(species_id, moves);
        }
        Ok(db)
    }
}

/// Learnset for a species from the global database.
pub fn get_learnset(species_id: &str) -> Option<&'static Vec<String>> {
    LEARNSET_DB.get(species_id)
}
