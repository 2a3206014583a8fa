use std::collections::HashMap;
use std::sync::LazyLock;

/// Defensive relations for one element type.
struct TypeEntry {
    resists: Vec<&'static str>,
    weak_to: Vec<&'static str>,
}

/// The fixed 18-type effectiveness chart.
///
/// Multipliers compose per defender type: x2 per weakness, x0.5 per resist.
/// Any immunity anywhere collapses the whole product to 0.
pub struct TypeChart {
    chart: HashMap<&'static str, TypeEntry>,
    immunities: HashMap<&'static str, Vec<&'static str>>,
}

static TYPE_CHART: LazyLock<TypeChart> = LazyLock::new(TypeChart::build);

impl TypeChart {
    fn build() -> Self {
        let mut chart = HashMap::new();
        let mut add = |name: &'static str, resists: &[&'static str], weak_to: &[&'static str]| {
            chart.insert(
                name,
                TypeEntry {
                    resists: resists.to_vec(),
                    weak_to: weak_to.to_vec(),
                },
            );
        };

        add("normal", &[], &["fighting"]);
        add(
            "fire",
            &["grass", "ice", "bug", "steel", "fairy"],
            &["water", "ground", "rock"],
        );
        add("water", &["steel", "fire", "water"], &["electric", "grass"]);
        add("electric", &["flying", "steel", "electric"], &["ground"]);
        add(
            "grass",
            &["ground", "water", "grass"],
            &["fire", "ice", "poison", "flying", "bug"],
        );
        add("ice", &["ice"], &["fire", "fighting", "rock", "steel"]);
        add(
            "fighting",
            &["rock", "bug", "dark"],
            &["flying", "psychic", "fairy"],
        );
        add(
            "poison",
            &["grass", "fighting", "poison", "bug"],
            &["ground", "psychic"],
        );
        add("ground", &["poison", "rock"], &["water", "grass", "ice"]);
        add(
            "flying",
            &["fighting", "bug", "grass"],
            &["electric", "ice", "rock"],
        );
        add("psychic", &["fighting", "psychic"], &["bug", "ghost", "dark"]);
        add(
            "bug",
            &["grass", "fighting", "ground"],
            &["fire", "flying", "rock"],
        );
        add(
            "rock",
            &["normal", "flying", "poison", "fire"],
            &["water", "grass", "fighting", "ground", "steel"],
        );
        add("ghost", &["poison", "bug"], &["ghost", "dark"]);
        add(
            "dragon",
            &["grass", "fire", "water", "electric"],
            &["ice", "dragon", "fairy"],
        );
        add("dark", &["ghost", "dark"], &["fighting", "bug", "fairy"]);
        add(
            "steel",
            &[
                "normal", "flying", "rock", "bug", "steel", "grass", "psychic", "ice", "dragon",
                "fairy",
            ],
            &["fire", "water", "ground"],
        );
        add("fairy", &["fighting", "bug", "dark"], &["poison", "steel"]);

        let mut immunities = HashMap::new();
        immunities.insert("normal", vec!["ghost"]);
        immunities.insert("ghost", vec!["normal", "fighting"]);
        immunities.insert("steel", vec!["poison"]);
        immunities.insert("flying", vec!["ground"]);
        immunities.insert("dark", vec!["psychic"]);
        immunities.insert("ground", vec!["electric"]);
        immunities.insert("fairy", vec!["dragon"]);

        TypeChart { chart, immunities }
    }

    fn lookup(&self, move_type: &str, target_types: &[String]) -> f64 {
        if move_type.is_empty() {
            return 1.0;
        }
        let move_key = move_type.to_lowercase();
        let mut multiplier = 1.0;
        for target_type in target_types {
            let target_key = target_type.to_lowercase();
            if let Some(immune) = self.immunities.get(target_key.as_str()) {
                if immune.iter().any(|t| *t == move_key) {
                    return 0.0;
                }
            }
            if let Some(entry) = self.chart.get(target_key.as_str()) {
                if entry.weak_to.iter().any(|t| *t == move_key) {
                    multiplier *= 2.0;
                }
                if entry.resists.iter().any(|t| *t == move_key) {
                    multiplier *= 0.5;
                }
            }
        }
        multiplier
    }
}

/// Combined effectiveness of `move_type` against a (1- or 2-type) defender.
pub fn effectiveness(move_type: &str, target_types: &[String]) -> f64 {
    TYPE_CHART.lookup(move_type, target_types)
}
