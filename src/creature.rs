use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::battle::state::{AbilityFlags, CreatureState, StatStages, VolatileScratch};
use crate::errors::ValidationError;
use crate::learnsets::get_learnset;
use crate::move_data::get_move;
use crate::species::get_species;

static CREATURE_COUNTER: AtomicUsize = AtomicUsize::new(1);

const EV_PER_STAT_CAP: i32 = 252;
const EV_TOTAL_CAP: i32 = 510;
const DEFAULT_LEVEL: u32 = 50;
const IV: i32 = 31;

/// Effort values, capped at 252 per stat and 510 total.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvStats {
    pub hp: i32,
    pub atk: i32,
    pub def: i32,
    pub spa: i32,
    pub spd: i32,
    pub spe: i32,
}

impl EvStats {
    pub fn total(&self) -> i32 {
        self.hp + self.atk + self.def + self.spa + self.spd + self.spe
    }

    fn entries(&self) -> [(&'static str, i32); 6] {
        [
            ("hp", self.hp),
            ("atk", self.atk),
            ("def", self.def),
            ("spa", self.spa),
            ("spd", self.spd),
            ("spe", self.spe),
        ]
    }
}

/// Construction options for `create_creature`. Everything defaults.
#[derive(Clone, Debug, Default)]
pub struct CreatureOptions {
    pub moves: Option<Vec<String>>,
    pub ability: Option<String>,
    pub item: Option<String>,
    pub evs: Option<EvStats>,
    pub name: Option<String>,
    pub level: Option<u32>,
}

/// Stat formula shared with the original game data: IVs fixed at 31,
/// EV quarters, +level+10 for HP, +5 otherwise.
pub fn calc_stat(base: i32, is_hp: bool, level: i32, iv: i32, ev: i32) -> i32 {
    if is_hp {
        ((base * 2 + iv + ev / 4) * level) / 100 + level + 10
    } else {
        ((base * 2 + iv + ev / 4) * level) / 100 + 5
    }
}

fn validate_evs(evs: &EvStats) -> Result<(), ValidationError> {
    for (stat, value) in evs.entries() {
        if value < 0 || value > EV_PER_STAT_CAP {
            return Err(ValidationError::InvalidEvBudget {
                stat: stat.to_string(),
                value,
            });
        }
    }
    if evs.total() > EV_TOTAL_CAP {
        return Err(ValidationError::InvalidEvBudget {
            stat: "total".to_string(),
            value: evs.total(),
        });
    }
    Ok(())
}

fn validate_moves(species_id: &str, requested: &[String]) -> Result<(), ValidationError> {
    if requested.is_empty() {
        return Ok(());
    }
    let mut seen = HashSet::new();
    for move_id in requested {
        if !seen.insert(move_id.as_str()) {
            return Err(ValidationError::DuplicateMove(move_id.clone()));
        }
        if get_move(move_id).is_none() {
            return Err(ValidationError::UnknownMove(move_id.clone()));
        }
    }
    let learnable = get_learnset(species_id)
        .ok_or_else(|| ValidationError::UnknownSpecies(species_id.to_string()))?;
    for move_id in requested {
        if !learnable.contains(move_id) {
            return Err(ValidationError::MoveNotLearnable {
                species: species_id.to_string(),
                move_id: move_id.clone(),
            });
        }
    }
    Ok(())
}

/// Derive a battle-ready creature from a species definition plus chosen
/// moves, ability, item and EVs, computing concrete stats at level 50.
pub fn create_creature(
    species_id: &str,
    options: CreatureOptions,
) -> Result<CreatureState, ValidationError> {
    let species = get_species(species_id)?;
    let level = options.level.unwrap_or(DEFAULT_LEVEL);
    let evs = options.evs.unwrap_or_default();
    validate_evs(&evs)?;

    let moves = options.moves.unwrap_or_default();
    validate_moves(species_id, &moves)?;

    let stats = &species.base_stats;
    let max_hp = calc_stat(stats.hp, true, level as i32, IV, evs.hp);
    let attack = calc_stat(stats.atk, false, level as i32, IV, evs.atk);
    let defense = calc_stat(stats.def, false, level as i32, IV, evs.def);
    let sp_attack = calc_stat(stats.spa, false, level as i32, IV, evs.spa);
    let sp_defense = calc_stat(stats.spd, false, level as i32, IV, evs.spd);
    let speed = calc_stat(stats.spe, false, level as i32, IV, evs.spe);

    let ability = options
        .ability
        .or_else(|| species.abilities.first().cloned());

    let serial = CREATURE_COUNTER.fetch_add(1, Ordering::Relaxed);
    Ok(CreatureState {
        id: format!("{}_{}", species.id, serial),
        species_id: species.id.clone(),
        name: options.name.unwrap_or_else(|| species.name.clone()),
        level,
        types: species.types.clone(),
        moves,
        move_pp: BTreeMap::new(),
        ability,
        item: options.item,
        hp: max_hp,
        max_hp,
        attack,
        defense,
        sp_attack,
        sp_defense,
        speed,
        stages: StatStages::default(),
        statuses: Vec::new(),
        ability_flags: AbilityFlags::default(),
        scratch: VolatileScratch::default(),
    })
}
