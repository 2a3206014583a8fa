use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::move_data::{Stat, StatusData};
use crate::player::PlayerState;

/// Status ids that survive a switch-out. Everything else is volatile.
pub const PRIMARY_STATUSES: [&str; 6] = ["burn", "poison", "toxic", "paralysis", "sleep", "freeze"];

/// Field effect ids that count as weather. At most one may be active.
pub const WEATHER_IDS: [&str; 4] = ["sun", "rain", "hail", "sandstorm"];

pub fn is_primary_status(id: &str) -> bool {
    PRIMARY_STATUSES.contains(&id)
}

pub fn is_weather_id(id: &str) -> bool {
    WEATHER_IDS.contains(&id)
}

/// Stat stage block. Every entry is clamped to [-6, 6] by the event applier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatStages {
    pub atk: i32,
    pub def: i32,
    pub spa: i32,
    pub spd: i32,
    pub spe: i32,
    pub accuracy: i32,
    pub evasion: i32,
}

impl StatStages {
    pub fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Atk => self.atk,
            Stat::Def => self.def,
            Stat::Spa => self.spa,
            Stat::Spd => self.spd,
            Stat::Spe => self.spe,
            Stat::Accuracy => self.accuracy,
            Stat::Evasion => self.evasion,
        }
    }

    pub fn get_mut(&mut self, stat: Stat) -> &mut i32 {
        match stat {
            Stat::Atk => &mut self.atk,
            Stat::Def => &mut self.def,
            Stat::Spa => &mut self.spa,
            Stat::Spd => &mut self.spd,
            Stat::Spe => &mut self.spe,
            Stat::Accuracy => &mut self.accuracy,
            Stat::Evasion => &mut self.evasion,
        }
    }

    /// Sum over all entries, used by the state evaluator.
    pub fn total(&self) -> i32 {
        self.atk + self.def + self.spa + self.spd + self.spe + self.accuracy + self.evasion
    }
}

/// The stage-to-multiplier ladder: (2+s)/2 for s >= 0, 2/(2-s) otherwise.
pub fn stage_multiplier(stage: i32) -> f64 {
    let s = stage.clamp(-6, 6);
    if s >= 0 {
        (2.0 + s as f64) / 2.0
    } else {
        2.0 / (2.0 - s as f64)
    }
}

/// A status attached to a creature: id, optional countdown, payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusInstance {
    pub id: String,
    pub remaining_turns: Option<i32>,
    #[serde(default)]
    pub data: StatusData,
}

impl StatusInstance {
    pub fn new(id: impl Into<String>, remaining_turns: Option<i32>) -> Self {
        Self {
            id: id.into(),
            remaining_turns,
            data: StatusData::default(),
        }
    }
}

/// Once-per-stay ability bookkeeping, cleared on switch-out.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AbilityFlags {
    pub intimidate_used: bool,
    pub download_used: bool,
    pub drought_used: bool,
    pub libero_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_ability: Option<String>,
}

/// Per-creature volatile scratch, cleared on switch-out.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolatileScratch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_move: Option<String>,
    pub protect_success_count: i32,
}

/// A battle-ready creature instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatureState {
    pub id: String,
    pub species_id: String,
    pub name: String,
    pub level: u32,
    pub types: Vec<String>,
    pub moves: Vec<String>,
    #[serde(default)]
    pub move_pp: BTreeMap<String, i32>,
    pub ability: Option<String>,
    pub item: Option<String>,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub sp_attack: i32,
    pub sp_defense: i32,
    pub speed: i32,
    #[serde(default)]
    pub stages: StatStages,
    #[serde(default)]
    pub statuses: Vec<StatusInstance>,
    #[serde(default)]
    pub ability_flags: AbilityFlags,
    #[serde(default)]
    pub scratch: VolatileScratch,
}

impl CreatureState {
    pub fn is_fainted(&self) -> bool {
        self.hp <= 0
    }

    pub fn has_status(&self, status_id: &str) -> bool {
        self.statuses.iter().any(|s| s.id == status_id)
    }

    pub fn status(&self, status_id: &str) -> Option<&StatusInstance> {
        self.statuses.iter().find(|s| s.id == status_id)
    }

    pub fn has_type(&self, type_id: &str) -> bool {
        self.types.iter().any(|t| t.eq_ignore_ascii_case(type_id))
    }

    pub fn has_primary_status(&self) -> bool {
        self.statuses.iter().any(|s| is_primary_status(&s.id))
    }

    /// Item reads go through both representations: the scalar field and an
    /// `item`/`berry` status entry.
    pub fn has_item(&self) -> bool {
        self.item.is_some() || self.statuses.iter().any(|s| s.id == "item" || s.id == "berry")
    }

    pub fn item_id(&self) -> Option<String> {
        if let Some(item) = &self.item {
            return Some(item.clone());
        }
        self.statuses
            .iter()
            .find(|s| s.id == "item" || s.id == "berry")
            .and_then(|s| s.data.item_id.clone())
    }
}

/// A field-wide effect (weather, hazards).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldEffectInstance {
    pub id: String,
    pub remaining_turns: Option<i32>,
    #[serde(default)]
    pub data: StatusData,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldState {
    #[serde(default)]
    pub global: Vec<FieldEffectInstance>,
    /// Reserved for side-local effects, keyed by player id.
    #[serde(default)]
    pub sides: BTreeMap<String, Vec<FieldEffectInstance>>,
}

impl FieldState {
    pub fn has(&self, id: &str) -> bool {
        self.global.iter().any(|e| e.id == id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Move,
    Switch,
    UseItem,
    Wait,
}

/// One submitted action in the wire format of the engine's public surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub player_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
}

impl Action {
    pub fn use_move(player_id: &str, move_id: &str, target_id: Option<&str>) -> Self {
        Self {
            kind: ActionKind::Move,
            player_id: player_id.to_string(),
            move_id: Some(move_id.to_string()),
            slot: None,
            target_id: target_id.map(|t| t.to_string()),
        }
    }

    pub fn switch(player_id: &str, slot: usize) -> Self {
        Self {
            kind: ActionKind::Switch,
            player_id: player_id.to_string(),
            move_id: None,
            slot: Some(slot),
            target_id: None,
        }
    }

    pub fn use_item(player_id: &str) -> Self {
        Self {
            kind: ActionKind::UseItem,
            player_id: player_id.to_string(),
            move_id: None,
            slot: None,
            target_id: None,
        }
    }

    pub fn wait(player_id: &str) -> Self {
        Self {
            kind: ActionKind::Wait,
            player_id: player_id.to_string(),
            move_id: None,
            slot: None,
            target_id: None,
        }
    }
}

/// One recorded turn: enough to replay it bit-identically.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn: u32,
    pub actions: Vec<Action>,
    pub log: Vec<String>,
    pub rng: Vec<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleHistory {
    pub turns: Vec<TurnRecord>,
}

/// Complete battle state. The turn resolver consumes one of these and
/// produces a new one; it is never mutated in place by callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleState {
    pub players: Vec<PlayerState>,
    #[serde(default)]
    pub field: FieldState,
    pub turn: u32,
    #[serde(default)]
    pub log: Vec<String>,
    #[serde(default)]
    pub history: Option<BattleHistory>,
}

impl BattleState {
    pub fn player(&self, player_id: &str) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_mut(&mut self, player_id: &str) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    pub fn opponent_id(&self, player_id: &str) -> Option<String> {
        self.players
            .iter()
            .find(|p| p.id != player_id)
            .map(|p| p.id.clone())
    }

    /// The creature currently on the field for `player_id`.
    pub fn active(&self, player_id: &str) -> Option<&CreatureState> {
        let player = self.player(player_id)?;
        player.team.get(player.active_slot)
    }

    pub fn active_mut(&mut self, player_id: &str) -> Option<&mut CreatureState> {
        let idx = self.players.iter().position(|p| p.id == player_id)?;
        let slot = self.players[idx].active_slot;
        self.players[idx].team.get_mut(slot)
    }
}

/// Build the initial battle state. Active slots start at 0.
pub fn create_battle_state(players: Vec<PlayerState>) -> BattleState {
    BattleState {
        players: players
            .into_iter()
            .map(|mut player| {
                player.active_slot = 0;
                player
            })
            .collect(),
        field: FieldState::default(),
        turn: 0,
        log: Vec::new(),
        history: None,
    }
}

enum RngSource {
    /// Scripted values for tests and replay; exhausting the script is
    /// remembered so replay can surface an underflow error.
    Scripted {
        values: Vec<f64>,
        cursor: usize,
        underflowed: bool,
    },
    Seeded(SmallRng),
    Fixed(f64),
}

/// The engine's only randomness source: a stream of draws in [0, 1).
///
/// The resolver records every draw made during a turn so histories can be
/// replayed by feeding the recorded stream back through a scripted oracle.
pub struct TurnRng {
    source: RngSource,
    recorded: Vec<f64>,
    recording: bool,
}

impl TurnRng {
    /// Oracle that yields exactly the given values in order. Used by tests
    /// and by replay. Draws past the end yield 0.5 and mark an underflow.
    pub fn new_for_test(values: Vec<f64>) -> Self {
        Self {
            source: RngSource::Scripted {
                values,
                cursor: 0,
                underflowed: false,
            },
            recorded: Vec::new(),
            recording: false,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            source: RngSource::Seeded(SmallRng::seed_from_u64(seed)),
            recorded: Vec::new(),
            recording: false,
        }
    }

    /// Oracle that returns the same value for every draw. Minimax pins the
    /// whole stream to 0.5 with this.
    pub fn fixed(value: f64) -> Self {
        Self {
            source: RngSource::Fixed(value),
            recorded: Vec::new(),
            recording: false,
        }
    }

    pub fn next_f64(&mut self) -> f64 {
        let value = match &mut self.source {
            RngSource::Scripted {
                values,
                cursor,
                underflowed,
            } => match values.get(*cursor) {
                Some(v) => {
                    *cursor += 1;
                    *v
                }
                None => {
                    *underflowed = true;
                    0.5
                }
            },
            RngSource::Seeded(rng) => rng.gen::<f64>(),
            RngSource::Fixed(v) => *v,
        };
        if self.recording {
            self.recorded.push(value);
        }
        value
    }

    pub fn underflowed(&self) -> bool {
        matches!(self.source, RngSource::Scripted { underflowed: true, .. })
    }

    pub(crate) fn begin_recording(&mut self) {
        self.recording = true;
        self.recorded.clear();
    }

    pub(crate) fn take_recorded(&mut self) -> Vec<f64> {
        self.recording = false;
        std::mem::take(&mut self.recorded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_multiplier_follows_the_ladder() {
        assert_eq!(stage_multiplier(0), 1.0);
        assert_eq!(stage_multiplier(1), 1.5);
        assert_eq!(stage_multiplier(2), 2.0);
        assert_eq!(stage_multiplier(6), 4.0);
        assert_eq!(stage_multiplier(-1), 2.0 / 3.0);
        assert_eq!(stage_multiplier(-2), 0.5);
        assert_eq!(stage_multiplier(-6), 0.25);
        // Out-of-range inputs clamp instead of extrapolating.
        assert_eq!(stage_multiplier(9), 4.0);
    }

    #[test]
    fn scripted_rng_reports_underflow() {
        let mut rng = TurnRng::new_for_test(vec![0.25]);
        assert_eq!(rng.next_f64(), 0.25);
        assert!(!rng.underflowed());
        assert_eq!(rng.next_f64(), 0.5);
        assert!(rng.underflowed());
    }

    #[test]
    fn actions_round_trip_through_the_wire_format() {
        let action = Action::use_move("p1", "tackle", Some("p2"));
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("\"type\":\"move\""));
        assert!(json.contains("\"playerId\":\"p1\""));
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(back, action);

        let wire = r#"{"type":"switch","playerId":"p2","slot":1}"#;
        let parsed: Action = serde_json::from_str(wire).unwrap();
        assert_eq!(parsed, Action::switch("p2", 1));
    }
}
