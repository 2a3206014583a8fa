use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

/// One battle stat that stage changes can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Atk,
    Def,
    Spa,
    Spd,
    Spe,
    Accuracy,
    Evasion,
}

impl Stat {
    pub fn label(self) -> &'static str {
        match self {
            Stat::Atk => "Attack",
            Stat::Def => "Defense",
            Stat::Spa => "Sp. Atk",
            Stat::Spd => "Sp. Def",
            Stat::Spe => "Speed",
            Stat::Accuracy => "accuracy",
            Stat::Evasion => "evasiveness",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

/// Who an effect applies to, resolved against the acting pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetRef {
    #[default]
    Target,
    #[serde(rename = "self")]
    User,
}

/// Fixed duration or an inclusive range resolved by one RNG draw.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationSpec {
    Turns(i32),
    Range { min: i32, max: i32 },
}

/// Repeat count, fixed or ranged (multi-hit moves).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CountSpec {
    Fixed(i32),
    Range { min: i32, max: i32 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    TurnStart,
    #[default]
    TurnEnd,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovePool {
    #[default]
    All,
    SelfMoves,
    Physical,
    Special,
    Status,
}

/// How a `lock_move` status picks its forced move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    ForceLastMove,
    ForceSpecific,
}

/// Free-form payload attached to a status instance. Every field is optional;
/// which ones are meaningful depends on the status id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<LockMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turns: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_turn: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
}

/// Speed-ratio tier for `speed_based_damage`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedThreshold {
    pub ratio: f64,
    pub power: i32,
}

/// Conditions evaluated by `conditional` effects. Closed set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    #[serde(rename_all = "camelCase")]
    TargetHasStatus { status_id: String },
    TargetHasItem,
    #[serde(rename_all = "camelCase")]
    UserHasStatus { status_id: String },
    UserHasItem,
    #[serde(rename_all = "camelCase")]
    UserType { type_id: String },
    TargetHpLt { value: f64 },
    #[serde(rename_all = "camelCase")]
    FieldHasStatus { status_id: String },
    WeatherIsSunny,
    WeatherIsRaining,
    WeatherIsHail,
    WeatherIsSandstorm,
}

/// Declarative move effect. Moves carry ordered lists of these; the effect
/// compiler lowers them to battle events, resolving all randomness as it goes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    #[serde(rename_all = "camelCase")]
    Damage {
        power: i32,
        #[serde(default = "full_accuracy")]
        accuracy: f64,
    },
    #[serde(rename_all = "camelCase")]
    SpeedBasedDamage {
        #[serde(default)]
        thresholds: Vec<SpeedThreshold>,
        base_power: i32,
        #[serde(default = "full_accuracy")]
        accuracy: f64,
    },
    #[serde(rename_all = "camelCase")]
    Ohko {
        base_accuracy: f64,
        #[serde(default)]
        required_type: Option<String>,
        #[serde(default)]
        non_matching_type_accuracy: Option<f64>,
        #[serde(default = "default_true")]
        level_scaling: bool,
        #[serde(default = "default_true")]
        respect_type_immunity: bool,
        #[serde(default)]
        immune_types: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    ApplyStatus {
        status_id: String,
        #[serde(default)]
        duration: Option<DurationSpec>,
        #[serde(default)]
        stack: bool,
        #[serde(default)]
        target: TargetRef,
        #[serde(default)]
        data: StatusData,
    },
    #[serde(rename_all = "camelCase")]
    RemoveStatus {
        status_id: String,
        #[serde(default)]
        target: TargetRef,
    },
    #[serde(rename_all = "camelCase")]
    ReplaceStatus {
        from: String,
        to: String,
        #[serde(default)]
        duration: Option<i32>,
        #[serde(default)]
        target: TargetRef,
        #[serde(default)]
        data: StatusData,
    },
    #[serde(rename_all = "camelCase")]
    CureAllStatus {
        #[serde(default)]
        target: TargetRef,
    },
    ModifyStage {
        #[serde(default)]
        target: TargetRef,
        stages: BTreeMap<Stat, i32>,
    },
    ClearStages {
        #[serde(default)]
        target: TargetRef,
    },
    ResetStages {
        #[serde(default)]
        target: TargetRef,
    },
    #[serde(rename_all = "camelCase")]
    DisableMove {
        #[serde(default)]
        move_id: Option<String>,
        #[serde(default)]
        duration: Option<i32>,
        #[serde(default)]
        target: TargetRef,
    },
    Chance {
        p: f64,
        then: Vec<Effect>,
        #[serde(default, rename = "else")]
        otherwise: Vec<Effect>,
    },
    Repeat {
        times: CountSpec,
        effects: Vec<Effect>,
    },
    Conditional {
        #[serde(rename = "if")]
        condition: Condition,
        #[serde(default)]
        then: Vec<Effect>,
        #[serde(default, rename = "else")]
        otherwise: Vec<Effect>,
    },
    #[serde(rename_all = "camelCase")]
    DamageRatio {
        ratio_max_hp: f64,
        #[serde(default)]
        target: TargetRef,
    },
    #[serde(rename_all = "camelCase")]
    Delay {
        after_turns: i32,
        #[serde(default)]
        timing: Timing,
        effects: Vec<Effect>,
        #[serde(default)]
        target: TargetRef,
    },
    #[serde(rename_all = "camelCase")]
    OverTime {
        duration: i32,
        #[serde(default)]
        timing: Timing,
        effects: Vec<Effect>,
        #[serde(default)]
        target: TargetRef,
    },
    #[serde(rename_all = "camelCase")]
    ApplyItem {
        item_id: String,
        #[serde(default)]
        target: TargetRef,
    },
    RemoveItem {
        #[serde(default)]
        target: TargetRef,
    },
    ConsumeItem {
        #[serde(default)]
        target: TargetRef,
    },
    Protect,
    SelfSwitch,
    ForceSwitch {
        #[serde(default)]
        target: TargetRef,
    },
    #[serde(rename_all = "camelCase")]
    LockMove {
        #[serde(default)]
        duration: Option<i32>,
        #[serde(default)]
        target: TargetRef,
        #[serde(default)]
        data: StatusData,
    },
    Log {
        message: String,
    },
    RandomMove {
        #[serde(default)]
        pool: MovePool,
    },
    #[serde(rename_all = "camelCase")]
    ApplyFieldStatus {
        status_id: String,
        #[serde(default)]
        duration: Option<i32>,
        #[serde(default)]
        stack: bool,
    },
    #[serde(rename_all = "camelCase")]
    RemoveFieldStatus { status_id: String },
}

fn full_accuracy() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

/// One move definition as it appears in `moves.json`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveData {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub move_type: Option<String>,
    pub category: MoveCategory,
    #[serde(default)]
    pub pp: Option<i32>,
    #[serde(default)]
    pub power: Option<i32>,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub crit_rate: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

impl MoveData {
    pub fn is_status(&self) -> bool {
        self.category == MoveCategory::Status
    }

    pub fn has_protect_effect(&self) -> bool {
        self.effects.iter().any(|e| matches!(e, Effect::Protect))
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[derive(Clone, Debug, Default)]
pub struct MoveDatabase {
    moves: HashMap<String, MoveData>,
}

// Global move store, loaded once from the bundled data file and read-only
// thereafter.
static MOVE_DB: LazyLock<MoveDatabase> = LazyLock::new(|| {
    MoveDatabase::load_from_json_str(include_str!("../data/moves.json"))
        .expect("bundled moves.json must parse")
});

impl MoveDatabase {
    pub fn new() -> Self {
        Self {
            moves: HashMap::new(),
        }
    }

    pub fn insert(&mut self, data: MoveData) {
        self.moves.insert(data.id.clone(), data);
    }

    pub fn get(&self, move_id: &str) -> Option<&MoveData> {
        self.moves.get(move_id)
    }

    pub fn as_map(&self) -> &HashMap<String, MoveData> {
        &self.moves
    }

    pub fn load_from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let map: HashMap<String, MoveData> = serde_json::from_str(json)?;
        let mut db = Self::new();
        for (_, data) in map {
            db.insert(data);
        }
        Ok(db)
    }
}

/// Look up a move in the global database.
pub fn get_move(move_id: &str) -> Option<&'static MoveData> {
    MOVE_DB.get(move_id)
}

/// The global move database.
pub fn move_db() -> &'static MoveDatabase {
    &MOVE_DB
}
