//! Creature Arena battle engine
//!
//! A deterministic 1v1 creature-battle simulator: a turn resolver built on a
//! closed event vocabulary, a declarative effect compiler, pluggable
//! ability/status/field hooks, and two search policies (maximin and
//! Monte-Carlo rollouts) that consume the same step function.

pub mod ai;
pub mod battle;
pub mod creature;
pub mod errors;
pub mod learnsets;
pub mod move_data;
pub mod player;
pub mod species;
pub mod type_chart;

// Re-export commonly used types for convenience
pub use ai::{choose_highest_power, evaluate_state, get_best_move_mcts, get_best_move_minimax};
pub use battle::engine::{
    get_winner, is_battle_over, legal_actions, step_battle, validate_action, validate_actions,
    StepOptions,
};
pub use battle::events::{apply_event, BattleEvent, EventMeta};
pub use battle::replay::replay_battle;
pub use battle::state::{
    create_battle_state, Action, ActionKind, BattleHistory, BattleState, CreatureState, TurnRng,
};
pub use creature::{create_creature, CreatureOptions, EvStats};
pub use errors::{ActionError, EngineError, EngineResult, ReplayError, ValidationError};
pub use player::PlayerState;
