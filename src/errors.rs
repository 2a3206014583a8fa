use std::fmt;

/// Main error type for the battle engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Error raised while validating creature construction input
    Validation(ValidationError),
    /// Error raised while validating a submitted action
    Action(ActionError),
    /// Error raised while replaying a recorded battle
    Replay(ReplayError),
}

/// Errors raised by the creature factory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The species id is not present in the species database
    UnknownSpecies(String),
    /// A requested move id is not present in the move database
    UnknownMove(String),
    /// The move exists but is not in the species' learnset
    MoveNotLearnable { species: String, move_id: String },
    /// The same move id was requested twice
    DuplicateMove(String),
    /// A single EV exceeds 252 or the EV total exceeds 510
    InvalidEvBudget { stat: String, value: i32 },
}

/// Errors raised when a submitted action is illegal in the current state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The player already has an action in this turn's list
    ActionNotNeeded(String),
    /// The active creature must be replaced; only switch actions are legal
    MustSwitch(String),
    /// A switch is required but no surviving bench creature exists
    NoSwitchAvailable(String),
    /// Switch target is the active slot, fainted, or out of range
    InvalidSwitchTarget { player: String, slot: usize },
    /// The chosen move has no PP remaining
    NoPp(String),
    /// The chosen move is not one of the active creature's move slots
    MoveNotKnown(String),
    /// No held item, or an ability prevents item use
    ItemNotUsable(String),
}

/// Errors raised during deterministic replay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// A turn consumed more RNG draws than its recorded stream contains
    HistoryRngUnderflow { turn: u32 },
    /// A recorded action references a player missing from the state
    HistoryActionMismatch { turn: u32, player: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Validation(err) => write!(f, "validation error: {}", err),
            EngineError::Action(err) => write!(f, "action error: {}", err),
            EngineError::Replay(err) => write!(f, "replay error: {}", err),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::UnknownSpecies(id) => write!(f, "unknown species: {}", id),
            ValidationError::UnknownMove(id) => write!(f, "unknown move: {}", id),
            ValidationError::MoveNotLearnable { species, move_id } => {
                write!(f, "{} cannot learn {}", species, move_id)
            }
            ValidationError::DuplicateMove(id) => write!(f, "duplicate move: {}", id),
            ValidationError::InvalidEvBudget { stat, value } => {
                write!(f, "invalid EV budget: {} = {}", stat, value)
            }
        }
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::ActionNotNeeded(player) => {
                write!(f, "{} already submitted an action this turn", player)
            }
            ActionError::MustSwitch(player) => write!(f, "{} must switch out", player),
            ActionError::NoSwitchAvailable(player) => {
                write!(f, "{} has no creature left to switch to", player)
            }
            ActionError::InvalidSwitchTarget { player, slot } => {
                write!(f, "{} cannot switch to slot {}", player, slot)
            }
            ActionError::NoPp(move_id) => write!(f, "{} has no PP remaining", move_id),
            ActionError::MoveNotKnown(move_id) => {
                write!(f, "active creature does not know {}", move_id)
            }
            ActionError::ItemNotUsable(player) => write!(f, "{} cannot use an item", player),
        }
    }
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::HistoryRngUnderflow { turn } => {
                write!(f, "recorded RNG stream exhausted during turn {}", turn)
            }
            ReplayError::HistoryActionMismatch { turn, player } => {
                write!(f, "turn {} references unknown player {}", turn, player)
            }
        }
    }
}

impl std::error::Error for EngineError {}
impl std::error::Error for ValidationError {}
impl std::error::Error for ActionError {}
impl std::error::Error for ReplayError {}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Validation(err)
    }
}

impl From<ActionError> for EngineError {
    fn from(err: ActionError) -> Self {
        EngineError::Action(err)
    }
}

impl From<ReplayError> for EngineError {
    fn from(err: ReplayError) -> Self {
        EngineError::Replay(err)
    }
}

/// Type alias for Results using EngineError
pub type EngineResult<T> = Result<T, EngineError>;
