use crate::battle::engine::{step_battle, StepOptions};
use crate::battle::state::{BattleHistory, BattleState, TurnRng};
use crate::errors::ReplayError;

/// Re-run a recorded battle against an identical initial state by feeding
/// each turn's recorded actions and RNG draws back through the resolver.
/// The result is bit-identical to the original run's terminal state.
pub fn replay_battle(
    initial_state: &BattleState,
    history: &BattleHistory,
) -> Result<BattleState, ReplayError> {
    let mut next = initial_state.clone();
    for turn in &history.turns {
        for action in &turn.actions {
            if next.player(&action.player_id).is_none() {
                return Err(ReplayError::HistoryActionMismatch {
                    turn: turn.turn,
                    player: action.player_id.clone(),
                });
            }
        }
        let mut rng = TurnRng::new_for_test(turn.rng.clone());
        next = step_battle(
            &next,
            &turn.actions,
            &mut rng,
            &StepOptions {
                record_history: false,
            },
        );
        if rng.underflowed() {
            return Err(ReplayError::HistoryRngUnderflow { turn: turn.turn });
        }
    }
    Ok(next)
}
