use ordered_float::OrderedFloat;

use crate::ai::eval::evaluate_state;
use crate::battle::engine::{is_battle_over, legal_actions, step_battle, StepOptions};
use crate::battle::state::{Action, BattleState, TurnRng};

// Pinning every draw to 0.5 makes the search tree deterministic: multi-hit
// counts land on their lower bound, crits fail, damage rolls sit at the
// median, and accuracy passes whenever it is at least one half.
const SEARCH_RNG: f64 = 0.5;

fn no_history() -> StepOptions {
    StepOptions {
        record_history: false,
    }
}

fn step_joint(state: &BattleState, mine: &Action, theirs: &Action) -> BattleState {
    let mut rng = TurnRng::fixed(SEARCH_RNG);
    step_battle(
        state,
        &[mine.clone(), theirs.clone()],
        &mut rng,
        &no_history(),
    )
}

fn maximin(state: &BattleState, player_id: &str, depth: usize) -> f64 {
    if depth == 0 || is_battle_over(state) {
        return evaluate_state(state, player_id);
    }
    let my_actions = legal_actions(state, player_id);
    let Some(opponent_id) = state.opponent_id(player_id) else {
        return evaluate_state(state, player_id);
    };
    let opp_actions = legal_actions(state, &opponent_id);
    if my_actions.is_empty() || opp_actions.is_empty() {
        return evaluate_state(state, player_id);
    }

    let mut best = f64::NEG_INFINITY;
    for mine in &my_actions {
        let mut worst = f64::INFINITY;
        for theirs in &opp_actions {
            let next = step_joint(state, mine, theirs);
            let score = maximin(&next, player_id, depth - 1);
            worst = worst.min(score);
        }
        best = best.max(worst);
    }
    best
}

/// Depth-limited maximin over joint actions: for each of my actions take the
/// worst opponent reply, then pick the best of those worst cases.
pub fn get_best_move_minimax(
    state: &BattleState,
    player_id: &str,
    depth: usize,
) -> Option<Action> {
    let my_actions = legal_actions(state, player_id);
    if my_actions.is_empty() {
        return None;
    }
    let Some(opponent_id) = state.opponent_id(player_id) else {
        return my_actions.into_iter().next();
    };
    let opp_actions = legal_actions(state, &opponent_id);
    if opp_actions.is_empty() {
        return my_actions.into_iter().next();
    }

    let depth = depth.max(1);
    my_actions.into_iter().max_by_key(|mine| {
        let mut worst = f64::INFINITY;
        for theirs in &opp_actions {
            let next = step_joint(state, mine, theirs);
            let score = maximin(&next, player_id, depth - 1);
            worst = worst.min(score);
        }
        OrderedFloat(worst)
    })
}
