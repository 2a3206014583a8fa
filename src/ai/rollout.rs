use ordered_float::OrderedFloat;

use crate::ai::eval::evaluate_state;
use crate::ai::greedy::choose_highest_power;
use crate::battle::engine::{is_battle_over, legal_actions, step_battle, StepOptions};
use crate::battle::state::{Action, BattleState, TurnRng};

const ROLLOUT_TURN_CAP: usize = 100;

fn no_history() -> StepOptions {
    StepOptions {
        record_history: false,
    }
}

/// Splitmix-style seed mixing so every playout gets an independent but
/// reproducible RNG stream.
fn mix_seed(base: u64, a: u64, b: u64) -> u64 {
    let mut x = base ^ a.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    x ^= b.wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    x ^= x >> 33;
    x = x.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    x ^= x >> 33;
    x = x.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    x ^ (x >> 33)
}

fn greedy_or_wait(state: &BattleState, player_id: &str) -> Action {
    choose_highest_power(state, player_id).unwrap_or_else(|| Action::wait(player_id))
}

/// One playout: take `action` against the opponent's greedy reply, then let
/// both sides play greedily until the battle ends or the turn cap trips.
fn playout(state: &BattleState, player_id: &str, action: &Action, seed: u64) -> f64 {
    let mut rng = TurnRng::seeded(seed);
    let Some(opponent_id) = state.opponent_id(player_id) else {
        return evaluate_state(state, player_id);
    };

    let opp_action = greedy_or_wait(state, &opponent_id);
    let mut sim = step_battle(
        state,
        &[action.clone(), opp_action],
        &mut rng,
        &no_history(),
    );

    for _ in 0..ROLLOUT_TURN_CAP {
        if is_battle_over(&sim) {
            break;
        }
        let mine = greedy_or_wait(&sim, player_id);
        let theirs = greedy_or_wait(&sim, &opponent_id);
        sim = step_battle(&sim, &[mine, theirs], &mut rng, &no_history());
    }
    evaluate_state(&sim, player_id)
}

/// Monte-Carlo rollout policy: split the simulation budget evenly across the
/// legal actions, average each action's terminal scores, pick the argmax.
pub fn get_best_move_mcts(
    state: &BattleState,
    player_id: &str,
    simulations: usize,
) -> Option<Action> {
    let actions = legal_actions(state, player_id);
    if actions.is_empty() {
        return None;
    }
    let per_action = (simulations / actions.len()).max(1);
    let base_seed = mix_seed(0x5EED_BA77, state.turn as u64, actions.len() as u64);

    actions
        .into_iter()
        .enumerate()
        .max_by_key(|(index, action)| {
            let mut total = 0.0;
            for sim in 0..per_action {
                let seed = mix_seed(base_seed, *index as u64, sim as u64);
                total += playout(state, player_id, action, seed);
            }
            OrderedFloat(total / per_action as f64)
        })
        .map(|(_, action)| action)
}
