use crate::battle::state::{is_primary_status, BattleState};
use crate::player::PlayerState;

const WIN_SCORE: f64 = 10_000.0;
const LOSS_SCORE: f64 = -10_000.0;
const DRAW_SCORE: f64 = -5_000.0;

/// Score a state from `player_id`'s perspective: decisive terminals first,
/// otherwise the difference of the two sides' material scores.
pub fn evaluate_state(state: &BattleState, player_id: &str) -> f64 {
    let mine_alive = state
        .player(player_id)
        .map(|p| p.has_survivor())
        .unwrap_or(false);
    let theirs_alive = state
        .players
        .iter()
        .filter(|p| p.id != player_id)
        .any(|p| p.has_survivor());

    match (mine_alive, theirs_alive) {
        (true, false) => return WIN_SCORE,
        (false, true) => return LOSS_SCORE,
        (false, false) => return DRAW_SCORE,
        (true, true) => {}
    }

    let mut score = 0.0;
    for player in &state.players {
        let side = side_score(player);
        if player.id == player_id {
            score += side;
        } else {
            score -= side;
        }
    }
    score
}

/// Per-side material: HP fraction, a survival bonus, stage totals, and a
/// penalty per primary status, summed over living creatures.
fn side_score(player: &PlayerState) -> f64 {
    let mut score = 0.0;
    for creature in &player.team {
        if creature.hp <= 0 {
            continue;
        }
        score += 100.0 * (creature.hp as f64) / (creature.max_hp as f64);
        score += 50.0;
        score += 10.0 * creature.stages.total() as f64;
        let primaries = creature
            .statuses
            .iter()
            .filter(|s| is_primary_status(&s.id))
            .count();
        score -= 20.0 * primaries as f64;
    }
    score
}
