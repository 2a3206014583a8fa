use crate::battle::engine::needs_switch;
use crate::battle::state::{Action, BattleState};
use crate::move_data::get_move;

/// The rollout policy's default chooser: pick the known move with the
/// highest base power, or the first legal switch when a replacement is
/// forced. Returns None when the player cannot act at all.
pub fn choose_highest_power(state: &BattleState, player_id: &str) -> Option<Action> {
    let player = state.player(player_id)?;

    if needs_switch(state, player_id) {
        let slot = player.switch_targets().into_iter().next()?;
        return Some(Action::switch(player_id, slot));
    }

    let active = player.active()?;
    if active.hp <= 0 {
        return None;
    }
    let target_id = state.opponent_id(player_id)?;

    let mut best: Option<(&str, i32)> = None;
    for move_id in &active.moves {
        let Some(move_data) = get_move(move_id) else {
            continue;
        };
        let power = move_data.power.unwrap_or(0);
        if best.map(|(_, p)| power > p).unwrap_or(true) {
            best = Some((move_id, power));
        }
    }
    let (move_id, _) = best?;
    Some(Action::use_move(player_id, move_id, Some(&target_id)))
}
