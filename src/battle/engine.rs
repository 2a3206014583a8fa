use crate::battle::effects::{compile_effects, effective_speed, EffectContext};
use crate::battle::events::{apply_event, apply_events, BattleEvent};
use crate::battle::hooks::abilities::{
    ability_check_hook, ability_value_hook, run_ability_hook, run_all_ability_hooks, CheckContext,
    CheckHook, ValueContext, ValueHook,
};
use crate::battle::hooks::field::run_field_hooks;
use crate::battle::hooks::statuses::{
    collect_status_transforms, item_turn_end, run_status_hooks,
};
use crate::battle::hooks::{
    apply_event_transforms, EventTransform, HookContext, LifecycleHook,
};
use crate::battle::state::{
    Action, ActionKind, BattleHistory, BattleState, CreatureState, TurnRecord, TurnRng,
};
use crate::errors::ActionError;
use crate::move_data::{get_move, move_db, MoveCategory, MoveData, MovePool};

/// Resolver options.
#[derive(Clone, Debug)]
pub struct StepOptions {
    pub record_history: bool,
}

impl Default for StepOptions {
    fn default() -> Self {
        Self {
            record_history: true,
        }
    }
}

struct OrderedAction {
    action: Action,
    priority: i32,
    speed: f64,
    tiebreak: f64,
}

/// True once either side has no creature with HP left.
pub fn is_battle_over(state: &BattleState) -> bool {
    state.players.iter().any(|p| !p.has_survivor())
}

/// The surviving side's id, if exactly one side is still standing.
pub fn get_winner(state: &BattleState) -> Option<String> {
    let mut winner = None;
    let mut losers = 0;
    for player in &state.players {
        if player.has_survivor() {
            winner = Some(player.id.clone());
        } else {
            losers += 1;
        }
    }
    if losers == 1 {
        winner
    } else {
        None
    }
}

/// True when the player's active must be replaced before acting again.
pub fn needs_switch(state: &BattleState, player_id: &str) -> bool {
    match state.active(player_id) {
        Some(active) => active.hp <= 0 || active.has_status("pending_switch"),
        None => true,
    }
}

fn move_has_pp(creature: &CreatureState, move_id: &str) -> bool {
    let Some(move_data) = get_move(move_id) else {
        return false;
    };
    let Some(pp) = move_data.pp else {
        return true;
    };
    match creature.move_pp.get(move_id) {
        Some(remaining) => *remaining > 0,
        None => pp > 0,
    }
}

fn consume_move_pp(creature: &mut CreatureState, move_id: &str, move_data: &MoveData) -> bool {
    let Some(pp) = move_data.pp else {
        return true;
    };
    let entry = creature.move_pp.entry(move_id.to_string()).or_insert(pp);
    if *entry > 0 {
        *entry -= 1;
        true
    } else {
        false
    }
}

fn is_move_disabled(creature: &CreatureState, move_id: &str) -> bool {
    creature
        .statuses
        .iter()
        .any(|s| s.id == "disable_move" && s.data.move_id.as_deref() == Some(move_id))
}

/// Every action the player could legally submit right now. A forced
/// replacement narrows this to switches; an empty set degrades to `wait`.
pub fn legal_actions(state: &BattleState, player_id: &str) -> Vec<Action> {
    let Some(player) = state.player(player_id) else {
        return Vec::new();
    };
    let switches: Vec<Action> = player
        .switch_targets()
        .into_iter()
        .map(|slot| Action::switch(player_id, slot))
        .collect();

    if needs_switch(state, player_id) {
        return switches;
    }

    let mut actions = Vec::new();
    if let Some(active) = player.active() {
        let target_id = state.opponent_id(player_id);
        for move_id in &active.moves {
            if move_has_pp(active, move_id) && !is_move_disabled(active, move_id) {
                actions.push(Action::use_move(player_id, move_id, target_id.as_deref()));
            }
        }
    }
    actions.extend(switches);
    if actions.is_empty() {
        actions.push(Action::wait(player_id));
    }
    actions
}

/// Validate one submitted action against the current state.
pub fn validate_action(state: &BattleState, action: &Action) -> Result<(), ActionError> {
    let player_id = action.player_id.as_str();
    match action.kind {
        ActionKind::Switch => {
            let Some(player) = state.player(player_id) else {
                return Ok(());
            };
            if needs_switch(state, player_id) && player.switch_targets().is_empty() {
                return Err(ActionError::NoSwitchAvailable(player_id.to_string()));
            }
            let slot = action.slot.unwrap_or(usize::MAX);
            let valid = slot < player.team.len()
                && slot != player.active_slot
                && player.team[slot].hp > 0;
            if !valid {
                return Err(ActionError::InvalidSwitchTarget {
                    player: player_id.to_string(),
                    slot,
                });
            }
            Ok(())
        }
        ActionKind::Move => {
            if needs_switch(state, player_id) {
                return Err(ActionError::MustSwitch(player_id.to_string()));
            }
            let Some(active) = state.active(player_id) else {
                return Err(ActionError::MustSwitch(player_id.to_string()));
            };
            let Some(move_id) = action.move_id.as_deref() else {
                return Err(ActionError::MoveNotKnown(String::new()));
            };
            if !active.moves.iter().any(|m| m == move_id) {
                return Err(ActionError::MoveNotKnown(move_id.to_string()));
            }
            if !move_has_pp(active, move_id) {
                return Err(ActionError::NoPp(move_id.to_string()));
            }
            Ok(())
        }
        ActionKind::UseItem => {
            let usable = ability_check_hook(
                state,
                player_id,
                CheckHook::UsableItem,
                CheckContext::default(),
                true,
            );
            let has_item = state
                .active(player_id)
                .map(|c| c.has_item())
                .unwrap_or(false);
            if !usable || !has_item {
                return Err(ActionError::ItemNotUsable(player_id.to_string()));
            }
            Ok(())
        }
        ActionKind::Wait => Ok(()),
    }
}

/// Validate a full submitted action list (one per player at most).
pub fn validate_actions(state: &BattleState, actions: &[Action]) -> Result<(), ActionError> {
    let mut seen = Vec::new();
    for action in actions {
        if seen.contains(&action.player_id) {
            return Err(ActionError::ActionNotNeeded(action.player_id.clone()));
        }
        seen.push(action.player_id.clone());
        validate_action(state, action)?;
    }
    Ok(())
}

fn player_ids(state: &BattleState) -> Vec<String> {
    state.players.iter().map(|p| p.id.clone()).collect()
}

fn active_name(state: &BattleState, player_id: &str) -> String {
    state
        .active(player_id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| player_id.to_string())
}

/// Resolve one full turn. Pure with respect to its inputs: the same state,
/// actions and RNG stream always produce the same output state and log.
pub fn step_battle(
    state: &BattleState,
    actions: &[Action],
    rng: &mut TurnRng,
    options: &StepOptions,
) -> BattleState {
    let mut next = state.clone();
    next.turn += 1;
    let log_start = next.log.len();
    rng.begin_recording();
    next.log.push(format!("--- Turn {} ---", next.turn));

    // Turn-start phase: abilities, then statuses, then field.
    let start = run_all_ability_hooks(
        &next,
        LifecycleHook::TurnStart,
        &mut HookContext {
            rng,
            action: None,
            move_data: None,
        },
    );
    if let Some(replaced) = start.state {
        next = replaced;
    }
    next = apply_events(&next, &start.events);

    for player_id in player_ids(&next) {
        let result = run_status_hooks(
            &next,
            &player_id,
            LifecycleHook::TurnStart,
            &mut HookContext {
                rng,
                action: None,
                move_data: None,
            },
        );
        if let Some(replaced) = result.state {
            next = replaced;
        }
        next = apply_events(&next, &result.events);
    }

    let field_start = run_field_hooks(
        &next,
        LifecycleHook::TurnStart,
        &mut HookContext {
            rng,
            action: None,
            move_data: None,
        },
    );
    if let Some(replaced) = field_start.state {
        next = replaced;
    }
    next = apply_events(&next, &field_start.events);

    // Action ordering: switches and items lead, then moves by priority,
    // speed, and a recorded RNG tiebreak.
    let mut ordered: Vec<OrderedAction> = actions
        .iter()
        .map(|action| {
            let (priority, speed) = match action.kind {
                ActionKind::Switch | ActionKind::UseItem => (10_000, 0.0),
                ActionKind::Wait => (0, 0.0),
                ActionKind::Move => {
                    let move_data = action.move_id.as_deref().and_then(get_move);
                    let base = move_data.map(|m| m.priority).unwrap_or(0);
                    let priority = ability_value_hook(
                        &next,
                        &action.player_id,
                        ValueHook::ModifyPriority,
                        base as f64,
                        &ValueContext {
                            move_data,
                            category: move_data.map(|m| m.category),
                            turn: next.turn,
                            ..ValueContext::default()
                        },
                    )
                    .round() as i32;
                    (priority, effective_speed(&next, &action.player_id, next.turn))
                }
            };
            OrderedAction {
                action: action.clone(),
                priority,
                speed,
                tiebreak: rng.next_f64(),
            }
        })
        .collect();

    ordered.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| {
                b.speed
                    .partial_cmp(&a.speed)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| {
                a.tiebreak
                    .partial_cmp(&b.tiebreak)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });

    for entry in ordered {
        next = execute_action(next, entry.action, rng);
        if is_battle_over(&next) {
            break;
        }
    }

    // Turn-end phase: statuses (with held-item residuals), then abilities,
    // then field.
    for player_id in player_ids(&next) {
        let result = run_status_hooks(
            &next,
            &player_id,
            LifecycleHook::TurnEnd,
            &mut HookContext {
                rng,
                action: None,
                move_data: None,
            },
        );
        if let Some(replaced) = result.state {
            next = replaced;
        }
        next = apply_events(&next, &result.events);
        let item_events = item_turn_end(&next, &player_id);
        next = apply_events(&next, &item_events);
    }

    let end = run_all_ability_hooks(
        &next,
        LifecycleHook::TurnEnd,
        &mut HookContext {
            rng,
            action: None,
            move_data: None,
        },
    );
    if let Some(replaced) = end.state {
        next = replaced;
    }
    next = apply_events(&next, &end.events);

    let field_end = run_field_hooks(
        &next,
        LifecycleHook::TurnEnd,
        &mut HookContext {
            rng,
            action: None,
            move_data: None,
        },
    );
    if let Some(replaced) = field_end.state {
        next = replaced;
    }
    next = apply_events(&next, &field_end.events);

    tick_durations(&mut next);

    if options.record_history {
        let turn_log = next.log[log_start..].to_vec();
        let record = TurnRecord {
            turn: next.turn,
            actions: actions.to_vec(),
            log: turn_log,
            rng: rng.take_recorded(),
        };
        next.history
            .get_or_insert_with(BattleHistory::default)
            .turns
            .push(record);
    } else {
        rng.take_recorded();
    }

    next
}

fn execute_action(state: BattleState, action: Action, rng: &mut TurnRng) -> BattleState {
    let mut next = state;
    let player_id = action.player_id.clone();
    let name = active_name(&next, &player_id);

    // A creature flagged for replacement can do nothing but switch.
    if action.kind != ActionKind::Switch {
        if let Some(active) = next.active(&player_id) {
            if active.has_status("pending_switch") {
                next.log.push(format!("{} must switch out!", name));
                return next;
            }
        }
    }

    match action.kind {
        ActionKind::Switch => execute_switch(next, &action, rng),
        ActionKind::UseItem => execute_use_item(next, &action),
        ActionKind::Wait => {
            next.log.push(format!("{} waited.", name));
            next
        }
        ActionKind::Move => execute_move(next, action, rng),
    }
}

fn execute_switch(state: BattleState, action: &Action, rng: &mut TurnRng) -> BattleState {
    let mut next = state;
    let player_id = action.player_id.as_str();
    let name = active_name(&next, player_id);

    let Some(slot) = action.slot else {
        next.log.push(format!("{} couldn't switch!", name));
        return next;
    };
    let Some(player) = next.player(player_id) else {
        return next;
    };
    let slot_ok = slot < player.team.len()
        && slot != player.active_slot
        && player.team[slot].hp > 0;
    if !slot_ok {
        next.log.push(format!("{} couldn't switch!", name));
        return next;
    }

    // A live creature can be trapped; ghost types always escape.
    if let Some(active) = next.active(player_id) {
        if active.hp > 0 && !active.has_type("ghost") {
            let trapped = next.players.iter().any(|other| {
                other.id != player_id
                    && ability_check_hook(
                        &next,
                        &other.id,
                        CheckHook::Trap,
                        CheckContext {
                            target_id: Some(player_id),
                            ..CheckContext::default()
                        },
                        false,
                    )
            });
            if trapped {
                next.log.push(format!("{} couldn't switch!", name));
                return next;
            }
        }
    }

    next = apply_event(
        &next,
        &BattleEvent::Switch {
            player_id: player_id.to_string(),
            slot,
        },
    );

    let incoming = run_ability_hook(
        &next,
        player_id,
        LifecycleHook::SwitchIn,
        &mut HookContext {
            rng,
            action: None,
            move_data: None,
        },
    );
    if let Some(replaced) = incoming.state {
        next = replaced;
    }
    apply_events(&next, &incoming.events)
}

fn execute_use_item(state: BattleState, action: &Action) -> BattleState {
    let mut next = state;
    let player_id = action.player_id.as_str();
    let name = active_name(&next, player_id);

    let usable = ability_check_hook(
        &next,
        player_id,
        CheckHook::UsableItem,
        CheckContext::default(),
        true,
    );
    if !usable {
        next.log.push(format!("{} can't use items!", name));
        return next;
    }
    let Some(active) = next.active(player_id) else {
        return next;
    };
    let Some(item_id) = active.item_id() else {
        next.log.push(format!("{} has no item to use!", name));
        return next;
    };

    let mut events = vec![
        BattleEvent::Log {
            message: format!("{} used its {}!", name, item_id),
        },
        BattleEvent::RemoveStatus {
            target_id: player_id.to_string(),
            status_id: "item".to_string(),
            meta: Default::default(),
        },
        BattleEvent::RemoveStatus {
            target_id: player_id.to_string(),
            status_id: "berry".to_string(),
            meta: Default::default(),
        },
    ];
    if item_id.contains("berry") {
        events.push(BattleEvent::ApplyStatus {
            target_id: player_id.to_string(),
            status_id: "berry_consumed".to_string(),
            duration: None,
            stack: false,
            data: Default::default(),
            meta: Default::default(),
        });
    }
    apply_events(&next, &events)
}

fn execute_move(state: BattleState, action: Action, rng: &mut TurnRng) -> BattleState {
    let mut next = state;
    let mut action = action;
    let player_id = action.player_id.clone();
    let name = active_name(&next, &player_id);

    match next.active(&player_id) {
        Some(active) if active.hp > 0 => {}
        _ => {
            next.log.push(format!("{} cannot act.", name));
            return next;
        }
    }

    let target_id = action
        .target_id
        .clone()
        .or_else(|| next.opponent_id(&player_id));
    let Some(target_id) = target_id else {
        next.log.push(format!("{} has no target.", name));
        return next;
    };

    let Some(mut move_id) = action.move_id.clone() else {
        next.log.push(format!("{} has no move selected.", name));
        return next;
    };
    let Some(mut move_data) = get_move(&move_id) else {
        next.log
            .push(format!("{} tried the unknown move {}.", name, move_id));
        return next;
    };

    // Ability before-action hooks (Libero's type shift lives here).
    let ability_before = run_ability_hook(
        &next,
        &player_id,
        LifecycleHook::BeforeAction,
        &mut HookContext {
            rng,
            action: Some(&action),
            move_data: Some(move_data),
        },
    );
    if let Some(replaced) = ability_before.state {
        next = replaced;
    }
    next = apply_events(&next, &ability_before.events);
    if ability_before.prevent_action {
        return next;
    }
    if let Some(overridden) = ability_before.override_action {
        action = overridden;
    }

    // Status before-action hooks: sleep/paralysis/freeze/confusion/flinch
    // prevention, taunt's status-move block, encore/disable/lock overrides.
    let status_before = run_status_hooks(
        &next,
        &player_id,
        LifecycleHook::BeforeAction,
        &mut HookContext {
            rng,
            action: Some(&action),
            move_data: Some(move_data),
        },
    );
    if let Some(replaced) = status_before.state {
        next = replaced;
    }
    next = apply_events(&next, &status_before.events);
    if status_before.prevent_action {
        return next;
    }
    if let Some(overridden) = status_before.override_action {
        action = overridden;
    }

    // Field before-action hooks run last; none currently prevent or
    // override, but their events still land.
    let field_before = run_field_hooks(
        &next,
        LifecycleHook::BeforeAction,
        &mut HookContext {
            rng,
            action: Some(&action),
            move_data: Some(move_data),
        },
    );
    if let Some(replaced) = field_before.state {
        next = replaced;
    }
    next = apply_events(&next, &field_before.events);

    // Re-resolve after overrides.
    match action.move_id.as_deref() {
        Some(new_move_id) if new_move_id != move_id => {
            let Some(new_move_data) = get_move(new_move_id) else {
                next.log
                    .push(format!("{} tried the unknown move {}.", name, new_move_id));
                return next;
            };
            move_id = new_move_id.to_string();
            move_data = new_move_data;
        }
        Some(_) => {}
        None => {
            next.log.push(format!("{} has no move selected.", name));
            return next;
        }
    }

    // Consecutive-protect bookkeeping resets on any non-protect move.
    if !move_data.has_protect_effect() {
        if let Some(active) = next.active(&player_id) {
            if active.scratch.protect_success_count != 0 {
                next = apply_event(
                    &next,
                    &BattleEvent::SetProtectCount {
                        target_id: player_id.clone(),
                        count: 0,
                    },
                );
            }
        }
    }

    if let Some(active) = next.active_mut(&player_id) {
        if !consume_move_pp(active, &move_id, move_data) {
            let move_name = move_data.name.clone();
            next.log
                .push(format!("{} has no PP left for {}!", name, move_name));
            return next;
        }
        active.scratch.last_move = Some(move_id.clone());
    }

    let turn = next.turn;
    let mut ctx = EffectContext::new(&player_id, &target_id, Some(move_data), rng, turn);
    let mut events = compile_effects(&next, &move_data.effects, &mut ctx);
    events = crate::battle::hooks::abilities::apply_ability_event_modifiers(&next, &events);
    let transforms = collect_transforms(&next);
    events = apply_event_transforms(&events, &transforms);
    events = expand_random_moves(&mut next, &events, rng, &player_id, &target_id, turn);
    apply_events(&next, &events)
}

/// Gather `onEventTransform` output from every player's statuses and from
/// the field, stable-sorted by descending priority.
fn collect_transforms(state: &BattleState) -> Vec<EventTransform> {
    let mut transforms = Vec::new();
    for player in &state.players {
        transforms.extend(collect_status_transforms(state, &player.id));
    }
    transforms.sort_by(|a, b| b.priority.cmp(&a.priority));
    transforms
}

/// Expand `random_move` sentinels into the chosen move's own event stream,
/// flowing through the same modifier and transform pipeline.
fn expand_random_moves(
    state: &mut BattleState,
    events: &[BattleEvent],
    rng: &mut TurnRng,
    attacker_id: &str,
    target_id: &str,
    turn: u32,
) -> Vec<BattleEvent> {
    let mut expanded = Vec::new();
    let attacker_name = active_name(state, attacker_id);

    for event in events {
        let BattleEvent::RandomMove { pool, .. } = event else {
            expanded.push(event.clone());
            continue;
        };

        let Some(chosen_id) = choose_random_move(state, *pool, rng, attacker_id) else {
            expanded.push(BattleEvent::Log {
                message: format!("{} tried to improvise, but failed!", attacker_name),
            });
            continue;
        };
        let Some(chosen) = get_move(&chosen_id) else {
            continue;
        };
        if let Some(active) = state.active_mut(attacker_id) {
            if !consume_move_pp(active, &chosen_id, chosen) {
                expanded.push(BattleEvent::Log {
                    message: format!("{} has no PP left for {}!", attacker_name, chosen.name),
                });
                continue;
            }
        }
        expanded.push(BattleEvent::Log {
            message: format!("{} used {}!", attacker_name, chosen.name),
        });

        let mut ctx = EffectContext::new(attacker_id, target_id, Some(chosen), rng, turn);
        // The announcement above already covers the "used" line.
        ctx.used_logged = true;
        let mut sub_events = compile_effects(state, &chosen.effects, &mut ctx);
        sub_events =
            crate::battle::hooks::abilities::apply_ability_event_modifiers(state, &sub_events);
        let transforms = collect_transforms(state);
        sub_events = apply_event_transforms(&sub_events, &transforms);
        expanded.extend(sub_events);
    }
    expanded
}

fn choose_random_move(
    state: &BattleState,
    pool: MovePool,
    rng: &mut TurnRng,
    attacker_id: &str,
) -> Option<String> {
    let mut candidates: Vec<String> = match pool {
        MovePool::SelfMoves => state
            .active(attacker_id)
            .map(|c| c.moves.clone())
            .unwrap_or_default(),
        MovePool::Physical | MovePool::Special | MovePool::Status => {
            let wanted = match pool {
                MovePool::Physical => MoveCategory::Physical,
                MovePool::Special => MoveCategory::Special,
                _ => MoveCategory::Status,
            };
            move_db()
                .as_map()
                .values()
                .filter(|m| m.category == wanted)
                .map(|m| m.id.clone())
                .collect()
        }
        MovePool::All => move_db().as_map().keys().cloned().collect(),
    };
    // The map iterates in arbitrary order; sort for a deterministic draw.
    candidates.sort();

    let filtered: Vec<String> = match state.active(attacker_id) {
        Some(active) => candidates
            .into_iter()
            .filter(|id| move_has_pp(active, id))
            .collect(),
        None => candidates,
    };
    if filtered.is_empty() {
        return None;
    }
    let idx = ((rng.next_f64() * filtered.len() as f64).floor() as usize).min(filtered.len() - 1);
    filtered.get(idx).cloned()
}

/// Decrement every finite status and field-effect counter; drop expired ones.
fn tick_durations(state: &mut BattleState) {
    for player in &mut state.players {
        let slot = player.active_slot;
        if let Some(active) = player.team.get_mut(slot) {
            for status in &mut active.statuses {
                if let Some(turns) = status.remaining_turns {
                    status.remaining_turns = Some(turns - 1);
                }
            }
            active
                .statuses
                .retain(|s| s.remaining_turns.map(|t| t > 0).unwrap_or(true));
        }
    }
    for effect in &mut state.field.global {
        if let Some(turns) = effect.remaining_turns {
            effect.remaining_turns = Some(turns - 1);
        }
    }
    state
        .field
        .global
        .retain(|e| e.remaining_turns.map(|t| t > 0).unwrap_or(true));
}
