use crate::battle::effects::{compile_effects, EffectContext};
use crate::battle::events::{apply_events, BattleEvent, EventKind, EventMeta};
use crate::battle::hooks::{EventTransform, HookContext, LifecycleHook, TransformKind};
use crate::battle::state::{Action, BattleState, StatusInstance};
use crate::move_data::{LockMode, StatusData, Timing};

/// Every volatile/primary status the engine knows. Dispatch is by tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Burn,
    Poison,
    Toxic,
    Paralysis,
    Sleep,
    Freeze,
    Confusion,
    Flinch,
    Protect,
    LockMove,
    DisableMove,
    Encore,
    Taunt,
    LeechSeed,
    Curse,
    Yawn,
    Bind,
    DelayedEffect,
    OverTimeEffect,
    /// Two-turn charge markers (`charging_*`); force the follow-up move.
    Charging,
    PendingSwitch,
    BerryConsumed,
    Item,
    Berry,
}

impl StatusKind {
    pub fn from_id(id: &str) -> Option<Self> {
        let kind = match id {
            "burn" => StatusKind::Burn,
            "poison" => StatusKind::Poison,
            "toxic" => StatusKind::Toxic,
            "paralysis" => StatusKind::Paralysis,
            "sleep" => StatusKind::Sleep,
            "freeze" => StatusKind::Freeze,
            "confusion" => StatusKind::Confusion,
            "flinch" => StatusKind::Flinch,
            "protect" => StatusKind::Protect,
            "lock_move" => StatusKind::LockMove,
            "disable_move" => StatusKind::DisableMove,
            "encore" => StatusKind::Encore,
            "taunt" => StatusKind::Taunt,
            "leech_seed" => StatusKind::LeechSeed,
            "curse" => StatusKind::Curse,
            "yawn" => StatusKind::Yawn,
            "bind" => StatusKind::Bind,
            "delayed_effect" => StatusKind::DelayedEffect,
            "over_time_effect" => StatusKind::OverTimeEffect,
            "pending_switch" => StatusKind::PendingSwitch,
            "berry_consumed" => StatusKind::BerryConsumed,
            "item" => StatusKind::Item,
            "berry" => StatusKind::Berry,
            other if other.starts_with("charging_") => StatusKind::Charging,
            _ => return None,
        };
        Some(kind)
    }
}

/// What a status phase hands back to the resolver; a superset of the ability
/// outcome because statuses may also emit event transforms.
#[derive(Default)]
pub struct StatusHookOutcome {
    pub state: Option<BattleState>,
    pub events: Vec<BattleEvent>,
    pub prevent_action: bool,
    pub override_action: Option<Action>,
    pub transforms: Vec<EventTransform>,
}

/// Run one lifecycle hook across all statuses of `player_id`'s active, in
/// list order. Earlier handlers' state changes are visible to later ones.
pub fn run_status_hooks(
    state: &BattleState,
    player_id: &str,
    hook: LifecycleHook,
    ctx: &mut HookContext<'_>,
) -> StatusHookOutcome {
    let Some(active) = state.active(player_id) else {
        return StatusHookOutcome::default();
    };

    let mut working = state.clone();
    let mut outcome = StatusHookOutcome {
        state: None,
        ..StatusHookOutcome::default()
    };

    let statuses = active.statuses.clone();
    for status in &statuses {
        let result = dispatch_status(&working, player_id, hook, status, ctx);
        if let Some(next) = result.state {
            working = next;
        }
        outcome.events.extend(result.events);
        outcome.prevent_action |= result.prevent_action;
        if result.override_action.is_some() {
            outcome.override_action = result.override_action;
        }
        outcome.transforms.extend(result.transforms);
    }

    outcome.state = Some(working);
    outcome
}

fn dispatch_status(
    state: &BattleState,
    player_id: &str,
    hook: LifecycleHook,
    status: &StatusInstance,
    ctx: &mut HookContext<'_>,
) -> StatusHookOutcome {
    let Some(kind) = StatusKind::from_id(&status.id) else {
        return StatusHookOutcome::default();
    };
    match (kind, hook) {
        (StatusKind::Burn, LifecycleHook::TurnEnd) => {
            residual_damage(state, player_id, 16, "is hurt by its burn!")
        }
        (StatusKind::Poison | StatusKind::Toxic, LifecycleHook::TurnEnd) => {
            residual_damage(state, player_id, 8, "is hurt by poison!")
        }
        (StatusKind::Curse, LifecycleHook::TurnEnd) => {
            residual_damage(state, player_id, 4, "is afflicted by the curse!")
        }
        (StatusKind::Bind, LifecycleHook::TurnEnd) => bind_damage(state, player_id, status),
        (StatusKind::Paralysis, LifecycleHook::BeforeAction) => paralysis(state, player_id, ctx),
        (StatusKind::Sleep, LifecycleHook::BeforeAction) => sleep(state, player_id, ctx),
        (StatusKind::Freeze, LifecycleHook::BeforeAction) => freeze(state, player_id, ctx),
        (StatusKind::Confusion, LifecycleHook::BeforeAction) => confusion(state, player_id, ctx),
        (StatusKind::Flinch, LifecycleHook::BeforeAction) => flinch(state, player_id),
        (StatusKind::LockMove | StatusKind::Charging, LifecycleHook::BeforeAction) => {
            lock_move(state, player_id, status, ctx)
        }
        (StatusKind::DisableMove, LifecycleHook::BeforeAction) => {
            disable_move(state, player_id, status, ctx)
        }
        (StatusKind::Encore, LifecycleHook::BeforeAction) => encore(state, player_id, status, ctx),
        (StatusKind::Taunt, LifecycleHook::BeforeAction) => taunt(state, player_id, ctx),
        (StatusKind::LeechSeed, LifecycleHook::TurnEnd) => leech_seed(state, player_id, status),
        (StatusKind::Yawn, LifecycleHook::TurnEnd) => yawn(state, player_id, status, ctx),
        (StatusKind::DelayedEffect, LifecycleHook::TurnStart | LifecycleHook::TurnEnd) => {
            delayed_effect(state, player_id, status, hook, ctx, true)
        }
        (StatusKind::OverTimeEffect, LifecycleHook::TurnStart | LifecycleHook::TurnEnd) => {
            delayed_effect(state, player_id, status, hook, ctx, false)
        }
        _ => StatusHookOutcome::default(),
    }
}

/// Collect `onEventTransform` transforms from all statuses of one player.
pub fn collect_status_transforms(state: &BattleState, player_id: &str) -> Vec<EventTransform> {
    let Some(active) = state.active(player_id) else {
        return Vec::new();
    };
    let mut transforms = Vec::new();
    for status in &active.statuses {
        if StatusKind::from_id(&status.id) == Some(StatusKind::Protect) {
            for from in [EventKind::Damage, EventKind::ApplyStatus, EventKind::ModifyStage] {
                transforms.push(EventTransform {
                    kind: TransformKind::Replace,
                    from: Some(from),
                    target_id: Some(player_id.to_string()),
                    except_source_id: Some(player_id.to_string()),
                    to: vec![BattleEvent::Log {
                        message: format!("{} protected itself!", active.name),
                    }],
                    priority: 0,
                });
            }
        }
    }
    transforms
}

fn residual_damage(
    state: &BattleState,
    player_id: &str,
    divisor: i32,
    message: &str,
) -> StatusHookOutcome {
    let Some(active) = state.active(player_id) else {
        return StatusHookOutcome::default();
    };
    if active.hp <= 0 {
        return StatusHookOutcome::default();
    }
    let damage = (active.max_hp / divisor).max(1);
    StatusHookOutcome {
        events: vec![
            BattleEvent::Log {
                message: format!("{} {}", active.name, message),
            },
            BattleEvent::Damage {
                target_id: player_id.to_string(),
                amount: damage,
                meta: EventMeta::default(),
            },
        ],
        ..StatusHookOutcome::default()
    }
}

fn bind_damage(state: &BattleState, player_id: &str, status: &StatusInstance) -> StatusHookOutcome {
    let Some(active) = state.active(player_id) else {
        return StatusHookOutcome::default();
    };
    if active.hp <= 0 {
        return StatusHookOutcome::default();
    }
    let damage = (active.max_hp / 8).max(1);
    let source = status.data.move_name.as_deref().unwrap_or("the bind");
    StatusHookOutcome {
        events: vec![
            BattleEvent::Log {
                message: format!("{} is hurt by {}!", active.name, source),
            },
            BattleEvent::Damage {
                target_id: player_id.to_string(),
                amount: damage,
                meta: EventMeta::default(),
            },
        ],
        ..StatusHookOutcome::default()
    }
}

fn paralysis(state: &BattleState, player_id: &str, ctx: &mut HookContext<'_>) -> StatusHookOutcome {
    if ctx.rng.next_f64() < 0.25 {
        let name = state
            .active(player_id)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        StatusHookOutcome {
            prevent_action: true,
            events: vec![BattleEvent::Log {
                message: format!("{} is paralyzed! It can't move!", name),
            }],
            ..StatusHookOutcome::default()
        }
    } else {
        StatusHookOutcome::default()
    }
}

fn sleep(state: &BattleState, player_id: &str, ctx: &mut HookContext<'_>) -> StatusHookOutcome {
    let Some(active) = state.active(player_id) else {
        return StatusHookOutcome::default();
    };
    let name = active.name.clone();

    // The wake counter is resolved lazily: the first prevented action draws
    // a 2-4 turn duration if the status was applied without one.
    let current = match active.status("sleep").and_then(|s| s.data.turns) {
        Some(turns) => turns,
        None => 2 + (ctx.rng.next_f64() * 3.0).floor() as i32,
    };
    let next_turns = current - 1;

    if next_turns <= 0 {
        return StatusHookOutcome {
            events: vec![
                BattleEvent::RemoveStatus {
                    target_id: player_id.to_string(),
                    status_id: "sleep".to_string(),
                    meta: EventMeta::default(),
                },
                BattleEvent::Log {
                    message: format!("{} woke up!", name),
                },
            ],
            ..StatusHookOutcome::default()
        };
    }

    let mut next = state.clone();
    if let Some(creature) = next.active_mut(player_id) {
        if let Some(status) = creature.statuses.iter_mut().find(|s| s.id == "sleep") {
            status.data.turns = Some(next_turns);
        }
    }
    StatusHookOutcome {
        state: Some(next),
        prevent_action: true,
        events: vec![BattleEvent::Log {
            message: format!("{} is fast asleep.", name),
        }],
        ..StatusHookOutcome::default()
    }
}

fn freeze(state: &BattleState, player_id: &str, ctx: &mut HookContext<'_>) -> StatusHookOutcome {
    let Some(active) = state.active(player_id) else {
        return StatusHookOutcome::default();
    };
    let name = active.name.clone();
    if ctx.rng.next_f64() < 0.2 {
        StatusHookOutcome {
            events: vec![
                BattleEvent::RemoveStatus {
                    target_id: player_id.to_string(),
                    status_id: "freeze".to_string(),
                    meta: EventMeta::default(),
                },
                BattleEvent::Log {
                    message: format!("{} thawed out!", name),
                },
            ],
            ..StatusHookOutcome::default()
        }
    } else {
        StatusHookOutcome {
            prevent_action: true,
            events: vec![BattleEvent::Log {
                message: format!("{} is frozen solid!", name),
            }],
            ..StatusHookOutcome::default()
        }
    }
}

fn confusion(state: &BattleState, player_id: &str, ctx: &mut HookContext<'_>) -> StatusHookOutcome {
    let Some(active) = state.active(player_id) else {
        return StatusHookOutcome::default();
    };
    if ctx.rng.next_f64() < 0.33 {
        let damage = ((active.max_hp as f64) * 0.1).floor() as i32;
        StatusHookOutcome {
            prevent_action: true,
            events: vec![
                BattleEvent::Log {
                    message: format!("{} hurt itself in its confusion!", active.name),
                },
                BattleEvent::Damage {
                    target_id: player_id.to_string(),
                    amount: damage.max(1),
                    meta: EventMeta::default(),
                },
            ],
            ..StatusHookOutcome::default()
        }
    } else {
        StatusHookOutcome::default()
    }
}

fn flinch(state: &BattleState, player_id: &str) -> StatusHookOutcome {
    let name = state
        .active(player_id)
        .map(|c| c.name.clone())
        .unwrap_or_default();
    StatusHookOutcome {
        prevent_action: true,
        events: vec![BattleEvent::Log {
            message: format!("{} flinched and couldn't move!", name),
        }],
        ..StatusHookOutcome::default()
    }
}

fn lock_move(
    state: &BattleState,
    player_id: &str,
    status: &StatusInstance,
    ctx: &mut HookContext<'_>,
) -> StatusHookOutcome {
    let Some(action) = ctx.action else {
        return StatusHookOutcome::default();
    };
    let mode = status.data.mode;
    let mut forced = status.data.move_id.clone();

    if mode == Some(LockMode::ForceLastMove) && forced.is_none() {
        forced = state
            .active(player_id)
            .and_then(|c| c.scratch.last_move.clone())
            .or_else(|| last_move_from_history(state, player_id));
    }

    let (Some(move_id), Some(mode)) = (forced, mode) else {
        return StatusHookOutcome::default();
    };
    if action.move_id.as_deref() == Some(move_id.as_str()) {
        return StatusHookOutcome::default();
    }

    let mut new_action = action.clone();
    new_action.move_id = Some(move_id.clone());
    let name = state
        .active(player_id)
        .map(|c| c.name.clone())
        .unwrap_or_default();
    let message = match mode {
        LockMode::ForceLastMove => format!("{} can only use {}!", name, move_id),
        LockMode::ForceSpecific => format!("{} is locked into {}!", name, move_id),
    };
    StatusHookOutcome {
        override_action: Some(new_action),
        events: vec![BattleEvent::Log { message }],
        ..StatusHookOutcome::default()
    }
}

fn disable_move(
    state: &BattleState,
    player_id: &str,
    status: &StatusInstance,
    ctx: &mut HookContext<'_>,
) -> StatusHookOutcome {
    let (Some(move_id), Some(action)) = (status.data.move_id.as_deref(), ctx.action) else {
        return StatusHookOutcome::default();
    };
    if action.move_id.as_deref() != Some(move_id) {
        return StatusHookOutcome::default();
    }
    let name = state
        .active(player_id)
        .map(|c| c.name.clone())
        .unwrap_or_default();
    StatusHookOutcome {
        prevent_action: true,
        events: vec![BattleEvent::Log {
            message: format!("{}'s {} is disabled!", name, move_id),
        }],
        ..StatusHookOutcome::default()
    }
}

fn encore(
    state: &BattleState,
    player_id: &str,
    status: &StatusInstance,
    ctx: &mut HookContext<'_>,
) -> StatusHookOutcome {
    let (Some(move_id), Some(action)) = (status.data.move_id.as_deref(), ctx.action) else {
        return StatusHookOutcome::default();
    };
    if action.move_id.as_deref() == Some(move_id) {
        return StatusHookOutcome::default();
    }
    let mut new_action = action.clone();
    new_action.move_id = Some(move_id.to_string());
    let name = state
        .active(player_id)
        .map(|c| c.name.clone())
        .unwrap_or_default();
    StatusHookOutcome {
        override_action: Some(new_action),
        events: vec![BattleEvent::Log {
            message: format!("{} must repeat its encored move!", name),
        }],
        ..StatusHookOutcome::default()
    }
}

fn taunt(state: &BattleState, player_id: &str, ctx: &mut HookContext<'_>) -> StatusHookOutcome {
    let Some(move_data) = ctx.move_data else {
        return StatusHookOutcome::default();
    };
    if !move_data.is_status() {
        return StatusHookOutcome::default();
    }
    let name = state
        .active(player_id)
        .map(|c| c.name.clone())
        .unwrap_or_default();
    StatusHookOutcome {
        prevent_action: true,
        events: vec![BattleEvent::Log {
            message: format!("{} can't use {} after the taunt!", name, move_data.name),
        }],
        ..StatusHookOutcome::default()
    }
}

fn leech_seed(state: &BattleState, player_id: &str, status: &StatusInstance) -> StatusHookOutcome {
    let Some(source_id) = status.data.source_id.as_deref() else {
        return StatusHookOutcome::default();
    };
    // The planter drains only while it is still standing.
    match state.active(source_id) {
        Some(planter) if planter.hp > 0 => {}
        _ => return StatusHookOutcome::default(),
    }
    let Some(active) = state.active(player_id) else {
        return StatusHookOutcome::default();
    };
    if active.hp <= 0 {
        return StatusHookOutcome::default();
    }
    let drained = (active.max_hp / 8).max(1);
    StatusHookOutcome {
        events: vec![
            BattleEvent::Log {
                message: format!("{}'s health is sapped by leech seed!", active.name),
            },
            BattleEvent::Damage {
                target_id: player_id.to_string(),
                amount: drained,
                meta: EventMeta::default(),
            },
            BattleEvent::Damage {
                target_id: source_id.to_string(),
                amount: -drained,
                meta: EventMeta::default(),
            },
        ],
        ..StatusHookOutcome::default()
    }
}

fn yawn(
    state: &BattleState,
    player_id: &str,
    status: &StatusInstance,
    ctx: &mut HookContext<'_>,
) -> StatusHookOutcome {
    let Some(active) = state.active(player_id) else {
        return StatusHookOutcome::default();
    };
    let turns = status.data.turns.unwrap_or(1);
    if turns > 0 {
        let mut next = state.clone();
        if let Some(creature) = next.active_mut(player_id) {
            if let Some(yawning) = creature.statuses.iter_mut().find(|s| s.id == "yawn") {
                yawning.data.turns = Some(turns - 1);
            }
        }
        return StatusHookOutcome {
            state: Some(next),
            events: vec![BattleEvent::Log {
                message: format!("{} is getting drowsy...", active.name),
            }],
            ..StatusHookOutcome::default()
        };
    }

    // The drowsiness resolves: sleep lands with an RNG-resolved wake counter.
    let duration = 2 + (ctx.rng.next_f64() * 3.0).floor() as i32;
    StatusHookOutcome {
        events: vec![
            BattleEvent::RemoveStatus {
                target_id: player_id.to_string(),
                status_id: "yawn".to_string(),
                meta: EventMeta::default(),
            },
            BattleEvent::ApplyStatus {
                target_id: player_id.to_string(),
                status_id: "sleep".to_string(),
                duration: None,
                stack: false,
                data: StatusData {
                    turns: Some(duration),
                    ..StatusData::default()
                },
                meta: EventMeta::default(),
            },
        ],
        ..StatusHookOutcome::default()
    }
}

fn delayed_effect(
    state: &BattleState,
    player_id: &str,
    status: &StatusInstance,
    hook: LifecycleHook,
    ctx: &mut HookContext<'_>,
    check_trigger_turn: bool,
) -> StatusHookOutcome {
    let timing = status.data.timing.unwrap_or_default();
    let timing_matches = match timing {
        Timing::TurnStart => hook == LifecycleHook::TurnStart,
        Timing::TurnEnd => hook == LifecycleHook::TurnEnd,
    };
    if !timing_matches {
        return StatusHookOutcome::default();
    }
    if check_trigger_turn {
        let trigger = status.data.trigger_turn.unwrap_or(i32::MAX);
        if (state.turn as i32) < trigger {
            return StatusHookOutcome::default();
        }
    }

    let target_id = status.data.target_id.as_deref().unwrap_or(player_id);
    let attacker_id = status.data.source_id.as_deref().unwrap_or(player_id);
    match state.active(target_id) {
        Some(target) if target.hp > 0 => {}
        _ => return StatusHookOutcome::default(),
    }

    // Re-enter the effect compiler with the identities captured at cast time.
    let mut effect_ctx = EffectContext::new(attacker_id, target_id, None, ctx.rng, state.turn);
    let events = compile_effects(state, &status.data.effects, &mut effect_ctx);
    let next = apply_events(state, &events);
    StatusHookOutcome {
        state: Some(next),
        ..StatusHookOutcome::default()
    }
}

fn last_move_from_history(state: &BattleState, player_id: &str) -> Option<String> {
    let history = state.history.as_ref()?;
    for turn in history.turns.iter().rev() {
        for action in turn.actions.iter().rev() {
            if action.player_id == player_id {
                if let Some(move_id) = &action.move_id {
                    return Some(move_id.clone());
                }
            }
        }
    }
    None
}

/// End-of-turn held item residuals (leftovers, black sludge). Items are not
/// a registry of their own; the two end-of-turn items live here with the
/// statuses they behave like.
pub fn item_turn_end(state: &BattleState, player_id: &str) -> Vec<BattleEvent> {
    let Some(active) = state.active(player_id) else {
        return Vec::new();
    };
    if active.hp <= 0 {
        return Vec::new();
    }
    match active.item_id().as_deref() {
        Some("leftovers") => {
            if active.hp >= active.max_hp {
                return Vec::new();
            }
            let heal = (active.max_hp / 16).max(1);
            vec![
                BattleEvent::Log {
                    message: format!("{} restored a little HP with its leftovers!", active.name),
                },
                BattleEvent::Damage {
                    target_id: player_id.to_string(),
                    amount: -heal,
                    meta: EventMeta::default(),
                },
            ]
        }
        Some("black_sludge") => {
            if active.has_type("poison") {
                if active.hp >= active.max_hp {
                    return Vec::new();
                }
                let heal = (active.max_hp / 16).max(1);
                vec![
                    BattleEvent::Log {
                        message: format!("{} absorbed the black sludge!", active.name),
                    },
                    BattleEvent::Damage {
                        target_id: player_id.to_string(),
                        amount: -heal,
                        meta: EventMeta::default(),
                    },
                ]
            } else {
                let damage = (active.max_hp / 8).max(1);
                vec![
                    BattleEvent::Log {
                        message: format!("{} is hurt by the black sludge!", active.name),
                    },
                    BattleEvent::Damage {
                        target_id: player_id.to_string(),
                        amount: damage,
                        meta: EventMeta::default(),
                    },
                ]
            }
        }
        _ => Vec::new(),
    }
}
