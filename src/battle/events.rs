use std::collections::BTreeMap;

use crate::battle::hooks::abilities::{ability_check_hook, rewrite_stage_deltas, CheckContext, CheckHook};
use crate::battle::state::{
    is_primary_status, is_weather_id, BattleState, FieldEffectInstance, StatusInstance,
};
use crate::move_data::{MovePool, Stat, StatusData};

/// Provenance and routing flags carried by every event, consumed by hooks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventMeta {
    /// Player id the event originated from.
    pub source: Option<String>,
    /// Move id that produced the event, if any.
    pub move_id: Option<String>,
    /// Set on events reflected by Magic Bounce; stops infinite loops.
    pub bounced: bool,
    /// Marks the second Parental Bond hit (suppresses its crit roll).
    pub parental_bond: bool,
    /// Whether event transforms may cancel or replace this event.
    pub cancellable: bool,
    /// Marks a Competitive reaction so it does not re-trigger itself.
    pub competitive: bool,
    /// Marks an Opportunist mirror so it does not re-trigger itself.
    pub opportunist: bool,
}

impl EventMeta {
    pub fn from_move(move_id: Option<&str>, source: Option<&str>) -> Self {
        Self {
            source: source.map(|s| s.to_string()),
            move_id: move_id.map(|m| m.to_string()),
            ..Self::default()
        }
    }
}

/// The closed mutation vocabulary. Every state change flows through
/// `apply_event`; hooks can only cancel, replace, redirect or append these.
#[derive(Clone, Debug, PartialEq)]
pub enum BattleEvent {
    Log {
        message: String,
    },
    Damage {
        target_id: String,
        amount: i32,
        meta: EventMeta,
    },
    ApplyStatus {
        target_id: String,
        status_id: String,
        duration: Option<i32>,
        stack: bool,
        data: StatusData,
        meta: EventMeta,
    },
    RemoveStatus {
        target_id: String,
        status_id: String,
        meta: EventMeta,
    },
    ReplaceStatus {
        target_id: String,
        from: String,
        to: String,
        duration: Option<i32>,
        data: StatusData,
        meta: EventMeta,
    },
    CureAllStatus {
        target_id: String,
        meta: EventMeta,
    },
    ApplyFieldStatus {
        status_id: String,
        duration: Option<i32>,
        stack: bool,
        data: StatusData,
        meta: EventMeta,
    },
    RemoveFieldStatus {
        status_id: String,
        meta: EventMeta,
    },
    ModifyStage {
        target_id: String,
        stages: BTreeMap<Stat, i32>,
        clamp: bool,
        fail_if_no_change: bool,
        show_event: bool,
        meta: EventMeta,
    },
    ClearStages {
        target_id: String,
        meta: EventMeta,
    },
    ResetStages {
        target_id: String,
        meta: EventMeta,
    },
    Switch {
        player_id: String,
        slot: usize,
    },
    /// Sentinel; the resolver expands it into a concrete move's events.
    RandomMove {
        pool: MovePool,
        meta: EventMeta,
    },
    /// Writes the consecutive-protect counter through the applier.
    SetProtectCount {
        target_id: String,
        count: i32,
    },
}

/// Discriminant used by event transforms to match events by shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Log,
    Damage,
    ApplyStatus,
    RemoveStatus,
    ReplaceStatus,
    CureAllStatus,
    ApplyFieldStatus,
    RemoveFieldStatus,
    ModifyStage,
    ClearStages,
    ResetStages,
    Switch,
    RandomMove,
    SetProtectCount,
}

impl BattleEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BattleEvent::Log { .. } => EventKind::Log,
            BattleEvent::Damage { .. } => EventKind::Damage,
            BattleEvent::ApplyStatus { .. } => EventKind::ApplyStatus,
            BattleEvent::RemoveStatus { .. } => EventKind::RemoveStatus,
            BattleEvent::ReplaceStatus { .. } => EventKind::ReplaceStatus,
            BattleEvent::CureAllStatus { .. } => EventKind::CureAllStatus,
            BattleEvent::ApplyFieldStatus { .. } => EventKind::ApplyFieldStatus,
            BattleEvent::RemoveFieldStatus { .. } => EventKind::RemoveFieldStatus,
            BattleEvent::ModifyStage { .. } => EventKind::ModifyStage,
            BattleEvent::ClearStages { .. } => EventKind::ClearStages,
            BattleEvent::ResetStages { .. } => EventKind::ResetStages,
            BattleEvent::Switch { .. } => EventKind::Switch,
            BattleEvent::RandomMove { .. } => EventKind::RandomMove,
            BattleEvent::SetProtectCount { .. } => EventKind::SetProtectCount,
        }
    }

    /// The player whose active creature this event acts on, if any.
    pub fn target_id(&self) -> Option<&str> {
        match self {
            BattleEvent::Damage { target_id, .. }
            | BattleEvent::ApplyStatus { target_id, .. }
            | BattleEvent::RemoveStatus { target_id, .. }
            | BattleEvent::ReplaceStatus { target_id, .. }
            | BattleEvent::CureAllStatus { target_id, .. }
            | BattleEvent::ModifyStage { target_id, .. }
            | BattleEvent::ClearStages { target_id, .. }
            | BattleEvent::ResetStages { target_id, .. }
            | BattleEvent::SetProtectCount { target_id, .. } => Some(target_id),
            _ => None,
        }
    }

    pub fn set_target_id(&mut self, new_target: &str) {
        match self {
            BattleEvent::Damage { target_id, .. }
            | BattleEvent::ApplyStatus { target_id, .. }
            | BattleEvent::RemoveStatus { target_id, .. }
            | BattleEvent::ReplaceStatus { target_id, .. }
            | BattleEvent::CureAllStatus { target_id, .. }
            | BattleEvent::ModifyStage { target_id, .. }
            | BattleEvent::ClearStages { target_id, .. }
            | BattleEvent::ResetStages { target_id, .. }
            | BattleEvent::SetProtectCount { target_id, .. } => {
                *target_id = new_target.to_string();
            }
            _ => {}
        }
    }

    pub fn meta(&self) -> Option<&EventMeta> {
        match self {
            BattleEvent::Damage { meta, .. }
            | BattleEvent::ApplyStatus { meta, .. }
            | BattleEvent::RemoveStatus { meta, .. }
            | BattleEvent::ReplaceStatus { meta, .. }
            | BattleEvent::CureAllStatus { meta, .. }
            | BattleEvent::ApplyFieldStatus { meta, .. }
            | BattleEvent::RemoveFieldStatus { meta, .. }
            | BattleEvent::ModifyStage { meta, .. }
            | BattleEvent::ClearStages { meta, .. }
            | BattleEvent::ResetStages { meta, .. }
            | BattleEvent::RandomMove { meta, .. } => Some(meta),
            _ => None,
        }
    }

    pub fn meta_mut(&mut self) -> Option<&mut EventMeta> {
        match self {
            BattleEvent::Damage { meta, .. }
            | BattleEvent::ApplyStatus { meta, .. }
            | BattleEvent::RemoveStatus { meta, .. }
            | BattleEvent::ReplaceStatus { meta, .. }
            | BattleEvent::CureAllStatus { meta, .. }
            | BattleEvent::ApplyFieldStatus { meta, .. }
            | BattleEvent::RemoveFieldStatus { meta, .. }
            | BattleEvent::ModifyStage { meta, .. }
            | BattleEvent::ClearStages { meta, .. }
            | BattleEvent::ResetStages { meta, .. }
            | BattleEvent::RandomMove { meta, .. } => Some(meta),
            _ => None,
        }
    }
}

/// Apply a sequence of events in order.
pub fn apply_events(state: &BattleState, events: &[BattleEvent]) -> BattleState {
    let mut next = state.clone();
    for event in events {
        next = apply_event(&next, event);
    }
    next
}

/// The only function permitted to mutate battle state. Consumes no RNG and
/// calls no hooks beyond the status-immunity check and the stage rewrite.
pub fn apply_event(state: &BattleState, event: &BattleEvent) -> BattleState {
    let mut next = state.clone();
    match event {
        BattleEvent::Log { message } => {
            next.log.push(message.clone());
        }
        BattleEvent::Damage {
            target_id, amount, ..
        } => {
            apply_damage(&mut next, target_id, *amount);
        }
        BattleEvent::ApplyStatus {
            target_id,
            status_id,
            duration,
            stack,
            data,
            ..
        } => {
            apply_status(&mut next, target_id, status_id, *duration, *stack, data);
        }
        BattleEvent::RemoveStatus {
            target_id,
            status_id,
            ..
        } => {
            if let Some(active) = next.active_mut(target_id) {
                active.statuses.retain(|s| s.id != *status_id);
                if status_id == "item" || status_id == "berry" {
                    active.item = None;
                }
            }
        }
        BattleEvent::ReplaceStatus {
            target_id,
            from,
            to,
            duration,
            data,
            ..
        } => {
            if let Some(active) = next.active_mut(target_id) {
                if active.has_status(from) {
                    active.statuses.retain(|s| s.id != *from);
                    active.statuses.push(StatusInstance {
                        id: to.clone(),
                        remaining_turns: *duration,
                        data: data.clone(),
                    });
                }
            }
        }
        BattleEvent::CureAllStatus { target_id, .. } => {
            if let Some(active) = next.active_mut(target_id) {
                active.statuses.clear();
            }
        }
        BattleEvent::ApplyFieldStatus {
            status_id,
            duration,
            stack,
            data,
            ..
        } => {
            // A new weather always evicts the old one; duplicates of any
            // non-stacking effect replace in place.
            if is_weather_id(status_id) {
                next.field.global.retain(|e| !is_weather_id(&e.id));
            } else if !*stack {
                next.field.global.retain(|e| e.id != *status_id);
            }
            next.field.global.push(FieldEffectInstance {
                id: status_id.clone(),
                remaining_turns: *duration,
                data: data.clone(),
            });
        }
        BattleEvent::RemoveFieldStatus { status_id, .. } => {
            next.field.global.retain(|e| e.id != *status_id);
        }
        BattleEvent::ModifyStage {
            target_id,
            stages,
            clamp,
            show_event,
            ..
        } => {
            apply_modify_stage(&mut next, target_id, stages, *clamp, *show_event);
        }
        BattleEvent::ClearStages { target_id, .. } | BattleEvent::ResetStages { target_id, .. } => {
            if let Some(active) = next.active_mut(target_id) {
                active.stages = Default::default();
            }
        }
        BattleEvent::Switch { player_id, slot } => {
            apply_switch(&mut next, player_id, *slot);
        }
        BattleEvent::RandomMove { .. } => {
            // Sentinel only; the resolver expands it before events are applied.
        }
        BattleEvent::SetProtectCount { target_id, count } => {
            if let Some(active) = next.active_mut(target_id) {
                active.scratch.protect_success_count = *count;
            }
        }
    }
    next
}

fn apply_damage(state: &mut BattleState, target_id: &str, amount: i32) {
    let Some(player) = state.players.iter_mut().find(|p| p.id == target_id) else {
        return;
    };
    let slot = player.active_slot;
    let Some(active) = player.team.get_mut(slot) else {
        return;
    };

    let name = active.name.clone();
    active.hp = (active.hp - amount).clamp(0, active.max_hp);
    if amount > 0 {
        state.log.push(format!("{} took {} damage!", name, amount));
    } else if amount < 0 {
        state.log.push(format!("{} recovered {} HP!", name, -amount));
    } else {
        state.log.push(format!("It doesn't affect {}...", name));
    }

    if active.hp <= 0 {
        state.log.push(format!("{} fainted!", name));
        player.last_fainted_ability = active.ability.clone();
        if !active.has_status("pending_switch") {
            active
                .statuses
                .push(StatusInstance::new("pending_switch", None));
        }
    }
}

fn apply_status(
    state: &mut BattleState,
    target_id: &str,
    status_id: &str,
    duration: Option<i32>,
    stack: bool,
    data: &StatusData,
) {
    let blocked = ability_check_hook(
        state,
        target_id,
        CheckHook::StatusImmunity,
        CheckContext {
            status_id: Some(status_id),
            ..CheckContext::default()
        },
        false,
    );
    if blocked {
        if let Some(active) = state.active(target_id) {
            let name = active.name.clone();
            state
                .log
                .push(format!("{} is unaffected by {}!", name, status_id));
        }
        return;
    }

    let Some(active) = state.active_mut(target_id) else {
        return;
    };
    // Item statuses normalize the scalar representation too.
    if status_id == "item" || status_id == "berry" {
        if let Some(item_id) = &data.item_id {
            active.item = Some(item_id.clone());
        }
    }
    if !stack && active.has_status(status_id) {
        let name = active.name.clone();
        state
            .log
            .push(format!("{} already has {}!", name, status_id));
        return;
    }
    active.statuses.push(StatusInstance {
        id: status_id.to_string(),
        remaining_turns: duration,
        data: data.clone(),
    });
}

fn apply_modify_stage(
    state: &mut BattleState,
    target_id: &str,
    stages: &BTreeMap<Stat, i32>,
    clamp: bool,
    show_event: bool,
) {
    // Contrary and Simple rewrite the deltas before they land.
    let adjusted = rewrite_stage_deltas(state, target_id, stages);
    let Some(active) = state.active_mut(target_id) else {
        return;
    };
    let name = active.name.clone();
    let mut lines = Vec::new();
    for (stat, delta) in &adjusted {
        let entry = active.stages.get_mut(*stat);
        let mut new_value = *entry + delta;
        if clamp {
            new_value = new_value.clamp(-6, 6);
        }
        if new_value != *entry {
            let applied = new_value - *entry;
            *entry = new_value;
            if show_event {
                let direction = if applied > 0 { "rose" } else { "fell" };
                let adverb = if applied.abs() >= 2 { " sharply" } else { "" };
                lines.push(format!(
                    "{}'s {}{} {}!",
                    name,
                    stat.label(),
                    adverb,
                    direction
                ));
            }
        }
    }
    state.log.extend(lines);
}

fn apply_switch(state: &mut BattleState, player_id: &str, slot: usize) {
    let Some(player) = state.players.iter_mut().find(|p| p.id == player_id) else {
        return;
    };
    if slot >= player.team.len() {
        return;
    }
    if let Some(outgoing) = player.team.get_mut(player.active_slot) {
        outgoing.stages = Default::default();
        outgoing.statuses.retain(|s| is_primary_status(&s.id));
        outgoing.ability_flags = Default::default();
        outgoing.scratch = Default::default();
    }
    player.active_slot = slot;
    let player_name = player.name.clone();
    if let Some(incoming) = player.team.get_mut(slot) {
        incoming.statuses.retain(|s| s.id != "pending_switch");
        let name = incoming.name.clone();
        state.log.push(format!("{} sent out {}!", player_name, name));
    }
}
