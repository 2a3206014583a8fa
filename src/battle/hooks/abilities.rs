use std::collections::BTreeMap;

use crate::battle::events::{BattleEvent, EventMeta};
use crate::battle::hooks::field::Weather;
use crate::battle::hooks::{HookContext, HookOutcome, LifecycleHook};
use crate::battle::state::{BattleState, CreatureState};
use crate::move_data::{get_move, MoveCategory, MoveData, Stat};

/// Every ability the engine knows. Dispatch is by tag; there is no runtime
/// registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbilityKind {
    // Offensive multipliers
    PurePower,
    Sharpness,
    Technician,
    Steelworker,
    Hustle,
    Guts,
    // Defensive multipliers
    FurCoat,
    ThickFat,
    // Speed and priority
    SwiftSwim,
    Chlorophyll,
    QuickFeet,
    SlowStart,
    Prankster,
    // Crit and accuracy
    SuperLuck,
    Merciless,
    CompoundEyes,
    // Stage rewrites
    Contrary,
    Simple,
    // Event modifiers
    MagicBounce,
    LightningRod,
    Stamina,
    CottonDown,
    Berserk,
    Competitive,
    Opportunist,
    // Switch-in effects
    Intimidate,
    Download,
    Drought,
    Receiver,
    PowerOfAlchemy,
    // Immunities
    Immunity,
    Insomnia,
    OwnTempo,
    ClearBody,
    WhiteSmoke,
    HyperCutter,
    // Misc
    Libero,
    ShadowTag,
    SkillLink,
    Klutz,
    Unnerve,
    ParentalBond,
    Unaware,
    Moody,
}

impl AbilityKind {
    pub fn from_id(id: &str) -> Option<Self> {
        let kind = match id {
            "pure_power" => AbilityKind::PurePower,
            "sharpness" => AbilityKind::Sharpness,
            "technician" => AbilityKind::Technician,
            "steelworker" => AbilityKind::Steelworker,
            "hustle" => AbilityKind::Hustle,
            "guts" => AbilityKind::Guts,
            "fur_coat" => AbilityKind::FurCoat,
            "thick_fat" => AbilityKind::ThickFat,
            "swift_swim" => AbilityKind::SwiftSwim,
            "chlorophyll" => AbilityKind::Chlorophyll,
            "quick_feet" => AbilityKind::QuickFeet,
            "slow_start" => AbilityKind::SlowStart,
            "prankster" => AbilityKind::Prankster,
            "super_luck" => AbilityKind::SuperLuck,
            "merciless" => AbilityKind::Merciless,
            "compound_eyes" => AbilityKind::CompoundEyes,
            "contrary" => AbilityKind::Contrary,
            "simple" => AbilityKind::Simple,
            "magic_bounce" => AbilityKind::MagicBounce,
            "lightning_rod" => AbilityKind::LightningRod,
            "stamina" => AbilityKind::Stamina,
            "cotton_down" => AbilityKind::CottonDown,
            "berserk" => AbilityKind::Berserk,
            "competitive" => AbilityKind::Competitive,
            "opportunist" => AbilityKind::Opportunist,
            "intimidate" => AbilityKind::Intimidate,
            "download" => AbilityKind::Download,
            "drought" => AbilityKind::Drought,
            "receiver" => AbilityKind::Receiver,
            "power_of_alchemy" => AbilityKind::PowerOfAlchemy,
            "immunity" => AbilityKind::Immunity,
            "insomnia" => AbilityKind::Insomnia,
            "own_tempo" => AbilityKind::OwnTempo,
            "clear_body" => AbilityKind::ClearBody,
            "white_smoke" => AbilityKind::WhiteSmoke,
            "hyper_cutter" => AbilityKind::HyperCutter,
            "libero" => AbilityKind::Libero,
            "shadow_tag" => AbilityKind::ShadowTag,
            "skill_link" => AbilityKind::SkillLink,
            "klutz" => AbilityKind::Klutz,
            "unnerve" => AbilityKind::Unnerve,
            "parental_bond" => AbilityKind::ParentalBond,
            "unaware" => AbilityKind::Unaware,
            "moody" => AbilityKind::Moody,
            _ => return None,
        };
        Some(kind)
    }
}

fn ability_of(creature: &CreatureState) -> Option<AbilityKind> {
    creature.ability.as_deref().and_then(AbilityKind::from_id)
}

/// Scalar-modifying hook points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueHook {
    ModifyPower,
    DefensivePower,
    ModifyOffense,
    ModifyDefense,
    ModifyAccuracy,
    ModifyCritChance,
    ModifySpeed,
    ModifyPriority,
}

/// Context for value hooks; fields are filled in where the call site has them.
#[derive(Default)]
pub struct ValueContext<'a> {
    pub move_data: Option<&'a MoveData>,
    pub category: Option<MoveCategory>,
    pub target: Option<&'a CreatureState>,
    pub weather: Option<Weather>,
    pub turn: u32,
}

/// Run a value hook for `player_id`'s active ability against `value`.
pub fn ability_value_hook(
    state: &BattleState,
    player_id: &str,
    hook: ValueHook,
    value: f64,
    ctx: &ValueContext<'_>,
) -> f64 {
    let Some(active) = state.active(player_id) else {
        return value;
    };
    let Some(kind) = ability_of(active) else {
        return value;
    };
    let physical = ctx.category == Some(MoveCategory::Physical);
    let move_type = ctx.move_data.and_then(|m| m.move_type.as_deref());

    match (kind, hook) {
        (AbilityKind::PurePower, ValueHook::ModifyPower) if physical => value * 2.0,
        (AbilityKind::Sharpness, ValueHook::ModifyPower)
            if ctx.move_data.map(|m| m.has_tag("slicing")).unwrap_or(false) =>
        {
            value * 1.5
        }
        (AbilityKind::Technician, ValueHook::ModifyPower) if value <= 60.0 => value * 1.5,
        (AbilityKind::Steelworker, ValueHook::ModifyPower) if move_type == Some("steel") => {
            value * 1.5
        }
        (AbilityKind::Hustle, ValueHook::ModifyPower) if physical => value * 1.5,
        (AbilityKind::Hustle, ValueHook::ModifyAccuracy) if physical => value * 0.8,
        (AbilityKind::Guts, ValueHook::ModifyPower)
            if physical && active.has_primary_status() =>
        {
            value * 1.5
        }
        (AbilityKind::FurCoat, ValueHook::ModifyDefense) if physical => value * 2.0,
        (AbilityKind::ThickFat, ValueHook::DefensivePower)
            if matches!(move_type, Some("fire") | Some("ice")) =>
        {
            value * 0.5
        }
        (AbilityKind::SlowStart, ValueHook::ModifyOffense) if physical && ctx.turn <= 5 => {
            value * 0.5
        }
        (AbilityKind::SlowStart, ValueHook::ModifySpeed) if ctx.turn <= 5 => value * 0.5,
        (AbilityKind::SwiftSwim, ValueHook::ModifySpeed) if ctx.weather == Some(Weather::Rain) => {
            value * 2.0
        }
        (AbilityKind::Chlorophyll, ValueHook::ModifySpeed) if ctx.weather == Some(Weather::Sun) => {
            value * 2.0
        }
        (AbilityKind::QuickFeet, ValueHook::ModifySpeed) if active.has_primary_status() => {
            value * 1.5
        }
        (AbilityKind::Prankster, ValueHook::ModifyPriority)
            if ctx.move_data.map(|m| m.is_status()).unwrap_or(false) =>
        {
            value + 1.0
        }
        (AbilityKind::SuperLuck, ValueHook::ModifyCritChance) => value + 1.0,
        (AbilityKind::Merciless, ValueHook::ModifyCritChance) => {
            let poisoned = ctx
                .target
                .map(|t| t.has_status("poison") || t.has_status("toxic"))
                .unwrap_or(false);
            if poisoned {
                // Sentinel stage; anything >= 3 is a guaranteed crit.
                999.0
            } else {
                value
            }
        }
        (AbilityKind::CompoundEyes, ValueHook::ModifyAccuracy) => value * 1.3,
        _ => value,
    }
}

/// Boolean hook points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckHook {
    StatusImmunity,
    UsableItem,
    Trap,
    Immunity,
    SkillLink,
}

#[derive(Default)]
pub struct CheckContext<'a> {
    pub status_id: Option<&'a str>,
    /// Named immunity being probed, e.g. "intimidate".
    pub immunity_kind: Option<&'a str>,
    /// The player a trap check is being run against.
    pub target_id: Option<&'a str>,
}

/// Run a check hook for `player_id`'s active ability.
pub fn ability_check_hook(
    state: &BattleState,
    player_id: &str,
    hook: CheckHook,
    ctx: CheckContext<'_>,
    default_value: bool,
) -> bool {
    let Some(active) = state.active(player_id) else {
        return default_value;
    };
    let Some(kind) = ability_of(active) else {
        return default_value;
    };

    match (kind, hook) {
        (AbilityKind::Immunity, CheckHook::StatusImmunity) => {
            matches!(ctx.status_id, Some("poison") | Some("toxic"))
        }
        (AbilityKind::Insomnia, CheckHook::StatusImmunity) => ctx.status_id == Some("sleep"),
        (AbilityKind::OwnTempo, CheckHook::StatusImmunity) => ctx.status_id == Some("confusion"),
        (
            AbilityKind::OwnTempo
            | AbilityKind::ClearBody
            | AbilityKind::WhiteSmoke
            | AbilityKind::HyperCutter,
            CheckHook::Immunity,
        ) => ctx.immunity_kind == Some("intimidate"),
        (AbilityKind::Klutz | AbilityKind::Unnerve, CheckHook::UsableItem) => false,
        (AbilityKind::ShadowTag, CheckHook::Trap) => {
            let Some(target_id) = ctx.target_id else {
                return false;
            };
            if target_id == player_id {
                return false;
            }
            let target_ability = state
                .active(target_id)
                .and_then(|c| c.ability.as_deref());
            target_ability != Some("shadow_tag")
        }
        (AbilityKind::SkillLink, CheckHook::SkillLink) => true,
        _ => default_value,
    }
}

/// Contrary negates stage deltas, Simple doubles them.
pub fn rewrite_stage_deltas(
    state: &BattleState,
    target_id: &str,
    stages: &BTreeMap<Stat, i32>,
) -> BTreeMap<Stat, i32> {
    let Some(active) = state.active(target_id) else {
        return stages.clone();
    };
    match ability_of(active) {
        Some(AbilityKind::Contrary) => stages.iter().map(|(k, v)| (*k, -v)).collect(),
        Some(AbilityKind::Simple) => stages.iter().map(|(k, v)| (*k, v * 2)).collect(),
        _ => stages.clone(),
    }
}

/// Lifecycle dispatch for one player's active ability.
pub fn run_ability_hook(
    state: &BattleState,
    player_id: &str,
    hook: LifecycleHook,
    ctx: &mut HookContext<'_>,
) -> HookOutcome {
    let Some(active) = state.active(player_id) else {
        return HookOutcome::default();
    };
    let Some(kind) = ability_of(active) else {
        return HookOutcome::default();
    };

    match (kind, hook) {
        (AbilityKind::Intimidate, LifecycleHook::SwitchIn) => intimidate(state, player_id),
        (AbilityKind::Download, LifecycleHook::SwitchIn) => download(state, player_id),
        (AbilityKind::Drought, LifecycleHook::SwitchIn) => drought(state, player_id),
        (AbilityKind::Receiver, LifecycleHook::SwitchIn) => {
            inherit_fainted_ability(state, player_id, "receiver")
        }
        (AbilityKind::PowerOfAlchemy, LifecycleHook::SwitchIn) => {
            inherit_fainted_ability(state, player_id, "power_of_alchemy")
        }
        (AbilityKind::Libero, LifecycleHook::BeforeAction) => libero(state, player_id, ctx),
        (AbilityKind::Moody, LifecycleHook::TurnEnd) => moody(player_id, ctx),
        _ => HookOutcome::default(),
    }
}

/// Run one lifecycle hook on every player's active, in player order.
/// Mutations from earlier handlers are visible to later ones.
pub fn run_all_ability_hooks(
    state: &BattleState,
    hook: LifecycleHook,
    ctx: &mut HookContext<'_>,
) -> HookOutcome {
    let mut working = state.clone();
    let mut events = Vec::new();
    let ids: Vec<String> = working.players.iter().map(|p| p.id.clone()).collect();
    for player_id in ids {
        let result = run_ability_hook(&working, &player_id, hook, ctx);
        if let Some(next) = result.state {
            working = next;
        }
        events.extend(result.events);
    }
    HookOutcome {
        state: Some(working),
        events,
        prevent_action: false,
        override_action: None,
    }
}

fn stage_event(target_id: &str, stat: Stat, delta: i32, meta: EventMeta) -> BattleEvent {
    let mut stages = BTreeMap::new();
    stages.insert(stat, delta);
    BattleEvent::ModifyStage {
        target_id: target_id.to_string(),
        stages,
        clamp: true,
        fail_if_no_change: false,
        show_event: true,
        meta,
    }
}

fn intimidate(state: &BattleState, player_id: &str) -> HookOutcome {
    let Some(active) = state.active(player_id) else {
        return HookOutcome::default();
    };
    if active.ability_flags.intimidate_used {
        return HookOutcome::default();
    }
    let mut next = state.clone();
    if let Some(creature) = next.active_mut(player_id) {
        creature.ability_flags.intimidate_used = true;
    }
    let mut events = Vec::new();
    for other in &next.players {
        if other.id == player_id {
            continue;
        }
        let immune = ability_check_hook(
            &next,
            &other.id,
            CheckHook::Immunity,
            CheckContext {
                immunity_kind: Some("intimidate"),
                ..CheckContext::default()
            },
            false,
        );
        if immune {
            if let Some(target) = next.active(&other.id) {
                events.push(BattleEvent::Log {
                    message: format!("{} is not intimidated!", target.name),
                });
            }
            continue;
        }
        events.push(stage_event(
            &other.id,
            Stat::Atk,
            -1,
            EventMeta::from_move(None, Some(player_id)),
        ));
    }
    HookOutcome {
        state: Some(next),
        events,
        ..HookOutcome::default()
    }
}

fn download(state: &BattleState, player_id: &str) -> HookOutcome {
    let Some(active) = state.active(player_id) else {
        return HookOutcome::default();
    };
    if active.ability_flags.download_used {
        return HookOutcome::default();
    }
    let Some(opponent_id) = state.opponent_id(player_id) else {
        return HookOutcome::default();
    };
    let Some(target) = state.active(&opponent_id) else {
        return HookOutcome::default();
    };
    let raised = if target.defense < target.sp_defense {
        Stat::Atk
    } else {
        Stat::Spa
    };
    let mut next = state.clone();
    if let Some(creature) = next.active_mut(player_id) {
        creature.ability_flags.download_used = true;
    }
    HookOutcome {
        state: Some(next),
        events: vec![stage_event(
            player_id,
            raised,
            1,
            EventMeta::from_move(None, Some(player_id)),
        )],
        ..HookOutcome::default()
    }
}

fn drought(state: &BattleState, player_id: &str) -> HookOutcome {
    let Some(active) = state.active(player_id) else {
        return HookOutcome::default();
    };
    if active.ability_flags.drought_used {
        return HookOutcome::default();
    }
    let mut next = state.clone();
    if let Some(creature) = next.active_mut(player_id) {
        creature.ability_flags.drought_used = true;
    }
    HookOutcome {
        state: Some(next),
        events: vec![
            BattleEvent::ApplyFieldStatus {
                status_id: "sun".to_string(),
                duration: Some(5),
                stack: false,
                data: Default::default(),
                meta: EventMeta::from_move(None, Some(player_id)),
            },
            BattleEvent::Log {
                message: "The sunlight turned harsh!".to_string(),
            },
        ],
        ..HookOutcome::default()
    }
}

// Abilities that cannot be inherited through Receiver / Power of Alchemy.
const UNCOPYABLE: [&str; 2] = ["receiver", "power_of_alchemy"];

fn inherit_fainted_ability(state: &BattleState, player_id: &str, own_id: &str) -> HookOutcome {
    let Some(player) = state.player(player_id) else {
        return HookOutcome::default();
    };
    let Some(last) = player.last_fainted_ability.as_deref() else {
        return HookOutcome::default();
    };
    if last == own_id || UNCOPYABLE.contains(&last) {
        return HookOutcome::default();
    }
    let player_name = player.name.clone();
    let inherited = last.to_string();

    let mut next = state.clone();
    let Some(creature) = next.active_mut(player_id) else {
        return HookOutcome::default();
    };
    if creature.ability.as_deref() != Some(own_id) {
        return HookOutcome::default();
    }
    if creature.ability_flags.original_ability.is_none() {
        creature.ability_flags.original_ability = creature.ability.clone();
    }
    creature.ability = Some(inherited.clone());

    HookOutcome {
        state: Some(next),
        events: vec![BattleEvent::Log {
            message: format!("{} inherited {}!", player_name, inherited),
        }],
        ..HookOutcome::default()
    }
}

fn libero(state: &BattleState, player_id: &str, ctx: &mut HookContext<'_>) -> HookOutcome {
    let Some(active) = state.active(player_id) else {
        return HookOutcome::default();
    };
    if active.ability_flags.libero_used {
        return HookOutcome::default();
    }
    // Asleep or frozen creatures do not shift type.
    if active.has_status("sleep") || active.has_status("freeze") {
        return HookOutcome::default();
    }
    let Some(move_data) = ctx.move_data else {
        return HookOutcome::default();
    };
    let Some(move_type) = move_data.move_type.as_deref() else {
        return HookOutcome::default();
    };
    let name = active.name.clone();
    let mut next = state.clone();
    if let Some(creature) = next.active_mut(player_id) {
        creature.types = vec![move_type.to_string()];
        creature.ability_flags.libero_used = true;
    }
    HookOutcome {
        state: Some(next),
        events: vec![BattleEvent::Log {
            message: format!("{} became {}-type!", name, move_type),
        }],
        ..HookOutcome::default()
    }
}

fn moody(player_id: &str, ctx: &mut HookContext<'_>) -> HookOutcome {
    const STATS: [Stat; 5] = [Stat::Atk, Stat::Def, Stat::Spa, Stat::Spd, Stat::Spe];
    let up = ((ctx.rng.next_f64() * STATS.len() as f64).floor() as usize).min(STATS.len() - 1);
    // Second draw picks among the remaining four, so it can never collide.
    let mut down = ((ctx.rng.next_f64() * (STATS.len() - 1) as f64).floor() as usize)
        .min(STATS.len() - 2);
    if down >= up {
        down += 1;
    }
    let mut stages = BTreeMap::new();
    stages.insert(STATS[up], 2);
    stages.insert(STATS[down], -1);
    HookOutcome {
        events: vec![BattleEvent::ModifyStage {
            target_id: player_id.to_string(),
            stages,
            clamp: true,
            fail_if_no_change: false,
            show_event: true,
            meta: EventMeta::from_move(None, Some(player_id)),
        }],
        ..HookOutcome::default()
    }
}

/// The interceptor/reactor pass run between effect compilation and event
/// application (`onTryHit` + `onAfterEvent`).
pub fn apply_ability_event_modifiers(
    state: &BattleState,
    events: &[BattleEvent],
) -> Vec<BattleEvent> {
    let mut output = Vec::new();
    for event in events {
        let mut current = vec![event.clone()];
        if let Some(target_id) = event.target_id().map(str::to_string) {
            if let Some(target) = state.active(&target_id) {
                let replacement = match ability_of(target) {
                    Some(AbilityKind::MagicBounce) => try_magic_bounce(event, target),
                    Some(AbilityKind::LightningRod) => {
                        try_lightning_rod(event, &target_id, target)
                    }
                    _ => None,
                };
                if let Some(replaced) = replacement {
                    current = replaced;
                }
            }
        }
        for processed in current {
            output.push(processed.clone());
            for player in &state.players {
                let Some(active) = state.active(&player.id) else {
                    continue;
                };
                let reactions = match ability_of(active) {
                    Some(AbilityKind::Stamina) => after_stamina(&processed, &player.id),
                    Some(AbilityKind::CottonDown) => {
                        after_cotton_down(state, &processed, &player.id)
                    }
                    Some(AbilityKind::Berserk) => after_berserk(state, &processed, &player.id),
                    Some(AbilityKind::Competitive) => after_competitive(&processed, &player.id),
                    Some(AbilityKind::Opportunist) => after_opportunist(&processed, &player.id),
                    _ => Vec::new(),
                };
                output.extend(reactions);
            }
        }
    }
    output
}

fn is_reflectable(event: &BattleEvent) -> bool {
    matches!(
        event,
        BattleEvent::ApplyStatus { .. }
            | BattleEvent::RemoveStatus { .. }
            | BattleEvent::ReplaceStatus { .. }
            | BattleEvent::ModifyStage { .. }
            | BattleEvent::ClearStages { .. }
            | BattleEvent::ResetStages { .. }
            | BattleEvent::CureAllStatus { .. }
    )
}

fn try_magic_bounce(event: &BattleEvent, holder: &CreatureState) -> Option<Vec<BattleEvent>> {
    let meta = event.meta()?;
    if meta.bounced {
        return None;
    }
    let source = meta.source.clone()?;
    let target = event.target_id()?.to_string();
    if source == target {
        return None;
    }
    let move_data = get_move(meta.move_id.as_deref()?)?;
    if !is_reflectable(event) || !move_data.is_status() {
        return None;
    }

    let mut bounced = event.clone();
    bounced.set_target_id(&source);
    if let Some(meta) = bounced.meta_mut() {
        meta.source = Some(target);
        meta.bounced = true;
    }
    Some(vec![
        BattleEvent::Log {
            message: format!("{} bounced the move back!", holder.name),
        },
        bounced,
    ])
}

fn try_lightning_rod(
    event: &BattleEvent,
    holder_id: &str,
    holder: &CreatureState,
) -> Option<Vec<BattleEvent>> {
    let meta = event.meta()?;
    let move_data = get_move(meta.move_id.as_deref()?)?;
    if move_data.move_type.as_deref() != Some("electric") {
        return None;
    }
    Some(vec![
        stage_event(holder_id, Stat::Spa, 1, EventMeta::default()),
        BattleEvent::Log {
            message: format!("{} drew in the electric attack!", holder.name),
        },
    ])
}

fn after_stamina(event: &BattleEvent, player_id: &str) -> Vec<BattleEvent> {
    match event {
        BattleEvent::Damage {
            target_id, amount, ..
        } if target_id == player_id && *amount > 0 => vec![stage_event(
            player_id,
            Stat::Def,
            1,
            EventMeta::default(),
        )],
        _ => Vec::new(),
    }
}

fn after_cotton_down(state: &BattleState, event: &BattleEvent, player_id: &str) -> Vec<BattleEvent> {
    match event {
        BattleEvent::Damage {
            target_id, amount, ..
        } if target_id == player_id && *amount > 0 => state
            .players
            .iter()
            .filter(|p| p.id != player_id)
            .map(|p| stage_event(&p.id, Stat::Spe, -1, EventMeta::default()))
            .collect(),
        _ => Vec::new(),
    }
}

fn after_berserk(state: &BattleState, event: &BattleEvent, player_id: &str) -> Vec<BattleEvent> {
    match event {
        BattleEvent::Damage {
            target_id, amount, ..
        } if target_id == player_id => {
            let Some(holder) = state.active(player_id) else {
                return Vec::new();
            };
            let half = holder.max_hp / 2;
            if holder.hp > half && holder.hp - amount <= half {
                vec![stage_event(player_id, Stat::Spa, 1, EventMeta::default())]
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    }
}

fn after_competitive(event: &BattleEvent, player_id: &str) -> Vec<BattleEvent> {
    match event {
        BattleEvent::ModifyStage {
            target_id,
            stages,
            meta,
            ..
        } if target_id == player_id => {
            // Only opponent-inflicted drops trigger the boost.
            let from_opponent = matches!(&meta.source, Some(s) if s != player_id);
            if meta.competitive || !from_opponent || !stages.values().any(|v| *v < 0) {
                return Vec::new();
            }
            let reaction_meta = EventMeta {
                competitive: true,
                ..EventMeta::default()
            };
            vec![stage_event(player_id, Stat::Spa, 2, reaction_meta)]
        }
        _ => Vec::new(),
    }
}

fn after_opportunist(event: &BattleEvent, player_id: &str) -> Vec<BattleEvent> {
    match event {
        BattleEvent::ModifyStage {
            target_id,
            stages,
            meta,
            ..
        } if target_id != player_id => {
            if meta.opportunist {
                return Vec::new();
            }
            let boosts: BTreeMap<Stat, i32> = stages
                .iter()
                .filter(|(_, v)| **v > 0)
                .map(|(k, v)| (*k, *v))
                .collect();
            if boosts.is_empty() {
                return Vec::new();
            }
            vec![BattleEvent::ModifyStage {
                target_id: player_id.to_string(),
                stages: boosts,
                clamp: true,
                fail_if_no_change: false,
                show_event: true,
                meta: EventMeta {
                    opportunist: true,
                    ..EventMeta::default()
                },
            }]
        }
        _ => Vec::new(),
    }
}
