use crate::battle::events::{apply_events, BattleEvent, EventMeta};
use crate::battle::hooks::abilities::{
    ability_check_hook, ability_value_hook, AbilityKind, CheckContext, CheckHook, ValueContext,
    ValueHook,
};
use crate::battle::hooks::field::get_weather;
use crate::battle::state::{stage_multiplier, BattleState, CreatureState, TurnRng};
use crate::move_data::{
    Condition, CountSpec, DurationSpec, Effect, MoveCategory, MoveData, StatusData, TargetRef,
    Timing,
};
use crate::type_chart;

/// Compilation context for one move (or one delayed-effect firing).
pub struct EffectContext<'a> {
    pub attacker_id: String,
    pub target_id: String,
    pub move_data: Option<&'a MoveData>,
    pub rng: &'a mut TurnRng,
    pub turn: u32,
    /// Set once the "X used Y!" line has been emitted for this move.
    pub used_logged: bool,
}

impl<'a> EffectContext<'a> {
    pub fn new(
        attacker_id: &str,
        target_id: &str,
        move_data: Option<&'a MoveData>,
        rng: &'a mut TurnRng,
        turn: u32,
    ) -> Self {
        Self {
            attacker_id: attacker_id.to_string(),
            target_id: target_id.to_string(),
            move_data,
            rng,
            turn,
            used_logged: false,
        }
    }

    fn meta(&self) -> EventMeta {
        EventMeta::from_move(
            self.move_data.map(|m| m.id.as_str()),
            Some(&self.attacker_id),
        )
    }

    /// Meta for events that hostile-facing transforms (Protect) may rewrite.
    fn offensive_meta(&self) -> EventMeta {
        let mut meta = self.meta();
        meta.cancellable = true;
        meta
    }
}

/// Translate an ordered effect list into an ordered event list, resolving
/// every piece of randomness along the way.
pub fn compile_effects(
    state: &BattleState,
    effects: &[Effect],
    ctx: &mut EffectContext<'_>,
) -> Vec<BattleEvent> {
    let mut events = Vec::new();
    for effect in effects {
        events.extend(compile_effect(state, effect, ctx));
    }
    events
}

fn compile_effect(
    state: &BattleState,
    effect: &Effect,
    ctx: &mut EffectContext<'_>,
) -> Vec<BattleEvent> {
    match effect {
        Effect::Damage { power, accuracy } => damage_effect(state, *power, *accuracy, ctx),
        Effect::SpeedBasedDamage {
            thresholds,
            base_power,
            accuracy,
        } => speed_based_damage(state, thresholds, *base_power, *accuracy, ctx),
        Effect::Ohko {
            base_accuracy,
            required_type,
            non_matching_type_accuracy,
            level_scaling,
            respect_type_immunity,
            immune_types,
        } => ohko(
            state,
            *base_accuracy,
            required_type.as_deref(),
            *non_matching_type_accuracy,
            *level_scaling,
            *respect_type_immunity,
            immune_types,
            ctx,
        ),
        Effect::ApplyStatus {
            status_id,
            duration,
            stack,
            target,
            data,
        } => apply_status_effect(state, status_id, *duration, *stack, *target, data, ctx),
        Effect::RemoveStatus { status_id, target } => {
            vec![BattleEvent::RemoveStatus {
                target_id: resolve_target(*target, ctx),
                status_id: status_id.clone(),
                meta: ctx.meta(),
            }]
        }
        Effect::ReplaceStatus {
            from,
            to,
            duration,
            target,
            data,
        } => {
            vec![BattleEvent::ReplaceStatus {
                target_id: resolve_target(*target, ctx),
                from: from.clone(),
                to: to.clone(),
                duration: *duration,
                data: resolve_data(data, ctx),
                meta: ctx.meta(),
            }]
        }
        Effect::CureAllStatus { target } => {
            vec![BattleEvent::CureAllStatus {
                target_id: resolve_target(*target, ctx),
                meta: ctx.meta(),
            }]
        }
        Effect::ModifyStage { target, stages } => {
            let target_id = resolve_target(*target, ctx);
            vec![BattleEvent::ModifyStage {
                target_id,
                stages: stages.clone(),
                clamp: true,
                fail_if_no_change: false,
                show_event: true,
                meta: ctx.offensive_meta(),
            }]
        }
        Effect::ClearStages { target } => {
            vec![BattleEvent::ClearStages {
                target_id: resolve_target(*target, ctx),
                meta: ctx.meta(),
            }]
        }
        Effect::ResetStages { target } => {
            vec![BattleEvent::ResetStages {
                target_id: resolve_target(*target, ctx),
                meta: ctx.meta(),
            }]
        }
        Effect::DisableMove {
            move_id,
            duration,
            target,
        } => disable_move(state, move_id.as_deref(), *duration, *target, ctx),
        Effect::Chance { p, then, otherwise } => {
            let branch = if ctx.rng.next_f64() <= *p {
                then
            } else {
                otherwise
            };
            compile_effects(state, branch, ctx)
        }
        Effect::Repeat { times, effects } => repeat(state, *times, effects, ctx),
        Effect::Conditional {
            condition,
            then,
            otherwise,
        } => {
            let branch = if evaluate_condition(state, condition, ctx) {
                then
            } else {
                otherwise
            };
            compile_effects(state, branch, ctx)
        }
        Effect::DamageRatio {
            ratio_max_hp,
            target,
        } => damage_ratio(state, *ratio_max_hp, *target, ctx),
        Effect::Delay {
            after_turns,
            timing,
            effects,
            target,
        } => delay(*after_turns, *timing, effects, *target, ctx),
        Effect::OverTime {
            duration,
            timing,
            effects,
            target,
        } => over_time(*duration, *timing, effects, *target, ctx),
        Effect::ApplyItem { item_id, target } => apply_item(state, item_id, *target, ctx),
        Effect::RemoveItem { target } => remove_item(state, *target, ctx),
        Effect::ConsumeItem { target } => consume_item(state, *target, ctx),
        Effect::Protect => protect(state, ctx),
        Effect::SelfSwitch => pending_switch(&ctx.attacker_id.clone(), ctx),
        Effect::ForceSwitch { target } => {
            let target_id = resolve_target(*target, ctx);
            pending_switch(&target_id, ctx)
        }
        Effect::LockMove {
            duration,
            target,
            data,
        } => {
            vec![BattleEvent::ApplyStatus {
                target_id: resolve_target(*target, ctx),
                status_id: "lock_move".to_string(),
                duration: *duration,
                stack: false,
                data: resolve_data(data, ctx),
                meta: ctx.meta(),
            }]
        }
        Effect::Log { message } => vec![BattleEvent::Log {
            message: message.clone(),
        }],
        Effect::RandomMove { pool } => vec![BattleEvent::RandomMove {
            pool: *pool,
            meta: ctx.meta(),
        }],
        Effect::ApplyFieldStatus {
            status_id,
            duration,
            stack,
        } => vec![BattleEvent::ApplyFieldStatus {
            status_id: status_id.clone(),
            duration: *duration,
            stack: *stack,
            data: StatusData::default(),
            meta: ctx.meta(),
        }],
        Effect::RemoveFieldStatus { status_id } => vec![BattleEvent::RemoveFieldStatus {
            status_id: status_id.clone(),
            meta: ctx.meta(),
        }],
    }
}

fn resolve_target(target: TargetRef, ctx: &EffectContext<'_>) -> String {
    match target {
        TargetRef::Target => ctx.target_id.clone(),
        TargetRef::User => ctx.attacker_id.clone(),
    }
}

/// `sourceId: "self"` in move data resolves to the attacking player.
fn resolve_data(data: &StatusData, ctx: &EffectContext<'_>) -> StatusData {
    let mut resolved = data.clone();
    if resolved.source_id.as_deref() == Some("self") {
        resolved.source_id = Some(ctx.attacker_id.clone());
    }
    resolved
}

fn move_category(ctx: &EffectContext<'_>) -> Option<MoveCategory> {
    ctx.move_data.map(|m| m.category)
}

fn move_display_name(ctx: &EffectContext<'_>) -> String {
    ctx.move_data
        .map(|m| m.name.clone())
        .unwrap_or_else(|| "the move".to_string())
}

fn accuracy_roll(state: &BattleState, accuracy: f64, ctx: &mut EffectContext<'_>) -> bool {
    let target = state.active(&ctx.target_id);
    let modified = ability_value_hook(
        state,
        &ctx.attacker_id,
        ValueHook::ModifyAccuracy,
        accuracy,
        &ValueContext {
            move_data: ctx.move_data,
            category: move_category(ctx),
            target,
            weather: None,
            turn: ctx.turn,
        },
    );
    ctx.rng.next_f64() <= modified
}

fn damage_effect(
    state: &BattleState,
    power: i32,
    accuracy: f64,
    ctx: &mut EffectContext<'_>,
) -> Vec<BattleEvent> {
    let Some(attacker) = state.active(&ctx.attacker_id) else {
        return Vec::new();
    };
    let Some(target) = state.active(&ctx.target_id) else {
        return Vec::new();
    };

    if !accuracy_roll(state, accuracy, ctx) {
        return vec![BattleEvent::Log {
            message: format!("{}'s attack missed!", attacker.name),
        }];
    }

    let attacker_id = ctx.attacker_id.clone();
    let target_id = ctx.target_id.clone();
    let (amount, is_crit) = calc_damage(state, power, &attacker_id, &target_id, ctx, false);

    let mut events = Vec::new();
    if !ctx.used_logged {
        ctx.used_logged = true;
        events.push(BattleEvent::Log {
            message: format!("{} used {}!", attacker.name, move_display_name(ctx)),
        });
    }

    if amount > 0 {
        if is_crit {
            events.push(BattleEvent::Log {
                message: "A critical hit!".to_string(),
            });
        }
        if let Some(move_type) = ctx.move_data.and_then(|m| m.move_type.as_deref()) {
            let eff = type_chart::effectiveness(move_type, &target.types);
            if eff > 1.0 {
                events.push(BattleEvent::Log {
                    message: "It's super effective!".to_string(),
                });
            } else if eff > 0.0 && eff < 1.0 {
                events.push(BattleEvent::Log {
                    message: "It's not very effective...".to_string(),
                });
            }
        }
    }

    events.push(BattleEvent::Damage {
        target_id: target_id.clone(),
        amount,
        meta: ctx.offensive_meta(),
    });

    // Parental Bond: a second hit at quarter power that never crits.
    if attacker.ability.as_deref().and_then(AbilityKind::from_id)
        == Some(AbilityKind::ParentalBond)
    {
        let second_power = ((power as f64) * 0.25).floor() as i32;
        let (second_amount, _) =
            calc_damage(state, second_power, &attacker_id, &target_id, ctx, true);
        let mut meta = ctx.offensive_meta();
        meta.parental_bond = true;
        events.push(BattleEvent::Damage {
            target_id,
            amount: second_amount,
            meta,
        });
    }

    events
}

/// The damage pipeline: base = ((2L/5 + 2) * power * atk / def) / 50 + 2,
/// then the 0.85..1.0 roll, crit, STAB and type effectiveness.
/// Returns (amount, was_crit).
fn calc_damage(
    state: &BattleState,
    power: i32,
    attacker_id: &str,
    target_id: &str,
    ctx: &mut EffectContext<'_>,
    suppress_crit: bool,
) -> (i32, bool) {
    let Some(attacker) = state.active(attacker_id) else {
        return (0, false);
    };
    let Some(target) = state.active(target_id) else {
        return (0, false);
    };
    if power <= 0 {
        return (0, false);
    }

    let category = move_category(ctx).unwrap_or(MoveCategory::Physical);

    // Crit stage: move's own rate, modified by the attacker's ability.
    let crit_stage = ability_value_hook(
        state,
        attacker_id,
        ValueHook::ModifyCritChance,
        ctx.move_data.map(|m| m.crit_rate).unwrap_or(0) as f64,
        &ValueContext {
            move_data: ctx.move_data,
            category: Some(category),
            target: Some(target),
            weather: None,
            turn: ctx.turn,
        },
    );
    let crit_chance = if crit_stage <= 0.0 {
        1.0 / 24.0
    } else if crit_stage <= 1.0 {
        1.0 / 8.0
    } else if crit_stage <= 2.0 {
        0.5
    } else {
        1.0
    };
    let is_crit = if suppress_crit {
        false
    } else if crit_chance >= 1.0 {
        true
    } else {
        ctx.rng.next_f64() < crit_chance
    };

    // Power passes through the attacker's and then the defender's hooks.
    let mut move_power = ability_value_hook(
        state,
        attacker_id,
        ValueHook::ModifyPower,
        power as f64,
        &ValueContext {
            move_data: ctx.move_data,
            category: Some(category),
            target: Some(target),
            weather: None,
            turn: ctx.turn,
        },
    );
    move_power = ability_value_hook(
        state,
        target_id,
        ValueHook::DefensivePower,
        move_power,
        &ValueContext {
            move_data: ctx.move_data,
            category: Some(category),
            target: Some(attacker),
            weather: None,
            turn: ctx.turn,
        },
    );

    let (offense, defense, mut atk_stage, mut def_stage) = match category {
        MoveCategory::Special => (
            attacker.sp_attack,
            target.sp_defense,
            attacker.stages.spa,
            target.stages.spd,
        ),
        _ => (
            attacker.attack,
            target.defense,
            attacker.stages.atk,
            target.stages.def,
        ),
    };

    // Crits ignore the attacker's unfavorable and the defender's favorable
    // stages; Unaware ignores the opposite side's stages entirely.
    if is_crit {
        if atk_stage < 0 {
            atk_stage = 0;
        }
        if def_stage > 0 {
            def_stage = 0;
        }
    }
    let unaware = |c: &CreatureState| {
        c.ability.as_deref().and_then(AbilityKind::from_id) == Some(AbilityKind::Unaware)
    };
    if unaware(attacker) {
        def_stage = 0;
    }
    if unaware(target) {
        atk_stage = 0;
    }

    let mut atk = offense as f64 * stage_multiplier(atk_stage);
    // Burn halves physical offense unless Guts turns it into a boost.
    if category == MoveCategory::Physical
        && attacker.has_status("burn")
        && attacker.ability.as_deref().and_then(AbilityKind::from_id) != Some(AbilityKind::Guts)
    {
        atk *= 0.5;
    }
    let def = (defense as f64 * stage_multiplier(def_stage)).max(1.0);

    let atk = ability_value_hook(
        state,
        attacker_id,
        ValueHook::ModifyOffense,
        atk,
        &ValueContext {
            move_data: ctx.move_data,
            category: Some(category),
            target: Some(target),
            weather: None,
            turn: ctx.turn,
        },
    );
    let def = ability_value_hook(
        state,
        target_id,
        ValueHook::ModifyDefense,
        def,
        &ValueContext {
            move_data: ctx.move_data,
            category: Some(category),
            target: Some(attacker),
            weather: None,
            turn: ctx.turn,
        },
    );

    let level = attacker.level as f64;
    let base = (((2.0 * level / 5.0 + 2.0) * move_power * atk / def) / 50.0 + 2.0).max(1.0);
    let roll = 0.85 + 0.15 * ctx.rng.next_f64();

    let mut modifier = 1.0;
    if let Some(move_type) = ctx.move_data.and_then(|m| m.move_type.as_deref()) {
        if attacker.has_type(move_type) {
            modifier *= 1.5;
        }
        let effectiveness = type_chart::effectiveness(move_type, &target.types);
        if effectiveness == 0.0 {
            return (0, false);
        }
        modifier *= effectiveness;
    }
    if is_crit {
        modifier *= 1.5;
    }

    let damage = (base * roll * modifier).floor() as i32;
    (damage.max(1), is_crit)
}

/// Effective speed for this turn: stage multiplier, paralysis halving, then
/// the ability speed hook (weather boosts, Slow Start, Quick Feet).
pub fn effective_speed(state: &BattleState, player_id: &str, turn: u32) -> f64 {
    let Some(creature) = state.active(player_id) else {
        return 0.0;
    };
    let mut speed = creature.speed as f64 * stage_multiplier(creature.stages.spe);
    if creature.has_status("paralysis") {
        speed *= 0.5;
    }
    ability_value_hook(
        state,
        player_id,
        ValueHook::ModifySpeed,
        speed,
        &ValueContext {
            weather: get_weather(state),
            turn,
            ..ValueContext::default()
        },
    )
}

fn speed_based_damage(
    state: &BattleState,
    thresholds: &[crate::move_data::SpeedThreshold],
    base_power: i32,
    accuracy: f64,
    ctx: &mut EffectContext<'_>,
) -> Vec<BattleEvent> {
    let attacker_speed = effective_speed(state, &ctx.attacker_id, ctx.turn);
    let target_speed = effective_speed(state, &ctx.target_id, ctx.turn);
    let ratio = if target_speed <= 0.0 {
        f64::INFINITY
    } else {
        attacker_speed / target_speed
    };

    let mut chosen = base_power;
    let mut sorted: Vec<_> = thresholds.to_vec();
    sorted.sort_by(|a, b| b.ratio.partial_cmp(&a.ratio).unwrap_or(std::cmp::Ordering::Equal));
    for tier in sorted {
        if ratio >= tier.ratio {
            chosen = tier.power;
            break;
        }
    }
    damage_effect(state, chosen, accuracy, ctx)
}

#[allow(clippy::too_many_arguments)]
fn ohko(
    state: &BattleState,
    base_accuracy: f64,
    required_type: Option<&str>,
    non_matching_type_accuracy: Option<f64>,
    level_scaling: bool,
    respect_type_immunity: bool,
    immune_types: &[String],
    ctx: &mut EffectContext<'_>,
) -> Vec<BattleEvent> {
    let Some(attacker) = state.active(&ctx.attacker_id) else {
        return Vec::new();
    };
    let Some(target) = state.active(&ctx.target_id) else {
        return Vec::new();
    };

    if respect_type_immunity {
        if let Some(move_type) = ctx.move_data.and_then(|m| m.move_type.as_deref()) {
            if type_chart::effectiveness(move_type, &target.types) == 0.0 {
                return vec![BattleEvent::Log {
                    message: format!("It doesn't affect {}...", target.name),
                }];
            }
        }
    }
    if immune_types.iter().any(|t| target.has_type(t)) {
        return vec![BattleEvent::Log {
            message: format!("It doesn't affect {}...", target.name),
        }];
    }
    if attacker.level < target.level {
        return vec![BattleEvent::Log {
            message: format!("{} is unaffected!", target.name),
        }];
    }

    let mut accuracy = match required_type {
        Some(required) if !attacker.has_type(required) => {
            non_matching_type_accuracy.unwrap_or(base_accuracy)
        }
        _ => base_accuracy,
    };
    if level_scaling {
        accuracy += (attacker.level as f64 - target.level as f64) / 100.0;
    }
    accuracy = accuracy.clamp(0.0, 1.0);

    if !accuracy_roll(state, accuracy, ctx) {
        return vec![BattleEvent::Log {
            message: format!("{}'s attack missed!", attacker.name),
        }];
    }

    let target_id = ctx.target_id.clone();
    vec![
        BattleEvent::Log {
            message: "It's a one-hit KO!".to_string(),
        },
        BattleEvent::Damage {
            target_id: target_id.clone(),
            amount: target.hp,
            meta: ctx.offensive_meta(),
        },
    ]
}

fn apply_status_effect(
    state: &BattleState,
    status_id: &str,
    duration: Option<DurationSpec>,
    stack: bool,
    target: TargetRef,
    data: &StatusData,
    ctx: &mut EffectContext<'_>,
) -> Vec<BattleEvent> {
    let target_id = resolve_target(target, ctx);

    // Item grants are routed to the item representation.
    if status_id == "item" || status_id == "berry" {
        let item_id = data.item_id.clone().unwrap_or_else(|| status_id.to_string());
        return apply_item(state, &item_id, target, ctx);
    }

    let mut resolved = match duration {
        Some(DurationSpec::Turns(n)) => Some(n),
        Some(DurationSpec::Range { min, max }) => {
            let span = (max - min + 1) as f64;
            Some(min + (ctx.rng.next_f64() * span).floor() as i32)
        }
        None => None,
    };
    // Sleep tracks its wake counter in data, not in the duration slot.
    if status_id == "sleep" {
        resolved = None;
    }

    let mut data = resolve_data(data, ctx);
    // Encore without an explicit move locks in whatever the target last used.
    if status_id == "encore" && data.move_id.is_none() {
        match state
            .active(&target_id)
            .and_then(|c| c.scratch.last_move.clone())
        {
            Some(last) => data.move_id = Some(last),
            None => {
                return vec![BattleEvent::Log {
                    message: "But it failed!".to_string(),
                }]
            }
        }
    }

    let mut meta = ctx.meta();
    meta.cancellable = true;
    vec![BattleEvent::ApplyStatus {
        target_id,
        status_id: status_id.to_string(),
        duration: resolved,
        stack,
        data,
        meta,
    }]
}

fn disable_move(
    state: &BattleState,
    move_id: Option<&str>,
    duration: Option<i32>,
    target: TargetRef,
    ctx: &mut EffectContext<'_>,
) -> Vec<BattleEvent> {
    let target_id = resolve_target(target, ctx);
    let disabled = move_id.map(|m| m.to_string()).or_else(|| {
        state
            .active(&target_id)
            .and_then(|c| c.scratch.last_move.clone())
    });
    let Some(disabled) = disabled else {
        return vec![BattleEvent::Log {
            message: "But it failed!".to_string(),
        }];
    };
    let mut meta = ctx.meta();
    meta.cancellable = true;
    vec![BattleEvent::ApplyStatus {
        target_id,
        status_id: "disable_move".to_string(),
        duration,
        stack: false,
        data: StatusData {
            move_id: Some(disabled),
            ..StatusData::default()
        },
        meta,
    }]
}

fn repeat(
    state: &BattleState,
    times: CountSpec,
    effects: &[Effect],
    ctx: &mut EffectContext<'_>,
) -> Vec<BattleEvent> {
    let count = match times {
        CountSpec::Fixed(n) => n,
        CountSpec::Range { min, max } => {
            // Skill Link always rolls the ceiling, without consuming a draw.
            let skill_link = ability_check_hook(
                state,
                &ctx.attacker_id,
                CheckHook::SkillLink,
                CheckContext::default(),
                false,
            );
            if skill_link {
                max
            } else {
                let span = (max - min + 1) as f64;
                min + (ctx.rng.next_f64() * span).floor() as i32
            }
        }
    };

    // Later hits see the damage of earlier ones, and the sequence stops
    // early if the target goes down.
    let mut working = state.clone();
    let mut collected = Vec::new();
    let mut hits = 0;
    for _ in 0..count {
        if let Some(target) = working.active(&ctx.target_id) {
            if target.hp <= 0 {
                break;
            }
        }
        let events = compile_effects(&working, effects, ctx);
        working = apply_events(&working, &events);
        collected.extend(events);
        hits += 1;
    }
    if hits > 1 {
        collected.push(BattleEvent::Log {
            message: format!("Hit {} time(s)!", hits),
        });
    }
    collected
}

fn evaluate_condition(
    state: &BattleState,
    condition: &Condition,
    ctx: &EffectContext<'_>,
) -> bool {
    let target = state.active(&ctx.target_id);
    let user = state.active(&ctx.attacker_id);
    match condition {
        Condition::TargetHasStatus { status_id } => {
            if status_id == "item" || status_id == "berry" {
                return target.map(|c| c.has_item()).unwrap_or(false);
            }
            target.map(|c| c.has_status(status_id)).unwrap_or(false)
        }
        Condition::TargetHasItem => target.map(|c| c.has_item()).unwrap_or(false),
        Condition::UserHasStatus { status_id } => {
            user.map(|c| c.has_status(status_id)).unwrap_or(false)
        }
        Condition::UserHasItem => user.map(|c| c.has_item()).unwrap_or(false),
        Condition::UserType { type_id } => user.map(|c| c.has_type(type_id)).unwrap_or(false),
        Condition::TargetHpLt { value } => target
            .map(|c| (c.hp as f64) / (c.max_hp as f64) < *value)
            .unwrap_or(false),
        Condition::FieldHasStatus { status_id } => state.field.has(status_id),
        Condition::WeatherIsSunny => state.field.has("sun"),
        Condition::WeatherIsRaining => state.field.has("rain"),
        Condition::WeatherIsHail => state.field.has("hail"),
        Condition::WeatherIsSandstorm => state.field.has("sandstorm"),
    }
}

fn damage_ratio(
    state: &BattleState,
    ratio_max_hp: f64,
    target: TargetRef,
    ctx: &mut EffectContext<'_>,
) -> Vec<BattleEvent> {
    let target_id = resolve_target(target, ctx);
    let Some(creature) = state.active(&target_id) else {
        return Vec::new();
    };
    let mut amount = ((creature.max_hp as f64) * ratio_max_hp).floor() as i32;
    if ratio_max_hp > 0.0 {
        amount = amount.max(1);
    } else if ratio_max_hp < 0.0 {
        amount = amount.min(-1);
    }
    vec![BattleEvent::Damage {
        target_id: target_id.clone(),
        amount,
        meta: ctx.offensive_meta(),
    }]
}

fn delay(
    after_turns: i32,
    timing: Timing,
    effects: &[Effect],
    target: TargetRef,
    ctx: &mut EffectContext<'_>,
) -> Vec<BattleEvent> {
    let target_id = resolve_target(target, ctx);
    vec![BattleEvent::ApplyStatus {
        target_id: target_id.clone(),
        status_id: "delayed_effect".to_string(),
        duration: Some(after_turns + 1),
        stack: false,
        data: StatusData {
            trigger_turn: Some(ctx.turn as i32 + after_turns),
            source_id: Some(ctx.attacker_id.clone()),
            target_id: Some(target_id),
            timing: Some(timing),
            effects: effects.to_vec(),
            ..StatusData::default()
        },
        meta: ctx.meta(),
    }]
}

fn over_time(
    duration: i32,
    timing: Timing,
    effects: &[Effect],
    target: TargetRef,
    ctx: &mut EffectContext<'_>,
) -> Vec<BattleEvent> {
    let target_id = resolve_target(target, ctx);
    vec![BattleEvent::ApplyStatus {
        target_id: target_id.clone(),
        status_id: "over_time_effect".to_string(),
        duration: Some(duration),
        stack: false,
        data: StatusData {
            source_id: Some(ctx.attacker_id.clone()),
            target_id: Some(target_id),
            timing: Some(timing),
            effects: effects.to_vec(),
            ..StatusData::default()
        },
        meta: ctx.meta(),
    }]
}

fn apply_item(
    state: &BattleState,
    item_id: &str,
    target: TargetRef,
    ctx: &mut EffectContext<'_>,
) -> Vec<BattleEvent> {
    let target_id = resolve_target(target, ctx);
    let Some(creature) = state.active(&target_id) else {
        return Vec::new();
    };
    let status_id = if item_id.contains("berry") { "berry" } else { "item" };
    vec![
        BattleEvent::ApplyStatus {
            target_id,
            status_id: status_id.to_string(),
            duration: None,
            stack: false,
            data: StatusData {
                item_id: Some(item_id.to_string()),
                ..StatusData::default()
            },
            meta: ctx.meta(),
        },
        BattleEvent::Log {
            message: format!("{} obtained a {}!", creature.name, item_id),
        },
    ]
}

fn remove_item(
    state: &BattleState,
    target: TargetRef,
    ctx: &mut EffectContext<'_>,
) -> Vec<BattleEvent> {
    let target_id = resolve_target(target, ctx);
    let Some(creature) = state.active(&target_id) else {
        return Vec::new();
    };
    let message = if creature.has_item() {
        format!("{} lost its held item!", creature.name)
    } else {
        format!("{} has nothing to lose!", creature.name)
    };
    vec![
        BattleEvent::Log { message },
        BattleEvent::RemoveStatus {
            target_id: target_id.clone(),
            status_id: "item".to_string(),
            meta: ctx.meta(),
        },
        BattleEvent::RemoveStatus {
            target_id,
            status_id: "berry".to_string(),
            meta: ctx.meta(),
        },
    ]
}

fn consume_item(
    state: &BattleState,
    target: TargetRef,
    ctx: &mut EffectContext<'_>,
) -> Vec<BattleEvent> {
    let target_id = resolve_target(target, ctx);
    let Some(creature) = state.active(&target_id) else {
        return Vec::new();
    };
    if !creature.has_item() {
        return vec![BattleEvent::Log {
            message: format!("{} has no held item!", creature.name),
        }];
    }
    let item_id = creature.item_id().unwrap_or_else(|| "item".to_string());
    let mut events = vec![
        BattleEvent::RemoveStatus {
            target_id: target_id.clone(),
            status_id: "item".to_string(),
            meta: ctx.meta(),
        },
        BattleEvent::RemoveStatus {
            target_id: target_id.clone(),
            status_id: "berry".to_string(),
            meta: ctx.meta(),
        },
    ];
    if item_id.contains("berry") {
        events.push(BattleEvent::ApplyStatus {
            target_id: target_id.clone(),
            status_id: "berry_consumed".to_string(),
            duration: None,
            stack: false,
            data: StatusData::default(),
            meta: EventMeta::default(),
        });
    }
    events.push(BattleEvent::Log {
        message: format!("{}'s {} was used up!", creature.name, item_id),
    });
    events
}

fn protect(state: &BattleState, ctx: &mut EffectContext<'_>) -> Vec<BattleEvent> {
    let Some(attacker) = state.active(&ctx.attacker_id) else {
        return Vec::new();
    };
    let count = attacker.scratch.protect_success_count;
    let chance = 0.5_f64.powi(count);

    if ctx.rng.next_f64() > chance {
        return vec![
            BattleEvent::Log {
                message: format!("{}'s protection failed!", attacker.name),
            },
            BattleEvent::SetProtectCount {
                target_id: ctx.attacker_id.clone(),
                count: 0,
            },
        ];
    }

    vec![
        BattleEvent::SetProtectCount {
            target_id: ctx.attacker_id.clone(),
            count: count + 1,
        },
        BattleEvent::ApplyStatus {
            target_id: ctx.attacker_id.clone(),
            status_id: "protect".to_string(),
            duration: Some(1),
            stack: false,
            data: StatusData::default(),
            meta: ctx.meta(),
        },
    ]
}

fn pending_switch(target_id: &str, ctx: &EffectContext<'_>) -> Vec<BattleEvent> {
    vec![BattleEvent::ApplyStatus {
        target_id: target_id.to_string(),
        status_id: "pending_switch".to_string(),
        duration: None,
        stack: false,
        data: StatusData::default(),
        meta: ctx.meta(),
    }]
}
