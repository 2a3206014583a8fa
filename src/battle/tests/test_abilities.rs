//! Ability hook behavior: value multipliers, switch-in effects, stage
//! rewrites, and the interceptor/reactor event modifiers.

use crate::battle::state::Action;
use crate::battle::tests::common::*;

fn duel_with_abilities(
    p1_ability: Option<&str>,
    p1_moves: &[&str],
    p2_ability: Option<&str>,
    p2_moves: &[&str],
) -> crate::battle::state::BattleState {
    let mut c1 = TestCreatureBuilder::new("c1", "Alpha").with_moves(p1_moves);
    if let Some(ability) = p1_ability {
        c1 = c1.with_ability(ability);
    }
    let mut c2 = TestCreatureBuilder::new("c2", "Beta").with_moves(p2_moves);
    if let Some(ability) = p2_ability {
        c2 = c2.with_ability(ability);
    }
    create_test_battle(c1.build(), c2.build())
}

fn tackle_damage(state: &crate::battle::state::BattleState) -> i32 {
    let mut rng = rng_of(&[0.1, 0.1, 0.5, 0.5]);
    let next = step(
        state,
        &[Action::use_move("p1", "tackle", Some("p2"))],
        &mut rng,
    );
    200 - next.active("p2").unwrap().hp
}

#[test]
fn pure_power_doubles_physical_damage() {
    let plain = duel_with_abilities(None, &["tackle"], None, &["tackle"]);
    let boosted = duel_with_abilities(Some("pure_power"), &["tackle"], None, &["tackle"]);
    assert!(tackle_damage(&boosted) > tackle_damage(&plain) * 3 / 2);
}

#[test]
fn fur_coat_doubles_physical_defense() {
    let plain = duel_with_abilities(None, &["tackle"], None, &["tackle"]);
    let coated = duel_with_abilities(None, &["tackle"], Some("fur_coat"), &["tackle"]);
    assert!(tackle_damage(&coated) < tackle_damage(&plain));
}

#[test]
fn technician_boosts_weak_moves_only() {
    let plain = duel_with_abilities(None, &["tackle"], None, &["tackle"]);
    let technical = duel_with_abilities(Some("technician"), &["tackle"], None, &["tackle"]);
    let ratio = tackle_damage(&technical) as f64 / tackle_damage(&plain) as f64;
    assert!(ratio > 1.3 && ratio < 1.7);
}

#[test]
fn guts_needs_a_primary_status() {
    let mut state = duel_with_abilities(Some("guts"), &["tackle"], None, &["tackle"]);
    let without = tackle_damage(&state);
    state
        .active_mut("p1")
        .unwrap()
        .statuses
        .push(crate::battle::state::StatusInstance::new("burn", None));
    // Guts also ignores the burn attack drop, so the boost is clean x1.5.
    let with = tackle_damage(&state);
    assert!(with > without);
}

#[test]
fn contrary_inverts_stage_drops() {
    let state = duel_with_abilities(None, &["growl"], Some("contrary"), &["tackle"]);
    let mut rng = rng_of(&[0.5]);
    let next = step(
        &state,
        &[Action::use_move("p1", "growl", Some("p2"))],
        &mut rng,
    );
    assert_eq!(next.active("p2").unwrap().stages.atk, 1);
}

#[test]
fn simple_doubles_stage_changes() {
    let state = duel_with_abilities(Some("simple"), &["swords_dance"], None, &["tackle"]);
    let mut rng = rng_of(&[0.5]);
    let next = step(
        &state,
        &[Action::use_move("p1", "swords_dance", None)],
        &mut rng,
    );
    assert_eq!(next.active("p1").unwrap().stages.atk, 4);
}

#[test]
fn intimidate_fires_once_per_stay() {
    let lead = TestCreatureBuilder::new("c1", "Lead").build();
    let menace = TestCreatureBuilder::new("c3", "Menace")
        .with_ability("intimidate")
        .build();
    let foe = TestCreatureBuilder::new("c2", "Foe")
        .with_moves(&["tackle"])
        .build();
    let state = create_test_battle_teams(vec![lead, menace], vec![foe]);

    let mut rng = rng_of(&[0.5]);
    let next = step(&state, &[Action::switch("p1", 1)], &mut rng);
    assert_eq!(next.active("p2").unwrap().stages.atk, -1);

    // A second turn on the field does not re-trigger it.
    let mut rng = rng_of(&[0.5]);
    let later = step(&next, &[Action::wait("p1")], &mut rng);
    assert_eq!(later.active("p2").unwrap().stages.atk, -1);
}

#[test]
fn clear_body_shrugs_off_intimidate() {
    let lead = TestCreatureBuilder::new("c1", "Lead").build();
    let menace = TestCreatureBuilder::new("c3", "Menace")
        .with_ability("intimidate")
        .build();
    let foe = TestCreatureBuilder::new("c2", "Foe")
        .with_ability("clear_body")
        .build();
    let state = create_test_battle_teams(vec![lead, menace], vec![foe]);

    let mut rng = rng_of(&[0.5]);
    let next = step(&state, &[Action::switch("p1", 1)], &mut rng);
    assert_eq!(next.active("p2").unwrap().stages.atk, 0);
    assert_log_contains(&next, "not intimidated");
}

#[test]
fn download_reads_the_weaker_defense() {
    let lead = TestCreatureBuilder::new("c1", "Lead").build();
    let scanner = TestCreatureBuilder::new("c3", "Scanner")
        .with_ability("download")
        .build();
    let mut foe = TestCreatureBuilder::new("c2", "Foe").build();
    foe.defense = 50;
    foe.sp_defense = 150;
    let state = create_test_battle_teams(vec![lead, scanner], vec![foe]);

    let mut rng = rng_of(&[0.5]);
    let next = step(&state, &[Action::switch("p1", 1)], &mut rng);
    assert_eq!(next.active("p1").unwrap().stages.atk, 1);
    assert_eq!(next.active("p1").unwrap().stages.spa, 0);
}

#[test]
fn drought_sets_the_sun_once() {
    let lead = TestCreatureBuilder::new("c1", "Lead").build();
    let sunbringer = TestCreatureBuilder::new("c3", "Sunbringer")
        .with_ability("drought")
        .build();
    let foe = TestCreatureBuilder::new("c2", "Foe").build();
    let state = create_test_battle_teams(vec![lead, sunbringer], vec![foe]);

    let mut rng = rng_of(&[0.5]);
    let next = step(&state, &[Action::switch("p1", 1)], &mut rng);
    assert!(next.field.has("sun"));
    assert_log_contains(&next, "sunlight turned harsh");
}

#[test]
fn lightning_rod_absorbs_electric_moves() {
    let state = duel_with_abilities(None, &["volt_sling"], Some("lightning_rod"), &["tackle"]);
    let mut rng = rng_of(&[0.5, 0.1, 0.5, 0.5]);
    let next = step(
        &state,
        &[Action::use_move("p1", "volt_sling", Some("p2"))],
        &mut rng,
    );
    let rod = next.active("p2").unwrap();
    assert_eq!(rod.hp, 200);
    assert_eq!(rod.stages.spa, 1);
    assert_log_contains(&next, "drew in the electric attack");
}

#[test]
fn magic_bounce_reflects_status_moves() {
    let state = duel_with_abilities(None, &["thunder_wave"], Some("magic_bounce"), &["tackle"]);
    let mut rng = rng_of(&[0.5]);
    let next = step(
        &state,
        &[Action::use_move("p1", "thunder_wave", Some("p2"))],
        &mut rng,
    );
    assert!(!next.active("p2").unwrap().has_status("paralysis"));
    assert!(next.active("p1").unwrap().has_status("paralysis"));
    assert_log_contains(&next, "bounced the move back");
}

#[test]
fn stamina_raises_defense_when_hit() {
    let state = duel_with_abilities(None, &["tackle"], Some("stamina"), &["tackle"]);
    let mut rng = rng_of(&[0.1, 0.1, 0.5, 0.5]);
    let next = step(
        &state,
        &[Action::use_move("p1", "tackle", Some("p2"))],
        &mut rng,
    );
    assert_eq!(next.active("p2").unwrap().stages.def, 1);
}

#[test]
fn berserk_triggers_on_crossing_half() {
    let mut state = duel_with_abilities(None, &["tackle"], Some("berserk"), &["tackle"]);
    state.active_mut("p2").unwrap().hp = 105;
    let mut rng = rng_of(&[0.1, 0.1, 0.5, 0.5]);
    let next = step(
        &state,
        &[Action::use_move("p1", "tackle", Some("p2"))],
        &mut rng,
    );
    // 105 -> below 100 out of 200: the threshold was crossed.
    assert!(next.active("p2").unwrap().hp < 100);
    assert_eq!(next.active("p2").unwrap().stages.spa, 1);
}

#[test]
fn competitive_punishes_enemy_stat_drops() {
    let state = duel_with_abilities(None, &["growl"], Some("competitive"), &["tackle"]);
    let mut rng = rng_of(&[0.5]);
    let next = step(
        &state,
        &[Action::use_move("p1", "growl", Some("p2"))],
        &mut rng,
    );
    let victim = next.active("p2").unwrap();
    assert_eq!(victim.stages.atk, -1);
    assert_eq!(victim.stages.spa, 2);
}

#[test]
fn opportunist_mirrors_enemy_boosts() {
    let state = duel_with_abilities(None, &["swords_dance"], Some("opportunist"), &["tackle"]);
    let mut rng = rng_of(&[0.5]);
    let next = step(
        &state,
        &[Action::use_move("p1", "swords_dance", None)],
        &mut rng,
    );
    assert_eq!(next.active("p1").unwrap().stages.atk, 2);
    assert_eq!(next.active("p2").unwrap().stages.atk, 2);
}

#[test]
fn prankster_lifts_status_move_priority() {
    // The slower prankster moves first with a status move.
    let mut state = duel_with_abilities(Some("prankster"), &["growl"], None, &["tackle"]);
    state.active_mut("p1").unwrap().speed = 10;
    let mut rng = rng_of(&[0.5, 0.5, 0.1, 0.5, 0.5]);
    let next = step(
        &state,
        &[
            Action::use_move("p1", "growl", Some("p2")),
            Action::use_move("p2", "tackle", Some("p1")),
        ],
        &mut rng,
    );
    let log = next.log.join("\n");
    let growl_at = log.find("Attack fell").expect("growl landed");
    let tackle_at = log.find("used Tackle").expect("tackle landed");
    assert!(growl_at < tackle_at);
}

#[test]
fn shadow_tag_traps_non_ghosts() {
    let lead = TestCreatureBuilder::new("c1", "Lead").build();
    let bench = TestCreatureBuilder::new("c3", "Bench").build();
    let trapper = TestCreatureBuilder::new("c2", "Trapper")
        .with_ability("shadow_tag")
        .build();
    let state = create_test_battle_teams(vec![lead, bench], vec![trapper]);

    let mut rng = rng_of(&[0.5]);
    let next = step(&state, &[Action::switch("p1", 1)], &mut rng);
    assert_eq!(next.player("p1").unwrap().active_slot, 0);
    assert_log_contains(&next, "couldn't switch");

    // Ghosts are exempt from trapping.
    let mut ghostly = state.clone();
    ghostly.active_mut("p1").unwrap().types = vec!["ghost".to_string()];
    let mut rng = rng_of(&[0.5]);
    let freed = step(&ghostly, &[Action::switch("p1", 1)], &mut rng);
    assert_eq!(freed.player("p1").unwrap().active_slot, 1);
}

#[test]
fn libero_shifts_type_before_the_move() {
    let state = duel_with_abilities(Some("libero"), &["water_gun"], None, &["tackle"]);
    let mut rng = rng_of(&[0.5, 0.1, 0.5, 0.5]);
    let next = step(
        &state,
        &[Action::use_move("p1", "water_gun", Some("p2"))],
        &mut rng,
    );
    assert_eq!(next.active("p1").unwrap().types, vec!["water".to_string()]);
    assert_log_contains(&next, "became water-type");
}

#[test]
fn slow_start_halves_early_speed() {
    let mut state = duel_with_abilities(Some("slow_start"), &["tackle"], None, &["tackle"]);
    state.active_mut("p1").unwrap().speed = 100;
    let early = crate::battle::effects::effective_speed(&state, "p1", 3);
    let late = crate::battle::effects::effective_speed(&state, "p1", 9);
    assert_eq!(early, 50.0);
    assert_eq!(late, 100.0);
}

#[test]
fn unaware_attacker_ignores_defense_stages() {
    let mut plain = duel_with_abilities(None, &["tackle"], None, &["tackle"]);
    plain.active_mut("p2").unwrap().stages.def = 6;
    let walled = tackle_damage(&plain);

    let mut aware = duel_with_abilities(Some("unaware"), &["tackle"], None, &["tackle"]);
    aware.active_mut("p2").unwrap().stages.def = 6;
    let pierced = tackle_damage(&aware);

    assert!(pierced > walled);
}
