//! Event applier unit tests: the only mutator, one event at a time.

use std::collections::BTreeMap;

use crate::battle::events::{apply_event, BattleEvent, EventMeta};
use crate::battle::tests::common::*;
use crate::move_data::{Stat, StatusData};

fn plain_battle() -> crate::battle::state::BattleState {
    let c1 = TestCreatureBuilder::new("c1", "Alpha").build();
    let c2 = TestCreatureBuilder::new("c2", "Beta").build();
    create_test_battle(c1, c2)
}

#[test]
fn damage_clamps_to_zero_and_flags_the_faint() {
    let state = plain_battle();
    let next = apply_event(
        &state,
        &BattleEvent::Damage {
            target_id: "p2".to_string(),
            amount: 900,
            meta: EventMeta::default(),
        },
    );
    let beta = next.active("p2").unwrap();
    assert_eq!(beta.hp, 0);
    assert!(beta.has_status("pending_switch"));
    assert_log_contains(&next, "Beta fainted!");
}

#[test]
fn negative_damage_heals_up_to_max() {
    let mut state = plain_battle();
    state.active_mut("p2").unwrap().hp = 50;
    let next = apply_event(
        &state,
        &BattleEvent::Damage {
            target_id: "p2".to_string(),
            amount: -500,
            meta: EventMeta::default(),
        },
    );
    assert_eq!(next.active("p2").unwrap().hp, 200);
    assert_log_contains(&next, "recovered 500 HP!");
}

#[test]
fn faint_records_the_lost_ability() {
    let mut state = plain_battle();
    state.active_mut("p2").unwrap().ability = Some("stamina".to_string());
    let next = apply_event(
        &state,
        &BattleEvent::Damage {
            target_id: "p2".to_string(),
            amount: 900,
            meta: EventMeta::default(),
        },
    );
    assert_eq!(
        next.player("p2").unwrap().last_fainted_ability.as_deref(),
        Some("stamina")
    );
}

#[test]
fn apply_status_refuses_duplicates_without_stack() {
    let mut state = plain_battle();
    state.active_mut("p2").unwrap().statuses.push(
        crate::battle::state::StatusInstance::new("burn", None),
    );
    let next = apply_event(
        &state,
        &BattleEvent::ApplyStatus {
            target_id: "p2".to_string(),
            status_id: "burn".to_string(),
            duration: None,
            stack: false,
            data: StatusData::default(),
            meta: EventMeta::default(),
        },
    );
    assert_eq!(next.active("p2").unwrap().statuses.len(), 1);
    assert_log_contains(&next, "already has burn!");
}

#[test]
fn replace_status_requires_the_from_status() {
    let state = plain_battle();
    let next = apply_event(
        &state,
        &BattleEvent::ReplaceStatus {
            target_id: "p2".to_string(),
            from: "sleep".to_string(),
            to: "burn".to_string(),
            duration: None,
            data: StatusData::default(),
            meta: EventMeta::default(),
        },
    );
    assert!(next.active("p2").unwrap().statuses.is_empty());
}

#[test]
fn stages_clamp_at_plus_minus_six() {
    let mut state = plain_battle();
    state.active_mut("p2").unwrap().stages.atk = 6;
    let mut up = BTreeMap::new();
    up.insert(Stat::Atk, 3);
    let next = apply_event(
        &state,
        &BattleEvent::ModifyStage {
            target_id: "p2".to_string(),
            stages: up,
            clamp: true,
            fail_if_no_change: false,
            show_event: true,
            meta: EventMeta::default(),
        },
    );
    assert_eq!(next.active("p2").unwrap().stages.atk, 6);
    // Clamped to no change: nothing to announce.
    assert_log_not_contains(&next, "rose");
}

#[test]
fn a_new_weather_evicts_the_old_one() {
    let state = plain_battle();
    let sunny = apply_event(
        &state,
        &BattleEvent::ApplyFieldStatus {
            status_id: "sun".to_string(),
            duration: Some(5),
            stack: false,
            data: StatusData::default(),
            meta: EventMeta::default(),
        },
    );
    let rainy = apply_event(
        &sunny,
        &BattleEvent::ApplyFieldStatus {
            status_id: "rain".to_string(),
            duration: Some(5),
            stack: false,
            data: StatusData::default(),
            meta: EventMeta::default(),
        },
    );
    assert!(!rainy.field.has("sun"));
    assert!(rainy.field.has("rain"));
    assert_eq!(rainy.field.global.len(), 1);
}

#[test]
fn switch_clears_volatiles_but_keeps_primary_statuses() {
    let lead = TestCreatureBuilder::new("c1", "Lead")
        .with_status("burn", None)
        .with_status("confusion", Some(3))
        .build();
    let bench = TestCreatureBuilder::new("c3", "Bench").build();
    let foe = TestCreatureBuilder::new("c2", "Foe").build();
    let mut state = create_test_battle_teams(vec![lead, bench], vec![foe]);
    {
        let lead = state.active_mut("p1").unwrap();
        lead.stages.atk = 2;
        lead.scratch.last_move = Some("tackle".to_string());
        lead.scratch.protect_success_count = 2;
    }

    let next = apply_event(
        &state,
        &BattleEvent::Switch {
            player_id: "p1".to_string(),
            slot: 1,
        },
    );

    let outgoing = &next.player("p1").unwrap().team[0];
    assert!(outgoing.has_status("burn"));
    assert!(!outgoing.has_status("confusion"));
    assert_eq!(outgoing.stages.atk, 0);
    assert_eq!(outgoing.scratch.last_move, None);
    assert_eq!(outgoing.scratch.protect_success_count, 0);
    assert_eq!(next.player("p1").unwrap().active_slot, 1);
    assert_log_contains(&next, "sent out Bench!");
}

#[test]
fn status_immunity_hook_blocks_application() {
    let mut state = plain_battle();
    state.active_mut("p2").unwrap().ability = Some("insomnia".to_string());
    let next = apply_event(
        &state,
        &BattleEvent::ApplyStatus {
            target_id: "p2".to_string(),
            status_id: "sleep".to_string(),
            duration: None,
            stack: false,
            data: StatusData::default(),
            meta: EventMeta::default(),
        },
    );
    assert!(!next.active("p2").unwrap().has_status("sleep"));
    assert_log_contains(&next, "unaffected by sleep!");
}
