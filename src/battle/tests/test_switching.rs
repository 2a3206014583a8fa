//! Switching, forced replacement, and action ordering around switches.

use crate::battle::engine::{legal_actions, needs_switch, validate_action};
use crate::battle::state::{Action, ActionKind};
use crate::battle::tests::common::*;
use crate::errors::ActionError;

fn two_on_one() -> crate::battle::state::BattleState {
    let lead = TestCreatureBuilder::new("c1", "Lead")
        .with_moves(&["tackle"])
        .build();
    let bench = TestCreatureBuilder::new("c3", "Bench")
        .with_moves(&["tackle"])
        .build();
    let foe = TestCreatureBuilder::new("c2", "Foe")
        .with_moves(&["tackle"])
        .build();
    create_test_battle_teams(vec![lead, bench], vec![foe])
}

#[test]
fn switches_resolve_before_moves() {
    let state = two_on_one();
    let mut rng = rng_of(&[0.5, 0.5, 0.1, 0.5, 0.5]);
    let next = step(
        &state,
        &[
            Action::switch("p1", 1),
            Action::use_move("p2", "tackle", Some("p1")),
        ],
        &mut rng,
    );
    // The incoming creature, not the outgoing one, takes the hit.
    assert_eq!(next.player("p1").unwrap().team[0].hp, 200);
    assert!(next.player("p1").unwrap().team[1].hp < 200);
}

#[test]
fn a_faint_forces_the_replacement_set() {
    let mut state = two_on_one();
    state.active_mut("p1").unwrap().hp = 0;
    state
        .active_mut("p1")
        .unwrap()
        .statuses
        .push(crate::battle::state::StatusInstance::new("pending_switch", None));

    assert!(needs_switch(&state, "p1"));
    let legal = legal_actions(&state, "p1");
    assert!(!legal.is_empty());
    assert!(legal.iter().all(|a| a.kind == ActionKind::Switch));

    let error = validate_action(&state, &Action::use_move("p1", "tackle", Some("p2")));
    assert!(matches!(error, Err(ActionError::MustSwitch(_))));
}

#[test]
fn invalid_switch_targets_are_rejected() {
    let state = two_on_one();
    // Same slot.
    assert!(matches!(
        validate_action(&state, &Action::switch("p1", 0)),
        Err(ActionError::InvalidSwitchTarget { .. })
    ));
    // Out of range.
    assert!(matches!(
        validate_action(&state, &Action::switch("p1", 5)),
        Err(ActionError::InvalidSwitchTarget { .. })
    ));
    // Fainted target.
    let mut fainted = state.clone();
    fainted.player_mut("p1").unwrap().team[1].hp = 0;
    assert!(matches!(
        validate_action(&fainted, &Action::switch("p1", 1)),
        Err(ActionError::InvalidSwitchTarget { .. })
    ));
}

#[test]
fn duplicate_submissions_are_flagged() {
    let state = two_on_one();
    let result = crate::battle::engine::validate_actions(
        &state,
        &[
            Action::use_move("p1", "tackle", Some("p2")),
            Action::use_move("p1", "tackle", Some("p2")),
        ],
    );
    assert!(matches!(result, Err(ActionError::ActionNotNeeded(_))));
}

#[test]
fn force_switch_flags_the_target() {
    let foe_lead = TestCreatureBuilder::new("c2", "FoeLead")
        .with_moves(&["tackle"])
        .build();
    let foe_bench = TestCreatureBuilder::new("c4", "FoeBench").build();
    let roarer = TestCreatureBuilder::new("c1", "Roarer")
        .with_moves(&["roar"])
        .build();
    let state = create_test_battle_teams(vec![roarer], vec![foe_lead, foe_bench]);

    let mut rng = rng_of(&[0.5]);
    let next = step(
        &state,
        &[Action::use_move("p1", "roar", Some("p2"))],
        &mut rng,
    );
    assert!(next.active("p2").unwrap().has_status("pending_switch"));
    let legal = legal_actions(&next, "p2");
    assert!(legal.iter().all(|a| a.kind == ActionKind::Switch));
}

#[test]
fn self_switch_flags_the_user() {
    let scout = TestCreatureBuilder::new("c1", "Scout")
        .with_moves(&["retreat_strike"])
        .build();
    let bench = TestCreatureBuilder::new("c3", "Bench").build();
    let foe = TestCreatureBuilder::new("c2", "Foe")
        .with_moves(&["tackle"])
        .build();
    let state = create_test_battle_teams(vec![scout, bench], vec![foe]);

    let mut rng = rng_of(&[0.5, 0.1, 0.5, 0.5]);
    let next = step(
        &state,
        &[Action::use_move("p1", "retreat_strike", Some("p2"))],
        &mut rng,
    );
    assert!(next.active("p2").unwrap().hp < 200);
    assert!(next.active("p1").unwrap().has_status("pending_switch"));
}

#[test]
fn a_flagged_creature_can_only_switch() {
    let mut state = two_on_one();
    state
        .active_mut("p1")
        .unwrap()
        .statuses
        .push(crate::battle::state::StatusInstance::new("pending_switch", None));

    let mut rng = rng_of(&[0.5]);
    let next = step(
        &state,
        &[Action::use_move("p1", "tackle", Some("p2"))],
        &mut rng,
    );
    assert_eq!(next.active("p2").unwrap().hp, 200);
    assert_log_contains(&next, "must switch out");
}

#[test]
fn losing_every_creature_ends_the_battle() {
    let mut state = two_on_one();
    for creature in &mut state.player_mut("p1").unwrap().team {
        creature.hp = 0;
    }
    assert!(crate::battle::engine::is_battle_over(&state));
    assert_eq!(
        crate::battle::engine::get_winner(&state).as_deref(),
        Some("p2")
    );
}
