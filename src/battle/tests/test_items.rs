//! Item model: dual representation, consumption, ability negation, and
//! end-of-turn residual items.

use crate::battle::state::Action;
use crate::battle::tests::common::*;
use crate::move_data::StatusData;

#[test]
fn item_reads_check_both_representations() {
    let scalar = TestCreatureBuilder::new("c1", "Scalar")
        .with_item("leftovers")
        .build();
    assert!(scalar.has_item());
    assert_eq!(scalar.item_id().as_deref(), Some("leftovers"));

    let status_form = TestCreatureBuilder::new("c2", "StatusForm")
        .with_status_data(
            "berry",
            None,
            StatusData {
                item_id: Some("sitrus_berry".to_string()),
                ..StatusData::default()
            },
        )
        .build();
    assert!(status_form.has_item());
    assert_eq!(status_form.item_id().as_deref(), Some("sitrus_berry"));
}

#[test]
fn using_a_berry_marks_it_consumed() {
    let holder = TestCreatureBuilder::new("c1", "Holder")
        .with_item("sitrus_berry")
        .build();
    let foe = TestCreatureBuilder::new("c2", "Foe").build();
    let state = create_test_battle(holder, foe);

    let mut rng = predictable_rng();
    let next = step(&state, &[Action::use_item("p1")], &mut rng);
    let used = next.active("p1").unwrap();
    assert!(!used.has_item());
    assert!(used.has_status("berry_consumed"));
}

#[test]
fn using_a_plain_item_leaves_no_berry_marker() {
    let holder = TestCreatureBuilder::new("c1", "Holder")
        .with_item("leftovers")
        .build();
    let foe = TestCreatureBuilder::new("c2", "Foe").build();
    let state = create_test_battle(holder, foe);

    let mut rng = predictable_rng();
    let next = step(&state, &[Action::use_item("p1")], &mut rng);
    let used = next.active("p1").unwrap();
    assert!(!used.has_item());
    assert!(!used.has_status("berry_consumed"));
}

#[test]
fn klutz_cannot_use_items() {
    let holder = TestCreatureBuilder::new("c1", "Holder")
        .with_item("sitrus_berry")
        .with_ability("klutz")
        .build();
    let foe = TestCreatureBuilder::new("c2", "Foe").build();
    let state = create_test_battle(holder, foe);

    let mut rng = rng_of(&[0.5]);
    let next = step(&state, &[Action::use_item("p1")], &mut rng);
    assert!(next.active("p1").unwrap().has_item());
    assert_log_contains(&next, "can't use items");

    let error = crate::battle::engine::validate_action(&state, &Action::use_item("p1"));
    assert!(matches!(
        error,
        Err(crate::errors::ActionError::ItemNotUsable(_))
    ));
}

#[test]
fn leftovers_heal_a_sixteenth_at_turn_end() {
    let mut holder = TestCreatureBuilder::new("c1", "Holder")
        .with_item("leftovers")
        .build();
    holder.hp = 100;
    let foe = TestCreatureBuilder::new("c2", "Foe").build();
    let state = create_test_battle(holder, foe);

    let mut rng = rng_of(&[0.5]);
    let next = step(&state, &[Action::wait("p1")], &mut rng);
    // 200 / 16 = 12
    assert_eq!(next.active("p1").unwrap().hp, 112);
    assert_log_contains(&next, "leftovers");
}

#[test]
fn black_sludge_heals_poison_types_and_hurts_the_rest() {
    let mut sludged = TestCreatureBuilder::new("c1", "Sludged")
        .with_types(&["poison"])
        .with_item("black_sludge")
        .build();
    sludged.hp = 100;
    let foe = TestCreatureBuilder::new("c2", "Foe")
        .with_item("black_sludge")
        .build();
    let state = create_test_battle(sludged, foe);

    let mut rng = rng_of(&[0.5]);
    let next = step(&state, &[Action::wait("p1")], &mut rng);
    assert_eq!(next.active("p1").unwrap().hp, 112);
    assert_eq!(next.active("p2").unwrap().hp, 175);
}
