use creature_arena::{
    choose_highest_power, create_battle_state, create_creature, get_best_move_minimax, get_winner,
    is_battle_over, step_battle, Action, CreatureOptions, PlayerState, StepOptions, TurnRng,
};

fn team(specs: &[(&str, &[&str])]) -> Vec<creature_arena::CreatureState> {
    specs
        .iter()
        .map(|(species, moves)| {
            create_creature(
                species,
                CreatureOptions {
                    moves: Some(moves.iter().map(|m| m.to_string()).collect()),
                    ..CreatureOptions::default()
                },
            )
            .expect("demo team must validate")
        })
        .collect()
}

fn main() {
    let red_team = team(&[
        ("tatuta", &["icicle_spear", "tackle", "protect", "knock_off"]),
        ("hinoko", &["ember", "sunny_day", "quick_attack"]),
    ]);
    let blue_team = team(&[
        ("morimitu", &["leech_seed", "tackle", "growl", "recover"]),
        ("mizuchi", &["water_gun", "rain_dance", "tackle"]),
    ]);

    let mut state = create_battle_state(vec![
        PlayerState::new("red", "Red", red_team),
        PlayerState::new("blue", "Blue", blue_team),
    ]);

    let mut rng = TurnRng::seeded(0xA11CE);
    let options = StepOptions::default();

    while !is_battle_over(&state) && state.turn < 60 {
        let red_action = get_best_move_minimax(&state, "red", 1)
            .unwrap_or_else(|| Action::wait("red"));
        let blue_action =
            choose_highest_power(&state, "blue").unwrap_or_else(|| Action::wait("blue"));
        state = step_battle(&state, &[red_action, blue_action], &mut rng, &options);
    }

    for line in &state.log {
        println!("{}", line);
    }
    match get_winner(&state) {
        Some(winner) => println!("=== {} wins after {} turns ===", winner, state.turn),
        None => println!("=== no winner after {} turns ===", state.turn),
    }
}
