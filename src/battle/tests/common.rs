use crate::battle::engine::{step_battle, StepOptions};
use crate::battle::state::{
    create_battle_state, Action, BattleState, CreatureState, StatusInstance, TurnRng,
};
use crate::move_data::StatusData;
use crate::player::PlayerState;

/// A builder for battle-ready test creatures with flat, predictable stats.
///
/// # Example
/// ```ignore
/// let attacker = TestCreatureBuilder::new("c1", "Frosty")
///     .with_types(&["ice"])
///     .with_moves(&["icicle_spear"])
///     .build();
/// ```
pub struct TestCreatureBuilder {
    creature: CreatureState,
}

impl TestCreatureBuilder {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            creature: CreatureState {
                id: id.to_string(),
                species_id: id.to_string(),
                name: name.to_string(),
                level: 50,
                types: vec!["normal".to_string()],
                moves: Vec::new(),
                move_pp: Default::default(),
                ability: None,
                item: None,
                hp: 200,
                max_hp: 200,
                attack: 100,
                defense: 100,
                sp_attack: 100,
                sp_defense: 100,
                speed: 100,
                stages: Default::default(),
                statuses: Vec::new(),
                ability_flags: Default::default(),
                scratch: Default::default(),
            },
        }
    }

    pub fn with_types(mut self, types: &[&str]) -> Self {
        self.creature.types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_moves(mut self, moves: &[&str]) -> Self {
        self.creature.moves = moves.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_ability(mut self, ability: &str) -> Self {
        self.creature.ability = Some(ability.to_string());
        self
    }

    pub fn with_item(mut self, item: &str) -> Self {
        self.creature.item = Some(item.to_string());
        self
    }

    pub fn with_hp(mut self, hp: i32, max_hp: i32) -> Self {
        self.creature.hp = hp;
        self.creature.max_hp = max_hp;
        self
    }

    pub fn with_speed(mut self, speed: i32) -> Self {
        self.creature.speed = speed;
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.creature.level = level;
        self
    }

    pub fn with_status(mut self, id: &str, remaining_turns: Option<i32>) -> Self {
        self.creature
            .statuses
            .push(StatusInstance::new(id, remaining_turns));
        self
    }

    pub fn with_status_data(
        mut self,
        id: &str,
        remaining_turns: Option<i32>,
        data: StatusData,
    ) -> Self {
        self.creature.statuses.push(StatusInstance {
            id: id.to_string(),
            remaining_turns,
            data,
        });
        self
    }

    pub fn build(self) -> CreatureState {
        self.creature
    }
}

/// A standard 1v1 battle: players "p1" and "p2", one creature each.
pub fn create_test_battle(c1: CreatureState, c2: CreatureState) -> BattleState {
    create_test_battle_teams(vec![c1], vec![c2])
}

pub fn create_test_battle_teams(
    team1: Vec<CreatureState>,
    team2: Vec<CreatureState>,
) -> BattleState {
    create_battle_state(vec![
        PlayerState::new("p1", "Player 1", team1),
        PlayerState::new("p2", "Player 2", team2),
    ])
}

/// Scripted RNG oracle from explicit draws.
pub fn rng_of(values: &[f64]) -> TurnRng {
    TurnRng::new_for_test(values.to_vec())
}

/// A generous scripted oracle for tests where the exact stream is not the
/// point: every draw is 0.5, which passes accuracy and fails crits/procs.
pub fn predictable_rng() -> TurnRng {
    TurnRng::new_for_test(vec![0.5; 100])
}

/// Step one turn with history recording on.
pub fn step(state: &BattleState, actions: &[Action], rng: &mut TurnRng) -> BattleState {
    step_battle(state, actions, rng, &StepOptions::default())
}

/// Assert some log line of `state` contains `needle`.
pub fn assert_log_contains(state: &BattleState, needle: &str) {
    assert!(
        state.log.iter().any(|line| line.contains(needle)),
        "expected a log line containing {:?}, got log: {:#?}",
        needle,
        state.log
    );
}

pub fn assert_log_not_contains(state: &BattleState, needle: &str) {
    assert!(
        !state.log.iter().any(|line| line.contains(needle)),
        "expected no log line containing {:?}, got log: {:#?}",
        needle,
        state.log
    );
}
