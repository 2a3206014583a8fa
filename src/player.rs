use serde::{Deserialize, Serialize};

use crate::battle::state::CreatureState;

/// One side of the battle: an ordered team of up to six creatures, the index
/// of the one on the field, and a scratch slot for ability inheritance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub id: String,
    pub name: String,
    pub team: Vec<CreatureState>,
    #[serde(default)]
    pub active_slot: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_fainted_ability: Option<String>,
}

impl PlayerState {
    pub fn new(id: impl Into<String>, name: impl Into<String>, team: Vec<CreatureState>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            team,
            active_slot: 0,
            last_fainted_ability: None,
        }
    }

    pub fn active(&self) -> Option<&CreatureState> {
        self.team.get(self.active_slot)
    }

    pub fn has_survivor(&self) -> bool {
        self.team.iter().any(|c| c.hp > 0)
    }

    /// Bench slots that a switch could legally land on.
    pub fn switch_targets(&self) -> Vec<usize> {
        self.team
            .iter()
            .enumerate()
            .filter(|(idx, c)| *idx != self.active_slot && c.hp > 0)
            .map(|(idx, _)| idx)
            .collect()
    }
}
