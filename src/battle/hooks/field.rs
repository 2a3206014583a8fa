use crate::battle::events::{BattleEvent, EventMeta};
use crate::battle::hooks::{HookContext, LifecycleHook};
use crate::battle::state::BattleState;
use crate::battle::hooks::statuses::StatusHookOutcome;

/// Active weather, derived from the field effect list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Weather {
    Sun,
    Rain,
    Hail,
    Sandstorm,
}

impl Weather {
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "sun" => Some(Weather::Sun),
            "rain" => Some(Weather::Rain),
            "hail" => Some(Weather::Hail),
            "sandstorm" => Some(Weather::Sandstorm),
            _ => None,
        }
    }

    fn fade_message(self) -> &'static str {
        match self {
            Weather::Sun => "The sunlight faded.",
            Weather::Rain => "The rain stopped.",
            Weather::Hail => "The hail stopped.",
            Weather::Sandstorm => "The sandstorm subsided.",
        }
    }
}

/// The weather currently on the field, if any.
pub fn get_weather(state: &BattleState) -> Option<Weather> {
    state
        .field
        .global
        .iter()
        .find_map(|e| Weather::from_id(&e.id))
}

fn chip_immune(weather: Weather, creature: &crate::battle::state::CreatureState) -> bool {
    match weather {
        Weather::Hail => creature.has_type("ice"),
        Weather::Sandstorm => {
            creature.has_type("rock") || creature.has_type("ground") || creature.has_type("steel")
        }
        Weather::Sun | Weather::Rain => true,
    }
}

/// Field registry dispatch. Weather is the only global effect with turn-end
/// behavior: residual chip damage for hail/sandstorm and a fade log on the
/// turn the duration runs out.
pub fn run_field_hooks(
    state: &BattleState,
    hook: LifecycleHook,
    _ctx: &mut HookContext<'_>,
) -> StatusHookOutcome {
    let mut outcome = StatusHookOutcome::default();
    if hook != LifecycleHook::TurnEnd {
        return outcome;
    }

    for effect in &state.field.global {
        let Some(weather) = Weather::from_id(&effect.id) else {
            continue;
        };
        if matches!(weather, Weather::Hail | Weather::Sandstorm) {
            let storm_log = match weather {
                Weather::Hail => "Hail continues to fall!",
                _ => "The sandstorm rages!",
            };
            outcome.events.push(BattleEvent::Log {
                message: storm_log.to_string(),
            });
            for player in &state.players {
                let Some(active) = state.active(&player.id) else {
                    continue;
                };
                if active.hp <= 0 || chip_immune(weather, active) {
                    continue;
                }
                let chip = (active.max_hp / 16).max(1);
                outcome.events.push(BattleEvent::Damage {
                    target_id: player.id.clone(),
                    amount: chip,
                    meta: EventMeta::default(),
                });
            }
        }
        // Duration tick happens after this phase; announce the fade now.
        if effect.remaining_turns == Some(1) {
            outcome.events.push(BattleEvent::Log {
                message: weather.fade_message().to_string(),
            });
        }
    }
    outcome
}
