pub mod abilities;
pub mod field;
pub mod statuses;

use crate::battle::events::{BattleEvent, EventKind};
use crate::battle::state::{Action, BattleState, TurnRng};
use crate::move_data::MoveData;

/// Named lifecycle entry points shared by all three registries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleHook {
    SwitchIn,
    BeforeAction,
    TurnStart,
    TurnEnd,
}

/// Shared context handed to lifecycle handlers.
pub struct HookContext<'a> {
    pub rng: &'a mut TurnRng,
    pub action: Option<&'a Action>,
    pub move_data: Option<&'a MoveData>,
}

/// What a lifecycle handler may hand back to the resolver.
#[derive(Default)]
pub struct HookOutcome {
    /// Replacement state; handlers that mutate scratch return one.
    pub state: Option<BattleState>,
    /// Events to apply, in order, after the handler runs.
    pub events: Vec<BattleEvent>,
    /// Cancels the action being processed.
    pub prevent_action: bool,
    /// Replaces the action being processed (Encore, lock_move, ...).
    pub override_action: Option<Action>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformKind {
    Cancel,
    Replace,
}

/// A declarative event rewrite produced by `onEventTransform` handlers.
/// Transforms are stable-sorted by descending priority before application.
#[derive(Clone, Debug)]
pub struct EventTransform {
    pub kind: TransformKind,
    /// Only events of this kind match.
    pub from: Option<EventKind>,
    /// Only events targeting this player match.
    pub target_id: Option<String>,
    /// Events whose meta source equals this id never match (self-origin).
    pub except_source_id: Option<String>,
    /// Replacement events for `TransformKind::Replace`.
    pub to: Vec<BattleEvent>,
    pub priority: i32,
}

impl EventTransform {
    pub fn matches(&self, event: &BattleEvent) -> bool {
        if let Some(from) = self.from {
            if event.kind() != from {
                return false;
            }
        }
        if let Some(target_id) = &self.target_id {
            match event.target_id() {
                Some(t) if t == target_id => {}
                _ => return false,
            }
        }
        if let Some(meta) = event.meta() {
            if !meta.cancellable {
                return false;
            }
            if let Some(except) = &self.except_source_id {
                if meta.source.as_deref() == Some(except.as_str()) {
                    return false;
                }
            }
        } else {
            return false;
        }
        true
    }
}

/// Run the collected transforms over an event list: cancellations drop the
/// event, the first matching replacement substitutes its `to` list.
pub fn apply_event_transforms(
    events: &[BattleEvent],
    transforms: &[EventTransform],
) -> Vec<BattleEvent> {
    if transforms.is_empty() {
        return events.to_vec();
    }
    let mut result = Vec::new();
    'next_event: for event in events {
        for transform in transforms {
            if transform.kind == TransformKind::Cancel && transform.matches(event) {
                continue 'next_event;
            }
        }
        for transform in transforms {
            if transform.kind == TransformKind::Replace && transform.matches(event) {
                result.extend(transform.to.clone());
                continue 'next_event;
            }
        }
        result.push(event.clone());
    }
    result
}
