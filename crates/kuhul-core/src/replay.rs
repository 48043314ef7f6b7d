//! Pure state reconstruction from a recorded event sequence
//!
//! Replay never touches an engine or a bus. It clones the base state and
//! folds `state.changed` events onto it in log order.

use crate::event::{change, topic, Event};
use crate::state::{Component, Phase, State, Theme};
use serde_json::Value;
use tracing::warn;

/// Fold `events` onto a copy of `base`
///
/// Deterministic: identical inputs always yield identical output. The result
/// is always ready to accept commands (`phase = accepting`), even if the log
/// was captured mid-dispatch.
pub fn replay<'a>(base: &State, events: impl IntoIterator<Item = &'a Event>) -> State {
    let mut state = base.clone();
    for event in events {
        apply_event(&mut state, event);
    }
    state.phase = Phase::Accepting;
    state
}

/// Apply one event to `state`, returning whether it changed anything
///
/// Only `state.changed` events with a recognised `kind` and a well-formed
/// payload have an effect; everything else is ignored.
pub fn apply_event(state: &mut State, event: &Event) -> bool {
    if !event.is(topic::STATE_CHANGED) {
        return false;
    }

    match event.kind() {
        Some(change::COMPONENT_CREATED) => {
            let Some(raw) = event.data.get("component").filter(|c| c.is_object()) else {
                return false;
            };
            match Component::from_value(raw) {
                Ok(component) => {
                    state.components.push(component);
                    state.epoch_ms = event.ts_ms;
                    true
                }
                Err(err) => {
                    warn!(event_id = %event.id, error = %err, "skipping malformed component");
                    false
                }
            }
        }
        Some(change::THEME_CHANGED) => {
            match event.data.get("to").and_then(Value::as_str).and_then(Theme::from_name) {
                Some(theme) => {
                    state.theme = theme;
                    state.epoch_ms = event.ts_ms;
                    true
                }
                None => false,
            }
        }
        _ => false,
    }
}
