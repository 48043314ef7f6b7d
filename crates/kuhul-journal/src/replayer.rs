//! Replay of recorded event logs with step control

use crate::log::RecordLog;
use crate::Result;
use kuhul_core::{apply_event, replay, Event, Phase, State};
use std::path::Path;
use tracing::{debug, info};

/// State of the replayer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayState {
    /// Nothing applied yet
    Idle,
    /// Stopped part way through the log
    Paused,
    /// Every event has been folded
    Finished,
}

/// Cursor over a recorded event sequence
///
/// Provides fine-grained control over reconstruction:
/// - Step forward one event at a time
/// - Jump to a position (rewinding from the base if needed)
/// - Fold everything up to a timestamp
///
/// The exposed state always has `phase = accepting`, and at every position it
/// equals `replay(base, &events[..position])`.
pub struct Replayer<'a> {
    base: State,
    events: &'a [Event],
    current: State,
    position: usize,
    changes: usize,
    state: ReplayState,
}

impl<'a> Replayer<'a> {
    /// Create a replayer folding `events` onto `base`
    pub fn new(base: &State, events: &'a [Event]) -> Self {
        let mut start = base.clone();
        start.phase = Phase::Accepting;
        Self {
            base: base.clone(),
            events,
            current: start,
            position: 0,
            changes: 0,
            state: ReplayState::Idle,
        }
    }

    /// The reconstructed state at the current position
    pub fn state(&self) -> &State {
        &self.current
    }

    pub fn replay_state(&self) -> ReplayState {
        self.state
    }

    /// Number of events folded so far
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total number of events in the log
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events folded so far that actually changed state
    pub fn changes(&self) -> usize {
        self.changes
    }

    /// Fold the next event; returns false once the log is exhausted
    pub fn step_forward(&mut self) -> bool {
        let Some(event) = self.events.get(self.position) else {
            self.state = ReplayState::Finished;
            return false;
        };
        if apply_event(&mut self.current, event) {
            self.changes += 1;
        }
        self.position += 1;
        debug!(position = self.position, topic = %event.topic, "replayed event");

        self.state = if self.position == self.events.len() {
            ReplayState::Finished
        } else {
            ReplayState::Paused
        };
        true
    }

    /// Move to `position` (clamped to the log length)
    ///
    /// Moving backwards rebuilds from the base state.
    pub fn goto(&mut self, position: usize) {
        let target = position.min(self.events.len());
        if target < self.position {
            self.reset();
        }
        while self.position < target {
            self.step_forward();
        }
        if target < self.events.len() && target > 0 {
            self.state = ReplayState::Paused;
        }
    }

    /// Fold every remaining event with `ts_ms <= until_ms`
    pub fn replay_until(&mut self, until_ms: u64) -> usize {
        let start = self.position;
        while self
            .events
            .get(self.position)
            .is_some_and(|e| e.ts_ms <= until_ms)
        {
            self.step_forward();
        }
        self.position - start
    }

    /// Rewind to the base state
    pub fn reset(&mut self) {
        self.current = self.base.clone();
        self.current.phase = Phase::Accepting;
        self.position = 0;
        self.changes = 0;
        self.state = ReplayState::Idle;
    }

    /// Fold the rest of the log and return the final state
    pub fn finish(mut self) -> State {
        while self.step_forward() {}
        self.current
    }
}

/// Load an event log from disk and fold it onto `base`
pub fn replay_file(base: &State, path: impl AsRef<Path>) -> Result<State> {
    let path = path.as_ref();
    let events = RecordLog::read_events(path)?;
    let state = replay(base, &events);
    info!(
        path = %path.display(),
        events = events.len(),
        components = state.components.len(),
        epoch_ms = state.epoch_ms,
        "log replayed"
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JournalConfig;
    use kuhul_core::{change, topic, Theme};
    use serde_json::{json, Map, Value};
    use tempfile::TempDir;

    fn base() -> State {
        State::new(Theme::Light, Vec::new(), 0, Phase::Accepting)
    }

    fn changed(ts_ms: u64, data: Value) -> Event {
        Event::new(
            format!("evt_{ts_ms}"),
            ts_ms,
            format!("cmd_{ts_ms}"),
            topic::STATE_CHANGED,
            data.as_object().cloned().unwrap_or_default(),
        )
    }

    fn create(ts_ms: u64, id: &str) -> Event {
        changed(
            ts_ms,
            json!({"kind": change::COMPONENT_CREATED,
                   "component": {"id": id, "type": "button", "props": {"text": id}}}),
        )
    }

    fn recorded() -> Vec<Event> {
        vec![
            create(10, "a"),
            Event::new("evt_s", 10, "cmd_10", topic::STATE_SNAPSHOT, Map::new()),
            changed(20, json!({"kind": change::THEME_CHANGED, "from": "light", "to": "dark"})),
            create(30, "b"),
        ]
    }

    #[test]
    fn test_step_forward() {
        let events = recorded();
        let mut replayer = Replayer::new(&base(), &events);
        assert_eq!(replayer.replay_state(), ReplayState::Idle);

        assert!(replayer.step_forward());
        assert_eq!(replayer.position(), 1);
        assert_eq!(replayer.state().components.len(), 1);
        assert_eq!(replayer.replay_state(), ReplayState::Paused);

        while replayer.step_forward() {}
        assert_eq!(replayer.replay_state(), ReplayState::Finished);
        assert_eq!(replayer.changes(), 3);
    }

    #[test]
    fn test_every_position_matches_fold() {
        let events = recorded();
        let mut replayer = Replayer::new(&base(), &events);
        for position in (0..=events.len()).rev() {
            replayer.goto(position);
            assert_eq!(replayer.state(), &replay(&base(), &events[..position]));
        }
    }

    #[test]
    fn test_replay_until() {
        let events = recorded();
        let mut replayer = Replayer::new(&base(), &events);
        assert_eq!(replayer.replay_until(20), 3);
        assert_eq!(replayer.state().theme, Theme::Dark);
        assert_eq!(replayer.state().components.len(), 1);
        assert_eq!(replayer.state().epoch_ms, 20);
    }

    #[test]
    fn test_reset_and_finish() {
        let events = recorded();
        let mut replayer = Replayer::new(&base(), &events);
        replayer.goto(3);
        replayer.reset();
        assert_eq!(replayer.position(), 0);
        assert_eq!(replayer.state(), &base());

        let last = replayer.finish();
        assert_eq!(last, replay(&base(), &events));
    }

    #[test]
    fn test_forces_accepting_phase() {
        let mut mid_dispatch = base();
        mid_dispatch.phase = Phase::Applying;
        let replayer = Replayer::new(&mid_dispatch, &[]);
        assert!(replayer.is_empty());
        assert_eq!(replayer.state().phase, Phase::Accepting);
    }

    #[test]
    fn test_replay_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("s.events.jsonl");
        let mut log = RecordLog::open(&path, JournalConfig::default()).unwrap();
        for event in recorded() {
            log.append_record(&event).unwrap();
        }

        let state = replay_file(&base(), &path).unwrap();
        assert_eq!(state, replay(&base(), &recorded()));
        assert_eq!(state.components.len(), 2);
    }
}
