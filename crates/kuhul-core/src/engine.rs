//! The command engine
//!
//! The engine exclusively owns the live [`State`]. Each structurally valid
//! command produces exactly one event: a change/signal event when accepted,
//! a `command.rejected` event otherwise. `epoch_ms` moves if and only if the
//! command was accepted.

use crate::bus::{EventBus, EventLog};
use crate::command::{Command, Op, Outcome, Rejection};
use crate::event::{change, topic, Event};
use crate::ids::{IdGenerator, IdKind, SequentialIds};
use crate::state::{Component, Phase, State};
use crate::Result;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Deterministic state machine applying commands to a bound state
pub struct Engine<L, G = SequentialIds> {
    bus: EventBus<L>,
    state: State,
    ids: G,
}

impl<L: EventLog, G: IdGenerator> Engine<L, G> {
    /// Bind an engine to a bus, an explicitly loaded state and an id source
    pub fn new(bus: EventBus<L>, state: State, ids: G) -> Self {
        Self { bus, state, ids }
    }

    /// The live state
    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn bus(&self) -> &EventBus<L> {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut EventBus<L> {
        &mut self.bus
    }

    /// Mint an id from the engine's generator (e.g. for new commands)
    pub fn next_id(&mut self, kind: IdKind, ts_ms: u64) -> String {
        self.ids.next_id(kind, ts_ms)
    }

    pub fn into_parts(self) -> (EventBus<L>, State, G) {
        (self.bus, self.state, self.ids)
    }

    /// Apply one command
    ///
    /// Returns `Err` only for protocol faults and log failures. Every other
    /// outcome is reported through exactly one event and the returned
    /// [`Outcome`].
    pub fn apply_command(&mut self, cmd: &Command) -> Result<Outcome> {
        cmd.check_envelope()?;
        let ts_ms = cmd.ts_ms;
        let cmd_id = cmd.id.as_str();

        if ts_ms < self.state.epoch_ms {
            return self.reject(ts_ms, cmd_id, Rejection::TimeRegression);
        }
        if let Err(rejection) = self.begin_dispatch() {
            return self.reject(ts_ms, cmd_id, rejection);
        }

        let outcome = match Op::parse(&cmd.op, &cmd.args) {
            Ok(op) => self.dispatch(cmd_id, ts_ms, op)?,
            Err(rejection) => self.reject(ts_ms, cmd_id, rejection)?,
        };

        if outcome.is_accepted() {
            self.state.epoch_ms = ts_ms;
        }
        self.finish_dispatch();
        Ok(outcome)
    }

    /// Serialize the live state and record it as a `state.snapshot` event
    pub fn state_snapshot(&mut self, caused_by: &str, ts_ms: u64) -> Result<Value> {
        let snapshot = self.state.to_document();
        let mut data = Map::new();
        data.insert("state".to_string(), snapshot.clone());
        self.emit_event(ts_ms, caused_by, topic::STATE_SNAPSHOT, data)?;
        info!(caused_by, ts_ms, components = self.state.components.len(), "state snapshot");
        Ok(snapshot)
    }

    /// accepting -> applying; any other starting phase signals a nested call
    fn begin_dispatch(&mut self) -> std::result::Result<(), Rejection> {
        match self.state.phase {
            Phase::Accepting => {
                self.state.phase = Phase::Applying;
                Ok(())
            }
            phase => Err(Rejection::PhaseNotAccepting { phase }),
        }
    }

    fn finish_dispatch(&mut self) {
        self.state.phase = Phase::Accepting;
    }

    /// Emit the outcome event first, then mutate; a failed append leaves state untouched
    fn dispatch(&mut self, cmd_id: &str, ts_ms: u64, op: Op) -> Result<Outcome> {
        let name = op.name();
        match op {
            Op::UiCreate { component, props } => {
                let id = self.ids.next_id(IdKind::Component, ts_ms);
                let component = Component::new(id, component, props);
                let mut data = Map::new();
                data.insert("kind".to_string(), Value::from(change::COMPONENT_CREATED));
                data.insert("component".to_string(), component.to_value());
                self.emit_event(ts_ms, cmd_id, topic::STATE_CHANGED, data)?;
                self.state.components.push(component);
            }
            Op::ThemeApply { name: to } => {
                let from = self.state.theme;
                let mut data = Map::new();
                data.insert("kind".to_string(), Value::from(change::THEME_CHANGED));
                data.insert("from".to_string(), Value::from(from.as_str()));
                data.insert("to".to_string(), Value::from(to.as_str()));
                self.emit_event(ts_ms, cmd_id, topic::STATE_CHANGED, data)?;
                self.state.theme = to;
            }
            Op::SvgExport { hint } => {
                let mut data = Map::new();
                data.insert("format".to_string(), Value::from("svg"));
                data.insert("hint".to_string(), hint);
                self.emit_event(ts_ms, cmd_id, topic::SVG_EXPORT_REQUESTED, data)?;
            }
            Op::ShellIntent { intent, shell } => {
                let mut data = Map::new();
                data.insert("intent".to_string(), Value::from(intent));
                data.insert("shell".to_string(), Value::from(shell));
                self.emit_event(ts_ms, cmd_id, topic::SHELL_INTENT_RECEIVED, data)?;
            }
        }
        debug!(op = name, ts_ms, cmd_id, "command accepted");
        Ok(Outcome::Accepted)
    }

    fn reject(&mut self, ts_ms: u64, cmd_id: &str, rejection: Rejection) -> Result<Outcome> {
        info!(reason = rejection.code(), ts_ms, cmd_id, "command rejected");
        self.emit_event(ts_ms, cmd_id, topic::COMMAND_REJECTED, rejection.to_data())?;
        Ok(Outcome::Rejected(rejection))
    }

    fn emit_event(
        &mut self,
        ts_ms: u64,
        caused_by: &str,
        topic: &str,
        data: Map<String, Value>,
    ) -> Result<Event> {
        let id = self.ids.next_id(IdKind::Event, ts_ms);
        let event = Event::new(id, ts_ms, caused_by, topic, data);
        self.bus.append(&event, true)?;
        Ok(event)
    }
}
