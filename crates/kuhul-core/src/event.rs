//! Events: immutable records of what happened while processing commands

use crate::command::VERSION;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire type tag for events
pub const EVENT_TYPE: &str = "kuhul.event";

/// Event topics emitted by the engine
pub mod topic {
    pub const STATE_CHANGED: &str = "state.changed";
    pub const STATE_SNAPSHOT: &str = "state.snapshot";
    pub const COMMAND_REJECTED: &str = "command.rejected";
    pub const SVG_EXPORT_REQUESTED: &str = "svg.export.requested";
    pub const SHELL_INTENT_RECEIVED: &str = "shell.intent.received";
}

/// `data.kind` values carried by `state.changed` events
pub mod change {
    pub const COMPONENT_CREATED: &str = "component.created";
    pub const THEME_CHANGED: &str = "theme.changed";
}

/// An event in the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "@type")]
    pub type_tag: String,
    #[serde(rename = "@v")]
    pub version: String,
    pub id: String,
    pub ts_ms: u64,
    /// Id of the command that produced this event
    pub caused_by: String,
    pub topic: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Event {
    /// Create an event
    pub fn new(
        id: impl Into<String>,
        ts_ms: u64,
        caused_by: impl Into<String>,
        topic: impl Into<String>,
        data: Map<String, Value>,
    ) -> Self {
        Self {
            type_tag: EVENT_TYPE.to_string(),
            version: VERSION.to_string(),
            id: id.into(),
            ts_ms,
            caused_by: caused_by.into(),
            topic: topic.into(),
            data,
        }
    }

    /// Add a data field
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Check the topic
    pub fn is(&self, topic: &str) -> bool {
        self.topic == topic
    }

    /// `data.kind`, if present and a string
    pub fn kind(&self) -> Option<&str> {
        self.data.get("kind").and_then(Value::as_str)
    }

    /// `data.reason` of a rejection event
    pub fn reason(&self) -> Option<&str> {
        if !self.is(topic::COMMAND_REJECTED) {
            return None;
        }
        self.data.get("reason").and_then(Value::as_str)
    }
}
