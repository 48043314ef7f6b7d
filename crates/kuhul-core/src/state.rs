//! UI state model and its closed-schema document boundary
//!
//! State enters the system from an externally supplied document, so loading
//! is strict: every field must be present, nothing undeclared is accepted,
//! and every enum-valued field must name a known member.

use crate::error::SchemaError;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;

const STATE_FIELDS: [&str; 4] = ["components", "epoch_ms", "phase", "theme"];
const COMPONENT_FIELDS: [&str; 3] = ["id", "props", "type"];

/// Colour theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub const ALL: [Theme; 2] = [Theme::Dark, Theme::Light];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine processing phase
///
/// `Accepting` is idle. `Applying` is only observed while a command is being
/// dispatched, or in a document captured mid-dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Accepting,
    Applying,
}

impl Phase {
    pub const ALL: [Phase; 2] = [Phase::Accepting, Phase::Applying];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Accepting => "accepting",
            Phase::Applying => "applying",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of UI component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Button,
    Card,
    ChatBubble,
}

impl ComponentType {
    pub const ALL: [ComponentType; 3] = [
        ComponentType::Button,
        ComponentType::Card,
        ComponentType::ChatBubble,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Button => "button",
            ComponentType::Card => "card",
            ComponentType::ChatBubble => "chat-bubble",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allowed component property key
///
/// The set is global, not per component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropKey {
    Text,
    Label,
}

impl PropKey {
    pub const ALL: [PropKey; 2] = [PropKey::Text, PropKey::Label];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropKey::Text => "text",
            PropKey::Label => "label",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for PropKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Component properties in insertion order
pub type Props = IndexMap<PropKey, String>;

/// Why a raw property map could not be typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PropsFault {
    /// Keys outside the allowed set, sorted
    Undeclared(Vec<String>),
    /// First key (in document order) whose value is not a string
    NotString(String),
}

/// Type a raw property map, checking keys before values
pub(crate) fn parse_props(raw: &Map<String, Value>) -> Result<Props, PropsFault> {
    let mut undeclared: Vec<String> = raw
        .keys()
        .filter(|k| PropKey::from_name(k).is_none())
        .cloned()
        .collect();
    if !undeclared.is_empty() {
        undeclared.sort();
        return Err(PropsFault::Undeclared(undeclared));
    }

    let mut props = Props::with_capacity(raw.len());
    for (key, value) in raw {
        let Some(text) = value.as_str() else {
            return Err(PropsFault::NotString(key.clone()));
        };
        if let Some(prop) = PropKey::from_name(key) {
            props.insert(prop, text.to_string());
        }
    }
    Ok(props)
}

fn props_to_value(props: &Props) -> Value {
    let map: Map<String, Value> = props
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), Value::String(v.clone())))
        .collect();
    Value::Object(map)
}

/// Reject undeclared fields first, then missing ones. Both lists are sorted.
fn check_fields(
    what: &'static str,
    obj: &Map<String, Value>,
    expected: &[&str],
) -> Result<(), SchemaError> {
    let mut extra: Vec<String> = obj
        .keys()
        .filter(|k| !expected.contains(&k.as_str()))
        .cloned()
        .collect();
    if !extra.is_empty() {
        extra.sort();
        return Err(SchemaError::UndeclaredFields {
            what,
            fields: extra,
        });
    }

    let missing: Vec<String> = expected
        .iter()
        .filter(|k| !obj.contains_key(**k))
        .map(|k| k.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingFields {
            what,
            fields: missing,
        });
    }
    Ok(())
}

/// A single UI component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Unique id, minted by the identifier generator
    pub id: String,
    /// Component type
    pub kind: ComponentType,
    /// Properties, keyed by the global allowed key set
    pub props: Props,
}

impl Component {
    /// Create a component
    pub fn new(id: impl Into<String>, kind: ComponentType, props: Props) -> Self {
        Self {
            id: id.into(),
            kind,
            props,
        }
    }

    /// Add a property
    pub fn with_prop(mut self, key: PropKey, value: impl Into<String>) -> Self {
        self.props.insert(key, value.into());
        self
    }

    /// Validate a component document
    pub fn from_value(raw: &Value) -> Result<Self, SchemaError> {
        let obj = raw.as_object().ok_or(SchemaError::NotAnObject {
            what: "component",
        })?;
        check_fields("component", obj, &COMPONENT_FIELDS)?;

        let id = match obj.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(SchemaError::InvalidComponentId),
        };

        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .and_then(ComponentType::from_name)
            .ok_or(SchemaError::InvalidComponentType)?;

        let raw_props = obj
            .get("props")
            .and_then(Value::as_object)
            .ok_or(SchemaError::NotAnObject {
                what: "component props",
            })?;
        let props = parse_props(raw_props).map_err(|fault| match fault {
            PropsFault::Undeclared(keys) => SchemaError::UndeclaredProps(keys),
            PropsFault::NotString(key) => SchemaError::PropNotString(key),
        })?;

        Ok(Self { id, kind, props })
    }

    /// Serialize to a document accepted by [`Component::from_value`]
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("id".to_string(), Value::String(self.id.clone()));
        map.insert(
            "type".to_string(),
            Value::String(self.kind.as_str().to_string()),
        );
        map.insert("props".to_string(), props_to_value(&self.props));
        Value::Object(map)
    }
}

/// The complete UI state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    /// Active theme
    pub theme: Theme,
    /// Components in insertion order (render order)
    pub components: Vec<Component>,
    /// Timestamp of the most recently accepted command
    pub epoch_ms: u64,
    /// Reentrancy marker
    pub phase: Phase,
}

impl State {
    /// Create a state from explicit values
    pub fn new(theme: Theme, components: Vec<Component>, epoch_ms: u64, phase: Phase) -> Self {
        Self {
            theme,
            components,
            epoch_ms,
            phase,
        }
    }

    /// Validate a raw state document and build a state structurally equal to it
    pub fn validate_and_load(raw: &Value) -> Result<Self, SchemaError> {
        let obj = raw
            .as_object()
            .ok_or(SchemaError::NotAnObject { what: "state" })?;
        check_fields("state", obj, &STATE_FIELDS)?;

        let theme = obj
            .get("theme")
            .and_then(Value::as_str)
            .and_then(Theme::from_name)
            .ok_or(SchemaError::InvalidTheme)?;

        let epoch_ms = obj
            .get("epoch_ms")
            .and_then(Value::as_u64)
            .ok_or(SchemaError::InvalidEpoch)?;

        let phase = obj
            .get("phase")
            .and_then(Value::as_str)
            .and_then(Phase::from_name)
            .ok_or(SchemaError::InvalidPhase)?;

        let raw_components = obj
            .get("components")
            .and_then(Value::as_array)
            .ok_or(SchemaError::ComponentsNotList)?;
        let components = raw_components
            .iter()
            .enumerate()
            .map(|(index, comp)| {
                Component::from_value(comp).map_err(|source| SchemaError::Component {
                    index,
                    source: Box::new(source),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            theme,
            components,
            epoch_ms,
            phase,
        })
    }

    /// Serialize to a document with exactly the four top-level fields
    pub fn to_document(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            "theme".to_string(),
            Value::String(self.theme.as_str().to_string()),
        );
        map.insert(
            "components".to_string(),
            Value::Array(self.components.iter().map(Component::to_value).collect()),
        );
        map.insert("epoch_ms".to_string(), Value::from(self.epoch_ms));
        map.insert(
            "phase".to_string(),
            Value::String(self.phase.as_str().to_string()),
        );
        Value::Object(map)
    }

    /// Check whether the engine may start dispatching a command
    pub fn is_accepting(&self) -> bool {
        self.phase == Phase::Accepting
    }
}
