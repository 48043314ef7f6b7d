//! Commands submitted to the engine and the typed operations they carry
//!
//! A [`Command`] is the wire envelope. Its free-form `args` are turned into a
//! typed [`Op`] at the dispatch boundary; anything that does not fit becomes a
//! [`Rejection`] with a machine-readable reason code.

use crate::error::ProtocolError;
use crate::state::{parse_props, ComponentType, Phase, Props, PropsFault, Theme};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire type tag for commands
pub const COMMAND_TYPE: &str = "kuhul.command";
/// Envelope version shared by commands and events
pub const VERSION: &str = "1.0.0";

/// Default export file hint when `svg.export` carries none
pub const DEFAULT_EXPORT_HINT: &str = "state.svg";

/// Operation names understood by the engine
pub mod op {
    pub const UI_CREATE: &str = "ui.create";
    pub const UI_THEME_APPLY: &str = "ui.theme.apply";
    pub const SVG_EXPORT: &str = "svg.export";
    pub const SHELL_INTENT: &str = "shell.intent";
}

/// Who submitted a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub kind: String,
    pub who: String,
    pub session: String,
}

impl Source {
    pub fn new(
        kind: impl Into<String>,
        who: impl Into<String>,
        session: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            who: who.into(),
            session: session.into(),
        }
    }

    /// Local command-line source for a session
    pub fn cli(session: impl Into<String>) -> Self {
        Self::new("cli", "local", session)
    }
}

/// An intent to change state. Immutable once built; never retried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "@type")]
    pub type_tag: String,
    #[serde(rename = "@v")]
    pub version: String,
    pub id: String,
    pub ts_ms: u64,
    pub source: Source,
    pub op: String,
    pub args: Map<String, Value>,
}

impl Command {
    /// Create a command with empty args
    pub fn new(id: impl Into<String>, ts_ms: u64, source: Source, op: impl Into<String>) -> Self {
        Self {
            type_tag: COMMAND_TYPE.to_string(),
            version: VERSION.to_string(),
            id: id.into(),
            ts_ms,
            source,
            op: op.into(),
            args: Map::new(),
        }
    }

    /// Add an argument
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// Parse a raw envelope, failing loudly on structural faults
    pub fn from_value(raw: &Value) -> Result<Self, ProtocolError> {
        let obj = raw
            .as_object()
            .ok_or_else(|| ProtocolError::Envelope("command must be an object".to_string()))?;
        match obj.get("@type").and_then(Value::as_str) {
            Some(COMMAND_TYPE) => {}
            other => return Err(ProtocolError::TypeTag(other.map(str::to_string))),
        }
        if !obj.get("op").is_some_and(Value::is_string) {
            return Err(ProtocolError::Op);
        }
        if !obj.get("args").is_some_and(Value::is_object) {
            return Err(ProtocolError::Args);
        }
        Command::deserialize(raw).map_err(|e| ProtocolError::Envelope(e.to_string()))
    }

    /// Check the envelope invariants a typed value can still violate
    pub fn check_envelope(&self) -> Result<(), ProtocolError> {
        if self.type_tag != COMMAND_TYPE {
            return Err(ProtocolError::TypeTag(Some(self.type_tag.clone())));
        }
        Ok(())
    }
}

/// A typed operation, validated from a command's `op` and `args`
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    UiCreate {
        component: ComponentType,
        props: Props,
    },
    ThemeApply {
        name: Theme,
    },
    /// `hint` is carried through as given; only a missing hint is defaulted
    SvgExport {
        hint: Value,
    },
    ShellIntent {
        intent: String,
        shell: String,
    },
}

impl Op {
    /// Validate `args` for `op`, returning the first rejection found
    pub fn parse(name: &str, args: &Map<String, Value>) -> Result<Self, Rejection> {
        match name {
            op::UI_CREATE => Self::parse_create(args),
            op::UI_THEME_APPLY => args
                .get("name")
                .and_then(Value::as_str)
                .and_then(Theme::from_name)
                .map(|name| Op::ThemeApply { name })
                .ok_or(Rejection::InvalidTheme),
            op::SVG_EXPORT => {
                let hint = args
                    .get("hint")
                    .cloned()
                    .unwrap_or_else(|| Value::from(DEFAULT_EXPORT_HINT));
                Ok(Op::SvgExport { hint })
            }
            op::SHELL_INTENT => {
                let intent = non_blank(args, "intent").ok_or(Rejection::MissingIntent)?;
                let shell = non_blank(args, "shell").ok_or(Rejection::MissingShell)?;
                Ok(Op::ShellIntent { intent, shell })
            }
            other => Err(Rejection::UnknownOp {
                op: other.to_string(),
            }),
        }
    }

    fn parse_create(args: &Map<String, Value>) -> Result<Self, Rejection> {
        let component = args
            .get("component")
            .and_then(Value::as_str)
            .and_then(ComponentType::from_name)
            .ok_or(Rejection::InvalidComponent)?;

        let props = match args.get("props") {
            None | Some(Value::Null) => Props::new(),
            Some(Value::Object(raw)) => parse_props(raw).map_err(|fault| match fault {
                PropsFault::Undeclared(keys) => Rejection::PropsUndeclared { keys },
                PropsFault::NotString(key) => Rejection::PropValueNotString { key },
            })?,
            Some(_) => return Err(Rejection::PropsNotObject),
        };

        Ok(Op::UiCreate { component, props })
    }

    /// The wire name of this operation
    pub fn name(&self) -> &'static str {
        match self {
            Op::UiCreate { .. } => op::UI_CREATE,
            Op::ThemeApply { .. } => op::UI_THEME_APPLY,
            Op::SvgExport { .. } => op::SVG_EXPORT,
            Op::ShellIntent { .. } => op::SHELL_INTENT,
        }
    }
}

fn non_blank(args: &Map<String, Value>, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Why a structurally valid command was not applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    TimeRegression,
    PhaseNotAccepting { phase: Phase },
    UnknownOp { op: String },
    InvalidComponent,
    PropsNotObject,
    PropsUndeclared { keys: Vec<String> },
    PropValueNotString { key: String },
    InvalidTheme,
    MissingIntent,
    MissingShell,
}

impl Rejection {
    /// Machine-readable reason code
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::TimeRegression => "time_regression",
            Rejection::PhaseNotAccepting { .. } => "phase_not_accepting",
            Rejection::UnknownOp { .. } => "unknown_op",
            Rejection::InvalidComponent => "invalid_component",
            Rejection::PropsNotObject => "props_not_object",
            Rejection::PropsUndeclared { .. } => "props_undeclared",
            Rejection::PropValueNotString { .. } => "prop_value_not_string",
            Rejection::InvalidTheme => "invalid_theme",
            Rejection::MissingIntent => "missing_intent",
            Rejection::MissingShell => "missing_shell",
        }
    }

    /// Event payload: `{reason, ..context}`
    pub fn to_data(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("reason".to_string(), Value::from(self.code()));
        match self {
            Rejection::PhaseNotAccepting { phase } => {
                data.insert("phase".to_string(), Value::from(phase.as_str()));
            }
            Rejection::UnknownOp { op } => {
                data.insert("op".to_string(), Value::from(op.as_str()));
            }
            Rejection::PropsUndeclared { keys } => {
                data.insert("keys".to_string(), Value::from(keys.clone()));
            }
            Rejection::PropValueNotString { key } => {
                data.insert("key".to_string(), Value::from(key.as_str()));
            }
            _ => {}
        }
        data
    }
}

/// Result of processing one structurally valid command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Rejected(r) => Some(r),
            Outcome::Accepted => None,
        }
    }
}
