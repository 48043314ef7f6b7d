//! Error types for kuhul-core
//!
//! Only structural faults are errors. Business-level rejections are not
//! represented here; they are recorded as `command.rejected` events.

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// A state document failed closed-schema validation on load
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A command envelope is malformed
    #[error("Protocol fault: {0}")]
    Protocol(#[from] ProtocolError),

    /// The event log refused an append
    #[error("Event log append failed: {0}")]
    Log(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an event log failure
    pub fn log(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Log(Box::new(err))
    }
}

/// Reasons a state or component document is refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{what} must be an object")]
    NotAnObject { what: &'static str },

    #[error("{what} has undeclared fields: {fields:?}")]
    UndeclaredFields {
        what: &'static str,
        fields: Vec<String>,
    },

    #[error("{what} is missing required fields: {fields:?}")]
    MissingFields {
        what: &'static str,
        fields: Vec<String>,
    },

    #[error("theme is invalid")]
    InvalidTheme,

    #[error("phase is invalid")]
    InvalidPhase,

    #[error("epoch_ms must be a non-negative integer")]
    InvalidEpoch,

    #[error("components must be a list")]
    ComponentsNotList,

    #[error("component {index}: {source}")]
    Component {
        index: usize,
        #[source]
        source: Box<SchemaError>,
    },

    #[error("component id must be a non-empty string")]
    InvalidComponentId,

    #[error("component type is invalid")]
    InvalidComponentType,

    #[error("component props have undeclared fields: {0:?}")]
    UndeclaredProps(Vec<String>),

    #[error("component prop {0} must be a string")]
    PropNotString(String),
}

/// Reasons a command envelope is refused before dispatch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("invalid command @type: {0:?}")]
    TypeTag(Option<String>),

    #[error("invalid command op")]
    Op,

    #[error("invalid command args")]
    Args,

    #[error("malformed command envelope: {0}")]
    Envelope(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
