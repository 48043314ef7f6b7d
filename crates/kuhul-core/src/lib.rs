//! Kuhul Core - deterministic command/event engine for a declarative UI model
//!
//! This crate provides:
//! - The closed-schema UI state model (`State`, `Component`)
//! - Command and event envelopes with typed operations (`Command`, `Op`, `Event`)
//! - A persist-then-notify event bus (`EventBus`, `EventLog`)
//! - The single-writer `Engine` that validates, applies and records commands
//! - A pure `replay` fold that rebuilds state from a recorded event sequence
//!
//! # Example
//!
//! ```
//! use kuhul_core::{
//!     op, replay, Command, Engine, EventBus, MemoryLog, Phase, SequentialIds, Source, State,
//!     Theme,
//! };
//!
//! let base = State::new(Theme::Light, Vec::new(), 0, Phase::Accepting);
//! let mut engine = Engine::new(EventBus::new(MemoryLog::new()), base.clone(), SequentialIds::new());
//!
//! let cmd = Command::new("cmd_1", 100, Source::cli("demo"), op::UI_THEME_APPLY)
//!     .with_arg("name", "dark");
//! assert!(engine.apply_command(&cmd)?.is_accepted());
//!
//! let rebuilt = replay(&base, engine.bus().log().events());
//! assert_eq!(&rebuilt, engine.state());
//! # Ok::<(), kuhul_core::Error>(())
//! ```

mod bus;
mod command;
mod engine;
mod error;
mod event;
mod ids;
mod replay;
mod state;

pub use bus::{EventBus, EventLog, MemoryLog, Observer};
pub use command::{
    op, Command, Op, Outcome, Rejection, Source, COMMAND_TYPE, DEFAULT_EXPORT_HINT, VERSION,
};
pub use engine::Engine;
pub use error::{Error, ProtocolError, Result, SchemaError};
pub use event::{change, topic, Event, EVENT_TYPE};
pub use ids::{IdGenerator, IdKind, SequentialIds, UuidIds};
pub use replay::{apply_event, replay};
pub use state::{Component, ComponentType, Phase, PropKey, Props, State, Theme};
