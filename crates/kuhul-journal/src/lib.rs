//! Kuhul Journal - durable event logs, replay and auditing
//!
//! This crate builds on `kuhul-core`'s `EventLog` seam to provide:
//!
//! - **RecordLog**: append-only JSONL files for commands and events
//! - **Replayer**: step through a recorded session with fine-grained control
//! - **Auditor**: query and summarize what a session did
//!
//! # Example
//!
//! ```rust,no_run
//! use kuhul_core::{op, Command, Engine, EventBus, Phase, Source, State, Theme, UuidIds};
//! use kuhul_journal::{replay_file, Auditor, JournalConfig, RecordLog};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let base = State::new(Theme::Light, Vec::new(), 0, Phase::Accepting);
//! let log = RecordLog::open("output/demo.events.jsonl", JournalConfig::default())?;
//! let mut engine = Engine::new(EventBus::new(log), base.clone(), UuidIds);
//!
//! let cmd = Command::new("cmd_1", 100, Source::cli("demo"), op::UI_THEME_APPLY)
//!     .with_arg("name", "dark");
//! engine.apply_command(&cmd)?;
//!
//! let rebuilt = replay_file(&base, "output/demo.events.jsonl")?;
//! assert_eq!(&rebuilt, engine.state());
//!
//! let events = RecordLog::read_events("output/demo.events.jsonl")?;
//! println!("{}", Auditor::new(&events).generate_report());
//! # Ok(())
//! # }
//! ```

mod auditor;
mod config;
mod error;
mod log;
mod replayer;

pub use auditor::{AuditQuery, AuditReport, Auditor};
pub use config::{JournalConfig, SyncPolicy};
pub use error::{Error, Result};
pub use log::RecordLog;
pub use replayer::{replay_file, ReplayState, Replayer};
