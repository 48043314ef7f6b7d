//! Session settings loaded from an optional RON file
//!
//! ```ron
//! (
//!     session: "demo",
//!     out_dir: "output",
//!     quiet: false,
//!     sync: Data,
//!     resume: true,
//! )
//! ```
//!
//! Every field may be omitted. Command-line flags override file values.

use anyhow::{Context, Result};
use kuhul_journal::{JournalConfig, SyncPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SESSION: &str = "sess_local";
pub const DEFAULT_OUT_DIR: &str = "output";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Session id, used to name the log and SVG files
    pub session: String,
    pub out_dir: PathBuf,
    /// Suppress per-event printing
    pub quiet: bool,
    pub sync: SyncPolicy,
    /// Fold the existing event log onto the base state before applying
    pub resume: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session: DEFAULT_SESSION.to_string(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            quiet: false,
            sync: SyncPolicy::default(),
            resume: false,
        }
    }
}

impl Settings {
    /// Parse settings from a RON string
    pub fn from_ron(content: &str) -> Result<Self> {
        Ok(ron::from_str(content)?)
    }

    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        Self::from_ron(&content).with_context(|| format!("parsing settings {}", path.display()))
    }

    pub fn journal(&self) -> JournalConfig {
        JournalConfig::with_sync(self.sync)
    }

    /// `<out>/<session>.events.jsonl`
    pub fn events_path(&self) -> PathBuf {
        self.session_file("events.jsonl")
    }

    /// `<out>/<session>.commands.jsonl`
    pub fn commands_path(&self) -> PathBuf {
        self.session_file("commands.jsonl")
    }

    /// `<out>/<session>.svg`
    pub fn svg_path(&self) -> PathBuf {
        self.session_file("svg")
    }

    /// `<out>/<session>.replay.svg`
    pub fn replay_svg_path(&self) -> PathBuf {
        self.session_file("replay.svg")
    }

    fn session_file(&self, suffix: &str) -> PathBuf {
        self.out_dir.join(format!("{}.{}", self.session, suffix))
    }
}
