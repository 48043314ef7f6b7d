//! Identifier generation for commands, events and components
//!
//! Consumers rely on uniqueness only. Ordering across calls is monotone for
//! readability of logs, nothing more.

use std::fmt;
use uuid::Uuid;

/// What an identifier is minted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Command,
    Event,
    Component,
}

impl IdKind {
    /// Short prefix used in rendered identifiers
    pub fn prefix(&self) -> &'static str {
        match self {
            IdKind::Command => "cmd",
            IdKind::Event => "evt",
            IdKind::Component => "cmp",
        }
    }
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Source of unique identifiers
///
/// Implementations must never return the same value twice within a process
/// lifetime, regardless of `kind` or `ts_ms`.
pub trait IdGenerator {
    fn next_id(&mut self, kind: IdKind, ts_ms: u64) -> String;
}

/// Deterministic generator backed by a single counter shared by all kinds
///
/// Renders `<prefix>_<ts_ms>_<counter>`. Two generators created the same way
/// produce the same sequence, which keeps tests and fixtures stable.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    counter: u64,
}

impl SequentialIds {
    /// Create a generator starting at 1
    pub fn new() -> Self {
        Self { counter: 0 }
    }

    /// Create a generator whose first identifier uses `start + 1`
    pub fn starting_after(start: u64) -> Self {
        Self { counter: start }
    }

    /// Number of identifiers handed out so far (plus the starting offset)
    pub fn issued(&self) -> u64 {
        self.counter
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, kind: IdKind, ts_ms: u64) -> String {
        self.counter += 1;
        format!("{}_{}_{:06}", kind.prefix(), ts_ms, self.counter)
    }
}

/// Generator that stays unique across process runs
///
/// Renders `<prefix>_<ts_ms>_<uuid v7>`. UUID v7 is time-ordered, so ids from
/// one process still sort in mint order.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self, kind: IdKind, ts_ms: u64) -> String {
        format!("{}_{}_{}", kind.prefix(), ts_ms, Uuid::now_v7().simple())
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for &mut G {
    fn next_id(&mut self, kind: IdKind, ts_ms: u64) -> String {
        (**self).next_id(kind, ts_ms)
    }
}
