//! Auditing and analytics for recorded event logs

use kuhul_core::{topic, Event};
use std::collections::{BTreeMap, BTreeSet};

/// Auditor for querying and analyzing a recorded event sequence
pub struct Auditor<'a> {
    events: &'a [Event],
}

impl<'a> Auditor<'a> {
    /// Create a new auditor over events in log order
    pub fn new(events: &'a [Event]) -> Self {
        Self { events }
    }

    /// Generate a summary report
    pub fn generate_report(&self) -> AuditReport {
        let mut by_topic: BTreeMap<String, u64> = BTreeMap::new();
        let mut rejections_by_reason: BTreeMap<String, u64> = BTreeMap::new();
        let mut changes_by_kind: BTreeMap<String, u64> = BTreeMap::new();
        let mut commands: BTreeSet<&str> = BTreeSet::new();

        for event in self.events {
            *by_topic.entry(event.topic.clone()).or_insert(0) += 1;

            if let Some(reason) = event.reason() {
                *rejections_by_reason.entry(reason.to_string()).or_insert(0) += 1;
            }
            if event.is(topic::STATE_CHANGED) {
                let kind = event.kind().unwrap_or("unknown");
                *changes_by_kind.entry(kind.to_string()).or_insert(0) += 1;
            }
            // Snapshots share the caused_by of the command they follow
            if !event.is(topic::STATE_SNAPSHOT) {
                commands.insert(&event.caused_by);
            }
        }

        AuditReport {
            total_events: self.events.len(),
            command_count: commands.len(),
            snapshot_count: self.count_topic(topic::STATE_SNAPSHOT),
            first_ts_ms: self.events.iter().map(|e| e.ts_ms).min(),
            last_ts_ms: self.events.iter().map(|e| e.ts_ms).max(),
            by_topic,
            changes_by_kind,
            rejections_by_reason,
        }
    }

    /// Query events matching the criteria
    pub fn query(&self, query: &AuditQuery) -> Vec<&'a Event> {
        self.events.iter().filter(|e| query.matches(e)).collect()
    }

    /// Every event produced by one command
    pub fn caused_by(&self, command_id: &str) -> Vec<&'a Event> {
        self.query(&AuditQuery::new().caused_by(command_id))
    }

    /// Every `command.rejected` event
    pub fn rejections(&self) -> Vec<&'a Event> {
        self.query(&AuditQuery::new().by_topic(topic::COMMAND_REJECTED))
    }

    /// Count events with a topic
    pub fn count_topic(&self, topic: &str) -> usize {
        self.events.iter().filter(|e| e.is(topic)).count()
    }
}

/// Summary of a recorded event sequence
#[derive(Debug, Clone, PartialEq)]
pub struct AuditReport {
    pub total_events: usize,
    /// Distinct commands that produced an outcome event
    pub command_count: usize,
    pub snapshot_count: usize,
    pub first_ts_ms: Option<u64>,
    pub last_ts_ms: Option<u64>,
    pub by_topic: BTreeMap<String, u64>,
    /// `state.changed` events grouped by `data.kind`
    pub changes_by_kind: BTreeMap<String, u64>,
    /// `command.rejected` events grouped by `data.reason`
    pub rejections_by_reason: BTreeMap<String, u64>,
}

impl AuditReport {
    pub fn rejection_count(&self) -> u64 {
        self.rejections_by_reason.values().sum()
    }
}

impl std::fmt::Display for AuditReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Audit Report ===")?;
        writeln!(f, "Total events: {}", self.total_events)?;
        writeln!(f, "Commands: {}", self.command_count)?;
        writeln!(f, "Snapshots: {}", self.snapshot_count)?;

        if let (Some(first), Some(last)) = (self.first_ts_ms, self.last_ts_ms) {
            writeln!(f, "Time range: {} - {}", first, last)?;
        }

        if !self.by_topic.is_empty() {
            writeln!(f, "\nEvents by topic:")?;
            let mut sorted: Vec<_> = self.by_topic.iter().collect();
            sorted.sort_by_key(|(_, count)| std::cmp::Reverse(**count));
            for (topic, count) in sorted {
                writeln!(f, "  {}: {}", topic, count)?;
            }
        }

        if !self.changes_by_kind.is_empty() {
            writeln!(f, "\nChanges by kind:")?;
            for (kind, count) in &self.changes_by_kind {
                writeln!(f, "  {}: {}", kind, count)?;
            }
        }

        if !self.rejections_by_reason.is_empty() {
            writeln!(f, "\nRejections by reason:")?;
            for (reason, count) in &self.rejections_by_reason {
                writeln!(f, "  {}: {}", reason, count)?;
            }
        }

        Ok(())
    }
}

/// Query criteria for filtering events
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    /// Start timestamp (inclusive)
    pub start_ms: Option<u64>,
    /// End timestamp (inclusive)
    pub end_ms: Option<u64>,
    pub topic: Option<String>,
    pub caused_by: Option<String>,
}

impl AuditQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by timestamp range
    pub fn in_range(mut self, start_ms: u64, end_ms: u64) -> Self {
        self.start_ms = Some(start_ms);
        self.end_ms = Some(end_ms);
        self
    }

    pub fn by_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn caused_by(mut self, command_id: impl Into<String>) -> Self {
        self.caused_by = Some(command_id.into());
        self
    }

    fn matches(&self, event: &Event) -> bool {
        if self.start_ms.is_some_and(|start| event.ts_ms < start) {
            return false;
        }
        if self.end_ms.is_some_and(|end| event.ts_ms > end) {
            return false;
        }
        if self.topic.as_deref().is_some_and(|t| !event.is(t)) {
            return false;
        }
        if self.caused_by.as_deref().is_some_and(|c| event.caused_by != c) {
            return false;
        }
        true
    }
}
