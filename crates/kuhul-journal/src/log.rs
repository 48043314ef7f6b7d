//! Append-only newline-delimited JSON record log
//!
//! One JSON document per line, written in append mode. Read-back returns the
//! records in write order. A log file has exactly one writer; concurrent
//! appenders on the same path are not supported and must be prevented by the
//! deployment.

use crate::config::{JournalConfig, SyncPolicy};
use crate::{Error, Result};
use kuhul_core::{Event, EventLog};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writer for a single JSONL log file
#[derive(Debug)]
pub struct RecordLog {
    path: PathBuf,
    file: File,
    config: JournalConfig,
    appended: u64,
}

impl RecordLog {
    /// Open `path` for appending, creating it and its parent directories
    pub fn open(path: impl AsRef<Path>, config: JournalConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), sync = ?config.sync, "record log opened");
        Ok(Self {
            path,
            file,
            config,
            appended: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &JournalConfig {
        &self.config
    }

    /// Records appended through this handle
    pub fn appended(&self) -> u64 {
        self.appended
    }

    /// Append one record, applying the sync policy before returning
    pub fn append_record<T: Serialize>(&mut self, record: &T) -> Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        self.file.write_all(&line).map_err(|source| self.io_error(source))?;
        let synced = match self.config.sync {
            SyncPolicy::Buffered => Ok(()),
            SyncPolicy::Data => self.file.sync_data(),
            SyncPolicy::All => self.file.sync_all(),
        };
        synced.map_err(|source| self.io_error(source))?;
        self.appended += 1;
        debug!(path = %self.path.display(), bytes = line.len(), "record appended");
        Ok(())
    }

    /// Read every record in write order
    ///
    /// A missing file reads as empty. Blank lines are skipped.
    pub fn read_all<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(Error::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|source| Error::Malformed {
                path: path.to_path_buf(),
                line: index + 1,
                source,
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Read every event in write order
    pub fn read_events(path: impl AsRef<Path>) -> Result<Vec<Event>> {
        Self::read_all(path)
    }

    fn io_error(&self, source: io::Error) -> Error {
        Error::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl EventLog for RecordLog {
    fn append(&mut self, event: &Event) -> kuhul_core::Result<()> {
        self.append_record(event).map_err(kuhul_core::Error::log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuhul_core::{topic, Command, Source};
    use serde_json::Map;
    use tempfile::TempDir;

    fn event(id: &str, ts_ms: u64) -> Event {
        Event::new(id, ts_ms, "cmd_1", topic::SVG_EXPORT_REQUESTED, Map::new())
            .with_data("hint", "a.svg")
    }

    #[test]
    fn test_append_and_read_back_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("s.events.jsonl");
        let mut log = RecordLog::open(&path, JournalConfig::default()).unwrap();

        for i in 0..3 {
            log.append_record(&event(&format!("evt_{i}"), i)).unwrap();
        }
        assert_eq!(log.appended(), 3);

        let events = RecordLog::read_events(&path).unwrap();
        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["evt_0", "evt_1", "evt_2"]);
        assert_eq!(events[1], event("evt_1", 1));
    }

    #[test]
    fn test_one_record_per_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.jsonl");
        let mut log = RecordLog::open(&path, JournalConfig::with_sync(SyncPolicy::Buffered)).unwrap();
        log.append_record(&event("a", 1)).unwrap();
        log.append_record(&event("b", 2)).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_reopen_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.jsonl");
        RecordLog::open(&path, JournalConfig::default())
            .unwrap()
            .append_record(&event("a", 1))
            .unwrap();
        RecordLog::open(&path, JournalConfig::with_sync(SyncPolicy::All))
            .unwrap()
            .append_record(&event("b", 2))
            .unwrap();

        assert_eq!(RecordLog::read_events(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let events = RecordLog::read_events(dir.path().join("absent.jsonl")).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_malformed_line_reports_position() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.jsonl");
        let good = serde_json::to_string(&event("a", 1)).unwrap();
        fs::write(&path, format!("{good}\n\n{{not json\n")).unwrap();

        let err = RecordLog::read_events(&path).unwrap_err();
        assert!(matches!(err, Error::Malformed { line: 3, .. }));
    }

    #[test]
    fn test_commands_share_the_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("s.commands.jsonl");
        let cmd = Command::new("cmd_1", 5, Source::cli("s"), "svg.export");
        let mut log = RecordLog::open(&path, JournalConfig::default()).unwrap();
        log.append_record(&cmd).unwrap();

        let back: Vec<Command> = RecordLog::read_all(&path).unwrap();
        assert_eq!(back, vec![cmd]);
    }

    #[test]
    fn test_event_log_impl() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.jsonl");
        let mut log = RecordLog::open(&path, JournalConfig::default()).unwrap();
        EventLog::append(&mut log, &event("a", 1)).unwrap();
        assert_eq!(RecordLog::read_events(&path).unwrap().len(), 1);
    }
}
