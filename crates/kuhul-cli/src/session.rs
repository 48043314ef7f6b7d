//! One CLI invocation against a session's logs

use crate::render::render_svg;
use crate::settings::Settings;
use crate::shell::intent_command;
use anyhow::{Context, Result};
use kuhul_core::{
    op, Command, ComponentType, Engine, EventBus, IdKind, Outcome, PropKey, State, Source, Theme,
    UuidIds,
};
use kuhul_journal::{replay_file, AuditReport, Auditor, RecordLog};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Read and validate a base state document
pub fn load_state(path: &Path) -> Result<State> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading state {}", path.display()))?;
    let raw: Value = serde_json::from_str(&content)
        .with_context(|| format!("parsing state {}", path.display()))?;
    let state = State::validate_and_load(&raw)
        .with_context(|| format!("invalid state document {}", path.display()))?;
    Ok(state)
}

/// Engine bound to the session's event log, plus the command log
pub struct Session {
    settings: Settings,
    engine: Engine<RecordLog, UuidIds>,
    commands: RecordLog,
}

impl Session {
    /// Open the session logs and bind an engine to `base`
    ///
    /// With `resume`, the existing event log is folded onto `base` first.
    pub fn open(settings: Settings, events_path: &Path, base: State) -> Result<Self> {
        let state = if settings.resume {
            let resumed = replay_file(&base, events_path)?;
            info!(
                path = %events_path.display(),
                epoch_ms = resumed.epoch_ms,
                components = resumed.components.len(),
                "session resumed"
            );
            resumed
        } else {
            base
        };

        let log = RecordLog::open(events_path, settings.journal())?;
        let commands = RecordLog::open(settings.commands_path(), settings.journal())?;

        let mut bus = EventBus::new(log);
        if !settings.quiet {
            bus.subscribe(|event| {
                println!("[{}] {} caused_by={}", event.topic, event.id, event.caused_by);
            });
        }

        Ok(Self {
            settings,
            engine: Engine::new(bus, state, UuidIds),
            commands,
        })
    }

    pub fn state(&self) -> &State {
        self.engine.state()
    }

    /// Submit a `ui.create` and redraw the session SVG
    pub fn create(
        &mut self,
        component: ComponentType,
        text: Option<&str>,
        ts_ms: u64,
    ) -> Result<Outcome> {
        let mut props = serde_json::Map::new();
        if let Some(text) = text {
            let key = match component {
                ComponentType::Card => PropKey::Label,
                _ => PropKey::Text,
            };
            props.insert(key.as_str().to_string(), Value::from(text));
        }
        let cmd = self
            .command(ts_ms, op::UI_CREATE)
            .with_arg("component", component.as_str())
            .with_arg("props", props);
        let outcome = self.submit(&cmd)?;
        self.write_svg(&self.settings.svg_path())?;
        Ok(outcome)
    }

    /// Submit a `ui.theme.apply` and redraw the session SVG
    pub fn theme(&mut self, theme: Theme, ts_ms: u64) -> Result<Outcome> {
        let cmd = self
            .command(ts_ms, op::UI_THEME_APPLY)
            .with_arg("name", theme.as_str());
        let outcome = self.submit(&cmd)?;
        self.write_svg(&self.settings.svg_path())?;
        Ok(outcome)
    }

    /// Submit an `svg.export` and write the SVG to `file` (default `<out>/<session>.svg`)
    pub fn export_svg(&mut self, file: Option<&Path>, ts_ms: u64) -> Result<(Outcome, PathBuf)> {
        let target = file.map_or_else(|| self.settings.svg_path(), Path::to_path_buf);
        let hint = target
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(Value::Null, Value::from);
        let cmd = self
            .command(ts_ms, op::SVG_EXPORT)
            .with_arg("hint", hint);
        let outcome = self.submit(&cmd)?;
        self.write_svg(&target)?;
        Ok((outcome, target))
    }

    /// Classify a raw intent and submit it as `shell.intent`
    pub fn intent(&mut self, intent: &str, shell: Option<&str>, ts_ms: u64) -> Result<Outcome> {
        let id = self.engine.next_id(IdKind::Command, ts_ms);
        let cmd = intent_command(id, ts_ms, self.source(), intent, shell);
        self.submit(&cmd)
    }

    fn command(&mut self, ts_ms: u64, op: &str) -> Command {
        let id = self.engine.next_id(IdKind::Command, ts_ms);
        Command::new(id, ts_ms, self.source(), op)
    }

    fn source(&self) -> Source {
        Source::cli(self.settings.session.as_str())
    }

    /// Record the command, apply it, then snapshot the resulting state
    fn submit(&mut self, cmd: &Command) -> Result<Outcome> {
        self.commands
            .append_record(cmd)
            .context("recording command")?;
        let outcome = self
            .engine
            .apply_command(cmd)
            .with_context(|| format!("applying {}", cmd.id))?;
        self.engine.state_snapshot(&cmd.id, cmd.ts_ms)?;

        match outcome.rejection() {
            Some(rejection) => {
                info!(cmd_id = %cmd.id, op = %cmd.op, reason = rejection.code(), "command rejected")
            }
            None => info!(cmd_id = %cmd.id, op = %cmd.op, "command accepted"),
        }
        Ok(outcome)
    }

    fn write_svg(&self, path: &Path) -> Result<()> {
        write_svg(path, self.engine.state())?;
        if !self.settings.quiet {
            println!("SVG written: {}", path.display());
        }
        Ok(())
    }
}

/// Fold an event log onto `base` and render the result
pub fn replay_to_svg(base: &State, events_path: &Path, svg_path: &Path) -> Result<State> {
    let state = replay_file(base, events_path)
        .with_context(|| format!("replaying {}", events_path.display()))?;
    write_svg(svg_path, &state)?;
    Ok(state)
}

/// Summarize an event log
pub fn audit(events_path: &Path) -> Result<AuditReport> {
    let events = RecordLog::read_events(events_path)?;
    Ok(Auditor::new(&events).generate_report())
}

fn write_svg(path: &Path, state: &State) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, render_svg(state)).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuhul_core::{topic, Event, Phase, Rejection};
    use serde_json::json;
    use tempfile::TempDir;

    fn settings(dir: &TempDir) -> Settings {
        Settings {
            out_dir: dir.path().join("out"),
            quiet: true,
            ..Settings::default()
        }
    }

    fn base() -> State {
        State::new(Theme::Light, Vec::new(), 0, Phase::Accepting)
    }

    fn open(settings: &Settings, base: State) -> Session {
        Session::open(settings.clone(), &settings.events_path(), base).unwrap()
    }

    #[test]
    fn test_load_state_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let doc = json!({"theme": "light", "components": [], "epoch_ms": 0, "phase": "accepting"});
        fs::write(&path, doc.to_string()).unwrap();
        assert_eq!(load_state(&path).unwrap(), base());

        fs::write(&path, r#"{"theme": "blue", "components": [], "epoch_ms": 0, "phase": "accepting"}"#)
            .unwrap();
        assert!(load_state(&path).is_err());
    }

    #[test]
    fn test_create_writes_logs_and_svg() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        let mut session = open(&settings, base());

        let outcome = session
            .create(ComponentType::Card, Some("Hello"), 100)
            .unwrap();
        assert!(outcome.is_accepted());
        let card = &session.state().components[0];
        assert_eq!(card.props.get(&PropKey::Label).map(String::as_str), Some("Hello"));

        let commands: Vec<Command> = RecordLog::read_all(settings.commands_path()).unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].op, op::UI_CREATE);
        assert!(commands[0].id.starts_with("cmd_100_"));

        let events = RecordLog::read_events(settings.events_path()).unwrap();
        let topics: Vec<_> = events.iter().map(|e| e.topic.as_str()).collect();
        assert_eq!(topics, vec![topic::STATE_CHANGED, topic::STATE_SNAPSHOT]);
        assert!(events.iter().all(|e| e.caused_by == commands[0].id));

        let svg = fs::read_to_string(settings.svg_path()).unwrap();
        assert!(svg.contains("Hello"));
    }

    #[test]
    fn test_text_prop_for_non_cards() {
        let dir = TempDir::new().unwrap();
        let mut session = open(&settings(&dir), base());
        session.create(ComponentType::ChatBubble, Some("hi"), 1).unwrap();
        session.create(ComponentType::Button, None, 2).unwrap();

        let components = &session.state().components;
        assert_eq!(components[0].props.get(&PropKey::Text).map(String::as_str), Some("hi"));
        assert!(components[1].props.is_empty());
    }

    #[test]
    fn test_rejection_still_snapshots() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        let mut session = open(&settings, base());
        session.theme(Theme::Dark, 50).unwrap();

        let outcome = session.theme(Theme::Light, 10).unwrap();
        assert_eq!(outcome.rejection(), Some(&Rejection::TimeRegression));
        assert_eq!(session.state().theme, Theme::Dark);

        let events = RecordLog::read_events(settings.events_path()).unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[2].reason(), Some("time_regression"));
        assert!(events[3].is(topic::STATE_SNAPSHOT));
    }

    #[test]
    fn test_export_svg_hint_and_file() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        let mut session = open(&settings, base());
        let target = dir.path().join("exports").join("poster.svg");

        let (outcome, written) = session.export_svg(Some(&target), 5).unwrap();
        assert!(outcome.is_accepted());
        assert_eq!(written, target);
        assert!(target.exists());

        let events = RecordLog::read_events(settings.events_path()).unwrap();
        assert!(events[0].is(topic::SVG_EXPORT_REQUESTED));
        assert_eq!(events[0].data.get("hint"), Some(&Value::from("poster.svg")));
    }

    #[test]
    fn test_intent_is_classified() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        let mut session = open(&settings, base());
        session.intent("SELECT * FROM ui", None, 9).unwrap();

        let events: Vec<Event> = RecordLog::read_events(settings.events_path()).unwrap();
        assert!(events[0].is(topic::SHELL_INTENT_RECEIVED));
        assert_eq!(events[0].data.get("shell"), Some(&Value::from("sql")));
        assert!(!settings.svg_path().exists());
    }

    #[test]
    fn test_resume_builds_on_previous_runs() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        open(&settings, base())
            .create(ComponentType::Button, Some("one"), 10)
            .unwrap();

        let resumed = Settings {
            resume: true,
            ..settings.clone()
        };
        let mut session = open(&resumed, base());
        assert_eq!(session.state().components.len(), 1);
        assert_eq!(session.state().epoch_ms, 10);

        let stale = session.create(ComponentType::Card, None, 5).unwrap();
        assert!(!stale.is_accepted());
        session.create(ComponentType::Card, None, 20).unwrap();
        assert_eq!(session.state().components.len(), 2);
    }

    #[test]
    fn test_replay_and_audit() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        let mut session = open(&settings, base());
        session.create(ComponentType::ChatBubble, Some("hey"), 1).unwrap();
        session.theme(Theme::Dark, 2).unwrap();
        let live = session.state().clone();

        let replay_svg = settings.replay_svg_path();
        let rebuilt = replay_to_svg(&base(), &settings.events_path(), &replay_svg).unwrap();
        assert_eq!(rebuilt, live);
        assert_eq!(
            fs::read_to_string(&replay_svg).unwrap(),
            fs::read_to_string(settings.svg_path()).unwrap()
        );

        let report = audit(&settings.events_path()).unwrap();
        assert_eq!(report.total_events, 4);
        assert_eq!(report.command_count, 2);
        assert_eq!(report.snapshot_count, 2);
    }
}
