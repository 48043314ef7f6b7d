//! Recorded sessions round-trip through the file log

use kuhul_core::{
    op, topic, Command, ComponentType, Engine, EventBus, Phase, PropKey, SequentialIds, Source,
    State, Theme,
};
use kuhul_journal::{replay_file, Auditor, JournalConfig, RecordLog, Replayer, SyncPolicy};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

fn base() -> State {
    State::new(Theme::Light, Vec::new(), 0, Phase::Accepting)
}

fn open(path: &Path) -> RecordLog {
    RecordLog::open(path, JournalConfig::with_sync(SyncPolicy::Buffered)).unwrap()
}

fn create(id: &str, ts_ms: u64, kind: &str, text: &str) -> Command {
    Command::new(id, ts_ms, Source::cli("sess"), op::UI_CREATE)
        .with_arg("component", kind)
        .with_arg("props", json!({"text": text}))
}

#[test]
fn test_file_replay_matches_live_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sess.events.jsonl");
    let mut engine = Engine::new(EventBus::new(open(&path)), base(), SequentialIds::new());

    engine
        .apply_command(&create("c1", 100, "chat-bubble", "hello"))
        .unwrap();
    engine.state_snapshot("c1", 100).unwrap();
    let theme = Command::new("c2", 200, Source::cli("sess"), op::UI_THEME_APPLY)
        .with_arg("name", "dark");
    engine.apply_command(&theme).unwrap();
    engine.state_snapshot("c2", 200).unwrap();
    let stale = Command::new("c3", 150, Source::cli("sess"), op::SVG_EXPORT);
    assert!(!engine.apply_command(&stale).unwrap().is_accepted());

    let rebuilt = replay_file(&base(), &path).unwrap();
    assert_eq!(&rebuilt, engine.state());
    assert_eq!(rebuilt.components[0].kind, ComponentType::ChatBubble);
    assert_eq!(
        rebuilt.components[0].props.get(&PropKey::Text).map(String::as_str),
        Some("hello")
    );
    assert_eq!(rebuilt.theme, Theme::Dark);
    assert_eq!(rebuilt.epoch_ms, 200);
}

#[test]
fn test_resumed_session_keeps_folding() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sess.events.jsonl");

    {
        let mut first = Engine::new(EventBus::new(open(&path)), base(), SequentialIds::new());
        first.apply_command(&create("c1", 10, "button", "ok")).unwrap();
    }

    let resumed = replay_file(&base(), &path).unwrap();
    let mut second = Engine::new(
        EventBus::new(open(&path)),
        resumed,
        SequentialIds::starting_after(100),
    );
    second.apply_command(&create("c2", 20, "card", "two")).unwrap();

    let rebuilt = replay_file(&base(), &path).unwrap();
    assert_eq!(rebuilt.components.len(), 2);
    assert_eq!(&rebuilt, second.state());
}

#[test]
fn test_replayer_and_auditor_over_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sess.events.jsonl");
    let mut engine = Engine::new(EventBus::new(open(&path)), base(), SequentialIds::new());

    engine.apply_command(&create("c1", 10, "card", "a")).unwrap();
    engine.state_snapshot("c1", 10).unwrap();
    let intent = Command::new("c2", 20, Source::cli("sess"), op::SHELL_INTENT)
        .with_arg("intent", "ls -la")
        .with_arg("shell", "bash");
    engine.apply_command(&intent).unwrap();
    let bad = Command::new("c3", 30, Source::cli("sess"), op::UI_THEME_APPLY)
        .with_arg("name", "sepia");
    engine.apply_command(&bad).unwrap();

    let events = RecordLog::read_events(&path).unwrap();
    assert_eq!(events.len(), 4);

    let mut replayer = Replayer::new(&base(), &events);
    assert_eq!(replayer.replay_until(10), 2);
    assert_eq!(replayer.state().components.len(), 1);
    assert_eq!(replayer.finish(), *engine.state());

    let report = Auditor::new(&events).generate_report();
    assert_eq!(report.command_count, 3);
    assert_eq!(report.snapshot_count, 1);
    assert_eq!(report.by_topic.get(topic::SHELL_INTENT_RECEIVED), Some(&1));
    assert_eq!(report.rejections_by_reason.get("invalid_theme"), Some(&1));
}
