//! Meta-shell: turns a raw intent string into a `shell.intent` command

use kuhul_core::{op, Command, Source};

/// Pick the subshell an intent is addressed to
///
/// An explicit, non-empty hint always wins. Otherwise the trimmed intent is
/// classified by prefix, falling back to `kuhul`.
pub fn infer_subshell<'a>(intent: &str, hint: Option<&'a str>) -> &'a str {
    if let Some(hint) = hint.filter(|h| !h.is_empty()) {
        return hint;
    }
    let intent = intent.trim();
    if intent.starts_with("SELECT") {
        "sql"
    } else if intent.starts_with("document.") {
        "dom"
    } else if intent.starts_with("god ") {
        "quake"
    } else if intent == "ls" || intent.starts_with("ls ") {
        "bash"
    } else {
        "kuhul"
    }
}

/// Build the canonical command for `intent`
pub fn intent_command(
    id: impl Into<String>,
    ts_ms: u64,
    source: Source,
    intent: &str,
    hint: Option<&str>,
) -> Command {
    let shell = infer_subshell(intent, hint);
    Command::new(id, ts_ms, source, op::SHELL_INTENT)
        .with_arg("intent", intent)
        .with_arg("shell", shell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_prefix_rules() {
        assert_eq!(infer_subshell("SELECT * FROM t", None), "sql");
        assert_eq!(infer_subshell("document.body", None), "dom");
        assert_eq!(infer_subshell("god mode", None), "quake");
        assert_eq!(infer_subshell("ls", None), "bash");
        assert_eq!(infer_subshell("  ls -la  ", None), "bash");
        assert_eq!(infer_subshell("lsblk", None), "kuhul");
        assert_eq!(infer_subshell("select lower", None), "kuhul");
        assert_eq!(infer_subshell("build me a card", None), "kuhul");
    }

    #[test]
    fn test_hint_wins() {
        assert_eq!(infer_subshell("SELECT 1", Some("bash")), "bash");
        assert_eq!(infer_subshell("SELECT 1", Some("")), "sql");
    }

    #[test]
    fn test_intent_command() {
        let cmd = intent_command("cmd_1", 7, Source::cli("s"), "ls -la", None);
        assert_eq!(cmd.op, op::SHELL_INTENT);
        assert_eq!(cmd.args.get("intent"), Some(&Value::from("ls -la")));
        assert_eq!(cmd.args.get("shell"), Some(&Value::from("bash")));
    }
}
