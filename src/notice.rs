//! Purpose: Define a stable, structured schema for non-fatal stderr notices.
//! Exports: `Notice`, `notice_json`.
//! Role: Shared contract helper for CLI diagnostics such as skipped batch lines.
//! Invariants: Notices are non-fatal and never alter stdout payloads.
//! Invariants: JSON schema is additive-only; `line` is present only when known.
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: String,
    pub time: String,
    pub cmd: String,
    pub line: Option<u64>,
    pub message: String,
    pub details: Map<String, Value>,
}

pub fn notice_json(notice: &Notice) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(notice.kind));
    inner.insert("time".to_string(), json!(notice.time));
    inner.insert("cmd".to_string(), json!(notice.cmd));
    if let Some(line) = notice.line {
        inner.insert("line".to_string(), json!(line));
    }
    inner.insert("message".to_string(), json!(notice.message));
    inner.insert("details".to_string(), Value::Object(notice.details.clone()));

    let mut outer = Map::new();
    outer.insert("notice".to_string(), Value::Object(inner));
    Value::Object(outer)
}

#[cfg(test)]
mod tests {
    use super::{Notice, notice_json};
    use serde_json::{Map, Value};

    #[test]
    fn notice_json_has_required_fields() {
        let mut details = Map::new();
        details.insert("kind".to_string(), Value::from("NoDocumentNumberFound"));

        let notice = Notice {
            kind: "batch_skip".to_string(),
            time: "2026-02-01T00:00:00Z".to_string(),
            cmd: "batch".to_string(),
            line: Some(4),
            message: "skipped unreadable payload".to_string(),
            details,
        };

        let value = notice_json(&notice);
        let obj = value
            .get("notice")
            .and_then(|v| v.as_object())
            .expect("notice object");

        assert_eq!(obj.get("kind").and_then(|v| v.as_str()), Some("batch_skip"));
        assert_eq!(obj.get("cmd").and_then(|v| v.as_str()), Some("batch"));
        assert_eq!(obj.get("line").and_then(|v| v.as_u64()), Some(4));
        assert_eq!(
            obj.get("message").and_then(|v| v.as_str()),
            Some("skipped unreadable payload")
        );
        assert!(obj.get("details").and_then(|v| v.as_object()).is_some());
    }

    #[test]
    fn notice_json_omits_unknown_line() {
        let notice = Notice {
            kind: "batch_summary".to_string(),
            time: "unknown".to_string(),
            cmd: "batch".to_string(),
            line: None,
            message: "done".to_string(),
            details: Map::new(),
        };
        assert!(notice_json(&notice)["notice"].get("line").is_none());
    }
}
