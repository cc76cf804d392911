//! Embedded snapshot comment
//!
//! Every exported file ends with an HTML comment carrying a JSON copy of the
//! headers and rows, so the importer can rebuild the document without
//! re-parsing the table:
//!
//! ```text
//! <!-- SPECS_SNAPSHOT v2 {"headers":{"left":"..","right":".."},"rows":[..],"version":2} -->
//! ```
//!
//! Version 1 files only know key/value rows (`{"key":..,"value":..}` without a
//! `type`); version 2 adds `section` and `cat` rows.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::config::constants::{
    DEFAULT_HEADER_LEFT, DEFAULT_HEADER_RIGHT, SNAPSHOT_MARKER, SNAPSHOT_VERSION,
};
use crate::document::{DocumentSnapshot, Row};
use crate::utils::static_regex;

#[derive(Serialize)]
struct SnapshotHeaders<'a> {
    left: &'a str,
    right: &'a str,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum SnapshotRow<'a> {
    #[serde(rename = "section")]
    Section { title: &'a str },
    #[serde(rename = "cat")]
    Category { title: &'a str },
    #[serde(rename = "kv")]
    Entry { key: &'a str, value: &'a str },
}

#[derive(Serialize)]
struct SnapshotPayload<'a> {
    headers: SnapshotHeaders<'a>,
    rows: Vec<SnapshotRow<'a>>,
    version: u32,
}

fn snapshot_regex() -> &'static Regex {
    static SNAPSHOT_RE: OnceLock<Regex> = OnceLock::new();
    SNAPSHOT_RE.get_or_init(|| {
        let pattern = format!(
            r"(?s)<!--\s*{}\s+v(\d+)\s+(\{{.*?\}})\s*-->",
            regex::escape(SNAPSHOT_MARKER)
        );
        static_regex(&pattern)
    })
}

/// Renders the snapshot comment for an already-emitted set of rows
///
/// `--` is written as `-\u002d` inside the JSON, which decodes back to the
/// same text but cannot terminate the comment early.
pub fn encode_snapshot(header_left: &str, header_right: &str, rows: &[Row]) -> String {
    let payload = SnapshotPayload {
        headers: SnapshotHeaders {
            left: header_left,
            right: header_right,
        },
        rows: rows
            .iter()
            .map(|row| match row {
                Row::Section { title } => SnapshotRow::Section { title },
                Row::Category { title } => SnapshotRow::Category { title },
                Row::Entry { key, value } => SnapshotRow::Entry { key, value },
            })
            .collect(),
        version: SNAPSHOT_VERSION,
    };

    let json = match serde_json::to_string(&payload) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!("快照序列化失败: {}", e);
            return String::new();
        }
    };

    format!(
        "<!-- {} v{} {} -->",
        SNAPSHOT_MARKER,
        SNAPSHOT_VERSION,
        json.replace("--", "-\\u002d")
    )
}

/// Locates the last snapshot comment in `text` and decodes it
///
/// Returns `None` when no marker is present, its JSON is unreadable or it
/// carries no `rows` array; the caller then falls back to parsing the table
/// itself. Individual malformed
/// rows are dropped, the rest survive.
pub fn decode_snapshot(text: &str) -> Option<DocumentSnapshot> {
    let captures = snapshot_regex().captures_iter(text).last()?;
    let version: u32 = captures.get(1)?.as_str().parse().ok()?;
    let json = captures.get(2)?.as_str();

    let payload: Value = match serde_json::from_str(json) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("快照 JSON 无法解析，改用表格解析: {}", e);
            return None;
        }
    };

    let headers = payload.get("headers");
    let header = |side: &str, default: &str| {
        headers
            .and_then(|headers| headers.get(side))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or(default)
            .to_string()
    };

    let rows: Vec<Row> = match payload.get("rows").and_then(Value::as_array) {
        Some(rows) => rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let decoded = decode_row(row, version);
                if decoded.is_none() {
                    tracing::warn!("丢弃无法识别的快照行 #{}: {}", index, row);
                }
                decoded
            })
            .collect(),
        None => {
            tracing::warn!("快照中没有 rows 数组，改用表格解析");
            return None;
        }
    };

    tracing::debug!("从 v{} 快照恢复 {} 行", version, rows.len());

    Some(DocumentSnapshot {
        header_left: header("left", DEFAULT_HEADER_LEFT),
        header_right: header("right", DEFAULT_HEADER_RIGHT),
        rows,
    })
}

fn decode_row(row: &Value, version: u32) -> Option<Row> {
    let field = |name: &str| row.get(name).and_then(Value::as_str);

    match row.get("type").and_then(Value::as_str) {
        Some("section") => field("title").map(Row::section),
        Some("cat") | Some("category") => field("title").map(Row::category),
        Some("kv") | Some("entry") => decode_entry(row),
        None if version <= 1 => decode_entry(row),
        // Unknown row kinds from a newer writer
        _ => None,
    }
}

fn decode_entry(row: &Value) -> Option<Row> {
    let key = row.get("key").and_then(Value::as_str)?;
    let value = row.get("value").and_then(Value::as_str).unwrap_or_default();
    Some(Row::entry(key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_uses_marker_and_version() {
        let comment = encode_snapshot("Kategorie", "Details", &[Row::section("Sensor")]);
        assert!(comment.starts_with("<!-- SPECS_SNAPSHOT v2 {"));
        assert!(comment.ends_with("} -->"));
        assert!(comment.contains(r#"{"type":"section","title":"Sensor"}"#));
        assert!(comment.contains(r#""version":2"#));
    }

    #[test]
    fn test_double_dash_cannot_close_comment() {
        let rows = vec![Row::entry("Blende", "f/2.8 -- f/22 -->")];
        let comment = encode_snapshot("A", "B", &rows);
        let body = &comment[4..comment.len() - 3];
        assert!(!body.contains("--"));

        let decoded = decode_snapshot(&comment).unwrap();
        assert_eq!(decoded.rows, rows);
    }

    #[test]
    fn test_decode_takes_last_marker() {
        let first = encode_snapshot("A", "B", &[Row::entry("alt", "1")]);
        let second = encode_snapshot("C", "D", &[Row::entry("neu", "2")]);
        let decoded = decode_snapshot(&format!("{first}\n<table></table>\n{second}")).unwrap();
        assert_eq!(decoded.header_left, "C");
        assert_eq!(decoded.rows, vec![Row::entry("neu", "2")]);
    }

    #[test]
    fn test_decode_version_one_rows() {
        let text = r#"<!-- SPECS_SNAPSHOT v1 {"headers":{"left":"Merkmal","right":"Wert"},"rows":[{"key":"Gewicht","value":"650 g"},{"key":"Akku"}]} -->"#;
        let decoded = decode_snapshot(text).unwrap();
        assert_eq!(decoded.header_left, "Merkmal");
        assert_eq!(
            decoded.rows,
            vec![Row::entry("Gewicht", "650 g"), Row::entry("Akku", "")]
        );
    }

    #[test]
    fn test_decode_drops_bad_rows_only() {
        let text = r#"<!-- SPECS_SNAPSHOT v2 {"headers":{"left":"","right":"Wert"},"rows":[{"type":"section","title":"Video"},{"type":"kv"},{"type":"bogus","title":"x"},42,{"type":"cat","title":"Formate"}],"version":2} -->"#;
        let decoded = decode_snapshot(text).unwrap();
        assert_eq!(decoded.header_left, "Kategorie");
        assert_eq!(decoded.header_right, "Wert");
        assert_eq!(
            decoded.rows,
            vec![Row::section("Video"), Row::category("Formate")]
        );
    }

    #[test]
    fn test_missing_or_broken_marker_returns_none() {
        assert!(decode_snapshot("<table class=\"specs\"></table>").is_none());
        assert!(decode_snapshot("<!-- SPECS_SNAPSHOT v2 {not json} -->").is_none());
    }

    #[test]
    fn test_payload_without_rows_array_returns_none() {
        let without_rows = r#"<!-- SPECS_SNAPSHOT v2 {"headers":{"left":"A","right":"B"},"version":2} -->"#;
        assert!(decode_snapshot(without_rows).is_none());

        let rows_not_array = r#"<!-- SPECS_SNAPSHOT v2 {"headers":{},"rows":{"type":"kv"},"version":2} -->"#;
        assert!(decode_snapshot(rows_not_array).is_none());

        let empty_rows = r#"<!-- SPECS_SNAPSHOT v2 {"headers":{},"rows":[],"version":2} -->"#;
        assert_eq!(decode_snapshot(empty_rows).map(|snapshot| snapshot.rows), Some(Vec::new()));
    }
}
