//! Text codec for the backing store.
//!
//! The file is a JSON array of flat objects with a fixed key order:
//!
//! ```text
//! [
//!   {"id":"...","name":"...","deadline":"2024-01-31","type":"TEST","priority":"HIGH","repetition":"NONE","notes":"","completed":false,"completedAt":null}
//! ]
//! ```
//!
//! Only this shape is supported. Decoding is a key scan over each object, not
//! a JSON parser, and the object split counts braces without regard to
//! quoting (see [`split_objects_naive`]).

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::classify::{Priority, Repetition, TaskType};
use crate::task::{local_now, Task};

/// Timestamp layout written for `completedAt`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Timestamp layout without seconds, as older files may carry.
const TIMESTAMP_FORMAT_MINUTES: &str = "%Y-%m-%dT%H:%M";

const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Encoding
// =============================================================================

/// Encode tasks as the backing-store text.
pub fn encode(tasks: &[Task]) -> String {
    encode_entries(tasks.iter().map(Some))
}

/// Encode a sequence that may contain empty slots. Empty slots are skipped.
pub fn encode_entries<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = Option<&'a Task>>,
{
    let mut objects = Vec::new();
    for (index, entry) in entries.into_iter().enumerate() {
        match entry {
            Some(task) => objects.push(encode_task(task)),
            None => tracing::warn!(index, "skipping empty task entry during encode"),
        }
    }

    if objects.is_empty() {
        return "[]".to_string();
    }

    let mut out = String::from("[\n");
    for (index, object) in objects.iter().enumerate() {
        if index > 0 {
            out.push_str(",\n");
        }
        out.push_str("  ");
        out.push_str(object);
    }
    out.push_str("\n]");
    out
}

/// Encode a single task object.
pub fn encode_task(task: &Task) -> String {
    let completed_at = match task.completed_at() {
        Some(at) => format!("\"{}\"", at.format(TIMESTAMP_FORMAT)),
        None => "null".to_string(),
    };

    format!(
        "{{\"id\":\"{}\",\"name\":\"{}\",\"deadline\":\"{}\",\"type\":\"{}\",\"priority\":\"{}\",\"repetition\":\"{}\",\"notes\":\"{}\",\"completed\":{},\"completedAt\":{}}}",
        escape(task.id()),
        escape(task.name()),
        task.deadline().format(DATE_FORMAT),
        task.task_type().name(),
        task.priority().name(),
        task.repetition().name(),
        escape(task.notes()),
        task.is_completed(),
        completed_at,
    )
}

/// Escape backslash, quote, newline, carriage return and tab.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// Inverse of [`escape`]. Unknown escapes are kept verbatim.
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

// =============================================================================
// Decoding
// =============================================================================

/// Why a record was left out of a decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingName,
    MissingDeadline,
    InvalidDeadline(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingName => f.write_str("missing name"),
            SkipReason::MissingDeadline => f.write_str("missing deadline"),
            SkipReason::InvalidDeadline(raw) => write!(f, "invalid deadline '{raw}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Position among the objects found by the split
    pub index: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct DecodeReport {
    pub tasks: Vec<Task>,
    pub skipped: Vec<SkippedRecord>,
}

/// Decode backing-store text. Malformed records are dropped and logged.
pub fn decode(text: &str) -> Vec<Task> {
    decode_report(text).tasks
}

/// Decode backing-store text, keeping track of dropped records.
pub fn decode_report(text: &str) -> DecodeReport {
    let mut report = DecodeReport::default();

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return report;
    }

    let body = trimmed.strip_prefix('[').unwrap_or(trimmed);
    let body = body.strip_suffix(']').unwrap_or(body);

    for (index, object) in split_objects_naive(body).into_iter().enumerate() {
        match decode_task(object) {
            Ok(task) => report.tasks.push(task),
            Err(reason) => {
                tracing::warn!(index, %reason, "dropping malformed task record");
                report.skipped.push(SkippedRecord { index, reason });
            }
        }
    }

    report
}

/// Split the array body into top-level object slices by counting braces.
///
/// Braces inside quoted strings are counted like any other brace. A value
/// with unbalanced braces therefore shifts the split and the affected records
/// (usually everything after it) are lost or dropped as malformed. Files
/// written by [`encode`] only hit this when a name, id or note carries an
/// unbalanced `{` or `}`.
pub fn split_objects_naive(body: &str) -> Vec<&str> {
    let mut objects = Vec::new();
    let mut depth: i64 = 0;
    let mut start = 0;

    for (i, ch) in body.char_indices() {
        match ch {
            '{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    objects.push(&body[start..=i]);
                }
            }
            _ => {}
        }
    }

    objects
}

/// Decode one object slice into a task.
///
/// The deadline must be exactly `YYYY-MM-DD`: zero-padded, with no
/// surrounding whitespace. Anything else drops the record.
pub fn decode_task(object: &str) -> Result<Task, SkipReason> {
    let id = extract_value(object, "id");
    let name = extract_value(object, "name");
    let deadline_raw = extract_value(object, "deadline");
    let type_raw = extract_value(object, "type");
    let priority_raw = extract_value(object, "priority");
    let repetition_raw = extract_value(object, "repetition");
    let notes = extract_value(object, "notes");
    let completed_raw = extract_value(object, "completed");
    let completed_at_raw = extract_value(object, "completedAt");

    if name.is_empty() {
        return Err(SkipReason::MissingName);
    }
    if deadline_raw.is_empty() {
        return Err(SkipReason::MissingDeadline);
    }
    let deadline = parse_deadline(&deadline_raw)
        .ok_or_else(|| SkipReason::InvalidDeadline(deadline_raw.clone()))?;

    let task_type = parse_or_default::<TaskType>("type", &type_raw);
    let priority = parse_or_default::<Priority>("priority", &priority_raw);
    let repetition = parse_or_default::<Repetition>("repetition", &repetition_raw);

    let mut task = Task::new(name, deadline, task_type, priority, repetition);
    if !id.is_empty() {
        task = task.with_id(id);
    }
    task.set_notes(notes);

    let completed = completed_raw == "true";
    let mut completed_at = parse_timestamp(&completed_at_raw);
    if completed && completed_at.is_none() {
        tracing::debug!(id = task.id(), "completed task has no timestamp; stamping load time");
        completed_at = Some(local_now());
    }
    task.restore_completion(completed, completed_at);

    Ok(task)
}

fn parse_deadline(raw: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()?;
    // chrono tolerates leading whitespace and unpadded fields.
    (date.format(DATE_FORMAT).to_string() == raw).then_some(date)
}

fn parse_or_default<T>(field: &str, raw: &str) -> T
where
    T: std::str::FromStr + Default,
{
    if raw.is_empty() {
        return T::default();
    }
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(field, value = raw, "unknown variant; using default");
        T::default()
    })
}

/// Parse a persisted `completedAt` value. `null`, empty or garbage yield `None`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if raw.is_empty() || raw == "null" {
        return None;
    }
    if let Ok(at) = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        return Some(at);
    }
    if let Ok(at) = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT_MINUTES) {
        return Some(at);
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.naive_local());
    }
    tracing::warn!(value = raw, "unparseable completedAt; ignoring");
    None
}

/// Pull the value for `key` out of a flat object slice.
///
/// Quoted values are unescaped; bare values (`true`, `null`, numbers) are
/// returned trimmed. A missing key or an unterminated string yields `""`.
pub fn extract_value(object: &str, key: &str) -> String {
    let needle = format!("\"{key}\":");
    let Some(found) = object.find(&needle) else {
        return String::new();
    };

    let rest = object[found + needle.len()..].trim_start();
    if rest.is_empty() {
        return String::new();
    }

    if let Some(quoted) = rest.strip_prefix('"') {
        let mut escaped = false;
        for (offset, ch) in quoted.char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match ch {
                '\\' => escaped = true,
                '"' => return unescape(&quoted[..offset]),
                _ => {}
            }
        }
        return String::new();
    }

    let end = rest.find([',', '}']).unwrap_or(rest.len());
    rest[..end].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn task(name: &str) -> Task {
        Task::new(
            name,
            date(2024, 1, 15),
            TaskType::Work,
            Priority::Medium,
            Repetition::None,
        )
    }

    #[test]
    fn empty_input_decodes_to_nothing() {
        assert!(decode("").is_empty());
        assert!(decode("   \n\t ").is_empty());
        assert!(decode("[]").is_empty());
        assert!(decode("[\n\n]").is_empty());
    }

    #[test]
    fn empty_sequence_encodes_to_brackets() {
        assert_eq!(encode(&[]), "[]");
        assert_eq!(encode_entries(vec![None, None]), "[]");
    }

    #[test]
    fn encode_layout_is_stable() {
        let mut t = Task::new(
            "Exam \"final\"",
            date(2024, 2, 29),
            TaskType::Test,
            Priority::High,
            Repetition::None,
        )
        .with_id("abc");
        t.set_notes("line1\nline2");

        let expected = "[\n  {\"id\":\"abc\",\"name\":\"Exam \\\"final\\\"\",\"deadline\":\"2024-02-29\",\"type\":\"TEST\",\"priority\":\"HIGH\",\"repetition\":\"NONE\",\"notes\":\"line1\\nline2\",\"completed\":false,\"completedAt\":null}\n]";
        assert_eq!(encode(&[t]), expected);
    }

    #[test]
    fn encode_skips_empty_entries() {
        let a = task("a").with_id("1");
        let b = task("b").with_id("2");
        let text = encode_entries(vec![Some(&a), None, Some(&b)]);
        assert_eq!(text, encode(&[a.clone(), b.clone()]));
        assert_eq!(decode(&text), vec![a, b]);
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let mut exam = Task::new(
            "Chem \\ \"midterm\"\ttab\r\nnext",
            date(2025, 12, 31),
            TaskType::Test,
            Priority::NotUsed,
            Repetition::Yearly,
        );
        exam.set_notes("bring calculator\\");
        exam.set_completed_at(true, date(2025, 1, 2).and_hms_nano_opt(8, 5, 3, 123_456_789).unwrap());

        let mut stale = task("un-completed");
        stale.set_completed_at(true, date(2024, 1, 1).and_hms_opt(12, 0, 0).unwrap());
        stale.set_completed(false);

        let plain = task("Ünïcødé → ok");

        let tasks = vec![exam, stale, plain];
        assert_eq!(decode(&encode(&tasks)), tasks);
    }

    #[test]
    fn missing_classifiers_fall_back_to_defaults() {
        let text = r#"[{"id":"x1","name":"Bare","deadline":"2024-05-05","notes":"","completed":false,"completedAt":null}]"#;
        let tasks = decode(text);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].task_type(), TaskType::Work);
        assert_eq!(tasks[0].priority(), Priority::Medium);
        assert_eq!(tasks[0].repetition(), Repetition::None);
        assert_eq!(tasks[0].id(), "x1");
    }

    #[test]
    fn unknown_classifiers_fall_back_to_defaults() {
        let text = r#"[{"name":"Odd","deadline":"2024-05-05","type":"CHORE","priority":"URGENT","repetition":"HOURLY"}]"#;
        let tasks = decode(text);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].task_type(), TaskType::Work);
        assert_eq!(tasks[0].priority(), Priority::Medium);
        assert_eq!(tasks[0].repetition(), Repetition::None);
        // No id in the record: a fresh one is generated.
        assert!(!tasks[0].id().is_empty());
    }

    #[test]
    fn malformed_records_are_isolated() {
        let text = r#"[
  {"id":"1","name":"Good one","deadline":"2024-01-01","type":"WORK","priority":"LOW","repetition":"NONE","notes":"","completed":false,"completedAt":null},
  {"id":"2","name":"Bad date","deadline":"2024-13-45","type":"WORK","priority":"LOW","repetition":"NONE","notes":"","completed":false,"completedAt":null},
  {"id":"3","name":"Good two","deadline":"2024-01-03","type":"WORK","priority":"LOW","repetition":"NONE","notes":"","completed":false,"completedAt":null}
]"#;
        let report = decode_report(text);
        let ids: Vec<_> = report.tasks.iter().map(|t| t.id().to_string()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(
            report.skipped,
            vec![SkippedRecord {
                index: 1,
                reason: SkipReason::InvalidDeadline("2024-13-45".to_string()),
            }]
        );
    }

    #[test]
    fn records_without_name_or_deadline_are_dropped() {
        let text = r#"[{"id":"1","name":"","deadline":"2024-01-01"},{"id":"2","deadline":"2024-01-01"},{"id":"3","name":"No date"}]"#;
        let report = decode_report(text);
        assert!(report.tasks.is_empty());
        let reasons: Vec<_> = report.skipped.into_iter().map(|s| s.reason).collect();
        assert_eq!(
            reasons,
            vec![
                SkipReason::MissingName,
                SkipReason::MissingName,
                SkipReason::MissingDeadline
            ]
        );
    }

    #[test]
    fn deadlines_must_be_strict_iso_dates() {
        for bad in [" 2024-01-01", "2024-01-01 ", "2024-1-1", "2024-01-1"] {
            let object = format!("{{\"name\":\"x\",\"deadline\":\"{bad}\"}}");
            assert_eq!(
                decode_task(&object),
                Err(SkipReason::InvalidDeadline(bad.to_string())),
                "accepted {bad:?}"
            );
        }
        let ok = decode_task(r#"{"name":"x","deadline":"2024-01-01"}"#).expect("valid record");
        assert_eq!(ok.deadline(), date(2024, 1, 1));
    }

    #[test]
    fn completed_requires_exact_true_token() {
        let text = r#"[{"name":"a","deadline":"2024-01-01","completed":TRUE},{"name":"b","deadline":"2024-01-01","completed": true ,"completedAt":"2024-01-01T10:00:00"}]"#;
        let tasks = decode(text);
        assert!(!tasks[0].is_completed());
        assert!(tasks[0].completed_at().is_none());
        assert!(tasks[1].is_completed());
        assert_eq!(
            tasks[1].completed_at(),
            Some(date(2024, 1, 1).and_hms_opt(10, 0, 0).unwrap())
        );
    }

    #[test]
    fn completed_without_timestamp_gets_stamped() {
        let text = r#"[{"name":"a","deadline":"2024-01-01","completed":true,"completedAt":null}]"#;
        let tasks = decode(text);
        assert!(tasks[0].is_completed());
        assert!(tasks[0].completed_at().is_some());
    }

    #[test]
    fn timestamps_without_seconds_are_accepted() {
        assert_eq!(
            parse_timestamp("2024-03-04T05:06"),
            Some(date(2024, 3, 4).and_hms_opt(5, 6, 0).unwrap())
        );
        assert!(parse_timestamp("null").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn extract_handles_whitespace_and_escapes() {
        let object = r#"{"name": "say \"hi\"", "completed" : true, "done": false}"#;
        assert_eq!(extract_value(object, "name"), "say \"hi\"");
        // The key must be followed directly by the colon.
        assert_eq!(extract_value(object, "completed"), "");
        assert_eq!(extract_value(object, "done"), "false");
        assert_eq!(extract_value(object, "missing"), "");
        assert_eq!(extract_value(r#"{"name":"open"#, "name"), "");
    }

    #[test]
    fn escaped_backslash_before_closing_quote() {
        let object = r#"{"name":"ends with \\","deadline":"2024-01-01"}"#;
        assert_eq!(extract_value(object, "name"), "ends with \\");
        assert_eq!(extract_value(object, "deadline"), "2024-01-01");
    }

    #[test]
    fn unescape_keeps_unknown_escapes() {
        assert_eq!(unescape(r#"a\u0041\q\"#), "a\\u0041\\q\\");
        assert_eq!(unescape(r#"\/\\n"#), "/\\n");
        assert_eq!(unescape(&escape("\\n")), "\\n");
    }

    // The split counts braces inside strings. These pin that behavior.

    #[test]
    fn balanced_braces_in_values_survive() {
        let a = task("{draft}").with_id("a");
        let b = task("plain").with_id("b");
        let tasks = vec![a, b];
        assert_eq!(decode(&encode(&tasks)), tasks);
    }

    #[test]
    fn unbalanced_open_brace_swallows_following_records() {
        let tasks = vec![task("a{b").with_id("a"), task("plain").with_id("b")];
        let report = decode_report(&encode(&tasks));
        assert!(report.tasks.is_empty());
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn unbalanced_close_brace_truncates_record() {
        let tasks = vec![task("x}y").with_id("a"), task("plain").with_id("b")];
        let report = decode_report(&encode(&tasks));
        assert!(report.tasks.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].reason, SkipReason::MissingName);
    }

    #[test]
    fn split_ignores_text_between_objects() {
        let objects = split_objects_naive(" {\"a\":1} , junk {\"b\":{\"c\":2}} ");
        assert_eq!(objects, vec!["{\"a\":1}", "{\"b\":{\"c\":2}}"]);
    }
}
