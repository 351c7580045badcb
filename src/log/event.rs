use chrono::NaiveDateTime;
use regex::Captures;

/// Timestamp layout used inside the bracketed `[2024.01.01 10:00:00]` token.
pub const TIMESTAMP_FORMAT: &str = "%Y.%m.%d %H:%M:%S";

/// Regex fragment matching the bracketed timestamp token (one capture group).
pub const TIMESTAMP_TOKEN: &str = r"\[(\d{4}\.\d{2}\.\d{2} \d{2}:\d{2}:\d{2})\]";

/// Parse the inner text of a timestamp token. `None` for impossible dates.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).ok()
}

/// Parse the timestamp held by capture group `idx`.
pub(crate) fn timestamp_at(caps: &Captures<'_>, idx: usize) -> Option<NaiveDateTime> {
    caps.get(idx).and_then(|m| parse_timestamp(m.as_str()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    Started,
    Ended,
    /// Contributes only a timestamp to the running min/max of its identifier.
    Touch,
}

/// A single typed observation extracted from one log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// `CR-100` style tag for promotion logs, table code for download logs.
    pub identifier: String,
    pub technology: String,
    pub phase: String,
    pub kind: EventKind,
    pub timestamp: NaiveDateTime,
    /// Duration reported on the line itself (`... in 1200ms`), if any.
    pub instant_duration_ms: Option<i64>,
    pub description: Option<String>,
}

/// A single-line "phase finished in Nms" statement. Has no reconciled start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub name: String,
    pub kind: String,
    pub description: String,
    pub phase: String,
    pub end: NaiveDateTime,
    pub duration_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_dotted_timestamps() {
        let ts = parse_timestamp("2024.01.01 10:05:00").unwrap();
        assert_eq!(ts.to_string(), "2024-01-01 10:05:00");
    }

    #[test]
    fn rejects_impossible_dates() {
        assert_eq!(parse_timestamp("2024.13.01 10:05:00"), None);
        assert_eq!(parse_timestamp("2024.02.30 10:05:00"), None);
        assert_eq!(parse_timestamp("2024.01.01 25:00:00"), None);
    }
}
