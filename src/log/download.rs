//! Grammar for the table-download log.
//!
//! Every matched line is a "touch" of a table code: it only widens that table's
//! first/last timestamp. Two line shapes name a table:
//! [2024.01.01 10:00:00] copy ftp://host/LIB/T1 to D:/downloads/T1
//! [2024.01.01 10:00:02] [echo] Downloaded ftp file T1

use chrono::NaiveDateTime;
use regex::Regex;

use crate::Result;
use crate::config::DownloadConfig;
use crate::log::Grammar;
use crate::log::event::{Event, EventKind, TIMESTAMP_TOKEN, timestamp_at};

/// First and last timestamp seen anywhere in a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSpan {
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
}

impl LogSpan {
    fn widen(span: Option<Self>, ts: NaiveDateTime) -> Option<Self> {
        Some(match span {
            None => Self { first: ts, last: ts },
            Some(s) => Self {
                first: s.first.min(ts),
                last: s.last.max(ts),
            },
        })
    }

    pub fn duration_ms(&self) -> i64 {
        (self.last - self.first).num_milliseconds()
    }
}

pub struct DownloadGrammar {
    timestamp: Regex,
    destination: Regex,
    echo: Regex,
    technology: String,
    phase: String,
}

impl DownloadGrammar {
    pub fn new(config: &DownloadConfig) -> Result<Self> {
        Ok(Self {
            timestamp: Regex::new(TIMESTAMP_TOKEN)?,
            destination: Regex::new(r"(?i)to\s+[A-Z]:/[^/\n]+/([A-Z0-9_]+)\s*$")?,
            echo: Regex::new(r"(?i:downloaded\s+(?:ftp\s+)?file)\s+([A-Z0-9_]+)")?,
            technology: config.technology.clone(),
            phase: config.phase.clone(),
        })
    }

    fn line_timestamp(&self, line: &str) -> Option<NaiveDateTime> {
        let caps = self.timestamp.captures(line)?;
        timestamp_at(&caps, 1)
    }

    /// Earliest and latest timestamp over every line, matched or not.
    pub fn log_span(&self, lines: &[String]) -> Option<LogSpan> {
        lines
            .iter()
            .filter_map(|l| self.line_timestamp(l))
            .fold(None, LogSpan::widen)
    }
}

impl Grammar for DownloadGrammar {
    fn parse_line(&self, line: &str) -> Option<Event> {
        let timestamp = self.line_timestamp(line)?;
        let caps = self
            .destination
            .captures(line)
            .or_else(|| self.echo.captures(line))?;

        Some(Event {
            identifier: caps.get(1)?.as_str().to_string(),
            technology: self.technology.clone(),
            phase: self.phase.clone(),
            kind: EventKind::Touch,
            timestamp,
            instant_duration_ms: None,
            description: None,
        })
    }
}
