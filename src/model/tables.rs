//! Tabular output shared with the report sink.
//!
//! Table names and column order are a fixed contract: the sink reads columns
//! by position and never inspects header text.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use crate::log::{LogSpan, ProcessRecord};
use crate::model::interval::Interval;
use crate::model::summary::{IdentifierSummary, TechnologySummary, format_hms};

pub const GLOBAL_DATA: &str = "GlobalData";
pub const TIMES: &str = "Tiempos";
pub const IDENTIFIERS: &str = "Etiquetas";
pub const AVERAGES: &str = "Medias Tecnologia";
pub const PROCESSES: &str = "Procesos";

pub const GLOBAL_DATA_COLUMNS: &[&str] = &[
    "identifier",
    "technology",
    "phase",
    "start",
    "end",
    "duration_ms",
    "duration_hms",
];
pub const TIMES_COLUMNS: &[&str] = &["technology", "start", "end", "duration_ms", "duration_hms"];
pub const IDENTIFIERS_COLUMNS: &[&str] = &[
    "identifier",
    "technology",
    "start",
    "end",
    "duration_ms",
    "duration_hms",
    "error",
];
pub const AVERAGES_COLUMNS: &[&str] = &["technology", "identifiers", "total_ms", "mean_ms", "mean_hms"];
pub const PROCESSES_COLUMNS: &[&str] = &[
    "name",
    "type",
    "description",
    "phase",
    "start",
    "end",
    "duration_ms",
    "duration_hms",
];

/// Position of the error note in the identifiers table.
pub const IDENTIFIERS_ERROR_COLUMN: usize = 6;

/// Layout used for timestamps in every output.
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Time(NaiveDateTime),
    Empty,
}

impl Cell {
    fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Int(n) => write!(f, "{n}"),
            Cell::Time(ts) => write!(f, "{}", ts.format(OUTPUT_TIMESTAMP_FORMAT)),
            Cell::Empty => Ok(()),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Int(n) => serializer.serialize_i64(*n),
            Cell::Time(_) => serializer.collect_str(self),
            Cell::Empty => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub rows: Vec<Vec<Cell>>,
    /// Rows whose cell in this column is non-empty get highlighted.
    pub flag_column: Option<usize>,
}

impl Table {
    fn new(name: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            name,
            columns,
            rows: Vec::new(),
            flag_column: None,
        }
    }

    fn push(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row width for {}", self.name);
        self.rows.push(row);
    }

    pub fn is_flagged(&self, row: usize) -> bool {
        match (self.flag_column, self.rows.get(row)) {
            (Some(col), Some(cells)) => cells.get(col).is_some_and(|c| !c.is_empty()),
            _ => false,
        }
    }
}

pub fn global_data(intervals: &[Interval]) -> Table {
    let mut t = Table::new(GLOBAL_DATA, GLOBAL_DATA_COLUMNS);
    for iv in intervals {
        t.push(vec![
            Cell::text(&iv.identifier),
            Cell::text(iv.technology()),
            Cell::text(&iv.phase),
            Cell::Time(iv.start),
            Cell::Time(iv.end),
            Cell::Int(iv.duration_ms),
            Cell::text(format_hms(iv.duration_ms)),
        ]);
    }
    t
}

/// One row per technology.
pub fn times_by_technology(summaries: &[TechnologySummary]) -> Table {
    let mut t = Table::new(TIMES, TIMES_COLUMNS);
    for s in summaries {
        t.push(vec![
            Cell::text(&s.technology),
            Cell::Time(s.start),
            Cell::Time(s.end),
            Cell::Int(s.duration_ms),
            Cell::text(format_hms(s.duration_ms)),
        ]);
    }
    t
}

/// A single row covering the whole log, or none when the log had no timestamps.
pub fn times_by_log_span(technology: &str, span: Option<LogSpan>) -> Table {
    let mut t = Table::new(TIMES, TIMES_COLUMNS);
    if let Some(span) = span {
        let ms = span.duration_ms();
        t.push(vec![
            Cell::text(technology),
            Cell::Time(span.first),
            Cell::Time(span.last),
            Cell::Int(ms),
            Cell::text(format_hms(ms)),
        ]);
    }
    t
}

pub fn identifiers(summaries: &[IdentifierSummary]) -> Table {
    let mut t = Table::new(IDENTIFIERS, IDENTIFIERS_COLUMNS);
    t.flag_column = Some(IDENTIFIERS_ERROR_COLUMN);
    for s in summaries {
        t.push(vec![
            Cell::text(&s.identifier),
            Cell::text(s.technology()),
            Cell::Time(s.start),
            Cell::Time(s.end),
            Cell::Int(s.duration_ms),
            Cell::text(format_hms(s.duration_ms)),
            s.error.as_ref().map_or(Cell::Empty, Cell::text),
        ]);
    }
    t
}

pub fn averages(summaries: &[TechnologySummary]) -> Table {
    let mut t = Table::new(AVERAGES, AVERAGES_COLUMNS);
    for s in summaries {
        let mean = s.mean_ms();
        t.push(vec![
            Cell::text(&s.technology),
            Cell::Int(s.identifiers as i64),
            Cell::Int(s.duration_ms),
            Cell::Int(mean),
            Cell::text(format_hms(mean)),
        ]);
    }
    t
}

/// Raw process listing; present even when empty.
pub fn processes(records: &[ProcessRecord]) -> Table {
    let mut t = Table::new(PROCESSES, PROCESSES_COLUMNS);
    for r in records {
        t.push(vec![
            Cell::text(&r.name),
            Cell::text(&r.kind),
            Cell::text(&r.description),
            Cell::text(&r.phase),
            Cell::Empty,
            Cell::Time(r.end),
            Cell::Int(r.duration_ms),
            Cell::text(format_hms(r.duration_ms)),
        ]);
    }
    t
}
