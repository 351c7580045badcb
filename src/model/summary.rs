//! Roll intervals up per technology and per identifier.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;

use crate::log::ErrorNotes;
use crate::model::interval::{Interval, TECHNOLOGY_SEPARATOR};

/// Format milliseconds as `H:MM:SS`, flooring to whole seconds.
pub fn format_hms(ms: i64) -> String {
    let secs = ms.max(0) / 1000;
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechnologySummary {
    pub technology: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Sum of interval durations.
    pub duration_ms: i64,
    /// Distinct identifiers contributing to this technology.
    pub identifiers: usize,
}

impl TechnologySummary {
    /// Mean duration per identifier, truncated to whole milliseconds.
    pub fn mean_ms(&self) -> i64 {
        if self.identifiers == 0 {
            return 0;
        }
        self.duration_ms / self.identifiers as i64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierSummary {
    pub identifier: String,
    /// Sorted, de-duplicated technologies across all phases.
    pub technologies: Vec<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Wall-clock span `end - start`, not the sum of phase durations.
    pub duration_ms: i64,
    pub error: Option<String>,
}

impl IdentifierSummary {
    pub fn technology(&self) -> String {
        self.technologies.join(TECHNOLOGY_SEPARATOR)
    }
}

/// Group intervals by their technology label, ordered by label.
pub fn summarize_technologies(intervals: &[Interval]) -> Vec<TechnologySummary> {
    struct Acc<'a> {
        start: NaiveDateTime,
        end: NaiveDateTime,
        duration_ms: i64,
        identifiers: BTreeSet<&'a str>,
    }

    let mut groups: BTreeMap<String, Acc<'_>> = BTreeMap::new();
    for iv in intervals {
        let acc = groups.entry(iv.technology()).or_insert_with(|| Acc {
            start: iv.start,
            end: iv.end,
            duration_ms: 0,
            identifiers: BTreeSet::new(),
        });
        acc.start = acc.start.min(iv.start);
        acc.end = acc.end.max(iv.end);
        acc.duration_ms += iv.duration_ms;
        acc.identifiers.insert(iv.identifier.as_str());
    }

    groups
        .into_iter()
        .map(|(technology, acc)| TechnologySummary {
            technology,
            start: acc.start,
            end: acc.end,
            duration_ms: acc.duration_ms,
            identifiers: acc.identifiers.len(),
        })
        .collect()
}

/// Merge intervals across phases per identifier and attach error notes.
///
/// Ordered by start, then identifier.
pub fn summarize_identifiers(intervals: &[Interval], notes: &ErrorNotes) -> Vec<IdentifierSummary> {
    struct Acc {
        start: NaiveDateTime,
        end: NaiveDateTime,
        technologies: BTreeSet<String>,
    }

    let mut groups: BTreeMap<&str, Acc> = BTreeMap::new();
    for iv in intervals {
        let acc = groups.entry(iv.identifier.as_str()).or_insert_with(|| Acc {
            start: iv.start,
            end: iv.end,
            technologies: BTreeSet::new(),
        });
        acc.start = acc.start.min(iv.start);
        acc.end = acc.end.max(iv.end);
        // A technology field may itself be a joined list.
        for tech in iv.technologies.iter().flat_map(|t| t.split(TECHNOLOGY_SEPARATOR)) {
            acc.technologies.insert(tech.to_string());
        }
    }

    let mut out: Vec<IdentifierSummary> = groups
        .into_iter()
        .map(|(identifier, acc)| IdentifierSummary {
            identifier: identifier.to_string(),
            technologies: acc.technologies.into_iter().collect(),
            start: acc.start,
            end: acc.end,
            duration_ms: (acc.end - acc.start).num_milliseconds(),
            error: notes.get(identifier).cloned(),
        })
        .collect();
    out.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| a.identifier.cmp(&b.identifier))
    });
    out
}
