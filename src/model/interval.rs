//! Reconcile events into one interval per group.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use log::debug;

use crate::log::{Event, EventKind};

/// Separator used when an interval carries several technologies.
pub const TECHNOLOGY_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub identifier: String,
    /// Distinct technologies in first-seen order.
    pub technologies: Vec<String>,
    pub phase: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_ms: i64,
}

impl Interval {
    fn new(
        identifier: String,
        technologies: Vec<String>,
        phase: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            identifier,
            technologies,
            phase,
            start,
            end,
            duration_ms: (end - start).num_milliseconds(),
        }
    }

    /// Technology label as shown in tables (`"Java, Cobol"`).
    pub fn technology(&self) -> String {
        self.technologies.join(TECHNOLOGY_SEPARATOR)
    }
}

#[derive(Debug, Default)]
struct Group {
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    technologies: Vec<String>,
    phase: String,
    reported_ms: Option<i64>,
    description: Option<String>,
}

impl Group {
    fn add_technology(&mut self, technology: &str) {
        if !self.technologies.iter().any(|t| t == technology) {
            self.technologies.push(technology.to_string());
        }
    }

    fn widen(&mut self, ts: NaiveDateTime) {
        self.start = Some(self.start.map_or(ts, |s| s.min(ts)));
        self.end = Some(self.end.map_or(ts, |e| e.max(ts)));
    }
}

/// Pair STARTED/ENDED events sharing `(identifier, phase)`.
///
/// start = earliest STARTED, end = latest ENDED. Groups missing either side,
/// or whose end is not after the start, produce nothing. Output is ordered by
/// `(identifier, phase)`.
pub fn reconcile_phases<I>(events: I) -> Vec<Interval>
where
    I: IntoIterator<Item = Event>,
{
    let mut groups: BTreeMap<(String, String), Group> = BTreeMap::new();
    for ev in events {
        let group = groups
            .entry((ev.identifier.clone(), ev.phase.clone()))
            .or_default();
        group.add_technology(&ev.technology);
        if group.description.is_none() {
            group.description = ev.description.clone();
        }
        match ev.kind {
            EventKind::Started => {
                group.start = Some(group.start.map_or(ev.timestamp, |s| s.min(ev.timestamp)));
            }
            EventKind::Ended => {
                group.end = Some(group.end.map_or(ev.timestamp, |e| e.max(ev.timestamp)));
                if ev.instant_duration_ms.is_some() {
                    group.reported_ms = ev.instant_duration_ms;
                }
            }
            EventKind::Touch => group.widen(ev.timestamp),
        }
    }

    let mut out = Vec::new();
    for ((identifier, phase), group) in groups {
        let (Some(start), Some(end)) = (group.start, group.end) else {
            debug!(
                "dropping incomplete interval {identifier}/{phase} ({})",
                group.description.as_deref().unwrap_or("-")
            );
            continue;
        };
        if end <= start {
            debug!("dropping inverted interval {identifier}/{phase}: {start} .. {end}");
            continue;
        }
        let interval = Interval::new(identifier, group.technologies, phase, start, end);
        if let Some(reported) = group.reported_ms {
            if reported != interval.duration_ms {
                debug!(
                    "{}/{}: log reports {}ms, reconciled {}ms",
                    interval.identifier, interval.phase, reported, interval.duration_ms
                );
            }
        }
        out.push(interval);
    }
    out
}

/// Fold touch events per identifier into their first/last timestamp.
///
/// Every detected identifier yields an interval, zero-length ones included.
/// Output is ordered by `(start, identifier)`.
pub fn reconcile_touches<I>(events: I) -> Vec<Interval>
where
    I: IntoIterator<Item = Event>,
{
    let mut groups: BTreeMap<String, Group> = BTreeMap::new();
    for ev in events {
        let group = groups.entry(ev.identifier.clone()).or_default();
        if group.phase.is_empty() {
            group.phase = ev.phase.clone();
        }
        group.add_technology(&ev.technology);
        group.widen(ev.timestamp);
    }

    let mut out: Vec<Interval> = groups
        .into_iter()
        .filter_map(|(identifier, group)| {
            Some(Interval::new(
                identifier,
                group.technologies,
                group.phase,
                group.start?,
                group.end?,
            ))
        })
        .collect();
    out.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| a.identifier.cmp(&b.identifier))
    });
    out
}
