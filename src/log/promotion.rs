//! Grammars for the phase-tagged promotion log.
//!
//! Phase lines look like:
//! [2024.01.01 10:00:00] [TechA] [CR-100] [desc] The BUILD phase has started
//!
//! Process lines name an actor instead of a tag and carry their own duration:
//! [2024.01.01 10:00:00] [Orchestrator] [Step] [Deploy] The DEPLOY phase has ended in 1500ms

use regex::Regex;

use crate::Result;
use crate::log::Grammar;
use crate::log::event::{Event, EventKind, ProcessRecord, TIMESTAMP_TOKEN, timestamp_at};

/// Actors whose "phase has ended in Nms" lines are real processes.
pub const PROCESS_ACTORS: [&str; 3] = ["Orchestrator", "-", "EnvironmentPreparation"];

/// Description markers that turn a process line into noise.
pub const EXCLUDED_TAGS: [&str; 3] = ["CR", "PF", "RQ"];

pub struct PromotionGrammar {
    phase: Regex,
    process: Regex,
}

impl PromotionGrammar {
    pub fn new() -> Result<Self> {
        // Captures:
        // 1) timestamp  2) technology  3) tag type  4) tag number
        // 5) optional description token
        // 6/7) English phase + verb, 8/9) Spanish phase + verb
        // 10) optional reported duration
        let phase = Regex::new(&format!(
            r"(?i){TIMESTAMP_TOKEN}\s+\[(\w+)\].*?\[(CR|PF|RQ)-(\d+)\](?:\s*\[([^\]]*)\])?.*?(?:The\s+(\w+)\s+phase\s+has\s+(started|ended)|La\s+fase\s+(\w+)\s+ha\s+(comenzado|iniciado|finalizado))(?:\s+in\s+(\d+)\s*ms)?"
        ))?;

        // Captures: timestamp, name, type, description, phase, duration.
        let process = Regex::new(&format!(
            r"(?i){TIMESTAMP_TOKEN}\s+\[([^\]]+)\]\s+\[([^\]]+)\]\s+\[([^\]]+)\]\s+(?:La\s+fase|The)\s+(\w+)\s+(?:ha\s+finalizado|phase\s+has\s+ended)\s+in\s+(\d+)\s*ms"
        ))?;

        Ok(Self { phase, process })
    }

    /// Parse a single-line process statement.
    ///
    /// Rejects actors outside [`PROCESS_ACTORS`], descriptions carrying any of
    /// [`EXCLUDED_TAGS`], and zero durations.
    pub fn parse_process(&self, line: &str) -> Option<ProcessRecord> {
        let caps = self.process.captures(line)?;
        let end = timestamp_at(&caps, 1)?;
        let name = caps.get(2)?.as_str();
        let kind = caps.get(3)?.as_str();
        let description = caps.get(4)?.as_str();

        if !PROCESS_ACTORS.contains(&name) {
            return None;
        }
        if EXCLUDED_TAGS.iter().any(|tag| description.contains(tag)) {
            return None;
        }
        let duration_ms: i64 = caps.get(6)?.as_str().parse().ok()?;
        if duration_ms == 0 {
            return None;
        }

        Some(ProcessRecord {
            name: name.to_string(),
            kind: kind.to_string(),
            description: description.to_string(),
            phase: caps.get(5)?.as_str().to_uppercase(),
            end,
            duration_ms,
        })
    }

    /// Ordered process listing for a whole log.
    pub fn extract_processes(&self, lines: &[String]) -> Vec<ProcessRecord> {
        lines.iter().filter_map(|l| self.parse_process(l)).collect()
    }
}

impl Grammar for PromotionGrammar {
    fn parse_line(&self, line: &str) -> Option<Event> {
        let caps = self.phase.captures(line)?;
        let timestamp = timestamp_at(&caps, 1)?;
        let technology = caps.get(2)?.as_str().to_string();
        let identifier = format!(
            "{}-{}",
            caps.get(3)?.as_str().to_uppercase(),
            caps.get(4)?.as_str()
        );
        let description = caps
            .get(5)
            .map(|m| m.as_str().trim().to_string())
            .filter(|d| !d.is_empty());

        let (phase, verb) = match (caps.get(6), caps.get(7)) {
            (Some(p), Some(v)) => (p, v),
            _ => (caps.get(8)?, caps.get(9)?),
        };
        let kind = match verb.as_str().to_lowercase().as_str() {
            "started" | "comenzado" | "iniciado" => EventKind::Started,
            _ => EventKind::Ended,
        };

        Some(Event {
            identifier,
            technology,
            phase: phase.as_str().to_uppercase(),
            kind,
            timestamp,
            instant_duration_ms: caps.get(10).and_then(|m| m.as_str().parse().ok()),
            description,
        })
    }
}
