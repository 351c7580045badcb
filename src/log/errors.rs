//! Attach error text to the tag that was active when the error was printed.
//!
//! One left-to-right fold over the lines. The state is the last tag token seen
//! and, after an error marker, the tag still waiting for its message.

use std::collections::BTreeMap;

use regex::Regex;

use crate::Result;

/// Ant prints this right before the failing build.xml location and message.
pub const ERROR_MARKER: &str = "The following error occurred while executing this line:";

/// Identifier -> error text. At most one note per identifier.
pub type ErrorNotes = BTreeMap<String, String>;

#[derive(Debug, Default)]
struct ScanState {
    current_tag: Option<String>,
    pending: Option<String>,
    notes: ErrorNotes,
}

pub struct ErrorAssociator {
    tag: Regex,
}

impl ErrorAssociator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            tag: Regex::new(r"\[((?:CR|PF|RQ)-\d+)\]")?,
        })
    }

    pub fn associate(&self, lines: &[String]) -> ErrorNotes {
        lines
            .iter()
            .fold(ScanState::default(), |state, line| self.step(state, line))
            .notes
    }

    fn step(&self, mut state: ScanState, line: &str) -> ScanState {
        if let Some(caps) = self.tag.captures(line) {
            state.current_tag = Some(caps[1].to_string());
        }

        if line.contains(ERROR_MARKER) {
            // Without a tag there is nobody to blame; the note is dropped.
            state.pending = state.current_tag.clone();
            return state;
        }

        if state.pending.is_some() {
            let text = line.trim().trim_matches('"').trim();
            if !text.is_empty() {
                if let Some(tag) = state.pending.take() {
                    state.notes.insert(tag, text.to_string());
                }
            }
        }
        state
    }
}
