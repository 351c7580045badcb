//! Log scanning and per-dialect event grammars.

pub mod download;
pub mod errors;
pub mod event;
pub mod promotion;
pub mod scan;

pub use download::{DownloadGrammar, LogSpan};
pub use errors::{ErrorAssociator, ErrorNotes};
pub use event::{Event, EventKind, ProcessRecord};
pub use promotion::PromotionGrammar;
pub use scan::scan_bytes;

/// A line grammar: each line yields zero or one event, independently.
pub trait Grammar {
    fn parse_line(&self, line: &str) -> Option<Event>;
}

/// Lazily apply a grammar to every line, in log order.
pub fn extract_events<'a, G: Grammar + ?Sized>(
    grammar: &'a G,
    lines: &'a [String],
) -> impl Iterator<Item = Event> + 'a {
    lines.iter().filter_map(move |line| grammar.parse_line(line))
}
