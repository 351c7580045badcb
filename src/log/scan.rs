//! Turn raw log bytes into plain text lines.
//!
//! Jenkins console pages wrap the log in HTML; the console block is located
//! with a short list of selectors, tried in order. A selector only wins when it
//! matches exactly one element. When nothing qualifies we fall back to every
//! visible text node of the document, which still carries the log lines but may
//! include page chrome around them.

use std::fmt;

use anyhow::anyhow;
use scraper::{Html, Selector};

use crate::Result;

/// Candidate console regions, most specific first.
const CONSOLE_SELECTORS: [&str; 4] = [
    "#main-panel pre",
    "#main-panel #out",
    "pre.console-output",
    "pre",
];

/// Where the returned lines came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleRegion {
    /// Input was not HTML; lines are the raw text.
    PlainText,
    /// HTML input; the console block matched this selector.
    Selector(&'static str),
    /// HTML input without a unique console block; all visible text was used.
    Document,
}

impl fmt::Display for ConsoleRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleRegion::PlainText => f.write_str("plain text"),
            ConsoleRegion::Selector(sel) => write!(f, "console block `{sel}`"),
            ConsoleRegion::Document => f.write_str("whole document"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScannedLog {
    pub lines: Vec<String>,
    pub region: ConsoleRegion,
}

impl ScannedLog {
    /// True when extraction had to degrade to whole-document text.
    pub fn is_degraded(&self) -> bool {
        self.region == ConsoleRegion::Document
    }
}

/// Decode raw bytes (lossy) and split them into lines.
pub fn scan_bytes(bytes: &[u8]) -> Result<ScannedLog> {
    scan_text(&String::from_utf8_lossy(bytes))
}

pub fn scan_text(text: &str) -> Result<ScannedLog> {
    let text = text.trim_start_matches('\u{feff}');
    if !looks_like_html(text) {
        return Ok(ScannedLog {
            lines: split_lines(text),
            region: ConsoleRegion::PlainText,
        });
    }

    let document = Html::parse_document(text);
    for sel in CONSOLE_SELECTORS {
        let selector =
            Selector::parse(sel).map_err(|e| anyhow!("invalid console selector {sel}: {e:?}"))?;
        let mut matches = document.select(&selector);
        if let (Some(region), None) = (matches.next(), matches.next()) {
            let content: String = region.text().collect();
            return Ok(ScannedLog {
                lines: split_lines(&content),
                region: ConsoleRegion::Selector(sel),
            });
        }
    }

    Ok(ScannedLog {
        lines: split_lines(&visible_text(&document)),
        region: ConsoleRegion::Document,
    })
}

fn looks_like_html(text: &str) -> bool {
    let head = text.trim_start();
    if !head.starts_with('<') {
        return false;
    }
    let prefix: String = head.chars().take(1024).collect::<String>().to_ascii_lowercase();
    ["<!doctype html", "<html", "<head", "<body", "<pre"]
        .iter()
        .any(|marker| prefix.contains(marker))
}

/// Elements whose boundaries end a line of visible text.
const BLOCK_ELEMENTS: [&str; 30] = [
    "address", "article", "aside", "blockquote", "body", "dd", "div", "dl", "dt", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "html", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "tr",
];

/// Every text node outside `<head>`, `<script>` and `<style>`, one line per
/// block element (or `<br>`). Inline markup stays on its line.
fn visible_text(document: &Html) -> String {
    let mut out = String::new();
    let mut current_block = None;
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| e.name()))
            .is_some_and(|name| matches!(name, "script" | "style" | "head" | "title"));
        if hidden {
            continue;
        }

        let block = node
            .ancestors()
            .find(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| BLOCK_ELEMENTS.iter().any(|b| *b == e.name()))
            })
            .map(|a| a.id());
        let after_break = node
            .prev_sibling()
            .and_then(|s| s.value().as_element().map(|e| e.name() == "br"))
            .unwrap_or(false);
        if block != current_block || after_break {
            current_block = block;
            // Indentation between blocks.
            if text.trim().is_empty() {
                continue;
            }
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
        }
        out.push_str(text);
    }
    out
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_text_is_split_directly() {
        let log = scan_text("first\r\nsecond\n\nthird").unwrap();
        assert_eq!(log.region, ConsoleRegion::PlainText);
        assert_eq!(log.lines, vec!["first", "second", "", "third"]);
    }

    #[test]
    fn bracketed_log_lines_are_not_mistaken_for_html() {
        let log = scan_text("[2024.01.01 10:00:00] [TechA] <build> started").unwrap();
        assert_eq!(log.region, ConsoleRegion::PlainText);
    }

    #[test]
    fn html_console_block_is_extracted_without_markup() {
        let html = r#"<!DOCTYPE html><html><head><title>#12 Console</title></head>
<body><div id="side-panel">Back to project</div>
<div id="main-panel"><pre class="console-output">[2024.01.01 10:00:00] <b>Downloaded</b> ftp file T1
[2024.01.01 10:00:05] done &amp; dusted</pre></div></body></html>"#;
        let log = scan_text(html).unwrap();
        assert_eq!(log.region, ConsoleRegion::Selector("#main-panel pre"));
        assert_eq!(
            log.lines,
            vec![
                "[2024.01.01 10:00:00] Downloaded ftp file T1",
                "[2024.01.01 10:00:05] done & dusted",
            ]
        );
    }

    #[test]
    fn bare_pre_is_used_when_no_panel_exists() {
        let html = "<html><body><pre>line one\nline two</pre></body></html>";
        let log = scan_text(html).unwrap();
        assert_eq!(log.region, ConsoleRegion::Selector("pre"));
        assert_eq!(log.lines, vec!["line one", "line two"]);
    }

    #[test]
    fn missing_console_falls_back_to_visible_text() {
        let html = "<html><head><style>p { color: red }</style></head>\
<body><p>[2024.01.01 10:00:00] hello</p><script>var x = 1;</script></body></html>";
        let log = scan_text(html).unwrap();
        assert!(log.is_degraded());
        assert_eq!(log.lines, vec!["[2024.01.01 10:00:00] hello"]);
    }

    #[test]
    fn multiple_pre_blocks_fall_back_to_visible_text() {
        let html = "<html><body><pre>a</pre>\n<pre>b</pre></body></html>";
        let log = scan_text(html).unwrap();
        assert_eq!(log.region, ConsoleRegion::Document);
        assert_eq!(log.lines, vec!["a", "b"]);
    }

    #[test]
    fn fallback_keeps_block_elements_on_separate_lines() {
        let html = "<html><body>\
<div>[2024.01.01 08:00:00] Started</div>\
<div>[2024.01.01 09:00:00] [echo] <b>Downloaded</b> ftp file T1</div>\
<p>[2024.01.01 12:00:00] Finished<br>exit 0</p></body></html>";
        let log = scan_text(html).unwrap();
        assert!(log.is_degraded());
        assert_eq!(
            log.lines,
            vec![
                "[2024.01.01 08:00:00] Started",
                "[2024.01.01 09:00:00] [echo] Downloaded ftp file T1",
                "[2024.01.01 12:00:00] Finished",
                "exit 0",
            ]
        );
    }

    #[test]
    fn byte_order_mark_does_not_hide_html() {
        let html = "\u{feff}<!DOCTYPE html><html><body><pre>\
[2024.01.01 10:00:00] <b>Downloaded</b> ftp file T1</pre></body></html>";
        let log = scan_bytes(html.as_bytes()).unwrap();
        assert_eq!(log.region, ConsoleRegion::Selector("pre"));
        assert_eq!(log.lines, vec!["[2024.01.01 10:00:00] Downloaded ftp file T1"]);

        let plain = scan_text("\u{feff}first\nsecond").unwrap();
        assert_eq!(plain.lines, vec!["first", "second"]);
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let log = scan_bytes(b"ok\n\xff\xfe tail").unwrap();
        assert_eq!(log.lines.len(), 2);
        assert!(log.lines[1].ends_with(" tail"));
    }
}
