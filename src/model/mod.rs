//! Correlation model: scanned lines -> events -> intervals -> summary tables.

pub mod interval;
pub mod summary;
pub mod tables;

pub use interval::{reconcile_phases, reconcile_touches};
pub use tables::{Cell, Table};

use log::debug;
use serde::Serialize;

use crate::Result;
use crate::config::DownloadConfig;
use crate::log::{
    DownloadGrammar, ErrorAssociator, ErrorNotes, PromotionGrammar, extract_events,
};

/// Which grammar set a log is read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// Phase-tagged promotion log.
    Promotion,
    /// Table-download log.
    TableDownload,
}

/// All tables produced for one input log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Stable name of the input, handed to the sink.
    pub source: String,
    pub dialect: Dialect,
    pub tables: Vec<Table>,
}

impl Report {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// Build the five promotion tables.
///
/// Per-technology duration is the sum of interval durations; identifier
/// duration is its wall-clock span across phases.
pub fn analyze_promotion(source: &str, lines: &[String]) -> Result<Report> {
    let grammar = PromotionGrammar::new()?;
    let intervals = reconcile_phases(extract_events(&grammar, lines));
    let notes = ErrorAssociator::new()?.associate(lines);
    let processes = grammar.extract_processes(lines);

    let technologies = summary::summarize_technologies(&intervals);
    let identifiers = summary::summarize_identifiers(&intervals, &notes);

    debug!(
        "{}: {} intervals, {} identifiers, {} error notes, {} processes",
        source,
        intervals.len(),
        identifiers.len(),
        notes.len(),
        processes.len()
    );

    Ok(Report {
        source: source.to_string(),
        dialect: Dialect::Promotion,
        tables: vec![
            tables::global_data(&intervals),
            tables::times_by_technology(&technologies),
            tables::identifiers(&identifiers),
            tables::averages(&technologies),
            tables::processes(&processes),
        ],
    })
}

/// Build the four table-download tables.
///
/// The times table reports the whole log span, not the sum of per-table
/// durations; averages still use per-table durations.
pub fn analyze_table_download(
    source: &str,
    lines: &[String],
    config: &DownloadConfig,
) -> Result<Report> {
    let grammar = DownloadGrammar::new(config)?;
    let intervals = reconcile_touches(extract_events(&grammar, lines));
    let span = grammar.log_span(lines);

    let technologies = summary::summarize_technologies(&intervals);
    let identifiers = summary::summarize_identifiers(&intervals, &ErrorNotes::new());

    debug!(
        "{}: {} tables downloaded, log span {:?}",
        source,
        intervals.len(),
        span
    );

    Ok(Report {
        source: source.to_string(),
        dialect: Dialect::TableDownload,
        tables: vec![
            tables::global_data(&intervals),
            tables::times_by_log_span(&config.technology, span),
            tables::identifiers(&identifiers),
            tables::averages(&technologies),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::tables::{AVERAGES, GLOBAL_DATA, IDENTIFIERS, PROCESSES, TIMES};
    use crate::log::errors::ERROR_MARKER;
    use crate::log::scan::scan_text;
    use pretty_assertions::assert_eq;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn rendered(table: &Table) -> Vec<Vec<String>> {
        table
            .rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn build_phase_example() {
        let log = lines(&[
            "[2024.01.01 10:00:00] [TechA] [CR-100] [desc] The BUILD phase has started",
            "[2024.01.01 10:05:00] [TechA] [CR-100] [desc] The BUILD phase has ended",
        ]);
        let report = analyze_promotion("example.log", &log).unwrap();
        let global = report.table(GLOBAL_DATA).unwrap();
        assert_eq!(
            rendered(global),
            vec![vec![
                "CR-100",
                "TechA",
                "BUILD",
                "2024-01-01 10:00:00",
                "2024-01-01 10:05:00",
                "300000",
                "0:05:00",
            ]]
        );
    }

    #[test]
    fn error_note_reaches_only_its_identifier() {
        let log = lines(&[
            "[2024.01.01 10:00:00] [TechA] [CR-100] [d] The BUILD phase has started",
            "[2024.01.01 10:05:00] [TechA] [CR-100] [d] The BUILD phase has ended",
            ERROR_MARKER,
            "\"disk full\"",
            "[2024.01.01 10:06:00] [TechB] [CR-200] [d] The BUILD phase has started",
            "[2024.01.01 10:07:00] [TechB] [CR-200] [d] The BUILD phase has ended",
        ]);
        let report = analyze_promotion("errors.log", &log).unwrap();
        let ids = report.table(IDENTIFIERS).unwrap();
        assert_eq!(ids.rows.len(), 2);
        assert_eq!(ids.rows[0][0], Cell::Text("CR-100".into()));
        assert_eq!(ids.rows[0][6], Cell::Text("disk full".into()));
        assert_eq!(ids.rows[1][0], Cell::Text("CR-200".into()));
        assert_eq!(ids.rows[1][6], Cell::Empty);
        assert!(ids.is_flagged(0));
        assert!(!ids.is_flagged(1));
    }

    #[test]
    fn promotion_times_and_averages() {
        let log = lines(&[
            "[2024.01.01 10:00:00] [Java] [CR-1] [d] The BUILD phase has started",
            "[2024.01.01 10:10:00] [Java] [CR-1] [d] The BUILD phase has ended",
            "[2024.01.01 10:05:00] [Java] [CR-1] [d] The DEPLOY phase has started",
            "[2024.01.01 10:20:00] [Java] [CR-1] [d] The DEPLOY phase has ended",
            "[2024.01.01 11:00:00] [Java] [CR-2] [d] The BUILD phase has started",
            "[2024.01.01 11:00:30] [Java] [CR-2] [d] The BUILD phase has ended",
            "[2024.01.01 11:00:00] [Java] [CR-3] [d] The BUILD phase has started",
        ]);
        let report = analyze_promotion("x", &log).unwrap();

        let times = rendered(report.table(TIMES).unwrap());
        assert_eq!(
            times,
            vec![vec![
                "Java",
                "2024-01-01 10:00:00",
                "2024-01-01 11:00:30",
                "1530000",
                "0:25:30",
            ]]
        );

        let averages = rendered(report.table(AVERAGES).unwrap());
        // (600000 + 900000 + 30000) / 2 identifiers
        assert_eq!(averages, vec![vec!["Java", "2", "1530000", "765000", "0:12:45"]]);

        let ids = rendered(report.table(IDENTIFIERS).unwrap());
        assert_eq!(ids[0][0], "CR-1");
        assert_eq!(ids[0][4], "1200000");
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn empty_promotion_log_keeps_schema() {
        let report = analyze_promotion("empty", &[]).unwrap();
        let names: Vec<&str> = report.tables.iter().map(|t| t.name).collect();
        assert_eq!(names, vec![GLOBAL_DATA, TIMES, IDENTIFIERS, AVERAGES, PROCESSES]);
        assert!(report.tables.iter().all(|t| t.rows.is_empty()));
    }

    #[test]
    fn processes_are_listed_in_log_order() {
        let log = lines(&[
            "[2024.01.01 10:00:09] [Orchestrator] [Step] [Deploy] The DEPLOY phase has ended in 900ms",
            "[2024.01.01 10:00:01] [-] [Step] [Prepare] The PREPARE phase has ended in 100ms",
        ]);
        let report = analyze_promotion("p", &log).unwrap();
        let procs = rendered(report.table(PROCESSES).unwrap());
        assert_eq!(procs.len(), 2);
        assert_eq!(
            procs[0],
            vec!["Orchestrator", "Step", "Deploy", "DEPLOY", "", "2024-01-01 10:00:09", "900", "0:00:00"]
        );
        assert_eq!(procs[1][0], "-");
    }

    #[test]
    fn download_times_use_log_span_including_noise() {
        let log = lines(&[
            "[2024.01.01 08:00:00] Started by timer",
            "[2024.01.01 09:00:00] get LIB/T1 to D:/dl/T1",
            "[2024.01.01 09:00:20] [echo] Downloaded ftp file T1",
            "[2024.01.01 09:10:00] [echo] Downloaded ftp file T2",
            "[2024.01.01 12:00:00] Finished: SUCCESS",
        ]);
        let report =
            analyze_table_download("td.html", &log, &DownloadConfig::default()).unwrap();
        assert_eq!(report.dialect, Dialect::TableDownload);
        assert_eq!(report.tables.len(), 4);
        assert!(report.table(PROCESSES).is_none());

        let times = rendered(report.table(TIMES).unwrap());
        assert_eq!(
            times,
            vec![vec![
                "AS400",
                "2024-01-01 08:00:00",
                "2024-01-01 12:00:00",
                "14400000",
                "4:00:00",
            ]]
        );

        let global = rendered(report.table(GLOBAL_DATA).unwrap());
        assert_eq!(global.len(), 2);
        assert_eq!(global[0][0], "T1");
        assert_eq!(global[0][5], "20000");
        assert_eq!(global[1][0], "T2");
        assert_eq!(global[1][5], "0");

        let averages = rendered(report.table(AVERAGES).unwrap());
        assert_eq!(averages, vec![vec!["AS400", "2", "20000", "10000", "0:00:10"]]);
    }

    #[test]
    fn download_span_survives_html_without_console_block() {
        let page = "<html><body>\
<div>[2024.01.01 08:00:00] Started</div>\
<div>[2024.01.01 09:00:00] [echo] Downloaded ftp file T1</div>\
<div>[2024.01.01 12:00:00] Finished</div></body></html>";
        let scanned = scan_text(page).unwrap();
        let report =
            analyze_table_download("td.html", &scanned.lines, &DownloadConfig::default())
                .unwrap();
        let times = rendered(report.table(TIMES).unwrap());
        assert_eq!(times[0][3], "14400000");
        assert_eq!(rendered(report.table(GLOBAL_DATA).unwrap())[0][0], "T1");
    }

    #[test]
    fn empty_download_log_keeps_schema() {
        let report =
            analyze_table_download("none", &lines(&["nothing"]), &DownloadConfig::default())
                .unwrap();
        assert_eq!(report.tables.len(), 4);
        assert!(report.tables.iter().all(|t| t.rows.is_empty()));
    }

    #[test]
    fn analysis_is_deterministic() {
        let log = lines(&[
            "[2024.01.01 10:00:00] [B] [CR-2] [d] The BUILD phase has started",
            "[2024.01.01 10:00:00] [A] [CR-1] [d] The BUILD phase has started",
            "[2024.01.01 10:01:00] [B] [CR-2] [d] The BUILD phase has ended",
            "[2024.01.01 10:01:00] [A] [CR-1] [d] The BUILD phase has ended",
        ]);
        let a = serde_json::to_string(&analyze_promotion("d", &log).unwrap()).unwrap();
        let b = serde_json::to_string(&analyze_promotion("d", &log).unwrap()).unwrap();
        assert_eq!(a, b);
    }
}
