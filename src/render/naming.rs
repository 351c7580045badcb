//! Output artifact names derived from the input file name.

use std::path::Path;

use crate::model::Dialect;

/// Appended to every artifact base name.
pub const OUTPUT_SUFFIX: &str = "_METRICAS";

/// Name produced when a promotion log is saved twice through the browser.
const MANGLED_SUFFIX: &str = "_l.html_tiempos";

/// Promotion base names keep at most this many characters of the input name.
const PROMOTION_NAME_LIMIT: usize = 45;

/// Base name (without extension) for the artifacts of `input`.
pub fn output_base(input: &Path, dialect: Dialect) -> String {
    match dialect {
        Dialect::Promotion => {
            let name = file_name(input);
            let name = match name.strip_suffix(MANGLED_SUFFIX) {
                Some(stem) => format!("{stem}.html"),
                None => name,
            };
            let base: String = name
                .chars()
                .take(PROMOTION_NAME_LIMIT)
                .map(|c| if c == ' ' || c == '#' { '_' } else { c })
                .collect();
            format!("{base}{OUTPUT_SUFFIX}")
        }
        Dialect::TableDownload => {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "log".to_string());
            format!("{stem}{OUTPUT_SUFFIX}")
        }
    }
}

fn file_name(input: &Path) -> String {
    input
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "log".to_string())
}
