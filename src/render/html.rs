use crate::model::Report;
use crate::model::tables::{IDENTIFIERS, TIMES};

/// Render a self-contained HTML report (data embedded as JSON).
///
/// Important: we avoid `format!()` because the HTML contains many `{}` from JS
/// template literals (e.g., `${x}`), which would conflict with Rust formatting.
pub fn render_html_report(report: &Report) -> anyhow::Result<String> {
    // Log text ends up inside <script>; keep it from closing the tag.
    let json = serde_json::to_string(report)?.replace("</", "<\\/");

    const TEMPLATE: &str = r##"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Log metrics</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; }
  header { padding: 12px 16px; border-bottom: 1px solid #ddd; }
  main { padding: 12px 16px; }
  nav { display: flex; gap: 8px; flex-wrap: wrap; margin: 12px 0; }
  nav button { padding: 6px 10px; border: 1px solid #ddd; border-radius: 6px; background: #fafafa; cursor: pointer; }
  nav button.active { background: #e9f2ff; border-color: #cfe3ff; }

  .summary { display: flex; gap: 16px; flex-wrap: wrap; font-size: 14px; color: #333; }
  .pill { padding: 4px 8px; border: 1px solid #ddd; border-radius: 999px; background: #fafafa; }
  .muted { color: #777; font-size: 12px; }

  table { border-collapse: collapse; width: 100%; margin-top: 8px; }
  th, td { border-bottom: 1px solid #eee; padding: 6px 8px; text-align: left; font-size: 14px; }
  th { position: sticky; top: 0; background: white; border-bottom: 1px solid #ddd; }
  .num { text-align: right; font-variant-numeric: tabular-nums; }
  tr.flagged td { background: #FFC7CE; }

  .timeline { margin-top: 8px; }
  .lane { display: flex; align-items: center; height: 22px; font-size: 12px; }
  .lane .label { width: 280px; overflow: hidden; white-space: nowrap; text-overflow: ellipsis; padding-right: 8px; }
  .lane .track { position: relative; flex: 1; height: 14px; background: #f6f6f6; border-radius: 3px; }
  .lane .bar { position: absolute; top: 0; height: 14px; min-width: 2px; border-radius: 3px; }
  .axis { display: flex; justify-content: space-between; margin-left: 280px; }
</style>
</head>
<body>
<header>
  <div class="summary" id="summary"></div>
</header>

<main>
  <h2>Timeline by technology</h2>
  <div id="timesTimeline" class="timeline"></div>
  <h2>Timeline by identifier</h2>
  <div id="idsTimeline" class="timeline"></div>

  <nav id="tabs"></nav>
  <div id="tableView"></div>
</main>

<script>
// Embedded report data (JSON object literal)
const DATA = __DATA__;
const TIMES = "__TIMES__";
const IDENTIFIERS = "__IDENTIFIERS__";
const PALETTE = ["#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880"];

const state = { selected: DATA.tables.length ? DATA.tables[0].name : null };

function esc(s) {
  return String(s ?? "").replace(/[&<>"']/g, (c) => ({
    "&": "&amp;", "<": "&lt;", ">": "&gt;", '"': "&quot;", "'": "&#39;"
  }[c]));
}

function table(name) {
  return DATA.tables.find((t) => t.name === name);
}

function parseTs(s) {
  return s ? new Date(s.replace(" ", "T")).getTime() : NaN;
}

function renderSummary() {
  const el = document.getElementById("summary");
  const pills = [`<span class="pill"><b>${esc(DATA.source)}</b></span>`,
                 `<span class="pill">${esc(DATA.dialect)}</span>`];
  for (const t of DATA.tables) {
    pills.push(`<span class="pill">${esc(t.name)}: ${t.rows.length}</span>`);
  }
  el.innerHTML = pills.join("");
}

// rows: [{label, group, start, end}]
function renderTimeline(containerId, rows) {
  const el = document.getElementById(containerId);
  const valid = rows.filter((r) => !isNaN(r.start) && !isNaN(r.end));
  if (!valid.length) {
    el.innerHTML = `<div class="muted">No data.</div>`;
    return;
  }
  const min = Math.min(...valid.map((r) => r.start));
  const max = Math.max(...valid.map((r) => r.end));
  const span = Math.max(max - min, 1);
  const groups = [...new Set(valid.map((r) => r.group))];

  let html = "";
  for (const r of valid) {
    const left = ((r.start - min) / span) * 100;
    const width = ((r.end - r.start) / span) * 100;
    const color = PALETTE[groups.indexOf(r.group) % PALETTE.length];
    html += `<div class="lane"><div class="label" title="${esc(r.label)}">${esc(r.label)}</div>
      <div class="track"><div class="bar" style="left:${left}%; width:${width}%; background:${color}"></div></div></div>`;
  }
  const fmt = (ms) => new Date(ms).toTimeString().slice(0, 5);
  html += `<div class="axis muted"><span>${fmt(min)}</span><span>${fmt(max)}</span></div>`;
  el.innerHTML = html;
}

function renderTimelines() {
  // Column positions follow the table contract: technology, start, end, ...
  const times = table(TIMES);
  renderTimeline("timesTimeline", (times ? times.rows : []).map((r) => ({
    label: r[0], group: r[0], start: parseTs(r[1]), end: parseTs(r[2])
  })));

  // identifier, technology, start, end, ...
  const ids = table(IDENTIFIERS);
  renderTimeline("idsTimeline", (ids ? ids.rows : []).map((r) => ({
    label: `${r[0]} (${r[1]})`, group: r[1], start: parseTs(r[2]), end: parseTs(r[3])
  })));
}

function renderTabs() {
  const nav = document.getElementById("tabs");
  nav.innerHTML = "";
  for (const t of DATA.tables) {
    const b = document.createElement("button");
    b.textContent = t.name;
    if (t.name === state.selected) b.classList.add("active");
    b.onclick = () => { state.selected = t.name; renderTabs(); renderTable(); };
    nav.appendChild(b);
  }
}

function renderTable() {
  const el = document.getElementById("tableView");
  const t = table(state.selected);
  if (!t) { el.innerHTML = ""; return; }

  const head = t.columns.map((c) => `<th>${esc(c)}</th>`).join("");
  const body = t.rows.map((row) => {
    const flagged = t.flag_column !== null && row[t.flag_column] !== null && row[t.flag_column] !== "";
    const cells = row.map((v) => typeof v === "number"
      ? `<td class="num">${v}</td>`
      : `<td>${esc(v)}</td>`).join("");
    return `<tr class="${flagged ? "flagged" : ""}">${cells}</tr>`;
  }).join("");
  const empty = t.rows.length ? "" : `<div class="muted">No rows.</div>`;
  el.innerHTML = `<table><thead><tr>${head}</tr></thead><tbody>${body}</tbody></table>${empty}`;
}

renderSummary();
renderTimelines();
renderTabs();
renderTable();
</script>
</body>
</html>
"##;

    Ok(TEMPLATE
        .replace("__TIMES__", TIMES)
        .replace("__IDENTIFIERS__", IDENTIFIERS)
        .replace("__DATA__", &json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::analyze_promotion;

    #[test]
    fn report_data_is_embedded() {
        let lines = vec![
            "[2024.01.01 10:00:00] [TechA] [CR-100] [d] The BUILD phase has started".to_string(),
            "[2024.01.01 10:05:00] [TechA] [CR-100] [d] The BUILD phase has ended".to_string(),
        ];
        let report = analyze_promotion("promo.log", &lines).unwrap();
        let html = render_html_report(&report).unwrap();
        assert!(html.contains(r#""source":"promo.log""#));
        assert!(html.contains(r#"const TIMES = "Tiempos";"#));
        assert!(html.contains(r#"["CR-100","TechA","BUILD","2024-01-01 10:00:00""#));
        assert!(!html.contains("__DATA__"));
    }

    #[test]
    fn script_tags_in_log_text_are_neutralised() {
        let lines = vec![
            "[2024.01.01 10:00:00] [T] [CR-1] [d] The BUILD phase has started".to_string(),
            "[2024.01.01 10:05:00] [T] [CR-1] [d] The BUILD phase has ended".to_string(),
            crate::log::errors::ERROR_MARKER.to_string(),
            "</script><b>boom</b>".to_string(),
        ];
        let html = render_html_report(&analyze_promotion("x", &lines).unwrap()).unwrap();
        assert_eq!(html.matches("</script>").count(), 1);
    }
}
