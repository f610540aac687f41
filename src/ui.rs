use crate::form::{FormInput, StatusLine};
use crate::format::escape_html;
use crate::table::TableView;
use crate::units::WeightUnit;
use crate::view_state::{ChartOrientations, ChartTarget, Orientation, ViewState};

pub struct TrackerPage<'a> {
    pub view: &'a ViewState,
    pub table: &'a TableView,
    pub form: &'a FormInput,
    pub status: &'a StatusLine,
    pub weight_chart: Option<&'a str>,
    pub waist_chart: Option<&'a str>,
}

/// Display preferences carried between page loads in the query string.
#[derive(Clone, Copy)]
struct Prefs {
    page: u64,
    unit: WeightUnit,
    orientation: ChartOrientations,
}

impl Prefs {
    fn href(&self) -> String {
        format!(
            "/?page={}&amp;unit={}&amp;weight={}&amp;waist={}",
            self.page,
            self.unit,
            self.orientation.weight.as_str(),
            self.orientation.waist.as_str()
        )
    }

    /// The same preferences as hidden inputs, so a rejected form post can
    /// re-render the page the way it was.
    fn hidden_fields(&self) -> String {
        [
            ("page", self.page.to_string()),
            ("unit", self.unit.to_string()),
            ("weight", self.orientation.weight.as_str().to_string()),
            ("waist", self.orientation.waist.as_str().to_string()),
        ]
        .iter()
        .map(|(name, value)| format!(r#"<input type="hidden" name="{name}" value="{value}" />"#))
        .collect::<Vec<_>>()
        .join("\n        ")
    }
}

pub fn render_tracker_page(page: &TrackerPage<'_>) -> String {
    let prefs = Prefs {
        page: page.view.pagination.page,
        unit: page.view.weight_unit,
        orientation: page.view.orientation,
    };

    TRACKER_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{PREF_FIELDS}}", &prefs.hidden_fields())
        .replace("{{STATUS_TONE}}", page.status.tone.as_str())
        .replace("{{STATUS}}", &escape_html(&page.status.message))
        .replace("{{DATE}}", &escape_html(&page.form.date))
        .replace("{{WEIGHT_JIN}}", &escape_html(&page.form.weight_jin))
        .replace("{{KG_PREVIEW}}", &escape_html(&page.form.weight_preview()))
        .replace("{{WAIST_CM}}", &escape_html(&page.form.waist_cm))
        .replace("{{NOTE}}", &escape_html(&page.form.note))
        .replace("{{ROWS}}", &table_rows(page.table, prefs))
        .replace("{{PAGINATION}}", &pagination_controls(page.table, prefs))
        .replace("{{UNIT_TOGGLE}}", &unit_toggle(prefs))
        .replace("{{WEIGHT_TOGGLE}}", &orientation_toggle(prefs, ChartTarget::Weight))
        .replace("{{WAIST_TOGGLE}}", &orientation_toggle(prefs, ChartTarget::Waist))
        .replace("{{WEIGHT_LAYOUT}}", layout_class(prefs.orientation.weight))
        .replace("{{WAIST_LAYOUT}}", layout_class(prefs.orientation.waist))
        .replace("{{CHART_SCRIPT}}", &charts_script(&[
            ("weight-chart", page.weight_chart),
            ("waist-chart", page.waist_chart),
        ]))
}

pub fn render_chart_page(options: &str) -> String {
    CHART_HTML.replace("{{CHART_SCRIPT}}", &charts_script(&[("line-chart", Some(options))]))
}

fn table_rows(table: &TableView, prefs: Prefs) -> String {
    if table.is_empty() {
        return r#"<tr><td colspan="5" class="empty">no entries yet</td></tr>"#.to_string();
    }

    table
        .rows
        .iter()
        .map(|row| {
            format!(
                r#"<tr><td><a href="{}&amp;edit={}">{}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                prefs.href(),
                row.index,
                escape_html(&row.date),
                row.weight_kg,
                row.weight_jin,
                row.waist_cm,
                escape_html(&row.note)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn pagination_controls(table: &TableView, prefs: Prefs) -> String {
    let button = |label: &str, enabled: bool, page: u64| {
        if enabled {
            let target = Prefs { page, ..prefs };
            format!(r#"<a class="pager" href="{}">{label}</a>"#, target.href())
        } else {
            format!(r#"<span class="pager disabled">{label}</span>"#)
        }
    };

    format!(
        r#"{}<span id="pagination-summary">{}</span>{}"#,
        button("Previous", table.controls.prev_enabled, prefs.page.saturating_sub(1)),
        escape_html(&table.controls.summary),
        button("Next", table.controls.next_enabled, prefs.page + 1),
    )
}

fn unit_toggle(prefs: Prefs) -> String {
    [WeightUnit::Jin, WeightUnit::Kg]
        .into_iter()
        .map(|unit| {
            let target = Prefs { unit, ..prefs };
            format!(
                r#"<a class="tab{}" href="{}">{unit}</a>"#,
                active(prefs.unit == unit),
                target.href()
            )
        })
        .collect()
}

fn orientation_toggle(prefs: Prefs, chart: ChartTarget) -> String {
    [Orientation::Vertical, Orientation::Horizontal]
        .into_iter()
        .map(|orientation| {
            let mut target = prefs;
            target.orientation.set(chart, orientation);
            format!(
                r#"<a class="tab{}" href="{}">{}</a>"#,
                active(prefs.orientation.get(chart) == orientation),
                target.href(),
                orientation.as_str()
            )
        })
        .collect()
}

fn active(is_active: bool) -> &'static str {
    if is_active { " active" } else { "" }
}

fn layout_class(orientation: Orientation) -> &'static str {
    match orientation {
        Orientation::Vertical => "chart-card",
        Orientation::Horizontal => "chart-card chart-horizontal",
    }
}

fn charts_script(charts: &[(&str, Option<&str>)]) -> String {
    let inits = charts
        .iter()
        .filter_map(|(id, options)| options.map(|options| (id, options)))
        .map(|(id, options)| {
            format!(
                r#"(function() {{
        const dom = document.getElementById("{id}");
        if (!dom || typeof echarts === "undefined") {{ return; }}
        const chart = echarts.init(dom);
        chart.setOption({options});
        window.addEventListener("resize", chart.resize);
      }})();"#
            )
        })
        .collect::<Vec<_>>()
        .join("\n      ");

    format!("document.addEventListener(\"DOMContentLoaded\", function() {{\n      {inits}\n    }});")
}

const STYLE: &str = r#"
    :root {
      --bg-1: #f3f6f4;
      --ink: #2b2a28;
      --accent: #4e73df;
      --accent-2: #36b9cc;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }
    * { box-sizing: border-box; }
    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), #e6eef7 60%, #f6f8fb 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }
    .app {
      width: min(960px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }
    h1 { margin: 0; font-size: clamp(1.8rem, 4vw, 2.4rem); }
    h2 { margin: 0; font-size: 1.3rem; }
    form { display: grid; grid-template-columns: repeat(auto-fit, minmax(160px, 1fr)); gap: 12px; align-items: end; }
    label { display: grid; gap: 6px; font-size: 0.85rem; color: #6b645d; }
    input { padding: 10px 12px; border-radius: 12px; border: 1px solid rgba(47, 72, 88, 0.2); font: inherit; }
    button { border: none; border-radius: 999px; padding: 12px 20px; font: inherit; font-weight: 600; background: var(--accent); color: white; cursor: pointer; }
    table { width: 100%; border-collapse: collapse; }
    th, td { padding: 8px 10px; text-align: left; border-bottom: 1px solid rgba(47, 72, 88, 0.08); }
    td.empty { text-align: center; color: #8b857d; padding: 24px; }
    .pagination { display: flex; gap: 12px; align-items: center; justify-content: flex-end; }
    .pager { color: var(--accent); text-decoration: none; font-weight: 600; }
    .pager.disabled { color: #b8b2aa; }
    .tabs { display: flex; gap: 6px; padding: 6px; background: rgba(47, 72, 88, 0.08); border-radius: 999px; width: fit-content; }
    .tab { padding: 6px 12px; border-radius: 999px; color: #6b645d; text-decoration: none; font-size: 0.9rem; }
    .tab.active { background: white; color: var(--ink); }
    .chart-header { display: flex; flex-wrap: wrap; justify-content: space-between; gap: 12px; align-items: center; }
    .chart-card { background: white; border-radius: 20px; padding: 16px; height: 320px; }
    .chart-card.chart-horizontal { height: 520px; }
    .chart-card > div { width: 100%; height: 100%; }
    .status { min-height: 1.2em; color: #6b645d; }
    .status[data-type="error"] { color: #c63b2b; }
    .status[data-type="success"] { color: #2d7a4b; }
"#;

const TRACKER_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Weight &amp; Waist Tracker</title>
  <script src="https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js"></script>
  <style>{{STYLE}}  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Weight &amp; Waist Tracker</h1>
    </header>

    <section>
      <form id="entry-form" method="post" action="/entries">
        {{PREF_FIELDS}}
        <label>Date <input type="date" name="date" value="{{DATE}}" required /></label>
        <label>Weight (jin) <input type="number" step="0.1" name="weightJin" value="{{WEIGHT_JIN}}" required /></label>
        <label>Weight (kg) <input type="text" value="{{KG_PREVIEW}}" readonly /></label>
        <label>Waist (cm) <input type="number" step="0.1" name="waistCm" value="{{WAIST_CM}}" /></label>
        <label>Note <input type="text" name="note" value="{{NOTE}}" /></label>
        <button type="submit">Save</button>
      </form>
      <p class="status" id="form-status" data-type="{{STATUS_TONE}}">{{STATUS}}</p>
    </section>

    <section>
      <h2>Entries</h2>
      <table>
        <thead><tr><th>Date</th><th>Weight (kg)</th><th>Weight (jin)</th><th>Waist (cm)</th><th>Note</th></tr></thead>
        <tbody id="entry-table-body">
{{ROWS}}
        </tbody>
      </table>
      <div class="pagination">{{PAGINATION}}</div>
    </section>

    <section>
      <div class="chart-header">
        <h2>Weight</h2>
        <div class="tabs">{{UNIT_TOGGLE}}</div>
        <div class="tabs">{{WEIGHT_TOGGLE}}</div>
      </div>
      <div class="{{WEIGHT_LAYOUT}}"><div id="weight-chart"></div></div>
    </section>

    <section>
      <div class="chart-header">
        <h2>Waist</h2>
        <div class="tabs">{{WAIST_TOGGLE}}</div>
      </div>
      <div class="{{WAIST_LAYOUT}}"><div id="waist-chart"></div></div>
    </section>
  </main>

  <script>
    {{CHART_SCRIPT}}
  </script>
</body>
</html>
"#;

const CHART_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Line Chart</title>
  <script src="https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js"></script>
  <style>
    body { margin: 0; font-family: "Space Grotesk", "Trebuchet MS", sans-serif; padding: 32px; }
    #line-chart { width: 100%; height: 420px; }
  </style>
</head>
<body>
  <div id="line-chart"></div>
  <script>
    {{CHART_SCRIPT}}
  </script>
</body>
</html>
"#;
