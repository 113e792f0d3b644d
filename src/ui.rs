use crate::models::{DailyRecord, DashboardView, Notice, NoticeScope};
use crate::range::TimeRange;

pub fn render_index(view: &DashboardView, countries: &[String]) -> String {
    INDEX_HTML
        .replace("{{COUNTRY}}", &escape_html(&view.country))
        .replace("{{COUNTRY_OPTIONS}}", &country_options(countries, &view.country))
        .replace("{{RANGE_OPTIONS}}", &range_options(view.range))
        .replace("{{NOTICE}}", &notice_block(view.error.as_ref()))
        .replace("{{TOTAL_CASES}}", &format_number(view.summary.total_cases))
        .replace("{{NEW_CASES}}", &format_number(view.summary.new_cases))
        .replace("{{TOTAL_DEATHS}}", &format_number(view.summary.total_deaths))
        .replace("{{NEW_DEATHS}}", &format_number(view.summary.new_deaths))
        .replace("{{CFR}}", &format!("{:.2}", view.summary.case_fatality_rate))
        .replace("{{RECENT_ROWS}}", &recent_rows(&view.recent))
        .replace("{{SUGGESTIONS}}", &suggestions(&view.country, &view.suggestions))
        .replace("{{SOURCE}}", &escape_html(view.source.as_deref().unwrap_or("none")))
}

/// Compact form used on cards: `1.2M`, `45.3K`, or the plain number.
pub fn format_number(value: i64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1_000_000 {
        format!("{:.1}M", value as f64 / 1_000_000.0)
    } else if magnitude >= 1_000 {
        format!("{:.1}K", value as f64 / 1_000.0)
    } else {
        value.to_string()
    }
}

/// Escapes markup and template braces so substituted text can never be read
/// as a later `{{PLACEHOLDER}}`.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '{' => escaped.push_str("&#123;"),
            '}' => escaped.push_str("&#125;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn country_options(countries: &[String], selected: &str) -> String {
    if countries.is_empty() {
        return r#"<option value="">Loading countries...</option>"#.to_string();
    }
    countries
        .iter()
        .map(|country| {
            let name = escape_html(country);
            let marker = if country == selected { " selected" } else { "" };
            format!(r#"<option value="{name}"{marker}>{name}</option>"#)
        })
        .collect()
}

fn range_options(current: TimeRange) -> String {
    TimeRange::ALL
        .iter()
        .map(|range| {
            let marker = if *range == current { " selected" } else { "" };
            format!(
                r#"<option value="{}"{marker}>{}</option>"#,
                range.as_str(),
                range.label()
            )
        })
        .collect()
}

fn notice_block(notice: Option<&Notice>) -> String {
    let Some(notice) = notice else {
        return String::new();
    };
    let scope = match notice.scope {
        NoticeScope::Countries => "countries",
        NoticeScope::Series => "series",
    };
    format!(
        r#"<div class="notice" data-scope="{scope}"><p>{}</p><button id="retry" type="button">Retry</button></div>"#,
        escape_html(&notice.message)
    )
}

fn recent_rows(recent: &[DailyRecord]) -> String {
    recent
        .iter()
        .map(|day| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&day.date),
                day.new_cases,
                day.total_cases,
                day.new_deaths,
                day.total_deaths
            )
        })
        .collect()
}

fn suggestions(country: &str, suggested: &[String]) -> String {
    if suggested.is_empty() {
        return String::new();
    }
    let buttons: String = suggested
        .iter()
        .map(|name| {
            let name = escape_html(name);
            format!(
                r#"<form method="post" action="/select"><input type="hidden" name="country" value="{name}" /><button class="suggestion" type="submit">{name}</button></form>"#
            )
        })
        .collect();
    format!(
        r#"<section class="no-data"><h3>No data available for {}</h3><p>Try a different country or time range. Countries with good coverage:</p><div class="suggestions">{buttons}</div></section>"#,
        escape_html(country)
    )
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>COVID-19 Data Analyzer</title>
  <style>
    :root {
      --bg-1: #eef3f8;
      --ink: #1f2a36;
      --accent: #e4572e;
      --accent-2: #29335c;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(41, 51, 92, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), #dde7f2 60%, #f4f7fb 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(980px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      font-family: "Georgia", serif;
      margin: 0;
    }

    .controls {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      align-items: end;
    }

    .controls label {
      display: grid;
      gap: 4px;
      font-size: 0.85rem;
      color: #5b6673;
    }

    select, input, button {
      font: inherit;
      border-radius: 12px;
      border: 1px solid rgba(41, 51, 92, 0.2);
      padding: 8px 12px;
    }

    button {
      background: var(--accent-2);
      color: white;
      cursor: pointer;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(41, 51, 92, 0.08);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #7b8591;
    }

    .stat .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .stat .change {
      color: var(--accent);
    }

    .notice {
      background: #fdecea;
      color: #a1251b;
      border-radius: 16px;
      padding: 12px 18px;
      display: flex;
      justify-content: space-between;
      align-items: center;
    }

    .tabs {
      display: flex;
      flex-wrap: wrap;
      gap: 6px;
    }

    .tab {
      background: transparent;
      color: var(--accent-2);
    }

    .tab.active {
      background: var(--accent-2);
      color: white;
    }

    #chart {
      width: 100%;
      height: 280px;
      background: white;
      border-radius: 20px;
    }

    .chart-line { fill: none; stroke: var(--accent); stroke-width: 2.5; }
    .chart-line.second { stroke: var(--accent-2); }
    .chart-grid { stroke: rgba(41, 51, 92, 0.12); }
    .chart-label { fill: #7b8591; font-size: 11px; }
    .chart-bar { fill: var(--accent); }
    .chart-bar.second { fill: var(--accent-2); }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th, td {
      text-align: right;
      padding: 6px 10px;
      border-bottom: 1px solid rgba(41, 51, 92, 0.08);
    }

    th:first-child, td:first-child {
      text-align: left;
    }

    .suggestions {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
    }

    footer {
      color: #7b8591;
      font-size: 0.85rem;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>COVID-19 Data Analyzer</h1>
      <p class="subtitle">Daily cases and deaths for <strong>{{COUNTRY}}</strong>.</p>
    </header>

    <form class="controls" method="post" action="/select">
      <label>Country
        <select name="country">{{COUNTRY_OPTIONS}}</select>
      </label>
      <label>Time range
        <select name="range">{{RANGE_OPTIONS}}</select>
      </label>
      <button type="submit">Show</button>
    </form>

    {{NOTICE}}

    <section class="panel">
      <div class="stat">
        <span class="label">Total cases</span>
        <span class="value">{{TOTAL_CASES}}</span>
        <span class="change">+{{NEW_CASES}} new</span>
      </div>
      <div class="stat">
        <span class="label">Total deaths</span>
        <span class="value">{{TOTAL_DEATHS}}</span>
        <span class="change">+{{NEW_DEATHS}} new</span>
      </div>
      <div class="stat">
        <span class="label">Case fatality rate</span>
        <span class="value">{{CFR}}%</span>
      </div>
    </section>

    <section>
      <div class="tabs" role="tablist">
        <button class="tab active" type="button" data-tab="trends">Daily trends</button>
        <button class="tab" type="button" data-tab="cumulative">Cumulative</button>
        <button class="tab" type="button" data-tab="weekly">Weekly averages</button>
        <button class="tab" type="button" data-tab="distribution">Distribution</button>
        <button class="tab" type="button" data-tab="growth">Growth rate</button>
        <button class="tab" type="button" data-tab="trend">Trend analysis</button>
      </div>
      <svg id="chart" viewBox="0 0 640 280" role="img" aria-label="Chart"></svg>
    </section>

    {{SUGGESTIONS}}

    <section>
      <h3>Recent data</h3>
      <table>
        <thead>
          <tr><th>Date</th><th>New cases</th><th>Total cases</th><th>New deaths</th><th>Total deaths</th></tr>
        </thead>
        <tbody>{{RECENT_ROWS}}</tbody>
      </table>
    </section>

    <footer>
      <p>Data source: Our World in Data COVID-19 dataset (served by {{SOURCE}}).</p>
    </footer>
  </main>

  <script>
    const chartEl = document.getElementById('chart');
    const tabs = Array.from(document.querySelectorAll('.tab'));
    let view = null;
    let activeTab = 'trends';

    const renderLines = (labels, series) => {
      const width = 640;
      const height = 280;
      const padX = 48;
      const padY = 32;
      const values = series.flatMap((line) => line.values);
      if (!values.length) {
        chartEl.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data</text>';
        return;
      }
      let min = Math.min(0, ...values);
      let max = Math.max(0, ...values);
      if (min === max) {
        max += 1;
      }
      const xStep = labels.length > 1 ? (width - padX * 2) / (labels.length - 1) : 0;
      const x = (i) => padX + i * xStep;
      const y = (v) => height - padY - ((v - min) / (max - min)) * (height - padY * 2);

      let grid = '';
      for (let i = 0; i <= 4; i += 1) {
        const value = min + ((max - min) * i) / 4;
        grid += `<line class="chart-grid" x1="${padX}" y1="${y(value)}" x2="${width - padX}" y2="${y(value)}" />`;
        grid += `<text class="chart-label" x="${padX - 6}" y="${y(value) + 4}" text-anchor="end">${Math.round(value)}</text>`;
      }
      const every = Math.max(1, Math.floor(labels.length / 8));
      const xLabels = labels
        .map((label, i) => (i % every === 0
          ? `<text class="chart-label" x="${x(i)}" y="${height - 10}" text-anchor="middle">${label}</text>`
          : ''))
        .join('');
      const paths = series
        .map((line, n) => {
          const d = line.values.map((v, i) => `${i === 0 ? 'M' : 'L'} ${x(i).toFixed(2)} ${y(v).toFixed(2)}`).join(' ');
          return `<path class="chart-line ${n ? 'second' : ''}" d="${d}" />`;
        })
        .join('');
      chartEl.innerHTML = grid + paths + xLabels;
    };

    const renderBars = (slices) => {
      const total = slices.reduce((acc, slice) => acc + slice.value, 0);
      if (!total) {
        chartEl.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data</text>';
        return;
      }
      chartEl.innerHTML = slices
        .map((slice, i) => {
          const share = slice.value / total;
          const w = Math.max(2, share * 520);
          return `<rect class="chart-bar ${i ? 'second' : ''}" x="60" y="${70 + i * 90}" width="${w}" height="50" rx="8" />`
            + `<text class="chart-label" x="60" y="${60 + i * 90}">${slice.name}: ${(share * 100).toFixed(1)}%</text>`;
        })
        .join('');
    };

    const renderMetrics = (metrics) => {
      const step = 220 / Math.max(1, metrics.length);
      chartEl.innerHTML = metrics
        .map((metric, i) => {
          const w = Math.max(2, (Math.min(100, metric.value) / 100) * 440);
          const top = 30 + i * step;
          return `<text class="chart-label" x="130" y="${top + step / 2}" text-anchor="end">${metric.subject}</text>`
            + `<rect class="chart-bar ${i % 2 ? 'second' : ''}" x="140" y="${top + 4}" width="${w}" height="${step - 12}" rx="6" />`
            + `<text class="chart-label" x="${148 + w}" y="${top + step / 2}">${metric.value.toFixed(2)}</text>`;
        })
        .join('');
    };

    const render = () => {
      if (!view) {
        return;
      }
      const dates = view.series.map((day) => day.date.slice(5));
      if (activeTab === 'cumulative') {
        renderLines(dates, [
          { values: view.series.map((day) => day.total_cases) },
          { values: view.series.map((day) => day.total_deaths) }
        ]);
      } else if (activeTab === 'weekly') {
        renderLines(view.weekly.map((week) => week.week.replace('Week ', 'W')), [
          { values: view.weekly.map((week) => week.avg_new_cases) },
          { values: view.weekly.map((week) => week.avg_new_deaths) }
        ]);
      } else if (activeTab === 'distribution') {
        renderBars(view.distribution);
      } else if (activeTab === 'trend') {
        renderMetrics(view.trend);
      } else if (activeTab === 'growth') {
        renderLines(view.growth.map((point) => point.date.slice(5)), [
          { values: view.growth.map((point) => point.growth_rate) }
        ]);
      } else {
        renderLines(dates, [
          { values: view.series.map((day) => day.new_cases) },
          { values: view.series.map((day) => day.new_deaths) }
        ]);
      }
    };

    const load = async () => {
      const res = await fetch('/api/dashboard');
      if (res.ok) {
        view = await res.json();
        render();
      }
    };

    tabs.forEach((button) => {
      button.addEventListener('click', () => {
        activeTab = button.dataset.tab;
        tabs.forEach((tab) => tab.classList.toggle('active', tab === button));
        render();
      });
    });

    const retry = document.getElementById('retry');
    if (retry) {
      retry.addEventListener('click', async () => {
        await fetch('/api/retry', { method: 'POST' });
        window.location.reload();
      });
    }

    load();
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::DashboardState;
    use crate::stats::build_view;

    #[test]
    fn formats_large_numbers() {
        assert_eq!(format_number(950), "950");
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(45_300), "45.3K");
        assert_eq!(format_number(1_260_000), "1.3M");
        assert_eq!(format_number(-2_000), "-2.0K");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html(r#"<b>"Côte" & co'</b>"#), "&lt;b&gt;&quot;Côte&quot; &amp; co&#39;&lt;/b&gt;");
    }

    #[test]
    fn page_marks_selection_and_notice() {
        let mut state = DashboardState::new("Peru");
        state.countries = vec!["India".into(), "Peru".into()];
        state.range = TimeRange::SixMonths;
        state.error = Some(Notice {
            scope: NoticeScope::Series,
            message: "No data available for Peru".into(),
        });

        let html = render_index(&build_view(&state), &state.countries);
        assert!(html.contains(r#"<option value="Peru" selected>Peru</option>"#));
        assert!(html.contains(r#"<option value="6m" selected>Last 6 months</option>"#));
        assert!(html.contains(r#"data-scope="series""#));
        assert!(html.contains("No data available for Peru"));
        assert!(html.contains(r#"value="India""#));
        assert!(!html.contains("{{"));
        assert!(html.contains(r#"data-tab="trend""#));
    }

    #[test]
    fn substituted_text_cannot_expand_placeholders() {
        let mut state = DashboardState::new("{{NOTICE}}");
        state.source = Some("{{COUNTRY}}".into());
        state.error = Some(Notice {
            scope: NoticeScope::Series,
            message: "upstream said {{SOURCE}} and {{TOTAL_CASES}}".into(),
        });

        let html = render_index(&build_view(&state), &["{{RECENT_ROWS}}".to_string()]);
        assert!(!html.contains("{{"));
        assert!(html.contains("upstream said &#123;&#123;SOURCE&#125;&#125; and &#123;&#123;TOTAL_CASES&#125;&#125;"));
        assert!(html.contains("served by &#123;&#123;COUNTRY&#125;&#125;"));
        assert!(html.contains(r#"<option value="&#123;&#123;RECENT_ROWS&#125;&#125;">"#));
    }
}
