use crate::log::{date_key, day_report, daily_totals, days};
use crate::models::{DAILY_TARGET, DayReport, Exercise, LogRow, SetEntry};
use crate::session::TimerSession;
use chrono::NaiveDate;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    Progress,
    Timer,
    #[default]
    Today,
}

impl Tab {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("progress") => Tab::Progress,
            Some("timer") => Tab::Timer,
            _ => Tab::Today,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Tab::Progress => "progress",
            Tab::Timer => "timer",
            Tab::Today => "today",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Tab::Progress => "Progress",
            Tab::Timer => "Timer",
            Tab::Today => "Today's workout",
        }
    }
}

/// One-shot message shown after a form submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    SetAdded {
        exercise: Exercise,
        set_index: u32,
        reps: u32,
    },
    TimerStarted,
    TimerIdle,
    DurationRecorded(u32),
    DurationKept(u32),
    DurationLost(u32),
    InvalidInput,
    StoreUnavailable,
}

impl Notice {
    fn text(&self) -> (String, &'static str) {
        match self {
            Notice::SetAdded {
                exercise,
                set_index,
                reps,
            } => (format!("Set {set_index} added: {reps} {exercise}"), "ok"),
            Notice::TimerStarted => ("Timer started.".to_string(), "ok"),
            Notice::TimerIdle => ("Timer not started!".to_string(), "warn"),
            Notice::DurationRecorded(minutes) => {
                (format!("Workout recorded: {minutes} minutes."), "ok")
            }
            Notice::DurationKept(minutes) => (
                format!("Today's duration was already recorded; {minutes} minutes not saved."),
                "warn",
            ),
            Notice::DurationLost(minutes) => (
                format!("No set logged today yet, so {minutes} minutes could not be saved."),
                "error",
            ),
            Notice::InvalidInput => (
                "Invalid input: reps must be a whole number of at least 1. Nothing was saved.".to_string(),
                "warn",
            ),
            Notice::StoreUnavailable => (
                "Could not reach the workout store; nothing was saved. Try again.".to_string(),
                "error",
            ),
        }
    }
}

pub struct PageView<'a> {
    pub today: NaiveDate,
    pub tab: Tab,
    pub selected_day: Option<NaiveDate>,
    pub timer: TimerSession,
    pub notice: Option<Notice>,
    pub rows: Result<&'a [LogRow], String>,
}

pub fn render_index(view: &PageView<'_>) -> String {
    let rows: &[LogRow] = view.rows.as_ref().map(|rows| *rows).unwrap_or(&[]);
    let panel = match view.tab {
        Tab::Progress => render_progress(view, rows),
        Tab::Timer => render_timer(view),
        Tab::Today => render_today(view.today, rows),
    };

    INDEX_HTML
        .replace("{{CONNECTION}}", &render_connection(&view.rows))
        .replace("{{TABS}}", &render_tabs(view))
        .replace("{{NOTICE}}", &render_notice(view.notice.as_ref()))
        .replace("{{PANEL}}", &panel)
}

fn render_connection(rows: &Result<&[LogRow], String>) -> String {
    let (message, kind) = match rows {
        Err(err) => (format!("Connection error: {}", escape_html(err)), "error"),
        Ok(rows) if rows.is_empty() => (
            "Store connected, but there is no data yet!".to_string(),
            "warn",
        ),
        Ok(_) => ("Store connected and data loaded.".to_string(), "ok"),
    };
    format!(r#"<div class="banner" data-type="{kind}">{message}</div>"#)
}

fn render_notice(notice: Option<&Notice>) -> String {
    match notice {
        Some(notice) => {
            let (message, kind) = notice.text();
            format!(r#"<div class="status" data-type="{kind}">{}</div>"#, escape_html(&message))
        }
        None => String::new(),
    }
}

fn href(tab: Tab, timer: &TimerSession, day: Option<NaiveDate>) -> String {
    let mut url = format!("/?tab={}", tab.key());
    if let Some(day) = day {
        let _ = write!(url, "&day={}", date_key(day));
    }
    if let Some(started_at) = timer.started_at {
        let _ = write!(url, "&started_at={started_at}");
    }
    url
}

fn render_tabs(view: &PageView<'_>) -> String {
    [Tab::Progress, Tab::Timer, Tab::Today]
        .iter()
        .map(|tab| {
            let class = if *tab == view.tab { "tab active" } else { "tab" };
            format!(
                r#"<a class="{class}" href="{}" role="tab">{}</a>"#,
                href(*tab, &view.timer, None),
                tab.label()
            )
        })
        .collect()
}

fn render_progress(view: &PageView<'_>, rows: &[LogRow]) -> String {
    let dates = days(rows);
    let Some(newest) = dates.first().copied() else {
        return r#"<h2>Your progress</h2><p class="hint">Nothing recorded yet.</p>"#.to_string();
    };
    let selected = view
        .selected_day
        .filter(|day| dates.contains(day))
        .unwrap_or(newest);

    let mut picker = String::new();
    for date in &dates {
        let totals = daily_totals(rows, *date);
        let mut class = String::from("day");
        class.push_str(if totals.is_complete() { " complete" } else { " partial" });
        if *date == selected {
            class.push_str(" selected");
        }
        let _ = write!(
            picker,
            r#"<a class="{class}" href="{}">{}</a>"#,
            href(Tab::Progress, &view.timer, Some(*date)),
            date.format("%b %d")
        );
    }

    let report = day_report(rows, selected);
    let minutes = report
        .total_minutes
        .map(|minutes| minutes.to_string())
        .unwrap_or_else(|| "Not recorded".to_string());

    format!(
        r#"<h2>Your progress</h2>
<div class="days">{picker}</div>
<section class="panel">
  <div class="stat"><span class="label">Day</span><span class="value">{date}</span></div>
  <div class="stat"><span class="label">Total time (minutes)</span><span class="value">{minutes}</span></div>
</section>
<section class="columns">
  <div>{pushups}</div>
  <div>{squats}</div>
</section>"#,
        date = report.date,
        pushups = sets_table(Exercise::Pushup, &report),
        squats = sets_table(Exercise::Squat, &report),
    )
}

fn sets_table(exercise: Exercise, report: &DayReport) -> String {
    let sets: &[SetEntry] = match exercise {
        Exercise::Pushup => &report.pushup_sets,
        Exercise::Squat => &report.squat_sets,
    };
    let mut body = String::new();
    for set in sets {
        let _ = write!(body, "<tr><td>{}</td><td>{}</td></tr>", set.set_index, set.reps);
    }
    if sets.is_empty() {
        body.push_str(r#"<tr><td colspan="2" class="hint">No sets</td></tr>"#);
    }
    format!(
        "<h3>{exercise}</h3><table><thead><tr><th>Set</th><th>Reps</th></tr></thead><tbody>{body}</tbody></table>"
    )
}

fn render_timer(view: &PageView<'_>) -> String {
    let (display, hidden) = match view.timer.started_at {
        Some(started_at) => (
            format!(r#"<span id="elapsed" class="value" data-started-at="{started_at}">00:00</span>"#),
            format!(r#"<input type="hidden" name="started_at" value="{started_at}" />"#),
        ),
        None => (
            r#"<span class="value">Not running</span>"#.to_string(),
            String::new(),
        ),
    };

    format!(
        r#"<h2>Workout timer</h2>
<div class="stat"><span class="label">Elapsed</span>{display}</div>
<section class="actions">
  <form method="post" action="/timer/start"><button class="btn-primary" type="submit">Start timer</button></form>
  <form method="post" action="/timer/stop">{hidden}<button class="btn-secondary" type="submit">Stop timer</button></form>
</section>"#
    )
}

fn render_today(today: NaiveDate, rows: &[LogRow]) -> String {
    let report = day_report(rows, today);
    let totals = daily_totals(rows, today);
    let banner = if totals.is_complete() {
        format!(
            r#"<div class="banner" data-type="ok">Challenge day complete: {DAILY_TARGET} pushups and {DAILY_TARGET} squats done!</div>"#
        )
    } else {
        String::new()
    };
    let options: String = Exercise::ALL
        .iter()
        .map(|exercise| format!(r#"<option value="{exercise}">{exercise}</option>"#))
        .collect();

    format!(
        r#"<h2>Today's workout ({date})</h2>
<section class="panel">
  <div class="stat"><span class="label">Pushups today</span><span class="value">{pushup}/{DAILY_TARGET}</span></div>
  <div class="stat"><span class="label">Squats today</span><span class="value">{squat}/{DAILY_TARGET}</span></div>
</section>
{banner}
<form class="set-form" method="post" action="/sets">
  <label>Exercise <select name="exercise">{options}</select></label>
  <label>Reps <input type="number" name="reps" min="1" step="1" value="10" required /></label>
  <button class="btn-primary" type="submit">Add set</button>
</form>
<h2>Today's sets</h2>
<section class="columns">
  <div>{pushups}</div>
  <div>{squats}</div>
</section>"#,
        date = date_key(today),
        pushup = totals.pushup,
        squat = totals.squat,
        pushups = sets_table(Exercise::Pushup, &report),
        squats = sets_table(Exercise::Squat, &report),
    )
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>100 Challenge - Pushups &amp; Squats</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    h1 {
      font-family: "Georgia", serif;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    .tabs {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: rgba(47, 72, 88, 0.08);
      border-radius: 999px;
    }

    .tab {
      border-radius: 999px;
      padding: 8px 14px;
      font-weight: 600;
      color: #6b645d;
      text-decoration: none;
    }

    .tab.active {
      background: white;
      color: var(--accent-2);
    }

    .panel, .columns, .actions {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .days {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
    }

    .day {
      padding: 6px 12px;
      border-radius: 12px;
      text-decoration: none;
      color: var(--ink);
      background: white;
    }

    .day.complete { border: 2px solid #2d7a4b; }
    .day.partial { border: 2px solid #d9a441; }
    .day.selected { background: var(--accent-2); color: white; }

    table {
      width: 100%;
      border-collapse: collapse;
      background: white;
      border-radius: 12px;
    }

    th, td {
      padding: 8px 12px;
      text-align: left;
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 14px 20px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      color: white;
    }

    .btn-primary { background: var(--accent); }
    .btn-secondary { background: var(--accent-2); }

    .set-form {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      align-items: end;
    }

    .banner, .status {
      padding: 12px 16px;
      border-radius: 14px;
      background: white;
    }

    [data-type="error"] { color: #c63b2b; }
    [data-type="warn"] { color: #a86b00; }
    [data-type="ok"] { color: #2d7a4b; }

    .hint {
      color: #6f6a65;
      font-size: 0.9rem;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>100 Challenge - Pushups &amp; Squats</h1>
    </header>
    {{CONNECTION}}
    <nav class="tabs" role="tablist">{{TABS}}</nav>
    {{NOTICE}}
    <section class="content">
{{PANEL}}
    </section>
  </main>

  <script>
    const elapsedEl = document.getElementById('elapsed');
    if (elapsedEl) {
      const startedAt = Number(elapsedEl.dataset.startedAt) * 1000;
      const pad = (value) => String(value).padStart(2, '0');
      const tick = () => {
        const seconds = Math.max(0, Math.floor((Date.now() - startedAt) / 1000));
        elapsedEl.textContent = `${pad(Math.floor(seconds / 60))}:${pad(seconds % 60)}`;
      };
      tick();
      setInterval(tick, 1000);
    }
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::parse_row;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rows(cells: &[[&str; 5]]) -> Vec<LogRow> {
        cells
            .iter()
            .map(|row| parse_row(&row.iter().map(|cell| cell.to_string()).collect()).unwrap())
            .collect()
    }

    fn view<'a>(tab: Tab, rows: Result<&'a [LogRow], String>) -> PageView<'a> {
        PageView {
            today: day(2025, 4, 27),
            tab,
            selected_day: None,
            timer: TimerSession::default(),
            notice: None,
            rows,
        }
    }

    #[test]
    fn today_tab_shows_totals_and_completion() {
        let data = rows(&[
            ["2025-04-27", "Pushup", "1", "100", ""],
            ["2025-04-27", "Squat", "1", "60", ""],
            ["2025-04-27", "Squat", "2", "40", ""],
        ]);
        let html = render_index(&view(Tab::Today, Ok(data.as_slice())));
        assert!(html.contains("100/100"));
        assert!(html.contains("Challenge day complete"));
        assert!(html.contains("Store connected and data loaded."));
    }

    #[test]
    fn today_tab_lists_sets_per_exercise_in_set_order() {
        let data = rows(&[
            ["2025-04-26", "Pushup", "1", "99", ""],
            ["2025-04-27", "Squat", "1", "25", ""],
            ["2025-04-27", "Pushup", "1", "37", ""],
            ["2025-04-27", "Pushup", "2", "41", ""],
        ]);
        let html = render_index(&view(Tab::Today, Ok(data.as_slice())));
        assert!(html.contains("Today's sets"));
        let pushups = html.find("<h3>Pushup</h3>").expect("pushup table");
        let squats = html.find("<h3>Squat</h3>").expect("squat table");
        assert!(pushups < squats);
        let first = html.find("<tr><td>1</td><td>37</td></tr>").expect("first pushup set");
        let second = html.find("<tr><td>2</td><td>41</td></tr>").expect("second pushup set");
        assert!(first < second && second < squats);
        assert!(html.contains("<tr><td>1</td><td>25</td></tr>"));
        assert!(!html.contains("<td>99</td>"));
    }

    #[test]
    fn connection_failure_renders_an_escaped_banner() {
        let html = render_index(&view(Tab::Progress, Err("<offline>".to_string())));
        assert!(html.contains("Connection error: &lt;offline&gt;"));
        assert!(html.contains("Nothing recorded yet."));
    }

    #[test]
    fn progress_defaults_to_the_newest_day() {
        let data = rows(&[
            ["2025-04-26", "Pushup", "1", "11", "30"],
            ["2025-04-27", "Squat", "1", "22", ""],
        ]);
        let html = render_index(&view(Tab::Progress, Ok(data.as_slice())));
        assert!(html.contains(r#"<span class="value">2025-04-27</span>"#));
        assert!(html.contains("Not recorded"));

        let mut older = view(Tab::Progress, Ok(data.as_slice()));
        older.selected_day = Some(day(2025, 4, 26));
        let html = render_index(&older);
        assert!(html.contains(r#"<span class="value">30</span>"#));
        assert!(html.contains("<td>11</td>"));
    }

    #[test]
    fn running_timer_is_carried_in_links_and_stop_form() {
        let mut running = view(Tab::Timer, Ok(&[][..]));
        running.timer = TimerSession::start(1_714_200_000);
        let html = render_index(&running);
        assert!(html.contains(r#"data-started-at="1714200000""#));
        assert!(html.contains(r#"name="started_at" value="1714200000""#));
        assert!(html.contains("/?tab=today&started_at=1714200000"));
    }

    #[test]
    fn notices_render_with_their_kind() {
        let mut page = view(Tab::Timer, Ok(&[][..]));
        page.notice = Some(Notice::DurationLost(12));
        let html = render_index(&page);
        assert!(html.contains(r#"data-type="error">No set logged today yet, so 12 minutes"#));
    }
}
