//! Static HTML rendering of the dashboard.
//!
//! Element ids, classes, and `data-*` attributes are what browser tests and
//! the inline script query. Every interpolated string goes through
//! [`escape_html`].

use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use policywatch_core::dashboard::ACTIVITY_WINDOW_DAYS;
use policywatch_core::platform::platform_icon;
use policywatch_core::timestamp::{format_datetime, format_relative};
use policywatch_core::weekly::WeekDetails;
use policywatch_core::{
    Dashboard, HistoryFilter, Notification, PlatformResolver, SystemStatus, TimelineRange,
};

use crate::markdown::summary_html;

/// (id, label, icon); the first tab is active on load.
const TABS: &[(&str, &str, &str)] = &[
    ("matrix", "Policy Matrix", "fas fa-table"),
    ("weekly", "Weekly Update", "fas fa-calendar-week"),
    ("platforms", "Platforms", "fas fa-layer-group"),
    ("analytics", "Analytics", "fas fa-chart-line"),
];

const MAX_RECENT_CHANGES: usize = 10;
const MAX_HISTORY_ROWS: usize = 20;

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Trust &amp; Safety Policy Watcher</title>
<link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css">
<style>
body { font-family: system-ui, sans-serif; margin: 0; background: #f6f7f9; color: #1f2933; }
.dashboard-header { display: flex; justify-content: space-between; align-items: center; padding: 1rem 2rem; background: #fff; border-bottom: 1px solid #e4e7eb; }
.header-status { display: flex; gap: 1.5rem; align-items: center; }
.status-item { display: flex; flex-direction: column; align-items: center; }
.status-number { font-size: 1.5rem; font-weight: 600; }
.status-label { font-size: .8rem; color: #616e7c; }
.status-item.operational .status-number { color: #0f7b4a; }
.status-item.issues .status-number { color: #c53030; }
.health-alert-banner { background: #fff4e5; border-left: 4px solid #dd6b20; padding: .75rem 2rem; }
.error-notifications { padding: 0 2rem; }
.data-error-notification { background: #fff5f5; border: 1px solid #feb2b2; border-radius: 6px; margin: 1rem 0; padding: .75rem 1rem; }
.error-header { display: flex; gap: .5rem; align-items: center; }
.error-dismiss { margin-left: auto; border: none; background: none; font-size: 1.25rem; cursor: pointer; }
.nav-tabs { display: flex; gap: .5rem; padding: 1rem 2rem 0; }
.nav-tab { border: none; background: #e4e7eb; padding: .5rem 1rem; border-radius: 6px 6px 0 0; cursor: pointer; }
.nav-tab.active { background: #fff; font-weight: 600; }
.tab-content { display: none; background: #fff; margin: 0 2rem 2rem; padding: 1.5rem; }
.tab-content.active { display: block; }
table { border-collapse: collapse; width: 100%; }
th, td { text-align: left; padding: .4rem .6rem; border-bottom: 1px solid #e4e7eb; }
.platform-section td { background: #f0f4f8; font-weight: 600; }
.empty-state { color: #7b8794; font-style: italic; padding: 2rem; text-align: center; }
.policy-card { border: 1px solid #e4e7eb; border-radius: 6px; padding: 1rem; margin-bottom: 1rem; }
.markdown h2, .markdown h3, .markdown h4 { margin: .75rem 0 .25rem; }
.intelligence-panel { display: flex; flex-wrap: wrap; gap: 2rem; margin-bottom: 1.5rem; }
.platform-activity { list-style: none; display: flex; gap: 1rem; padding: 0; }
.success { color: #0f7b4a; } .warning { color: #b7791f; } .error { color: #c53030; }
.trend-up { color: #c53030; } .trend-down { color: #0f7b4a; }
.diagnostic-modal { position: fixed; inset: 0; background: rgba(0, 0, 0, .4); display: flex; align-items: center; justify-content: center; }
.diagnostic-modal[hidden] { display: none; }
.modal-content { background: #fff; padding: 1.5rem; border-radius: 8px; max-width: 720px; width: 90%; max-height: 80vh; overflow: auto; }
</style>
</head>
<body>
"#;

const SCRIPT: &str = r#"<script>
document.querySelectorAll('.nav-tab').forEach(tab => {
  tab.addEventListener('click', () => {
    document.querySelectorAll('.nav-tab').forEach(t => t.classList.toggle('active', t === tab));
    document.querySelectorAll('.tab-content').forEach(c => c.classList.toggle('active', c.id === tab.dataset.tab));
  });
});
document.querySelectorAll('.error-dismiss').forEach(btn => {
  btn.addEventListener('click', () => document.getElementById(btn.dataset.target)?.remove());
});
document.querySelectorAll('.retry-button').forEach(btn => {
  btn.addEventListener('click', () => window.location.reload());
});
document.querySelectorAll('[data-open]').forEach(btn => {
  btn.addEventListener('click', () => { document.getElementById(btn.dataset.open).hidden = false; });
});
document.querySelectorAll('[data-close]').forEach(btn => {
  btn.addEventListener('click', () => { document.getElementById(btn.dataset.close).hidden = true; });
});
document.getElementById('week-selector')?.addEventListener('change', e => {
  document.querySelectorAll('.weekly-week').forEach(week => {
    week.hidden = week.dataset.week !== e.target.value;
  });
});
document.querySelectorAll('.platform-filter').forEach(btn => {
  btn.addEventListener('click', () => {
    const wanted = btn.dataset.platform;
    document.querySelectorAll('.policy-card').forEach(card => {
      card.hidden = wanted !== 'all' && card.dataset.platform !== wanted;
    });
  });
});
(function () {
  const el = document.getElementById('header-status-number');
  let next = Date.parse(el.dataset.nextCheck);
  const interval = parseInt(el.dataset.interval, 10) * 1000;
  if (isNaN(next) || !(interval > 0)) return;
  const pad = n => String(n).padStart(2, '0');
  const format = s => {
    const h = Math.floor(s / 3600), m = Math.floor((s % 3600) / 60), sec = s % 60;
    return h > 0 ? `${h}:${pad(m)}:${pad(sec)}` : `${m}:${pad(sec)}`;
  };
  // A check that passed before the page was opened rolls on to the next slot.
  const rollForward = now => { while (next <= now) next += interval; };
  const render = now => {
    el.textContent = format(Math.max(1, Math.ceil((next - now) / 1000)));
  };
  rollForward(Date.now());
  render(Date.now());
  const timer = setInterval(() => {
    const now = Date.now();
    if (now >= next) {
      clearInterval(timer);
      rollForward(now);
      render(now);
      window.location.reload();
      return;
    }
    render(now);
  }, 1000);
})();
</script>
"#;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON that cannot close the surrounding `<script>` element.
fn script_json(value: &serde_json::Value) -> serde_json::Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// Render the whole dashboard as one self-contained page.
pub fn render_page(dashboard: &Dashboard, now: DateTime<Utc>) -> anyhow::Result<String> {
    let mut out = String::from(HEAD);
    write_header(&mut out, dashboard, now)?;
    write_health_banner(&mut out, dashboard, now)?;
    write_notifications(&mut out, dashboard.notifications().active())?;
    write_tabs(&mut out)?;
    out.push_str("<main>\n");
    write_matrix(&mut out, dashboard, now)?;
    write_weekly(&mut out, dashboard)?;
    write_platforms(&mut out, dashboard, now)?;
    write_analytics(&mut out, dashboard, now)?;
    out.push_str("</main>\n");
    write_diagnostics(&mut out, dashboard, now)?;

    let snapshot = script_json(&dashboard.introspection(now))?;
    writeln!(out, "<script>window.dashboardInstance = {snapshot};</script>")?;
    out.push_str(SCRIPT);
    out.push_str("</body>\n</html>\n");
    Ok(out)
}

// ── Header ──

fn write_header(out: &mut String, dashboard: &Dashboard, now: DateTime<Utc>) -> anyhow::Result<()> {
    let status = dashboard.status(now);
    let (next_check, interval) = match &status {
        SystemStatus::Operational { .. } => (
            dashboard
                .next_check(now)
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            dashboard.schedule.interval.num_seconds().to_string(),
        ),
        _ => (String::new(), String::new()),
    };

    writeln!(out, r#"<header class="dashboard-header">"#)?;
    writeln!(
        out,
        r#"  <h1><i class="fas fa-shield-alt"></i> Trust &amp; Safety Policy Watcher</h1>"#
    )?;
    writeln!(out, r#"  <div class="header-status">"#)?;
    writeln!(
        out,
        r#"    <div id="header-system-status" class="{}" title="{}">"#,
        status.css_class(),
        escape_html(&status.tooltip())
    )?;
    writeln!(
        out,
        r#"      <span id="header-status-number" class="status-number" data-next-check="{next_check}" data-interval="{interval}">{}</span>"#,
        escape_html(&status.number())
    )?;
    writeln!(
        out,
        r#"      <span id="header-status-label" class="status-label">{}</span>"#,
        escape_html(status.label())
    )?;
    writeln!(out, "    </div>")?;
    writeln!(
        out,
        r#"    <div class="status-item"><span id="header-total-policies" class="status-number">{}</span><span class="status-label">Policies Monitored</span></div>"#,
        dashboard.total_policies()
    )?;
    writeln!(
        out,
        r#"    <div class="status-item"><span class="status-number"><i class="fas fa-heartbeat"></i></span><span class="status-label">{}</span></div>"#,
        escape_html(dashboard.health(now).label())
    )?;
    writeln!(
        out,
        r#"    <button class="diagnostic-button" data-open="diagnostic-modal"><i class="fas fa-stethoscope"></i> Diagnostics</button>"#
    )?;
    writeln!(out, "  </div>")?;
    writeln!(out, "</header>")?;
    Ok(())
}

fn write_health_banner(out: &mut String, dashboard: &Dashboard, now: DateTime<Utc>) -> anyhow::Result<()> {
    match dashboard.health_banner(now) {
        Some(text) => writeln!(
            out,
            r#"<div id="health-alert-banner" class="health-alert-banner"><i class="fas fa-exclamation-triangle"></i> <span>{}</span> <button class="diagnostic-button" data-open="diagnostic-modal">View details</button></div>"#,
            escape_html(&text)
        )?,
        None => writeln!(
            out,
            r#"<div id="health-alert-banner" class="health-alert-banner" hidden></div>"#
        )?,
    }
    Ok(())
}

// ── Notifications ──

fn write_notifications(out: &mut String, active: &[Notification]) -> anyhow::Result<()> {
    writeln!(out, r#"<div id="error-notifications" class="error-notifications">"#)?;
    for n in active {
        write_notification(out, n)?;
    }
    writeln!(out, "</div>")?;
    Ok(())
}

fn write_notification(out: &mut String, n: &Notification) -> anyhow::Result<()> {
    let id = n.element_id();
    writeln!(
        out,
        r#"  <div class="data-error-notification" id="{id}" data-file="{}">"#,
        n.file
    )?;
    writeln!(
        out,
        r#"    <div class="error-header"><i class="fas fa-exclamation-triangle"></i> <strong>{}</strong><button class="error-dismiss" data-target="{id}" aria-label="Dismiss">&times;</button></div>"#,
        escape_html(n.title)
    )?;
    writeln!(out, r#"    <p class="error-message">{}</p>"#, escape_html(&n.message))?;
    writeln!(
        out,
        r#"    <p class="error-location">Failed to load <code>{}</code> after {} attempt{}.</p>"#,
        escape_html(&n.location),
        n.attempts,
        if n.attempts == 1 { "" } else { "s" }
    )?;
    writeln!(out, r#"    <ul class="error-suggestions">"#)?;
    for suggestion in n.suggestions() {
        writeln!(out, "      <li>{}</li>", escape_html(suggestion))?;
    }
    writeln!(out, "    </ul>")?;
    writeln!(
        out,
        r#"    <button class="retry-button" data-file="{}"><i class="fas fa-redo"></i> Retry</button>"#,
        n.file
    )?;
    writeln!(out, "  </div>")?;
    Ok(())
}

// ── Tabs ──

fn write_tabs(out: &mut String) -> anyhow::Result<()> {
    writeln!(out, r#"<nav class="nav-tabs">"#)?;
    for (i, (id, label, icon)) in TABS.iter().enumerate() {
        let active = if i == 0 { " active" } else { "" };
        writeln!(
            out,
            r#"  <button class="nav-tab{active}" data-tab="{id}"><i class="{icon}"></i> {label}</button>"#
        )?;
    }
    writeln!(out, "</nav>")?;
    Ok(())
}

fn open_tab(out: &mut String, id: &str) -> anyhow::Result<()> {
    let active = if TABS.first().is_some_and(|(first, _, _)| *first == id) {
        " active"
    } else {
        ""
    };
    writeln!(out, r#"<section id="{id}" class="tab-content{active}">"#)?;
    Ok(())
}

fn empty_state(out: &mut String, message: &str) -> anyhow::Result<()> {
    writeln!(out, r#"<div class="empty-state">{}</div>"#, escape_html(message))?;
    Ok(())
}

fn write_matrix(out: &mut String, dashboard: &Dashboard, now: DateTime<Utc>) -> anyhow::Result<()> {
    open_tab(out, "matrix")?;
    let groups = dashboard.matrix();
    if groups.is_empty() {
        empty_state(out, "No policies loaded yet.")?;
        writeln!(out, "</section>")?;
        return Ok(());
    }

    writeln!(out, r#"<table id="policy-matrix-table" class="policy-matrix">"#)?;
    writeln!(
        out,
        "<thead><tr><th>Platform</th><th>Policy</th><th>Status</th><th>Last Updated</th><th>Link</th></tr></thead>"
    )?;
    writeln!(out, "<tbody>")?;
    for group in &groups {
        let platform = escape_html(&group.platform);
        writeln!(
            out,
            r#"<tr class="platform-section"><td colspan="5"><i class="{}"></i> {platform} ({})</td></tr>"#,
            platform_icon(&group.platform),
            group.policies.len()
        )?;
        for view in &group.policies {
            let (title, updated) = match view.last_updated() {
                Some(ts) => (format_datetime(ts), format_relative(ts, now)),
                None => (String::new(), "-".to_string()),
            };
            writeln!(
                out,
                r#"<tr data-platform="{platform}" data-slug="{}"><td>{platform}</td><td>{}</td><td class="policy-status">{}</td><td title="{}">{}</td><td><a href="{}" target="_blank" rel="noopener">View</a></td></tr>"#,
                escape_html(&view.policy.slug),
                escape_html(&view.policy.name),
                view.status(),
                escape_html(&title),
                escape_html(&updated),
                escape_html(&view.policy.url)
            )?;
        }
    }
    writeln!(out, "</tbody>")?;
    writeln!(out, "</table>")?;
    writeln!(out, "</section>")?;
    Ok(())
}

// ── Weekly ──

/// Every week, newest first; the selector shows one at a time.
fn write_weekly(out: &mut String, dashboard: &Dashboard) -> anyhow::Result<()> {
    open_tab(out, "weekly")?;

    let resolver = dashboard.resolver();
    let weeks: Vec<WeekDetails<'_>> = dashboard
        .week_keys()
        .into_iter()
        .filter_map(|key| dashboard.week_details(key, &resolver))
        .collect();

    if !weeks.is_empty() {
        writeln!(
            out,
            r#"<label for="week-selector">Week</label> <select id="week-selector" class="week-selector">"#
        )?;
        for (i, details) in weeks.iter().enumerate() {
            writeln!(
                out,
                r#"  <option value="{}"{}>{} ({})</option>"#,
                escape_html(details.key),
                if i == 0 { " selected" } else { "" },
                escape_html(&details.label),
                escape_html(details.key)
            )?;
        }
        writeln!(out, "</select>")?;
    }

    writeln!(out, r#"<div id="weekly-summary-content" class="weekly-summary">"#)?;
    if weeks.is_empty() {
        empty_state(out, "No weekly summaries available yet.")?;
    }
    for (i, details) in weeks.iter().enumerate() {
        write_week(out, dashboard, details, &resolver, i > 0)?;
    }
    writeln!(out, "</div>")?;
    writeln!(out, "</section>")?;
    Ok(())
}

fn write_week(
    out: &mut String,
    dashboard: &Dashboard,
    details: &WeekDetails<'_>,
    resolver: &PlatformResolver,
    hidden: bool,
) -> anyhow::Result<()> {
    writeln!(
        out,
        r#"<div class="weekly-week" data-week="{}"{}>"#,
        escape_html(details.key),
        if hidden { " hidden" } else { "" }
    )?;
    writeln!(out, "<h2>Week of {}</h2>", escape_html(&details.label))?;
    writeln!(
        out,
        r#"<div class="weekly-stats"><span class="stat"><strong>{}</strong> policies changed</span> <span class="stat"><strong>{}</strong> raw updates</span></div>"#,
        details.unique_policies, details.raw_updates
    )?;

    if !details.platforms.is_empty() {
        writeln!(out, r#"<ul class="weekly-platforms">"#)?;
        for (platform, count) in &details.platforms {
            writeln!(
                out,
                r#"  <li data-platform="{}"><i class="{}"></i> {} <strong>{count}</strong></li>"#,
                escape_html(platform),
                platform_icon(platform),
                escape_html(platform)
            )?;
        }
        writeln!(out, "</ul>")?;
    }

    let summary = dashboard
        .weekly
        .get(details.key)
        .map(|week| summary_html(&week.summary))
        .unwrap_or_default();
    if summary.trim().is_empty() {
        empty_state(out, "No summary available for this week.")?;
    } else {
        writeln!(out, r#"<div class="weekly-summary-text markdown">{summary}</div>"#)?;
    }

    if !details.changes.is_empty() {
        writeln!(out, r#"<ul class="weekly-changes">"#)?;
        for change in &details.changes {
            let date = change
                .commit_date
                .as_deref()
                .map(format_datetime)
                .unwrap_or_default();
            writeln!(
                out,
                "  <li><code>{}</code> {} <span class=\"change-date\">{}</span></li>",
                escape_html(&change.policy_key),
                escape_html(&resolver.resolve(&change.policy_key)),
                escape_html(&date)
            )?;
        }
        if details.remaining > 0 {
            writeln!(
                out,
                r#"  <li class="more">... and {} more</li>"#,
                details.remaining
            )?;
        }
        writeln!(out, "</ul>")?;
    }

    writeln!(out, "</div>")?;
    Ok(())
}

// ── Platforms ──

fn write_platforms(out: &mut String, dashboard: &Dashboard, now: DateTime<Utc>) -> anyhow::Result<()> {
    open_tab(out, "platforms")?;

    writeln!(out, r#"<div class="platform-filters">"#)?;
    writeln!(
        out,
        r#"  <button class="platform-filter active" data-platform="all"><i class="{}"></i> All</button>"#,
        platform_icon("all")
    )?;
    for platform in dashboard.platforms() {
        writeln!(
            out,
            r#"  <button class="platform-filter" data-platform="{0}"><i class="{1}"></i> {0}</button>"#,
            escape_html(&platform),
            platform_icon(&platform)
        )?;
    }
    writeln!(out, "</div>")?;

    let views = dashboard.policies_with_summaries(None);
    if views.is_empty() {
        empty_state(out, "No policy summaries available.")?;
    } else {
        writeln!(out, r#"<div class="policy-cards">"#)?;
        for view in views {
            writeln!(
                out,
                r#"<article class="policy-card" data-platform="{}" data-slug="{}">"#,
                escape_html(&view.policy.platform),
                escape_html(&view.policy.slug)
            )?;
            writeln!(
                out,
                r#"  <h3><i class="{}"></i> {}</h3>"#,
                platform_icon(&view.policy.platform),
                escape_html(&view.policy.name)
            )?;
            if let Some(summary) = view.summary {
                if let Some(text) = &summary.initial_summary {
                    writeln!(
                        out,
                        r#"  <div class="policy-summary markdown">{}</div>"#,
                        summary_html(text)
                    )?;
                }
                if summary.has_real_update()
                    && let (Some(update), Some(ts)) =
                        (&summary.last_update_summary, &summary.last_updated)
                {
                    writeln!(
                        out,
                        r#"  <div class="policy-update"><strong>Latest update ({}):</strong> <div class="markdown">{}</div></div>"#,
                        escape_html(&format_relative(ts, now)),
                        summary_html(update)
                    )?;
                }
            }
            writeln!(
                out,
                r#"  <a href="{}" target="_blank" rel="noopener">View policy</a>"#,
                escape_html(&view.policy.url)
            )?;
            writeln!(out, "</article>")?;
        }
        writeln!(out, "</div>")?;
    }

    writeln!(out, "<h2>Recent Changes</h2>")?;
    let changes = dashboard.recent_changes();
    if changes.is_empty() {
        empty_state(out, "No recent policy changes.")?;
    } else {
        writeln!(out, r#"<ul id="recent-changes" class="recent-changes">"#)?;
        for change in changes.iter().take(MAX_RECENT_CHANGES) {
            writeln!(
                out,
                r#"  <li data-slug="{}"><i class="{}"></i> <strong>{}</strong> <span class="change-date">{}</span><div class="markdown">{}</div></li>"#,
                escape_html(change.slug),
                platform_icon(&change.platform),
                escape_html(&change.policy_name),
                escape_html(&format_relative(change.last_updated, now)),
                summary_html(change.summary)
            )?;
        }
        writeln!(out, "</ul>")?;
    }

    writeln!(out, "</section>")?;
    Ok(())
}

// ── Analytics ──

fn write_analytics(out: &mut String, dashboard: &Dashboard, now: DateTime<Utc>) -> anyhow::Result<()> {
    open_tab(out, "analytics")?;
    write_activity(out, dashboard, now)?;

    match dashboard.weekly_series() {
        None => {
            writeln!(out, r#"<div id="weekly-platform-chart" class="weekly-platform-chart">"#)?;
            empty_state(out, "No weekly data available.")?;
            writeln!(out, "</div>")?;
        }
        Some(series) => {
            let data = serde_json::to_string(&series)?;
            writeln!(
                out,
                r#"<div id="weekly-platform-chart" class="weekly-platform-chart" data-series="{}">"#,
                escape_html(&data)
            )?;

            let points = series.timeline(TimelineRange::Recent);
            let start = series.weeks.len() - points.len();
            write!(out, "<table class=\"platform-chart-table\"><thead><tr><th>Week</th>")?;
            for platform in series.platforms.keys() {
                write!(out, "<th>{}</th>", escape_html(platform))?;
            }
            writeln!(out, "<th>Total</th><th>Trend</th></tr></thead><tbody>")?;
            for (offset, point) in points.iter().enumerate() {
                write!(
                    out,
                    r#"<tr data-week="{}"><td>{}</td>"#,
                    escape_html(&point.week_key),
                    escape_html(&point.week_label)
                )?;
                for counts in series.platforms.values() {
                    write!(out, "<td>{}</td>", counts[start + offset])?;
                }
                writeln!(
                    out,
                    r#"<td>{}</td><td class="{}">{}</td></tr>"#,
                    point.count,
                    point.trend.css_class(),
                    point.trend.symbol()
                )?;
            }
            writeln!(out, "</tbody></table>")?;

            let stats = series.stats();
            writeln!(
                out,
                r#"<div class="timeline-stats"><span>{} weeks</span> <span>{} total changes</span> <span>Peak: {} ({})</span></div>"#,
                stats.week_count,
                stats.total_changes,
                escape_html(stats.peak_week.as_deref().unwrap_or("-")),
                stats.peak_count
            )?;
            writeln!(out, "</div>")?;
        }
    }

    writeln!(out, "<h2>Run History</h2>")?;
    let runs = dashboard.history(HistoryFilter::All);
    if runs.is_empty() {
        empty_state(out, "No monitoring runs recorded.")?;
    } else {
        writeln!(out, r#"<table id="run-history" class="run-history">"#)?;
        writeln!(
            out,
            "<thead><tr><th>Run</th><th>Status</th><th>Pages</th><th>Changes</th><th>Errors</th></tr></thead><tbody>"
        )?;
        for run in runs.iter().take(MAX_HISTORY_ROWS) {
            writeln!(
                out,
                r#"<tr><td>{}</td><td><span class="{}" title="{}">{}</span></td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                escape_html(&format_datetime(&run.timestamp_utc)),
                run.status.css_class(),
                escape_html(run.status.tooltip()),
                escape_html(&run.status.label()),
                run.pages_checked,
                run.changes_found,
                run.errors.len()
            )?;
        }
        writeln!(out, "</tbody></table>")?;
    }

    writeln!(out, "</section>")?;
    Ok(())
}

fn write_activity(out: &mut String, dashboard: &Dashboard, now: DateTime<Utc>) -> anyhow::Result<()> {
    let activity = dashboard.platform_activity(now);

    writeln!(out, r#"<div id="intelligence-panel" class="intelligence-panel">"#)?;
    writeln!(
        out,
        r#"  <div class="status-item"><span id="platform-activity-status" class="status-number">{}</span><span class="status-label">{} updates in {ACTIVITY_WINDOW_DAYS} days</span></div>"#,
        escape_html(&activity.status_text()),
        activity.total
    )?;
    writeln!(
        out,
        r#"  <div class="status-item"><span id="latest-update-status" class="status-number">{}</span><span class="status-label">Latest Update</span></div>"#,
        escape_html(&activity.latest_text(now))
    )?;
    writeln!(out, r#"  <ul class="platform-activity">"#)?;
    for (platform, count) in &activity.counts {
        writeln!(
            out,
            r#"    <li data-platform="{platform}"><i class="{}"></i> {platform} <strong>{count}</strong></li>"#,
            platform_icon(platform)
        )?;
    }
    writeln!(out, "  </ul>")?;
    writeln!(out, "</div>")?;
    Ok(())
}

// ── Diagnostics ──

fn write_diagnostics(out: &mut String, dashboard: &Dashboard, now: DateTime<Utc>) -> anyhow::Result<()> {
    let report = dashboard.diagnostics(now);

    writeln!(out, r#"<div id="diagnostic-modal" class="diagnostic-modal" hidden>"#)?;
    writeln!(out, r#"<div class="modal-content">"#)?;
    writeln!(
        out,
        r#"<button class="modal-close" data-close="diagnostic-modal" aria-label="Close">&times;</button>"#
    )?;
    writeln!(out, "<h2>System Diagnostics</h2>")?;
    writeln!(
        out,
        "<p>Generated {} &middot; uptime {} &middot; {} active notification(s)</p>",
        report.generated_at.format("%Y-%m-%d %H:%M UTC"),
        report.run_stats.uptime(),
        report.active_notifications
    )?;

    writeln!(out, r#"<table class="diagnostic-files">"#)?;
    writeln!(out, "<thead><tr><th>File</th><th>State</th><th>Entries</th></tr></thead><tbody>")?;
    for file in &report.files {
        let state = match (file.loaded, file.optional) {
            (true, _) => "loaded",
            (false, true) => "missing (optional)",
            (false, false) => "missing",
        };
        writeln!(
            out,
            "<tr><td>{}</td><td>{state}</td><td>{}</td></tr>",
            file.file, file.entries
        )?;
    }
    writeln!(out, "</tbody></table>")?;

    if report.errors.is_empty() {
        empty_state(out, "No load errors recorded.")?;
    } else {
        writeln!(out, r#"<ul class="diagnostic-errors">"#)?;
        for entry in &report.errors {
            writeln!(
                out,
                "  <li>{} <strong>{}</strong> {}: {}</li>",
                entry.timestamp.format("%H:%M:%S"),
                entry.failure.file,
                escape_html(entry.failure.kind.title()),
                escape_html(&entry.failure.message)
            )?;
        }
        writeln!(out, "</ul>")?;
    }

    writeln!(out, "</div>")?;
    writeln!(out, "</div>")?;
    Ok(())
}
