//! Terminal views of the dashboard, one per tab.
//!
//! Everything goes to stdout; logs stay on stderr.

use anyhow::Context;
use chrono::{DateTime, Utc};
use policywatch_core::dashboard::ACTIVITY_WINDOW_DAYS;
use policywatch_core::text::clean_summary;
use policywatch_core::timestamp::{format_datetime, format_relative};
use policywatch_core::{Dashboard, DiagnosticReport, HistoryFilter, TimelineRange};

const MAX_LIST_ITEMS: usize = 10;
const NAME_WIDTH: usize = 40;
const TEXT_WIDTH: usize = 100;
const BAR_WIDTH: usize = 40;

// ── Status ──

/// Header status, run health, and any load errors.
pub fn print_status(dashboard: &Dashboard, now: DateTime<Utc>) {
    let status = dashboard.status(now);
    let stats = dashboard.run_stats(now);

    println!("=== Policy Watcher ===");
    println!();
    println!("  {:<26} {}", status.label(), status.number());
    println!("  {:<26} {}", "Policies monitored", dashboard.total_policies());
    println!("  {:<26} {}", "Health", dashboard.health(now).label());
    if let Some(last) = dashboard.last_run() {
        println!(
            "  {:<26} {} ({})",
            "Last run",
            format_datetime(&last.timestamp_utc),
            format_relative(&last.timestamp_utc, now)
        );
        println!("  {:<26} {}", "Last run status", last.status.label());
    }
    println!("  {:<26} {}", "Uptime", stats.uptime());
    println!("  {:<26} {}", "Changes today", stats.changes_today);
    let activity = dashboard.platform_activity(now);
    println!(
        "  {:<26} {} ({} in {ACTIVITY_WINDOW_DAYS} days)",
        "Platform activity",
        activity.status_text(),
        activity.total
    );
    println!("  {:<26} {}", "Latest update", activity.latest_text(now));
    println!();
    for line in status.tooltip().lines() {
        println!("  {line}");
    }

    if let Some(banner) = dashboard.health_banner(now) {
        println!();
        println!("! {banner}");
    }
    print_notifications(dashboard);
}

/// One-line status for `status --watch`.
pub fn status_line(dashboard: &Dashboard, now: DateTime<Utc>) -> String {
    let status = dashboard.status(now);
    format!("{}: {}", status.label(), status.number())
}

pub fn print_notifications(dashboard: &Dashboard) {
    let active = dashboard.notifications().active();
    if active.is_empty() {
        return;
    }

    println!();
    println!("Data load errors ({})", active.len());
    for n in active {
        println!("  [{}] {}: {}", n.id, n.title, n.file);
        println!("      {}", n.message);
        println!(
            "      failed to load {} after {} attempt{}",
            n.location,
            n.attempts,
            if n.attempts == 1 { "" } else { "s" }
        );
        for suggestion in n.suggestions() {
            println!("      - {suggestion}");
        }
    }
}

// ── Matrix ──

pub fn print_matrix(dashboard: &Dashboard, now: DateTime<Utc>) {
    let groups = dashboard.matrix();
    if groups.is_empty() {
        println!("No policies loaded.");
        return;
    }

    for group in groups {
        println!("{} ({})", group.platform, group.policies.len());
        for view in &group.policies {
            let updated = view
                .last_updated()
                .map(|ts| format_relative(ts, now))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:<40} {:<10} {:<16} {}",
                truncate(&view.policy.name, NAME_WIDTH),
                view.status(),
                updated,
                view.policy.url
            );
        }
        println!();
    }
}

// ── Platforms ──

pub fn print_policies(dashboard: &Dashboard, platform: Option<&str>, now: DateTime<Utc>) {
    let views = dashboard.policies_with_summaries(platform);
    if views.is_empty() {
        match platform {
            Some(p) => println!("No policy summaries available for {p}."),
            None => println!("No policy summaries available."),
        }
        return;
    }

    for view in views {
        println!("=== {} ===", view.policy.name);
        println!("  {:<26} {}", "platform", view.policy.platform);
        println!("  {:<26} {}", "url", view.policy.url);
        let Some(summary) = view.summary else {
            println!();
            continue;
        };
        if let Some(ts) = &summary.last_updated {
            println!("  {:<26} {}", "last updated", format_relative(ts, now));
        }
        if let Some(text) = &summary.initial_summary {
            println!("  {:<26} {}", "summary", truncate(&clean_summary(text), TEXT_WIDTH));
        }
        if summary.has_real_update()
            && let Some(update) = &summary.last_update_summary
        {
            println!(
                "  {:<26} {}",
                "latest update",
                truncate(&clean_summary(update), TEXT_WIDTH)
            );
        }
        println!();
    }
}

pub fn print_changes(dashboard: &Dashboard, limit: usize, now: DateTime<Utc>) {
    let activity = dashboard.platform_activity(now);
    println!("=== Activity, last {ACTIVITY_WINDOW_DAYS} days ===");
    for (platform, count) in &activity.counts {
        println!("  {platform:<26} {count}");
    }
    println!("  {:<26} {}", "Total", activity.total);
    println!("  {:<26} {}", "Most active", activity.most_active.unwrap_or("-"));
    println!();

    let changes = dashboard.recent_changes();
    if changes.is_empty() {
        println!("No recent policy changes.");
        return;
    }

    for change in changes.iter().take(limit) {
        println!(
            "  {:<12} {:<40} {}",
            change.platform,
            truncate(&change.policy_name, NAME_WIDTH),
            format_relative(change.last_updated, now)
        );
        let summary = clean_summary(change.summary);
        if !summary.is_empty() {
            println!("      {}", truncate(&summary, TEXT_WIDTH));
        }
    }
    if changes.len() > limit {
        println!("  ... and {} more", changes.len() - limit);
    }
}

// ── Weekly ──

/// Detail view of `week`, or the latest week when `None`.
pub fn print_week(dashboard: &Dashboard, week: Option<&str>) -> anyhow::Result<()> {
    let Some(key) = week.or_else(|| dashboard.latest_week()) else {
        println!("No weekly summaries available yet.");
        return Ok(());
    };
    let resolver = dashboard.resolver();
    let details = dashboard
        .week_details(key, &resolver)
        .with_context(|| format!("no weekly summary for {key}"))?;

    println!("=== Week of {} ({}) ===", details.label, details.key);
    println!();
    println!("  {:<26} {}", "Policies changed", details.unique_policies);
    println!("  {:<26} {}", "Raw updates", details.raw_updates);
    println!("  {:<26} {}", "Reported changes", details.reported_changes);
    println!();

    if !details.platforms.is_empty() {
        println!("Platforms");
        for (platform, count) in &details.platforms {
            println!("  {platform:<26} {count}");
        }
        println!();
    }

    if !details.changes.is_empty() {
        println!("Changes ({}):", details.unique_policies);
        for change in &details.changes {
            let date = change
                .commit_date
                .as_deref()
                .map(format_datetime)
                .unwrap_or_default();
            println!("    {:<40} {}", change.policy_key, date);
        }
        if details.remaining > 0 {
            println!("    ... and {} more", details.remaining);
        }
        println!();
    }

    if let Some(summary) = dashboard.weekly.get(key).map(|w| clean_summary(&w.summary))
        && !summary.is_empty()
    {
        println!("{summary}");
    }
    Ok(())
}

pub fn print_timeline(dashboard: &Dashboard, range: TimelineRange) {
    let Some(series) = dashboard.weekly_series() else {
        println!("No weekly data available.");
        return;
    };
    let stats = series.stats();

    println!("=== Change timeline ({range}) ===");
    println!();
    for point in series.timeline(range) {
        println!(
            "  {:<10} {:>4} {}  {}",
            point.week_label,
            point.count,
            point.trend.symbol(),
            "█".repeat(point.count.min(BAR_WIDTH))
        );
    }
    println!();
    println!("  {:<26} {}", "Weeks tracked", stats.week_count);
    println!("  {:<26} {}", "Total changes", stats.total_changes);
    if let Some(peak) = &stats.peak_week {
        println!("  {:<26} {} ({})", "Peak week", peak, stats.peak_count);
    }
    println!("  {:<26} {}", "Latest week", stats.latest_count);
    println!();

    println!("Platforms");
    for (platform, counts) in &series.platforms {
        let total: usize = counts.iter().sum();
        if total > 0 {
            println!("  {platform:<26} {total}");
        }
    }
}

// ── Analytics ──

pub fn print_history(dashboard: &Dashboard, filter: HistoryFilter) {
    let runs = dashboard.history(filter);
    if runs.is_empty() {
        println!("No runs match filter '{filter}'.");
        return;
    }

    println!(
        "  {:<22} {:<16} {:>6} {:>8} {:>7}",
        "Run", "Status", "Pages", "Changes", "Errors"
    );
    for run in runs {
        println!(
            "  {:<22} {:<16} {:>6} {:>8} {:>7}",
            format_datetime(&run.timestamp_utc),
            run.status.label(),
            run.pages_checked,
            run.changes_found,
            run.errors.len()
        );
        for error in run.errors.iter().take(MAX_LIST_ITEMS) {
            println!("      {}", truncate(&error.to_string(), TEXT_WIDTH));
        }
        if run.errors.len() > MAX_LIST_ITEMS {
            println!("      ... and {} more", run.errors.len() - MAX_LIST_ITEMS);
        }
    }
}

pub fn print_diagnostics(report: &DiagnosticReport) {
    println!("=== Diagnostics ===");
    println!(
        "  {:<26} {}",
        "Generated",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    println!("Files");
    for file in &report.files {
        let state = match (file.loaded, file.optional) {
            (true, _) => "loaded",
            (false, true) => "missing (optional)",
            (false, false) => "missing",
        };
        println!("  {:<26} {:<20} {}", file.file, state, file.entries);
    }
    println!();

    println!("Runs");
    println!("  {:<26} {}", "Recorded", report.run_stats.runs);
    println!("  {:<26} {}", "Success rate", report.run_stats.uptime());
    println!(
        "  {:<26} {:.1}",
        "Average changes", report.run_stats.average_changes
    );
    println!();

    println!(
        "Errors ({} active notification{})",
        report.active_notifications,
        if report.active_notifications == 1 { "" } else { "s" }
    );
    if report.errors.is_empty() {
        println!("  none");
    }
    for entry in &report.errors {
        println!(
            "  {} {:<24} {}: {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.failure.file.file_name(),
            entry.failure.kind.title(),
            entry.failure.message
        );
    }
}

// ── Helpers ──

/// Collapse whitespace and cut to `max` characters.
fn truncate(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}
