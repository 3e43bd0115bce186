//! In-memory dashboard state rebuilt on every load.
//!
//! The run log lives in exactly one field, `run_log`; status, countdown,
//! history, diagnostics, and retries all go through it.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::error::CoreError;
use crate::files::{DataFile, DataPayload};
use crate::model::{
    HealthAlert, PolicyRecord, RunLog, RunLogEntry, RunStatus, Summaries, SummaryRecord,
    WeeklySummaries,
};
use crate::notify::{ErrorReport, FetchFailure, NotificationCenter};
use crate::platform::{PlatformResolver, TRACKED_PLATFORMS};
use crate::schedule::{HealthSummary, MonitorSchedule, RunStats, SystemStatus};
use crate::timestamp::{format_relative, parse_timestamp};
use crate::weekly::{latest_week_key, WeekDetails, WeeklyPlatformSeries};

/// Slugs with this prefix are collector test fixtures.
const TEST_SLUG_PREFIX: &str = "test-";

/// Health alerts older than this no longer raise the banner.
const ALERT_WINDOW_HOURS: i64 = 24;

/// Look-back for the platform activity panel.
pub const ACTIVITY_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub policies: Vec<PolicyRecord>,
    pub summaries: Summaries,
    pub run_log: RunLog,
    pub weekly: WeeklySummaries,
    pub health_alerts: Vec<HealthAlert>,
    pub schedule: MonitorSchedule,
    loaded: BTreeSet<DataFile>,
    notifications: NotificationCenter,
}

/// One policy row in the matrix or explorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyView<'a> {
    pub policy: &'a PolicyRecord,
    pub summary: Option<&'a SummaryRecord>,
}

impl PolicyView<'_> {
    /// Matrix status: `Updated` after a real change, `Monitored` once
    /// summarised, `Pending` before the first capture is summarised.
    pub fn status(&self) -> &'static str {
        match self.summary {
            Some(s) if s.has_real_update() => "Updated",
            Some(_) => "Monitored",
            None => "Pending",
        }
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.summary.and_then(|s| s.last_updated.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformGroup<'a> {
    pub platform: String,
    pub policies: Vec<PolicyView<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentChange<'a> {
    pub slug: &'a str,
    pub platform: String,
    pub policy_name: String,
    pub last_updated: &'a str,
    pub summary: &'a str,
}

/// Real updates per tracked platform within [`ACTIVITY_WINDOW_DAYS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformActivity<'a> {
    /// Tracked platforms in chart order.
    pub counts: Vec<(&'static str, usize)>,
    pub total: usize,
    /// Highest count, first tracked platform on a tie; `None` when quiet.
    pub most_active: Option<&'static str>,
    /// Newest real update regardless of the window.
    pub latest: Option<RecentChange<'a>>,
}

impl PlatformActivity<'_> {
    pub fn status_text(&self) -> String {
        match self.most_active {
            Some(platform) => format!("Most Active: {platform}"),
            None => "Low Activity".to_string(),
        }
    }

    pub fn latest_text(&self, now: DateTime<Utc>) -> String {
        match &self.latest {
            Some(change) => format!(
                "{} \u{2022} {}",
                change.platform,
                format_relative(change.last_updated, now)
            ),
            None => "No recent updates".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryFilter {
    #[default]
    All,
    Success,
    Failed,
}

impl FromStr for HistoryFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "success" => Ok(Self::Success),
            "failed" | "failure" | "errors" => Ok(Self::Failed),
            other => Err(CoreError::InvalidOption {
                option: "history filter",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for HistoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Success => "success",
            Self::Failed => "failed",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatus {
    pub file: &'static str,
    pub loaded: bool,
    pub optional: bool,
    pub entries: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticReport {
    pub generated_at: DateTime<Utc>,
    pub files: Vec<FileStatus>,
    pub active_notifications: usize,
    pub errors: Vec<ErrorReport>,
    pub run_stats: RunStats,
}

impl Dashboard {
    pub fn new(schedule: MonitorSchedule) -> Self {
        Self {
            schedule,
            ..Self::default()
        }
    }

    /// Install a freshly fetched data set and clear any notification for it.
    pub fn apply(&mut self, payload: DataPayload) {
        let file = payload.file();
        debug!(file = %file, entries = payload.len(), "applying data");
        match payload {
            DataPayload::RunLog(v) => self.run_log = v,
            DataPayload::Summaries(v) => self.summaries = v,
            DataPayload::PlatformUrls(v) => self.policies = v,
            DataPayload::WeeklySummaries(v) => self.weekly = v,
            DataPayload::HealthAlerts(v) => self.health_alerts = v,
        }
        self.loaded.insert(file);
        self.notifications.resolve(file);
    }

    /// Record a fetch that failed after all retries. The data set keeps
    /// whatever it held before (empty on first load).
    pub fn record_failure(&mut self, failure: FetchFailure, now: DateTime<Utc>) -> u64 {
        self.notifications.raise(failure, now)
    }

    pub fn dismiss_notification(&mut self, id: u64) -> bool {
        self.notifications.dismiss(id)
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn is_loaded(&self, file: DataFile) -> bool {
        self.loaded.contains(&file)
    }

    pub fn resolver(&self) -> PlatformResolver {
        PlatformResolver::new(&self.policies)
    }

    pub fn total_policies(&self) -> usize {
        self.policies.len()
    }

    pub fn status(&self, now: DateTime<Utc>) -> SystemStatus {
        SystemStatus::evaluate(&self.schedule, &self.run_log, self.policies.len(), now)
    }

    pub fn seconds_until_next_check(&self, now: DateTime<Utc>) -> i64 {
        self.schedule.seconds_until_next_check(&self.run_log, now)
    }

    pub fn next_check(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.schedule.next_check(&self.run_log, now)
    }

    pub fn health(&self, now: DateTime<Utc>) -> HealthSummary {
        HealthSummary::evaluate(&self.schedule, &self.run_log, now)
    }

    pub fn run_stats(&self, now: DateTime<Utc>) -> RunStats {
        RunStats::compute(&self.run_log, now)
    }

    pub fn last_run(&self) -> Option<&RunLogEntry> {
        crate::schedule::latest_run(&self.run_log).map(|(entry, _)| entry)
    }

    /// Display name for a slug: policy list, then summary, then a placeholder.
    pub fn policy_name(&self, slug: &str) -> String {
        self.policies
            .iter()
            .find(|p| p.slug == slug)
            .map(|p| p.name.clone())
            .or_else(|| {
                self.summaries
                    .get(slug)
                    .and_then(|s| s.policy_name.clone())
            })
            .unwrap_or_else(|| "Unknown Policy".to_string())
    }

    /// Distinct platforms in policy-list order.
    pub fn platforms(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.policies
            .iter()
            .filter(|p| seen.insert(p.platform.as_str()))
            .map(|p| p.platform.clone())
            .collect()
    }

    /// Every policy grouped by platform, platforms in first-seen order.
    pub fn matrix(&self) -> Vec<PlatformGroup<'_>> {
        self.platforms()
            .into_iter()
            .map(|platform| {
                let policies = self
                    .policies
                    .iter()
                    .filter(|p| p.platform == platform)
                    .map(|p| PolicyView {
                        policy: p,
                        summary: self.summaries.get(&p.slug),
                    })
                    .collect();
                PlatformGroup { platform, policies }
            })
            .collect()
    }

    /// Policies that have an initial summary, optionally for one platform
    /// (`None` or `"all"` means every platform).
    pub fn policies_with_summaries(&self, platform: Option<&str>) -> Vec<PolicyView<'_>> {
        let platform = platform.filter(|p| !p.eq_ignore_ascii_case("all"));
        self.policies
            .iter()
            .filter(|p| platform.is_none_or(|wanted| p.platform.eq_ignore_ascii_case(wanted)))
            .filter_map(|p| {
                let summary = self.summaries.get(&p.slug)?;
                summary.initial_summary.as_ref()?;
                Some(PolicyView {
                    policy: p,
                    summary: Some(summary),
                })
            })
            .collect()
    }

    /// Real policy updates, newest first; test fixtures and first captures excluded.
    pub fn recent_changes(&self) -> Vec<RecentChange<'_>> {
        let resolver = self.resolver();
        let mut changes: Vec<(Option<DateTime<Utc>>, RecentChange<'_>)> = self
            .summaries
            .iter()
            .filter(|(slug, summary)| {
                !slug.starts_with(TEST_SLUG_PREFIX) && summary.has_real_update()
            })
            .filter_map(|(slug, summary)| {
                let last_updated = summary.last_updated.as_deref()?;
                Some((
                    parse_timestamp(last_updated),
                    RecentChange {
                        slug,
                        platform: resolver.resolve(slug),
                        policy_name: self.policy_name(slug),
                        last_updated,
                        summary: summary.last_update_summary.as_deref().unwrap_or_default(),
                    },
                ))
            })
            .collect();
        changes.sort_by(|a, b| b.0.cmp(&a.0));
        changes.into_iter().map(|(_, change)| change).collect()
    }

    /// Activity panel: test fixtures and first captures never count.
    pub fn platform_activity(&self, now: DateTime<Utc>) -> PlatformActivity<'_> {
        let cutoff = now - Duration::days(ACTIVITY_WINDOW_DAYS);
        let resolver = self.resolver();
        let mut counts: Vec<(&'static str, usize)> =
            TRACKED_PLATFORMS.iter().map(|p| (*p, 0)).collect();

        for (slug, summary) in &self.summaries {
            if slug.starts_with(TEST_SLUG_PREFIX) || !summary.has_real_update() {
                continue;
            }
            let in_window = summary
                .last_updated
                .as_deref()
                .and_then(parse_timestamp)
                .is_some_and(|ts| ts > cutoff);
            if !in_window {
                continue;
            }
            let platform = resolver.resolve(slug);
            if let Some((_, n)) = counts.iter_mut().find(|(p, _)| *p == platform) {
                *n += 1;
            }
        }

        let total: usize = counts.iter().map(|(_, n)| n).sum();
        let most_active = counts
            .iter()
            .rev()
            .filter(|(_, n)| *n > 0)
            .max_by_key(|(_, n)| *n)
            .map(|(p, _)| *p);
        PlatformActivity {
            counts,
            total,
            most_active,
            latest: self.recent_changes().into_iter().next(),
        }
    }

    pub fn history(&self, filter: HistoryFilter) -> Vec<&RunLogEntry> {
        self.run_log
            .iter()
            .filter(|run| match filter {
                HistoryFilter::All => true,
                HistoryFilter::Success => run.status == RunStatus::Success,
                HistoryFilter::Failed => run.status != RunStatus::Success,
            })
            .collect()
    }

    pub fn weekly_series(&self) -> Option<WeeklyPlatformSeries> {
        WeeklyPlatformSeries::build(&self.weekly, &self.resolver())
    }

    pub fn latest_week(&self) -> Option<&str> {
        latest_week_key(&self.weekly)
    }

    /// Week keys, newest first.
    pub fn week_keys(&self) -> Vec<&str> {
        self.weekly.keys().rev().map(String::as_str).collect()
    }

    pub fn week_details<'a>(
        &'a self,
        key: &'a str,
        resolver: &PlatformResolver,
    ) -> Option<WeekDetails<'a>> {
        let week = self.weekly.get(key)?;
        Some(WeekDetails::new(key, week, resolver))
    }

    /// Banner text for health alerts raised in the last 24 hours.
    pub fn health_banner(&self, now: DateTime<Utc>) -> Option<String> {
        let cutoff = now - Duration::hours(ALERT_WINDOW_HOURS);
        let mut counts: Vec<(String, usize)> = Vec::new();
        for alert in &self.health_alerts {
            if !parse_timestamp(&alert.timestamp).is_some_and(|ts| ts > cutoff) {
                continue;
            }
            let platform = alert.platform.as_deref().unwrap_or("Unknown");
            match counts.iter_mut().find(|(p, _)| p == platform) {
                Some((_, n)) => *n += 1,
                None => counts.push((platform.to_string(), 1)),
            }
        }
        if counts.is_empty() {
            return None;
        }
        let parts: Vec<String> = counts
            .iter()
            .map(|(platform, n)| format!("{n} {platform} URL{}", if *n == 1 { "" } else { "s" }))
            .collect();
        Some(format!(
            "{} currently inaccessible. Content monitoring may be affected.",
            parts.join(", ")
        ))
    }

    pub fn diagnostics(&self, now: DateTime<Utc>) -> DiagnosticReport {
        let files = DataFile::ALL
            .iter()
            .map(|file| FileStatus {
                file: file.file_name(),
                loaded: self.is_loaded(*file),
                optional: file.is_optional(),
                entries: self.entries(*file),
            })
            .collect();
        DiagnosticReport {
            generated_at: now,
            files,
            active_notifications: self.notifications.active().len(),
            errors: self.notifications.reports().to_vec(),
            run_stats: self.run_stats(now),
        }
    }

    fn entries(&self, file: DataFile) -> usize {
        match file {
            DataFile::RunLog => self.run_log.len(),
            DataFile::Summaries => self.summaries.len(),
            DataFile::PlatformUrls => self.policies.len(),
            DataFile::WeeklySummaries => self.weekly.len(),
            DataFile::HealthAlerts => self.health_alerts.len(),
        }
    }

    /// JSON view published as `window.dashboardInstance` for browser checks.
    pub fn introspection(&self, now: DateTime<Utc>) -> serde_json::Value {
        let status = self.status(now);
        json!({
            "totalPolicies": self.policies.len(),
            "runLog": self.run_log,
            "summaries": self.summaries.len(),
            "weeklySummaries": self.weekly.len(),
            "latestWeek": self.latest_week(),
            "status": {
                "number": status.number(),
                "label": status.label(),
                "detail": status,
            },
            "secondsUntilNextCheck": self.seconds_until_next_check(now),
            "nextCheck": self.next_check(now),
            "notifications": self.notifications.active(),
            "loaded": self.loaded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChangedPolicy, WeeklySummary, INITIAL_VERSION};
    use crate::notify::FailureKind;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn policy(slug: &str, platform: &str, name: &str) -> PolicyRecord {
        PolicyRecord {
            slug: slug.into(),
            platform: platform.into(),
            name: name.into(),
            url: format!("https://example.com/{slug}"),
            renderer: None,
        }
    }

    fn summary(initial: Option<&str>, update: Option<&str>, updated: Option<&str>) -> SummaryRecord {
        SummaryRecord {
            policy_name: None,
            initial_summary: initial.map(Into::into),
            last_update_summary: update.map(Into::into),
            last_updated: updated.map(Into::into),
        }
    }

    fn sample() -> Dashboard {
        let mut d = Dashboard::new(MonitorSchedule::default());
        d.apply(DataPayload::PlatformUrls(vec![
            policy("tiktok-cg", "TikTok", "Community Guidelines"),
            policy("youtube-harassment", "YouTube", "Harassment Policy"),
            policy("tiktok-live", "TikTok", "LIVE Rules"),
        ]));
        let mut summaries = Summaries::new();
        summaries.insert(
            "tiktok-cg".into(),
            summary(Some("Rules."), Some("Added section 4."), Some("2025-08-01T10:00:00Z")),
        );
        summaries.insert(
            "youtube-harassment".into(),
            summary(Some("No harassment."), Some(INITIAL_VERSION), Some("2025-07-01T10:00:00Z")),
        );
        summaries.insert(
            "tiktok-live".into(),
            summary(None, Some("Age limit raised."), Some("2025-08-02T10:00:00+00:00Z")),
        );
        summaries.insert(
            "test-fixture".into(),
            summary(Some("x"), Some("changed"), Some("2025-08-03T10:00:00Z")),
        );
        d.apply(DataPayload::Summaries(summaries));
        d
    }

    fn failure(file: DataFile) -> FetchFailure {
        FetchFailure {
            file,
            kind: FailureKind::Server,
            location: file.file_name().into(),
            message: "HTTP 500".into(),
            attempts: 3,
        }
    }

    #[test]
    fn matrix_groups_by_platform_in_list_order() {
        let d = sample();
        let matrix = d.matrix();
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix[0].platform, "TikTok");
        assert_eq!(matrix[0].policies.len(), 2);
        assert_eq!(matrix[1].platform, "YouTube");
        assert!(matrix[1].policies[0].summary.is_some());

        assert_eq!(matrix[0].policies[0].status(), "Updated");
        assert_eq!(matrix[0].policies[1].status(), "Updated");
        assert_eq!(matrix[1].policies[0].status(), "Monitored");
        assert_eq!(
            matrix[1].policies[0].last_updated(),
            Some("2025-07-01T10:00:00Z")
        );
    }

    #[test]
    fn unsummarised_policy_is_pending() {
        let mut d = Dashboard::default();
        d.apply(DataPayload::PlatformUrls(vec![policy("twitch-tos", "Twitch", "ToS")]));
        let matrix = d.matrix();
        assert_eq!(matrix[0].policies[0].status(), "Pending");
        assert_eq!(matrix[0].policies[0].last_updated(), None);
    }

    #[test]
    fn explorer_only_lists_summarised_policies() {
        let d = sample();
        assert_eq!(d.policies_with_summaries(None).len(), 2);
        assert_eq!(d.policies_with_summaries(Some("all")).len(), 2);
        let tiktok = d.policies_with_summaries(Some("tiktok"));
        assert_eq!(tiktok.len(), 1);
        assert_eq!(tiktok[0].policy.slug, "tiktok-cg");
        assert!(d.policies_with_summaries(Some("Twitch")).is_empty());
    }

    #[test]
    fn recent_changes_newest_first_without_fixtures() {
        let d = sample();
        let changes = d.recent_changes();
        let slugs: Vec<&str> = changes.iter().map(|c| c.slug).collect();
        assert_eq!(slugs, vec!["tiktok-live", "tiktok-cg"]);
        assert_eq!(changes[0].policy_name, "LIVE Rules");
        assert_eq!(changes[0].platform, "TikTok");
    }

    #[test]
    fn failure_then_successful_retry_clears_notification() {
        let mut d = sample();
        let now = at("2025-08-01T12:00:00Z");
        d.record_failure(failure(DataFile::RunLog), now);
        assert_eq!(d.notifications().active().len(), 1);
        assert!(!d.is_loaded(DataFile::RunLog));

        d.apply(DataPayload::RunLog(vec![]));
        assert!(d.notifications().active().is_empty());
        assert!(d.is_loaded(DataFile::RunLog));
    }

    #[test]
    fn dismiss_removes_only_that_notification() {
        let mut d = Dashboard::default();
        let now = at("2025-08-01T12:00:00Z");
        let id = d.record_failure(failure(DataFile::RunLog), now);
        d.record_failure(failure(DataFile::Summaries), now);
        assert!(d.dismiss_notification(id));
        assert_eq!(d.notifications().active().len(), 1);
        assert_eq!(d.notifications().active()[0].file, DataFile::Summaries);
    }

    #[test]
    fn status_and_countdown_read_the_same_run_log() {
        let mut d = sample();
        let now = at("2025-08-01T13:00:00Z");
        assert_eq!(d.status(now), SystemStatus::NoData);

        d.apply(DataPayload::RunLog(vec![RunLogEntry {
            timestamp_utc: "2025-08-01T12:00:00Z".into(),
            status: RunStatus::Success,
            pages_checked: 3,
            changes_found: 0,
            errors: vec![],
        }]));
        let status = d.status(now);
        assert_eq!(status.number(), "5:00:00");
        assert_eq!(d.seconds_until_next_check(now), 5 * 3600);
        assert_eq!(d.introspection(now)["status"]["number"], "5:00:00");
    }

    #[test]
    fn history_filters() {
        let mut d = Dashboard::default();
        let entry = |status| RunLogEntry {
            timestamp_utc: "2025-08-01T12:00:00Z".into(),
            status,
            pages_checked: 1,
            changes_found: 0,
            errors: vec![],
        };
        d.apply(DataPayload::RunLog(vec![
            entry(RunStatus::Success),
            entry(RunStatus::PartialFailure),
            entry(RunStatus::Failure),
        ]));
        assert_eq!(d.history(HistoryFilter::All).len(), 3);
        assert_eq!(d.history(HistoryFilter::Success).len(), 1);
        assert_eq!(d.history(HistoryFilter::Failed).len(), 2);
        assert_eq!("failed".parse::<HistoryFilter>().unwrap(), HistoryFilter::Failed);
        assert!("sometimes".parse::<HistoryFilter>().is_err());
    }

    #[test]
    fn health_banner_groups_recent_alerts() {
        let mut d = Dashboard::default();
        let alert = |platform: &str, ts: &str| HealthAlert {
            platform: Some(platform.into()),
            slug: None,
            current_status: None,
            timestamp: ts.into(),
        };
        let now = at("2025-08-02T12:00:00Z");
        assert_eq!(d.health_banner(now), None);

        d.apply(DataPayload::HealthAlerts(vec![
            alert("TikTok", "2025-08-02T10:00:00Z"),
            alert("Meta", "2025-08-02T09:00:00Z"),
            alert("TikTok", "2025-08-02T08:00:00Z"),
            alert("YouTube", "2025-07-30T08:00:00Z"),
        ]));
        assert_eq!(
            d.health_banner(now).as_deref(),
            Some("2 TikTok URLs, 1 Meta URL currently inaccessible. Content monitoring may be affected.")
        );
    }

    #[test]
    fn week_details_use_policy_list_platforms() {
        let mut d = sample();
        let mut weeks = WeeklySummaries::new();
        weeks.insert(
            "2025-07-26_to_2025-08-01".into(),
            WeeklySummary {
                changed_policies: ["tiktok-cg", "tiktok-cg", "youtube-harassment"]
                    .iter()
                    .map(|k| ChangedPolicy {
                        policy_key: k.to_string(),
                        file_path: None,
                        commit_date: None,
                        commit_hash: None,
                    })
                    .collect(),
                ..Default::default()
            },
        );
        d.apply(DataPayload::WeeklySummaries(weeks));
        let resolver = d.resolver();
        let details = d.week_details("2025-07-26_to_2025-08-01", &resolver).unwrap();
        assert_eq!(details.unique_policies, 2);
        assert_eq!(details.platforms["TikTok"], 1);
        assert!(d.week_details("nope", &resolver).is_none());
        assert_eq!(d.latest_week(), Some("2025-07-26_to_2025-08-01"));
    }

    #[test]
    fn diagnostics_report_every_file() {
        let mut d = sample();
        let now = at("2025-08-01T12:00:00Z");
        d.record_failure(failure(DataFile::WeeklySummaries), now);
        let report = d.diagnostics(now);
        assert_eq!(report.files.len(), DataFile::ALL.len());
        let urls = report.files.iter().find(|f| f.file == "platform_urls.json").unwrap();
        assert!(urls.loaded);
        assert_eq!(urls.entries, 3);
        let weekly = report.files.iter().find(|f| f.file == "weekly_summaries.json").unwrap();
        assert!(!weekly.loaded);
        assert!(weekly.optional);
        assert_eq!(report.active_notifications, 1);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn policy_name_fallbacks() {
        let mut d = sample();
        assert_eq!(d.policy_name("tiktok-cg"), "Community Guidelines");
        d.summaries.insert(
            "meta-bullying".into(),
            SummaryRecord {
                policy_name: Some("Bullying".into()),
                ..Default::default()
            },
        );
        assert_eq!(d.policy_name("meta-bullying"), "Bullying");
        assert_eq!(d.policy_name("nobody"), "Unknown Policy");
    }

    #[test]
    fn platform_activity_counts_real_updates_in_window() {
        let d = sample();
        let activity = d.platform_activity(at("2025-08-20T00:00:00Z"));
        assert_eq!(activity.counts.len(), TRACKED_PLATFORMS.len());
        let tiktok = activity.counts.iter().find(|(p, _)| *p == "TikTok").unwrap();
        assert_eq!(tiktok.1, 2);
        let youtube = activity.counts.iter().find(|(p, _)| *p == "YouTube").unwrap();
        assert_eq!(youtube.1, 0);
        assert_eq!(activity.total, 2);
        assert_eq!(activity.most_active, Some("TikTok"));
        assert_eq!(activity.latest.as_ref().unwrap().slug, "tiktok-live");
        assert_eq!(activity.status_text(), "Most Active: TikTok");
        assert!(activity.latest_text(at("2025-08-20T00:00:00Z")).starts_with("TikTok \u{2022} "));
    }

    #[test]
    fn platform_activity_window_is_thirty_days() {
        let d = sample();
        let activity = d.platform_activity(at("2025-08-31T12:00:00Z"));
        assert_eq!(activity.total, 1);

        let activity = d.platform_activity(at("2025-09-02T00:00:00Z"));
        assert_eq!(activity.total, 0);
        assert_eq!(activity.most_active, None);
        assert_eq!(activity.status_text(), "Low Activity");
        assert_eq!(activity.latest.unwrap().slug, "tiktok-live");

        let binding = Dashboard::default();
        let empty = binding.platform_activity(at("2025-09-02T00:00:00Z"));
        assert_eq!(empty.latest_text(at("2025-09-02T00:00:00Z")), "No recent updates");
    }

    #[test]
    fn platform_activity_tie_goes_to_first_tracked_platform() {
        let mut d = sample();
        d.summaries.insert(
            "youtube-spam".into(),
            summary(Some("x"), Some("Spam rules tightened."), Some("2025-08-05T00:00:00Z")),
        );
        d.summaries.insert(
            "youtube-live".into(),
            summary(Some("x"), Some("Live rules."), Some("2025-08-06T00:00:00Z")),
        );
        let activity = d.platform_activity(at("2025-08-20T00:00:00Z"));
        assert_eq!(activity.total, 4);
        assert_eq!(activity.most_active, Some("YouTube"));
    }

    #[test]
    fn week_keys_newest_first() {
        let mut d = Dashboard::default();
        for key in ["2025-07-19_to_2025-07-25", "2025-07-26_to_2025-08-01"] {
            d.weekly.insert(key.into(), WeeklySummary::default());
        }
        assert_eq!(
            d.week_keys(),
            vec!["2025-07-26_to_2025-08-01", "2025-07-19_to_2025-07-25"]
        );
    }
}
