//! Check schedule, countdown, and system status derived from the run log.
//!
//! All of these read the one canonical run log held by the dashboard.

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use serde::Serialize;

use crate::model::{RunLogEntry, RunStatus};
use crate::timestamp::parse_timestamp;

/// When the collector is expected to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSchedule {
    /// Gap between runs.
    pub interval: Duration,
    /// UTC hours of the cron schedule, used when no run has been logged.
    pub schedule_hours: Vec<u32>,
    /// A last run older than this shows the system as offline.
    pub offline_after: Duration,
    /// Threshold for the coarser health summary.
    pub down_after: Duration,
}

impl Default for MonitorSchedule {
    fn default() -> Self {
        Self {
            interval: Duration::hours(6),
            schedule_hours: vec![0, 6, 12, 18],
            offline_after: Duration::hours(12),
            down_after: Duration::hours(48),
        }
    }
}

impl MonitorSchedule {
    /// Schedule running every `hours`, clamped to 1..=24, with cron slots to match.
    pub fn every_hours(hours: u32) -> Self {
        let hours = hours.clamp(1, 24);
        Self {
            interval: Duration::hours(hours as i64),
            schedule_hours: (0..24).step_by(hours as usize).collect(),
            offline_after: Duration::hours(hours as i64 * 2),
            ..Self::default()
        }
    }

    /// When the next check is due.
    ///
    /// With a logged run this is the first `last_run + k * interval` (k >= 1)
    /// strictly after `now`, so an overdue run rolls onto the next slot
    /// instead of pinning the countdown at zero.
    pub fn next_check(&self, run_log: &[RunLogEntry], now: DateTime<Utc>) -> DateTime<Utc> {
        let Some((_, last_run)) = latest_run(run_log) else {
            return self.next_scheduled_slot(now);
        };
        let interval_secs = self.interval.num_seconds().max(1);
        let elapsed_secs = (now - last_run).num_seconds();
        let periods = if elapsed_secs < interval_secs {
            1
        } else {
            elapsed_secs / interval_secs + 1
        };
        last_run + Duration::seconds(periods * interval_secs)
    }

    /// Whole seconds until the next check, rounded up; always at least 1.
    pub fn seconds_until_next_check(&self, run_log: &[RunLogEntry], now: DateTime<Utc>) -> i64 {
        let remaining_ms = (self.next_check(run_log, now) - now).num_milliseconds();
        ((remaining_ms + 999) / 1000).max(1)
    }

    fn next_scheduled_slot(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let mut hours = self.schedule_hours.clone();
        hours.sort_unstable();
        hours.retain(|h| *h < 24);
        let Some(&first) = hours.first() else {
            return now + self.interval;
        };

        let today = now.date_naive();
        let (day, hour) = match hours.iter().find(|h| **h > now.hour()) {
            Some(&h) => (today, h),
            None => (today + Duration::days(1), first),
        };
        day.and_hms_opt(hour, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .unwrap_or(now + self.interval)
    }
}

/// Newest run by parsed timestamp; entries with unparseable timestamps are skipped.
pub fn latest_run(run_log: &[RunLogEntry]) -> Option<(&RunLogEntry, DateTime<Utc>)> {
    run_log
        .iter()
        .filter_map(|entry| parse_timestamp(&entry.timestamp_utc).map(|ts| (entry, ts)))
        .max_by_key(|(_, ts)| *ts)
}

/// `H:MM:SS` when at least an hour remains, else `M:SS`.
pub fn format_countdown(total_seconds: i64) -> String {
    let total = total_seconds.max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Header status indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SystemStatus {
    NoData,
    Offline {
        hours_since_last_run: i64,
        expected_every_hours: i64,
    },
    Issues {
        status: RunStatus,
        errors: usize,
    },
    Operational {
        seconds_until_next: i64,
        policies: usize,
    },
}

impl SystemStatus {
    pub fn evaluate(
        schedule: &MonitorSchedule,
        run_log: &[RunLogEntry],
        policies: usize,
        now: DateTime<Utc>,
    ) -> Self {
        let Some((last, last_run)) = latest_run(run_log) else {
            return Self::NoData;
        };

        let since = now - last_run;
        if since > schedule.offline_after {
            return Self::Offline {
                hours_since_last_run: since.num_hours(),
                expected_every_hours: schedule.interval.num_hours(),
            };
        }
        if last.status != RunStatus::Success || !last.errors.is_empty() {
            return Self::Issues {
                status: last.status,
                errors: last.errors.len(),
            };
        }
        Self::Operational {
            seconds_until_next: schedule.seconds_until_next_check(run_log, now),
            policies,
        }
    }

    /// Big number in the header.
    pub fn number(&self) -> String {
        match self {
            Self::NoData => "-".to_string(),
            Self::Offline { .. } | Self::Issues { .. } => "!".to_string(),
            Self::Operational {
                seconds_until_next, ..
            } => format_countdown(*seconds_until_next),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NoData => "No Data",
            Self::Offline { .. } => "System Offline",
            Self::Issues { .. } => "Issues Detected",
            Self::Operational { .. } => "Time to Next Check",
        }
    }

    pub fn tooltip(&self) -> String {
        match self {
            Self::NoData => "No monitoring runs recorded yet".to_string(),
            Self::Offline {
                hours_since_last_run,
                expected_every_hours,
            } => format!(
                "Last run: {hours_since_last_run} hours ago\nExpected: Every {expected_every_hours} hours"
            ),
            Self::Issues { status, errors } => {
                format!("Last run status: {}\nErrors: {errors}", status.as_str())
            }
            Self::Operational {
                seconds_until_next,
                policies,
            } => format!(
                "Monitoring {policies} policies\nNext check in: {}",
                format_countdown(*seconds_until_next)
            ),
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Self::NoData => "status-item",
            Self::Offline { .. } | Self::Issues { .. } => "status-item issues",
            Self::Operational { .. } => "status-item operational",
        }
    }
}

/// Coarse health shown in the analytics panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthSummary {
    AllSystemsOk,
    SystemOffline,
    PartialIssues,
    SystemErrors,
}

impl HealthSummary {
    pub fn evaluate(schedule: &MonitorSchedule, run_log: &[RunLogEntry], now: DateTime<Utc>) -> Self {
        let Some((last, last_run)) = latest_run(run_log) else {
            return Self::AllSystemsOk;
        };
        if now - last_run > schedule.down_after {
            Self::SystemOffline
        } else {
            match last.status {
                RunStatus::Success => Self::AllSystemsOk,
                RunStatus::PartialFailure => Self::PartialIssues,
                _ => Self::SystemErrors,
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::AllSystemsOk => "All Systems OK",
            Self::SystemOffline => "System Offline",
            Self::PartialIssues => "Partial Issues",
            Self::SystemErrors => "System Errors",
        }
    }
}

/// Aggregates over the whole run log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub runs: usize,
    /// 0.0..=1.0; 1.0 when there are no runs.
    pub success_rate: f64,
    pub average_changes: f64,
    /// Changes found by runs since midnight UTC.
    pub changes_today: u64,
}

impl RunStats {
    pub fn compute(run_log: &[RunLogEntry], now: DateTime<Utc>) -> Self {
        let runs = run_log.len();
        let successes = run_log
            .iter()
            .filter(|r| r.status == RunStatus::Success)
            .count();
        let total_changes: u64 = run_log.iter().map(|r| r.changes_found).sum();
        let midnight = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .unwrap_or(now);
        let changes_today = run_log
            .iter()
            .filter(|r| parse_timestamp(&r.timestamp_utc).is_some_and(|ts| ts >= midnight))
            .map(|r| r.changes_found)
            .sum();

        Self {
            runs,
            success_rate: if runs == 0 {
                1.0
            } else {
                successes as f64 / runs as f64
            },
            average_changes: if runs == 0 {
                0.0
            } else {
                total_changes as f64 / runs as f64
            },
            changes_today,
        }
    }

    /// Uptime string; fewer than two runs is reported as 100%.
    pub fn uptime(&self) -> String {
        if self.runs < 2 {
            "100%".to_string()
        } else {
            format!("{:.1}%", self.success_rate * 100.0)
        }
    }
}
