//! Weekly change analytics.
//!
//! A week's `changed_policies` holds one entry per snapshot commit, so a
//! policy touched by three commits appears three times. Every count here is
//! over unique policy keys: `unique_count(week) <= raw_change_count(week)`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CoreError;
use crate::model::{ChangedPolicy, WeeklySummaries, WeeklySummary};
use crate::platform::{PlatformResolver, TRACKED_PLATFORMS};
use crate::timestamp::parse_timestamp;

/// Number of changes listed in a week's detail view.
pub const DETAIL_LIMIT: usize = 10;

/// Distinct policy keys changed during the week.
pub fn unique_policy_keys(week: &WeeklySummary) -> BTreeSet<&str> {
    week.changed_policies
        .iter()
        .map(|c| c.policy_key.as_str())
        .collect()
}

pub fn unique_count(week: &WeeklySummary) -> usize {
    unique_policy_keys(week).len()
}

/// Change events as recorded, one per commit.
pub fn raw_change_count(week: &WeeklySummary) -> usize {
    week.changed_policies.len()
}

/// Unique policies changed per platform.
pub fn platform_counts(week: &WeeklySummary, resolver: &PlatformResolver) -> BTreeMap<String, usize> {
    let mut keys_by_platform: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    for change in &week.changed_policies {
        keys_by_platform
            .entry(resolver.resolve(&change.policy_key))
            .or_default()
            .insert(change.policy_key.as_str());
    }
    keys_by_platform
        .into_iter()
        .map(|(platform, keys)| (platform, keys.len()))
        .collect()
}

/// First occurrence of each policy key, in commit order.
pub fn unique_changes(week: &WeeklySummary) -> Vec<&ChangedPolicy> {
    let mut seen = BTreeSet::new();
    week.changed_policies
        .iter()
        .filter(|c| seen.insert(c.policy_key.as_str()))
        .collect()
}

/// Short chart label (`Jul 26`) from the week's start date, else the key.
pub fn week_label(key: &str, week: &WeeklySummary) -> String {
    week.run_metadata
        .week_start
        .as_deref()
        .and_then(parse_timestamp)
        .map(|start| start.format("%b %-d").to_string())
        .unwrap_or_else(|| key.to_string())
}

/// Newest week key; keys sort chronologically.
pub fn latest_week_key(weeks: &WeeklySummaries) -> Option<&str> {
    weeks.keys().next_back().map(String::as_str)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekLabel {
    pub key: String,
    pub label: String,
}

/// Unique changes per platform for every week, oldest week first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyPlatformSeries {
    pub weeks: Vec<WeekLabel>,
    /// platform → one count per entry in `weeks`
    pub platforms: BTreeMap<String, Vec<usize>>,
}

impl WeeklyPlatformSeries {
    /// Build the series; `None` when there are no weeks.
    ///
    /// Tracked platforms are always present (zero-filled). Any other platform
    /// gets a series from the first week it appears in, back-filled with zeros.
    pub fn build(weeks: &WeeklySummaries, resolver: &PlatformResolver) -> Option<Self> {
        if weeks.is_empty() {
            return None;
        }

        let mut platforms: BTreeMap<String, Vec<usize>> = TRACKED_PLATFORMS
            .iter()
            .map(|p| (p.to_string(), Vec::with_capacity(weeks.len())))
            .collect();
        let mut labels = Vec::with_capacity(weeks.len());

        for (index, (key, week)) in weeks.iter().enumerate() {
            labels.push(WeekLabel {
                key: key.clone(),
                label: week_label(key, week),
            });
            let counts = platform_counts(week, resolver);
            for platform in counts.keys() {
                platforms
                    .entry(platform.clone())
                    .or_insert_with(|| vec![0; index]);
            }
            for (platform, series) in platforms.iter_mut() {
                series.push(counts.get(platform).copied().unwrap_or(0));
            }
        }

        Some(Self {
            weeks: labels,
            platforms,
        })
    }

    /// Sum of unique per-platform changes for each week.
    pub fn totals(&self) -> Vec<usize> {
        (0..self.weeks.len())
            .map(|i| self.platforms.values().map(|series| series[i]).sum())
            .collect()
    }

    /// Timeline rows for `range`, with trends relative to the previous visible row.
    pub fn timeline(&self, range: TimelineRange) -> Vec<TimelinePoint> {
        let totals = self.totals();
        let start = totals.len().saturating_sub(range.limit().unwrap_or(totals.len()));
        let mut points: Vec<TimelinePoint> = Vec::with_capacity(totals.len() - start);
        for i in start..totals.len() {
            let trend = match points.last() {
                None => Trend::Neutral,
                Some(prev) if totals[i] > prev.count => Trend::Up,
                Some(prev) if totals[i] < prev.count => Trend::Down,
                Some(_) => Trend::Stable,
            };
            points.push(TimelinePoint {
                week_key: self.weeks[i].key.clone(),
                week_label: self.weeks[i].label.clone(),
                count: totals[i],
                trend,
            });
        }
        points
    }

    pub fn stats(&self) -> TimelineStats {
        let totals = self.totals();
        let mut peak: Option<(usize, usize)> = None;
        for (i, &count) in totals.iter().enumerate() {
            if peak.is_none_or(|(_, best)| count > best) {
                peak = Some((i, count));
            }
        }
        TimelineStats {
            total_changes: totals.iter().sum(),
            peak_week: peak.map(|(i, _)| self.weeks[i].label.clone()),
            peak_count: peak.map(|(_, c)| c).unwrap_or(0),
            latest_count: totals.last().copied().unwrap_or(0),
            week_count: totals.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineStats {
    pub total_changes: usize,
    pub peak_week: Option<String>,
    pub peak_count: usize,
    pub latest_count: usize,
    pub week_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
    Neutral,
}

impl Trend {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Up => "↗",
            Self::Down => "↘",
            Self::Stable => "→",
            Self::Neutral => "—",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Up => "trend-up",
            Self::Down => "trend-down",
            Self::Stable => "trend-stable",
            Self::Neutral => "trend-neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub week_key: String,
    pub week_label: String,
    pub count: usize,
    pub trend: Trend,
}

/// How many trailing weeks the timeline shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimelineRange {
    /// Last 8 weeks.
    #[default]
    Recent,
    /// Last 12 weeks.
    Quarter,
    All,
}

impl TimelineRange {
    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::Recent => Some(8),
            Self::Quarter => Some(12),
            Self::All => None,
        }
    }
}

impl FromStr for TimelineRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recent" => Ok(Self::Recent),
            "quarter" => Ok(Self::Quarter),
            "all" => Ok(Self::All),
            other => Err(CoreError::InvalidOption {
                option: "timeline range",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for TimelineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Recent => "recent",
            Self::Quarter => "quarter",
            Self::All => "all",
        })
    }
}

/// Detail view of one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekDetails<'a> {
    pub key: &'a str,
    pub label: String,
    /// Commit count as reported by the aggregator.
    pub reported_changes: u64,
    pub unique_policies: usize,
    pub raw_updates: usize,
    pub platforms: BTreeMap<String, usize>,
    /// Up to [`DETAIL_LIMIT`] unique changes.
    pub changes: Vec<&'a ChangedPolicy>,
    /// Unique changes not listed.
    pub remaining: usize,
}

impl<'a> WeekDetails<'a> {
    pub fn new(key: &'a str, week: &'a WeeklySummary, resolver: &PlatformResolver) -> Self {
        let unique = unique_changes(week);
        let remaining = unique.len().saturating_sub(DETAIL_LIMIT);
        Self {
            key,
            label: week_label(key, week),
            reported_changes: week.changes_count,
            unique_policies: unique.len(),
            raw_updates: raw_change_count(week),
            platforms: platform_counts(week, resolver),
            changes: unique.into_iter().take(DETAIL_LIMIT).collect(),
            remaining,
        }
    }
}
