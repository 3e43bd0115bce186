//! Snapshot records published by the policy collector.
//!
//! Every file is a read-only snapshot; the dashboard never writes back.
//! Fields the collector sometimes omits are `#[serde(default)]` so a sparse
//! record still loads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Sentinel `last_update_summary` written for a policy's first snapshot.
pub const INITIAL_VERSION: &str = "Initial version.";

/// A tracked policy page, from `platform_urls.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub slug: String,
    pub platform: String,
    pub name: String,
    pub url: String,
    /// Fetch backend used by the collector (`httpx` or `playwright`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<String>,
}

/// AI-written summaries for one policy, keyed by slug in `summaries.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_name: Option<String>,
    #[serde(default)]
    pub initial_summary: Option<String>,
    #[serde(default)]
    pub last_update_summary: Option<String>,
    /// ISO 8601 timestamp string.
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl SummaryRecord {
    /// True when the record describes a real change rather than the first capture.
    pub fn has_real_update(&self) -> bool {
        self.last_updated.is_some()
            && self.last_update_summary.as_deref() != Some(INITIAL_VERSION)
    }
}

pub type Summaries = BTreeMap<String, SummaryRecord>;

/// Outcome of one monitoring run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    PartialFailure,
    Failure,
    Error,
    Pending,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::PartialFailure => "partial_failure",
            Self::Failure => "failure",
            Self::Error => "error",
            Self::Pending => "pending",
            Self::Unknown => "unknown",
        }
    }

    /// Human label: `partial_failure` → `Partial Failure`.
    pub fn label(&self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn tooltip(&self) -> &'static str {
        match self {
            Self::Success => "All policy pages were successfully checked and processed",
            Self::PartialFailure => {
                "Some policy pages had issues but others were processed successfully"
            }
            Self::Failure => "The monitoring run failed - check the error details",
            Self::Pending => "Run is currently in progress or queued",
            Self::Error => "An error occurred during the monitoring run",
            Self::Unknown => "Status information not available",
        }
    }

    /// CSS-ish class used by both renderers.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::PartialFailure => "warning",
            _ => "error",
        }
    }
}

/// One error reported by a run. The collector has written both bare strings
/// and `{file, error}` / `{url, reason}` objects over time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunError {
    Message(String),
    Detail {
        #[serde(default, alias = "url")]
        file: Option<String>,
        #[serde(default, alias = "reason")]
        error: Option<String>,
    },
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message(msg) => f.write_str(msg),
            Self::Detail { file, error } => write!(
                f,
                "{}: {}",
                file.as_deref().unwrap_or("unknown"),
                error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

/// One monitoring run from `run_log.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLogEntry {
    /// ISO 8601 timestamp string.
    pub timestamp_utc: String,
    pub status: RunStatus,
    #[serde(default)]
    pub pages_checked: u64,
    #[serde(default)]
    pub changes_found: u64,
    #[serde(default)]
    pub errors: Vec<RunError>,
}

/// Run log, newest entry first.
pub type RunLog = Vec<RunLogEntry>;

/// Provenance of a weekly summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    #[serde(default)]
    pub run_date: Option<String>,
    #[serde(default)]
    pub run_type: Option<String>,
    #[serde(default)]
    pub week_start: Option<String>,
    #[serde(default)]
    pub week_end: Option<String>,
    #[serde(default)]
    pub generated_by: Option<String>,
}

/// One snapshot commit touching a policy during the week.
///
/// A policy changed by several commits appears once per commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedPolicy {
    pub policy_key: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub commit_date: Option<String>,
    #[serde(default)]
    pub commit_hash: Option<String>,
}

/// A week bucket from `weekly_summaries.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySummary {
    #[serde(default)]
    pub run_metadata: RunMetadata,
    /// Markdown summary text.
    #[serde(default)]
    pub summary: String,
    /// Commit count as reported by the aggregator.
    #[serde(default)]
    pub changes_count: u64,
    #[serde(default)]
    pub changed_policies: Vec<ChangedPolicy>,
}

/// Week buckets keyed by `YYYY-MM-DD_to_YYYY-MM-DD`, which sorts chronologically.
pub type WeeklySummaries = BTreeMap<String, WeeklySummary>;

/// Parse `weekly_summaries.json`, skipping `_`-prefixed metadata keys and
/// week entries that fail to deserialize.
pub fn parse_weekly_summaries(value: serde_json::Value) -> Result<WeeklySummaries, serde_json::Error> {
    let raw: BTreeMap<String, serde_json::Value> = serde_json::from_value(value)?;
    let mut weeks = WeeklySummaries::new();
    for (key, entry) in raw {
        if key.starts_with('_') {
            continue;
        }
        match serde_json::from_value::<WeeklySummary>(entry) {
            Ok(week) => {
                weeks.insert(key, week);
            }
            Err(e) => warn!(week = %key, error = %e, "skipping malformed weekly summary"),
        }
    }
    Ok(weeks)
}

/// A policy URL the health checker could not reach, from `health_alerts.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthAlert {
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub current_status: Option<serde_json::Value>,
    /// ISO 8601 timestamp string.
    pub timestamp: String,
}
