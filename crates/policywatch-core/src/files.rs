//! The static JSON files the dashboard loads and their typed payloads.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CoreError;
use crate::model::{
    parse_weekly_summaries, HealthAlert, PolicyRecord, RunLog, Summaries, WeeklySummaries,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DataFile {
    RunLog,
    Summaries,
    PlatformUrls,
    WeeklySummaries,
    HealthAlerts,
}

impl DataFile {
    pub const ALL: [DataFile; 5] = [
        DataFile::RunLog,
        DataFile::Summaries,
        DataFile::PlatformUrls,
        DataFile::WeeklySummaries,
        DataFile::HealthAlerts,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::RunLog => "run_log.json",
            Self::Summaries => "summaries.json",
            Self::PlatformUrls => "platform_urls.json",
            Self::WeeklySummaries => "weekly_summaries.json",
            Self::HealthAlerts => "health_alerts.json",
        }
    }

    /// Optional files render an empty state when absent instead of
    /// leaving a core view blank.
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::WeeklySummaries | Self::HealthAlerts)
    }

    /// Parse a fetched body. A JSON `null` body is rejected.
    pub fn parse(&self, body: &[u8]) -> Result<DataPayload, CoreError> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        if value.is_null() {
            return Err(CoreError::NullPayload {
                file: self.file_name(),
            });
        }
        let payload = match self {
            Self::RunLog => DataPayload::RunLog(serde_json::from_value(value)?),
            Self::Summaries => DataPayload::Summaries(serde_json::from_value(value)?),
            Self::PlatformUrls => DataPayload::PlatformUrls(serde_json::from_value(value)?),
            Self::WeeklySummaries => DataPayload::WeeklySummaries(parse_weekly_summaries(value)?),
            Self::HealthAlerts => DataPayload::HealthAlerts(serde_json::from_value(value)?),
        };
        Ok(payload)
    }
}

impl fmt::Display for DataFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

impl FromStr for DataFile {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept a bare name, a file name, or a full URL ending in one.
        let name = s.trim().rsplit('/').next().unwrap_or_default();
        let name = name.strip_suffix(".json").unwrap_or(name);
        match name {
            "run_log" => Ok(Self::RunLog),
            "summaries" => Ok(Self::Summaries),
            "platform_urls" => Ok(Self::PlatformUrls),
            "weekly_summaries" => Ok(Self::WeeklySummaries),
            "health_alerts" => Ok(Self::HealthAlerts),
            _ => Err(CoreError::UnknownDataFile(s.to_string())),
        }
    }
}

/// A parsed data file.
#[derive(Debug, Clone, PartialEq)]
pub enum DataPayload {
    RunLog(RunLog),
    Summaries(Summaries),
    PlatformUrls(Vec<PolicyRecord>),
    WeeklySummaries(WeeklySummaries),
    HealthAlerts(Vec<HealthAlert>),
}

impl DataPayload {
    pub fn file(&self) -> DataFile {
        match self {
            Self::RunLog(_) => DataFile::RunLog,
            Self::Summaries(_) => DataFile::Summaries,
            Self::PlatformUrls(_) => DataFile::PlatformUrls,
            Self::WeeklySummaries(_) => DataFile::WeeklySummaries,
            Self::HealthAlerts(_) => DataFile::HealthAlerts,
        }
    }

    /// Entry count shown in diagnostics.
    pub fn len(&self) -> usize {
        match self {
            Self::RunLog(v) => v.len(),
            Self::Summaries(v) => v.len(),
            Self::PlatformUrls(v) => v.len(),
            Self::WeeklySummaries(v) => v.len(),
            Self::HealthAlerts(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
