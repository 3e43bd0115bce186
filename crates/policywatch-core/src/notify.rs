//! Error notifications for failed data loads.
//!
//! At most one notification is live per data file: a repeated failure
//! refreshes it in place, and a successful retry removes it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::files::DataFile;

/// Error reports retained for the diagnostics view.
pub const MAX_ERROR_REPORTS: usize = 10;

/// Why a fetch failed, as far as the user is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    Format,
    NotFound,
    Server,
    Io,
}

impl FailureKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Network => "Network Error",
            Self::Format => "Data Format Error",
            Self::NotFound => "File Not Found",
            Self::Server | Self::Io => "Data Loading Error",
        }
    }

    pub fn suggestions(&self) -> &'static [&'static str] {
        match self {
            Self::Network => &[
                "Check your internet connection",
                "Try refreshing the page",
                "Verify the server is running",
            ],
            Self::Format => &[
                "The data file may be corrupted",
                "Try refreshing the page",
                "Contact the administrator",
            ],
            Self::NotFound => &[
                "The data file may not exist yet",
                "Run the data collection script",
                "Check if the repository is properly configured",
            ],
            Self::Server | Self::Io => &[
                "Try refreshing the page",
                "Check the logs for more details",
                "Contact support if the problem persists",
            ],
        }
    }
}

/// A fetch that failed after every retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub file: DataFile,
    pub kind: FailureKind,
    /// Where the file was fetched from (URL or path).
    pub location: String,
    pub message: String,
    pub attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub file: DataFile,
    pub kind: FailureKind,
    pub title: &'static str,
    pub location: String,
    pub message: String,
    pub attempts: u32,
    pub raised_at: DateTime<Utc>,
}

impl Notification {
    pub fn suggestions(&self) -> &'static [&'static str] {
        self.kind.suggestions()
    }

    /// DOM id used by the HTML renderer.
    pub fn element_id(&self) -> String {
        format!("error-{}", self.id)
    }
}

/// Failure record kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub timestamp: DateTime<Utc>,
    pub failure: FetchFailure,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NotificationCenter {
    next_id: u64,
    active: Vec<Notification>,
    reports: Vec<ErrorReport>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface a failed fetch. Replaces any live notification for the same
    /// file, so each file shows at most one.
    pub fn raise(&mut self, failure: FetchFailure, now: DateTime<Utc>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        let notification = Notification {
            id,
            file: failure.file,
            kind: failure.kind,
            title: failure.kind.title(),
            location: failure.location.clone(),
            message: failure.message.clone(),
            attempts: failure.attempts,
            raised_at: now,
        };
        match self.active.iter_mut().find(|n| n.file == failure.file) {
            Some(existing) => *existing = notification,
            None => self.active.push(notification),
        }

        self.reports.push(ErrorReport {
            timestamp: now,
            failure,
        });
        if self.reports.len() > MAX_ERROR_REPORTS {
            let excess = self.reports.len() - MAX_ERROR_REPORTS;
            self.reports.drain(..excess);
        }
        id
    }

    /// Close a notification; returns false when no such id is live.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.id != id);
        self.active.len() != before
    }

    /// Clear the notification for a file after it loaded successfully.
    pub fn resolve(&mut self, file: DataFile) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.file != file);
        self.active.len() != before
    }

    pub fn active(&self) -> &[Notification] {
        &self.active
    }

    pub fn for_file(&self, file: DataFile) -> Option<&Notification> {
        self.active.iter().find(|n| n.file == file)
    }

    pub fn reports(&self) -> &[ErrorReport] {
        &self.reports
    }
}
