//! Core of the policy watcher dashboard: snapshot types, weekly analytics,
//! check scheduling, and load-failure notifications.

pub mod dashboard;
pub mod error;
pub mod files;
pub mod model;
pub mod notify;
pub mod platform;
pub mod schedule;
pub mod text;
pub mod timestamp;
pub mod weekly;

pub use dashboard::{Dashboard, DiagnosticReport, HistoryFilter, PlatformActivity, PolicyView};
pub use error::CoreError;
pub use files::{DataFile, DataPayload};
pub use model::{
    ChangedPolicy, HealthAlert, PolicyRecord, RunLogEntry, RunStatus, SummaryRecord,
    WeeklySummary,
};
pub use notify::{FailureKind, FetchFailure, Notification, NotificationCenter};
pub use platform::PlatformResolver;
pub use schedule::{format_countdown, MonitorSchedule, SystemStatus};
pub use weekly::{TimelineRange, WeeklyPlatformSeries};
