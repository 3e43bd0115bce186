//! Concurrent dashboard loading with bounded retry.

use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use policywatch_core::{Dashboard, DataFile, DataPayload, FetchFailure, MonitorSchedule};
use tracing::{error, info, warn};

use crate::source::{DataSource, SourceError};

/// Attempt `n` failing waits `base_delay * n` before attempt `n + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Builds [`Dashboard`]s from a [`DataSource`].
pub struct DashboardLoader<S> {
    source: S,
    retry: RetryPolicy,
    schedule: MonitorSchedule,
}

impl<S: DataSource> DashboardLoader<S> {
    pub fn new(source: S, retry: RetryPolicy, schedule: MonitorSchedule) -> Self {
        Self {
            source,
            retry,
            schedule,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch and parse one file, retrying per the policy.
    pub async fn fetch_file(&self, file: DataFile) -> Result<DataPayload, FetchFailure> {
        let attempts = self.retry.attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.try_fetch(file).await {
                Ok(payload) => {
                    if attempt > 1 {
                        info!(file = %file, attempt, "fetched on retry");
                    }
                    return Ok(payload);
                }
                Err(e) if attempt >= attempts => {
                    error!(file = %file, attempts, error = %e, "giving up on data file");
                    return Err(FetchFailure {
                        file,
                        kind: e.kind(),
                        location: self.source.location(file),
                        message: e.to_string(),
                        attempts,
                    });
                }
                Err(e) => {
                    warn!(file = %file, attempt, attempts, error = %e, "fetch failed, retrying");
                    tokio::time::sleep(self.retry.delay_after(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn try_fetch(&self, file: DataFile) -> Result<DataPayload, SourceError> {
        let body = self.source.fetch(file).await?;
        Ok(file.parse(&body)?)
    }

    /// Fetch every file concurrently and build a dashboard once all settle.
    ///
    /// Files that still fail get one notification each and stay empty.
    pub async fn load(&self) -> Dashboard {
        let mut dashboard = Dashboard::new(self.schedule.clone());
        self.reload(&mut dashboard).await;
        dashboard
    }

    /// Refetch every file into an existing dashboard. Files that fail keep
    /// their previous data.
    pub async fn reload(&self, dashboard: &mut Dashboard) {
        let results = join_all(DataFile::ALL.into_iter().map(|file| self.fetch_file(file))).await;

        let mut failed = 0;
        for result in results {
            match result {
                Ok(payload) => dashboard.apply(payload),
                Err(failure) => {
                    failed += 1;
                    dashboard.record_failure(failure, Utc::now());
                }
            }
        }
        info!(
            policies = dashboard.policies.len(),
            summaries = dashboard.summaries.len(),
            runs = dashboard.run_log.len(),
            weeks = dashboard.weekly.len(),
            failed,
            "dashboard data loaded"
        );
    }

    /// Retry one file. On success its data is replaced and its notification
    /// removed; on failure the notification is refreshed.
    pub async fn retry(&self, dashboard: &mut Dashboard, file: DataFile) -> bool {
        info!(file = %file, "retrying data load");
        match self.fetch_file(file).await {
            Ok(payload) => {
                dashboard.apply(payload);
                true
            }
            Err(failure) => {
                dashboard.record_failure(failure, Utc::now());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use policywatch_core::{FailureKind, SystemStatus};

    use super::*;

    #[derive(Clone, Copy)]
    enum Step {
        Body(&'static str),
        Status(u16),
    }

    /// Replays scripted responses per file; an exhausted script repeats its last step.
    #[derive(Default)]
    struct ScriptedSource {
        steps: Mutex<HashMap<DataFile, VecDeque<Step>>>,
        calls: Mutex<HashMap<DataFile, u32>>,
    }

    impl ScriptedSource {
        fn script(self, file: DataFile, steps: Vec<Step>) -> Self {
            self.steps.lock().unwrap().insert(file, steps.into());
            self
        }

        fn calls(&self, file: DataFile) -> u32 {
            self.calls.lock().unwrap().get(&file).copied().unwrap_or(0)
        }

        fn all_ok() -> Self {
            Self::default()
                .script(
                    DataFile::RunLog,
                    vec![Step::Body(
                        r#"[{"timestamp_utc": "2025-08-01T12:00:00Z", "status": "success", "pages_checked": 2}]"#,
                    )],
                )
                .script(DataFile::Summaries, vec![Step::Body("{}")])
                .script(
                    DataFile::PlatformUrls,
                    vec![Step::Body(
                        r#"[{"slug": "tiktok-cg", "platform": "TikTok", "name": "CG", "url": "https://t.example"}]"#,
                    )],
                )
                .script(DataFile::WeeklySummaries, vec![Step::Body("{}")])
                .script(DataFile::HealthAlerts, vec![Step::Body("[]")])
        }
    }

    #[async_trait]
    impl DataSource for ScriptedSource {
        fn location(&self, file: DataFile) -> String {
            format!("mem://{file}")
        }

        async fn fetch(&self, file: DataFile) -> Result<Vec<u8>, SourceError> {
            *self.calls.lock().unwrap().entry(file).or_default() += 1;
            let mut steps = self.steps.lock().unwrap();
            let queue = steps.entry(file).or_default();
            let step = if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().copied()
            };
            match step {
                Some(Step::Body(body)) => Ok(body.as_bytes().to_vec()),
                Some(Step::Status(status)) => Err(SourceError::Server {
                    status,
                    body: String::new(),
                }),
                None => Err(SourceError::NotFound {
                    location: self.location(file),
                }),
            }
        }
    }

    fn loader(source: ScriptedSource, attempts: u32) -> DashboardLoader<ScriptedSource> {
        DashboardLoader::new(
            source,
            RetryPolicy {
                attempts,
                base_delay: Duration::ZERO,
            },
            MonitorSchedule::default(),
        )
    }

    #[test]
    fn linear_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_secs(1));
        assert_eq!(policy.delay_after(2), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn loads_everything() {
        let loader = loader(ScriptedSource::all_ok(), 3);
        let dashboard = loader.load().await;
        assert_eq!(dashboard.policies.len(), 1);
        assert_eq!(dashboard.run_log.len(), 1);
        assert!(dashboard.notifications().active().is_empty());
        for file in DataFile::ALL {
            assert!(dashboard.is_loaded(file), "{file} not loaded");
            assert_eq!(loader.source().calls(file), 1);
        }
    }

    #[tokio::test]
    async fn transient_failure_recovers_without_notification() {
        let source = ScriptedSource::all_ok().script(
            DataFile::Summaries,
            vec![Step::Status(503), Step::Status(502), Step::Body("{}")],
        );
        let loader = loader(source, 3);
        let dashboard = loader.load().await;
        assert!(dashboard.is_loaded(DataFile::Summaries));
        assert!(dashboard.notifications().active().is_empty());
        assert_eq!(loader.source().calls(DataFile::Summaries), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_raise_exactly_one_notification() {
        let source = ScriptedSource::all_ok().script(DataFile::RunLog, vec![Step::Status(500)]);
        let loader = loader(source, 3);
        let dashboard = loader.load().await;

        let active = dashboard.notifications().active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].file, DataFile::RunLog);
        assert_eq!(active[0].kind, FailureKind::Server);
        assert_eq!(active[0].attempts, 3);
        assert_eq!(active[0].location, "mem://run_log.json");
        assert_eq!(loader.source().calls(DataFile::RunLog), 3);

        // Other files still render; the status degrades to an empty state.
        assert!(dashboard.is_loaded(DataFile::PlatformUrls));
        assert_eq!(
            dashboard.status(Utc::now()),
            SystemStatus::NoData
        );
    }

    #[tokio::test]
    async fn retry_success_removes_notification() {
        let source = ScriptedSource::all_ok().script(
            DataFile::WeeklySummaries,
            vec![
                Step::Status(404),
                Step::Status(404),
                Step::Body(r#"{"2025-07-26_to_2025-08-01": {"changed_policies": [{"policy_key": "tiktok-cg"}]}}"#),
            ],
        );
        let loader = loader(source, 2);
        let mut dashboard = loader.load().await;
        assert_eq!(dashboard.notifications().active().len(), 1);
        assert_eq!(
            dashboard.notifications().active()[0].kind,
            FailureKind::NotFound
        );
        assert!(dashboard.weekly.is_empty());

        assert!(loader.retry(&mut dashboard, DataFile::WeeklySummaries).await);
        assert!(dashboard.notifications().active().is_empty());
        assert_eq!(dashboard.weekly.len(), 1);
    }

    #[tokio::test]
    async fn failed_retry_does_not_duplicate_notification() {
        let source = ScriptedSource::all_ok().script(DataFile::Summaries, vec![Step::Status(500)]);
        let loader = loader(source, 1);
        let mut dashboard = loader.load().await;
        assert!(!loader.retry(&mut dashboard, DataFile::Summaries).await);
        assert!(!loader.retry(&mut dashboard, DataFile::Summaries).await);
        assert_eq!(dashboard.notifications().active().len(), 1);
        assert_eq!(dashboard.notifications().reports().len(), 3);
    }

    #[tokio::test]
    async fn null_and_malformed_bodies_are_format_errors() {
        let source = ScriptedSource::all_ok()
            .script(DataFile::RunLog, vec![Step::Body("null")])
            .script(DataFile::PlatformUrls, vec![Step::Body("{not json")]);
        let loader = loader(source, 1);
        let dashboard = loader.load().await;
        let kinds: Vec<FailureKind> = dashboard
            .notifications()
            .active()
            .iter()
            .map(|n| n.kind)
            .collect();
        assert_eq!(kinds, vec![FailureKind::Format, FailureKind::Format]);
        assert!(dashboard.policies.is_empty());
    }

    #[tokio::test]
    async fn reload_keeps_previous_data_on_failure() {
        let source = ScriptedSource::all_ok().script(
            DataFile::PlatformUrls,
            vec![
                Step::Body(r#"[{"slug": "a", "platform": "Meta", "name": "A", "url": "u"}]"#),
                Step::Status(500),
            ],
        );
        let loader = loader(source, 1);
        let mut dashboard = loader.load().await;
        assert_eq!(dashboard.policies.len(), 1);

        loader.reload(&mut dashboard).await;
        assert_eq!(dashboard.policies.len(), 1);
        assert_eq!(dashboard.notifications().active().len(), 1);
    }
}
