//! Where to read data from and how hard to try, from flags or `POLICYWATCH_*`
//! environment variables.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use policywatch_core::MonitorSchedule;
use policywatch_sync::{DashboardLoader, DataSource, DirSource, HttpSource, RetryPolicy};
use tracing::info;

/// Raw files of the public data repository, `main` branch.
pub const DEFAULT_BASE_URL: &str = "https://raw.githubusercontent.com/lyori6/ts-policy-watcher/main";

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Base URL the JSON data files are published under
    #[arg(long, env = "POLICYWATCH_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Read the data files from a local directory instead of the base URL
    #[arg(long, env = "POLICYWATCH_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Fetch attempts per file before raising a notification
    #[arg(long, env = "POLICYWATCH_RETRIES", default_value_t = 3, global = true)]
    pub retries: u32,

    /// Base retry delay; attempt n waits n times this
    #[arg(long, env = "POLICYWATCH_RETRY_DELAY_MS", default_value_t = 1000, global = true)]
    pub retry_delay_ms: u64,

    /// Hours between monitoring runs (1-24)
    #[arg(
        long,
        env = "POLICYWATCH_CHECK_INTERVAL_HOURS",
        default_value_t = 6,
        value_parser = clap::value_parser!(u32).range(1..=24),
        global = true
    )]
    pub check_interval_hours: u32,

    /// Per-request HTTP timeout
    #[arg(long, env = "POLICYWATCH_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,
}

impl Settings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retries.max(1),
            base_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn schedule(&self) -> MonitorSchedule {
        MonitorSchedule::every_hours(self.check_interval_hours)
    }

    pub fn source(&self) -> anyhow::Result<Box<dyn DataSource>> {
        match &self.data_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "reading data files from directory");
                Ok(Box::new(DirSource::new(dir.clone())))
            }
            None => {
                info!(base_url = %self.base_url, "fetching data files over HTTP");
                let source = HttpSource::with_timeout(
                    self.base_url.clone(),
                    Duration::from_secs(self.timeout_secs),
                )
                .context("failed to build HTTP client")?;
                Ok(Box::new(source))
            }
        }
    }

    pub fn loader(&self) -> anyhow::Result<DashboardLoader<Box<dyn DataSource>>> {
        Ok(DashboardLoader::new(
            self.source()?,
            self.retry_policy(),
            self.schedule(),
        ))
    }
}
