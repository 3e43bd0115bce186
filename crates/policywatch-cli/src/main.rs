//! `policywatch`: terminal and static-HTML views of the policy watcher data.

mod config;
mod display;
mod export;
mod html;
mod markdown;

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use policywatch_core::{Dashboard, DataFile, HistoryFilter, TimelineRange};
use policywatch_sync::{DashboardLoader, DataSource};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Settings;

/// Trust & Safety policy watcher dashboard
#[derive(Parser)]
#[command(name = "policywatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// System status and time to the next check
    Status {
        /// Keep ticking the countdown; reload when it reaches zero
        #[arg(long)]
        watch: bool,
    },

    /// Policy matrix grouped by platform
    Matrix,

    /// Policy summaries, optionally for one platform
    Policies {
        #[arg(long)]
        platform: Option<String>,
    },

    /// Recent policy updates, newest first
    Changes {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Weekly update detail (latest week by default)
    Weekly {
        /// Week key, e.g. 2025-07-26_to_2025-08-01
        #[arg(long)]
        week: Option<String>,
    },

    /// Unique policy changes per week
    Timeline {
        /// recent (8 weeks), quarter (12), or all
        #[arg(long, default_value = "recent")]
        range: TimelineRange,
    },

    /// Monitoring run history
    History {
        /// all, success, or failed
        #[arg(long, default_value = "all")]
        filter: HistoryFilter,
    },

    /// Fetch one data file again and report whether it loaded
    Retry {
        /// File name or URL, e.g. run_log.json
        file: DataFile,
    },

    /// Data load diagnostics
    Diagnostics {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the dashboard as a static HTML page
    Render {
        #[arg(long, default_value = "dashboard.html")]
        out: PathBuf,
    },

    /// Export the policy matrix as CSV
    ExportMatrix {
        /// Defaults to policy-matrix-<date>.csv
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    info!("policywatch v{}", env!("CARGO_PKG_VERSION"));

    let loader = cli.settings.loader()?;
    let mut dashboard = loader.load().await;
    for n in dashboard.notifications().active() {
        warn!(file = %n.file, kind = n.title, "data file unavailable");
    }
    let now = Utc::now();

    match cli.command {
        Commands::Status { watch: false } => display::print_status(&dashboard, now),
        Commands::Status { watch: true } => watch(&loader, &mut dashboard).await?,
        Commands::Matrix => display::print_matrix(&dashboard, now),
        Commands::Policies { platform } => {
            display::print_policies(&dashboard, platform.as_deref(), now)
        }
        Commands::Changes { limit } => display::print_changes(&dashboard, limit, now),
        Commands::Weekly { week } => display::print_week(&dashboard, week.as_deref())?,
        Commands::Timeline { range } => display::print_timeline(&dashboard, range),
        Commands::History { filter } => display::print_history(&dashboard, filter),
        Commands::Retry { file } => {
            if loader.retry(&mut dashboard, file).await {
                println!("Loaded {file}");
            } else {
                display::print_notifications(&dashboard);
                anyhow::bail!("{file} is still unavailable");
            }
        }
        Commands::Diagnostics { json } => {
            let report = dashboard.diagnostics(now);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                display::print_diagnostics(&report);
            }
        }
        Commands::Render { out } => {
            let page = html::render_page(&dashboard, now)?;
            std::fs::write(&out, page)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Wrote {}", out.display());
        }
        Commands::ExportMatrix { out } => {
            let out = out.unwrap_or_else(|| PathBuf::from(export::default_file_name(now)));
            std::fs::write(&out, export::matrix_csv(&dashboard))
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Wrote {}", out.display());
        }
    }

    Ok(())
}

/// Tick the countdown once a second until Ctrl-C. When the next check is
/// due the data is reloaded; with no new run the countdown rolls on to the
/// following slot.
async fn watch<S: DataSource>(
    loader: &DashboardLoader<S>,
    dashboard: &mut Dashboard,
) -> anyhow::Result<()> {
    display::print_status(dashboard, Utc::now());
    println!();

    let start = Utc::now();
    let mut due = start + chrono::Duration::seconds(dashboard.seconds_until_next_check(start));
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Utc::now();
                if now >= due {
                    info!("check due, reloading data");
                    loader.reload(dashboard).await;
                    display::print_notifications(dashboard);
                    due = now + chrono::Duration::seconds(dashboard.seconds_until_next_check(now));
                }
                print!("\r{:<40}", display::status_line(dashboard, now));
                std::io::stdout().flush()?;
            }
            result = &mut ctrl_c => {
                result.context("failed to listen for Ctrl-C")?;
                println!();
                return Ok(());
            }
        }
    }
}
