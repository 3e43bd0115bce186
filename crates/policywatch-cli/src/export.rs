//! CSV export of the policy matrix.

use chrono::{DateTime, Utc};
use policywatch_core::Dashboard;
use policywatch_core::timestamp::format_datetime;

const HEADERS: &[&str] = &["Platform", "Policy Name", "Status", "Last Updated", "URL"];

/// Default file name, `policy-matrix-YYYY-MM-DD.csv`.
pub fn default_file_name(now: DateTime<Utc>) -> String {
    format!("policy-matrix-{}.csv", now.format("%Y-%m-%d"))
}

/// One row per policy in matrix order; every field quoted.
pub fn matrix_csv(dashboard: &Dashboard) -> String {
    let mut csv = row(HEADERS.iter().copied());
    for group in dashboard.matrix() {
        for view in &group.policies {
            let updated = view.last_updated().map(format_datetime).unwrap_or_default();
            csv.push_str(&row([
                group.platform.as_str(),
                view.policy.name.as_str(),
                view.status(),
                updated.as_str(),
                view.policy.url.as_str(),
            ]));
        }
    }
    csv
}

fn row<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = fields
        .into_iter()
        .map(|field| format!("\"{}\"", field.replace('"', "\"\"")))
        .collect();
    quoted.join(",") + "\n"
}
