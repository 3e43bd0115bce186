//! Sync layer: data sources for the published JSON files and the retrying loader.

pub mod loader;
pub mod source;

#[cfg(feature = "http")]
pub mod http;

pub use loader::{DashboardLoader, RetryPolicy};
pub use source::{DataSource, DirSource, SourceError};

#[cfg(feature = "http")]
pub use http::HttpSource;
