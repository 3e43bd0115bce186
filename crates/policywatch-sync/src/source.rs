//! Where dashboard data comes from.

use std::path::PathBuf;

use async_trait::async_trait;
use policywatch_core::{CoreError, DataFile, FailureKind};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SourceError {
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("not found: {location}")]
    NotFound { location: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid data: {0}")]
    Parse(#[from] CoreError),
}

impl SourceError {
    /// Classify for the notification shown to the user.
    pub fn kind(&self) -> FailureKind {
        match self {
            #[cfg(feature = "http")]
            Self::Http(e) if e.is_decode() => FailureKind::Format,
            #[cfg(feature = "http")]
            Self::Http(_) => FailureKind::Network,
            Self::Server { status: 404, .. } | Self::NotFound { .. } => FailureKind::NotFound,
            Self::Server { .. } => FailureKind::Server,
            Self::Io(_) => FailureKind::Io,
            Self::Parse(_) => FailureKind::Format,
        }
    }
}

/// A place the static JSON files can be read from.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Human-readable location of `file` (URL or path), for notifications.
    fn location(&self, file: DataFile) -> String;

    /// Raw body of `file`.
    async fn fetch(&self, file: DataFile) -> Result<Vec<u8>, SourceError>;
}

#[async_trait]
impl<T: DataSource + ?Sized> DataSource for Box<T> {
    fn location(&self, file: DataFile) -> String {
        (**self).location(file)
    }

    async fn fetch(&self, file: DataFile) -> Result<Vec<u8>, SourceError> {
        (**self).fetch(file).await
    }
}

/// Reads the data files from a local directory, e.g. a checkout of the
/// collector's data repository.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, file: DataFile) -> PathBuf {
        self.root.join(file.file_name())
    }
}

#[async_trait]
impl DataSource for DirSource {
    fn location(&self, file: DataFile) -> String {
        self.path(file).display().to_string()
    }

    async fn fetch(&self, file: DataFile) -> Result<Vec<u8>, SourceError> {
        let path = self.path(file);
        debug!(path = %path.display(), "reading data file");
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(SourceError::NotFound {
                location: path.display().to_string(),
            }),
            Err(e) => Err(SourceError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dir_source_reads_and_reports_missing() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("run_log.json"), b"[]").unwrap();
        let source = DirSource::new(tmp.path());

        assert_eq!(source.fetch(DataFile::RunLog).await.unwrap(), b"[]");

        let err = source.fetch(DataFile::Summaries).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::NotFound);
        assert!(source.location(DataFile::Summaries).ends_with("summaries.json"));
    }

    #[test]
    fn classification() {
        let server = SourceError::Server {
            status: 404,
            body: String::new(),
        };
        assert_eq!(server.kind(), FailureKind::NotFound);
        let server = SourceError::Server {
            status: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(server.kind(), FailureKind::Server);
        let parse = SourceError::Parse(CoreError::NullPayload {
            file: "run_log.json",
        });
        assert_eq!(parse.kind(), FailureKind::Format);
    }
}
