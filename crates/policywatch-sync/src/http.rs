//! HTTP source for the published data files (e.g. raw.githubusercontent.com).

use std::time::Duration;

use async_trait::async_trait;
use policywatch_core::DataFile;
use tracing::info;

use crate::source::{DataSource, SourceError};

/// Fetches `<base_url>/<file>.json` with plain GETs.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    /// Create a source for the given base URL.
    ///
    /// `base_url` should be like `https://raw.githubusercontent.com/owner/repo/main`;
    /// a trailing slash is trimmed.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Like [`new`](Self::new) with a per-request timeout.
    pub fn with_timeout(base_url: String, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl DataSource for HttpSource {
    fn location(&self, file: DataFile) -> String {
        format!("{}/{}", self.base_url, file.file_name())
    }

    async fn fetch(&self, file: DataFile) -> Result<Vec<u8>, SourceError> {
        let url = self.location(file);

        info!(url = %url, "fetching data file");
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SourceError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        info!(url = %url, bytes = bytes.len(), "fetched data file");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_source_trims_trailing_slash() {
        let source = HttpSource::new("https://raw.githubusercontent.com/o/r/main/".into());
        assert_eq!(source.base_url, "https://raw.githubusercontent.com/o/r/main");
    }

    #[test]
    fn locations_join_file_names() {
        let source = HttpSource::new("http://localhost:8000".into());
        assert_eq!(
            source.location(DataFile::WeeklySummaries),
            "http://localhost:8000/weekly_summaries.json"
        );
    }

    /// Answer one request with `response`, then close.
    async fn serve_once(response: &'static str) -> std::net::SocketAddr {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await.unwrap();
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn not_found_response_is_a_server_error() {
        let addr = serve_once(
            "HTTP/1.1 404 Not Found\r\ncontent-length: 9\r\nconnection: close\r\n\r\nnot found",
        )
        .await;
        let source = HttpSource::new(format!("http://{addr}"));
        let err = source.fetch(DataFile::RunLog).await.unwrap_err();
        assert!(
            matches!(&err, SourceError::Server { status: 404, body } if body == "not found"),
            "unexpected error: {err:?}"
        );
        assert_eq!(err.kind(), policywatch_core::FailureKind::NotFound);
    }

    #[tokio::test]
    async fn server_error_keeps_its_status() {
        let addr = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;
        let source = HttpSource::new(format!("http://{addr}/"));
        let err = source.fetch(DataFile::Summaries).await.unwrap_err();
        assert!(matches!(err, SourceError::Server { status: 503, .. }));
        assert_eq!(err.kind(), policywatch_core::FailureKind::Server);
    }

    #[tokio::test]
    async fn ok_response_returns_body() {
        let addr = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n[]",
        )
        .await;
        let source = HttpSource::new(format!("http://{addr}"));
        let body = source.fetch(DataFile::RunLog).await.unwrap();
        assert_eq!(body, b"[]");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_failure() {
        let source =
            HttpSource::with_timeout("http://127.0.0.1:9".into(), Duration::from_secs(2)).unwrap();
        let err = source.fetch(DataFile::RunLog).await.unwrap_err();
        assert_eq!(err.kind(), policywatch_core::FailureKind::Network);
    }
}
