/// Streaming HTTP download of a single video.
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use reelpull_shared::config::DEFAULT_CONTENT_TYPE;
use reelpull_shared::manifest::normalize_file_name;
use reelpull_shared::{FetchError, ProgressEvent, ProgressReporter};

use crate::provision::join_under;

/// A video written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Retrieves one remote payload into a directory.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download `url` into `dir/<file_name>.mp4`, overwriting any existing file.
    async fn fetch(
        &self,
        url: &str,
        file_name: &str,
        dir: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<FetchedFile, FetchError>;
}

/// Fetcher over a reqwest client. No timeout and no retry.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    expected_content_type: String,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Client::new(), DEFAULT_CONTENT_TYPE)
    }
}

impl HttpFetcher {
    pub fn new(client: Client, expected_content_type: impl Into<String>) -> Self {
        Self {
            client,
            expected_content_type: expected_content_type.into(),
        }
    }

    /// Whether a `Content-Type` header value contains the expected media type.
    /// The match is case-sensitive.
    pub fn is_expected_type(&self, content_type: Option<&str>) -> bool {
        content_type
            .map(|ct| ct.contains(self.expected_content_type.as_str()))
            .unwrap_or(false)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        file_name: &str,
        dir: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<FetchedFile, FetchError> {
        let file_name = normalize_file_name(file_name);
        let path = join_under(dir, &file_name);
        debug!("Fetching {} -> {}", url, path.display());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if !self.is_expected_type(content_type.as_deref()) {
            reporter.finish_line();
            warn!(
                "Warning: {} may not be an MP4 file (Content-Type: {})",
                file_name,
                content_type.as_deref().unwrap_or("none")
            );
        }

        let total_bytes = response.content_length().filter(|len| *len > 0);
        reporter.report(&ProgressEvent::FileStarted {
            file_name: file_name.clone(),
            total_bytes,
        });

        let write_err = |source: std::io::Error| FetchError::Write {
            path: path.clone(),
            source,
        };
        let mut file = File::create(&path).await.map_err(write_err)?;

        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| FetchError::Stream {
                url: url.to_string(),
                source,
            })?;
            file.write_all(&chunk).await.map_err(write_err)?;
            downloaded += chunk.len() as u64;
            reporter.report(&ProgressEvent::FileProgress {
                file_name: file_name.clone(),
                downloaded,
                total_bytes,
            });
        }
        file.flush().await.map_err(write_err)?;
        drop(file);

        reporter.report(&ProgressEvent::FileFinished {
            file_name,
            path: path.clone(),
            bytes: downloaded,
        });

        Ok(FetchedFile {
            path,
            bytes: downloaded,
        })
    }
}
