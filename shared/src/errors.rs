/// Unified error types for the Reelpull system.
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error for one batch run.
///
/// Load and directory faults always end the run. Fetch faults end it only
/// under `FailurePolicy::Abort`, and carry how far the run got.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Manifest error: {0}")]
    Load(#[from] LoadError),

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Download of '{title}' failed after {completed}/{total} videos: {source}")]
    Fetch {
        title: String,
        completed: usize,
        total: usize,
        #[source]
        source: FetchError,
    },
}

impl BatchError {
    /// Number of videos downloaded before the run stopped, when known.
    pub fn completed(&self) -> Option<usize> {
        match self {
            BatchError::Fetch { completed, .. } => Some(*completed),
            _ => None,
        }
    }
}

/// Errors reading or parsing the manifest.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read manifest '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest is not valid JSON of the expected shape: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A storage fault while creating a directory.
#[derive(Debug, Error)]
#[error("Failed to create directory '{path}': {source}")]
pub struct DirectoryError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Errors while retrieving one video.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Server answered {status} for '{url}'")]
    Status { url: String, status: u16 },

    #[error("Response stream from '{url}' broke: {source}")]
    Stream {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_carries_progress() {
        let err = BatchError::Fetch {
            title: "one".to_string(),
            completed: 2,
            total: 5,
            source: FetchError::Status {
                url: "http://x/v.mp4".to_string(),
                status: 404,
            },
        };
        assert_eq!(err.completed(), Some(2));
        let msg = err.to_string();
        assert!(msg.contains("2/5"));
        assert!(msg.contains("404"));
    }

    #[test]
    fn test_load_error_has_no_progress() {
        let parse = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err = BatchError::from(LoadError::from(parse));
        assert_eq!(err.completed(), None);
        assert!(err.to_string().starts_with("Manifest error"));
    }
}
