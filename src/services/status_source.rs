//! Status source: loads the current status snapshot from the status store.

use crate::{
    models::status::StatusSettings,
    services::object_reader::{ReadError, S3ObjectReader},
};
use async_trait::async_trait;
use std::{io, path::PathBuf};
use thiserror::Error;

#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn current_status(&self) -> Result<StatusSettings, StatusError>;
}

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("status document unavailable: {0}")]
    Read(#[from] ReadError),
    #[error("status file unavailable: {0}")]
    Io(#[from] io::Error),
    #[error("status document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Status document stored as a JSON object in the status bucket.
#[derive(Clone)]
pub struct S3StatusSource {
    reader: S3ObjectReader,
    bucket: String,
    key: String,
}

impl S3StatusSource {
    pub fn new(reader: S3ObjectReader, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            reader,
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

#[async_trait]
impl StatusSource for S3StatusSource {
    async fn current_status(&self) -> Result<StatusSettings, StatusError> {
        let text = self.reader.fetch(&self.bucket, &self.key).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Status document kept in a local JSON file.
#[derive(Clone, Debug)]
pub struct FileStatusSource {
    path: PathBuf,
}

impl FileStatusSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StatusSource for FileStatusSource {
    async fn current_status(&self) -> Result<StatusSettings, StatusError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::status::StatusLevel;
    use serde_json::json;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn file_source_reads_snapshot() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{"Level":"Warning","Paused":["intake"]}"#).unwrap();

        let settings = FileStatusSource::new(file.path()).current_status().await.unwrap();

        assert_eq!(settings.level(), StatusLevel::Warning);
        assert_eq!(settings.get("Paused"), Some(&json!(["intake"])));
    }

    #[tokio::test]
    async fn malformed_snapshot_is_an_error() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "not json").unwrap();

        let result = FileStatusSource::new(file.path()).current_status().await;

        assert!(matches!(result, Err(StatusError::Malformed(_))));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();

        let result = FileStatusSource::new(dir.path().join("status.json"))
            .current_status()
            .await;

        assert!(matches!(result, Err(StatusError::Io(_))));
    }
}
