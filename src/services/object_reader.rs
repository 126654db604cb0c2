//! src/services/object_reader.rs
//!
//! Object reader: fetches one stored object and decodes it as UTF-8 text.
//! Two backends are provided: the remote object store (S3 `GetObject`) and a
//! local directory laid out as `root/{bucket}/{key}` for development.
//!
//! Readers never raise to the orchestrator. Any failure is logged and
//! surfaces as `None`; the body stream is dropped on every exit path.

use async_trait::async_trait;
use aws_sdk_s3::{Client, error::DisplayErrorContext};
use std::{
    io::{self, ErrorKind},
    path::PathBuf,
    string::FromUtf8Error,
};
use thiserror::Error;
use tokio::{fs::File, io::AsyncReadExt};
use tracing::error;

const MAX_OBJECT_KEY_LEN: usize = 1024;
const BUCKET_NAME_MIN_LEN: usize = 3;
const BUCKET_NAME_MAX_LEN: usize = 63;

#[async_trait]
pub trait ObjectReader: Send + Sync {
    /// Full object body as text, or `None` when it cannot be read.
    async fn read(&self, bucket: &str, key: &str) -> Option<String>;
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("object `{key}` not found in bucket `{bucket}`")]
    ObjectNotFound { bucket: String, key: String },
    #[error("invalid object key")]
    InvalidObjectKey,
    #[error("bucket `{name}` invalid: {reason}")]
    InvalidBucketName { name: String, reason: String },
    #[error("object body is not valid UTF-8")]
    NotUtf8(#[from] FromUtf8Error),
    #[error("storage service error: {0}")]
    Service(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type ReadResult<T> = Result<T, ReadError>;

/// Reads objects from the remote object store.
#[derive(Clone)]
pub struct S3ObjectReader {
    client: Client,
}

impl S3ObjectReader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetch and decode the object, keeping the failure reason.
    pub async fn fetch(&self, bucket: &str, key: &str) -> ReadResult<String> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                if err
                    .as_service_error()
                    .is_some_and(|service| service.is_no_such_key())
                {
                    ReadError::ObjectNotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    ReadError::Service(DisplayErrorContext(&err).to_string())
                }
            })?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|err| ReadError::Service(err.to_string()))?;

        Ok(String::from_utf8(body.into_bytes().to_vec())?)
    }
}

#[async_trait]
impl ObjectReader for S3ObjectReader {
    async fn read(&self, bucket: &str, key: &str) -> Option<String> {
        match self.fetch(bucket, key).await {
            Ok(text) => Some(text),
            Err(err) => {
                error!("Error reading file from storage: {}", err);
                None
            }
        }
    }
}

/// Reads objects from a local directory tree (`root/{bucket}/{key}`).
#[derive(Clone, Debug)]
pub struct LocalObjectReader {
    root: PathBuf,
}

impl LocalObjectReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Rejects keys that are empty, absolute, or could walk out of the bucket.
    fn ensure_key_safe(key: &str) -> ReadResult<()> {
        if key.is_empty() || key.len() > MAX_OBJECT_KEY_LEN {
            return Err(ReadError::InvalidObjectKey);
        }
        if key.starts_with('/') || key.split('/').any(|segment| segment == "..") {
            return Err(ReadError::InvalidObjectKey);
        }
        if key
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
        {
            return Err(ReadError::InvalidObjectKey);
        }
        Ok(())
    }

    /// Bucket names map to a single directory, so only DNS-style names pass.
    fn ensure_bucket_name_safe(name: &str) -> ReadResult<()> {
        let invalid = |reason: &str| ReadError::InvalidBucketName {
            name: name.to_string(),
            reason: reason.into(),
        };

        if name.len() < BUCKET_NAME_MIN_LEN || name.len() > BUCKET_NAME_MAX_LEN {
            return Err(invalid("must be between 3 and 63 characters"));
        }
        if !name
            .chars()
            .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '.' | '-'))
        {
            return Err(invalid(
                "allowed characters are lowercase letters, digits, dots, and hyphens",
            ));
        }
        if name.starts_with(['.', '-']) || name.ends_with(['.', '-']) || name.contains("..") {
            return Err(invalid("must start and end with a lowercase letter or digit"));
        }
        Ok(())
    }

    fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        let mut path = self.root.clone();
        path.push(bucket);
        path.push(key);
        path
    }

    pub async fn fetch(&self, bucket: &str, key: &str) -> ReadResult<String> {
        Self::ensure_bucket_name_safe(bucket)?;
        Self::ensure_key_safe(key)?;

        let path = self.object_path(bucket, key);
        let mut file = File::open(&path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                ReadError::ObjectNotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                }
            } else {
                ReadError::Io(err)
            }
        })?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).await?;
        Ok(String::from_utf8(bytes)?)
    }
}

#[async_trait]
impl ObjectReader for LocalObjectReader {
    async fn read(&self, bucket: &str, key: &str) -> Option<String> {
        match self.fetch(bucket, key).await {
            Ok(text) => Some(text),
            Err(err) => {
                error!("Error reading file from local store: {}", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{local_sdk_config, stub_endpoint};
    use axum::http::StatusCode;
    use std::fs;
    use tempfile::TempDir;

    const XML: &[(&str, &str)] = &[("content-type", "application/xml")];

    fn store_with(files: &[(&str, &str, &[u8])]) -> (TempDir, LocalObjectReader) {
        let dir = TempDir::new().unwrap();
        for (bucket, key, body) in files {
            let path = dir.path().join(bucket).join(key);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }
        let reader = LocalObjectReader::new(dir.path());
        (dir, reader)
    }

    #[tokio::test]
    async fn reads_nested_object_as_text() {
        let (_dir, reader) = store_with(&[("intake", "2025/06/a.json", br#"{"id":1}"#)]);

        let text = reader.read("intake", "2025/06/a.json").await;

        assert_eq!(text.as_deref(), Some(r#"{"id":1}"#));
    }

    #[tokio::test]
    async fn missing_object_is_absent() {
        let (_dir, reader) = store_with(&[]);

        assert!(matches!(
            reader.fetch("intake", "nope.json").await,
            Err(ReadError::ObjectNotFound { .. })
        ));
        assert!(reader.read("intake", "nope.json").await.is_none());
    }

    #[tokio::test]
    async fn invalid_utf8_is_absent() {
        let (_dir, reader) = store_with(&[("intake", "bin.dat", &[0xff, 0xfe, 0x00])]);

        assert!(matches!(
            reader.fetch("intake", "bin.dat").await,
            Err(ReadError::NotUtf8(_))
        ));
        assert!(reader.read("intake", "bin.dat").await.is_none());
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let (_dir, reader) = store_with(&[("intake", "ok.txt", b"ok")]);

        for key in ["../intake/ok.txt", "/etc/passwd", "a/../../b", ""] {
            assert!(matches!(
                reader.fetch("intake", key).await,
                Err(ReadError::InvalidObjectKey)
            ));
        }
    }

    #[tokio::test]
    async fn unsafe_bucket_names_are_rejected() {
        let (_dir, reader) = store_with(&[]);

        for bucket in ["..", "Upper", "a/b", "-lead"] {
            assert!(matches!(
                reader.fetch(bucket, "k").await,
                Err(ReadError::InvalidBucketName { .. })
            ));
        }
    }

    async fn s3_reader(base: &str) -> S3ObjectReader {
        let config = aws_sdk_s3::config::Builder::from(&local_sdk_config().await)
            .endpoint_url(base)
            .force_path_style(true)
            .build();
        S3ObjectReader::new(Client::from_conf(config))
    }

    #[tokio::test]
    async fn s3_reader_returns_object_text() {
        let (base, captured) = stub_endpoint(StatusCode::OK, &[], b"a.csv\nb.csv\n").await;
        let reader = s3_reader(&base).await;

        let text = reader.fetch("intake-raw", "batches/list.txt").await.unwrap();

        assert_eq!(text, "a.csv\nb.csv\n");
        assert_eq!(
            captured.lock().unwrap()[0].path,
            "/intake-raw/batches/list.txt"
        );
    }

    #[tokio::test]
    async fn s3_missing_key_maps_to_not_found() {
        let (base, _) = stub_endpoint(
            StatusCode::NOT_FOUND,
            XML,
            b"<Error><Code>NoSuchKey</Code><Message>missing</Message></Error>",
        )
        .await;
        let reader = s3_reader(&base).await;

        let result = reader.fetch("intake-raw", "gone.txt").await;

        assert!(matches!(
            result,
            Err(ReadError::ObjectNotFound { bucket, key }) if bucket == "intake-raw" && key == "gone.txt"
        ));
        assert_eq!(reader.read("intake-raw", "gone.txt").await, None);
    }

    #[tokio::test]
    async fn s3_non_utf8_body_is_rejected() {
        let (base, _) = stub_endpoint(StatusCode::OK, &[], &[0xff, 0xfe, 0x00]).await;
        let reader = s3_reader(&base).await;

        assert!(matches!(
            reader.fetch("intake-raw", "blob.bin").await,
            Err(ReadError::NotUtf8(_))
        ));
        assert_eq!(reader.read("intake-raw", "blob.bin").await, None);
    }
}
