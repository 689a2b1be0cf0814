use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Where uploaded images end up. Returns the public URL of the stored file.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn store(&self, file: UploadedFile) -> AppResult<String>;
}

pub struct LocalDiskStore {
    dir: PathBuf,
    url_prefix: String,
    max_bytes: usize,
}

impl LocalDiskStore {
    pub fn new(dir: PathBuf, url_prefix: String, max_bytes: usize) -> Self {
        Self {
            dir,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ImageStore for LocalDiskStore {
    async fn store(&self, file: UploadedFile) -> AppResult<String> {
        validate_image(&file.file_name, file.bytes.len(), self.max_bytes)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("create upload dir: {e}")))?;

        let stored_name = stored_file_name(&file.file_name);
        let path = self.dir.join(&stored_name);
        tokio::fs::write(&path, &file.bytes)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("write upload: {e}")))?;

        tracing::info!(
            original_name = %file.file_name,
            stored_name = %stored_name,
            size = file.bytes.len(),
            "image stored"
        );
        Ok(format!("{}/{}", self.url_prefix, stored_name))
    }
}

pub fn validate_image(file_name: &str, len: usize, max_bytes: usize) -> AppResult<()> {
    if len == 0 {
        return Err(AppError::BadRequest("Empty file provided".into()));
    }
    if len > max_bytes {
        return Err(AppError::PayloadTooLarge);
    }
    let ext = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| AppError::BadRequest(format!("Missing file extension: {file_name}")))?;
    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unsupported file format '{}'. Supported: {}",
            ext,
            SUPPORTED_FORMATS.join(", ")
        )));
    }
    Ok(())
}

/// `<millis>-<short id>-<name>` with whitespace collapsed and any path
/// components dropped.
pub fn stored_file_name(original: &str) -> String {
    let base = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let short = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", Utc::now().timestamp_millis(), &short[..8], cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_name_is_flat_and_clean() {
        let name = stored_file_name("../../etc/My Photo (1).PNG");
        assert!(name.ends_with("-My_Photo_1.PNG"), "{name}");
        assert!(!name.contains('/'));
    }

    #[test]
    fn rejects_unsupported_and_oversized() {
        assert!(validate_image("a.exe", 10, 100).is_err());
        assert!(matches!(
            validate_image("a.png", 101, 100),
            Err(AppError::PayloadTooLarge)
        ));
        assert!(validate_image("a.png", 0, 100).is_err());
        assert!(validate_image("a.JPG", 10, 100).is_ok());
    }

    #[tokio::test]
    async fn local_store_writes_under_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path().to_path_buf(), "/uploads/".into(), 1024);

        let url = store
            .store(UploadedFile {
                file_name: "banner.jpg".into(),
                bytes: Bytes::from_static(b"not really a jpeg"),
            })
            .await
            .unwrap();

        assert!(url.starts_with("/uploads/"));
        let stored = url.trim_start_matches("/uploads/");
        let written = std::fs::read(store.dir().join(stored)).unwrap();
        assert_eq!(written, b"not really a jpeg");
    }
}
