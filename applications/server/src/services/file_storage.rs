/// File storage service - keeps uploads on disk and hands out public URLs
use crate::error::{Result, ServerError};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Upload buckets
pub const BUCKET_PICTURES: &str = "pictures";
pub const BUCKET_COVERS: &str = "covers";
pub const BUCKET_AUDIOS: &str = "audios";

#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
    public_url: String,
}

impl FileStorage {
    /// `public_url` is the server's base URL; files are served under `/uploads`
    pub fn new(base_path: PathBuf, public_url: impl Into<String>) -> Self {
        Self {
            base_path,
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Initialize storage directories
    pub async fn initialize(&self) -> Result<()> {
        for bucket in [BUCKET_PICTURES, BUCKET_COVERS, BUCKET_AUDIOS] {
            fs::create_dir_all(self.base_path.join(bucket)).await?;
        }
        Ok(())
    }

    /// Store a file and return the URL it is served from
    ///
    /// The stored name is prefixed with the current time in milliseconds so
    /// repeated uploads of the same filename never overwrite each other.
    pub async fn write_file(&self, bucket: &str, filename: &str, data: &[u8]) -> Result<String> {
        if bucket.is_empty() || bucket.contains(['/', '\\', '.']) {
            return Err(ServerError::Internal(format!("invalid bucket: {bucket}")));
        }

        let key = format!(
            "{}{}",
            chrono::Utc::now().timestamp_millis(),
            sanitize_filename(filename)
        );
        let path = self.base_path.join(bucket).join(&key);

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&path, data).await?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "Stored upload");

        Ok(format!("{}/uploads/{}/{}", self.public_url, bucket, key))
    }

    /// Local path for a URL returned by [`write_file`](Self::write_file)
    pub fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let relative = url.strip_prefix(&self.public_url)?.strip_prefix("/uploads/")?;
        if relative.split('/').any(|part| part == ".." || part.is_empty()) {
            return None;
        }
        Some(self.base_path.join(relative))
    }
}

/// Keep the last path component and replace anything outside `[A-Za-z0-9._-]`
fn sanitize_filename(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim_start_matches('.');

    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
