// src/services/asset_store.rs

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::common::error::AppError;

/// Public prefix of stored assets; `picture_url` values carry it.
pub const PUBLIC_PREFIX: &str = "/uploads/";

/// Binary store for product images, keyed by generated file name.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Persists `bytes` under `file_name` and returns the public reference.
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String, AppError>;

    /// Removes the asset behind `reference`. Deleting a missing asset is not
    /// an error.
    async fn delete(&self, reference: &str) -> Result<(), AppError>;
}

/// A reference we own: anything without a `scheme://` prefix.
pub fn is_local_reference(reference: &str) -> bool {
    !reference.trim().is_empty() && !reference.contains("://")
}

/// `<sanitized stem>-<millis>-<random><.ext>`, e.g. `teh_botol-1760000000000-3f2a9c1e.png`.
pub fn generate_file_name(original: &str) -> String {
    let path = Path::new(original);
    let stem: String = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    let stem = if stem.is_empty() { "image".to_string() } else { stem };

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();

    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{stem}-{millis}-{random}{extension}",
        millis = Utc::now().timestamp_millis(),
        random = &random[..8]
    )
}

/// Stores assets as files in one directory.
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // Only the final path component is honoured, so a reference can never
    // escape the upload directory.
    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        Path::new(reference.trim())
            .file_name()
            .map(|name| self.root.join(name))
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String, AppError> {
        let path = self
            .resolve(file_name)
            .ok_or_else(|| anyhow::anyhow!("invalid asset name: {file_name}"))?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", self.root.display()))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| anyhow::anyhow!("cannot write {}: {e}", path.display()))?;

        tracing::info!(file = %path.display(), size = bytes.len(), "asset stored");
        Ok(format!("{PUBLIC_PREFIX}{file_name}"))
    }

    async fn delete(&self, reference: &str) -> Result<(), AppError> {
        let Some(path) = self.resolve(reference) else {
            tracing::warn!(reference, "asset reference has no file name");
            return Ok(());
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(file = %path.display(), "asset deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(file = %path.display(), "asset already gone");
                Ok(())
            }
            Err(e) => Err(anyhow::anyhow!("cannot delete {}: {e}", path.display()).into()),
        }
    }
}
