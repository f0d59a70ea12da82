//! Local filesystem object store

use super::traits::{validate_object_name, ObjectStore};
use super::types::{StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem object store
///
/// Each bucket is a directory under the root; objects are flat files inside
/// it. The gateway server serves the root under `/uploads`, which is what
/// `public_base_url` is expected to point at.
///
/// # Directory Structure
///
/// ```text
/// ./uploads/
/// └── ecards/
///     ├── ecard-1718000000000.png
///     └── ecard-1718000000001.jpg
/// ```
///
/// # Examples
///
/// ```rust,no_run
/// use bytes::Bytes;
/// use ecard::storage::{LocalObjectStore, ObjectStore};
/// use std::path::PathBuf;
///
/// # async fn example() -> anyhow::Result<()> {
/// let store = LocalObjectStore::new(PathBuf::from("./uploads"), "http://localhost:8787/uploads")?;
/// store.put("ecards", "ecard-1.png", "image/png", Bytes::from_static(b"..")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    /// Root directory holding one directory per bucket
    root: PathBuf,

    /// URL prefix the root is served under
    public_base_url: String,
}

impl LocalObjectStore {
    /// Creates a new local object store
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPath` if the root exists but is not a directory
    pub fn new(root: PathBuf, public_base_url: impl Into<String>) -> StorageResult<Self> {
        if root.exists() && !root.is_dir() {
            return Err(StorageError::InvalidPath(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        Ok(Self {
            root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Root directory of the store
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, name: &str) -> PathBuf {
        self.root.join(bucket).join(name)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(
        &self,
        bucket: &str,
        name: &str,
        _content_type: &str,
        data: Bytes,
    ) -> StorageResult<()> {
        validate_object_name(bucket)?;
        validate_object_name(name)?;

        let dir = self.root.join(bucket);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::Write(format!("{}: {e}", dir.display())))?;

        let path = self.object_path(bucket, name);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| StorageError::Write(format!("{}: {e}", path.display())))?;

        file.write_all(&data)
            .await
            .map_err(|e| StorageError::Write(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| StorageError::Write(e.to_string()))?;

        Ok(())
    }

    fn public_url(&self, bucket: &str, name: &str) -> String {
        format!("{}/{bucket}/{name}", self.public_base_url)
    }
}
