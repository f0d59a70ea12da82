//! Object store trait definitions

use super::types::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;

/// Abstraction for the content bucket card images are written to
///
/// # Implementation Requirements
///
/// Implementations must:
/// - Never overwrite an existing object; a name collision is a write failure
/// - Return a public URL that dereferences to the stored bytes once `put`
///   has succeeded
///
/// # Examples
///
/// ```rust
/// use bytes::Bytes;
/// use ecard::storage::{MemoryObjectStore, ObjectStore};
///
/// # async fn example() -> anyhow::Result<()> {
/// let store = MemoryObjectStore::new("https://cdn.example.com");
/// store.put("ecards", "ecard-1.png", "image/png", Bytes::from_static(b"..")).await?;
///
/// assert_eq!(
///     store.public_url("ecards", "ecard-1.png"),
///     "https://cdn.example.com/ecards/ecard-1.png"
/// );
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes a new object
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Write` if the backend rejects or fails the write,
    /// and `StorageError::InvalidPath` for names that are not a single segment
    async fn put(
        &self,
        bucket: &str,
        name: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<()>;

    /// Public URL for an object
    fn public_url(&self, bucket: &str, name: &str) -> String;
}

/// Rejects object names that could escape their bucket
pub(crate) fn validate_object_name(name: &str) -> StorageResult<()> {
    if name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.contains("..")
    {
        return Err(super::StorageError::InvalidPath(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_object_name() {
        assert!(validate_object_name("ecard-1718000000000.png").is_ok());
        assert!(validate_object_name("").is_err());
        assert!(validate_object_name("../etc/passwd").is_err());
        assert!(validate_object_name("nested/ecard.png").is_err());
        assert!(validate_object_name(".hidden").is_err());
    }
}
