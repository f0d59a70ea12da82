//! In-process object store

use super::traits::{validate_object_name, ObjectStore};
use super::types::{StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A stored object held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryObject {
    /// MIME content type given at write time
    pub content_type: String,
    /// Object bytes
    pub data: Bytes,
}

/// Object store backed by a map, for development and tests
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<HashMap<(String, String), MemoryObject>>>,
    public_base_url: String,
}

impl MemoryObjectStore {
    /// Creates an empty store whose public URLs start with `public_base_url`
    #[must_use]
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            objects: Arc::default(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Looks up a stored object
    #[must_use]
    pub fn object(&self, bucket: &str, name: &str) -> Option<MemoryObject> {
        self.objects
            .read()
            .get(&(bucket.to_string(), name.to_string()))
            .cloned()
    }

    /// Number of stored objects
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        bucket: &str,
        name: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<()> {
        validate_object_name(bucket)?;
        validate_object_name(name)?;

        let mut objects = self.objects.write();
        let key = (bucket.to_string(), name.to_string());
        if objects.contains_key(&key) {
            return Err(StorageError::Write(format!("{bucket}/{name} already exists")));
        }
        objects.insert(
            key,
            MemoryObject {
                content_type: content_type.to_string(),
                data,
            },
        );
        Ok(())
    }

    fn public_url(&self, bucket: &str, name: &str) -> String {
        format!("{}/{bucket}/{name}", self.public_base_url)
    }
}
