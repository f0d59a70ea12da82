//! Card image storage
//!
//! The uploader accepts either raw image bytes or a remote image URL and
//! returns a public URL into the `ecards` bucket.
//!
//! # Backends
//!
//! - [`LocalObjectStore`]: filesystem, served by the gateway under `/uploads`
//! - [`SupabaseObjectStore`]: Supabase storage HTTP API
//! - [`MemoryObjectStore`]: in-process, for development and tests
//!
//! # Examples
//!
//! ```rust
//! use ecard::storage::{BinaryImage, ImageSource, ImageUpload, ImageUploader, MemoryObjectStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let uploader = ImageUploader::new(
//!     Arc::new(MemoryObjectStore::new("https://bucket")),
//!     reqwest::Client::new(),
//!     "ecards",
//!     10 * 1024 * 1024,
//! );
//! let url = uploader
//!     .upload(ImageSource::Remote("https://replicate.delivery/out-0.png".into()))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod local;
pub mod memory;
pub mod supabase;
pub mod traits;
pub mod types;
pub mod uploader;

pub use local::LocalObjectStore;
pub use memory::{MemoryObject, MemoryObjectStore};
pub use supabase::SupabaseObjectStore;
pub use traits::ObjectStore;
pub use types::{BinaryImage, ImageSource, StorageError, StorageResult};
pub use uploader::{ImageUpload, ImageUploader, ObjectNamer};

use crate::config::{StorageBackendKind, StorageSettings};
use std::sync::Arc;

/// Builds the object store selected by `storage.backend`
///
/// # Errors
///
/// Returns `StorageError::Configuration` if the Supabase backend is selected
/// without its credentials, or `StorageError::InvalidPath` for a bad local root
pub fn object_store_from_settings(settings: &StorageSettings) -> StorageResult<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match settings.backend {
        StorageBackendKind::Local => Arc::new(LocalObjectStore::new(
            settings.local_root.clone(),
            settings.public_base_url.clone(),
        )?),
        StorageBackendKind::Supabase => Arc::new(SupabaseObjectStore::connect(settings)?),
        StorageBackendKind::Memory => {
            Arc::new(MemoryObjectStore::new(settings.public_base_url.clone()))
        }
    };
    Ok(store)
}
