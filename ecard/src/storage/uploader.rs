//! Card image uploader
//!
//! Turns a [`ImageSource`] into a durable public URL: remote sources are
//! fetched first, every payload is checked against the size and image-type
//! guards, then written under a fresh `ecard-<millis>.<ext>` name.

use super::traits::ObjectStore;
use super::types::{BinaryImage, ImageSource, StorageError, StorageResult};
use crate::config::StorageSettings;
use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Extension used when the source does not name one
const DEFAULT_EXTENSION: &str = "png";

/// Filename given to fetched blobs
const FETCHED_FILENAME: &str = "generated-image.png";

/// Uploads card images and resolves their public URLs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageUpload: Send + Sync {
    /// Stores an image and returns its public URL
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Fetch` if a remote source cannot be retrieved,
    /// and `StorageError::Write` if the store rejects the object. Guard
    /// failures (`FileSizeExceeded`, `InvalidMimeType`) happen before any write.
    async fn upload(&self, source: ImageSource) -> StorageResult<String>;
}

/// Generates unique, timestamp-derived object names
///
/// The millisecond clock is forced to advance on every call, so two names
/// from the same namer never collide even when issued within one millisecond.
#[derive(Debug, Default)]
pub struct ObjectNamer {
    last_millis: AtomicI64,
}

impl ObjectNamer {
    /// Creates a namer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_millis: AtomicI64::new(0),
        }
    }

    /// Next monotonic timestamp in milliseconds
    pub fn next_millis(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let mut prev = self.last_millis.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self.last_millis.compare_exchange_weak(
                prev,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }

    /// Next object name for the given extension
    pub fn next_name(&self, extension: &str) -> String {
        format!("ecard-{}.{extension}", self.next_millis())
    }
}

/// Storage uploader over any [`ObjectStore`]
///
/// # Examples
///
/// ```rust
/// use ecard::storage::{BinaryImage, ImageSource, ImageUpload, ImageUploader, MemoryObjectStore};
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let store = Arc::new(MemoryObjectStore::new("https://bucket"));
/// let uploader = ImageUploader::new(store, reqwest::Client::new(), "ecards", 1024 * 1024);
///
/// let png = vec![0x89u8, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
/// let url = uploader
///     .upload(ImageSource::Binary(BinaryImage::new("card.png", "image/png", png)))
///     .await?;
/// assert!(url.starts_with("https://bucket/ecards/ecard-"));
/// # Ok(())
/// # }
/// ```
pub struct ImageUploader {
    store: Arc<dyn ObjectStore>,
    http: reqwest::Client,
    bucket: String,
    max_upload_bytes: u64,
    namer: ObjectNamer,
}

impl std::fmt::Debug for ImageUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUploader")
            .field("bucket", &self.bucket)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish_non_exhaustive()
    }
}

impl ImageUploader {
    /// Creates an uploader writing into `bucket`
    ///
    /// `http` is used to fetch remote sources; give it a timeout.
    #[must_use]
    pub fn new(
        store: Arc<dyn ObjectStore>,
        http: reqwest::Client,
        bucket: impl Into<String>,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            store,
            http,
            bucket: bucket.into(),
            max_upload_bytes,
            namer: ObjectNamer::new(),
        }
    }

    /// Creates an uploader from storage settings
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Configuration` if the fetch client cannot be built
    pub fn from_settings(
        store: Arc<dyn ObjectStore>,
        settings: &StorageSettings,
    ) -> StorageResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.fetch_timeout())
            .build()
            .map_err(|e| StorageError::Configuration(e.to_string()))?;
        Ok(Self::new(store, http, settings.bucket.clone(), settings.max_upload_bytes))
    }

    /// Bucket objects are written to
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn fetch(&self, url: &str) -> StorageResult<BinaryImage> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| StorageError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Fetch(format!("{url} returned {status}")));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        if let Some(length) = response.content_length() {
            if length > self.max_upload_bytes {
                return Err(StorageError::FileSizeExceeded {
                    actual: length,
                    limit: self.max_upload_bytes,
                });
            }
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| StorageError::Fetch(e.to_string()))?;

        Ok(BinaryImage::new(FETCHED_FILENAME, content_type, data))
    }
}

/// Lowercase alphanumeric extension of a filename, if it has a usable one
fn sanitized_extension(image: &BinaryImage) -> Option<String> {
    image
        .extension()
        .map(str::to_ascii_lowercase)
        .filter(|ext| ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
}

#[async_trait]
impl ImageUpload for ImageUploader {
    async fn upload(&self, source: ImageSource) -> StorageResult<String> {
        let (image, extension) = match source {
            ImageSource::Binary(image) => {
                let extension =
                    sanitized_extension(&image).unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
                (image, extension)
            }
            ImageSource::Remote(url) => {
                tracing::debug!(url = %url, "Fetching source image");
                let image = self.fetch(&url).await.inspect_err(|e| {
                    tracing::warn!(url = %url, error = %e, "Source image fetch failed");
                })?;
                (image, DEFAULT_EXTENSION.to_string())
            }
        };

        image.validate_size(self.max_upload_bytes)?;
        let content_type = image.image_mime()?;

        let name = self.namer.next_name(&extension);
        self.store
            .put(&self.bucket, &name, &content_type, image.data)
            .await
            .inspect_err(|e| {
                tracing::error!(bucket = %self.bucket, object = %name, error = %e, "Image upload failed");
            })?;

        let url = self.store.public_url(&self.bucket, &name);
        tracing::info!(bucket = %self.bucket, object = %name, url = %url, "Image uploaded");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::MockObjectStore;
    use crate::storage::MemoryObjectStore;
    use proptest::prelude::*;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    const JPEG_MAGIC: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

    fn memory_uploader(limit: u64) -> (ImageUploader, MemoryObjectStore) {
        let store = MemoryObjectStore::new("https://bucket");
        let uploader = ImageUploader::new(
            Arc::new(store.clone()),
            reqwest::Client::new(),
            "ecards",
            limit,
        );
        (uploader, store)
    }

    fn png(filename: &str) -> ImageSource {
        ImageSource::Binary(BinaryImage::new(filename, "image/png", PNG_MAGIC.to_vec()))
    }

    #[test]
    fn test_namer_is_strictly_increasing() {
        let namer = ObjectNamer::new();
        let first = namer.next_millis();
        let second = namer.next_millis();
        let third = namer.next_millis();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_name_format() {
        let namer = ObjectNamer::new();
        let name = namer.next_name("jpg");
        assert!(name.starts_with("ecard-"));
        assert!(name.ends_with(".jpg"));
        let millis = &name["ecard-".len()..name.len() - ".jpg".len()];
        assert!(millis.parse::<i64>().is_ok());
    }

    #[tokio::test]
    async fn test_upload_uses_source_extension() {
        let (uploader, store) = memory_uploader(1024);
        let jpeg = ImageSource::Binary(BinaryImage::new(
            "Holiday.JPG",
            "image/jpeg",
            JPEG_MAGIC.to_vec(),
        ));

        let url = uploader.upload(jpeg).await.unwrap();
        assert!(url.starts_with("https://bucket/ecards/ecard-"));
        assert!(url.ends_with(".jpg"));

        let name = url.rsplit('/').next().unwrap();
        assert_eq!(store.object("ecards", name).unwrap().content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_upload_defaults_extension() {
        let (uploader, _store) = memory_uploader(1024);
        let url = uploader.upload(png("pasted")).await.unwrap();
        assert!(url.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_same_content_twice_yields_distinct_urls() {
        let (uploader, store) = memory_uploader(1024);
        let first = uploader.upload(png("card.png")).await.unwrap();
        let second = uploader.upload(png("card.png")).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_oversized_image_is_rejected_before_write() {
        let mut store = MockObjectStore::new();
        store.expect_put().never();
        let uploader = ImageUploader::new(Arc::new(store), reqwest::Client::new(), "ecards", 4);

        let result = uploader.upload(png("card.png")).await;
        assert!(matches!(result, Err(StorageError::FileSizeExceeded { .. })));
    }

    #[tokio::test]
    async fn test_non_image_is_rejected_before_write() {
        let mut store = MockObjectStore::new();
        store.expect_put().never();
        let uploader = ImageUploader::new(Arc::new(store), reqwest::Client::new(), "ecards", 1024);

        let text = ImageSource::Binary(BinaryImage::new("card.png", "text/plain", b"hi".to_vec()));
        let result = uploader.upload(text).await;
        assert!(matches!(result, Err(StorageError::InvalidMimeType { .. })));
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_write_error() {
        let mut store = MockObjectStore::new();
        store
            .expect_put()
            .times(1)
            .returning(|_, _, _, _| Err(StorageError::Write("bucket offline".into())));
        store.expect_public_url().never();
        let uploader = ImageUploader::new(Arc::new(store), reqwest::Client::new(), "ecards", 1024);

        let result = uploader.upload(png("card.png")).await;
        assert!(matches!(result, Err(StorageError::Write(_))));
    }

    #[tokio::test]
    async fn test_unreachable_remote_is_fetch_failure() {
        let mut store = MockObjectStore::new();
        store.expect_put().never();
        let uploader = ImageUploader::new(Arc::new(store), reqwest::Client::new(), "ecards", 1024);

        let result = uploader
            .upload(ImageSource::Remote("http://127.0.0.1:9/img.png".into()))
            .await;
        assert!(matches!(result, Err(StorageError::Fetch(_))));
    }

    proptest! {
        #[test]
        fn prop_names_never_repeat(count in 2usize..64) {
            let namer = ObjectNamer::new();
            let names: std::collections::HashSet<String> =
                (0..count).map(|_| namer.next_name("png")).collect();
            prop_assert_eq!(names.len(), count);
        }
    }
}
