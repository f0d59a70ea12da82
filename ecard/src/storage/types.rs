//! Core types for image storage

use bytes::Bytes;
use std::fmt;
use thiserror::Error;

/// Errors that can occur while storing a card image
#[derive(Debug, Error)]
pub enum StorageError {
    /// The remote source image could not be fetched
    #[error("source fetch failed: {0}")]
    Fetch(String),

    /// The object store rejected or failed the write
    #[error("store write failed: {0}")]
    Write(String),

    /// Invalid object name or storage path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Image size exceeds limit
    #[error("File size {actual} exceeds limit of {limit} bytes")]
    FileSizeExceeded {
        /// Actual image size
        actual: u64,
        /// Maximum allowed size
        limit: u64,
    },

    /// Payload is not an image
    #[error("Invalid MIME type: expected an image, got {actual}")]
    InvalidMimeType {
        /// Detected or declared MIME type
        actual: String,
    },

    /// Storage backend is missing required settings
    #[error("storage configuration error: {0}")]
    Configuration(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A locally chosen image that has not been stored yet
///
/// # Examples
///
/// ```rust
/// use ecard::storage::BinaryImage;
///
/// let image = BinaryImage::new("birthday.jpg", "image/jpeg", vec![0xFFu8, 0xD8, 0xFF]);
/// assert_eq!(image.size(), 3);
/// assert_eq!(image.extension(), Some("jpg"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImage {
    /// Original filename
    pub filename: String,

    /// Declared MIME content type
    pub content_type: String,

    /// Image bytes
    pub data: Bytes,
}

impl BinaryImage {
    /// Creates a new binary image
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Returns the size of the image in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Validates the image size against a maximum limit
    ///
    /// # Errors
    ///
    /// Returns `StorageError::FileSizeExceeded` if the image is larger than `max_bytes`
    pub fn validate_size(&self, max_bytes: u64) -> StorageResult<()> {
        let size = self.size();
        if size > max_bytes {
            return Err(StorageError::FileSizeExceeded {
                actual: size,
                limit: max_bytes,
            });
        }
        Ok(())
    }

    /// Resolves the effective image MIME type
    ///
    /// Magic-number detection wins over the declared content type. Content
    /// without a recognizable signature falls back to the declared type.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidMimeType` if the payload is not an image
    pub fn image_mime(&self) -> StorageResult<String> {
        match infer::get(&self.data) {
            Some(kind) if kind.matcher_type() == infer::MatcherType::Image => {
                Ok(kind.mime_type().to_string())
            }
            Some(kind) => Err(StorageError::InvalidMimeType {
                actual: kind.mime_type().to_string(),
            }),
            None => match self.content_type.parse::<mime::Mime>() {
                Ok(declared) if declared.type_() == mime::IMAGE => Ok(declared.essence_str().to_string()),
                _ => Err(StorageError::InvalidMimeType {
                    actual: self.content_type.clone(),
                }),
            },
        }
    }

    /// Extracts the file extension from the filename
    ///
    /// Returns `None` if the filename has no extension
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        let parts: Vec<&str> = self.filename.rsplitn(2, '.').collect();
        if parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty() {
            Some(parts[0])
        } else {
            None
        }
    }
}

/// What the uploader accepts: raw bytes or a URL to fetch them from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A locally chosen image
    Binary(BinaryImage),
    /// A remotely hosted image, fetched before upload
    Remote(String),
}

impl From<BinaryImage> for ImageSource {
    fn from(image: BinaryImage) -> Self {
        Self::Binary(image)
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary(image) => write!(f, "Binary({}, {} bytes)", image.filename, image.size()),
            Self::Remote(url) => write!(f, "Remote({url})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_validate_size() {
        let image = BinaryImage::new("card.png", "image/png", vec![1u8, 2, 3]);
        assert!(image.validate_size(3).is_ok());
        assert!(matches!(
            image.validate_size(2),
            Err(StorageError::FileSizeExceeded { actual: 3, limit: 2 })
        ));
    }

    #[test]
    fn test_extension() {
        assert_eq!(BinaryImage::new("card.png", "image/png", Bytes::new()).extension(), Some("png"));
        assert_eq!(BinaryImage::new("README", "text/plain", Bytes::new()).extension(), None);
        assert_eq!(BinaryImage::new("trailing.", "image/png", Bytes::new()).extension(), None);
        assert_eq!(
            BinaryImage::new("archive.tar.gz", "application/gzip", Bytes::new()).extension(),
            Some("gz")
        );
    }

    #[test]
    fn test_image_mime_prefers_magic_bytes() {
        let image = BinaryImage::new("card.jpg", "image/jpeg", PNG_MAGIC.to_vec());
        assert_eq!(image.image_mime().unwrap(), "image/png");
    }

    #[test]
    fn test_image_mime_rejects_non_image_content() {
        let pdf = BinaryImage::new("card.png", "image/png", b"%PDF-1.7 fake".to_vec());
        assert!(matches!(
            pdf.image_mime(),
            Err(StorageError::InvalidMimeType { .. })
        ));
    }

    #[test]
    fn test_image_mime_falls_back_to_declared_type() {
        let unknown = BinaryImage::new("card.heic", "image/heic", vec![0x7Au8; 8]);
        assert_eq!(unknown.image_mime().unwrap(), "image/heic");

        let text = BinaryImage::new("notes.txt", "text/plain", b"hello".to_vec());
        assert!(text.image_mime().is_err());
    }

    #[test]
    fn test_source_display() {
        let source = ImageSource::Remote("https://ext/img.png".to_string());
        assert_eq!(source.to_string(), "Remote(https://ext/img.png)");
    }
}
