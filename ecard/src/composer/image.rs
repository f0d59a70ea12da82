//! Active image reference

use serde::{Deserialize, Serialize};
use std::fmt;

/// The image a card currently points at
///
/// A freshly generated image is `Ephemeral` (provider-hosted) until the
/// uploader stores it and it becomes `Durable`. Only durable URLs are ever
/// persisted with a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "url", rename_all = "lowercase")]
pub enum ImageReference {
    /// Provider-hosted URL that may expire
    Ephemeral(String),
    /// Public object-store URL
    Durable(String),
}

impl ImageReference {
    /// The URL to display, whichever variant is current
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Ephemeral(url) | Self::Durable(url) => url,
        }
    }

    /// Whether the image lives in the object store
    #[must_use]
    pub const fn is_durable(&self) -> bool {
        matches!(self, Self::Durable(_))
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url())
    }
}

/// Whether a card may be sent without any image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePolicy {
    /// Submission needs an uploaded or generated image
    #[default]
    Required,
    /// Cards without an image are persisted with a null image URL
    Optional,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_and_durability() {
        let ephemeral = ImageReference::Ephemeral("https://ext/img.png".into());
        let durable = ImageReference::Durable("https://bucket/ecard-1.png".into());
        assert_eq!(ephemeral.url(), "https://ext/img.png");
        assert!(!ephemeral.is_durable());
        assert!(durable.is_durable());
        assert_eq!(durable.to_string(), "https://bucket/ecard-1.png");
    }

    #[test]
    fn test_policy_serde() {
        assert_eq!(serde_json::to_string(&ImagePolicy::Optional).unwrap(), "\"optional\"");
        let policy: ImagePolicy = serde_json::from_str("\"required\"").unwrap();
        assert_eq!(policy, ImagePolicy::Required);
    }
}
