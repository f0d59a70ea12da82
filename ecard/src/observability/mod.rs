//! Observability (structured logging)
//!
//! Provides structured logging via `tracing` with environment-based filtering.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging stack
///
/// Sets up:
/// - Pretty formatting in debug builds, JSON formatting in release builds
/// - Filtering from `RUST_LOG`, defaulting to `debug,ecard=trace` (debug) or
///   `info` (release)
///
/// # Example
///
/// ```rust,no_run
/// # fn main() -> anyhow::Result<()> {
/// ecard::observability::init()?;
/// tracing::info!("Gateway started");
/// # Ok(())
/// # }
/// ```
pub fn init() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?;
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    }

    Ok(())
}

fn default_filter() -> EnvFilter {
    if cfg!(debug_assertions) {
        EnvFilter::new("debug,ecard=trace")
    } else {
        EnvFilter::new("info")
    }
}

/// Shorten free text for log fields
///
/// Card messages are personal; only a prefix of at most `max_chars` characters
/// is ever logged.
#[must_use]
pub fn log_excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let excerpt: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{excerpt}...")
    } else {
        excerpt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_excerpt_short_text_unchanged() {
        assert_eq!(log_excerpt("Happy birthday", 50), "Happy birthday");
    }

    #[test]
    fn test_log_excerpt_truncates_on_char_boundary() {
        let text = "é".repeat(60);
        let excerpt = log_excerpt(&text, 50);
        assert_eq!(excerpt.chars().count(), 53);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn test_init_twice_reports_error() {
        // The first call may race with other tests; the second must never panic.
        let _ = init();
        assert!(init().is_err());
    }
}
