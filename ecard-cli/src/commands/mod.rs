//! CLI command implementations

pub mod compose;
pub mod migrate;
pub mod preview;
pub mod serve;

pub use compose::ComposeCommand;
pub use migrate::MigrateCommand;
pub use preview::PreviewCommand;
pub use serve::ServeCommand;

use anyhow::{Context, Result};
use ecard::config::EcardConfig;
use std::path::Path;

/// Load configuration from `path`, or from the standard locations
pub fn load_config(path: Option<&Path>) -> Result<EcardConfig> {
    match path {
        Some(path) => {
            let path = path.to_str().context("Configuration path is not valid UTF-8")?;
            EcardConfig::load_from(path)
        }
        None => EcardConfig::load(),
    }
}

/// Install the tracing subscriber shared by every long-running command
pub fn init_logging() -> Result<()> {
    ecard::observability::init().context("Failed to initialise logging")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_installs_global_subscriber() {
        init_logging().unwrap();
        assert!(tracing::dispatcher::has_been_set());
    }
}
