//! Database migration command

use anyhow::{Context, Result};
use console::style;
use ecard::records::PgCardRepository;
use std::path::Path;

/// Apply the `ecards` table migrations
pub struct MigrateCommand;

impl MigrateCommand {
    /// Execute the command
    pub async fn execute(config: Option<&Path>) -> Result<()> {
        let config = super::load_config(config)?;
        let repository = PgCardRepository::connect(&config.database)
            .await
            .context("Failed to connect to database")?;

        repository.migrate().await.context("Failed to run migrations")?;

        println!("{}", style("✓ Migrations applied").green().bold());
        Ok(())
    }
}
