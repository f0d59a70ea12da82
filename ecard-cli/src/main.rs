//! ecard CLI

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{ComposeCommand, MigrateCommand, PreviewCommand, ServeCommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ecard")]
#[command(version)]
#[command(about = "Compose and send e-cards", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the standard locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the gateway server
    Serve,
    /// Compose and send a card through a running gateway server
    Compose {
        /// Recipient address (prompted for when omitted)
        #[arg(short, long)]
        to: Option<String>,
        /// Card message
        #[arg(short, long, default_value = "")]
        message: String,
        /// Generate the card image from this prompt
        #[arg(short, long, conflicts_with = "image")]
        prompt: Option<String>,
        /// Attach a local image file
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    /// Print the rendered email body
    Preview {
        /// Card message
        #[arg(short, long, default_value = "")]
        message: String,
        /// Public image URL
        #[arg(short, long, default_value = "")]
        image_url: String,
        /// Print the plain-text part instead of HTML
        #[arg(long)]
        text: bool,
    },
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Serve => ServeCommand::execute(config).await?,
        Commands::Compose {
            to,
            message,
            prompt,
            image,
        } => {
            let cmd = ComposeCommand {
                to,
                message,
                prompt,
                image,
            };
            cmd.execute(config).await?;
        }
        Commands::Preview {
            message,
            image_url,
            text,
        } => PreviewCommand::new(message, image_url, text).execute()?,
        Commands::Migrate => MigrateCommand::execute(config).await?,
    }

    Ok(())
}
