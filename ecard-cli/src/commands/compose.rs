//! Card composition command
//!
//! Runs one composer session against the configured gateway server, storage
//! backend and database: optionally generate or attach an image, then persist
//! and send.

use anyhow::{Context, Result};
use console::{style, Emoji};
use dialoguer::Input;
use ecard::composer::{
    BusyFlags, Composer, ComposerEvent, ComposerServices, FormEvent, GatewayClient,
    GenerateOutcome, NoticeLevel, SubmitOutcome,
};
use ecard::config::EcardConfig;
use ecard::records::PgCardRepository;
use ecard::storage::{object_store_from_settings, BinaryImage, ImageUploader};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

static SUCCESS: Emoji = Emoji("✓ ", "");
static FAILURE: Emoji = Emoji("✗ ", "");

/// Compose and send one card
#[derive(Debug)]
pub struct ComposeCommand {
    /// Recipient address
    pub to: Option<String>,
    /// Card message
    pub message: String,
    /// Prompt for a generated image
    pub prompt: Option<String>,
    /// Local image file
    pub image: Option<PathBuf>,
}

impl ComposeCommand {
    /// Execute the command
    pub async fn execute(self, config: Option<&Path>) -> Result<()> {
        super::init_logging()?;
        let config = super::load_config(config)?;
        let recipient = match self.to {
            Some(to) => to,
            None => Input::<String>::new()
                .with_prompt("Recipient email")
                .interact_text()
                .context("Failed to read recipient")?,
        };

        let services = build_services(&config).await?;
        let (mut composer, mut events) = Composer::new(services, config.composer.image_policy);

        composer.dispatch(FormEvent::MessageChanged(self.message));
        composer.dispatch(FormEvent::RecipientEmailChanged(recipient));

        if let Some(path) = &self.image {
            composer.select_image(read_image(path).await?);
        }

        let spinner = Spinner::start(composer.flags());

        if let Some(prompt) = self.prompt {
            composer.dispatch(FormEvent::ImagePromptChanged(prompt));
            let outcome = composer.generate_image().await;
            report(&spinner.bar, &mut events);
            if matches!(outcome, GenerateOutcome::Invalid | GenerateOutcome::Failed) {
                spinner.stop();
                anyhow::bail!("Image generation failed");
            }
        }

        let outcome = composer.submit().await;
        report(&spinner.bar, &mut events);
        spinner.stop();

        match outcome {
            SubmitOutcome::Sent(card) => {
                if let Some(id) = card.receipt.id() {
                    println!("  {} {}", style("Message id:").dim(), style(id).cyan());
                }
                Ok(())
            }
            SubmitOutcome::DispatchFailed { .. } => {
                anyhow::bail!("The card was saved but the email was not delivered")
            }
            other => anyhow::bail!("The card was not sent ({other:?})"),
        }
    }
}

async fn build_services(config: &EcardConfig) -> Result<ComposerServices> {
    let store = object_store_from_settings(&config.storage)?;
    let uploader = ImageUploader::from_settings(store, &config.storage)?;
    let cards = PgCardRepository::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    let client = Arc::new(GatewayClient::from_config(config)?);

    Ok(ComposerServices {
        generator: client.clone(),
        uploader: Arc::new(uploader),
        cards: Arc::new(cards),
        dispatcher: client,
    })
}

async fn read_image(path: &Path) -> Result<BinaryImage> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image")
        .to_string();
    Ok(BinaryImage::new(filename, "application/octet-stream", data))
}

/// Print pending composer notices above the spinner
fn report(bar: &ProgressBar, events: &mut UnboundedReceiver<ComposerEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            ComposerEvent::Notice(notice) => {
                let title = match notice.level {
                    NoticeLevel::Success => style(format!("{SUCCESS}{}", notice.title)).green().bold(),
                    NoticeLevel::Validation => style(notice.title).yellow().bold(),
                    NoticeLevel::Error => style(format!("{FAILURE}{}", notice.title)).red().bold(),
                };
                bar.println(title.to_string());
                if let Some(description) = notice.description {
                    bar.println(format!("  {}", style(description).dim()));
                }
            }
            ComposerEvent::Preview(image) => {
                bar.println(format!("  {} {image}", style("Image:").dim()));
            }
            ComposerEvent::PreviewCleared | ComposerEvent::Sent(_) => {}
        }
    }
}

/// Spinner mirroring the composer's busy flags
struct Spinner {
    bar: ProgressBar,
    watcher: tokio::task::JoinHandle<()>,
}

impl Spinner {
    fn start(flags: BusyFlags) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(progress_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            bar.set_style(progress_style);
        }
        bar.enable_steady_tick(Duration::from_millis(100));

        let watched = bar.clone();
        let watcher = tokio::spawn(async move {
            loop {
                watched.set_message(busy_message(&flags));
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        });

        Self { bar, watcher }
    }

    fn stop(self) {
        self.watcher.abort();
        self.bar.finish_and_clear();
    }
}

fn busy_message(flags: &BusyFlags) -> &'static str {
    let busy = flags.snapshot();
    if busy.generating {
        "Generating image..."
    } else if busy.uploading {
        "Uploading image..."
    } else if busy.sending {
        "Sending e-card..."
    } else {
        ""
    }
}
