//! ecard: compose a personal message, attach an uploaded or generated image, and
//! deliver the result by email
//!
//! The crate is split the same way the running system is:
//! - **Gateways** ([`gateway`]): two stateless HTTP handlers brokering to the
//!   text-to-image model ([`imagegen`]) and the transactional email provider
//!   ([`email`])
//! - **Storage** ([`storage`]): the uploader that turns a local image or a remote
//!   URL into a durable object with a public URL
//! - **Records** ([`records`]): the `ecards` table, one row per sent card
//! - **Composer** ([`composer`]): the client-side workflow sequencing
//!   generate, upload, persist and send
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ecard::{config::EcardConfig, gateway, state::GatewayState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     ecard::observability::init()?;
//!
//!     let config = EcardConfig::load()?;
//!     let addr = config.server.bind_address();
//!     let state = GatewayState::from_config(config)?;
//!
//!     let listener = tokio::net::TcpListener::bind(addr).await?;
//!     axum::serve(listener, gateway::router(state)).await?;
//!     Ok(())
//! }
//! ```

#![allow(clippy::missing_errors_doc)]

pub mod composer;
pub mod config;
pub mod email;
pub mod error;
pub mod gateway;
pub mod imagegen;
pub mod observability;
pub mod records;
pub mod state;
pub mod storage;
pub mod testing;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! ```rust
    //! use ecard::prelude::*;
    //! ```

    pub use crate::composer::{
        BusyFlags, Composer, ComposerEvent, ComposerServices, FormEvent, FormState,
        GatewayClient, GenerateOutcome, ImagePolicy, ImageReference, Notice, NoticeLevel,
        SubmitOutcome,
    };
    pub use crate::config::EcardConfig;
    pub use crate::email::{
        render_ecard_html, render_ecard_text, ConsoleBackend, DeliveryReceipt, EcardEmail, Email, EmailError,
        EmailSender, ResendBackend, SmtpBackend,
    };
    pub use crate::error::GatewayError;
    pub use crate::imagegen::{GenerationParams, ImageModel, ProviderError, ReplicateModel};
    pub use crate::records::{CardRepository, ECardRecord, PgCardRepository, RecordError};
    pub use crate::state::GatewayState;
    pub use crate::storage::{
        BinaryImage, ImageSource, ImageUpload, ImageUploader, LocalObjectStore, MemoryObjectStore,
        ObjectStore, StorageError, SupabaseObjectStore,
    };
}
