//! Testing utilities
//!
//! In-memory fakes for every collaborator seam, for tests that drive the
//! gateways or a composer without external providers:
//!
//! - [`RecordingEmailSender`]: captures sent emails
//! - [`StubImageModel`]: answers every prompt with a fixed URL or failure
//! - [`RecordingCardRepository`]: keeps inserted records in memory
//! - [`StubImageGeneration`] and [`RecordingDispatch`]: composer-side
//!   stand-ins for the two gateways
//!
//! # Example
//!
//! ```rust
//! use ecard::config::EcardConfig;
//! use ecard::state::GatewayState;
//! use ecard::testing::{RecordingEmailSender, StubImageModel};
//! use std::sync::Arc;
//!
//! let sender = RecordingEmailSender::new();
//! let state = GatewayState::new(EcardConfig::default(), None, None)
//!     .with_image_model(Arc::new(StubImageModel::succeeding("https://ext/img.png")))
//!     .with_email_sender(Arc::new(sender.clone()));
//! assert_eq!(sender.sent_count(), 0);
//! ```

mod email;
mod providers;

pub use email::RecordingEmailSender;
pub use providers::{RecordingCardRepository, RecordingDispatch, StubImageGeneration, StubImageModel};
