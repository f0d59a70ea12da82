//! Card composer
//!
//! The client-side workflow core: a [`Composer`] holds the form, the selected
//! image and the busy flags, and drives generation, upload, persistence and
//! dispatch through explicit collaborators ([`ComposerServices`]).

pub mod client;
pub mod flags;
pub mod form;
pub mod image;
pub mod workflow;

pub use client::{ClientError, EmailDispatch, GatewayClient, ImageGeneration};
pub use flags::{Busy, BusyFlags, BusySnapshot, FlagGuard};
pub use form::{FormEvent, FormState};
pub use image::{ImagePolicy, ImageReference};
pub use workflow::{
    Composer, ComposerEvent, ComposerServices, GenerateOutcome, Notice, NoticeLevel, SentCard,
    SubmitOutcome, SEND_FAILED,
};
