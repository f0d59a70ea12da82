//! Busy flags
//!
//! One flag per workflow step. A flag is held through a [`FlagGuard`] and
//! cleared when the guard drops, on every exit path. Flags only gate the
//! matching control; they are independent of each other.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Which step is in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Busy {
    /// An image is being generated
    Generating,
    /// An image is being stored
    Uploading,
    /// A card is being submitted
    Sending,
}

#[derive(Debug, Default)]
struct FlagSet {
    generating: AtomicBool,
    uploading: AtomicBool,
    sending: AtomicBool,
}

/// Point-in-time copy of all flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusySnapshot {
    /// Generation in progress
    pub generating: bool,
    /// Upload in progress
    pub uploading: bool,
    /// Submission in progress
    pub sending: bool,
}

impl BusySnapshot {
    /// Whether any step is in progress
    #[must_use]
    pub const fn any(self) -> bool {
        self.generating || self.uploading || self.sending
    }
}

/// Shared busy flags
///
/// Clones observe the same flags, so a presentation layer can watch a
/// composer while it runs.
#[derive(Debug, Clone, Default)]
pub struct BusyFlags {
    inner: Arc<FlagSet>,
}

impl BusyFlags {
    /// All flags cleared
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self, busy: Busy) -> &AtomicBool {
        match busy {
            Busy::Generating => &self.inner.generating,
            Busy::Uploading => &self.inner.uploading,
            Busy::Sending => &self.inner.sending,
        }
    }

    /// Set a flag, unless it is already set
    ///
    /// Returns `None` when the step is already in progress.
    #[must_use]
    pub fn enter(&self, busy: Busy) -> Option<FlagGuard> {
        self.flag(busy)
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlagGuard {
                flags: self.clone(),
                busy,
            })
    }

    /// Whether a flag is set
    #[must_use]
    pub fn is_set(&self, busy: Busy) -> bool {
        self.flag(busy).load(Ordering::Acquire)
    }

    /// Copy of all flags
    #[must_use]
    pub fn snapshot(&self) -> BusySnapshot {
        BusySnapshot {
            generating: self.is_set(Busy::Generating),
            uploading: self.is_set(Busy::Uploading),
            sending: self.is_set(Busy::Sending),
        }
    }

    /// Whether the generate control is enabled
    #[must_use]
    pub fn can_generate(&self) -> bool {
        !self.is_set(Busy::Generating)
    }

    /// Whether the image picker is enabled
    #[must_use]
    pub fn can_upload(&self) -> bool {
        !self.is_set(Busy::Uploading)
    }

    /// Whether the send control is enabled
    #[must_use]
    pub fn can_send(&self) -> bool {
        !self.is_set(Busy::Sending)
    }
}

/// Holds a busy flag; clears it on drop
#[derive(Debug)]
#[must_use = "the flag clears as soon as the guard is dropped"]
pub struct FlagGuard {
    flags: BusyFlags,
    busy: Busy,
}

impl Drop for FlagGuard {
    fn drop(&mut self) {
        self.flags.flag(self.busy).store(false, Ordering::Release);
    }
}
