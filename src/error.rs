//! Error types for the gallery.
//!
//! Per-slot probe failures never show up here: a missing candidate is the
//! normal signal to try the next extension, and a slot with no candidates
//! left is `Resolution::Absent`. Only configuration problems and failures of
//! the page pipeline itself are errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::gallery::Resolution;

/// Problems reading or validating a [`crate::config::GalleryConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for a gallery config.
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No gallery folder configured")]
    MissingFolder,

    /// Neither the folder manifest nor the flags said how many slots exist.
    #[error("total must be at least 1")]
    ZeroTotal,

    #[error("page_size must be at least 1")]
    ZeroPageSize,

    #[error("max_buttons must be at least 1")]
    ZeroMaxButtons,

    #[error("columns must be at least 1")]
    ZeroColumns,

    #[error("At least one extension candidate is required")]
    NoExtensions,

    /// The extension does not name an image format we can display.
    #[error("Unsupported image extension: {0:?}")]
    UnsupportedExtension(String),
}

/// Failure of a whole page load.
///
/// `Clone` so it can travel inside iced messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Page {page} is outside 1..={total_pages}")]
    PageOutOfRange { page: u32, total_pages: u32 },

    /// A slot resolution task panicked or was cancelled before joining.
    #[error("Slot resolution task failed: {reason}")]
    Join { reason: String },
}

impl From<tokio::task::JoinError> for LoadError {
    fn from(err: tokio::task::JoinError) -> Self {
        LoadError::Join {
            reason: err.to_string(),
        }
    }
}

/// Rejected cache write.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A slot already settled to a different result. The first result is kept.
    #[error("Slot {slot} already resolved to {existing:?}, refusing {attempted:?}")]
    Conflict {
        slot: u32,
        existing: Resolution,
        attempted: Resolution,
    },
}
