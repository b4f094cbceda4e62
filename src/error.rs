//! Error types for keysync.
//!
//! This module provides the [`Error`] enum containing the errors that abort
//! a run before any filesystem mutation, and the [`Result`] type alias.
//!
//! Failures that happen once pruning or copying has started are never
//! returned as [`Error`]. They are collected as [`Failure`](crate::Failure)
//! entries in the run's reports so partial progress is preserved.
//!
//! # Error Categories
//!
//! | Category | Errors |
//! |----------|--------|
//! | Input | [`Error::KeyList`], [`Error::InvalidPattern`], [`Error::NoKeys`] |

use std::path::PathBuf;
use thiserror::Error;

/// Result type for keysync operations.
///
/// This is a type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Pre-flight errors that abort a sync run.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The key list could not be read
    #[error("Failed to read key list {path}: {source}")]
    KeyList {
        /// Path of the key list
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// An exclude pattern is not a valid glob
    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Underlying glob error
        source: globset::Error,
    },

    /// The key set is empty, so there is nothing to keep or copy
    #[error("No keys to synchronize")]
    NoKeys,
}
