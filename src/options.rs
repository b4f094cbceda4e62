//! Configuration options for file writes.
//!
//! [`FileCopyOptions`] controls how the real executor writes each file.
//! It has no effect on what is copied, only on how.
//!
//! # Example
//!
//! ```
//! use keysync::FileCopyOptions;
//!
//! let options = FileCopyOptions::default()
//!     .without_fsync()
//!     .without_permissions();
//! assert!(options.preserve_timestamps);
//! ```

/// Options for writing a single file.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `preserve_timestamps` | `true` | Copy mtime/atime from the source |
/// | `preserve_permissions` | `true` | Copy permission bits from the source |
/// | `fsync` | `true` | Sync to disk before the atomic rename |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileCopyOptions {
    /// Whether to preserve file timestamps (default: true)
    ///
    /// The modification time is always the one that matters; access time is
    /// carried along with it.
    pub preserve_timestamps: bool,

    /// Whether to preserve file permissions (default: true)
    pub preserve_permissions: bool,

    /// Whether to sync files to disk after writing (default: true)
    pub fsync: bool,
}

impl Default for FileCopyOptions {
    fn default() -> Self {
        Self {
            preserve_timestamps: true,
            preserve_permissions: true,
            fsync: true,
        }
    }
}

impl FileCopyOptions {
    /// Disable fsync for faster (but less durable) copies
    #[must_use]
    pub fn without_fsync(mut self) -> Self {
        self.fsync = false;
        self
    }

    /// Disable timestamp preservation
    #[must_use]
    pub fn without_timestamps(mut self) -> Self {
        self.preserve_timestamps = false;
        self
    }

    /// Disable permission preservation
    ///
    /// New files get the default umask permissions instead.
    #[must_use]
    pub fn without_permissions(mut self) -> Self {
        self.preserve_permissions = false;
        self
    }
}
