//! Event reporting and run results.
//!
//! Core operations never log directly. Every notable step is passed to a
//! [`Reporter`] as a [`SyncEvent`], and the outcome of each pass is returned
//! as a [`PruneReport`] or [`CopyReport`].
//!
//! Any `Fn(&SyncEvent<'_>)` closure is a reporter:
//!
//! ```
//! use keysync::{Reporter, SyncEvent};
//! use std::path::Path;
//!
//! let reporter = |event: &SyncEvent<'_>| eprintln!("{event}");
//! reporter.event(&SyncEvent::SourceMissing { path: Path::new("/src/a") });
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Severity of a [`SyncEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventLevel {
    /// Skips, exclusions, rejected tokens
    Debug,
    /// Mutations (performed or planned)
    Info,
    /// Missing inputs that turn a unit of work into a no-op
    Warn,
    /// Per-entry failures
    Error,
}

/// A notable step of a prune or copy pass.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub enum SyncEvent<'a> {
    /// The destination root to prune does not exist
    DestinationMissing {
        /// Destination root
        path: &'a Path,
    },
    /// A source directory to copy from does not exist
    SourceMissing {
        /// Missing source directory
        path: &'a Path,
    },
    /// A non-directory entry in the destination root was left alone
    SkippedNonDirectory {
        /// The entry
        path: &'a Path,
    },
    /// An entry matched an exclude pattern
    Excluded {
        /// Source path of the entry
        path: &'a Path,
    },
    /// A source entry that is neither a file nor a directory
    SkippedSpecial {
        /// Source path of the entry
        path: &'a Path,
    },
    /// A directory's contents are about to be copied
    CopyingContents {
        /// Source directory
        src: &'a Path,
        /// Destination directory
        dst: &'a Path,
        /// Whether the pass is a dry run
        dry_run: bool,
    },
    /// A destination directory was removed (or would be)
    Removed {
        /// Removed directory
        path: &'a Path,
        /// Whether the removal was only planned
        dry_run: bool,
    },
    /// A destination directory was created (or would be)
    CreatedDir {
        /// Created directory
        path: &'a Path,
        /// Whether the creation was only planned
        dry_run: bool,
    },
    /// A file was copied (or would be)
    CopiedFile {
        /// Source file
        src: &'a Path,
        /// Destination file
        dst: &'a Path,
        /// Bytes written, or the source size in a dry run
        bytes: u64,
        /// Whether the copy was only planned
        dry_run: bool,
    },
    /// A single entry failed; the pass continues
    Failed {
        /// What was being attempted (`"remove"`, `"copy"`, ...)
        action: &'static str,
        /// The entry
        path: &'a Path,
        /// Underlying error
        error: &'a io::Error,
    },
    /// A key list token failed validation and was dropped
    TokenRejected {
        /// 1-based line number
        line: usize,
        /// The token
        token: &'a str,
    },
}

impl SyncEvent<'_> {
    /// Severity of this event.
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::DestinationMissing { .. } | Self::SourceMissing { .. } => EventLevel::Warn,
            Self::Failed { .. } => EventLevel::Error,
            Self::CopyingContents { .. }
            | Self::Removed { .. }
            | Self::CreatedDir { .. }
            | Self::CopiedFile { .. } => EventLevel::Info,
            Self::SkippedNonDirectory { .. }
            | Self::Excluded { .. }
            | Self::SkippedSpecial { .. }
            | Self::TokenRejected { .. } => EventLevel::Debug,
        }
    }
}

impl fmt::Display for SyncEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DestinationMissing { path } => {
                write!(f, "Destination root does not exist: {}", path.display())
            }
            Self::SourceMissing { path } => {
                write!(f, "Source does not exist, skipping copy: {}", path.display())
            }
            Self::SkippedNonDirectory { path } => write!(
                f,
                "Skipping non-directory in destination root: {}",
                path.display()
            ),
            Self::Excluded { path } => write!(f, "Excluding {}", path.display()),
            Self::SkippedSpecial { path } => {
                write!(f, "Skipping special file: {}", path.display())
            }
            Self::CopyingContents { src, dst, dry_run } => write!(
                f,
                "{}Copying contents from {} -> {}",
                dry_run_prefix(*dry_run),
                src.display(),
                dst.display()
            ),
            Self::Removed {
                path,
                dry_run: true,
            } => write!(f, "[dry-run] Would remove directory: {}", path.display()),
            Self::Removed {
                path,
                dry_run: false,
            } => write!(f, "Removed directory: {}", path.display()),
            Self::CreatedDir {
                path,
                dry_run: true,
            } => write!(f, "[dry-run] Would create directory: {}", path.display()),
            Self::CreatedDir {
                path,
                dry_run: false,
            } => write!(f, "Created directory: {}", path.display()),
            Self::CopiedFile {
                src,
                dst,
                dry_run: true,
                ..
            } => write!(
                f,
                "[dry-run] Would copy file {} -> {}",
                src.display(),
                dst.display()
            ),
            Self::CopiedFile {
                src,
                dst,
                bytes,
                dry_run: false,
            } => write!(
                f,
                "Copied {} -> {} ({} bytes)",
                src.display(),
                dst.display(),
                bytes
            ),
            Self::Failed {
                action,
                path,
                error,
            } => write!(f, "Failed to {} {}: {}", action, path.display(), error),
            Self::TokenRejected { line, token } => write!(
                f,
                "Skipping token that doesn't match pattern: {token} (line {line})"
            ),
        }
    }
}

fn dry_run_prefix(dry_run: bool) -> &'static str {
    if dry_run { "[dry-run] " } else { "" }
}

/// Receives [`SyncEvent`]s from prune and copy passes.
pub trait Reporter {
    /// Handle one event.
    fn event(&self, event: &SyncEvent<'_>);
}

impl<F> Reporter for F
where
    F: Fn(&SyncEvent<'_>),
{
    fn event(&self, event: &SyncEvent<'_>) {
        self(event);
    }
}

/// A reporter that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn event(&self, _event: &SyncEvent<'_>) {}
}

/// A reporter that keeps every event as its rendered message.
///
/// Useful for asserting on what a run did or would do without a logging
/// backend.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    messages: Mutex<Vec<(EventLevel, String)>>,
}

impl CollectingReporter {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All collected messages, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|(_, msg)| msg).collect()
    }

    /// Collected messages at exactly `level`, in order.
    #[must_use]
    pub fn messages_at(&self, level: EventLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, msg)| msg)
            .collect()
    }

    fn entries(&self) -> Vec<(EventLevel, String)> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Reporter for CollectingReporter {
    fn event(&self, event: &SyncEvent<'_>) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((event.level(), event.to_string()));
    }
}

/// A reporter that forwards events to `tracing` at the event's level.
#[cfg(feature = "tracing")]
#[cfg_attr(docsrs, doc(cfg(feature = "tracing")))]
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

#[cfg(feature = "tracing")]
impl Reporter for TracingReporter {
    fn event(&self, event: &SyncEvent<'_>) {
        match event.level() {
            EventLevel::Debug => tracing::debug!("{}", event),
            EventLevel::Info => tracing::info!("{}", event),
            EventLevel::Warn => tracing::warn!("{}", event),
            EventLevel::Error => tracing::error!("{}", event),
        }
    }
}

/// Shared reporter handle, as stored by [`SyncBuilder`](crate::SyncBuilder).
pub type SharedReporter = Arc<dyn Reporter + Send + Sync>;

/// The reporter used when none is configured.
///
/// With the `tracing` feature this is [`TracingReporter`]; otherwise events
/// are dropped.
#[must_use]
pub fn default_reporter() -> SharedReporter {
    #[cfg(feature = "tracing")]
    {
        Arc::new(TracingReporter)
    }
    #[cfg(not(feature = "tracing"))]
    {
        Arc::new(NullReporter)
    }
}

/// A single entry that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Failure {
    /// The entry
    pub path: PathBuf,
    /// What was being attempted
    pub action: &'static str,
    /// Error message
    pub message: String,
}

impl Failure {
    pub(crate) fn new(action: &'static str, path: &Path, error: &io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            action,
            message: error.to_string(),
        }
    }
}

/// Record a failure and report it in one step.
pub(crate) fn record_failure(
    failures: &mut Vec<Failure>,
    reporter: &dyn Reporter,
    action: &'static str,
    path: &Path,
    error: &io::Error,
) {
    reporter.event(&SyncEvent::Failed {
        action,
        path,
        error,
    });
    failures.push(Failure::new(action, path, error));
}

/// Outcome of a prune pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PruneReport {
    /// Names of directories removed (or that would be removed in a dry run)
    pub removed: BTreeSet<String>,
    /// Directories that could not be removed
    pub failures: Vec<Failure>,
}

/// Outcome of one or more copy passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CopyReport {
    /// Number of destination directories created
    pub dirs_created: u64,
    /// Number of files copied
    pub files_copied: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Number of entries skipped by an exclude pattern
    pub excluded: u64,
    /// Number of special entries skipped
    pub skipped: u64,
    /// Source directories that did not exist
    pub missing_sources: Vec<PathBuf>,
    /// Entries that failed to copy
    pub failures: Vec<Failure>,
}

impl CopyReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: CopyReport) {
        self.dirs_created += other.dirs_created;
        self.files_copied += other.files_copied;
        self.bytes_copied += other.bytes_copied;
        self.excluded += other.excluded;
        self.skipped += other.skipped;
        self.missing_sources.extend(other.missing_sources);
        self.failures.extend(other.failures);
    }
}
