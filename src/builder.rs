//! Builder API for a complete sync run.
//!
//! [`SyncBuilder`] ties the pieces together the way a command-line caller
//! would: validate inputs, prune the destination, then copy every key.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use keysync::{SyncBuilder, parse_keys_file};
//! use std::path::Path;
//!
//! let parsed = parse_keys_file(Path::new("keys.txt"))?;
//! let report = SyncBuilder::new("repo_a", "repo_b")
//!     .keys(parsed.keys)
//!     .excludes([".git", "__pycache__"])
//!     .run()?;
//! println!("removed: {:?}", report.pruned.removed);
//! # Ok::<(), keysync::Error>(())
//! ```
//!
//! ## Dry Run
//!
//! ```no_run
//! use keysync::{KeySet, SyncBuilder};
//!
//! let keys: KeySet = ["app", "lib"].into_iter().collect();
//! let report = SyncBuilder::new("src", "dst").keys(keys).dry_run(true).run()?;
//! for action in &report.planned {
//!     println!("{action:?}");
//! }
//! # Ok::<(), keysync::Error>(())
//! ```

use crate::copy::copy_keys;
use crate::error::{Error, Result};
use crate::exclude::ExcludeSet;
use crate::executor::{Action, Executor, FsExecutor, PlanExecutor};
use crate::keys::KeySet;
use crate::options::FileCopyOptions;
use crate::prune::prune_unlisted;
use crate::report::{CopyReport, PruneReport, SharedReporter, default_reporter};
use std::fmt;
use std::path::{Path, PathBuf};

/// Outcome of a [`SyncBuilder::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SyncReport {
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Result of the prune pass
    pub pruned: PruneReport,
    /// Result of the copy pass
    pub copied: CopyReport,
    /// Every action a dry run would have applied, in order (empty otherwise)
    pub planned: Vec<Action>,
}

impl SyncReport {
    /// Whether any entry failed during prune or copy.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.pruned.failures.is_empty() || !self.copied.failures.is_empty()
    }
}

/// A builder for configuring and executing a sync run.
///
/// # Example
///
/// ```no_run
/// use keysync::{KeySet, SyncBuilder};
///
/// let keys: KeySet = ["service"].into_iter().collect();
/// let report = SyncBuilder::new("/data/source", "/data/target")
///     .keys(keys)
///     .exclude("*.tmp")
///     .no_fsync()
///     .run()?;
/// assert!(!report.dry_run);
/// # Ok::<(), keysync::Error>(())
/// ```
#[derive(Clone)]
pub struct SyncBuilder {
    source_root: PathBuf,
    dest_root: PathBuf,
    keys: KeySet,
    excludes: Vec<String>,
    dry_run: bool,
    file_options: FileCopyOptions,
    reporter: Option<SharedReporter>,
}

impl fmt::Debug for SyncBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncBuilder")
            .field("source_root", &self.source_root)
            .field("dest_root", &self.dest_root)
            .field("keys", &self.keys)
            .field("excludes", &self.excludes)
            .field("dry_run", &self.dry_run)
            .field("file_options", &self.file_options)
            .field("reporter", &self.reporter.as_ref().map(|_| ".."))
            .finish()
    }
}

impl SyncBuilder {
    /// Create a builder for syncing `dest_root` from `source_root`.
    ///
    /// The key set starts empty and must be filled before [`run`](Self::run).
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(source_root: P, dest_root: Q) -> Self {
        Self {
            source_root: source_root.as_ref().to_path_buf(),
            dest_root: dest_root.as_ref().to_path_buf(),
            keys: KeySet::new(),
            excludes: Vec::new(),
            dry_run: false,
            file_options: FileCopyOptions::default(),
            reporter: None,
        }
    }

    /// Set the keys to keep and copy.
    #[must_use]
    pub fn keys(mut self, keys: KeySet) -> Self {
        self.keys = keys;
        self
    }

    /// Add one exclude pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }

    /// Add several exclude patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Record actions instead of applying them.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Send events to `reporter` instead of the default.
    #[must_use]
    pub fn reporter(mut self, reporter: SharedReporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Replace the file write options.
    #[must_use]
    pub fn file_options(mut self, options: FileCopyOptions) -> Self {
        self.file_options = options;
        self
    }

    /// Don't preserve file timestamps.
    #[must_use]
    pub fn no_timestamps(mut self) -> Self {
        self.file_options = self.file_options.without_timestamps();
        self
    }

    /// Don't preserve file permissions.
    #[must_use]
    pub fn no_permissions(mut self) -> Self {
        self.file_options = self.file_options.without_permissions();
        self
    }

    /// Skip fsync after each file.
    #[must_use]
    pub fn no_fsync(mut self) -> Self {
        self.file_options = self.file_options.without_fsync();
        self
    }

    /// Prune the destination, then copy every key.
    ///
    /// # Errors
    ///
    /// Fails before touching the filesystem if the key set is empty
    /// ([`Error::NoKeys`]) or an exclude pattern is invalid
    /// ([`Error::InvalidPattern`]). Once work starts, per-entry failures are
    /// collected in the returned report instead.
    pub fn run(self) -> Result<SyncReport> {
        if self.keys.is_empty() {
            return Err(Error::NoKeys);
        }
        let excludes = ExcludeSet::new(&self.excludes)?;
        let reporter = self.reporter.clone().unwrap_or_else(default_reporter);

        if self.dry_run {
            let mut executor = PlanExecutor::new();
            let (pruned, copied) = self.execute(&excludes, &mut executor, &reporter);
            Ok(SyncReport {
                dry_run: true,
                pruned,
                copied,
                planned: executor.into_planned(),
            })
        } else {
            let mut executor = FsExecutor::new(self.file_options);
            let (pruned, copied) = self.execute(&excludes, &mut executor, &reporter);
            Ok(SyncReport {
                dry_run: false,
                pruned,
                copied,
                planned: Vec::new(),
            })
        }
    }

    fn execute(
        &self,
        excludes: &ExcludeSet,
        executor: &mut dyn Executor,
        reporter: &SharedReporter,
    ) -> (PruneReport, CopyReport) {
        let pruned = prune_unlisted(&self.dest_root, &self.keys, executor, reporter.as_ref());
        let copied = copy_keys(
            &self.source_root,
            &self.dest_root,
            &self.keys,
            excludes,
            executor,
            reporter.as_ref(),
        );
        (pruned, copied)
    }
}
