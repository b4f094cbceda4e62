//! Mutating actions and the executors that apply them.
//!
//! Prune and copy passes decide *what* to do and hand every mutation to an
//! [`Executor`] as an [`Action`]. [`FsExecutor`] performs the action on the
//! filesystem. [`PlanExecutor`] records it and reports success, which is how
//! dry runs walk exactly the same code path as real runs.

use crate::copy::copy_file_atomic;
use crate::options::FileCopyOptions;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A single filesystem mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "action", rename_all = "snake_case"))]
pub enum Action {
    /// Recursively delete a directory
    RemoveDir {
        /// Directory to delete
        path: PathBuf,
    },
    /// Create a directory and any missing parents
    CreateDir {
        /// Directory to create
        path: PathBuf,
    },
    /// Copy one file, replacing any existing destination file
    CopyFile {
        /// Source file
        src: PathBuf,
        /// Destination file
        dst: PathBuf,
    },
}

impl Action {
    /// Short verb used in failure messages.
    #[must_use]
    pub fn verb(&self) -> &'static str {
        match self {
            Self::RemoveDir { .. } => "remove",
            Self::CreateDir { .. } => "create",
            Self::CopyFile { .. } => "copy",
        }
    }
}

/// Applies [`Action`]s.
pub trait Executor {
    /// Apply one action.
    ///
    /// Returns the number of bytes written for [`Action::CopyFile`] (the
    /// source size for a planned copy) and 0 otherwise.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error if the action fails. Callers treat
    /// this as a per-entry failure.
    fn apply(&mut self, action: &Action) -> io::Result<u64>;

    /// Whether actions are only being recorded.
    fn is_dry_run(&self) -> bool;
}

/// Executor that performs actions on the filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsExecutor {
    options: FileCopyOptions,
}

impl FsExecutor {
    /// Create an executor with the given file write options.
    #[must_use]
    pub fn new(options: FileCopyOptions) -> Self {
        Self { options }
    }

    /// The file write options in use.
    #[must_use]
    pub fn options(&self) -> &FileCopyOptions {
        &self.options
    }
}

impl Executor for FsExecutor {
    fn apply(&mut self, action: &Action) -> io::Result<u64> {
        match action {
            Action::RemoveDir { path } => fs::remove_dir_all(path).map(|()| 0),
            Action::CreateDir { path } => fs::create_dir_all(path).map(|()| 0),
            Action::CopyFile { src, dst } => copy_file_atomic(src, dst, &self.options),
        }
    }

    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Executor that records actions without touching the filesystem.
#[derive(Debug, Clone, Default)]
pub struct PlanExecutor {
    planned: Vec<Action>,
}

impl PlanExecutor {
    /// Create an executor with an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Actions recorded so far, in order.
    #[must_use]
    pub fn planned(&self) -> &[Action] {
        &self.planned
    }

    /// Consume the executor, returning the recorded actions.
    #[must_use]
    pub fn into_planned(self) -> Vec<Action> {
        self.planned
    }
}

impl Executor for PlanExecutor {
    fn apply(&mut self, action: &Action) -> io::Result<u64> {
        let bytes = match action {
            Action::CopyFile { src, dst } => {
                if dst.is_dir() {
                    return Err(io::Error::new(
                        io::ErrorKind::IsADirectory,
                        format!("destination is a directory: {}", dst.display()),
                    ));
                }
                fs::metadata(src)?.len()
            }
            Action::CreateDir { path } => {
                check_creatable(path)?;
                0
            }
            Action::RemoveDir { .. } => 0,
        };
        self.planned.push(action.clone());
        Ok(bytes)
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

/// Fail the way `create_dir_all` would if a non-directory is in the way.
fn check_creatable(path: &Path) -> io::Result<()> {
    for ancestor in path.ancestors() {
        if ancestor.as_os_str().is_empty() || !ancestor.exists() {
            continue;
        }
        if ancestor.is_dir() {
            return Ok(());
        }
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("not a directory: {}", ancestor.display()),
        ));
    }
    Ok(())
}
