//! Directory copy operations.
//!
//! Copies are merges: the source tree is overlaid onto the destination,
//! existing destination files with the same name are replaced, and nothing
//! that exists only in the destination is removed. Exclude patterns are
//! checked against every entry name at every depth.

use crate::exclude::ExcludeSet;
use crate::executor::{Action, Executor};
use crate::keys::KeySet;
use crate::report::{CopyReport, Reporter, SyncEvent, record_failure};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Component, Path};

use super::utils::{EntryKind, dir_identity};

/// Copy the contents of `src_dir` into `dest_dir`.
///
/// A missing `src_dir` is reported as [`SyncEvent::SourceMissing`] and
/// produces an empty report apart from
/// [`missing_sources`](CopyReport::missing_sources). `dest_dir` and any
/// missing subdirectories are created through `executor`.
///
/// Per-entry failures (unreadable directories, failed writes) are recorded
/// in the report and the walk continues with the next entry.
///
/// # Example
///
/// ```no_run
/// use keysync::{ExcludeSet, FsExecutor, NullReporter, copy_contents};
/// use std::path::Path;
///
/// let excludes = ExcludeSet::new([".git", "*.tmp"])?;
/// let report = copy_contents(
///     Path::new("src/pkg"),
///     Path::new("dst/pkg"),
///     &excludes,
///     &mut FsExecutor::default(),
///     &NullReporter,
/// );
/// println!("copied {} files", report.files_copied);
/// # Ok::<(), keysync::Error>(())
/// ```
pub fn copy_contents(
    src_dir: &Path,
    dest_dir: &Path,
    excludes: &ExcludeSet,
    executor: &mut dyn Executor,
    reporter: &dyn Reporter,
) -> CopyReport {
    if !src_dir.exists() {
        reporter.event(&SyncEvent::SourceMissing { path: src_dir });
        return CopyReport {
            missing_sources: vec![src_dir.to_path_buf()],
            ..CopyReport::default()
        };
    }

    reporter.event(&SyncEvent::CopyingContents {
        src: src_dir,
        dst: dest_dir,
        dry_run: executor.is_dry_run(),
    });

    let mut walk = TreeCopy::new(excludes, executor, reporter);
    walk.copy_dir(src_dir, dest_dir);
    walk.report
}

/// Copy `source_root/key` into `dest_root/key` for every key.
///
/// Keys are independent: a key whose source is missing is a reported
/// no-op and does not affect the others. A key naming a file rather than a
/// directory copies that single file. The key itself is never matched
/// against `excludes`; only entries below it are.
///
/// A key that is absolute or contains `..` would resolve outside the roots.
/// It is recorded as a `key` failure and skipped.
pub fn copy_keys(
    source_root: &Path,
    dest_root: &Path,
    keys: &KeySet,
    excludes: &ExcludeSet,
    executor: &mut dyn Executor,
    reporter: &dyn Reporter,
) -> CopyReport {
    let mut report = CopyReport::default();

    for key in keys {
        if !stays_under_root(key) {
            let err = io::Error::new(
                io::ErrorKind::InvalidInput,
                "key must be a relative path without '..'",
            );
            record_failure(&mut report.failures, reporter, "key", Path::new(key), &err);
            continue;
        }

        let src = source_root.join(key);
        let dst = dest_root.join(key);

        if let Ok(EntryKind::File) = EntryKind::of(&src) {
            let mut walk = TreeCopy::new(excludes, executor, reporter);
            walk.copy_single_file(&src, &dst);
            report.merge(walk.report);
        } else {
            report.merge(copy_contents(&src, &dst, excludes, executor, reporter));
        }
    }

    report
}

/// Whether joining `key` onto a root yields a path below that root.
fn stays_under_root(key: &str) -> bool {
    Path::new(key).components().all(|component| {
        matches!(component, Component::Normal(_) | Component::CurDir)
    })
}

/// State of one recursive copy.
struct TreeCopy<'a> {
    excludes: &'a ExcludeSet,
    executor: &'a mut dyn Executor,
    reporter: &'a dyn Reporter,
    report: CopyReport,
    /// Directories already entered, to stop symlink loops
    visited: HashSet<(u64, u64)>,
}

impl<'a> TreeCopy<'a> {
    fn new(
        excludes: &'a ExcludeSet,
        executor: &'a mut dyn Executor,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            excludes,
            executor,
            reporter,
            report: CopyReport::default(),
            visited: HashSet::new(),
        }
    }

    fn fail(&mut self, action: &'static str, path: &Path, error: &io::Error) {
        record_failure(&mut self.report.failures, self.reporter, action, path, error);
    }

    fn copy_dir(&mut self, src: &Path, dst: &Path) {
        match dir_identity(src) {
            Ok(identity) => {
                if !self.visited.insert(identity) {
                    let loop_err = io::Error::other("directory loop detected");
                    self.fail("enter", src, &loop_err);
                    return;
                }
            }
            Err(e) => {
                self.fail("read", src, &e);
                return;
            }
        }

        if !dst.is_dir() && !self.create_dir(dst) {
            return;
        }

        let mut entries = match fs::read_dir(src) {
            Ok(iter) => {
                let mut entries = Vec::new();
                for entry in iter {
                    match entry {
                        Ok(entry) => entries.push(entry),
                        Err(e) => self.fail("read", src, &e),
                    }
                }
                entries
            }
            Err(e) => {
                self.fail("read", src, &e);
                return;
            }
        };
        // Stable order so dry-run plans are reproducible
        entries.sort_by_key(fs::DirEntry::file_name);

        for entry in entries {
            let name = entry.file_name();
            let src_path = entry.path();

            if self.excludes.is_excluded(&name) {
                self.report.excluded += 1;
                self.reporter.event(&SyncEvent::Excluded { path: &src_path });
                continue;
            }

            let dst_path = dst.join(&name);
            match EntryKind::of(&src_path) {
                Ok(EntryKind::Directory) => self.copy_dir(&src_path, &dst_path),
                Ok(EntryKind::File) => self.copy_file(&src_path, &dst_path),
                Ok(EntryKind::Other) => {
                    self.report.skipped += 1;
                    self.reporter
                        .event(&SyncEvent::SkippedSpecial { path: &src_path });
                }
                Err(e) => self.fail("inspect", &src_path, &e),
            }
        }
    }

    /// Returns false if the directory could not be created.
    fn create_dir(&mut self, dst: &Path) -> bool {
        let action = Action::CreateDir {
            path: dst.to_path_buf(),
        };
        match self.executor.apply(&action) {
            Ok(_) => {
                self.report.dirs_created += 1;
                self.reporter.event(&SyncEvent::CreatedDir {
                    path: dst,
                    dry_run: self.executor.is_dry_run(),
                });
                true
            }
            Err(e) => {
                self.fail(action.verb(), dst, &e);
                false
            }
        }
    }

    fn copy_file(&mut self, src: &Path, dst: &Path) {
        let action = Action::CopyFile {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
        };
        match self.executor.apply(&action) {
            Ok(bytes) => {
                self.report.files_copied += 1;
                self.report.bytes_copied += bytes;
                self.reporter.event(&SyncEvent::CopiedFile {
                    src,
                    dst,
                    bytes,
                    dry_run: self.executor.is_dry_run(),
                });
            }
            Err(e) => self.fail(action.verb(), src, &e),
        }
    }

    /// Copy a file named directly by a key, creating its parent if needed.
    fn copy_single_file(&mut self, src: &Path, dst: &Path) {
        if let Some(parent) = dst.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() && !self.create_dir(parent) {
                return;
            }
        }
        self.copy_file(src, dst);
    }
}
