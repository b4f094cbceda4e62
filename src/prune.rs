//! Destination pruning.
//!
//! Removes every immediate subdirectory of a destination root whose name is
//! not in the keep-set. Files and symlinks in the root are never touched.

use crate::executor::{Action, Executor};
use crate::keys::KeySet;
use crate::report::{PruneReport, Reporter, SyncEvent, record_failure};
use std::fs;
use std::path::Path;

/// Remove directories under `dest_root` whose names are not in `keep`.
///
/// Returns the names removed, or that would be removed when `executor` is a
/// dry-run executor. A missing `dest_root` is reported and yields an empty
/// report. A directory that cannot be removed is recorded as a failure,
/// left out of [`PruneReport::removed`], and the pass continues.
///
/// Entries are classified without following symlinks, so a symlink to a
/// directory is treated as a non-directory and kept.
///
/// # Example
///
/// ```no_run
/// use keysync::{KeySet, NullReporter, PlanExecutor, prune_unlisted};
/// use std::path::Path;
///
/// let keep: KeySet = ["app", "lib"].into_iter().collect();
/// let report = prune_unlisted(Path::new("dest"), &keep, &mut PlanExecutor::new(), &NullReporter);
/// for name in &report.removed {
///     println!("would remove {name}");
/// }
/// ```
pub fn prune_unlisted(
    dest_root: &Path,
    keep: &KeySet,
    executor: &mut dyn Executor,
    reporter: &dyn Reporter,
) -> PruneReport {
    let mut report = PruneReport::default();

    if !dest_root.exists() {
        reporter.event(&SyncEvent::DestinationMissing { path: dest_root });
        return report;
    }

    let entries = match fs::read_dir(dest_root) {
        Ok(entries) => entries,
        Err(e) => {
            record_failure(&mut report.failures, reporter, "read", dest_root, &e);
            return report;
        }
    };

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                record_failure(&mut report.failures, reporter, "read", dest_root, &e);
                continue;
            }
        };
        let path = entry.path();

        let is_dir = match entry.file_type() {
            Ok(file_type) => file_type.is_dir(),
            Err(e) => {
                record_failure(&mut report.failures, reporter, "inspect", &path, &e);
                continue;
            }
        };
        if !is_dir {
            reporter.event(&SyncEvent::SkippedNonDirectory { path: &path });
            continue;
        }

        // Non-UTF-8 names can never be keys
        let listed = entry
            .file_name()
            .to_str()
            .is_some_and(|name| keep.contains(name));
        if !listed {
            candidates.push((entry.file_name().to_string_lossy().into_owned(), path));
        }
    }
    candidates.sort();

    for (name, path) in candidates {
        let action = Action::RemoveDir { path: path.clone() };
        match executor.apply(&action) {
            Ok(_) => {
                reporter.event(&SyncEvent::Removed {
                    path: &path,
                    dry_run: executor.is_dry_run(),
                });
                report.removed.insert(name);
            }
            Err(e) => {
                record_failure(&mut report.failures, reporter, action.verb(), &path, &e);
            }
        }
    }

    report
}
