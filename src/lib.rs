//! # keysync
//!
//! Whitelist-driven directory synchronization for Rust.
//!
//! A run keeps a destination tree in line with a source tree, restricted to
//! a set of named top-level entries ("keys"):
//!
//! 1. **Prune**: delete destination subdirectories whose name is not a key
//! 2. **Copy**: merge `source/key` into `destination/key` for every key,
//!    skipping entries whose name matches an exclude pattern at any depth
//!
//! ## Core Features
//!
//! - **Permissive key lists**: comments, blank lines, comma or whitespace
//!   separated keys; invalid tokens are dropped and reported, not fatal
//! - **Merge copies**: existing destination files are replaced, files that
//!   only exist in the destination are left alone
//! - **Depth-independent excludes**: shell-style globs matched against every
//!   file and directory name
//! - **Dry runs on the same code path**: a recording [`PlanExecutor`] stands
//!   in for the real [`FsExecutor`], so a plan lists exactly what a real run
//!   would do
//! - **Partial-failure tolerance**: once work starts, a failing entry is
//!   recorded and skipped; nothing is rolled back
//! - **Atomic file writes**: temp file + rename, with timestamps and
//!   permissions preserved
//!
//! ## Quick Start with Builder API
//!
//! ```no_run
//! use keysync::{SyncBuilder, parse_keys_file};
//! use std::path::Path;
//!
//! let parsed = parse_keys_file(Path::new("keys.txt"))?;
//! let report = SyncBuilder::new("source", "target")
//!     .keys(parsed.keys)
//!     .exclude(".git")
//!     .dry_run(true)
//!     .run()?;
//! println!("would remove {} directories", report.pruned.removed.len());
//! # Ok::<(), keysync::Error>(())
//! ```
//!
//! ## Function API
//!
//! Each pass is also available on its own. The caller supplies the executor
//! (real or recording) and a [`Reporter`] for events:
//!
//! ```no_run
//! use keysync::{CollectingReporter, ExcludeSet, PlanExecutor, copy_keys, parse_keys};
//! use std::path::Path;
//!
//! let keys = parse_keys("app, lib\n").keys;
//! let excludes = ExcludeSet::new(["*.tmp"])?;
//! let mut plan = PlanExecutor::new();
//! let events = CollectingReporter::new();
//!
//! copy_keys(Path::new("src"), Path::new("dst"), &keys, &excludes, &mut plan, &events);
//! for message in events.messages() {
//!     println!("{message}");
//! }
//! # Ok::<(), keysync::Error>(())
//! ```
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `tracing` | [`TracingReporter`](crate::report::TracingReporter), used as the default reporter |
//! | `serde` | Serialize reports, actions, and [`FileCopyOptions`] |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod copy;
mod error;
mod exclude;
mod executor;
mod keys;
mod options;
mod prune;
pub mod report;

pub use builder::{SyncBuilder, SyncReport};
pub use copy::{copy_contents, copy_keys};
pub use error::{Error, Result};
pub use exclude::ExcludeSet;
pub use executor::{Action, Executor, FsExecutor, PlanExecutor};
pub use keys::{KeySet, ParsedKeys, RejectedToken, is_valid_key, parse_keys, parse_keys_file};
pub use options::FileCopyOptions;
pub use prune::prune_unlisted;
pub use report::{
    CollectingReporter, CopyReport, EventLevel, Failure, NullReporter, PruneReport, Reporter,
    SharedReporter, SyncEvent, default_reporter,
};

#[cfg(feature = "tracing")]
#[cfg_attr(docsrs, doc(cfg(feature = "tracing")))]
pub use report::TracingReporter;
