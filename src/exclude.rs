//! Name-only exclude patterns.
//!
//! Patterns are shell-style globs matched against a single path segment
//! (a bare file or directory name), never against a full path. The same
//! set is applied at every depth of a copy.

use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::ffi::OsStr;

/// A compiled set of exclude patterns.
#[derive(Debug, Clone)]
pub struct ExcludeSet {
    patterns: Vec<String>,
    set: GlobSet,
}

impl ExcludeSet {
    /// Compile a set of glob patterns.
    ///
    /// Empty pattern strings are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] for the first pattern that is not a
    /// valid glob.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        let mut kept = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            if pattern.is_empty() {
                continue;
            }
            let glob = Glob::new(pattern).map_err(|source| Error::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
            builder.add(glob);
            kept.push(pattern.to_string());
        }

        let set = builder.build().map_err(|source| Error::InvalidPattern {
            pattern: kept.join(","),
            source,
        })?;

        Ok(Self {
            patterns: kept,
            set,
        })
    }

    /// A set that excludes nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }

    /// Whether `name` matches any pattern.
    ///
    /// Names that are not valid UTF-8 are matched on their lossy rendering.
    #[must_use]
    pub fn is_excluded(&self, name: &OsStr) -> bool {
        if self.set.is_empty() {
            return false;
        }
        self.set.is_match(name.to_string_lossy().as_ref())
    }

    /// The source patterns, in the order given.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether the set has no patterns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for ExcludeSet {
    fn default() -> Self {
        Self::empty()
    }
}
