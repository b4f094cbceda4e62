//! Key list parsing.
//!
//! A key list is free-form text naming the top-level entries to keep and
//! copy. The format is permissive:
//!
//! - everything from the first `#` on a line is a comment; `\n`, `\r\n`,
//!   a lone `\r` and the other Unicode line separators all end a line
//! - blank lines are ignored
//! - a line may hold several keys separated by commas and/or whitespace
//!
//! Tokens must match `[A-Za-z0-9_\-./]+`. Tokens that do not are rejected
//! without failing the parse; they are returned in
//! [`ParsedKeys::rejected`] so callers can log or inspect them.
//!
//! # Example
//!
//! ```
//! use keysync::parse_keys;
//!
//! let parsed = parse_keys("alpha, beta # comment\n\nGAMMA-1\nbad!token\n");
//! assert_eq!(parsed.keys.len(), 3);
//! assert!(parsed.keys.contains("GAMMA-1"));
//! assert_eq!(parsed.rejected[0].token, "bad!token");
//! ```

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::collections::btree_set;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static KEY_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-./]+$").expect("key token pattern is valid"));

/// A deduplicated set of keys.
///
/// Iteration is in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeySet(BTreeSet<String>);

impl KeySet {
    /// Create an empty key set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `key` is in the set
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    /// Insert a key without validating it.
    ///
    /// Returns `true` if the key was not already present.
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        self.0.insert(key.into())
    }

    /// Iterate over the keys in sorted order.
    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.0.iter()
    }

    /// Render the set as a key list, one key per line.
    ///
    /// Feeding the result back through [`parse_keys`] yields the same set.
    #[must_use]
    pub fn to_list_text(&self) -> String {
        let mut text = String::new();
        for key in &self.0 {
            text.push_str(key);
            text.push('\n');
        }
        text
    }
}

impl<'a> IntoIterator for &'a KeySet {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for KeySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// A token that failed key validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedToken {
    /// 1-based line number the token appeared on
    pub line: usize,
    /// The token text
    pub token: String,
}

/// Result of parsing a key list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedKeys {
    /// Valid, deduplicated keys
    pub keys: KeySet,
    /// Tokens dropped because they failed validation, in input order
    pub rejected: Vec<RejectedToken>,
}

/// Check a single token against the key grammar.
#[must_use]
pub fn is_valid_key(token: &str) -> bool {
    KEY_TOKEN.is_match(token)
}

/// Line terminators, including the Unicode and control separators.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Split text into lines. `\r\n` counts as one break and a trailing break
/// does not start an extra line.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let Some((at, c)) = rest.char_indices().find(|&(_, c)| is_line_break(c)) else {
            return Some(std::mem::take(&mut rest));
        };
        let line = &rest[..at];
        let mut next = at + c.len_utf8();
        if c == '\r' && rest[next..].starts_with('\n') {
            next += 1;
        }
        rest = &rest[next..];
        Some(line)
    })
}

/// Split one line into candidate tokens, dropping comments.
fn line_tokens(line: &str) -> impl Iterator<Item = &str> {
    let content = line.split('#').next().unwrap_or_default().trim();
    content
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
}

/// Parse keys from raw text.
///
/// Never fails: empty input, comment-only input, or input with no valid
/// tokens all produce an empty key set.
#[must_use]
pub fn parse_keys(text: &str) -> ParsedKeys {
    let mut parsed = ParsedKeys::default();

    for (index, line) in split_lines(text).enumerate() {
        for token in line_tokens(line) {
            if is_valid_key(token) {
                parsed.keys.insert(token);
            } else {
                parsed.rejected.push(RejectedToken {
                    line: index + 1,
                    token: token.to_string(),
                });
            }
        }
    }

    parsed
}

/// Read a key list file and parse it with [`parse_keys`].
///
/// # Errors
///
/// Returns [`Error::KeyList`] if the file is missing, unreadable, or not
/// valid UTF-8.
pub fn parse_keys_file(path: &Path) -> Result<ParsedKeys> {
    let text = fs::read_to_string(path).map_err(|source| Error::KeyList {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_keys(&text))
}
