//! Copy operations.
//!
//! Directory copies merge the source tree into the destination, applying
//! exclude patterns at every level. Files are written atomically.

mod dir;
mod file;
mod utils;

// Re-export public API
pub use dir::{copy_contents, copy_keys};

pub(crate) use file::copy_file_atomic;
