//! Helpers shared by the file and directory copy code.

use filetime::{FileTime, set_file_times};
use std::fs::{self, File, Metadata};
use std::io;
use std::path::Path;

// =============================================================================
// Entry classification
// =============================================================================

/// What a traversed path turned out to be.
///
/// Symlinks are followed, so a link to a directory is a [`EntryKind::Directory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryKind {
    File,
    Directory,
    /// Sockets, fifos, devices
    Other,
}

impl EntryKind {
    pub(crate) fn of(path: &Path) -> io::Result<Self> {
        let meta = fs::metadata(path)?;
        Ok(Self::from_metadata(&meta))
    }

    pub(crate) fn from_metadata(meta: &Metadata) -> Self {
        if meta.is_dir() {
            Self::Directory
        } else if meta.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// Identity of a directory for loop detection.
///
/// On Unix this is (dev, ino). Elsewhere it falls back to a hash of the
/// canonical path.
#[cfg(unix)]
pub(crate) fn dir_identity(path: &Path) -> io::Result<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    let meta = fs::metadata(path)?;
    Ok((meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
pub(crate) fn dir_identity(path: &Path) -> io::Result<(u64, u64)> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let canonical = path.canonicalize()?;
    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    Ok((0, hasher.finish()))
}

// =============================================================================
// File content copying
// =============================================================================

/// Copy `len` bytes from `src` to `dst`.
///
/// Uses `copy_file_range` on Linux and a buffered copy elsewhere.
pub(crate) fn copy_file_contents(src: &File, dst: &File, len: u64) -> io::Result<u64> {
    #[cfg(target_os = "linux")]
    {
        copy_file_range_all(src, dst, len)
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = len;
        buffered_copy(src, dst)
    }
}

fn buffered_copy(src: &File, dst: &File) -> io::Result<u64> {
    use std::io::BufReader;
    io::copy(&mut BufReader::new(src), &mut &*dst)
}

#[cfg(target_os = "linux")]
fn copy_file_range_all(src: &File, dst: &File, len: u64) -> io::Result<u64> {
    use std::os::unix::io::AsRawFd;

    const CHUNK: u64 = 128 * 1024 * 1024;

    let mut remaining = len;
    let mut copied: u64 = 0;

    while remaining > 0 {
        let chunk = remaining.min(CHUNK) as usize;

        // SAFETY: both descriptors are open for the duration of the call and
        // null offsets make the kernel use (and advance) the file positions.
        let n = unsafe {
            libc::copy_file_range(
                src.as_raw_fd(),
                std::ptr::null_mut(),
                dst.as_raw_fd(),
                std::ptr::null_mut(),
                chunk,
                0,
            )
        };

        if n < 0 {
            let err = io::Error::last_os_error();
            // Cross-device or unsupported filesystem: nothing written yet, so
            // a plain copy from the start is still correct.
            let unsupported = matches!(
                err.raw_os_error(),
                Some(libc::EXDEV | libc::ENOSYS | libc::EINVAL | libc::EOPNOTSUPP)
            );
            if copied == 0 && unsupported {
                return buffered_copy(src, dst);
            }
            return Err(err);
        }

        if n == 0 {
            // Source shrank while copying
            break;
        }

        copied += n as u64;
        remaining = remaining.saturating_sub(n as u64);
    }

    Ok(copied)
}

// =============================================================================
// Metadata
// =============================================================================

/// Set `dst`'s access and modification times from `src_meta`.
pub(crate) fn preserve_timestamps(src_meta: &Metadata, dst: &Path) -> io::Result<()> {
    let mtime = FileTime::from_last_modification_time(src_meta);
    let atime = FileTime::from_last_access_time(src_meta);
    set_file_times(dst, atime, mtime)
}
