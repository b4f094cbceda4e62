//! Single file writes.
//!
//! Every file is written to a temporary file next to its destination and
//! renamed into place, so an interrupted run never leaves a partially
//! written destination file behind.

use crate::options::FileCopyOptions;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

use super::utils::{copy_file_contents, preserve_timestamps};

/// Copy `src` over `dst`, replacing any existing file at `dst`.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Fails if `src` is a directory or cannot be read, if the temporary file
/// cannot be created in `dst`'s parent, or if the final rename fails (for
/// example when `dst` is an existing directory).
pub(crate) fn copy_file_atomic(src: &Path, dst: &Path, options: &FileCopyOptions) -> io::Result<u64> {
    let src_meta = fs::metadata(src)?;
    if src_meta.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::IsADirectory,
            format!("source is a directory: {}", src.display()),
        ));
    }

    let src_file = File::open(src)?;
    let dst_parent = match dst.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp_file = create_temp_file(dst_parent, options)?;
    let bytes = copy_file_contents(&src_file, temp_file.as_file(), src_meta.len())?;

    if options.fsync {
        temp_file.as_file().sync_all()?;
    }

    if options.preserve_permissions {
        fs::set_permissions(temp_file.path(), src_meta.permissions())?;
    }

    // persist() replaces an existing destination file; the temp file is
    // deleted if the rename fails.
    temp_file.persist(dst).map_err(|e| e.error)?;

    if options.preserve_timestamps {
        preserve_timestamps(&src_meta, dst)?;
    }

    Ok(bytes)
}

fn create_temp_file(dir: &Path, options: &FileCopyOptions) -> io::Result<NamedTempFile> {
    if options.preserve_permissions {
        // 0o600 for now, source permissions are applied before the rename
        return NamedTempFile::new_in(dir);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tempfile::Builder::new()
            .permissions(fs::Permissions::from_mode(0o666))
            .tempfile_in(dir)
    }
    #[cfg(not(unix))]
    {
        NamedTempFile::new_in(dir)
    }
}
