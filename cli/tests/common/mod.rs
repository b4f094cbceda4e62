//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A test fixture with a source root, a destination root, and a key list.
pub struct TestFixture {
    pub src: TempDir,
    pub dst: TempDir,
    pub lists: TempDir,
}

impl TestFixture {
    /// Create a new test fixture with fresh, empty directories.
    pub fn new() -> Self {
        Self {
            src: TempDir::new().expect("Failed to create temp source dir"),
            dst: TempDir::new().expect("Failed to create temp dest dir"),
            lists: TempDir::new().expect("Failed to create temp list dir"),
        }
    }

    /// Write a file under the source root, creating parents.
    pub fn src_file(&self, rel: &str, content: &str) -> PathBuf {
        write_file(&self.src.path().join(rel), content)
    }

    /// Write a file under the destination root, creating parents.
    pub fn dst_file(&self, rel: &str, content: &str) -> PathBuf {
        write_file(&self.dst.path().join(rel), content)
    }

    /// Create an empty directory under the destination root.
    pub fn dst_dir(&self, rel: &str) -> PathBuf {
        let path = self.dst.path().join(rel);
        fs::create_dir_all(&path).expect("Failed to create directory");
        path
    }

    /// Write the key list and return its path.
    pub fn key_list(&self, text: &str) -> PathBuf {
        write_file(&self.lists.path().join("keys.txt"), text)
    }

    /// Sorted relative paths of every file under `dir`.
    pub fn files_under(&self, dir: &Path) -> Vec<String> {
        let mut out = Vec::new();
        collect_files(dir, dir, &mut out);
        out.sort();
        out
    }

    /// Check if a file exists and has the expected content.
    pub fn assert_file_content(&self, path: &Path, expected: &str) {
        assert!(path.exists(), "File does not exist: {:?}", path);
        let actual = fs::read_to_string(path).expect("Failed to read file");
        assert_eq!(actual, expected, "File content mismatch");
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, content).expect("Failed to write file");
    path.to_path_buf()
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) {
    if !dir.is_dir() {
        return;
    }
    for entry in fs::read_dir(dir).expect("Failed to read directory") {
        let path = entry.expect("Failed to read entry").path();
        if path.is_dir() {
            collect_files(root, &path, out);
        } else {
            let rel = path.strip_prefix(root).expect("path under root");
            out.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
}
