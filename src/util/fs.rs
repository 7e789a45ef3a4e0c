//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Make a path absolute against the current directory.
///
/// Unlike `canonicalize`, the path doesn't have to exist and symlinks are
/// left alone.
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    std::path::absolute(path)
}

/// Render a path the way CMake expects it (forward slashes on every host).
pub fn cmake_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Shorten a path for status output, relative to the current directory
/// when it lives under it.
pub fn display_path(path: &Path) -> String {
    match std::env::current_dir() {
        Ok(cwd) if path.starts_with(&cwd) => relative_path(&cwd, path).display().to_string(),
        _ => path.display().to_string(),
    }
}
