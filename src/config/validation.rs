//! Directory validation for action configuration.

use crate::error::{KeyActionError, Result};
use std::path::{Path, PathBuf};

/// Validate that `path` is a readable directory.
///
/// # Error Cases
/// - Path does not exist
/// - Path points to a file
/// - Directory cannot be listed due to permissions
pub fn validate_actions_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(KeyActionError::file_error(
            format!("Directory does not exist: {}", path.display()),
            std::io::Error::new(std::io::ErrorKind::NotFound, "Directory not found"),
        ));
    }

    let metadata = std::fs::metadata(path)
        .map_err(|e| KeyActionError::file_error("Failed to read directory metadata", e))?;

    if !metadata.is_dir() {
        return Err(KeyActionError::file_error(
            format!("Path is not a directory: {}", path.display()),
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "Not a directory"),
        ));
    }

    std::fs::read_dir(path)
        .map_err(|e| KeyActionError::file_error("Cannot list directory", e))?;

    Ok(())
}

/// `*.json` files directly inside `dir`, sorted by file name.
pub fn list_action_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| KeyActionError::file_error("Cannot list directory", e))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
