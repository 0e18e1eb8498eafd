use photogps_core::PhotoGpsError;
use std::path::{Path, PathBuf};

/// Resolves the operator-supplied photo directory.
/// Relative paths are taken from the current working directory.
pub fn resolve_root(path: &Path) -> Result<PathBuf, PhotoGpsError> {
    let cwd = std::env::current_dir()?;
    resolve_root_in(path, &cwd)
}

pub fn resolve_root_in(path: &Path, cwd: &Path) -> Result<PathBuf, PhotoGpsError> {
    let resolved = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    if !resolved.is_dir() {
        return Err(PhotoGpsError::InvalidPhotoPath(resolved));
    }
    Ok(resolved)
}
