use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhotoGpsError {
    #[error("{} is not a directory", .0.display())]
    InvalidPhotoPath(PathBuf),
    #[error("no photos found in {}", .0.display())]
    NoPhotosFound(PathBuf),
    #[error("metadata tool `{program}` could not be started; is it installed?")]
    ToolNotFound { program: String },
    #[error("`{command}` failed:\n{output}")]
    ExternalToolFailure { command: String, output: String },
    #[error("{} has no location tags", .0.display())]
    SourceMissingLocationTag(PathBuf),
    #[error("invalid exclude pattern: {0}")]
    ExcludePattern(#[from] globset::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PhotoGpsError {
    /// Errors after which no further photo can succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PhotoGpsError::ToolNotFound { .. } | PhotoGpsError::InvalidPhotoPath(_)
        )
    }
}

pub type Result<T, E = PhotoGpsError> = std::result::Result<T, E>;
