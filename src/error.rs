//! Error types for the media browser

use std::path::PathBuf;
use thiserror::Error;

/// Error kinds that can occur while resolving or scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanErrorKind {
    /// Requested path resolves outside the media root
    AccessDenied,
    /// Root or requested path does not exist
    NotFound,
    /// The top-level target of a listing or scan could not be read
    Unreadable,
    /// Permission denied on a single entry
    PermissionDenied,
    /// I/O error on a single entry
    IoError,
    /// Path is not valid UTF-8 or cannot be expressed relative to root
    InvalidPath,
}

/// Represents an error that occurred during resolution or scanning
#[derive(Debug, Clone, Error)]
#[error("{kind:?}: {message} (path: {path:?})")]
pub struct ScanError {
    /// The kind of error
    pub kind: ScanErrorKind,
    /// The path where the error occurred
    pub path: Option<PathBuf>,
    /// Human-readable error message
    pub message: String,
}

impl ScanError {
    /// Create a new scan error
    pub fn new(kind: ScanErrorKind, path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
        }
    }

    /// Create an access denied error for a path escaping the root
    pub fn access_denied(requested: impl Into<String>) -> Self {
        let requested = requested.into();
        Self::new(
            ScanErrorKind::AccessDenied,
            None,
            format!("Access denied: {:?}", requested),
        )
    }

    /// Create a not found error
    pub fn not_found(path: PathBuf) -> Self {
        Self::new(
            ScanErrorKind::NotFound,
            Some(path.clone()),
            format!("Not found: {:?}", path),
        )
    }

    /// Create an unreadable error for the top-level target of a call
    pub fn unreadable(path: PathBuf, message: impl Into<String>) -> Self {
        Self::new(ScanErrorKind::Unreadable, Some(path), message)
    }

    /// Create an invalid path error
    pub fn invalid_path(path: PathBuf) -> Self {
        Self::new(
            ScanErrorKind::InvalidPath,
            Some(path.clone()),
            format!("Invalid path: {:?}", path),
        )
    }

    /// Classify a walkdir error on a single entry
    pub fn from_walk_error(err: &walkdir::Error) -> Self {
        let path = err.path().map(|p| p.to_path_buf());
        let kind = match err.io_error().map(|e| e.kind()) {
            Some(std::io::ErrorKind::PermissionDenied) => ScanErrorKind::PermissionDenied,
            Some(std::io::ErrorKind::NotFound) => ScanErrorKind::NotFound,
            _ => ScanErrorKind::IoError,
        };
        Self::new(kind, path, err.to_string())
    }

    /// Classify a failure to open the top-level target of a call.
    /// A vanished target, or a path the OS cannot even express (such as one
    /// with a NUL byte), is `NotFound`; anything else is `Unreadable`.
    pub fn top_level(path: PathBuf, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::InvalidInput => {
                Self::not_found(path)
            }
            _ => Self::unreadable(path, format!("Cannot read directory: {}", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_error_classification() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let err = walkdir::WalkDir::new(&missing)
            .into_iter()
            .next()
            .unwrap()
            .unwrap_err();
        let scan = ScanError::from_walk_error(&err);
        assert_eq!(scan.kind, ScanErrorKind::NotFound);
        assert_eq!(scan.path, Some(missing));
    }

    #[test]
    fn test_top_level_classification() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(
            ScanError::top_level(PathBuf::from("/x"), &missing).kind,
            ScanErrorKind::NotFound
        );

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(
            ScanError::top_level(PathBuf::from("/x"), &denied).kind,
            ScanErrorKind::Unreadable
        );

        let nul = std::io::Error::new(std::io::ErrorKind::InvalidInput, "nul byte");
        assert_eq!(
            ScanError::top_level(PathBuf::from("/x"), &nul).kind,
            ScanErrorKind::NotFound
        );
    }
}
