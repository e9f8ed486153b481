//! Resolution of user-supplied relative paths against the media root

use std::path::{Component, Path, PathBuf};

use crate::error::ScanError;
use crate::models::ROOT_LABEL;

/// The single directory every request is scoped to.
///
/// Constructed once at startup and shared read-only; all request paths are
/// resolved through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRoot {
    path: PathBuf,
}

impl MediaRoot {
    /// Create a root from a configured path. Relative paths are made absolute
    /// against the current directory; the directory does not have to exist.
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let absolute = std::path::absolute(path.as_ref())?;
        Ok(Self {
            path: normalize(&absolute),
        })
    }

    /// Absolute path of the root
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Join a requested relative path onto the root.
    ///
    /// The join collapses `.` and `..` lexically and treats a leading `/` as
    /// relative to the root. The result must then lie at or below the root on
    /// a component boundary, so `/photos-private` never passes for `/photos`.
    /// Any `..` segment is refused even when it would resolve back inside.
    /// Existence is not checked here.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf, ScanError> {
        let requested_path = Path::new(requested);
        if requested_path
            .components()
            .any(|c| matches!(c, Component::Prefix(_)))
        {
            return Err(ScanError::access_denied(requested));
        }

        let candidate = normalize(&self.path.join(strip_root(requested_path)));
        if !candidate.starts_with(&self.path) {
            return Err(ScanError::access_denied(requested));
        }
        if requested_path
            .components()
            .any(|c| c == Component::ParentDir)
        {
            return Err(ScanError::access_denied(requested));
        }

        Ok(candidate)
    }

    /// Express an absolute path below the root as a `/`-separated relative
    /// path. Returns an empty string for the root itself and `None` for paths
    /// outside the root or with non UTF-8 names.
    pub fn relative_path(&self, absolute: &Path) -> Option<String> {
        let relative = absolute.strip_prefix(&self.path).ok()?;
        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_str()?),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(segments.join("/"))
    }

    /// Label for the directory containing an entry: the parent relative to
    /// the root, or [`ROOT_LABEL`] when the parent is the root itself.
    pub fn directory_label(&self, parent: &Path) -> Option<String> {
        if parent == self.path {
            return Some(ROOT_LABEL.to_string());
        }
        self.relative_path(parent)
    }
}

impl std::fmt::Display for MediaRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Drop any root or prefix so the path can be joined under the media root
fn strip_root(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect()
}

/// Lexical normalization: removes `.` and folds `..` into its parent
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
