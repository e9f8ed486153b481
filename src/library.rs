//! Request-level operations over the media root
//!
//! [`MediaLibrary`] ties the resolver, lister, scanner and pagination
//! together for one request at a time. It holds no mutable state; every
//! call reads the file system afresh.

use log::{debug, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::BrowseConfig;
use crate::error::ScanError;
use crate::listing::list_directories;
use crate::models::{is_media, DirectoryEntry, MediaEntry, ScanOutcome};
use crate::pagination::{paginate, Page, PageRequest};
use crate::resolver::MediaRoot;
use crate::scanner::{scan_media, ScanOptions};

/// Aggregate view of the root directory
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryStats {
    /// Number of directories directly under the root
    pub total_directories: usize,
    /// Sum of the direct media counts of those directories
    pub total_media: u64,
    /// First few directory entries, in listing order
    pub preview: Vec<DirectoryEntry>,
}

/// Stateless façade used by the HTTP handlers and the CLI
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    root: MediaRoot,
    config: BrowseConfig,
}

impl MediaLibrary {
    /// Create a library for the configured root
    pub fn new(config: BrowseConfig) -> std::io::Result<Self> {
        let root = MediaRoot::new(&config.root)?;
        Ok(Self { root, config })
    }

    /// The media root
    pub fn root(&self) -> &MediaRoot {
        &self.root
    }

    /// Normalize raw pagination query values against the configured limits.
    /// Every value given for a key is passed; the first valid one is used.
    pub fn page_request(&self, offsets: &[&str], limits: &[&str]) -> PageRequest {
        PageRequest::from_query(offsets, limits, self.config.default_limit, self.config.max_limit)
    }

    /// One-level listing of the directory at `requested` (relative to root)
    pub fn directories(&self, requested: &str) -> Result<Vec<DirectoryEntry>, ScanError> {
        let dir = self.locate(requested)?;
        debug!("Listing directories in {:?}", dir);
        let outcome = list_directories(&self.root, &dir)?;
        Ok(report(outcome))
    }

    /// A page of media under `requested`, scanned only as far as the page
    /// needs
    pub fn media_page(
        &self,
        requested: &str,
        recursive: bool,
        request: PageRequest,
    ) -> Result<Page<MediaEntry>, ScanError> {
        let dir = self.locate(requested)?;
        let work_limit = request.work_limit();
        debug!(
            "Scanning {:?} (recursive: {}, offset: {}, limit: {}, work limit: {})",
            dir, recursive, request.offset, request.limit, work_limit
        );

        let options = if recursive {
            ScanOptions::recursive(work_limit)
        } else {
            ScanOptions::shallow(work_limit)
        };
        let outcome = scan_media(&self.root, &dir, options)?;
        Ok(paginate(report(outcome), request, work_limit))
    }

    /// Directory count, media total and a preview of the root listing
    pub fn stats(&self) -> Result<LibraryStats, ScanError> {
        let directories = self.directories("")?;
        let total_media = directories.iter().map(|d| d.media_count).sum();
        Ok(LibraryStats {
            total_directories: directories.len(),
            total_media,
            preview: directories
                .into_iter()
                .take(self.config.stats_preview)
                .collect(),
        })
    }

    /// Absolute path of a media file that may be served
    pub fn media_file(&self, requested: &str) -> Result<PathBuf, ScanError> {
        let path = self.locate(requested)?;
        let servable = path.is_file()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_media);
        if !servable {
            return Err(ScanError::not_found(path));
        }
        Ok(path)
    }

    /// Resolve a request path and make sure it exists without leaving the
    /// root through a symlink
    fn locate(&self, requested: &str) -> Result<PathBuf, ScanError> {
        let path = self.root.resolve(requested)?;
        let real_root = canonical(self.root.as_path())?;
        let real_path = canonical(&path)?;
        if !real_path.starts_with(&real_root) {
            return Err(ScanError::access_denied(requested));
        }
        Ok(path)
    }
}

fn canonical(path: &Path) -> Result<PathBuf, ScanError> {
    std::fs::canonicalize(path).map_err(|e| ScanError::top_level(path.to_path_buf(), &e))
}

/// Log skipped entries and hand back the collected items
fn report<T>(outcome: ScanOutcome<T>) -> Vec<T> {
    if !outcome.is_complete() {
        warn!("Skipped {} unreadable entries", outcome.skipped_count());
        for skipped in &outcome.skipped {
            warn!("Skipped entry: {}", skipped);
        }
    }
    outcome.items
}
