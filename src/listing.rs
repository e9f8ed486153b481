//! Shallow directory listing
//!
//! Lists the immediate sub-directories of a directory and, for each of them,
//! looks one level further to count its own direct media files and
//! sub-directories. Nothing deeper is ever read.

use std::path::Path;
use walkdir::{DirEntry, WalkDir};

use crate::error::ScanError;
use crate::models::{compare_names, is_media, to_datetime, DirectoryEntry, ScanOutcome};
use crate::resolver::MediaRoot;

/// Direct-children counts of a single directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryCounts {
    /// Media files directly inside the directory
    pub media: u64,
    /// Directories directly inside the directory
    pub subdirectories: u64,
}

/// One-level walker over `dir`. Symlinks are reported but never followed.
pub(crate) fn shallow_walk(dir: &Path, sorted: bool) -> walkdir::IntoIter {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false);
    if sorted {
        walker.sort_by(by_name).into_iter()
    } else {
        walker.into_iter()
    }
}

pub(crate) fn by_name(a: &DirEntry, b: &DirEntry) -> std::cmp::Ordering {
    compare_names(&a.file_name().to_string_lossy(), &b.file_name().to_string_lossy())
}

/// Fail unless `dir` exists and is a directory
pub(crate) fn ensure_directory(dir: &Path) -> Result<(), ScanError> {
    let metadata = std::fs::metadata(dir).map_err(|e| ScanError::top_level(dir.to_path_buf(), &e))?;
    if !metadata.is_dir() {
        return Err(ScanError::new(
            crate::error::ScanErrorKind::NotFound,
            Some(dir.to_path_buf()),
            format!("Not a directory: {:?}", dir),
        ));
    }
    Ok(())
}

/// Convert a walker error on the directory being read into a hard failure
pub(crate) fn top_level_walk_error(dir: &Path, err: &walkdir::Error) -> ScanError {
    match err.io_error() {
        Some(io) => ScanError::top_level(dir.to_path_buf(), io),
        None => ScanError::unreadable(dir.to_path_buf(), err.to_string()),
    }
}

/// List the immediate sub-directories of `dir`, sorted by name.
///
/// A child that cannot be described or counted is left out and recorded in
/// [`ScanOutcome::skipped`]; only a failure to read `dir` itself is an error.
pub fn list_directories(
    root: &MediaRoot,
    dir: &Path,
) -> Result<ScanOutcome<DirectoryEntry>, ScanError> {
    ensure_directory(dir)?;

    let mut outcome = ScanOutcome::new();
    for entry in shallow_walk(dir, true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(top_level_walk_error(dir, &err)),
            Err(err) => {
                outcome.skipped.push(ScanError::from_walk_error(&err));
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        match describe_directory(root, &entry, &mut outcome.skipped) {
            Ok(described) => outcome.items.push(described),
            Err(err) => outcome.skipped.push(err),
        }
    }

    Ok(outcome)
}

fn describe_directory(
    root: &MediaRoot,
    entry: &DirEntry,
    skipped: &mut Vec<ScanError>,
) -> Result<DirectoryEntry, ScanError> {
    let path = entry.path();
    let name = entry
        .file_name()
        .to_str()
        .ok_or_else(|| ScanError::invalid_path(path.to_path_buf()))?
        .to_string();
    let relative = root
        .relative_path(path)
        .ok_or_else(|| ScanError::invalid_path(path.to_path_buf()))?;
    let metadata = entry.metadata().map_err(|e| ScanError::from_walk_error(&e))?;
    let counts = count_direct_children(path, skipped)?;

    Ok(DirectoryEntry {
        name,
        path: relative,
        media_count: counts.media,
        subdirectory_count: counts.subdirectories,
        last_modified: to_datetime(metadata.modified()),
        size: metadata.len(),
    })
}

/// Count the direct media files and direct sub-directories of `dir`.
///
/// Entries that cannot be read are pushed to `skipped` and not counted.
pub fn count_direct_children(
    dir: &Path,
    skipped: &mut Vec<ScanError>,
) -> Result<DirectoryCounts, ScanError> {
    let mut counts = DirectoryCounts::default();
    for entry in shallow_walk(dir, false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(top_level_walk_error(dir, &err)),
            Err(err) => {
                skipped.push(ScanError::from_walk_error(&err));
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            counts.subdirectories += 1;
        } else if file_type.is_file() && is_media(&entry.file_name().to_string_lossy()) {
            counts.media += 1;
        }
    }
    Ok(counts)
}
