//! Scanner module - bounded collection of media files below a directory

use std::path::Path;
use walkdir::{DirEntry, WalkDir};

use crate::error::ScanError;
use crate::listing::{by_name, ensure_directory, top_level_walk_error};
use crate::models::{kind_of, to_datetime, MediaEntry, MediaKind, ScanOutcome};
use crate::resolver::MediaRoot;

/// Options for a single media scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Descend into sub-directories (depth-first, in name order)
    pub recursive: bool,
    /// Maximum number of media entries collected by the whole call
    pub work_limit: usize,
}

impl ScanOptions {
    /// Direct children only
    pub fn shallow(work_limit: usize) -> Self {
        Self {
            recursive: false,
            work_limit,
        }
    }

    /// Whole subtree, until the limit is reached
    pub fn recursive(work_limit: usize) -> Self {
        Self {
            recursive: true,
            work_limit,
        }
    }

    fn max_depth(&self) -> usize {
        if self.recursive {
            usize::MAX
        } else {
            1
        }
    }
}

/// Collect media files below `dir`, stopping once `work_limit` entries have
/// been collected.
///
/// Entries are visited depth-first in name order, so a sub-directory's media
/// appear at the position of the sub-directory's name. Paths and directory
/// labels are relative to `root`, not to `dir`. Unreadable entries and
/// sub-directories are skipped and reported in [`ScanOutcome::skipped`];
/// only a failure to read `dir` itself is an error.
pub fn scan_media(
    root: &MediaRoot,
    dir: &Path,
    options: ScanOptions,
) -> Result<ScanOutcome<MediaEntry>, ScanError> {
    ensure_directory(dir)?;

    let mut outcome = ScanOutcome::new();
    if options.work_limit == 0 {
        std::fs::read_dir(dir).map_err(|e| ScanError::top_level(dir.to_path_buf(), &e))?;
        return Ok(outcome);
    }

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(options.max_depth())
        .follow_links(false)
        .sort_by(by_name);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(top_level_walk_error(dir, &err)),
            Err(err) => {
                outcome.skipped.push(ScanError::from_walk_error(&err));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        let Some(kind) = kind_of(&entry.file_name().to_string_lossy()) else {
            continue;
        };

        match describe_media(root, &entry, kind) {
            Ok(media) => {
                outcome.items.push(media);
                if outcome.items.len() >= options.work_limit {
                    break;
                }
            }
            Err(err) => outcome.skipped.push(err),
        }
    }

    Ok(outcome)
}

fn describe_media(root: &MediaRoot, entry: &DirEntry, kind: MediaKind) -> Result<MediaEntry, ScanError> {
    let path = entry.path();
    let invalid = || ScanError::invalid_path(path.to_path_buf());

    let name = entry.file_name().to_str().ok_or_else(invalid)?.to_string();
    let relative = root.relative_path(path).ok_or_else(invalid)?;
    let parent = path.parent().ok_or_else(invalid)?;
    let directory = root.directory_label(parent).ok_or_else(invalid)?;

    // Stat only after classification, so the limit also bounds stat calls
    let metadata = entry.metadata().map_err(|e| ScanError::from_walk_error(&e))?;

    Ok(MediaEntry {
        name,
        path: relative,
        directory,
        size: metadata.len(),
        modified: to_datetime(metadata.modified()),
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanErrorKind;
    use crate::models::ROOT_LABEL;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path, bytes: &[u8]) {
        fs::write(path, bytes).unwrap();
    }

    /// root/
    ///   a.jpg, b/{c.jpg, d.mov, e/{f.png}}, g.txt, h.webm
    fn fixture() -> (TempDir, MediaRoot) {
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        fs::create_dir_all(base.join("b/e")).unwrap();
        touch(&base.join("a.jpg"), b"aaaa");
        touch(&base.join("b/c.jpg"), b"c");
        touch(&base.join("b/d.mov"), b"d");
        touch(&base.join("b/e/f.png"), b"f");
        touch(&base.join("g.txt"), b"g");
        touch(&base.join("h.webm"), b"h");
        let root = MediaRoot::new(base).unwrap();
        (dir, root)
    }

    fn paths(outcome: &ScanOutcome<MediaEntry>) -> Vec<&str> {
        outcome.items.iter().map(|m| m.path.as_str()).collect()
    }

    #[test]
    fn test_shallow_scan_ignores_subdirectories() {
        let (_dir, root) = fixture();
        let outcome = scan_media(&root, root.as_path(), ScanOptions::shallow(100)).unwrap();
        assert_eq!(paths(&outcome), vec!["a.jpg", "h.webm"]);
        assert!(outcome.is_complete());
    }

    #[test]
    fn test_shallow_scan_respects_limit() {
        let (_dir, root) = fixture();
        let outcome = scan_media(&root, root.as_path(), ScanOptions::shallow(1)).unwrap();
        assert_eq!(paths(&outcome), vec!["a.jpg"]);
    }

    #[test]
    fn test_recursive_scan_is_depth_first_in_name_order() {
        let (_dir, root) = fixture();
        let outcome = scan_media(&root, root.as_path(), ScanOptions::recursive(100)).unwrap();
        assert_eq!(
            paths(&outcome),
            vec!["a.jpg", "b/c.jpg", "b/d.mov", "b/e/f.png", "h.webm"]
        );
    }

    #[test]
    fn test_recursive_scan_stops_at_limit() {
        let (_dir, root) = fixture();
        for limit in 0..7 {
            let outcome =
                scan_media(&root, root.as_path(), ScanOptions::recursive(limit)).unwrap();
            assert_eq!(outcome.items.len(), limit.min(5));
        }
        let outcome = scan_media(&root, root.as_path(), ScanOptions::recursive(3)).unwrap();
        assert_eq!(paths(&outcome), vec!["a.jpg", "b/c.jpg", "b/d.mov"]);
    }

    #[test]
    fn test_entries_are_relative_to_original_root() {
        let (_dir, root) = fixture();
        let b = root.resolve("b").unwrap();
        let outcome = scan_media(&root, &b, ScanOptions::recursive(100)).unwrap();
        assert_eq!(paths(&outcome), vec!["b/c.jpg", "b/d.mov", "b/e/f.png"]);

        let labels: Vec<_> = outcome.items.iter().map(|m| m.directory.as_str()).collect();
        assert_eq!(labels, vec!["b", "b", "b/e"]);

        for media in &outcome.items {
            let resolved = root.resolve(&media.path).unwrap();
            assert!(resolved.is_file());
        }
    }

    #[test]
    fn test_entry_metadata() {
        let (_dir, root) = fixture();
        let outcome = scan_media(&root, root.as_path(), ScanOptions::shallow(100)).unwrap();
        let first = &outcome.items[0];
        assert_eq!(first.name, "a.jpg");
        assert_eq!(first.directory, ROOT_LABEL);
        assert_eq!(first.size, 4);
        assert_eq!(first.kind, MediaKind::Image);
        assert!(first.modified.is_some());
        assert_eq!(outcome.items[1].kind, MediaKind::Video);
    }

    #[test]
    fn test_unknown_extensions_are_excluded() {
        let (_dir, root) = fixture();
        let outcome = scan_media(&root, root.as_path(), ScanOptions::recursive(100)).unwrap();
        assert!(outcome.items.iter().all(|m| !m.name.ends_with(".txt")));
    }

    #[test]
    fn test_missing_directory_is_hard_failure() {
        let (_dir, root) = fixture();
        let missing = root.as_path().join("missing");
        let err = scan_media(&root, &missing, ScanOptions::shallow(10)).unwrap_err();
        assert_eq!(err.kind, ScanErrorKind::NotFound);

        let err = scan_media(&root, &missing, ScanOptions::shallow(0)).unwrap_err();
        assert_eq!(err.kind, ScanErrorKind::NotFound);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_undescribable_file_is_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        for name in [OsStr::new("a.jpg"), OsStr::from_bytes(b"b\xff.jpg"), OsStr::new("c.jpg")] {
            touch(&dir.path().join(name), b"x");
        }
        let root = MediaRoot::new(dir.path()).unwrap();

        let outcome = scan_media(&root, root.as_path(), ScanOptions::shallow(100)).unwrap();
        assert_eq!(paths(&outcome), vec!["a.jpg", "c.jpg"]);
        assert_eq!(outcome.skipped_count(), 1);
        assert_eq!(outcome.skipped[0].kind, ScanErrorKind::InvalidPath);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, root) = fixture();
        let locked = dir.path().join("b/e");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let outcome = scan_media(&root, root.as_path(), ScanOptions::recursive(100));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        let outcome = outcome.unwrap();

        assert_eq!(paths(&outcome), vec!["a.jpg", "b/c.jpg", "b/d.mov", "h.webm"]);
        assert_eq!(outcome.skipped_count(), 1);
        assert_eq!(outcome.skipped[0].kind, ScanErrorKind::PermissionDenied);
    }
}
