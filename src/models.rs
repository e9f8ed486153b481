//! Core data models and entry classification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;
use std::time::SystemTime;

use crate::error::ScanError;

/// Recognised image extensions (lowercase, without dot)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "svg"];

/// Recognised video extensions (lowercase, without dot)
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "wmv", "flv", "webm", "mkv", "m4v"];

/// Label used as the containing directory of entries that sit directly in the root
pub const ROOT_LABEL: &str = "Root";

/// Media kind classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Image files (jpg, png, webp, etc.)
    Image,
    /// Video files (mp4, mkv, avi, etc.)
    Video,
}

impl MediaKind {
    /// Infer media kind from a file extension, `None` when it is not media
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext_lower = ext.to_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext_lower.as_str()) {
            Some(MediaKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext_lower.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a file name by its final extension
pub fn kind_of(file_name: &str) -> Option<MediaKind> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .and_then(MediaKind::from_extension)
}

/// Whether a file name carries a recognised media extension
pub fn is_media(file_name: &str) -> bool {
    kind_of(file_name).is_some()
}

/// Name ordering used for every listing: case-insensitive first, with a
/// case-sensitive tiebreak so the order is total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Convert a filesystem timestamp for serialization
pub fn to_datetime(time: std::io::Result<SystemTime>) -> Option<DateTime<Utc>> {
    time.ok().map(DateTime::<Utc>::from)
}

/// A directory one level below the listed directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    /// Directory name
    pub name: String,
    /// Path relative to the media root, `/`-separated
    pub path: String,
    /// Number of media files directly inside this directory
    pub media_count: u64,
    /// Number of directories directly inside this directory
    pub subdirectory_count: u64,
    /// Last modification time
    pub last_modified: Option<DateTime<Utc>>,
    /// Size reported by the filesystem for the directory node itself
    pub size: u64,
}

/// A media file found by a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaEntry {
    /// File name
    pub name: String,
    /// Path relative to the media root, `/`-separated
    pub path: String,
    /// Parent directory relative to the root, or [`ROOT_LABEL`]
    pub directory: String,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: Option<DateTime<Utc>>,
    /// Image or video
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

/// Result of a listing or scan: the collected items plus the entries that
/// were skipped because they could not be read.
#[derive(Debug, Clone)]
pub struct ScanOutcome<T> {
    /// Successfully collected items, in output order
    pub items: Vec<T>,
    /// Per-entry failures that were skipped
    pub skipped: Vec<ScanError>,
}

impl<T> Default for ScanOutcome<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> ScanOutcome<T> {
    /// Create an empty outcome
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of skipped entries
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Check if nothing was skipped
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}
