//! On-demand media directory browser
//!
//! Lists and pages through a directory tree of images and videos without
//! building an index: every request resolves its path against a fixed root,
//! then performs a shallow listing or a bounded scan of the file system.

pub mod config;
pub mod error;
pub mod library;
pub mod listing;
pub mod models;
pub mod pagination;
pub mod resolver;
pub mod scanner;
pub mod server;

pub use config::BrowseConfig;
pub use error::{ScanError, ScanErrorKind};
pub use library::{LibraryStats, MediaLibrary};
pub use listing::{count_direct_children, list_directories, DirectoryCounts};
pub use models::{
    is_media, kind_of, DirectoryEntry, MediaEntry, MediaKind, ScanOutcome, IMAGE_EXTENSIONS,
    VIDEO_EXTENSIONS,
};
pub use pagination::{paginate, Page, PageRequest};
pub use resolver::MediaRoot;
pub use scanner::{scan_media, ScanOptions};
pub use server::router;
