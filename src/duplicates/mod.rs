//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Digesting every walked file (Phase 1)
//! - Bucketing by digest with byte-for-byte confirmation (Phase 2)
//! - Duplicate group management

pub mod finder;
pub mod groups;

use std::path::Path;
use std::sync::Arc;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary, SkippedFile};
pub use groups::{BucketMap, CollisionPolicy, DuplicateGroup, Placement};

use crate::progress::Progress;

/// Find duplicate files under `root` with default settings.
///
/// When `verbose` is set, a console status line reports how many files and
/// megabytes have been checked so far.
///
/// # Errors
///
/// Returns [`FinderError`] if a directory or file under `root` cannot be
/// read.
///
/// # Example
///
/// ```no_run
/// use dupfind::duplicates::find_duplicates;
/// use std::path::Path;
///
/// for group in find_duplicates(Path::new("."), false).unwrap() {
///     println!("{} has {} copies", group.representative().display(), group.duplicate_count());
/// }
/// ```
pub fn find_duplicates(root: &Path, verbose: bool) -> Result<Vec<DuplicateGroup>, FinderError> {
    let mut config = FinderConfig::default();
    if verbose {
        config = config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    DuplicateFinder::new(config)
        .find_duplicates(root)
        .map(|(groups, _)| groups)
}
