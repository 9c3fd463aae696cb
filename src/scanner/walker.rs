//! Directory walker built on walkdir.
//!
//! # Overview
//!
//! [`Walker`] enumerates every regular file below a root directory,
//! depth-first, in a deterministic order (children sorted by file name).
//! walkdir keeps its own explicit stack of open directories, so deeply
//! nested trees do not grow the call stack.
//!
//! # Features
//!
//! - Optional symlink following (loops reported as errors)
//! - Gitignore-style pattern matching via the `ignore` crate
//! - Hidden entry filtering
//! - Graceful shutdown via atomic flag
//!
//! A root that does not exist or is not a directory produces no entries
//! and no error.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::scanner::enumerate_files;
//! use std::path::Path;
//!
//! let files = enumerate_files(Path::new("/home/user/Downloads")).unwrap();
//! println!("Found {} files", files.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use walkdir::{DirEntry, WalkDir};

use super::{ScanError, WalkerConfig};

/// Collect all regular files under `root` with the default configuration.
///
/// # Errors
///
/// Returns the first [`ScanError`] met while listing directories.
pub fn enumerate_files(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    Walker::new(root, WalkerConfig::default()).walk().collect()
}

/// Directory walker for file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupfind::scanner::{Walker, WalkerConfig};
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."), WalkerConfig::default());
    /// ```
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// Once the flag is `true` the iterator ends at the next entry.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Root directory this walker enumerates.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Build the gitignore matcher from configured patterns.
    fn build_gitignore(&self) -> Option<Gitignore> {
        if self.config.ignore_patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(&self.root);
        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if !gitignore.is_empty() => Some(gitignore),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Decide whether an entry (and, for directories, its subtree) is skipped.
    fn is_excluded(&self, entry: &DirEntry, gitignore: Option<&Gitignore>) -> bool {
        if self.config.skip_hidden && entry.file_name().to_string_lossy().starts_with('.') {
            log::trace!("Skipping hidden entry: {}", entry.path().display());
            return true;
        }

        if let Some(gi) = gitignore {
            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            let normalized = if cfg!(windows) {
                relative.to_string_lossy().replace('\\', "/")
            } else {
                relative.to_string_lossy().into_owned()
            };

            if gi.matched(normalized, entry.file_type().is_dir()).is_ignore() {
                log::trace!("Ignoring: {}", entry.path().display());
                return true;
            }
        }

        false
    }

    /// Walk the directory tree, yielding regular file paths.
    ///
    /// Errors are yielded as [`ScanError`] values; the caller decides
    /// whether to stop or keep going.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupfind::scanner::{Walker, WalkerConfig};
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."), WalkerConfig::default());
    /// let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
    /// println!("Found {} files", files.len());
    /// ```
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf, ScanError>> + '_ {
        if !self.root.is_dir() {
            log::debug!(
                "{} is not a directory, nothing to walk",
                self.root.display()
            );
        }

        let entries = self.root.is_dir().then(|| {
            let gitignore = self.build_gitignore();
            WalkDir::new(&self.root)
                .follow_links(self.config.follow_symlinks)
                .min_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(move |entry| !self.is_excluded(entry, gitignore.as_ref()))
        });

        entries
            .into_iter()
            .flatten()
            .take_while(move |_| {
                let stop = self.is_shutdown_requested();
                if stop {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                }
                !stop
            })
            .filter_map(move |entry| match entry {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    if file_type.is_file() {
                        Some(Ok(entry.into_path()))
                    } else {
                        if file_type.is_symlink() {
                            log::trace!("Skipping symlink: {}", entry.path().display());
                        }
                        None
                    }
                }
                Err(e) => Some(Err(self.handle_walk_error(e))),
            })
    }

    /// Convert a walkdir error into a [`ScanError`].
    fn handle_walk_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        if let Some(ancestor) = error.loop_ancestor() {
            let ancestor = ancestor.to_path_buf();
            log::warn!("Symbolic link loop at {}", path.display());
            return ScanError::SymlinkLoop { path, ancestor };
        }

        match error.into_io_error() {
            Some(io) => self.handle_io_error(path, io),
            None => ScanError::Io {
                path,
                source: std::io::Error::other("directory walk failed"),
            },
        }
    }

    fn handle_io_error(&self, path: PathBuf, error: std::io::Error) -> ScanError {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path)
            }
            ErrorKind::NotFound => {
                log::debug!("Path not found (may have been deleted): {}", path.display());
                ScanError::NotFound(path)
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
                ScanError::Io {
                    path,
                    source: error,
                }
            }
        }
    }
}
