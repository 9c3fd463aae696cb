//! Duplicate finder implementation.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk** - Enumerate regular files depth-first (see [`crate::scanner::walker`])
//! 2. **Digest** - Read each file whole, once, and compute its [`ContentDigest`]
//! 3. **Verify** - Bucket files by digest, confirming every member byte for
//!    byte against the bucket's representative (see [`BucketMap`])
//!
//! Files are read and digested in parallel batches of `io_threads * 4`.
//! Each batch is bucketed on the calling thread, in walk order, before the
//! next one is read, so groups come out in the same order as a
//! single-threaded run and at most one batch of contents is in memory.
//!
//! Verification compares the candidate's buffered contents with a fresh read
//! of the representative (through the configured [`ContentComparator`]); the
//! candidate itself is never read twice.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(2));
//! let (groups, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! println!("{} groups, {} reclaimable", groups.len(), summary.reclaimable_display());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;
use serde::Serialize;

use super::groups::{BucketMap, CollisionPolicy, DuplicateGroup, Placement};
use crate::progress::ProgressCallback;
use crate::scanner::{
    ByteComparator, ContentComparator, ContentDigest, FileRecord, HashError, ScanError, Walker,
    WalkerConfig,
};

/// Files each worker reads per batch before the batch is bucketed.
const FILES_PER_WORKER: usize = 4;

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of threads used to read and digest files.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// What to do with digest collisions whose bytes differ.
    pub collision_policy: CollisionPolicy,
    /// Record unreadable files and unlistable directories instead of
    /// aborting the scan.
    pub skip_unreadable: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress observer.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
    /// Confirms digest matches. Defaults to [`ByteComparator`].
    pub comparator: Arc<dyn ContentComparator>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("walker_config", &self.walker_config)
            .field("collision_policy", &self.collision_policy)
            .field("skip_unreadable", &self.skip_unreadable)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .field("comparator", &"<comparator>")
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            walker_config: WalkerConfig::default(),
            collision_policy: CollisionPolicy::default(),
            skip_unreadable: false,
            shutdown_flag: None,
            progress_callback: None,
            comparator: Arc::new(ByteComparator),
        }
    }
}

impl FinderConfig {
    /// Set the digest thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the collision policy.
    #[must_use]
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// Keep scanning past unreadable files.
    #[must_use]
    pub fn with_skip_unreadable(mut self, skip: bool) -> Self {
        self.skip_unreadable = skip;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress observer.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Replace the byte-for-byte comparison used to confirm digest matches.
    #[must_use]
    pub fn with_comparator(mut self, comparator: Arc<dyn ContentComparator>) -> Self {
        self.comparator = comparator;
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// A file or directory left out of the scan because it could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    /// Path that could not be read
    pub path: PathBuf,
    /// Human-readable reason
    pub reason: String,
}

impl SkippedFile {
    fn from_scan(error: &ScanError) -> Self {
        Self {
            path: error.path().to_path_buf(),
            reason: error.to_string(),
        }
    }

    fn from_hash(error: &HashError) -> Self {
        Self {
            path: error.path().to_path_buf(),
            reason: error.to_string(),
        }
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Number of files read and digested
    pub total_files: usize,
    /// Total bytes read during the digest phase
    pub total_size: u64,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding representatives)
    pub duplicate_files: usize,
    /// Space that removing every duplicate would free
    pub reclaimable_space: u64,
    /// Files whose digest matched a bucket but whose bytes did not
    pub digest_collisions: usize,
    /// Colliding files dropped under [`CollisionPolicy::Discard`]
    pub discarded_files: usize,
    /// Files and directories skipped because they could not be read
    pub skipped_files: Vec<SkippedFile>,
    /// Duration of the entire scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Percentage of the scanned bytes taken by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Reclaimable space as a human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Total scanned size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }

    /// Whether anything was skipped.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.skipped_files.is_empty()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// A directory could not be listed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// A file could not be read.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// The digest worker pool could not be created.
    #[error("Failed to start digest workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A file after the digest phase, contents still buffered.
struct DigestedFile {
    record: FileRecord,
    digest: ContentDigest,
}

enum DigestOutcome {
    Done(DigestedFile),
    Failed(HashError),
    Cancelled,
}

/// Cumulative digest-phase counters shared by the workers.
#[derive(Default)]
struct DigestCounters {
    files: AtomicUsize,
    bytes: AtomicU64,
    failed: AtomicBool,
}

/// Duplicate finder that orchestrates the detection pipeline.
///
/// Every call to [`DuplicateFinder::find_duplicates`] starts from an empty
/// bucket map; a finder can be reused and shared between threads.
///
/// # Example
///
/// ```no_run
/// use dupfind::duplicates::DuplicateFinder;
/// use std::path::Path;
///
/// let finder = DuplicateFinder::with_defaults();
/// match finder.find_duplicates(Path::new(".")) {
///     Ok((groups, summary)) => {
///         println!("Found {} duplicate groups", groups.len());
///         println!("Can reclaim {} bytes", summary.reclaimable_space);
///     }
///     Err(e) => eprintln!("Scan failed: {}", e),
/// }
/// ```
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    fn notify(&self, f: impl FnOnce(&dyn ProgressCallback)) {
        if let Some(ref callback) = self.config.progress_callback {
            f(callback.as_ref());
        }
    }

    /// Find all duplicate files under `root`.
    ///
    /// A root that does not exist or is not a directory yields no groups
    /// and no error.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if a directory or file cannot be read (unless
    /// `skip_unreadable` is set), if the scan is interrupted, or if the
    /// worker pool cannot start.
    pub fn find_duplicates(
        &self,
        root: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        if !root.is_dir() {
            log::info!("{} is not a directory, nothing to scan", root.display());
            summary.scan_duration = start_time.elapsed();
            return Ok((Vec::new(), summary));
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        log::info!("Starting duplicate scan of {}", root.display());

        let files = self.collect_files(root, &mut summary)?;
        let groups = self.bucket_files(files, &mut summary)?;

        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} duplicate files, {} reclaimable",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        Ok((groups, summary))
    }

    /// Walk `root` and collect file paths in walk order.
    fn collect_files(
        &self,
        root: &Path,
        summary: &mut ScanSummary,
    ) -> Result<Vec<PathBuf>, FinderError> {
        self.notify(|cb| cb.on_phase_start("walking", 0));

        let mut walker = Walker::new(root, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }

        let mut files = Vec::new();
        for entry in walker.walk() {
            match entry {
                Ok(path) => files.push(path),
                Err(e) if self.config.skip_unreadable => {
                    log::warn!("Skipping: {}", e);
                    summary.skipped_files.push(SkippedFile::from_scan(&e));
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.notify(|cb| cb.on_phase_end("walking"));

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        log::info!("Found {} files", files.len());
        Ok(files)
    }

    /// Read, digest and bucket every file in walk order.
    fn bucket_files(
        &self,
        files: Vec<PathBuf>,
        summary: &mut ScanSummary,
    ) -> Result<Vec<DuplicateGroup>, FinderError> {
        let mut buckets = BucketMap::new(self.config.collision_policy);
        if files.is_empty() {
            return Ok(Vec::new());
        }

        self.notify(|cb| cb.on_phase_start("hashing", files.len()));
        log::debug!(
            "Digesting {} files on {} threads",
            files.len(),
            self.config.io_threads
        );

        let threads = self.config.io_threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?;
        let counters = DigestCounters::default();

        for batch in files.chunks(threads * FILES_PER_WORKER) {
            if self.config.is_shutdown_requested() {
                return Err(FinderError::Interrupted);
            }

            let outcomes: Vec<DigestOutcome> = pool.install(|| {
                batch
                    .par_iter()
                    .map(|path| self.read_and_digest(path, &counters))
                    .collect()
            });

            if self.config.is_shutdown_requested() {
                return Err(FinderError::Interrupted);
            }

            for outcome in outcomes {
                match outcome {
                    DigestOutcome::Done(file) => {
                        summary.total_files += 1;
                        summary.total_size += file.record.len();
                        self.place(&mut buckets, file, summary)?;
                    }
                    DigestOutcome::Failed(e) if self.config.skip_unreadable => {
                        log::warn!("Skipping unreadable file: {}", e);
                        summary.skipped_files.push(SkippedFile::from_hash(&e));
                    }
                    DigestOutcome::Failed(e) => return Err(e.into()),
                    // Only produced while a failure from this batch is pending.
                    DigestOutcome::Cancelled => {}
                }
            }
        }

        self.notify(|cb| cb.on_phase_end("hashing"));

        log::info!(
            "Digested {} files ({})",
            summary.total_files,
            summary.total_size_display()
        );
        Ok(buckets.into_groups())
    }

    /// Read one file whole and digest it. Runs on a worker thread.
    fn read_and_digest(&self, path: &Path, counters: &DigestCounters) -> DigestOutcome {
        if self.config.is_shutdown_requested() || counters.failed.load(Ordering::Relaxed) {
            return DigestOutcome::Cancelled;
        }

        match FileRecord::read(path) {
            Ok(record) => {
                let digest = record.digest();
                let size = record.len();
                log::trace!("Digested {} ({} bytes)", path.display(), size);

                let count = counters.files.fetch_add(1, Ordering::Relaxed) + 1;
                let bytes = counters.bytes.fetch_add(size, Ordering::Relaxed) + size;
                self.notify(|cb| cb.on_file_processed(count, bytes));
                DigestOutcome::Done(DigestedFile { record, digest })
            }
            Err(e) => {
                if !self.config.skip_unreadable {
                    counters.failed.store(true, Ordering::Relaxed);
                }
                DigestOutcome::Failed(e)
            }
        }
    }

    /// Bucket one digested file, confirming any digest match byte for byte.
    fn place(
        &self,
        buckets: &mut BucketMap,
        file: DigestedFile,
        summary: &mut ScanSummary,
    ) -> Result<(), FinderError> {
        let DigestedFile { record, digest } = file;
        let comparator = self.config.comparator.as_ref();

        let placed = buckets.insert(record.path.clone(), digest, record.len(), |rep, _| {
            comparator.matches(rep, &record)
        });

        match placed {
            Ok(Placement::Representative) => {}
            Ok(Placement::Duplicate) => {
                log::debug!("Duplicate confirmed: {}", record.path.display());
            }
            Ok(Placement::Collision) => {
                log::debug!("Digest collision: {}", record.path.display());
                summary.digest_collisions += 1;
            }
            Ok(Placement::Discarded) => {
                log::debug!("Digest collision discarded: {}", record.path.display());
                summary.digest_collisions += 1;
                summary.discarded_files += 1;
            }
            Err(e) if self.config.skip_unreadable => {
                log::warn!("Skipping {}: {}", record.path.display(), e);
                summary.skipped_files.push(SkippedFile::from_hash(&e));
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}
