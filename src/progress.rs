//! Progress reporting for the duplicate scan.
//!
//! The finder reports through the [`ProgressCallback`] observer trait and
//! never depends on how (or whether) progress is rendered. [`Progress`] is
//! the console implementation: one overwriting status line drawn with
//! indicatif on stderr.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress observer for the duplicate detection pipeline.
///
/// Implementations must not influence the scan; callbacks may arrive from
/// several worker threads at once.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase ("walking", "hashing")
    /// * `total` - Total number of items to process (0 if unknown)
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called after each file has been read and digested.
    ///
    /// Workers report concurrently, so a lower count may arrive after a
    /// higher one.
    ///
    /// # Arguments
    ///
    /// * `files` - Cumulative number of files checked
    /// * `bytes` - Cumulative number of bytes read
    fn on_file_processed(&self, files: usize, bytes: u64);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Format a byte count as megabytes truncated to two decimals.
///
/// # Example
///
/// ```
/// use dupfind::progress::format_megabytes;
///
/// assert_eq!(format_megabytes(0), "0.00");
/// assert_eq!(format_megabytes(1_572_864), "1.50");
/// ```
#[must_use]
pub fn format_megabytes(bytes: u64) -> String {
    let hundredths = u128::from(bytes) * 100 / (1024 * 1024);
    format!("{}.{:02}", hundredths / 100, hundredths % 100)
}

/// Status line text for the given cumulative counters.
#[must_use]
pub fn status_line(files: usize, bytes: u64) -> String {
    format!("Checked {} files of {} Mb", files, format_megabytes(bytes))
}

/// Console progress reporter using indicatif.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    /// Highest `(files, bytes)` shown in the current phase.
    latest: Mutex<(usize, u64)>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupfind::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            latest: Mutex::new((0, 0)),
            quiet,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(ref pb) = *guard {
                f(pb);
            }
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, _total: usize) {
        if self.quiet {
            return;
        }

        if phase == "hashing" {
            if let Ok(mut latest) = self.latest.lock() {
                *latest = (0, 0);
            }
        }

        let Ok(mut guard) = self.bar.lock() else {
            return;
        };
        let pb = guard.get_or_insert_with(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });

        match phase {
            "walking" => pb.set_message("Walking directory"),
            "hashing" => pb.set_message(status_line(0, 0)),
            other => pb.set_message(other.to_string()),
        }
    }

    fn on_file_processed(&self, files: usize, bytes: u64) {
        if self.quiet {
            return;
        }

        let Ok(mut latest) = self.latest.lock() else {
            return;
        };
        if files <= latest.0 {
            return;
        }
        *latest = (files, bytes);
        self.with_bar(|pb| pb.set_message(status_line(files, bytes)));
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        if phase == "hashing" {
            if let Ok(mut guard) = self.bar.lock() {
                if let Some(pb) = guard.take() {
                    // Leave the final counters on screen.
                    pb.println(pb.message());
                    pb.finish_and_clear();
                }
            }
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.with_bar(|pb| pb.set_message(message.to_string()));
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}
