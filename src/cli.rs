//! Command-line interface definitions for dupfind.
//!
//! # Example
//!
//! ```bash
//! # Scan the current directory
//! dupfind .
//!
//! # JSON report for scripting
//! dupfind ~/Downloads --output json
//!
//! # Keep going past unreadable files, with debug logging
//! dupfind -v ~/Downloads --skip-unreadable
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::duplicates::CollisionPolicy;

/// Find files with identical content.
///
/// Every regular file under PATH is read and digested; files with equal
/// digests are then compared byte for byte before being reported.
#[derive(Debug, Parser)]
#[command(name = "dupfind")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan (default: the directory containing the executable)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and the report
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of threads used to read and digest files
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Follow symbolic links during scan
    ///
    /// A link cycle aborts the scan.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Gitignore-style patterns to exclude (can be specified multiple times)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Record unreadable files and directories instead of aborting
    #[arg(long)]
    pub skip_unreadable: bool,

    /// What to do with files whose digest matches but whose bytes differ
    #[arg(long, value_enum, value_name = "POLICY")]
    pub collision_policy: Option<CollisionPolicyArg>,

    /// Disable the progress status line
    #[arg(long)]
    pub no_progress: bool,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tree-style report for the terminal
    Text,
    /// JSON output for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Collision policy as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CollisionPolicyArg {
    /// Start a new group for the colliding file
    Split,
    /// Drop the colliding file from duplicate consideration
    Discard,
}

impl From<CollisionPolicyArg> for CollisionPolicy {
    fn from(arg: CollisionPolicyArg) -> Self {
        match arg {
            CollisionPolicyArg::Split => CollisionPolicy::Split,
            CollisionPolicyArg::Discard => CollisionPolicy::Discard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parse_help() {
        // --help causes an early exit, which is an error in try_parse_from
        assert!(Cli::try_parse_from(["dupfind", "--help"]).is_err());
    }

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::try_parse_from(["dupfind"]).unwrap();
        assert_eq!(cli.path, None);
        assert_eq!(cli.output, OutputFormat::Text);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert!(!cli.json_errors);
        assert!(cli.io_threads.is_none());
        assert!(cli.ignore_patterns.is_empty());
        assert!(cli.collision_policy.is_none());
        assert!(!cli.no_progress);
    }

    #[test]
    fn test_cli_parse_with_options() {
        let cli = Cli::try_parse_from([
            "dupfind",
            "-vv",
            "/some/path",
            "--output",
            "json",
            "--io-threads",
            "2",
            "--skip-hidden",
            "--follow-symlinks",
            "-i",
            "*.tmp",
            "--ignore",
            "target/",
            "--skip-unreadable",
            "--collision-policy",
            "discard",
            "--no-progress",
            "--config",
            "/etc/dupfind.toml",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.path, Some(PathBuf::from("/some/path")));
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.io_threads, Some(2));
        assert!(cli.skip_hidden);
        assert!(cli.follow_symlinks);
        assert_eq!(cli.ignore_patterns, vec!["*.tmp", "target/"]);
        assert!(cli.skip_unreadable);
        assert_eq!(cli.collision_policy, Some(CollisionPolicyArg::Discard));
        assert!(cli.no_progress);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/dupfind.toml")));
    }

    #[test]
    fn test_cli_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["dupfind", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_output() {
        assert!(Cli::try_parse_from(["dupfind", "--output", "csv"]).is_err());
    }

    #[test]
    fn test_collision_policy_conversion() {
        assert_eq!(
            CollisionPolicy::from(CollisionPolicyArg::Split),
            CollisionPolicy::Split
        );
        assert_eq!(
            CollisionPolicy::from(CollisionPolicyArg::Discard),
            CollisionPolicy::Discard
        );
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Text.to_string(), "text");
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }
}
