//! Layered application configuration.
//!
//! Settings are merged from (lowest to highest priority):
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file: the `--config` path if given, else `config.toml` in the
//!    platform configuration directory
//! 3. `DUPFIND_*` environment variables (e.g. `DUPFIND_IO_THREADS=8`)
//! 4. Command-line flags ([`Config::apply_args`])
//!
//! ```toml
//! io_threads = 2
//! skip_hidden = true
//! ignore_patterns = ["*.tmp", "node_modules/"]
//! collision_policy = "discard"
//! ```

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::duplicates::{CollisionPolicy, FinderConfig};
use crate::scanner::WalkerConfig;

/// Prefix of the environment variables read by [`Config::load`].
pub const ENV_PREFIX: &str = "DUPFIND_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of threads used to read and digest files.
    pub io_threads: usize,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Follow symbolic links.
    pub follow_symlinks: bool,
    /// Gitignore-style patterns to exclude.
    pub ignore_patterns: Vec<String>,
    /// Record unreadable files instead of aborting.
    pub skip_unreadable: bool,
    /// Handling of digest collisions.
    pub collision_policy: CollisionPolicy,
    /// Show the progress status line.
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            io_threads: 4,
            skip_hidden: false,
            follow_symlinks: false,
            ignore_patterns: Vec::new(),
            skip_unreadable: false,
            collision_policy: CollisionPolicy::default(),
            progress: true,
        }
    }
}

/// Errors that can occur while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// A provider produced a value of the wrong shape.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Invalid(Box::new(err))
    }
}

impl Config {
    /// Default configuration file location (`<config dir>/dupfind/config.toml`).
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupfind").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Build the layered provider chain without extracting it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `explicit` names a missing file.
    pub fn figment(explicit: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(path) = Self::default_path() {
                    log::trace!("Looking for configuration in {}", path.display());
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Load configuration from defaults, file and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit file is missing or any layer
    /// holds an invalid value.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment(explicit)?)
    }

    /// Extract a configuration from an already assembled provider chain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] on malformed values.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Overlay command-line flags. Switches only ever turn options on.
    pub fn apply_args(&mut self, cli: &Cli) {
        if let Some(threads) = cli.io_threads {
            self.io_threads = threads;
        }
        self.skip_hidden |= cli.skip_hidden;
        self.follow_symlinks |= cli.follow_symlinks;
        self.skip_unreadable |= cli.skip_unreadable;
        self.ignore_patterns
            .extend(cli.ignore_patterns.iter().cloned());
        if let Some(policy) = cli.collision_policy {
            self.collision_policy = policy.into();
        }
        if cli.no_progress || cli.quiet {
            self.progress = false;
        }
    }

    /// Finder settings described by this configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_io_threads(self.io_threads)
            .with_walker_config(WalkerConfig::new(
                self.follow_symlinks,
                self.skip_hidden,
                self.ignore_patterns.clone(),
            ))
            .with_collision_policy(self.collision_policy)
            .with_skip_unreadable(self.skip_unreadable)
    }
}
