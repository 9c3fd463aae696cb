//! Output formatters for duplicate scan results.
//!
//! This module provides different output formats for scan results:
//! - Text with tree connectors for the terminal
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use dupfind::duplicates::DuplicateFinder;
//! use dupfind::output::TextOutput;
//! use std::path::Path;
//!
//! let root = Path::new(".");
//! let (groups, _summary) = DuplicateFinder::with_defaults().find_duplicates(root).unwrap();
//!
//! print!("{}", TextOutput::new(root, &groups).render());
//! ```

pub mod json;
pub mod text;

// Re-export main types
pub use json::{JsonOutput, JsonOutputError};
pub use text::TextOutput;
