//! Console report for duplicate scan results.
//!
//! # Format
//!
//! ```text
//! Found 2 duplicated files:
//! ╔ 2 duplicates of /data/a.txt:
//! ╠══ /data/b/a-copy.txt
//! ╚══ /data/c.txt
//! ╔ 1 duplicate of /data/img.png:
//! ╚══ /data/img (1).png
//! ```
//!
//! When nothing was found a single `No duplicates found in <dir>` line is
//! printed instead.

use std::io::{self, Write};
use std::path::Path;

use yansi::Paint;

use crate::duplicates::DuplicateGroup;

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Tree-style text report.
#[derive(Debug)]
pub struct TextOutput<'a> {
    root: &'a Path,
    groups: &'a [DuplicateGroup],
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a report for `groups` found under `root`.
    #[must_use]
    pub fn new(root: &'a Path, groups: &'a [DuplicateGroup]) -> Self {
        Self {
            root,
            groups,
            color: false,
        }
    }

    /// Enable or disable terminal colors.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn header(&self) -> String {
        if self.groups.is_empty() {
            return format!("No duplicates found in {}", self.root.display());
        }

        let count = self.groups.len();
        let text = format!("Found {} duplicated file{}:", count, plural(count));
        if self.color {
            text.bold().to_string()
        } else {
            text
        }
    }

    fn group_lines(&self, group: &DuplicateGroup) -> Vec<String> {
        let dupes = group.duplicates();
        let mut lines = Vec::with_capacity(dupes.len() + 1);

        let rep = group.representative().display().to_string();
        let rep = if self.color {
            rep.green().to_string()
        } else {
            rep
        };
        lines.push(format!(
            "╔ {} duplicate{} of {}:",
            dupes.len(),
            plural(dupes.len()),
            rep
        ));

        for (i, path) in dupes.iter().enumerate() {
            let connector = if i + 1 == dupes.len() { "╚" } else { "╠" };
            let path = path.display().to_string();
            let path = if self.color {
                path.yellow().to_string()
            } else {
                path
            };
            lines.push(format!("{connector}══ {path}"));
        }
        lines
    }

    /// Render the whole report as a string (one trailing newline per line).
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = self.header();
        out.push('\n');
        for group in self.groups {
            for line in self.group_lines(group) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }

    /// Write the report to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.render().as_bytes())?;
        writer.flush()
    }
}
