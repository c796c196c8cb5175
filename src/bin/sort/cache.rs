//! Flat-file record of item names that have already been handled.
//!
//! One name per line, append-only, no ordering. The whole file is scanned
//! on every lookup and there is no locking, so concurrent runs sharing the
//! same cache file can duplicate work or lose updates. Concurrent runs are
//! expected to be prevented by the startup lock check instead.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Append-only name list backing the already-handled check.
#[derive(Debug)]
pub struct Cache {
    path: PathBuf,
}

impl Cache {
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Check if the given name has been recorded.
    ///
    /// A missing cache file means nothing has been recorded yet, not an error.
    pub fn seen(&self, name: &str) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read cache file: {}", self.path.display()))?;
        Ok(contents.lines().any(|line| line == name))
    }

    /// Record the given name, creating the cache file if needed.
    ///
    /// Recording the same name twice keeps a single entry.
    pub fn record(&self, name: &str) -> Result<()> {
        if self.seen(name)? {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache directory: {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open cache file: {}", self.path.display()))?;
        writeln!(file, "{name}").with_context(|| format!("Failed to append to cache file: {}", self.path.display()))
    }
}
