use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use colored::{ColoredString, Colorize};

use media_sort::guess::MediaKind;

/// How items are transferred to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Duplicate items, leaving the source in place.
    Copy,
    /// Create empty placeholders at the destination without touching the source.
    DryRun,
    /// Relocate items, removing them from the source.
    Move,
}

/// Result of attempting to relocate a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Copied,
    Moved,
    Simulated,
    SkippedCache,
    SkippedExists,
    SkippedTooSmall,
}

impl Outcome {
    /// Plain text label without any terminal styling.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Copied => "copied",
            Self::Moved => "moved",
            Self::Simulated => "dry run",
            Self::SkippedCache => "skipped (cache)",
            Self::SkippedExists => "skipped (exists)",
            Self::SkippedTooSmall => "skipped (too small)",
        }
    }

    /// True for outcomes that left the item where it was.
    #[must_use]
    pub const fn is_skip(self) -> bool {
        matches!(self, Self::SkippedCache | Self::SkippedExists | Self::SkippedTooSmall)
    }

    /// Colored label for terminal output.
    #[must_use]
    pub fn colored(self) -> ColoredString {
        match self {
            Self::Copied | Self::Moved => self.label().green(),
            Self::Simulated => self.label().cyan(),
            Self::SkippedCache | Self::SkippedExists | Self::SkippedTooSmall => self.label().yellow(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The unit of relocation chosen for a classified file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocateChoice {
    /// The whole parent directory is relocated as one bundle.
    Directory(PathBuf),
    /// The file is relocated on its own.
    File(PathBuf),
}

/// Transient per-run counters, purely observational.
#[derive(Debug, Default)]
pub struct SortStats {
    pub movie_titles: BTreeSet<String>,
    pub episode_titles: BTreeSet<String>,
    pub ignored: BTreeSet<String>,
}

impl SortStats {
    /// Record a title under its kind. Unknown kinds are never recorded.
    pub fn add_title(&mut self, kind: MediaKind, title: &str) {
        match kind {
            MediaKind::Movie => {
                self.movie_titles.insert(title.to_string());
            }
            MediaKind::Episode => {
                self.episode_titles.insert(title.to_string());
            }
            MediaKind::Unknown => {}
        }
    }
}
