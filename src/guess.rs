//! Media filename classification.
//!
//! Infers the media kind (movie or episode), a canonical title, and a
//! resolution label from release-style names such as
//! `Show.Name.S01E02.1080p.WEB.mkv`, without touching the filesystem.
//! Directory names work the same way: a name with no markers at all keeps
//! its full text as the title, which is what lets a plain `Show Name`
//! directory match the episodes inside it.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use titlecase::titlecase;
use unicode_normalization::UnicodeNormalization;

/// Matches `S01E02` style episode markers, with optional separator.
static RE_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bS(\d{1,2})[ ._]?E(\d{1,4})\b").expect("Failed to compile episode regex"));

/// Matches `2x05` style episode markers.
static RE_EPISODE_X: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})x(\d{2,3})\b").expect("Failed to compile NxMM episode regex"));

/// Matches season-only markers like `S01` or `Season 1`.
static RE_SEASON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:S\d{1,2}|Season[ ._-]?\d{1,2})\b").expect("Failed to compile season regex")
});

/// Matches a plausible release year.
static RE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("Failed to compile year regex"));

/// Matches resolution labels like `720p`.
static RE_RESOLUTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:480|540|544|576|600|720|1080|1440|2160)p\b").expect("Failed to compile resolution regex")
});

/// Matches full resolution patterns like `1920x1080`.
static RE_FULL_RESOLUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{3,4})x(\d{3,4})\b").expect("Failed to compile full resolution regex"));

/// Matches bracket characters left behind after a marker is cut off.
static RE_BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\[({\]})]+").expect("Failed to compile brackets regex"));

/// File extensions recognized as media files.
const MEDIA_EXTENSIONS: [&str; 12] = [
    "avi", "flv", "m4v", "mkv", "mov", "mp4", "mpg", "srt", "ts", "webm", "wmv", "webp",
];

/// Heights that map to a `<height>p` resolution label.
const LABEL_HEIGHTS: [u32; 9] = [480, 540, 544, 576, 600, 720, 1080, 1440, 2160];

/// Classification of a media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    Episode,
    Unknown,
}

impl MediaKind {
    /// Destination subdirectory name for this kind, `None` for unclassified items.
    #[must_use]
    pub const fn dir_name(self) -> Option<&'static str> {
        match self {
            Self::Movie => Some("movies"),
            Self::Episode => Some("episodes"),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Episode => write!(f, "episode"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Metadata inferred from a single file or directory name.
///
/// Missing title or resolution means the name did not carry enough
/// information, which is an expected outcome rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guess {
    pub kind: MediaKind,
    pub title: Option<String>,
    pub resolution: Option<String>,
}

/// Filename-based classifier producing a [`Guess`] per name.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilenameGuesser;

impl FilenameGuesser {
    /// Classify a file or directory name.
    #[must_use]
    pub fn classify(&self, name: &str) -> Guess {
        let stem = strip_media_extension(name);

        let episode = RE_EPISODE.find(stem).or_else(|| RE_EPISODE_X.find(stem));
        let season = RE_SEASON.find(stem);
        let year = RE_YEAR.find(stem);
        let resolution_label = RE_RESOLUTION.find(stem);
        let full_resolution = RE_FULL_RESOLUTION.find(stem);

        let kind = if episode.is_some() || season.is_some() {
            MediaKind::Episode
        } else if year.is_some() {
            MediaKind::Movie
        } else {
            MediaKind::Unknown
        };

        let resolution = resolution_label
            .map(|m| m.as_str().to_lowercase())
            .or_else(|| full_resolution.and_then(|m| resolution_from_dimensions(m.as_str())));

        // The title is whatever comes before the earliest marker.
        let boundary = [episode, season, year, resolution_label, full_resolution]
            .into_iter()
            .flatten()
            .map(|m| m.start())
            .min();

        let title = match boundary {
            Some(0) => None,
            Some(end) => clean_title(&stem[..end]),
            None => clean_title(stem),
        };

        Guess { kind, title, resolution }
    }
}

/// Canonical title form: lowercased first so that differently-cased
/// variants of the same title collapse to one spelling, then title-cased.
/// Idempotent.
#[must_use]
pub fn title_case(text: &str) -> String {
    let lowered = text.to_lowercase();
    titlecase(&lowered).nfc().collect()
}

/// Collapse name separators to single spaces and title-case the result.
/// Returns `None` when nothing usable remains.
fn clean_title(text: &str) -> Option<String> {
    let without_brackets = RE_BRACKETS.replace_all(text, " ");
    let cleaned = without_brackets
        .replace(['.', '_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if cleaned.is_empty() { None } else { Some(title_case(&cleaned)) }
}

/// Strip a trailing media file extension, if present.
/// Directory names pass through unchanged.
fn strip_media_extension(name: &str) -> &str {
    if let Some((stem, extension)) = name.rsplit_once('.') {
        let extension = extension.to_ascii_lowercase();
        if MEDIA_EXTENSIONS.contains(&extension.as_str()) {
            return stem;
        }
    }
    name
}

/// Map a full `WxH` pattern to the label of its height, e.g. `1920x1080` -> `1080p`.
fn resolution_from_dimensions(dimensions: &str) -> Option<String> {
    let (_, height) = dimensions.split_once('x')?;
    let height: u32 = height.parse().ok()?;
    LABEL_HEIGHTS.contains(&height).then(|| format!("{height}p"))
}
