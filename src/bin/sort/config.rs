//! Configuration for the sort binary.
//!
//! Settings are read from the `[sort]` section of the user config file
//! (`~/.config/media-sort.toml`) and merged with CLI arguments.
//! CLI arguments take priority.
//!
//! # Example config file section
//!
//! ```toml
//! [sort]
//! copy = false
//! dryrun = false
//! ignore_cache = false
//! verbose = false
//! qualities = ["720p", "1080p"]
//! min_size_mb = 100
//! cache_path = "/home/user/.local/share/media-sort/processed.txt"
//! lock_path = "/home/user/.local/share/media-sort/lock"
//! notify_command = "notify-send"
//! ```

use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::Result;
use itertools::Itertools;
use serde::Deserialize;

use media_sort::print_error;

use crate::Args;
use crate::types::TransferMode;

const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");

/// Path to the user config file: `$HOME/.config/media-sort.toml`
///
/// `None` if the home directory cannot be determined.
static CONFIG_PATH: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    let home_dir = dirs::home_dir()?;
    Some(home_dir.join(".config").join(format!("{PROJECT_NAME}.toml")))
});

/// Default accepted resolution labels.
const DEFAULT_QUALITIES: [&str; 2] = ["720p", "1080p"];

/// Default minimum aggregate size for relocating a directory, in megabytes.
/// Guards against relocating incomplete or placeholder directories.
const DEFAULT_MIN_SIZE_MB: u64 = 100;

/// Final config combined from CLI arguments and user config file.
#[derive(Debug)]
pub struct Config {
    pub cache_path: PathBuf,
    pub debug: bool,
    pub ignore_cache: bool,
    pub lock_path: PathBuf,
    pub min_size_mb: u64,
    pub mode: TransferMode,
    pub notify_command: Option<String>,
    pub qualities: Vec<String>,
    pub verbose: bool,
}

/// Config from the `[sort]` section of the user config file.
#[derive(Debug, Default, Deserialize)]
struct SortConfig {
    #[serde(default)]
    cache_path: Option<PathBuf>,
    #[serde(default)]
    copy: bool,
    #[serde(default)]
    debug: bool,
    #[serde(default)]
    dryrun: bool,
    #[serde(default)]
    ignore_cache: bool,
    #[serde(default)]
    lock_path: Option<PathBuf>,
    #[serde(default)]
    min_size_mb: Option<u64>,
    #[serde(default)]
    notify_command: Option<String>,
    #[serde(default)]
    qualities: Vec<String>,
    #[serde(default)]
    verbose: bool,
}

/// Wrapper needed for parsing the user config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    sort: SortConfig,
}

impl SortConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    fn get_user_config() -> Self {
        CONFIG_PATH
            .as_deref()
            .and_then(|path| {
                fs::read_to_string(path)
                    .map_err(|e| {
                        print_error!("Error reading config file {}: {e}", path.display());
                    })
                    .ok()
            })
            .and_then(|config_string| Self::from_toml_str(&config_string).ok())
            .unwrap_or_default()
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.sort)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {e}"))
    }
}

impl Config {
    /// Create config from given command line args and user config file.
    pub fn from_args(args: &Args) -> Self {
        let user_config = SortConfig::get_user_config();

        let mode = if args.dry_run || user_config.dryrun {
            TransferMode::DryRun
        } else if args.copy || user_config.copy {
            TransferMode::Copy
        } else {
            TransferMode::Move
        };

        let qualities: Vec<String> = if user_config.qualities.is_empty() {
            DEFAULT_QUALITIES.iter().map(ToString::to_string).collect()
        } else {
            user_config
                .qualities
                .into_iter()
                .map(|quality| quality.to_lowercase())
                .unique()
                .collect()
        };

        Self {
            cache_path: user_config.cache_path.unwrap_or_else(default_cache_path),
            debug: args.debug || user_config.debug,
            ignore_cache: args.ignore_cache || user_config.ignore_cache,
            lock_path: user_config.lock_path.unwrap_or_else(default_lock_path),
            min_size_mb: user_config.min_size_mb.unwrap_or(DEFAULT_MIN_SIZE_MB),
            mode,
            notify_command: user_config.notify_command,
            qualities,
            verbose: args.verbose || user_config.verbose,
        }
    }
}

/// Default cache file path under the platform data directory.
fn default_cache_path() -> PathBuf {
    data_dir().join("processed.txt")
}

/// Default lock file path under the platform data directory.
fn default_lock_path() -> PathBuf {
    data_dir().join("lock")
}

/// Platform-specific data directory:
/// - Windows: `%LOCALAPPDATA%\media-sort`
/// - macOS: `~/Library/Application Support/media-sort`
/// - Linux: `~/.local/share/media-sort`
fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(PROJECT_NAME)
}
