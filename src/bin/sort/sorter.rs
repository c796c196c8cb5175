//! Source tree traversal and per-item relocation decisions.

use std::path::{Path, PathBuf};

use anyhow::Context;
use walkdir::WalkDir;

use media_sort::guess::{FilenameGuesser, Guess, MediaKind};
use media_sort::{is_hidden, path_to_filename_string, print_bold, print_error, print_warning};

use crate::Args;
use crate::cache::Cache;
use crate::config::Config;
use crate::notify::Notifier;
use crate::place::Placer;
use crate::types::{Outcome, RelocateChoice, SortStats, TransferMode};

/// Walks the source tree and relocates classified media items.
#[derive(Debug)]
pub struct Sorter {
    cache: Cache,
    config: Config,
    destination: PathBuf,
    guesser: FilenameGuesser,
    notifier: Option<Notifier>,
    source: PathBuf,
}

impl Sorter {
    pub fn new(args: Args) -> anyhow::Result<Self> {
        let source = media_sort::resolve_input_path(args.source.as_deref())?;
        let destination = args
            .destination
            .clone()
            .context("Destination directory is required")?;
        let config = Config::from_args(&args);
        if config.debug {
            eprintln!("Config: {config:#?}");
            eprintln!("Source: {}", source.display());
            eprintln!("Destination: {}", destination.display());
        }
        let cache = Cache::new(config.cache_path.clone());
        let notifier = config.notify_command.clone().map(Notifier::new);
        Ok(Self {
            cache,
            config,
            destination,
            guesser: FilenameGuesser,
            notifier,
            source,
        })
    }

    /// Path of the configured lock file if one currently exists.
    ///
    /// The lock is an external convention, for example a download client
    /// that is still writing. It is never created or removed here.
    pub fn lock_file(&self) -> Option<&Path> {
        self.config.lock_path.exists().then(|| self.config.lock_path.as_path())
    }

    pub fn run(&self) -> anyhow::Result<()> {
        let placer = Placer::new(
            &self.destination,
            &self.cache,
            self.config.mode,
            self.config.min_size_mb * 1024 * 1024,
            self.config.ignore_cache,
        );

        // Collect first so relocations cannot disturb the traversal.
        let files: Vec<PathBuf> = WalkDir::new(&self.source)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file() && !is_hidden(entry))
            .map(walkdir::DirEntry::into_path)
            .collect();

        let mut stats = SortStats::default();
        let mut claimed: Vec<PathBuf> = Vec::new();

        for path in &files {
            // Skip files inside directories already relocated as bundles.
            if claimed.iter().any(|dir| path.starts_with(dir)) {
                continue;
            }

            let file_name = path_to_filename_string(path);
            let guess = self.guesser.classify(&file_name);
            let Some(title) = self.accepted_title(&guess) else {
                if self.config.verbose {
                    println!("Ignoring: {file_name}");
                }
                stats.ignored.insert(file_name);
                continue;
            };
            stats.add_title(guess.kind, &title);

            let choice = self.relocation_unit(path, &title);
            let (unit, display_name) = match &choice {
                RelocateChoice::Directory(dir) => (dir.as_path(), path_to_filename_string(dir)),
                RelocateChoice::File(file) => (file.as_path(), file_name),
            };

            let result = placer.place(unit, guess.kind, &title);
            if let RelocateChoice::Directory(dir) = choice {
                // Claimed either way so a failing bundle is not retried
                // once per contained file.
                claimed.push(dir);
            }
            match result {
                Ok(outcome) => self.report(outcome, &display_name),
                Err(error) => print_error!("Failed to place {display_name}: {error}"),
            }
        }

        self.print_summary(&stats);
        Ok(())
    }

    /// Title for an item that classified as a movie or episode with an
    /// accepted resolution, or `None` when the item should be ignored.
    fn accepted_title(&self, guess: &Guess) -> Option<String> {
        if !matches!(guess.kind, MediaKind::Movie | MediaKind::Episode) {
            return None;
        }
        let resolution = guess.resolution.as_deref()?;
        if !self.config.qualities.iter().any(|quality| quality == resolution) {
            return None;
        }
        guess.title.clone()
    }

    /// Decide whether to relocate the whole parent directory or just the file.
    ///
    /// A parent directory whose own name guesses to the same title is a
    /// season or collection bundle: the file name usually carries more
    /// detail, but the directory is the unit that should be relocated.
    /// Files directly under the source root are always relocated alone.
    fn relocation_unit(&self, file: &Path, title: &str) -> RelocateChoice {
        if let Some(parent) = file.parent() {
            if parent != self.source {
                let parent_name = path_to_filename_string(parent);
                let parent_guess = self.guesser.classify(&parent_name);
                if parent_guess.title.as_deref() == Some(title) {
                    return RelocateChoice::Directory(parent.to_path_buf());
                }
            }
        }
        RelocateChoice::File(file.to_path_buf())
    }

    /// Print one status line and forward it to the notifier.
    ///
    /// Skip outcomes are only shown in verbose mode, except a move that
    /// found its destination occupied, which always warns.
    fn report(&self, outcome: Outcome, name: &str) {
        let move_collision = outcome == Outcome::SkippedExists && self.config.mode == TransferMode::Move;
        if !self.config.verbose && outcome.is_skip() && !move_collision {
            return;
        }
        if move_collision {
            print_warning!("{}: {name}", outcome.label());
        } else {
            println!("{}: {name}", outcome.colored());
        }
        if let Some(ref notifier) = self.notifier {
            notifier.notify(&format!("{}: {name}", outcome.label()));
        }
    }

    fn print_summary(&self, stats: &SortStats) {
        if self.config.verbose && !stats.ignored.is_empty() {
            println!("Ignored files:");
            for name in &stats.ignored {
                println!("  {name}");
            }
        }
        print_bold!(
            "Found {} movie title(s) and {} show(s)",
            stats.movie_titles.len(),
            stats.episode_titles.len()
        );
    }
}
