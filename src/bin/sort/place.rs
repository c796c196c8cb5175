//! Destination computation and copy / move / dry-run execution.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use media_sort::guess::MediaKind;
use media_sort::path_to_filename_string;

use crate::cache::Cache;
use crate::types::{Outcome, TransferMode};

/// Executes relocations into the destination tree.
///
/// Destination layout is `<dest>/movies/<item>` for movies and
/// `<dest>/episodes/<Title>/<item>` for episodes, where an item is either
/// a single file or a whole bundle directory.
#[derive(Debug)]
pub struct Placer<'a> {
    cache: &'a Cache,
    dest_root: &'a Path,
    ignore_cache: bool,
    /// Minimum aggregate size in bytes for relocating a directory.
    min_dir_size: u64,
    mode: TransferMode,
}

impl<'a> Placer<'a> {
    pub const fn new(
        dest_root: &'a Path,
        cache: &'a Cache,
        mode: TransferMode,
        min_dir_size: u64,
        ignore_cache: bool,
    ) -> Self {
        Self {
            cache,
            dest_root,
            ignore_cache,
            min_dir_size,
            mode,
        }
    }

    /// Relocate a single item (file or whole directory) into the destination tree.
    ///
    /// Skip outcomes leave the source untouched. An existing destination
    /// entry is never overwritten, in move mode included.
    pub fn place(&self, source: &Path, kind: MediaKind, title: &str) -> Result<Outcome> {
        let name = path_to_filename_string(source);
        anyhow::ensure!(!name.is_empty(), "Cannot get item name for: {}", source.display());

        // Dry runs preview every candidate, so the cache is not consulted.
        let dry_run = self.mode == TransferMode::DryRun;
        if !dry_run && !self.ignore_cache && self.cache.seen(&name)? {
            return Ok(Outcome::SkippedCache);
        }

        // Incomplete or placeholder directories stay where they are.
        if source.is_dir() && directory_size(source)? < self.min_dir_size {
            return Ok(Outcome::SkippedTooSmall);
        }

        let dest_dir = self.destination_dir(kind, title)?;
        fs::create_dir_all(&dest_dir)
            .with_context(|| format!("Failed to create destination directory: {}", dest_dir.display()))?;
        let target = dest_dir.join(&name);

        if dry_run {
            fs::File::create(&target)
                .with_context(|| format!("Failed to create placeholder: {}", target.display()))?;
            return Ok(Outcome::Simulated);
        }

        if target.exists() {
            self.cache.record(&name)?;
            return Ok(Outcome::SkippedExists);
        }

        if self.mode == TransferMode::Copy {
            if source.is_dir() {
                copy_directory(source, &target)?;
            } else {
                copy_file(source, &target)?;
            }
            self.cache.record(&name)?;
            Ok(Outcome::Copied)
        } else {
            move_item(source, &target)?;
            self.cache.record(&name)?;
            Ok(Outcome::Moved)
        }
    }

    /// `<dest>/movies` or `<dest>/episodes/<Title>`.
    fn destination_dir(&self, kind: MediaKind, title: &str) -> Result<PathBuf> {
        let Some(kind_dir) = kind.dir_name() else {
            anyhow::bail!("Cannot place an unclassified item");
        };
        let mut dir = self.dest_root.join(kind_dir);
        if kind == MediaKind::Episode {
            dir.push(title);
        }
        Ok(dir)
    }
}

/// Total size of the directory's direct file children (non-recursive).
fn directory_size(dir: &Path) -> Result<u64> {
    let mut total = 0;
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}

/// Copy a single file, carrying the modification time over.
fn copy_file(source: &Path, target: &Path) -> Result<()> {
    fs::copy(source, target)
        .with_context(|| format!("Failed to copy {} to {}", source.display(), target.display()))?;
    copy_modified_time(source, target);
    Ok(())
}

/// Set the target modification time to match the source.
/// Timestamp errors are ignored since the copy itself already succeeded.
fn copy_modified_time(source: &Path, target: &Path) {
    if let Ok(modified) = fs::metadata(source).and_then(|metadata| metadata.modified()) {
        if let Ok(file) = fs::File::options().write(true).open(target) {
            let _ = file.set_modified(modified);
        }
    }
}

/// Recursively copy a directory tree, preserving modification times.
fn copy_directory(source: &Path, target: &Path) -> Result<()> {
    fs::create_dir_all(target).with_context(|| format!("Failed to create directory: {}", target.display()))?;
    for entry in fs::read_dir(source).with_context(|| format!("Failed to read directory: {}", source.display()))? {
        let entry = entry?;
        let entry_target = target.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_directory(&entry.path(), &entry_target)?;
        } else {
            copy_file(&entry.path(), &entry_target)?;
        }
    }
    Ok(())
}

/// Move an item into the destination, falling back to copy and remove
/// when the rename fails, for example across filesystem boundaries.
fn move_item(source: &Path, target: &Path) -> Result<()> {
    if fs::rename(source, target).is_ok() {
        return Ok(());
    }
    if source.is_dir() {
        copy_directory(source, target)?;
        fs::remove_dir_all(source)
    } else {
        copy_file(source, target)?;
        fs::remove_file(source)
    }
    .with_context(|| format!("Failed to remove source after copying: {}", source.display()))
}

#[cfg(test)]
mod place_tests {
    use super::*;

    use tempfile::tempdir;

    fn test_cache(dir: &Path) -> Cache {
        Cache::new(dir.join("processed.txt"))
    }

    #[test]
    fn copy_movie_file() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let cache = test_cache(dest.path());

        let file = source.path().join("Movie.Title.2020.1080p.mkv");
        fs::write(&file, "data").unwrap();

        let placer = Placer::new(dest.path(), &cache, TransferMode::Copy, 0, false);
        let outcome = placer.place(&file, MediaKind::Movie, "Movie Title").unwrap();

        assert_eq!(outcome, Outcome::Copied);
        let copied = dest.path().join("movies").join("Movie.Title.2020.1080p.mkv");
        assert!(copied.exists());
        assert_eq!(fs::read_to_string(copied).unwrap(), "data");
        // Copy leaves the source in place and records the name.
        assert!(file.exists());
        assert!(cache.seen("Movie.Title.2020.1080p.mkv").unwrap());
    }

    #[test]
    fn copy_episode_file_lands_under_title() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let cache = test_cache(dest.path());

        let file = source.path().join("Show.Name.S01E01.1080p.mkv");
        fs::write(&file, "data").unwrap();

        let placer = Placer::new(dest.path(), &cache, TransferMode::Copy, 0, false);
        let outcome = placer.place(&file, MediaKind::Episode, "Show Name").unwrap();

        assert_eq!(outcome, Outcome::Copied);
        assert!(
            dest.path()
                .join("episodes")
                .join("Show Name")
                .join("Show.Name.S01E01.1080p.mkv")
                .exists()
        );
    }

    #[test]
    fn move_removes_source() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let cache = test_cache(dest.path());

        let file = source.path().join("Movie.Title.2020.720p.mkv");
        fs::write(&file, "data").unwrap();

        let placer = Placer::new(dest.path(), &cache, TransferMode::Move, 0, false);
        let outcome = placer.place(&file, MediaKind::Movie, "Movie Title").unwrap();

        assert_eq!(outcome, Outcome::Moved);
        assert!(!file.exists());
        assert!(dest.path().join("movies").join("Movie.Title.2020.720p.mkv").exists());
        assert!(cache.seen("Movie.Title.2020.720p.mkv").unwrap());
    }

    #[test]
    fn second_placement_is_skipped_by_cache() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let cache = test_cache(dest.path());

        let file = source.path().join("Movie.Title.2020.1080p.mkv");
        fs::write(&file, "data").unwrap();

        let placer = Placer::new(dest.path(), &cache, TransferMode::Copy, 0, false);
        assert_eq!(
            placer.place(&file, MediaKind::Movie, "Movie Title").unwrap(),
            Outcome::Copied
        );
        assert_eq!(
            placer.place(&file, MediaKind::Movie, "Movie Title").unwrap(),
            Outcome::SkippedCache
        );
    }

    #[test]
    fn existing_target_is_skipped_and_recorded() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let cache = test_cache(dest.path());

        let file = source.path().join("Movie.Title.2020.1080p.mkv");
        fs::write(&file, "new data").unwrap();
        let movies = dest.path().join("movies");
        fs::create_dir_all(&movies).unwrap();
        fs::write(movies.join("Movie.Title.2020.1080p.mkv"), "old data").unwrap();

        let placer = Placer::new(dest.path(), &cache, TransferMode::Copy, 0, false);
        let outcome = placer.place(&file, MediaKind::Movie, "Movie Title").unwrap();

        assert_eq!(outcome, Outcome::SkippedExists);
        // The existing copy is never overwritten.
        assert_eq!(
            fs::read_to_string(movies.join("Movie.Title.2020.1080p.mkv")).unwrap(),
            "old data"
        );
        assert!(cache.seen("Movie.Title.2020.1080p.mkv").unwrap());
    }

    #[test]
    fn existing_target_is_not_overwritten_in_move_mode() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let cache = test_cache(dest.path());

        let file = source.path().join("Movie.Title.2020.1080p.mkv");
        fs::write(&file, "new data").unwrap();
        let movies = dest.path().join("movies");
        fs::create_dir_all(&movies).unwrap();
        fs::write(movies.join("Movie.Title.2020.1080p.mkv"), "old data").unwrap();

        let placer = Placer::new(dest.path(), &cache, TransferMode::Move, 0, false);
        let outcome = placer.place(&file, MediaKind::Movie, "Movie Title").unwrap();

        assert_eq!(outcome, Outcome::SkippedExists);
        assert!(file.exists());
        assert_eq!(
            fs::read_to_string(movies.join("Movie.Title.2020.1080p.mkv")).unwrap(),
            "old data"
        );
    }

    #[test]
    fn ignore_cache_bypasses_the_seen_check() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let cache = test_cache(dest.path());
        cache.record("Movie.Title.2020.1080p.mkv").unwrap();

        let file = source.path().join("Movie.Title.2020.1080p.mkv");
        fs::write(&file, "data").unwrap();

        let placer = Placer::new(dest.path(), &cache, TransferMode::Copy, 0, true);
        let outcome = placer.place(&file, MediaKind::Movie, "Movie Title").unwrap();

        assert_eq!(outcome, Outcome::Copied);
    }

    #[test]
    fn small_directory_is_skipped() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let cache = test_cache(dest.path());

        let bundle = source.path().join("Show.Name.S01.1080p");
        fs::create_dir(&bundle).unwrap();
        fs::write(bundle.join("Show.Name.S01E01.1080p.mkv"), "tiny").unwrap();

        let placer = Placer::new(dest.path(), &cache, TransferMode::Copy, 1024 * 1024, false);
        let outcome = placer.place(&bundle, MediaKind::Episode, "Show Name").unwrap();

        assert_eq!(outcome, Outcome::SkippedTooSmall);
        assert!(!dest.path().join("episodes").exists());
        assert!(!cache.seen("Show.Name.S01.1080p").unwrap());
    }

    #[test]
    fn directory_size_counts_direct_files_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.mkv"), vec![0u8; 100]).unwrap();
        fs::write(dir.path().join("b.mkv"), vec![0u8; 50]).unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("c.mkv"), vec![0u8; 1000]).unwrap();

        assert_eq!(directory_size(dir.path()).unwrap(), 150);
    }

    #[test]
    fn copy_whole_directory() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let cache = test_cache(dest.path());

        let bundle = source.path().join("Show.Name.S01.1080p");
        fs::create_dir(&bundle).unwrap();
        fs::write(bundle.join("Show.Name.S01E01.1080p.mkv"), "one").unwrap();
        fs::write(bundle.join("Show.Name.S01E02.1080p.mkv"), "two").unwrap();
        let subs = bundle.join("Subs");
        fs::create_dir(&subs).unwrap();
        fs::write(subs.join("Show.Name.S01E01.srt"), "subtitles").unwrap();

        let placer = Placer::new(dest.path(), &cache, TransferMode::Copy, 0, false);
        let outcome = placer.place(&bundle, MediaKind::Episode, "Show Name").unwrap();

        assert_eq!(outcome, Outcome::Copied);
        let target = dest.path().join("episodes").join("Show Name").join("Show.Name.S01.1080p");
        assert!(target.join("Show.Name.S01E01.1080p.mkv").exists());
        assert!(target.join("Show.Name.S01E02.1080p.mkv").exists());
        assert!(target.join("Subs").join("Show.Name.S01E01.srt").exists());
        // Source bundle remains for copy mode.
        assert!(bundle.exists());
        assert!(cache.seen("Show.Name.S01.1080p").unwrap());
    }

    #[test]
    fn move_whole_directory() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let cache = test_cache(dest.path());

        let bundle = source.path().join("Show.Name.S02.720p");
        fs::create_dir(&bundle).unwrap();
        fs::write(bundle.join("Show.Name.S02E01.720p.mkv"), "one").unwrap();

        let placer = Placer::new(dest.path(), &cache, TransferMode::Move, 0, false);
        let outcome = placer.place(&bundle, MediaKind::Episode, "Show Name").unwrap();

        assert_eq!(outcome, Outcome::Moved);
        assert!(!bundle.exists());
        assert!(
            dest.path()
                .join("episodes")
                .join("Show Name")
                .join("Show.Name.S02.720p")
                .join("Show.Name.S02E01.720p.mkv")
                .exists()
        );
    }

    #[test]
    fn dry_run_touches_placeholder_only() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let cache = test_cache(dest.path());

        let file = source.path().join("Movie.Title.2020.1080p.mkv");
        fs::write(&file, "data").unwrap();

        let placer = Placer::new(dest.path(), &cache, TransferMode::DryRun, 0, false);
        let outcome = placer.place(&file, MediaKind::Movie, "Movie Title").unwrap();

        assert_eq!(outcome, Outcome::Simulated);
        // The source is untouched and the placeholder is empty.
        assert_eq!(fs::read_to_string(&file).unwrap(), "data");
        let placeholder = dest.path().join("movies").join("Movie.Title.2020.1080p.mkv");
        assert!(placeholder.exists());
        assert_eq!(fs::metadata(placeholder).unwrap().len(), 0);
        // Dry runs never touch the cache.
        assert!(!cache.seen("Movie.Title.2020.1080p.mkv").unwrap());
    }

    #[test]
    fn dry_run_skips_the_cache_lookup() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let cache = test_cache(dest.path());
        cache.record("Movie.Title.2020.1080p.mkv").unwrap();

        let file = source.path().join("Movie.Title.2020.1080p.mkv");
        fs::write(&file, "data").unwrap();

        let placer = Placer::new(dest.path(), &cache, TransferMode::DryRun, 0, false);
        let outcome = placer.place(&file, MediaKind::Movie, "Movie Title").unwrap();

        assert_eq!(outcome, Outcome::Simulated);
    }

    #[test]
    fn unclassified_kind_is_an_error() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let cache = test_cache(dest.path());

        let file = source.path().join("whatever.mkv");
        fs::write(&file, "data").unwrap();

        let placer = Placer::new(dest.path(), &cache, TransferMode::Copy, 0, false);
        assert!(placer.place(&file, MediaKind::Unknown, "Whatever").is_err());
    }

    #[test]
    fn copy_preserves_modification_time() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let cache = test_cache(dest.path());

        let file = source.path().join("Movie.Title.2020.1080p.mkv");
        fs::write(&file, "data").unwrap();
        let source_modified = fs::metadata(&file).unwrap().modified().unwrap();

        let placer = Placer::new(dest.path(), &cache, TransferMode::Copy, 0, false);
        placer.place(&file, MediaKind::Movie, "Movie Title").unwrap();

        let copied = dest.path().join("movies").join("Movie.Title.2020.1080p.mkv");
        let copied_modified = fs::metadata(copied).unwrap().modified().unwrap();
        assert_eq!(copied_modified, source_modified);
    }
}
