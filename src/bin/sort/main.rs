mod cache;
mod config;
mod notify;
mod place;
mod sorter;
mod types;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use media_sort::print_error;

use crate::sorter::Sorter;

/// Exit code for a detected pre-run lock file.
const EXIT_CODE_LOCKED: i32 = 2;

#[derive(Parser)]
#[command(author, version, name = env!("CARGO_BIN_NAME"), about = "Sort downloaded media files into movies and shows")]
pub struct Args {
    /// Source directory to scan
    #[arg(value_hint = clap::ValueHint::DirPath, required_unless_present = "completion")]
    source: Option<PathBuf>,

    /// Destination root directory
    #[arg(value_hint = clap::ValueHint::DirPath, required_unless_present = "completion")]
    destination: Option<PathBuf>,

    /// Copy files instead of moving them
    #[arg(short, long)]
    copy: bool,

    /// Print debug information
    #[arg(short = 'D', long)]
    debug: bool,

    /// Create empty placeholders at the destination without touching the source
    #[arg(short = 'p', long)]
    dry_run: bool,

    /// Process items even if they are already in the cache
    #[arg(short, long)]
    ignore_cache: bool,

    /// Generate shell completion
    #[arg(short = 'l', long, value_name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(ref shell) = args.completion {
        return media_sort::generate_shell_completion(*shell, Args::command(), env!("CARGO_BIN_NAME"));
    }
    let sorter = Sorter::new(args)?;
    if let Some(lock) = sorter.lock_file() {
        print_error!("Lock file present, refusing to run: {}", lock.display());
        std::process::exit(EXIT_CODE_LOCKED);
    }
    sorter.run()
}
