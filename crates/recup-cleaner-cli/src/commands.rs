use clap::{Args, Parser, Subcommand};
use recup_cleaner_core::AppConfig;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "recup-cleaner")]
#[command(about = "Clean up PhotoRec output while the recovery is still running", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Watch an output directory and clean each recup_dir once PhotoRec moves on
    Watch(CleanArgs),
    /// Clean every recup_dir of a finished recovery in one pass
    CleanOnce(CleanArgs),
    /// List the files directly inside a directory
    List {
        /// Directory to list
        dir: PathBuf,
    },
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// PhotoRec output directory
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
    /// Comma-separated extensions to keep; everything else is deleted
    #[arg(short, long)]
    pub keep: Option<String>,
    /// Comma-separated extensions to always delete, even if kept
    #[arg(short = 'x', long)]
    pub exclude: Option<String>,
    /// Keep every file; only track and reorganize
    #[arg(long)]
    pub no_clean: bool,
    /// Milliseconds between folder checks
    #[arg(long)]
    pub interval_ms: Option<u64>,
    /// Maximum files per numbered sub-folder when reorganizing
    #[arg(long)]
    pub batch_size: Option<usize>,
    /// Leave kept files in their recup_dir folders
    #[arg(long)]
    pub no_reorganize: bool,
    /// Write a CSV log of every kept or deleted file
    #[arg(long)]
    pub log: bool,
    /// Directory for the CSV log (defaults to the output directory)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl CleanArgs {
    /// Overlay command-line values on the loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.dir {
            config.base_dir = Some(dir.clone());
        }
        if let Some(keep) = &self.keep {
            config.keep_extensions = vec![keep.clone()];
        }
        if let Some(exclude) = &self.exclude {
            config.exclude_extensions = vec![exclude.clone()];
        }
        if self.no_clean {
            config.cleaning_enabled = false;
        }
        if let Some(interval) = self.interval_ms {
            config.poll_interval_ms = interval;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if self.no_reorganize {
            config.reorganize = false;
        }
        if self.log {
            config.log_enabled = true;
        }
        if let Some(log_dir) = &self.log_dir {
            config.log_dir = Some(log_dir.clone());
        }
    }
}
