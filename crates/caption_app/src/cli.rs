use std::path::PathBuf;
use std::time::Duration;

use caption_engine::EngineConfig;
use clap::Parser;
use engine_logging::LogDestination;
use log::LevelFilter;

/// Download captions for videos and save them as clean text.
#[derive(Debug, Parser)]
#[command(name = "yt-captions", version)]
#[command(about = "Download captions for videos and save them as clean text", long_about = None)]
pub struct Cli {
    /// Video URLs to process.
    #[arg(required = true, value_name = "IDENTIFIER")]
    pub identifiers: Vec<String>,

    /// Directory for cleaned transcripts. Existing files are kept and skipped.
    #[arg(short = 'o', long, default_value = "cleaned", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Scratch directory for raw caption files; emptied at the start of each run.
    #[arg(long, default_value = "tmp", value_name = "DIR")]
    pub scratch_dir: PathBuf,

    /// Number of parallel workers (default 1 processes videos one at a time).
    #[arg(
        short = 'p',
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u16).range(1..),
        value_name = "N"
    )]
    pub workers: u16,

    /// Caption language to request.
    #[arg(long, default_value = "en", value_name = "LANG")]
    pub lang: String,

    /// yt-dlp executable to run.
    #[arg(long = "yt-dlp", default_value = "yt-dlp", value_name = "PROGRAM")]
    pub yt_dlp: PathBuf,

    /// Give up on a stage after this many seconds. Unset waits indefinitely.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub stage_timeout: Option<u64>,

    /// Write a JSON summary of the run to this path.
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Write the log to this file.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log debug output to the terminal.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(&self.scratch_dir, &self.output_dir)
            .with_workers(usize::from(self.workers))
            .with_language(&self.lang)
            .with_stage_timeout(self.stage_timeout.map(Duration::from_secs))
    }

    pub fn log_destination(&self) -> LogDestination {
        match (&self.log_file, self.verbose) {
            (Some(path), true) => LogDestination::Both(path.clone()),
            (Some(path), false) => LogDestination::File(path.clone()),
            (None, true) => LogDestination::Terminal,
            (None, false) => LogDestination::Silent,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}
