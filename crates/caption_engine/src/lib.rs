//! Caption engine: worker pool, stage pipeline and filesystem effects.
mod clean;
mod config;
mod coordinator;
mod engine;
mod filename;
mod identifier;
mod persist;
mod report;
mod stages;
mod worker;
mod ytdlp;

pub use clean::{
    clean_caption_lines, clean_captions, dedupe_adjacent, is_cue_timing, is_sequence_number,
    strip_artifacts, strip_markup,
};
pub use config::EngineConfig;
pub use coordinator::Coordinator;
pub use engine::EngineHandle;
pub use filename::{output_filename, output_path_for_title, sanitize_title};
pub use identifier::content_key;
pub use persist::{ensure_output_dir, prepare_scratch_dir, AtomicFileWriter, NewFile, PersistError};
pub use report::{write_run_report, ReportError};
pub use stages::{AssetFetcher, Stages, TitleResolver, ToolError};
pub use ytdlp::YtDlp;
