use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings threaded into the coordinator and every worker at construction.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Raw downloaded artifacts; recreated empty for each run.
    pub scratch_dir: PathBuf,
    /// Normalized text output; kept between runs so finished jobs are skipped.
    pub output_dir: PathBuf,
    pub worker_count: usize,
    /// Caption language requested from the downloader.
    pub language: String,
    /// Extension of the artifact the downloader leaves in `scratch_dir`.
    pub artifact_extension: String,
    /// Deadline applied separately to title resolution and download. `None`
    /// waits indefinitely.
    pub stage_timeout: Option<Duration>,
}

impl EngineConfig {
    pub fn new(scratch_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            output_dir: output_dir.into(),
            worker_count: 1,
            language: "en".to_string(),
            artifact_extension: "vtt".to_string(),
            stage_timeout: None,
        }
    }

    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count.max(1);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_stage_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stage_timeout = timeout;
        self
    }

    /// Where the downloader is expected to leave the artifact for `content_key`.
    pub fn artifact_path(&self, content_key: &str) -> PathBuf {
        artifact_path_in(&self.scratch_dir, content_key, &self.artifact_extension)
    }
}

pub(crate) fn artifact_path_in(dir: &Path, content_key: &str, extension: &str) -> PathBuf {
    dir.join(format!("{content_key}.{extension}"))
}
