use std::path::{Path, PathBuf};
use std::process::Output;

use engine_logging::{engine_debug, engine_warn};
use tokio::process::Command;

use crate::config::artifact_path_in;
use crate::stages::{AssetFetcher, TitleResolver, ToolError};

/// `yt-dlp` driven as a child process for both title lookup and caption download.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
    language: String,
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            language: language.into(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--quiet").arg("--no-warnings").kill_on_drop(true);
        cmd
    }

    async fn run(&self, mut cmd: Command) -> Result<Output, ToolError> {
        let output = cmd.output().await.map_err(|source| ToolError::Launch {
            program: self.program.display().to_string(),
            source,
        })?;
        if !output.status.success() {
            return Err(ToolError::Exit {
                program: self.program.display().to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

#[async_trait::async_trait]
impl TitleResolver for YtDlp {
    async fn resolve_title(&self, identifier: &str) -> Result<String, ToolError> {
        let mut cmd = self.command();
        cmd.args(["--skip-download", "--print", "title", "--"])
            .arg(identifier);
        let output = self.run(cmd).await?;
        let title = String::from_utf8_lossy(&output.stdout).trim().to_string();
        engine_debug!("resolved title identifier={} title={:?}", identifier, title);
        Ok(title)
    }
}

#[async_trait::async_trait]
impl AssetFetcher for YtDlp {
    async fn fetch_asset(
        &self,
        identifier: &str,
        content_key: &str,
        destination: &Path,
    ) -> Result<(), ToolError> {
        let template = destination.join(content_key);
        let mut cmd = self.command();
        cmd.args([
            "--skip-download",
            "--write-sub",
            "--write-auto-sub",
            "--sub-lang",
            self.language.as_str(),
            "--convert-subs",
            "vtt",
            "-o",
        ])
        .arg(&template)
        .arg("--")
        .arg(identifier);
        self.run(cmd).await?;

        // yt-dlp names subtitles `<template>.<lang>.vtt`; move to `<key>.vtt`.
        let language_key = format!("{content_key}.{}", self.language);
        let produced = artifact_path_in(destination, &language_key, "vtt");
        let expected = artifact_path_in(destination, content_key, "vtt");
        match tokio::fs::rename(&produced, &expected).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                engine_warn!(
                    "yt-dlp left no {:?} captions for key={}",
                    self.language,
                    content_key
                );
                Ok(())
            }
            Err(err) => Err(ToolError::Other(format!(
                "could not move {produced:?} to {expected:?}: {err}"
            ))),
        }
    }
}
