use std::io;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

/// Failure of an external stage collaborator.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("{0}")]
    Other(String),
}

/// Looks up a display title for an identifier.
///
/// An `Ok` with an empty string means "no title"; the worker then falls back
/// to the content key. Only an `Err` fails the job.
#[async_trait::async_trait]
pub trait TitleResolver: Send + Sync {
    async fn resolve_title(&self, identifier: &str) -> Result<String, ToolError>;
}

/// Downloads the caption artifact for an identifier.
///
/// On success the artifact should exist as `<content_key>.<extension>` in
/// `destination`; the worker verifies that separately because the tool may
/// succeed without finding any captions.
#[async_trait::async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch_asset(
        &self,
        identifier: &str,
        content_key: &str,
        destination: &Path,
    ) -> Result<(), ToolError>;
}

/// The external collaborators a worker drives.
#[derive(Clone)]
pub struct Stages {
    pub titles: Arc<dyn TitleResolver>,
    pub fetcher: Arc<dyn AssetFetcher>,
}

impl Stages {
    pub fn new(titles: Arc<dyn TitleResolver>, fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self { titles, fetcher }
    }

    /// Both stages served by one implementation, e.g. [`crate::YtDlp`].
    pub fn from_tool<T>(tool: T) -> Self
    where
        T: TitleResolver + AssetFetcher + 'static,
    {
        let tool = Arc::new(tool);
        Self {
            titles: tool.clone(),
            fetcher: tool,
        }
    }
}
