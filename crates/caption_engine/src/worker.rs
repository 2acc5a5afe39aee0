use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use caption_core::{FailureKind, Job, JobError, JobIndex, JobResult, JobStatus, Stage};
use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use tokio::sync::{mpsc, Mutex};

use crate::clean::clean_captions;
use crate::filename::{output_filename, output_path_for_title};
use crate::identifier::content_key;
use crate::persist::{AtomicFileWriter, NewFile};
use crate::{EngineConfig, Stages};

/// Closed, pre-filled queue of job indices shared by all workers.
pub(crate) type JobQueue = Arc<Mutex<mpsc::Receiver<JobIndex>>>;

/// Everything a worker needs besides the queue, shared read-only.
pub(crate) struct WorkerContext {
    config: EngineConfig,
    stages: Stages,
    writer: AtomicFileWriter,
}

impl WorkerContext {
    pub(crate) fn new(config: EngineConfig, stages: Stages) -> Self {
        let writer = AtomicFileWriter::new(config.output_dir.clone());
        Self {
            config,
            stages,
            writer,
        }
    }

    async fn within<T, F>(&self, stage: Stage, fut: F) -> Result<T, JobError>
    where
        F: Future<Output = Result<T, JobError>>,
    {
        match self.config.stage_timeout {
            None => fut.await,
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => Err(JobError::new(
                    FailureKind::Timeout { stage },
                    format!("no result after {limit:?}"),
                )),
            },
        }
    }
}

/// Drains `queue` until it is closed and empty, reporting one result per index.
///
/// Stops early when the coordinator has dropped the results receiver.
pub(crate) async fn run_worker(
    worker_id: usize,
    jobs: Arc<[Job]>,
    queue: JobQueue,
    results: mpsc::UnboundedSender<JobResult>,
    ctx: Arc<WorkerContext>,
) {
    engine_debug!("worker {} started", worker_id);
    loop {
        if results.is_closed() {
            engine_debug!("worker {} stopping: results receiver closed", worker_id);
            break;
        }
        let next = queue.lock().await.recv().await;
        let Some(index) = next else {
            break;
        };
        let Some(job) = jobs.get(index).cloned() else {
            engine_error!("worker {} got unknown job index {}", worker_id, index);
            continue;
        };

        let job = process_job(&ctx, job).await;
        log_outcome(worker_id, index, &job);

        if results.send(JobResult::new(index, job)).is_err() {
            engine_debug!("worker {} stopping: results receiver closed", worker_id);
            break;
        }
    }
    engine_debug!("worker {} finished", worker_id);
}

/// Runs one job through title resolution, download and normalization.
///
/// The first failing stage is terminal; the returned job always carries a
/// terminal status.
async fn process_job(ctx: &WorkerContext, mut job: Job) -> Job {
    if let Err(err) = drive(ctx, &mut job).await {
        job.fail(err);
    }
    job
}

async fn drive(ctx: &WorkerContext, job: &mut Job) -> Result<(), JobError> {
    let identifier = job.identifier().to_string();

    job.begin(JobStatus::ResolvingTitle);
    let resolved = ctx
        .within(Stage::ResolveTitle, async {
            ctx.stages
                .titles
                .resolve_title(&identifier)
                .await
                .map_err(|err| JobError::new(FailureKind::Resolution, err.to_string()))
        })
        .await?;

    let key = content_key(&identifier)?;
    let title = match resolved.trim() {
        "" => key.clone(),
        title => title.to_string(),
    };
    job.set_title(title);

    let output_path = output_path_for_title(&ctx.config.output_dir, job.title());
    match output_path.try_exists() {
        Ok(true) => {
            job.skip(output_path);
            return Ok(());
        }
        Ok(false) => {}
        Err(err) => {
            return Err(JobError::new(
                FailureKind::Normalize,
                format!("could not check existing output {output_path:?}: {err}"),
            ));
        }
    }

    job.begin(JobStatus::Fetching);
    let scratch = ctx.config.scratch_dir.clone();
    ctx.within(Stage::FetchAsset, async {
        ctx.stages
            .fetcher
            .fetch_asset(&identifier, &key, &scratch)
            .await
            .map_err(|err| JobError::new(FailureKind::Fetch, err.to_string()))
    })
    .await?;

    let artifact = ctx.config.artifact_path(&key);
    match artifact.try_exists() {
        Ok(true) => {}
        Ok(false) => {
            return Err(JobError::new(
                FailureKind::NoContent,
                format!(
                    "download finished but {artifact:?} was not created (no {:?} captions?)",
                    ctx.config.language
                ),
            ));
        }
        Err(err) => {
            return Err(JobError::new(
                FailureKind::Fetch,
                format!("could not check artifact {artifact:?}: {err}"),
            ));
        }
    }

    // Normalization runs without the stage deadline.
    job.begin(JobStatus::Normalizing);
    let filename = output_filename(job.title());
    match normalize_artifact(ctx.writer.clone(), artifact, filename).await? {
        NewFile::Created(path) => job.complete(path),
        NewFile::AlreadyExists(path) => {
            engine_debug!("output {:?} was written by another job, skipping", path);
            job.skip(path);
        }
    }
    Ok(())
}

async fn normalize_artifact(
    writer: AtomicFileWriter,
    artifact: PathBuf,
    filename: String,
) -> Result<NewFile, JobError> {
    let task = tokio::task::spawn_blocking(move || {
        let raw = std::fs::read(&artifact).map_err(|err| {
            JobError::new(
                FailureKind::Normalize,
                format!("could not read {artifact:?}: {err}"),
            )
        })?;
        let cleaned = clean_captions(&String::from_utf8_lossy(&raw));
        writer.write_new(&filename, &cleaned).map_err(|err| {
            JobError::new(
                FailureKind::Normalize,
                format!("could not write {filename}: {err}"),
            )
        })
    });
    task.await
        .map_err(|err| JobError::new(FailureKind::Normalize, err.to_string()))?
}

fn log_outcome(worker_id: usize, index: JobIndex, job: &Job) {
    match (job.status(), job.error()) {
        (_, Some(err)) => engine_warn!(
            "worker={} job={} identifier={} failed: {}",
            worker_id,
            index,
            job.identifier(),
            err
        ),
        (status, None) => engine_info!(
            "worker={} job={} title={:?} {} output={:?}",
            worker_id,
            index,
            job.title(),
            status,
            job.output_path()
        ),
    }
}
