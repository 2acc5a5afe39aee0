use std::sync::Arc;

use caption_core::{Job, JobResult};
use engine_logging::{engine_error, engine_info};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::worker::{run_worker, WorkerContext};
use crate::{EngineConfig, Stages};

/// A launched worker pool and the receiving end of its results channel.
pub struct EngineHandle {
    results_rx: mpsc::UnboundedReceiver<JobResult>,
    workers: Vec<JoinHandle<()>>,
}

impl EngineHandle {
    /// Queues every job index, closes the queue, then spawns `worker_count`
    /// workers on the current tokio runtime.
    pub fn launch(jobs: &[Job], worker_count: usize, config: EngineConfig, stages: Stages) -> Self {
        let worker_count = worker_count.max(1);
        let (queue_tx, queue_rx) = mpsc::channel(jobs.len().max(1));
        for index in 0..jobs.len() {
            if let Err(err) = queue_tx.try_send(index) {
                engine_error!("could not queue job {}: {}", index, err);
            }
        }
        drop(queue_tx);

        let queue = Arc::new(Mutex::new(queue_rx));
        let jobs: Arc<[Job]> = jobs.into();
        let ctx = Arc::new(WorkerContext::new(config, stages));
        let (results_tx, results_rx) = mpsc::unbounded_channel();

        engine_info!(
            "launching {} worker(s) for {} job(s)",
            worker_count,
            jobs.len()
        );
        let workers = (0..worker_count)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    jobs.clone(),
                    queue.clone(),
                    results_tx.clone(),
                    ctx.clone(),
                ))
            })
            .collect();

        Self {
            results_rx,
            workers,
        }
    }

    /// Next result from any worker; `None` once every worker has exited.
    pub async fn recv(&mut self) -> Option<JobResult> {
        self.results_rx.recv().await
    }

    /// Stops accepting results. Workers finish the job in hand, then exit.
    pub fn close(&mut self) {
        self.results_rx.close();
    }

    /// Closes the results channel and waits for the workers to wind down.
    pub async fn join(mut self) {
        self.results_rx.close();
        for worker in self.workers.drain(..) {
            if let Err(err) = worker.await {
                engine_error!("worker task failed: {}", err);
            }
        }
    }
}
