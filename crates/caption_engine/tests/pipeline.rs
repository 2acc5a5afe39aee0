use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use caption_core::{FailureKind, JobStatus, Msg, RunPhase, ShutdownReason, Snapshot, Stage};
use caption_engine::{
    content_key, prepare_scratch_dir, AssetFetcher, Coordinator, EngineConfig, Stages,
    TitleResolver, ToolError,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const A: &str = "https://www.youtube.com/watch?v=aaa111";
const B: &str = "https://youtu.be/bbb222";
const C: &str = "https://www.youtube.com/embed/ccc333";

/// Stand-in for the external tool: titles from a map, captions written
/// straight into the scratch directory.
#[derive(Default)]
struct FakeTool {
    titles: HashMap<String, String>,
    failing_titles: HashSet<String>,
    failing_fetches: HashSet<String>,
    without_captions: HashSet<String>,
    hanging_fetches: HashSet<String>,
    fetch_calls: AtomicUsize,
}

impl FakeTool {
    fn with_titles(pairs: &[(&str, &str)]) -> Self {
        Self {
            titles: pairs
                .iter()
                .map(|(id, title)| (id.to_string(), title.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    fn failing_fetch(mut self, key: &str) -> Self {
        self.failing_fetches.insert(key.to_string());
        self
    }

    fn without_captions(mut self, key: &str) -> Self {
        self.without_captions.insert(key.to_string());
        self
    }

    fn hanging_fetch(mut self, key: &str) -> Self {
        self.hanging_fetches.insert(key.to_string());
        self
    }

    fn failing_title(mut self, identifier: &str) -> Self {
        self.failing_titles.insert(identifier.to_string());
        self
    }
}

#[async_trait::async_trait]
impl TitleResolver for FakeTool {
    async fn resolve_title(&self, identifier: &str) -> Result<String, ToolError> {
        if self.failing_titles.contains(identifier) {
            return Err(ToolError::Exit {
                program: "fake".into(),
                status: "exit status: 1".into(),
                stderr: "video unavailable".into(),
            });
        }
        Ok(self.titles.get(identifier).cloned().unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl AssetFetcher for FakeTool {
    async fn fetch_asset(
        &self,
        _identifier: &str,
        content_key: &str,
        destination: &Path,
    ) -> Result<(), ToolError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.hanging_fetches.contains(content_key) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        if self.failing_fetches.contains(content_key) {
            return Err(ToolError::Exit {
                program: "fake".into(),
                status: "exit status: 1".into(),
                stderr: "HTTP Error 403".into(),
            });
        }
        if self.without_captions.contains(content_key) {
            return Ok(());
        }
        let vtt = format!(
            "WEBVTT\n\n1\n00:00:00.000 --> 00:00:01.000\n<c>hello from {content_key}</c>\n\n\
             2\n00:00:01.000 --> 00:00:02.000\nhello from {content_key}\nbye\n"
        );
        std::fs::write(destination.join(format!("{content_key}.vtt")), vtt)
            .map_err(|err| ToolError::Other(err.to_string()))
    }
}

struct Dirs {
    _root: TempDir,
    scratch: PathBuf,
    output: PathBuf,
}

fn dirs() -> Dirs {
    let root = TempDir::new().unwrap();
    let scratch = root.path().join("tmp");
    let output = root.path().join("cleaned");
    prepare_scratch_dir(&scratch).unwrap();
    std::fs::create_dir_all(&output).unwrap();
    Dirs {
        _root: root,
        scratch,
        output,
    }
}

fn config(dirs: &Dirs, workers: usize) -> EngineConfig {
    EngineConfig::new(&dirs.scratch, &dirs.output).with_workers(workers)
}

async fn run(ids: &[&str], config: EngineConfig, tool: Arc<FakeTool>) -> Snapshot {
    let stages = Stages::new(tool.clone(), tool);
    let mut coordinator = Coordinator::new(ids.iter().copied(), config, stages);
    coordinator.run_to_completion().await
}

fn statuses(snapshot: &Snapshot) -> Vec<JobStatus> {
    snapshot.jobs.iter().map(|j| j.status).collect()
}

#[tokio::test]
async fn partial_failure_leaves_other_jobs_completed() {
    engine_logging::initialize_for_tests();
    let dirs = dirs();
    let tool = Arc::new(
        FakeTool::with_titles(&[(A, "First"), (B, "Second"), (C, "Third")])
            .failing_fetch("bbb222"),
    );

    let snapshot = run(&[A, B, C], config(&dirs, 2), tool).await;

    assert_eq!(snapshot.phase, RunPhase::Completed);
    assert_eq!(snapshot.completed, 3);
    assert_eq!(
        statuses(&snapshot),
        vec![JobStatus::Completed, JobStatus::Failed, JobStatus::Completed]
    );
    let error = snapshot.jobs[1].error.as_ref().expect("error recorded");
    assert_eq!(error.kind, FailureKind::Fetch);
    assert!(error.message.contains("403"));

    let first = snapshot.jobs[0].output_path.as_ref().unwrap();
    assert_eq!(first, &dirs.output.join("First.txt"));
    assert_eq!(
        std::fs::read_to_string(first).unwrap(),
        "hello from aaa111\nbye"
    );
    assert!(dirs.output.join("Third.txt").is_file());
}

#[tokio::test]
async fn missing_artifact_is_reported_as_no_content() {
    let dirs = dirs();
    let tool = Arc::new(
        FakeTool::with_titles(&[(A, "First"), (B, "Second")])
            .without_captions("aaa111")
            .failing_fetch("bbb222"),
    );

    let snapshot = run(&[A, B], config(&dirs, 1), tool).await;

    let kinds: Vec<_> = snapshot
        .jobs
        .iter()
        .map(|j| j.error.as_ref().map(|e| e.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![Some(FailureKind::NoContent), Some(FailureKind::Fetch)]
    );
    assert!(snapshot.jobs.iter().all(|j| j.output_path.is_none()));
}

#[tokio::test]
async fn second_run_skips_existing_output() {
    let dirs = dirs();
    let tool = Arc::new(FakeTool::with_titles(&[(A, "Talk: part 1")]));

    let first = run(&[A], config(&dirs, 1), tool.clone()).await;
    assert_eq!(first.jobs[0].status, JobStatus::Completed);

    prepare_scratch_dir(&dirs.scratch).unwrap();
    let second = run(&[A], config(&dirs, 1), tool.clone()).await;

    assert_eq!(second.jobs[0].status, JobStatus::Skipped);
    assert_eq!(second.jobs[0].output_path, first.jobs[0].output_path);
    assert!(second.jobs[0].error.is_none());
    assert_eq!(tool.fetch_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn outcomes_do_not_depend_on_worker_count() {
    let ids = [
        A,
        B,
        C,
        "https://youtu.be/ddd444",
        "https://example.com/not-a-video",
        "https://youtu.be/eee555",
    ];
    let make_tool = || {
        Arc::new(
            FakeTool::with_titles(&[(A, "a"), (B, "b"), (C, "c")])
                .failing_fetch("ddd444")
                .without_captions("eee555"),
        )
    };

    let mut outcomes = Vec::new();
    for workers in [1, 4] {
        let dirs = dirs();
        let snapshot = run(&ids, config(&dirs, workers), make_tool()).await;
        assert_eq!(snapshot.completed, ids.len());
        let by_id: BTreeMap<String, JobStatus> = snapshot
            .jobs
            .iter()
            .map(|j| (j.identifier.clone(), j.status))
            .collect();
        outcomes.push(by_id);
    }

    assert_eq!(outcomes[0], outcomes[1]);
    assert_eq!(outcomes[0][A], JobStatus::Completed);
    assert_eq!(outcomes[0]["https://example.com/not-a-video"], JobStatus::Failed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shared_title_is_written_once_at_any_worker_count() {
    let ids = [A, B, A];
    let tool = || Arc::new(FakeTool::with_titles(&[(A, "Same talk"), (B, "Same talk")]));

    for workers in [1, 4] {
        let dirs = dirs();
        let snapshot = run(&ids, config(&dirs, workers), tool()).await;

        let mut sorted = statuses(&snapshot);
        sorted.sort_by_key(|status| *status == JobStatus::Skipped);
        assert_eq!(
            sorted,
            vec![JobStatus::Completed, JobStatus::Skipped, JobStatus::Skipped],
            "workers={workers}"
        );

        let expected = dirs.output.join("Same talk.txt");
        assert!(snapshot
            .jobs
            .iter()
            .all(|j| j.output_path.as_ref() == Some(&expected)));
        assert_eq!(std::fs::read_dir(&dirs.output).unwrap().count(), 1);
    }
}

#[tokio::test]
async fn title_failure_never_downloads() {
    let dirs = dirs();
    let tool = Arc::new(FakeTool::default().failing_title(A));

    let snapshot = run(&[A], config(&dirs, 1), tool.clone()).await;

    let error = snapshot.jobs[0].error.as_ref().unwrap();
    assert_eq!(error.kind, FailureKind::Resolution);
    assert!(error.message.contains("video unavailable"));
    assert_eq!(tool.fetch_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_title_falls_back_to_content_key() {
    let dirs = dirs();
    let tool = Arc::new(FakeTool::default());

    let snapshot = run(&[B], config(&dirs, 1), tool).await;

    assert_eq!(snapshot.jobs[0].title, "bbb222");
    assert_eq!(
        snapshot.jobs[0].output_path.as_deref(),
        Some(dirs.output.join("bbb222.txt").as_path())
    );
}

#[tokio::test]
async fn malformed_identifier_fails_before_download() {
    let dirs = dirs();
    let tool = Arc::new(FakeTool::default());

    let snapshot = run(&["not a url at all"], config(&dirs, 1), tool.clone()).await;

    assert_eq!(
        snapshot.jobs[0].error.as_ref().map(|e| e.kind),
        Some(FailureKind::IdentifierParse)
    );
    assert_eq!(tool.fetch_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn stage_timeout_fails_only_the_slow_job() {
    let dirs = dirs();
    let tool = Arc::new(FakeTool::with_titles(&[(A, "Fast"), (B, "Slow")]).hanging_fetch("bbb222"));
    let config = config(&dirs, 2).with_stage_timeout(Some(Duration::from_millis(50)));

    let snapshot = run(&[A, B], config, tool).await;

    assert_eq!(snapshot.jobs[0].status, JobStatus::Completed);
    assert_eq!(
        snapshot.jobs[1].error.as_ref().map(|e| e.kind),
        Some(FailureKind::Timeout {
            stage: Stage::FetchAsset
        })
    );
}

#[tokio::test]
async fn empty_worklist_completes_immediately() {
    let dirs = dirs();
    let snapshot = run(&[], config(&dirs, 3), Arc::new(FakeTool::default())).await;

    assert_eq!(snapshot.phase, RunPhase::Completed);
    assert_eq!(snapshot.total, 0);
    assert_eq!(snapshot.percent(), 1.0);
}

#[tokio::test]
async fn cancel_stops_folding_results() {
    let dirs = dirs();
    let tool = Arc::new(FakeTool::with_titles(&[(A, "a"), (B, "b")]));
    let stages = Stages::new(tool.clone(), tool);
    let mut coordinator = Coordinator::new([A, B], config(&dirs, 1), stages);

    coordinator.start();
    coordinator.dispatch(Msg::CancelRequested);

    assert!(coordinator.is_finished());
    assert_eq!(coordinator.shutdown_reason(), Some(ShutdownReason::Cancelled));
    let snapshot = coordinator.snapshot();
    assert!(snapshot.cancel_requested);
    assert_eq!(snapshot.phase, RunPhase::Cancelled);
    assert_eq!(snapshot.completed, 0);

    // Workers notice the closed results channel and exit on their own.
    let engine = coordinator.take_engine().expect("workers were launched");
    tokio::time::timeout(Duration::from_secs(5), engine.join())
        .await
        .expect("workers exit after cancel");
}

#[test]
fn artifacts_are_keyed_by_content_key() {
    let config = EngineConfig::new("tmp", "cleaned");
    let key = content_key(C).unwrap();
    assert_eq!(config.artifact_path(&key), Path::new("tmp").join("ccc333.vtt"));
}
