use std::io::{IsTerminal, Write};
use std::time::Duration;

use anyhow::Context;
use caption_core::{Msg, RunPhase, RunSummary, Snapshot};
use caption_engine::{
    ensure_output_dir, prepare_scratch_dir, write_run_report, Coordinator, Stages, YtDlp,
};
use engine_logging::{engine_error, engine_info, engine_warn};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;
use crate::render;

const RENDER_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded,
    SomeFailed,
    Cancelled,
}

impl RunOutcome {
    fn from_snapshot(snapshot: &Snapshot) -> Self {
        if snapshot.phase == RunPhase::Cancelled {
            return Self::Cancelled;
        }
        match snapshot.summary() {
            RunSummary::AllSucceeded { .. } => Self::Succeeded,
            RunSummary::SomeFailed { .. } => Self::SomeFailed,
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<RunOutcome> {
    let config = cli.engine_config();
    ensure_output_dir(&config.output_dir).context("preparing output directory")?;
    prepare_scratch_dir(&config.scratch_dir).context("preparing scratch directory")?;

    let stages = Stages::from_tool(YtDlp::new(&cli.yt_dlp, &cli.lang));
    let mut coordinator = Coordinator::new(cli.identifiers.iter().cloned(), config, stages);

    let cancel = CancellationToken::new();
    spawn_interrupt_listener(cancel.clone());

    let interactive = std::io::stderr().is_terminal();
    let mut ticker = tokio::time::interval(RENDER_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut frame = 0usize;

    coordinator.start();
    while !coordinator.is_finished() {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                engine_warn!("interrupt received, cancelling run");
                coordinator.dispatch(Msg::CancelRequested);
            }
            msg = coordinator.next_message() => coordinator.dispatch(msg),
            _ = ticker.tick() => {
                coordinator.dispatch(Msg::Tick);
                if interactive {
                    draw_progress(&render::progress_line(&coordinator.snapshot(), frame));
                    frame = frame.wrapping_add(1);
                }
            }
        }
    }
    if interactive {
        clear_progress();
    }

    let snapshot = coordinator.snapshot();
    print!("{}", render::final_report(&snapshot));

    if let Some(path) = &cli.report {
        let finished = chrono::Utc::now().to_rfc3339();
        match write_run_report(path, &snapshot, &finished) {
            Ok(written) => engine_info!("run report written to {}", written.display()),
            Err(err) => {
                engine_error!("could not write run report: {}", err);
                eprintln!("warning: could not write run report: {err}");
            }
        }
    }

    Ok(RunOutcome::from_snapshot(&snapshot))
}

fn spawn_interrupt_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => cancel.cancel(),
            Err(err) => engine_error!("could not listen for ctrl-c: {}", err),
        }
    });
}

fn draw_progress(line: &str) {
    let mut stderr = std::io::stderr().lock();
    let _ = write!(stderr, "\r\x1b[2K{line}");
    let _ = stderr.flush();
}

fn clear_progress() {
    let mut stderr = std::io::stderr().lock();
    let _ = write!(stderr, "\r\x1b[2K");
    let _ = stderr.flush();
}
