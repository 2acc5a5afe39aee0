//! Text rendering of coordinator snapshots.
use std::fmt::Write;

use caption_core::{JobStatus, RunPhase, RunSummary, Snapshot};

const BAR_WIDTH: usize = 30;
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Single status line redrawn on every tick.
pub fn progress_line(snapshot: &Snapshot, frame: usize) -> String {
    format!(
        "{} [{}/{}] {} {:>3.0}%  {} remaining, {} workers",
        SPINNER[frame % SPINNER.len()],
        snapshot.completed,
        snapshot.total,
        bar(snapshot.percent()),
        snapshot.percent() * 100.0,
        snapshot.total.saturating_sub(snapshot.completed),
        snapshot.worker_count
    )
}

/// Closing report: per-job outcomes followed by the overall verdict.
pub fn final_report(snapshot: &Snapshot) -> String {
    let mut out = String::new();

    for row in &snapshot.jobs {
        let mark = match row.status {
            JobStatus::Completed => "ok  ",
            JobStatus::Skipped => "skip",
            JobStatus::Failed => "FAIL",
            _ => "....",
        };
        let _ = write!(out, "{mark} {}", row.title);
        if let Some(path) = &row.output_path {
            let _ = write!(out, " -> {}", path.display());
        }
        out.push('\n');
    }

    if snapshot.phase == RunPhase::Cancelled {
        let _ = writeln!(
            out,
            "Cancelled after {}/{} jobs. Downloads already running were not waited for.",
            snapshot.completed, snapshot.total
        );
        return out;
    }

    match snapshot.summary() {
        RunSummary::AllSucceeded { completed, skipped } => {
            let _ = writeln!(out, "All done! {completed} written, {skipped} already present.");
        }
        RunSummary::SomeFailed {
            succeeded,
            failures,
        } => {
            let _ = writeln!(
                out,
                "Some jobs failed ({} of {}, {} succeeded):",
                failures.len(),
                snapshot.total,
                succeeded
            );
            for failure in failures {
                let _ = writeln!(out, "  - {} ({}): {}", failure.title, failure.identifier, failure.error);
            }
        }
    }
    let _ = writeln!(out, "{} 100%", bar(1.0));
    out
}

fn bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}
