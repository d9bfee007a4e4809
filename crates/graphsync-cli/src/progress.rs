//! Spinner rendering of sync progress events

use graphsync_sync::{ProgressEvent, SyncPhase};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Render progress events on a spinner until the run ends
pub fn spawn_spinner(mut events: UnboundedReceiver<ProgressEvent>) -> JoinHandle<()> {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(phase_message(SyncPhase::FetchingManifest).to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                ProgressEvent::Update(progress) => {
                    if progress.phase == SyncPhase::Walking {
                        pb.set_message(format!(
                            "{} ({} files, {} skipped)",
                            phase_message(progress.phase),
                            progress.files_scanned,
                            progress.files_skipped
                        ));
                    }
                }
                ProgressEvent::PhaseChanged(phase) => {
                    pb.set_message(phase_message(phase).to_string());
                }
                ProgressEvent::Completed(_) | ProgressEvent::Failed(_) => break,
                ProgressEvent::FileScanned(_) | ProgressEvent::FileSkipped(..) => {}
            }
        }
        pb.finish_and_clear();
    })
}

fn phase_message(phase: SyncPhase) -> &'static str {
    match phase {
        SyncPhase::FetchingManifest => "Fetching remote manifest...",
        SyncPhase::Walking => "Scanning workspace...",
        SyncPhase::Diffing => "Detecting changes...",
        SyncPhase::Idle => "Nothing to submit",
        SyncPhase::Submitting => "Submitting changes...",
        SyncPhase::Done => "Done",
        SyncPhase::Failed => "Failed",
    }
}
